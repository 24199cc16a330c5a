//! In-process session model
//!
//! Stands in for the host's object model so the gateway can run stand-alone.
//! Every request mutates a plain [`Model`]; the observable view of the model
//! before and after the mutation is compared field by field, and each changed
//! field whose topic has been marked interesting is emitted through the sink.

use std::collections::{BTreeMap, HashSet, VecDeque};
use tracing::debug;

use super::{
    ClipChange, ClipField, CursorTrackChange, DeviceChange, EventSink, ProjectChange,
    RemoteControlsChange, Session, SessionEvent, SessionRequest, Topic, TrackBankChange,
    TrackField, TransportChange,
};
use crate::config::{SessionConfig, ViewConfig};

const PAGE_NAMES: [&str; 4] = ["Main", "Envelope", "Filter", "Modulation"];
const DEFAULT_VOLUME: f64 = 0.8;
const HISTORY_LIMIT: usize = 64;

#[derive(Debug, Clone, PartialEq)]
struct RemotePage {
    name: String,
    values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
struct LocalDevice {
    name: String,
    page: usize,
    pages: Vec<RemotePage>,
}

impl LocalDevice {
    fn new(name: &str, params: usize) -> Self {
        Self {
            name: name.to_string(),
            page: 0,
            pages: PAGE_NAMES
                .iter()
                .map(|page| RemotePage {
                    name: page.to_string(),
                    values: vec![0.0; params],
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct LocalClip {
    playing: bool,
    recording: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct LocalTrack {
    name: String,
    kind: String,
    mute: bool,
    solo: bool,
    arm: bool,
    volume: f64,
    devices: Vec<LocalDevice>,
    cursor_device: Option<usize>,
    /// Scene index -> clip; a missing entry is an empty slot
    clips: BTreeMap<usize, LocalClip>,
}

#[derive(Debug, Clone, PartialEq)]
struct Model {
    project_name: String,
    playing: bool,
    recording: bool,
    tracks: Vec<LocalTrack>,
    cursor_track: Option<usize>,
    scroll: usize,
}

impl Model {
    fn seed(config: &SessionConfig, params: usize) -> Self {
        let tracks: Vec<LocalTrack> = config
            .tracks
            .iter()
            .map(|seed| LocalTrack {
                name: seed.name.clone(),
                kind: seed.kind.clone(),
                mute: false,
                solo: false,
                arm: false,
                volume: DEFAULT_VOLUME,
                devices: seed
                    .devices
                    .iter()
                    .map(|name| LocalDevice::new(name, params))
                    .collect(),
                cursor_device: (!seed.devices.is_empty()).then_some(0),
                clips: seed
                    .clips
                    .iter()
                    .map(|scene| (*scene, LocalClip::default()))
                    .collect(),
            })
            .collect();

        Self {
            project_name: config.project_name.clone(),
            playing: false,
            recording: false,
            cursor_track: (!tracks.is_empty()).then_some(0),
            tracks,
            scroll: 0,
        }
    }

    fn cursor_track(&self) -> Option<&LocalTrack> {
        self.cursor_track.and_then(|i| self.tracks.get(i))
    }

    fn cursor_device(&self) -> Option<&LocalDevice> {
        let track = self.cursor_track()?;
        track.cursor_device.and_then(|i| track.devices.get(i))
    }

    fn cursor_device_mut(&mut self) -> Option<&mut LocalDevice> {
        let track = self.tracks.get_mut(self.cursor_track?)?;
        let index = track.cursor_device?;
        track.devices.get_mut(index)
    }
}

/// Stand-alone [`Session`] backed by an in-memory model
pub struct LocalSession {
    view: ViewConfig,
    model: Model,
    history: VecDeque<Model>,
    interested: HashSet<Topic>,
    sink: EventSink,
}

impl LocalSession {
    pub fn new(config: &SessionConfig, view: ViewConfig, sink: EventSink) -> Self {
        Self {
            model: Model::seed(config, view.remote_control_count),
            view,
            history: VecDeque::new(),
            interested: HashSet::new(),
            sink,
        }
    }

    pub fn track_count(&self) -> usize {
        self.model.tracks.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    /// Observable value of every field the gateway can observe, in a fixed order
    fn view_events(&self) -> Vec<SessionEvent> {
        let model = &self.model;
        let mut events = Vec::new();

        events.push(SessionEvent::Project(ProjectChange::Name(
            model.project_name.clone(),
        )));
        events.push(SessionEvent::Transport(TransportChange::Playing(model.playing)));
        events.push(SessionEvent::Transport(TransportChange::Recording(
            model.recording,
        )));

        let track = model.cursor_track();
        events.push(SessionEvent::CursorTrack(CursorTrackChange::Position(
            index_or_unknown(model.cursor_track),
        )));
        events.push(SessionEvent::CursorTrack(CursorTrackChange::Name(
            track.map(|t| t.name.clone()).unwrap_or_default(),
        )));

        let device = model.cursor_device();
        events.push(SessionEvent::Device(DeviceChange::Name(
            device.map(|d| d.name.clone()).unwrap_or_default(),
        )));
        events.push(SessionEvent::Device(DeviceChange::Position(
            index_or_unknown(track.and_then(|t| t.cursor_device)),
        )));

        let page = device.and_then(|d| d.pages.get(d.page));
        events.push(SessionEvent::RemoteControls(RemoteControlsChange::PageName(
            page.map(|p| p.name.clone()).unwrap_or_default(),
        )));
        events.push(SessionEvent::RemoteControls(RemoteControlsChange::PageIndex(
            index_or_unknown(device.map(|d| d.page)),
        )));
        events.push(SessionEvent::RemoteControls(RemoteControlsChange::PageCount(
            device.map_or(0, |d| d.pages.len() as i32),
        )));
        for index in 0..self.view.remote_control_count {
            let name = page
                .map(|p| format!("{} {}", p.name, index + 1))
                .unwrap_or_default();
            let value = page
                .and_then(|p| p.values.get(index).copied())
                .unwrap_or(0.0);
            events.push(SessionEvent::RemoteControls(
                RemoteControlsChange::ParamName { index, name },
            ));
            events.push(SessionEvent::RemoteControls(
                RemoteControlsChange::ParamValue { index, value },
            ));
        }

        events.push(SessionEvent::TrackBank(TrackBankChange::Scroll(
            model.scroll as i32,
        )));
        for slot in 0..self.view.bank_size {
            let position = model.scroll + slot;
            let track = model.tracks.get(position);
            let fields = [
                TrackField::Name(track.map(|t| t.name.clone()).unwrap_or_default()),
                TrackField::Position(index_or_unknown(track.map(|_| position))),
                TrackField::Kind(track.map(|t| t.kind.clone()).unwrap_or_default()),
                TrackField::Mute(track.is_some_and(|t| t.mute)),
                TrackField::Solo(track.is_some_and(|t| t.solo)),
                TrackField::Arm(track.is_some_and(|t| t.arm)),
                TrackField::Volume(track.map_or(0.0, |t| t.volume)),
            ];
            for field in fields {
                events.push(SessionEvent::TrackBank(TrackBankChange::Track {
                    index: slot,
                    field,
                }));
            }
        }

        for slot in 0..self.view.bank_size {
            let track = model.tracks.get(model.scroll + slot);
            for scene in 0..self.view.scene_count {
                let clip = track.and_then(|t| t.clips.get(&scene));
                let fields = [
                    ClipField::HasContent(clip.is_some()),
                    ClipField::Playing(clip.is_some_and(|c| c.playing)),
                    ClipField::Recording(clip.is_some_and(|c| c.recording)),
                ];
                for field in fields {
                    events.push(SessionEvent::Clip(ClipChange {
                        track: slot,
                        scene,
                        field,
                    }));
                }
            }
        }

        events
    }

    /// Emit every interested field whose value differs from `before`
    fn emit_changes(&self, before: Vec<SessionEvent>) {
        for (old, new) in before.into_iter().zip(self.view_events()) {
            if old != new && self.interested.contains(&new.topic()) {
                (self.sink)(new);
            }
        }
    }

    /// Apply a request to the model; returns whether it belongs in undo history
    fn mutate(&mut self, request: SessionRequest) -> bool {
        let bank_size = self.view.bank_size;
        let model = &mut self.model;

        match request {
            SessionRequest::Play => {
                model.playing = true;
                false
            }
            SessionRequest::Stop => {
                model.playing = false;
                false
            }
            SessionRequest::Record => {
                model.recording = !model.recording;
                false
            }
            SessionRequest::SelectTrack(index) => {
                if let Some(index) = clamp_index(index, model.tracks.len()) {
                    model.cursor_track = Some(index);
                    if index < model.scroll {
                        model.scroll = index;
                    } else if index >= model.scroll + bank_size {
                        model.scroll = index + 1 - bank_size;
                    }
                }
                true
            }
            SessionRequest::SelectDevice(index) => {
                if let Some(track) = model.cursor_track.and_then(|i| model.tracks.get_mut(i)) {
                    if let Some(index) = clamp_index(index, track.devices.len()) {
                        track.cursor_device = Some(index);
                    }
                }
                true
            }
            SessionRequest::NextRemotePage => {
                if let Some(device) = model.cursor_device_mut() {
                    device.page = (device.page + 1).min(device.pages.len().saturating_sub(1));
                }
                true
            }
            SessionRequest::PrevRemotePage => {
                if let Some(device) = model.cursor_device_mut() {
                    device.page = device.page.saturating_sub(1);
                }
                true
            }
            SessionRequest::SelectRemotePage(page) => {
                if let Some(device) = model.cursor_device_mut() {
                    if let Ok(page) = usize::try_from(page) {
                        if page < device.pages.len() {
                            device.page = page;
                        }
                    }
                }
                true
            }
            SessionRequest::SetRemoteControl { index, value } => {
                if let Some(device) = model.cursor_device_mut() {
                    let page = device.page;
                    if let Some(slot) = device.pages[page].values.get_mut(index) {
                        *slot = value.clamp(0.0, 1.0);
                    }
                }
                true
            }
            SessionRequest::ScrollTrackBank(position) => {
                let last = model.tracks.len().saturating_sub(1);
                model.scroll = usize::try_from(position.max(0)).unwrap_or(0).min(last);
                true
            }
            SessionRequest::LaunchClip { track, scene } => {
                let track = model.scroll + track;
                launch(model, track, scene);
                false
            }
            SessionRequest::CreateClip {
                track,
                scene,
                length_beats,
            } => {
                if let Some(track) = model.tracks.get_mut(model.scroll + track) {
                    if !track.clips.contains_key(&scene) {
                        debug!(track = %track.name, scene, length_beats, "Creating clip");
                        track.clips.insert(scene, LocalClip::default());
                    }
                }
                true
            }
            SessionRequest::LaunchScene(scene) => {
                let first = model.scroll;
                for track in first..first + bank_size {
                    launch(model, track, scene);
                }
                false
            }
            SessionRequest::Undo => false,
        }
    }

    /// Restore the previous model, leaving transport and launch state as they are now
    fn undo(&mut self) {
        let Some(mut previous) = self.history.pop_back() else {
            debug!("Nothing to undo");
            return;
        };
        previous.playing = self.model.playing;
        previous.recording = self.model.recording;
        for (index, track) in previous.tracks.iter_mut().enumerate() {
            let current = self.model.tracks.get(index);
            for (scene, clip) in track.clips.iter_mut() {
                let now = current.and_then(|t| t.clips.get(scene));
                clip.playing = now.is_some_and(|c| c.playing);
                clip.recording = now.is_some_and(|c| c.recording);
            }
        }
        self.model = previous;
    }
}

impl Session for LocalSession {
    fn mark_interested(&mut self, topic: Topic) {
        self.interested.insert(topic);
    }

    fn request(&mut self, request: SessionRequest) {
        debug!(?request, "Session request");
        let before = self.view_events();

        if request == SessionRequest::Undo {
            self.undo();
        } else {
            let checkpoint = self.model.clone();
            if self.mutate(request) && self.model != checkpoint {
                if self.history.len() == HISTORY_LIMIT {
                    self.history.pop_front();
                }
                self.history.push_back(checkpoint);
            }
        }

        self.emit_changes(before);
    }

    fn publish_all(&mut self) {
        for event in self.view_events() {
            if self.interested.contains(&event.topic()) {
                (self.sink)(event);
            }
        }
    }
}

fn launch(model: &mut Model, track: usize, scene: usize) {
    let Some(track) = model.tracks.get_mut(track) else {
        return;
    };
    if !track.clips.contains_key(&scene) {
        return;
    }
    for (index, clip) in track.clips.iter_mut() {
        clip.playing = *index == scene;
    }
}

fn clamp_index(index: i32, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(usize::try_from(index.max(0)).unwrap_or(0).min(len - 1))
}

fn index_or_unknown(index: Option<usize>) -> i32 {
    index.map_or(-1, |i| i as i32)
}
