//! Change notifications and observable topics

/// One field-level change reported by the session
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Project(ProjectChange),
    Transport(TransportChange),
    CursorTrack(CursorTrackChange),
    Device(DeviceChange),
    RemoteControls(RemoteControlsChange),
    TrackBank(TrackBankChange),
    Clip(ClipChange),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProjectChange {
    Name(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportChange {
    Playing(bool),
    Recording(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub enum CursorTrackChange {
    Position(i32),
    Name(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeviceChange {
    Name(String),
    Position(i32),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RemoteControlsChange {
    PageName(String),
    PageIndex(i32),
    PageCount(i32),
    ParamName { index: usize, name: String },
    ParamValue { index: usize, value: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrackBankChange {
    Scroll(i32),
    /// `index` is the bank slot
    Track { index: usize, field: TrackField },
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrackField {
    Name(String),
    Position(i32),
    Kind(String),
    Mute(bool),
    Solo(bool),
    Arm(bool),
    Volume(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipChange {
    pub track: usize,
    pub scene: usize,
    pub field: ClipField,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipField {
    HasContent(bool),
    Playing(bool),
    Recording(bool),
}

/// An observable field, as marked interesting by the mirrors
///
/// Per-track and per-parameter topics carry the bank slot / parameter index.
/// Clip topics are per track: one observer covers that track's whole
/// slot bank, as in the host's slot-bank observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    ProjectName,
    TransportPlaying,
    TransportRecording,
    CursorTrackPosition,
    CursorTrackName,
    DeviceName,
    DevicePosition,
    RemotePageName,
    RemotePageIndex,
    RemotePageCount,
    RemoteParamName(usize),
    RemoteParamValue(usize),
    TrackBankScroll,
    TrackName(usize),
    TrackPosition(usize),
    TrackKind(usize),
    TrackMute(usize),
    TrackSolo(usize),
    TrackArm(usize),
    TrackVolume(usize),
    ClipHasContent(usize),
    ClipPlaying(usize),
    ClipRecording(usize),
}

impl SessionEvent {
    /// The topic this notification belongs to
    pub fn topic(&self) -> Topic {
        match self {
            SessionEvent::Project(ProjectChange::Name(_)) => Topic::ProjectName,
            SessionEvent::Transport(TransportChange::Playing(_)) => Topic::TransportPlaying,
            SessionEvent::Transport(TransportChange::Recording(_)) => Topic::TransportRecording,
            SessionEvent::CursorTrack(CursorTrackChange::Position(_)) => Topic::CursorTrackPosition,
            SessionEvent::CursorTrack(CursorTrackChange::Name(_)) => Topic::CursorTrackName,
            SessionEvent::Device(DeviceChange::Name(_)) => Topic::DeviceName,
            SessionEvent::Device(DeviceChange::Position(_)) => Topic::DevicePosition,
            SessionEvent::RemoteControls(change) => match change {
                RemoteControlsChange::PageName(_) => Topic::RemotePageName,
                RemoteControlsChange::PageIndex(_) => Topic::RemotePageIndex,
                RemoteControlsChange::PageCount(_) => Topic::RemotePageCount,
                RemoteControlsChange::ParamName { index, .. } => Topic::RemoteParamName(*index),
                RemoteControlsChange::ParamValue { index, .. } => Topic::RemoteParamValue(*index),
            },
            SessionEvent::TrackBank(TrackBankChange::Scroll(_)) => Topic::TrackBankScroll,
            SessionEvent::TrackBank(TrackBankChange::Track { index, field }) => {
                let index = *index;
                match field {
                    TrackField::Name(_) => Topic::TrackName(index),
                    TrackField::Position(_) => Topic::TrackPosition(index),
                    TrackField::Kind(_) => Topic::TrackKind(index),
                    TrackField::Mute(_) => Topic::TrackMute(index),
                    TrackField::Solo(_) => Topic::TrackSolo(index),
                    TrackField::Arm(_) => Topic::TrackArm(index),
                    TrackField::Volume(_) => Topic::TrackVolume(index),
                }
            }
            SessionEvent::Clip(change) => match change.field {
                ClipField::HasContent(_) => Topic::ClipHasContent(change.track),
                ClipField::Playing(_) => Topic::ClipPlaying(change.track),
                ClipField::Recording(_) => Topic::ClipRecording(change.track),
            },
        }
    }
}
