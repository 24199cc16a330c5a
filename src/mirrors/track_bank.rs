//! Track bank mirror
//!
//! Caches one record per bank slot plus the bank scroll position. A change to
//! any track field re-emits the full `/state/track` record for that slot.

use rosc::{OscMessage, OscType};

use super::SnapshotProvider;
use crate::clients::Outbound;
use crate::osc;
use crate::session::{Session, Topic, TrackBankChange, TrackField};

/// Cached state of one bank slot
#[derive(Debug, Clone, PartialEq)]
pub struct TrackRecord {
    pub name: String,
    pub position: i32,
    pub kind: String,
    pub mute: bool,
    pub solo: bool,
    pub arm: bool,
    pub volume: f64,
}

impl Default for TrackRecord {
    fn default() -> Self {
        Self {
            name: String::new(),
            position: -1,
            kind: String::new(),
            mute: false,
            solo: false,
            arm: false,
            volume: 0.0,
        }
    }
}

impl TrackRecord {
    fn update(&mut self, field: TrackField) {
        match field {
            TrackField::Name(name) => self.name = name,
            TrackField::Position(position) => self.position = position,
            TrackField::Kind(kind) => self.kind = kind,
            TrackField::Mute(mute) => self.mute = mute,
            TrackField::Solo(solo) => self.solo = solo,
            TrackField::Arm(arm) => self.arm = arm,
            TrackField::Volume(volume) => self.volume = volume,
        }
    }
}

#[derive(Debug)]
pub struct TrackBankMirror {
    scroll: i32,
    tracks: Vec<TrackRecord>,
}

impl TrackBankMirror {
    pub fn new(session: &mut dyn Session, bank_size: usize) -> Self {
        session.mark_interested(Topic::TrackBankScroll);
        for index in 0..bank_size {
            session.mark_interested(Topic::TrackName(index));
            session.mark_interested(Topic::TrackPosition(index));
            session.mark_interested(Topic::TrackKind(index));
            session.mark_interested(Topic::TrackMute(index));
            session.mark_interested(Topic::TrackSolo(index));
            session.mark_interested(Topic::TrackArm(index));
            session.mark_interested(Topic::TrackVolume(index));
        }

        Self {
            scroll: -1,
            tracks: vec![TrackRecord::default(); bank_size],
        }
    }

    pub fn track(&self, index: usize) -> Option<&TrackRecord> {
        self.tracks.get(index)
    }

    pub fn apply(&mut self, change: TrackBankChange, out: &dyn Outbound) {
        match change {
            TrackBankChange::Scroll(scroll) => {
                self.scroll = scroll;
                out.emit(&self.bank_message());
            }
            TrackBankChange::Track { index, field } => {
                let Some(track) = self.tracks.get_mut(index) else {
                    return;
                };
                track.update(field);
                out.emit(&self.track_message(index));
            }
        }
    }

    fn bank_message(&self) -> OscMessage {
        osc::message(osc::addr::TRACK_BANK, vec![OscType::Int(self.scroll)])
    }

    fn track_message(&self, index: usize) -> OscMessage {
        let track = &self.tracks[index];
        osc::message(
            osc::addr::TRACK,
            vec![
                OscType::Int(index as i32),
                OscType::String(track.name.clone()),
                OscType::Int(track.position),
                OscType::String(track.kind.clone()),
                osc::flag(track.mute),
                osc::flag(track.solo),
                osc::flag(track.arm),
                OscType::Float(track.volume as f32),
            ],
        )
    }
}

impl SnapshotProvider for TrackBankMirror {
    fn send_snapshot(&self, to: &dyn Outbound) {
        to.emit(&self.bank_message());
        for index in 0..self.tracks.len() {
            to.emit(&self.track_message(index));
        }
    }
}
