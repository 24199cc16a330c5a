//! Transport mirror: two host booleans folded into one label

use rosc::{OscMessage, OscType};

use super::SnapshotProvider;
use crate::clients::Outbound;
use crate::osc;
use crate::session::{Session, Topic, TransportChange};

/// Label broadcast on `/state/transport`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    Stopped,
    Playing,
    Recording,
}

impl TransportState {
    /// Recording only counts while the transport is actually running
    pub fn derive(playing: bool, recording: bool) -> Self {
        match (playing, recording) {
            (true, true) => TransportState::Recording,
            (true, false) => TransportState::Playing,
            _ => TransportState::Stopped,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransportState::Stopped => "stopped",
            TransportState::Playing => "playing",
            TransportState::Recording => "recording",
        }
    }
}

#[derive(Debug, Default)]
pub struct TransportMirror {
    playing: bool,
    recording: bool,
}

impl TransportMirror {
    pub fn new(session: &mut dyn Session) -> Self {
        session.mark_interested(Topic::TransportPlaying);
        session.mark_interested(Topic::TransportRecording);
        Self::default()
    }

    pub fn state(&self) -> TransportState {
        TransportState::derive(self.playing, self.recording)
    }

    /// Every notification re-emits the label, even when it did not change
    pub fn apply(&mut self, change: TransportChange, out: &dyn Outbound) {
        match change {
            TransportChange::Playing(playing) => self.playing = playing,
            TransportChange::Recording(recording) => self.recording = recording,
        }
        out.emit(&self.message());
    }

    fn message(&self) -> OscMessage {
        osc::message(
            osc::addr::TRANSPORT,
            vec![OscType::String(self.state().as_str().to_string())],
        )
    }
}

impl SnapshotProvider for TransportMirror {
    fn send_snapshot(&self, to: &dyn Outbound) {
        to.emit(&self.message());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mirrors::testing::{Collect, InterestLog};

    fn label(messages: &[OscMessage]) -> Vec<OscType> {
        messages.iter().flat_map(|m| m.args.clone()).collect()
    }

    #[test]
    fn test_derive() {
        assert_eq!(TransportState::derive(false, false), TransportState::Stopped);
        assert_eq!(TransportState::derive(true, false), TransportState::Playing);
        assert_eq!(TransportState::derive(true, true), TransportState::Recording);
        assert_eq!(TransportState::derive(false, true), TransportState::Stopped);
    }

    #[test]
    fn test_marks_both_flags() {
        let mut session = InterestLog::default();
        TransportMirror::new(&mut session);
        assert!(session.topics.contains(&Topic::TransportPlaying));
        assert!(session.topics.contains(&Topic::TransportRecording));
    }

    #[test]
    fn test_default_snapshot_is_stopped() {
        let mirror = TransportMirror::new(&mut InterestLog::default());
        let out = Collect::default();
        mirror.send_snapshot(&out);
        let messages = out.take();
        assert_eq!(messages[0].addr, "/state/transport");
        assert_eq!(label(&messages), vec![OscType::String("stopped".into())]);
    }

    #[test]
    fn test_record_while_stopped_then_play() {
        let mut mirror = TransportMirror::new(&mut InterestLog::default());
        let out = Collect::default();

        mirror.apply(TransportChange::Recording(true), &out);
        mirror.apply(TransportChange::Playing(true), &out);
        mirror.apply(TransportChange::Playing(false), &out);

        assert_eq!(
            label(&out.take()),
            vec![
                OscType::String("stopped".into()),
                OscType::String("recording".into()),
                OscType::String("stopped".into()),
            ]
        );
    }
}
