use rosc::{OscMessage, OscType};

use super::SnapshotProvider;
use crate::clients::Outbound;
use crate::osc;
use crate::session::{CursorTrackChange, Session, Topic};

/// Mirrors the selected track: `/state/cursor_track <index> <name>`
#[derive(Debug)]
pub struct CursorTrackMirror {
    index: i32,
    name: String,
}

impl CursorTrackMirror {
    pub fn new(session: &mut dyn Session) -> Self {
        session.mark_interested(Topic::CursorTrackName);
        session.mark_interested(Topic::CursorTrackPosition);
        Self {
            index: -1,
            name: String::new(),
        }
    }

    pub fn apply(&mut self, change: CursorTrackChange, out: &dyn Outbound) {
        match change {
            CursorTrackChange::Position(index) => self.index = index,
            CursorTrackChange::Name(name) => self.name = name,
        }
        out.emit(&self.message());
    }

    fn message(&self) -> OscMessage {
        osc::message(
            osc::addr::CURSOR_TRACK,
            vec![OscType::Int(self.index), OscType::String(self.name.clone())],
        )
    }
}

impl SnapshotProvider for CursorTrackMirror {
    fn send_snapshot(&self, to: &dyn Outbound) {
        to.emit(&self.message());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mirrors::testing::{Collect, InterestLog};

    #[test]
    fn test_name_change_keeps_index() {
        let mut mirror = CursorTrackMirror::new(&mut InterestLog::default());
        let out = Collect::default();

        mirror.apply(CursorTrackChange::Position(2), &out);
        mirror.apply(CursorTrackChange::Name("Bass".into()), &out);

        let messages = out.take();
        assert_eq!(messages[0].args, vec![OscType::Int(2), OscType::String(String::new())]);
        assert_eq!(messages[1].args, vec![OscType::Int(2), OscType::String("Bass".into())]);
    }

    #[test]
    fn test_unknown_defaults() {
        let mirror = CursorTrackMirror::new(&mut InterestLog::default());
        let out = Collect::default();
        mirror.send_snapshot(&out);
        assert_eq!(out.take()[0].args, vec![OscType::Int(-1), OscType::String(String::new())]);
    }
}
