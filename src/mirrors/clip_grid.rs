use rosc::{OscMessage, OscType};

use super::SnapshotProvider;
use crate::clients::Outbound;
use crate::osc;
use crate::session::{ClipChange, ClipField, Session, Topic};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClipCell {
    pub has_content: bool,
    pub playing: bool,
    pub recording: bool,
}

/// Mirrors the bank-by-scene clip launcher grid
///
/// Cells are stored track-major; the snapshot walks them in the same order.
#[derive(Debug)]
pub struct ClipGridMirror {
    tracks: usize,
    scenes: usize,
    cells: Vec<ClipCell>,
}

impl ClipGridMirror {
    pub fn new(session: &mut dyn Session, tracks: usize, scenes: usize) -> Self {
        for track in 0..tracks {
            session.mark_interested(Topic::ClipHasContent(track));
            session.mark_interested(Topic::ClipPlaying(track));
            session.mark_interested(Topic::ClipRecording(track));
        }

        Self {
            tracks,
            scenes,
            cells: vec![ClipCell::default(); tracks * scenes],
        }
    }

    pub fn cell(&self, track: usize, scene: usize) -> Option<&ClipCell> {
        self.offset(track, scene).map(|i| &self.cells[i])
    }

    pub fn apply(&mut self, change: ClipChange, out: &dyn Outbound) {
        let Some(offset) = self.offset(change.track, change.scene) else {
            return;
        };
        let cell = &mut self.cells[offset];
        match change.field {
            ClipField::HasContent(v) => cell.has_content = v,
            ClipField::Playing(v) => cell.playing = v,
            ClipField::Recording(v) => cell.recording = v,
        }
        out.emit(&self.message(change.track, change.scene));
    }

    fn offset(&self, track: usize, scene: usize) -> Option<usize> {
        (track < self.tracks && scene < self.scenes).then(|| track * self.scenes + scene)
    }

    fn message(&self, track: usize, scene: usize) -> OscMessage {
        let cell = &self.cells[track * self.scenes + scene];
        osc::message(
            osc::addr::CLIP,
            vec![
                OscType::Int(track as i32),
                OscType::Int(scene as i32),
                osc::flag(cell.has_content),
                osc::flag(cell.playing),
                osc::flag(cell.recording),
            ],
        )
    }
}

impl SnapshotProvider for ClipGridMirror {
    fn send_snapshot(&self, to: &dyn Outbound) {
        for track in 0..self.tracks {
            for scene in 0..self.scenes {
                to.emit(&self.message(track, scene));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mirrors::testing::{Collect, InterestLog};

    fn change(track: usize, scene: usize, field: ClipField) -> ClipChange {
        ClipChange { track, scene, field }
    }

    #[test]
    fn test_playing_resends_content_flag() {
        let mut mirror = ClipGridMirror::new(&mut InterestLog::default(), 8, 8);
        let out = Collect::default();

        mirror.apply(change(1, 2, ClipField::HasContent(true)), &out);
        mirror.apply(change(1, 2, ClipField::Playing(true)), &out);

        let messages = out.take();
        assert_eq!(
            messages[1].args,
            vec![
                OscType::Int(1),
                OscType::Int(2),
                OscType::Int(1),
                OscType::Int(1),
                OscType::Int(0)
            ]
        );
        assert!(mirror.cell(1, 2).unwrap().playing);
    }

    #[test]
    fn test_scene_out_of_range_ignored() {
        let mut mirror = ClipGridMirror::new(&mut InterestLog::default(), 8, 8);
        let out = Collect::default();

        mirror.apply(change(0, 8, ClipField::Playing(true)), &out);
        mirror.apply(change(8, 0, ClipField::Playing(true)), &out);

        assert!(out.take().is_empty());
        assert!(mirror.cell(0, 8).is_none());
    }

    #[test]
    fn test_snapshot_is_track_major() {
        let mirror = ClipGridMirror::new(&mut InterestLog::default(), 2, 3);
        let out = Collect::default();
        mirror.send_snapshot(&out);

        let coords: Vec<(OscType, OscType)> = out
            .take()
            .into_iter()
            .map(|m| (m.args[0].clone(), m.args[1].clone()))
            .collect();
        assert_eq!(coords.len(), 6);
        assert_eq!(coords[0], (OscType::Int(0), OscType::Int(0)));
        assert_eq!(coords[2], (OscType::Int(0), OscType::Int(2)));
        assert_eq!(coords[3], (OscType::Int(1), OscType::Int(0)));
    }
}
