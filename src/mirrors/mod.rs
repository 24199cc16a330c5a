//! State mirrors - one per observed domain
//!
//! Every mirror follows the same pattern:
//! 1. on construction it marks each field it needs as interesting on the session;
//! 2. on a change notification it updates its cache and re-emits the *whole*
//!    record for the affected entity (never a per-field delta);
//! 3. `send_snapshot` emits every record, defaults included, in the same shape
//!    as the live path.
//!
//! Indices outside the configured view window are ignored.

mod clip_grid;
mod cursor_track;
mod device;
mod project;
mod remote_controls;
mod track_bank;
mod transport;

pub use clip_grid::{ClipCell, ClipGridMirror};
pub use cursor_track::CursorTrackMirror;
pub use device::DeviceMirror;
pub use project::ProjectMirror;
pub use remote_controls::{RemoteControlsMirror, RemoteParam};
pub use track_bank::{TrackBankMirror, TrackRecord};
pub use transport::{TransportMirror, TransportState};

use crate::clients::Outbound;
use crate::config::ViewConfig;
use crate::session::{Session, SessionEvent};

/// A mirror that can replay its full cached state to one client
pub trait SnapshotProvider {
    fn send_snapshot(&self, to: &dyn Outbound);
}

/// All mirrors of one gateway instance
pub struct Mirrors {
    pub project: ProjectMirror,
    pub transport: TransportMirror,
    pub cursor_track: CursorTrackMirror,
    pub device: DeviceMirror,
    pub remote_controls: RemoteControlsMirror,
    pub track_bank: TrackBankMirror,
    pub clip_grid: ClipGridMirror,
}

impl Mirrors {
    /// Build every mirror, marking its fields interesting on `session`
    pub fn new(view: &ViewConfig, session: &mut dyn Session) -> Self {
        Self {
            project: ProjectMirror::new(session),
            transport: TransportMirror::new(session),
            cursor_track: CursorTrackMirror::new(session),
            device: DeviceMirror::new(session),
            remote_controls: RemoteControlsMirror::new(session, view.remote_control_count),
            track_bank: TrackBankMirror::new(session, view.bank_size),
            clip_grid: ClipGridMirror::new(session, view.bank_size, view.scene_count),
        }
    }

    /// Route one notification to the mirror that owns it
    pub fn apply(&mut self, event: SessionEvent, out: &dyn Outbound) {
        match event {
            SessionEvent::Project(change) => self.project.apply(change, out),
            SessionEvent::Transport(change) => self.transport.apply(change, out),
            SessionEvent::CursorTrack(change) => self.cursor_track.apply(change, out),
            SessionEvent::Device(change) => self.device.apply(change, out),
            SessionEvent::RemoteControls(change) => self.remote_controls.apply(change, out),
            SessionEvent::TrackBank(change) => self.track_bank.apply(change, out),
            SessionEvent::Clip(change) => self.clip_grid.apply(change, out),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::clients::Outbound;
    use crate::session::{Session, SessionRequest, Topic};
    use parking_lot::Mutex;
    use rosc::OscMessage;
    use std::collections::HashSet;

    /// Session stub that only records interest
    #[derive(Default)]
    pub struct InterestLog {
        pub topics: HashSet<Topic>,
        pub requests: Vec<SessionRequest>,
    }

    impl Session for InterestLog {
        fn mark_interested(&mut self, topic: Topic) {
            self.topics.insert(topic);
        }

        fn request(&mut self, request: SessionRequest) {
            self.requests.push(request);
        }
    }

    /// Outbound that collects emitted messages
    #[derive(Default)]
    pub struct Collect {
        messages: Mutex<Vec<OscMessage>>,
    }

    impl Collect {
        pub fn take(&self) -> Vec<OscMessage> {
            std::mem::take(&mut *self.messages.lock())
        }
    }

    impl Outbound for Collect {
        fn emit(&self, msg: &OscMessage) {
            self.messages.lock().push(msg.clone());
        }
    }
}
