use rosc::{OscMessage, OscType};

use super::SnapshotProvider;
use crate::clients::Outbound;
use crate::osc;
use crate::session::{ProjectChange, Session, Topic};

/// Mirrors the project name
#[derive(Debug, Default)]
pub struct ProjectMirror {
    name: String,
}

impl ProjectMirror {
    pub fn new(session: &mut dyn Session) -> Self {
        session.mark_interested(Topic::ProjectName);
        Self::default()
    }

    pub fn apply(&mut self, change: ProjectChange, out: &dyn Outbound) {
        match change {
            ProjectChange::Name(name) => self.name = name,
        }
        out.emit(&self.message());
    }

    fn message(&self) -> OscMessage {
        osc::message(osc::addr::PROJECT, vec![OscType::String(self.name.clone())])
    }
}

impl SnapshotProvider for ProjectMirror {
    fn send_snapshot(&self, to: &dyn Outbound) {
        to.emit(&self.message());
    }
}
