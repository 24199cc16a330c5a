use rosc::{OscMessage, OscType};

use super::SnapshotProvider;
use crate::clients::Outbound;
use crate::osc;
use crate::session::{DeviceChange, Session, Topic};

/// Mirrors the cursor device: `/state/device <name> <index>`
#[derive(Debug)]
pub struct DeviceMirror {
    name: String,
    index: i32,
}

impl DeviceMirror {
    pub fn new(session: &mut dyn Session) -> Self {
        session.mark_interested(Topic::DeviceName);
        session.mark_interested(Topic::DevicePosition);
        Self {
            name: String::new(),
            index: -1,
        }
    }

    pub fn apply(&mut self, change: DeviceChange, out: &dyn Outbound) {
        match change {
            DeviceChange::Name(name) => self.name = name,
            DeviceChange::Position(index) => self.index = index,
        }
        out.emit(&self.message());
    }

    fn message(&self) -> OscMessage {
        osc::message(
            osc::addr::DEVICE,
            vec![OscType::String(self.name.clone()), OscType::Int(self.index)],
        )
    }
}

impl SnapshotProvider for DeviceMirror {
    fn send_snapshot(&self, to: &dyn Outbound) {
        to.emit(&self.message());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mirrors::testing::{Collect, InterestLog};

    #[test]
    fn test_position_change_keeps_name() {
        let mut mirror = DeviceMirror::new(&mut InterestLog::default());
        let out = Collect::default();

        mirror.apply(DeviceChange::Name("Polysynth".into()), &out);
        mirror.apply(DeviceChange::Position(1), &out);

        let messages = out.take();
        assert_eq!(messages.len(), 2);
        assert_eq!(
            messages[1].args,
            vec![OscType::String("Polysynth".into()), OscType::Int(1)]
        );
    }
}
