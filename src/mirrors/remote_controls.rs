//! Remote-control page mirror
//!
//! One page header record plus one record per parameter slot. The number of
//! parameter slots is fixed by `view.remote_control_count`.

use rosc::{OscMessage, OscType};

use super::SnapshotProvider;
use crate::clients::Outbound;
use crate::osc;
use crate::session::{RemoteControlsChange, Session, Topic};

/// Cached state of one remote-control parameter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemoteParam {
    pub name: String,
    pub value: f64,
}

#[derive(Debug)]
pub struct RemoteControlsMirror {
    page_name: String,
    page_index: i32,
    page_count: i32,
    params: Vec<RemoteParam>,
}

impl RemoteControlsMirror {
    pub fn new(session: &mut dyn Session, count: usize) -> Self {
        session.mark_interested(Topic::RemotePageName);
        session.mark_interested(Topic::RemotePageIndex);
        session.mark_interested(Topic::RemotePageCount);
        for index in 0..count {
            session.mark_interested(Topic::RemoteParamName(index));
            session.mark_interested(Topic::RemoteParamValue(index));
        }

        Self {
            page_name: String::new(),
            page_index: -1,
            page_count: 0,
            params: vec![RemoteParam::default(); count],
        }
    }

    pub fn param(&self, index: usize) -> Option<&RemoteParam> {
        self.params.get(index)
    }

    pub fn apply(&mut self, change: RemoteControlsChange, out: &dyn Outbound) {
        match change {
            RemoteControlsChange::PageName(name) => {
                self.page_name = name;
                out.emit(&self.page_message());
            }
            RemoteControlsChange::PageIndex(index) => {
                self.page_index = index;
                out.emit(&self.page_message());
            }
            RemoteControlsChange::PageCount(count) => {
                self.page_count = count;
                out.emit(&self.page_message());
            }
            RemoteControlsChange::ParamName { index, name } => {
                if let Some(param) = self.params.get_mut(index) {
                    param.name = name;
                    out.emit(&self.param_message(index));
                }
            }
            RemoteControlsChange::ParamValue { index, value } => {
                if let Some(param) = self.params.get_mut(index) {
                    param.value = value;
                    out.emit(&self.param_message(index));
                }
            }
        }
    }

    fn page_message(&self) -> OscMessage {
        osc::message(
            osc::addr::REMOTE_CONTROL_PAGE,
            vec![
                OscType::String(self.page_name.clone()),
                OscType::Int(self.page_index),
                OscType::Int(self.page_count),
            ],
        )
    }

    fn param_message(&self, index: usize) -> OscMessage {
        let param = &self.params[index];
        osc::message(
            osc::addr::REMOTE_CONTROL_PARAM,
            vec![
                OscType::Int(index as i32),
                OscType::String(param.name.clone()),
                OscType::Float(param.value as f32),
            ],
        )
    }
}

impl SnapshotProvider for RemoteControlsMirror {
    fn send_snapshot(&self, to: &dyn Outbound) {
        to.emit(&self.page_message());
        for index in 0..self.params.len() {
            to.emit(&self.param_message(index));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mirrors::testing::{Collect, InterestLog};

    #[test]
    fn test_marks_every_param() {
        let mut session = InterestLog::default();
        RemoteControlsMirror::new(&mut session, 8);
        assert!(session.topics.contains(&Topic::RemoteParamValue(7)));
        assert!(!session.topics.contains(&Topic::RemoteParamValue(8)));
        assert_eq!(session.topics.len(), 3 + 2 * 8);
    }

    #[test]
    fn test_value_change_resends_name() {
        let mut mirror = RemoteControlsMirror::new(&mut InterestLog::default(), 8);
        let out = Collect::default();

        mirror.apply(
            RemoteControlsChange::ParamName {
                index: 2,
                name: "Cutoff".into(),
            },
            &out,
        );
        mirror.apply(RemoteControlsChange::ParamValue { index: 2, value: 0.25 }, &out);

        let messages = out.take();
        assert_eq!(
            messages[1].args,
            vec![
                OscType::Int(2),
                OscType::String("Cutoff".into()),
                OscType::Float(0.25)
            ]
        );
    }

    #[test]
    fn test_out_of_range_param_ignored() {
        let mut mirror = RemoteControlsMirror::new(&mut InterestLog::default(), 4);
        let out = Collect::default();

        mirror.apply(RemoteControlsChange::ParamValue { index: 4, value: 1.0 }, &out);

        assert!(out.take().is_empty());
        assert!(mirror.param(4).is_none());
    }

    #[test]
    fn test_page_header_carries_all_fields() {
        let mut mirror = RemoteControlsMirror::new(&mut InterestLog::default(), 2);
        let out = Collect::default();

        mirror.apply(RemoteControlsChange::PageName("Filter".into()), &out);
        mirror.apply(RemoteControlsChange::PageCount(4), &out);

        let last = out.take().pop().unwrap();
        assert_eq!(last.addr, "/state/remote_control/page");
        assert_eq!(
            last.args,
            vec![OscType::String("Filter".into()), OscType::Int(-1), OscType::Int(4)]
        );
    }

    #[test]
    fn test_snapshot_header_then_params() {
        let mirror = RemoteControlsMirror::new(&mut InterestLog::default(), 3);
        let out = Collect::default();
        mirror.send_snapshot(&out);

        let addrs: Vec<String> = out.take().into_iter().map(|m| m.addr).collect();
        assert_eq!(
            addrs,
            vec![
                "/state/remote_control/page",
                "/state/remote_control/param",
                "/state/remote_control/param",
                "/state/remote_control/param",
            ]
        );
    }
}
