//! Session model boundary
//!
//! The session (the host's object model) owns the authoritative state. The
//! gateway only marks fields as interesting, receives change notifications as
//! [`SessionEvent`]s through an [`EventSink`], and forwards client requests as
//! [`SessionRequest`]s. Requests never broadcast directly: any visible effect
//! comes back as a notification and flows through the mirrors.

mod events;
pub mod local;

use std::sync::Arc;

pub use events::{
    ClipChange, ClipField, CursorTrackChange, DeviceChange, ProjectChange, RemoteControlsChange,
    SessionEvent, Topic, TrackBankChange, TrackField, TransportChange,
};
pub use local::LocalSession;

/// Callback through which a session delivers change notifications
///
/// The hub's sink enqueues onto the hub command queue, so notifications are
/// applied on the hub task no matter which thread the session emits from.
pub type EventSink = Arc<dyn Fn(SessionEvent) + Send + Sync>;

/// Mutations a client may ask the session to perform
#[derive(Debug, Clone, PartialEq)]
pub enum SessionRequest {
    Play,
    Stop,
    Record,
    SelectTrack(i32),
    SelectDevice(i32),
    NextRemotePage,
    PrevRemotePage,
    SelectRemotePage(i32),
    SetRemoteControl { index: usize, value: f64 },
    ScrollTrackBank(i32),
    /// `track` is a bank slot, not an absolute track index
    LaunchClip { track: usize, scene: usize },
    CreateClip { track: usize, scene: usize, length_beats: u32 },
    LaunchScene(usize),
    Undo,
}

/// Session model boundary consumed by the hub
pub trait Session: Send {
    /// Mark a field as observed; only observed fields produce notifications
    fn mark_interested(&mut self, topic: Topic);

    /// Perform a client request against the session
    fn request(&mut self, request: SessionRequest);

    /// Deliver the current value of every observed field
    ///
    /// Called once after all mirrors are wired. Default: no-op (sessions that
    /// push initial values on their own).
    fn publish_all(&mut self) {}
}
