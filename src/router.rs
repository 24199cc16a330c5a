//! Inbound OSC router
//!
//! Resolves one inbound message to a [`Route`]. Pure: no I/O, no state. The
//! hub decides what to do with the route; malformed or out-of-range requests
//! come back as a [`RouteError`] and are dropped there with a debug log.

use rosc::OscMessage;
use thiserror::Error;

use crate::clients::Slot;
use crate::config::ViewConfig;
use crate::osc;
use crate::session::SessionRequest;

/// Clip length used for `/clip/create`
pub const CREATED_CLIP_BEATS: u32 = 4;

/// What an inbound message asks for
#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    Connect(Slot),
    Disconnect(Slot),
    /// Report pool and active clients on the given slot's endpoint
    Status(Slot),
    Session(SessionRequest),
    MidiSend {
        channel: u8,
        status: u8,
        data1: u8,
        data2: u8,
    },
    SysexSend(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("unknown address {0}")]
    UnknownAddress(String),
    #[error("{addr}: missing or non-numeric argument {index}")]
    BadArgument { addr: String, index: usize },
    #[error("{addr}: argument {index} out of range ({value})")]
    OutOfRange {
        addr: String,
        index: usize,
        value: i64,
    },
}

/// Map an inbound message onto a route
pub fn route(msg: &OscMessage, view: &ViewConfig) -> Result<Route, RouteError> {
    let args = Args { msg };

    let route = match msg.addr.as_str() {
        "/connect" => Route::Connect(args.slot(0)?),
        "/disconnect" => Route::Disconnect(args.slot(0)?),
        "/status" => Route::Status(args.slot(0)?),

        "/transport/play" => Route::Session(SessionRequest::Play),
        "/transport/stop" => Route::Session(SessionRequest::Stop),
        "/transport/record" => Route::Session(SessionRequest::Record),

        "/track/select" => Route::Session(SessionRequest::SelectTrack(args.int(0)?)),
        "/device/select" => Route::Session(SessionRequest::SelectDevice(args.int(0)?)),
        "/track/bank/scroll" => Route::Session(SessionRequest::ScrollTrackBank(args.int(0)?)),

        "/remote_control/page/next" => Route::Session(SessionRequest::NextRemotePage),
        "/remote_control/page/prev" => Route::Session(SessionRequest::PrevRemotePage),
        "/remote_control/page/select" => {
            Route::Session(SessionRequest::SelectRemotePage(args.int(0)?))
        }
        "/remote_control/set" => {
            let index = args.index(0, view.remote_control_count)?;
            let value = osc::float_arg(&msg.args, 1).ok_or_else(|| args.bad(1))?;
            Route::Session(SessionRequest::SetRemoteControl { index, value })
        }

        "/clip/launch" => {
            let track = args.index(0, view.bank_size)?;
            let scene = args.index(1, view.scene_count)?;
            Route::Session(SessionRequest::LaunchClip { track, scene })
        }
        "/clip/create" => {
            let track = args.index(0, view.bank_size)?;
            let scene = args.index(1, view.scene_count)?;
            Route::Session(SessionRequest::CreateClip {
                track,
                scene,
                length_beats: CREATED_CLIP_BEATS,
            })
        }
        "/scene/launch" => Route::Session(SessionRequest::LaunchScene(
            args.index(0, view.scene_count)?,
        )),

        "/undo" => Route::Session(SessionRequest::Undo),

        "/midi/send" => Route::MidiSend {
            channel: args.byte(0)?,
            status: args.byte(1)?,
            data1: args.byte(2)?,
            data2: args.byte(3)?,
        },
        "/midi/sysex/send" => {
            let hex = osc::string_arg(&msg.args, 0).ok_or_else(|| args.bad(0))?;
            Route::SysexSend(hex.to_string())
        }

        other => return Err(RouteError::UnknownAddress(other.to_string())),
    };

    Ok(route)
}

/// Argument accessors that report failures against the message address
struct Args<'a> {
    msg: &'a OscMessage,
}

impl Args<'_> {
    fn bad(&self, index: usize) -> RouteError {
        RouteError::BadArgument {
            addr: self.msg.addr.clone(),
            index,
        }
    }

    fn out_of_range(&self, index: usize, value: i32) -> RouteError {
        RouteError::OutOfRange {
            addr: self.msg.addr.clone(),
            index,
            value: i64::from(value),
        }
    }

    fn int(&self, index: usize) -> Result<i32, RouteError> {
        osc::int_arg(&self.msg.args, index).ok_or_else(|| self.bad(index))
    }

    /// Integer in `0..limit`
    fn index(&self, index: usize, limit: usize) -> Result<usize, RouteError> {
        let value = self.int(index)?;
        usize::try_from(value)
            .ok()
            .filter(|v| *v < limit)
            .ok_or_else(|| self.out_of_range(index, value))
    }

    fn byte(&self, index: usize) -> Result<u8, RouteError> {
        let value = self.int(index)?;
        u8::try_from(value).map_err(|_| self.out_of_range(index, value))
    }

    fn slot(&self, index: usize) -> Result<Slot, RouteError> {
        let value = self.int(index)?;
        Slot::from_arg(value).ok_or_else(|| self.out_of_range(index, value))
    }
}
