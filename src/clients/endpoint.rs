//! Client slots and their outbound datagram endpoints

use anyhow::{anyhow, Context, Result};
use rosc::{OscMessage, OscPacket};
use std::fmt;
use std::net::{SocketAddr, UdpSocket};
use thiserror::Error;

/// A reserved client port; slot number, pool index and client identity are the same thing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slot(u16);

impl Slot {
    pub const fn new(port: u16) -> Self {
        Self(port)
    }

    pub const fn port(self) -> u16 {
        self.0
    }

    /// Convert an inbound OSC integer; values outside `u16` cannot name a slot
    pub fn from_arg(value: i32) -> Option<Self> {
        u16::try_from(value).ok().map(Self)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Failure of a single datagram send. Always swallowed by callers in the fan-out path.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("failed to encode OSC packet: {0}")]
    Encode(String),
    #[error("datagram send failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("short datagram write ({written} of {expected} bytes)")]
    Truncated { written: usize, expected: usize },
}

/// One pre-established outbound endpoint
///
/// `send` is synchronous and must return promptly: the fan-out runs on the
/// hub task, one client after another.
pub trait Endpoint: Send + Sync {
    fn slot(&self) -> Slot;
    fn send(&self, msg: &OscMessage) -> Result<(), SendError>;
}

/// UDP endpoint connected to `host:slot`
///
/// Holds a blocking std socket; a connected UDP send only waits for kernel
/// buffer space.
pub struct UdpEndpoint {
    slot: Slot,
    target: SocketAddr,
    socket: UdpSocket,
}

impl UdpEndpoint {
    /// Resolve the target, bind an ephemeral local socket and connect it
    pub async fn establish(host: &str, slot: Slot) -> Result<Self> {
        let target = tokio::net::lookup_host((host, slot.port()))
            .await
            .with_context(|| format!("Failed to resolve {}:{}", host, slot))?
            .next()
            .ok_or_else(|| anyhow!("No address for {}:{}", host, slot))?;

        let local: SocketAddr = if target.is_ipv4() {
            "0.0.0.0:0".parse()?
        } else {
            "[::]:0".parse()?
        };

        let socket = UdpSocket::bind(local)
            .with_context(|| format!("Failed to bind socket for slot {}", slot))?;
        socket
            .connect(target)
            .with_context(|| format!("Failed to connect slot {} to {}", slot, target))?;

        Ok(Self {
            slot,
            target,
            socket,
        })
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }
}

impl Endpoint for UdpEndpoint {
    fn slot(&self) -> Slot {
        self.slot
    }

    fn send(&self, msg: &OscMessage) -> Result<(), SendError> {
        let bytes = rosc::encoder::encode(&OscPacket::Message(msg.clone()))
            .map_err(|e| SendError::Encode(format!("{:?}", e)))?;

        let written = self.socket.send(&bytes)?;
        if written != bytes.len() {
            return Err(SendError::Truncated {
                written,
                expected: bytes.len(),
            });
        }
        Ok(())
    }
}

impl fmt::Debug for UdpEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UdpEndpoint")
            .field("slot", &self.slot)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::osc;
    use rosc::OscType;

    #[test]
    fn test_slot_from_arg() {
        assert_eq!(Slot::from_arg(9001), Some(Slot::new(9001)));
        assert_eq!(Slot::from_arg(-1), None);
        assert_eq!(Slot::from_arg(70_000), None);
    }

    #[tokio::test]
    async fn test_udp_endpoint_delivers_datagram() -> Result<()> {
        let receiver = tokio::net::UdpSocket::bind("127.0.0.1:0").await?;
        let port = receiver.local_addr()?.port();

        let endpoint = UdpEndpoint::establish("127.0.0.1", Slot::new(port)).await?;
        assert_eq!(endpoint.slot().port(), port);

        let msg = osc::message(osc::addr::TRANSPORT, vec![OscType::String("playing".into())]);
        endpoint.send(&msg)?;

        let mut buf = [0u8; 1024];
        let len = tokio::time::timeout(std::time::Duration::from_secs(2), receiver.recv(&mut buf))
            .await??;
        let (_, packet) = rosc::decoder::decode_udp(&buf[..len])
            .map_err(|e| anyhow!("decode failed: {:?}", e))?;

        match packet {
            OscPacket::Message(received) => assert_eq!(received, msg),
            other => panic!("unexpected packet: {:?}", other),
        }
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_first_burst_after_establish_is_delivered() -> Result<()> {
        let receiver = tokio::net::UdpSocket::bind("127.0.0.1:0").await?;
        let port = receiver.local_addr()?.port();
        let endpoint = UdpEndpoint::establish("127.0.0.1", Slot::new(port)).await?;

        // No yield to the runtime between establish and the sends
        for n in 0..32 {
            endpoint.send(&osc::message(osc::addr::TRACK_BANK, vec![OscType::Int(n)]))?;
        }

        let mut buf = [0u8; 1024];
        for n in 0..32 {
            let len =
                tokio::time::timeout(std::time::Duration::from_secs(2), receiver.recv(&mut buf))
                    .await??;
            let (_, packet) = rosc::decoder::decode_udp(&buf[..len])
                .map_err(|e| anyhow!("decode failed: {:?}", e))?;
            match packet {
                OscPacket::Message(received) => assert_eq!(received.args, vec![OscType::Int(n)]),
                other => panic!("unexpected packet: {:?}", other),
            }
        }
        Ok(())
    }
}
