//! Inbound OSC server
//!
//! Receives datagrams on the listen socket, decodes them with `rosc`, flattens
//! bundles and forwards each message to the hub queue. Undecodable datagrams
//! are dropped with a debug log.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tracing::{debug, info, trace, warn};

use crate::hub::HubHandle;
use crate::osc;

const MAX_DATAGRAM: usize = 65_536;

pub struct OscServer {
    socket: UdpSocket,
    hub: HubHandle,
}

impl OscServer {
    pub async fn bind(host: &str, port: u16, hub: HubHandle) -> Result<Self> {
        let socket = UdpSocket::bind((host, port))
            .await
            .with_context(|| format!("Failed to bind OSC server on {}:{}", host, port))?;
        info!("OSC server listening on {}", socket.local_addr()?);
        Ok(Self { socket, hub })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Receive until the hub goes away
    pub async fn run(self) -> Result<()> {
        let mut buf = vec![0u8; MAX_DATAGRAM];

        while self.hub.is_alive() {
            let (len, from) = match self.socket.recv_from(&mut buf).await {
                Ok(received) => received,
                Err(e) => {
                    // ICMP port-unreachable surfaces here on some platforms
                    warn!("OSC receive error: {}", e);
                    continue;
                }
            };

            let packet = match rosc::decoder::decode_udp(&buf[..len]) {
                Ok((_, packet)) => packet,
                Err(e) => {
                    debug!(%from, len, "Dropping undecodable datagram: {:?}", e);
                    continue;
                }
            };

            for message in osc::flatten(packet) {
                trace!(%from, "OSC in: {}", osc::describe(&message));
                self.hub.inbound(message, from);
            }
        }

        debug!("OSC server stopped");
        Ok(())
    }
}
