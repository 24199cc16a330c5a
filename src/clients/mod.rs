//! Client side of the gateway: endpoint pool, active-client registry and fan-out

mod bus;
mod endpoint;
mod pool;
mod registry;

#[cfg(test)]
pub mod testing;

pub use bus::{fan_out, send_to, Delivery, Outbound, Recipient};
pub use endpoint::{Endpoint, SendError, Slot, UdpEndpoint};
pub use pool::ConnectionPool;
pub use registry::ClientRegistry;
