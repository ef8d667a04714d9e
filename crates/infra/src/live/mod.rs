//! Live-update channel
//!
//! Socket.IO over WebSocket, scoped to the signed-in identity. Decoded
//! events leave through an `mpsc` channel consumed by
//! [`assessor_core::LiveEventDispatcher::run`].

mod channel;
mod endpoint;
pub mod frame;
mod manager;

pub use channel::{ChannelExit, LiveSubscription, SocketIoChannel};
pub use endpoint::LiveEndpoint;
pub use manager::{ConnectionState, LiveConnectionManager};
