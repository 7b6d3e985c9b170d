//! Ports to the outside world.

pub mod transport;

pub use transport::{FrameReceiver, FrameSender, TransportError};
