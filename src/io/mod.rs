//! I/O infrastructure: the simulator wire contract and the TCP ingress.

pub mod messages;
pub mod server;

pub use messages::{PathMessage, TelemetryFrame};
pub use server::TelemetryServer;
