//! Message link: newline-delimited JSON over any byte [`Transport`].
//!
//! ```text
//!   Transport ──bytes──▶ LineDecoder ──lines──▶ InboundQueue ──▶ tick loop
//!   tick loop ──payload + '\n'──▶ Transport
//! ```
//!
//! Nothing here interprets payloads; the tick loop hands them to the
//! [`codec`](crate::codec).

pub mod adapter;
pub mod inbound;
pub mod lines;
pub mod transport;

pub use adapter::LinkAdapter;
pub use inbound::InboundQueue;
pub use transport::Transport;
