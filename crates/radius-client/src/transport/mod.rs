//! Transport to authentication servers
//!
//! A [`Transport`] opens one [`ClientHandle`] per session. The handle owns
//! identifier allocation, request transmission and response correlation:
//! [`ClientHandle::recv_response`] only yields replies that come from the
//! handle's server, answer the outstanding identifier and carry a valid
//! Response Authenticator (and Message-Authenticator, when present).
//! Dropping the handle releases it.

mod udp;

#[cfg(test)]
pub(crate) mod mock;

pub use udp::{UdpHandle, UdpTransport};

use crate::error::ClientResult;
use crate::pool::ServerEntry;
use async_trait::async_trait;
use radius_proto::Packet;

#[async_trait]
pub trait Transport: Send + Sync {
    /// Open a fresh handle bound to `server`
    async fn open(&self, server: &ServerEntry) -> ClientResult<Box<dyn ClientHandle>>;
}

#[async_trait]
pub trait ClientHandle: Send {
    /// Next request identifier for this handle
    fn allocate_identifier(&mut self) -> u8;

    /// Transmit a request; it becomes the outstanding request
    async fn send(&mut self, request: &Packet) -> ClientResult<()>;

    /// Wait for the reply to the outstanding request
    async fn recv_response(&mut self) -> ClientResult<Packet>;
}
