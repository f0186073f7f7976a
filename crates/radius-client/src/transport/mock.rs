//! In-memory transport for session and failover tests

use super::{ClientHandle, Transport};
use crate::error::{ClientError, ClientResult};
use crate::pool::ServerEntry;
use async_trait::async_trait;
use radius_proto::{Code, Packet, VendorSpecific};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub(crate) enum MockBehavior {
    /// Never answers
    Silent,
    /// Answers the outstanding request with `code` and vendor attributes
    Reply {
        code: Code,
        vendor_attrs: Vec<(u32, u8, Vec<u8>)>,
    },
    /// `send` fails
    FailSend,
    /// `open` fails
    FailOpen,
}

impl MockBehavior {
    pub(crate) fn reply(code: Code) -> Self {
        MockBehavior::Reply {
            code,
            vendor_attrs: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct SentRequest {
    pub server: SocketAddr,
    pub secret: Vec<u8>,
    pub packet: Packet,
}

#[derive(Debug, Default)]
struct Journal {
    opened: Vec<SocketAddr>,
    released: Vec<SocketAddr>,
    sent: Vec<SentRequest>,
}

#[derive(Debug, Default, Clone)]
pub(crate) struct MockTransport {
    behaviors: HashMap<SocketAddr, MockBehavior>,
    journal: Arc<Mutex<Journal>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with(mut self, server: &ServerEntry, behavior: MockBehavior) -> Self {
        self.behaviors.insert(server.address(), behavior);
        self
    }

    pub(crate) fn opened(&self) -> Vec<SocketAddr> {
        self.journal.lock().unwrap().opened.clone()
    }

    pub(crate) fn released(&self) -> Vec<SocketAddr> {
        self.journal.lock().unwrap().released.clone()
    }

    pub(crate) fn sent(&self) -> Vec<SentRequest> {
        self.journal.lock().unwrap().sent.clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn open(&self, server: &ServerEntry) -> ClientResult<Box<dyn ClientHandle>> {
        let behavior = self
            .behaviors
            .get(&server.address())
            .cloned()
            .unwrap_or(MockBehavior::Silent);
        if matches!(behavior, MockBehavior::FailOpen) {
            return Err(ClientError::Io(std::io::Error::other("mock open failure")));
        }

        self.journal.lock().unwrap().opened.push(server.address());
        Ok(Box::new(MockHandle {
            server: server.clone(),
            behavior,
            next_identifier: 0,
            outstanding: None,
            journal: Arc::clone(&self.journal),
        }))
    }
}

struct MockHandle {
    server: ServerEntry,
    behavior: MockBehavior,
    next_identifier: u8,
    outstanding: Option<u8>,
    journal: Arc<Mutex<Journal>>,
}

#[async_trait]
impl ClientHandle for MockHandle {
    fn allocate_identifier(&mut self) -> u8 {
        self.next_identifier = self.next_identifier.wrapping_add(1);
        self.next_identifier
    }

    async fn send(&mut self, request: &Packet) -> ClientResult<()> {
        if matches!(self.behavior, MockBehavior::FailSend) {
            return Err(ClientError::Io(std::io::Error::other("mock send failure")));
        }
        self.journal.lock().unwrap().sent.push(SentRequest {
            server: self.server.address(),
            secret: self.server.secret().as_bytes().to_vec(),
            packet: request.clone(),
        });
        self.outstanding = Some(request.identifier);
        Ok(())
    }

    async fn recv_response(&mut self) -> ClientResult<Packet> {
        let identifier = self
            .outstanding
            .ok_or_else(|| ClientError::Transport("no outstanding request".to_string()))?;
        match &self.behavior {
            MockBehavior::Reply { code, vendor_attrs } => {
                let mut response = Packet::new(*code, identifier, [0u8; 16]);
                for (vendor, subtype, value) in vendor_attrs {
                    response.add_attribute(
                        VendorSpecific::new(*vendor)
                            .with(*subtype, value.clone())
                            .into_attribute()?,
                    );
                }
                Ok(response)
            }
            _ => std::future::pending().await,
        }
    }
}

impl Drop for MockHandle {
    fn drop(&mut self) {
        if let Ok(mut journal) = self.journal.lock() {
            journal.released.push(self.server.address());
        }
    }
}
