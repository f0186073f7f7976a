//! UDP transport

use super::{ClientHandle, Transport};
use crate::error::{ClientError, ClientResult};
use crate::pool::{AddressFamily, ServerEntry, SharedSecret};
use async_trait::async_trait;
use radius_proto::{
    Packet, peek_header, verify_response_authenticator, verify_response_message_authenticator,
};
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use tokio::net::UdpSocket;
use tracing::{debug, warn};

/// Opens one connected UDP socket per handle
#[derive(Debug, Clone, Copy, Default)]
pub struct UdpTransport;

impl UdpTransport {
    pub fn new() -> Self {
        UdpTransport
    }
}

#[async_trait]
impl Transport for UdpTransport {
    async fn open(&self, server: &ServerEntry) -> ClientResult<Box<dyn ClientHandle>> {
        let bind_addr: SocketAddr = match server.family() {
            AddressFamily::V4 => (Ipv4Addr::UNSPECIFIED, 0).into(),
            AddressFamily::V6 => (Ipv6Addr::UNSPECIFIED, 0).into(),
        };
        let socket = UdpSocket::bind(bind_addr).await?;
        socket.connect(server.address()).await?;
        debug!(
            server = %server.address(),
            local = %socket.local_addr()?,
            "RADIUS client handle opened"
        );

        Ok(Box::new(UdpHandle {
            socket,
            server: server.address(),
            secret: server.secret().clone(),
            next_identifier: rand::random(),
            outstanding: None,
            buffer: vec![0u8; Packet::MAX_PACKET_SIZE],
        }))
    }
}

#[derive(Debug, Clone, Copy)]
struct Outstanding {
    identifier: u8,
    authenticator: [u8; 16],
}

pub struct UdpHandle {
    socket: UdpSocket,
    server: SocketAddr,
    secret: SharedSecret,
    next_identifier: u8,
    outstanding: Option<Outstanding>,
    buffer: Vec<u8>,
}

impl UdpHandle {
    /// Decode and authenticate one datagram; `None` means drop it
    fn accept_datagram(&self, data: &[u8], outstanding: Outstanding) -> Option<Packet> {
        let header = match peek_header(data) {
            Some(header) => header,
            None => {
                debug!(server = %self.server, len = data.len(), "Dropping short datagram");
                return None;
            }
        };
        if header.identifier != outstanding.identifier {
            debug!(
                server = %self.server,
                identifier = header.identifier,
                expected = outstanding.identifier,
                "Dropping reply with unknown identifier"
            );
            return None;
        }

        let response = match Packet::decode(data) {
            Ok(packet) => packet,
            Err(e) => {
                warn!(server = %self.server, error = %e, "Dropping malformed reply");
                return None;
            }
        };

        let secret = self.secret.as_bytes();
        if !verify_response_authenticator(&response, &outstanding.authenticator, secret) {
            warn!(
                server = %self.server,
                identifier = response.identifier,
                "Dropping reply with invalid Response Authenticator"
            );
            return None;
        }
        if verify_response_message_authenticator(&response, &outstanding.authenticator, secret)
            == Some(false)
        {
            warn!(
                server = %self.server,
                identifier = response.identifier,
                "Dropping reply with invalid Message-Authenticator"
            );
            return None;
        }

        Some(response)
    }
}

#[async_trait]
impl ClientHandle for UdpHandle {
    fn allocate_identifier(&mut self) -> u8 {
        let identifier = self.next_identifier;
        self.next_identifier = self.next_identifier.wrapping_add(1);
        identifier
    }

    async fn send(&mut self, request: &Packet) -> ClientResult<()> {
        let bytes = request.encode()?;
        self.socket.send(&bytes).await?;
        self.outstanding = Some(Outstanding {
            identifier: request.identifier,
            authenticator: request.authenticator,
        });
        debug!(
            server = %self.server,
            identifier = request.identifier,
            len = bytes.len(),
            "Access-Request sent"
        );
        Ok(())
    }

    async fn recv_response(&mut self) -> ClientResult<Packet> {
        let outstanding = self
            .outstanding
            .ok_or_else(|| ClientError::Transport("no outstanding request".to_string()))?;

        loop {
            let len = self.socket.recv(&mut self.buffer).await?;
            if let Some(response) = self.accept_datagram(&self.buffer[..len], outstanding) {
                return Ok(response);
            }
        }
    }
}

impl Drop for UdpHandle {
    fn drop(&mut self) {
        debug!(server = %self.server, "RADIUS client handle released");
    }
}
