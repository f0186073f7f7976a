//! Single authentication attempt against one server
//!
//! ```text
//! Idle ──send──▶ RequestSent ──response──▶ Terminated(Accept | Reject | ProtocolError)
//!   │                 │
//!   └────timeout──────┴──────timeout─────▶ TimedOut
//! ```
//!
//! The timeout is armed before the request is built. A request that cannot
//! be built or sent leaves the session in `Idle`, so it ends in `TimedOut`
//! exactly like a server that never answers. The reply and the timer are
//! awaited together and whichever completes first decides the attempt; the
//! other arm is dropped, which cancels it.

use crate::dump::PacketDump;
use crate::pool::ServerEntry;
use crate::registry::AttributeRegistry;
use crate::transport::{ClientHandle, Transport};
use radius_proto::{
    Attribute, AttributeType, Code, Packet, PacketError, generate_request_authenticator,
};
use tracing::{debug, error, info, warn};

/// Credentials for one `authenticate` call, borrowed from the caller
#[derive(Debug, Clone, Copy)]
pub struct AuthRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Classification of a reply from a server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject,
    /// Any reply code other than Access-Accept or Access-Reject, or a local
    /// failure to open the transport
    ProtocolError,
}

impl From<Code> for Verdict {
    fn from(code: Code) -> Self {
        match code {
            Code::AccessAccept => Verdict::Accept,
            Code::AccessReject => Verdict::Reject,
            _ => Verdict::ProtocolError,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    RequestSent { identifier: u8 },
    Terminated(Verdict),
    TimedOut,
}

/// How an attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    Completed(Verdict),
    TimedOut,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Terminated(_) | SessionState::TimedOut)
    }

    pub fn outcome(self) -> Option<SessionOutcome> {
        match self {
            SessionState::Terminated(verdict) => Some(SessionOutcome::Completed(verdict)),
            SessionState::TimedOut => Some(SessionOutcome::TimedOut),
            _ => None,
        }
    }

    /// `Idle → RequestSent`
    pub fn on_request_sent(&mut self, identifier: u8) -> bool {
        if *self != SessionState::Idle {
            return false;
        }
        *self = SessionState::RequestSent { identifier };
        true
    }

    /// `RequestSent → Terminated`; `None` if the session is not waiting
    pub fn on_response(&mut self, code: Code) -> Option<Verdict> {
        if !matches!(self, SessionState::RequestSent { .. }) {
            return None;
        }
        let verdict = Verdict::from(code);
        *self = SessionState::Terminated(verdict);
        Some(verdict)
    }

    /// `Idle | RequestSent → TimedOut`; no-op once terminal
    pub fn on_timeout(&mut self) -> bool {
        if self.is_terminal() {
            return false;
        }
        *self = SessionState::TimedOut;
        true
    }

    /// `Idle → Terminated(ProtocolError)` when no handle could be opened
    pub fn on_transport_failure(&mut self) -> bool {
        if *self != SessionState::Idle {
            return false;
        }
        *self = SessionState::Terminated(Verdict::ProtocolError);
        true
    }
}

enum Event {
    Response(crate::error::ClientResult<Packet>),
    Timeout,
}

pub struct Session<'a> {
    index: usize,
    server: &'a ServerEntry,
    state: SessionState,
    identifier: Option<u8>,
    message_dumps: bool,
}

impl<'a> Session<'a> {
    pub fn new(index: usize, server: &'a ServerEntry, message_dumps: bool) -> Self {
        Session {
            index,
            server,
            state: SessionState::Idle,
            identifier: None,
            message_dumps,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Identifier allocated for this attempt's request
    pub fn identifier(&self) -> Option<u8> {
        self.identifier
    }

    /// Drive the attempt to a terminal state
    ///
    /// On `Accept` every registry slot is overwritten from the reply; other
    /// outcomes leave the registry untouched. The handle opened for this
    /// attempt is released before returning.
    pub async fn run(
        &mut self,
        transport: &dyn Transport,
        request: AuthRequest<'_>,
        registry: &mut AttributeRegistry,
    ) -> SessionOutcome {
        let server = self.server.address();

        let mut handle = match transport.open(self.server).await {
            Ok(handle) => handle,
            Err(e) => {
                error!(server = %server, error = %e, "Could not initialize RADIUS client");
                self.state.on_transport_failure();
                return SessionOutcome::Completed(Verdict::ProtocolError);
            }
        };

        let timeout = tokio::time::sleep(self.server.timeout());
        tokio::pin!(timeout);

        self.send_request(handle.as_mut(), request).await;

        if matches!(self.state, SessionState::RequestSent { .. }) {
            let event = tokio::select! {
                biased;
                response = handle.recv_response() => Event::Response(response),
                () = &mut timeout => Event::Timeout,
            };
            match event {
                Event::Response(Ok(response)) => self.process_response(&response, registry),
                Event::Response(Err(e)) => {
                    warn!(server = %server, error = %e, "Receive failed, waiting for timeout");
                    (&mut timeout).await;
                    self.state.on_timeout();
                }
                Event::Timeout => {
                    self.state.on_timeout();
                }
            }
        } else {
            timeout.await;
            self.state.on_timeout();
        }

        drop(handle);

        match self.state.outcome() {
            Some(SessionOutcome::TimedOut) => {
                warn!(
                    server = %server,
                    index = self.index,
                    timeout_secs = self.server.timeout().as_secs_f64(),
                    "RADIUS server timed out"
                );
                SessionOutcome::TimedOut
            }
            Some(outcome) => outcome,
            None => SessionOutcome::TimedOut,
        }
    }

    async fn send_request(&mut self, handle: &mut dyn ClientHandle, request: AuthRequest<'_>) {
        debug!(server = %self.server.address(), "Sending a RADIUS authentication message");

        let identifier = handle.allocate_identifier();
        self.identifier = Some(identifier);

        let packet = match self.build_request(identifier, request) {
            Ok(packet) => packet,
            Err(e) => {
                warn!(server = %self.server.address(), error = %e, "Could not build Access-Request");
                return;
            }
        };

        if self.message_dumps {
            debug!(server = %self.server.address(), packet = %PacketDump(&packet), "TX");
        }

        match handle.send(&packet).await {
            Ok(()) => {
                self.state.on_request_sent(identifier);
            }
            Err(e) => {
                warn!(server = %self.server.address(), error = %e, "Could not send Access-Request");
            }
        }
    }

    /// User-Name, User-Password hidden with this server's secret, then the
    /// Message-Authenticator
    fn build_request(&self, identifier: u8, request: AuthRequest<'_>) -> Result<Packet, PacketError> {
        let secret = self.server.secret().as_bytes();

        let mut packet = Packet::new(Code::AccessRequest, identifier, generate_request_authenticator());
        packet.add_attribute(Attribute::new(
            AttributeType::UserName as u8,
            request.username.as_bytes().to_vec(),
        )?);
        packet.add_user_password(request.password.as_bytes(), secret)?;
        packet.sign_message_authenticator(secret)?;
        Ok(packet)
    }

    fn process_response(&mut self, response: &Packet, registry: &mut AttributeRegistry) {
        if self.message_dumps {
            debug!(server = %self.server.address(), packet = %PacketDump(response), "RX");
        }

        let Some(verdict) = self.state.on_response(response.code) else {
            debug!(
                server = %self.server.address(),
                identifier = response.identifier,
                "Ignoring reply to finished attempt"
            );
            return;
        };

        info!(
            server = %self.server.address(),
            code = response.code.as_u8(),
            identifier = response.identifier,
            verdict = ?verdict,
            "Received RADIUS Authentication message"
        );

        if verdict == Verdict::Accept {
            registry.extract_from(response);
        }
    }
}
