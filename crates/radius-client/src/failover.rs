//! Failover across the server pool
//!
//! Servers are tried strictly in pool order, one session at a time. Only a
//! timeout moves on to the next server; an accept, a reject or a protocol
//! error ends the call.

use crate::pool::ServerPool;
use crate::registry::AttributeRegistry;
use crate::session::{AuthRequest, Session, SessionOutcome, Verdict};
use crate::transport::Transport;
use tracing::{debug, info, warn};

/// Result of one `authenticate` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    Accept,
    Reject,
    ProtocolError,
    NoServersConfigured,
    AllServersTimedOut,
}

impl From<Verdict> for AuthOutcome {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Accept => AuthOutcome::Accept,
            Verdict::Reject => AuthOutcome::Reject,
            Verdict::ProtocolError => AuthOutcome::ProtocolError,
        }
    }
}

/// Where the last attempt of a call stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttemptProgress {
    /// Pool index of the server contacted last
    pub server_index: usize,
    /// Identifier of the request sent to that server, if one was allocated
    pub request_identifier: Option<u8>,
}

pub struct FailoverController<'a> {
    pool: &'a ServerPool,
    transport: &'a dyn Transport,
    message_dumps: bool,
    progress: AttemptProgress,
}

impl<'a> FailoverController<'a> {
    pub fn new(pool: &'a ServerPool, transport: &'a dyn Transport, message_dumps: bool) -> Self {
        FailoverController {
            pool,
            transport,
            message_dumps,
            progress: AttemptProgress::default(),
        }
    }

    pub fn progress(&self) -> AttemptProgress {
        self.progress
    }

    pub async fn authenticate(
        &mut self,
        request: AuthRequest<'_>,
        registry: &mut AttributeRegistry,
    ) -> AuthOutcome {
        if self.pool.is_empty() {
            warn!("No RADIUS server configured");
            return AuthOutcome::NoServersConfigured;
        }

        for (index, server) in self.pool.iter().enumerate() {
            debug!(
                server = %server.address(),
                index,
                username = request.username,
                "Trying RADIUS server"
            );

            let mut session = Session::new(index, server, self.message_dumps);
            let outcome = session.run(self.transport, request, registry).await;
            self.progress = AttemptProgress {
                server_index: index,
                request_identifier: session.identifier(),
            };

            match outcome {
                SessionOutcome::TimedOut => continue,
                SessionOutcome::Completed(verdict) => {
                    info!(
                        server = %server.address(),
                        index,
                        outcome = ?verdict,
                        "RADIUS authentication finished"
                    );
                    return verdict.into();
                }
            }
        }

        warn!(servers = self.pool.len(), "All RADIUS servers timed out");
        AuthOutcome::AllServersTimedOut
    }
}
