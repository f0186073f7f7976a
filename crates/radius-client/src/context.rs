//! Authentication context
//!
//! A [`Context`] owns everything one authentication workflow needs: the
//! server pool, the vendor attribute registry and the result of the last
//! call. It takes `&mut self` to authenticate, so two attempts can never run
//! on the same context at once.

use crate::error::{ClientError, ClientResult};
use crate::event_loop;
use crate::failover::{AttemptProgress, AuthOutcome, FailoverController};
use crate::pool::{AddressFamily, ServerEntry, ServerPool};
use crate::registry::{AttributeRegistry, VendorAttributeResult, VendorAttributeSpec};
use crate::session::AuthRequest;
use crate::transport::{Transport, UdpTransport};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

/// Defaults carried by every context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextDefaults {
    /// How long to stay on a secondary before returning to the primary.
    /// Failover restarts from the first server on every call, so this is
    /// not consulted.
    pub retry_primary_interval: Duration,
}

impl Default for ContextDefaults {
    fn default() -> Self {
        ContextDefaults {
            retry_primary_interval: Duration::from_secs(10),
        }
    }
}

pub struct Context {
    pool: ServerPool,
    registry: AttributeRegistry,
    transport: Arc<dyn Transport>,
    defaults: ContextDefaults,
    message_dumps: bool,
    progress: Option<AttemptProgress>,
    last_outcome: Option<AuthOutcome>,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    /// Context talking UDP to its servers
    pub fn new() -> Self {
        Self::with_transport(Arc::new(UdpTransport::new()))
    }

    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        debug!("Creating RADIUS context");
        Context {
            pool: ServerPool::new(),
            registry: AttributeRegistry::new(),
            transport,
            defaults: ContextDefaults::default(),
            message_dumps: false,
            progress: None,
            last_outcome: None,
        }
    }

    /// Append a server to the failover order
    pub fn add_server(
        &mut self,
        secret: impl AsRef<[u8]>,
        address: IpAddr,
        port: u16,
        timeout: Duration,
    ) -> ClientResult<()> {
        self.push_server(ServerEntry::new(secret, address, port, timeout)?)
    }

    /// Append a server given as raw address bytes of `family`
    pub fn add_raw_server(
        &mut self,
        secret: impl AsRef<[u8]>,
        family: AddressFamily,
        address: &[u8],
        port: u16,
        timeout: Duration,
    ) -> ClientResult<()> {
        self.push_server(ServerEntry::from_raw(secret, family, address, port, timeout)?)
    }

    fn push_server(&mut self, entry: ServerEntry) -> ClientResult<()> {
        info!(
            server = %entry.address(),
            timeout_secs = entry.timeout().as_secs(),
            "Adding RADIUS server"
        );
        self.pool.push(entry)
    }

    /// Ask for a vendor attribute to be copied out of every Access-Accept
    pub fn add_attribute_spec(&mut self, vendor_id: u32, subtype: u8) -> ClientResult<()> {
        debug!(vendor_id, subtype, "Adding RADIUS attribute");
        self.registry.add(VendorAttributeSpec::new(vendor_id, subtype))
    }

    /// Dump every request and reply at debug level, with passwords redacted
    pub fn enable_debug_logging(&mut self) {
        self.message_dumps = true;
    }

    pub fn server_count(&self) -> usize {
        self.pool.len()
    }

    pub fn servers(&self) -> &ServerPool {
        &self.pool
    }

    /// Authenticate on the process event loop, blocking the calling thread
    ///
    /// Fails with [`ClientError::NotInitialized`] unless [`event_loop::init`]
    /// has run, and with [`ClientError::InsideRuntime`] when called from a
    /// thread that is already running async code; use
    /// [`Context::authenticate_async`] there.
    pub fn authenticate(&mut self, username: &str, password: &str) -> ClientResult<AuthOutcome> {
        if Handle::try_current().is_ok() {
            warn!("Blocking authentication refused inside an async runtime");
            return Err(ClientError::InsideRuntime);
        }
        let runtime = event_loop::handle()?;
        Ok(runtime.block_on(self.authenticate_async(username, password)))
    }

    /// Authenticate on the caller's runtime
    pub async fn authenticate_async(&mut self, username: &str, password: &str) -> AuthOutcome {
        debug!(username, servers = self.pool.len(), "Authenticating user");

        let request = AuthRequest { username, password };
        let mut controller =
            FailoverController::new(&self.pool, self.transport.as_ref(), self.message_dumps);
        let outcome = controller.authenticate(request, &mut self.registry).await;

        self.progress = (outcome != AuthOutcome::NoServersConfigured).then(|| controller.progress());
        self.last_outcome = Some(outcome);
        outcome
    }

    /// Every requested attribute with what the last accepted call yielded
    pub fn attribute_results(&self) -> &[VendorAttributeResult] {
        self.registry.results()
    }

    pub fn last_outcome(&self) -> Option<AuthOutcome> {
        self.last_outcome
    }

    /// Server index and request identifier of the last attempt made
    pub fn last_attempt(&self) -> Option<AttemptProgress> {
        self.progress
    }

    pub fn defaults(&self) -> ContextDefaults {
        self.defaults
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        debug!(
            servers = self.pool.len(),
            attributes = self.registry.len(),
            "Destroying RADIUS context"
        );
    }
}
