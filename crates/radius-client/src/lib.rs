//! RADIUS Authentication Client
//!
//! Authenticates a username and password against an ordered pool of RADIUS
//! servers built on top of the `radius-proto` codec.
//!
//! # Features
//!
//! - Ordered server failover, retrying the next server only on timeout
//! - Per-server shared secrets and timeouts
//! - Vendor-specific attribute extraction from Access-Accept replies
//! - Blocking calls on a process-wide event loop, or async calls on your own runtime
//! - JSON configuration
//!
//! # Example
//!
//! ```rust,no_run
//! use radius_client::{AuthOutcome, Context, event_loop};
//! use std::time::Duration;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     event_loop::init()?;
//!
//!     let mut context = Context::new();
//!     context.add_server("testing123", "10.0.0.1".parse()?, 1812, Duration::from_secs(3))?;
//!     context.add_server("testing123", "10.0.0.2".parse()?, 1812, Duration::from_secs(3))?;
//!     context.add_attribute_spec(311, 1)?;
//!
//!     if context.authenticate("alice", "password")? == AuthOutcome::Accept {
//!         for result in context.attribute_results() {
//!             println!("{:?} => {:?}", result.spec(), result.value());
//!         }
//!     }
//!
//!     drop(context);
//!     event_loop::deinit();
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod context;
mod dump;
pub mod error;
pub mod event_loop;
pub mod failover;
pub mod pool;
pub mod registry;
pub mod session;
pub mod transport;

pub use client::{Attribute, Client, Credentials, User};
pub use config::{Config, ConfigError, ServerConfig};
pub use context::{Context, ContextDefaults};
pub use error::{ClientError, ClientResult};
pub use failover::{AttemptProgress, AuthOutcome};
pub use pool::{AddressFamily, ServerEntry, ServerPool, SharedSecret};
pub use registry::{VendorAttributeResult, VendorAttributeSpec};
pub use transport::{ClientHandle, Transport, UdpTransport};
