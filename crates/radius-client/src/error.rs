//! Client error types

use crate::config::ConfigError;
use thiserror::Error;

/// Errors surfaced by configuration calls, the process event loop and the
/// [`Client`](crate::Client) facade
///
/// Authentication attempts themselves report an
/// [`AuthOutcome`](crate::AuthOutcome) instead; only the facade turns
/// outcomes into the `AuthReject`/`RadiusClient`/`NoServer`/`ServerTimeout`
/// variants.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The process event loop is already running
    #[error("Event loop already initialized")]
    AlreadyInitialized,

    /// `init()` was not called (or `deinit()` already ran)
    #[error("Event loop not initialized")]
    NotInitialized,

    /// A blocking call was made from a thread already driving an async runtime
    #[error("Blocking authentication called from inside an async runtime")]
    InsideRuntime,

    /// The process event loop could not be built
    #[error("Could not init event loop: {0}")]
    EventLoopInit(#[source] std::io::Error),

    /// Growing the server pool or attribute registry failed
    #[error("Could not allocate memory")]
    OutOfMemory,

    #[error("No server provided")]
    NoServer,

    #[error("All servers timed out")]
    ServerTimeout,

    #[error("Invalid server `{0}`")]
    InvalidServer(String),

    #[error("No shared secret provided")]
    NoSharedSecret,

    #[error("Shared secret too long: {0} bytes (max 256)")]
    SharedSecretTooLong(usize),

    /// The server answered with something other than Accept or Reject
    #[error("RADIUS client failure")]
    RadiusClient,

    #[error("Authentication rejected, wrong credentials")]
    AuthReject,

    /// A transport handle was used out of order
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Packet error: {0}")]
    Packet(#[from] radius_proto::PacketError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
