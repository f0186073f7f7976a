//! Authentication server pool
//!
//! Insertion order is the failover order. Entries are immutable once added.

use crate::error::{ClientError, ClientResult};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

/// Longest shared secret accepted for a server
pub const MAX_SHARED_SECRET_LEN: usize = 256;

/// Address family of a configured server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressFamily {
    V4,
    V6,
}

impl AddressFamily {
    /// Length of a raw address of this family
    pub fn address_len(self) -> usize {
        match self {
            AddressFamily::V4 => 4,
            AddressFamily::V6 => 16,
        }
    }
}

/// Shared secret bytes, redacted in `Debug` output
///
/// Cloning shares the same buffer; handles opened for a server only ever read it.
#[derive(Clone, PartialEq, Eq)]
pub struct SharedSecret(Arc<[u8]>);

impl SharedSecret {
    pub fn new(secret: impl AsRef<[u8]>) -> ClientResult<Self> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(ClientError::NoSharedSecret);
        }
        if secret.len() > MAX_SHARED_SECRET_LEN {
            return Err(ClientError::SharedSecretTooLong(secret.len()));
        }
        Ok(SharedSecret(Arc::from(secret)))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedSecret(<{} bytes>)", self.0.len())
    }
}

/// One configured authentication server
#[derive(Debug, Clone)]
pub struct ServerEntry {
    address: SocketAddr,
    secret: SharedSecret,
    timeout: Duration,
}

impl ServerEntry {
    pub fn new(
        secret: impl AsRef<[u8]>,
        address: IpAddr,
        port: u16,
        timeout: Duration,
    ) -> ClientResult<Self> {
        let address = SocketAddr::new(address, port);
        if timeout.is_zero() {
            return Err(ClientError::InvalidServer(format!(
                "{}: timeout cannot be 0",
                address
            )));
        }
        Ok(ServerEntry {
            address,
            secret: SharedSecret::new(secret)?,
            timeout,
        })
    }

    /// Build an entry from raw address bytes of the declared family
    pub fn from_raw(
        secret: impl AsRef<[u8]>,
        family: AddressFamily,
        address: &[u8],
        port: u16,
        timeout: Duration,
    ) -> ClientResult<Self> {
        let ip = match (family, address.len()) {
            (AddressFamily::V4, 4) => {
                IpAddr::V4(Ipv4Addr::new(address[0], address[1], address[2], address[3]))
            }
            (AddressFamily::V6, 16) => {
                let mut octets = [0u8; 16];
                octets.copy_from_slice(address);
                IpAddr::V6(Ipv6Addr::from(octets))
            }
            (family, len) => {
                return Err(ClientError::InvalidServer(format!(
                    "{:?} address must be {} bytes, got {}",
                    family,
                    family.address_len(),
                    len
                )));
            }
        };
        Self::new(secret, ip, port, timeout)
    }

    pub fn family(&self) -> AddressFamily {
        match self.address {
            SocketAddr::V4(_) => AddressFamily::V4,
            SocketAddr::V6(_) => AddressFamily::V6,
        }
    }

    pub fn address(&self) -> SocketAddr {
        self.address
    }

    pub fn secret(&self) -> &SharedSecret {
        &self.secret
    }

    /// How long to wait for a reply from this server
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Ordered list of configured servers
#[derive(Debug, Default)]
pub struct ServerPool {
    servers: Vec<ServerEntry>,
}

impl ServerPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a server; a failed append leaves the pool unchanged
    pub fn push(&mut self, entry: ServerEntry) -> ClientResult<()> {
        self.servers
            .try_reserve(1)
            .map_err(|_| ClientError::OutOfMemory)?;
        self.servers.push(entry);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ServerEntry> {
        self.servers.get(index)
    }

    /// Servers in failover order
    pub fn iter(&self) -> impl Iterator<Item = &ServerEntry> {
        self.servers.iter()
    }
}
