//! Configuration-driven client
//!
//! [`Client`] ties a [`Config`] to a [`Context`] on the process event loop
//! and turns authentication outcomes into [`User`]s or errors.

use crate::config::Config;
use crate::context::Context;
use crate::error::{ClientError, ClientResult};
use crate::event_loop;
use crate::failover::AuthOutcome;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::{debug, info};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn with_username_password(
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Credentials {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// A vendor attribute returned with an Access-Accept
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attribute {
    pub vendor: u32,
    pub subtype: u8,
    #[serde(serialize_with = "encode_hex", deserialize_with = "decode_hex")]
    pub data: Vec<u8>,
}

/// An authenticated user
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub username: String,
    pub attributes: Vec<Attribute>,
}

impl User {
    pub fn new(username: impl Into<String>) -> Self {
        User {
            username: username.into(),
            attributes: vec![],
        }
    }
}

fn encode_hex<T, S>(data: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: AsRef<[u8]>,
    S: Serializer,
{
    serializer.serialize_str(&hex::encode_upper(data.as_ref()))
}

fn decode_hex<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
    let s = String::deserialize(deserializer)?;
    hex::decode(s).map_err(serde::de::Error::custom)
}

/// Owns the process event loop for its lifetime
///
/// Only one client can exist at a time; a second `try_with_config` fails with
/// [`ClientError::AlreadyInitialized`].
pub struct Client {
    context: Context,
}

impl Client {
    pub fn try_with_config(config: &Config) -> ClientResult<Self> {
        event_loop::init()?;
        match Self::build_context(config) {
            Ok(context) => Ok(Client { context }),
            Err(e) => {
                event_loop::deinit();
                Err(e)
            }
        }
    }

    fn build_context(config: &Config) -> ClientResult<Context> {
        if config.servers.is_empty() {
            return Err(ClientError::NoServer);
        }

        let mut context = Context::new();
        for server in config.resolve_servers()? {
            context.add_server(
                server.secret.as_bytes(),
                server.address.ip(),
                server.address.port(),
                server.timeout,
            )?;
        }
        for spec in config.attribute_specs()? {
            context.add_attribute_spec(spec.vendor_id, spec.subtype)?;
        }
        if config.debug {
            context.enable_debug_logging();
        }

        info!(servers = context.server_count(), "RADIUS client ready");
        Ok(context)
    }

    /// Authenticate and collect the requested attributes the server returned
    pub fn authenticate(&mut self, credentials: &Credentials) -> ClientResult<User> {
        let outcome = self
            .context
            .authenticate(&credentials.username, &credentials.password)?;

        match outcome {
            AuthOutcome::Accept => {
                let mut user = User::new(credentials.username.as_str());
                user.attributes = self
                    .context
                    .attribute_results()
                    .iter()
                    .filter_map(|result| {
                        result.value().map(|data| Attribute {
                            vendor: result.spec().vendor_id,
                            subtype: result.spec().subtype,
                            data: data.to_vec(),
                        })
                    })
                    .collect();
                debug!(
                    username = %user.username,
                    attributes = user.attributes.len(),
                    "User authenticated"
                );
                Ok(user)
            }
            AuthOutcome::Reject => Err(ClientError::AuthReject),
            AuthOutcome::ProtocolError => Err(ClientError::RadiusClient),
            AuthOutcome::NoServersConfigured => Err(ClientError::NoServer),
            AuthOutcome::AllServersTimedOut => Err(ClientError::ServerTimeout),
        }
    }

    pub fn context(&self) -> &Context {
        &self.context
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        event_loop::deinit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_serializes_data_as_upper_hex() {
        let mut user = User::new("alice");
        user.attributes.push(Attribute {
            vendor: 311,
            subtype: 1,
            data: vec![0xde, 0xad, 0x01],
        });

        let json = serde_json::to_string(&user).unwrap();
        assert_eq!(
            json,
            r#"{"username":"alice","attributes":[{"vendor":311,"subtype":1,"data":"DEAD01"}]}"#
        );
        assert_eq!(serde_json::from_str::<User>(&json).unwrap(), user);
    }

    #[test]
    fn test_attribute_rejects_bad_hex() {
        let json = r#"{"vendor":1,"subtype":2,"data":"XYZ"}"#;
        assert!(serde_json::from_str::<Attribute>(json).is_err());
    }

    #[test]
    fn test_credentials() {
        let credentials = Credentials::with_username_password("alice", String::from("pw"));
        assert_eq!(credentials.username, "alice");
        assert_eq!(credentials.password, "pw");
    }
}
