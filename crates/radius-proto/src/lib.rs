//! RADIUS Authentication Codec
//!
//! The client-side half of RFC 2865 and RFC 2869 needed to run an
//! Access-Request/Access-Accept exchange.
//!
//! # Features
//!
//! - Packet encoding and decoding, including unknown reply codes
//! - Attribute TLVs and Vendor-Specific sub-attributes
//! - MD5-based User-Password hiding
//! - Response Authenticator calculation and verification
//! - Message-Authenticator (HMAC-MD5) signing and verification
//!
//! # Example
//!
//! ```rust
//! use radius_proto::{Attribute, AttributeType, Code, Packet};
//! use radius_proto::auth::generate_request_authenticator;
//!
//! let mut packet = Packet::new(Code::AccessRequest, 1, generate_request_authenticator());
//! packet.add_attribute(Attribute::string(AttributeType::UserName as u8, "alice").unwrap());
//! packet.add_user_password(b"password", b"secret").unwrap();
//! packet.sign_message_authenticator(b"secret").unwrap();
//!
//! let bytes = packet.encode().unwrap();
//! assert_eq!(Packet::decode(&bytes).unwrap(), packet);
//! ```

pub mod attributes;
pub mod auth;
pub mod message_auth;
pub mod packet;

pub use attributes::{Attribute, AttributeType, VendorSpecific, VendorSubAttribute};
pub use auth::{
    calculate_response_authenticator, decrypt_user_password, encrypt_user_password,
    generate_request_authenticator, sign_response, verify_response_authenticator,
};
pub use message_auth::{
    calculate_message_authenticator, verify_request_message_authenticator,
    verify_response_message_authenticator,
};
pub use packet::{Code, Header, Packet, PacketError, peek_header};
