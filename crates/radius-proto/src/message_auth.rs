//! Message-Authenticator Support (RFC 2869 Section 5.14, RFC 3579 Section 3.2)
//!
//! HMAC-MD5 keyed with the shared secret, computed over the whole packet with
//! the Message-Authenticator value zeroed. For requests the header carries the
//! Request Authenticator; for replies the header carries the Request
//! Authenticator of the request being answered.

use crate::attributes::{Attribute, AttributeType};
use crate::packet::{Packet, PacketError};
use hmac::{Hmac, Mac};
use md5_digest::Md5;

type HmacMd5 = Hmac<Md5>;

const MESSAGE_AUTHENTICATOR_LENGTH: usize = 16;

/// HMAC-MD5 of `packet_bytes` keyed with `secret`
pub fn calculate_message_authenticator(
    packet_bytes: &[u8],
    secret: &[u8],
) -> Result<[u8; 16], PacketError> {
    let mut mac =
        HmacMd5::new_from_slice(secret).map_err(|e| PacketError::InvalidKey(e.to_string()))?;
    mac.update(packet_bytes);

    let mut output = [0u8; 16];
    output.copy_from_slice(&mac.finalize().into_bytes());
    Ok(output)
}

fn is_message_authenticator(attr: &Attribute) -> bool {
    attr.attr_type == AttributeType::MessageAuthenticator as u8
}

/// Bytes the Message-Authenticator is computed over
fn signing_input(packet: &Packet, header_authenticator: &[u8; 16]) -> Result<Vec<u8>, PacketError> {
    let mut zeroed = packet.clone();
    zeroed.authenticator = *header_authenticator;
    for attr in zeroed.attributes.iter_mut().filter(|a| is_message_authenticator(a)) {
        attr.value = vec![0u8; MESSAGE_AUTHENTICATOR_LENGTH];
    }
    zeroed.encode()
}

impl Packet {
    /// Add (or replace) the Message-Authenticator of a request
    ///
    /// Must run after every other attribute has been added.
    pub fn sign_message_authenticator(&mut self, secret: &[u8]) -> Result<(), PacketError> {
        self.attributes.retain(|a| !is_message_authenticator(a));
        self.add_attribute(Attribute::new(
            AttributeType::MessageAuthenticator as u8,
            vec![0u8; MESSAGE_AUTHENTICATOR_LENGTH],
        )?);

        let mac = calculate_message_authenticator(&signing_input(self, &self.authenticator)?, secret)?;
        if let Some(attr) = self.attributes.last_mut() {
            attr.value = mac.to_vec();
        }
        Ok(())
    }
}

/// Check the Message-Authenticator of a reply
///
/// Returns `None` when the reply carries no Message-Authenticator.
pub fn verify_response_message_authenticator(
    response: &Packet,
    request_authenticator: &[u8; 16],
    secret: &[u8],
) -> Option<bool> {
    let received = response.find_attribute(AttributeType::MessageAuthenticator as u8)?;
    if received.value.len() != MESSAGE_AUTHENTICATOR_LENGTH {
        return Some(false);
    }
    let valid = signing_input(response, request_authenticator)
        .and_then(|bytes| calculate_message_authenticator(&bytes, secret))
        .map(|expected| expected[..] == received.value[..])
        .unwrap_or(false);
    Some(valid)
}

/// Check the Message-Authenticator of a request
pub fn verify_request_message_authenticator(request: &Packet, secret: &[u8]) -> Option<bool> {
    verify_response_message_authenticator(request, &request.authenticator, secret)
}
