use crate::packet::{Packet, PacketError};
use rand::Rng;

/// Generate a random Request Authenticator (16 bytes) per RFC 2865 Section 3
pub fn generate_request_authenticator() -> [u8; 16] {
    let mut authenticator = [0u8; 16];
    rand::rng().fill(&mut authenticator);
    authenticator
}

/// Calculate Response Authenticator per RFC 2865 Section 3
///
/// Response Authenticator = MD5(Code + ID + Length + Request Authenticator + Attributes + Secret)
pub fn calculate_response_authenticator(
    packet: &Packet,
    request_authenticator: &[u8; 16],
    secret: &[u8],
) -> Result<[u8; 16], PacketError> {
    let mut data = packet.encode()?;
    data[4..Packet::MIN_PACKET_SIZE].copy_from_slice(request_authenticator);
    data.extend_from_slice(secret);
    Ok(md5::compute(&data).0)
}

/// Check the Response Authenticator of a reply against the request it answers
pub fn verify_response_authenticator(
    response: &Packet,
    request_authenticator: &[u8; 16],
    secret: &[u8],
) -> bool {
    calculate_response_authenticator(response, request_authenticator, secret)
        .map(|expected| expected == response.authenticator)
        .unwrap_or(false)
}

/// Fill in the Response Authenticator of a reply
pub fn sign_response(
    response: &mut Packet,
    request_authenticator: &[u8; 16],
    secret: &[u8],
) -> Result<(), PacketError> {
    response.authenticator = calculate_response_authenticator(response, request_authenticator, secret)?;
    Ok(())
}

/// Hide a User-Password value per RFC 2865 Section 5.2
///
/// The password is padded with NULs to a multiple of 16 bytes (at least 16),
/// then each block is XORed with MD5(secret + previous cipher block), the
/// first block chaining from the Request Authenticator.
pub fn encrypt_user_password(password: &[u8], secret: &[u8], authenticator: &[u8; 16]) -> Vec<u8> {
    let padded_len = password.len().div_ceil(16).max(1) * 16;
    let mut padded = password.to_vec();
    padded.resize(padded_len, 0);

    let mut result = Vec::with_capacity(padded_len);
    let mut previous_block = *authenticator;

    for chunk in padded.chunks(16) {
        let hash = md5::compute([secret, &previous_block[..]].concat());
        for (i, byte) in chunk.iter().enumerate() {
            previous_block[i] = byte ^ hash.0[i];
        }
        result.extend_from_slice(&previous_block);
    }

    result
}

/// Recover a User-Password value hidden with [`encrypt_user_password`]
///
/// Trailing NUL padding is removed.
pub fn decrypt_user_password(
    encrypted: &[u8],
    secret: &[u8],
    authenticator: &[u8; 16],
) -> Result<Vec<u8>, PacketError> {
    if encrypted.len() % 16 != 0 || encrypted.is_empty() {
        return Err(PacketError::AttributeError(format!(
            "Invalid encrypted password length: {}",
            encrypted.len()
        )));
    }

    let mut result = Vec::with_capacity(encrypted.len());
    let mut previous_block: &[u8] = authenticator;

    for chunk in encrypted.chunks(16) {
        let hash = md5::compute([secret, previous_block].concat());
        result.extend(chunk.iter().zip(hash.0.iter()).map(|(c, h)| c ^ h));
        previous_block = chunk;
    }

    while result.last() == Some(&0) {
        result.pop();
    }

    Ok(result)
}
