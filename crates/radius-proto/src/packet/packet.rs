use super::Code;
use crate::attributes::{Attribute, AttributeType, VendorSpecific};
use crate::auth::encrypt_user_password;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PacketError {
    #[error("Invalid packet length: {0}")]
    InvalidLength(usize),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Attribute error: {0}")]
    AttributeError(String),
    #[error("Packet too large: {0} bytes")]
    PacketTooLarge(usize),
    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

/// Fixed part of a RADIUS packet, readable without decoding attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub code: Code,
    pub identifier: u8,
    pub length: u16,
}

/// Read the header of a raw datagram
///
/// Returns `None` when the buffer is shorter than a RADIUS header.
pub fn peek_header(data: &[u8]) -> Option<Header> {
    if data.len() < Packet::MIN_PACKET_SIZE {
        return None;
    }
    Some(Header {
        code: Code::from(data[0]),
        identifier: data[1],
        length: u16::from_be_bytes([data[2], data[3]]),
    })
}

/// RADIUS Packet structure as defined in RFC 2865 Section 3
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     Code      |  Identifier   |            Length             |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// |                         Authenticator                         |
/// |                                                               |
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |  Attributes ...
/// +-+-+-+-+-+-+-+-+-+-+-+-+-
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub code: Code,
    /// Correlates a response with its request
    pub identifier: u8,
    /// Request Authenticator on requests, Response Authenticator on replies
    pub authenticator: [u8; 16],
    pub attributes: Vec<Attribute>,
}

impl Packet {
    /// 1 code + 1 id + 2 length + 16 authenticator
    pub const MIN_PACKET_SIZE: usize = 20;
    /// Maximum RADIUS packet size (4096 bytes as per RFC 2865)
    pub const MAX_PACKET_SIZE: usize = 4096;

    pub fn new(code: Code, identifier: u8, authenticator: [u8; 16]) -> Self {
        Packet {
            code,
            identifier,
            authenticator,
            attributes: Vec::new(),
        }
    }

    pub fn header(&self) -> Header {
        Header {
            code: self.code,
            identifier: self.identifier,
            length: self.length() as u16,
        }
    }

    pub fn add_attribute(&mut self, attribute: Attribute) {
        self.attributes.push(attribute);
    }

    /// Attach a User-Password attribute hidden with `secret` and this
    /// packet's Request Authenticator (RFC 2865 Section 5.2)
    pub fn add_user_password(&mut self, password: &[u8], secret: &[u8]) -> Result<(), PacketError> {
        if password.len() > 128 {
            return Err(PacketError::AttributeError(format!(
                "User-Password too long: {} bytes (max 128)",
                password.len()
            )));
        }
        let hidden = encrypt_user_password(password, secret, &self.authenticator);
        self.add_attribute(Attribute::new(AttributeType::UserPassword as u8, hidden)?);
        Ok(())
    }

    pub fn encode(&self) -> Result<Vec<u8>, PacketError> {
        let total_length = self.length();
        if total_length > Self::MAX_PACKET_SIZE {
            return Err(PacketError::PacketTooLarge(total_length));
        }

        let mut buffer = Vec::with_capacity(total_length);
        buffer.push(self.code.as_u8());
        buffer.push(self.identifier);
        buffer.extend_from_slice(&(total_length as u16).to_be_bytes());
        buffer.extend_from_slice(&self.authenticator);
        for attr in &self.attributes {
            attr.encode_into(&mut buffer)?;
        }

        Ok(buffer)
    }

    /// Decode a packet, ignoring any bytes past the Length field
    pub fn decode(data: &[u8]) -> Result<Self, PacketError> {
        let header = peek_header(data).ok_or(PacketError::InvalidLength(data.len()))?;
        let length = header.length as usize;

        if !(Self::MIN_PACKET_SIZE..=Self::MAX_PACKET_SIZE).contains(&length) {
            return Err(PacketError::InvalidLength(length));
        }
        if data.len() < length {
            return Err(PacketError::InvalidLength(data.len()));
        }

        let mut authenticator = [0u8; 16];
        authenticator.copy_from_slice(&data[4..Self::MIN_PACKET_SIZE]);

        let mut attributes = Vec::new();
        let mut attr_data = &data[Self::MIN_PACKET_SIZE..length];
        while !attr_data.is_empty() {
            let attr = Attribute::decode(attr_data)?;
            attr_data = &attr_data[attr.encoded_length()..];
            attributes.push(attr);
        }

        Ok(Packet {
            code: header.code,
            identifier: header.identifier,
            authenticator,
            attributes,
        })
    }

    pub fn length(&self) -> usize {
        Self::MIN_PACKET_SIZE
            + self
                .attributes
                .iter()
                .map(Attribute::encoded_length)
                .sum::<usize>()
    }

    /// Find first attribute by type
    pub fn find_attribute(&self, attr_type: u8) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.attr_type == attr_type)
    }

    /// Find all attributes by type
    pub fn find_all_attributes(&self, attr_type: u8) -> impl Iterator<Item = &Attribute> {
        self.attributes
            .iter()
            .filter(move |a| a.attr_type == attr_type)
    }

    /// Copy out the first `(vendor_id, subtype)` sub-attribute carried in a
    /// Vendor-Specific attribute
    ///
    /// Malformed Vendor-Specific attributes are skipped.
    pub fn vendor_attribute(&self, vendor_id: u32, subtype: u8) -> Option<Vec<u8>> {
        self.find_all_attributes(AttributeType::VendorSpecific as u8)
            .filter_map(|attr| VendorSpecific::parse(&attr.value).ok())
            .filter(|vsa| vsa.vendor_id == vendor_id)
            .find_map(|vsa| vsa.into_value(subtype))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::decrypt_user_password;

    #[test]
    fn test_packet_encode_decode() {
        let mut packet = Packet::new(Code::AccessRequest, 42, [1u8; 16]);
        packet.add_attribute(Attribute::string(AttributeType::UserName as u8, "alice").unwrap());
        let encoded = packet.encode().unwrap();
        assert_eq!(encoded.len(), packet.length());

        let decoded = Packet::decode(&encoded).unwrap();
        assert_eq!(decoded, packet);
    }

    #[test]
    fn test_packet_min_size() {
        let data = vec![0u8; 19];
        assert!(Packet::decode(&data).is_err());
        assert!(peek_header(&data).is_none());
    }

    #[test]
    fn test_decode_unknown_code() {
        let packet = Packet::new(Code::Other(99), 7, [0u8; 16]);
        let decoded = Packet::decode(&packet.encode().unwrap()).unwrap();
        assert_eq!(decoded.code, Code::Other(99));
        assert_eq!(decoded.identifier, 7);
    }

    #[test]
    fn test_decode_ignores_trailing_bytes() {
        let packet = Packet::new(Code::AccessAccept, 1, [0u8; 16]);
        let mut encoded = packet.encode().unwrap();
        encoded.extend_from_slice(&[0xAA, 0xBB]);
        let decoded = Packet::decode(&encoded).unwrap();
        assert!(decoded.attributes.is_empty());
    }

    #[test]
    fn test_decode_truncated_attribute() {
        let mut packet = Packet::new(Code::AccessAccept, 1, [0u8; 16]);
        packet.add_attribute(Attribute::string(AttributeType::ReplyMessage as u8, "hello").unwrap());
        let mut encoded = packet.encode().unwrap();
        // Claim a longer attribute than the packet carries
        encoded[21] = 30;
        assert!(Packet::decode(&encoded).is_err());
    }

    #[test]
    fn test_peek_header() {
        let packet = Packet::new(Code::AccessReject, 200, [0u8; 16]);
        let header = peek_header(&packet.encode().unwrap()).unwrap();
        assert_eq!(header.code, Code::AccessReject);
        assert_eq!(header.identifier, 200);
        assert_eq!(header.length, 20);
        assert_eq!(header, packet.header());
    }

    #[test]
    fn test_add_user_password_uses_given_secret() {
        let mut packet = Packet::new(Code::AccessRequest, 1, [7u8; 16]);
        packet.add_user_password(b"hunter2", b"secret-a").unwrap();

        let attr = packet.find_attribute(AttributeType::UserPassword as u8).unwrap();
        assert_eq!(attr.value.len(), 16);
        let clear = decrypt_user_password(&attr.value, b"secret-a", &packet.authenticator).unwrap();
        assert_eq!(clear, b"hunter2");
        let wrong = decrypt_user_password(&attr.value, b"secret-b", &packet.authenticator).unwrap();
        assert_ne!(wrong, b"hunter2");
    }

    #[test]
    fn test_vendor_attribute_lookup() {
        let mut packet = Packet::new(Code::AccessAccept, 1, [0u8; 16]);
        packet.add_attribute(
            VendorSpecific::new(9)
                .with(1, b"cisco".to_vec())
                .into_attribute()
                .unwrap(),
        );
        packet.add_attribute(
            VendorSpecific::new(1)
                .with(1, b"first".to_vec())
                .with(2, b"x".to_vec())
                .into_attribute()
                .unwrap(),
        );
        packet.add_attribute(
            VendorSpecific::new(1)
                .with(2, b"second".to_vec())
                .into_attribute()
                .unwrap(),
        );

        assert_eq!(packet.vendor_attribute(1, 2), Some(b"x".to_vec()));
        assert_eq!(packet.vendor_attribute(9, 1), Some(b"cisco".to_vec()));
        assert_eq!(packet.vendor_attribute(9, 2), None);
        assert_eq!(packet.vendor_attribute(3, 1), None);
    }

    #[test]
    fn test_vendor_attribute_skips_malformed() {
        let mut packet = Packet::new(Code::AccessAccept, 1, [0u8; 16]);
        packet.add_attribute(Attribute::new(AttributeType::VendorSpecific as u8, vec![0, 0]).unwrap());
        packet.add_attribute(
            VendorSpecific::new(5)
                .with(4, vec![0xAA])
                .into_attribute()
                .unwrap(),
        );
        assert_eq!(packet.vendor_attribute(5, 4), Some(vec![0xAA]));
    }
}
