//! Vendor-Specific attribute (RFC 2865 Section 5.26)
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |     Type      |  Length       |            Vendor-Id
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!      Vendor-Id (cont)           | Vendor type   | Vendor length |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |    Attribute-Specific...
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```

use super::{Attribute, AttributeType};
use crate::packet::PacketError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorSubAttribute {
    pub vendor_type: u8,
    pub value: Vec<u8>,
}

/// Decoded value of a Vendor-Specific attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorSpecific {
    pub vendor_id: u32,
    pub sub_attributes: Vec<VendorSubAttribute>,
}

impl VendorSpecific {
    const VENDOR_ID_LENGTH: usize = 4;

    pub fn new(vendor_id: u32) -> Self {
        VendorSpecific {
            vendor_id,
            sub_attributes: Vec::new(),
        }
    }

    /// Builder-style append of one sub-attribute
    pub fn with(mut self, vendor_type: u8, value: Vec<u8>) -> Self {
        self.sub_attributes.push(VendorSubAttribute { vendor_type, value });
        self
    }

    /// Parse the value of a Vendor-Specific attribute
    pub fn parse(value: &[u8]) -> Result<Self, PacketError> {
        if value.len() < Self::VENDOR_ID_LENGTH {
            return Err(PacketError::AttributeError(format!(
                "Vendor-Specific too short: {} bytes",
                value.len()
            )));
        }
        let vendor_id = u32::from_be_bytes([value[0], value[1], value[2], value[3]]);

        let mut sub_attributes = Vec::new();
        let mut rest = &value[Self::VENDOR_ID_LENGTH..];
        while let [vendor_type, length, ..] = rest {
            let length = *length as usize;
            if length < 2 || length > rest.len() {
                return Err(PacketError::AttributeError(format!(
                    "Invalid vendor sub-attribute length {} for vendor {}",
                    length, vendor_id
                )));
            }
            sub_attributes.push(VendorSubAttribute {
                vendor_type: *vendor_type,
                value: rest[2..length].to_vec(),
            });
            rest = &rest[length..];
        }
        if !rest.is_empty() {
            return Err(PacketError::AttributeError(format!(
                "Truncated vendor sub-attribute for vendor {}",
                vendor_id
            )));
        }

        Ok(VendorSpecific {
            vendor_id,
            sub_attributes,
        })
    }

    /// Take the value of the first sub-attribute of `vendor_type`
    pub fn into_value(self, vendor_type: u8) -> Option<Vec<u8>> {
        self.sub_attributes
            .into_iter()
            .find(|sub| sub.vendor_type == vendor_type)
            .map(|sub| sub.value)
    }

    pub fn into_attribute(self) -> Result<Attribute, PacketError> {
        let mut value = self.vendor_id.to_be_bytes().to_vec();
        for sub in self.sub_attributes {
            let length = sub.value.len() + 2;
            if length > u8::MAX as usize {
                return Err(PacketError::AttributeError(format!(
                    "Vendor sub-attribute too long: {} bytes",
                    length
                )));
            }
            value.push(sub.vendor_type);
            value.push(length as u8);
            value.extend_from_slice(&sub.value);
        }
        Attribute::new(AttributeType::VendorSpecific as u8, value)
    }
}
