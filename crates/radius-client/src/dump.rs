//! Human-readable packet dumps for debug logging

use radius_proto::{AttributeType, Packet};
use std::fmt;

/// `Display` adapter that prints a packet's header and attributes
///
/// Hidden attributes such as User-Password are printed as their length only.
pub struct PacketDump<'a>(pub &'a Packet);

impl fmt::Display for PacketDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let packet = self.0;
        write!(
            f,
            "{:?} id={} len={} [",
            packet.code,
            packet.identifier,
            packet.length()
        )?;
        for (i, attribute) in packet.attributes.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            let known = AttributeType::from_u8(attribute.attr_type);
            match known {
                Some(kind) if kind.is_secret() => {
                    write!(f, "{:?}=<redacted {} bytes>", kind, attribute.value.len())?
                }
                Some(kind @ (AttributeType::UserName | AttributeType::ReplyMessage)) => write!(
                    f,
                    "{:?}={:?}",
                    kind,
                    String::from_utf8_lossy(&attribute.value)
                )?,
                Some(kind) => write!(f, "{:?}={}", kind, hex::encode(&attribute.value))?,
                None => write!(
                    f,
                    "{}={}",
                    attribute.attr_type,
                    hex::encode(&attribute.value)
                )?,
            }
        }
        f.write_str("]")
    }
}
