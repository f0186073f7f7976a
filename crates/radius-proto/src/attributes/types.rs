/// Attribute types used by the Access-Request/Access-Accept exchange
/// (RFC 2865, RFC 2869)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AttributeType {
    /// User-Name (1)
    UserName = 1,
    /// User-Password (2)
    UserPassword = 2,
    /// NAS-IP-Address (4)
    NasIpAddress = 4,
    /// Service-Type (6)
    ServiceType = 6,
    /// Reply-Message (18)
    ReplyMessage = 18,
    /// State (24)
    State = 24,
    /// Class (25)
    Class = 25,
    /// Vendor-Specific (26)
    VendorSpecific = 26,
    /// Session-Timeout (27)
    SessionTimeout = 27,
    /// NAS-Identifier (32)
    NasIdentifier = 32,
    /// Proxy-State (33)
    ProxyState = 33,
    /// Message-Authenticator (80) - RFC 2869
    MessageAuthenticator = 80,
}

impl AttributeType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(AttributeType::UserName),
            2 => Some(AttributeType::UserPassword),
            4 => Some(AttributeType::NasIpAddress),
            6 => Some(AttributeType::ServiceType),
            18 => Some(AttributeType::ReplyMessage),
            24 => Some(AttributeType::State),
            25 => Some(AttributeType::Class),
            26 => Some(AttributeType::VendorSpecific),
            27 => Some(AttributeType::SessionTimeout),
            32 => Some(AttributeType::NasIdentifier),
            33 => Some(AttributeType::ProxyState),
            80 => Some(AttributeType::MessageAuthenticator),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Attributes whose value must never appear in logs
    pub fn is_secret(self) -> bool {
        matches!(self, AttributeType::UserPassword)
    }
}
