mod attribute;
mod types;
mod vendor;

pub use attribute::Attribute;
pub use types::AttributeType;
pub use vendor::{VendorSpecific, VendorSubAttribute};
