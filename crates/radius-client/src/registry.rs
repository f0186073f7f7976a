//! Vendor attribute registry
//!
//! Ordered list of `(vendor-id, subtype)` pairs to copy out of an
//! Access-Accept, each with the value extracted by the last accepted attempt.

use crate::error::{ClientError, ClientResult};
use radius_proto::Packet;
use tracing::debug;

/// A requested vendor-specific attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VendorAttributeSpec {
    pub vendor_id: u32,
    pub subtype: u8,
}

impl VendorAttributeSpec {
    pub fn new(vendor_id: u32, subtype: u8) -> Self {
        VendorAttributeSpec { vendor_id, subtype }
    }
}

/// One registry slot: the requested attribute and the value it last yielded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorAttributeResult {
    spec: VendorAttributeSpec,
    value: Option<Vec<u8>>,
}

impl VendorAttributeResult {
    pub fn spec(&self) -> VendorAttributeSpec {
        self.spec
    }

    pub fn is_present(&self) -> bool {
        self.value.is_some()
    }

    pub fn value(&self) -> Option<&[u8]> {
        self.value.as_deref()
    }

    pub fn len(&self) -> usize {
        self.value.as_ref().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Default)]
pub struct AttributeRegistry {
    slots: Vec<VendorAttributeResult>,
}

impl AttributeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a requested attribute with no result yet
    ///
    /// Duplicates get their own slot.
    pub fn add(&mut self, spec: VendorAttributeSpec) -> ClientResult<()> {
        self.slots
            .try_reserve(1)
            .map_err(|_| ClientError::OutOfMemory)?;
        self.slots.push(VendorAttributeResult { spec, value: None });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Every slot in insertion order
    pub fn results(&self) -> &[VendorAttributeResult] {
        &self.slots
    }

    /// Overwrite every slot from an accepted response
    ///
    /// Previous values are dropped; specs absent from the response become
    /// not present.
    pub fn extract_from(&mut self, response: &Packet) {
        for slot in &mut self.slots {
            slot.value = response.vendor_attribute(slot.spec.vendor_id, slot.spec.subtype);
            debug!(
                vendor_id = slot.spec.vendor_id,
                subtype = slot.spec.subtype,
                present = slot.value.is_some(),
                len = slot.len(),
                "Copied RADIUS attribute"
            );
        }
    }
}
