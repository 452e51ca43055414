//! Shared attribute table
//!
//! Stands in for the protocol stack's attribute storage: the acquisition
//! task writes through [`SharedAttributes`], the main task reads snapshots.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use climasense_core::publish::{AttributeStore, AttributeTable, AttributeValue, EndpointId, Status};

use crate::channels::ATTRIBUTE_CHANGED;

static TABLE: Mutex<CriticalSectionRawMutex, RefCell<AttributeTable>> =
    Mutex::new(RefCell::new(AttributeTable::new()));

/// Register the endpoint hosting the measurement clusters
pub fn register_endpoint(endpoint: EndpointId) {
    TABLE.lock(|table| table.borrow_mut().register(endpoint));
}

/// Copy of the current table
pub fn snapshot() -> AttributeTable {
    TABLE.lock(|table| *table.borrow())
}

/// Write handle to the shared table
///
/// Accepted writes raise [`ATTRIBUTE_CHANGED`].
pub struct SharedAttributes;

impl AttributeStore for SharedAttributes {
    fn set_attribute(&mut self, endpoint: EndpointId, value: AttributeValue) -> Status {
        let status = TABLE.lock(|table| table.borrow_mut().set_attribute(endpoint, value));
        if status.is_success() {
            ATTRIBUTE_CHANGED.signal(value.kind());
        }
        status
    }
}
