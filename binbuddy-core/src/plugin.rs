//! Bundle of ports implementing one council backend.

use std::sync::Arc;

use crate::model::CouncilMeta;
use crate::ports::{AddressPort, SchedulePort};

/// Collection of ports implementing the backend for a single council.
pub struct CouncilPlugin {
    /// Static metadata describing the council.
    pub meta: CouncilMeta,
    /// Implementation for searching addresses.
    pub address_port: Arc<dyn AddressPort>,
    /// Implementation for fetching collection dates.
    pub schedule_port: Arc<dyn SchedulePort>,
}
