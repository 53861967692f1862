//! Refresh cycle coordinator: fetch, replace, and surface failures.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tracing::{error, info, warn};

use crate::model::{CollectionDates, EntryConfig, LocationId, WasteStream};
use crate::ports::{PortError, SchedulePort};

/// Regular interval between two refresh cycles.
pub const UPDATE_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Where the coordinator is in its refresh cycle.
///
/// `Success` and `Failed` are resting states; the next tick moves the
/// coordinator back through `Fetching`.
pub enum CycleState {
    /// No cycle has run yet.
    Idle,
    /// A request to the council is in flight.
    Fetching,
    /// The last cycle replaced the collection dates.
    Success,
    /// The last cycle failed and no dates are exposed.
    Failed,
}

#[derive(thiserror::Error, Debug)]
/// Errors surfaced by a refresh cycle.
pub enum RefreshError {
    /// The council could not be reached; the next tick retries.
    #[error("Failed to connect to the council's service")]
    UpdateFailed(#[source] PortError),
    /// The council answered with something unexpected; needs maintainer attention.
    #[error(transparent)]
    Service(PortError),
    /// The initial refresh during setup did not succeed.
    #[error("Council service not ready")]
    NotReady(#[source] Box<RefreshError>),
}

impl From<PortError> for RefreshError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::CannotConnect(_) => Self::UpdateFailed(err),
            PortError::Service(_) => Self::Service(err),
        }
    }
}

/// Owns the stored location and the latest collection dates for one entry.
///
/// Cycles take `&mut self`, so two cycles can never overlap on the same
/// coordinator. Callers sharing one across tasks must serialize access.
pub struct RefreshCoordinator {
    port: Arc<dyn SchedulePort>,
    entry: EntryConfig,
    data: Option<CollectionDates>,
    state: CycleState,
}

impl RefreshCoordinator {
    /// Create an idle coordinator for the given entry.
    #[must_use]
    pub fn new(port: Arc<dyn SchedulePort>, entry: EntryConfig) -> Self {
        Self {
            port,
            entry,
            data: None,
            state: CycleState::Idle,
        }
    }

    /// Entry this coordinator refreshes.
    #[must_use]
    pub fn entry(&self) -> &EntryConfig {
        &self.entry
    }

    /// Location identifier sent with every request.
    #[must_use]
    pub fn location(&self) -> &LocationId {
        &self.entry.location_id
    }

    /// Current cycle state.
    #[must_use]
    pub fn state(&self) -> CycleState {
        self.state
    }

    /// Whether the most recent cycle succeeded.
    #[must_use]
    pub fn last_update_success(&self) -> bool {
        self.state == CycleState::Success
    }

    /// Dates from the last successful cycle, or `None` after a failure.
    #[must_use]
    pub fn data(&self) -> Option<&CollectionDates> {
        self.data.as_ref()
    }

    /// Next collection date for one stream, if currently known.
    #[must_use]
    pub fn date_for(&self, stream: WasteStream) -> Option<NaiveDate> {
        self.data.as_ref().and_then(|dates| dates.get(stream))
    }

    /// Run one refresh cycle.
    ///
    /// On success the stored dates are replaced wholesale. On failure no dates
    /// are exposed until a later cycle succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`RefreshError::UpdateFailed`] when the council cannot be reached and
    /// [`RefreshError::Service`] for any other backend failure.
    pub async fn refresh(&mut self) -> Result<&CollectionDates, RefreshError> {
        self.state = CycleState::Fetching;

        match self.port.fetch_dates(&self.entry.location_id).await {
            Ok(dates) => {
                info!(
                    location = %self.entry.location_id,
                    streams = dates.len(),
                    "Collection dates refreshed"
                );
                self.state = CycleState::Success;
                Ok(&*self.data.insert(dates))
            }
            Err(err) => {
                self.state = CycleState::Failed;
                self.data = None;

                let refresh_err = RefreshError::from(err);
                match &refresh_err {
                    RefreshError::UpdateFailed(source) => {
                        warn!(location = %self.entry.location_id, "Update failed: {source}");
                    }
                    other => {
                        error!(location = %self.entry.location_id, "Refresh aborted: {other:?}");
                    }
                }
                Err(refresh_err)
            }
        }
    }

    /// Run the mandatory initial refresh performed at setup.
    ///
    /// # Errors
    ///
    /// Returns [`RefreshError::NotReady`] wrapping whatever made the cycle fail.
    pub async fn first_refresh(&mut self) -> Result<&CollectionDates, RefreshError> {
        self.refresh()
            .await
            .map_err(|err| RefreshError::NotReady(Box::new(err)))
    }
}
