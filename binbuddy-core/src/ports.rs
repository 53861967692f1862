//! Traits describing council backend capabilities and their error type.

use std::error::Error as StdError;

use async_trait::async_trait;
use reqwest::Error as ReqwestError;

use crate::model::{AddressCandidate, CollectionDates, CouncilMeta, LocationId};

/// Boxed transport error kept as the source of [`PortError::CannotConnect`].
pub type BoxError = Box<dyn StdError + Send + Sync>;

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while talking to the council backend.
pub enum PortError {
    /// Transport failed: DNS, connection, timeout, or a non-success status.
    #[error("Cannot connect: {0}")]
    CannotConnect(#[source] BoxError),
    /// The council answered with something we could not make sense of.
    #[error("Service error: {0}")]
    Service(String),
}

impl PortError {
    /// Whether this error is a recoverable transport failure.
    #[must_use]
    pub fn is_cannot_connect(&self) -> bool {
        matches!(self, Self::CannotConnect(_))
    }
}

impl From<ReqwestError> for PortError {
    fn from(err: ReqwestError) -> Self {
        if err.is_decode() {
            Self::Service(format!("Malformed response body: {err}"))
        } else {
            Self::CannotConnect(Box::new(err))
        }
    }
}

#[async_trait]
/// Trait for council address search backends.
pub trait AddressPort: Send + Sync {
    /// Metadata describing the council handled by this port.
    fn council(&self) -> &CouncilMeta;

    /// Look up candidate addresses for a free-text search term.
    ///
    /// An empty result is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::CannotConnect`] when the request cannot be completed and
    /// [`PortError::Service`] when the response cannot be understood.
    async fn search(&self, term: &str) -> Result<Vec<AddressCandidate>, PortError>;
}

#[async_trait]
/// Trait for council collection-date backends.
pub trait SchedulePort: Send + Sync {
    /// Metadata describing the council handled by this port.
    fn council(&self) -> &CouncilMeta;

    /// Fetch the next collection date for every stream the council lists.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::CannotConnect`] when the request cannot be completed and
    /// [`PortError::Service`] when the response envelope is not as expected.
    async fn fetch_dates(&self, location: &LocationId) -> Result<CollectionDates, PortError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_errors_are_not_transport_errors() {
        let err = PortError::Service("response envelope has no responseContent".to_owned());

        assert!(!err.is_cannot_connect(), "service errors are not transport errors");
        assert_eq!(
            err.to_string(),
            "Service error: response envelope has no responseContent"
        );
    }

    #[test]
    fn boxed_messages_are_transport_errors() {
        let err = PortError::CannotConnect("connection refused".into());

        assert!(err.is_cannot_connect(), "expected a transport failure");
        assert_eq!(err.to_string(), "Cannot connect: connection refused");
    }
}
