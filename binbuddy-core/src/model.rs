//! Domain data structures for addresses, waste streams, and collection dates.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Metadata describing the council serving the collection dates.
pub struct CouncilMeta {
    /// Short identifier, used to namespace host entities.
    pub id: String,
    /// Display name, shown as the device manufacturer.
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
/// Opaque council identifier for one physical address.
pub struct LocationId(pub String);

impl fmt::Display for LocationId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Address returned from a council search.
pub struct AddressCandidate {
    /// Human-friendly single-line address.
    pub label: String,
    /// Identifier used when requesting collection dates.
    pub location_id: LocationId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
/// Waste streams collected at the kerb, keyed by bin lid colour.
pub enum WasteStream {
    /// General waste, red lid.
    #[serde(rename = "red")]
    General,
    /// Recycling, yellow lid.
    #[serde(rename = "yellow")]
    Recycling,
    /// Food and garden organics, green lid.
    #[serde(rename = "green")]
    Organics,
}

impl WasteStream {
    /// Every stream, in the order the council lists them.
    pub const ALL: [Self; 3] = [Self::General, Self::Recycling, Self::Organics];

    /// Canonical key for this stream (the lid colour).
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::General => "red",
            Self::Recycling => "yellow",
            Self::Organics => "green",
        }
    }

    /// CSS class the council puts on this stream's service container.
    #[must_use]
    pub const fn marker(self) -> &'static str {
        match self {
            Self::General => "general-waste",
            Self::Recycling => "recycling",
            Self::Organics => "food-and-garden-waste",
        }
    }

    /// Resolve a stream from a container CSS class.
    #[must_use]
    pub fn from_marker(class: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|stream| stream.marker() == class)
    }
}

impl fmt::Display for WasteStream {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.key())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
/// Next collection date per waste stream, as seen in a single refresh.
///
/// A missing stream means its date is unknown for this cycle.
pub struct CollectionDates(BTreeMap<WasteStream, NaiveDate>);

impl CollectionDates {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Date for the given stream, if known.
    #[must_use]
    pub fn get(&self, stream: WasteStream) -> Option<NaiveDate> {
        self.0.get(&stream).copied()
    }

    /// Record a date, replacing any earlier one for the same stream.
    pub fn insert(&mut self, stream: WasteStream, date: NaiveDate) {
        self.0.insert(stream, date);
    }

    /// Whether a date is known for the given stream.
    #[must_use]
    pub fn contains(&self, stream: WasteStream) -> bool {
        self.0.contains_key(&stream)
    }

    /// Number of streams with a known date.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no stream has a known date.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(WasteStream, NaiveDate)> for CollectionDates {
    fn from_iter<T: IntoIterator<Item = (WasteStream, NaiveDate)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Result of the setup flow: the address the user picked.
pub struct EntryConfig {
    /// Display title, the selected address label.
    pub title: String,
    /// Location identifier used for every refresh.
    #[serde(rename = "id")]
    pub location_id: LocationId,
}

impl From<AddressCandidate> for EntryConfig {
    fn from(candidate: AddressCandidate) -> Self {
        Self {
            title: candidate.label,
            location_id: candidate.location_id,
        }
    }
}
