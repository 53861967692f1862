//! Date entities the host exposes, one per waste stream.

use chrono::NaiveDate;

use crate::model::{CollectionDates, CouncilMeta, WasteStream};
use crate::refresh::RefreshCoordinator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Static description of one collection-date entity.
pub struct EntityDescription {
    /// Stream whose date the entity shows.
    pub stream: WasteStream,
    /// Display name.
    pub name: &'static str,
    /// Key into the host's translation tables.
    pub translation_key: &'static str,
    /// Material Design icon.
    pub icon: &'static str,
}

impl EntityDescription {
    /// Entity key, the stream's lid colour.
    #[must_use]
    pub fn key(&self) -> &'static str {
        self.stream.key()
    }

    /// Read this entity's value out of a collection-date map.
    #[must_use]
    pub fn value(&self, dates: &CollectionDates) -> Option<NaiveDate> {
        dates.get(self.stream)
    }
}

/// Entities for every stream, in display order.
pub const ENTITIES: [EntityDescription; 3] = [
    EntityDescription {
        stream: WasteStream::General,
        name: "General Waste",
        translation_key: "general_waste",
        icon: "mdi:trash-can",
    },
    EntityDescription {
        stream: WasteStream::Recycling,
        name: "Recycling",
        translation_key: "recycling",
        icon: "mdi:recycle",
    },
    EntityDescription {
        stream: WasteStream::Organics,
        name: "Food and Garden Waste",
        translation_key: "food_and_garden_waste",
        icon: "mdi:leaf",
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
/// Device grouping all entities of one entry.
pub struct DeviceInfo {
    /// `(namespace, entry id)` identifier pair.
    pub identifier: (String, String),
    /// Device name.
    pub name: String,
    /// Council operating the collection.
    pub manufacturer: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Collection-date entity bound to one configured entry.
pub struct DateEntity {
    description: EntityDescription,
    unique_id: String,
    device: DeviceInfo,
}

impl DateEntity {
    /// Bind a description to an entry.
    #[must_use]
    pub fn new(council: &CouncilMeta, entry_id: &str, description: EntityDescription) -> Self {
        Self {
            unique_id: format!("{entry_id}_{}", description.key()),
            device: DeviceInfo {
                identifier: (council.id.clone(), entry_id.to_owned()),
                name: "Bin Collection".to_owned(),
                manufacturer: council.name.clone(),
            },
            description,
        }
    }

    /// Static description.
    #[must_use]
    pub fn description(&self) -> &EntityDescription {
        &self.description
    }

    /// Stable identifier, unique across entries.
    #[must_use]
    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    /// Device this entity belongs to.
    #[must_use]
    pub fn device(&self) -> &DeviceInfo {
        &self.device
    }

    /// Current value, unknown while the last cycle failed.
    #[must_use]
    pub fn native_value(&self, coordinator: &RefreshCoordinator) -> Option<NaiveDate> {
        coordinator
            .data()
            .and_then(|dates| self.description.value(dates))
    }
}

/// Create entities for the streams present after the initial refresh.
#[must_use]
pub fn entities_for(council: &CouncilMeta, entry_id: &str, dates: &CollectionDates) -> Vec<DateEntity> {
    ENTITIES
        .into_iter()
        .filter(|description| dates.contains(description.stream))
        .map(|description| DateEntity::new(council, entry_id, description))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{EntryConfig, LocationId};
    use crate::ports::{PortError, SchedulePort};

    fn council() -> CouncilMeta {
        CouncilMeta {
            id: "blacktown_bin_buddy".to_owned(),
            name: "Blacktown City Council".to_owned(),
        }
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    struct FixedPort(CouncilMeta, CollectionDates);

    #[async_trait]
    impl SchedulePort for FixedPort {
        fn council(&self) -> &CouncilMeta {
            &self.0
        }

        async fn fetch_dates(&self, _location: &LocationId) -> Result<CollectionDates, PortError> {
            Ok(self.1.clone())
        }
    }

    #[test]
    fn entities_only_for_present_streams() {
        let dates: CollectionDates = [
            (WasteStream::General, date(2025, 9, 16)),
            (WasteStream::Organics, date(2025, 10, 1)),
        ]
        .into_iter()
        .collect();

        let entities = entities_for(&council(), "test-entry-id", &dates);
        let keys: Vec<_> = entities.iter().map(|entity| entity.description().key()).collect();

        assert_eq!(keys, vec!["red", "green"]);
    }

    #[test]
    fn entity_identity_and_device() {
        let entity = DateEntity::new(&council(), "test-entry-id", ENTITIES[0]);

        assert_eq!(entity.unique_id(), "test-entry-id_red");
        assert_eq!(
            entity.device().identifier,
            ("blacktown_bin_buddy".to_owned(), "test-entry-id".to_owned())
        );
        assert_eq!(entity.device().name, "Bin Collection");
        assert_eq!(entity.device().manufacturer, "Blacktown City Council");
    }

    #[tokio::test]
    async fn native_value_reads_coordinator_data() {
        let dates: CollectionDates = [(WasteStream::General, date(2025, 9, 16))]
            .into_iter()
            .collect();
        let port = Arc::new(FixedPort(council(), dates));
        let mut coordinator = RefreshCoordinator::new(
            port,
            EntryConfig {
                title: "1 Test St".to_owned(),
                location_id: LocationId("test-geo-id".to_owned()),
            },
        );
        let general = DateEntity::new(&council(), "entry", ENTITIES[0]);
        let recycling = DateEntity::new(&council(), "entry", ENTITIES[1]);

        assert_eq!(general.native_value(&coordinator), None);
        coordinator.refresh().await.expect("refresh succeeds");

        assert_eq!(general.native_value(&coordinator), Some(date(2025, 9, 16)));
        assert_eq!(recycling.native_value(&coordinator), None);
    }
}
