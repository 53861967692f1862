//! Extraction of collection dates from the council's waste services fragment.

use std::sync::LazyLock;

use binbuddy_core::model::{CollectionDates, WasteStream};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};

use crate::date_text::parse_next_service;

static SERVICE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.regular-service").expect("valid selector"));
static NEXT_SERVICE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.next-service").expect("valid selector"));

/// Parse the waste services HTML fragment into next collection dates.
///
/// Never fails: unknown containers are skipped and unparseable dates leave
/// their stream out. An organics placeholder falls back to the general waste
/// date when that one was already found, since the council advertises
/// "same day as general waste" instead of a date.
#[must_use]
pub fn parse_collection_dates(html: &str) -> CollectionDates {
    let fragment = Html::parse_fragment(html);
    let containers: Vec<ElementRef<'_>> = fragment.select(&SERVICE_SELECTOR).collect();
    info!("Found {} service elements in HTML", containers.len());

    let mut dates = CollectionDates::new();

    for container in containers {
        let Some(stream) = stream_of(container) else {
            debug!(
                classes = ?container.value().classes().collect::<Vec<_>>(),
                "Skipping unrecognised service container"
            );
            continue;
        };

        let Some(next_service) = container.select(&NEXT_SERVICE_SELECTOR).next() else {
            debug!(%stream, "Service container has no next-service element");
            continue;
        };

        let raw = next_service.text().collect::<String>();
        let text = raw.trim();

        match parse_next_service(text) {
            Ok(date) => dates.insert(stream, date),
            Err(err) => {
                warn!(%stream, "Could not parse date string: '{text}'. Error: {err}");

                if stream == WasteStream::Organics
                    && let Some(general) = dates.get(WasteStream::General)
                {
                    debug!(%general, "Organics collected on the general waste day");
                    dates.insert(WasteStream::Organics, general);
                }
            }
        }
    }

    if dates.is_empty() {
        warn!("Could not parse any collection dates from the HTML content");
    }

    dates
}

fn stream_of(container: ElementRef<'_>) -> Option<WasteStream> {
    container.value().classes().find_map(WasteStream::from_marker)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    fn container(marker: &str, next_service: &str) -> String {
        format!(
            r#"<div class="regular-service {marker}">
    <div class="service-image"><img src="/lid.png"></div>
    <div class="next-service">
        {next_service}
    </div>
</div>"#
        )
    }

    #[test]
    fn all_three_streams() {
        let html = [
            container("general-waste", "Tue 16/9/2025"),
            container("recycling", "Tue 23/9/2025"),
            container("food-and-garden-waste", "Wed 1/10/2025"),
        ]
        .concat();

        let dates = parse_collection_dates(&html);

        assert_eq!(
            dates,
            [
                (WasteStream::General, date(2025, 9, 16)),
                (WasteStream::Recycling, date(2025, 9, 23)),
                (WasteStream::Organics, date(2025, 10, 1)),
            ]
            .into_iter()
            .collect::<CollectionDates>()
        );
    }

    #[test]
    fn long_form_dates() {
        let html = [
            container("general-waste", "Tuesday, 16 September 2025"),
            container("recycling", "Tuesday, 23 September 2025"),
        ]
        .concat();

        let dates = parse_collection_dates(&html);

        assert_eq!(dates.get(WasteStream::General), Some(date(2025, 9, 16)));
        assert_eq!(dates.get(WasteStream::Recycling), Some(date(2025, 9, 23)));
        assert_eq!(dates.get(WasteStream::Organics), None);
    }

    #[test]
    fn organics_placeholder_takes_general_date() {
        let html = [
            container("general-waste", "Tue 16/9/2025"),
            container("recycling", "Tue 23/9/2025"),
            container("food-and-garden-waste", "Same day as general waste"),
        ]
        .concat();

        let dates = parse_collection_dates(&html);

        assert_eq!(dates.get(WasteStream::Organics), Some(date(2025, 9, 16)));
    }

    #[test]
    fn two_digit_years_are_treated_as_unparseable() {
        let html = [
            container("general-waste", "Tue 16/9/2025"),
            container("recycling", "Tue 23/9/25"),
            container("food-and-garden-waste", "Tue 16/9/25"),
        ]
        .concat();

        let dates = parse_collection_dates(&html);

        assert_eq!(dates.get(WasteStream::Recycling), None);
        assert_eq!(dates.get(WasteStream::Organics), Some(date(2025, 9, 16)));
    }

    #[test]
    fn organics_placeholder_without_general_is_absent() {
        let html = [
            container("general-waste", "to be confirmed"),
            container("food-and-garden-waste", "Same day as general waste"),
        ]
        .concat();

        let dates = parse_collection_dates(&html);

        assert!(dates.is_empty(), "got {dates:?}");
    }

    #[test]
    fn organics_placeholder_before_general_is_absent() {
        let html = [
            container("food-and-garden-waste", "Same day as general waste"),
            container("general-waste", "Tue 16/9/2025"),
        ]
        .concat();

        let dates = parse_collection_dates(&html);

        assert_eq!(dates.get(WasteStream::General), Some(date(2025, 9, 16)));
        assert_eq!(dates.get(WasteStream::Organics), None);
    }

    #[test]
    fn unparseable_recycling_does_not_abort() {
        let html = [
            container("recycling", "Not available"),
            container("general-waste", "Tue 16/9/2025"),
        ]
        .concat();

        let dates = parse_collection_dates(&html);

        assert_eq!(dates.len(), 1);
        assert_eq!(dates.get(WasteStream::General), Some(date(2025, 9, 16)));
    }

    #[test]
    fn unknown_containers_are_skipped() {
        let html = [
            container("bulky-waste", "Mon 6/10/2025"),
            container("recycling", "Tue 23/9/2025"),
        ]
        .concat();

        let dates = parse_collection_dates(&html);

        assert_eq!(
            dates,
            [(WasteStream::Recycling, date(2025, 9, 23))]
                .into_iter()
                .collect::<CollectionDates>()
        );
    }

    #[test]
    fn no_containers_yield_empty_map() {
        assert!(parse_collection_dates("<p>No services found</p>").is_empty());
        assert!(parse_collection_dates("").is_empty());
    }

    #[test]
    fn container_without_next_service_is_skipped() {
        let html = r#"<div class="regular-service general-waste"><div class="service-name">General</div></div>"#;

        assert!(parse_collection_dates(html).is_empty());
    }

    #[test]
    fn survives_broken_markup() {
        let html = concat!(
            r#"<div class="regular-service general-waste"><div class="next-service">Tue 16/9/2025</div></p></span></div>"#,
            r#"<div class="regular-service recycling"><div class="next-service">Tue 23/9/2025"#,
        );

        let dates = parse_collection_dates(html);

        assert_eq!(dates.get(WasteStream::General), Some(date(2025, 9, 16)));
        assert_eq!(dates.get(WasteStream::Recycling), Some(date(2025, 9, 23)));
    }
}
