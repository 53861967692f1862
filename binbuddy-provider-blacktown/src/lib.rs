//! Backend for Blacktown City Council's "my area" waste services endpoints.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error};
use url::form_urlencoded;

use binbuddy_core::{
    model::{AddressCandidate, CollectionDates, CouncilMeta, LocationId},
    plugin::CouncilPlugin,
    ports::{AddressPort, PortError, SchedulePort},
};

/// Parsing of next-service date texts.
pub mod date_text;
/// HTML fragment extraction.
pub mod extract;

pub use extract::parse_collection_dates;

/// Address search endpoint; the URL-encoded search term is appended.
pub const SEARCH_URL: &str = "https://www.blacktown.nsw.gov.au/api/v1/myarea/search?keywords=";
/// Waste services endpoint; the location identifier is appended. Returns HTML inside JSON.
pub const DATES_URL: &str = "https://www.blacktown.nsw.gov.au/ocapi/Public/myarea/wasteservices?ocsvclang=en-AU&geolocationid=";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Base URLs of the two council endpoints.
pub struct Endpoints {
    /// Prefix for address searches.
    pub search_url: String,
    /// Prefix for waste services lookups.
    pub dates_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            search_url: SEARCH_URL.to_owned(),
            dates_url: DATES_URL.to_owned(),
        }
    }
}

impl Endpoints {
    fn search(&self, term: &str) -> String {
        format!("{}{}", self.search_url, encode(term))
    }

    fn dates(&self, location: &LocationId) -> String {
        format!("{}{}", self.dates_url, location.0)
    }
}

/// Response from the address search endpoint.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(rename = "Items")]
    items: Vec<SearchItem>,
}

/// Single match from the address search endpoint.
#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(rename = "Id")]
    id: String,
    #[serde(rename = "AddressSingleLine")]
    address_single_line: String,
    // also carries geometry and suburb fields, not needed here
}

/// Envelope around the waste services HTML fragment.
#[derive(Debug, Deserialize)]
struct WasteServicesResponse {
    #[serde(rename = "responseContent", default)]
    response_content: Option<String>,
}

/// Address search implementation for Blacktown.
pub struct BlacktownAddressPort {
    client: Client,
    meta: CouncilMeta,
    endpoints: Endpoints,
}

impl BlacktownAddressPort {
    /// Create a new address port bound to the given HTTP client.
    #[must_use]
    pub fn new(client: Client, endpoints: Endpoints) -> Self {
        Self {
            client,
            meta: council_meta(),
            endpoints,
        }
    }
}

#[async_trait]
impl AddressPort for BlacktownAddressPort {
    fn council(&self) -> &CouncilMeta {
        &self.meta
    }

    async fn search(&self, term: &str) -> Result<Vec<AddressCandidate>, PortError> {
        let url = self.endpoints.search(term);
        debug!(%url, "Searching for address");

        let resp = fetch_json::<SearchResponse>(self.client.get(url))
            .await
            .inspect_err(|err| error!("Error searching for address: {err}"))?;

        Ok(resp
            .items
            .into_iter()
            .map(|item| AddressCandidate {
                label: item.address_single_line,
                location_id: LocationId(item.id),
            })
            .collect())
    }
}

/// Collection date implementation for Blacktown.
pub struct BlacktownSchedulePort {
    client: Client,
    meta: CouncilMeta,
    endpoints: Endpoints,
}

impl BlacktownSchedulePort {
    /// Create a new schedule port bound to the given HTTP client.
    #[must_use]
    pub fn new(client: Client, endpoints: Endpoints) -> Self {
        Self {
            client,
            meta: council_meta(),
            endpoints,
        }
    }
}

#[async_trait]
impl SchedulePort for BlacktownSchedulePort {
    fn council(&self) -> &CouncilMeta {
        &self.meta
    }

    async fn fetch_dates(&self, location: &LocationId) -> Result<CollectionDates, PortError> {
        let url = self.endpoints.dates(location);
        debug!(%url, "Fetching waste collection dates");

        let envelope = fetch_json::<WasteServicesResponse>(self.client.get(url))
            .await
            .inspect_err(|err| error!("Error fetching waste collection dates: {err}"))?;

        let Some(html) = envelope.response_content else {
            let err = PortError::Service("response envelope has no responseContent".to_owned());
            error!(%location, "Unexpected waste services response: {err}");
            return Err(err);
        };

        Ok(parse_collection_dates(&html))
    }
}

/// Build the plugin bundle for the Blacktown backend.
#[must_use]
pub fn plugin(client: Client, endpoints: Endpoints) -> CouncilPlugin {
    let address_port = Arc::new(BlacktownAddressPort::new(client.clone(), endpoints.clone()));
    let schedule_port = Arc::new(BlacktownSchedulePort::new(client, endpoints));

    CouncilPlugin {
        meta: council_meta(),
        address_port,
        schedule_port,
    }
}

fn council_meta() -> CouncilMeta {
    CouncilMeta {
        id: String::from("blacktown_bin_buddy"),
        name: String::from("Blacktown City Council"),
    }
}

fn encode(segment: &str) -> String {
    form_urlencoded::byte_serialize(segment.as_bytes()).collect()
}

// Small helper to fetch and decode JSON with status handling.
async fn fetch_json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, PortError> {
    req.send()
        .await
        .map_err(PortError::from)?
        .error_for_status()
        .map_err(PortError::from)?
        .json()
        .await
        .map_err(PortError::from)
}
