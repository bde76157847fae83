use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;
use tracing::{error, info, info_span, instrument, warn};

use crate::cache::ResponseCache;
use crate::config::Config;
use crate::model::collection::{ApiItemData, ApiResponse};
use crate::model::division::Division;
use crate::model::division_location::DivisionLocation;
use crate::model::event::Event;
use crate::model::team::Team;

const API_BASE: &str = "https://api.teamsnap.com/v3";
// Tree and division searches are only served by the apiv3 host.
const APIV3_BASE: &str = "https://apiv3.teamsnap.com";
const CLIENT_ID_HEADER: &str = "X-Teamsnap-Client-Id";
const COLLECTION_JSON: &str = "application/vnd.collection+json";

#[derive(Debug, Error)]
pub enum TeamSnapError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: ureq::Error,
    },
    #[error("failed to read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: ureq::Error,
    },
    #[error("failed to decode collection from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Filters for `/v3/events/search`. Unset fields are left out of the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventQuery {
    pub ids: Vec<i64>,
    pub team_ids: Vec<i64>,
    pub started_after: Option<DateTime<Utc>>,
    pub started_before: Option<DateTime<Utc>>,
}

impl EventQuery {
    pub fn to_query_string(&self) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        if !self.ids.is_empty() {
            query.append_pair("id", &join_ids(&self.ids));
        }
        if !self.team_ids.is_empty() {
            query.append_pair("team_id", &join_ids(&self.team_ids));
        }
        if let Some(after) = self.started_after {
            query.append_pair("started_after", &after.to_rfc3339_opts(SecondsFormat::Millis, true));
        }
        if let Some(before) = self.started_before {
            query.append_pair("started_before", &before.to_rfc3339_opts(SecondsFormat::Millis, true));
        }
        query.finish()
    }
}

/// Client for the TeamSnap collection+json API.
///
/// Cheap to clone: clones share the HTTP agent and every cache.
#[derive(Clone)]
pub struct TeamSnap {
    agent: ureq::Agent,
    client_id: String,
    root_division_id: i64,
    event_by_id: ResponseCache<i64, Option<Event>>,
    event_searches: ResponseCache<String, Vec<Event>>,
    root_division: ResponseCache<(), Option<Division>>,
    root_division_teams: ResponseCache<(), Vec<Team>>,
}

impl TeamSnap {
    pub fn new(config: &Config) -> Self {
        let agent_config = ureq::Agent::config_builder()
            .timeout_global(Some(config.http_timeout))
            .http_status_as_error(false)
            .build();
        let agent = ureq::Agent::new_with_config(agent_config);
        let (capacity, ttl) = (config.cache_capacity, config.cache_ttl);
        TeamSnap {
            agent,
            client_id: config.teamsnap_client_id.clone(),
            root_division_id: config.root_division_id,
            event_by_id: ResponseCache::new(capacity, ttl),
            event_searches: ResponseCache::new(capacity, ttl),
            root_division: ResponseCache::new(1, ttl),
            root_division_teams: ResponseCache::new(1, ttl),
        }
    }

    pub fn root_division_id(&self) -> i64 {
        self.root_division_id
    }

    /// Drop every cached response, memoized root division included.
    pub fn invalidate_caches(&self) {
        self.event_by_id.invalidate_all();
        self.event_searches.invalidate_all();
        self.root_division.invalidate_all();
        self.root_division_teams.invalidate_all();
    }

    #[instrument(level = "info", skip(self))]
    pub fn get_event(&self, id: i64) -> Result<Option<Event>, TeamSnapError> {
        self.event_by_id.get_or_try_insert_with(id, || {
            let url = format!("{API_BASE}/events/{id}");
            let items = self.fetch_items(&url)?;
            Ok(first_of(items, Event::from_data))
        })
    }

    #[instrument(level = "info", skip(self))]
    pub fn search_events(&self, query: &EventQuery) -> Result<Vec<Event>, TeamSnapError> {
        let url = format!("{API_BASE}/events/search?{}", query.to_query_string());
        info!(url = %url, "Searching events");
        self.event_searches.get_or_try_insert_with(url.clone(), || {
            let items = self.fetch_items(&url)?;
            Ok(all_of(items, Event::from_data))
        })
    }

    #[instrument(level = "info", skip(self))]
    pub fn get_team(&self, id: i64) -> Result<Option<Team>, TeamSnapError> {
        let url = format!("{API_BASE}/teams/{id}");
        let items = self.fetch_items(&url)?;
        Ok(first_of(items, Team::from_data))
    }

    #[instrument(level = "info", skip(self))]
    pub fn search_teams(&self, ids: &[i64]) -> Result<Vec<Team>, TeamSnapError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let url = format!("{API_BASE}/teams/search?{}", id_query(ids));
        let items = self.fetch_items(&url)?;
        Ok(all_of(items, Team::from_data))
    }

    /// Active teams registered directly on `division_id`.
    #[instrument(level = "info", skip(self))]
    pub fn search_teams_by_division_id(&self, division_id: i64) -> Result<Vec<Team>, TeamSnapError> {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("division_id", &division_id.to_string())
            .append_pair("is_active", "true")
            .finish();
        let url = format!("{APIV3_BASE}/teams/division_search?{query}");
        let items = self.fetch_items(&url)?;
        Ok(all_of(items, Team::from_data))
    }

    pub fn team_all(&self) -> Team {
        Team::all(self.root_division_id)
    }

    /// Teams of the root division followed by the "All" team. Empty when the root
    /// division itself cannot be found.
    #[instrument(level = "info", skip(self))]
    pub fn get_root_division_teams(&self) -> Result<Vec<Team>, TeamSnapError> {
        self.root_division_teams.get_or_try_insert_with((), || {
            if self.get_root_division()?.is_none() {
                return Ok(Vec::new());
            }
            let mut teams = self.search_teams_by_division_id(self.root_division_id)?;
            teams.push(self.team_all());
            info!(team_count = teams.len(), "Loaded root division teams");
            Ok(teams)
        })
    }

    #[instrument(level = "info", skip(self))]
    pub fn get_division(&self, id: i64) -> Result<Option<Division>, TeamSnapError> {
        let url = format!("{API_BASE}/divisions/{id}");
        let items = self.fetch_items(&url)?;
        Ok(first_of(items, Division::from_data))
    }

    #[instrument(level = "info", skip(self))]
    pub fn get_root_division(&self) -> Result<Option<Division>, TeamSnapError> {
        self.root_division
            .get_or_try_insert_with((), || self.get_division(self.root_division_id))
    }

    /// The division `id` and every division below it.
    #[instrument(level = "info", skip(self))]
    pub fn get_division_tree(&self, id: i64) -> Result<Vec<Division>, TeamSnapError> {
        let url = format!("{APIV3_BASE}/v3/divisions/tree?id={id}");
        let items = self.fetch_items(&url)?;
        Ok(all_of(items, Division::from_data))
    }

    #[instrument(level = "info", skip(self))]
    pub fn get_division_location(&self, id: i64) -> Result<Option<DivisionLocation>, TeamSnapError> {
        let url = format!("{API_BASE}/division_locations/{id}");
        let items = self.fetch_items(&url)?;
        Ok(first_of(items, DivisionLocation::from_data))
    }

    #[instrument(level = "info", skip(self))]
    pub fn search_division_locations(&self, ids: &[i64]) -> Result<Vec<DivisionLocation>, TeamSnapError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let url = format!("{API_BASE}/division_locations/search?{}", id_query(ids));
        let items = self.fetch_items(&url)?;
        Ok(all_of(items, DivisionLocation::from_data))
    }

    /// GET a collection. Non-success statuses read as an empty collection.
    fn fetch_items(&self, url: &str) -> Result<Vec<Vec<ApiItemData>>, TeamSnapError> {
        let response_result = {
            let _span = info_span!("teamsnap_fetch", url = %url).entered();
            self.agent
                .get(url)
                .header(CLIENT_ID_HEADER, self.client_id.as_str())
                .header("Accept", COLLECTION_JSON)
                .call()
        };
        let response = match response_result {
            Ok(response) => response,
            Err(ureq::Error::StatusCode(code)) => {
                warn!(status = code, url = %url, "TeamSnap returned non-success status");
                return Ok(Vec::new());
            }
            Err(e) => {
                error!(error = %e, url = %url, "TeamSnap request failed");
                return Err(TeamSnapError::Request { url: url.to_string(), source: e });
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), url = %url, "TeamSnap returned non-success status");
            return Ok(Vec::new());
        }

        let mut body_reader = response.into_body();
        let body = body_reader.read_to_string().map_err(|e| {
            error!(error = %e, url = %url, "Failed to read TeamSnap response body");
            TeamSnapError::Body { url: url.to_string(), source: e }
        })?;
        parse_collection(&body).map_err(|e| {
            error!(error = %e, url = %url, "Failed to decode TeamSnap collection");
            TeamSnapError::Decode { url: url.to_string(), source: e }
        })
    }
}

/// Split a collection+json body into one attribute list per item.
#[instrument(level = "debug", skip(body), fields(bytes = body.len()))]
pub fn parse_collection(body: &str) -> Result<Vec<Vec<ApiItemData>>, serde_json::Error> {
    serde_json::from_str::<ApiResponse>(body).map(ApiResponse::into_item_data)
}

pub fn parse_events(body: &str) -> Result<Vec<Event>, serde_json::Error> {
    parse_collection(body).map(|items| all_of(items, Event::from_data))
}

pub fn parse_teams(body: &str) -> Result<Vec<Team>, serde_json::Error> {
    parse_collection(body).map(|items| all_of(items, Team::from_data))
}

pub fn parse_divisions(body: &str) -> Result<Vec<Division>, serde_json::Error> {
    parse_collection(body).map(|items| all_of(items, Division::from_data))
}

pub fn parse_division_locations(body: &str) -> Result<Vec<DivisionLocation>, serde_json::Error> {
    parse_collection(body).map(|items| all_of(items, DivisionLocation::from_data))
}

fn all_of<T>(items: Vec<Vec<ApiItemData>>, map: fn(&[ApiItemData]) -> Option<T>) -> Vec<T> {
    items.iter().filter_map(|data| map(data)).collect()
}

fn first_of<T>(items: Vec<Vec<ApiItemData>>, map: fn(&[ApiItemData]) -> Option<T>) -> Option<T> {
    items.iter().find_map(|data| map(data))
}

fn join_ids(ids: &[i64]) -> String {
    ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(",")
}

fn id_query(ids: &[i64]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .append_pair("id", &join_ids(ids))
        .finish()
}
