use serde::{Deserialize, Serialize};

use crate::model::collection::{get_bool, get_i64, get_string, ApiItemData};

/// A scheduled team event (game, practice, ...) as returned by `/v3/events`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub division_location_id: Option<i64>,
    pub is_canceled: Option<bool>,
    pub is_game: Option<bool>,
    pub is_tbd: Option<bool>,
    pub location_id: Option<i64>,
    pub name: Option<String>,
    pub opponent_id: Option<i64>,
    pub points_for_opponent: Option<i64>,
    pub points_for_team: Option<i64>,
    pub start_date: Option<String>,
    pub team_id: Option<i64>,
    pub time_zone_iana_name: Option<String>,
}

impl Event {
    /// Build from a collection item's attribute list. Returns None when there is no usable id.
    pub fn from_data(data: &[ApiItemData]) -> Option<Self> {
        Some(Event {
            id: get_i64(data, "id")?,
            division_location_id: get_i64(data, "division_location_id"),
            is_canceled: get_bool(data, "is_canceled"),
            is_game: get_bool(data, "is_game"),
            is_tbd: get_bool(data, "is_tbd"),
            location_id: get_i64(data, "location_id"),
            name: get_string(data, "name"),
            opponent_id: get_i64(data, "opponent_id"),
            points_for_opponent: get_i64(data, "points_for_opponent"),
            points_for_team: get_i64(data, "points_for_team"),
            start_date: get_string(data, "start_date"),
            team_id: get_i64(data, "team_id"),
            time_zone_iana_name: get_string(data, "time_zone_iana_name"),
        })
    }

    /// Games are flagged upstream, but many league games are only recognizable by their name.
    pub fn is_game_event(&self) -> bool {
        if self.is_game == Some(true) {
            return true;
        }
        self.name
            .as_deref()
            .map(|name| {
                let lower = name.to_lowercase();
                lower.contains(" vs ") || lower.contains(" @ ")
            })
            .unwrap_or(false)
    }

    pub fn is_canceled(&self) -> bool {
        self.is_canceled.unwrap_or(false)
    }
}
