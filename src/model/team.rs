use serde::{Deserialize, Serialize};

use crate::model::collection::{get_bool, get_i64, get_string, ApiItemData};

/// Id of the synthetic team standing for "every team of the root division".
pub const TEAM_ALL_ID: i64 = -1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: i64,
    pub division_id: Option<i64>,
    pub division_name: Option<String>,
    pub is_retired: Option<bool>,
    pub name: Option<String>,
    pub season_name: Option<String>,
    pub time_zone_iana_name: Option<String>,
}

impl Team {
    pub fn from_data(data: &[ApiItemData]) -> Option<Self> {
        Some(Team {
            id: get_i64(data, "id")?,
            division_id: get_i64(data, "division_id"),
            division_name: get_string(data, "division_name"),
            is_retired: get_bool(data, "is_retired"),
            name: get_string(data, "name"),
            season_name: get_string(data, "season_name"),
            time_zone_iana_name: get_string(data, "time_zone_iana_name"),
        })
    }

    /// The "All/Tous" pseudo team, attached to the root division so it shows up in its menu.
    pub fn all(root_division_id: i64) -> Self {
        Team {
            id: TEAM_ALL_ID,
            division_id: Some(root_division_id),
            division_name: None,
            is_retired: None,
            name: Some("All/Tous".to_string()),
            season_name: None,
            time_zone_iana_name: None,
        }
    }

    pub fn is_all(&self) -> bool {
        self.id == TEAM_ALL_ID
    }

    /// Display name, falling back to the id like the navigation menu does.
    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.id.to_string())
    }
}
