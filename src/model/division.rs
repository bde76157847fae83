use serde::{Deserialize, Serialize};

use crate::model::collection::{get_bool, get_i64, get_string, ApiItemData};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Division {
    pub id: i64,
    pub persistent_uuid: Option<String>,
    pub formatted_persistent_uuid: Option<String>,
    pub parent_id: Option<i64>,
    pub name: Option<String>,
    pub season_name: Option<String>,
    pub is_archived: Option<bool>,
    pub time_zone_iana_name: Option<String>,
}

impl Division {
    pub fn from_data(data: &[ApiItemData]) -> Option<Self> {
        Some(Division {
            id: get_i64(data, "id")?,
            persistent_uuid: get_string(data, "persistent_uuid"),
            formatted_persistent_uuid: get_string(data, "formatted_persistent_uuid"),
            parent_id: get_i64(data, "parent_id"),
            name: get_string(data, "name"),
            season_name: get_string(data, "season_name"),
            is_archived: get_bool(data, "is_archived"),
            time_zone_iana_name: get_string(data, "time_zone_iana_name"),
        })
    }
}
