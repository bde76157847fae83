use serde::{Deserialize, Serialize};

use crate::model::collection::{get_i64, get_string, ApiItemData};

/// A rink or venue registered on a division.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DivisionLocation {
    pub id: i64,
    pub type_field: Option<String>,
    pub address: Option<String>,
    pub name: Option<String>,
    pub notes: Option<String>,
    pub phone: Option<String>,
    pub division_id: Option<i64>,
    pub url: Option<String>,
}

impl DivisionLocation {
    pub fn from_data(data: &[ApiItemData]) -> Option<Self> {
        Some(DivisionLocation {
            id: get_i64(data, "id")?,
            type_field: get_string(data, "type"),
            address: get_string(data, "address"),
            name: get_string(data, "name"),
            notes: get_string(data, "notes"),
            phone: get_string(data, "phone"),
            division_id: get_i64(data, "division_id"),
            url: get_string(data, "url"),
        })
    }
}
