use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Envelope of a collection+json response: `{ "collection": { "items": [ { "data": [...] } ] } }`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub collection: Option<Collection>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Collection {
    #[serde(default)]
    pub items: Option<Vec<Item>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Item {
    #[serde(default)]
    pub data: Vec<ApiItemData>,
}

/// One `{name, value, type}` attribute triple.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiItemData {
    pub name: String,
    #[serde(default)]
    pub value: Value,
    #[serde(rename = "type", default)]
    pub type_field: Option<String>,
}

impl ApiResponse {
    /// Consume the envelope and yield each item's attribute list, in response order.
    pub fn into_item_data(self) -> Vec<Vec<ApiItemData>> {
        self.collection
            .and_then(|c| c.items)
            .unwrap_or_default()
            .into_iter()
            .map(|item| item.data)
            .collect()
    }
}

/// Raw value of the attribute called `name`. JSON `null` counts as absent.
pub fn find_value<'a>(data: &'a [ApiItemData], name: &str) -> Option<&'a Value> {
    data.iter()
        .find(|d| d.name == name)
        .map(|d| &d.value)
        .filter(|v| !v.is_null())
}

pub fn get_i64(data: &[ApiItemData], name: &str) -> Option<i64> {
    match find_value(data, name)? {
        Value::Number(n) => n.as_i64(),
        // Some ids come back as strings
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

pub fn get_string(data: &[ApiItemData], name: &str) -> Option<String> {
    match find_value(data, name)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub fn get_bool(data: &[ApiItemData], name: &str) -> Option<bool> {
    match find_value(data, name)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}
