use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A menu section (e.g. "Burgers") shown as a tab in the ordering apps.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MenuCategory {
    pub id: String,
    pub name: String,
    /// Unique slug that menu items reference in their `category` field.
    #[serde(rename = "type")]
    pub category_type: String,
    #[serde(default)]
    pub background_image_url: Option<String>,
    #[serde(default)]
    pub font_color: Option<String>,
    #[serde(default)]
    pub background_color: Option<String>,
}
