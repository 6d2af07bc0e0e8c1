use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A selectable extra (drink, sauce, filling) grouped by `type`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MenuOption {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub option_type: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
}
