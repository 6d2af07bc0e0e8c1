use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Category slug (`MenuCategory::category_type`).
    pub category: String,
    /// Option groups the customer picks from (e.g. `sauceOptions`).
    #[serde(default)]
    pub option_types: Vec<String>,
    #[serde(default)]
    pub removable_ingredients: Vec<String>,
}

impl MenuItem {
    pub fn in_category(&self, category: &str) -> bool {
        self.category.eq_ignore_ascii_case(category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_match_ignores_case() {
        let item: MenuItem = serde_json::from_value(serde_json::json!({
            "id": "item_1",
            "name": "Tacos Poulet",
            "price": 7.5,
            "category": "tacos",
        }))
        .unwrap();
        assert!(item.in_category("TACOS"));
        assert!(!item.in_category("taco"));
        assert!(item.option_types.is_empty());
    }
}
