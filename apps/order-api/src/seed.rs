//! Demo data for a fresh store: an admin account and a small sample catalog.
//!
//! Each collection is seeded only while it is empty, so restarting with
//! `SEED_DEMO_DATA=true` never duplicates records.

use fastfood_common::id::{prefix, prefixed_ulid};

use crate::config::Config;
use crate::db::documents::{self, unique};
use crate::db::store::{Collection, DocumentStore};
use crate::error::ApiError;
use crate::models::category::MenuCategory;
use crate::models::menu_item::MenuItem;
use crate::models::option::MenuOption;
use crate::models::user::{self, Role};

const CATEGORIES: &[(&str, &str, &str)] = &[
    ("Menus", "menus", "#FF5733"),
    ("Tacos", "tacos", "#C70039"),
    ("Burgers", "burgers", "#FFC300"),
    ("Accompagnements", "sides", "#33FF57"),
    ("Boissons", "boissons", "#3357FF"),
];

const OPTIONS: &[(&str, &str, f64)] = &[
    ("Coca-Cola", "drinkOptions", 0.0),
    ("Fanta", "drinkOptions", 0.0),
    ("Eau Plate", "drinkOptions", 0.0),
    ("Ketchup", "sauceOptions", 0.0),
    ("Mayonnaise", "sauceOptions", 0.0),
    ("Algérienne", "sauceOptions", 0.5),
    ("Samouraï", "sauceOptions", 0.5),
    ("Poulet", "mainFillings", 0.0),
    ("Merguez", "mainFillings", 0.0),
    ("Cordon Bleu", "mainFillings", 0.0),
];

struct SampleItem {
    name: &'static str,
    description: &'static str,
    price: f64,
    category: &'static str,
    option_types: &'static [&'static str],
    removable: &'static [&'static str],
}

const ITEMS: &[SampleItem] = &[
    SampleItem {
        name: "Menu Classic Burger",
        description: "Le Classic Burger, frites, boisson 33cl.",
        price: 9.90,
        category: "menus",
        option_types: &["drinkOptions", "sauceOptions"],
        removable: &[],
    },
    SampleItem {
        name: "Tacos Poulet",
        description: "Tacos au poulet, frites et sauce fromagère.",
        price: 7.50,
        category: "tacos",
        option_types: &["mainFillings", "sauceOptions"],
        removable: &["Oignons"],
    },
    SampleItem {
        name: "Classic Burger",
        description: "Steak haché, cheddar, salade, tomates, oignons.",
        price: 6.90,
        category: "burgers",
        option_types: &["sauceOptions"],
        removable: &["Oignons", "Salade", "Tomates", "Cornichons"],
    },
    SampleItem {
        name: "Frites",
        description: "Portion de frites maison.",
        price: 2.50,
        category: "sides",
        option_types: &["sauceOptions"],
        removable: &[],
    },
    SampleItem {
        name: "Canette 33cl",
        description: "Boisson fraîche au choix.",
        price: 1.50,
        category: "boissons",
        option_types: &["drinkOptions"],
        removable: &[],
    },
];

/// Seed every empty collection. Returns the number of records written.
pub async fn seed_demo_data(store: &dyn DocumentStore, config: &Config) -> Result<usize, ApiError> {
    let mut written = 0;

    if store.list(Collection::Users).await?.is_empty() {
        let admin = user::create(
            store,
            &config.seed_admin_email,
            &config.seed_admin_password,
            Some("Admin".to_string()),
            Role::Admin,
        )
        .await?;
        tracing::info!(email = %admin.email, "seeded admin account");
        written += 1;
    }

    if store.list(Collection::MenuCategories).await?.is_empty() {
        for (name, category_type, font_color) in CATEGORIES {
            let id = prefixed_ulid(prefix::CATEGORY);
            if !documents::claim_unique(store, unique::CATEGORY_TYPE, category_type, &id).await? {
                tracing::warn!(%category_type, "category type already reserved, skipping");
                continue;
            }
            let category = MenuCategory {
                id,
                name: name.to_string(),
                category_type: category_type.to_string(),
                background_image_url: None,
                font_color: Some(font_color.to_string()),
                background_color: None,
            };
            documents::insert(store, Collection::MenuCategories, &category.id, &category).await?;
            written += 1;
        }
    }

    if store.list(Collection::Options).await?.is_empty() {
        for (name, option_type, price) in OPTIONS {
            let option = MenuOption {
                id: prefixed_ulid(prefix::OPTION),
                name: name.to_string(),
                option_type: option_type.to_string(),
                image_url: None,
                price: Some(*price),
            };
            documents::insert(store, Collection::Options, &option.id, &option).await?;
            written += 1;
        }
    }

    if store.list(Collection::MenuItems).await?.is_empty() {
        for sample in ITEMS {
            let item = MenuItem {
                id: prefixed_ulid(prefix::MENU_ITEM),
                name: sample.name.to_string(),
                description: Some(sample.description.to_string()),
                price: sample.price,
                image_url: None,
                category: sample.category.to_string(),
                option_types: sample.option_types.iter().map(|s| s.to_string()).collect(),
                removable_ingredients: sample.removable.iter().map(|s| s.to_string()).collect(),
            };
            documents::insert(store, Collection::MenuItems, &item.id, &item).await?;
            written += 1;
        }
    }

    tracing::info!(written, "demo data seeding finished");
    Ok(written)
}
