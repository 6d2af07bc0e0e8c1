pub mod category;
pub mod menu_item;
pub mod option;
pub mod order;
pub mod settings;
pub mod user;
