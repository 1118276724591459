//! Ownership schema of the food catalog

use crate::schema::Schema;

pub const DISH: &str = "Dish";
pub const DISH_VARIANT: &str = "DishVariant";
pub const DOUGH_OPTION: &str = "DoughOption";
pub const TOPPING: &str = "Topping";
pub const CHEESE_BORDER: &str = "CheeseBorder";
pub const MONEY: &str = "Money";
pub const CATALOG_STATE: &str = "CatalogState";

/// Schema of every catalog entity kind
///
/// A variant's owning dish is not declared: it is read from the store's
/// reverse index (see [`owning_dish`](super::owning_dish)).
pub fn catalog_schema() -> Schema {
    Schema::builder()
        .entity(DISH)
        .scalar("external_id")
        .scalar("name")
        .scalar("description")
        .scalar("category")
        .scalar("sort_order")
        .owns_many("variants")
        .owns_one("price")
        .owns_one("old_price")
        .owns_many("toppings")
        .entity(DISH_VARIANT)
        .scalar("external_id")
        .scalar("name")
        .scalar("weight")
        .owns_many("doughs")
        .owns_one("price")
        .refers_one("cheese_border")
        .entity(DOUGH_OPTION)
        .scalar("external_id")
        .scalar("name")
        .entity(TOPPING)
        .scalar("external_id")
        .scalar("name")
        .owns_one("price")
        .entity(CHEESE_BORDER)
        .scalar("external_id")
        .scalar("name")
        .owns_one("price")
        .entity(MONEY)
        .scalar("amount")
        .entity(CATALOG_STATE)
        .scalar("last_update")
        .scalar("content_hash")
        .build()
}
