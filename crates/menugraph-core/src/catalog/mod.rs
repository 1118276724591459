//! Food catalog on top of the object graph
//!
//! Entity kinds and their ownership edges live in [`schema`], typed values in
//! [`model`]. Reads go through [`queries`], the refresh policy through
//! [`staleness`] and [`refresh`].

pub mod model;
pub mod queries;
pub mod refresh;
pub mod schema;
pub mod staleness;

pub use model::{
    install_cheese_border, install_dish, load_cheese_border, load_dish, load_variant,
    CatalogPayload, CheeseBorder, Dish, DishVariant, DoughOption, Money, Topping,
};
pub use queries::{
    catalog_state, categories, dish_handles, dishes_in_category, find_dish, owning_dish,
    snapshot_dish, CatalogState,
};
pub use refresh::{
    content_hash, delete_dish, refresh, refresh_at, refresh_with_callbacks, CatalogSource, JsonFileSource,
    RefreshError, RefreshOutcome,
};
pub use schema::catalog_schema;
pub use staleness::{needs_refresh, StalenessPolicy};
