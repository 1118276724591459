//! Status command

use menugraph_core::catalog::schema::CHEESE_BORDER;
use menugraph_core::catalog::{catalog_state, categories, dish_handles, needs_refresh};

use crate::context::Context;

pub fn execute(ctx: &Context) -> anyhow::Result<()> {
    let store = &ctx.store;
    let state = catalog_state(store);

    let due = if needs_refresh(store, &ctx.policy()) {
        "yes"
    } else {
        "no"
    };
    println!("needs_refresh: {}", due);
    println!(
        "last_update: {}",
        state
            .last_update
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "never".to_string())
    );
    println!(
        "content_hash: {}",
        state.content_hash.as_deref().unwrap_or("-")
    );
    println!("categories: {}", categories(store).join(", "));
    println!("dishes: {}", dish_handles(store).len());
    println!("cheese_borders: {}", store.objects_of_kind(CHEESE_BORDER).len());
    println!("objects: {}", store.len());

    Ok(())
}
