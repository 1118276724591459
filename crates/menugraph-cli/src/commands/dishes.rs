//! Dish listing

use clap::Args;

use menugraph_core::catalog::{categories, dishes_in_category};
use menugraph_core::errors::ExError;

use crate::context::Context;

#[derive(Debug, Args)]
pub struct DishesArgs {
    pub category: String,
}

pub fn execute(ctx: &Context, args: DishesArgs) -> anyhow::Result<()> {
    let dishes = dishes_in_category(&ctx.store, &args.category).map_err(ExError::from)?;

    if dishes.is_empty() {
        println!(
            "No dishes in category '{}' (known: {})",
            args.category,
            categories(&ctx.store).join(", ")
        );
        return Ok(());
    }

    for (_, dish) in dishes {
        let price = dish
            .price
            .map(|m| m.amount.format_with_suffix(ctx.currency()))
            .unwrap_or_else(|| "-".to_string());
        println!("{}\t{}\t{}", dish.external_id, dish.name, price);
    }

    Ok(())
}
