//! Deep-copy snapshot of a dish, printed as JSON

use anyhow::Context as _;
use clap::Args;

use menugraph_core::catalog::snapshot_dish;
use menugraph_core::errors::ExError;

use crate::context::Context;

#[derive(Debug, Args)]
pub struct SnapshotArgs {
    /// External id of the dish
    pub dish_id: String,
}

pub fn execute(ctx: &Context, args: SnapshotArgs) -> anyhow::Result<()> {
    let handle = ctx.dish(&args.dish_id)?;
    let dish = snapshot_dish(&ctx.store, handle)
        .map_err(ExError::from)?
        .with_context(|| format!("dish '{}' vanished during copy", args.dish_id))?;

    println!("{}", serde_json::to_string_pretty(&dish)?);
    Ok(())
}
