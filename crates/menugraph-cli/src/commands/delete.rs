//! Cascade delete of one dish

use clap::Args;

use menugraph_core::catalog::delete_dish;
use menugraph_core::errors::ExError;

use crate::context::Context;

#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// External id of the dish
    pub dish_id: String,
}

pub fn execute(ctx: &mut Context, args: DeleteArgs) -> anyhow::Result<()> {
    let dish = ctx.dish(&args.dish_id)?;
    let report = delete_dish(&mut ctx.store, dish).map_err(ExError::from)?;
    println!("Deleted dish '{}' ({} objects)", args.dish_id, report.len());
    Ok(())
}
