//! Refresh command
//!
//! Usage: menugraph refresh <PAYLOAD> [--force]

use clap::Args;
use std::path::PathBuf;

use menugraph_core::catalog::{catalog_state, refresh, JsonFileSource, RefreshOutcome};
use menugraph_core::errors::ExError;

use crate::context::Context;

#[derive(Debug, Args)]
pub struct RefreshArgs {
    /// Catalog payload (JSON)
    pub payload: PathBuf,

    /// Refresh even if the cached catalog is still fresh
    #[arg(long)]
    pub force: bool,
}

pub fn execute(ctx: &mut Context, args: RefreshArgs) -> anyhow::Result<()> {
    let policy = ctx.policy();
    let mut source = JsonFileSource::new(&args.payload);

    let outcome =
        refresh(&mut ctx.store, &mut source, &policy, args.force).map_err(ExError::from)?;

    match outcome {
        RefreshOutcome::Skipped => {
            let state = catalog_state(&ctx.store);
            let last = state
                .last_update
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "never".to_string());
            println!("Catalog is fresh (last update {}); use --force to refresh anyway", last);
        }
        RefreshOutcome::Unchanged => println!("Catalog unchanged"),
        RefreshOutcome::Refreshed { dishes } => {
            println!("Catalog refreshed: {} dishes", dishes)
        }
    }

    Ok(())
}
