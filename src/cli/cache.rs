use std::collections::BTreeMap;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use locus_snapshot_store::{JsonFileCache, QueryCache};

use crate::cli::context::CliContext;
use crate::cli::output::print_json;
use crate::config::DEFAULT_SCOPE;

#[derive(Args, Clone, Debug)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub action: CacheAction,

    /// Cache scope
    #[arg(long, default_value = DEFAULT_SCOPE, global = true)]
    pub scope: String,
}

#[derive(Subcommand, Clone, Debug)]
pub enum CacheAction {
    /// List cached descriptions and their queries
    Show,

    /// Remove the scope's cache file
    Clear,
}

pub async fn cmd_cache(args: CacheArgs, ctx: &CliContext) -> Result<()> {
    let path = ctx.config().cache_path(&args.scope)?;
    let cache = JsonFileCache::new(&path);

    match args.action {
        CacheAction::Show => {
            let entries: BTreeMap<_, _> = cache.read().await.into_iter().collect();
            if ctx.output().is_json() {
                return print_json(&entries);
            }
            println!("{} ({} entries)", path.display(), entries.len());
            for (description, query) in entries {
                println!("  {description:?} -> {query}");
            }
        }
        CacheAction::Clear => {
            cache
                .clear()
                .await
                .with_context(|| format!("Failed to remove {}", path.display()))?;
            println!("Cleared {}", path.display());
        }
    }
    Ok(())
}
