use clap::Subcommand;

use super::act::ActArgs;
use super::cache::CacheArgs;
use super::locate::LocateArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Resolve an element description to a structured query
    Locate(LocateArgs),

    /// Plan and execute a plain-English instruction against a document
    Act(ActArgs),

    /// Inspect or clear a scoped query cache
    Cache(CacheArgs),

    /// Show the effective configuration
    Config,
}
