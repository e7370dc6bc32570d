use super::act::cmd_act;
use super::cache::cmd_cache;
use super::config::cmd_config;
use super::env::CliArgs;
use super::locate::cmd_locate;
use crate::cli::commands::Commands;
use crate::cli::context::CliContext;
use anyhow::Result;

pub async fn dispatch(cli: &CliArgs, ctx: &CliContext) -> Result<()> {
    match cli.command.clone() {
        Commands::Locate(args) => cmd_locate(args, ctx).await,
        Commands::Act(args) => cmd_act(args, ctx).await,
        Commands::Cache(args) => cmd_cache(args, ctx).await,
        Commands::Config => cmd_config(ctx),
    }
}
