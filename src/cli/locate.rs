use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use locus_llm_gateway::ProviderSelection;
use serde::Serialize;

use crate::cli::context::{CliContext, EngineOverrides};
use crate::cli::output::print_json;
use crate::config::DEFAULT_SCOPE;

#[derive(Args, Clone, Debug)]
pub struct LocateArgs {
    /// Natural-language description of the element
    pub description: String,

    /// HTML document to resolve against
    #[arg(long, value_name = "FILE")]
    pub html: PathBuf,

    /// Cache scope
    #[arg(long, default_value = DEFAULT_SCOPE)]
    pub scope: String,

    /// Override the configured provider
    #[arg(long)]
    pub provider: Option<ProviderSelection>,

    /// Override the configured model
    #[arg(long)]
    pub model: Option<String>,

    /// Skip reading and writing the query cache
    #[arg(long)]
    pub no_cache: bool,
}

#[derive(Serialize)]
struct LocateOutput<'a> {
    description: &'a str,
    query: String,
    #[serde(rename = "queryName")]
    query_name: &'static str,
    params: &'a [String],
    source: &'static str,
    matches: usize,
}

pub async fn cmd_locate(args: LocateArgs, ctx: &CliContext) -> Result<()> {
    let overrides = EngineOverrides {
        provider: args.provider,
        model: args.model.clone(),
        no_cache: args.no_cache,
    };
    let page = ctx.load_page(&args.html).await?;
    let gateway = ctx.gateway(&overrides)?;
    let engine = ctx.engine(page, gateway, &args.scope, &overrides)?;

    let resolution = engine.locate(&args.description).await;
    let matches = resolution.locator.count().await?;

    if ctx.output().is_json() {
        return print_json(&LocateOutput {
            description: &args.description,
            query: resolution.query.to_string(),
            query_name: resolution.query.kind.method_name(),
            params: &resolution.query.params,
            source: resolution.source.name(),
            matches,
        });
    }

    println!("{}", resolution.query);
    println!("  source:  {}", resolution.source);
    println!("  matches: {matches}");
    if resolution.is_fallback() {
        println!("  note:    model resolution failed; using the description as literal text");
    }
    Ok(())
}
