use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use locus_agent_core::ActionExecutor;
use locus_llm_gateway::ProviderSelection;
use serde_json::json;

use crate::cli::context::{CliContext, EngineOverrides};
use crate::cli::output::print_json;
use crate::config::DEFAULT_SCOPE;

#[derive(Args, Clone, Debug)]
pub struct ActArgs {
    /// Plain-English instruction, e.g. "click the submit button"
    pub instruction: String,

    /// HTML document to act on
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

    /// Additional plan requests after an unparseable reply
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Skip reading and writing the query cache
    #[arg(long)]
    pub no_cache: bool,
}

pub async fn cmd_act(args: ActArgs, ctx: &CliContext) -> Result<()> {
    let overrides = EngineOverrides {
        provider: args.provider,
        model: args.model.clone(),
        no_cache: args.no_cache,
    };
    let page = ctx.load_page(&args.html).await?;
    let gateway = ctx.gateway(&overrides)?;
    let engine = ctx.engine(page.clone(), gateway.clone(), &args.scope, &overrides)?;
    let executor = ActionExecutor::new(Arc::new(engine), gateway).with_max_retries(
        args.max_retries
            .unwrap_or(ctx.config().resolution.max_retries),
    );

    let report = executor.execute(&args.instruction).await?;
    let dispatched = page.dispatched();

    if ctx.output().is_json() {
        return print_json(&json!({
            "instruction": args.instruction,
            "report": report,
            "dispatched": dispatched,
        }));
    }

    let plan = &report.plan;
    println!("plan:     {} \"{}\"", plan.action, plan.target_description);
    if let Some(value) = &plan.value {
        println!("value:    {value}");
    }
    println!("query:    {} ({})", report.query, report.source);
    println!("locator:  {}", report.locator);
    println!("attempts: {}", report.attempts);
    for action in dispatched {
        println!(
            "dispatched {} on <{}> {:?}",
            action.action, action.tag, action.name
        );
    }
    Ok(())
}
