use anyhow::Result;

use crate::cli::context::CliContext;
use crate::cli::output::print_json;

pub fn cmd_config(ctx: &CliContext) -> Result<()> {
    let config = ctx.config().redacted();
    if ctx.output().is_json() {
        return print_json(&config);
    }
    match ctx.config_path() {
        Some(path) if path.exists() => println!("# {}", path.display()),
        _ => println!("# defaults"),
    }
    print!("{}", serde_yaml::to_string(&config)?);
    Ok(())
}
