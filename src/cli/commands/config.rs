//! reel config - Show the effective configuration

use clap::Args;

use crate::cli::output::{HumanLayout, emit_human, emit_robot, robot_ok};
use crate::config::Config;
use crate::error::Result;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Print the configuration as TOML
    #[arg(long)]
    pub toml: bool,
}

/// Print `config` with secrets redacted. Needs no live clients.
pub fn run(config: &Config, robot: bool, args: &ConfigArgs) -> Result<()> {
    let shown = config.redacted();
    if robot {
        return emit_robot(&robot_ok(&shown));
    }
    if args.toml {
        let text = toml::to_string_pretty(&shown)
            .map_err(|err| crate::error::ReelError::Config(format!("render config: {err}")))?;
        print!("{text}");
        return Ok(());
    }
    emit_human(layout(&shown));
    Ok(())
}

fn layout(config: &Config) -> HumanLayout {
    let mut layout = HumanLayout::new();
    layout
        .section("Search")
        .kv("endpoint", or_unset(&config.search.endpoint))
        .kv("region", or_unset(&config.search.region))
        .kv("index", &config.search.index)
        .kv("auth token", config.search.auth_token.as_deref().unwrap_or("(unset)"))
        .kv("timeout", &format!("{}s", config.search.timeout_secs))
        .blank()
        .section("Embedding")
        .kv("endpoint", or_unset(&config.embedding.endpoint))
        .kv("region", or_unset(&config.embedding.region))
        .kv("model", &config.embedding.model_id)
        .kv("dimension", &config.embedding.dimension.to_string())
        .kv("assume role", config.embedding.assume_role.as_deref().unwrap_or("(unset)"))
        .kv("api key", config.embedding.api_key.as_deref().unwrap_or("(unset)"))
        .kv("timeout", &format!("{}s", config.embedding.timeout_secs))
        .blank()
        .section("Query")
        .kv("result limit", &config.query.result_limit.to_string())
        .kv("lookup limit", &config.query.lookup_limit.to_string())
        .kv("passage index", &config.query.passage_index);
    layout
}

fn or_unset(value: &str) -> &str {
    if value.is_empty() { "(unset)" } else { value }
}
