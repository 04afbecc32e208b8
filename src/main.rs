mod cli;
mod config;
mod mcp;
mod osascript;
mod parse;
mod scripts;
mod tool_args;
mod tool_defs;
mod tool_exec;
mod tool_log;
mod types;
mod util;

// Re-export module items at the crate root so cross-module references stay
// short; modules reach shared helpers through `super::`.
#[allow(unused_imports)]
pub(crate) use cli::*;
#[allow(unused_imports)]
pub(crate) use config::*;
#[allow(unused_imports)]
pub(crate) use mcp::*;
#[allow(unused_imports)]
pub(crate) use osascript::*;
#[allow(unused_imports)]
pub(crate) use parse::*;
#[allow(unused_imports)]
pub(crate) use scripts::*;
#[allow(unused_imports)]
pub(crate) use tool_args::*;
#[allow(unused_imports)]
pub(crate) use tool_defs::*;
#[allow(unused_imports)]
pub(crate) use tool_exec::*;
#[allow(unused_imports)]
pub(crate) use tool_log::*;
#[allow(unused_imports)]
pub(crate) use types::*;
#[allow(unused_imports)]
pub(crate) use util::*;

use std::sync::{Arc, Mutex};

use clap::Parser;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let cfg = RuntimeConfig::from_env()?;

    match cli.command {
        Command::Mcp => {
            // One lock for the process lifetime: Mail cannot survive
            // concurrent automation, so every script funnels through it.
            let runner = ScriptRunner::from_config(&cfg, Arc::new(Mutex::new(())));
            run_mcp_server(&cfg, &runner)
        }

        Command::Tools { pretty } => {
            let defs = tool_definitions_json(cfg.preferences.as_deref());
            let rendered = if pretty {
                serde_json::to_string_pretty(&defs)?
            } else {
                serde_json::to_string(&defs)?
            };
            println!("{rendered}");
            Ok(())
        }

        Command::Call { name, args, json } => {
            let args: serde_json::Value = serde_json::from_str(&args)
                .map_err(|e| format!("--args must be a JSON object: {e}"))?;
            let runner = ScriptRunner::from_config(&cfg, Arc::new(Mutex::new(())));
            match execute_tool(&name, args, &runner, &cfg) {
                Ok(result) => {
                    if json {
                        println!("{}", serde_json::to_string_pretty(&result.details)?);
                    } else {
                        println!("{}", result.output);
                    }
                    if result.is_error {
                        std::process::exit(1);
                    }
                    Ok(())
                }
                Err(err) => {
                    eprintln!("{err}");
                    std::process::exit(2);
                }
            }
        }

        Command::Script { expr, file } => {
            let script = read_script_source(expr, file)?;
            let runner = ScriptRunner::from_config(&cfg, Arc::new(Mutex::new(())));
            match runner.execute(&script) {
                Ok(output) => {
                    println!("{output}");
                    Ok(())
                }
                Err(err) => {
                    eprintln!("{err}");
                    std::process::exit(2);
                }
            }
        }
    }
}
