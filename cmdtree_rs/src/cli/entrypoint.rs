//! Shared CLI entry point for binaries built on a module tree.
//!
//! Strips global options, loads `.cmdtree/config.toml`, installs logging,
//! runs one invocation on a current-thread runtime and renders the outcome.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use super::colors::{ColorMode, Painter};
use super::global::{GlobalOptions, extract_global_options};
use super::render::{RenderOptions, render};
use crate::app::{App, EXIT_EXECUTION, EXIT_USAGE};
use crate::config::CmdtreeConfig;
use crate::tree::ModuleTree;

/// Options controlling binary-specific behavior.
pub struct EntryOptions {
    /// Name shown in usage lines and `--version` output
    pub binary_name: &'static str,
    /// Directory searched for `.cmdtree/config.toml`; the working directory
    /// when `None`
    pub config_root: Option<PathBuf>,
}

/// Run the CLI with the process arguments. This is the shared main() body.
pub fn run<F>(opts: &EntryOptions, build_tree: F) -> ExitCode
where
    F: FnOnce(&CmdtreeConfig) -> anyhow::Result<ModuleTree>,
{
    // args() is only used for routing; the executable path is skipped.
    let raw_args: Vec<String> = std::env::args().skip(1).collect();
    run_with_args(opts, raw_args, build_tree)
}

/// Run the CLI with explicit arguments (without the executable path).
pub fn run_with_args<F>(opts: &EntryOptions, raw_args: Vec<String>, build_tree: F) -> ExitCode
where
    F: FnOnce(&CmdtreeConfig) -> anyhow::Result<ModuleTree>,
{
    let (global, tokens) = match extract_global_options(&raw_args) {
        Ok(parsed) => parsed,
        Err(err) => {
            eprintln!("[{}][error] {}", opts.binary_name, err);
            return ExitCode::from(EXIT_USAGE);
        }
    };

    if global.version {
        println!("{} {}", opts.binary_name, env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    let root = match &opts.config_root {
        Some(root) => root.clone(),
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    };
    let config = CmdtreeConfig::load(&root);
    init_logging(&global, &config);

    let render_opts = RenderOptions {
        painter: Painter::new(global.color.or(config.color).unwrap_or(ColorMode::Auto)),
        json: global.json || config.json,
        debug: global.debug || config.debug,
        binary_name: opts.binary_name,
    };

    match invoke(&root, &config, tokens, build_tree) {
        Ok(outcome) => {
            let rendered = render(&outcome, &render_opts);
            if !rendered.text.is_empty() {
                if rendered.to_stderr {
                    eprintln!("{}", rendered.text);
                } else {
                    println!("{}", rendered.text);
                }
            }
            ExitCode::from(outcome.exit_code())
        }
        Err(err) => {
            eprintln!(
                "{} {:#}",
                render_opts.painter.error(&format!("[{}][error]", opts.binary_name)),
                err
            );
            ExitCode::from(EXIT_EXECUTION)
        }
    }
}

fn invoke<F>(
    root: &Path,
    config: &CmdtreeConfig,
    tokens: Vec<String>,
    build_tree: F,
) -> anyhow::Result<crate::app::Outcome>
where
    F: FnOnce(&CmdtreeConfig) -> anyhow::Result<ModuleTree>,
{
    let tree = build_tree(config).context("failed to build module tree")?;
    tracing::debug!(
        "module tree ready ({} top-level modules, config root {})",
        tree.roots().len(),
        root.display()
    );
    let app = App::new(tree);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    Ok(runtime.block_on(app.run(tokens)))
}

/// Install the stderr subscriber. `--debug` wins over `RUST_LOG`, which wins
/// over the config `log_level`; the fallback is `warn`.
fn init_logging(global: &GlobalOptions, config: &CmdtreeConfig) {
    let filter = if global.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(config.log_level.as_deref().unwrap_or("warn"))
        })
    };

    // A subscriber may already be installed when embedded in a host or tests.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
