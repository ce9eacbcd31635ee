//! Global options, stripped from argv before routing.
//!
//! `--debug`, `--json` and `--color[=<mode>]` are accepted anywhere; they
//! shadow method parameters of the same name. `--version`/`-V` only counts as
//! the sole argument.

use super::colors::{ColorMode, parse_color_mode};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalOptions {
    pub json: bool,
    pub debug: bool,
    /// `None` when not given on the command line
    pub color: Option<ColorMode>,
    pub version: bool,
}

/// Split global options from the routing tokens.
pub fn extract_global_options(args: &[String]) -> Result<(GlobalOptions, Vec<String>), String> {
    let mut global = GlobalOptions::default();

    if let [only] = args
        && matches!(only.as_str(), "--version" | "-V")
    {
        global.version = true;
        return Ok((global, Vec::new()));
    }

    let mut remaining = Vec::with_capacity(args.len());
    for arg in args {
        match arg.as_str() {
            "--json" => global.json = true,
            "--debug" => global.debug = true,
            "--color" => global.color = Some(ColorMode::Always),
            _ if arg.starts_with("--color=") => {
                let value = arg.trim_start_matches("--color=");
                global.color = Some(parse_color_mode(value)?);
            }
            _ => remaining.push(arg.clone()),
        }
    }

    Ok((global, remaining))
}
