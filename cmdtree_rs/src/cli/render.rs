//! Output sink: turns an [`Outcome`] into terminal text or JSON.
//!
//! Rendering is pure; the entrypoint decides where the text goes.

use crate::app::Outcome;
use crate::route::suggest::{Entry, Help, MethodHelp, Suggestion};

use super::colors::Painter;

/// How to render an outcome.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub painter: Painter,
    pub json: bool,
    /// Show the full cause chain of execution failures
    pub debug: bool,
    pub binary_name: &'static str,
}

impl RenderOptions {
    pub fn plain(binary_name: &'static str) -> Self {
        Self {
            painter: Painter::plain(),
            json: false,
            debug: false,
            binary_name,
        }
    }
}

/// Rendered text and the stream it belongs on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,
    pub to_stderr: bool,
}

pub fn render(outcome: &Outcome, opts: &RenderOptions) -> Rendered {
    if opts.json {
        let text = serde_json::to_string_pretty(&outcome.report())
            .unwrap_or_else(|e| format!("{{\"status\":\"render_failed\",\"error\":\"{e}\"}}"));
        return Rendered {
            text,
            to_stderr: false,
        };
    }

    let p = &opts.painter;
    match outcome {
        Outcome::Success { value, .. } => Rendered {
            text: render_value(value),
            to_stderr: false,
        },
        Outcome::Help(Help::Module(suggestion)) => Rendered {
            text: render_module_help(suggestion, opts),
            to_stderr: false,
        },
        Outcome::Help(Help::Method(method)) => Rendered {
            text: render_method_help(method, opts),
            to_stderr: false,
        },
        Outcome::RouteNotFound {
            failure,
            suggestion,
        } => {
            let mut lines = vec![format!("{} {}", p.error("error:"), failure)];
            if !suggestion.is_root() {
                lines.push(format!("{} {}", p.dim("deepest module:"), suggestion.route.join(" ")));
            }
            lines.push(String::new());
            lines.extend(suggestion_sections(suggestion, p));
            Rendered {
                text: lines.join("\n"),
                to_stderr: true,
            }
        }
        Outcome::InvalidArguments(err) => {
            let mut lines = vec![format!("{} invalid parameters", p.error("error:"))];
            let width = err
                .errors
                .iter()
                .map(|error| error.reference.len())
                .max()
                .unwrap_or(0);
            for error in &err.errors {
                lines.push(format!(
                    "  {}  {}",
                    p.name(&format!("{:<width$}", error.reference)),
                    p.warn(&error.kind.to_string())
                ));
            }
            Rendered {
                text: lines.join("\n"),
                to_stderr: true,
            }
        }
        Outcome::ExecutionFailed(err) => {
            let mut lines = vec![format!("{} {}", p.error("error:"), err)];
            let causes = err.cause_chain();
            if opts.debug {
                for cause in causes.iter().skip(1) {
                    lines.push(format!("  {} {}", p.dim("caused by:"), cause));
                }
            } else if causes.len() > 1 {
                lines.push(p.dim("  (run with --debug for the full cause chain)"));
            }
            Rendered {
                text: lines.join("\n"),
                to_stderr: true,
            }
        }
    }
}

/// Plain scalars print bare; `null` prints nothing; composites print as JSON.
pub fn render_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(text) => text.clone(),
        serde_json::Value::Bool(_) | serde_json::Value::Number(_) => value.to_string(),
        composite => {
            serde_json::to_string_pretty(composite).unwrap_or_else(|_| composite.to_string())
        }
    }
}

fn render_module_help(suggestion: &Suggestion, opts: &RenderOptions) -> String {
    let p = &opts.painter;
    let mut lines = Vec::new();

    if suggestion.is_root() {
        lines.push(format!(
            "{} {} <module> [<sub module>...] <method> [--param value...]",
            p.header("Usage:"),
            opts.binary_name
        ));
    } else {
        lines.push(p.header(&suggestion.route.join(" ")));
        if let Some(summary) = &suggestion.summary {
            lines.push(format!("  {}", p.dim(summary)));
        }
    }
    lines.push(String::new());
    lines.extend(suggestion_sections(suggestion, p));
    lines.join("\n")
}

fn suggestion_sections(suggestion: &Suggestion, p: &Painter) -> Vec<String> {
    let mut lines = Vec::new();
    let modules_title = if suggestion.is_root() {
        "Modules:"
    } else {
        "Sub Modules:"
    };

    if !suggestion.sub_modules.is_empty() {
        lines.push(p.header(modules_title));
        lines.extend(entry_lines(&suggestion.sub_modules, p));
    }
    if !suggestion.methods.is_empty() {
        lines.push(p.header("Methods:"));
        lines.extend(entry_lines(&suggestion.methods, p));
    }
    if lines.is_empty() {
        lines.push(p.dim("(nothing registered here)"));
    }
    lines
}

fn entry_lines(entries: &[Entry], p: &Painter) -> Vec<String> {
    let width = entries.iter().map(|entry| entry.name.len()).max().unwrap_or(0);
    entries
        .iter()
        .map(|entry| match &entry.summary {
            Some(summary) => format!(
                "  {}  {}",
                p.name(&format!("{:<width$}", entry.name)),
                p.dim(summary)
            ),
            None => format!("  {}", p.name(&entry.name)),
        })
        .collect()
}

fn render_method_help(method: &MethodHelp, opts: &RenderOptions) -> String {
    let p = &opts.painter;
    let mut lines = vec![format!(
        "{} {} {}{}",
        p.header("Usage:"),
        opts.binary_name,
        method.route.join(" "),
        if method.parameters.is_empty() {
            ""
        } else {
            " [--param value...]"
        }
    )];
    if let Some(summary) = &method.summary {
        lines.push(format!("  {}", p.dim(summary)));
    }

    if !method.parameters.is_empty() {
        lines.push(String::new());
        lines.push(p.header("Parameters:"));

        let flags: Vec<String> = method
            .parameters
            .iter()
            .map(|param| match &param.alias {
                Some(alias) => format!("{}, {}", param.flag, alias),
                None => param.flag.clone(),
            })
            .collect();
        let width = flags.iter().map(String::len).max().unwrap_or(0);

        for (param, flag) in method.parameters.iter().zip(&flags) {
            let mut line = format!(
                "  {}  <{}>",
                p.name(&format!("{:<width$}", flag)),
                param.type_name
            );
            match &param.default {
                Some(default) => line.push_str(&format!("  {}", p.dim(&format!("default: {default}")))),
                None => line.push_str(&format!("  {}", p.warn("required"))),
            }
            if let Some(summary) = &param.summary {
                line.push_str(&format!("  {summary}"));
            }
            lines.push(line);
        }
    }
    lines.join("\n")
}
