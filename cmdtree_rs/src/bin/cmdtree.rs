use std::any::Any;
use std::panic;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use chrono::TimeDelta;
use serde::Serialize;

use cmdtree::cli::entrypoint::{EntryOptions, run};
use cmdtree::config::CmdtreeConfig;
use cmdtree::{
    ArgValue, EnumSpec, MethodBuilder, ModuleBuilder, ModuleTree, ParamBuilder, ParamType,
    ScalarKind, receiver,
};

fn install_broken_pipe_handler() {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let payload = info.payload();
        let is_broken = <dyn Any>::downcast_ref::<&str>(payload)
            .is_some_and(|s| s.contains("Broken pipe"))
            || <dyn Any>::downcast_ref::<String>(payload)
                .is_some_and(|s| s.contains("Broken pipe"));

        if is_broken {
            // Quietly exit when downstream closes the pipe (e.g. piping to `head`).
            std::process::exit(0);
        }

        default_hook(info);
    }));
}

fn main() -> ExitCode {
    install_broken_pipe_handler();

    run(
        &EntryOptions {
            binary_name: "cmdtree",
            config_root: None,
        },
        demo_tree,
    )
}

// ============================================================================
// Demo module tree
// ============================================================================

struct Greeter {
    greeting: String,
}

#[derive(Serialize)]
struct DayInfo {
    name: String,
    index: i64,
    weekend: bool,
}

fn weekday() -> EnumSpec {
    EnumSpec::new(
        "Weekday",
        [
            "Sunday",
            "Monday",
            "Tuesday",
            "Wednesday",
            "Thursday",
            "Friday",
            "Saturday",
        ],
    )
}

fn demo_tree(config: &CmdtreeConfig) -> anyhow::Result<ModuleTree> {
    let greeter = Arc::new(Greeter {
        greeting: config.greeting().to_string(),
    });

    let tree = ModuleTree::builder()
        .module(greet_module(greeter))
        .module(math_module())
        .module(calendar_module())
        .module(store_module())
        .module(system_module())
        .build()?;
    Ok(tree)
}

fn greet_module(greeter: Arc<Greeter>) -> ModuleBuilder {
    ModuleBuilder::new("greet")
        .summary("Say hello")
        .method(
            MethodBuilder::new("hello")
                .summary("Greet someone by name")
                .param(
                    ParamBuilder::new("name", ParamType::string())
                        .alias("n")
                        .summary("Who to greet"),
                )
                .param(ParamBuilder::new("times", ParamType::uint()).default_value(ArgValue::UInt(1)))
                .param(ParamBuilder::new("shout", ParamType::bool()).default_value(false))
                .receiver(greeter)
                .handler(|instance, args| {
                    let greeter = receiver::<Greeter>(instance)?;
                    let mut line = format!("{}, {}!", greeter.greeting, args.string("name")?);
                    if args.flag("shout")? {
                        line = line.to_uppercase();
                    }
                    let times = match args.get("times") {
                        Some(ArgValue::UInt(times)) => *times as usize,
                        _ => 1,
                    };
                    Ok(vec![line; times].join("\n"))
                }),
        )
        .module(
            ModuleBuilder::new("formal").summary("Greetings with titles").method(
                MethodBuilder::new("welcome")
                    .summary("Welcome a guest formally")
                    .param(ParamBuilder::new(
                        "title",
                        ParamType::enumeration(EnumSpec::new("Title", ["Mr", "Ms", "Dr"])),
                    ))
                    .param(ParamBuilder::new("name", ParamType::string()))
                    .async_handler(|_, args| async move {
                        let title = args
                            .get("title")
                            .map(ToString::to_string)
                            .unwrap_or_default();
                        Ok::<_, anyhow::Error>(format!("Welcome, {} {}.", title, args.string("name")?))
                    }),
            ),
        )
}

fn math_module() -> ModuleBuilder {
    ModuleBuilder::new("math")
        .summary("Integer and float arithmetic")
        .method(
            MethodBuilder::new("add")
                .summary("Add two integers")
                .param(ParamBuilder::new("a", ParamType::int()))
                .param(ParamBuilder::new("b", ParamType::int()))
                .handler(|_, args| {
                    args.int("a")?
                        .checked_add(args.int("b")?)
                        .context("integer overflow")
                }),
        )
        .method(
            MethodBuilder::new("sum")
                .summary("Sum any number of integers")
                .param(
                    ParamBuilder::new("numbers", ParamType::sequence(ParamType::int()))
                        .alias("n")
                        .summary("Repeat the flag or pass a JSON array"),
                )
                .async_handler(|_, args| async move {
                    let total: i64 = args
                        .list("numbers")?
                        .iter()
                        .filter_map(ArgValue::as_i64)
                        .sum();
                    Ok::<_, anyhow::Error>(total)
                }),
        )
        .method(
            MethodBuilder::new("average")
                .summary("Mean of the given values")
                .param(ParamBuilder::new("values", ParamType::sequence(ParamType::float())).alias("v"))
                .handler(|_, args| {
                    let values: Vec<f64> = args
                        .list("values")?
                        .iter()
                        .filter_map(ArgValue::as_f64)
                        .collect();
                    if values.is_empty() {
                        anyhow::bail!("cannot average an empty list");
                    }
                    Ok(values.iter().sum::<f64>() / values.len() as f64)
                }),
        )
}

fn calendar_module() -> ModuleBuilder {
    ModuleBuilder::new("calendar")
        .summary("Dates and weekdays")
        .method(
            MethodBuilder::new("day")
                .summary("Describe a weekday, by name or number")
                .param(ParamBuilder::new("day", ParamType::enumeration(weekday())))
                .handler(|_, args| match args.get("day") {
                    Some(ArgValue::Enum { name, value }) => Ok(DayInfo {
                        name: name.clone(),
                        index: *value,
                        weekend: *value == 0 || *value == 6,
                    }),
                    _ => anyhow::bail!("argument 'day' is not a weekday"),
                }),
        )
        .method(
            MethodBuilder::new("after")
                .summary("Date that many days after the given one")
                .param(ParamBuilder::new("date", ParamType::date()))
                .param(ParamBuilder::new("days", ParamType::int()).default_value(1_i64))
                .handler(|_, args| {
                    let Some(ArgValue::Date(date)) = args.get("date") else {
                        anyhow::bail!("argument 'date' is not a date");
                    };
                    let days = args.int("days")?;
                    let delta = TimeDelta::try_days(days).context("day offset out of range")?;
                    let result = date
                        .checked_add_signed(delta)
                        .context("resulting date out of range")?;
                    Ok(result.format("%Y-%m-%d").to_string())
                }),
        )
}

fn store_module() -> ModuleBuilder {
    ModuleBuilder::new("store")
        .summary("Structured and optional values")
        .method(
            MethodBuilder::new("put")
                .summary("Echo a key with a JSON map of counters")
                .param(ParamBuilder::new("key", ParamType::string()).alias("k"))
                .param(
                    ParamBuilder::new("dicto", ParamType::map(ParamType::int()))
                        .summary("JSON object of integers"),
                )
                .param(
                    ParamBuilder::new("tag", ParamType::nullable(ScalarKind::Guid))
                        .default_value(ArgValue::Null),
                )
                .param(
                    ParamBuilder::new("owner", ParamType::string())
                        .hidden()
                        .default_value("system"),
                )
                .handler(|_, args| {
                    Ok(serde_json::json!({
                        "key": args.string("key")?,
                        "dicto": args.get("dicto"),
                        "tag": args.get("tag"),
                        "owner": args.string("owner")?,
                    }))
                }),
        )
}

fn system_module() -> ModuleBuilder {
    ModuleBuilder::new("system")
        .summary("Diagnostics")
        .method(
            MethodBuilder::new("crash")
                .summary("Fail with a nested error")
                .handler(|_, _| -> anyhow::Result<()> {
                    Err(anyhow::anyhow!("disk quota exceeded")).context("writing crash report")
                }),
        )
}
