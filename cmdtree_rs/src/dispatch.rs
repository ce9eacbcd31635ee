//! Execution dispatcher: resolve the receiver, run the call, await it.
//!
//! The one place where failures of host code are caught. A resolver error, a
//! handler error, or a panic in either surfaces as a single [`ExecutionError`]
//! naming the method.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

use futures::FutureExt;
use tracing::{debug, warn};

use crate::bind::value::BoundArgs;
use crate::error::ExecutionError;
use crate::tree::MethodDescriptor;

/// Run `method` with its bound arguments. A method without a result yields
/// JSON `null`.
pub async fn execute(
    method: &MethodDescriptor,
    args: BoundArgs,
) -> Result<serde_json::Value, ExecutionError> {
    let name = method.name.as_str();

    let receiver = match catch_unwind(AssertUnwindSafe(|| (method.resolver)())) {
        Ok(Ok(receiver)) => receiver,
        Ok(Err(err)) => {
            return Err(ExecutionError::new(
                name,
                err.context(format!("cannot resolve receiver for '{name}'")),
            ));
        }
        Err(payload) => return Err(panicked(name, "resolver", payload)),
    };

    debug!(
        "invoking '{}' with {} arguments (receiver: {})",
        name,
        args.len(),
        receiver.is_some()
    );

    let call = match catch_unwind(AssertUnwindSafe(|| (method.invoker)(receiver, args))) {
        Ok(call) => call,
        Err(payload) => return Err(panicked(name, "handler", payload)),
    };

    match AssertUnwindSafe(call).catch_unwind().await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(ExecutionError::new(name, err)),
        Err(payload) => Err(panicked(name, "handler", payload)),
    }
}

fn panicked(method: &str, stage: &str, payload: Box<dyn Any + Send>) -> ExecutionError {
    let message = panic_message(payload.as_ref());
    warn!("{} of '{}' panicked: {}", stage, method, message);
    ExecutionError::new(method, anyhow::anyhow!("{stage} panicked: {message}"))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::tree::{MethodBuilder, ModuleBuilder, ModuleTree, receiver};

    fn single(method: MethodBuilder) -> MethodDescriptor {
        let tree = ModuleTree::builder()
            .module(ModuleBuilder::new("m").method(method))
            .build()
            .expect("valid tree");
        tree.get("m")
            .and_then(|module| module.methods.values().next())
            .cloned()
            .expect("method")
    }

    struct Counter {
        base: i64,
    }

    #[tokio::test]
    async fn test_unit_result_is_null() {
        let method = single(MethodBuilder::new("noop").handler(|_, _| Ok(())));
        let value = execute(&method, BoundArgs::default()).await.expect("runs");
        assert!(value.is_null());
    }

    #[tokio::test]
    async fn test_async_handler_is_awaited() {
        let method = single(MethodBuilder::new("later").async_handler(|_, _| async {
            tokio::task::yield_now().await;
            Ok(vec![1, 2])
        }));
        let value = execute(&method, BoundArgs::default()).await.expect("runs");
        assert_eq!(value, serde_json::json!([1, 2]));
    }

    #[tokio::test]
    async fn test_resolver_runs_once_per_invocation() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let method = single(
            MethodBuilder::new("base")
                .resolver(move || {
                    seen.fetch_add(1, Ordering::SeqCst);
                    Ok(Counter { base: 40 })
                })
                .handler(|instance, _| Ok(receiver::<Counter>(instance)?.base + 2)),
        );

        let value = execute(&method, BoundArgs::default()).await.expect("runs");
        assert_eq!(value, serde_json::json!(42));
        execute(&method, BoundArgs::default()).await.expect("runs");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_handler_error_is_wrapped() {
        let method = single(
            MethodBuilder::new("fail").handler(|_, _| -> anyhow::Result<()> { anyhow::bail!("boom") }),
        );
        let err = execute(&method, BoundArgs::default()).await.unwrap_err();
        assert_eq!(err.method, "fail");
        assert_eq!(err.cause.to_string(), "boom");
    }

    #[tokio::test]
    async fn test_resolver_error_is_wrapped() {
        let method = single(
            MethodBuilder::new("orphan")
                .resolver(|| -> anyhow::Result<Counter> { anyhow::bail!("no database") })
                .handler(|_, _| Ok(())),
        );
        let err = execute(&method, BoundArgs::default()).await.unwrap_err();
        assert_eq!(err.method, "orphan");
        assert_eq!(err.cause_chain().last().map(String::as_str), Some("no database"));
    }

    #[tokio::test]
    async fn test_panics_become_execution_errors() {
        let method = single(MethodBuilder::new("sync-panic").handler(|_, _| -> anyhow::Result<()> {
            panic!("sync boom")
        }));
        let err = execute(&method, BoundArgs::default()).await.unwrap_err();
        assert!(err.cause.to_string().contains("sync boom"));

        let method = single(MethodBuilder::new("async-panic").async_handler(|_, _| async {
            if true {
                panic!("async boom");
            }
            Ok(())
        }));
        let err = execute(&method, BoundArgs::default()).await.unwrap_err();
        assert_eq!(err.method, "async-panic");
        assert!(err.cause.to_string().contains("async boom"));
    }
}
