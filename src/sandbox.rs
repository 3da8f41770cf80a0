//! Isolated invoker for untrusted submissions
//!
//! Submitted source is untrusted: it must not read or write host state,
//! perform I/O, or hang the process. Each test case runs in a freshly
//! created QuickJS runtime and context, so no globals or other mutable state
//! bleed between cases; only the program text is reused. The context exposes
//! the ECMAScript intrinsics plus an inert `console` shim and CommonJS
//! placeholders - no module loader, filesystem, network, or process surface
//! exists. A wall-clock deadline is enforced through the engine's interrupt
//! handler, and the whole runtime is discarded when the case ends, so
//! nothing can keep executing past a reported timeout.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rquickjs::{
    function::Rest, Context, Ctx, Error as JsError, Function, Runtime, Value as JsValue,
};
use serde_json::Value;
use tracing::warn;

use crate::decoder::DecodedArguments;
use crate::locator;

/// Floor for the code-installation slice of the per-case budget (ms)
pub const INSTALL_FLOOR_MS: u64 = 500;
/// Floor for the function-call slice of the per-case budget (ms)
pub const CALL_FLOOR_MS: u64 = 200;

/// Globals installed into every fresh context before the submission:
/// a no-op `console` and CommonJS-style `module.exports`/`exports`
/// placeholders so submissions written in that style do not throw.
const SANDBOX_PRELUDE: &str = r#"
globalThis.console = {
    log: function () {},
    error: function () {},
    warn: function () {},
    info: function () {}
};
globalThis.module = { exports: {} };
globalThis.exports = globalThis.module.exports;
"#;

/// Resource limits for one test-case execution
#[derive(Debug, Clone)]
pub struct SandboxLimits {
    /// Total wall-clock budget for the case in milliseconds
    pub time_ms: u64,
    /// Heap limit in MB
    pub memory_mb: usize,
    /// Engine stack size in KB
    pub stack_kb: usize,
}

impl Default for SandboxLimits {
    fn default() -> Self {
        Self {
            time_ms: 1500,
            memory_mb: 64,
            stack_kb: 1024,
        }
    }
}

impl SandboxLimits {
    pub fn with_time_ms(time_ms: u64) -> Self {
        Self {
            time_ms,
            ..Self::default()
        }
    }
}

/// Outcome of executing one test case. Produced once per case, never
/// retried. Failures here are data, not host-level faults.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutcome {
    /// The located function returned a value
    Success { value: Value },
    /// The submission threw, or the engine rejected it at install time
    RuntimeFailure { message: String },
    /// The case exceeded its wall-clock budget
    Timeout,
    /// No callable entry point was found in the context
    FunctionNotFound,
}

/// A submission whose source passed the syntax check
///
/// Only the program text is reused across test cases; every case
/// re-evaluates it inside a fresh context.
#[derive(Debug, Clone)]
pub struct CompiledUnit {
    source: Arc<str>,
}

impl CompiledUnit {
    /// Syntax-check the source without executing it
    ///
    /// The source is fed to `new Function(...)` in a scratch context, which
    /// parses the program body but never runs it. A failure here is
    /// terminal for the whole run: there is nothing to execute.
    pub fn compile(source: &str) -> Result<Self, String> {
        let runtime = engine_runtime(&SandboxLimits::default())
            .map_err(|e| format!("execution engine unavailable: {}", e))?;
        let context = Context::full(&runtime)
            .map_err(|e| format!("execution engine unavailable: {}", e))?;

        let quoted = serde_json::to_string(source)
            .map_err(|e| format!("source could not be encoded: {}", e))?;
        let probe = format!("new Function({});", quoted);

        context.with(|ctx| match ctx.eval::<(), _>(probe.as_str()) {
            Ok(()) => Ok(()),
            Err(err) => Err(caught_message(&ctx, err)),
        })?;

        Ok(Self {
            source: Arc::from(source),
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

/// Execute the compiled submission against one set of decoded arguments
/// inside a fresh, capability-stripped context.
///
/// Blocking; callers on an async runtime should run it on a blocking thread.
pub fn execute_case(
    unit: &CompiledUnit,
    args: &DecodedArguments,
    limits: &SandboxLimits,
) -> ExecutionOutcome {
    let runtime = match engine_runtime(limits) {
        Ok(rt) => rt,
        Err(message) => {
            warn!("failed to create execution runtime: {}", message);
            return ExecutionOutcome::RuntimeFailure { message };
        }
    };

    // The install phase gets at least its floor; whatever budget is left
    // afterwards (with its own floor) goes to the function call. The
    // interrupt handler reads the shared deadline, which is advanced
    // between the two phases.
    let started = Instant::now();
    let install_budget = Duration::from_millis(INSTALL_FLOOR_MS.max(limits.time_ms / 2));
    let deadline = Arc::new(Mutex::new(started + install_budget));
    {
        let deadline = Arc::clone(&deadline);
        runtime.set_interrupt_handler(Some(Box::new(move || {
            deadline
                .lock()
                .map(|d| Instant::now() >= *d)
                .unwrap_or(true)
        })));
    }

    let context = match Context::full(&runtime) {
        Ok(ctx) => ctx,
        Err(e) => {
            let message = format!("failed to create execution context: {}", e);
            warn!("{}", message);
            return ExecutionOutcome::RuntimeFailure { message };
        }
    };

    context.with(|ctx| {
        if let Err(err) = ctx.eval::<(), _>(SANDBOX_PRELUDE) {
            return ExecutionOutcome::RuntimeFailure {
                message: format!("sandbox setup failed: {}", caught_message(&ctx, err)),
            };
        }

        // Install the submission into the fresh context
        if let Err(err) = ctx.eval::<(), _>(unit.source()) {
            return phase_outcome(&ctx, err, &deadline);
        }

        let globals = ctx.globals();
        let Some(entry) = locator::locate_entry_point(&globals) else {
            return ExecutionOutcome::FunctionNotFound;
        };

        // Remaining budget goes to the call phase
        let call_budget = Duration::from_millis(limits.time_ms)
            .saturating_sub(started.elapsed())
            .max(Duration::from_millis(CALL_FLOOR_MS));
        if let Ok(mut d) = deadline.lock() {
            *d = Instant::now() + call_budget;
        }

        let function: Function = match globals.get(entry.as_str()) {
            Ok(f) => f,
            Err(err) => {
                return ExecutionOutcome::RuntimeFailure {
                    message: caught_message(&ctx, err),
                }
            }
        };

        let mut js_args = Vec::with_capacity(args.len());
        for (name, value) in args.iter() {
            let encoded = match serde_json::to_string(value) {
                Ok(s) => s,
                Err(e) => {
                    return ExecutionOutcome::RuntimeFailure {
                        message: format!("argument `{}` could not be encoded: {}", name, e),
                    }
                }
            };
            match ctx.json_parse(encoded) {
                Ok(v) => js_args.push(v),
                Err(err) => {
                    return ExecutionOutcome::RuntimeFailure {
                        message: caught_message(&ctx, err),
                    }
                }
            }
        }

        match function.call::<_, JsValue>((Rest(js_args),)) {
            Ok(value) => match stringify_result(&ctx, value) {
                Ok(value) => ExecutionOutcome::Success { value },
                Err(message) => ExecutionOutcome::RuntimeFailure { message },
            },
            Err(err) => phase_outcome(&ctx, err, &deadline),
        }
    })
}

fn engine_runtime(limits: &SandboxLimits) -> Result<Runtime, String> {
    let runtime = Runtime::new().map_err(|e| e.to_string())?;
    runtime.set_memory_limit(limits.memory_mb * 1024 * 1024);
    runtime.set_max_stack_size(limits.stack_kb * 1024);
    Ok(runtime)
}

/// Classify an evaluation error: past the phase deadline it is a timeout,
/// otherwise the thrown exception is captured as a runtime failure.
fn phase_outcome(
    ctx: &Ctx<'_>,
    err: JsError,
    deadline: &Arc<Mutex<Instant>>,
) -> ExecutionOutcome {
    let expired = deadline
        .lock()
        .map(|d| Instant::now() >= *d)
        .unwrap_or(true);
    if expired {
        // drain the pending exception so it cannot leak into later reads
        let _ = ctx.catch();
        ExecutionOutcome::Timeout
    } else {
        ExecutionOutcome::RuntimeFailure {
            message: caught_message(ctx, err),
        }
    }
}

/// Serialize the function's return value through the context's JSON
/// serializer. `undefined` (and anything else JSON cannot represent at the
/// top level) degrades to `null`.
fn stringify_result<'js>(ctx: &Ctx<'js>, value: JsValue<'js>) -> Result<Value, String> {
    match ctx.json_stringify(value) {
        Ok(Some(text)) => {
            let text = text
                .to_string()
                .map_err(|e| format!("result could not be read: {}", e))?;
            serde_json::from_str(&text).map_err(|e| format!("result was not serializable: {}", e))
        }
        Ok(None) => Ok(Value::Null),
        Err(err) => Err(caught_message(ctx, err)),
    }
}

/// Extract a human-readable message from a pending JS exception
fn caught_message(ctx: &Ctx<'_>, err: JsError) -> String {
    if !matches!(err, JsError::Exception) {
        return err.to_string();
    }
    let caught = ctx.catch();
    if let Some(obj) = caught.as_object() {
        if let Ok(message) = obj.get::<_, String>("message") {
            if !message.is_empty() {
                return message;
            }
        }
    }
    if let Some(s) = caught.as_string() {
        if let Ok(text) = s.to_string() {
            return text;
        }
    }
    "unknown runtime error".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::decode;
    use serde_json::json;

    fn run(source: &str, input: &str, time_ms: u64) -> ExecutionOutcome {
        let unit = CompiledUnit::compile(source).expect("source should compile");
        let args = decode(input);
        execute_case(&unit, &args, &SandboxLimits::with_time_ms(time_ms))
    }

    #[test]
    fn test_compile_rejects_syntax_error() {
        let err = CompiledUnit::compile("function solution( {").unwrap_err();
        assert!(!err.is_empty());
    }

    #[test]
    fn test_compile_does_not_execute() {
        // top-level throw must not fire during the syntax check
        let unit = CompiledUnit::compile("throw new Error('boom'); function solution() {}");
        assert!(unit.is_ok());
    }

    #[test]
    fn test_success_with_decoded_arguments() {
        let outcome = run(
            "function solution(nums, target) { return nums.indexOf(target); }",
            "nums=[2,7,11,15];target=11",
            1500,
        );
        assert_eq!(outcome, ExecutionOutcome::Success { value: json!(2) });
    }

    #[test]
    fn test_thrown_error_is_captured_as_data() {
        let outcome = run(
            "function solution() { throw new Error('boom'); }",
            "",
            1500,
        );
        match outcome {
            ExecutionOutcome::RuntimeFailure { message } => assert!(message.contains("boom")),
            other => panic!("expected runtime failure, got {:?}", other),
        }
    }

    #[test]
    fn test_null_property_access_is_a_runtime_failure() {
        let outcome = run("function solution() { return null.length; }", "", 1500);
        assert!(matches!(outcome, ExecutionOutcome::RuntimeFailure { .. }));
    }

    #[test]
    fn test_infinite_loop_times_out() {
        let outcome = run("function solution() { while (true) {} }", "", 700);
        assert_eq!(outcome, ExecutionOutcome::Timeout);
    }

    #[test]
    fn test_infinite_loop_at_install_times_out() {
        let unit = CompiledUnit::compile("while (true) {}").unwrap();
        let outcome = execute_case(&unit, &decode(""), &SandboxLimits::with_time_ms(700));
        assert_eq!(outcome, ExecutionOutcome::Timeout);
    }

    #[test]
    fn test_missing_entry_point() {
        let outcome = run("function helper() { return 42; }", "x=1", 1500);
        assert_eq!(outcome, ExecutionOutcome::FunctionNotFound);
    }

    #[test]
    fn test_fresh_context_per_case() {
        let unit = CompiledUnit::compile(
            "function solution() { globalThis.counter = (globalThis.counter || 0) + 1; return globalThis.counter; }",
        )
        .unwrap();
        let args = decode("");
        let limits = SandboxLimits::default();
        for _ in 0..2 {
            let outcome = execute_case(&unit, &args, &limits);
            assert_eq!(outcome, ExecutionOutcome::Success { value: json!(1) });
        }
    }

    #[test]
    fn test_console_shim_is_inert() {
        let outcome = run(
            "function solution(x) { console.log('hi', x); console.error(x); return x; }",
            "x=5",
            1500,
        );
        assert_eq!(outcome, ExecutionOutcome::Success { value: json!(5) });
    }

    #[test]
    fn test_module_exports_shim() {
        let outcome = run(
            "function solution(x) { return x * 2; } module.exports = solution;",
            "x=4",
            1500,
        );
        assert_eq!(outcome, ExecutionOutcome::Success { value: json!(8) });
    }

    #[test]
    fn test_no_module_loading_capability() {
        let outcome = run("function solution() { return require('fs'); }", "", 1500);
        assert!(matches!(outcome, ExecutionOutcome::RuntimeFailure { .. }));
    }

    #[test]
    fn test_undefined_result_degrades_to_null() {
        let outcome = run("function solution() {}", "", 1500);
        assert_eq!(outcome, ExecutionOutcome::Success { value: Value::Null });
    }

    #[test]
    fn test_string_round_trip() {
        let outcome = run(
            "function solution(input) { return input.split('').reverse().join(''); }",
            r#"{"s": "hello"}"#,
            1500,
        );
        assert_eq!(outcome, ExecutionOutcome::Success { value: json!("olleh") });
    }
}
