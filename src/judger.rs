//! Run orchestrator
//!
//! Sequences decode -> execute -> compare across all test cases of a
//! problem and builds the aggregate run report. Test cases run one at a
//! time in their listed order; the report preserves that order because the
//! first failing case feeds the hint engine downstream. All per-case
//! failures are captured as data inside the report; only an invalid request
//! or a compile failure escapes as a hard error.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::task::spawn_blocking;
use tracing::{debug, info};

use crate::checker::compare_output;
use crate::decoder;
use crate::problem::Problem;
use crate::sandbox::{self, CompiledUnit, ExecutionOutcome, SandboxLimits};

/// Default per-case wall-clock budget in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 1500;
/// Smallest workable per-case budget: the install floor plus the call floor
pub const MIN_TIMEOUT_MS: u64 = sandbox::INSTALL_FLOOR_MS + sandbox::CALL_FLOOR_MS;

/// Hard errors that reject a run outright. Everything else is recorded as
/// data inside the report.
#[derive(Debug, Error)]
pub enum JudgeError {
    /// Rejected before any execution: nothing to run, or nothing to run
    /// against
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// The submitted source does not parse; terminal for the whole run,
    /// zero cases attempted
    #[error("compilation error: {0}")]
    CompileError(String),
}

/// Outcome of one test case. Immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseResult {
    pub input: String,
    pub expected: String,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub elapsed_ms: u64,
    pub is_hidden: bool,
}

/// Aggregate outcome of a submission run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub success: bool,
    pub passed_count: usize,
    pub total: usize,
    /// One entry per test case, in test-case order
    pub results: Vec<CaseResult>,
}

impl RunReport {
    /// The first failing case, if any. Downstream hinting reads this.
    pub fn first_failure(&self) -> Option<&CaseResult> {
        self.results.iter().find(|r| !r.passed)
    }
}

/// Run a submission against every test case of a problem
///
/// The source is syntax-checked once; each test case then gets a fresh
/// execution context with its own slice of the time budget. A runtime
/// error or timeout fails its own case only - the remaining cases still
/// run.
pub async fn run_submission(
    problem: &Problem,
    source: &str,
    timeout_ms: Option<u64>,
) -> Result<RunReport, JudgeError> {
    if problem.test_cases.is_empty() {
        return Err(JudgeError::InvalidRequest(
            "problem has no test cases".into(),
        ));
    }
    if source.trim().is_empty() {
        return Err(JudgeError::InvalidRequest(
            "submitted source is empty".into(),
        ));
    }

    let timeout_ms = timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS).max(MIN_TIMEOUT_MS);

    // Compile once up front. A submission that does not parse would fail
    // identically for every case, so the run short-circuits here with zero
    // cases attempted.
    let unit = {
        let source = source.to_owned();
        spawn_blocking(move || CompiledUnit::compile(&source))
            .await
            .map_err(|e| JudgeError::CompileError(format!("compile task failed: {}", e)))?
            .map_err(JudgeError::CompileError)?
    };

    let mut results = Vec::with_capacity(problem.test_cases.len());
    for (idx, tc) in problem.test_cases.iter().enumerate() {
        let args = decoder::decode(&tc.input);
        let limits = SandboxLimits::with_time_ms(timeout_ms);
        let case_unit = unit.clone();

        let started = Instant::now();
        let outcome = spawn_blocking(move || sandbox::execute_case(&case_unit, &args, &limits))
            .await
            .unwrap_or_else(|e| ExecutionOutcome::RuntimeFailure {
                message: format!("execution task failed: {}", e),
            });
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let (passed, actual, error) = match outcome {
            ExecutionOutcome::Success { value } => {
                let passed = compare_output(&value, &tc.output);
                (passed, Some(value), None)
            }
            ExecutionOutcome::RuntimeFailure { message } => (false, None, Some(message)),
            ExecutionOutcome::Timeout => (
                false,
                None,
                Some(format!("timed out after {}ms", timeout_ms)),
            ),
            ExecutionOutcome::FunctionNotFound => (
                false,
                None,
                Some(
                    "no callable entry point found in submitted code; name your function `solution`"
                        .to_string(),
                ),
            ),
        };

        debug!(case = idx, passed, elapsed_ms, "test case finished");
        results.push(CaseResult {
            input: tc.input.clone(),
            expected: tc.output.clone(),
            passed,
            actual,
            error,
            elapsed_ms,
            is_hidden: tc.is_hidden,
        });
    }

    let passed_count = results.iter().filter(|r| r.passed).count();
    let total = results.len();
    let success = total > 0 && passed_count == total;

    info!(
        problem = %problem.id,
        passed_count,
        total,
        success,
        "run complete"
    );

    Ok(RunReport {
        success,
        passed_count,
        total,
        results,
    })
}
