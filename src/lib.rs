//! Submission judge core for the DSA learning coach
//!
//! Executes a learner's submitted JavaScript function against a problem's
//! test cases inside isolated, time-bounded QuickJS contexts and produces a
//! per-case and aggregate pass/fail report, plus a correctness/optimality
//! verdict derived from a coarse complexity heuristic.
//!
//! This crate is a library invoked by request handlers. It reads `Problem`
//! records and submission source as plain parameters and has no persistence,
//! authentication, or network surface of its own.

pub mod checker;
pub mod decoder;
pub mod judger;
pub mod locator;
pub mod problem;
pub mod sandbox;
pub mod verdict;

pub use judger::{run_submission, CaseResult, JudgeError, RunReport, DEFAULT_TIMEOUT_MS};
pub use problem::{Complexity, Difficulty, Problem, TestCase};
pub use sandbox::{CompiledUnit, ExecutionOutcome, SandboxLimits};
pub use verdict::{classify_verdict, estimate_complexity, HeuristicComplexity, Verdict};
