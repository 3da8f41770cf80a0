//! Verdict classifier
//!
//! Derives a correctness/optimality verdict from the aggregate run outcome
//! and a deliberately coarse static estimate of the source's time
//! complexity. The estimate counts loop keywords in the flattened source
//! text; it is a best-effort signal, kept behind one pure function so a
//! smarter analyzer can replace it without touching the execution pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::judger::RunReport;
use crate::problem::Complexity;

/// Tri-state correctness/optimality classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    CorrectOptimal,
    CorrectSuboptimal,
    Incorrect,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Verdict::CorrectOptimal => "correct_optimal",
            Verdict::CorrectSuboptimal => "correct_suboptimal",
            Verdict::Incorrect => "incorrect",
        };
        write!(f, "{}", s)
    }
}

/// A complexity class produced by the loop-counting heuristic, tagged so it
/// is never mistaken for a real analysis result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeuristicComplexity(pub Complexity);

/// Estimate the time complexity of a submission from its source text
///
/// Counts `for`/`while` loop keywords in the whitespace-collapsed,
/// lowercased source: two or more mean O(n^2), exactly one means O(n) (a
/// hash-assisted single pass still counts as O(n)), none means O(1). The
/// heuristic never recognizes O(log n) or O(n log n); correct solutions
/// with those complexities are reported as suboptimal.
pub fn estimate_complexity(source: &str) -> HeuristicComplexity {
    let normalized = source
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    let loops = count_loop_keyword(&normalized, "for") + count_loop_keyword(&normalized, "while");

    let complexity = if loops >= 2 {
        Complexity::Quadratic
    } else if loops == 1 {
        Complexity::Linear
    } else {
        Complexity::Constant
    };
    HeuristicComplexity(complexity)
}

/// Count keyword occurrences that open a loop: preceded by a non-identifier
/// character and followed (after optional spaces) by `(`.
fn count_loop_keyword(text: &str, keyword: &str) -> usize {
    let mut count = 0;
    let mut from = 0;
    while let Some(pos) = text[from..].find(keyword) {
        let start = from + pos;
        let end = start + keyword.len();
        let bounded = start == 0
            || !text[..start]
                .chars()
                .next_back()
                .map(is_ident_char)
                .unwrap_or(false);
        if bounded && text[end..].trim_start().starts_with('(') {
            count += 1;
        }
        from = end;
    }
    count
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Classify a submission given its run report
///
/// Incorrectness dominates: a failing report is `incorrect` regardless of
/// source shape. A passing report is `correct_optimal` only when the
/// heuristic estimate matches the problem's recorded optimal complexity.
pub fn classify_verdict(
    source: &str,
    optimal: Option<Complexity>,
    report: &RunReport,
) -> Verdict {
    if !report.success {
        return Verdict::Incorrect;
    }
    let HeuristicComplexity(detected) = estimate_complexity(source);
    match optimal {
        Some(optimal) if optimal == detected => Verdict::CorrectOptimal,
        _ => Verdict::CorrectSuboptimal,
    }
}
