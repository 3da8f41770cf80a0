//! Problem and test-case data model
//!
//! These records are owned by the external problem store; the judge core
//! only reads them. Field names on the wire match the persistence format
//! (`input`/`output`/`isHidden`) verbatim.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Problem difficulty as stored by the problem store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// Time-complexity classes recognized by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Complexity {
    #[serde(rename = "O(1)")]
    Constant,
    #[serde(rename = "O(log n)")]
    Logarithmic,
    #[serde(rename = "O(n)")]
    Linear,
    #[serde(rename = "O(n log n)")]
    Linearithmic,
    #[serde(rename = "O(n^2)")]
    Quadratic,
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Complexity::Constant => "O(1)",
            Complexity::Logarithmic => "O(log n)",
            Complexity::Linear => "O(n)",
            Complexity::Linearithmic => "O(n log n)",
            Complexity::Quadratic => "O(n^2)",
        };
        write!(f, "{}", s)
    }
}

/// One (input, expected-output) pair used to validate a submission
///
/// `input` is a semi-structured string such as `"nums=[2,7,11,15];target=9"`
/// and is not guaranteed to be valid JSON. `output` may encode JSON (array,
/// number, boolean) or be a literal string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub input: String,
    pub output: String,
    #[serde(default)]
    pub is_hidden: bool,
}

/// A problem record as read from the problem store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub difficulty: Difficulty,
    /// Optimal time complexity, when the store records one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimal_time_complexity: Option<Complexity>,
    #[serde(default)]
    pub test_cases: Vec<TestCase>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complexity_serde_wire_form() {
        let c: Complexity = serde_json::from_str("\"O(n)\"").unwrap();
        assert_eq!(c, Complexity::Linear);
        assert_eq!(serde_json::to_string(&Complexity::Quadratic).unwrap(), "\"O(n^2)\"");
    }

    #[test]
    fn test_complexity_display() {
        assert_eq!(Complexity::Constant.to_string(), "O(1)");
        assert_eq!(Complexity::Linearithmic.to_string(), "O(n log n)");
    }

    #[test]
    fn test_testcase_accepts_persistence_format() {
        let tc: TestCase = serde_json::from_str(
            r#"{"input":"nums=[1,2];target=3","output":"[0,1]","isHidden":true}"#,
        )
        .unwrap();
        assert_eq!(tc.input, "nums=[1,2];target=3");
        assert_eq!(tc.output, "[0,1]");
        assert!(tc.is_hidden);
    }

    #[test]
    fn test_testcase_hidden_defaults_false() {
        let tc: TestCase = serde_json::from_str(r#"{"input":"x=1","output":"1"}"#).unwrap();
        assert!(!tc.is_hidden);
    }

    #[test]
    fn test_problem_deserialize() {
        let problem: Problem = serde_json::from_str(
            r#"{
                "id": "two-sum",
                "title": "Sum of Two Numbers",
                "difficulty": "easy",
                "optimalTimeComplexity": "O(n)",
                "testCases": [{"input": "nums=[2,7];target=9", "output": "[0,1]"}]
            }"#,
        )
        .unwrap();
        assert_eq!(problem.difficulty, Difficulty::Easy);
        assert_eq!(problem.optimal_time_complexity, Some(Complexity::Linear));
        assert_eq!(problem.test_cases.len(), 1);
    }
}
