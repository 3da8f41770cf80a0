//! Input decoder for semi-structured test-case input specs
//!
//! Test-case inputs arrive as loosely formatted strings such as
//! `"nums=[2,7,11,15];target=9"` or `"nums = [3,2,4], target = 6"`, and are
//! not guaranteed to be valid JSON. Decoding is total: an ordered chain of
//! strategies is tried and the first match wins, with a trivial fallback so
//! a malformed spec can never abort a run.

use serde_json::{Number, Value};

/// Ordered mapping from argument name to deserialized value
///
/// Order matters: arguments are passed positionally to the located function
/// in the order they were declared in the input spec.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedArguments {
    args: Vec<(String, Value)>,
}

impl DecodedArguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: Value) {
        self.args.push((name.into(), value));
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.args.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.args.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, Value)> {
        self.args.iter()
    }
}

/// Decode a test-case input spec into named arguments
///
/// Never fails: unparseable input degrades to a best-effort structure.
/// Strategies, first match wins:
/// 1. the whole string is a JSON object - keys are used verbatim
/// 2. the common `nums = [...]` / `target = <n>` idiom
/// 3. semicolon-separated assignments (`name=value;name=value`, with an
///    optional `const`/`let`/`var` prefix per clause)
/// 4. newline- or space-separated numbers forming an array plus a scalar
/// 5. the raw string wrapped under the synthetic key `input`
pub fn decode(input: &str) -> DecodedArguments {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return DecodedArguments::default();
    }

    json_object(trimmed)
        .or_else(|| nums_target_idiom(trimmed))
        .or_else(|| assignment_list(trimmed))
        .or_else(|| number_lines(trimmed))
        .unwrap_or_else(|| raw_fallback(trimmed))
}

/// Strategy 1: the whole input parses as a JSON object
fn json_object(input: &str) -> Option<DecodedArguments> {
    match serde_json::from_str::<Value>(input) {
        Ok(Value::Object(map)) => {
            let mut args = DecodedArguments::new();
            for (name, value) in map {
                args.push(name, value);
            }
            Some(args)
        }
        _ => None,
    }
}

/// Strategy 2: literal `nums`/`target` key search, the dominant two-argument
/// idiom in the problem corpus (`nums = [2,7,11,15], target = 9`)
fn nums_target_idiom(input: &str) -> Option<DecodedArguments> {
    let nums_pos = input.find("nums")?;
    let after_nums = &input[nums_pos + "nums".len()..];
    let eq = after_nums.find('=')?;
    let open = after_nums.find('[')?;
    if eq > open {
        return None;
    }
    let close = after_nums[open..].find(']')? + open;
    let nums = parse_number_list(&after_nums[open + 1..close]);

    let target_pos = input.find("target")?;
    let after_target = &input[target_pos + "target".len()..];
    let eq_t = after_target.find('=')?;
    let rest = after_target[eq_t + 1..].trim_start();
    let end = rest.find(';').unwrap_or(rest.len());
    let target = parse_scalar_number(rest[..end].trim())?;

    let mut args = DecodedArguments::new();
    args.push("nums", Value::Array(nums));
    args.push("target", target);
    Some(args)
}

/// Strategy 3: semicolon-separated assignment clauses
fn assignment_list(input: &str) -> Option<DecodedArguments> {
    let mut args = DecodedArguments::new();
    for clause in input.split(';') {
        let clause = clause.trim();
        if clause.is_empty() {
            continue;
        }
        if let Some((name, rhs)) = split_assignment(clause) {
            args.push(name, parse_value_loose(rhs));
        }
    }
    if args.is_empty() {
        None
    } else {
        Some(args)
    }
}

/// Parse `[const|let|var] <identifier> = <rest>` out of one clause
fn split_assignment(clause: &str) -> Option<(&str, &str)> {
    let mut body = clause;
    for prefix in ["const ", "let ", "var "] {
        if let Some(stripped) = body.strip_prefix(prefix) {
            body = stripped.trim_start();
            break;
        }
    }

    let mut chars = body.char_indices();
    let (_, first) = chars.next()?;
    if !(first.is_alphabetic() || first == '_' || first == '$') {
        return None;
    }
    let mut ident_end = first.len_utf8();
    for (idx, c) in chars {
        if c.is_alphanumeric() || c == '_' || c == '$' {
            ident_end = idx + c.len_utf8();
        } else {
            break;
        }
    }

    let name = &body[..ident_end];
    let rest = body[ident_end..].trim_start();
    let rhs = rest.strip_prefix('=')?;
    // reject comparisons (`a == b`)
    if rhs.starts_with('=') {
        return None;
    }
    Some((name, rhs))
}

/// Strategy 4: bare numbers, either two lines (array then scalar) or a
/// single line where the last number is the scalar
fn number_lines(input: &str) -> Option<DecodedArguments> {
    let lines: Vec<&str> = input
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    match lines.as_slice() {
        [first, second] => {
            let nums = parse_number_list(first);
            let target = parse_scalar_number(second)?;
            let mut args = DecodedArguments::new();
            args.push("nums", Value::Array(nums));
            args.push("target", target);
            Some(args)
        }
        [single] => {
            let tokens: Vec<&str> = single
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|t| !t.is_empty())
                .collect();
            if tokens.len() < 2 {
                return None;
            }
            let mut numbers = Vec::with_capacity(tokens.len());
            for token in &tokens {
                numbers.push(parse_scalar_number(token)?);
            }
            let target = numbers.pop()?;
            let mut args = DecodedArguments::new();
            args.push("nums", Value::Array(numbers));
            args.push("target", target);
            Some(args)
        }
        _ => None,
    }
}

/// Strategy 5: wrap the raw string under a single synthetic key
fn raw_fallback(input: &str) -> DecodedArguments {
    let mut args = DecodedArguments::new();
    args.push("input", Value::String(input.to_string()));
    args
}

/// Parse a comma/whitespace-separated list of numbers. Tokens that fail to
/// parse are dropped, never an error.
fn parse_number_list(text: &str) -> Vec<Value> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .filter_map(parse_scalar_number)
        .collect()
}

fn parse_scalar_number(token: &str) -> Option<Value> {
    let token = token.trim();
    if let Ok(i) = token.parse::<i64>() {
        return Some(Value::Number(Number::from(i)));
    }
    if let Ok(f) = token.parse::<f64>() {
        if f.is_finite() {
            return Number::from_f64(f).map(Value::Number);
        }
    }
    None
}

/// Best-effort value parse for an assignment right-hand side: JSON first,
/// then a single-quoted string, otherwise the raw text as a string.
fn parse_value_loose(rhs: &str) -> Value {
    let trimmed = rhs.trim();
    if let Ok(v) = serde_json::from_str::<Value>(trimmed) {
        return v;
    }
    if trimmed.len() >= 2 && trimmed.starts_with('\'') && trimmed.ends_with('\'') {
        return Value::String(trimmed[1..trimmed.len() - 1].to_string());
    }
    Value::String(trimmed.to_string())
}
