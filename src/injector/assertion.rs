//! Parsing of single-equality `assert` lines.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::errors::Result;
use crate::internal_err;

use super::prelude::ASSERT_MARKER;

lazy_static! {
    /// `assert (<expr> = <expected>);` with the last `=` splitting the two sides.
    static ref ASSERT_LINE: Regex =
        Regex::new(r"^assert\s*\((.+)\s*=\s*([^=]+)\);?$").expect("assert line pattern");
    static ref INT_LITERAL: Regex = Regex::new(r"^-?[0-9]+$").expect("int literal pattern");
}

/// Shape of the expected value, which selects the comparison routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExpectedKind {
    IntLiteral,
    BoolLiteral,
    StringLiteral,
    Other,
}

impl ExpectedKind {
    /// Classifies `text` by its literal shape. The checks are ordered and mutually exclusive.
    pub fn classify(text: &str) -> Self {
        let text = text.trim();
        if INT_LITERAL.is_match(text) {
            ExpectedKind::IntLiteral
        } else if text == "true" || text == "false" {
            ExpectedKind::BoolLiteral
        } else if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
            ExpectedKind::StringLiteral
        } else {
            ExpectedKind::Other
        }
    }

    /// Name of the prelude routine that compares values of this kind.
    pub fn routine(self) -> &'static str {
        match self {
            ExpectedKind::IntLiteral => "__assert_eq_int",
            ExpectedKind::BoolLiteral => "__assert_eq_bool",
            ExpectedKind::StringLiteral => "__assert_eq_string",
            ExpectedKind::Other => ASSERT_MARKER,
        }
    }
}

/// One equality assertion lifted out of a test line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestAssertion {
    pub raw_expression: String,
    pub expected_value_text: String,
    pub expected_kind: ExpectedKind,
}

impl TestAssertion {
    /// Parses a trimmed test line. Returns `Ok(None)` for anything that is not a simple
    /// `assert (<expr> = <expected>)`, including shapes the pattern splits incorrectly.
    pub fn parse(trimmed: &str) -> Result<Option<Self>> {
        let Some(caps) = ASSERT_LINE.captures(trimmed) else {
            return Ok(None);
        };
        let expr = caps
            .get(1)
            .ok_or_else(|| internal_err!("assert pattern matched without an expression: {trimmed}"))?
            .as_str()
            .trim();
        let expected = caps
            .get(2)
            .ok_or_else(|| internal_err!("assert pattern matched without an expected value: {trimmed}"))?
            .as_str()
            .trim();

        if expr.is_empty() || expected.is_empty() {
            return Ok(None);
        }
        // `>=`, `<=`, `==`, `:=` and `!=` end up split on their trailing `=`.
        if expr.ends_with(|c: char| matches!(c, '<' | '>' | '=' | ':' | '!')) {
            return Ok(None);
        }
        if !is_balanced(expr) || !is_balanced(expected) {
            return Ok(None);
        }

        Ok(Some(Self {
            raw_expression: expr.to_string(),
            expected_value_text: expected.to_string(),
            expected_kind: ExpectedKind::classify(expected),
        }))
    }

    /// Human-readable label, escaped for use inside an OCaml string literal.
    pub fn label(&self) -> String {
        format!("{} = {}", self.raw_expression, self.expected_value_text)
            .replace('\\', "\\\\")
            .replace('"', "\\\"")
    }

    /// Renders the instrumented call that replaces the original line.
    pub fn render(&self, indent: &str, terminated: bool) -> String {
        format!(
            "{indent}{} \"{}\" ({}) ({}){}",
            self.expected_kind.routine(),
            self.label(),
            self.raw_expression,
            self.expected_value_text,
            if terminated { ";" } else { "" }
        )
    }
}

/// Parentheses and brackets close in order and never go negative.
fn is_balanced(text: &str) -> bool {
    let mut parens = 0i64;
    let mut brackets = 0i64;
    for c in text.chars() {
        match c {
            '(' => parens += 1,
            ')' => parens -= 1,
            '[' => brackets += 1,
            ']' => brackets -= 1,
            _ => {}
        }
        if parens < 0 || brackets < 0 {
            return false;
        }
    }
    parens == 0 && brackets == 0
}
