//! Line rules for the simulator, evaluated in fixed priority order.
//!
//! Each rule pairs a guard over the trimmed line with an action that appends to the trace or
//! halts the scan. The first rule whose guard matches handles the line; lines no rule claims
//! produce nothing.

use lazy_static::lazy_static;
use regex::Regex;

use crate::errors::Result;
use crate::injector::{ASSERT_MARKER, PASS_MARKER};
use crate::internal_err;
use crate::result::{ExecutionResult, Failure};

use super::trace::{self, Trace};

lazy_static! {
    static ref BINDING: Regex = Regex::new(r"^let\s+(?:rec\s+)?(\w+)").expect("binding pattern");
    static ref TYPE_DEF: Regex =
        Regex::new(r"^type\s+(?:'?\w+\s+)?(\w+)").expect("type definition pattern");
    static ref ASSERT_KEYWORD: Regex = Regex::new(r"^assert\b").expect("assert keyword pattern");
    static ref PRINT_LITERAL: Regex =
        Regex::new(r#"^print_endline\s+"([^"]+)""#).expect("print pattern");
}

/// Mutable state threaded through one scan.
#[derive(Debug, Default)]
pub(crate) struct ScanState {
    pub trace: Trace,
    pub has_placeholder: bool,
    pub assertions: usize,
}

impl ScanState {
    pub fn new(has_placeholder: bool) -> Self {
        Self {
            has_placeholder,
            ..Self::default()
        }
    }
}

#[derive(Debug)]
pub(crate) enum Step {
    Continue,
    Halt(ExecutionResult),
}

pub(crate) struct LineRule {
    pub name: &'static str,
    pub guard: fn(&str) -> bool,
    pub action: fn(&str, &mut ScanState) -> Result<Step>,
}

pub(crate) static LINE_RULES: &[LineRule] = &[
    LineRule {
        name: "binding",
        guard: |line: &str| line.starts_with("let ") && line.contains('='),
        action: bind_value,
    },
    LineRule {
        name: "type",
        guard: |line: &str| line.starts_with("type "),
        action: define_type,
    },
    LineRule {
        name: "assertion",
        guard: |line: &str| ASSERT_KEYWORD.is_match(line) || line.starts_with(ASSERT_MARKER),
        action: run_assertion,
    },
    LineRule {
        name: "summary",
        guard: |line: &str| line.starts_with(PASS_MARKER),
        action: summarize,
    },
    LineRule {
        name: "print",
        guard: |line: &str| line.starts_with("print_endline"),
        action: print_literal,
    },
];

/// Returns the rule that handles `line`, if any.
pub(crate) fn rule_for(line: &str) -> Option<&'static LineRule> {
    LINE_RULES.iter().find(|rule| (rule.guard)(line))
}

fn first_capture<'a>(pattern: &Regex, line: &'a str) -> Result<Option<&'a str>> {
    match pattern.captures(line) {
        Some(caps) => caps
            .get(1)
            .map(|m| Some(m.as_str()))
            .ok_or_else(|| internal_err!("pattern matched without a capture: {line}")),
        None => Ok(None),
    }
}

fn bind_value(line: &str, state: &mut ScanState) -> Result<Step> {
    if let Some(name) = first_capture(&BINDING, line)? {
        state.trace.push(trace::value_bound(name));
    }
    Ok(Step::Continue)
}

fn define_type(line: &str, state: &mut ScanState) -> Result<Step> {
    if let Some(name) = first_capture(&TYPE_DEF, line)? {
        state.trace.push(trace::type_defined(name));
    }
    Ok(Step::Continue)
}

fn run_assertion(line: &str, state: &mut ScanState) -> Result<Step> {
    if state.has_placeholder {
        state.trace.push(trace::UNCAUGHT_TODO);
        return Ok(Step::Halt(ExecutionResult::failure(
            state.trace.render(),
            Failure::UnimplementedPlaceholder,
        )));
    }
    // Only the prelude routines bump `__test_num`; bare asserts are not counted.
    if line.starts_with(ASSERT_MARKER) {
        state.assertions += 1;
    }
    state.trace.push(trace::UNIT_RESULT);
    Ok(Step::Continue)
}

fn summarize(_line: &str, state: &mut ScanState) -> Result<Step> {
    state.trace.push(trace::tests_passed(state.assertions));
    Ok(Step::Continue)
}

fn print_literal(line: &str, state: &mut ScanState) -> Result<Step> {
    if let Some(text) = first_capture(&PRINT_LITERAL, line)? {
        state.trace.push(text);
    }
    Ok(Step::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(line: &str, state: &mut ScanState) -> Option<Step> {
        rule_for(line).map(|rule| (rule.action)(line, state).unwrap())
    }

    #[test]
    fn test_rule_priority() {
        let name = |line: &str| rule_for(line).map(|rule| rule.name);
        assert_eq!(name("let x = 1"), Some("binding"));
        assert_eq!(name("let x"), None);
        assert_eq!(name("type 'a tree ="), Some("type"));
        assert_eq!(name("assert (f 0 = 1);"), Some("assertion"));
        assert_eq!(name("assert(f 0 = 1);"), Some("assertion"));
        assert_eq!(name("__assert_eq_int \"f 0 = 1\" (f 0) (1);"), Some("assertion"));
        assert_eq!(name("__test_pass ()"), Some("summary"));
        assert_eq!(name("print_endline \"hi\""), Some("print"));
        assert_eq!(name("assertion_count := 0"), None);
        assert_eq!(name("| x :: xs -> x"), None);
    }

    #[test]
    fn test_binding_names() {
        let mut state = ScanState::new(false);
        apply("let rec factorial n =", &mut state);
        apply("let () =", &mut state);
        apply("let recursive_sum = 3", &mut state);
        assert_eq!(
            state.trace.lines(),
            ["val factorial : ... = <value>", "val recursive_sum : ... = <value>"]
        );
    }

    #[test]
    fn test_type_names() {
        let mut state = ScanState::new(false);
        apply("type 'a tree =", &mut state);
        apply("type color = Red | Green", &mut state);
        assert_eq!(state.trace.lines(), ["type tree = ...", "type color = ..."]);
    }

    #[test]
    fn test_assertion_halts_on_placeholder() {
        let mut state = ScanState::new(true);
        state.trace.push("val f : ... = <value>");
        let Some(Step::Halt(result)) = apply("assert (f 1 = 2);", &mut state) else {
            panic!("expected the scan to halt");
        };
        assert!(!result.success);
        assert_eq!(
            result.output,
            "val f : ... = <value>\nException: Failure \"TODO\"."
        );
        assert_eq!(
            result.error.as_deref(),
            Some("Function not implemented (failwith \"TODO\")")
        );
    }

    #[test]
    fn test_summary_reports_assertion_count() {
        let mut state = ScanState::new(false);
        apply("__assert_eq_int \"f 0 = 1\" (f 0) (1);", &mut state);
        apply("__assert_eq \"g 0 = [1]\" (g 0) ([1]);", &mut state);
        apply("__test_pass ()", &mut state);
        assert_eq!(state.trace.lines().last().unwrap(), "✅ All 2 tests passed!");
    }

    #[test]
    fn test_summary_ignores_bare_asserts() {
        let mut state = ScanState::new(false);
        apply("__assert_eq_int \"f 1 = 1\" (f 1) (1);", &mut state);
        apply("assert (List.mem 1 [1]);", &mut state);
        apply("__test_pass ()", &mut state);
        assert_eq!(
            state.trace.lines(),
            ["- : unit = ()", "- : unit = ()", "✅ All 1 tests passed!"]
        );
    }

    #[test]
    fn test_print_requires_literal() {
        let mut state = ScanState::new(false);
        apply("print_endline \"All tests passed!\"", &mut state);
        apply("print_endline (string_of_int 3)", &mut state);
        apply("print_endline \"\"", &mut state);
        assert_eq!(state.trace.lines(), ["All tests passed!"]);
    }
}
