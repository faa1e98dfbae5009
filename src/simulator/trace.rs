//! Synthetic toplevel output lines.

/// What the toplevel prints for an expression of type `unit`.
pub const UNIT_RESULT: &str = "- : unit = ()";

/// Uncaught `failwith "TODO"` as the toplevel would report it.
pub const UNCAUGHT_TODO: &str = "Exception: Failure \"TODO\".";

pub fn value_bound(name: &str) -> String {
    format!("val {name} : ... = <value>")
}

pub fn type_defined(name: &str) -> String {
    format!("type {name} = ...")
}

pub fn tests_passed(count: usize) -> String {
    format!("✅ All {count} tests passed!")
}

/// Ordered trace lines emitted while scanning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trace {
    lines: Vec<String>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}
