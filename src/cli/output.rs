//! Handles all user-facing output for the CLI.
//!
//! Colors are used only when stdout is a terminal.

use difference::{Changeset, Difference};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::catalog::Exercise;
use crate::errors::Result;
use crate::internal_err;
use crate::result::ExecutionResult;

fn stdout() -> StandardStream {
    let choice = if atty::is(atty::Stream::Stdout) {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    StandardStream::stdout(choice)
}

fn print_colored(stdout: &mut StandardStream, color: Color, bold: bool, text: &str) {
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(bold));
    println!("{text}");
    let _ = stdout.reset();
}

// ============================================================================
// EXECUTION RESULTS
// ============================================================================

/// Prints a run verdict, its trace and its error, or the whole record as JSON.
pub fn print_result(result: &ExecutionResult, json: bool) -> Result<()> {
    if json {
        let rendered = serde_json::to_string_pretty(result)
            .map_err(|e| internal_err!("failed to serialize result: {e}"))?;
        println!("{rendered}");
        return Ok(());
    }

    let mut stdout = stdout();
    if result.success {
        print_colored(&mut stdout, Color::Green, true, "✓ Passed");
    } else {
        print_colored(&mut stdout, Color::Red, true, "✗ Failed");
    }
    if !result.output.is_empty() {
        println!("{}", result.output);
    }
    if let Some(error) = &result.error {
        print_colored(&mut stdout, Color::Red, false, error);
    }
    Ok(())
}

/// Prints a line diff between the original and the instrumented tests.
pub fn print_diff(original: &str, rewritten: &str) {
    let mut stdout = stdout();
    let changeset = Changeset::new(original, rewritten, "\n");
    for diff in &changeset.diffs {
        match diff {
            Difference::Same(x) => {
                let _ = stdout.reset();
                println!(" {}", x.replace('\n', "\n "));
            }
            Difference::Add(x) => {
                let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)));
                println!("+{}", x.replace('\n', "\n+"));
            }
            Difference::Rem(x) => {
                let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Red)));
                println!("-{}", x.replace('\n', "\n-"));
            }
        }
    }
    let _ = stdout.reset();
}

// ============================================================================
// EXERCISES
// ============================================================================

pub fn print_exercise_line(exercise: &Exercise, completed: bool) {
    let mut stdout = stdout();
    if completed {
        let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)));
        print!("[✓] ");
    } else {
        print!("[ ] ");
    }
    let _ = stdout.reset();
    println!(
        "{:<20} {} ({}, {})",
        exercise.id, exercise.title, exercise.difficulty, exercise.category
    );
}

pub fn print_exercise(exercise: &Exercise, solution: bool, hints: bool) {
    let mut stdout = stdout();
    print_colored(&mut stdout, Color::Cyan, true, &exercise.title);
    println!("{} · {}", exercise.difficulty, exercise.category);
    println!();
    println!("{}", exercise.description.trim_end());

    section(&mut stdout, "Starter code", &exercise.starter_code);
    section(&mut stdout, "Tests", &exercise.tests);
    if solution {
        section(&mut stdout, "Solution", &exercise.solution);
    }
    if hints && !exercise.hints.is_empty() {
        println!();
        print_colored(&mut stdout, Color::Yellow, true, "Hints");
        for hint in &exercise.hints {
            println!("  • {hint}");
        }
    }
}

fn section(stdout: &mut StandardStream, title: &str, body: &str) {
    println!();
    print_colored(stdout, Color::Yellow, true, title);
    println!("{}", body.trim_end());
}
