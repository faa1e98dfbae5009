use camlpad::injector::{rewrite, rewrite_tests, CombinedSource, ExpectedKind, HELPER_PRELUDE};

#[test]
fn int_expectation_uses_int_routine() {
    assert_eq!(
        rewrite_tests("", "  assert (sum [1; 2; 3] = 6);"),
        "  __assert_eq_int \"sum [1; 2; 3] = 6\" (sum [1; 2; 3]) (6);"
    );
}

#[test]
fn negative_int_is_still_an_int() {
    assert_eq!(
        rewrite_tests("", "assert (pred 0 = -1);"),
        "__assert_eq_int \"pred 0 = -1\" (pred 0) (-1);"
    );
}

#[test]
fn bool_expectation_uses_bool_routine() {
    assert_eq!(
        rewrite_tests("", "assert (is_palindrome \"racecar\" = true);"),
        "__assert_eq_bool \"is_palindrome \\\"racecar\\\" = true\" (is_palindrome \"racecar\") (true);"
    );
}

#[test]
fn string_expectation_uses_string_routine() {
    assert_eq!(
        rewrite_tests("", "assert (greet () = \"hi\");"),
        "__assert_eq_string \"greet () = \\\"hi\\\"\" (greet ()) (\"hi\");"
    );
}

#[test]
fn other_expectation_uses_generic_routine() {
    assert_eq!(
        rewrite_tests("", "assert (rev [1; 2] = [2; 1]);"),
        "__assert_eq \"rev [1; 2] = [2; 1]\" (rev [1; 2]) ([2; 1]);"
    );
    assert_eq!(
        rewrite_tests("", "assert (find 3 = Some 3);"),
        "__assert_eq \"find 3 = Some 3\" (find 3) (Some 3);"
    );
}

#[test]
fn pass_announcement_becomes_summary_call() {
    assert_eq!(
        rewrite_tests("", "    print_endline \"All tests passed!\""),
        "    __test_pass ()"
    );
}

#[test]
fn unrelated_lines_pass_through() {
    let tests = "let () =\n  assert (mem 3 [1; 2; 3]);\n  print_endline \"done\"\n";
    assert_eq!(rewrite_tests("", tests), tests);
}

#[test]
fn rewriting_is_idempotent() {
    let tests = "let () =\n  assert (f 1 = 2);\n  assert (g 1 = true);\n  print_endline \"All tests passed!\"";
    let once = rewrite_tests("", tests);
    assert_ne!(once, tests);
    assert_eq!(rewrite_tests("", &once), once);
}

#[test]
fn rewrite_reports_what_it_instrumented() {
    let rewritten = rewrite("assert (a = 1);\nassert (b = \"x\");\nassert (c >= 2);").unwrap();
    let kinds: Vec<_> = rewritten.assertions.iter().map(|a| a.expected_kind).collect();
    assert_eq!(kinds, [ExpectedKind::IntLiteral, ExpectedKind::StringLiteral]);
    assert_eq!(rewritten.summary_lines, 0);
}

#[test]
fn empty_tests_stay_empty() {
    assert_eq!(rewrite_tests("let x = 1", ""), "");
}

#[test]
fn combined_source_layout() {
    let combined = CombinedSource::assemble("let x = 1", "assert (x = 1);");
    assert_eq!(
        combined.to_string(),
        format!("{HELPER_PRELUDE}\n\nlet x = 1\n\n__assert_eq_int \"x = 1\" (x) (1);")
    );
}
