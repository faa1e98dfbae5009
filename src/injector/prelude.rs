//! OCaml helper routines prepended to every combined source.
//!
//! The prelude keeps a counter of executed assertions, one comparison routine per literal kind,
//! and a summary printer. Each routine fails with a labelled message on mismatch.

/// Prefix shared by every instrumented comparison routine.
pub const ASSERT_MARKER: &str = "__assert_eq";

/// Name of the summary routine that replaces the "all tests passed" announcement.
pub const PASS_MARKER: &str = "__test_pass";

pub const HELPER_PRELUDE: &str = r#"
let __test_num = ref 0

(* Integer comparison, reports both values *)
let __assert_eq_int expr_str result expected =
  incr __test_num;
  if result <> expected then
    failwith (Printf.sprintf "Test %d: %s FAILED,  Expected: %d,  Got: %d" !__test_num expr_str expected result)

(* Boolean comparison, reports both values *)
let __assert_eq_bool expr_str result expected =
  incr __test_num;
  if result <> expected then
    failwith (Printf.sprintf "Test %d: %s FAILED,  Expected: %b,  Got: %b" !__test_num expr_str expected result)

(* String comparison, reports both values *)
let __assert_eq_string expr_str result expected =
  incr __test_num;
  if result <> expected then
    failwith (Printf.sprintf "Test %d: %s FAILED,  Expected: \"%s\",  Got: \"%s\"" !__test_num expr_str expected result)

(* Any other type: values cannot be printed generically *)
let __assert_eq expr_str result expected =
  incr __test_num;
  if result <> expected then
    failwith (Printf.sprintf "Test %d: %s FAILED" !__test_num expr_str)

let __test_pass () =
  print_endline ("✅ All " ^ string_of_int !__test_num ^ " tests passed!")
"#;

/// True when `text` already calls into the prelude, i.e. it has been rewritten before.
pub fn is_instrumented(text: &str) -> bool {
    text.contains(ASSERT_MARKER) || text.contains(PASS_MARKER)
}
