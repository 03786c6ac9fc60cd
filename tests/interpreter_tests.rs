// Integration tests for the SynthFlow interpreter
//
// These tests verify the interpreter's behavior by running complete
// SynthFlow programs and checking the results. Tests cover:
// - Variable assignment, scoping, and const discipline
// - Control flow (if/else, loops, match)
// - Functions, lambdas, and closures
// - Data structures (arrays, maps, struct factories)
// - Error handling with try/catch
// - Built-in functions and the printed form

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use synthflow::errors::SynthFlowError;
use synthflow::interpreter::{Interpreter, Value};
use synthflow::lexer::tokenize;
use synthflow::parser::Parser;
use synthflow::semantic;

fn unique_key(prefix: &str) -> String {
    static KEY_COUNTER: AtomicU64 = AtomicU64::new(1);
    format!("{}_{}", prefix, KEY_COUNTER.fetch_add(1, Ordering::Relaxed))
}

/// Runs a program to completion, returning the interpreter (for variable
/// inspection) and everything it printed.
fn run_code(code: &str) -> (Interpreter, String) {
    let tokens = tokenize(code).expect("lexing failed");
    let program = Parser::new(tokens).parse().expect("parsing failed");
    let mut interp = Interpreter::new();
    let buffer = Rc::new(RefCell::new(Vec::new()));
    interp.set_output(Rc::clone(&buffer));
    interp
        .execute(&program)
        .unwrap_or_else(|e| panic!("runtime failure: {}", e.message));
    let output = String::from_utf8(buffer.borrow().clone()).expect("output was not UTF-8");
    (interp, output)
}

fn run_output(code: &str) -> String {
    run_code(code).1
}

/// Runs a program expecting a runtime failure, returning the error
fn run_expect_error(code: &str) -> SynthFlowError {
    let tokens = tokenize(code).expect("lexing failed");
    let program = Parser::new(tokens).parse().expect("parsing failed");
    let mut interp = Interpreter::new();
    let buffer = Rc::new(RefCell::new(Vec::new()));
    interp.set_output(buffer);
    interp
        .execute(&program)
        .expect_err("program was expected to fail")
}

fn get_var(interp: &Interpreter, name: &str) -> Value {
    interp
        .get_variable(name)
        .unwrap_or_else(|| panic!("variable '{}' not defined", name))
}

// --- arithmetic and coercion ---

#[test]
fn test_arithmetic_and_integer_division() {
    let output = run_output("print(7 / 2)  print(7.0 / 2)  print(7 % 2)");
    assert_eq!(output, "3\n3.5\n1\n");
}

#[test]
fn test_float_promotion() {
    let output = run_output("print(1 + 2.5)  print(2 * 1.5)  print(10 - 0.5)");
    assert_eq!(output, "3.5\n3\n9.5\n");
}

#[test]
fn test_string_concatenation_coerces_printed_forms() {
    let output = run_output(r#"print("a" + 1)  print(2 + "b")  print("n=" + null)  print("t=" + true)"#);
    assert_eq!(output, "a1\n2b\nn=null\nt=true\n");
}

#[test]
fn test_division_by_zero_is_a_runtime_error() {
    let error = run_expect_error("print(1 / 0)");
    assert_eq!(error.message, "Division by zero");

    let error = run_expect_error("print(5 % 0)");
    assert_eq!(error.message, "Division by zero");
}

#[test]
fn test_unary_operators() {
    let output = run_output("print(-5)  print(-2.5)  print(!true)  print(!0)  print(!\"\")");
    assert_eq!(output, "-5\n-2.5\nfalse\ntrue\ntrue\n");
}

#[test]
fn test_comparison_operators() {
    let output = run_output("print(1 < 2)  print(2.5 >= 2)  print(3 <= 2)");
    assert_eq!(output, "true\ntrue\nfalse\n");
}

#[test]
fn test_string_comparison_is_lexicographic() {
    let output = run_output(r#"print("abc" < "abd")  print("b" > "a")  print("a" >= "b")"#);
    assert_eq!(output, "true\ntrue\nfalse\n");
}

#[test]
fn test_equality_on_mismatched_tags_is_false() {
    let output = run_output(r#"print(1 == "1")  print(null == false)  print(1 != "1")"#);
    assert_eq!(output, "false\nfalse\ntrue\n");
}

#[test]
fn test_numeric_equality_promotes() {
    let output = run_output("print(1 == 1.0)  print(2 != 2.0)");
    assert_eq!(output, "true\nfalse\n");
}

#[test]
fn test_logical_operators_return_booleans() {
    let output = run_output(r#"print(1 && "x")  print(0 || "")  print(null || 3)"#);
    assert_eq!(output, "true\nfalse\ntrue\n");
}

// --- variables and scoping ---

#[test]
fn test_variable_declaration_and_assignment() {
    let (interp, _) = run_code("let x = 10\nx = x + 5");
    assert!(matches!(get_var(&interp, "x"), Value::Int(15)));
}

#[test]
fn test_type_annotations_are_recorded_not_enforced() {
    let (interp, _) = run_code("let x: int = 1\nconst PI: float = 3.14\nlet s: string? = null");
    assert!(matches!(get_var(&interp, "x"), Value::Int(1)));
    assert!(matches!(get_var(&interp, "s"), Value::Null));
}

#[test]
fn test_block_scope_is_discarded_on_exit() {
    let output = run_output("let x = 1\n{ let x = 2\nprint(x) }\nprint(x)");
    assert_eq!(output, "2\n1\n");
}

#[test]
fn test_inner_scope_assignment_mutates_outer_binding() {
    let output = run_output("let x = 1\n{ x = 2 }\nprint(x)");
    assert_eq!(output, "2\n");
}

#[test]
fn test_const_reassignment_raises() {
    let error = run_expect_error("const x = 1\nx = 2");
    assert_eq!(error.message, "Cannot reassign const variable 'x'");
}

#[test]
fn test_const_protects_the_binding_not_the_referent() {
    let output = run_output("const arr = [1, 2]\narr[0] = 9\nprint(arr[0])");
    assert_eq!(output, "9\n");
}

#[test]
fn test_undefined_variable_raises() {
    let error = run_expect_error("print(missing)");
    assert_eq!(error.message, "Undefined variable: missing");
}

#[test]
fn test_assignment_to_undefined_variable_raises() {
    let error = run_expect_error("missing = 1");
    assert_eq!(error.message, "Undefined variable: missing");
}

// --- control flow ---

#[test]
fn test_if_else_branches() {
    let output = run_output("let x = 3\nif (x > 0) { print(x) } else { print(-x) }");
    assert_eq!(output, "3\n");

    let output = run_output("let x = -3\nif (x > 0) { print(x) } else { print(-x) }");
    assert_eq!(output, "3\n");
}

#[test]
fn test_else_if_chain() {
    let code = r#"
        fn grade(score) {
            if (score >= 90) { return "A" }
            else if (score >= 80) { return "B" }
            else { return "C" }
        }
        print(grade(95), grade(85), grade(10))
    "#;
    assert_eq!(run_output(code), "A B C\n");
}

#[test]
fn test_bare_statement_bodies_are_wrapped() {
    let output = run_output("let x = 1\nif (x) print(\"yes\")\nwhile (x < 3) x = x + 1\nprint(x)");
    assert_eq!(output, "yes\n3\n");
}

#[test]
fn test_while_loop_with_break_and_continue() {
    let code = r#"
        let i = 0
        let total = 0
        while (true) {
            i = i + 1
            if (i == 3) continue
            if (i > 5) break
            total = total + i
        }
        print(total)
    "#;
    // 1 + 2 + 4 + 5
    assert_eq!(run_output(code), "12\n");
}

#[test]
fn test_for_loop_break_and_continue_honour_increment() {
    let code = r#"
        for (let i = 0; i < 5; i = i + 1) {
            if (i == 2) continue
            if (i == 4) break
            print(i)
        }
    "#;
    assert_eq!(run_output(code), "0\n1\n3\n");
}

#[test]
fn test_for_loop_with_update_increment() {
    let output = run_output("for (let i = 0; i < 3; i++) { print(i) }");
    assert_eq!(output, "0\n1\n2\n");
}

#[test]
fn test_for_loop_variable_is_scoped_to_the_loop() {
    let error = run_expect_error("for (let i = 0; i < 1; i = i + 1) { }\nprint(i)");
    assert_eq!(error.message, "Undefined variable: i");
}

#[test]
fn test_break_outside_loop_converts_to_runtime_error() {
    let error = run_expect_error("break");
    assert_eq!(error.message, "break outside loop");

    let error = run_expect_error("continue");
    assert_eq!(error.message, "continue outside loop");
}

#[test]
fn test_return_outside_function_converts_to_runtime_error() {
    let error = run_expect_error("return 1");
    assert_eq!(error.message, "return outside function");
}

// --- match ---

#[test]
fn test_match_returns_null_on_no_match_and_default_catches() {
    let output = run_output(
        r#"print(match 5 { 1 => "one", 2 => "two" })  print(match 5 { 1 => "one", _ => "other" })"#,
    );
    assert_eq!(output, "null\nother\n");
}

#[test]
fn test_match_first_case_wins() {
    let output = run_output(r#"print(match 200 { 200 => "ok", 404 => "nf", _ => "?" })"#);
    assert_eq!(output, "ok\n");
}

#[test]
fn test_match_on_strings_and_booleans() {
    let code = r#"
        let w = "b"
        print(match w { "a" => 1, "b" => 2, _ => 0 })
        print(match true { false => "f", true => "t" })
    "#;
    assert_eq!(run_output(code), "2\nt\n");
}

#[test]
fn test_match_subject_can_be_an_identifier_pattern() {
    let code = r#"
        let expected = 7
        print(match 7 { expected => "hit", _ => "miss" })
    "#;
    assert_eq!(run_output(code), "hit\n");
}

// --- functions and closures ---

#[test]
fn test_function_declaration_and_call() {
    let output = run_output("fn add(a: int, b: int) -> int { return a + b }\nprint(add(2, 3))");
    assert_eq!(output, "5\n");
}

#[test]
fn test_function_without_return_yields_null() {
    let output = run_output("fn noop() { let x = 1 }\nprint(noop())");
    assert_eq!(output, "null\n");
}

#[test]
fn test_missing_arguments_pad_with_null_and_extras_are_discarded() {
    let output = run_output("fn show(a, b) { print(a, b) }\nshow(1)\nshow(1, 2, 3)");
    assert_eq!(output, "1 null\n1 2\n");
}

#[test]
fn test_variadic_parameter_collects_surplus_arguments() {
    let code = r#"
        fn tally(first, ...rest) {
            let total = first
            for (let i = 0; i < rest.length; i = i + 1) {
                total = total + rest[i]
            }
            return total
        }
        print(tally(1, 2, 3, 4))
        print(tally(1))
    "#;
    assert_eq!(run_output(code), "10\n1\n");
}

#[test]
fn test_closures_capture_environment_by_reference() {
    let code = r#"
        fn make() { let c = 0; fn bump() { c = c + 1; return c } return bump }
        let b = make()
        print(b())  print(b())  print(b())
    "#;
    assert_eq!(run_output(code), "1\n2\n3\n");
}

#[test]
fn test_two_closures_from_separate_calls_do_not_share_state() {
    let code = r#"
        fn make() { let c = 0; fn bump() { c = c + 1; return c } return bump }
        let a = make()
        let b = make()
        a()
        a()
        print(a(), b())
    "#;
    assert_eq!(run_output(code), "3 1\n");
}

#[test]
fn test_closures_observe_later_additions_to_their_scope() {
    let code = r#"
        fn show() { return late }
        let late = 42
        print(show())
    "#;
    assert_eq!(run_output(code), "42\n");
}

#[test]
fn test_recursive_function() {
    let code = r#"
        fn fib(n) {
            if (n < 2) { return n }
            return fib(n - 1) + fib(n - 2)
        }
        print(fib(10))
    "#;
    assert_eq!(run_output(code), "55\n");
}

#[test]
fn test_undefined_function_raises() {
    let error = run_expect_error("nothing_here(1)");
    assert_eq!(error.message, "Undefined function: nothing_here");
}

#[test]
fn test_calling_a_non_function_value_raises() {
    let error = run_expect_error("let x = 3\nx(1)");
    assert_eq!(error.message, "'x' is not a function, it is a int");
}

// --- lambdas ---

#[test]
fn test_lambda_with_expression_body() {
    let output = run_output("let squared = (n) => n * n\nprint(squared(5))");
    assert_eq!(output, "25\n");
}

#[test]
fn test_lambda_with_block_body() {
    let code = r#"
        let clamp = (n) => {
            if (n > 10) { return 10 }
            return n
        }
        print(clamp(15), clamp(3))
    "#;
    assert_eq!(run_output(code), "10 3\n");
}

#[test]
fn test_lambda_with_no_parameters() {
    let output = run_output("let five = () => 5\nprint(five())");
    assert_eq!(output, "5\n");
}

#[test]
fn test_lambda_captures_enclosing_scope() {
    let code = r#"
        let base = 100
        let offset = (n) => base + n
        base = 200
        print(offset(5))
    "#;
    assert_eq!(run_output(code), "205\n");
}

#[test]
fn test_lambda_with_typed_parameters() {
    let output = run_output("let add = (a: int, b: int) => a + b\nprint(add(1, 2))");
    assert_eq!(output, "3\n");
}

// --- arrays ---

#[test]
fn test_array_literal_index_and_length() {
    let output = run_output("let arr = [10, 20, 30]\nprint(arr[0], arr[2], arr.length)");
    assert_eq!(output, "10 30 3\n");
}

#[test]
fn test_array_index_assignment() {
    let output = run_output("let arr = [1, 2]\narr[1] = 5\nprint(arr)");
    assert_eq!(output, "[1, 5]\n");
}

#[test]
fn test_arrays_are_reference_shared() {
    let code = r#"
        let a = [1, 2, 3]
        let b = a
        b[0] = 9
        print(a[0])
    "#;
    assert_eq!(run_output(code), "9\n");
}

#[test]
fn test_array_index_out_of_bounds_raises() {
    let error = run_expect_error("let a = [1]\nprint(a[5])");
    assert_eq!(error.message, "Array index out of bounds");

    let error = run_expect_error("let a = [1]\nprint(a[-1])");
    assert_eq!(error.message, "Array index out of bounds");
}

#[test]
fn test_indexing_a_non_array_raises() {
    let error = run_expect_error("let x = 5\nprint(x[0])");
    assert_eq!(error.message, "Cannot index non-array");
}

#[test]
fn test_array_index_must_be_an_integer() {
    let error = run_expect_error("let a = [1]\nprint(a[\"0\"])");
    assert_eq!(error.message, "Array index must be integer");
}

// --- maps, members, and struct factories ---

#[test]
fn test_map_literal_and_member_access() {
    let output = run_output("let pt = { x: 1, y: 2 }\nprint(pt.x, pt.y)");
    assert_eq!(output, "1 2\n");
}

#[test]
fn test_map_string_keys_and_printed_form() {
    let output = run_output("let m = { \"b\": 2, a: 1 }\nprint(m)");
    // Printed form sorts keys for deterministic output
    assert_eq!(output, "{\"a\": 1, \"b\": 2}\n");
}

#[test]
fn test_missing_map_member_raises() {
    let error = run_expect_error("let m = { x: 1 }\nprint(m.y)");
    assert_eq!(error.message, "Map does not have member: y");
}

#[test]
fn test_map_member_function_call() {
    let code = r#"
        let counter = { step: 2, bump: (n) => n + 1 }
        print(counter.bump(4))
    "#;
    assert_eq!(run_output(code), "5\n");
}

#[test]
fn test_self_resolves_to_the_receiver_in_map_methods() {
    let code = r#"
        let obj = { v: 21, double: () => self.v * 2 }
        print(obj.double())
    "#;
    assert_eq!(run_output(code), "42\n");
}

#[test]
fn test_method_call_on_non_map_raises() {
    let error = run_expect_error("let x = 1\nx.go()");
    assert_eq!(error.message, "Cannot call method 'go' on int");
}

#[test]
fn test_string_length_member() {
    let output = run_output("let s = \"hello\"\nprint(s.length)");
    assert_eq!(output, "5\n");
}

#[test]
fn test_struct_declaration_registers_a_factory() {
    let code = r#"
        struct Point { x: int, y: int }
        let p = Point(3, 4)
        print(p.x, p.y, p.__type__)
    "#;
    assert_eq!(run_output(code), "3 4 Point\n");
}

#[test]
fn test_import_is_a_no_op_at_evaluation_time() {
    let output = run_output("import io from \"std/io\" as fileio\nprint(1)");
    assert_eq!(output, "1\n");
}

// --- update and compound assignment ---

#[test]
fn test_postfix_update_returns_old_value() {
    let output = run_output("let i = 5\nprint(i++)\nprint(i)\nprint(i--)\nprint(i)");
    assert_eq!(output, "5\n6\n6\n5\n");
}

#[test]
fn test_prefix_update_returns_new_value() {
    let output = run_output("let i = 5\nprint(++i)\nprint(--i)");
    assert_eq!(output, "6\n5\n");
}

#[test]
fn test_update_preserves_float_kind() {
    let (interp, _) = run_code("let x = 1.5\nx++");
    match get_var(&interp, "x") {
        Value::Float(n) => assert_eq!(n, 2.5),
        other => panic!("expected float, got {:?}", other),
    }
}

#[test]
fn test_update_requires_a_numeric_operand() {
    let error = run_expect_error("let s = \"a\"\ns++");
    assert_eq!(error.message, "'++' requires a numeric operand, got string");
}

#[test]
fn test_compound_assignment_operators() {
    let code = r#"
        let x = 10
        x += 5
        x -= 3
        x *= 2
        x /= 4
        print(x)
    "#;
    assert_eq!(run_output(code), "6\n");
}

#[test]
fn test_compound_plus_concatenates_strings() {
    let output = run_output("let s = \"ab\"\ns += \"cd\"\nprint(s)");
    assert_eq!(output, "abcd\n");
}

#[test]
fn test_compound_assignment_on_const_raises() {
    let error = run_expect_error("const x = 1\nx += 1");
    assert_eq!(error.message, "Cannot reassign const variable 'x'");
}

// --- try/catch ---

#[test]
fn test_try_catch_recovers_and_return_passes_through() {
    let code = r#"
        fn f() { try { let a = [1]; print(a[5]) } catch (e) { print("caught") }; return 42 }
        print(f())
    "#;
    assert_eq!(run_output(code), "caught\n42\n");
}

#[test]
fn test_catch_binds_the_error_message_as_a_string() {
    let code = r#"
        try { let a = [1]; a[9] = 0 } catch (e) { print(e + "!") }
    "#;
    assert_eq!(run_output(code), "Array index out of bounds!\n");
}

#[test]
fn test_errors_propagate_out_of_calls_into_enclosing_try() {
    let code = r#"
        fn boom() { return 1 / 0 }
        try { boom() } catch (e) { print(e) }
    "#;
    assert_eq!(run_output(code), "Division by zero\n");
}

#[test]
fn test_control_flow_signals_pass_through_try_untouched() {
    let code = r#"
        for (let i = 0; i < 3; i = i + 1) {
            try {
                if (i == 1) continue
                if (i == 2) break
                print(i)
            } catch (e) {
                print("caught")
            }
        }
        print("done")
    "#;
    assert_eq!(run_output(code), "0\ndone\n");
}

#[test]
fn test_uncaught_error_escapes_nested_try_only_once_handled() {
    let code = r#"
        try {
            try { print(1 / 0) } catch (inner) { print("inner") }
            let a = [1]
            print(a[3])
        } catch (outer) { print("outer") }
    "#;
    assert_eq!(run_output(code), "inner\nouter\n");
}

// --- string interpolation ---

#[test]
fn test_interpolation_evaluates_left_to_right() {
    let output = run_output("let x = 10; let y = 3; print(\"${x} + ${y} = ${x + y}\")");
    assert_eq!(output, "10 + 3 = 13\n");
}

#[test]
fn test_interpolation_evaluates_each_expression_once() {
    let code = r#"
        let n = 0
        fn bump() { n = n + 1; return n }
        print("${bump()}")
        print(n)
    "#;
    assert_eq!(run_output(code), "1\n1\n");
}

#[test]
fn test_interpolation_uses_printed_forms() {
    let code = r#"
        let arr = [1, 2]
        print("arr=${arr} flag=${true} none=${null}")
    "#;
    assert_eq!(run_output(code), "arr=[1, 2] flag=true none=null\n");
}

#[test]
fn test_plain_dollar_without_brace_is_literal() {
    let output = run_output(r#"print("cost: $5")"#);
    assert_eq!(output, "cost: $5\n");
}

#[test]
fn test_string_escapes() {
    let output = run_output(r#"print("a\tb\nc\"d\\e")"#);
    assert_eq!(output, "a\tb\nc\"d\\e\n");
}

// --- built-ins ---

#[test]
fn test_print_joins_arguments_with_spaces() {
    let output = run_output("print(1, \"two\", 3.5, true, null)");
    assert_eq!(output, "1 two 3.5 true null\n");
}

#[test]
fn test_len_builtin() {
    let output = run_output("print(len(\"hello\"), len([1, 2, 3]))");
    assert_eq!(output, "5 3\n");
}

#[test]
fn test_len_requires_string_or_array() {
    let error = run_expect_error("len(5)");
    assert_eq!(error.message, "len() requires a string or array, got int");
}

#[test]
fn test_len_arity_is_checked() {
    let error = run_expect_error("len()");
    assert_eq!(error.message, "len() takes 1 argument(s), got 0");
}

#[test]
fn test_numeric_casts() {
    let output = run_output("print(int(3.9), int(\"12\"), int(true), float(2), float(\"1.5\"))");
    assert_eq!(output, "3 12 1 2 1.5\n");
}

#[test]
fn test_failed_string_parse_raises() {
    let error = run_expect_error("int(\"abc\")");
    assert_eq!(error.message, "Cannot convert string 'abc' to int");
}

#[test]
fn test_str_and_type_conversion_calls() {
    let output = run_output("print(str(12) + \"!\", string(true), bool(0), bool(\"x\"))");
    assert_eq!(output, "12! true false true\n");
}

#[test]
fn test_array_and_map_conversion_calls() {
    let output = run_output("let a = array(1, 2)\nlet m = map()\nprint(a, m)");
    assert_eq!(output, "[1, 2] {}\n");
}

#[test]
fn test_read_and_write_file_round_trip() {
    let path = std::env::temp_dir().join(format!("synthflow_{}.txt", unique_key("io")));
    let path_str = path.to_string_lossy().to_string();

    let code = format!(
        r#"
        let ok = write_file("{path}", "payload 42")
        print(ok)
        print(read_file("{path}"))
        "#,
        path = path_str
    );
    assert_eq!(run_output(&code), "true\npayload 42\n");

    std::fs::remove_file(&path).ok();
}

#[test]
fn test_read_file_failure_is_catchable() {
    let code = r#"
        try { read_file("/definitely/not/here.txt") } catch (e) { print("io error") }
    "#;
    assert_eq!(run_output(code), "io error\n");
}

#[test]
fn test_builtin_names_are_registered_as_globals() {
    let interp = Interpreter::new();
    for name in Interpreter::get_builtin_names() {
        assert!(
            matches!(interp.get_variable(name), Some(Value::Function(_))),
            "builtin '{}' is not registered",
            name
        );
    }
}

#[test]
fn test_user_function_shadows_builtin_resolution() {
    let output = run_output("fn len(x) { return 99 }\nprint(len(\"abc\"))");
    assert_eq!(output, "99\n");
}

// --- semantic pass ---

#[test]
fn test_semantic_pass_rejects_break_outside_loop() {
    let tokens = tokenize("fn f() { break }").unwrap();
    let program = Parser::new(tokens).parse().unwrap();
    let error = semantic::analyze(&program).expect_err("expected semantic error");
    assert_eq!(error.message, "break statement not allowed outside of loop");
}

#[test]
fn test_semantic_pass_rejects_const_reassignment() {
    let tokens = tokenize("const k = 1\nfn f() { k = 2 }").unwrap();
    let program = Parser::new(tokens).parse().unwrap();
    let error = semantic::analyze(&program).expect_err("expected semantic error");
    assert_eq!(error.message, "Cannot reassign const variable 'k'");
}

#[test]
fn test_semantic_pass_accepts_shadowing_and_loops() {
    let code = r#"
        const k = 1
        while (k < 2) { let k = 5; k = 6; break }
        for (let i = 0; i < 3; i = i + 1) { if (i == 1) continue }
    "#;
    let tokens = tokenize(code).unwrap();
    let program = Parser::new(tokens).parse().unwrap();
    semantic::analyze(&program).expect("valid program rejected");
}

#[test]
fn test_semantic_pass_leaves_dynamic_names_to_the_evaluator() {
    let code = "fn show() { return later }\nlet later = 1";
    let tokens = tokenize(code).unwrap();
    let program = Parser::new(tokens).parse().unwrap();
    semantic::analyze(&program).expect("forward reference rejected");
}

// --- REPL evaluation surface ---

#[test]
fn test_repl_statement_evaluation_returns_expression_values() {
    let mut interp = Interpreter::new();
    let buffer = Rc::new(RefCell::new(Vec::new()));
    interp.set_output(buffer);

    let tokens = tokenize("let x = 2\nx * 21").unwrap();
    let program = Parser::new(tokens).parse().unwrap();

    let first = interp.eval_stmt_repl(&program[0]).unwrap();
    assert!(first.is_none());

    let second = interp.eval_stmt_repl(&program[1]).unwrap();
    assert!(matches!(second, Some(Value::Int(42))));
}
