//! Evaluator tests: arithmetic, control flow, closures, and errors.

use std::rc::Rc;

use rilla::eval::{Environment, Interpreter, Value};
use rilla::lexer::Lexer;
use rilla::parser::Parser;

fn eval(input: &str) -> Value {
    let mut parser = Parser::new(Lexer::new(input));
    let program = parser.parse_program();
    assert!(
        parser.errors().is_empty(),
        "parser errors for {input:?}: {:?}",
        parser.errors()
    );
    let env = Environment::new();
    let mut interpreter = Interpreter::new();
    interpreter.eval(&program, &env)
}

fn assert_integer(input: &str, expected: i64) {
    assert_eq!(eval(input), Value::Integer(expected), "input: {input}");
}

fn assert_float(input: &str, expected: f64) {
    assert_eq!(eval(input), Value::Float(expected), "input: {input}");
}

fn assert_boolean(input: &str, expected: bool) {
    assert_eq!(eval(input), Value::Boolean(expected), "input: {input}");
}

fn assert_null(input: &str) {
    assert_eq!(eval(input), Value::Null, "input: {input}");
}

fn assert_error(input: &str, message: &str) {
    assert_eq!(
        eval(input),
        Value::Error(message.to_string()),
        "input: {input}"
    );
}

#[test]
fn test_integer_expressions() {
    let cases = [
        ("5", 5),
        ("10", 10),
        ("-5", -5),
        ("-10", -10),
        ("5 + 5 + 5 + 5 - 10", 10),
        ("2 * 2 * 2 * 2 * 2", 32),
        ("-50 + 100 + -50", 0),
        ("5 * 2 + 10", 20),
        ("5 + 2 * 10", 25),
        ("20 + 2 * -10", 0),
        ("50 / 2 * 2 + 10", 60),
        ("2 * (5 + 10)", 30),
        ("3 * 3 * 3 + 10", 37),
        ("3 * (3 * 3) + 10", 37),
        ("(5 + 10 * 2 + 15 / 3) * 2 + -10", 50),
        // Integer division truncates toward zero.
        ("7 / 2", 3),
        ("-7 / 2", -3),
        // Exponentiation stays integer for integer operands.
        ("2 ** 10", 1024),
        ("2 ** 3 * 4", 32),
    ];
    for (input, expected) in cases {
        assert_integer(input, expected);
    }
}

#[test]
fn test_float_promotion() {
    assert_float("2.5 + 2.5", 5.0);
    assert_float("1 + 2.5", 3.5);
    assert_float("2.0 * 3", 6.0);
    assert_float("1.0 / 2", 0.5);
    assert_float("1 / 2.0", 0.5);
    assert_float("-1.5", -1.5);
    assert_float("2.0 ** 2", 4.0);
    assert_boolean("1.5 < 2", true);
    assert_boolean("2.0 == 2", true);
}

#[test]
fn test_division_by_zero_is_an_error() {
    assert_error("5 / 0", "division by zero");
    assert_error("let x = 0; 10 / x", "division by zero");
}

#[test]
fn test_boolean_expressions() {
    let cases = [
        ("true", true),
        ("false", false),
        ("1 < 2", true),
        ("1 > 2", false),
        ("1 < 1", false),
        ("1 == 1", true),
        ("1 != 1", false),
        ("1 == 2", false),
        ("1 != 2", true),
        ("true == true", true),
        ("false == false", true),
        ("true == false", false),
        ("true != false", true),
        ("(1 < 2) == true", true),
        ("(1 > 2) == true", false),
        ("2 >= 1", true),
        ("1 >= 1", true),
        ("1 >= 2", false),
        ("1 <= 2", true),
        ("2 <= 1", false),
        ("true && true", true),
        ("true && false", false),
        ("false || true", true),
        ("false || false", false),
    ];
    for (input, expected) in cases {
        assert_boolean(input, expected);
    }
}

#[test]
fn test_logical_operators_are_not_short_circuit() {
    // Both operands are always evaluated, so the unbound name surfaces.
    assert_error("false && missing", "identifier not found: missing");
    assert_error("true || missing", "identifier not found: missing");
}

#[test]
fn test_bang_operator() {
    let cases = [
        ("!true", false),
        ("!false", true),
        ("!5", false),
        ("!!true", true),
        ("!!false", false),
        ("!!5", true),
        // Zero is truthy.
        ("!0", false),
    ];
    for (input, expected) in cases {
        assert_boolean(input, expected);
    }
}

#[test]
fn test_if_else_expressions() {
    assert_integer("if (true) { 10 }", 10);
    assert_null("if (false) { 10 }");
    assert_integer("if (1) { 10 }", 10);
    assert_integer("if (1 < 2) { 10 }", 10);
    assert_null("if (1 > 2) { 10 }");
    assert_integer("if (1 > 2) { 10 } else { 20 }", 20);
    assert_integer("if (1 < 2) { 10 } else { 20 }", 10);
}

#[test]
fn test_return_statements() {
    let cases = [
        ("return 10;", 10),
        ("return 10; 9;", 10),
        ("return 2 * 5; 9;", 10),
        ("9; return 2 * 5; 9;", 10),
        (
            "if (10 > 1) { if (10 > 1) { return 10; } return 1; }",
            10,
        ),
    ];
    for (input, expected) in cases {
        assert_integer(input, expected);
    }
}

#[test]
fn test_error_handling() {
    let cases = [
        ("5 + true;", "type mismatch: INTEGER + BOOLEAN"),
        ("5 + true; 5;", "type mismatch: INTEGER + BOOLEAN"),
        ("-true", "unknown operator: -BOOLEAN"),
        ("true + false;", "unknown operator: BOOLEAN + BOOLEAN"),
        ("5; true + false; 5", "unknown operator: BOOLEAN + BOOLEAN"),
        (
            "if (10 > 1) { true + false; }",
            "unknown operator: BOOLEAN + BOOLEAN",
        ),
        (
            "if (10 > 1) { if (10 > 1) { return true + false; } return 1; }",
            "unknown operator: BOOLEAN + BOOLEAN",
        ),
        ("foobar", "identifier not found: foobar"),
        ("\"Hello\" - \"World\"", "unknown operator: STRING - STRING"),
        (
            "{\"name\": \"Rilla\"}[fn(x) { x }];",
            "unusable as hash key: FUNCTION",
        ),
        ("5 += true;", "type mismatch: INTEGER += BOOLEAN"),
        ("\"Hello\" -= \"o\";", "unknown operator: STRING -= STRING"),
        ("while (i < 5) { i += 1; }", "identifier not found: i"),
        ("1 && 2", "unknown operator: INTEGER && INTEGER"),
        ("5 = 1;", "invalid assignment target: 5"),
        ("5 += 1;", "invalid assignment target: 5"),
        ("true()", "not a function: BOOLEAN"),
        ("\"str\"[0]", "index operator not supported: STRING"),
    ];
    for (input, expected) in cases {
        assert_error(input, expected);
    }
}

#[test]
fn test_let_statements() {
    let cases = [
        ("let a = 5; a;", 5),
        ("let a = 5 * 5; a;", 25),
        ("let a = 5; let b = a; b;", 5),
        ("let a = 5; let b = a; let c = a + b + 5; c;", 15),
    ];
    for (input, expected) in cases {
        assert_integer(input, expected);
    }
}

#[test]
fn test_function_value() {
    let result = eval("fn(x) { x + 2; };");
    let Value::Function(function) = result else {
        panic!("expected function value, got {result:?}");
    };
    assert_eq!(function.parameters.len(), 1);
    assert_eq!(function.parameters[0].value, "x");
    assert_eq!(function.body.to_string(), "(x + 2)");
}

#[test]
fn test_function_application() {
    let cases = [
        ("let identity = fn(x) { x; }; identity(5);", 5),
        ("let identity = fn(x) { return x; }; identity(5);", 5),
        ("let double = fn(x) { x * 2; }; double(5);", 10),
        ("let add = fn(x, y) { x + y; }; add(5, 5);", 10),
        ("let add = fn(x, y) { x + y; }; add(5 + 5, add(5, 5));", 20),
        ("fn(x) { x; }(5)", 5),
    ];
    for (input, expected) in cases {
        assert_integer(input, expected);
    }
}

#[test]
fn test_closures() {
    assert_integer(
        "let newAdder = fn(x){ fn(y){ x + y }; }; let addTwo = newAdder(2); addTwo(2);",
        4,
    );
    // Recursion works because the closure shares the defining scope.
    assert_integer(
        "let fact = fn(n) { if (n < 2) { return 1; } n * fact(n - 1); }; fact(5);",
        120,
    );
}

#[test]
fn test_call_arity_mismatch() {
    assert_error(
        "fn(x) { x; }(1, 2)",
        "wrong number of arguments. got=2, want=1",
    );
    assert_error(
        "let add = fn(x, y) { x + y; }; add(1)",
        "wrong number of arguments. got=1, want=2",
    );
}

#[test]
fn test_string_operations() {
    assert_eq!(
        eval("\"Hello\" + \" \" + \"World\""),
        Value::String(Rc::from("Hello World"))
    );
    // String comparison is not defined, even for equality.
    assert_error("\"a\" == \"a\"", "unknown operator: STRING == STRING");
}

#[test]
fn test_builtin_functions() {
    assert_integer("len(\"\")", 0);
    assert_integer("len(\"four\")", 4);
    assert_integer("len(\"hello world\")", 11);
    assert_integer("len([1, 2, 3])", 3);
    assert_error("len(1);", "argument to `len` not supported, got INTEGER");
    assert_error(
        "len(\"one\", \"two\");",
        "wrong number of arguments. got=2, want=1",
    );

    assert_integer("first([1, 2, 3])", 1);
    assert_null("first([])");
    assert_error("first(1)", "argument to `first` must be ARRAY, got INTEGER");

    assert_integer("last([1, 2, 3])", 3);
    assert_null("last([])");

    assert_eq!(
        eval("rest([1, 2, 3])"),
        Value::Array(Rc::new(vec![Value::Integer(2), Value::Integer(3)]))
    );
    assert_null("rest([])");

    assert_eq!(
        eval("push([1], 2)"),
        Value::Array(Rc::new(vec![Value::Integer(1), Value::Integer(2)]))
    );
    // push builds a new array; the original binding is untouched.
    assert_integer("let a = [1]; push(a, 2); len(a)", 1);

    assert_null("print(\"builtin output\")");
    // Environment bindings shadow builtins.
    assert_integer("let len = 5; len", 5);
}

#[test]
fn test_array_literals_and_indexing() {
    assert_eq!(
        eval("[1, 2 * 2, 3 + 3]"),
        Value::Array(Rc::new(vec![
            Value::Integer(1),
            Value::Integer(4),
            Value::Integer(6),
        ]))
    );

    let cases = [
        ("[1, 2, 3][0]", 1),
        ("[1, 2, 3][1]", 2),
        ("[1, 2, 3][2]", 3),
        ("let i = 0; [1][i];", 1),
        ("[1, 2, 3][1 + 1];", 3),
        ("let myArray = [1, 2, 3]; myArray[2];", 3),
        (
            "let myArray = [1, 2, 3]; myArray[0] + myArray[1] + myArray[2];",
            6,
        ),
    ];
    for (input, expected) in cases {
        assert_integer(input, expected);
    }

    assert_null("[1, 2, 3][3]");
    assert_null("[1, 2, 3][-1]");
}

#[test]
fn test_hash_literals_and_indexing() {
    let cases = [
        ("{\"foo\": 5}[\"foo\"]", 5),
        ("{\"foo\": 5}[\"bar\"]", 0),
        ("let key = \"foo\"; {\"foo\": 5}[key]", 5),
        ("{}[\"foo\"]", 0),
        ("{5: 5}[5]", 5),
        ("{true: 5}[true]", 5),
        ("{false: 5}[false]", 5),
        ("{1.5: 5}[1.5]", 5),
    ];
    for (input, expected) in cases {
        if expected == 0 {
            assert_null(input);
        } else {
            assert_integer(input, expected);
        }
    }

    // Later duplicates overwrite earlier entries.
    assert_integer("{\"a\": 1, \"a\": 2}[\"a\"]", 2);
    // Keys and values evaluate left to right.
    assert_integer(
        "let x = 0; let h = {(x = 1): (x = x + 10)}; h[1] + x",
        22,
    );
}

#[test]
fn test_while_loops() {
    assert_integer("let i = 0; while (i < 5) { i += 1; } i;", 5);
    assert_integer(
        "let i = 0; let sum = 0; while (i < 5) { i += 1; if (i == 2) { continue; } sum += i; } sum;",
        13,
    );
    assert_integer(
        "let i = 0; while (true) { i += 1; if (i == 3) { break; } } i;",
        3,
    );
    // The loop's value is the last non-null body value.
    assert_integer("let i = 0; while (i < 3) { i += 1; i * 10 }", 30);
    assert_null("while (false) { 1 }");
    // A return inside the loop leaves the enclosing function.
    assert_integer(
        "let f = fn() { let i = 0; while (true) { i += 1; if (i == 4) { return i; } } }; f()",
        4,
    );
}

#[test]
fn test_for_loops() {
    assert_integer(
        "let sum = 0; for (let i = 0; i < 5; i++) { sum += i; } sum;",
        10,
    );
    assert_integer("let i = 0; for (; i < 3;) { i += 1; } i", 3);
    assert_integer(
        "let i = 0; for (;;) { i += 1; if (i == 4) { break; } } i",
        4,
    );
    // The post clause runs even on continue.
    assert_integer(
        "let sum = 0; for (let i = 0; i < 5; i++) { if (i == 2) { continue; } sum += i; } sum;",
        8,
    );
}

#[test]
fn test_break_and_continue_outside_loop() {
    assert_error("break;", "break statement outside of loop");
    assert_error("continue;", "continue statement outside of loop");
    // A function body resets the loop context.
    assert_error(
        "while (true) { let f = fn() { break; }; f(); }",
        "break statement outside of loop",
    );
}

#[test]
fn test_assignment_expressions() {
    assert_integer("let a = 1; a = 5; a", 5);
    assert_integer("let a = 1; a = a + 4; a", 5);
    assert_integer("let a = 1; a += 4; a", 5);
    assert_integer("let a = 9; a -= 4; a", 5);
    assert_eq!(
        eval("let s = \"foo\"; s += \"bar\"; s"),
        Value::String(Rc::from("foobar"))
    );
    // Assignment writes the innermost scope: an inner function cannot
    // mutate an outer binding, it shadows it.
    assert_integer("let x = 1; let f = fn() { x = 99; x }; f();", 99);
    assert_integer("let x = 1; let f = fn() { x = 99; }; f(); x", 1);
}

#[test]
fn test_prefix_and_postfix_updates() {
    assert_integer("let x = 1; ++x", 2);
    assert_integer("let x = 1; --x", 0);
    assert_integer("let x = 1; ++x; x", 2);
    // Postfix yields the old value but updates the binding.
    assert_integer("let x = 1; x++", 1);
    assert_integer("let x = 1; x++; x", 2);
    assert_integer("let x = 5; x--; x", 4);
    assert_float("let x = 1.5; ++x", 2.5);
    // A prefix update bound by let observes the pre-update value.
    assert_integer("let x = 1; let y = ++x; y", 1);
    assert_integer("let x = 1; let y = ++x; x", 2);
    assert_error("let b = true; b++", "unknown operator: BOOLEAN++");
    assert_error("++missing", "identifier not found: missing");
}

#[test]
fn test_equality_of_reference_types_is_identity() {
    assert_boolean("let a = [1]; a == a", true);
    assert_boolean("[1] == [1]", false);
    assert_boolean("let f = fn() { 1 }; f == f", true);
    assert_boolean("1 == \"1\"", false);
    assert_boolean("1 != \"1\"", true);
}

#[test]
fn test_member_access_is_rejected_at_runtime() {
    assert_error("let m = 1; m.sqrt", "unknown operator: INTEGER.sqrt");
    assert_error("[1].length", "unknown operator: ARRAY.length");
}

#[test]
fn test_import_is_parsed_but_inert() {
    assert_integer("import \"math\" as m; 5", 5);
}

#[test]
fn test_program_result_is_last_statement_value() {
    assert_null("let a = 5;");
    assert_integer("let a = 5; a * 2", 10);
    assert_null("if (false) { 1 }");
}
