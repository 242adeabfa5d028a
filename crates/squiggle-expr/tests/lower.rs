use squiggle_expr::{compile_expr, compile_program, print_expression, CompileError, Op};
use squiggle_parser::{parse_expr, parse_program};

fn lower(src: &str) -> String {
    let p = parse_program(src).unwrap();
    print_expression(&compile_program(&p).unwrap())
}

fn lower_err(src: &str) -> CompileError {
    let p = parse_program(src).unwrap();
    compile_program(&p).unwrap_err()
}

#[test]
fn operators_become_named_calls() {
    assert_eq!(lower("1 + 2 * x"), "(add 1 (multiply 2 x))");
    assert_eq!(lower("a to b"), "(to a b)");
    assert_eq!(lower("!a && b"), "(and (not a) b)");
    assert_eq!(lower("-x"), "(unaryMinus x)");
}

#[test]
fn negative_literals_are_folded() {
    assert_eq!(lower("-3"), "-3");
}

#[test]
fn pipes_and_lookups() {
    assert_eq!(lower("x -> f(1)"), "(f x 1)");
    assert_eq!(lower("d.a[0]"), "($_atIndex_$ ($_atIndex_$ d 'a') 0)");
}

#[test]
fn statements_and_blocks() {
    assert_eq!(lower("x = 1\n{y = x; y + 2}"), "x = 1; {y = x; (add y 2)}");
    assert_eq!(lower("f(a) = a * 2"), "f = {|a| (multiply a 2)}");
}

#[test]
fn lambda_name_is_recorded_for_definitions() {
    let p = parse_program("f(a) = a").unwrap();
    let e = compile_program(&p).unwrap();
    let Op::Program { statements, .. } = e.op else { panic!("expected program") };
    let Op::Assign { right, .. } = &statements[0].op else { panic!("expected assign") };
    assert!(matches!(&right.op, Op::Lambda { name: Some(n), .. } if n == "f"));
}

#[test]
fn dicts_ternaries_and_arrays() {
    assert_eq!(lower("{a: 1, b: [true, 'x']}"), "{a: 1, b: [true, 'x']}");
    assert_eq!(lower("c ? 1 : ()"), "(c ? 1 : ())");
    assert_eq!(lower("{|x: [3, 5]| x}"), "{|x: [3, 5]| x}");
}

#[test]
fn duplicate_parameters_are_rejected() {
    let err = lower_err("f = {|x, x| x}");
    assert_eq!(err.to_string(), "Duplicate parameter name: x");
    assert_eq!(err.span().offset, 9);
}

#[test]
fn namespaced_bindings_are_rejected() {
    let err = lower_err("Dict.x = 1");
    assert!(matches!(err, CompileError::NamespacedBinding { .. }));
    assert_eq!(err.to_string(), "Can't define a variable with a namespaced name: Dict.x");
}

#[test]
fn expression_serializes_to_json() {
    let e = compile_expr(&parse_expr("f(1)").unwrap()).unwrap();
    let json = serde_json::to_string(&e).unwrap();
    assert!(json.contains("\"Call\""));
    assert!(json.contains("\"Symbol\":\"f\""));
}
