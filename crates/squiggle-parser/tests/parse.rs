use squiggle_ast::pretty::{print_expr, print_program};
use squiggle_parser::{parse_expr, parse_program, ParseError};

fn prog(src: &str) -> String {
    print_program(&parse_program(src).unwrap())
}

fn expr(src: &str) -> String {
    print_expr(&parse_expr(src).unwrap())
}

#[test]
fn precedence_of_arithmetic() {
    assert_eq!(expr("1 + 2 * 3 ^ 2"), "(+ 1 (* 2 (^ 3 2)))");
    assert_eq!(expr("1 - 2 - 3"), "(- (- 1 2) 3)");
    assert_eq!(expr("-x ^ 2"), "(^ (-u x) 2)");
}

#[test]
fn to_binds_looser_than_arithmetic() {
    assert_eq!(expr("1 + 1 to 5 * 2"), "(to (+ 1 1) (* 5 2))");
}

#[test]
fn chained_to_is_rejected() {
    assert!(parse_expr("1 to 2 to 3").is_err());
}

#[test]
fn logic_and_comparison() {
    assert_eq!(expr("a < b && c != d || !e"), "(|| (&& (< a b) (!= c d)) (! e))");
}

#[test]
fn ternary_and_if_then_else() {
    assert_eq!(expr("x > 1 ? 2 : 3"), "(? (> x 1) 2 3)");
    assert_eq!(expr("if x then 1 else 2"), "(? x 1 2)");
}

#[test]
fn pipes_prepend_value() {
    assert_eq!(expr("x -> f(1) -> g"), "(-> (-> x f 1) g)");
}

#[test]
fn lookups_and_calls() {
    assert_eq!(expr("d.a.b"), "(. (. d a) b)");
    assert_eq!(expr("xs[0]"), "([] xs 0)");
    assert_eq!(expr("Dict.map(d, f)"), "(Call Dict.map d f)");
}

#[test]
fn brace_forms() {
    assert_eq!(expr("{}"), "(Dict)");
    assert_eq!(expr("{a: 1, 'b c': 2}"), "(Dict (a 1) (b c 2))");
    assert_eq!(expr("{|x, y| x * y}"), "(Lambda (x y) (* x y))");
    assert_eq!(expr("{|| 3}"), "(Lambda () 3)");
    assert_eq!(expr("{|x: [3, 5]| x}"), "(Lambda (x: (Array 3 5)) x)");
    assert_eq!(expr("{ a = 1; a + 1 }"), "(Block (Let a 1) (+ a 1))");
}

#[test]
fn program_with_statements_and_defun() {
    let src = "x = 1\nf(a, b) = a + b\nf(x, 2)";
    assert_eq!(prog(src), "(Program (Let x 1) (Defun f (a b) (+ a b)) (Call f x 2))");
}

#[test]
fn program_without_final_expression() {
    assert_eq!(prog("x = 1; y = 2"), "(Program (Let x 1) (Let y 2))");
    assert_eq!(prog(""), "(Program)");
}

#[test]
fn newline_stops_postfix_call() {
    // the parenthesised expression on the next line is the program result
    assert_eq!(prog("x = f\n(3)"), "(Program (Let x f) 3)");
}

#[test]
fn void_literal() {
    assert_eq!(expr("()"), "()");
}

#[test]
fn statements_need_separators() {
    let err = parse_program("x = 1 y = 2").unwrap_err();
    assert!(matches!(err, ParseError::Syntax { .. }));
    assert_eq!(err.span().offset, 6);
}

#[test]
fn block_must_end_with_expression() {
    let err = parse_expr("{ a = 1 }").unwrap_err();
    assert_eq!(err.to_string(), "A block must end with an expression");
}

#[test]
fn eof_error_points_at_end() {
    let err = parse_expr("[1, 2").unwrap_err();
    assert!(matches!(err, ParseError::UnexpectedEof { .. }));
    assert_eq!(err.span().offset, 5);
}

#[test]
fn spans_cover_source() {
    let e = parse_expr("  foo(1, 2)").unwrap();
    assert_eq!((e.span.offset, e.span.len), (2, 9));
}

#[test]
fn deep_nesting_is_rejected() {
    let sum = vec!["1"; 5000].join(" + ");
    let err = parse_expr(&sum).unwrap_err();
    assert_eq!(err.to_string(), "Expression is nested too deeply");

    let parens = format!("{}1{}", "(".repeat(300), ")".repeat(300));
    assert_eq!(parse_expr(&parens).unwrap_err().to_string(), "Expression is nested too deeply");

    let negations = format!("{}1", "-".repeat(300));
    assert!(parse_expr(&negations).is_err());

    let calls = format!("f{}", "(1)".repeat(300));
    assert!(parse_expr(&calls).is_err());
}

#[test]
fn moderate_nesting_still_parses() {
    assert!(parse_expr(&vec!["1"; 50].join(" + ")).is_ok());
    let parens = format!("{}1{}", "(".repeat(50), ")".repeat(50));
    assert!(parse_expr(&parens).is_ok());
    assert!(parse_program(&format!("y = x{}", " -> f".repeat(50))).is_ok());
}
