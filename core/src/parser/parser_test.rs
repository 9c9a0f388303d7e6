use super::*;
use crate::syntax::StmtKind;
use crate::types::Type;
use pretty_assertions::assert_eq;

/// Parses `x int = <expr>;` and renders the initializer.
fn expr_tree(expr: &str) -> String {
    let ast = parse(&format!("x int = {expr};")).unwrap();
    match &ast.stmts[0].kind {
        StmtKind::VarInit(init) => ast.arena.render(init.value.unwrap()),
        other => panic!("unexpected statement {other:?}"),
    }
}

fn parse_err(source: &str) -> ParseError {
    parse(source).unwrap_err()
}

#[test]
fn test_precedence() {
    assert_eq!(expr_tree("2 + 3 * 4"), "ADD(2, MULT(3, 4))");
    assert_eq!(expr_tree("2 * (3 + 4 / 5)"), "MULT(2, ADD(3, DIV(4, 5)))");
    assert_eq!(expr_tree("1 - 2 - 3"), "SUB(SUB(1, 2), 3)");
    assert_eq!(expr_tree("a || b && c"), "AND(OR(a, b), c)");
    assert_eq!(expr_tree("1 < 2 == true"), "EQUALS(LESSER(1, 2), true)");
}

#[test]
fn test_subscript_binds_tighter_than_negate() {
    assert_eq!(
        expr_tree("-arr[1][2] + 3"),
        "ADD(NEGATE(SUBSCRIPT(2, SUBSCRIPT(1, arr))), 3)"
    );
}

#[test]
fn test_minus_is_unary_after_operator() {
    assert_eq!(expr_tree("1 - -2"), "SUB(1, NEGATE(2))");
    assert_eq!(expr_tree("-(1 + 2)"), "NEGATE(ADD(1, 2))");
    assert_eq!(expr_tree("!!done"), "NOT(NOT(done))");
}

#[test]
fn test_literals() {
    assert_eq!(expr_tree("\"hi\""), "\"hi\"");
    assert_eq!(expr_tree("'a'"), "'a'");
    assert_eq!(expr_tree("2.5"), "2.5");
    assert_eq!(expr_tree("[1, 2 + 3, [4]]"), "[1, ADD(2, 3), [4]]");
    assert_eq!(expr_tree("[]"), "[]");
}

#[test]
fn test_subscript_of_literals() {
    assert_eq!(expr_tree("[1, 2][0]"), "SUBSCRIPT(0, [1, 2])");
    assert_eq!(expr_tree("\"abc\"[i + 1]"), "SUBSCRIPT(ADD(i, 1), \"abc\")");
}

#[test]
fn test_calls_and_allocation() {
    assert_eq!(expr_tree("f(1, g(2)) * 3"), "MULT(f(1, g(2)), 3)");
    assert_eq!(expr_tree("int(\"42\")"), "int(\"42\")");
    assert_eq!(expr_tree("int[3][n]"), "int[3][n]");
    assert_eq!(expr_tree("len(s)[0]"), "SUBSCRIPT(0, len(s))");
}

#[test]
fn test_operator_span_covers_operands() {
    let ast = parse("x int = 10 + 200;").unwrap();
    let StmtKind::VarInit(init) = &ast.stmts[0].kind else {
        panic!("expected declaration");
    };
    assert_eq!(ast.arena[init.value.unwrap()].span, Span(8..16));
}

#[test]
fn test_declarations() {
    let ast = parse("a int[3][] = b; s str;").unwrap();
    let StmtKind::VarInit(a) = &ast.stmts[0].kind else {
        panic!("expected declaration");
    };
    assert_eq!(a.name, "a");
    assert_eq!(a.ty, Type::INT.nested(2));
    assert_eq!(a.sizes.len(), 2);
    assert!(a.sizes[0].is_some());
    assert!(a.sizes[1].is_none());

    let StmtKind::VarInit(s) = &ast.stmts[1].kind else {
        panic!("expected declaration");
    };
    assert_eq!(s.ty, Type::STR);
    assert!(s.value.is_none());
}

#[test]
fn test_compound_assignment_desugars() {
    let ast = parse("a[i][j] *= 2 + 1;").unwrap();
    let StmtKind::Assign(assign) = &ast.stmts[0].kind else {
        panic!("expected assignment");
    };
    assert_eq!(assign.subscripts.len(), 2);
    assert_eq!(ast.arena.render(assign.subscripts[1]), "j");
    assert_eq!(
        ast.arena.render(assign.value),
        "MULT(SUBSCRIPT([1], SUBSCRIPT([0], a)), ADD(2, 1))"
    );

    let ast = parse("n -= 1;").unwrap();
    let StmtKind::Assign(assign) = &ast.stmts[0].kind else {
        panic!("expected assignment");
    };
    assert!(assign.scratch.is_empty());
    assert_eq!(ast.arena.render(assign.value), "SUB(n, 1)");
}

#[test]
fn test_control_flow() {
    let source = indoc::indoc! {"
        if (a) { x = 1; } elif (b) x = 2; else { }
        while (x < 3) x += 1;
        for (i int = 0; i < 3; i += 1) { print(i); }
    "};
    let ast = parse(source).unwrap();
    let StmtKind::If(stmt) = &ast.stmts[0].kind else {
        panic!("expected if");
    };
    assert_eq!(stmt.branches.len(), 3);
    assert!(stmt.branches[2].cond.is_none());
    assert!(matches!(ast.stmts[1].kind, StmtKind::While(_)));
    let StmtKind::For(for_loop) = &ast.stmts[2].kind else {
        panic!("expected for");
    };
    assert!(matches!(for_loop.init.kind, StmtKind::VarInit(_)));
    assert!(matches!(for_loop.step.kind, StmtKind::Assign(_)));
    assert_eq!(for_loop.body.len(), 1);
}

#[test]
fn test_function_definition() {
    let ast = parse("def f(a int, b float[]) str[] { return [\"x\"]; } def g() void { return; }")
        .unwrap();
    let StmtKind::Function(f) = &ast.stmts[0].kind else {
        panic!("expected function");
    };
    assert_eq!(f.params.len(), 2);
    assert_eq!(f.params[1].ty, Type::FLOAT.nested(1));
    assert_eq!(f.returns, Some(Type::STR.nested(1)));
    let StmtKind::Function(g) = &ast.stmts[1].kind else {
        panic!("expected function");
    };
    assert_eq!(g.returns, None);
}

#[test]
fn test_adjacent_values_are_rejected() {
    let err = parse_err("x int = 1 2;");
    assert_eq!(err.message, "Expected operator, found integer 2");
    assert_eq!(err.span, Span(10..11));
}

#[test]
fn test_trailing_operator_is_rejected() {
    let err = parse_err("x int = 1 +;");
    assert_eq!(err.message, "Expected expression after operator, found ';'");
}

#[test]
fn test_binary_operator_after_operator_is_rejected() {
    let err = parse_err("x int = 1 + * 2;");
    assert_eq!(err.message, "Expected expression, found '*'");
}

#[test]
fn test_unclosed_bracket() {
    let err = parse_err("x int = (1 + 2;");
    assert_eq!(err.message, "Expected ')', found ';'");
}

#[test]
fn test_non_call_expression_statement() {
    let err = parse_err("f(1) + 2;");
    assert_eq!(err.message, "Only function calls can be used as statements");
}

#[test]
fn test_return_outside_function() {
    let err = parse_err("return 1;");
    assert_eq!(err.message, "Return statement outside of a function");
}

#[test]
fn test_nested_function_is_rejected() {
    let err = parse_err("def f() void { def g() void { } }");
    assert_eq!(err.message, "Functions can only be defined at the top level");
}

#[test]
fn test_nesting_depth_limit() {
    let source = format!("x int = {}1{};", "(".repeat(50), ")".repeat(50));
    assert!(parse_with_max_depth(&source, 100).is_ok());
    let err = parse_with_max_depth(&source, 20).unwrap_err();
    assert!(err.message.contains("Nesting depth exceeds maximum"), "{}", err.message);
}

#[test]
fn test_operator_limit_is_per_expression() {
    let sum = |n: usize| vec!["1"; n].join(" + ");
    let two = format!("x int = {}; y int = {};", sum(400), sum(400));
    assert!(parse(&two).is_ok());

    let err = parse_err(&format!("x int = {};", sum(MAX_EXPR_OPERATORS + 2)));
    assert_eq!(
        err.message,
        format!("Expression has more than {MAX_EXPR_OPERATORS} operators")
    );

    let target = format!("a{} = 1;", "[0]".repeat(MAX_EXPR_OPERATORS + 1));
    assert!(parse_err(&target).message.contains("subscripts"));
}

#[test]
fn test_lex_errors_surface_as_parse_errors() {
    let err = parse_err("x int = 1 $ 2;");
    assert_eq!(err.span, Span(10..11));
}
