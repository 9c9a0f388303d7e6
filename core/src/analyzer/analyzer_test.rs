use super::*;
use crate::api::{Diagnostic, Severity};
use crate::parser::parse;
use crate::syntax::{Ast, ExprKind, StmtKind};
use crate::types::{Primitive, Type};
use indoc::indoc;
use pretty_assertions::assert_eq;

fn check(source: &str) -> (Ast, CompilationContext, Result<(), CompileError>) {
    crate::test_utils::init_test_logging();
    let mut ast = parse(source).unwrap();
    let mut ctx = CompilationContext::new();
    let result = analyze(&mut ast, &mut ctx);
    (ast, ctx, result)
}

/// Diagnostics as `(code, message)` pairs.
fn diagnostics(source: &str) -> Vec<(String, String)> {
    let (_, ctx, result) = check(source);
    result.unwrap();
    ctx.diagnostics
        .iter()
        .map(|d: &Diagnostic| (d.code.clone().unwrap_or_default(), d.message.clone()))
        .collect()
}

fn fatal(source: &str) -> CompileError {
    check(source).2.unwrap_err()
}

/// Type of the initializer of the last declaration in `source`.
fn init_type(source: &str) -> Option<Type> {
    let (mut ast, mut ctx, result) = check(source);
    result.unwrap();
    let value = ast
        .stmts
        .iter()
        .rev()
        .find_map(|stmt| match &stmt.kind {
            StmtKind::VarInit(init) => init.value,
            _ => None,
        })
        .unwrap();
    type_check(&mut ast.arena, value, &mut ctx).unwrap()
}

/// Rendered initializer of the last declaration in `source`.
fn init_value(source: &str) -> String {
    let (ast, _, result) = check(source);
    result.unwrap();
    let value = ast
        .stmts
        .iter()
        .rev()
        .find_map(|stmt| match &stmt.kind {
            StmtKind::VarInit(init) => init.value,
            _ => None,
        })
        .unwrap();
    ast.arena.render(value)
}

#[test]
fn test_arithmetic_promotion() {
    assert_eq!(init_type("x int = 1 + 2;"), Some(Type::INT));
    assert_eq!(init_type("x float = 1 + 2.0;"), Some(Type::FLOAT));
    assert_eq!(init_type("x int = 'a' + 1;"), Some(Type::INT));
    assert_eq!(init_type("x char = 'a' + 'b';"), Some(Type::CHAR));
    assert_eq!(init_type("x float = 'a' * 2.5;"), Some(Type::FLOAT));
}

#[test]
fn test_string_concatenation_and_comparison() {
    assert_eq!(init_type("x str = \"a\" + \"b\";"), Some(Type::STR));
    assert_eq!(init_type("x bool = \"a\" < \"b\";"), Some(Type::BOOL));
    assert_eq!(init_type("x bool = 1 < 2.5;"), Some(Type::BOOL));
    assert_eq!(init_type("x bool = true == false;"), Some(Type::BOOL));
}

#[test]
fn test_subscript_types() {
    let source = indoc! {"
        grid int[][] = [[1, 2], [3, 4]];
        row int[] = grid[0];
        cell int = grid[1][0];
        letter char = \"abc\"[2];
    "};
    assert_eq!(diagnostics(source), vec![]);
    assert_eq!(init_type(source), Some(Type::CHAR));
}

#[test]
fn test_operand_types_are_recorded() {
    let (ast, _, result) = check("x float = 1 + 2.5;");
    result.unwrap();
    let StmtKind::VarInit(init) = &ast.stmts[0].kind else {
        panic!("expected a declaration");
    };
    match &ast.arena[init.value.unwrap()].kind {
        ExprKind::Binary { lhs_ty, rhs_ty, .. } => {
            assert_eq!(*lhs_ty, Some(Type::INT));
            assert_eq!(*rhs_ty, Some(Type::FLOAT));
        }
        other => panic!("unexpected node {other:?}"),
    }
}

#[test]
fn test_minor_errors_are_collected() {
    let source = indoc! {"
        a int = true + 1;
        b bool = !5;
        c int = 1.5 % 2;
        d bool = 1 && true;
    "};
    let codes: Vec<String> = diagnostics(source).into_iter().map(|(c, _)| c).collect();
    assert_eq!(codes, vec!["E001", "E001", "E001", "E001"]);
}

#[test]
fn test_error_inside_subtree_is_reported_once() {
    let found = diagnostics("x int = (true + 1) * 2 - 3;");
    assert_eq!(
        found,
        vec![(
            "E001".to_owned(),
            "Operator '+' cannot be applied to bool and int".to_owned()
        )]
    );
}

#[test]
fn test_declaration_requires_exact_type() {
    assert_eq!(
        diagnostics("x int = 2.5;"),
        vec![(
            "E001".to_owned(),
            "Expected a value of type int, found float".to_owned()
        )]
    );
}

#[test]
fn test_array_literal_rules() {
    assert_eq!(init_type("x int[] = [1, 2, 3];"), Some(Type::array(Primitive::Int, 1)));
    assert_eq!(diagnostics("x int[][] = [];"), vec![]);
    assert_eq!(diagnostics("x int[] = [1, 2.0];")[0].0, "E001");
    assert_eq!(
        diagnostics("print(len([]));")[0].1,
        "Cannot infer the type of an empty array literal"
    );
}

#[test]
fn test_allocation_sizes_must_be_int() {
    assert_eq!(init_type("n int = 3; x float[][] = float[n][2];"), Some(Type::array(Primitive::Float, 2)));
    assert_eq!(
        diagnostics("x int[] = int[1.5];")[0].1,
        "Array size must be int, found float"
    );
}

#[test]
fn test_undefined_names_are_fatal() {
    let err = fatal("x int = y + 1;");
    assert_eq!(err.code, codes::UNDEFINED_VARIABLE);
    assert_eq!(err.span.0, 8..9);

    let err = fatal("nope(1);");
    assert_eq!(err.code, codes::UNDEFINED_FUNCTION);

    let err = fatal("print(1, 2);");
    assert_eq!(err.code, codes::WRONG_ARITY);
    assert_eq!(err.message, "Function 'print' takes 1 argument(s), but 2 were given");
}

#[test]
fn test_overload_resolution() {
    let (ast, _, result) = check("print(2.5); print(\"s\");");
    result.unwrap();
    let ids: Vec<_> = ast
        .stmts
        .iter()
        .map(|stmt| match &stmt.kind {
            StmtKind::Call(call) => match &ast.arena[*call].kind {
                ExprKind::Call { id, .. } => *id,
                _ => None,
            },
            _ => None,
        })
        .collect();
    assert_eq!(ids, vec![Some(3), Some(4)]);
    assert_eq!(diagnostics("print([1]);")[0].0, "E001");
}

#[test]
fn test_void_call_in_value_position() {
    let source = indoc! {"
        def hello() void { print(\"hi\"); }
        x int = hello();
    "};
    assert_eq!(diagnostics(source)[0].0, codes::VOID_VALUE);
}

#[test]
fn test_call_resolution_outcomes() {
    let (mut ast, mut ctx, result) = check("def hello() void { print(1); } hello(); len(\"ab\"); len(1);");
    result.unwrap();
    let calls: Vec<_> = ast
        .stmts
        .iter()
        .filter_map(|stmt| match &stmt.kind {
            StmtKind::Call(call) => Some(*call),
            _ => None,
        })
        .collect();
    let mut checker = Checker {
        arena: &mut ast.arena,
        ctx: &mut ctx,
    };
    let outcomes: Vec<Resolved> = calls
        .into_iter()
        .map(|call| checker.call(call).unwrap())
        .collect();
    assert_eq!(
        outcomes,
        vec![Resolved::Void, Resolved::Value(Type::INT), Resolved::Failed]
    );
}

#[test]
fn test_conditions_must_be_bool() {
    let found = diagnostics("if (1) { print(1); } while (0.5) { print(2); }");
    assert_eq!(found.len(), 2);
    assert_eq!(found[0].1, "Condition must be bool, found int");
}

#[test]
fn test_duplicate_declarations() {
    let (_, ctx, result) = check("x int = 1; if (true) { x float = 2.0; }");
    result.unwrap();
    assert_eq!(ctx.diagnostics.len(), 1);
    let diagnostic = &ctx.diagnostics[0];
    assert_eq!(diagnostic.code.as_deref(), Some(codes::DUPLICATE_DEFINITION));
    assert_eq!(diagnostic.severity, Severity::Error);
    assert_eq!(diagnostic.related[0].span.0, 0..1);
}

#[test]
fn test_sibling_blocks_share_ids() {
    let source = indoc! {"
        g int = 0;
        if (true) { a int = 1; b int = 2; }
        if (true) { c int = 3; }
        h int = 4;
    "};
    let (ast, ctx, result) = check(source);
    result.unwrap();
    let ids: Vec<_> = collect_decl_ids(&ast.stmts);
    assert_eq!(ids, vec![("g", 0), ("a", 1), ("b", 2), ("c", 1), ("h", 1)]);
    assert_eq!(ctx.scopes.slot_count(), 3);
}

fn collect_decl_ids(stmts: &[crate::syntax::Stmt]) -> Vec<(&str, u8)> {
    let mut ids = Vec::new();
    for stmt in stmts {
        match &stmt.kind {
            StmtKind::VarInit(init) => ids.push((init.name.as_str(), init.id.unwrap())),
            StmtKind::If(chain) => {
                for branch in &chain.branches {
                    ids.extend(collect_decl_ids(&branch.body));
                }
            }
            _ => {}
        }
    }
    ids
}

#[test]
fn test_assignment_targets() {
    let source = indoc! {"
        grid int[][] = int[2][2];
        grid[0][1] = 5;
        grid[1] = [7, 8];
        grid = [[1]];
        grid[0] += 1;
    "};
    let found = diagnostics(source);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].1, "Operator '+' cannot be applied to int[] and int");

    assert_eq!(
        diagnostics("n int = 1; n[0] = 2;")[0].1,
        "Cannot index 1 level(s) into 'n' of type int"
    );
    assert_eq!(fatal("missing = 1;").code, codes::UNDEFINED_VARIABLE);
}

#[test]
fn test_compound_assignment_checks_indices_once() {
    let found = diagnostics("a int[] = [1, 2]; a[1.5] += 1;");
    assert_eq!(
        found,
        vec![("E001".to_string(), "Index must be int, found float".to_string())]
    );
}

#[test]
fn test_functions_and_recursion() {
    let source = indoc! {"
        def fact(n int) int {
            if (n <= 1) { return 1; }
            return n * fact(n - 1);
        }
        x int = fact(5);
    "};
    let (ast, ctx, result) = check(source);
    result.unwrap();
    assert_eq!(ctx.diagnostics, vec![]);
    let StmtKind::Function(def) = &ast.stmts[0].kind else {
        panic!("expected a function");
    };
    assert_eq!(def.id, Some(crate::builtins::FIRST_USER_FUNCTION));
    assert_eq!(def.params[0].id, Some(0));
    assert_eq!(def.slots, 0..1);
    let StmtKind::VarInit(init) = &ast.stmts[1].kind else {
        panic!("expected a declaration");
    };
    assert_eq!(init.id, Some(1));
}

#[test]
fn test_return_checks() {
    let source = indoc! {"
        def f() int { return 2.5; }
        def g() void { return 1; }
        def h() int { return; }
    "};
    let codes_found: Vec<String> = diagnostics(source).into_iter().map(|(c, _)| c).collect();
    assert_eq!(codes_found, vec!["E009", "E009", "E009"]);
}

#[test]
fn test_duplicate_overload() {
    let source = indoc! {"
        def f(a int) void { print(a); }
        def f(b int) void { print(b); }
        def f(c float) void { print(c); }
    "};
    let found = diagnostics(source);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].0, codes::DUPLICATE_DEFINITION);
}

#[test]
fn test_for_loop_variable_is_scoped() {
    let source = "for (i int = 0; i < 3; i += 1) { print(i); } i int = 5;";
    assert_eq!(diagnostics(source), vec![]);
}

#[test]
fn test_sized_initializer_is_padded() {
    assert_eq!(init_value("x int[4] = [1, 2];"), "[1, 2, 0, 0]");
    assert_eq!(init_value("x float[2][2] = [[1.5]];"), "[[1.5, 0.0], [0.0, 0.0]]");
    assert_eq!(init_value("x str[2] = [\"a\"];"), "[\"a\", \"\"]");
    assert_eq!(init_value("x int[1 + 2] = [7];"), "[7, 0, 0]");
    // Sizes that are not literals leave that level alone.
    assert_eq!(init_value("n int = 3; x int[n][2] = [[1]];"), "[[1, 0]]");
}

#[test]
fn test_long_initializer_is_truncated() {
    assert_eq!(init_value("x int[2] = [1, 2, 3];"), "[1, 2]");
    assert_eq!(
        diagnostics("x int[2] = [1, 2, 3];"),
        vec![(
            codes::TRUNCATED_INITIALIZER.to_string(),
            "Initializer has 3 elements but the array holds 2; the rest are dropped".to_string()
        )]
    );
}
