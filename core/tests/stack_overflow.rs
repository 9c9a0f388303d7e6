use vesper_core::parser;

fn nested(depth: usize) -> String {
    format!("x int = {}1{};", "(".repeat(depth), ")".repeat(depth))
}

#[test]
fn test_depth_protection_prevents_stack_overflow() {
    // Far deeper than the default limit; must fail with an error, not crash.
    let result = parser::parse(&nested(5_000));

    assert!(result.is_err(), "Should fail with depth error, not crash");

    let err = result.unwrap_err();
    assert!(
        err.message.contains("Nesting depth exceeds maximum"),
        "Error should mention nesting depth, got: {}",
        err.message
    );
}

#[test]
fn test_custom_depth_limit() {
    assert!(parser::parse_with_max_depth(&nested(20), 10).is_err());
    assert!(parser::parse_with_max_depth(&nested(20), 30).is_ok());
}

fn chain(terms: usize) -> String {
    format!("x int = 1{};", " + 1".repeat(terms - 1))
}

#[test]
fn test_long_operator_chain_is_rejected() {
    for source in [chain(200_000), format!("x bool = {}true;", "!".repeat(200_000))] {
        let err = parser::parse(&source).unwrap_err();
        assert!(
            err.message
                .contains(&format!("more than {} operators", parser::MAX_EXPR_OPERATORS)),
            "unexpected error: {}",
            err.message
        );
    }
}

#[test]
fn test_operators_in_nested_parts_count_together() {
    let inner = format!("({})", "1 + ".repeat(300) + "1");
    let source = format!("x int = {inner} + {inner};");
    assert!(parser::parse(&source).is_err());
}

#[test]
fn test_long_chain_under_the_limit_runs() {
    use vesper_core::api::{CompileOptions, Engine, RunOptions};

    let engine = Engine::new(CompileOptions::default());
    let program = engine
        .compile(&format!("{} print(x);", chain(300)))
        .expect("chain should compile");
    let mut out = Vec::new();
    program
        .run(RunOptions::default(), &mut out, &mut &b""[..])
        .unwrap();
    assert_eq!(out, b"300");
}
