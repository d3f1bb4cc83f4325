//! 構文エラーとエラー回復のテスト

use super::*;
use luaparse::error::DiagnosticKind;
use luaparse::parser::RecoveryMode;
use pretty_assertions::assert_eq;
use test_case::test_case;

#[test_case("f", Span::new(0, 1); "bare name")]
#[test_case("a.b", Span::new(0, 3); "field access")]
#[test_case("a + b", Span::new(0, 5); "binary on a name")]
#[test_case("1 + 2", Span::new(0, 5); "binary on a literal")]
#[test_case("(f)", Span::new(0, 3); "parenthesized")]
#[test_case("'s'", Span::new(0, 3); "string literal")]
fn test_dangling_expression(source: &str, span: Span) {
    let error = assert_parse_error(source);
    assert_eq!(error, ParserError::DanglingExpressionStatement { span });
}

#[test]
fn test_invalid_assignment_target() {
    let error = assert_parse_error("f() = 1");
    assert_eq!(
        error,
        ParserError::InvalidAssignmentTarget {
            span: Span::new(0, 3)
        }
    );

    let error = assert_parse_error("a, (b) = 1, 2");
    assert_eq!(
        error,
        ParserError::InvalidAssignmentTarget {
            span: Span::new(3, 6)
        }
    );
}

#[test_case("while true do x = 1", "while", "end"; "while")]
#[test_case("if x then", "if", "end"; "if")]
#[test_case("function f()", "function", "end"; "function")]
#[test_case("for i = 1, 2 do", "for", "end"; "numeric for")]
#[test_case("do do end", "do", "end"; "nested do")]
#[test_case("repeat x = 1", "repeat", "until"; "repeat")]
fn test_unterminated_block(source: &str, construct: &str, closer: &str) {
    let error = assert_parse_error(source);
    let ParserError::UnterminatedBlock {
        construct: found_construct,
        expected,
        opened_at,
        ..
    } = error
    else {
        panic!("expected unterminated block, got {:?}", error);
    };
    assert_eq!(found_construct, construct);
    assert_eq!(expected, closer);
    assert_eq!(opened_at.start, 0);
}

#[test]
fn test_unterminated_block_points_at_opener() {
    let error = assert_parse_error("x = 1\nlocal function f()\n  return 1\n");
    let ParserError::UnterminatedBlock { opened_at, .. } = error else {
        panic!("expected unterminated block, got {:?}", error);
    };
    assert_eq!(opened_at, Span::new(6, 11));
}

#[test]
fn test_unexpected_token_message() {
    let error = assert_parse_error("local x = ");
    assert_eq!(error.kind(), DiagnosticKind::UnexpectedToken);

    let error = assert_parse_error("if x y = 1 end");
    assert_eq!(error.to_string(), "expected 'then', found identifier 'y'");
}

#[test]
fn test_recovery_collects_multiple_errors() {
    let (program, errors) = parse_recovering(
        r#"
local = 1
local y = 2
local 3
local z = 4
"#,
    );

    let kinds: Vec<_> = errors.iter().map(ParserError::kind).collect();
    assert_eq!(
        kinds,
        vec![DiagnosticKind::UnexpectedToken, DiagnosticKind::UnexpectedToken]
    );
    assert_eq!(program.statements.len(), 2);
}

#[test]
fn test_recovery_inside_blocks() {
    let (program, errors) = parse_recovering(
        r#"
function f()
    x + 1
    return x
end
local ok = true
"#,
    );

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind(), DiagnosticKind::DanglingExpressionStatement);

    assert_eq!(program.statements.len(), 2);
    let Statement::Function(function) = &program.statements[0] else {
        panic!("expected function statement");
    };
    assert!(function.body.block.return_statement.is_some());
}

#[test]
fn test_stray_end_at_top_level() {
    let (program, errors) = parse_recovering("x = 1 end local y = 2");

    assert_eq!(errors.len(), 1);
    assert!(matches!(
        &errors[0],
        ParserError::UnexpectedToken { expected, found, .. }
            if expected == "end of input" && found == "'end'"
    ));
    assert_eq!(program.statements.len(), 2);
}

#[test]
fn test_recovery_always_progresses() {
    let (_, errors) = parse_recovering(") ) ) ]");
    assert!(!errors.is_empty());

    let (_, errors) = parse_recovering("until until");
    assert_eq!(errors.len(), 2);
}

#[test]
fn test_stop_at_first_error() {
    let tokens = Lexer::new("local = 1\nlocal 2").collect_tokens().tokens;
    let mut parser = Parser::new(tokens).with_recovery(RecoveryMode::StopAtFirstError);

    let error = parser.parse_program().expect_err("should stop at the first error");
    assert_eq!(error.span(), Span::new(6, 7));
    assert!(parser.errors().is_empty());
}

#[test]
fn test_partial_program_keeps_earlier_statements() {
    let tokens = Lexer::new("local a = 1\nlocal b = = 2\nlocal c = 3").collect_tokens().tokens;
    let mut parser = Parser::new(tokens).with_recovery(RecoveryMode::StopAtFirstError);

    let (program, stopped) = parser.parse_program_partial();
    assert_eq!(program.statements.len(), 1);
    assert!(matches!(stopped, Some(ParserError::UnexpectedToken { .. })));
}

#[test_case("local function f(..., a) end\nlocal y = 2"; "spread before a name")]
#[test_case("function f(a, self) if a then end end\nlocal y = 2"; "self after a name")]
#[test_case("local g = function(..., b) do end end\nlocal y = 2"; "anonymous function")]
fn test_bad_parameter_list_skips_the_body(source: &str) {
    let (program, errors) = parse_recovering(source);

    let kinds: Vec<_> = errors.iter().map(ParserError::kind).collect();
    assert_eq!(kinds, vec![DiagnosticKind::MalformedParameterList]);
    assert_eq!(program.statements.len(), 1);
    assert!(matches!(
        &program.statements[0],
        Statement::LocalVariableDeclaration(decl) if decl.names[0].name == "y"
    ));
}

#[test]
fn test_bad_parameter_list_in_nested_function() {
    let (program, errors) =
        parse_recovering("function outer()\n  local function f(a, self) end\n  return 1\nend");

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind(), DiagnosticKind::MalformedParameterList);
    let Statement::Function(outer) = &program.statements[0] else {
        panic!("expected function statement");
    };
    assert!(outer.body.block.statements.is_empty());
    assert!(outer.body.block.return_statement.is_some());
}

#[test]
fn test_nesting_limit_stops_recovery() {
    let source = format!("local a = 1\nx = {}1{}\nlocal b = 2", "(".repeat(400), ")".repeat(400));
    let (program, errors) = parse_recovering(&source);

    assert_eq!(errors.len(), 1);
    assert!(matches!(
        errors[0],
        ParserError::NestingTooDeep { limit: 200, .. }
    ));
    assert_eq!(program.statements.len(), 1);
}
