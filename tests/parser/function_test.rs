//! 関数のパーサーテスト

use super::*;
use pretty_assertions::assert_eq;
use test_case::test_case;

fn parameters_of(source: &str) -> Vec<Parameter> {
    let ast = assert_parse_success(source);
    match &ast.statements[0] {
        Statement::Function(f) => f.body.parameters.clone(),
        Statement::LocalFunction(f) => f.body.parameters.clone(),
        other => panic!("expected function, got {:?}", other),
    }
}

#[test]
fn test_local_function_vs_function() {
    let ast = assert_parse_success("local function f() end\nfunction f() end");

    let Statement::LocalFunction(local) = &ast.statements[0] else {
        panic!("expected local function");
    };
    assert_eq!(local.name.name, "f");

    let Statement::Function(global) = &ast.statements[1] else {
        panic!("expected function statement");
    };
    assert_eq!(global.name.qualified(), "f");
    assert!(global.name.method.is_none());
}

#[test_case("function f() end", "f"; "bare name")]
#[test_case("function a.b.c() end", "a.b.c"; "dotted path")]
#[test_case("function a.b:c() end", "a.b:c"; "method")]
#[test_case("function M:new() end", "M:new"; "method on a table")]
fn test_function_names(source: &str, expected: &str) {
    let ast = assert_parse_success(source);
    let Statement::Function(function) = &ast.statements[0] else {
        panic!("expected function statement");
    };
    assert_eq!(function.name.qualified(), expected);
}

#[test]
fn test_method_does_not_get_implicit_self() {
    let params = parameters_of("function obj:m(a) end");
    assert_eq!(params.len(), 1);
    assert!(matches!(&params[0], Parameter::Name(id) if id.name == "a"));
}

#[test]
fn test_self_and_spread_parameters() {
    let params = parameters_of("function f(self, a, ...) end");

    assert_eq!(params.len(), 3);
    assert!(matches!(params[0], Parameter::SelfParam(_)));
    assert!(matches!(&params[1], Parameter::Name(id) if id.name == "a"));
    assert!(matches!(params[2], Parameter::Spread(_)));
}

#[test]
fn test_spread_only() {
    let params = parameters_of("local function f(...) end");
    assert!(matches!(params.as_slice(), [Parameter::Spread(_)]));
}

#[test_case("function f(..., a) end"; "spread not last")]
#[test_case("function f(a, self) end"; "self not first")]
#[test_case("local function f(..., ...) end"; "two spreads")]
fn test_malformed_parameter_lists(source: &str) {
    let error = assert_parse_error(source);
    assert!(
        matches!(error, ParserError::MalformedParameterList { .. }),
        "got {:?}",
        error
    );
}

#[test]
fn test_function_body_statements() {
    let ast = assert_parse_success(
        r#"
        function Point.new(x, y)
            local self = setmetatable({}, Point)
            self.x, self.y = x, y
            return self
        end
        "#,
    );

    let Statement::Function(function) = &ast.statements[0] else {
        panic!("expected function statement");
    };
    assert_eq!(function.body.block.statements.len(), 2);
    assert!(function.body.block.return_statement.is_some());
}

#[test]
fn test_nested_functions() {
    let ast = assert_parse_success("local f = function() return function() end end");

    let Statement::LocalVariableDeclaration(decl) = &ast.statements[0] else {
        panic!("expected local declaration");
    };
    let Expression::Function(outer) = &decl.values[0] else {
        panic!("expected function value");
    };
    let ret = outer.body.block.return_statement.as_ref().expect("return");
    assert!(matches!(ret.values[0], Expression::Function(_)));
}
