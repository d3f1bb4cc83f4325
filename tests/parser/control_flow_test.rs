//! 制御フローのパーサーテスト

use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_if_elseif_else() {
    let ast = assert_parse_success(
        r#"
        if a then
            x = 1
        elseif b then
            x = 2
        elseif c then
            x = 3
        else
            x = 4
        end
        "#,
    );

    let Statement::If(stmt) = &ast.statements[0] else {
        panic!("expected if statement");
    };
    assert_eq!(sexpr(&stmt.condition), "a");
    assert_eq!(stmt.then_block.statements.len(), 1);
    assert_eq!(stmt.elseif_clauses.len(), 2);
    assert_eq!(sexpr(&stmt.elseif_clauses[1].condition), "c");
    assert!(stmt.else_block.is_some());
}

#[test]
fn test_if_without_else() {
    let ast = assert_parse_success("if x then end");

    let Statement::If(stmt) = &ast.statements[0] else {
        panic!("expected if statement");
    };
    assert!(stmt.then_block.is_empty());
    assert!(stmt.elseif_clauses.is_empty());
    assert!(stmt.else_block.is_none());
}

#[test]
fn test_while_loop() {
    let ast = assert_parse_success("while i < 10 do i = i + 1 end");

    let Statement::While(stmt) = &ast.statements[0] else {
        panic!("expected while statement");
    };
    assert_eq!(sexpr(&stmt.condition), "(< i 10)");
    assert_eq!(stmt.body.statements.len(), 1);
}

#[test]
fn test_repeat_until() {
    let ast = assert_parse_success("repeat local done = step() until done");

    let Statement::Repeat(stmt) = &ast.statements[0] else {
        panic!("expected repeat statement");
    };
    assert_eq!(stmt.body.statements.len(), 1);
    assert_eq!(sexpr(&stmt.condition), "done");
}

#[test]
fn test_numeric_for() {
    let ast = assert_parse_success("for i = 1, 10 do end\nfor i = 10, 1, -1 do break end");

    let Statement::For(first) = &ast.statements[0] else {
        panic!("expected numeric for");
    };
    assert_eq!(first.variable.name, "i");
    assert!(first.step.is_none());

    let Statement::For(second) = &ast.statements[1] else {
        panic!("expected numeric for");
    };
    assert_eq!(second.step.as_ref().map(sexpr).as_deref(), Some("(- 1)"));
    assert!(matches!(second.body.statements[0], Statement::Break(_)));
}

#[test]
fn test_generic_for() {
    let ast = assert_parse_success("for k, v in pairs(t) do print(k, v) end");

    let Statement::ForIn(stmt) = &ast.statements[0] else {
        panic!("expected generic for");
    };
    let names: Vec<_> = stmt.names.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, vec!["k", "v"]);
    assert_eq!(sexpr(&stmt.expressions[0]), "(call pairs t)");
}

#[test]
fn test_generic_for_with_next() {
    let ast = assert_parse_success("for k, v in next, t, nil do end");

    let Statement::ForIn(stmt) = &ast.statements[0] else {
        panic!("expected generic for");
    };
    assert_eq!(stmt.expressions.len(), 3);
    assert!(matches!(stmt.expressions[0], Expression::Next(_)));
}

#[test]
fn test_nested_blocks() {
    let ast = assert_parse_success(
        r#"
        do
            while true do
                if x then break end
            end
        end
        "#,
    );

    let Statement::Do(outer) = &ast.statements[0] else {
        panic!("expected do block");
    };
    let Statement::While(inner) = &outer.body.statements[0] else {
        panic!("expected while loop");
    };
    assert!(matches!(inner.body.statements[0], Statement::If(_)));
}

#[test]
fn test_return_ends_block() {
    let ast = assert_parse_success("if x then return 1, 2 end");

    let Statement::If(stmt) = &ast.statements[0] else {
        panic!("expected if statement");
    };
    let ret = stmt.then_block.return_statement.as_ref().expect("return");
    assert_eq!(ret.values.len(), 2);
}
