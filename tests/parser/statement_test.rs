//! 文のパーサーテスト

use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_call_statement() {
    let ast = assert_parse_success("f(x)");

    assert_eq!(ast.statements.len(), 1);
    let Statement::FunctionCall(call) = &ast.statements[0] else {
        panic!("expected call statement, got {:?}", ast.statements[0]);
    };
    assert!(matches!(call.callee.as_ref(), Expression::Identifier(id) if id.name == "f"));
    assert!(matches!(&call.args, CallArgs::List(args) if args.len() == 1));
}

#[test]
fn test_call_statement_forms() {
    let ast = assert_parse_success(
        r#"
        print "hello"
        setmetatable {}
        obj:method(1)
        a.b.c()
        t[1]()
        ;("x"):upper()
        "#,
    );

    assert_eq!(ast.statements.len(), 6);
    assert!(ast
        .statements
        .iter()
        .all(|s| matches!(s, Statement::FunctionCall(_))));
}

#[test]
fn test_assignment() {
    let ast = assert_parse_success("x = 1");

    let Statement::VariableDeclaration(decl) = &ast.statements[0] else {
        panic!("expected assignment");
    };
    assert_eq!(decl.targets.len(), 1);
    assert_eq!(decl.values.len(), 1);
    assert_eq!(decl.span, Span::new(0, 5));
}

#[test]
fn test_multiple_assignment_targets() {
    let ast = assert_parse_success("a, b.c, d[e], f().g = 1, 2");

    let Statement::VariableDeclaration(decl) = &ast.statements[0] else {
        panic!("expected assignment");
    };
    let targets: Vec<_> = decl.targets.iter().map(sexpr).collect();
    assert_eq!(targets, vec!["a", "b.c", "d[e]", "(call f).g"]);
    assert_eq!(decl.values.len(), 2);
}

#[test]
fn test_local_declarations() {
    let ast = assert_parse_success("local a\nlocal b, c = 1, 2\nlocal next = next");

    let names: Vec<Vec<&str>> = ast
        .statements
        .iter()
        .map(|s| match s {
            Statement::LocalVariableDeclaration(decl) => {
                decl.names.iter().map(|n| n.name.as_str()).collect()
            }
            other => panic!("expected local declaration, got {:?}", other),
        })
        .collect();
    assert_eq!(names, vec![vec!["a"], vec!["b", "c"], vec!["next"]]);

    let Statement::LocalVariableDeclaration(first) = &ast.statements[0] else {
        unreachable!();
    };
    assert!(first.values.is_empty());
}

#[test]
fn test_empty_statements() {
    let ast = assert_parse_success(";;x = 1;;;f();");
    assert_eq!(ast.statements.len(), 2);
}

#[test]
fn test_module_return() {
    let ast = assert_parse_success("local M = {}\nreturn M;");

    assert_eq!(ast.statements.len(), 1);
    let ret = ast.return_statement.expect("module should return");
    assert_eq!(ret.values.len(), 1);
}

#[test]
fn test_bare_return() {
    let ast = assert_parse_success("do return end");

    let Statement::Do(block) = &ast.statements[0] else {
        panic!("expected do block");
    };
    let ret = block.body.return_statement.as_ref().expect("return");
    assert!(ret.values.is_empty());
}

#[test]
fn test_goto_and_labels() {
    let ast = assert_parse_success("::top:: goto top");

    assert!(matches!(&ast.statements[0], Statement::Label(l) if l.name.name == "top"));
    assert!(matches!(&ast.statements[1], Statement::Goto(g) if g.label.name == "top"));
}

#[test]
fn test_declaration_ids_are_unique() {
    let ast = assert_parse_success("x = 1\nlocal y\nfunction f() local z end\nlocal function g() end");

    let ids: Vec<_> = ast
        .statements
        .iter()
        .filter_map(Statement::declaration_id)
        .collect();
    assert_eq!(ids.len(), 4);
    let mut unique = ids.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), 4);
}

#[test]
fn test_parse_single_statement() {
    let tokens = Lexer::new("; t.x = 1 print(t.x)").collect_tokens().tokens;
    let mut parser = Parser::new(tokens);

    assert_eq!(parser.parse_statement().expect("empty statement"), None);
    assert!(matches!(
        parser.parse_statement().expect("assignment"),
        Some(Statement::VariableDeclaration(_))
    ));
    assert!(matches!(
        parser.parse_statement().expect("call"),
        Some(Statement::FunctionCall(_))
    ));
}
