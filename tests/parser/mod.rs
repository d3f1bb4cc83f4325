//! パーサーテストの共通モジュール
//!
//! パーサーテストで使用する共通のヘルパー関数を定義する。

use luaparse::ast::*;
use luaparse::error::ParserError;
use luaparse::lexer::Lexer;
use luaparse::parser::{ParseError, Parser};

/// ソースコードを解析してASTを取得するヘルパー関数
pub fn parse_source(source: &str) -> Result<Program, ParseError> {
    let output = Lexer::new(source).collect_tokens();
    assert!(output.errors.is_empty(), "unexpected lexer errors: {:?}", output.errors);
    let mut parser = Parser::new(output.tokens);
    parser.parse()
}

/// 解析に成功することを確認するヘルパー関数
pub fn assert_parse_success(source: &str) -> Program {
    match parse_source(source) {
        Ok(program) => program,
        Err(e) => panic!("Parsing should succeed, got: {}", e),
    }
}

/// 解析に失敗することを確認し、最初のエラーを返すヘルパー関数
pub fn assert_parse_error(source: &str) -> ParseError {
    match parse_source(source) {
        Ok(program) => panic!("Parsing should fail, got: {:?}", program),
        Err(e) => e,
    }
}

/// 回復モードで解析し、部分的なASTとすべてのエラーを返す
pub fn parse_recovering(source: &str) -> (Program, Vec<ParserError>) {
    let tokens = Lexer::new(source).collect_tokens().tokens;
    let mut parser = Parser::new(tokens);
    let program = parser
        .parse_program()
        .unwrap_or_else(|e| panic!("recover mode should not abort: {}", e));
    (program, parser.take_errors())
}

/// 単一の式を解析
pub fn parse_expr(source: &str) -> Expression {
    let tokens = Lexer::new(source).collect_tokens().tokens;
    let mut parser = Parser::new(tokens);
    parser
        .parse_expression()
        .unwrap_or_else(|e| panic!("expression {:?} should parse: {}", source, e))
}

/// 構造を確認しやすいS式に変換
pub fn sexpr(expr: &Expression) -> String {
    match expr {
        Expression::Nil(_) => "nil".to_string(),
        Expression::True(_) => "true".to_string(),
        Expression::False(_) => "false".to_string(),
        Expression::Spread(_) => "...".to_string(),
        Expression::SelfValue(_) => "self".to_string(),
        Expression::Next(_) => "next".to_string(),
        Expression::GlobalVariable(g) => g.name.as_str().to_string(),
        Expression::Identifier(id) => id.name.clone(),
        Expression::Number(n) => n.raw.clone(),
        Expression::String(s) => format!("{:?}", s.value),
        Expression::Binary(b) => format!("({} {} {})", b.op, sexpr(&b.left), sexpr(&b.right)),
        Expression::Unary(u) => format!("({} {})", u.op, sexpr(&u.operand)),
        Expression::Function(_) => "(function)".to_string(),
        Expression::Table(t) => format!("(table {})", t.fields.len()),
        Expression::Field(f) => format!("{}.{}", sexpr(&f.object), f.property.name),
        Expression::Index(i) => format!("{}[{}]", sexpr(&i.object), sexpr(&i.index)),
        Expression::Call(c) => {
            let mut parts = vec![match &c.method {
                Some(method) => format!("{}:{}", sexpr(&c.callee), method.name),
                None => sexpr(&c.callee),
            }];
            match &c.args {
                CallArgs::List(args) => parts.extend(args.iter().map(sexpr)),
                CallArgs::Table(t) => parts.push(format!("(table {})", t.fields.len())),
                CallArgs::String(s) => parts.push(format!("{:?}", s.value)),
            }
            format!("(call {})", parts.join(" "))
        }
        Expression::Parenthesized(p) => format!("(paren {})", sexpr(&p.inner)),
    }
}

// サブモジュールの宣言
#[cfg(test)]
mod control_flow_test;
#[cfg(test)]
mod error_test;
#[cfg(test)]
mod expression_test;
#[cfg(test)]
mod function_test;
#[cfg(test)]
mod statement_test;
