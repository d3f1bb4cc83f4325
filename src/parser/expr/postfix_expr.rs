//! プレフィックス式の解析
//!
//! 名前または括弧式を起点に、フィールドアクセス、添字、メソッド呼び出し、
//! 関数呼び出しを左から順に連結する。

use crate::ast::*;
use crate::lexer::Token;
use crate::parser::{ParseResult, Parser};

impl Parser {
    /// プレフィックス式を解析
    pub(crate) fn parse_prefix_expression(&mut self) -> ParseResult<Expression> {
        let mut expr = self.parse_prefix_base()?;

        loop {
            match self.current_token() {
                Some(Token::Dot) => {
                    self.advance();
                    let property = self.expect_name()?;
                    let span = expr.span().to(property.span);
                    expr = Expression::Field(FieldExpr {
                        object: Box::new(expr),
                        property,
                        span,
                    });
                }
                Some(Token::LeftBracket) => {
                    self.advance();
                    let index = self.parse_expression_internal()?;
                    self.expect(Token::RightBracket)?;
                    let span = self.span_from(expr.span().start);
                    expr = Expression::Index(IndexExpr {
                        object: Box::new(expr),
                        index: Box::new(index),
                        span,
                    });
                }
                Some(Token::Colon) => {
                    self.advance();
                    let method = self.expect_name()?;
                    let args = self.parse_call_args()?;
                    let span = self.span_from(expr.span().start);
                    expr = Expression::Call(CallExpr {
                        callee: Box::new(expr),
                        method: Some(method),
                        args,
                        span,
                    });
                }
                Some(Token::LeftParen | Token::LeftBrace | Token::String(_)) => {
                    let args = self.parse_call_args()?;
                    let span = self.span_from(expr.span().start);
                    expr = Expression::Call(CallExpr {
                        callee: Box::new(expr),
                        method: None,
                        args,
                        span,
                    });
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    fn parse_prefix_base(&mut self) -> ParseResult<Expression> {
        let span = self.current_span();
        let expr = match self.current_token() {
            Some(Token::Identifier(name)) => Expression::Identifier(Identifier::new(name.clone(), span)),
            Some(Token::SelfValue) => Expression::SelfValue(span),
            Some(Token::Next) => Expression::Next(span),
            Some(Token::GlobalG) => Expression::GlobalVariable(GlobalVariable {
                name: GlobalName::G,
                span,
            }),
            Some(Token::Version) => Expression::GlobalVariable(GlobalVariable {
                name: GlobalName::Version,
                span,
            }),
            Some(Token::LeftParen) => {
                return self.nested(|parser| {
                    parser.advance();
                    let inner = parser.parse_expression_internal()?;
                    parser.expect(Token::RightParen)?;
                    Ok(Expression::Parenthesized(ParenExpr {
                        inner: Box::new(inner),
                        span: parser.span_from(span.start),
                    }))
                });
            }
            _ => return Err(self.unexpected("expression")),
        };
        self.advance();
        Ok(expr)
    }

    /// 呼び出しの引数を解析：`(...)`、テーブル、文字列のいずれか
    pub(crate) fn parse_call_args(&mut self) -> ParseResult<CallArgs> {
        match self.current_token() {
            Some(Token::LeftBrace) => self.parse_table_constructor().map(CallArgs::Table),
            Some(Token::String(_)) => self.parse_string_literal().map(CallArgs::String),
            Some(Token::LeftParen) => {
                self.advance();
                let args = if self.check(&Token::RightParen) {
                    Vec::new()
                } else {
                    self.parse_expression_list()?
                };
                self.expect(Token::RightParen)?;
                Ok(CallArgs::List(args))
            }
            _ => Err(self.unexpected("function arguments")),
        }
    }
}
