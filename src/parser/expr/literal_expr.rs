//! リテラル式とテーブルコンストラクタの解析

use crate::ast::*;
use crate::lexer::Token;
use crate::parser::{ParseResult, Parser};

impl Parser {
    /// 演算子を含まない式を解析
    pub(crate) fn parse_simple_expression(&mut self) -> ParseResult<Expression> {
        let span = self.current_span();
        let expr = match self.current_token() {
            Some(Token::Nil) => Expression::Nil(span),
            Some(Token::True) => Expression::True(span),
            Some(Token::False) => Expression::False(span),
            Some(Token::Ellipsis) => Expression::Spread(span),
            Some(Token::Number(raw)) => Expression::Number(NumberLiteral {
                raw: raw.clone(),
                span,
            }),
            Some(Token::String(_)) => return self.parse_string_literal().map(Expression::String),
            Some(Token::LeftBrace) => {
                return self.parse_table_constructor().map(Expression::Table);
            }
            Some(Token::Function) => return self.parse_function_definition(),
            _ => return self.parse_prefix_expression(),
        };
        self.advance();
        Ok(expr)
    }

    /// 文字列リテラルを解析
    pub(crate) fn parse_string_literal(&mut self) -> ParseResult<StringLiteral> {
        let Some(token) = self.current_token_with_pos() else {
            return Err(self.unexpected("string"));
        };
        let Token::String(string) = &token.token else {
            return Err(self.unexpected("string"));
        };
        let literal = StringLiteral {
            value: string.value.clone(),
            raw: token.lexeme.clone(),
            delimiter: string.delimiter,
            span: token.span.clone().into(),
        };
        self.advance();
        Ok(literal)
    }

    /// テーブルコンストラクタ `{ ... }` を解析
    ///
    /// フィールドは`,`または`;`で区切り、末尾の区切りは1つだけ許す。
    pub(crate) fn parse_table_constructor(&mut self) -> ParseResult<TableConstructor> {
        self.nested(|parser| {
            let start = parser.current_span().start;
            parser.expect(Token::LeftBrace)?;

            let mut fields = Vec::new();
            while !parser.check(&Token::RightBrace) && !parser.is_at_end() {
                fields.push(parser.parse_table_field()?);
                if !parser.match_token(&Token::Comma) && !parser.match_token(&Token::Semicolon) {
                    break;
                }
            }

            parser.expect(Token::RightBrace)?;
            Ok(TableConstructor {
                fields,
                span: parser.span_from(start),
            })
        })
    }

    fn parse_table_field(&mut self) -> ParseResult<Field> {
        let start = self.current_span().start;

        if self.match_token(&Token::LeftBracket) {
            let key = self.parse_expression_internal()?;
            self.expect(Token::RightBracket)?;
            self.expect(Token::Assign)?;
            let value = self.parse_expression_internal()?;
            return Ok(Field::Bracketed {
                key,
                value,
                span: self.span_from(start),
            });
        }

        if self.current_token().and_then(Token::as_name).is_some()
            && matches!(self.peek(1), Some(Token::Assign))
        {
            let name = self.expect_name()?;
            self.advance();
            let value = self.parse_expression_internal()?;
            return Ok(Field::Named {
                name,
                value,
                span: self.span_from(start),
            });
        }

        Ok(Field::Positional(self.parse_expression_internal()?))
    }
}
