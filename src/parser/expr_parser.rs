//! 式の解析

use crate::ast::*;
use crate::lexer::Token;

use super::precedence::MIN_RANK;
use super::{ParseResult, Parser};

impl Parser {
    /// 式を解析（内部実装）
    pub(super) fn parse_expression_internal(&mut self) -> ParseResult<Expression> {
        self.parse_binary_expression(MIN_RANK)
    }

    /// カンマ区切りの式リストを解析（1つ以上）
    pub(super) fn parse_expression_list(&mut self) -> ParseResult<Vec<Expression>> {
        let mut expressions = vec![self.parse_expression_internal()?];
        while self.match_token(&Token::Comma) {
            expressions.push(self.parse_expression_internal()?);
        }
        Ok(expressions)
    }

    /// プレフィックス式（名前、`self`、`next`、`_G`、`_VERSION`、括弧式）で始まるか
    pub(super) fn can_start_prefix(&self) -> bool {
        matches!(
            self.current_token(),
            Some(
                Token::Identifier(_)
                    | Token::SelfValue
                    | Token::Next
                    | Token::GlobalG
                    | Token::Version
                    | Token::LeftParen
            )
        )
    }

    /// 式の先頭になり得るか
    pub(super) fn can_start_expression(&self) -> bool {
        self.can_start_prefix()
            || matches!(
                self.current_token(),
                Some(
                    Token::Nil
                        | Token::True
                        | Token::False
                        | Token::Ellipsis
                        | Token::Number(_)
                        | Token::String(_)
                        | Token::Function
                        | Token::LeftBrace
                        | Token::Not
                        | Token::Hash
                        | Token::Minus
                        | Token::Tilde
                )
            )
    }
}
