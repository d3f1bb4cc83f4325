//! 二項演算式の解析
//!
//! 優先順位上昇法で二項演算式を解析する。優先順位と結合性は
//! `precedence`モジュールの表から引く。

use crate::ast::*;
use crate::parser::precedence::{binary_operator, binary_precedence, Associativity};
use crate::parser::{ParseResult, Parser};

impl Parser {
    /// 優先順位が`min_rank`以上の演算子だけを取り込んで式を解析
    pub(crate) fn parse_binary_expression(&mut self, min_rank: u8) -> ParseResult<Expression> {
        self.nested(|parser| {
            let left = parser.parse_unary_expression()?;
            parser.parse_binary_rest(left, min_rank)
        })
    }

    /// 解析済みの左辺に続く二項演算を取り込む
    pub(crate) fn parse_binary_rest(
        &mut self,
        mut left: Expression,
        min_rank: u8,
    ) -> ParseResult<Expression> {
        while let Some(op) = self.current_token().and_then(binary_operator) {
            let Some(entry) = binary_precedence(op).filter(|e| e.rank >= min_rank) else {
                break;
            };
            self.advance();

            let next_rank = match entry.associativity {
                Associativity::Left => entry.rank + 1,
                Associativity::Right => entry.rank,
            };
            let right = self.parse_binary_expression(next_rank)?;
            let span = left.span().to(right.span());
            left = Expression::Binary(BinaryExpr {
                left: Box::new(left),
                op,
                right: Box::new(right),
                span,
            });
        }

        Ok(left)
    }
}
