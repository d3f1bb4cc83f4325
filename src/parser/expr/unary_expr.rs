//! 単項演算式の解析

use crate::ast::*;
use crate::parser::precedence::{unary_operator, UNARY_RANK};
use crate::parser::{ParseResult, Parser};

impl Parser {
    /// 単項演算式を解析
    ///
    /// オペランドは単項演算子より強い演算子（べき乗）だけを取り込む。
    pub(crate) fn parse_unary_expression(&mut self) -> ParseResult<Expression> {
        let Some(op) = self.current_token().and_then(unary_operator) else {
            return self.parse_simple_expression();
        };

        let start = self.current_span();
        self.advance();
        let operand = self.parse_binary_expression(UNARY_RANK)?;
        let span = start.to(operand.span());
        Ok(Expression::Unary(UnaryExpr {
            op,
            operand: Box::new(operand),
            span,
        }))
    }
}
