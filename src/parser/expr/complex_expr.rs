//! 関数定義式と関数本体の解析

use crate::ast::*;
use crate::error::ParserError;
use crate::lexer::Token;
use crate::parser::{ParseResult, Parser};

impl Parser {
    /// 無名関数 `function (...) ... end` を解析
    pub(crate) fn parse_function_definition(&mut self) -> ParseResult<Expression> {
        let opened_at = self.current_span();
        self.expect(Token::Function)?;
        let body = self.parse_function_body(opened_at)?;
        Ok(Expression::Function(FunctionDefinition {
            body,
            span: self.span_from(opened_at.start),
        }))
    }

    /// 仮引数リストと本体ブロックを`end`まで解析
    ///
    /// 仮引数リストが不正なら対応する`end`まで読み飛ばしてからエラーを返す。
    pub(crate) fn parse_function_body(&mut self, opened_at: Span) -> ParseResult<FunctionBody> {
        let start = self.current_span().start;
        let has_parameters = self.check(&Token::LeftParen);
        let parameters = match self.parse_parameter_list() {
            Ok(parameters) => parameters,
            Err(error) => {
                if has_parameters {
                    self.skip_past_end();
                }
                return Err(error);
            }
        };
        let block = self.parse_block()?;
        self.expect_block_close(Token::End, "function", opened_at)?;
        Ok(FunctionBody {
            parameters,
            block,
            span: self.span_from(start),
        })
    }

    /// 仮引数リストを解析
    ///
    /// `self`は先頭にだけ、`...`は末尾にだけ置ける。
    fn parse_parameter_list(&mut self) -> ParseResult<Vec<Parameter>> {
        self.expect(Token::LeftParen)?;

        let mut parameters = Vec::new();
        if !self.check(&Token::RightParen) {
            loop {
                let span = self.current_span();
                match self.current_token() {
                    Some(Token::SelfValue) => {
                        if !parameters.is_empty() {
                            return Err(ParserError::MalformedParameterList {
                                message: "'self' must be the first parameter".to_string(),
                                span,
                            });
                        }
                        self.advance();
                        parameters.push(Parameter::SelfParam(span));
                    }
                    Some(Token::Ellipsis) => {
                        self.advance();
                        parameters.push(Parameter::Spread(span));
                    }
                    Some(token) if token.as_name().is_some() => {
                        let name = self.expect_name()?;
                        parameters.push(Parameter::Name(name));
                    }
                    _ => return Err(self.unexpected("parameter name")),
                }

                if !self.check(&Token::Comma) {
                    break;
                }
                if let Some(Parameter::Spread(_)) = parameters.last() {
                    return Err(ParserError::MalformedParameterList {
                        message: "'...' must be the last parameter".to_string(),
                        span: self.current_span(),
                    });
                }
                self.advance();
            }
        }

        self.expect(Token::RightParen)?;
        Ok(parameters)
    }
}
