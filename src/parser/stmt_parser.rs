//! 文の解析

use crate::ast::*;
use crate::error::ParserError;
use crate::lexer::Token;

use super::precedence::MIN_RANK;
use super::{ParseResult, Parser};

impl Parser {
    /// ブロックを解析
    ///
    /// ブロックの終わり（`end`、`else`、`elseif`、`until`、入力の終端）で止まり、
    /// 終わりのキーワード自体は消費しない。
    pub(super) fn parse_block(&mut self) -> ParseResult<Block> {
        self.nested(|parser| {
            let start = parser.current_span().start;
            let mut statements = Vec::new();
            let return_statement = parser.parse_block_into(&mut statements)?;
            Ok(Block {
                statements,
                return_statement,
                span: parser.span_from(start),
            })
        })
    }

    /// ブロックの文を`statements`に追加していき、末尾のreturn文を返す
    ///
    /// 中断した場合も、それまでに解析した文は`statements`に残る。
    pub(super) fn parse_block_into(
        &mut self,
        statements: &mut Vec<Statement>,
    ) -> ParseResult<Option<ReturnStatement>> {
        while !self.is_block_end() {
            let statement_start = self.current;

            if self.check(&Token::Return) {
                match self.parse_return_statement() {
                    Ok(ret) => return Ok(Some(ret)),
                    Err(error) => {
                        self.recover(error, statement_start)?;
                        continue;
                    }
                }
            }

            match self.nested(Self::parse_statement_internal) {
                Ok(Some(statement)) => statements.push(statement),
                Ok(None) => {}
                Err(error) => self.recover(error, statement_start)?,
            }
        }
        Ok(None)
    }

    /// 文を解析（内部実装）。空文`;`は`None`
    pub(super) fn parse_statement_internal(&mut self) -> ParseResult<Option<Statement>> {
        let doc = self.take_doc_comment();

        let statement = match self.current_token() {
            Some(Token::Semicolon) => {
                self.advance();
                return Ok(None);
            }
            Some(Token::Local) => {
                if matches!(self.peek(1), Some(Token::Function)) {
                    self.parse_local_function_statement()?
                } else {
                    self.parse_local_variable_declaration()?
                }
            }
            Some(Token::Function) => self.parse_function_statement()?,
            Some(Token::Do) => self.parse_do_statement()?,
            Some(Token::If) => self.parse_if_statement()?,
            Some(Token::While) => self.parse_while_statement()?,
            Some(Token::Repeat) => self.parse_repeat_statement()?,
            Some(Token::For) => self.parse_for_statement()?,
            Some(Token::Goto) => {
                let start = self.current_span().start;
                self.advance();
                let label = self.expect_name()?;
                Statement::Goto(GotoStatement {
                    label,
                    span: self.span_from(start),
                })
            }
            Some(Token::Break) => {
                let span = self.current_span();
                self.advance();
                Statement::Break(span)
            }
            Some(Token::DoubleColon) => {
                let start = self.current_span().start;
                self.advance();
                let name = self.expect_name()?;
                self.expect(Token::DoubleColon)?;
                Statement::Label(LabelStatement {
                    name,
                    span: self.span_from(start),
                })
            }
            _ => self.parse_expression_statement()?,
        };

        if let (Some(doc), Some(id)) = (doc, statement.declaration_id()) {
            self.docs.insert(id, doc);
        }
        Ok(Some(statement))
    }

    /// 代入、関数呼び出し文、または式だけの文（エラー）を解析
    fn parse_expression_statement(&mut self) -> ParseResult<Statement> {
        let start = self.current_span().start;

        if !self.can_start_prefix() {
            if self.can_start_expression() {
                let expr = self.parse_expression_internal()?;
                return Err(ParserError::DanglingExpressionStatement { span: expr.span() });
            }
            return Err(self.unexpected("statement"));
        }

        let first = self.parse_prefix_expression()?;
        if self.check(&Token::Assign) || self.check(&Token::Comma) {
            return self.parse_assignment(first, start);
        }

        match first {
            Expression::Call(call) => Ok(Statement::FunctionCall(call)),
            other => {
                // `a + b` のような式全体をエラー範囲にする
                let expr = self.parse_binary_rest(other, MIN_RANK)?;
                Err(ParserError::DanglingExpressionStatement { span: expr.span() })
            }
        }
    }

    /// 代入文 `a, b.c, d[e] = ...` を解析
    fn parse_assignment(&mut self, first: Expression, start: usize) -> ParseResult<Statement> {
        let id = self.next_node_id();
        let mut targets = vec![first];
        while self.match_token(&Token::Comma) {
            targets.push(self.parse_prefix_expression()?);
        }

        if let Some(target) = targets.iter().find(|t| !t.is_variable_declarator()) {
            return Err(ParserError::InvalidAssignmentTarget {
                span: target.span(),
            });
        }

        self.expect(Token::Assign)?;
        let values = self.parse_expression_list()?;

        Ok(Statement::VariableDeclaration(VariableDeclaration {
            id,
            targets,
            values,
            span: self.span_from(start),
        }))
    }

    /// `local a, b = ...` を解析
    fn parse_local_variable_declaration(&mut self) -> ParseResult<Statement> {
        let start = self.current_span().start;
        let id = self.next_node_id();
        self.expect(Token::Local)?;

        let names = self.parse_name_list()?;
        let values = if self.match_token(&Token::Assign) {
            self.parse_expression_list()?
        } else {
            Vec::new()
        };

        Ok(Statement::LocalVariableDeclaration(LocalVariableDeclaration {
            id,
            names,
            values,
            span: self.span_from(start),
        }))
    }

    /// `local function f(...) ... end` を解析
    fn parse_local_function_statement(&mut self) -> ParseResult<Statement> {
        let opened_at = self.current_span();
        let id = self.next_node_id();
        self.expect(Token::Local)?;
        self.expect(Token::Function)?;

        let name = self.expect_name()?;
        let body = self.parse_function_body(opened_at)?;

        Ok(Statement::LocalFunction(LocalFunctionStatement {
            id,
            name,
            body,
            span: self.span_from(opened_at.start),
        }))
    }

    /// `function a.b:c(...) ... end` を解析
    fn parse_function_statement(&mut self) -> ParseResult<Statement> {
        let opened_at = self.current_span();
        let id = self.next_node_id();
        self.expect(Token::Function)?;

        let name = self.parse_function_name()?;
        let body = self.parse_function_body(opened_at)?;

        Ok(Statement::Function(FunctionStatement {
            id,
            name,
            body,
            span: self.span_from(opened_at.start),
        }))
    }

    fn parse_function_name(&mut self) -> ParseResult<FunctionName> {
        let start = self.current_span().start;
        let mut path = vec![self.expect_name()?];
        while self.match_token(&Token::Dot) {
            path.push(self.expect_name()?);
        }
        let method = if self.match_token(&Token::Colon) {
            Some(self.expect_name()?)
        } else {
            None
        };

        Ok(FunctionName {
            path,
            method,
            span: self.span_from(start),
        })
    }

    fn parse_do_statement(&mut self) -> ParseResult<Statement> {
        let opened_at = self.current_span();
        self.expect(Token::Do)?;
        let body = self.parse_block()?;
        self.expect_block_close(Token::End, "do", opened_at)?;

        Ok(Statement::Do(DoStatement {
            body,
            span: self.span_from(opened_at.start),
        }))
    }

    /// if文を解析
    fn parse_if_statement(&mut self) -> ParseResult<Statement> {
        let opened_at = self.current_span();
        self.expect(Token::If)?;

        let condition = self.parse_expression_internal()?;
        self.expect(Token::Then)?;
        let then_block = self.parse_block()?;

        let mut elseif_clauses = Vec::new();
        while self.check(&Token::ElseIf) {
            let clause_start = self.current_span().start;
            self.advance();
            let condition = self.parse_expression_internal()?;
            self.expect(Token::Then)?;
            let block = self.parse_block()?;
            elseif_clauses.push(ElseIfClause {
                condition,
                block,
                span: self.span_from(clause_start),
            });
        }

        let else_block = if self.match_token(&Token::Else) {
            Some(self.parse_block()?)
        } else {
            None
        };

        self.expect_block_close(Token::End, "if", opened_at)?;

        Ok(Statement::If(IfStatement {
            condition,
            then_block,
            elseif_clauses,
            else_block,
            span: self.span_from(opened_at.start),
        }))
    }

    /// while文を解析
    fn parse_while_statement(&mut self) -> ParseResult<Statement> {
        let opened_at = self.current_span();
        self.expect(Token::While)?;

        let condition = self.parse_expression_internal()?;
        self.expect(Token::Do)?;
        let body = self.parse_block()?;
        self.expect_block_close(Token::End, "while", opened_at)?;

        Ok(Statement::While(WhileStatement {
            condition,
            body,
            span: self.span_from(opened_at.start),
        }))
    }

    fn parse_repeat_statement(&mut self) -> ParseResult<Statement> {
        let opened_at = self.current_span();
        self.expect(Token::Repeat)?;

        let body = self.parse_block()?;
        self.expect_block_close(Token::Until, "repeat", opened_at)?;
        let condition = self.parse_expression_internal()?;

        Ok(Statement::Repeat(RepeatStatement {
            body,
            condition,
            span: self.span_from(opened_at.start),
        }))
    }

    /// 数値for文またはジェネリックfor文を解析
    fn parse_for_statement(&mut self) -> ParseResult<Statement> {
        let opened_at = self.current_span();
        self.expect(Token::For)?;

        let first = self.expect_name()?;
        if self.match_token(&Token::Assign) {
            let start = self.parse_expression_internal()?;
            self.expect(Token::Comma)?;
            let stop = self.parse_expression_internal()?;
            let step = if self.match_token(&Token::Comma) {
                Some(self.parse_expression_internal()?)
            } else {
                None
            };
            let body = self.parse_loop_body(opened_at)?;

            return Ok(Statement::For(ForStatement {
                variable: first,
                start,
                stop,
                step,
                body,
                span: self.span_from(opened_at.start),
            }));
        }

        let mut names = vec![first];
        while self.match_token(&Token::Comma) {
            names.push(self.expect_name()?);
        }
        self.expect(Token::In)?;
        let expressions = self.parse_expression_list()?;
        let body = self.parse_loop_body(opened_at)?;

        Ok(Statement::ForIn(ForInStatement {
            names,
            expressions,
            body,
            span: self.span_from(opened_at.start),
        }))
    }

    /// `do ... end`
    fn parse_loop_body(&mut self, opened_at: Span) -> ParseResult<Block> {
        self.expect(Token::Do)?;
        let body = self.parse_block()?;
        self.expect_block_close(Token::End, "for", opened_at)?;
        Ok(body)
    }

    /// return文を解析（後続の`;`も消費する）
    pub(super) fn parse_return_statement(&mut self) -> ParseResult<ReturnStatement> {
        let start = self.current_span().start;
        self.expect(Token::Return)?;

        let values = if self.is_block_end() || self.check(&Token::Semicolon) {
            Vec::new()
        } else {
            self.parse_expression_list()?
        };
        self.match_token(&Token::Semicolon);

        Ok(ReturnStatement {
            values,
            span: self.span_from(start),
        })
    }

    /// 名前のリスト `a, b, c`
    fn parse_name_list(&mut self) -> ParseResult<Vec<Identifier>> {
        let mut names = vec![self.expect_name()?];
        while self.match_token(&Token::Comma) {
            names.push(self.expect_name()?);
        }
        Ok(names)
    }
}
