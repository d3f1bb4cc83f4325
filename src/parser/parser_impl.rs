//! メインパーサー構造とユーティリティ

use indexmap::IndexMap;

use crate::ast::*;
use crate::error::{ParserError, Severity};
use crate::lexer::{Token, TokenWithPosition};

use super::doc_comment::parse_doc_block;
use super::{ParseError, ParseResult, RecoveryMode};

/// 式とブロックの入れ子の上限。超えると`NestingTooDeep`で解析を打ち切る
pub const MAX_NESTING_DEPTH: usize = 200;

/// Luaパーサー
pub struct Parser {
    /// コメントを除いたトークン列
    pub(super) tokens: Vec<TokenWithPosition>,
    /// コメントトークン（ドキュメントコメント用の副チャネル）
    pub(super) comments: Vec<TokenWithPosition>,
    pub(super) current: usize,
    comment_cursor: usize,
    next_id: u32,
    pub(super) docs: IndexMap<NodeId, DocComment>,
    errors: Vec<ParserError>,
    recovery: RecoveryMode,
    depth: usize,
}

impl Parser {
    pub fn new(tokens: Vec<TokenWithPosition>) -> Self {
        // コメントは構文上の意味を持たないので分離する
        let (comments, tokens): (Vec<_>, Vec<_>) = tokens
            .into_iter()
            .partition(|t| matches!(t.token, Token::Comment(_)));
        Self {
            tokens,
            comments,
            current: 0,
            comment_cursor: 0,
            next_id: 0,
            docs: IndexMap::new(),
            errors: Vec::new(),
            recovery: RecoveryMode::default(),
            depth: 0,
        }
    }

    /// エラー発生時の振る舞いを設定
    pub fn with_recovery(mut self, recovery: RecoveryMode) -> Self {
        self.recovery = recovery;
        self
    }

    /// 完全なプログラムを解析
    ///
    /// エラー（警告を除く）が1つでもあれば最初のエラーを返す。
    /// 回復した部分的なASTが必要な場合は`parse_program`を使う。
    pub fn parse(&mut self) -> ParseResult<Program> {
        let program = self.parse_program()?;
        match self
            .errors
            .iter()
            .find(|e| e.kind().severity() == Severity::Error)
        {
            Some(error) => Err(error.clone()),
            None => Ok(program),
        }
    }

    /// 完全なプログラムを解析し、回復できたASTを返す
    ///
    /// `RecoveryMode::Recover`では常に`Ok`を返し、エラーは`errors`に蓄積される。
    pub fn parse_program(&mut self) -> ParseResult<Program> {
        match self.parse_program_partial() {
            (_, Some(error)) => Err(error),
            (program, None) => Ok(program),
        }
    }

    /// 完全なプログラムを解析する。中断した場合もそこまでに解析できた文を返す
    ///
    /// 2つ目の値は解析を中断させたエラー。`RecoveryMode::Recover`では常に`None`で、
    /// 入れ子が深すぎて打ち切った場合もエラーは`errors`に入る。
    pub fn parse_program_partial(&mut self) -> (Program, Option<ParseError>) {
        let mut statements = Vec::new();
        let mut return_statement = None;
        let mut stopped = None;

        loop {
            match self.parse_block_into(&mut statements) {
                Ok(ret) => {
                    if ret.is_some() {
                        return_statement = ret;
                    }
                }
                Err(error) if error.is_fatal() && self.recovery == RecoveryMode::Recover => {
                    log::debug!("abandoning parse: {}", error);
                    self.errors.push(error);
                    self.current = self.tokens.len();
                    break;
                }
                Err(error) => {
                    stopped = Some(error);
                    break;
                }
            }
            if self.is_at_end() {
                break;
            }
            // トップレベルに残った`end`やreturn文の後のトークン
            let error = self.unexpected("end of input");
            if let Err(error) = self.report(error) {
                stopped = Some(error);
                break;
            }
            let position = self.current;
            self.synchronize(position);
        }

        let end = self
            .tokens
            .last()
            .map(|t| t.span.end)
            .max(self.comments.last().map(|c| c.span.end))
            .unwrap_or(0);

        let program = Program {
            statements,
            return_statement,
            docs: std::mem::take(&mut self.docs),
            span: Span::new(0, end),
        };
        (program, stopped)
    }

    /// 単一の式を解析
    pub fn parse_expression(&mut self) -> ParseResult<Expression> {
        self.parse_expression_internal()
    }

    /// 単一の文を解析（`;`のみの場合は`None`）
    pub fn parse_statement(&mut self) -> ParseResult<Option<Statement>> {
        self.parse_statement_internal()
    }

    /// 蓄積されたエラーと警告（発生順）
    pub fn errors(&self) -> &[ParserError] {
        &self.errors
    }

    /// 蓄積されたエラーと警告を取り出す
    pub fn take_errors(&mut self) -> Vec<ParserError> {
        std::mem::take(&mut self.errors)
    }

    // ==================== エラー回復 ====================

    /// エラーを記録する。中断モードではそのまま返す
    pub(super) fn report(&mut self, error: ParseError) -> ParseResult<()> {
        if self.recovery == RecoveryMode::StopAtFirstError
            && error.kind().severity() == Severity::Error
        {
            return Err(error);
        }
        log::trace!("recorded parse error: {}", error);
        self.errors.push(error);
        Ok(())
    }

    /// 文の解析エラーから回復する。打ち切るべきエラーはそのまま返す
    pub(super) fn recover(&mut self, error: ParseError, statement_start: usize) -> ParseResult<()> {
        if error.is_fatal() {
            return Err(error);
        }
        self.report(error)?;
        self.synchronize(statement_start);
        Ok(())
    }

    /// 入れ子を1段深くして`parse`を実行する
    pub(super) fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<T> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(ParserError::NestingTooDeep {
                limit: MAX_NESTING_DEPTH,
                span: self.current_span(),
            });
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// 対応する`end`の直後まで読み飛ばす
    pub(super) fn skip_past_end(&mut self) {
        let mut open = 1usize;
        while let Some(token) = self.current_token() {
            match token {
                Token::Function | Token::Do | Token::If => open += 1,
                Token::End => open -= 1,
                _ => {}
            }
            self.advance();
            if open == 0 {
                break;
            }
        }
    }

    /// 次の文の境界まで読み飛ばす
    ///
    /// 文の先頭から進んでいなければ、少なくとも1トークンは読み飛ばす。
    pub(super) fn synchronize(&mut self, statement_start: usize) {
        if self.current == statement_start {
            self.advance();
        }
        let from = self.current;
        while let Some(token) = self.current_token() {
            if matches!(token, Token::Semicolon) {
                self.advance();
                break;
            }
            if is_statement_start(token) || is_block_end(token) {
                break;
            }
            self.advance();
        }
        log::trace!("skipped {} tokens while recovering", self.current - from);
    }

    // ==================== ドキュメントコメント ====================

    /// 宣言IDを採番
    pub(super) fn next_node_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    /// 現在のトークンの直前にあるドキュメントブロックを取り出す
    pub(super) fn take_doc_comment(&mut self) -> Option<DocComment> {
        let next = self.tokens.get(self.current)?;
        let previous_line = self
            .current
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|t| t.end_position.line);

        let first = self.comment_cursor;
        while self
            .comments
            .get(self.comment_cursor)
            .is_some_and(|c| c.span.end <= next.span.start)
        {
            self.comment_cursor += 1;
        }

        // 前のトークンと同じ行にある末尾コメントは対象外
        let candidates: Vec<_> = self.comments[first..self.comment_cursor]
            .iter()
            .filter(|c| previous_line.map_or(true, |line| c.position.line > line))
            .cloned()
            .collect();
        if candidates.is_empty() {
            return None;
        }

        let (doc, warnings) = parse_doc_block(&candidates, next.position.line);
        for warning in warnings {
            // 警告は中断の対象にならない
            self.errors.push(warning);
        }
        doc
    }

    // ==================== ユーティリティメソッド ====================

    /// 現在のトークンを取得
    pub(super) fn current_token(&self) -> Option<&Token> {
        self.tokens.get(self.current).map(|t| &t.token)
    }

    /// 現在のトークンを位置情報付きで取得
    pub(super) fn current_token_with_pos(&self) -> Option<&TokenWithPosition> {
        self.tokens.get(self.current)
    }

    /// 特定のオフセット先のトークンを取得
    pub(super) fn peek(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.current + offset).map(|t| &t.token)
    }

    /// 現在のスパンを取得（終端では入力末尾の空スパン）
    pub(super) fn current_span(&self) -> Span {
        match self.current_token_with_pos() {
            Some(t) => t.span.clone().into(),
            None => {
                let end = self.tokens.last().map(|t| t.span.end).unwrap_or(0);
                Span::new(end, end)
            }
        }
    }

    /// 開始位置から現在位置までのスパンを作成
    pub(super) fn span_from(&self, start: usize) -> Span {
        let end = self
            .current
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|t| t.span.end)
            .unwrap_or(start);
        Span::new(start, end.max(start))
    }

    /// 次のトークンに進む
    pub(super) fn advance(&mut self) {
        if !self.is_at_end() {
            self.current += 1;
        }
    }

    /// 終端に到達したかチェック
    pub(super) fn is_at_end(&self) -> bool {
        self.current >= self.tokens.len()
    }

    /// ブロックの終わり（`end`、`else`、`elseif`、`until`、入力の終端）か
    pub(super) fn is_block_end(&self) -> bool {
        self.current_token().map_or(true, is_block_end)
    }

    /// 特定のトークンをチェック（進まない）
    pub(super) fn check(&self, token_type: &Token) -> bool {
        if let Some(token) = self.current_token() {
            std::mem::discriminant(token) == std::mem::discriminant(token_type)
        } else {
            false
        }
    }

    /// 特定のトークンにマッチしたら進む
    pub(super) fn match_token(&mut self, token_type: &Token) -> bool {
        if self.check(token_type) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// 特定のトークンを期待
    pub(super) fn expect(&mut self, token_type: Token) -> ParseResult<()> {
        if self.check(&token_type) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{}'", token_type)))
        }
    }

    /// ブロックを閉じるキーワードを期待。終端に達していれば未終了ブロック
    pub(super) fn expect_block_close(
        &mut self,
        closer: Token,
        construct: &str,
        opened_at: Span,
    ) -> ParseResult<()> {
        if self.is_at_end() {
            return Err(ParserError::UnterminatedBlock {
                construct: construct.to_string(),
                expected: closer.to_string(),
                opened_at,
                span: self.current_span(),
            });
        }
        self.expect(closer)
    }

    /// 名前を期待（`self`や`next`なども名前として受け付ける）
    pub(super) fn expect_name(&mut self) -> ParseResult<Identifier> {
        match self.current_token().and_then(Token::as_name) {
            Some(name) => {
                let ident = Identifier::new(name, self.current_span());
                self.advance();
                Ok(ident)
            }
            None => Err(self.unexpected("name")),
        }
    }

    /// 予期しないトークンエラーを作成
    pub(super) fn unexpected(&self, expected: &str) -> ParseError {
        let found = self
            .current_token()
            .map(Token::describe)
            .unwrap_or_else(|| "end of input".to_string());
        ParserError::UnexpectedToken {
            expected: expected.to_string(),
            found,
            span: self.current_span(),
        }
    }
}

/// 文の開始キーワード（エラー回復の同期点）
fn is_statement_start(token: &Token) -> bool {
    matches!(
        token,
        Token::Local
            | Token::Function
            | Token::Do
            | Token::If
            | Token::While
            | Token::Repeat
            | Token::For
            | Token::Goto
            | Token::Break
            | Token::Return
            | Token::DoubleColon
    )
}

fn is_block_end(token: &Token) -> bool {
    matches!(
        token,
        Token::End | Token::Else | Token::ElseIf | Token::Until
    )
}
