//! 統一的なエラーハンドリングモジュール
//!
//! このモジュールは、字句解析・構文解析で使用されるエラー型と、
//! 呼び出し側に返す診断情報（`Diagnostic`）を提供します。
//! 解析中のエラーはプロセスを中断せず、`ErrorCollector`に蓄積されます。

use crate::ast::Span;
use codespan_reporting::diagnostic::{Diagnostic as CodespanDiagnostic, Label};
use codespan_reporting::files::{Files, SimpleFile};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// 統一エラー型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LuaError {
    /// レキサーエラー
    #[error(transparent)]
    Lexer(#[from] LexerError),

    /// パーサーエラー
    #[error(transparent)]
    Parser(#[from] ParserError),

    /// ファイルI/Oエラー
    #[error("failed to read source: {0}")]
    Io(String),
}

impl From<std::io::Error> for LuaError {
    fn from(e: std::io::Error) -> Self {
        LuaError::Io(e.to_string())
    }
}

/// レキサーエラーの詳細
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexerError {
    #[error("unexpected symbol '{token}'")]
    UnrecognizedToken { token: String, span: Span },

    #[error("unfinished long bracket (level {level})")]
    UnterminatedLongBracket { level: usize, span: Span },

    #[error("unfinished string")]
    UnterminatedString { span: Span },

    #[error("malformed number near '{lexeme}'")]
    InvalidNumber { lexeme: String, span: Span },

    #[error("long bracket level {level} exceeds the configured bound {bound}")]
    LongBracketLevel {
        level: usize,
        bound: usize,
        span: Span,
    },

    #[error("comment is not valid UTF-8; invalid bytes were replaced")]
    InvalidUtf8 { span: Span },
}

/// logosのエラー型として使うための既定値（スパンは後で埋める）
impl Default for LexerError {
    fn default() -> Self {
        LexerError::UnrecognizedToken {
            token: String::new(),
            span: Span::dummy(),
        }
    }
}

impl LexerError {
    pub fn span(&self) -> Span {
        match self {
            LexerError::UnrecognizedToken { span, .. }
            | LexerError::UnterminatedLongBracket { span, .. }
            | LexerError::UnterminatedString { span }
            | LexerError::InvalidNumber { span, .. }
            | LexerError::LongBracketLevel { span, .. }
            | LexerError::InvalidUtf8 { span } => *span,
        }
    }

    pub fn kind(&self) -> DiagnosticKind {
        match self {
            LexerError::UnrecognizedToken { .. } => DiagnosticKind::UnrecognizedToken,
            LexerError::UnterminatedLongBracket { .. } => DiagnosticKind::UnterminatedLongBracket,
            LexerError::UnterminatedString { .. } => DiagnosticKind::UnterminatedString,
            LexerError::InvalidNumber { .. } => DiagnosticKind::InvalidNumberLiteral,
            LexerError::LongBracketLevel { .. } => DiagnosticKind::LongBracketLevel,
            LexerError::InvalidUtf8 { .. } => DiagnosticKind::InvalidUtf8,
        }
    }
}

/// パーサーエラーの詳細
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParserError {
    #[error("expected {expected}, found {found}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("expression is not a statement (only calls may stand alone)")]
    DanglingExpressionStatement { span: Span },

    #[error("'{expected}' expected to close '{construct}'")]
    UnterminatedBlock {
        construct: String,
        expected: String,
        opened_at: Span,
        span: Span,
    },

    #[error("malformed parameter list: {message}")]
    MalformedParameterList { message: String, span: Span },

    #[error("cannot assign to this expression")]
    InvalidAssignmentTarget { span: Span },

    #[error("malformed doc comment: {message}")]
    MalformedDocComment { message: String, span: Span },

    #[error("too many nested levels (limit is {limit})")]
    NestingTooDeep { limit: usize, span: Span },
}

impl ParserError {
    pub fn span(&self) -> Span {
        match self {
            ParserError::UnexpectedToken { span, .. }
            | ParserError::DanglingExpressionStatement { span }
            | ParserError::UnterminatedBlock { span, .. }
            | ParserError::MalformedParameterList { span, .. }
            | ParserError::InvalidAssignmentTarget { span }
            | ParserError::MalformedDocComment { span, .. }
            | ParserError::NestingTooDeep { span, .. } => *span,
        }
    }

    /// 回復せずに解析を打ち切るエラーか
    pub fn is_fatal(&self) -> bool {
        matches!(self, ParserError::NestingTooDeep { .. })
    }

    pub fn kind(&self) -> DiagnosticKind {
        match self {
            ParserError::UnexpectedToken { .. } => DiagnosticKind::UnexpectedToken,
            ParserError::DanglingExpressionStatement { .. } => {
                DiagnosticKind::DanglingExpressionStatement
            }
            ParserError::UnterminatedBlock { .. } => DiagnosticKind::UnterminatedBlock,
            ParserError::MalformedParameterList { .. } => DiagnosticKind::MalformedParameterList,
            ParserError::InvalidAssignmentTarget { .. } => DiagnosticKind::InvalidAssignmentTarget,
            ParserError::MalformedDocComment { .. } => DiagnosticKind::MalformedDocComment,
            ParserError::NestingTooDeep { .. } => DiagnosticKind::NestingTooDeep,
        }
    }
}

impl LuaError {
    pub fn span(&self) -> Span {
        match self {
            LuaError::Lexer(e) => e.span(),
            LuaError::Parser(e) => e.span(),
            LuaError::Io(_) => Span::dummy(),
        }
    }

    pub fn kind(&self) -> DiagnosticKind {
        match self {
            LuaError::Lexer(e) => e.kind(),
            LuaError::Parser(e) => e.kind(),
            LuaError::Io(_) => DiagnosticKind::Io,
        }
    }
}

/// 診断の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticKind {
    UnrecognizedToken,
    UnterminatedLongBracket,
    UnterminatedString,
    InvalidNumberLiteral,
    LongBracketLevel,
    InvalidUtf8,
    UnexpectedToken,
    DanglingExpressionStatement,
    UnterminatedBlock,
    MalformedParameterList,
    InvalidAssignmentTarget,
    MalformedDocComment,
    NestingTooDeep,
    Io,
}

impl DiagnosticKind {
    /// 警告扱い（解析結果に影響しない）の種類か
    pub fn severity(&self) -> Severity {
        match self {
            DiagnosticKind::LongBracketLevel
            | DiagnosticKind::InvalidUtf8
            | DiagnosticKind::MalformedDocComment => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Error,
    Warning,
}

/// 呼び出し側に返す診断情報（行・列は1始まり）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    pub message: String,
    #[serde(skip)]
    pub span: Span,
    pub line: usize,
    pub column: usize,
}

impl Diagnostic {
    /// エラーから診断を作成し、ソース上の行・列を解決する
    pub fn from_error<S: AsRef<str>>(error: &LuaError, file: &SimpleFile<String, S>) -> Self {
        let span = error.span();
        let (line, column) = file
            .location((), span.start)
            .map(|loc| (loc.line_number, loc.column_number))
            .unwrap_or((1, 1));
        let kind = error.kind();
        Self {
            kind,
            severity: kind.severity(),
            message: error.to_string(),
            span,
            line,
            column,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// codespan-reportingのDiagnosticに変換
    pub fn to_codespan<FileId: Copy>(&self, file_id: FileId) -> CodespanDiagnostic<FileId> {
        let base = match self.severity {
            Severity::Error => CodespanDiagnostic::error(),
            Severity::Warning => CodespanDiagnostic::warning(),
        };
        let label = Label::primary(file_id, self.span.start..self.span.end.max(self.span.start));
        base.with_message(&self.message)
            .with_code(self.kind.to_string())
            .with_labels(vec![label])
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {}: {}",
            self.line, self.column, self.kind, self.message
        )
    }
}

/// 複数のエラーを発生順に蓄積するためのコレクター
#[derive(Debug, Default)]
pub struct ErrorCollector {
    diagnostics: Vec<LuaError>,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// エラーまたは警告を追加
    pub fn add(&mut self, error: impl Into<LuaError>) {
        self.diagnostics.push(error.into());
    }

    /// エラー（警告を除く）があるかどうか
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|e| e.kind().severity() == Severity::Error)
    }

    /// エラーの数
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|e| e.kind().severity() == Severity::Error)
            .count()
    }

    /// 警告の数
    pub fn warning_count(&self) -> usize {
        self.diagnostics.len() - self.error_count()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// 最初のエラーを取得
    pub fn first_error(&self) -> Option<&LuaError> {
        self.diagnostics
            .iter()
            .find(|e| e.kind().severity() == Severity::Error)
    }

    /// 蓄積したエラーを行・列付きの診断に変換
    pub fn into_diagnostics<S: AsRef<str>>(self, file: &SimpleFile<String, S>) -> Vec<Diagnostic> {
        let mut diagnostics: Vec<_> = self
            .diagnostics
            .iter()
            .map(|e| Diagnostic::from_error(e, file))
            .collect();
        // 字句エラーと構文エラーは別々に蓄積されるので位置順に並べ直す
        diagnostics.sort_by_key(|d| d.span.start);
        diagnostics
    }
}

/// Result型のエイリアス
pub type LuaResult<T> = Result<T, LuaError>;
