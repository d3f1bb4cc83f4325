//! 解析パイプライン
//!
//! ソースを字句解析・構文解析し、ASTと行・列付きの診断一覧を返す。
//! 字句エラーと構文エラーは1つの一覧にまとめ、ソース上の位置順に並べる。
//! 行・列はUTF-8として不正なバイトを1文字と数える。

use std::path::Path;
use std::sync::Arc;

use codespan_reporting::files::SimpleFile;

use crate::ast::{Program, Statement};
use crate::error::{Diagnostic, ErrorCollector, LuaError, LuaResult, Severity};
use crate::lexer::{
    display_source, Lexer, LuaStringScanner, StringScanner, DEFAULT_LONG_BRACKET_WARN_LEVEL,
};
use crate::parser::Parser;

pub use crate::parser::RecoveryMode;

/// 解析の設定
#[derive(Debug, Clone)]
pub struct ParseOptions {
    pub recovery: RecoveryMode,
    /// この水準を超える長括弧に警告を出す（`None`で無効）
    pub long_bracket_warn_level: Option<usize>,
    /// 引用符付き文字列と長括弧文字列の走査
    pub scanner: Arc<dyn StringScanner>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            recovery: RecoveryMode::Recover,
            long_bracket_warn_level: Some(DEFAULT_LONG_BRACKET_WARN_LEVEL),
            scanner: Arc::new(LuaStringScanner),
        }
    }
}

impl ParseOptions {
    pub fn with_recovery(mut self, recovery: RecoveryMode) -> Self {
        self.recovery = recovery;
        self
    }

    pub fn with_long_bracket_warn_level(mut self, level: Option<usize>) -> Self {
        self.long_bracket_warn_level = level;
        self
    }

    pub fn with_scanner(mut self, scanner: Arc<dyn StringScanner>) -> Self {
        self.scanner = scanner;
        self
    }
}

/// 解析結果
#[derive(Debug, Clone)]
pub struct ParseOutput {
    pub program: Program,
    /// 位置順の診断（エラーと警告）
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseOutput {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }
}

/// ソース文字列を解析
pub fn parse_source(source: &str, options: &ParseOptions) -> ParseOutput {
    parse_named("<input>", source, options)
}

/// 名前付きのソースを解析（名前は診断の表示に使う）
///
/// ソースはバイト列として読む。`StopAtFirstError`では字句エラーと構文エラーのうち
/// ソース上で最も早いものまでを報告し、それより前に解析できた文を残す。
pub fn parse_named<S: AsRef<[u8]> + ?Sized>(
    name: &str,
    source: &S,
    options: &ParseOptions,
) -> ParseOutput {
    let bytes = source.as_ref();

    log::debug!("tokenizing {} ({} bytes)", name, bytes.len());
    let lexed = Lexer::with_scanner(
        bytes,
        Arc::clone(&options.scanner),
        options.long_bracket_warn_level,
    )
    .collect_tokens();
    log::debug!(
        "lexed {} tokens with {} diagnostics",
        lexed.tokens.len(),
        lexed.errors.len()
    );

    log::debug!("parsing {}", name);
    let mut parser = Parser::new(lexed.tokens).with_recovery(options.recovery);
    let (mut program, stopped) = parser.parse_program_partial();

    let mut found: Vec<LuaError> = lexed
        .errors
        .into_iter()
        .map(LuaError::from)
        .chain(parser.take_errors().into_iter().map(LuaError::from))
        .chain(stopped.map(LuaError::from))
        .collect();

    if options.recovery == RecoveryMode::StopAtFirstError {
        if let Some(index) = earliest_error(&found) {
            let first = found.remove(index);
            let cutoff = first.span().start;
            log::debug!("stopping at the first error (offset {})", cutoff);
            found.retain(|e| e.kind().severity() == Severity::Warning && e.span().start < cutoff);
            found.push(first);
            truncate_at(&mut program, cutoff);
        }
    }

    let mut collector = ErrorCollector::new();
    for error in found {
        collector.add(error);
    }
    log::debug!(
        "{}: {} errors, {} warnings",
        name,
        collector.error_count(),
        collector.warning_count()
    );

    let file = SimpleFile::new(name.to_string(), display_source(bytes));
    ParseOutput {
        program,
        diagnostics: collector.into_diagnostics(&file),
    }
}

/// バイト列を解析。文字列リテラルの値はバイト列のまま保たれる
pub fn parse_bytes(bytes: &[u8], options: &ParseOptions) -> ParseOutput {
    parse_named("<input>", bytes, options)
}

/// ファイルを読み込んで解析。診断の表示に使うテキストも返す
pub fn parse_file(path: &Path, options: &ParseOptions) -> LuaResult<(String, ParseOutput)> {
    let bytes = std::fs::read(path)?;
    let output = parse_named(&path.display().to_string(), &bytes, options);
    Ok((display_source(&bytes), output))
}

/// ソース上で最も早いエラー（警告を除く）の位置。同じ位置なら先に見つかった方
fn earliest_error(errors: &[LuaError]) -> Option<usize> {
    errors
        .iter()
        .enumerate()
        .filter(|(_, e)| e.kind().severity() == Severity::Error)
        .min_by_key(|(_, e)| e.span().start)
        .map(|(index, _)| index)
}

/// `cutoff`より前で終わる文だけを残す
fn truncate_at(program: &mut Program, cutoff: usize) {
    program.statements.retain(|s| s.span().end <= cutoff);
    if program
        .return_statement
        .as_ref()
        .is_some_and(|ret| ret.span.end > cutoff)
    {
        program.return_statement = None;
    }

    let kept_end = program
        .statements
        .iter()
        .map(Statement::span)
        .chain(program.return_statement.iter().map(|ret| ret.span))
        .map(|span| span.end)
        .max()
        .unwrap_or(0);
    program.docs.retain(|_, doc| doc.span.end <= kept_end);
}
