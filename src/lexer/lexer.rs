//! レキサーのメイン実装

use logos::Logos;
use std::sync::Arc;

use super::literal_parser::is_valid_number;
use super::scanner::StringScanner;
use super::token::{LexerExtras, Token, TokenKind};
use crate::error::LexerError;

/// 位置情報（1始まり）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new() -> Self {
        Position { line: 1, column: 1 }
    }

    /// 1バイト進める。UTF-8の継続バイトは桁を増やさない
    pub fn advance(&mut self, byte: u8) {
        if byte == b'\n' {
            self.line += 1;
            self.column = 1;
        } else if byte & 0xC0 != 0x80 {
            self.column += 1;
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

/// 位置情報付きトークン
#[derive(Debug, Clone, PartialEq)]
pub struct TokenWithPosition {
    pub token: Token,
    /// ソース上の字句（UTF-8でないバイトは置換文字になる）
    pub lexeme: String,
    /// 先頭の位置
    pub position: Position,
    /// 末尾の位置（トークン直後）
    pub end_position: Position,
    pub span: logos::Span,
}

impl TokenWithPosition {
    pub fn kind(&self) -> TokenKind {
        self.token.kind()
    }

    pub fn line(&self) -> usize {
        self.position.line
    }

    pub fn column(&self) -> usize {
        self.position.column
    }
}

/// トークン列と字句エラー
#[derive(Debug, Clone, Default)]
pub struct LexOutput {
    pub tokens: Vec<TokenWithPosition>,
    pub errors: Vec<LexerError>,
}

/// Luaのレキサー
///
/// 左から右への1パスで、レキサー自身は後戻りしない。
/// 字句エラーは蓄積され、エラー箇所を読み飛ばして走査を続ける。
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, Token>,
    position: Position,
    input: &'a [u8],
    last_end: usize,
    errors: Vec<LexerError>,
}

impl<'a> Lexer<'a> {
    /// 既定のスキャナーで新しいレキサーを作成。入力は`&str`でもバイト列でもよい
    pub fn new<S: AsRef<[u8]> + ?Sized>(input: &'a S) -> Self {
        Self::with_extras(input.as_ref(), LexerExtras::default())
    }

    /// 文字列スキャナーと長括弧の警告水準を指定して作成
    pub fn with_scanner<S: AsRef<[u8]> + ?Sized>(
        input: &'a S,
        scanner: Arc<dyn StringScanner>,
        long_bracket_warn_level: Option<usize>,
    ) -> Self {
        Self::with_extras(
            input.as_ref(),
            LexerExtras {
                scanner,
                long_bracket_warn_level,
                warnings: Vec::new(),
            },
        )
    }

    fn with_extras(input: &'a [u8], extras: LexerExtras) -> Self {
        Self {
            inner: Token::lexer_with_extras(input, extras),
            position: Position::new(),
            input,
            last_end: 0,
            errors: Vec::new(),
        }
    }

    /// これまでに発生した字句エラーと警告
    pub fn errors(&self) -> &[LexerError] {
        &self.errors
    }

    /// すべてのトークンを収集
    pub fn collect_tokens(mut self) -> LexOutput {
        let mut tokens = Vec::new();
        while let Some(token) = self.next() {
            tokens.push(token);
        }
        LexOutput {
            tokens,
            errors: self.errors,
        }
    }

    fn advance_to(&mut self, offset: usize) {
        if offset > self.last_end {
            for &byte in &self.input[self.last_end..offset] {
                self.position.advance(byte);
            }
            self.last_end = offset;
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = TokenWithPosition;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(result) = self.inner.next() {
            let span = self.inner.span();
            self.errors.append(&mut self.inner.extras.warnings);

            // 前のトークンからの空白を反映
            self.advance_to(span.start);
            let position = self.position;
            self.advance_to(span.end);

            match result {
                Ok(token) => {
                    let lexeme = String::from_utf8_lossy(&self.input[span.clone()]).into_owned();
                    if let Token::Number(raw) = &token {
                        if !is_valid_number(raw) {
                            self.errors.push(LexerError::InvalidNumber {
                                lexeme: raw.clone(),
                                span: span.clone().into(),
                            });
                        }
                    }
                    return Some(TokenWithPosition {
                        token,
                        lexeme,
                        position,
                        end_position: self.position,
                        span,
                    });
                }
                Err(LexerError::UnrecognizedToken { token, .. }) if token.is_empty() => {
                    // logosが認識できなかった文字
                    self.errors.push(LexerError::UnrecognizedToken {
                        token: String::from_utf8_lossy(&self.input[span.clone()]).into_owned(),
                        span: span.into(),
                    });
                }
                Err(e) => self.errors.push(e),
            }
        }
        self.errors.append(&mut self.inner.extras.warnings);
        None
    }
}

/// ソースコードを既定の設定でトークン化
pub fn tokenize<S: AsRef<[u8]> + ?Sized>(input: &S) -> LexOutput {
    Lexer::new(input).collect_tokens()
}

/// バイト列をUTF-8として正しい部分と不正なバイト列に分けて順に渡す
pub fn for_each_utf8_chunk(mut bytes: &[u8], mut visit: impl FnMut(&str, &[u8])) {
    while !bytes.is_empty() {
        match std::str::from_utf8(bytes) {
            Ok(valid) => {
                visit(valid, &[]);
                break;
            }
            Err(e) => {
                let (valid, rest) = bytes.split_at(e.valid_up_to());
                let invalid_len = e.error_len().unwrap_or(rest.len());
                let (invalid, rest) = rest.split_at(invalid_len);
                // valid_up_to までは検証済み
                visit(std::str::from_utf8(valid).unwrap_or_default(), invalid);
                bytes = rest;
            }
        }
    }
}

/// 診断表示用のテキスト。不正なバイトは1バイトずつ`?`に置き換え、バイト位置を保つ
pub fn display_source(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    for_each_utf8_chunk(bytes, |valid, invalid| {
        text.push_str(valid);
        text.extend(invalid.iter().map(|_| '?'));
    });
    text
}

/// デバッグ用：トークンストリームを文字列として出力
pub fn format_tokens(tokens: &[TokenWithPosition]) -> String {
    tokens
        .iter()
        .map(|t| {
            format!(
                "{}:{} {:?} {}",
                t.position.line,
                t.position.column,
                t.kind(),
                t.lexeme
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
