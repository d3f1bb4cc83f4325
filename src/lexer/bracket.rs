//! 長括弧リテラル（`[==[ ... ]==]`）の走査
//!
//! 開き括弧の`=`の数（水準）と同じ水準の閉じ括弧までを読む。
//! 正規言語では表現できないため、水準を数えながら明示的に走査する。
//! 水準に上限はない。

use crate::ast::Span;
use crate::error::LexerError;

/// 走査した長括弧リテラル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LongBracket<'a> {
    pub level: usize,
    /// 括弧の内側（先頭の改行は除く）。バイト列をそのまま返す
    pub content: &'a [u8],
    /// 開き括弧の先頭から閉じ括弧の末尾までのバイト数
    pub len: usize,
}

/// `start`の位置から`[` `=`* `[`が始まっていれば、その水準を返す
pub fn opening_level(bytes: &[u8], start: usize) -> Option<usize> {
    if bytes.get(start) != Some(&b'[') {
        return None;
    }
    let mut i = start + 1;
    while bytes.get(i) == Some(&b'=') {
        i += 1;
    }
    (bytes.get(i) == Some(&b'[')).then(|| i - start - 1)
}

/// `start`（最初の`[`）から長括弧リテラルを走査する
pub fn scan_long_bracket(bytes: &[u8], start: usize) -> Result<LongBracket<'_>, LexerError> {
    let level = opening_level(bytes, start).ok_or_else(|| LexerError::UnrecognizedToken {
        token: "[".to_string(),
        span: Span::new(start, start + 1),
    })?;

    let mut content_start = start + level + 2;
    content_start += leading_newline_len(&bytes[content_start..]);

    let mut i = content_start;
    while i < bytes.len() {
        if bytes[i] == b']' {
            if let Some(close_len) = closing_len(&bytes[i..], level) {
                return Ok(LongBracket {
                    level,
                    content: &bytes[content_start..i],
                    len: i + close_len - start,
                });
            }
        }
        i += 1;
    }

    Err(LexerError::UnterminatedLongBracket {
        level,
        span: Span::new(start, bytes.len()),
    })
}

/// 開き括弧の直後の改行（`\n`、`\r`、`\r\n`、`\n\r`）の長さ
fn leading_newline_len(rest: &[u8]) -> usize {
    match rest {
        [b'\r', b'\n', ..] | [b'\n', b'\r', ..] => 2,
        [b'\n', ..] | [b'\r', ..] => 1,
        _ => 0,
    }
}

/// `rest`が`]` `=`{level} `]`で始まっていればその長さ
fn closing_len(rest: &[u8], level: usize) -> Option<usize> {
    let equals = rest[1..].iter().take_while(|&&b| b == b'=').count();
    (equals == level && rest.get(level + 1) == Some(&b']')).then_some(level + 2)
}
