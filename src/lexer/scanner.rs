//! 文字列トークンの走査
//!
//! 文字列リテラルの生成は差し替え可能な能力として`StringScanner`で抽象化する。
//! レキサーは開き区切り（`"`、`'`、`[=*[`）を見つけると、注入された
//! スキャナーに走査を委ねる。文や式の構文解析はこの差し替えの影響を受けない。

use std::fmt;

use super::bracket;
use super::literal_parser::{is_lua_space, unescape_string};
use crate::ast::{LuaString, Span, StringDelimiter};
use crate::error::LexerError;

/// 走査済みの文字列
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedString {
    /// エスケープ処理後の内容
    pub value: LuaString,
    pub delimiter: StringDelimiter,
    /// 開き区切りの先頭から消費したバイト数
    pub len: usize,
}

/// 文字列リテラルを走査する能力
pub trait StringScanner: fmt::Debug + Send + Sync {
    /// `source`はソース全体のバイト列、`start`は開き区切りの位置。
    /// 失敗時のエラーのスパンは消費した範囲を表す
    fn scan(&self, source: &[u8], start: usize) -> Result<ScannedString, LexerError>;
}

/// Luaの文字列規則に従う既定のスキャナー
#[derive(Debug, Default, Clone, Copy)]
pub struct LuaStringScanner;

impl StringScanner for LuaStringScanner {
    fn scan(&self, source: &[u8], start: usize) -> Result<ScannedString, LexerError> {
        match source.get(start) {
            Some(b'"') => scan_short(source, start, b'"', StringDelimiter::DoubleQuote),
            Some(b'\'') => scan_short(source, start, b'\'', StringDelimiter::SingleQuote),
            Some(b'[') => {
                let long = bracket::scan_long_bracket(source, start)?;
                Ok(ScannedString {
                    value: LuaString::from(long.content),
                    delimiter: StringDelimiter::LongBracket { level: long.level },
                    len: long.len,
                })
            }
            _ => Err(LexerError::UnrecognizedToken {
                token: source
                    .get(start..start + 1)
                    .map(|b| String::from_utf8_lossy(b).into_owned())
                    .unwrap_or_default(),
                span: Span::new(start, start + 1),
            }),
        }
    }
}

/// 引用符で囲まれた文字列を走査。エスケープされていない改行は未終了とみなす
fn scan_short(
    bytes: &[u8],
    start: usize,
    quote: u8,
    delimiter: StringDelimiter,
) -> Result<ScannedString, LexerError> {
    let mut i = start + 1;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' if bytes.get(i + 1) == Some(&b'z') => {
                // `\z` は改行を含む後続の空白を読み飛ばす
                i += 2;
                while bytes.get(i).copied().is_some_and(is_lua_space) {
                    i += 1;
                }
            }
            b'\\' => {
                // `\` の直後の1バイトは終端判定の対象外（\r\n は2バイト）
                i += if bytes.get(i + 1) == Some(&b'\r') && bytes.get(i + 2) == Some(&b'\n') {
                    3
                } else {
                    2
                };
            }
            b'\n' | b'\r' => break,
            b if b == quote => {
                return Ok(ScannedString {
                    value: LuaString::new(unescape_string(&bytes[start + 1..i])),
                    delimiter,
                    len: i + 1 - start,
                });
            }
            _ => i += 1,
        }
    }

    Err(LexerError::UnterminatedString {
        span: Span::new(start, i.min(bytes.len())),
    })
}
