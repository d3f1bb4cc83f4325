//! トークン定義

use logos::{Lexer as LogosLexer, Logos};
use std::fmt;
use std::sync::Arc;

use super::bracket;
use super::scanner::{LuaStringScanner, StringScanner};
use crate::ast::{LuaString, Span, StringDelimiter};
use crate::error::LexerError;

/// 長括弧の水準がこの値を超えると警告する（既定値）
pub const DEFAULT_LONG_BRACKET_WARN_LEVEL: usize = 4;

/// logosのコールバックから参照する設定と副作用
#[derive(Debug, Clone)]
pub struct LexerExtras {
    /// 文字列リテラルを走査する能力
    pub scanner: Arc<dyn StringScanner>,
    pub long_bracket_warn_level: Option<usize>,
    /// 走査中に発生した警告
    pub warnings: Vec<LexerError>,
}

impl Default for LexerExtras {
    fn default() -> Self {
        Self {
            scanner: Arc::new(LuaStringScanner),
            long_bracket_warn_level: Some(DEFAULT_LONG_BRACKET_WARN_LEVEL),
            warnings: Vec::new(),
        }
    }
}

impl LexerExtras {
    fn check_level(&mut self, level: usize, span: Span) {
        if let Some(bound) = self.long_bracket_warn_level {
            if level > bound {
                self.warnings
                    .push(LexerError::LongBracketLevel { level, bound, span });
            }
        }
    }

    /// コメント本文を文字列にする。UTF-8でないバイトは置換して警告する
    fn comment_text(&mut self, bytes: &[u8], span: Span) -> String {
        match std::str::from_utf8(bytes) {
            Ok(text) => text.to_string(),
            Err(_) => {
                self.warnings.push(LexerError::InvalidUtf8 { span });
                lossy(bytes)
            }
        }
    }
}

/// 文字列トークン
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringToken {
    pub value: LuaString,
    pub delimiter: StringDelimiter,
}

/// コメントの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind {
    /// `-- text`
    Line,
    /// `--- text`（ドキュメントブロックの開始）
    Doc,
    /// `--@param ...`、`--@returns ...`
    Annotation,
    /// `--[==[ ... ]==]`
    Long { level: usize },
}

/// コメントトークン。`text`は先頭の`--`を除いた内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub kind: CommentKind,
    pub text: String,
}

/// トークンの分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Keyword,
    Identifier,
    Number,
    String,
    Operator,
    Punctuation,
    Comment,
    EndOfInput,
}

/// Luaのトークン型
#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(source = [u8])]
#[logos(skip r"[ \t\r\n\f\x0B]+")] // 空白文字（改行を含む）をスキップ
#[logos(extras = LexerExtras)]
#[logos(error = LexerError)]
pub enum Token {
    // キーワード
    #[token("and")]
    And,
    #[token("break")]
    Break,
    #[token("do")]
    Do,
    #[token("else")]
    Else,
    #[token("elseif")]
    ElseIf,
    #[token("end")]
    End,
    #[token("false")]
    False,
    #[token("for")]
    For,
    #[token("function")]
    Function,
    #[token("goto")]
    Goto,
    #[token("if")]
    If,
    #[token("in")]
    In,
    #[token("local")]
    Local,
    #[token("nil")]
    Nil,
    #[token("not")]
    Not,
    #[token("or")]
    Or,
    #[token("repeat")]
    Repeat,
    #[token("return")]
    Return,
    #[token("then")]
    Then,
    #[token("true")]
    True,
    #[token("until")]
    Until,
    #[token("while")]
    While,

    // 特別な名前
    #[token("self")]
    SelfValue,
    #[token("next")]
    Next,
    #[token("_G")]
    GlobalG,
    #[token("_VERSION")]
    Version,

    // 識別子（キーワードの後に来る必要がある）
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lossy(lex.slice()), priority = 1)]
    Identifier(String),

    // 数値リテラル（字句のまま。検査はレキサーで行う）
    #[regex(r"[0-9]", lex_number)]
    #[regex(r"\.[0-9]", lex_number)]
    Number(String),

    // 文字列リテラル（走査は注入されたスキャナーに委ねる）
    #[token("\"", lex_string)]
    #[token("'", lex_string)]
    #[regex(r"\[=*\[", lex_string)]
    String(StringToken),

    // コメント
    #[token("--", lex_comment)]
    Comment(Comment),

    // 演算子
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("//")]
    SlashSlash,
    #[token("%")]
    Percent,
    #[token("^")]
    Caret,
    #[token("#")]
    Hash,
    #[token("&")]
    Ampersand,
    #[token("~")]
    Tilde,
    #[token("|")]
    Pipe,
    #[token("<<")]
    LtLt,
    #[token(">>")]
    GtGt,
    #[token("==")]
    EqEq,
    #[token("~=")]
    NotEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("=")]
    Assign,
    #[token("..")]
    DotDot,

    // デリミタ
    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("{")]
    LeftBrace,
    #[token("}")]
    RightBrace,
    #[token("[")]
    LeftBracket,
    #[token("]")]
    RightBracket,
    #[token("::")]
    DoubleColon,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("...")]
    Ellipsis,
}

/// Luaの数値読み取りと同じく貪欲に字句を切り出す
///
/// 文法の検査は後段で行い、`3abc`のような字句も1つのトークンにする。
fn lex_number(lex: &mut LogosLexer<Token>) -> String {
    let start = lex.span().start;
    let end = numeral_end(lex.source(), start);
    lex.bump(end - lex.span().end);
    lossy(&lex.source()[start..end])
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

pub(super) fn numeral_end(bytes: &[u8], start: usize) -> usize {
    let is_hex = matches!(bytes.get(start..start + 2), Some(b"0x") | Some(b"0X"));
    let (exponent, mut i) = if is_hex {
        (b"pP", start + 2)
    } else {
        (b"eE", start)
    };

    while let Some(&b) = bytes.get(i) {
        if exponent.contains(&b) {
            i += 1;
            if matches!(bytes.get(i), Some(b'+') | Some(b'-')) {
                i += 1;
            }
        } else if b.is_ascii_hexdigit() || b == b'.' {
            i += 1;
        } else {
            break;
        }
    }
    while bytes
        .get(i)
        .is_some_and(|b| b.is_ascii_alphanumeric() || *b == b'_')
    {
        i += 1;
    }
    i
}

fn lex_string(lex: &mut LogosLexer<Token>) -> Result<StringToken, LexerError> {
    let start = lex.span().start;
    let scanner = Arc::clone(&lex.extras.scanner);

    match scanner.scan(lex.source(), start) {
        Ok(scanned) => {
            lex.bump(start + scanned.len - lex.span().end);
            if let StringDelimiter::LongBracket { level } = scanned.delimiter {
                lex.extras
                    .check_level(level, Span::new(start, start + scanned.len));
            }
            Ok(StringToken {
                value: scanned.value,
                delimiter: scanned.delimiter,
            })
        }
        Err(e) => {
            let consumed = e.span().end.max(lex.span().end);
            lex.bump(consumed - lex.span().end);
            Err(e)
        }
    }
}

fn lex_comment(lex: &mut LogosLexer<Token>) -> Result<Comment, LexerError> {
    let start = lex.span().start;
    let body_start = lex.span().end;
    let source = lex.source();

    if bracket::opening_level(source, body_start).is_some() {
        return match bracket::scan_long_bracket(source, body_start) {
            Ok(long) => {
                lex.bump(long.len);
                lex.extras
                    .check_level(long.level, Span::new(start, body_start + long.len));
                let span = Span::new(start, body_start + long.len);
                Ok(Comment {
                    kind: CommentKind::Long { level: long.level },
                    text: lex.extras.comment_text(long.content, span),
                })
            }
            Err(e) => {
                lex.bump(source.len() - body_start);
                Err(e)
            }
        };
    }

    let rest = &source[body_start..];
    let line_len = rest.iter().position(|&b| b == b'\n').unwrap_or(rest.len());
    lex.bump(line_len);
    let line = &rest[..line_len];
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    let kind = match line.first() {
        Some(b'-') => CommentKind::Doc,
        Some(b'@') => CommentKind::Annotation,
        _ => CommentKind::Line,
    };
    let text = lex
        .extras
        .comment_text(line, Span::new(start, body_start + line.len()));
    Ok(Comment { kind, text })
}

impl Token {
    pub fn kind(&self) -> TokenKind {
        match self {
            Token::And
            | Token::Break
            | Token::Do
            | Token::Else
            | Token::ElseIf
            | Token::End
            | Token::False
            | Token::For
            | Token::Function
            | Token::Goto
            | Token::If
            | Token::In
            | Token::Local
            | Token::Nil
            | Token::Not
            | Token::Or
            | Token::Repeat
            | Token::Return
            | Token::Then
            | Token::True
            | Token::Until
            | Token::While
            | Token::SelfValue
            | Token::Next
            | Token::GlobalG
            | Token::Version => TokenKind::Keyword,
            Token::Identifier(_) => TokenKind::Identifier,
            Token::Number(_) => TokenKind::Number,
            Token::String(_) => TokenKind::String,
            Token::Comment(_) => TokenKind::Comment,
            Token::Plus
            | Token::Minus
            | Token::Star
            | Token::Slash
            | Token::SlashSlash
            | Token::Percent
            | Token::Caret
            | Token::Hash
            | Token::Ampersand
            | Token::Tilde
            | Token::Pipe
            | Token::LtLt
            | Token::GtGt
            | Token::EqEq
            | Token::NotEq
            | Token::LtEq
            | Token::GtEq
            | Token::Lt
            | Token::Gt
            | Token::Assign
            | Token::DotDot
            | Token::Ellipsis => TokenKind::Operator,
            Token::LeftParen
            | Token::RightParen
            | Token::LeftBrace
            | Token::RightBrace
            | Token::LeftBracket
            | Token::RightBracket
            | Token::DoubleColon
            | Token::Semicolon
            | Token::Colon
            | Token::Comma
            | Token::Dot => TokenKind::Punctuation,
        }
    }

    /// 名前として使える字句（`.`や`:`の後ろ、`goto`のラベルなど）
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Token::Identifier(name) => Some(name),
            Token::SelfValue => Some("self"),
            Token::Next => Some("next"),
            Token::GlobalG => Some("_G"),
            Token::Version => Some("_VERSION"),
            _ => None,
        }
    }

    /// エラーメッセージ用の説明
    pub fn describe(&self) -> String {
        match self {
            Token::Identifier(name) => format!("identifier '{}'", name),
            Token::Number(raw) => format!("number '{}'", raw),
            Token::String(_) => "string literal".to_string(),
            Token::Comment(_) => "comment".to_string(),
            other => format!("'{}'", other),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::And => write!(f, "and"),
            Token::Break => write!(f, "break"),
            Token::Do => write!(f, "do"),
            Token::Else => write!(f, "else"),
            Token::ElseIf => write!(f, "elseif"),
            Token::End => write!(f, "end"),
            Token::False => write!(f, "false"),
            Token::For => write!(f, "for"),
            Token::Function => write!(f, "function"),
            Token::Goto => write!(f, "goto"),
            Token::If => write!(f, "if"),
            Token::In => write!(f, "in"),
            Token::Local => write!(f, "local"),
            Token::Nil => write!(f, "nil"),
            Token::Not => write!(f, "not"),
            Token::Or => write!(f, "or"),
            Token::Repeat => write!(f, "repeat"),
            Token::Return => write!(f, "return"),
            Token::Then => write!(f, "then"),
            Token::True => write!(f, "true"),
            Token::Until => write!(f, "until"),
            Token::While => write!(f, "while"),
            Token::SelfValue => write!(f, "self"),
            Token::Next => write!(f, "next"),
            Token::GlobalG => write!(f, "_G"),
            Token::Version => write!(f, "_VERSION"),
            Token::Identifier(s) => write!(f, "{}", s),
            Token::Number(s) => write!(f, "{}", s),
            Token::String(s) => match s.delimiter {
                StringDelimiter::DoubleQuote => write!(f, "{:?}", s.value),
                StringDelimiter::SingleQuote => write!(f, "'{}'", s.value),
                StringDelimiter::LongBracket { level } => {
                    let eq = "=".repeat(level);
                    write!(f, "[{eq}[{}]{eq}]", s.value)
                }
            },
            Token::Comment(c) => match c.kind {
                CommentKind::Long { level } => {
                    let eq = "=".repeat(level);
                    write!(f, "--[{eq}[{}]{eq}]", c.text)
                }
                _ => write!(f, "--{}", c.text),
            },
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::SlashSlash => write!(f, "//"),
            Token::Percent => write!(f, "%"),
            Token::Caret => write!(f, "^"),
            Token::Hash => write!(f, "#"),
            Token::Ampersand => write!(f, "&"),
            Token::Tilde => write!(f, "~"),
            Token::Pipe => write!(f, "|"),
            Token::LtLt => write!(f, "<<"),
            Token::GtGt => write!(f, ">>"),
            Token::EqEq => write!(f, "=="),
            Token::NotEq => write!(f, "~="),
            Token::LtEq => write!(f, "<="),
            Token::GtEq => write!(f, ">="),
            Token::Lt => write!(f, "<"),
            Token::Gt => write!(f, ">"),
            Token::Assign => write!(f, "="),
            Token::DotDot => write!(f, ".."),
            Token::Ellipsis => write!(f, "..."),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::LeftBrace => write!(f, "{{"),
            Token::RightBrace => write!(f, "}}"),
            Token::LeftBracket => write!(f, "["),
            Token::RightBracket => write!(f, "]"),
            Token::DoubleColon => write!(f, "::"),
            Token::Semicolon => write!(f, ";"),
            Token::Colon => write!(f, ":"),
            Token::Comma => write!(f, ","),
            Token::Dot => write!(f, "."),
        }
    }
}
