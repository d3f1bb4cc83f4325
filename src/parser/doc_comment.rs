//! ドキュメントコメントの解析
//!
//! 宣言の直前の行で終わる連続したコメント行のうち、`---`で始まる行から
//! 後ろをドキュメントブロックとして扱う。
//!
//! ```lua
//! ---Adds two numbers.
//! --@param a: first operand
//! --@param b: second operand
//! --@returns the sum
//! local function add(a, b) return a + b end
//! ```
//!
//! 通常の`--`コメントや長いコメント、空行はブロックを途切れさせる。

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, char, multispace0},
    combinator::{recognize, rest},
    multi::many0_count,
    sequence::{delimited, pair, preceded, separated_pair},
    IResult,
};

use crate::ast::{DocComment, ParamDoc, Span};
use crate::error::ParserError;
use crate::lexer::{Comment, CommentKind, Token, TokenWithPosition};

/// 注釈行 `--@tag ...` の解析結果
#[derive(Debug, PartialEq)]
enum Annotation<'a> {
    Param { name: &'a str, description: &'a str },
    Returns(&'a str),
    Unknown,
}

fn name(input: &str) -> IResult<&str, &str> {
    alt((
        tag("..."),
        recognize(pair(
            alt((alpha1, tag("_"))),
            many0_count(alt((alphanumeric1, tag("_")))),
        )),
    ))(input)
}

fn param_body(input: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(
        preceded(multispace0, name),
        delimited(multispace0, char(':'), multispace0),
        rest,
    )(input)
}

fn annotation_tag(input: &str) -> IResult<&str, &str> {
    preceded(char('@'), alphanumeric1)(input)
}

/// `@param`の形が崩れていれば`None`
fn parse_annotation(text: &str) -> Option<Annotation<'_>> {
    let Ok((body, tag)) = annotation_tag(text) else {
        return Some(Annotation::Unknown);
    };
    match tag {
        "param" => match param_body(body) {
            Ok((_, (name, description))) => Some(Annotation::Param {
                name,
                description: description.trim(),
            }),
            Err(_) => None,
        },
        "returns" | "return" => Some(Annotation::Returns(body.trim())),
        _ => Some(Annotation::Unknown),
    }
}

fn comment_of(token: &TokenWithPosition) -> Option<&Comment> {
    match &token.token {
        Token::Comment(comment) => Some(comment),
        _ => None,
    }
}

/// 宣言の直前にあるドキュメントブロックを解析
///
/// `comments`は宣言より前のコメントトークン（ソース順）、`declaration_line`は
/// 宣言の先頭行。崩れた`--@param`行は無視し、警告として返す。
pub fn parse_doc_block(
    comments: &[TokenWithPosition],
    declaration_line: usize,
) -> (Option<DocComment>, Vec<ParserError>) {
    // 宣言の直前の行から上に向かって、連続する`---`/`--@`行を集める
    let mut first = comments.len();
    let mut expected_line = declaration_line;
    while first > 0 {
        let token = &comments[first - 1];
        let continues = comment_of(token)
            .is_some_and(|c| matches!(c.kind, CommentKind::Doc | CommentKind::Annotation));
        if !continues || token.position.line + 1 != expected_line {
            break;
        }
        expected_line = token.position.line;
        first -= 1;
    }

    let run = &comments[first..];
    let Some(opener) = run
        .iter()
        .position(|t| comment_of(t).is_some_and(|c| c.kind == CommentKind::Doc))
    else {
        return (None, Vec::new());
    };
    let block = &run[opener..];

    let mut summary = Vec::new();
    let mut params = Vec::new();
    let mut returns: Option<String> = None;
    let mut warnings = Vec::new();

    for token in block {
        let Some(comment) = comment_of(token) else {
            continue;
        };
        match comment.kind {
            CommentKind::Doc => {
                let text = comment.text.strip_prefix('-').unwrap_or(&comment.text);
                summary.push(text.trim());
            }
            CommentKind::Annotation => match parse_annotation(&comment.text) {
                Some(Annotation::Param { name, description }) => params.push(ParamDoc {
                    name: name.to_string(),
                    description: description.to_string(),
                }),
                Some(Annotation::Returns(description)) => {
                    returns = Some(match returns {
                        Some(previous) => format!("{}\n{}", previous, description),
                        None => description.to_string(),
                    });
                }
                Some(Annotation::Unknown) => {}
                None => warnings.push(ParserError::MalformedDocComment {
                    message: "expected '--@param name: description'".to_string(),
                    span: token.span.clone().into(),
                }),
            },
            _ => {}
        }
    }

    let start = block[0].span.start;
    let end = block[block.len() - 1].span.end;
    let doc = DocComment {
        summary: summary.join("\n").trim().to_string(),
        params,
        returns,
        span: Span::new(start, end),
    };
    (Some(doc), warnings)
}
