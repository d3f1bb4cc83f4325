//! パーサーモジュール
//!
//! このモジュールはトークン列を抽象構文木（AST）に解析する責任を持ちます。
//! 文は再帰下降、式は優先順位上昇法（precedence climbing）で解析します。
//!
//! ## 曖昧な構文の扱い
//!
//! Luaでは次の3つが同じプレフィックス連鎖から始まります。
//!
//! ```lua
//! a.b[c] = 1      -- 代入（変数宣言子の並び）
//! a.b[c](1)       -- 関数呼び出し文
//! a.b[c]          -- 式だけの文（エラー）
//! ```
//!
//! パーサーはプレフィックス連鎖を一度だけ解析し、その後のトークンで分岐します。
//! `=`や`,`が続けば代入、連鎖の最後が呼び出しなら呼び出し文、それ以外は
//! `DanglingExpressionStatement`です。後戻りは行わないため、解析時間は
//! 入力長に対して線形です。
//!
//! ## エラー回復
//!
//! 文の解析に失敗すると、次の文の開始キーワードか`;`までトークンを読み飛ばして
//! 解析を続けます。`RecoveryMode::StopAtFirstError`では最初のエラーで中断します。

mod doc_comment;
mod expr;
mod expr_parser;
mod parser_impl;
pub mod precedence;
mod stmt_parser;

// 公開API
pub use doc_comment::parse_doc_block;
pub use parser_impl::Parser;

use crate::error::ParserError;
pub type ParseError = ParserError;
pub type ParseResult<T> = Result<T, ParseError>;

/// エラー発生時の振る舞い
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecoveryMode {
    /// 次の文の境界まで読み飛ばして解析を続ける
    #[default]
    Recover,
    /// 最初のエラーで解析を中断する
    StopAtFirstError,
}
