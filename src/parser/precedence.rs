//! 演算子の優先順位表
//!
//! 数値が大きいほど強く結合する。単項演算子はべき乗以外のすべての二項演算子より
//! 強く、べき乗より弱い。そのため `-2^2` は `-(2^2)` になる。

use crate::ast::{BinaryOp, UnaryOp};
use crate::lexer::Token;

/// 結合性
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    Left,
    Right,
}

/// 優先順位表に載る演算子
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Binary(BinaryOp),
    Unary(UnaryOp),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrecedenceEntry {
    pub operator: Operator,
    pub rank: u8,
    pub associativity: Associativity,
}

/// 式全体を解析するときの最小優先順位
pub const MIN_RANK: u8 = 1;

/// 単項演算子の優先順位
pub const UNARY_RANK: u8 = 13;

const fn binary(op: BinaryOp, rank: u8, associativity: Associativity) -> PrecedenceEntry {
    PrecedenceEntry {
        operator: Operator::Binary(op),
        rank,
        associativity,
    }
}

const fn unary(op: UnaryOp) -> PrecedenceEntry {
    PrecedenceEntry {
        operator: Operator::Unary(op),
        rank: UNARY_RANK,
        associativity: Associativity::Left,
    }
}

use Associativity::{Left, Right};

pub const PRECEDENCE_TABLE: [PrecedenceEntry; 25] = [
    binary(BinaryOp::Or, 3, Left),
    binary(BinaryOp::And, 4, Left),
    binary(BinaryOp::Lt, 5, Left),
    binary(BinaryOp::Le, 5, Left),
    binary(BinaryOp::Eq, 5, Left),
    binary(BinaryOp::Ne, 5, Left),
    binary(BinaryOp::Ge, 5, Left),
    binary(BinaryOp::Gt, 5, Left),
    binary(BinaryOp::BitOr, 6, Left),
    binary(BinaryOp::BitXor, 7, Left),
    binary(BinaryOp::BitAnd, 8, Left),
    binary(BinaryOp::Shl, 9, Left),
    binary(BinaryOp::Shr, 9, Left),
    binary(BinaryOp::Concat, 10, Right),
    binary(BinaryOp::Add, 11, Left),
    binary(BinaryOp::Subtract, 11, Left),
    binary(BinaryOp::Multiply, 12, Left),
    binary(BinaryOp::Divide, 12, Left),
    binary(BinaryOp::FloorDivide, 12, Left),
    binary(BinaryOp::Modulo, 12, Left),
    unary(UnaryOp::Not),
    unary(UnaryOp::Length),
    unary(UnaryOp::Negate),
    unary(UnaryOp::BitNot),
    binary(BinaryOp::Power, 14, Right),
];

/// 表から演算子の項目を引く
fn lookup(operator: Operator) -> Option<PrecedenceEntry> {
    PRECEDENCE_TABLE
        .iter()
        .find(|entry| entry.operator == operator)
        .copied()
}

/// 二項演算子の優先順位を取得
pub fn binary_precedence(op: BinaryOp) -> Option<PrecedenceEntry> {
    lookup(Operator::Binary(op))
}

pub fn unary_precedence(op: UnaryOp) -> Option<PrecedenceEntry> {
    lookup(Operator::Unary(op))
}

/// 二項演算子の位置にあるトークンを演算子に変換
pub fn binary_operator(token: &Token) -> Option<BinaryOp> {
    let op = match token {
        Token::Or => BinaryOp::Or,
        Token::And => BinaryOp::And,
        Token::Lt => BinaryOp::Lt,
        Token::LtEq => BinaryOp::Le,
        Token::EqEq => BinaryOp::Eq,
        Token::NotEq => BinaryOp::Ne,
        Token::GtEq => BinaryOp::Ge,
        Token::Gt => BinaryOp::Gt,
        Token::Pipe => BinaryOp::BitOr,
        Token::Tilde => BinaryOp::BitXor,
        Token::Ampersand => BinaryOp::BitAnd,
        Token::LtLt => BinaryOp::Shl,
        Token::GtGt => BinaryOp::Shr,
        Token::DotDot => BinaryOp::Concat,
        Token::Plus => BinaryOp::Add,
        Token::Minus => BinaryOp::Subtract,
        Token::Star => BinaryOp::Multiply,
        Token::Slash => BinaryOp::Divide,
        Token::SlashSlash => BinaryOp::FloorDivide,
        Token::Percent => BinaryOp::Modulo,
        Token::Caret => BinaryOp::Power,
        _ => return None,
    };
    Some(op)
}

/// 単項演算子の位置にあるトークンを演算子に変換
pub fn unary_operator(token: &Token) -> Option<UnaryOp> {
    match token {
        Token::Not => Some(UnaryOp::Not),
        Token::Hash => Some(UnaryOp::Length),
        Token::Minus => Some(UnaryOp::Negate),
        Token::Tilde => Some(UnaryOp::BitNot),
        _ => None,
    }
}
