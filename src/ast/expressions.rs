//! 式の定義

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

use super::{Block, Span};

/// 式
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    Nil(Span),
    True(Span),
    False(Span),
    /// `...`
    Spread(Span),
    /// `self`
    SelfValue(Span),
    /// `next`
    Next(Span),
    GlobalVariable(GlobalVariable),
    Identifier(Identifier),
    Number(NumberLiteral),
    String(StringLiteral),
    Binary(BinaryExpr),
    Unary(UnaryExpr),
    Function(FunctionDefinition),
    Table(TableConstructor),
    Field(FieldExpr),
    Index(IndexExpr),
    Call(CallExpr),
    Parenthesized(ParenExpr),
}

impl Expression {
    pub fn span(&self) -> Span {
        match self {
            Expression::Nil(span)
            | Expression::True(span)
            | Expression::False(span)
            | Expression::Spread(span)
            | Expression::SelfValue(span)
            | Expression::Next(span) => *span,
            Expression::GlobalVariable(g) => g.span,
            Expression::Identifier(id) => id.span,
            Expression::Number(n) => n.span,
            Expression::String(s) => s.span,
            Expression::Binary(b) => b.span,
            Expression::Unary(u) => u.span,
            Expression::Function(f) => f.span,
            Expression::Table(t) => t.span,
            Expression::Field(f) => f.span,
            Expression::Index(i) => i.span,
            Expression::Call(c) => c.span,
            Expression::Parenthesized(p) => p.span,
        }
    }

    /// 代入の左辺になれる形か（識別子・フィールド・インデックス）
    pub fn is_variable_declarator(&self) -> bool {
        matches!(
            self,
            Expression::Identifier(_) | Expression::Field(_) | Expression::Index(_)
        )
    }
}

/// 識別子
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

impl Identifier {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// `_G` と `_VERSION`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GlobalName {
    G,
    Version,
}

impl GlobalName {
    pub fn as_str(&self) -> &'static str {
        match self {
            GlobalName::G => "_G",
            GlobalName::Version => "_VERSION",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalVariable {
    pub name: GlobalName,
    pub span: Span,
}

/// 数値リテラル（字句のまま保持）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberLiteral {
    pub raw: String,
    pub span: Span,
}

impl NumberLiteral {
    /// 数値として評価する。不正なリテラルは`None`
    pub fn value(&self) -> Option<NumberValue> {
        crate::lexer::literal_parser::number_value(&self.raw)
    }
}

/// 数値リテラルの値
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum NumberValue {
    Integer(i64),
    Float(f64),
}

/// 文字列の区切り
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StringDelimiter {
    DoubleQuote,
    SingleQuote,
    LongBracket { level: usize },
}

/// Luaの文字列値
///
/// Luaの文字列は任意のバイト列なので、UTF-8として不正なバイトもそのまま保持する。
/// シリアライズでは、UTF-8として正しければ文字列、そうでなければバイト配列になる。
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "LuaStringRepr", into = "LuaStringRepr")]
pub struct LuaString(Vec<u8>);

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum LuaStringRepr {
    Text(String),
    Bytes(Vec<u8>),
}

impl From<LuaStringRepr> for LuaString {
    fn from(repr: LuaStringRepr) -> Self {
        match repr {
            LuaStringRepr::Text(text) => LuaString(text.into_bytes()),
            LuaStringRepr::Bytes(bytes) => LuaString(bytes),
        }
    }
}

impl From<LuaString> for LuaStringRepr {
    fn from(string: LuaString) -> Self {
        match String::from_utf8(string.0) {
            Ok(text) => LuaStringRepr::Text(text),
            Err(e) => LuaStringRepr::Bytes(e.into_bytes()),
        }
    }
}

impl LuaString {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        LuaString(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// UTF-8として正しければ文字列として返す
    pub fn to_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }

    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for LuaString {
    fn from(text: &str) -> Self {
        LuaString(text.as_bytes().to_vec())
    }
}

impl From<String> for LuaString {
    fn from(text: String) -> Self {
        LuaString(text.into_bytes())
    }
}

impl From<&[u8]> for LuaString {
    fn from(bytes: &[u8]) -> Self {
        LuaString(bytes.to_vec())
    }
}

impl From<Vec<u8>> for LuaString {
    fn from(bytes: Vec<u8>) -> Self {
        LuaString(bytes)
    }
}

impl PartialEq<str> for LuaString {
    fn eq(&self, other: &str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl PartialEq<&str> for LuaString {
    fn eq(&self, other: &&str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl fmt::Debug for LuaString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_str() {
            Some(text) => fmt::Debug::fmt(text, f),
            None => write!(f, "b\"{}\"", self.0.escape_ascii()),
        }
    }
}

impl fmt::Display for LuaString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

/// 文字列リテラル
///
/// `value`はエスケープ処理後の内容（長括弧文字列ではそのまま）、
/// `raw`は区切りを含むソース上の字句。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringLiteral {
    pub value: LuaString,
    pub raw: String,
    pub delimiter: StringDelimiter,
    pub span: Span,
}

/// 二項演算子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Or,
    And,
    Lt,
    Le,
    Eq,
    Ne,
    Ge,
    Gt,
    BitOr,
    BitXor,
    BitAnd,
    Shl,
    Shr,
    Concat,
    Add,
    Subtract,
    Multiply,
    Divide,
    FloorDivide,
    Modulo,
    Power,
}

impl BinaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Or => "or",
            BinaryOp::And => "and",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "~=",
            BinaryOp::Ge => ">=",
            BinaryOp::Gt => ">",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "~",
            BinaryOp::BitAnd => "&",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::Concat => "..",
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::FloorDivide => "//",
            BinaryOp::Modulo => "%",
            BinaryOp::Power => "^",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 単項演算子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    Not,
    Length,
    Negate,
    BitNot,
}

impl UnaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Not => "not",
            UnaryOp::Length => "#",
            UnaryOp::Negate => "-",
            UnaryOp::BitNot => "~",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 二項演算式
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryExpr {
    pub left: Box<Expression>,
    pub op: BinaryOp,
    pub right: Box<Expression>,
    pub span: Span,
}

/// 単項演算式
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub operand: Box<Expression>,
    pub span: Span,
}

/// 無名関数 `function (...) ... end`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub body: FunctionBody,
    pub span: Span,
}

/// 関数本体（仮引数とブロック）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionBody {
    pub parameters: Vec<Parameter>,
    pub block: Block,
    pub span: Span,
}

impl FunctionBody {
    pub fn is_variadic(&self) -> bool {
        matches!(self.parameters.last(), Some(Parameter::Spread(_)))
    }
}

/// 仮引数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Parameter {
    /// 先頭にのみ現れる`self`
    SelfParam(Span),
    Name(Identifier),
    /// 末尾にのみ現れる`...`
    Spread(Span),
}

/// テーブルコンストラクタ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableConstructor {
    pub fields: Vec<Field>,
    pub span: Span,
}

/// テーブルのフィールド（宣言順を保持）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Field {
    /// `[key] = value`
    Bracketed {
        key: Expression,
        value: Expression,
        span: Span,
    },
    /// `name = value`
    Named {
        name: Identifier,
        value: Expression,
        span: Span,
    },
    /// `value`
    Positional(Expression),
}

impl Field {
    pub fn span(&self) -> Span {
        match self {
            Field::Bracketed { span, .. } | Field::Named { span, .. } => *span,
            Field::Positional(expr) => expr.span(),
        }
    }
}

/// フィールドアクセス `object.property`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldExpr {
    pub object: Box<Expression>,
    pub property: Identifier,
    pub span: Span,
}

/// インデックスアクセス `object[index]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexExpr {
    pub object: Box<Expression>,
    pub index: Box<Expression>,
    pub span: Span,
}

/// 関数呼び出し。`method`があれば`callee:method(args)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallExpr {
    pub callee: Box<Expression>,
    pub method: Option<Identifier>,
    pub args: CallArgs,
    pub span: Span,
}

/// 呼び出しの引数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CallArgs {
    List(Vec<Expression>),
    Table(TableConstructor),
    String(StringLiteral),
}

/// 括弧で囲まれた式
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParenExpr {
    pub inner: Box<Expression>,
    pub span: Span,
}
