//! 文の定義

use serde::{Deserialize, Serialize};

use super::{CallExpr, Expression, FunctionBody, Identifier, NodeId, Span};

/// 文
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    VariableDeclaration(VariableDeclaration),
    LocalVariableDeclaration(LocalVariableDeclaration),
    Do(DoStatement),
    If(IfStatement),
    While(WhileStatement),
    Repeat(RepeatStatement),
    For(ForStatement),
    ForIn(ForInStatement),
    Goto(GotoStatement),
    Break(Span),
    Label(LabelStatement),
    Function(FunctionStatement),
    LocalFunction(LocalFunctionStatement),
    FunctionCall(CallExpr),
}

impl Statement {
    pub fn span(&self) -> Span {
        match self {
            Statement::VariableDeclaration(s) => s.span,
            Statement::LocalVariableDeclaration(s) => s.span,
            Statement::Do(s) => s.span,
            Statement::If(s) => s.span,
            Statement::While(s) => s.span,
            Statement::Repeat(s) => s.span,
            Statement::For(s) => s.span,
            Statement::ForIn(s) => s.span,
            Statement::Goto(s) => s.span,
            Statement::Break(span) => *span,
            Statement::Label(s) => s.span,
            Statement::Function(s) => s.span,
            Statement::LocalFunction(s) => s.span,
            Statement::FunctionCall(s) => s.span,
        }
    }

    /// ドキュメントコメントを付与できる宣言ならそのID
    pub fn declaration_id(&self) -> Option<NodeId> {
        match self {
            Statement::VariableDeclaration(s) => Some(s.id),
            Statement::LocalVariableDeclaration(s) => Some(s.id),
            Statement::Function(s) => Some(s.id),
            Statement::LocalFunction(s) => Some(s.id),
            _ => None,
        }
    }
}

/// 代入文 `a, b.c, d[e] = x, y, z`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDeclaration {
    pub id: NodeId,
    pub targets: Vec<Expression>,
    pub values: Vec<Expression>,
    pub span: Span,
}

/// `local a, b = x, y`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalVariableDeclaration {
    pub id: NodeId,
    pub names: Vec<Identifier>,
    pub values: Vec<Expression>,
    pub span: Span,
}

/// `do ... end`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoStatement {
    pub body: Block,
    pub span: Span,
}

/// if文
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfStatement {
    pub condition: Expression,
    pub then_block: Block,
    pub elseif_clauses: Vec<ElseIfClause>,
    pub else_block: Option<Block>,
    pub span: Span,
}

/// elseif節
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElseIfClause {
    pub condition: Expression,
    pub block: Block,
    pub span: Span,
}

/// while文
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhileStatement {
    pub condition: Expression,
    pub body: Block,
    pub span: Span,
}

/// `repeat ... until cond`
///
/// 条件式は本体のスコープ内で評価される。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepeatStatement {
    pub body: Block,
    pub condition: Expression,
    pub span: Span,
}

/// 数値for文 `for i = start, stop[, step] do ... end`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForStatement {
    pub variable: Identifier,
    pub start: Expression,
    pub stop: Expression,
    pub step: Option<Expression>,
    pub body: Block,
    pub span: Span,
}

/// 汎用for文 `for k, v in exprs do ... end`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForInStatement {
    pub names: Vec<Identifier>,
    pub expressions: Vec<Expression>,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GotoStatement {
    pub label: Identifier,
    pub span: Span,
}

/// `::name::`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelStatement {
    pub name: Identifier,
    pub span: Span,
}

/// `function a.b.c:m(...) ... end`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionStatement {
    pub id: NodeId,
    pub name: FunctionName,
    pub body: FunctionBody,
    pub span: Span,
}

/// 関数名。`path`は少なくとも1要素
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionName {
    pub path: Vec<Identifier>,
    pub method: Option<Identifier>,
    pub span: Span,
}

impl FunctionName {
    /// `a.b.c:m` 形式の文字列
    pub fn qualified(&self) -> String {
        let mut name = self
            .path
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join(".");
        if let Some(method) = &self.method {
            name.push(':');
            name.push_str(&method.name);
        }
        name
    }
}

/// `local function f(...) ... end`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalFunctionStatement {
    pub id: NodeId,
    pub name: Identifier,
    pub body: FunctionBody,
    pub span: Span,
}

/// return文。ブロックの最後にのみ現れる
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnStatement {
    pub values: Vec<Expression>,
    pub span: Span,
}

/// ブロック
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub return_statement: Option<ReturnStatement>,
    pub span: Span,
}

impl Block {
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty() && self.return_statement.is_none()
    }
}
