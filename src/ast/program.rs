//! プログラム構造

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{NodeId, ReturnStatement, Span, Statement};

/// ASTのルートノード（1つのLuaチャンク）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub statements: Vec<Statement>,
    pub return_statement: Option<ReturnStatement>,
    /// 宣言ノードIDからドキュメントコメントへの対応
    pub docs: IndexMap<NodeId, DocComment>,
    pub span: Span,
}

impl Program {
    /// 宣言に付与されたドキュメントコメントを取得
    pub fn doc_for(&self, id: NodeId) -> Option<&DocComment> {
        self.docs.get(&id)
    }

    /// 文に付与されたドキュメントコメントを取得
    pub fn doc_for_statement(&self, statement: &Statement) -> Option<&DocComment> {
        statement.declaration_id().and_then(|id| self.doc_for(id))
    }
}

/// `---` で始まる構造化ドキュメントコメント
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocComment {
    pub summary: String,
    pub params: Vec<ParamDoc>,
    pub returns: Option<String>,
    pub span: Span,
}

/// `--@param name: description`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamDoc {
    pub name: String,
    pub description: String,
}
