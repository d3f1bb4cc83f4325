//! ASTからLuaソースへの逆変換
//!
//! 出力は正規化された形（4スペースのインデント、演算子の前後に空白）で、
//! 再び解析すると元のASTと同じ構造になる。括弧は元のソースにあった
//! `Parenthesized`ノードのほか、手で組み立てたASTで優先順位が
//! 足りない場合にだけ補う。

use crate::ast::*;
use crate::lexer::for_each_utf8_chunk;
use crate::parser::precedence::{
    binary_precedence, Associativity, PrecedenceEntry, MIN_RANK, UNARY_RANK,
};

const INDENT: &str = "    ";

/// プログラム全体を出力
pub fn print_program(program: &Program) -> String {
    let mut printer = Printer::new(Some(program));
    printer.statements(&program.statements, program.return_statement.as_ref());
    printer.out
}

/// 単一の式を出力
pub fn print_expression(expr: &Expression) -> String {
    Printer::new(None).expression(expr)
}

struct Printer<'a> {
    out: String,
    indent: usize,
    program: Option<&'a Program>,
}

impl<'a> Printer<'a> {
    fn new(program: Option<&'a Program>) -> Self {
        Self {
            out: String::new(),
            indent: 0,
            program,
        }
    }

    fn nested(&self) -> Printer<'a> {
        Printer {
            out: String::new(),
            indent: self.indent + 1,
            program: self.program,
        }
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn statements(&mut self, statements: &[Statement], ret: Option<&ReturnStatement>) {
        for statement in statements {
            self.statement(statement);
        }
        if let Some(ret) = ret {
            let text = if ret.values.is_empty() {
                "return".to_string()
            } else {
                format!("return {}", self.expression_list(&ret.values))
            };
            self.line(&text);
        }
    }

    fn block(&mut self, block: &Block) {
        let mut inner = self.nested();
        inner.statements(&block.statements, block.return_statement.as_ref());
        self.out.push_str(&inner.out);
    }

    fn doc_comment(&mut self, statement: &Statement) {
        let Some(doc) = self.program.and_then(|p| p.doc_for_statement(statement)) else {
            return;
        };
        for summary in doc.summary.split('\n') {
            self.line(&format!("---{}", summary));
        }
        for param in &doc.params {
            self.line(&format!("--@param {}: {}", param.name, param.description));
        }
        if let Some(returns) = &doc.returns {
            for line in returns.split('\n') {
                self.line(&format!("--@returns {}", line));
            }
        }
    }

    fn statement(&mut self, statement: &Statement) {
        self.doc_comment(statement);

        match statement {
            Statement::VariableDeclaration(decl) => {
                let text = format!(
                    "{} = {}",
                    self.expression_list(&decl.targets),
                    self.expression_list(&decl.values)
                );
                self.expression_line(&text);
            }
            Statement::LocalVariableDeclaration(decl) => {
                let names = names(&decl.names);
                if decl.values.is_empty() {
                    self.line(&format!("local {}", names));
                } else {
                    let text = format!("local {} = {}", names, self.expression_list(&decl.values));
                    self.line(&text);
                }
            }
            Statement::Do(stmt) => {
                self.line("do");
                self.block(&stmt.body);
                self.line("end");
            }
            Statement::If(stmt) => {
                let text = format!("if {} then", self.expression(&stmt.condition));
                self.line(&text);
                self.block(&stmt.then_block);
                for clause in &stmt.elseif_clauses {
                    let text = format!("elseif {} then", self.expression(&clause.condition));
                    self.line(&text);
                    self.block(&clause.block);
                }
                if let Some(else_block) = &stmt.else_block {
                    self.line("else");
                    self.block(else_block);
                }
                self.line("end");
            }
            Statement::While(stmt) => {
                let text = format!("while {} do", self.expression(&stmt.condition));
                self.line(&text);
                self.block(&stmt.body);
                self.line("end");
            }
            Statement::Repeat(stmt) => {
                self.line("repeat");
                self.block(&stmt.body);
                let text = format!("until {}", self.expression(&stmt.condition));
                self.line(&text);
            }
            Statement::For(stmt) => {
                let mut header = format!(
                    "for {} = {}, {}",
                    stmt.variable.name,
                    self.expression(&stmt.start),
                    self.expression(&stmt.stop)
                );
                if let Some(step) = &stmt.step {
                    header.push_str(", ");
                    header.push_str(&self.expression(step));
                }
                header.push_str(" do");
                self.line(&header);
                self.block(&stmt.body);
                self.line("end");
            }
            Statement::ForIn(stmt) => {
                let text = format!(
                    "for {} in {} do",
                    names(&stmt.names),
                    self.expression_list(&stmt.expressions)
                );
                self.line(&text);
                self.block(&stmt.body);
                self.line("end");
            }
            Statement::Goto(stmt) => self.line(&format!("goto {}", stmt.label.name)),
            Statement::Break(_) => self.line("break"),
            Statement::Label(stmt) => self.line(&format!("::{}::", stmt.name.name)),
            Statement::Function(stmt) => {
                let header = format!("function {}", stmt.name.qualified());
                self.function(&header, &stmt.body);
            }
            Statement::LocalFunction(stmt) => {
                let header = format!("local function {}", stmt.name.name);
                self.function(&header, &stmt.body);
            }
            Statement::FunctionCall(call) => {
                let text = self.call(call);
                self.expression_line(&text);
            }
        }
    }

    /// `(`で始まる文は直前の文の呼び出しと解釈されるので`;`を前置する
    fn expression_line(&mut self, text: &str) {
        if text.starts_with('(') {
            self.line(&format!(";{}", text));
        } else {
            self.line(text);
        }
    }

    fn function(&mut self, header: &str, body: &FunctionBody) {
        let text = self.function_text(header, body);
        for _ in 0..self.indent {
            self.out.push_str(INDENT);
        }
        self.out.push_str(&text);
        self.out.push('\n');
    }

    /// 関数の見出しと本体。本体は現在のインデントより1段深く出力する
    fn function_text(&self, header: &str, body: &FunctionBody) -> String {
        let params = body
            .parameters
            .iter()
            .map(|p| match p {
                Parameter::SelfParam(_) => "self",
                Parameter::Name(ident) => ident.name.as_str(),
                Parameter::Spread(_) => "...",
            })
            .collect::<Vec<_>>()
            .join(", ");

        if body.block.is_empty() {
            return format!("{}({}) end", header, params);
        }

        let mut inner = self.nested();
        inner.statements(&body.block.statements, body.block.return_statement.as_ref());
        let closing = INDENT.repeat(self.indent);
        format!("{}({})\n{}{}end", header, params, inner.out, closing)
    }

    fn expression_list(&self, expressions: &[Expression]) -> String {
        expressions
            .iter()
            .map(|e| self.expression(e))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn expression(&self, expr: &Expression) -> String {
        match expr {
            Expression::Nil(_) => "nil".to_string(),
            Expression::True(_) => "true".to_string(),
            Expression::False(_) => "false".to_string(),
            Expression::Spread(_) => "...".to_string(),
            Expression::SelfValue(_) => "self".to_string(),
            Expression::Next(_) => "next".to_string(),
            Expression::GlobalVariable(global) => global.name.as_str().to_string(),
            Expression::Identifier(ident) => ident.name.clone(),
            Expression::Number(number) => number.raw.clone(),
            Expression::String(string) => string_text(string),
            Expression::Binary(binary) => {
                let (left_min, right_min) = match binary_precedence(binary.op) {
                    Some(PrecedenceEntry {
                        rank,
                        associativity: Associativity::Left,
                        ..
                    }) => (rank, rank + 1),
                    Some(PrecedenceEntry {
                        rank,
                        associativity: Associativity::Right,
                        ..
                    }) => (rank + 1, rank),
                    // 表にない演算子は両辺を括弧で囲む
                    None => (u8::MAX, u8::MAX),
                };
                let left = self.operand(&binary.left, left_min);
                // 単項式はどの優先順位でも右辺に置ける
                let right = match binary.right.as_ref() {
                    unary @ Expression::Unary(_) => self.expression(unary),
                    other => self.operand(other, right_min),
                };
                format!("{} {} {}", left, binary.op, right)
            }
            Expression::Unary(unary) => {
                let operand = match unary.operand.as_ref() {
                    nested @ Expression::Unary(_) => self.expression(nested),
                    other => self.operand(other, UNARY_RANK),
                };
                match unary.op {
                    UnaryOp::Not => format!("not {}", operand),
                    UnaryOp::Negate if operand.starts_with('-') => format!("- {}", operand),
                    op => format!("{}{}", op, operand),
                }
            }
            Expression::Function(function) => self.function_text("function", &function.body),
            Expression::Table(table) => self.table(table),
            Expression::Field(field) => {
                format!("{}.{}", self.prefix(&field.object), field.property.name)
            }
            Expression::Index(index) => {
                format!(
                    "{}[{}]",
                    self.prefix(&index.object),
                    bracketed(self.expression(&index.index))
                )
            }
            Expression::Call(call) => self.call(call),
            Expression::Parenthesized(paren) => format!("({})", self.expression(&paren.inner)),
        }
    }

    /// 優先順位が足りなければ括弧で囲む
    fn operand(&self, expr: &Expression, min_rank: u8) -> String {
        let text = self.expression(expr);
        if rank(expr) < min_rank {
            format!("({})", text)
        } else {
            text
        }
    }

    /// 呼び出しやフィールドアクセスの対象。プレフィックス式でなければ括弧で囲む
    fn prefix(&self, expr: &Expression) -> String {
        let text = self.expression(expr);
        match expr {
            Expression::Identifier(_)
            | Expression::SelfValue(_)
            | Expression::Next(_)
            | Expression::GlobalVariable(_)
            | Expression::Field(_)
            | Expression::Index(_)
            | Expression::Call(_)
            | Expression::Parenthesized(_) => text,
            _ => format!("({})", text),
        }
    }

    fn call(&self, call: &CallExpr) -> String {
        let mut text = self.prefix(&call.callee);
        if let Some(method) = &call.method {
            text.push(':');
            text.push_str(&method.name);
        }
        match &call.args {
            CallArgs::List(args) => {
                text.push('(');
                text.push_str(&self.expression_list(args));
                text.push(')');
            }
            CallArgs::Table(table) => {
                text.push(' ');
                text.push_str(&self.table(table));
            }
            CallArgs::String(string) => {
                text.push(' ');
                text.push_str(&string_text(string));
            }
        }
        text
    }

    fn table(&self, table: &TableConstructor) -> String {
        if table.fields.is_empty() {
            return "{}".to_string();
        }
        let fields = table
            .fields
            .iter()
            .map(|field| match field {
                Field::Bracketed { key, value, .. } => format!(
                    "[{}] = {}",
                    bracketed(self.expression(key)),
                    self.expression(value)
                ),
                Field::Named { name, value, .. } => {
                    format!("{} = {}", name.name, self.expression(value))
                }
                Field::Positional(value) => self.expression(value),
            })
            .collect::<Vec<_>>()
            .join(", ");
        format!("{{ {} }}", fields)
    }
}

/// 式の結合の強さ。演算子を含まない式は最も強い
fn rank(expr: &Expression) -> u8 {
    match expr {
        Expression::Binary(binary) => binary_precedence(binary.op).map_or(MIN_RANK, |e| e.rank),
        Expression::Unary(_) => UNARY_RANK,
        _ => u8::MAX,
    }
}

/// `[[`は長括弧の開始と読まれるので空白を挟む
fn bracketed(text: String) -> String {
    if text.starts_with('[') {
        format!(" {} ", text)
    } else {
        text
    }
}

fn string_text(string: &StringLiteral) -> String {
    // 字句がUTF-8に直せなかった場合は値のバイト列から書き直す
    let lossy_raw = string.raw.contains(char::REPLACEMENT_CHARACTER)
        && string.value.to_str().is_none();
    if string.raw.is_empty() || lossy_raw {
        quoted(string.value.as_bytes())
    } else {
        string.raw.clone()
    }
}

/// 二重引用符の文字列リテラルにする。UTF-8でないバイトは`\xNN`で書く
fn quoted(bytes: &[u8]) -> String {
    let mut text = String::from("\"");
    for_each_utf8_chunk(bytes, |valid, invalid| {
        for ch in valid.chars() {
            match ch {
                '"' => text.push_str("\\\""),
                '\\' => text.push_str("\\\\"),
                '\n' => text.push_str("\\n"),
                '\r' => text.push_str("\\r"),
                '\t' => text.push_str("\\t"),
                c if c.is_ascii_control() => text.push_str(&format!("\\{:03}", u32::from(c))),
                c => text.push(c),
            }
        }
        for byte in invalid {
            text.push_str(&format!("\\x{:02X}", byte));
        }
    });
    text.push('"');
    text
}

fn names(names: &[Identifier]) -> String {
    names
        .iter()
        .map(|n| n.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
