//! Lua Parser Library
//!
//! This library turns Lua source text into an abstract syntax tree plus a list
//! of diagnostics. Parsing never stops at the first problem unless asked to;
//! the tree covers everything that could be recovered.

pub mod ast;
pub mod driver;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod printer;

// Re-export commonly used types
pub use ast::{Expression, Program, Statement};
pub use driver::{parse_bytes, parse_file, parse_source, ParseOptions, ParseOutput, RecoveryMode};
pub use error::{Diagnostic, DiagnosticKind, ErrorCollector, LuaError, LuaResult, Severity};
pub use lexer::{Lexer, Token, TokenWithPosition};
pub use parser::{ParseError, ParseResult, Parser};
pub use printer::print_program;
