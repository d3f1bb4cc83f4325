//! Lexical analysis module for Lua source.
//!
//! Tokens are produced left to right in a single pass by a `logos` state
//! machine. The parts of Lua's lexical grammar that are not regular are handled
//! in callbacks:
//!
//! - long-bracket strings and comments (`[==[ ... ]==]`), whose closing
//!   delimiter must repeat the level of the opener ([`bracket`]);
//! - quoted strings, delegated to an injected [`StringScanner`] so callers can
//!   substitute their own string rules;
//! - numerals, cut greedily and then validated against Lua's numeric grammar.
//!
//! Comments are kept as tokens; the parser moves them to a side channel.

pub mod bracket;
mod lexer;
pub mod literal_parser;
mod scanner;
mod token;

pub use lexer::{
    display_source, for_each_utf8_chunk, format_tokens, tokenize, LexOutput, Lexer, Position,
    TokenWithPosition,
};
pub use scanner::{LuaStringScanner, ScannedString, StringScanner};
pub use token::{
    Comment, CommentKind, LexerExtras, StringToken, Token, TokenKind,
    DEFAULT_LONG_BRACKET_WARN_LEVEL,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::StringDelimiter;
    use crate::error::LexerError;

    fn tokens_of(input: &str) -> Vec<Token> {
        Lexer::new(input).map(|t| t.token).collect()
    }

    #[test]
    fn test_keywords() {
        let input = "and break do else elseif end false for function goto if in local nil not or repeat return then true until while";
        let tokens = tokens_of(input);

        assert_eq!(
            tokens,
            vec![
                Token::And,
                Token::Break,
                Token::Do,
                Token::Else,
                Token::ElseIf,
                Token::End,
                Token::False,
                Token::For,
                Token::Function,
                Token::Goto,
                Token::If,
                Token::In,
                Token::Local,
                Token::Nil,
                Token::Not,
                Token::Or,
                Token::Repeat,
                Token::Return,
                Token::Then,
                Token::True,
                Token::Until,
                Token::While,
            ]
        );
        assert!(tokens.iter().all(|t| t.kind() == TokenKind::Keyword));
    }

    #[test]
    fn test_special_names() {
        let tokens = tokens_of("self next _G _VERSION _Gx nextval");

        assert_eq!(
            tokens,
            vec![
                Token::SelfValue,
                Token::Next,
                Token::GlobalG,
                Token::Version,
                Token::Identifier("_Gx".to_string()),
                Token::Identifier("nextval".to_string()),
            ]
        );
    }

    #[test]
    fn test_identifiers() {
        let tokens = tokens_of("myVariable _underscore var123 endx");

        assert_eq!(
            tokens,
            vec![
                Token::Identifier("myVariable".to_string()),
                Token::Identifier("_underscore".to_string()),
                Token::Identifier("var123".to_string()),
                Token::Identifier("endx".to_string()),
            ]
        );
    }

    #[test]
    fn test_numeric_literals() {
        let tokens = tokens_of("3 345 0xff 0xBEBADA 3.0 3.1416 314.16e-2 0.31416E1 .5 0x0.1E 0xA23p-4 0X1.921FB54442D18P+1");

        let raws: Vec<_> = tokens
            .iter()
            .map(|t| match t {
                Token::Number(raw) => raw.as_str(),
                other => panic!("expected number, got {other:?}"),
            })
            .collect();
        assert_eq!(
            raws,
            vec![
                "3",
                "345",
                "0xff",
                "0xBEBADA",
                "3.0",
                "3.1416",
                "314.16e-2",
                "0.31416E1",
                ".5",
                "0x0.1E",
                "0xA23p-4",
                "0X1.921FB54442D18P+1",
            ]
        );
    }

    #[test]
    fn test_hex_e_is_a_digit_not_an_exponent() {
        let tokens = tokens_of("0xe-1");
        assert_eq!(
            tokens,
            vec![
                Token::Number("0xe".to_string()),
                Token::Minus,
                Token::Number("1".to_string()),
            ]
        );
    }

    #[test]
    fn test_operators() {
        let tokens = tokens_of("+ - * / // % ^ # & ~ | << >> == ~= <= >= < > = .. ...");

        assert_eq!(
            tokens,
            vec![
                Token::Plus,
                Token::Minus,
                Token::Star,
                Token::Slash,
                Token::SlashSlash,
                Token::Percent,
                Token::Caret,
                Token::Hash,
                Token::Ampersand,
                Token::Tilde,
                Token::Pipe,
                Token::LtLt,
                Token::GtGt,
                Token::EqEq,
                Token::NotEq,
                Token::LtEq,
                Token::GtEq,
                Token::Lt,
                Token::Gt,
                Token::Assign,
                Token::DotDot,
                Token::Ellipsis,
            ]
        );
    }

    #[test]
    fn test_delimiters() {
        let tokens = tokens_of("( ) { } [ ] :: ; : , .");

        assert_eq!(
            tokens,
            vec![
                Token::LeftParen,
                Token::RightParen,
                Token::LeftBrace,
                Token::RightBrace,
                Token::LeftBracket,
                Token::RightBracket,
                Token::DoubleColon,
                Token::Semicolon,
                Token::Colon,
                Token::Comma,
                Token::Dot,
            ]
        );
    }

    #[test]
    fn test_string_literals() {
        let tokens = tokens_of(r#""Hello" 'single' "esc\"aped" [[long]] [==[a]]b]==]"#);

        assert_eq!(
            tokens,
            vec![
                Token::String(StringToken {
                    value: "Hello".into(),
                    delimiter: StringDelimiter::DoubleQuote,
                }),
                Token::String(StringToken {
                    value: "single".into(),
                    delimiter: StringDelimiter::SingleQuote,
                }),
                Token::String(StringToken {
                    value: "esc\"aped".into(),
                    delimiter: StringDelimiter::DoubleQuote,
                }),
                Token::String(StringToken {
                    value: "long".into(),
                    delimiter: StringDelimiter::LongBracket { level: 0 },
                }),
                Token::String(StringToken {
                    value: "a]]b".into(),
                    delimiter: StringDelimiter::LongBracket { level: 2 },
                }),
            ]
        );
    }

    #[test]
    fn test_index_is_not_a_long_string() {
        let tokens = tokens_of("t[ [=[k]=] ]");
        assert_eq!(tokens.len(), 4);
        assert!(matches!(tokens[1], Token::LeftBracket));
        assert!(matches!(tokens[2], Token::String(_)));
        assert!(matches!(tokens[3], Token::RightBracket));
    }

    #[test]
    fn test_comments() {
        let tokens = tokens_of("-- line\n--- doc\n--@param x: y\n--[[ long\n comment ]] x");

        assert_eq!(
            tokens,
            vec![
                Token::Comment(Comment {
                    kind: CommentKind::Line,
                    text: " line".to_string(),
                }),
                Token::Comment(Comment {
                    kind: CommentKind::Doc,
                    text: "- doc".to_string(),
                }),
                Token::Comment(Comment {
                    kind: CommentKind::Annotation,
                    text: "@param x: y".to_string(),
                }),
                Token::Comment(Comment {
                    kind: CommentKind::Long { level: 0 },
                    text: " long\n comment ".to_string(),
                }),
                Token::Identifier("x".to_string()),
            ]
        );
    }

    #[test]
    fn test_long_comment_level_matching() {
        let output = tokenize("--[==[ text ]=] still inside ]==] x");

        assert!(output.errors.is_empty());
        assert_eq!(output.tokens.len(), 2);
        assert_eq!(
            output.tokens[0].token,
            Token::Comment(Comment {
                kind: CommentKind::Long { level: 2 },
                text: " text ]=] still inside ".to_string(),
            })
        );
        assert_eq!(output.tokens[1].token, Token::Identifier("x".to_string()));
    }

    #[test]
    fn test_unterminated_long_comment() {
        let output = tokenize("x --[=[ open ]]");

        assert_eq!(output.tokens.len(), 1);
        assert!(matches!(
            output.errors.as_slice(),
            [LexerError::UnterminatedLongBracket { level: 1, .. }]
        ));
    }

    #[test]
    fn test_non_utf8_comment_warns() {
        let output = tokenize(b"-- caf\xe9\r\nx --[[\xff]]");

        assert_eq!(
            output.tokens[0].token,
            Token::Comment(Comment {
                kind: CommentKind::Line,
                text: " caf\u{FFFD}".to_string(),
            })
        );
        assert_eq!(output.tokens.len(), 3);
        assert_eq!(
            output.errors,
            vec![
                LexerError::InvalidUtf8 { span: crate::ast::Span::new(0, 7) },
                LexerError::InvalidUtf8 { span: crate::ast::Span::new(11, 18) },
            ]
        );
    }

    #[test]
    fn test_deep_long_bracket_warns() {
        let output = tokenize("s = [=====[deep]=====]");

        assert_eq!(output.tokens.len(), 3);
        assert!(matches!(
            output.errors.as_slice(),
            [LexerError::LongBracketLevel { level: 5, bound: 4, .. }]
        ));

        let lexer = Lexer::with_scanner("s = [=====[deep]=====]", std::sync::Arc::new(LuaStringScanner), None);
        assert!(lexer.collect_tokens().errors.is_empty());
    }

    #[test]
    fn test_complete_example() {
        let input = r#"
local Point = {}
Point.__index = Point

function Point.new(x, y)
    return setmetatable({ x = x, y = y }, Point)
end

function Point:length()
    return math.sqrt(self.x ^ 2 + self.y ^ 2)
end
"#;

        let output = tokenize(input);
        assert!(output.errors.is_empty());

        let tokens: Vec<_> = output.tokens.iter().map(|t| &t.token).collect();
        assert_eq!(tokens[0], &Token::Local);
        assert!(tokens.contains(&&Token::Function));
        assert!(tokens.contains(&&Token::SelfValue));
        assert!(tokens.contains(&&Token::Colon));
        assert!(tokens.contains(&&Token::Caret));
    }
}
