//! 式のパーサーテスト

use super::*;
use pretty_assertions::assert_eq;
use test_case::test_case;

#[test_case("1 + 2 * 3", "(+ 1 (* 2 3))"; "multiplication binds tighter")]
#[test_case("1 * 2 + 3", "(+ (* 1 2) 3)"; "multiplication on the left")]
#[test_case("1 - 2 - 3", "(- (- 1 2) 3)"; "subtraction is left associative")]
#[test_case("2 ^ 2 ^ 3", "(^ 2 (^ 2 3))"; "power is right associative")]
#[test_case("a .. b .. c", "(.. a (.. b c))"; "concat is right associative")]
#[test_case("-2 ^ 2", "(- (^ 2 2))"; "power binds tighter than unary minus")]
#[test_case("2 ^ -3", "(^ 2 (- 3))"; "unary operand of power")]
#[test_case("-x ^ -y", "(- (^ x (- y)))"; "unary on both sides of power")]
#[test_case("not a == b", "(== (not a) b)"; "not binds tighter than comparison")]
#[test_case("a or b and c", "(or a (and b c))"; "and binds tighter than or")]
#[test_case("a and b or c and d", "(or (and a b) (and c d))"; "mixed logical")]
#[test_case("a < b == c", "(== (< a b) c)"; "comparisons share a rank")]
#[test_case("a | b ~ c & d", "(| a (~ b (& c d)))"; "bitwise ranks")]
#[test_case("1 << 2 + 3", "(<< 1 (+ 2 3))"; "shift below additive")]
#[test_case("a .. b + c", "(.. a (+ b c))"; "concat below additive")]
#[test_case("a // b % c", "(% (// a b) c)"; "multiplicative are left associative")]
#[test_case("#t + 1", "(+ (# t) 1)"; "length operator")]
#[test_case("~x & y", "(& (~ x) y)"; "unary bitwise not")]
#[test_case("- -x", "(- (- x))"; "nested negation")]
#[test_case("(1 + 2) * 3", "(* (paren (+ 1 2)) 3)"; "parentheses are kept")]
fn test_operator_precedence(source: &str, expected: &str) {
    assert_eq!(sexpr(&parse_expr(source)), expected);
}

#[test]
fn test_precedence_node_shape() {
    let expr = parse_expr("1 + 2 * 3");

    let Expression::Binary(add) = expr else {
        panic!("expected binary expression");
    };
    assert_eq!(add.op, BinaryOp::Add);
    assert!(matches!(*add.left, Expression::Number(ref n) if n.raw == "1"));
    let Expression::Binary(mul) = *add.right else {
        panic!("expected nested multiplication");
    };
    assert_eq!(mul.op, BinaryOp::Multiply);
    assert_eq!(add.span, Span::new(0, 9));
    assert_eq!(mul.span, Span::new(4, 9));
}

#[test_case("f(x).y[z]", "(call f x).y[z]"; "mixed chain")]
#[test_case("obj:m(1, 2)", "(call obj:m 1 2)"; "method call")]
#[test_case("f{1, 2}", "(call f (table 2))"; "table argument")]
#[test_case("f 'lit'", "(call f \"lit\")"; "string argument")]
#[test_case("f[[long]]", "(call f \"long\")"; "long string argument")]
#[test_case("next(t)", "(call next t)"; "next as a function")]
#[test_case("_G.print", "_G.print"; "global table")]
#[test_case("self.x:y()", "(call self.x:y)"; "self base")]
#[test_case("t.next", "t.next"; "next as a property")]
#[test_case("f()()", "(call (call f))"; "chained calls")]
fn test_prefix_chains(source: &str, expected: &str) {
    assert_eq!(sexpr(&parse_expr(source)), expected);
}

#[test]
fn test_literals() {
    assert!(matches!(parse_expr("nil"), Expression::Nil(_)));
    assert!(matches!(parse_expr("true"), Expression::True(_)));
    assert!(matches!(parse_expr("false"), Expression::False(_)));
    assert!(matches!(parse_expr("..."), Expression::Spread(_)));
    assert!(matches!(parse_expr("_VERSION"), Expression::GlobalVariable(GlobalVariable { name: GlobalName::Version, .. })));

    let Expression::Number(number) = parse_expr("0x10") else {
        panic!("expected number");
    };
    assert_eq!(number.value(), Some(NumberValue::Integer(16)));

    let Expression::String(string) = parse_expr(r#""a\tb""#) else {
        panic!("expected string");
    };
    assert_eq!(string.value, "a\tb");
    assert_eq!(string.raw, r#""a\tb""#);
    assert_eq!(string.delimiter, StringDelimiter::DoubleQuote);
}

#[test]
fn test_table_constructor_fields() {
    let Expression::Table(table) = parse_expr("{ [k] = 1, name = 2, 3; x == y, }") else {
        panic!("expected table");
    };

    assert_eq!(table.fields.len(), 4);
    assert!(matches!(&table.fields[0], Field::Bracketed { key: Expression::Identifier(k), .. } if k.name == "k"));
    assert!(matches!(&table.fields[1], Field::Named { name, .. } if name.name == "name"));
    assert!(matches!(&table.fields[2], Field::Positional(Expression::Number(_))));
    assert!(matches!(&table.fields[3], Field::Positional(Expression::Binary(_))));
}

#[test]
fn test_empty_table() {
    let Expression::Table(table) = parse_expr("{}") else {
        panic!("expected table");
    };
    assert!(table.fields.is_empty());
}

#[test]
fn test_anonymous_function() {
    let Expression::Function(function) = parse_expr("function(a, ...) return a end") else {
        panic!("expected function");
    };

    assert!(function.body.is_variadic());
    assert_eq!(function.body.parameters.len(), 2);
    assert!(function.body.block.return_statement.is_some());
}
