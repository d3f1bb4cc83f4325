//! リテラルの解析
//!
//! 短い文字列のエスケープ処理と、数値リテラルの文法検査（nom）を行う。

use nom::{
    branch::alt,
    bytes::complete::tag_no_case,
    character::complete::{char, digit1, hex_digit1, one_of},
    combinator::{all_consuming, opt, recognize},
    sequence::{pair, tuple},
    IResult,
};

use crate::ast::NumberValue;

/// Luaの短い文字列のエスケープシーケンスを処理
///
/// `\ddd`や`\xXX`はその値の1バイトになり、`\u{XXX}`はUTF-8で符号化する。
/// エスケープ以外のバイトは、UTF-8として不正でもそのまま残す。
pub fn unescape_string(s: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(s.len());
    let mut bytes = s.iter().copied().peekable();

    while let Some(b) = bytes.next() {
        if b != b'\\' {
            result.push(b);
            continue;
        }
        match bytes.next() {
            Some(b'a') => result.push(0x07),
            Some(b'b') => result.push(0x08),
            Some(b'f') => result.push(0x0C),
            Some(b'n') => result.push(b'\n'),
            Some(b'r') => result.push(b'\r'),
            Some(b't') => result.push(b'\t'),
            Some(b'v') => result.push(0x0B),
            Some(c @ (b'\\' | b'"' | b'\'')) => result.push(c),
            Some(b'\n') => {
                // エスケープされた改行（\n\r も1つの改行）
                result.push(b'\n');
                if bytes.peek() == Some(&b'\r') {
                    bytes.next();
                }
            }
            Some(b'\r') => {
                result.push(b'\n');
                if bytes.peek() == Some(&b'\n') {
                    bytes.next();
                }
            }
            Some(b'z') => {
                // 後続の空白を読み飛ばす
                while bytes.peek().copied().is_some_and(is_lua_space) {
                    bytes.next();
                }
            }
            Some(b'x') => {
                // 16進数エスケープ（\xXX）
                let hex: Vec<u8> = (0..2).filter_map(|_| bytes.next()).collect();
                let digits: Option<Vec<u32>> = hex.iter().map(|d| hex_digit(*d)).collect();
                match digits.as_deref() {
                    Some([high, low]) => result.push((high * 16 + low) as u8),
                    _ => {
                        result.extend_from_slice(b"\\x");
                        result.extend_from_slice(&hex);
                    }
                }
            }
            Some(b'u') => {
                // Unicodeエスケープ（\u{XXX}）
                if bytes.peek() != Some(&b'{') {
                    result.extend_from_slice(b"\\u");
                    continue;
                }
                bytes.next();
                let mut code = Some(0u32);
                let mut digits = 0;
                for b in bytes.by_ref() {
                    if b == b'}' {
                        break;
                    }
                    digits += 1;
                    code = code.and_then(|c| hex_digit(b).and_then(|d| c.checked_mul(16)?.checked_add(d)));
                }
                match code.filter(|c| digits > 0 && *c <= MAX_UTF8_ESCAPE) {
                    Some(c) => push_utf8(&mut result, c),
                    None => result.extend_from_slice(REPLACEMENT),
                }
            }
            Some(d) if d.is_ascii_digit() => {
                // 10進数エスケープ（\ddd、最大3桁）
                let mut value = u32::from(d - b'0');
                for _ in 0..2 {
                    match bytes.peek().copied().filter(u8::is_ascii_digit) {
                        Some(next) => {
                            value = value * 10 + u32::from(next - b'0');
                            bytes.next();
                        }
                        None => break,
                    }
                }
                match u8::try_from(value) {
                    Ok(byte) => result.push(byte),
                    Err(_) => result.extend_from_slice(REPLACEMENT),
                }
            }
            Some(c) => {
                // 認識されないエスケープシーケンス
                result.push(b'\\');
                result.push(c);
            }
            None => result.push(b'\\'),
        }
    }

    result
}

/// `\u{XXX}`で書ける最大値（31ビット）
const MAX_UTF8_ESCAPE: u32 = 0x7FFF_FFFF;

/// 値を表せないエスケープの代わりに置く U+FFFD
const REPLACEMENT: &[u8] = "\u{FFFD}".as_bytes();

/// Luaの空白文字（`\z`が読み飛ばす対象）
pub(super) fn is_lua_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0B | 0x0C)
}

fn hex_digit(b: u8) -> Option<u32> {
    char::from(b).to_digit(16)
}

/// UTF-8で符号化して追加する。サロゲートや0x10FFFFを超える値も
/// 31ビットまでは同じ規則で延長した形にする
fn push_utf8(out: &mut Vec<u8>, mut code: u32) {
    if code < 0x80 {
        out.push(code as u8);
        return;
    }
    let mut encoded = Vec::with_capacity(6);
    // 先頭バイトに収まる最大値
    let mut first_max = 0x3Fu32;
    loop {
        encoded.push(0x80 | (code & 0x3F) as u8);
        code >>= 6;
        first_max >>= 1;
        if code <= first_max {
            break;
        }
    }
    encoded.push(((!first_max << 1) | code) as u8);
    out.extend(encoded.iter().rev());
}

fn decimal_exponent(input: &str) -> IResult<&str, &str> {
    recognize(tuple((one_of("eE"), opt(one_of("+-")), digit1)))(input)
}

fn binary_exponent(input: &str) -> IResult<&str, &str> {
    recognize(tuple((one_of("pP"), opt(one_of("+-")), digit1)))(input)
}

/// `0x` 16進数 (`.` 16進数)? (`p` 符号付き整数)?
fn hex_literal(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        tag_no_case("0x"),
        hex_digit1,
        opt(pair(char('.'), hex_digit1)),
        opt(binary_exponent),
    )))(input)
}

/// `1`, `1.`, `1.5`, `.5`, `1e10`, `1.5e-3`
fn decimal_literal(input: &str) -> IResult<&str, &str> {
    alt((
        recognize(tuple((digit1, char('.'), opt(digit1), opt(decimal_exponent)))),
        recognize(tuple((char('.'), digit1, opt(decimal_exponent)))),
        recognize(pair(digit1, opt(decimal_exponent))),
    ))(input)
}

/// 字句全体が数値リテラルの文法に合致するか
pub fn is_valid_number(lexeme: &str) -> bool {
    all_consuming(alt((hex_literal, decimal_literal)))(lexeme).is_ok()
}

/// 数値リテラルを評価する
///
/// 小数点も指数もない10進数が`i64`に収まらない場合は浮動小数点数、
/// 16進数の整数は2の64乗を法として折り返す。
pub fn number_value(lexeme: &str) -> Option<NumberValue> {
    if !is_valid_number(lexeme) {
        return None;
    }

    if let Some(hex) = lexeme
        .strip_prefix("0x")
        .or_else(|| lexeme.strip_prefix("0X"))
    {
        if hex.contains(['.', 'p', 'P']) {
            return hex_float(hex).map(NumberValue::Float);
        }
        let value = hex.chars().try_fold(0i64, |acc, c| {
            c.to_digit(16)
                .map(|d| acc.wrapping_mul(16).wrapping_add(i64::from(d)))
        })?;
        return Some(NumberValue::Integer(value));
    }

    if lexeme.contains(['.', 'e', 'E']) {
        return lexeme.parse::<f64>().ok().map(NumberValue::Float);
    }
    match lexeme.parse::<i64>() {
        Ok(value) => Some(NumberValue::Integer(value)),
        Err(_) => lexeme.parse::<f64>().ok().map(NumberValue::Float),
    }
}

/// `A.8p-2` 形式（接頭辞`0x`を除いたもの）を評価
fn hex_float(hex: &str) -> Option<f64> {
    let (mantissa, exponent) = match hex.find(['p', 'P']) {
        Some(idx) => (&hex[..idx], hex[idx + 1..].parse::<i32>().ok()?),
        None => (hex, 0),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));

    let mut value = 0f64;
    for c in int_part.chars() {
        value = value * 16.0 + f64::from(c.to_digit(16)?);
    }
    let mut scale = 1.0 / 16.0;
    for c in frac_part.chars() {
        value += f64::from(c.to_digit(16)?) * scale;
        scale /= 16.0;
    }
    Some(value * 2f64.powi(exponent))
}
