//! `RelaxedDecoder` — decoder for the JSON superset people type by hand.
//!
//! On top of strict JSON it accepts:
//!
//! - unquoted identifier keys and bare integer keys (`{a: 1, 2: "b"}`),
//! - single-quoted strings with JS escapes (`'it\'s'`, `'\x41'`),
//! - trailing commas in arrays and objects,
//! - `//` line comments and `/* */` block comments,
//! - numbers with a leading `+`, a leading `.` or a trailing `.`,
//! - `undefined`, which is stored as `null` inside containers.
//!
//! `Infinity` and `NaN` are rejected since JSON cannot hold them.

use serde_json::{Map, Value};
use std::str::CharIndices;

use crate::error::DecodeError;
use crate::number::js_number;

/// Deepest container nesting accepted, the same limit as `serde_json`.
pub const MAX_DEPTH: usize = 128;

pub struct RelaxedDecoder<'a> {
    src: &'a str,
    x: usize,
    depth: usize,
}

impl<'a> RelaxedDecoder<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src, x: 0, depth: 0 }
    }

    /// Decode `src` as a single value, allowing only trivia after it.
    pub fn decode(src: &str) -> Result<Value, DecodeError> {
        let mut decoder = RelaxedDecoder::new(src);
        let value = decoder.read_any()?;
        decoder.skip_trivia()?;
        if decoder.x < decoder.src.len() {
            return Err(DecodeError::Trailing(decoder.x));
        }
        Ok(value)
    }

    /// Current byte offset.
    pub fn offset(&self) -> usize {
        self.x
    }

    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.x).copied()
    }

    fn expect(&mut self, byte: u8) -> Result<(), DecodeError> {
        match self.peek() {
            Some(b) if b == byte => {
                self.x += 1;
                Ok(())
            }
            Some(_) => Err(DecodeError::Invalid(self.x)),
            None => Err(DecodeError::UnexpectedEnd),
        }
    }

    pub fn skip_trivia(&mut self) -> Result<(), DecodeError> {
        let bytes = self.src.as_bytes();
        while self.x < bytes.len() {
            match bytes[self.x] {
                b' ' | b'\t' | b'\n' | b'\r' => self.x += 1,
                b'/' if bytes.get(self.x + 1) == Some(&b'/') => {
                    while self.x < bytes.len() && bytes[self.x] != b'\n' {
                        self.x += 1;
                    }
                }
                b'/' if bytes.get(self.x + 1) == Some(&b'*') => {
                    match self.src[self.x + 2..].find("*/") {
                        Some(end) => self.x += end + 4,
                        None => return Err(DecodeError::UnexpectedEnd),
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    pub fn read_any(&mut self) -> Result<Value, DecodeError> {
        self.skip_trivia()?;
        let Some(ch) = self.peek() else {
            return Err(DecodeError::UnexpectedEnd);
        };
        match ch {
            b'"' | b'\'' => Ok(Value::String(self.read_str()?)),
            b'[' => self.read_arr(),
            b'{' => self.read_obj(),
            b'0'..=b'9' | b'-' | b'+' | b'.' => self.read_num(),
            c if is_ident_start(c) => self.read_word(),
            _ => Err(DecodeError::Invalid(self.x)),
        }
    }

    fn read_word(&mut self) -> Result<Value, DecodeError> {
        let start = self.x;
        match self.read_ident() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            "null" | "undefined" => Ok(Value::Null),
            _ => Err(DecodeError::Invalid(start)),
        }
    }

    fn read_ident(&mut self) -> &'a str {
        let src = self.src;
        let bytes = src.as_bytes();
        let start = self.x;
        while self.x < bytes.len() && is_ident_continue(bytes[self.x]) {
            self.x += 1;
        }
        &src[start..self.x]
    }

    pub fn read_num(&mut self) -> Result<Value, DecodeError> {
        let bytes = self.src.as_bytes();
        let len = bytes.len();
        let start = self.x;
        let mut x = self.x;

        if x < len && (bytes[x] == b'-' || bytes[x] == b'+') {
            x += 1;
        }
        let int_start = x;
        while x < len && bytes[x].is_ascii_digit() {
            x += 1;
        }
        let mut digits = x - int_start;
        if x < len && bytes[x] == b'.' {
            x += 1;
            let frac_start = x;
            while x < len && bytes[x].is_ascii_digit() {
                x += 1;
            }
            digits += x - frac_start;
        }
        if digits == 0 {
            return Err(DecodeError::InvalidNumber(start));
        }
        if x < len && (bytes[x] == b'e' || bytes[x] == b'E') {
            x += 1;
            if x < len && (bytes[x] == b'+' || bytes[x] == b'-') {
                x += 1;
            }
            let exp_start = x;
            while x < len && bytes[x].is_ascii_digit() {
                x += 1;
            }
            if x == exp_start {
                return Err(DecodeError::InvalidNumber(start));
            }
        }
        self.x = x;

        let parsed: f64 = self.src[start..x]
            .parse()
            .map_err(|_| DecodeError::InvalidNumber(start))?;
        js_number(parsed)
            .map(Value::Number)
            .ok_or(DecodeError::InvalidNumber(start))
    }

    /// Read a string delimited by `"` or `'`.
    pub fn read_str(&mut self) -> Result<String, DecodeError> {
        let quote = match self.peek() {
            Some(q @ (b'"' | b'\'')) => q as char,
            Some(_) => return Err(DecodeError::Invalid(self.x)),
            None => return Err(DecodeError::UnexpectedEnd),
        };
        self.x += 1;
        let base = self.x;
        let src = self.src;
        let mut chars = src[base..].char_indices();
        let mut out = String::new();
        loop {
            let Some((at, ch)) = chars.next() else {
                return Err(DecodeError::UnexpectedEnd);
            };
            match ch {
                c if c == quote => {
                    self.x = base + at + 1;
                    return Ok(out);
                }
                '\n' | '\r' => return Err(DecodeError::Invalid(base + at)),
                '\\' => {
                    let Some((esc_at, esc)) = chars.next() else {
                        return Err(DecodeError::UnexpectedEnd);
                    };
                    match esc {
                        'n' => out.push('\n'),
                        't' => out.push('\t'),
                        'r' => out.push('\r'),
                        'b' => out.push('\u{8}'),
                        'f' => out.push('\u{c}'),
                        'v' => out.push('\u{b}'),
                        '0' => out.push('\0'),
                        'x' => {
                            let code = read_hex(&mut chars, 2)
                                .ok_or(DecodeError::Invalid(base + esc_at))?;
                            out.push(char::from_u32(code).unwrap_or('\u{fffd}'));
                        }
                        'u' => {
                            let code = read_unicode_escape(&mut chars)
                                .ok_or(DecodeError::Invalid(base + esc_at))?;
                            out.push(char::from_u32(code).unwrap_or('\u{fffd}'));
                        }
                        // Line continuation.
                        '\n' => {}
                        '\r' => {
                            let mut look = chars.clone();
                            if let Some((_, '\n')) = look.next() {
                                chars = look;
                            }
                        }
                        other => out.push(other),
                    }
                }
                c => out.push(c),
            }
        }
    }

    fn enter(&mut self) -> Result<(), DecodeError> {
        if self.depth == MAX_DEPTH {
            return Err(DecodeError::TooDeep(self.x));
        }
        self.depth += 1;
        Ok(())
    }

    pub fn read_arr(&mut self) -> Result<Value, DecodeError> {
        self.enter()?;
        let arr = self.read_arr_items();
        self.depth -= 1;
        arr
    }

    fn read_arr_items(&mut self) -> Result<Value, DecodeError> {
        self.expect(b'[')?;
        let mut arr = Vec::new();
        loop {
            self.skip_trivia()?;
            match self.peek() {
                None => return Err(DecodeError::UnexpectedEnd),
                Some(b']') => {
                    self.x += 1;
                    return Ok(Value::Array(arr));
                }
                Some(_) => {}
            }
            arr.push(self.read_any()?);
            self.skip_trivia()?;
            match self.peek() {
                Some(b',') => self.x += 1,
                Some(b']') => {
                    self.x += 1;
                    return Ok(Value::Array(arr));
                }
                Some(_) => return Err(DecodeError::Invalid(self.x)),
                None => return Err(DecodeError::UnexpectedEnd),
            }
        }
    }

    pub fn read_obj(&mut self) -> Result<Value, DecodeError> {
        self.enter()?;
        let obj = self.read_obj_entries();
        self.depth -= 1;
        obj
    }

    fn read_obj_entries(&mut self) -> Result<Value, DecodeError> {
        self.expect(b'{')?;
        let mut obj = Map::new();
        loop {
            self.skip_trivia()?;
            match self.peek() {
                None => return Err(DecodeError::UnexpectedEnd),
                Some(b'}') => {
                    self.x += 1;
                    return Ok(Value::Object(obj));
                }
                Some(_) => {}
            }
            let key_at = self.x;
            let key = self.read_key()?;
            if key == "__proto__" {
                return Err(DecodeError::InvalidKey(key_at));
            }
            self.skip_trivia()?;
            self.expect(b':')?;
            let val = self.read_any()?;
            obj.insert(key, val);
            self.skip_trivia()?;
            match self.peek() {
                Some(b',') => self.x += 1,
                Some(b'}') => {
                    self.x += 1;
                    return Ok(Value::Object(obj));
                }
                Some(_) => return Err(DecodeError::Invalid(self.x)),
                None => return Err(DecodeError::UnexpectedEnd),
            }
        }
    }

    fn read_key(&mut self) -> Result<String, DecodeError> {
        match self.peek() {
            Some(b'"' | b'\'') => self.read_str(),
            Some(c) if is_ident_start(c) => Ok(self.read_ident().to_string()),
            Some(c) if c.is_ascii_digit() => {
                let src = self.src;
                let bytes = src.as_bytes();
                let start = self.x;
                while self.x < bytes.len() && bytes[self.x].is_ascii_digit() {
                    self.x += 1;
                }
                Ok(src[start..self.x].to_string())
            }
            Some(_) => Err(DecodeError::InvalidKey(self.x)),
            None => Err(DecodeError::UnexpectedEnd),
        }
    }
}

fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_' || c == b'$'
}

fn is_ident_continue(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_' || c == b'$'
}

fn read_hex(chars: &mut CharIndices<'_>, count: usize) -> Option<u32> {
    let mut code = 0u32;
    for _ in 0..count {
        let (_, ch) = chars.next()?;
        code = code * 16 + ch.to_digit(16)?;
    }
    Some(code)
}

/// Read the four hex digits after `\u`, joining a following low surrogate
/// escape into one code point.
fn read_unicode_escape(chars: &mut CharIndices<'_>) -> Option<u32> {
    let high = read_hex(chars, 4)?;
    if !(0xd800..0xdc00).contains(&high) {
        return Some(high);
    }
    let mut look = chars.clone();
    if let (Some((_, '\\')), Some((_, 'u'))) = (look.next(), look.next()) {
        if let Some(low) = read_hex(&mut look, 4) {
            if (0xdc00..0xe000).contains(&low) {
                *chars = look;
                return Some(0x10000 + ((high - 0xd800) << 10) + (low - 0xdc00));
            }
        }
    }
    Some(high)
}
