//! `JsonDecoder` — byte-level JSON parser producing [`JsonValue`].

use crate::error::JsonError;
use crate::value::JsonValue;

/// Deepest array/object nesting accepted before decoding gives up.
pub const MAX_DEPTH: usize = 128;

pub struct JsonDecoder {
    pub data: Vec<u8>,
    pub x: usize,
    depth: usize,
}

impl Default for JsonDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonDecoder {
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            x: 0,
            depth: 0,
        }
    }

    /// Decodes one complete JSON text. Only whitespace may follow the value.
    pub fn decode(&mut self, input: &[u8]) -> Result<JsonValue, JsonError> {
        self.data = input.to_vec();
        self.x = 0;
        self.depth = 0;
        let value = self.read_any()?;
        self.skip_whitespace();
        if self.x < self.data.len() {
            return Err(JsonError::TrailingCharacters(self.x));
        }
        Ok(value)
    }

    pub fn read_any(&mut self) -> Result<JsonValue, JsonError> {
        self.skip_whitespace();
        let x = self.x;
        let Some(&ch) = self.data.get(x) else {
            return Err(JsonError::Invalid(x));
        };
        match ch {
            b'"' => Ok(JsonValue::Str(self.read_str()?)),
            b'[' => self.read_arr(),
            b'f' => self.read_literal(b"false", JsonValue::Bool(false)),
            b'n' => self.read_literal(b"null", JsonValue::Null),
            b't' => self.read_literal(b"true", JsonValue::Bool(true)),
            b'{' => self.read_obj(),
            b'0'..=b'9' | b'-' => self.read_num(),
            _ => Err(JsonError::Invalid(x)),
        }
    }

    pub fn skip_whitespace(&mut self) {
        while self.x < self.data.len() {
            match self.data[self.x] {
                b' ' | b'\t' | b'\n' | b'\r' => self.x += 1,
                _ => break,
            }
        }
    }

    fn read_literal(&mut self, literal: &[u8], value: JsonValue) -> Result<JsonValue, JsonError> {
        let end = self.x + literal.len();
        if end > self.data.len() || &self.data[self.x..end] != literal {
            return Err(JsonError::Invalid(self.x));
        }
        self.x = end;
        Ok(value)
    }

    pub fn read_num(&mut self) -> Result<JsonValue, JsonError> {
        let start = self.x;
        let data = &self.data;
        let len = data.len();
        let mut x = self.x;

        if x < len && data[x] == b'-' {
            x += 1;
        }
        let digits_start = x;
        while x < len && data[x].is_ascii_digit() {
            x += 1;
        }
        if x == digits_start {
            return Err(JsonError::Invalid(start));
        }
        let mut is_decimal = false;
        if x < len && data[x] == b'.' {
            is_decimal = true;
            x += 1;
            let frac_start = x;
            while x < len && data[x].is_ascii_digit() {
                x += 1;
            }
            if x == frac_start {
                return Err(JsonError::Invalid(x));
            }
        }
        if x < len && (data[x] == b'e' || data[x] == b'E') {
            is_decimal = true;
            x += 1;
            if x < len && (data[x] == b'+' || data[x] == b'-') {
                x += 1;
            }
            let exp_start = x;
            while x < len && data[x].is_ascii_digit() {
                x += 1;
            }
            if x == exp_start {
                return Err(JsonError::Invalid(x));
            }
        }
        self.x = x;

        let s = std::str::from_utf8(&data[start..x]).map_err(|_| JsonError::InvalidUtf8)?;
        if !is_decimal {
            if let Ok(i) = s.parse::<i64>() {
                return Ok(JsonValue::Integer(i));
            }
        }
        let f: f64 = s.parse().map_err(|_| JsonError::Invalid(start))?;
        Ok(JsonValue::Decimal(f))
    }

    pub fn read_str(&mut self) -> Result<String, JsonError> {
        if self.data.get(self.x) != Some(&b'"') {
            return Err(JsonError::Invalid(self.x));
        }
        let x0 = self.x + 1;
        let x1 = find_ending_quote(&self.data, x0)?;
        let s = decode_json_string(&self.data[x0..x1])?;
        self.x = x1 + 1;
        Ok(s)
    }

    pub fn read_arr(&mut self) -> Result<JsonValue, JsonError> {
        if self.data.get(self.x) != Some(&b'[') {
            return Err(JsonError::Invalid(self.x));
        }
        self.enter()?;
        self.x += 1;
        let mut arr = Vec::new();
        let mut first = true;
        loop {
            self.skip_whitespace();
            let Some(&ch) = self.data.get(self.x) else {
                return Err(JsonError::Invalid(self.x));
            };
            if ch == b']' {
                self.x += 1;
                self.depth -= 1;
                return Ok(JsonValue::Array(arr));
            }
            if !first {
                if ch != b',' {
                    return Err(JsonError::Invalid(self.x));
                }
                self.x += 1;
            }
            arr.push(self.read_any()?);
            first = false;
        }
    }

    pub fn read_obj(&mut self) -> Result<JsonValue, JsonError> {
        if self.data.get(self.x) != Some(&b'{') {
            return Err(JsonError::Invalid(self.x));
        }
        self.enter()?;
        self.x += 1;
        let mut obj = Vec::new();
        let mut first = true;
        loop {
            self.skip_whitespace();
            let Some(&ch) = self.data.get(self.x) else {
                return Err(JsonError::Invalid(self.x));
            };
            if ch == b'}' {
                self.x += 1;
                self.depth -= 1;
                return Ok(JsonValue::Object(obj));
            }
            if !first {
                if ch != b',' {
                    return Err(JsonError::Invalid(self.x));
                }
                self.x += 1;
                self.skip_whitespace();
            }
            let key = self.read_str()?;
            if key == "__proto__" {
                return Err(JsonError::InvalidKey);
            }
            self.skip_whitespace();
            if self.data.get(self.x) != Some(&b':') {
                return Err(JsonError::Invalid(self.x));
            }
            self.x += 1;
            let val = self.read_any()?;
            obj.push((key, val));
            first = false;
        }
    }

    fn enter(&mut self) -> Result<(), JsonError> {
        if self.depth >= MAX_DEPTH {
            return Err(JsonError::TooDeep(self.x));
        }
        self.depth += 1;
        Ok(())
    }
}

/// Finds the closing quote of a string body starting at `x`, skipping
/// escaped characters.
fn find_ending_quote(data: &[u8], mut x: usize) -> Result<usize, JsonError> {
    while x < data.len() {
        match data[x] {
            b'"' => return Ok(x),
            b'\\' => x += 2,
            _ => x += 1,
        }
    }
    Err(JsonError::Invalid(data.len()))
}

/// Decode a JSON string body (between the quotes) handling escape sequences.
fn decode_json_string(bytes: &[u8]) -> Result<String, JsonError> {
    if !bytes.contains(&b'\\') {
        return std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| JsonError::InvalidUtf8);
    }
    let mut quoted = Vec::with_capacity(bytes.len() + 2);
    quoted.push(b'"');
    quoted.extend_from_slice(bytes);
    quoted.push(b'"');
    let s: String = serde_json::from_slice(&quoted)?;
    Ok(s)
}
