//! Compact JSON writer for [`JsonValue`].

use std::fmt::Write as _;

use crate::value::JsonValue;

pub struct JsonEncoder {
    pub out: String,
}

impl Default for JsonEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonEncoder {
    pub fn new() -> Self {
        Self { out: String::new() }
    }

    pub fn encode(&mut self, value: &JsonValue) -> String {
        self.out.clear();
        self.write_any(value);
        std::mem::take(&mut self.out)
    }

    pub fn write_any(&mut self, value: &JsonValue) {
        match value {
            JsonValue::Null => self.write_null(),
            JsonValue::Bool(b) => self.write_boolean(*b),
            JsonValue::Integer(i) => self.write_integer(*i),
            JsonValue::Decimal(f) => self.write_decimal(*f),
            JsonValue::Str(s) => self.write_str(s),
            JsonValue::Array(arr) => self.write_arr(arr),
            JsonValue::Object(obj) => self.write_obj(obj),
        }
    }

    pub fn write_null(&mut self) {
        self.out.push_str("null");
    }

    pub fn write_boolean(&mut self, b: bool) {
        self.out.push_str(if b { "true" } else { "false" });
    }

    pub fn write_integer(&mut self, int: i64) {
        let _ = write!(self.out, "{int}");
    }

    /// Writes the shortest literal that parses back to `float`, keeping a
    /// fraction so the literal stays a decimal. Non-finite values have no
    /// JSON form and are written as `null`.
    pub fn write_decimal(&mut self, float: f64) {
        if !float.is_finite() {
            self.write_null();
            return;
        }
        self.out.push_str(&format_decimal(float));
    }

    pub fn write_str(&mut self, s: &str) {
        self.out.reserve(s.len() + 2);
        self.out.push('"');
        for ch in s.chars() {
            match ch {
                '"' => self.out.push_str("\\\""),
                '\\' => self.out.push_str("\\\\"),
                '\n' => self.out.push_str("\\n"),
                '\r' => self.out.push_str("\\r"),
                '\t' => self.out.push_str("\\t"),
                '\u{08}' => self.out.push_str("\\b"),
                '\u{0c}' => self.out.push_str("\\f"),
                c if (c as u32) < 0x20 => {
                    let _ = write!(self.out, "\\u{:04x}", c as u32);
                }
                c => self.out.push(c),
            }
        }
        self.out.push('"');
    }

    pub fn write_arr(&mut self, arr: &[JsonValue]) {
        self.out.push('[');
        for (i, item) in arr.iter().enumerate() {
            if i > 0 {
                self.out.push(',');
            }
            self.write_any(item);
        }
        self.out.push(']');
    }

    pub fn write_obj(&mut self, obj: &[(String, JsonValue)]) {
        self.out.push('{');
        for (i, (key, val)) in obj.iter().enumerate() {
            if i > 0 {
                self.out.push(',');
            }
            self.write_str(key);
            self.out.push(':');
            self.write_any(val);
        }
        self.out.push('}');
    }
}

fn format_decimal(float: f64) -> String {
    let s = format!("{float}");
    if s.contains(['.', 'e', 'E']) {
        s
    } else {
        format!("{s}.0")
    }
}
