//! Runtime values and how they are written out.

use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
}

impl Value {
    pub fn as_f64(self) -> f64 {
        match self {
            Value::Int(n) => n as f64,
            Value::Float(f) => f,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
        }
    }
}

/// Radix used when rendering integer results.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Dec,
    Hex,
    Oct,
    Bin,
}

impl OutputFormat {
    /// Render `value` in this format. Floats are always decimal.
    pub fn render(self, value: &Value) -> String {
        let n = match value {
            Value::Float(_) => return value.to_string(),
            Value::Int(n) => *n,
        };
        let sign = if n < 0 { "-" } else { "" };
        let abs = n.unsigned_abs();
        match self {
            OutputFormat::Dec => n.to_string(),
            OutputFormat::Hex => format!("{}0x{:x}", sign, abs),
            OutputFormat::Oct if abs == 0 => "0".to_string(),
            OutputFormat::Oct => format!("{}0{:o}", sign, abs),
            OutputFormat::Bin => format!("{}b{:b}", sign, abs),
        }
    }
}

/// Parse a number literal as written in source.
///
/// Accepts `_` separators, `0x` hex, `0b` / `b` binary, a leading `0` for
/// octal and plain decimals with at most one `.`. Radix literals cover the
/// full 64 bits and are read as two's complement, so `0xffffffffffffffff`
/// is `-1`.
pub fn parse_literal(text: &str) -> Option<Value> {
    let cleaned: String = text.chars().filter(|&c| c != '_').collect();
    let t = cleaned.as_str();
    if t.is_empty() {
        return None;
    }

    let radix = |digits: &str, radix: u32| {
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_alphanumeric()) {
            return None;
        }
        u64::from_str_radix(digits, radix)
            .ok()
            .map(|bits| Value::Int(bits as i64))
    };

    if let Some(hex) = t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")) {
        return radix(hex, 16);
    }
    if let Some(bin) = t.strip_prefix("0b").or_else(|| t.strip_prefix('b')) {
        return radix(bin, 2);
    }
    if t.chars().all(|c| c.is_ascii_digit()) {
        if t.len() > 1 && t.starts_with('0') {
            return radix(&t[1..], 8);
        }
        return t.parse::<i64>().ok().map(Value::Int);
    }

    let dots = t.chars().filter(|&c| c == '.').count();
    let digits = t.chars().filter(|c| c.is_ascii_digit()).count();
    if dots == 1 && digits > 0 && dots + digits == t.len() {
        return t.parse::<f64>().ok().filter(|f| f.is_finite()).map(Value::Float);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn literal_forms() {
        assert_eq!(parse_literal("42"), Some(Value::Int(42)));
        assert_eq!(parse_literal("1_000"), Some(Value::Int(1000)));
        assert_eq!(parse_literal("0xff"), Some(Value::Int(255)));
        assert_eq!(parse_literal("0755"), Some(Value::Int(493)));
        assert_eq!(parse_literal("b0101"), Some(Value::Int(5)));
        assert_eq!(parse_literal("0b11"), Some(Value::Int(3)));
        assert_eq!(parse_literal("0"), Some(Value::Int(0)));
        assert_eq!(parse_literal("1.5"), Some(Value::Float(1.5)));
        assert_eq!(parse_literal(".5"), Some(Value::Float(0.5)));
    }

    #[test]
    fn rejected_literals() {
        assert_eq!(parse_literal("0x"), None);
        assert_eq!(parse_literal("09"), None);
        assert_eq!(parse_literal("b012"), None);
        assert_eq!(parse_literal("1.2.3"), None);
        assert_eq!(parse_literal("2x"), None);
        assert_eq!(parse_literal("99999999999999999999"), None);
        assert_eq!(parse_literal("0x1_0000_0000_0000_0000"), None);
        assert_eq!(parse_literal("."), None);
    }

    #[test]
    fn radix_literals_span_all_64_bits() {
        assert_eq!(parse_literal("0xffffffffffffffff"), Some(Value::Int(-1)));
        assert_eq!(parse_literal("0x8000_0000_0000_0000"), Some(Value::Int(i64::MIN)));
        assert_eq!(parse_literal(&format!("b{}", "1".repeat(64))), Some(Value::Int(-1)));
        assert_eq!(parse_literal("01777777777777777777777"), Some(Value::Int(-1)));
        assert_eq!(parse_literal("0x7fffffffffffffff"), Some(Value::Int(i64::MAX)));
    }

    #[test]
    fn render_in_each_format() {
        let v = Value::Int(255);
        assert_eq!(OutputFormat::Dec.render(&v), "255");
        assert_eq!(OutputFormat::Hex.render(&v), "0xff");
        assert_eq!(OutputFormat::Oct.render(&v), "0377");
        assert_eq!(OutputFormat::Bin.render(&v), "b11111111");
        assert_eq!(OutputFormat::Hex.render(&Value::Int(-16)), "-0x10");
        assert_eq!(OutputFormat::Oct.render(&Value::Int(0)), "0");
        assert_eq!(OutputFormat::Hex.render(&Value::Float(2.5)), "2.5");
    }

    #[test]
    fn format_names() {
        assert_eq!(OutputFormat::from_str("hex"), Ok(OutputFormat::Hex));
        assert!(OutputFormat::from_str("roman").is_err());
        assert_eq!(OutputFormat::Bin.to_string(), "bin");
        assert_eq!(OutputFormat::default(), OutputFormat::Dec);
    }

    #[test]
    fn untagged_serde_keeps_int_and_float_apart() {
        let json = serde_json::to_string(&[Value::Int(2), Value::Float(2.5)]).unwrap();
        assert_eq!(json, "[2,2.5]");
        let back: Vec<Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vec![Value::Int(2), Value::Float(2.5)]);
    }
}
