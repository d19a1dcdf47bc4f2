use std::cmp::Ordering;

use super::RuntimeError;
use super::ast::{BinaryOp, UnaryOp};

/// Host objects reachable from scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Native {
    Console,
    ConsoleLog,
}

/// Runtime value of the host dialect.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum Value {
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    Native(Native),
}

impl Value {
    pub(super) fn is_truthy(&self) -> bool {
        match self {
            Self::Undefined | Self::Null => false,
            Self::Boolean(value) => *value,
            Self::Number(value) => *value != 0.0 && !value.is_nan(),
            Self::String(value) => !value.is_empty(),
            Self::Native(_) => true,
        }
    }

    pub(super) fn to_number(&self) -> f64 {
        match self {
            Self::Undefined | Self::Native(_) => f64::NAN,
            Self::Null => 0.0,
            Self::Boolean(value) => f64::from(u8::from(*value)),
            Self::Number(value) => *value,
            Self::String(text) => string_to_number(text),
        }
    }

    /// String conversion used by `+` concatenation.
    pub(super) fn to_js_string(&self) -> String {
        match self {
            Self::Undefined => "undefined".to_string(),
            Self::Null => "null".to_string(),
            Self::Boolean(value) => value.to_string(),
            Self::Number(value) => format_number(*value),
            Self::String(text) => text.clone(),
            Self::Native(Native::Console) => "[object console]".to_string(),
            Self::Native(Native::ConsoleLog) => "function log() { [native code] }".to_string(),
        }
    }

    /// Rendering of a single `console.log` argument.
    pub(super) fn to_console_string(&self) -> String {
        match self {
            Self::Number(value) if *value == 0.0 && value.is_sign_negative() => "-0".to_string(),
            Self::Native(Native::ConsoleLog) => "[Function: log]".to_string(),
            other => other.to_js_string(),
        }
    }

    pub(super) fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::Undefined, Self::Undefined) | (Self::Null, Self::Null) => true,
            (Self::Boolean(left), Self::Boolean(right)) => left == right,
            (Self::Number(left), Self::Number(right)) => left == right,
            (Self::String(left), Self::String(right)) => left == right,
            (Self::Native(left), Self::Native(right)) => left == right,
            _ => false,
        }
    }

    pub(super) fn loose_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::Undefined | Self::Null, Self::Undefined | Self::Null) => true,
            (Self::Undefined | Self::Null, _) | (_, Self::Undefined | Self::Null) => false,
            (Self::Number(_), Self::String(_)) | (Self::String(_), Self::Number(_)) => {
                self.to_number() == other.to_number()
            }
            (Self::Boolean(_), _) => Value::Number(self.to_number()).loose_equals(other),
            (_, Self::Boolean(_)) => self.loose_equals(&Value::Number(other.to_number())),
            _ => self.strict_equals(other),
        }
    }
}

fn string_to_number(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        return u64::from_str_radix(hex, 16)
            .map(|value| value as f64)
            .unwrap_or(f64::NAN);
    }
    // Rust accepts spellings such as "inf" and "nan" that the host does not.
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
    {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// Formats a number the way the host prints it.
pub(super) fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let magnitude = value.abs();
    if magnitude >= 1e21 || magnitude < 1e-6 {
        let formatted = format!("{value:e}");
        return match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{mantissa}e+{exponent}")
            }
            _ => formatted,
        };
    }
    // Display already yields the shortest round-trip digits.
    format!("{value}")
}

pub(super) fn unary(op: UnaryOp, operand: &Value) -> Value {
    match op {
        UnaryOp::Not => Value::Boolean(!operand.is_truthy()),
        UnaryOp::Negate => Value::Number(-operand.to_number()),
        UnaryOp::Plus => Value::Number(operand.to_number()),
    }
}

pub(super) fn binary(op: BinaryOp, left: &Value, right: &Value) -> Value {
    match op {
        BinaryOp::Add => {
            if matches!(left, Value::String(_) | Value::Native(_))
                || matches!(right, Value::String(_) | Value::Native(_))
            {
                let mut text = left.to_js_string();
                text.push_str(&right.to_js_string());
                Value::String(text)
            } else {
                Value::Number(left.to_number() + right.to_number())
            }
        }
        BinaryOp::Sub => Value::Number(left.to_number() - right.to_number()),
        BinaryOp::Mul => Value::Number(left.to_number() * right.to_number()),
        BinaryOp::Div => Value::Number(left.to_number() / right.to_number()),
        BinaryOp::Rem => Value::Number(left.to_number() % right.to_number()),
        BinaryOp::Less => Value::Boolean(compare(left, right) == Some(Ordering::Less)),
        BinaryOp::LessEqual => Value::Boolean(matches!(
            compare(left, right),
            Some(Ordering::Less | Ordering::Equal)
        )),
        BinaryOp::Greater => Value::Boolean(compare(left, right) == Some(Ordering::Greater)),
        BinaryOp::GreaterEqual => Value::Boolean(matches!(
            compare(left, right),
            Some(Ordering::Greater | Ordering::Equal)
        )),
        BinaryOp::Equal => Value::Boolean(left.loose_equals(right)),
        BinaryOp::NotEqual => Value::Boolean(!left.loose_equals(right)),
        BinaryOp::StrictEqual => Value::Boolean(left.strict_equals(right)),
        BinaryOp::StrictNotEqual => Value::Boolean(!left.strict_equals(right)),
    }
}

/// `None` when either side is NaN after conversion.
fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::String(left), Value::String(right)) => Some(left.cmp(right)),
        _ => left.to_number().partial_cmp(&right.to_number()),
    }
}

pub(super) fn get_property(object: &Value, property: &str) -> Result<Value, RuntimeError> {
    match (object, property) {
        (Value::Native(Native::Console), "log") => Ok(Value::Native(Native::ConsoleLog)),
        (Value::Undefined | Value::Null, _) => Err(RuntimeError::NullishPropertyAccess {
            target: object.to_js_string(),
            property: property.to_string(),
        }),
        (Value::String(text), "length") => Ok(Value::Number(text.encode_utf16().count() as f64)),
        _ => Ok(Value::Undefined),
    }
}
