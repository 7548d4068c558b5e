use crate::error::{ErrorKind, GblnError};
use crate::value::{Tag, Value};
use once_cell::sync::Lazy;
use regex::Regex;

static SIGNED_INT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?[0-9]+$").unwrap());
static UNSIGNED_INT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").unwrap());
static FLOAT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?[0-9]+\.[0-9]+([eE][-+]?[0-9]+)?$").unwrap());

/// Parse `lexeme` per `tag`'s format and range, producing a coerced scalar [Value].
///
/// Overflow of a signed/unsigned integer under an explicit hint reports `TypeMismatch`
/// rather than `IntOutOfRange` — see `SPEC_FULL.md` §4.4 for why.
pub fn coerce_scalar(tag: Tag, lexeme: &str) -> Result<Value, GblnError> {
    match tag {
        Tag::I8 => coerce_signed(lexeme, tag).map(|v| Value::I8(v as i8)),
        Tag::I16 => coerce_signed(lexeme, tag).map(|v| Value::I16(v as i16)),
        Tag::I32 => coerce_signed(lexeme, tag).map(|v| Value::I32(v as i32)),
        Tag::I64 => coerce_signed(lexeme, tag).map(Value::I64),
        Tag::U8 => coerce_unsigned(lexeme, tag).map(|v| Value::U8(v as u8)),
        Tag::U16 => coerce_unsigned(lexeme, tag).map(|v| Value::U16(v as u16)),
        Tag::U32 => coerce_unsigned(lexeme, tag).map(|v| Value::U32(v as u32)),
        Tag::U64 => coerce_unsigned(lexeme, tag).map(Value::U64),
        Tag::F32 => coerce_float(lexeme, tag).map(|v| Value::F32(v as f32)),
        Tag::F64 => coerce_float(lexeme, tag).map(Value::F64),
        Tag::S8 | Tag::S16 | Tag::S32 | Tag::S64 => Value::str_tagged(tag, lexeme),
        Tag::Bool => coerce_bool(lexeme),
        Tag::Null => coerce_null(lexeme),
        Tag::Object | Tag::Array => Err(GblnError::new(
            ErrorKind::InvalidTypeHint,
            format!("`{}` is not a scalar type hint", tag.as_str()),
        )),
    }
}

fn type_mismatch(tag: Tag, lexeme: &str, detail: impl Into<String>) -> GblnError {
    GblnError::new(
        ErrorKind::TypeMismatch,
        format!(
            "value `{}` does not fit type `{}`: {}",
            lexeme,
            tag.as_str(),
            detail.into()
        ),
    )
}

/// The next-widest integer tag sharing `tag`'s signedness, for an overflow suggestion.
fn wider_int_tag(tag: Tag) -> Option<&'static str> {
    match tag {
        Tag::I8 => Some("i16"),
        Tag::I16 => Some("i32"),
        Tag::I32 => Some("i64"),
        Tag::U8 => Some("u16"),
        Tag::U16 => Some("u32"),
        Tag::U32 => Some("u64"),
        _ => None,
    }
}

fn range_error(tag: Tag, lexeme: &str, detail: impl Into<String>) -> GblnError {
    let err = type_mismatch(tag, lexeme, detail);
    match wider_int_tag(tag) {
        Some(wider) => err.with_suggestion(format!("use `{}` or larger", wider)),
        None => err.with_suggestion("no wider type of the same signedness is available"),
    }
}

fn coerce_signed(lexeme: &str, tag: Tag) -> Result<i64, GblnError> {
    if !SIGNED_INT_RE.is_match(lexeme) {
        return Err(type_mismatch(tag, lexeme, "not a base-10 integer literal"));
    }
    let full: i128 = lexeme
        .parse()
        .map_err(|_| type_mismatch(tag, lexeme, "integer literal too large to parse"))?;
    let (min, max): (i128, i128) = match tag {
        Tag::I8 => (i8::MIN as i128, i8::MAX as i128),
        Tag::I16 => (i16::MIN as i128, i16::MAX as i128),
        Tag::I32 => (i32::MIN as i128, i32::MAX as i128),
        Tag::I64 => (i64::MIN as i128, i64::MAX as i128),
        _ => unreachable!("coerce_signed only called for signed tags"),
    };
    if full < min || full > max {
        return Err(range_error(
            tag,
            lexeme,
            format!("out of range [{}, {}]", min, max),
        ));
    }
    Ok(full as i64)
}

fn coerce_unsigned(lexeme: &str, tag: Tag) -> Result<u64, GblnError> {
    if !UNSIGNED_INT_RE.is_match(lexeme) {
        return Err(type_mismatch(
            tag,
            lexeme,
            "not an unsigned base-10 integer literal",
        ));
    }
    let full: u128 = lexeme
        .parse()
        .map_err(|_| type_mismatch(tag, lexeme, "integer literal too large to parse"))?;
    let max: u128 = match tag {
        Tag::U8 => u8::MAX as u128,
        Tag::U16 => u16::MAX as u128,
        Tag::U32 => u32::MAX as u128,
        Tag::U64 => u64::MAX as u128,
        _ => unreachable!("coerce_unsigned only called for unsigned tags"),
    };
    if full > max {
        return Err(range_error(tag, lexeme, format!("out of range [0, {}]", max)));
    }
    Ok(full as u64)
}

fn coerce_float(lexeme: &str, tag: Tag) -> Result<f64, GblnError> {
    if !FLOAT_RE.is_match(lexeme) && !SIGNED_INT_RE.is_match(lexeme) {
        return Err(type_mismatch(tag, lexeme, "not a decimal or scientific float literal"));
    }
    lexeme
        .parse::<f64>()
        .map_err(|_| type_mismatch(tag, lexeme, "float literal failed to parse"))
}

fn coerce_bool(lexeme: &str) -> Result<Value, GblnError> {
    match lexeme {
        "t" | "true" => Ok(Value::Bool(true)),
        "f" | "false" => Ok(Value::Bool(false)),
        _ => Err(type_mismatch(
            Tag::Bool,
            lexeme,
            "expected one of `t`, `true`, `f`, `false`",
        )),
    }
}

fn coerce_null(lexeme: &str) -> Result<Value, GblnError> {
    if lexeme.is_empty() {
        Ok(Value::Null)
    } else {
        Err(type_mismatch(Tag::Null, lexeme, "`n` takes no payload"))
    }
}

/// Infer a scalar's tag and value from a raw, untyped lexeme, per the five inference
/// rules: boolean literals, signed integers, decimal/scientific floats, else a string
/// sized to the smallest covering `sN` tag, with an empty lexeme inferred as `s8`.
pub fn infer_scalar(lexeme: &str) -> Result<Value, GblnError> {
    if lexeme == "t" || lexeme == "true" {
        return Ok(Value::Bool(true));
    }
    if lexeme == "f" || lexeme == "false" {
        return Ok(Value::Bool(false));
    }
    if SIGNED_INT_RE.is_match(lexeme) {
        return match lexeme.parse::<i64>() {
            Ok(v) => Ok(Value::I64(v)),
            Err(_) => Err(GblnError::new(
                ErrorKind::IntOutOfRange,
                format!("integer literal `{}` does not fit in `i64`", lexeme),
            )),
        };
    }
    if FLOAT_RE.is_match(lexeme) {
        return lexeme.parse::<f64>().map(Value::F64).map_err(|_| {
            GblnError::new(
                ErrorKind::InvalidSyntax,
                format!("`{}` is not a valid float literal", lexeme),
            )
        });
    }
    if lexeme.is_empty() {
        return Ok(Value::Str(Tag::S8, String::new()));
    }
    Value::str_tagged(Tag::smallest_string_tag(lexeme.len()), lexeme)
}

#[cfg(test)]
mod coerce_test {
    use super::*;

    #[test]
    fn i8_boundary_values_succeed() {
        assert_eq!(coerce_scalar(Tag::I8, "-128").unwrap(), Value::I8(-128));
        assert_eq!(coerce_scalar(Tag::I8, "127").unwrap(), Value::I8(127));
    }

    #[test]
    fn i8_one_past_boundary_is_type_mismatch() {
        let err = coerce_scalar(Tag::I8, "128").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        let err = coerce_scalar(Tag::I8, "-129").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn out_of_range_integer_carries_a_wider_type_suggestion() {
        let err = coerce_scalar(Tag::I8, "999").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        assert_eq!(err.suggestion(), Some("use `i16` or larger"));

        let err = coerce_scalar(Tag::U64, "18446744073709551616").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        assert_eq!(
            err.suggestion(),
            Some("no wider type of the same signedness is available")
        );
    }

    #[test]
    fn u8_boundary_values_succeed() {
        assert_eq!(coerce_scalar(Tag::U8, "0").unwrap(), Value::U8(0));
        assert_eq!(coerce_scalar(Tag::U8, "255").unwrap(), Value::U8(255));
        assert_eq!(coerce_scalar(Tag::U8, "256").unwrap_err().kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn i16_u16_boundaries() {
        assert_eq!(coerce_scalar(Tag::I16, "-32768").unwrap(), Value::I16(-32768));
        assert_eq!(coerce_scalar(Tag::I16, "32767").unwrap(), Value::I16(32767));
        assert_eq!(coerce_scalar(Tag::U16, "65535").unwrap(), Value::U16(65535));
        assert_eq!(coerce_scalar(Tag::U16, "65536").unwrap_err().kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn i32_u32_boundaries() {
        assert_eq!(coerce_scalar(Tag::I32, "2147483647").unwrap(), Value::I32(i32::MAX));
        assert_eq!(coerce_scalar(Tag::I32, "-2147483648").unwrap(), Value::I32(i32::MIN));
        assert_eq!(coerce_scalar(Tag::U32, "4294967295").unwrap(), Value::U32(u32::MAX));
        assert_eq!(
            coerce_scalar(Tag::U32, "4294967296").unwrap_err().kind(),
            ErrorKind::TypeMismatch
        );
    }

    #[test]
    fn i64_u64_boundaries() {
        assert_eq!(
            coerce_scalar(Tag::I64, "-9223372036854775808").unwrap(),
            Value::I64(i64::MIN)
        );
        assert_eq!(
            coerce_scalar(Tag::I64, "9223372036854775807").unwrap(),
            Value::I64(i64::MAX)
        );
        assert_eq!(
            coerce_scalar(Tag::U64, "18446744073709551615").unwrap(),
            Value::U64(u64::MAX)
        );
    }

    #[test]
    fn float_coercion() {
        match coerce_scalar(Tag::F64, "98.5").unwrap() {
            Value::F64(v) => assert!((v - 98.5).abs() < 1e-9),
            other => panic!("expected f64, got {:?}", other),
        }
    }

    #[test]
    fn bool_literals() {
        assert_eq!(coerce_scalar(Tag::Bool, "t").unwrap(), Value::Bool(true));
        assert_eq!(coerce_scalar(Tag::Bool, "true").unwrap(), Value::Bool(true));
        assert_eq!(coerce_scalar(Tag::Bool, "f").unwrap(), Value::Bool(false));
        assert_eq!(
            coerce_scalar(Tag::Bool, "yes").unwrap_err().kind(),
            ErrorKind::TypeMismatch
        );
    }

    #[test]
    fn null_rejects_nonempty_payload() {
        assert_eq!(coerce_scalar(Tag::Null, "").unwrap(), Value::Null);
        assert_eq!(
            coerce_scalar(Tag::Null, "x").unwrap_err().kind(),
            ErrorKind::TypeMismatch
        );
    }

    #[test]
    fn infer_prefers_bool_then_int_then_float_then_string() {
        assert_eq!(infer_scalar("true").unwrap(), Value::Bool(true));
        assert_eq!(infer_scalar("25").unwrap(), Value::I64(25));
        assert_eq!(infer_scalar("-15").unwrap(), Value::I64(-15));
        match infer_scalar("98.5").unwrap() {
            Value::F64(_) => {}
            other => panic!("expected f64, got {:?}", other),
        }
        assert_eq!(infer_scalar("Alice").unwrap(), Value::Str(Tag::S8, "Alice".into()));
    }

    #[test]
    fn infer_empty_lexeme_is_empty_s8_string() {
        assert_eq!(infer_scalar("").unwrap(), Value::Str(Tag::S8, String::new()));
    }

    #[test]
    fn infer_oversized_integer_is_int_out_of_range() {
        let err = infer_scalar("99999999999999999999999").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IntOutOfRange);
    }
}
