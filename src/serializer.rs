use crate::error::{ErrorKind, GblnError};
use crate::value::{Tag, Value};
use std::fmt::Write;

/// Rendering mode for [serialize]. `Compact` emits no incidental whitespace; `Pretty`
/// indents nested fields one level per depth, `indent` spaces at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerializeOptions {
    Compact,
    Pretty { indent: usize },
}

impl SerializeOptions {
    pub fn pretty() -> Self {
        SerializeOptions::Pretty { indent: 2 }
    }
}

pub fn serialize_compact(value: &Value) -> Result<String, GblnError> {
    serialize(value, SerializeOptions::Compact)
}

pub fn serialize_pretty(value: &Value) -> Result<String, GblnError> {
    serialize(value, SerializeOptions::pretty())
}

/// Render `value` to GBLN text per `opts`.
///
/// `parse()` never returns a bare scalar at the root (see `SPEC_FULL.md` §4.2's wrap
/// rule), so this is the only place a scalar passed directly still needs a container:
/// it is wrapped in a synthetic single-field object keyed `"value"` so the output
/// stays valid, re-parseable GBLN text rather than an unparseable bare token.
pub fn serialize(value: &Value, opts: SerializeOptions) -> Result<String, GblnError> {
    let mut buf = String::new();
    match value {
        Value::Object(fields) => write_object_body(&mut buf, fields, opts, 0)?,
        Value::Array { elem_tag, items } => write_array_body(&mut buf, *elem_tag, items, opts, 0)?,
        scalar => {
            let wrapped = [("value".to_string(), scalar.clone())];
            write_object_body(&mut buf, &wrapped, opts, 0)?;
        }
    }
    Ok(buf)
}

fn indent(buf: &mut String, opts: SerializeOptions, depth: usize) {
    if let SerializeOptions::Pretty { indent } = opts {
        buf.push('\n');
        for _ in 0..(indent * depth) {
            buf.push(' ');
        }
    }
}

fn write_object_body(
    buf: &mut String,
    fields: &[(String, Value)],
    opts: SerializeOptions,
    depth: usize,
) -> Result<(), GblnError> {
    buf.push('{');
    for (key, value) in fields.iter() {
        indent(buf, opts, depth + 1);
        write_field(buf, key, value, opts, depth + 1)?;
    }
    if !fields.is_empty() {
        indent(buf, opts, depth);
    }
    buf.push('}');
    Ok(())
}

fn write_array_body(
    buf: &mut String,
    elem_tag: Option<Tag>,
    items: &[Value],
    opts: SerializeOptions,
    depth: usize,
) -> Result<(), GblnError> {
    buf.push('[');
    for (index, item) in items.iter().enumerate() {
        if index > 0 && matches!(opts, SerializeOptions::Compact) {
            buf.push(' ');
        }
        indent(buf, opts, depth + 1);
        write_element(buf, item, opts, depth + 1)?;
    }
    if !items.is_empty() {
        indent(buf, opts, depth);
    }
    buf.push(']');
    Ok(())
}

fn write_field(
    buf: &mut String,
    key: &str,
    value: &Value,
    opts: SerializeOptions,
    depth: usize,
) -> Result<(), GblnError> {
    buf.push_str(key);
    match value {
        Value::Object(fields) => write_object_body(buf, fields, opts, depth)?,
        Value::Array { elem_tag, items } => {
            if let Some(tag) = elem_tag {
                write!(buf, "<{}>", tag.as_str()).unwrap();
            }
            write_array_body(buf, *elem_tag, items, opts, depth)?;
        }
        scalar => write_scalar(buf, scalar)?,
    }
    Ok(())
}

/// Array elements have no key, and the grammar has no slot for a bare `<tag>(...)`
/// with no leading name — a scalar array element can only be written as the raw
/// lexeme the parser's inference (or the array's own declared tag) recovers it from.
/// A nested object/array element still renders as its bare body.
fn write_element(
    buf: &mut String,
    value: &Value,
    opts: SerializeOptions,
    depth: usize,
) -> Result<(), GblnError> {
    match value {
        Value::Object(fields) => write_object_body(buf, fields, opts, depth),
        Value::Array { elem_tag, items } => {
            if let Some(tag) = elem_tag {
                write!(buf, "<{}>", tag.as_str()).unwrap();
            }
            write_array_body(buf, *elem_tag, items, opts, depth)
        }
        scalar => write_bare_scalar(buf, scalar),
    }
}

fn write_scalar(buf: &mut String, value: &Value) -> Result<(), GblnError> {
    let tag = value.type_of();
    let payload = scalar_payload(value)?;
    write!(buf, "<{}>({})", tag.as_str(), payload).unwrap();
    Ok(())
}

fn write_bare_scalar(buf: &mut String, value: &Value) -> Result<(), GblnError> {
    let payload = scalar_payload(value)?;
    buf.push_str(&payload);
    Ok(())
}

fn scalar_payload(value: &Value) -> Result<String, GblnError> {
    let payload = match value {
        Value::Null => String::new(),
        Value::Bool(b) => if *b { "t" } else { "f" }.to_string(),
        Value::I8(v) => v.to_string(),
        Value::I16(v) => v.to_string(),
        Value::I32(v) => v.to_string(),
        Value::I64(v) => v.to_string(),
        Value::U8(v) => v.to_string(),
        Value::U16(v) => v.to_string(),
        Value::U32(v) => v.to_string(),
        Value::U64(v) => v.to_string(),
        Value::F32(v) => format_float(*v as f64),
        Value::F64(v) => format_float(*v),
        Value::Str(_, s) => s.clone(),
        Value::Object(_) | Value::Array { .. } => unreachable!("containers have no scalar payload"),
    };
    if payload.contains(')') {
        return Err(GblnError::new(
            ErrorKind::InvalidSyntax,
            "string payload contains `)`, which the current format cannot represent unescaped",
        ));
    }
    Ok(payload)
}

/// Shortest decimal that round-trips back to the same float, per `SPEC_FULL.md` §4.5.
fn format_float(v: f64) -> String {
    let s = format!("{}", v);
    if s.contains('.') || s.contains('e') || s.contains("inf") || s.contains("NaN") {
        s
    } else {
        format!("{}.0", s)
    }
}

#[cfg(test)]
mod serializer_test {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn round_trip_scenario() {
        let mut v = Value::object();
        v.object_insert("id", Value::u32(123)).unwrap();
        v.object_insert("name", Value::str("Alice")).unwrap();
        v.object_insert("verified", Value::bool(true)).unwrap();
        let text = serialize_compact(&v).unwrap();
        let reparsed = parse(&text).unwrap();
        assert_eq!(reparsed, v);
    }

    #[test]
    fn round_trip_typed_array() {
        let mut arr = Value::typed_array(Tag::I8);
        arr.array_push(Value::i8(-5)).unwrap();
        arr.array_push(Value::i8(10)).unwrap();
        let mut v = Value::object();
        v.object_insert("scores", arr).unwrap();
        let text = serialize_compact(&v).unwrap();
        let reparsed = parse(&text).unwrap();
        assert_eq!(reparsed, v);
    }

    #[test]
    fn round_trip_via_parse_then_serialize_then_parse() {
        let v1 = parse("{id<u32>(12345)name<s32>(Alice)}").unwrap();
        let text = serialize_compact(&v1).unwrap();
        let v2 = parse(&text).unwrap();
        assert_eq!(v1, v2);
    }

    #[test]
    fn pretty_output_is_indented_and_multiline() {
        let mut v = Value::object();
        v.object_insert("a", Value::i32(1)).unwrap();
        let text = serialize_pretty(&v).unwrap();
        assert!(text.contains('\n'));
        assert!(text.starts_with('{'));
        let reparsed = parse(&text).unwrap();
        assert_eq!(reparsed, v);
    }

    #[test]
    fn bare_scalar_gets_synthetic_value_wrapper() {
        let v = Value::i32(42);
        let text = serialize_compact(&v).unwrap();
        assert_eq!(text, "{value<i32>(42)}");
        let reparsed = parse(&text).unwrap();
        assert_eq!(reparsed.object_get("value").unwrap().as_i32(), Some(42));
    }

    #[test]
    fn string_payload_containing_close_paren_is_rejected() {
        let v = Value::str("a)b");
        let err = serialize_compact(&v).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSyntax);
    }

    #[test]
    fn null_serializes_with_empty_payload() {
        let mut v = Value::object();
        v.object_insert("optional", Value::null()).unwrap();
        assert_eq!(serialize_compact(&v).unwrap(), "{optional<n>()}");
    }
}
