use crate::error::{ErrorKind, GblnError};
use ptree::TreeItem;
use std::borrow::Cow;

/// The tag of a [Value]: one of the twelve scalar classes, or a container kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    S8,
    S16,
    S32,
    S64,
    Bool,
    Null,
    Object,
    Array,
}

impl Tag {
    /// The string spelling of the tag as it appears inside `<...>` in source text.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::I8 => "i8",
            Tag::I16 => "i16",
            Tag::I32 => "i32",
            Tag::I64 => "i64",
            Tag::U8 => "u8",
            Tag::U16 => "u16",
            Tag::U32 => "u32",
            Tag::U64 => "u64",
            Tag::F32 => "f32",
            Tag::F64 => "f64",
            Tag::S8 => "s8",
            Tag::S16 => "s16",
            Tag::S32 => "s32",
            Tag::S64 => "s64",
            Tag::Bool => "b",
            Tag::Null => "n",
            Tag::Object => "object",
            Tag::Array => "array",
        }
    }

    /// Parse a type-hint spelling into its tag; `None` for an unrecognized tag.
    pub fn from_hint(hint: &str) -> Option<Self> {
        Some(match hint {
            "i8" => Tag::I8,
            "i16" => Tag::I16,
            "i32" => Tag::I32,
            "i64" => Tag::I64,
            "u8" => Tag::U8,
            "u16" => Tag::U16,
            "u32" => Tag::U32,
            "u64" => Tag::U64,
            "f32" => Tag::F32,
            "f64" => Tag::F64,
            "s8" => Tag::S8,
            "s16" => Tag::S16,
            "s32" => Tag::S32,
            "s64" => Tag::S64,
            "b" => Tag::Bool,
            "n" => Tag::Null,
            _ => return None,
        })
    }

    /// The maximum byte length permitted for a string of this tag, if it is a string tag.
    pub fn max_string_len(&self) -> Option<u64> {
        match self {
            Tag::S8 => Some(1 << 8),
            Tag::S16 => Some(1 << 16),
            Tag::S32 => Some(1 << 32),
            Tag::S64 => Some(u64::MAX),
            _ => None,
        }
    }

    /// The smallest string tag whose maximum length covers `byte_len`.
    pub fn smallest_string_tag(byte_len: usize) -> Tag {
        let byte_len = byte_len as u64;
        if byte_len <= (1 << 8) {
            Tag::S8
        } else if byte_len <= (1 << 16) {
            Tag::S16
        } else if byte_len <= (1u64 << 32) {
            Tag::S32
        } else {
            Tag::S64
        }
    }
}

/// A parsed or constructed GBLN value. Containers own their children directly, so a
/// `Value` tree has no interior mutability and is `Send + Sync` whenever its scalar
/// payloads are.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Str(Tag, String),
    Object(Vec<(String, Value)>),
    Array {
        elem_tag: Option<Tag>,
        items: Vec<Value>,
    },
}

impl Value {
    pub fn null() -> Self {
        Value::Null
    }
    pub fn bool(v: bool) -> Self {
        Value::Bool(v)
    }
    pub fn i8(v: i8) -> Self {
        Value::I8(v)
    }
    pub fn i16(v: i16) -> Self {
        Value::I16(v)
    }
    pub fn i32(v: i32) -> Self {
        Value::I32(v)
    }
    pub fn i64(v: i64) -> Self {
        Value::I64(v)
    }
    pub fn u8(v: u8) -> Self {
        Value::U8(v)
    }
    pub fn u16(v: u16) -> Self {
        Value::U16(v)
    }
    pub fn u32(v: u32) -> Self {
        Value::U32(v)
    }
    pub fn u64(v: u64) -> Self {
        Value::U64(v)
    }
    pub fn f32(v: f32) -> Self {
        Value::F32(v)
    }
    pub fn f64(v: f64) -> Self {
        Value::F64(v)
    }

    /// Construct a string scalar of the smallest tag covering `bytes`' length, or
    /// explicitly tagged via [`Value::str_tagged`]. Rejects a length beyond `s64`'s
    /// range (which in practice never happens on real input).
    pub fn str(bytes: impl Into<String>) -> Self {
        let s = bytes.into();
        let tag = Tag::smallest_string_tag(s.len());
        Value::Str(tag, s)
    }

    /// Construct a string scalar tagged `tag`, rejecting it with `StringTooLong` if
    /// its UTF-8 byte length exceeds the tag's maximum, or `InvalidTypeHint` if `tag`
    /// is not one of the `s8`/`s16`/`s32`/`s64` string classes.
    pub fn str_tagged(tag: Tag, bytes: impl Into<String>) -> Result<Self, GblnError> {
        let s = bytes.into();
        let max = tag.max_string_len().ok_or_else(|| {
            GblnError::new(
                ErrorKind::InvalidTypeHint,
                format!("`{}` is not a string type hint", tag.as_str()),
            )
        })?;
        if s.len() as u64 > max {
            return Err(GblnError::new(
                ErrorKind::StringTooLong,
                format!(
                    "string of {} bytes exceeds maximum {} bytes for `{}`",
                    s.len(),
                    max,
                    tag.as_str()
                ),
            ));
        }
        Ok(Value::Str(tag, s))
    }

    pub fn object() -> Self {
        Value::Object(Vec::new())
    }

    pub fn array() -> Self {
        Value::Array {
            elem_tag: None,
            items: Vec::new(),
        }
    }

    /// An array whose elements must all coerce to `tag`.
    pub fn typed_array(tag: Tag) -> Self {
        Value::Array {
            elem_tag: Some(tag),
            items: Vec::new(),
        }
    }

    pub fn type_of(&self) -> Tag {
        match self {
            Value::Null => Tag::Null,
            Value::Bool(_) => Tag::Bool,
            Value::I8(_) => Tag::I8,
            Value::I16(_) => Tag::I16,
            Value::I32(_) => Tag::I32,
            Value::I64(_) => Tag::I64,
            Value::U8(_) => Tag::U8,
            Value::U16(_) => Tag::U16,
            Value::U32(_) => Tag::U32,
            Value::U64(_) => Tag::U64,
            Value::F32(_) => Tag::F32,
            Value::F64(_) => Tag::F64,
            Value::Str(tag, _) => *tag,
            Value::Object(_) => Tag::Object,
            Value::Array { .. } => Tag::Array,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }
    pub fn as_i8(&self) -> Option<i8> {
        match self {
            Value::I8(v) => Some(*v),
            _ => None,
        }
    }
    pub fn as_i16(&self) -> Option<i16> {
        match self {
            Value::I16(v) => Some(*v),
            _ => None,
        }
    }
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::I32(v) => Some(*v),
            _ => None,
        }
    }
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I64(v) => Some(*v),
            _ => None,
        }
    }
    pub fn as_u8(&self) -> Option<u8> {
        match self {
            Value::U8(v) => Some(*v),
            _ => None,
        }
    }
    pub fn as_u16(&self) -> Option<u16> {
        match self {
            Value::U16(v) => Some(*v),
            _ => None,
        }
    }
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Value::U32(v) => Some(*v),
            _ => None,
        }
    }
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::U64(v) => Some(*v),
            _ => None,
        }
    }
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Value::F32(v) => Some(*v),
            _ => None,
        }
    }
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::F64(v) => Some(*v),
            _ => None,
        }
    }
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(_, s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn object_get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(fields) => fields.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn object_keys(&self) -> Option<impl Iterator<Item = &str>> {
        match self {
            Value::Object(fields) => Some(fields.iter().map(|(k, _)| k.as_str())),
            _ => None,
        }
    }

    pub fn object_len(&self) -> Option<usize> {
        match self {
            Value::Object(fields) => Some(fields.len()),
            _ => None,
        }
    }

    pub fn array_get(&self, index: usize) -> Option<&Value> {
        match self {
            Value::Array { items, .. } => items.get(index),
            _ => None,
        }
    }

    pub fn array_len(&self) -> Option<usize> {
        match self {
            Value::Array { items, .. } => Some(items.len()),
            _ => None,
        }
    }

    /// The element tag of a typed array, if any.
    pub fn array_elem_tag(&self) -> Option<Tag> {
        match self {
            Value::Array { elem_tag, .. } => *elem_tag,
            _ => None,
        }
    }

    /// Insert `child` under `key`, taking ownership of it. Fails with `DuplicateKey`
    /// if `key` is already present.
    pub fn object_insert(&mut self, key: impl Into<String>, child: Value) -> Result<(), GblnError> {
        match self {
            Value::Object(fields) => {
                let key = key.into();
                if fields.iter().any(|(k, _)| k == &key) {
                    return Err(GblnError::new(
                        ErrorKind::DuplicateKey,
                        format!("key `{}` already present in object", key),
                    ));
                }
                fields.push((key, child));
                Ok(())
            }
            _ => Err(GblnError::new(
                ErrorKind::TypeMismatch,
                "object_insert called on a non-object value",
            )),
        }
    }

    /// Append `child`, taking ownership of it. Fails with `TypeMismatch` if `self` is
    /// a typed array and `child`'s tag doesn't match.
    pub fn array_push(&mut self, child: Value) -> Result<(), GblnError> {
        match self {
            Value::Array { elem_tag, items } => {
                if let Some(tag) = elem_tag {
                    if child.type_of() != *tag {
                        return Err(GblnError::new(
                            ErrorKind::TypeMismatch,
                            format!(
                                "array element of type `{}` does not match declared type `{}`",
                                child.type_of().as_str(),
                                tag.as_str()
                            ),
                        ));
                    }
                }
                items.push(child);
                Ok(())
            }
            _ => Err(GblnError::new(
                ErrorKind::TypeMismatch,
                "array_push called on a non-array value",
            )),
        }
    }

    /// Render a debug tree of this value, useful while developing grammars or
    /// inspecting a parsed document interactively.
    pub fn print_tree(&self) -> std::io::Result<()> {
        ptree::print_tree(&DebugTree::from_value(None, self))
    }
}

/// A label-carrying shadow tree used only to give [ptree::TreeItem] something to
/// print; `Value` itself has no room for a field's key once nested inside an object.
struct DebugTree {
    label: String,
    children: Vec<DebugTree>,
}

impl DebugTree {
    fn from_value(key: Option<&str>, value: &Value) -> Self {
        let label = match key {
            Some(key) => format!("{}: {}", key, Self::render_scalar(value)),
            None => Self::render_scalar(value),
        };
        let children = match value {
            Value::Object(fields) => fields
                .iter()
                .map(|(k, v)| DebugTree::from_value(Some(k), v))
                .collect(),
            Value::Array { items, .. } => items
                .iter()
                .map(|v| DebugTree::from_value(None, v))
                .collect(),
            _ => Vec::new(),
        };
        DebugTree { label, children }
    }

    fn render_scalar(value: &Value) -> String {
        match value {
            Value::Object(fields) => format!("object ({} fields)", fields.len()),
            Value::Array { elem_tag, items } => match elem_tag {
                Some(tag) => format!("array<{}> ({} items)", tag.as_str(), items.len()),
                None => format!("array ({} items)", items.len()),
            },
            other => format!("{}", ScalarDisplay(other)),
        }
    }
}

struct ScalarDisplay<'v>(&'v Value);

impl<'v> std::fmt::Display for ScalarDisplay<'v> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Value::Null => write!(f, "n()"),
            Value::Bool(b) => write!(f, "b({})", if *b { "t" } else { "f" }),
            Value::I8(v) => write!(f, "i8({})", v),
            Value::I16(v) => write!(f, "i16({})", v),
            Value::I32(v) => write!(f, "i32({})", v),
            Value::I64(v) => write!(f, "i64({})", v),
            Value::U8(v) => write!(f, "u8({})", v),
            Value::U16(v) => write!(f, "u16({})", v),
            Value::U32(v) => write!(f, "u32({})", v),
            Value::U64(v) => write!(f, "u64({})", v),
            Value::F32(v) => write!(f, "f32({})", v),
            Value::F64(v) => write!(f, "f64({})", v),
            Value::Str(tag, s) => write!(f, "{}({})", tag.as_str(), s),
            Value::Object(_) | Value::Array { .. } => unreachable!(),
        }
    }
}

impl TreeItem for DebugTree {
    type Child = Self;

    fn write_self<W: std::io::Write>(&self, f: &mut W, _: &ptree::Style) -> std::io::Result<()> {
        write!(f, "{}", self.label)
    }

    fn children(&self) -> Cow<[Self::Child]> {
        Cow::from(&self.children)
    }
}

impl Clone for DebugTree {
    fn clone(&self) -> Self {
        DebugTree {
            label: self.label.clone(),
            children: self.children.clone(),
        }
    }
}

#[cfg(test)]
mod value_test {
    use super::*;

    #[test]
    fn accessors_return_none_for_wrong_shape() {
        let v = Value::i32(5);
        assert_eq!(v.as_i32(), Some(5));
        assert_eq!(v.as_i8(), None);
        assert_eq!(v.as_bool(), None);
        assert_eq!(v.object_get("x"), None);
    }

    #[test]
    fn object_insert_rejects_duplicate_key() {
        let mut obj = Value::object();
        obj.object_insert("a", Value::i32(1)).unwrap();
        let err = obj.object_insert("a", Value::i32(2)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateKey);
    }

    #[test]
    fn typed_array_rejects_mismatched_element() {
        let mut arr = Value::typed_array(Tag::I8);
        arr.array_push(Value::i8(1)).unwrap();
        let err = arr.array_push(Value::i16(2)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn str_tagged_rejects_too_long() {
        let long = "x".repeat(300);
        let err = Value::str_tagged(Tag::S8, long).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StringTooLong);
    }

    #[test]
    fn str_tagged_rejects_non_string_tag_without_panicking() {
        let err = Value::str_tagged(Tag::I8, "x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidTypeHint);
    }

    #[test]
    fn str_tagged_exact_length_boundary() {
        let exact = "x".repeat(1 << 8);
        assert!(Value::str_tagged(Tag::S8, exact).is_ok());
        let over = "x".repeat((1 << 8) + 1);
        let err = Value::str_tagged(Tag::S8, over).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StringTooLong);
    }

    #[test]
    fn null_is_distinct_from_missing_key() {
        let mut obj = Value::object();
        obj.object_insert("k", Value::null()).unwrap();
        assert!(obj.object_get("k").unwrap().is_null());
        assert!(obj.object_get("missing").is_none());
    }
}
