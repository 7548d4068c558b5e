//! GBLN is a compact, human-readable data interchange format similar in role to
//! JSON, but with mandatory-or-inferred scalar type hints, size-bounded strings, and a
//! terse punctuation-only framing. This crate implements the core engine: the lexer
//! and recursive-descent parser that turn GBLN source text into a typed [Value] tree,
//! the type-checker/coercer enforcing each scalar's declared size class, the
//! serializer rendering a tree back to compact or pretty text, and a structured error
//! model with a thread-local last-error facade.
//!
//! # Example
//!
//! ```
//! use gbln::{parse, serialize_compact};
//!
//! let doc = parse("{id<u32>(12345)name<s32>(Alice)}").unwrap();
//! assert_eq!(doc.object_get("id").unwrap().as_u32(), Some(12345));
//! assert_eq!(doc.object_get("name").unwrap().as_str(), Some("Alice"));
//!
//! let text = serialize_compact(&doc).unwrap();
//! assert_eq!(parse(&text).unwrap(), doc);
//! ```
//!
//! # Wrapping
//!
//! A named top-level value — `name{...}`, `name[...]`, `name<tag>(...)`, or
//! `name(...)` — is sugar for a single-field object `{ name: value }`; a bare
//! `{...}`/`[...]` is the value itself. `parse` therefore always returns an `Object`
//! or `Array`, never a bare scalar.
//!
//! # License
//! [gbln](crate) is provided under the MIT license. See [LICENSE](https://github.com/creative-forest/gbln/blob/main/LICENSE).

mod coerce;
pub mod error;
mod last_error;
mod lexer;
pub mod parser;
pub mod position;
pub mod serializer;
pub mod value;

pub use error::{ErrorKind, GblnError};
pub use last_error::last_error;
pub use parser::{parse, parse_with_log};
pub use position::Log;
pub use serializer::{serialize, serialize_compact, serialize_pretty, SerializeOptions};
pub use value::{Tag, Value};
