use crate::coerce::{coerce_scalar, infer_scalar};
use crate::error::{ErrorKind, GblnError};
use crate::last_error;
use crate::lexer::{tokenize, Token, TokenKind};
use crate::position::{Code, Log};
use crate::value::{Tag, Value};

/// Parse a GBLN document into a [Value] tree.
///
/// Per the wrap rule (`SPEC_FULL.md` §4.2), the result is always an `Object` or
/// `Array` — a named top-level scalar/object/array is wrapped into a single-field
/// outer object, and a bare `{...}`/`[...]` is returned as-is.
pub fn parse(text: &str) -> Result<Value, GblnError> {
    parse_with_log(text, Log::None)
}

/// As [parse], but with an explicit debug trace level (no-op outside debug builds).
pub fn parse_with_log(text: &str, log: Log<&'static str>) -> Result<Value, GblnError> {
    let code = Code::from(text);
    let run = || -> Result<Value, GblnError> {
        let tokens = tokenize(&code, log)?;
        let mut parser = Parser::new(&code, &tokens, log);
        let value = parser.parse_document()?;
        parser.expect(TokenKind::Eof)?;
        Ok(value)
    };
    run().map_err(last_error::record)
}

struct Parser<'c, 't> {
    code: &'c Code<'c>,
    tokens: &'t [Token],
    pos: usize,
    log: Log<&'static str>,
}

impl<'c, 't> Parser<'c, 't> {
    fn new(code: &'c Code<'c>, tokens: &'t [Token], log: Log<&'static str>) -> Self {
        Self {
            code,
            tokens,
            pos: 0,
            log,
        }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos];
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        #[cfg(debug_assertions)]
        if self.log.order() >= Log::Verbose(()).order() {
            println!(
                "[{}] consumed {:?} @ {}",
                self.log,
                token.kind,
                self.code.position_at(token.start)
            );
        }
        token
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, GblnError> {
        let token = *self.peek();
        if token.kind == kind {
            Ok(self.advance())
        } else if token.kind == TokenKind::Eof {
            Err(GblnError::new(
                ErrorKind::UnexpectedEof,
                format!("expected {:?} but reached end of input", kind),
            )
            .at(self.code.position_at(token.start)))
        } else {
            Err(GblnError::new(
                ErrorKind::UnexpectedToken,
                format!("expected {:?} but found {:?}", kind, token.kind),
            )
            .at(self.code.position_at(token.start)))
        }
    }

    fn ident_text(&self, token: &Token) -> &'c str {
        token.text(self.code)
    }

    /// Parse the document root: dispatches on the first token exactly as any other
    /// value position, wrapping a named scalar/object/array per the wrap rule.
    fn parse_document(&mut self) -> Result<Value, GblnError> {
        match self.peek().kind {
            TokenKind::LBrace => self.parse_object_body(),
            TokenKind::LBracket => self.parse_array_body(None),
            TokenKind::Ident => {
                let name_token = self.advance();
                let name = self.ident_text(&name_token).to_string();
                let value = self.parse_value_for_name()?;
                let mut wrapper = Value::object();
                wrapper.object_insert(name, value)?;
                Ok(wrapper)
            }
            TokenKind::Eof => Err(GblnError::new(ErrorKind::UnexpectedEof, "empty document")
                .at(self.code.position_at(self.peek().start))),
            other => Err(GblnError::new(
                ErrorKind::UnexpectedToken,
                format!("unexpected {:?} at document root", other),
            )
            .at(self.code.position_at(self.peek().start))),
        }
    }

    /// Parse whatever follows a just-consumed leading `Ident`: a typed scalar, typed
    /// array, inferred scalar, named object, or named (untyped) array. Shared between
    /// the document root (after the wrap-name) and object fields (after the key).
    fn parse_value_for_name(&mut self) -> Result<Value, GblnError> {
        match self.peek().kind {
            TokenKind::Lt => {
                let tag = self.parse_type_hint()?;
                match self.peek().kind {
                    TokenKind::LBracket => self.parse_array_body(Some(tag)),
                    TokenKind::Payload => {
                        let payload = self.advance();
                        coerce_scalar(tag, payload.text(self.code))
                            .map_err(|e| e.at(self.code.position_at(payload.start)))
                    }
                    other => Err(GblnError::new(
                        ErrorKind::UnexpectedToken,
                        format!("expected `(` or `[` after type hint, found {:?}", other),
                    )
                    .at(self.code.position_at(self.peek().start))),
                }
            }
            TokenKind::Payload => {
                let payload = self.advance();
                infer_scalar(payload.text(self.code))
                    .map_err(|e| e.at(self.code.position_at(payload.start)))
            }
            TokenKind::LBrace => self.parse_object_body(),
            TokenKind::LBracket => self.parse_array_body(None),
            other => Err(GblnError::new(
                ErrorKind::UnexpectedToken,
                format!("expected `<`, `(`, `{{` or `[` after identifier, found {:?}", other),
            )
            .at(self.code.position_at(self.peek().start))),
        }
    }

    /// `'<' Ident '>'`, resolving the tag name; `InvalidTypeHint` for an unknown tag.
    fn parse_type_hint(&mut self) -> Result<Tag, GblnError> {
        self.expect(TokenKind::Lt)?;
        let ident = self.expect(TokenKind::Ident)?;
        let hint = self.ident_text(&ident);
        let tag = Tag::from_hint(hint).ok_or_else(|| {
            GblnError::new(ErrorKind::InvalidTypeHint, format!("unknown type hint `{}`", hint))
                .with_suggestion(
                    "use one of i8, i16, i32, i64, u8, u16, u32, u64, f32, f64, s8, s16, s32, s64, b, n",
                )
                .at(self.code.position_at(ident.start))
        })?;
        self.expect(TokenKind::Gt)?;
        Ok(tag)
    }

    /// `[Ident] '{' field* '}'` with the leading name already consumed by the caller;
    /// this handles only the bare `'{' field* '}'` portion.
    fn parse_object_body(&mut self) -> Result<Value, GblnError> {
        self.expect(TokenKind::LBrace)?;
        let mut object = Value::object();
        while self.peek().kind != TokenKind::RBrace {
            let key_token = self.expect(TokenKind::Ident)?;
            let key = self.ident_text(&key_token).to_string();
            let value = self.parse_value_for_name()?;
            object
                .object_insert(key, value)
                .map_err(|e| e.at(self.code.position_at(key_token.start)))?;
        }
        self.expect(TokenKind::RBrace)?;
        Ok(object)
    }

    /// `'[' element* ']'`; `elem_tag` forces every element through that type's coercer.
    fn parse_array_body(&mut self, elem_tag: Option<Tag>) -> Result<Value, GblnError> {
        self.expect(TokenKind::LBracket)?;
        let mut array = match elem_tag {
            Some(tag) => Value::typed_array(tag),
            None => Value::array(),
        };
        while self.peek().kind != TokenKind::RBracket {
            let element = self.parse_element(elem_tag)?;
            array
                .array_push(element)
                .map_err(|e| e.at(self.code.position_at(self.peek().start)))?;
        }
        self.expect(TokenKind::RBracket)?;
        Ok(array)
    }

    /// `element := value | Ident`. A bare `Ident` not immediately followed by a
    /// value-opening token is a raw scalar lexeme, coerced via `elem_tag` if the
    /// array is typed, else inferred. An `Ident` that IS followed by a value-opening
    /// token is a named value nested in the array, wrapped the same way the document
    /// root wraps a name (this only arises in untyped/heterogeneous arrays).
    fn parse_element(&mut self, elem_tag: Option<Tag>) -> Result<Value, GblnError> {
        match self.peek().kind {
            TokenKind::LBrace => self.parse_object_body(),
            TokenKind::LBracket => self.parse_array_body(None),
            TokenKind::Ident => {
                let starts_named_value = matches!(
                    self.tokens.get(self.pos + 1).map(|t| t.kind),
                    Some(TokenKind::Lt)
                        | Some(TokenKind::Payload)
                        | Some(TokenKind::LBrace)
                        | Some(TokenKind::LBracket)
                );
                if starts_named_value {
                    let name_token = self.advance();
                    let name = self.ident_text(&name_token).to_string();
                    let value = self.parse_value_for_name()?;
                    let mut wrapper = Value::object();
                    wrapper.object_insert(name, value)?;
                    Ok(wrapper)
                } else {
                    let token = self.advance();
                    let raw = self.ident_text(&token);
                    let result = match elem_tag {
                        Some(tag) => coerce_scalar(tag, raw),
                        None => infer_scalar(raw),
                    };
                    result.map_err(|e| e.at(self.code.position_at(token.start)))
                }
            }
            TokenKind::Eof => Err(GblnError::new(ErrorKind::UnexpectedEof, "unterminated array")
                .at(self.code.position_at(self.peek().start))),
            other => Err(GblnError::new(
                ErrorKind::UnexpectedToken,
                format!("unexpected {:?} in array element position", other),
            )
            .at(self.code.position_at(self.peek().start))),
        }
    }
}

#[cfg(test)]
mod parser_test {
    use super::*;

    #[test]
    fn scenario_1_two_typed_fields() {
        let v = parse("{id<u32>(12345)name<s32>(Alice)}").unwrap();
        assert_eq!(v.object_len(), Some(2));
        assert_eq!(v.object_get("id").unwrap().as_u32(), Some(12345));
        assert_eq!(v.object_get("name").unwrap().as_str(), Some("Alice"));
    }

    #[test]
    fn scenario_2_typed_scalar_overflow_is_type_mismatch() {
        let err = parse("{age<i8>(999)}").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        assert!(err.message().contains("999"));
        assert_eq!(err.suggestion(), Some("use `i16` or larger"));
    }

    #[test]
    fn scenario_3_typed_string_array() {
        let v = parse("{tags<s16>[rust python golang]}").unwrap();
        let tags = v.object_get("tags").unwrap();
        assert_eq!(tags.array_len(), Some(3));
        assert_eq!(tags.array_get(0).unwrap().as_str(), Some("rust"));
        assert_eq!(tags.array_get(2).unwrap().as_str(), Some("golang"));
    }

    #[test]
    fn scenario_4_inferred_fields() {
        let v = parse("{name(Alice)age(25)active(true)score(98.5)}").unwrap();
        assert_eq!(v.object_get("name").unwrap().as_str(), Some("Alice"));
        assert_eq!(v.object_get("age").unwrap().as_i64(), Some(25));
        assert_eq!(v.object_get("active").unwrap().as_bool(), Some(true));
        let score = v.object_get("score").unwrap().as_f64().unwrap();
        assert!((score - 98.5).abs() < 1e-9);
    }

    #[test]
    fn scenario_5_top_level_wrap_and_untyped_int_array() {
        let v = parse("temps[-15 -5 0 5 15]").unwrap();
        let temps = v.object_get("temps").unwrap();
        assert_eq!(temps.array_len(), Some(5));
        assert_eq!(temps.array_get(0).unwrap().as_i64(), Some(-15));
    }

    #[test]
    fn scenario_6_null_field() {
        let v = parse("{optional<n>()}").unwrap();
        let optional = v.object_get("optional").unwrap();
        assert!(optional.is_null());
        assert_eq!(optional.as_bool(), None);
    }

    #[test]
    fn bare_object_is_not_wrapped() {
        let v = parse("{}").unwrap();
        assert_eq!(v.object_len(), Some(0));
    }

    #[test]
    fn bare_array_is_not_wrapped() {
        let v = parse("[]").unwrap();
        assert_eq!(v.array_len(), Some(0));
    }

    #[test]
    fn duplicate_key_is_rejected_at_any_depth() {
        let err = parse("{a(1)a(2)}").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateKey);

        let err = parse("{outer{a(1)a(2)}}").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateKey);
    }

    #[test]
    fn top_level_typed_array_is_first_class() {
        let v = parse("scores<i8>[1 2 3]").unwrap();
        let scores = v.object_get("scores").unwrap();
        assert_eq!(scores.array_elem_tag(), Some(Tag::I8));
        assert_eq!(scores.array_len(), Some(3));
    }

    #[test]
    fn typed_array_element_out_of_range_is_type_mismatch() {
        let err = parse("{ages<i8>[25 300]}").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    }

    #[test]
    fn string_over_declared_size_class_is_string_too_long() {
        let long = "x".repeat((1 << 8) + 1);
        let text = format!("{{note<s8>({})}}", long);
        let err = parse(&text).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StringTooLong);
    }

    #[test]
    fn unknown_type_hint_is_invalid_type_hint() {
        let err = parse("{x<weird>(1)}").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidTypeHint);
        assert!(err.suggestion().unwrap().contains("i8"));
    }

    #[test]
    fn named_object_wraps_into_single_field_outer_object() {
        let v = parse("person{name(Alice)}").unwrap();
        assert_eq!(v.object_len(), Some(1));
        let person = v.object_get("person").unwrap();
        assert_eq!(person.object_get("name").unwrap().as_str(), Some("Alice"));
    }

    #[test]
    fn nested_untyped_array_of_objects() {
        let v = parse("[{a(1)} {b(2)}]").unwrap();
        assert_eq!(v.array_len(), Some(2));
        assert_eq!(v.array_get(0).unwrap().object_get("a").unwrap().as_i64(), Some(1));
    }

    #[test]
    fn trailing_garbage_after_document_is_rejected() {
        let err = parse("{}{}").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedToken);
    }

    #[test]
    fn empty_input_is_unexpected_eof() {
        let err = parse("").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedEof);
    }

    #[test]
    fn parse_failure_is_recorded_in_last_error() {
        crate::last_error::clear_last_error();
        let _ = parse("{age<i8>(999)}");
        let last = crate::last_error::last_error().unwrap();
        assert_eq!(last.kind(), ErrorKind::TypeMismatch);
    }
}
