use crate::error::{ErrorKind, GblnError};
use crate::position::{Code, Log};

/// A lexical token kind. `Payload` spans an entire `(...)` including both
/// parentheses; its content is the raw byte range strictly between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Lt,
    Gt,
    Ident,
    Payload,
    Eof,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    fn new(kind: TokenKind, start: usize, end: usize) -> Self {
        Self { kind, start, end }
    }

    /// The lexeme text of an `Ident` token, or the raw content of a `Payload` token
    /// with its surrounding parentheses stripped.
    pub fn text<'c>(&self, code: &Code<'c>) -> &'c str {
        let (start, end) = match self.kind {
            TokenKind::Payload => (self.start + 1, self.end - 1),
            _ => (self.start, self.end),
        };
        unsafe { std::str::from_utf8_unchecked(&code.value[start..end]) }
    }
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.' | b'+')
}

fn is_whitespace_byte(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n')
}

/// Split `code` into a token stream, ending with a single `Eof` token.
///
/// `log` enables a debug-build-only trace of each emitted token; pass `Log::None` to
/// disable it entirely (the default, and the only option in release builds).
pub fn tokenize(code: &Code, log: Log<&'static str>) -> Result<Vec<Token>, GblnError> {
    let bytes = code.value;
    let mut pointer = 0usize;
    let mut tokens = Vec::new();

    while pointer < bytes.len() {
        let b = bytes[pointer];
        if is_whitespace_byte(b) {
            pointer += 1;
            continue;
        }
        let token = match b {
            b'{' => Token::new(TokenKind::LBrace, pointer, pointer + 1),
            b'}' => Token::new(TokenKind::RBrace, pointer, pointer + 1),
            b'[' => Token::new(TokenKind::LBracket, pointer, pointer + 1),
            b']' => Token::new(TokenKind::RBracket, pointer, pointer + 1),
            b'<' => Token::new(TokenKind::Lt, pointer, pointer + 1),
            b'>' => Token::new(TokenKind::Gt, pointer, pointer + 1),
            b'(' => {
                let start = pointer;
                let mut end = pointer + 1;
                loop {
                    if end >= bytes.len() {
                        return Err(GblnError::new(
                            ErrorKind::UnterminatedString,
                            "unterminated `(...)` payload",
                        )
                        .at(code.position_at(start)));
                    }
                    if bytes[end] == b')' {
                        end += 1;
                        break;
                    }
                    end += 1;
                }
                Token::new(TokenKind::Payload, start, end)
            }
            _ if is_ident_byte(b) => {
                let start = pointer;
                let mut end = pointer + 1;
                while end < bytes.len() && is_ident_byte(bytes[end]) {
                    end += 1;
                }
                Token::new(TokenKind::Ident, start, end)
            }
            _ => {
                return Err(GblnError::new(
                    ErrorKind::UnexpectedChar,
                    format!("unexpected byte `{}`", b as char),
                )
                .at(code.position_at(pointer)));
            }
        };

        #[cfg(debug_assertions)]
        if log.order() >= Log::Verbose(()).order() {
            println!(
                "[{}] token {:?} @ {}",
                log,
                token.kind,
                code.position_at(token.start)
            );
        }

        pointer = token.end;
        tokens.push(token);
    }

    tokens.push(Token::new(TokenKind::Eof, bytes.len(), bytes.len()));

    #[cfg(debug_assertions)]
    if log.order() >= Log::Success(()).order() {
        println!("[{}] tokenization succeeded, {} tokens", log, tokens.len());
    }

    Ok(tokens)
}
