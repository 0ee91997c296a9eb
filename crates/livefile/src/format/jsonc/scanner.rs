use livefile_base::LivefileResult;

use crate::format::syntax_error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    OpenBrace,
    CloseBrace,
    OpenBracket,
    CloseBracket,
    Colon,
    Comma,
    String,
    /// Numbers, `true`, `false`, `null`, and anything else that is not punctuation.
    /// Validity is left to the JSON parser.
    Literal,
    LineComment,
    BlockComment,
}

impl TokenKind {
    pub(crate) fn is_comment(self) -> bool {
        matches!(self, TokenKind::LineComment | TokenKind::BlockComment)
    }
}

/// A token as a byte range into the scanned text. Whitespace is not tokenized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

fn is_delimiter(byte: u8) -> bool {
    matches!(
        byte,
        b'{' | b'}' | b'[' | b']' | b':' | b',' | b'"' | b'/' | b' ' | b'\t' | b'\r' | b'\n'
    )
}

/// Split JSON-with-comments text into tokens.
///
/// Works on bytes: every structural character is ASCII, so multi-byte UTF-8 sequences can
/// only ever end up inside strings, comments or literals.
pub(crate) fn tokenize(text: &str) -> LivefileResult<Vec<Token>> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;
    while pos < bytes.len() {
        let start = pos;
        let kind = match bytes[pos] {
            b' ' | b'\t' | b'\r' | b'\n' => {
                pos += 1;
                continue;
            }
            b'{' => TokenKind::OpenBrace,
            b'}' => TokenKind::CloseBrace,
            b'[' => TokenKind::OpenBracket,
            b']' => TokenKind::CloseBracket,
            b':' => TokenKind::Colon,
            b',' => TokenKind::Comma,
            b'"' => {
                pos = scan_string(bytes, pos)?;
                tokens.push(Token {
                    kind: TokenKind::String,
                    start,
                    end: pos,
                });
                continue;
            }
            b'/' => {
                let (kind, end) = scan_comment(bytes, pos)?;
                pos = end;
                tokens.push(Token { kind, start, end });
                continue;
            }
            _ => {
                while pos < bytes.len() && !is_delimiter(bytes[pos]) {
                    pos += 1;
                }
                tokens.push(Token {
                    kind: TokenKind::Literal,
                    start,
                    end: pos,
                });
                continue;
            }
        };
        pos += 1;
        tokens.push(Token {
            kind,
            start,
            end: pos,
        });
    }
    Ok(tokens)
}

/// Returns the position just past the closing quote.
fn scan_string(bytes: &[u8], start: usize) -> LivefileResult<usize> {
    let mut pos = start + 1;
    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' => pos += 2,
            b'"' => return Ok(pos + 1),
            b'\n' => break,
            _ => pos += 1,
        }
    }
    Err(syntax_error(
        "JSONC",
        format!("unterminated string starting at byte {}", start),
    ))
}

fn scan_comment(bytes: &[u8], start: usize) -> LivefileResult<(TokenKind, usize)> {
    match bytes.get(start + 1) {
        Some(b'/') => {
            let mut pos = start + 2;
            while pos < bytes.len() && bytes[pos] != b'\n' {
                pos += 1;
            }
            // A CRLF line ending does not belong to the comment
            if pos > start + 2 && bytes[pos - 1] == b'\r' {
                pos -= 1;
            }
            Ok((TokenKind::LineComment, pos))
        }
        Some(b'*') => {
            let mut pos = start + 2;
            while pos + 1 < bytes.len() {
                if bytes[pos] == b'*' && bytes[pos + 1] == b'/' {
                    return Ok((TokenKind::BlockComment, pos + 2));
                }
                pos += 1;
            }
            Err(syntax_error(
                "JSONC",
                format!("unterminated block comment starting at byte {}", start),
            ))
        }
        _ => Err(syntax_error(
            "JSONC",
            format!("unexpected character '/' at byte {}", start),
        )),
    }
}

/// Rewrite JSON-with-comments into plain JSON of the same byte length.
///
/// Comments and trailing commas are blanked out with spaces (newlines inside block comments
/// are kept), so positions reported by the JSON parser still point into the original text.
pub(crate) fn to_plain_json(text: &str, tokens: &[Token]) -> LivefileResult<String> {
    let mut bytes = text.as_bytes().to_vec();
    let significant: Vec<&Token> = tokens.iter().filter(|t| !t.kind.is_comment()).collect();

    for token in tokens.iter().filter(|t| t.kind.is_comment()) {
        blank(&mut bytes, token.start, token.end);
    }
    // Only a comma that follows a value and precedes a closing bracket is a trailing comma
    for triple in significant.windows(3) {
        let [before, comma, after] = triple else {
            continue;
        };
        let ends_value = matches!(
            before.kind,
            TokenKind::String | TokenKind::Literal | TokenKind::CloseBrace | TokenKind::CloseBracket
        );
        if ends_value
            && comma.kind == TokenKind::Comma
            && matches!(after.kind, TokenKind::CloseBrace | TokenKind::CloseBracket)
        {
            blank(&mut bytes, comma.start, comma.end);
        }
    }

    String::from_utf8(bytes).map_err(|e| syntax_error("JSONC", e))
}

fn blank(bytes: &mut [u8], start: usize, end: usize) {
    for byte in &mut bytes[start..end] {
        if *byte != b'\n' && *byte != b'\r' {
            *byte = b' ';
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<TokenKind> {
        tokenize(text).unwrap().iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_tokenize_object_with_comments() {
        use TokenKind::*;
        assert_eq!(
            kinds("{\"a\": 1, // one\n /* two */ \"b\": [true]}"),
            vec![
                OpenBrace,
                String,
                Colon,
                Literal,
                Comma,
                LineComment,
                BlockComment,
                String,
                Colon,
                OpenBracket,
                Literal,
                CloseBracket,
                CloseBrace
            ]
        );
    }

    #[test]
    fn test_string_with_escaped_quote_and_slashes() {
        let tokens = tokenize(r#""a \"quoted\" // not a comment""#).unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::String);
    }

    #[test]
    fn test_line_comment_excludes_crlf() {
        let text = "1 // c\r\n";
        let tokens = tokenize(text).unwrap();
        assert_eq!(&text[tokens[1].start..tokens[1].end], "// c");
    }

    #[test]
    fn test_unterminated_block_comment() {
        assert!(tokenize("{} /* open").is_err());
    }

    #[test]
    fn test_unterminated_string() {
        assert!(tokenize("{\"a: 1}").is_err());
    }

    #[test]
    fn test_lone_slash() {
        assert!(tokenize("{} / 2").is_err());
    }

    #[test]
    fn test_to_plain_json_keeps_length() {
        let text = "{\n  \"a\": 1, /* x\n y */\n  \"b\": [1, 2,],\n} // end";
        let tokens = tokenize(text).unwrap();
        let plain = to_plain_json(text, &tokens).unwrap();
        assert_eq!(plain.len(), text.len());
        let value: serde_json::Value = serde_json::from_str(&plain).unwrap();
        assert_eq!(value, serde_json::json!({"a": 1, "b": [1, 2]}));
    }

    #[test]
    fn test_comma_without_value_is_kept() {
        for text in ["{,}", "[,]", "{\"a\": [,]}", "[1,,]"] {
            let tokens = tokenize(text).unwrap();
            let plain = to_plain_json(text, &tokens).unwrap();
            assert!(
                serde_json::from_str::<serde_json::Value>(&plain).is_err(),
                "{} should stay invalid",
                text
            );
        }
    }

    #[test]
    fn test_to_plain_json_blanks_non_ascii_comment() {
        let text = "{} // grüße";
        let tokens = tokenize(text).unwrap();
        let plain = to_plain_json(text, &tokens).unwrap();
        assert_eq!(plain.trim_end(), "{}");
    }
}
