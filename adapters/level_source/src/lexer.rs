//! Tokenizer for the JavaScript-like level definition source.

use std::ops::Range;

use crate::SourceError;

/// Category of a lexed token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TokenKind {
    /// Identifier or keyword.
    Ident,
    /// Single- or double-quoted string; the span includes the quotes.
    Str,
    /// Backtick template literal; the span includes the backticks.
    Template,
    /// Numeric literal.
    Number,
    /// Any other single character.
    Punct(char),
}

/// Token together with its byte span in the source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) span: Range<usize>,
}

impl Token {
    /// Source text covered by the token.
    pub(crate) fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.span.clone()]
    }

    /// Contents between the delimiters of a string or template token.
    pub(crate) fn inner_span(&self) -> Range<usize> {
        match self.kind {
            TokenKind::Str | TokenKind::Template => self.span.start + 1..self.span.end - 1,
            _ => self.span.clone(),
        }
    }
}

/// Splits the source into tokens, skipping whitespace and comments.
pub(crate) fn tokenize(source: &str) -> Result<Vec<Token>, SourceError> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some((start, symbol)) = chars.next() {
        if symbol.is_whitespace() {
            continue;
        }

        let kind = match symbol {
            '/' if matches!(chars.peek(), Some((_, '/'))) => {
                for (_, next) in chars.by_ref() {
                    if next == '\n' {
                        break;
                    }
                }
                continue;
            }
            '/' if matches!(chars.peek(), Some((_, '*'))) => {
                let _ = chars.next();
                let mut previous = '\0';
                let mut closed = false;
                for (_, next) in chars.by_ref() {
                    if previous == '*' && next == '/' {
                        closed = true;
                        break;
                    }
                    previous = next;
                }
                if !closed {
                    return Err(SourceError::unterminated("comment", source, start));
                }
                continue;
            }
            '"' | '\'' | '`' => {
                let mut escaped = false;
                let mut closed = false;
                for (_, next) in chars.by_ref() {
                    if escaped {
                        escaped = false;
                    } else if next == '\\' {
                        escaped = true;
                    } else if next == symbol {
                        closed = true;
                        break;
                    } else if next == '\n' && symbol != '`' {
                        break;
                    }
                }
                if !closed {
                    let what = if symbol == '`' { "template" } else { "string" };
                    return Err(SourceError::unterminated(what, source, start));
                }
                if symbol == '`' {
                    TokenKind::Template
                } else {
                    TokenKind::Str
                }
            }
            symbol if symbol.is_ascii_digit() => {
                while chars
                    .peek()
                    .is_some_and(|&(_, next)| next.is_ascii_alphanumeric() || next == '_' || next == '.')
                {
                    let _ = chars.next();
                }
                TokenKind::Number
            }
            symbol if symbol.is_alphabetic() || symbol == '_' || symbol == '$' => {
                while chars
                    .peek()
                    .is_some_and(|&(_, next)| next.is_alphanumeric() || next == '_' || next == '$')
                {
                    let _ = chars.next();
                }
                TokenKind::Ident
            }
            other => TokenKind::Punct(other),
        };

        let end = chars.peek().map_or(source.len(), |&(offset, _)| offset);
        tokens.push(Token {
            kind,
            span: start..end,
        });
    }

    Ok(tokens)
}
