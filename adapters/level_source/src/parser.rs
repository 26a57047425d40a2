//! Structured scan of object literals that describe levels.

use std::{collections::HashMap, ops::Range};

use cave_audit_core::{Grid, LevelRecord};

use crate::{
    lexer::{Token, TokenKind},
    SourceError,
};

const NAME: &str = "name";
const TIME_LIMIT: &str = "timeLimit";
const DIAMONDS_REQUIRED: &str = "diamondsRequired";
const PATTERN: &str = "pattern";
const ENEMIES: &str = "enemies";

/// Level record located in the source together with its pattern body span.
#[derive(Clone, Debug)]
pub(crate) struct ParsedLevel {
    pub(crate) record: LevelRecord,
    pub(crate) pattern_span: Range<usize>,
}

#[derive(Debug)]
struct Frame {
    opener: char,
    offset: usize,
    properties: HashMap<String, Token>,
}

/// Collects every object literal that carries level keys, in source order.
pub(crate) fn parse_levels(
    source: &str,
    tokens: &[Token],
) -> Result<Vec<ParsedLevel>, SourceError> {
    let mut stack: Vec<Frame> = Vec::new();
    let mut levels = Vec::new();

    for (index, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::Punct(opener @ ('{' | '[' | '(')) => stack.push(Frame {
                opener,
                offset: token.span.start,
                properties: HashMap::new(),
            }),
            TokenKind::Punct(closer @ ('}' | ']' | ')')) => {
                let frame = stack
                    .pop()
                    .ok_or_else(|| SourceError::unbalanced(closer, source, token.span.start))?;
                if frame.opener != matching_opener(closer) {
                    return Err(SourceError::unbalanced(closer, source, token.span.start));
                }
                if frame.opener == '{' {
                    if let Some(level) = level_from_frame(source, frame)? {
                        levels.push(level);
                    }
                }
            }
            TokenKind::Punct(':') => {
                let Some(frame) = stack.last_mut() else {
                    continue;
                };
                let (Some(key), Some(value)) = (
                    index.checked_sub(1).and_then(|key| tokens.get(key)),
                    tokens.get(index + 1),
                ) else {
                    continue;
                };
                let key = match key.kind {
                    TokenKind::Ident => key.text(source),
                    TokenKind::Str => &source[key.inner_span()],
                    _ => continue,
                };
                if matches!(value.kind, TokenKind::Punct(_)) {
                    continue;
                }
                // Later duplicates override earlier ones, as in an object literal.
                let _ = frame.properties.insert(key.to_owned(), value.clone());
            }
            _ => {}
        }
    }

    if let Some(frame) = stack.pop() {
        return Err(SourceError::unbalanced(frame.opener, source, frame.offset));
    }

    Ok(levels)
}

fn matching_opener(closer: char) -> char {
    match closer {
        '}' => '{',
        ']' => '[',
        _ => '(',
    }
}

fn level_from_frame(source: &str, frame: Frame) -> Result<Option<ParsedLevel>, SourceError> {
    let properties = frame.properties;
    let (Some(name), Some(pattern)) = (properties.get(NAME), properties.get(PATTERN)) else {
        return Ok(None);
    };

    if name.kind != TokenKind::Str {
        return Err(SourceError::invalid_field("?", NAME, source, name.span.start));
    }
    let name = source[name.inner_span()].to_owned();

    if pattern.kind != TokenKind::Template {
        return Err(SourceError::invalid_field(&name, PATTERN, source, pattern.span.start));
    }
    let pattern_span = pattern.inner_span();

    let number = |field: &'static str| -> Result<u32, SourceError> {
        let token = properties
            .get(field)
            .ok_or_else(|| SourceError::MissingField {
                level: name.clone(),
                field,
            })?;
        if token.kind != TokenKind::Number {
            return Err(SourceError::invalid_field(&name, field, source, token.span.start));
        }
        token
            .text(source)
            .parse()
            .map_err(|_| SourceError::invalid_field(&name, field, source, token.span.start))
    };

    let time_limit = number(TIME_LIMIT)?;
    if time_limit == 0 {
        let offset = properties.get(TIME_LIMIT).map_or(frame.offset, |token| token.span.start);
        return Err(SourceError::invalid_field(&name, TIME_LIMIT, source, offset));
    }
    let diamonds_required = number(DIAMONDS_REQUIRED)?;
    let enemies = number(ENEMIES)?;

    let grid = Grid::parse(&source[pattern_span.clone()]);
    Ok(Some(ParsedLevel {
        record: LevelRecord::new(name, time_limit, diamonds_required, enemies, grid),
        pattern_span,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn parse(source: &str) -> Result<Vec<ParsedLevel>, SourceError> {
        parse_levels(source, &tokenize(source)?)
    }

    #[test]
    fn nested_records_inside_arrays_are_found() {
        let source = r##"
export const LEVELS = [
    {
        name: "INTRO",
        timeLimit: 150,
        diamondsRequired: 1,
        colors: { wall: "#888" },
        pattern: `
WWW
WP*
WWW
`,
        enemies: 0
    },
];
function helper(a) { return a ? 1 : 2; }
"##;

        let levels = parse(source).expect("source parses");

        assert_eq!(levels.len(), 1);
        let record = &levels[0].record;
        assert_eq!(record.name(), "INTRO");
        assert_eq!(record.time_limit(), 150);
        assert_eq!(record.diamonds_required(), 1);
        assert_eq!(record.enemies(), 0);
        assert_eq!(record.grid().render(), "WWW\nWP*\nWWW");
        assert_eq!(&source[levels[0].pattern_span.clone()], "\nWWW\nWP*\nWWW\n");
    }

    #[test]
    fn quoted_keys_are_accepted() {
        let source = r#"{ "name": "Q", "timeLimit": 9, "diamondsRequired": 0, "pattern": `P`, "enemies": 2 }"#;

        let levels = parse(source).expect("source parses");

        assert_eq!(levels[0].record.name(), "Q");
        assert_eq!(levels[0].record.enemies(), 2);
    }

    #[test]
    fn missing_field_names_level_and_key() {
        let source = r#"{ name: "GUARDS", timeLimit: 150, pattern: `P`, enemies: 0 }"#;

        let error = parse(source).expect_err("diamondsRequired missing");

        assert!(matches!(
            error,
            SourceError::MissingField { ref level, field: "diamondsRequired" } if level == "GUARDS"
        ));
    }

    #[test]
    fn zero_time_limit_is_rejected() {
        let source = r#"{ name: "Z", timeLimit: 0, diamondsRequired: 1, pattern: `P`, enemies: 0 }"#;

        assert!(matches!(
            parse(source),
            Err(SourceError::InvalidField {
                field: "timeLimit",
                ..
            })
        ));
    }

    #[test]
    fn unbalanced_braces_are_rejected() {
        assert!(matches!(
            parse("[ { name: \"X\" ]"),
            Err(SourceError::Unbalanced { delimiter: ']', .. })
        ));
        assert!(matches!(
            parse("{ {"),
            Err(SourceError::Unbalanced { delimiter: '{', .. })
        ));
    }

    #[test]
    fn duplicate_keys_take_the_last_value() {
        let source = r#"{
    name: "TWICE",
    timeLimit: 60,
    diamondsRequired: 1,
    pattern: `WP`,
    diamondsRequired: 5,
    pattern: `
WP*
`,
    enemies: 0
}"#;

        let levels = parse(source).expect("source parses");

        assert_eq!(levels.len(), 1);
        let level = &levels[0];
        assert_eq!(level.record.diamonds_required(), 5);
        assert_eq!(level.record.grid().render(), "WP*");
        assert_eq!(&source[level.pattern_span.clone()], "\nWP*\n");
    }

    #[test]
    fn objects_without_pattern_are_ignored() {
        let levels = parse(r#"{ name: "settings", volume: 3 }"#).expect("source parses");
        assert!(levels.is_empty());
    }
}
