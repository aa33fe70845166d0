//! Recursive descent compiler for format strings.
//!
//! Grammar, informally:
//!
//! ```text
//! template    := (literal | "{{" | "}}" | field)*
//! field       := "{" name accessor* ("!" conversion)? (":" template)? "}"
//! name        := <chars up to one of . [ ! : }>
//! accessor    := "." <chars up to one of . [ ! : }> | "[" <chars up to ]> "]"
//! conversion  := "s" | "r"
//! ```
//!
//! The format spec after `:` is delimited by brace depth and compiled with the same numbering state,
//! so `{0:{1}}` and `{:{}}` behave consistently. Delimiters are all ASCII, so the scanner works
//! on bytes and only slices the text at delimiter boundaries.

use super::ast::{Accessor, Conversion, Field, FieldPath, FieldRoot, IndexKey, Segment, Template};
use super::error::{NumberingMode, ParseError};

/// Fields may nest this deep: a top-level field's spec may hold fields, theirs may not.
pub const MAX_NESTING_DEPTH: usize = 2;

/// Positional numbering state for one compile, threaded through every recursive call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ParseState {
    auto_numbering_ok: bool,
    next_auto_index: usize,
}

impl Default for ParseState {
    fn default() -> Self {
        Self {
            auto_numbering_ok: true,
            next_auto_index: 0,
        }
    }
}

impl ParseState {
    /// Claims the next automatic index, or fails if manual numbering is already in use.
    fn auto(self, position: usize) -> Result<(usize, ParseState), ParseError> {
        if !self.auto_numbering_ok {
            return Err(ParseError::NumberingModeConflict {
                from: NumberingMode::Manual,
                to: NumberingMode::Automatic,
                position,
            });
        }

        let next = ParseState {
            next_auto_index: self.next_auto_index + 1,
            ..self
        };
        Ok((self.next_auto_index, next))
    }

    /// Locks the template into manual numbering.
    fn manual(self, position: usize) -> Result<ParseState, ParseError> {
        if self.next_auto_index > 0 {
            return Err(ParseError::NumberingModeConflict {
                from: NumberingMode::Automatic,
                to: NumberingMode::Manual,
                position,
            });
        }

        Ok(ParseState {
            auto_numbering_ok: false,
            ..self
        })
    }
}

/// Compiles `text` into a [`Template`].
///
/// # Errors
///
/// Returns a [`ParseError`] for any structural problem; nothing is deferred to render time.
pub fn compile(text: &str) -> Result<Template, ParseError> {
    let (template, _) = parse_template(text, 0, 0, ParseState::default())?;
    Ok(template)
}

fn parse_template(
    text: &str,
    offset: usize,
    depth: usize,
    mut state: ParseState,
) -> Result<(Template, ParseState), ParseError> {
    let bytes = text.as_bytes();
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut run_start = 0;
    let mut pos = 0;

    while pos < bytes.len() {
        match bytes[pos] {
            b'{' if bytes.get(pos + 1) == Some(&b'{') => {
                literal.push_str(&text[run_start..pos]);
                literal.push('{');
                pos += 2;
                run_start = pos;
            }
            b'}' if bytes.get(pos + 1) == Some(&b'}') => {
                literal.push_str(&text[run_start..pos]);
                literal.push('}');
                pos += 2;
                run_start = pos;
            }
            b'}' => {
                return Err(ParseError::UnmatchedCloseBrace {
                    position: offset + pos,
                });
            }
            b'{' => {
                literal.push_str(&text[run_start..pos]);
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }

                let (field, next_pos, next_state) =
                    parse_field(text, pos + 1, offset, depth, state)?;
                segments.push(Segment::Field(field));
                state = next_state;
                pos = next_pos;
                run_start = pos;
            }
            _ => pos += 1,
        }
    }

    literal.push_str(&text[run_start..]);
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }

    Ok((Template::new(segments), state))
}

/// Parses one replacement field starting just after its opening brace.
///
/// Returns the field, the position just past its closing brace and the updated state.
fn parse_field(
    text: &str,
    start: usize,
    offset: usize,
    depth: usize,
    state: ParseState,
) -> Result<(Field, usize, ParseState), ParseError> {
    let bytes = text.as_bytes();
    let field_position = offset + start - 1;
    let unmatched = ParseError::UnmatchedOpenBrace {
        position: field_position,
    };

    let name_end = find_name_end(bytes, start).ok_or(unmatched.clone())?;
    let (root, mut state) = parse_root(&text[start..name_end], field_position, state)?;

    let mut pos = name_end;
    let mut accessors = Vec::new();
    loop {
        match bytes.get(pos) {
            Some(b'.') => {
                let attribute_end = find_name_end(bytes, pos + 1).ok_or(unmatched.clone())?;
                let attribute = &text[pos + 1..attribute_end];
                if attribute.is_empty() {
                    return Err(ParseError::EmptyAttribute {
                        position: offset + pos,
                    });
                }
                accessors.push(Accessor::Attribute(attribute.to_string()));
                pos = attribute_end;
            }
            Some(b'[') => {
                let key_end = bytes[pos + 1..]
                    .iter()
                    .position(|&b| b == b']')
                    .map(|i| pos + 1 + i)
                    .ok_or(ParseError::MissingCloseBracket {
                        position: offset + pos,
                    })?;
                accessors.push(Accessor::Index(IndexKey::parse(&text[pos + 1..key_end])));
                pos = key_end + 1;
            }
            _ => break,
        }
    }

    let mut conversion = None;
    if bytes.get(pos) == Some(&b'!') {
        let flag = text[pos + 1..].chars().next().ok_or(unmatched.clone())?;
        conversion = Some(match flag {
            's' => Conversion::Str,
            'r' => Conversion::Repr,
            other => {
                return Err(ParseError::UnknownConversion {
                    conversion: other,
                    position: offset + pos + 1,
                })
            }
        });
        pos += 1 + flag.len_utf8();
    }

    let path = FieldPath { root, accessors };

    match bytes.get(pos) {
        Some(b'}') => Ok((
            Field {
                path,
                conversion,
                spec: Template::default(),
            },
            pos + 1,
            state,
        )),
        Some(b':') => {
            let spec_start = pos + 1;
            let allowed_depth = MAX_NESTING_DEPTH.saturating_sub(depth + 1);
            let spec_end = find_spec_end(bytes, spec_start, allowed_depth)
                .map_err(|recursion_at| match recursion_at {
                    Some(at) => ParseError::RecursionExceeded {
                        position: offset + at,
                    },
                    None => unmatched.clone(),
                })?;

            let (spec, next_state) = parse_template(
                &text[spec_start..spec_end],
                offset + spec_start,
                depth + 1,
                state,
            )?;
            state = next_state;

            Ok((
                Field {
                    path,
                    conversion,
                    spec,
                },
                spec_end + 1,
                state,
            ))
        }
        Some(_) => Err(ParseError::ExpectedFieldEnd {
            found: text[pos..].chars().next().unwrap_or_default(),
            position: offset + pos,
        }),
        None => Err(unmatched),
    }
}

fn parse_root(
    name: &str,
    position: usize,
    state: ParseState,
) -> Result<(FieldRoot, ParseState), ParseError> {
    if name.is_empty() {
        let (index, state) = state.auto(position)?;
        return Ok((FieldRoot::Index(index), state));
    }

    if name.bytes().all(|b| b.is_ascii_digit()) {
        let state = state.manual(position)?;
        // Too large to ever be in range; rendering reports it as out of range.
        let index = name.parse::<usize>().unwrap_or(usize::MAX);
        return Ok((FieldRoot::Index(index), state));
    }

    Ok((FieldRoot::Name(name.to_string()), state))
}

fn find_name_end(bytes: &[u8], start: usize) -> Option<usize> {
    bytes[start..]
        .iter()
        .position(|b| matches!(b, b'.' | b'[' | b'!' | b':' | b'}'))
        .map(|i| start + i)
}

/// Finds the brace closing a format spec.
///
/// `Err(Some(at))` means a brace at `at` opened deeper than `allowed_depth`,
/// `Err(None)` that the text ended first.
fn find_spec_end(bytes: &[u8], start: usize, allowed_depth: usize) -> Result<usize, Option<usize>> {
    let mut depth = 0usize;
    for (i, &b) in bytes.iter().enumerate().skip(start) {
        match b {
            b'{' => {
                depth += 1;
                if depth > allowed_depth {
                    return Err(Some(i));
                }
            }
            b'}' if depth == 0 => return Ok(i),
            b'}' => depth -= 1,
            _ => {}
        }
    }

    Err(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literal(text: &str) -> Segment {
        Segment::Literal(text.to_string())
    }

    fn only_field(template: &Template) -> &Field {
        let fields: Vec<&Field> = template.fields().collect();
        assert_eq!(fields.len(), 1, "expected exactly one field in {template:?}");
        fields[0]
    }

    #[test]
    fn test_compile_plain_text() {
        assert!(compile("").unwrap().is_empty());
        assert_eq!(compile("ab").unwrap().segments, vec![literal("ab")]);
    }

    #[test]
    fn test_compile_escapes_merge_into_one_literal() {
        assert_eq!(compile("a{{").unwrap().segments, vec![literal("a{")]);
        assert_eq!(compile("a}}b").unwrap().segments, vec![literal("a}b")]);
        assert_eq!(compile("}}{{").unwrap().segments, vec![literal("}{")]);
    }

    #[test]
    fn test_literals_are_not_merged_across_fields() {
        let template = compile("{{{0}}}").unwrap();
        assert_eq!(template.segments.len(), 3);
        assert_eq!(template.segments[0], literal("{"));
        assert_eq!(template.segments[2], literal("}"));
    }

    #[test]
    fn test_auto_numbering_assigns_in_order() {
        let template = compile("{} and {}").unwrap();
        let roots: Vec<&FieldRoot> = template.fields().map(|f| &f.path.root).collect();
        assert_eq!(roots, vec![&FieldRoot::Index(0), &FieldRoot::Index(1)]);
    }

    #[test]
    fn test_auto_numbering_continues_into_nested_spec() {
        let template = compile("{:{}}").unwrap();
        let field = only_field(&template);
        assert_eq!(field.path.root, FieldRoot::Index(0));
        assert_eq!(only_field(&field.spec).path.root, FieldRoot::Index(1));
    }

    #[test]
    fn test_numbering_conflicts() {
        assert!(matches!(
            compile("{} {0}"),
            Err(ParseError::NumberingModeConflict {
                from: NumberingMode::Automatic,
                to: NumberingMode::Manual,
                position: 3
            })
        ));
        assert!(matches!(
            compile("{0} {}"),
            Err(ParseError::NumberingModeConflict {
                from: NumberingMode::Manual,
                ..
            })
        ));
        assert!(matches!(
            compile("{0:{}}"),
            Err(ParseError::NumberingModeConflict { .. })
        ));
    }

    #[test]
    fn test_keywords_do_not_affect_numbering() {
        assert!(compile("{name} {} {}").is_ok());
        assert!(compile("{name} {0} {1}").is_ok());
    }

    #[test]
    fn test_accessor_chain() {
        let template = compile("{0.x[1][key].y}").unwrap();
        assert_eq!(
            only_field(&template).path.accessors,
            vec![
                Accessor::Attribute("x".to_string()),
                Accessor::Index(IndexKey::Int(1)),
                Accessor::Index(IndexKey::Str("key".to_string())),
                Accessor::Attribute("y".to_string()),
            ]
        );
    }

    #[test]
    fn test_special_characters_inside_index_keys() {
        for (text, key) in [("{0[{]}", "{"), ("{0[!]}", "!"), ("{[ ]}", " "), ("{0[a:b]}", "a:b")] {
            let template = compile(text).unwrap();
            assert_eq!(
                only_field(&template).path.accessors,
                vec![Accessor::Index(IndexKey::Str(key.to_string()))],
                "{text}"
            );
        }
    }

    #[test]
    fn test_non_digit_names_are_keywords() {
        let template = compile("{0]}").unwrap();
        assert_eq!(
            only_field(&template).path.root,
            FieldRoot::Name("0]".to_string())
        );
    }

    #[test]
    fn test_conversion_and_spec() {
        let template = compile("{0!r:>10}").unwrap();
        let field = only_field(&template);
        assert_eq!(field.conversion, Some(Conversion::Repr));
        assert_eq!(field.spec.segments, vec![literal(">10")]);

        let template = compile("{0!s:}").unwrap();
        let field = only_field(&template);
        assert_eq!(field.conversion, Some(Conversion::Str));
        assert!(field.spec.is_empty());
    }

    #[test]
    fn test_unknown_conversion() {
        assert_eq!(
            compile("{0!x}"),
            Err(ParseError::UnknownConversion {
                conversion: 'x',
                position: 3
            })
        );
    }

    #[test]
    fn test_nested_spec_fields() {
        let template = compile("{0:{width}.{precision}s}").unwrap();
        let spec = &only_field(&template).spec;
        assert_eq!(spec.segments.len(), 4);
        assert_eq!(spec.keyword_names(), vec!["width", "precision"]);
    }

    #[test]
    fn test_recursion_ceiling() {
        assert!(matches!(
            compile("{0:{1:{2}}}"),
            Err(ParseError::RecursionExceeded { position: 6 })
        ));
        assert!(matches!(
            compile("{0:a{{b}"),
            Err(ParseError::RecursionExceeded { .. })
        ));
        assert!(compile("{0:{1}{2}}").is_ok());
    }

    #[test]
    fn test_brace_errors() {
        for text in ["{", "a{", "{a", "{0", "abc{0:{}", "{0!"] {
            assert!(
                matches!(compile(text), Err(ParseError::UnmatchedOpenBrace { .. })),
                "{text}"
            );
        }
        for text in ["}", "}a", "a}", "}{"] {
            assert!(
                matches!(compile(text), Err(ParseError::UnmatchedCloseBrace { .. })),
                "{text}"
            );
        }
        assert!(matches!(
            compile("{0[}"),
            Err(ParseError::MissingCloseBracket { position: 2 })
        ));
    }

    #[test]
    fn test_structural_errors_inside_fields() {
        assert_eq!(compile("{0.}"), Err(ParseError::EmptyAttribute { position: 2 }));
        assert_eq!(
            compile("{0[1]x}"),
            Err(ParseError::ExpectedFieldEnd {
                found: 'x',
                position: 5
            })
        );
        assert_eq!(
            compile("{0!sx}"),
            Err(ParseError::ExpectedFieldEnd {
                found: 'x',
                position: 4
            })
        );
    }

    #[test]
    fn test_error_positions_inside_nested_specs() {
        assert_eq!(
            compile("ab{0:{1!q}}"),
            Err(ParseError::UnknownConversion {
                conversion: 'q',
                position: 8
            })
        );
    }

    #[test]
    fn test_multibyte_text_is_preserved() {
        let template = compile("héllo {0} wörld ✓").unwrap();
        assert_eq!(template.segments[0], literal("héllo "));
        assert_eq!(template.segments[2], literal(" wörld ✓"));
    }

    #[test]
    fn test_compile_is_deterministic() {
        let text = "{0.a[1]!r:{1}>{2}} and {{more}}";
        assert_eq!(compile(text).unwrap(), compile(text).unwrap());
    }
}
