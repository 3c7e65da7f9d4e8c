//! Isolates the JSON payload inside a free-text model reply.
//!
//! The search is greedy: each opening bracket is paired with the *last*
//! closer of the same kind in the text, and the first such span whose
//! brackets and braces balance wins. Prose before and after the payload is
//! dropped, but a reply holding several independent JSON values
//! (`[..] and also [..]`) comes back as one span covering all of them, which
//! the normalizer will then reject as malformed.

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionError {
    #[error("the assistant did not return usable structured data")]
    NoJsonFound,
}

impl ExtractionError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoJsonFound => "no_json_found",
        }
    }
}

/// True when the trimmed text opens like a JSON array or object.
pub fn looks_like_json(text: &str) -> bool {
    text.trim_start().starts_with(['[', '{'])
}

pub fn extract_json_payload(text: &str) -> Result<&str, ExtractionError> {
    let trimmed = text.trim();
    if looks_like_json(trimmed) {
        return Ok(trimmed);
    }

    let last_bracket = text.rfind(']');
    let last_brace = text.rfind('}');

    for (open_at, ch) in text.char_indices() {
        let close_at = match ch {
            '[' => last_bracket,
            '{' => last_brace,
            _ => continue,
        };
        if let Some(close_at) = close_at
            && close_at > open_at
        {
            let span = &text[open_at..=close_at];
            if is_balanced(span) {
                return Ok(span);
            }
            log::debug!("skipping unbalanced span starting at byte {open_at}");
        }
    }

    Err(ExtractionError::NoJsonFound)
}

/// Brackets and braces nest properly, ignoring any inside string literals.
fn is_balanced(span: &str) -> bool {
    let mut open = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for ch in span.chars() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '[' | '{' => open.push(ch),
            ']' | '}' => {
                let expected = if ch == ']' { '[' } else { '{' };
                if open.pop() != Some(expected) {
                    return false;
                }
            }
            _ => {}
        }
    }

    open.is_empty() && !in_string
}

#[cfg(test)]
mod tests {
    use super::{ExtractionError, extract_json_payload, looks_like_json};

    #[test]
    fn looks_like_json_accepts_arrays_and_objects() {
        assert!(looks_like_json(r#"{"a": 1}"#));
        assert!(looks_like_json("[1, 2, 3]"));
        assert!(looks_like_json(" [ {\"a\": 1} ] "));
        assert!(looks_like_json("\n\t{}"));
    }

    #[test]
    fn looks_like_json_rejects_prose() {
        assert!(!looks_like_json("Just a string"));
        assert!(!looks_like_json("1, 2, 3"));
        assert!(!looks_like_json("some {text"));
        assert!(!looks_like_json(""));
    }

    #[test]
    fn fast_path_returns_trimmed_text() {
        let payload = extract_json_payload("  [{\"task\": \"A\"}]\n").unwrap();
        assert_eq!(payload, "[{\"task\": \"A\"}]");
    }

    #[test]
    fn fast_path_does_not_validate_syntax() {
        let payload = extract_json_payload("[not json at all").unwrap();
        assert_eq!(payload, "[not json at all");
    }

    #[test]
    fn strips_surrounding_prose() {
        let reply = r#"Here is the result: [{"task":"A","start":"2024-01-01","end":"2024-01-05"}] Thanks!"#;
        let payload = extract_json_payload(reply).unwrap();
        assert_eq!(
            payload,
            r#"[{"task":"A","start":"2024-01-01","end":"2024-01-05"}]"#
        );
    }

    #[test]
    fn extracts_objects_wrapped_in_prose() {
        let reply = "Sure! {\"task\": \"A\", \"tags\": [1]} Let me know.";
        assert_eq!(
            extract_json_payload(reply).unwrap(),
            "{\"task\": \"A\", \"tags\": [1]}"
        );
    }

    #[test]
    fn extracts_from_fenced_code_blocks() {
        let reply = "```json\n[{\"task\": \"A\"}]\n```";
        assert_eq!(extract_json_payload(reply).unwrap(), "[{\"task\": \"A\"}]");
    }

    #[test]
    fn greedy_match_spans_to_last_closer() {
        let reply = "first [1] then [2] done";
        assert_eq!(extract_json_payload(reply).unwrap(), "[1] then [2]");
    }

    #[test]
    fn skips_unbalanced_span_before_the_payload() {
        let reply = r#"Each task uses {task, start, end}. Result: [{"task":"A","start":"2024-01-01","end":"2024-01-05"}]"#;
        assert_eq!(
            extract_json_payload(reply).unwrap(),
            r#"[{"task":"A","start":"2024-01-01","end":"2024-01-05"}]"#
        );
    }

    #[test]
    fn brackets_inside_strings_do_not_count() {
        let reply = r#"Plan: [{"task":"Phase ] one {draft"}] ok"#;
        assert_eq!(
            extract_json_payload(reply).unwrap(),
            r#"[{"task":"Phase ] one {draft"}]"#
        );
    }

    #[test]
    fn fails_when_no_span_balances() {
        assert_eq!(
            extract_json_payload("see [1, 2} and more"),
            Err(ExtractionError::NoJsonFound)
        );
    }

    #[test]
    fn skips_openers_without_a_closer() {
        let reply = "Note [see below: {\"a\": 1} end";
        assert_eq!(extract_json_payload(reply).unwrap(), "{\"a\": 1}");
    }

    #[test]
    fn fails_without_brackets() {
        assert_eq!(
            extract_json_payload("no structured data here"),
            Err(ExtractionError::NoJsonFound)
        );
        assert_eq!(extract_json_payload(""), Err(ExtractionError::NoJsonFound));
    }

    #[test]
    fn fails_when_closer_precedes_opener() {
        assert_eq!(
            extract_json_payload("oops ] and then ["),
            Err(ExtractionError::NoJsonFound)
        );
        assert_eq!(
            extract_json_payload("some {text"),
            Err(ExtractionError::NoJsonFound)
        );
    }

    #[test]
    fn extraction_is_idempotent() {
        let replies = [
            "Here you go: [{\"task\": \"A\"}] cheers",
            "{\"task\": \"B\"}",
            "prefix {\"nested\": [1, 2]} suffix",
        ];

        for reply in replies {
            let once = extract_json_payload(reply).unwrap();
            let twice = extract_json_payload(once).unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn handles_multibyte_prose() {
        let reply = "以下がJSONです：[{\"task\": \"設計\"}] よろしく";
        assert_eq!(extract_json_payload(reply).unwrap(), "[{\"task\": \"設計\"}]");
    }
}
