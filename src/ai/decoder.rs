//! Extraction of a JSON object embedded in free-form model text.
//!
//! Model replies are untrusted. They may wrap the object in prose or
//! Markdown fences, contain stray braces before the real payload, or use
//! trailing commas copied from the prompt's example. The decoder scans for
//! the first top-level balanced `{...}` that parses as a JSON object,
//! retrying each candidate once with trailing commas removed.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Failure to turn model text into a validated structure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The reply contains no `{...}` substring.
    #[error("no JSON object found in model reply")]
    NoJsonObject,

    /// A `{...}` candidate was found but none parsed as JSON.
    #[error("invalid JSON in model reply: {0}")]
    InvalidJson(String),

    /// A required field is absent or null.
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    /// A field is present but fails validation.
    #[error("invalid field `{field}`: {reason}")]
    InvalidField {
        /// Field name as sent by the model.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// The object does not match the expected schema.
    #[error("unexpected reply shape: {0}")]
    Schema(String),
}

/// Extracts the first JSON object embedded in `text`.
///
/// # Errors
///
/// Returns [`DecodeError::NoJsonObject`] if `text` has no brace-delimited
/// region, or [`DecodeError::InvalidJson`] if no region parses.
pub fn extract_json_object(text: &str) -> Result<Map<String, Value>, DecodeError> {
    let mut last_error = None;
    let mut saw_candidate = false;

    let mut from = 0;
    while let Some(offset) = text.get(from..).and_then(|tail| tail.find('{')) {
        let start = from + offset;
        let rest = text.get(start..).unwrap_or_default();
        let Some(len) = balanced_len(rest) else {
            from = start + 1;
            continue;
        };
        let Some(candidate) = rest.get(..len) else {
            break;
        };
        saw_candidate = true;
        match parse_object(candidate) {
            Ok(map) => return Ok(map),
            Err(err) => last_error = Some(err),
        }
        // Objects nested in a rejected candidate are never tried on their own.
        from = start + len;
    }

    if !saw_candidate {
        // Unbalanced text: fall back to the widest first-`{` to last-`}` span.
        let start = text.find('{').ok_or(DecodeError::NoJsonObject)?;
        let end = text.rfind('}').filter(|&end| end > start).ok_or(DecodeError::NoJsonObject)?;
        let candidate = text.get(start..=end).ok_or(DecodeError::NoJsonObject)?;
        return parse_object(candidate);
    }

    Err(last_error.unwrap_or(DecodeError::NoJsonObject))
}

/// Extracts the embedded object and deserializes it into `T`.
///
/// # Errors
///
/// Any [`extract_json_object`] error, or [`DecodeError::Schema`] when the
/// object does not match `T`.
pub fn decode_embedded<T: DeserializeOwned>(text: &str) -> Result<T, DecodeError> {
    let map = extract_json_object(text)?;
    serde_json::from_value(Value::Object(map)).map_err(|e| DecodeError::Schema(e.to_string()))
}

/// Length in bytes of the balanced `{...}` region starting at `s[0]`,
/// skipping braces inside string literals.
fn balanced_len(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, byte) in s.bytes().enumerate() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(idx + 1);
                }
            }
            _ => {}
        }
    }
    None
}

fn parse_object(candidate: &str) -> Result<Map<String, Value>, DecodeError> {
    let value = match serde_json::from_str::<Value>(candidate) {
        Ok(value) => value,
        Err(strict_err) => serde_json::from_str::<Value>(&strip_trailing_commas(candidate))
            .map_err(|_| DecodeError::InvalidJson(strict_err.to_string()))?,
    };
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(DecodeError::Schema("expected a JSON object".to_string())),
    }
}

/// Removes commas that directly precede `}` or `]` outside string literals.
fn strip_trailing_commas(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        if c == '"' {
            in_string = true;
        } else if c == ',' {
            let next = chars
                .iter()
                .skip(i + 1)
                .find(|ch| !ch.is_whitespace())
                .copied();
            if matches!(next, Some('}' | ']')) {
                continue;
            }
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn extracts_object_surrounded_by_prose() {
        let text = "Sure! Here is the analysis:\n{\"wasteType\":\"plastic\",\"quantity\":\"5kg\"}\nHope this helps.";
        let Ok(map) = extract_json_object(text) else {
            panic!("object should be extracted");
        };
        assert_eq!(map.get("wasteType"), Some(&Value::from("plastic")));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn extracts_object_from_code_fence() {
        let text = "```json\n{\n  \"sameLocation\": true,\n  \"nested\": {\"a\": 1}\n}\n```";
        let Ok(map) = extract_json_object(text) else {
            panic!("fenced object should be extracted");
        };
        assert_eq!(map.get("sameLocation"), Some(&Value::Bool(true)));
        assert!(map.get("nested").is_some_and(Value::is_object));
    }

    #[test]
    fn ignores_braces_inside_strings() {
        let text = r#"{"comments": "contains } and { braces", "ok": true} trailing }"#;
        let Ok(map) = extract_json_object(text) else {
            panic!("object should be extracted");
        };
        assert_eq!(map.get("ok"), Some(&Value::Bool(true)));
    }

    #[test]
    fn skips_stray_braces_before_payload() {
        let text = "Use {curly} notes. {\"wasteType\": \"glass\"}";
        let Ok(map) = extract_json_object(text) else {
            panic!("second candidate should parse");
        };
        assert_eq!(map.get("wasteType"), Some(&Value::from("glass")));
    }

    #[test]
    fn tolerates_trailing_commas() {
        let text = "{\"wasteType\": \"metal\", \"list\": [1, 2,], }";
        let Ok(map) = extract_json_object(text) else {
            panic!("trailing commas should be tolerated");
        };
        assert_eq!(map.get("wasteType"), Some(&Value::from("metal")));
    }

    #[test]
    fn commas_inside_strings_survive() {
        assert_eq!(strip_trailing_commas(r#"{"a": "x, }"}"#), r#"{"a": "x, }"}"#);
    }

    #[test]
    fn no_braces_is_no_object() {
        assert_eq!(
            extract_json_object("I cannot analyze this image."),
            Err(DecodeError::NoJsonObject)
        );
        assert_eq!(extract_json_object(""), Err(DecodeError::NoJsonObject));
    }

    #[test]
    fn unparseable_candidate_is_invalid_json() {
        let Err(err) = extract_json_object("{not json at all}") else {
            panic!("garbage must not parse");
        };
        assert!(matches!(err, DecodeError::InvalidJson(_)));
    }

    #[test]
    fn nested_object_of_broken_outer_is_not_used() {
        let text = r#"{"judgment": {"sameLocation": true, "cleanupStatus": "fully cleaned"} oops}"#;
        assert!(matches!(
            extract_json_object(text),
            Err(DecodeError::InvalidJson(_))
        ));
    }

    #[test]
    fn unbalanced_reply_is_rejected() {
        assert!(extract_json_object("{\"wasteType\": \"plastic\"").is_err());
    }
}
