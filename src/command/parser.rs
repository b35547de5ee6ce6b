//! Splitting a textual system command into its name and argument payload.
//!
//! A system command looks like `create_event({"summary": "Dentist", ...})`:
//! the operation name before the first `(`, the raw argument payload between
//! that `(` and the final `)`. This module only does the textual work --
//! extraction, argument decoding, and the `update_event` id/payload split.
//! Mapping the name to a typed operation happens in [`super::Operation`].

use serde_json::Value;

use crate::command::literal;
use crate::error::CommandError;

/// A system command split into its name and unparsed argument payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub name: String,
    pub raw_args: String,
}

impl Command {
    /// Split `name(args)` into a [`Command`].
    ///
    /// Fails with [`CommandError::Malformed`] when there is no `(`, the
    /// string does not end with `)`, or the name is empty. The argument
    /// payload is not decoded here.
    pub fn parse(input: &str) -> Result<Command, CommandError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(CommandError::Malformed("empty command".to_string()));
        }

        let open = trimmed.find('(').ok_or_else(|| {
            CommandError::Malformed(format!("missing `(` in `{}`", truncate(trimmed, 50)))
        })?;
        if !trimmed.ends_with(')') {
            return Err(CommandError::Malformed(format!(
                "missing trailing `)` in `{}`",
                truncate(trimmed, 50)
            )));
        }

        let name = trimmed[..open].trim();
        if name.is_empty() {
            return Err(CommandError::Malformed(
                "missing operation name before `(`".to_string(),
            ));
        }

        let raw_args = &trimmed[open + 1..trimmed.len() - 1];
        Ok(Command {
            name: name.to_string(),
            raw_args: raw_args.to_string(),
        })
    }
}

/// Decode an argument payload into a JSON value.
///
/// Strict JSON is attempted first. On failure the permissive literal decoder
/// takes over. A bare `key: value` body (no surrounding braces) is wrapped in
/// braces before either attempt, and an empty payload decodes to `{}` so that
/// `list_events()` works. If both decoders fail the original fragment is
/// carried in the error; nothing is silently defaulted.
pub fn decode_args(raw: &str) -> Result<Value, CommandError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Value::Object(serde_json::Map::new()));
    }

    let candidate = if trimmed.starts_with('{') || trimmed.starts_with('[') {
        trimmed.to_string()
    } else {
        format!("{{{trimmed}}}")
    };

    if let Ok(value) = serde_json::from_str::<Value>(&candidate) {
        return Ok(value);
    }

    match literal::parse(&candidate) {
        Ok(value) => {
            tracing::debug!(fragment = %truncate(trimmed, 80), "decoded arguments via literal fallback");
            Ok(value)
        }
        Err(message) => Err(CommandError::ArgumentDecode {
            fragment: trimmed.to_string(),
            message,
        }),
    }
}

/// Split `update_event` arguments (`<event_id>, <json-object>`) at the first
/// comma outside any nested structure or string literal. Quoting around the
/// event id is stripped.
pub fn split_update_args(raw: &str) -> Result<(String, String), CommandError> {
    let mut depth = 0usize;
    let mut in_string: Option<char> = None;
    let mut escaped = false;

    for (i, c) in raw.char_indices() {
        if let Some(quote) = in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == quote {
                in_string = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => in_string = Some(c),
            '{' | '[' | '(' => depth += 1,
            '}' | ']' | ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                let event_id = strip_id_quotes(&raw[..i]);
                if event_id.is_empty() {
                    return Err(CommandError::Malformed(
                        "update_event: empty event id".to_string(),
                    ));
                }
                return Ok((event_id, raw[i + 1..].trim().to_string()));
            }
            _ => {}
        }
    }

    Err(CommandError::Malformed(
        "update_event expects `<event_id>, <update payload>`".to_string(),
    ))
}

/// Strip surrounding whitespace and quote characters from an event id.
pub fn strip_id_quotes(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c| c == '\'' || c == '"')
        .trim()
        .to_string()
}

fn truncate(s: &str, limit: usize) -> &str {
    match s.char_indices().nth(limit) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_name_and_args() {
        let cmd = Command::parse(r#"create_event({"summary": "Dentist"})"#).unwrap();
        assert_eq!(cmd.name, "create_event");
        assert_eq!(cmd.raw_args, r#"{"summary": "Dentist"}"#);
    }

    #[test]
    fn parses_empty_args() {
        let cmd = Command::parse("list_events()").unwrap();
        assert_eq!(cmd.name, "list_events");
        assert_eq!(cmd.raw_args, "");
    }

    #[test]
    fn rejects_missing_open_paren() {
        assert!(matches!(
            Command::parse("list_events"),
            Err(CommandError::Malformed(_))
        ));
    }

    #[test]
    fn rejects_missing_close_paren() {
        assert!(matches!(
            Command::parse("list_events({}"),
            Err(CommandError::Malformed(_))
        ));
    }

    #[test]
    fn rejects_empty_name() {
        assert!(matches!(
            Command::parse("({})"),
            Err(CommandError::Malformed(_))
        ));
    }

    #[test]
    fn rejects_empty_input() {
        assert!(matches!(
            Command::parse("   "),
            Err(CommandError::Malformed(_))
        ));
    }

    #[test]
    fn name_recovers_for_wellformed_json_args() {
        // Parser followed by direct decode must agree with decoding the
        // payload on its own.
        let payload = json!({"summary": "Standup", "max_results": 5});
        let input = format!("list_events({payload})");
        let cmd = Command::parse(&input).unwrap();
        assert_eq!(cmd.name, "list_events");
        assert_eq!(decode_args(&cmd.raw_args).unwrap(), payload);
    }

    #[test]
    fn decode_empty_payload_is_empty_object() {
        assert_eq!(decode_args("").unwrap(), json!({}));
        assert_eq!(decode_args("   ").unwrap(), json!({}));
    }

    #[test]
    fn decode_wraps_bare_key_value_body() {
        let value = decode_args(r#""max_results": 10"#).unwrap();
        assert_eq!(value, json!({"max_results": 10}));
    }

    #[test]
    fn decode_falls_back_to_single_quotes() {
        let value = decode_args("{'summary': 'Dentist'}").unwrap();
        assert_eq!(value, json!({"summary": "Dentist"}));
    }

    #[test]
    fn decode_failure_carries_fragment() {
        let err = decode_args("{'summary': }").unwrap_err();
        match err {
            CommandError::ArgumentDecode { fragment, .. } => {
                assert_eq!(fragment, "{'summary': }");
            }
            other => panic!("expected ArgumentDecode, got {other:?}"),
        }
    }

    #[test]
    fn decode_is_deterministic() {
        let a = decode_args("{'a': 1, 'b': 'two'}").unwrap();
        let b = decode_args("{'a': 1, 'b': 'two'}").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn split_update_args_basic() {
        let (id, rest) = split_update_args(r#"'abc123', {"location": "Room 4"}"#).unwrap();
        assert_eq!(id, "abc123");
        assert_eq!(rest, r#"{"location": "Room 4"}"#);
    }

    #[test]
    fn split_update_args_double_quoted_id() {
        let (id, rest) = split_update_args(r#""evt-9", {"summary": "X"}"#).unwrap();
        assert_eq!(id, "evt-9");
        assert_eq!(rest, r#"{"summary": "X"}"#);
    }

    #[test]
    fn split_update_args_ignores_commas_in_payload() {
        let (id, rest) =
            split_update_args(r#"e1, {"summary": "a, b", "location": "c"}"#).unwrap();
        assert_eq!(id, "e1");
        assert_eq!(rest, r#"{"summary": "a, b", "location": "c"}"#);
    }

    #[test]
    fn split_update_args_ignores_commas_in_id_quotes() {
        let (id, rest) = split_update_args(r#"'weird,id', {}"#).unwrap();
        assert_eq!(id, "weird,id");
        assert_eq!(rest, "{}");
    }

    #[test]
    fn split_update_args_requires_comma() {
        assert!(matches!(
            split_update_args("just-an-id"),
            Err(CommandError::Malformed(_))
        ));
    }

    #[test]
    fn strip_id_quotes_handles_both_styles() {
        assert_eq!(strip_id_quotes(" 'abc' "), "abc");
        assert_eq!(strip_id_quotes("\"abc\""), "abc");
        assert_eq!(strip_id_quotes("abc"), "abc");
    }
}
