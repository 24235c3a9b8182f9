use shelfwise_core::domain::reasoning::ReasoningOutput;

use crate::provider::ProviderError;

/// Finds the first balanced JSON object in free text, honoring string
/// literals and escapes. Providers are asked for JSON only, but routinely
/// wrap it in prose or code fences.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, character) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if character == '\\' {
                escaped = true;
            } else if character == '"' {
                in_string = false;
            }
            continue;
        }
        match character {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + character.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parses provider free text into a `ReasoningOutput`. Rejects outright when
/// no object is found or a required field is absent - a malformed payload is
/// never partially trusted. Optional keys default to empty; confidence is
/// clamped into [0, 1].
pub fn parse_reasoning_payload(text: &str) -> Result<ReasoningOutput, ProviderError> {
    let object = extract_json_object(text).ok_or(ProviderError::MissingPayload)?;
    let mut output: ReasoningOutput = serde_json::from_str(object)
        .map_err(|error| ProviderError::MalformedPayload(error.to_string()))?;
    output.confidence = output.confidence.clamp(0.0, 1.0);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::{extract_json_object, parse_reasoning_payload};
    use crate::provider::ProviderError;

    #[test]
    fn extracts_object_surrounded_by_prose() {
        let text = "Sure! Here you go:\n```json\n{\"a\": {\"b\": 1}}\n```\nAnything else?";
        assert_eq!(extract_json_object(text), Some(r#"{"a": {"b": 1}}"#));
    }

    #[test]
    fn braces_inside_strings_do_not_unbalance() {
        let text = r#"{"message": "use } and { carefully", "n": 1} trailing"#;
        assert_eq!(
            extract_json_object(text),
            Some(r#"{"message": "use } and { carefully", "n": 1}"#)
        );
    }

    #[test]
    fn escaped_quotes_are_handled() {
        let text = r#"{"message": "she said \"hi\" {"}"#;
        assert_eq!(extract_json_object(text), Some(text));
    }

    #[test]
    fn no_object_yields_none() {
        assert_eq!(extract_json_object("plain refusal, no json"), None);
        assert_eq!(extract_json_object("{unterminated"), None);
    }

    #[test]
    fn parse_accepts_minimal_payload_and_defaults_rest() {
        let output = parse_reasoning_payload(
            r#"{"assistant_message": "hi", "recommended_skus": ["A"], "confidence": 0.9}"#,
        )
        .expect("minimal payload parses");
        assert_eq!(output.recommended_skus, vec!["A"]);
        assert!(output.add_on_skus.is_empty());
        assert!(output.cart.is_empty());
    }

    #[test]
    fn parse_rejects_missing_required_fields() {
        let result = parse_reasoning_payload(r#"{"assistant_message": "hi", "confidence": 0.9}"#);
        assert!(matches!(result, Err(ProviderError::MalformedPayload(_))));
    }

    #[test]
    fn parse_rejects_text_without_json() {
        let result = parse_reasoning_payload("I cannot answer that.");
        assert!(matches!(result, Err(ProviderError::MissingPayload)));
    }

    #[test]
    fn confidence_is_clamped() {
        let output = parse_reasoning_payload(
            r#"{"assistant_message": "hi", "recommended_skus": [], "confidence": 3.5}"#,
        )
        .expect("payload parses");
        assert_eq!(output.confidence, 1.0);
    }
}
