use super::OracleError;
use serde_json::Value;

/// Removes a surrounding Markdown code fence (```` ```json ... ``` ````)
pub fn strip_code_fences(text: &str) -> &str {
    text.trim()
        .trim_start_matches("```json")
        .trim_start_matches("```JSON")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

/// Parses the JSON object carried by a model answer
///
/// Models sometimes wrap the object in a code fence or a sentence of prose.
/// The fenced body is tried first; failing that, the span from the first `{`
/// to the last `}` is tried. Anything else is [`OracleError::Malformed`].
pub fn parse_json_payload(text: &str) -> Result<Value, OracleError> {
    let body = strip_code_fences(text);

    if let Ok(value) = serde_json::from_str::<Value>(body) {
        return Ok(value);
    }

    match (body.find('{'), body.rfind('}')) {
        (Some(start), Some(end)) if start < end => serde_json::from_str(&body[start..=end])
            .map_err(|e| OracleError::Malformed(format!("invalid JSON object: {}", e))),
        _ => Err(OracleError::Malformed(
            "response contained no JSON object".to_string(),
        )),
    }
}
