//! Prompt construction and response parsing

use crate::LlmError;
use quarry_domain::{ScoredRecord, Synthesis, ToolResult};
use serde::Deserialize;

/// Tool content beyond this many characters is cut from the prompt
pub const MAX_SOURCE_CHARS: usize = 2_000;

/// Build the synthesis prompt with numbered tool results
///
/// # Examples
///
/// ```
/// use quarry_domain::ToolResult;
/// use quarry_llm::prompt::build_synthesis_prompt;
///
/// let results = vec![("web".to_string(), ToolResult { content: "42".into(), latency_ms: 1 })];
/// let prompt = build_synthesis_prompt("meaning of life", &results);
/// assert!(prompt.contains("[1] (web) 42"));
/// ```
pub fn build_synthesis_prompt(query: &str, tool_results: &[(String, ToolResult)]) -> String {
    let mut prompt = String::from(
        "You are a research assistant. Answer the question using only the numbered sources below. \
         If the sources do not answer it, say so and give a low confidence.\n\n",
    );
    prompt.push_str(&format!("Question: {}\n\nSources:\n", query));

    if tool_results.is_empty() {
        prompt.push_str("(no sources returned results)\n");
    }
    for (i, (source_id, result)) in tool_results.iter().enumerate() {
        prompt.push_str(&format!(
            "[{}] ({}) {}\n",
            i + 1,
            source_id,
            truncate_chars(result.content.trim(), MAX_SOURCE_CHARS)
        ));
    }

    prompt.push_str(
        "\nRespond with JSON only: {\"answer\": string, \"confidence\": number between 0 and 1}\n",
    );
    prompt
}

/// Build the yes/no urgency prompt for a scored record
pub fn build_urgency_prompt(record: &ScoredRecord) -> String {
    format!(
        "Does this research result describe something urgent that needs immediate attention? \
         Answer with a single word: yes or no.\n\n\
         Query: {}\nRelevance: {:.2}\nConfidence: {:.2}\n",
        record.query_text, record.relevance_score, record.confidence_score
    )
}

#[derive(Deserialize)]
struct RawSynthesis {
    answer: String,
    confidence: f64,
}

/// Parse a `{answer, confidence}` JSON reply
///
/// Tolerates text around the JSON object. Confidence is clamped to
/// [0.0, 1.0]; a non-numeric confidence or an empty answer is rejected.
pub fn parse_synthesis(raw: &str) -> Result<Synthesis, LlmError> {
    let json = extract_json_object(raw)
        .ok_or_else(|| LlmError::InvalidResponse("no JSON object in response".to_string()))?;
    let parsed: RawSynthesis = serde_json::from_str(json)
        .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse synthesis: {}", e)))?;

    if !parsed.confidence.is_finite() {
        return Err(LlmError::InvalidResponse("confidence is not a number".to_string()));
    }
    let answer_text = parsed.answer.trim().to_string();
    if answer_text.is_empty() {
        return Err(LlmError::InvalidResponse("empty answer".to_string()));
    }

    Ok(Synthesis {
        answer_text,
        confidence_score: parsed.confidence.clamp(0.0, 1.0),
    })
}

/// Parse a yes/no reply
pub fn parse_yes_no(raw: &str) -> Result<bool, LlmError> {
    let first = raw
        .trim()
        .split(|c: char| !c.is_alphabetic())
        .find(|w| !w.is_empty())
        .map(str::to_lowercase);

    match first.as_deref() {
        Some("yes") | Some("true") => Ok(true),
        Some("no") | Some("false") => Ok(false),
        _ => Err(LlmError::InvalidResponse(format!(
            "expected yes or no, got {:?}",
            raw.trim()
        ))),
    }
}

fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(content: &str) -> ToolResult {
        ToolResult {
            content: content.to_string(),
            latency_ms: 10,
        }
    }

    #[test]
    fn test_prompt_numbers_sources() {
        let results = vec![
            ("web".to_string(), result("first")),
            ("news".to_string(), result("second")),
        ];
        let prompt = build_synthesis_prompt("q", &results);
        assert!(prompt.contains("Question: q"));
        assert!(prompt.contains("[1] (web) first"));
        assert!(prompt.contains("[2] (news) second"));
    }

    #[test]
    fn test_prompt_without_sources() {
        let prompt = build_synthesis_prompt("q", &[]);
        assert!(prompt.contains("no sources returned results"));
    }

    #[test]
    fn test_prompt_truncates_long_content() {
        let long = "x".repeat(MAX_SOURCE_CHARS + 500);
        let prompt = build_synthesis_prompt("q", &[("web".to_string(), result(&long))]);
        assert!(!prompt.contains(&long));
        assert!(prompt.contains(&"x".repeat(MAX_SOURCE_CHARS)));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("hi", 5), "hi");
    }

    #[test]
    fn test_parse_synthesis() {
        let s = parse_synthesis(r#"{"answer": "Paris", "confidence": 0.92}"#).unwrap();
        assert_eq!(s.answer_text, "Paris");
        assert_eq!(s.confidence_score, 0.92);
    }

    #[test]
    fn test_parse_synthesis_with_surrounding_text() {
        let s = parse_synthesis("Sure!\n{\"answer\": \"x\", \"confidence\": 1.7}\nDone").unwrap();
        assert_eq!(s.confidence_score, 1.0);
    }

    #[test]
    fn test_parse_synthesis_rejects_garbage() {
        assert!(matches!(
            parse_synthesis("no json here"),
            Err(LlmError::InvalidResponse(_))
        ));
        assert!(parse_synthesis(r#"{"answer": "  ", "confidence": 0.5}"#).is_err());
        assert!(parse_synthesis(r#"{"answer": "x"}"#).is_err());
    }

    #[test]
    fn test_parse_yes_no() {
        assert!(parse_yes_no("Yes.").unwrap());
        assert!(parse_yes_no("  yes, this is urgent").unwrap());
        assert!(!parse_yes_no("No").unwrap());
        assert!(parse_yes_no("maybe").is_err());
        assert!(parse_yes_no("").is_err());
    }

    #[test]
    fn test_urgency_prompt_mentions_scores() {
        let record = ScoredRecord::new("server down", 0.8, 0.65, vec![], 0);
        let prompt = build_urgency_prompt(&record);
        assert!(prompt.contains("Query: server down"));
        assert!(prompt.contains("Relevance: 0.80"));
        assert!(prompt.contains("Confidence: 0.65"));
    }
}
