//! One-shot prompts used outside the chat flow.

use serde_json::{json, Value};

use super::{AiError, ChatMessage, ChatModel, CompletionRequest};

/// Turn free-text medical history into `{conditions, allergies, medications, notes}`
///
/// A reply that is not a JSON object is kept whole under `notes`.
pub async fn standardize_conditions(model: &dyn ChatModel, free_text: &str, language: &str) -> Result<Value, AiError> {
    let system = format!(
        "You are a medical assistant. Normalize the user's health information into compact JSON:\n\
         - keys: conditions (list), allergies (list), medications (list), notes (string).\n\
         - Write values in {language}.\n\
         - Do not add explanations."
    );
    let user = format!("Original health information:\n{free_text}\n\nReturn a single JSON object.");

    let reply = model
        .complete(CompletionRequest::new(vec![ChatMessage::system(system), ChatMessage::user(user)]))
        .await?
        .text();

    Ok(parse_json_object(&reply).unwrap_or_else(|| {
        json!({
            "conditions": [],
            "allergies": [],
            "medications": [],
            "notes": reply
        })
    }))
}

/// Bullet-point summary of text extracted from a medical record
pub async fn summarize_medical_text(model: &dyn ChatModel, text: &str, language: &str) -> Result<String, AiError> {
    let system = format!(
        "You are a medical assistant. Summarize the health record as clear bullet points, \
         prioritizing diagnoses, abnormal test results and recommendations. Answer in {language}."
    );
    let user = format!("Record text (extracted from PDF):\n{text}\n\nWrite a clear, concise summary.");

    let reply = model
        .complete(CompletionRequest::new(vec![ChatMessage::system(system), ChatMessage::user(user)]))
        .await?;
    Ok(reply.text())
}

/// Remove a surrounding Markdown code fence, with or without a language tag
pub fn strip_code_fences(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_suffix("```").unwrap_or(inner);
    match inner.split_once('\n') {
        Some((tag, body)) if !tag.trim().starts_with('{') => body.trim(),
        _ => inner.trim(),
    }
}

/// Parse a model reply as a JSON object, tolerating code fences
pub fn parse_json_object(reply: &str) -> Option<Value> {
    serde_json::from_str::<Value>(strip_code_fences(reply))
        .ok()
        .filter(Value::is_object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockChatModel;

    #[test]
    fn fences_are_stripped() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```{\"a\":1}```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("  {\"a\":1} "), "{\"a\":1}");
    }

    #[test]
    fn only_objects_parse() {
        assert_eq!(parse_json_object("```json\n{\"a\":1}\n```"), Some(json!({"a": 1})));
        assert_eq!(parse_json_object("[1,2]"), None);
        assert_eq!(parse_json_object("no json here"), None);
    }

    #[tokio::test]
    async fn standardize_parses_reply() {
        let mut model = MockChatModel::new();
        model.expect_complete().returning(|_| {
            Ok(ChatMessage::assistant(
                "```json\n{\"conditions\":[\"diabetes\"],\"allergies\":[],\"medications\":[\"metformin\"],\"notes\":\"\"}\n```",
            ))
        });

        let value = standardize_conditions(&model, "I have diabetes, take metformin", "English")
            .await
            .unwrap();
        assert_eq!(value["conditions"], json!(["diabetes"]));
        assert_eq!(value["medications"], json!(["metformin"]));
    }

    #[tokio::test]
    async fn standardize_keeps_prose_as_notes() {
        let mut model = MockChatModel::new();
        model
            .expect_complete()
            .returning(|_| Ok(ChatMessage::assistant("Patient reports mild asthma.")));

        let value = standardize_conditions(&model, "asthma", "English").await.unwrap();
        assert_eq!(
            value,
            json!({
                "conditions": [],
                "allergies": [],
                "medications": [],
                "notes": "Patient reports mild asthma."
            })
        );
    }

    #[tokio::test]
    async fn summary_prompt_carries_text_and_language() {
        let mut model = MockChatModel::new();
        model
            .expect_complete()
            .withf(|request| {
                request.messages[0].text().contains("Vietnamese") && request.messages[1].text().contains("HbA1c 8.1%")
            })
            .returning(|_| Ok(ChatMessage::assistant("- HbA1c high")));

        let summary = summarize_medical_text(&model, "HbA1c 8.1%", "Vietnamese").await.unwrap();
        assert_eq!(summary, "- HbA1c high");
    }
}
