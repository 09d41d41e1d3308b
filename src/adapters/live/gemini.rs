//! Live adapter for the Gemini image generation API.
//!
//! Sends one `generateContent` request whose ordered parts are the group
//! photo, the person photo, and the instruction text, and consumes only the
//! first inline-image part of the first candidate in the response.

use base64::Engine;
use reqwest::Client;
use serde::Deserialize;

use crate::error::BlendError;
use crate::ports::image_blender::{
    BlendFuture, BlendRequest, BlendResponse, ImageBlender, ImagePayload,
};
use crate::prompt::build_blend_prompt;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Live Gemini blender that calls the Google AI API.
pub struct GeminiBlender {
    client: Client,
    api_key: String,
}

impl GeminiBlender {
    /// Create a new Gemini blender with the given API key.
    #[must_use]
    pub fn new(api_key: String) -> Self {
        Self { client: Client::new(), api_key }
    }
}

impl ImageBlender for GeminiBlender {
    fn blend(&self, request: &BlendRequest) -> BlendFuture<'_> {
        let request = request.clone();
        Box::pin(async move {
            let url = format!("{GEMINI_API_BASE}/{}:generateContent", request.model);
            let body = build_request_body(&request);

            let response = self
                .client
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .json(&body)
                .send()
                .await?;

            let status = response.status();
            let response_text = response.text().await?;

            if !status.is_success() {
                return Err(BlendError::GenerationUnavailable(format!(
                    "API error ({}): {response_text}",
                    status.as_u16()
                )));
            }

            let parsed: GeminiResponse = serde_json::from_str(&response_text).map_err(|e| {
                BlendError::GenerationUnavailable(format!("failed to parse response: {e}"))
            })?;

            extract_first_image(parsed).map(|image| BlendResponse { image })
        })
    }
}

/// Build the `generateContent` request body: the group photo, the person
/// photo, and the instruction text as three ordered parts, with image-only
/// response modalities.
fn build_request_body(request: &BlendRequest) -> serde_json::Value {
    let b64 = base64::engine::general_purpose::STANDARD;
    let prompt = build_blend_prompt(&request.resolution, &request.aspect_ratio);

    serde_json::json!({
        "contents": [{
            "parts": [
                {
                    "inlineData": {
                        "mimeType": request.group.mime_type,
                        "data": b64.encode(&request.group.data),
                    }
                },
                {
                    "inlineData": {
                        "mimeType": request.person.mime_type,
                        "data": b64.encode(&request.person.data),
                    }
                },
                {"text": prompt},
            ]
        }],
        "generationConfig": {
            "responseModalities": ["IMAGE"],
        }
    })
}

/// Scan the first candidate's ordered parts for the first inline image.
fn extract_first_image(response: GeminiResponse) -> Result<ImagePayload, BlendError> {
    let candidate =
        response.candidates.into_iter().next().ok_or(BlendError::NoImageInResponse)?;

    for part in candidate.content.parts {
        if let Some(inline) = part.inline_data {
            let data = base64::engine::general_purpose::STANDARD
                .decode(&inline.data)
                .map_err(|e| {
                    BlendError::GenerationUnavailable(format!("failed to decode base64: {e}"))
                })?;
            return Ok(ImagePayload { data, mime_type: inline.mime_type });
        }
    }

    Err(BlendError::NoImageInResponse)
}

// --- Gemini API response types ---

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

#[derive(Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    #[allow(dead_code)]
    text: Option<String>,
    inline_data: Option<GeminiInlineData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> GeminiResponse {
        serde_json::from_str(json).unwrap()
    }

    fn request() -> BlendRequest {
        BlendRequest {
            model: "gemini-2.5-flash-image".into(),
            group: ImagePayload { data: vec![0xFF, 0xD8], mime_type: "image/jpeg".into() },
            person: ImagePayload { data: vec![0x89, 0x50], mime_type: "image/png".into() },
            resolution: "hd".into(),
            aspect_ratio: "portrait".into(),
        }
    }

    #[test]
    fn request_body_has_group_person_then_text() {
        let body = build_request_body(&request());
        let parts = body["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 3);

        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/png");
        assert!(parts[0].get("text").is_none());
        assert!(parts[1].get("text").is_none());
        assert!(parts[2].get("inlineData").is_none());

        let b64 = base64::engine::general_purpose::STANDARD;
        assert_eq!(parts[0]["inlineData"]["data"], b64.encode([0xFF, 0xD8]));
        assert_eq!(parts[1]["inlineData"]["data"], b64.encode([0x89, 0x50]));
    }

    #[test]
    fn request_body_embeds_prompt_and_image_modality() {
        let body = build_request_body(&request());
        let text = body["contents"][0]["parts"][2]["text"].as_str().unwrap();
        assert!(text.contains("expert photo editor"));
        assert!(text.contains(crate::prompt::resolution_instruction("hd")));
        assert!(text.contains(crate::prompt::aspect_ratio_instruction("portrait")));

        assert_eq!(body["generationConfig"]["responseModalities"], serde_json::json!(["IMAGE"]));
    }

    #[test]
    fn extracts_first_inline_image_skipping_text_parts() {
        let response = parse(
            r#"{"candidates": [{"content": {"parts": [
                {"text": "here is your image"},
                {"inlineData": {"mimeType": "image/png", "data": "AQID"}},
                {"inlineData": {"mimeType": "image/jpeg", "data": "BAUG"}}
            ]}}]}"#,
        );
        let image = extract_first_image(response).unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.data, vec![1, 2, 3]);
    }

    #[test]
    fn only_first_candidate_is_consulted() {
        let response = parse(
            r#"{"candidates": [
                {"content": {"parts": [{"text": "no image here"}]}},
                {"content": {"parts": [{"inlineData": {"mimeType": "image/png", "data": "AQID"}}]}}
            ]}"#,
        );
        let err = extract_first_image(response).unwrap_err();
        assert!(matches!(err, BlendError::NoImageInResponse));
    }

    #[test]
    fn no_candidates_is_no_image() {
        let response = parse(r#"{"candidates": []}"#);
        assert!(matches!(extract_first_image(response).unwrap_err(), BlendError::NoImageInResponse));

        let response = parse("{}");
        assert!(matches!(extract_first_image(response).unwrap_err(), BlendError::NoImageInResponse));
    }

    #[test]
    fn text_only_response_is_no_image() {
        let response = parse(
            r#"{"candidates": [{"content": {"parts": [{"text": "content policy refusal"}]}}]}"#,
        );
        assert!(matches!(extract_first_image(response).unwrap_err(), BlendError::NoImageInResponse));
    }

    #[test]
    fn invalid_base64_is_generation_unavailable() {
        let response = parse(
            r#"{"candidates": [{"content": {"parts": [
                {"inlineData": {"mimeType": "image/png", "data": "!!not-base64!!"}}
            ]}}]}"#,
        );
        let err = extract_first_image(response).unwrap_err();
        assert!(matches!(err, BlendError::GenerationUnavailable(_)));
    }
}
