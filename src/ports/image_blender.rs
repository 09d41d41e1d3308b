//! Image blender port for the remote compositing model.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::error::BlendError;

/// An image payload crossing the port boundary: raw bytes plus MIME type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagePayload {
    /// Raw image bytes (base64 in serialized form).
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
    /// MIME type of the image (e.g., `"image/jpeg"`).
    pub mime_type: String,
}

/// A request to blend a person photo into a group photo.
///
/// Constructed fresh per attempt and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlendRequest {
    /// The model identifier (e.g., `"gemini-2.5-flash-image"`).
    pub model: String,
    /// The group photo (main frame).
    pub group: ImagePayload,
    /// The person to add.
    pub person: ImagePayload,
    /// Requested resolution tier (`"standard"`, `"hd"`, `"ultra_hd"`).
    pub resolution: String,
    /// Requested aspect-ratio preference
    /// (`"auto"`, `"square"`, `"portrait"`, `"landscape"`).
    pub aspect_ratio: String,
}

/// The composited result: the first image-bearing part of the response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlendResponse {
    /// The blended image.
    pub image: ImagePayload,
}

/// Boxed future type returned by [`ImageBlender::blend`].
pub type BlendFuture<'a> =
    Pin<Box<dyn Future<Output = Result<BlendResponse, BlendError>> + Send + 'a>>;

/// Composites two photos into one via an external API.
pub trait ImageBlender: Send + Sync {
    /// Blend the person photo into the group photo.
    fn blend(&self, request: &BlendRequest) -> BlendFuture<'_>;
}

/// Serde helper for serializing `Vec<u8>` as base64 strings in cassettes.
mod base64_bytes {
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize bytes as base64 string.
    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(data);
        serializer.serialize_str(&encoded)
    }

    /// Deserialize base64 string to bytes.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        base64::engine::general_purpose::STANDARD.decode(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(data: Vec<u8>, mime: &str) -> ImagePayload {
        ImagePayload { data, mime_type: mime.into() }
    }

    #[test]
    fn blend_request_serialization() {
        let request = BlendRequest {
            model: "gemini-2.5-flash-image".into(),
            group: payload(vec![0xFF, 0xD8], "image/jpeg"),
            person: payload(vec![0x89, 0x50], "image/png"),
            resolution: "hd".into(),
            aspect_ratio: "portrait".into(),
        };
        let json = serde_json::to_string(&request).unwrap();
        let deserialized: BlendRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.model, "gemini-2.5-flash-image");
        assert_eq!(deserialized.group.data, vec![0xFF, 0xD8]);
        assert_eq!(deserialized.person.mime_type, "image/png");
        assert_eq!(deserialized.resolution, "hd");
        assert_eq!(deserialized.aspect_ratio, "portrait");
    }

    #[test]
    fn image_payload_base64_round_trip() {
        let image = payload(vec![0xFF, 0xD8, 0xFF, 0xE0], "image/jpeg");
        let json = serde_json::to_string(&image).unwrap();
        assert!(json.contains("/9j/")); // base64 of the JPEG magic
        let deserialized: ImagePayload = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.data, vec![0xFF, 0xD8, 0xFF, 0xE0]);
        assert_eq!(deserialized.mime_type, "image/jpeg");
    }

    #[test]
    fn blend_response_serialization() {
        let response = BlendResponse { image: payload(vec![1, 2, 3], "image/png") };
        let json = serde_json::to_string(&response).unwrap();
        let deserialized: BlendResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.image.data, vec![1, 2, 3]);
    }
}
