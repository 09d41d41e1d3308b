//! Inline (data URL) codec for uploaded images.
//!
//! An inline representation is a self-describing text encoding of binary
//! image data (`data:<mime>;base64,<payload>`) that round-trips losslessly:
//! decoding an encoded image reproduces the original bytes and MIME type.

use base64::Engine;
use image::ImageFormat;

use crate::error::BlendError;

/// An image staged for blending: raw bytes plus their declared MIME type.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    /// Original file name, reused for files derived from this image.
    pub file_name: String,
    /// Declared MIME type (always an `image/*` type).
    pub mime_type: String,
    /// Raw image bytes.
    pub data: Vec<u8>,
}

impl UploadedImage {
    /// Stage raw bytes as an uploaded image, sniffing the MIME type from
    /// the content.
    ///
    /// # Errors
    ///
    /// Returns [`BlendError::UnsupportedFileType`] if the bytes are not a
    /// recognized image format.
    pub fn from_bytes(file_name: impl Into<String>, data: Vec<u8>) -> Result<Self, BlendError> {
        let file_name = file_name.into();
        let mime_type = sniff_mime(&data)
            .map_err(|_| BlendError::UnsupportedFileType(file_name.clone()))?
            .to_string();
        Ok(Self { file_name, mime_type, data })
    }

    /// The inline representation of this image.
    ///
    /// # Errors
    ///
    /// Returns [`BlendError::InvalidInputType`] if the declared MIME type is
    /// not an image type.
    pub fn inline_representation(&self) -> Result<String, BlendError> {
        encode_to_inline(&self.data, &self.mime_type)
    }
}

/// Encode raw bytes as an inline representation (`data:` URL).
///
/// # Errors
///
/// Returns [`BlendError::InvalidInputType`] if `declared_type` does not
/// begin with `image/`.
pub fn encode_to_inline(data: &[u8], declared_type: &str) -> Result<String, BlendError> {
    if !declared_type.starts_with("image/") {
        return Err(BlendError::InvalidInputType(declared_type.to_string()));
    }
    let encoded = base64::engine::general_purpose::STANDARD.encode(data);
    Ok(format!("data:{declared_type};base64,{encoded}"))
}

/// Decode an inline representation back into a standalone image file.
///
/// # Errors
///
/// Returns [`BlendError::MalformedInlineData`] if the representation lacks
/// the two-part `data:<mime>;base64,<payload>` structure, the type prefix
/// cannot be parsed, or the payload is not valid base64.
pub fn decode_inline(inline: &str, file_name: &str) -> Result<UploadedImage, BlendError> {
    let (header, payload) = inline
        .split_once(',')
        .ok_or_else(|| BlendError::MalformedInlineData("missing ',' separator".into()))?;

    let mime_type = header
        .strip_prefix("data:")
        .and_then(|h| h.strip_suffix(";base64"))
        .ok_or_else(|| BlendError::MalformedInlineData("could not parse type prefix".into()))?;

    if mime_type.is_empty() {
        return Err(BlendError::MalformedInlineData("empty MIME type".into()));
    }

    let data = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| BlendError::MalformedInlineData(format!("invalid base64 payload: {e}")))?;

    Ok(UploadedImage { file_name: file_name.to_string(), mime_type: mime_type.to_string(), data })
}

/// Sniff the MIME type of image bytes from their content.
///
/// # Errors
///
/// Returns [`BlendError::UnsupportedFileType`] if the bytes are not a
/// recognized image format.
pub fn sniff_mime(data: &[u8]) -> Result<&'static str, BlendError> {
    let format = image::guess_format(data)
        .map_err(|e| BlendError::UnsupportedFileType(e.to_string()))?;
    match format {
        ImageFormat::Png => Ok("image/png"),
        ImageFormat::Jpeg => Ok("image/jpeg"),
        ImageFormat::WebP => Ok("image/webp"),
        ImageFormat::Gif => Ok("image/gif"),
        ImageFormat::Bmp => Ok("image/bmp"),
        ImageFormat::Tiff => Ok("image/tiff"),
        other => Err(BlendError::UnsupportedFileType(format!("{other:?}"))),
    }
}
