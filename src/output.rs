//! File naming and result saving.

use std::path::{Path, PathBuf};

use crate::error::BlendError;
use crate::session::HistoryRecord;

/// Fixed file name for a freshly generated result.
pub const RESULT_FILENAME: &str = "blended-photo.png";

/// File name for a history download: embeds the resolution tier, aspect
/// ratio, and a short id fragment.
#[must_use]
pub fn history_filename(record: &HistoryRecord) -> String {
    let short_id = &record.id[..record.id.len().min(4)];
    format!("blended-photo-{}-{}-{}.png", record.resolution, record.aspect_ratio, short_id)
}

/// Resolve the output path: use explicit path or the fixed result name.
#[must_use]
pub fn resolve_output_path(explicit: Option<&str>) -> PathBuf {
    match explicit {
        Some(p) => PathBuf::from(p),
        None => PathBuf::from(RESULT_FILENAME),
    }
}

/// Save raw image bytes to a PNG file, converting format if necessary.
///
/// # Errors
///
/// Returns an error if the file cannot be written or conversion fails.
pub fn save_image(data: &[u8], source_mime: &str, output_path: &Path) -> Result<(), BlendError> {
    if source_mime == "image/png" {
        std::fs::write(output_path, data).map_err(BlendError::Io)
    } else {
        convert_and_save(data, output_path)
    }
}

/// Convert image bytes to PNG and save.
fn convert_and_save(data: &[u8], output_path: &Path) -> Result<(), BlendError> {
    let img = image::load_from_memory(data)
        .map_err(|e| BlendError::ImageConversion(format!("Failed to decode image: {e}")))?;

    img.save_with_format(output_path, image::ImageFormat::Png)
        .map_err(|e| BlendError::ImageConversion(format!("Failed to save as png: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> HistoryRecord {
        HistoryRecord {
            id: id.to_string(),
            group_image: String::new(),
            person_image: String::new(),
            resolution: "hd".into(),
            aspect_ratio: "Portrait".into(),
            generated_image: String::new(),
            generated_mime: "image/png".into(),
        }
    }

    #[test]
    fn history_filename_embeds_options_and_short_id() {
        let name = history_filename(&record("18f2a4c09"));
        assert_eq!(name, "blended-photo-hd-Portrait-18f2.png");
    }

    #[test]
    fn history_filename_tolerates_short_ids() {
        let name = history_filename(&record("ab"));
        assert_eq!(name, "blended-photo-hd-Portrait-ab.png");
    }

    #[test]
    fn resolve_explicit() {
        let path = resolve_output_path(Some("my-image.png"));
        assert_eq!(path, PathBuf::from("my-image.png"));
    }

    #[test]
    fn resolve_default_is_fixed_name() {
        assert_eq!(resolve_output_path(None), PathBuf::from(RESULT_FILENAME));
    }

    #[test]
    fn save_png_writes_bytes_verbatim() {
        let img = image::DynamicImage::new_rgb8(1, 1);
        let mut buf = std::io::Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        let bytes = buf.into_inner();

        let out = std::env::temp_dir().join("photoblend_save_png_test.png");
        save_image(&bytes, "image/png", &out).unwrap();
        assert_eq!(std::fs::read(&out).unwrap(), bytes);
        let _ = std::fs::remove_file(&out);
    }

    #[test]
    fn save_jpeg_converts_to_png() {
        let img = image::DynamicImage::new_rgb8(1, 1);
        let mut buf = std::io::Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Jpeg).unwrap();

        let out = std::env::temp_dir().join("photoblend_save_jpeg_test.png");
        save_image(&buf.into_inner(), "image/jpeg", &out).unwrap();

        let data = std::fs::read(&out).unwrap();
        assert_eq!(&data[..8], &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);
        let _ = std::fs::remove_file(&out);
    }

    #[test]
    fn save_garbage_fails_conversion() {
        let out = std::env::temp_dir().join("photoblend_save_garbage_test.png");
        let err = save_image(&[1, 2, 3], "image/jpeg", &out).unwrap_err();
        assert!(matches!(err, BlendError::ImageConversion(_)));
    }
}
