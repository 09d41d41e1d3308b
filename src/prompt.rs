//! Blend instruction construction and option validation.
//!
//! Resolution tiers and aspect-ratio preferences are advisory: each value
//! maps to a descriptive instruction for the model, and output dimensions
//! are requested rather than verified.

/// Validate the resolution tier parameter.
///
/// # Errors
///
/// Returns an error if the tier is not recognized.
pub fn validate_resolution(tier: &str) -> Result<(), String> {
    match tier {
        "standard" | "hd" | "ultra_hd" => Ok(()),
        _ => Err(format!("Unsupported resolution '{tier}'. Valid: standard, hd, ultra_hd")),
    }
}

/// Validate the aspect-ratio preference parameter (case-insensitive).
///
/// # Errors
///
/// Returns an error if the preference is not recognized.
pub fn validate_aspect_ratio(ratio: &str) -> Result<(), String> {
    match ratio.to_ascii_lowercase().as_str() {
        "auto" | "square" | "portrait" | "landscape" => Ok(()),
        _ => Err(format!(
            "Unsupported aspect ratio '{ratio}'. Valid: auto, square, portrait, landscape"
        )),
    }
}

/// Descriptive instruction for a resolution tier; unrecognized values fall
/// back to `standard`.
#[must_use]
pub fn resolution_instruction(tier: &str) -> &'static str {
    match tier {
        "hd" => {
            "Render the final image in high definition with crisp, well-resolved \
             detail across faces and clothing."
        }
        "ultra_hd" => {
            "Render the final image in ultra-high definition with maximum fine \
             detail, as if shot on a high-resolution full-frame camera."
        }
        _ => "Render the final image at standard photographic quality.",
    }
}

/// Descriptive instruction for an aspect-ratio preference; unrecognized
/// values fall back to `auto`.
#[must_use]
pub fn aspect_ratio_instruction(ratio: &str) -> &'static str {
    match ratio.to_ascii_lowercase().as_str() {
        "square" => "Compose the final image with a square (1:1) aspect ratio.",
        "portrait" => "Compose the final image with a portrait (taller than wide) aspect ratio.",
        "landscape" => "Compose the final image with a landscape (wider than tall) aspect ratio.",
        _ => "Keep the aspect ratio of the original group photo.",
    }
}

/// Build the full instruction text sent alongside the two image parts.
#[must_use]
pub fn build_blend_prompt(resolution: &str, aspect_ratio: &str) -> String {
    format!(
        "You are an expert photo editor. Your task is to seamlessly and \
realistically add the person from the second image into the group photo from \
the first image.

Instructions:
1. Identify the person in the second image and extract them from their \
background.
2. Integrate this person into the group photo (the first image) at a \
natural position that does not occlude the existing subjects.
3. Synthesize a new pose for the person that is consistent with what the \
group is doing; do not paste the person in unchanged.
4. The final result must look like a single, original photograph. Pay close \
attention to and match the following aspects:
   - Lighting and Shadows: the added person's lighting direction, intensity, \
and color temperature must match the ambient lighting of the group photo.
   - Scale and Perspective: the person must be scaled and angled \
appropriately relative to the others in the group.
   - Color Grading and Tone: the colors and tone of the added person must \
blend with the group photo.
   - Image Quality: match the grain, noise, sharpness, and depth of field of \
the original group photo.
5. {resolution_line}
6. {aspect_line}
7. The final output must be ONLY the newly generated blended image, with no \
extra text, borders, or annotations.",
        resolution_line = resolution_instruction(resolution),
        aspect_line = aspect_ratio_instruction(aspect_ratio),
    )
}
