//! Upload slot state machine.
//!
//! Each upload slot (group photo, person photo) moves through
//! `Empty → Selecting → Cropping → Filled`. Transitions are pure functions
//! of `(state, event)` so any host (CLI, UI shell, tests) can drive them.
//! Only [`SlotEvent::FileChosen`] carries file bytes; drag events never do.

use crate::inline::UploadedImage;

/// State of one upload slot.
#[derive(Debug)]
pub enum SlotState {
    /// No file staged.
    Empty,
    /// A drag is hovering over the slot.
    Selecting,
    /// A file was chosen and awaits crop confirmation.
    Cropping(UploadedImage),
    /// The slot holds a final (cropped) file.
    Filled(UploadedImage),
}

/// Event delivered to an upload slot.
#[derive(Debug)]
pub enum SlotEvent {
    /// A drag entered the slot area.
    DragEnter,
    /// The drag left without dropping.
    DragLeave,
    /// A file was dropped or picked; the only event that reads file bytes.
    FileChosen {
        /// Name of the chosen file.
        file_name: String,
        /// Raw file bytes.
        data: Vec<u8>,
    },
    /// The crop was confirmed, producing the final file for the slot.
    CropConfirmed(UploadedImage),
    /// The crop was cancelled, discarding the provisional selection.
    CropCancelled,
}

/// Side information produced by a transition.
#[derive(Debug, PartialEq, Eq)]
pub enum SlotNotice {
    /// The chosen file is not an image; the state was left unchanged.
    UnsupportedFileType(String),
    /// The slot contents changed, so any previously generated result is stale.
    ResultInvalidated,
}

/// Result of applying one event to a slot.
#[derive(Debug)]
pub struct Transition {
    /// The slot state after the event.
    pub next: SlotState,
    /// Optional notice for the host to surface.
    pub notice: Option<SlotNotice>,
}

impl Transition {
    fn to(next: SlotState) -> Self {
        Self { next, notice: None }
    }

    fn with(next: SlotState, notice: SlotNotice) -> Self {
        Self { next, notice: Some(notice) }
    }
}

/// Apply one event to a slot state.
///
/// Unrecognized `(state, event)` combinations leave the state unchanged, so
/// stray events (duplicate drags, a file chosen mid-crop) can never corrupt
/// a slot.
#[must_use]
pub fn transition(state: SlotState, event: SlotEvent) -> Transition {
    match (state, event) {
        (SlotState::Empty, SlotEvent::DragEnter) => Transition::to(SlotState::Selecting),
        (SlotState::Selecting, SlotEvent::DragLeave) => Transition::to(SlotState::Empty),

        // A file chosen while a crop is pending is ignored: crop sessions
        // are serialized per slot.
        (state @ SlotState::Cropping(_), SlotEvent::FileChosen { .. }) => Transition::to(state),

        (state, SlotEvent::FileChosen { file_name, data }) => {
            match UploadedImage::from_bytes(file_name, data) {
                Ok(image) => Transition::to(SlotState::Cropping(image)),
                Err(e) => Transition::with(state, SlotNotice::UnsupportedFileType(e.to_string())),
            }
        }

        (SlotState::Cropping(_), SlotEvent::CropConfirmed(image)) => {
            Transition::with(SlotState::Filled(image), SlotNotice::ResultInvalidated)
        }
        (SlotState::Cropping(_), SlotEvent::CropCancelled) => Transition::to(SlotState::Empty),

        (state, _) => Transition::to(state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes() -> Vec<u8> {
        let img = image::DynamicImage::new_rgb8(1, 1);
        let mut buf = std::io::Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    fn png_image() -> UploadedImage {
        UploadedImage::from_bytes("a.png", png_bytes()).unwrap()
    }

    #[test]
    fn drag_enter_and_leave() {
        let t = transition(SlotState::Empty, SlotEvent::DragEnter);
        assert!(matches!(t.next, SlotState::Selecting));
        assert!(t.notice.is_none());

        let t = transition(t.next, SlotEvent::DragLeave);
        assert!(matches!(t.next, SlotState::Empty));
    }

    #[test]
    fn valid_file_enters_cropping() {
        let t = transition(
            SlotState::Empty,
            SlotEvent::FileChosen { file_name: "a.png".into(), data: png_bytes() },
        );
        assert!(matches!(t.next, SlotState::Cropping(_)));
        assert!(t.notice.is_none());
    }

    #[test]
    fn non_image_file_stays_put_with_notice() {
        let t = transition(
            SlotState::Empty,
            SlotEvent::FileChosen { file_name: "notes.txt".into(), data: b"text".to_vec() },
        );
        assert!(matches!(t.next, SlotState::Empty));
        assert!(matches!(t.notice, Some(SlotNotice::UnsupportedFileType(_))));
    }

    #[test]
    fn non_image_drop_on_filled_slot_keeps_image() {
        let t = transition(
            SlotState::Filled(png_image()),
            SlotEvent::FileChosen { file_name: "notes.txt".into(), data: b"text".to_vec() },
        );
        assert!(matches!(t.next, SlotState::Filled(_)));
        assert!(matches!(t.notice, Some(SlotNotice::UnsupportedFileType(_))));
    }

    #[test]
    fn crop_confirm_fills_slot_and_invalidates_result() {
        let t = transition(
            SlotState::Cropping(png_image()),
            SlotEvent::CropConfirmed(png_image()),
        );
        assert!(matches!(t.next, SlotState::Filled(_)));
        assert_eq!(t.notice, Some(SlotNotice::ResultInvalidated));
    }

    #[test]
    fn crop_cancel_returns_to_empty() {
        let t = transition(SlotState::Cropping(png_image()), SlotEvent::CropCancelled);
        assert!(matches!(t.next, SlotState::Empty));
        assert!(t.notice.is_none());
    }

    #[test]
    fn file_chosen_mid_crop_is_ignored() {
        let t = transition(
            SlotState::Cropping(png_image()),
            SlotEvent::FileChosen { file_name: "b.png".into(), data: png_bytes() },
        );
        let SlotState::Cropping(image) = t.next else {
            panic!("expected slot to stay in Cropping");
        };
        assert_eq!(image.file_name, "a.png");
        assert!(t.notice.is_none());
    }

    #[test]
    fn stray_events_leave_state_unchanged() {
        let t = transition(SlotState::Empty, SlotEvent::CropCancelled);
        assert!(matches!(t.next, SlotState::Empty));

        let t = transition(SlotState::Filled(png_image()), SlotEvent::DragLeave);
        assert!(matches!(t.next, SlotState::Filled(_)));
    }

    #[test]
    fn filled_slot_accepts_replacement_file() {
        let t = transition(
            SlotState::Filled(png_image()),
            SlotEvent::FileChosen { file_name: "b.png".into(), data: png_bytes() },
        );
        assert!(matches!(t.next, SlotState::Cropping(_)));
    }
}
