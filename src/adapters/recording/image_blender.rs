//! Recording adapter for the `ImageBlender` port.

use std::sync::{Arc, Mutex};

use super::record_result;
use crate::cassette::recorder::CassetteRecorder;
use crate::ports::image_blender::{BlendFuture, BlendRequest, ImageBlender};

/// Records blend interactions while delegating to an inner implementation.
pub struct RecordingImageBlender {
    inner: Box<dyn ImageBlender>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingImageBlender {
    /// Creates a new recording blender wrapping the given implementation.
    pub fn new(inner: Box<dyn ImageBlender>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl ImageBlender for RecordingImageBlender {
    fn blend(&self, request: &BlendRequest) -> BlendFuture<'_> {
        let request_clone = request.clone();
        let recorder = Arc::clone(&self.recorder);

        Box::pin(async move {
            let result = self.inner.blend(&request_clone).await;
            record_result(&recorder, "image_blender", "blend", &request_clone, &result);
            result
        })
    }
}
