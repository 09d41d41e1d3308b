//! Replaying adapter for the `ImageBlender` port.

use std::sync::{Arc, Mutex};

use super::{next_output, replay_result};
use crate::cassette::replayer::CassetteReplayer;
use crate::error::BlendError;
use crate::ports::image_blender::{BlendFuture, BlendRequest, BlendResponse, ImageBlender};

/// Serves recorded blend results from a cassette.
pub struct ReplayingImageBlender {
    replayer: Option<Arc<Mutex<CassetteReplayer>>>,
}

impl ReplayingImageBlender {
    /// Create a replaying blender backed by the given replayer.
    #[must_use]
    pub fn new(replayer: Arc<Mutex<CassetteReplayer>>) -> Self {
        Self { replayer: Some(replayer) }
    }
}

impl ImageBlender for ReplayingImageBlender {
    fn blend(&self, _request: &BlendRequest) -> BlendFuture<'_> {
        let output = next_output(self.replayer.as_ref(), "image_blender", "blend");
        Box::pin(async move {
            let output = output.map_err(BlendError::Config)?;
            replay_result::<BlendResponse>(output)
                .map_err(|e| BlendError::GenerationUnavailable(e.to_string()))
        })
    }
}
