use crate::shared::frame::Frame;
use crate::video::domain::stream_source::{StreamError, StreamInfo, StreamSource};

/// Serves a still image as an endless stream.
///
/// Every read returns a fresh copy of the decoded image with an increasing
/// frame index, which makes offline tuning against a saved snapshot behave
/// like a live camera that never moves.
pub struct ImageFileSource {
    image: Option<Frame>,
    next_index: usize,
}

impl ImageFileSource {
    pub fn new() -> Self {
        Self {
            image: None,
            next_index: 0,
        }
    }
}

impl Default for ImageFileSource {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamSource for ImageFileSource {
    fn open(&mut self, address: &str) -> Result<StreamInfo, StreamError> {
        self.close();

        let address = address.trim();
        if address.is_empty() {
            return Err(StreamError::EmptyAddress);
        }

        let img = image::open(address)
            .map_err(|e| StreamError::Open {
                address: address.to_string(),
                reason: e.to_string(),
            })?
            .to_rgb8();
        let (width, height) = img.dimensions();
        self.image = Some(Frame::from_rgb_image(img, 0));
        self.next_index = 0;

        Ok(StreamInfo {
            width,
            height,
            fps: 0.0,
            address: address.to_string(),
        })
    }

    fn read_next(&mut self) -> Result<Frame, StreamError> {
        let image = self.image.as_ref().ok_or(StreamError::NotOpened)?;
        let mut frame = image.clone();
        frame.set_index(self.next_index);
        self.next_index += 1;
        Ok(frame)
    }

    fn close(&mut self) {
        self.image = None;
    }

    fn is_opened(&self) -> bool {
        self.image.is_some()
    }
}
