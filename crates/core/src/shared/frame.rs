use image::{GrayImage, ImageBuffer, Rgb, RgbImage};
use ndarray::{ArrayView3, Axis};

/// A single stream frame: contiguous RGB bytes in row-major order.
///
/// Sources convert whatever they decode into this layout, so detection and
/// annotation never deal with codec pixel formats or row padding.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
        }
    }

    /// Solid-color RGB frame.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3], index: usize) -> Self {
        let data = rgb
            .iter()
            .copied()
            .cycle()
            .take((width as usize) * (height as usize) * 3)
            .collect();
        Self::new(data, width, height, 3, index)
    }

    pub fn from_rgb_image(img: RgbImage, index: usize) -> Self {
        let (width, height) = img.dimensions();
        Self::new(img.into_raw(), width, height, 3, index)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn set_index(&mut self, index: usize) {
        self.index = index;
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    /// Borrows the pixel buffer as a drawable RGB image.
    ///
    /// Returns `None` for frames that are not 3-channel.
    pub fn as_rgb_image_mut(&mut self) -> Option<ImageBuffer<Rgb<u8>, &mut [u8]>> {
        if self.channels != 3 {
            return None;
        }
        ImageBuffer::from_raw(self.width, self.height, self.data.as_mut_slice())
    }

    /// Single-channel intensity image using BT.601 luma weights.
    pub fn to_luma(&self) -> GrayImage {
        let pixels: Vec<u8> = match self.channels {
            1 => self.data.clone(),
            c if c >= 3 => self
                .as_ndarray()
                .lanes(Axis(2))
                .into_iter()
                .map(|px| luma(px[0], px[1], px[2]))
                .collect(),
            _ => self
                .as_ndarray()
                .lanes(Axis(2))
                .into_iter()
                .map(|px| px[0])
                .collect(),
        };
        GrayImage::from_raw(self.width, self.height, pixels)
            .expect("Frame data length must match dimensions")
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}

/// 0.299 R + 0.587 G + 0.114 B in 14-bit fixed point, rounded.
fn luma(r: u8, g: u8, b: u8) -> u8 {
    let y = (r as u32 * 4899 + g as u32 * 9617 + b as u32 * 1868 + (1 << 13)) >> 14;
    y.min(255) as u8
}
