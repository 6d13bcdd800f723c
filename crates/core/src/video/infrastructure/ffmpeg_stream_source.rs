use std::time::Duration;

use ffmpeg_next::format::Pixel;
use ffmpeg_next::software::scaling;
use ffmpeg_next::util::frame::video::Video;

use crate::shared::frame::Frame;
use crate::video::domain::stream_source::{StreamError, StreamInfo, StreamSource};

/// Pulls frames from anything libavformat can open: HTTP/RTSP camera
/// endpoints (e.g. an ESP32-CAM MJPEG stream), capture devices, or files.
///
/// Each decoded frame is converted to RGB24 and wrapped in a [`Frame`].
pub struct FfmpegStreamSource {
    timeout: Option<Duration>,
    open: Option<OpenStream>,
}

// Safety: FfmpegStreamSource is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegStreamSource {}

struct OpenStream {
    ictx: ffmpeg_next::format::context::Input,
    decoder: ffmpeg_next::decoder::Video,
    scaler: Option<CachedScaler>,
    stream_index: usize,
    next_index: usize,
    flushing: bool,
}

/// Scaler is rebuilt whenever the decoded format or size changes, which
/// some MJPEG cameras do mid-stream when their resolution is reconfigured.
struct CachedScaler {
    context: scaling::Context,
    format: Pixel,
    width: u32,
    height: u32,
}

impl FfmpegStreamSource {
    pub fn new() -> Self {
        Self {
            timeout: None,
            open: None,
        }
    }

    /// Network I/O timeout passed to ffmpeg's protocol layer.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn input_options(&self) -> ffmpeg_next::Dictionary<'static> {
        let mut options = ffmpeg_next::Dictionary::new();
        if let Some(timeout) = self.timeout {
            options.set("timeout", &timeout.as_micros().to_string());
        }
        options
    }
}

impl Default for FfmpegStreamSource {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamSource for FfmpegStreamSource {
    fn open(&mut self, address: &str) -> Result<StreamInfo, StreamError> {
        self.close();

        let address = address.trim();
        if address.is_empty() {
            return Err(StreamError::EmptyAddress);
        }
        let open_err = |reason: String| StreamError::Open {
            address: address.to_string(),
            reason,
        };

        ffmpeg_next::init().map_err(|e| open_err(e.to_string()))?;
        ffmpeg_next::format::network::init();

        let ictx = ffmpeg_next::format::input_with_dictionary(address, self.input_options())
            .map_err(|e| open_err(e.to_string()))?;

        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or_else(|| open_err("no video stream found".to_string()))?;
        let stream_index = stream.index();

        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())
            .map_err(|e| open_err(e.to_string()))?;
        let decoder = codec_ctx
            .decoder()
            .video()
            .map_err(|e| open_err(e.to_string()))?;

        let rate = stream.rate();
        let fps = if rate.denominator() != 0 {
            rate.numerator() as f64 / rate.denominator() as f64
        } else {
            0.0
        };

        let info = StreamInfo {
            width: decoder.width(),
            height: decoder.height(),
            fps,
            address: address.to_string(),
        };
        log::info!(
            "Opened {address}: {}x{} @ {:.1} fps",
            info.width,
            info.height,
            info.fps
        );

        self.open = Some(OpenStream {
            ictx,
            decoder,
            scaler: None,
            stream_index,
            next_index: 0,
            flushing: false,
        });
        Ok(info)
    }

    fn read_next(&mut self) -> Result<Frame, StreamError> {
        let stream = self.open.as_mut().ok_or(StreamError::NotOpened)?;

        loop {
            if let Some(frame) = stream.try_receive()? {
                return Ok(frame);
            }
            if stream.flushing {
                return Err(StreamError::EndOfStream);
            }

            let mut packet = ffmpeg_next::Packet::empty();
            if read_packet(packet.read(&mut stream.ictx))? {
                if packet.stream() != stream.stream_index {
                    continue;
                }
                stream
                    .decoder
                    .send_packet(&packet)
                    .map_err(|e| StreamError::Read(e.to_string()))?;
            } else {
                let _ = stream.decoder.send_eof();
                stream.flushing = true;
            }
        }
    }

    fn close(&mut self) {
        if self.open.take().is_some() {
            log::debug!("Stream closed");
        }
    }

    fn is_opened(&self) -> bool {
        self.open.is_some()
    }
}

impl OpenStream {
    fn try_receive(&mut self) -> Result<Option<Frame>, StreamError> {
        let mut decoded = Video::empty();
        if self.decoder.receive_frame(&mut decoded).is_err() {
            return Ok(None);
        }

        let (format, width, height) = (decoded.format(), decoded.width(), decoded.height());
        let stale = self
            .scaler
            .as_ref()
            .map_or(true, |s| s.format != format || s.width != width || s.height != height);
        if stale {
            let context = scaling::Context::get(
                format,
                width,
                height,
                Pixel::RGB24,
                width,
                height,
                scaling::Flags::BILINEAR,
            )
            .map_err(|e| StreamError::Read(e.to_string()))?;
            self.scaler = Some(CachedScaler {
                context,
                format,
                width,
                height,
            });
        }

        let mut rgb = Video::empty();
        if let Some(scaler) = self.scaler.as_mut() {
            scaler
                .context
                .run(&decoded, &mut rgb)
                .map_err(|e| StreamError::Read(e.to_string()))?;
        }

        let pixels = extract_rgb_pixels(&rgb, width, height);
        let frame = Frame::new(pixels, width, height, 3, self.next_index);
        self.next_index += 1;
        Ok(Some(frame))
    }
}

/// `Ok(true)` when a packet was read, `Ok(false)` at end of input. Any other
/// demuxer error (timeouts, dropped connections) fails the read instead of
/// retrying, so one call never blocks past the protocol timeout.
fn read_packet(result: Result<(), ffmpeg_next::Error>) -> Result<bool, StreamError> {
    match result {
        Ok(()) => Ok(true),
        Err(ffmpeg_next::Error::Eof) => Ok(false),
        Err(e) => Err(StreamError::Read(e.to_string())),
    }
}

/// Copies pixel data from an ffmpeg frame into a contiguous RGB buffer,
/// dropping the per-row stride padding.
fn extract_rgb_pixels(rgb: &Video, width: u32, height: u32) -> Vec<u8> {
    let stride = rgb.stride(0);
    let data = rgb.data(0);
    let row_bytes = width as usize * 3;

    let mut pixels = Vec::with_capacity(row_bytes * height as usize);
    for row in 0..height as usize {
        let start = row * stride;
        pixels.extend_from_slice(&data[start..start + row_bytes]);
    }
    pixels
}
