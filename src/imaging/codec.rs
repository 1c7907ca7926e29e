//! Format-aware image codec.
//!
//! Decoding sniffs the container from its magic bytes. Encoding writes JPEG
//! at a fixed quality or lossless PNG into any `io::Write` sink, which lets
//! the gateway stream straight into its cache fan-out.

use std::borrow::Cow;
use std::io::{Cursor, Write};

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ImageFormat, ImageReader, Rgb, RgbImage, RgbaImage};

use crate::error::CodecError;

/// JPEG quality used for every JPEG this service writes.
pub const JPEG_QUALITY: u8 = 95;

/// An image in memory together with the container it was read from.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub image: DynamicImage,
    pub format: ImageFormat,
}

impl DecodedImage {
    /// `(width, height)` in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }
}

/// Lower-case tag for a format, as used in logs and error messages.
pub fn format_tag(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "jpeg".to_string(),
        ImageFormat::Png => "png".to_string(),
        other => format!("{:?}", other).to_lowercase(),
    }
}

/// Decoder/encoder for stored images.
#[derive(Debug, Clone)]
pub struct ImageCodec {
    jpeg_quality: u8,
}

impl Default for ImageCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageCodec {
    /// Create a codec writing JPEG at [`JPEG_QUALITY`].
    pub fn new() -> Self {
        Self {
            jpeg_quality: JPEG_QUALITY,
        }
    }

    /// Decode raw bytes and report the detected container format.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Decode`] if the bytes are not a recognizable
    /// image container or the image data is corrupt.
    pub fn decode(&self, bytes: &[u8]) -> Result<DecodedImage, CodecError> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| CodecError::Decode {
                message: e.to_string(),
            })?;

        let format = reader.format().ok_or_else(|| CodecError::Decode {
            message: "image: unknown format".to_string(),
        })?;

        let image = reader.decode().map_err(|e| CodecError::Decode {
            message: e.to_string(),
        })?;

        Ok(DecodedImage { image, format })
    }

    /// Encode `image` as `format` into `sink`.
    ///
    /// # Errors
    ///
    /// - [`CodecError::UnsupportedFormat`] for anything other than JPEG or PNG
    /// - [`CodecError::Encode`] if the encoder or the sink fails
    pub fn encode<W: Write>(
        &self,
        sink: W,
        image: &DynamicImage,
        format: ImageFormat,
    ) -> Result<(), CodecError> {
        let result = match format {
            ImageFormat::Jpeg => {
                let encoder = JpegEncoder::new_with_quality(sink, self.jpeg_quality);
                jpeg_compatible(image).write_with_encoder(encoder)
            }
            ImageFormat::Png => image.write_with_encoder(PngEncoder::new(sink)),
            other => {
                return Err(CodecError::UnsupportedFormat {
                    format: format_tag(other),
                })
            }
        };

        result.map_err(|e| CodecError::Encode {
            message: e.to_string(),
        })
    }

    /// Encode into a fresh buffer.
    pub fn encode_to_vec(
        &self,
        image: &DynamicImage,
        format: ImageFormat,
    ) -> Result<Vec<u8>, CodecError> {
        let mut buf = Vec::new();
        self.encode(&mut buf, image, format)?;
        Ok(buf)
    }
}

/// Bring an image into a layout the JPEG encoder accepts.
///
/// Gray and RGB pass through untouched. RGBA that is fully opaque only loses
/// its alpha channel; translucent pixels are composited onto black first.
fn jpeg_compatible(image: &DynamicImage) -> Cow<'_, DynamicImage> {
    match image {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => Cow::Borrowed(image),
        DynamicImage::ImageRgba8(rgba) => Cow::Owned(DynamicImage::ImageRgb8(flatten_alpha(rgba))),
        other if other.color().has_alpha() => {
            Cow::Owned(DynamicImage::ImageRgb8(flatten_alpha(&other.to_rgba8())))
        }
        other => Cow::Owned(DynamicImage::ImageRgb8(other.to_rgb8())),
    }
}

fn is_opaque(rgba: &RgbaImage) -> bool {
    rgba.pixels().all(|p| p[3] == u8::MAX)
}

fn flatten_alpha(rgba: &RgbaImage) -> RgbImage {
    if is_opaque(rgba) {
        return RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
            let p = rgba.get_pixel(x, y);
            Rgb([p[0], p[1], p[2]])
        });
    }

    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let p = rgba.get_pixel(x, y);
        let a = u16::from(p[3]);
        let premultiply = |c: u8| ((u16::from(c) * a + 127) / 255) as u8;
        Rgb([premultiply(p[0]), premultiply(p[1]), premultiply(p[2])])
    })
}
