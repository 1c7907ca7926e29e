//! Image decoding, resizing and encoding.
//!
//! # Architecture
//!
//! ```text
//! stored bytes ──► ImageCodec::decode ──► DecodedImage { image, format }
//!                                               │
//!                                               ▼
//!                                  transform::apply (Catmull-Rom)
//!                                               │
//!                                               ▼
//!             ImageCodec::encode(sink, image, format) ──► any io::Write
//! ```
//!
//! The source format travels with the decoded image so a variant is always
//! written back in the format it was uploaded in. Only JPEG and PNG can be
//! written.

mod codec;
mod transform;

pub use codec::{format_tag, DecodedImage, ImageCodec, JPEG_QUALITY};
pub use transform::{apply, fit_dimensions, working_pixels, RESAMPLE_FILTER};
