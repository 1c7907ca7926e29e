//! Image service orchestrating the read and write paths.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         ImageService                            │
//! │                                                                 │
//! │  fetch(path)                        store(path, body)           │
//! │  1. resolve + parse directive       1. resolve                  │
//! │  2. find document                   2. find existing document   │
//! │  3. open cache sink                 3. decode upload            │
//! │  4. decode → transform → encode     4. downsize if too large    │
//! │     (or copy stored bytes)          5. encode in upload format  │
//! │  5. commit cache file               6. save                     │
//! │                                                                 │
//! │   ┌───────────┐  ┌────────────┐  ┌─────────────┐  ┌──────────┐  │
//! │   │ StorePool │  │ ImageCodec │  │  transform  │  │  Cache   │  │
//! │   │           │  │            │  │             │  │  Writer  │  │
//! │   └───────────┘  └────────────┘  └─────────────┘  └──────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

mod service;

pub use service::{ImageService, Rendered, StoredImage, FAVICON_NAME};
