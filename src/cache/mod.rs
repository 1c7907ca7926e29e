//! On-disk response cache population.
//!
//! Every body the gateway sends is mirrored to `cache_root + request path`
//! while it is being produced. The tree is only ever written here; serving
//! from it (for instance by a front proxy) is left to other layers.
//!
//! ```text
//!                    ┌──────────────────────┐
//!  encoder ─write──► │ FanOut               │──► response buffer (Vec<u8>)
//!                    │                      │──► temp file in target dir
//!                    └──────────────────────┘
//!                               │ commit()
//!                               ▼
//!                    rename temp file onto target
//! ```
//!
//! Writers never share a file: each request renders into its own temp file
//! and renames it into place, so concurrent requests for the same path can
//! only duplicate work, never leave a torn file behind.

mod writer;

pub use writer::{clean_request_path, CacheSink, CacheWriter, FanOut};
