//! Request path decomposition.
//!
//! Turns the path of an incoming request into the key a document is stored
//! under, and pulls the optional size directive out of the leaf filename.
//!
//! ```text
//! /Gallery/ 2024 /Beach__640x480.JPG
//!        │
//!        ▼ resolve()
//! path = "gallery,2024"   name = "beach__640x480.jpg"
//!                                │
//!                                ▼ parse_directive()
//!                  name = "beach.jpg"   directive = 640x480 FitWithin
//! ```

mod directive;
mod resolve;

pub use directive::{parse_directive, ResizeMode, SizeDirective, DIRECTIVE_DELIMITER};
pub use resolve::{resolve, ResolvedPath};
