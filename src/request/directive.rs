//! Size directive parsing.
//!
//! A request leaf may carry a directive between `__` and the extension:
//!
//! - `photo__640x480.jpg` - fit within 640×480
//! - `photo__200z200.jpg` - cover-crop to exactly 200×200
//!
//! The directive is always stripped from the lookup name. A delimiter whose
//! token has neither separator only strips the name and yields no directive.

/// Delimiter between the stored name and the size directive.
pub const DIRECTIVE_DELIMITER: &str = "__";

/// How the requested box is applied to the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeMode {
    /// Scale proportionally to fit inside the box, no cropping
    FitWithin,

    /// Scale proportionally to cover the box, then crop to it exactly
    CoverCrop,
}

impl ResizeMode {
    /// Separator character selecting this mode inside a directive token.
    pub fn separator(self) -> char {
        match self {
            ResizeMode::FitWithin => 'x',
            ResizeMode::CoverCrop => 'z',
        }
    }
}

/// Requested output size. A zero axis is unconstrained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeDirective {
    pub width: u32,
    pub height: u32,
    pub mode: ResizeMode,
}

impl SizeDirective {
    pub fn new(width: u32, height: u32, mode: ResizeMode) -> Self {
        Self {
            width,
            height,
            mode,
        }
    }
}

/// Split a leaf filename into its lookup name and optional size directive.
///
/// Numeric tokens that fail to parse become 0 instead of failing the request.
pub fn parse_directive(raw_name: &str) -> (String, Option<SizeDirective>) {
    let delimiter = match raw_name.rfind(DIRECTIVE_DELIMITER) {
        Some(pos) if pos > 0 => pos,
        _ => return (raw_name.to_string(), None),
    };

    let ext = extension(raw_name);
    let basename = &raw_name[..raw_name.len() - ext.len()];
    let canonical = format!("{}{}", &raw_name[..delimiter], ext).to_lowercase();

    // The extension can swallow the delimiter (`a.b__c`); there is no token then.
    let token = basename
        .get(delimiter + DIRECTIVE_DELIMITER.len()..)
        .unwrap_or("");

    let directive = [ResizeMode::FitWithin, ResizeMode::CoverCrop]
        .into_iter()
        .find(|mode| token.contains(mode.separator()))
        .map(|mode| {
            let mut parts = token.split(mode.separator());
            let width = parse_axis(parts.next());
            let height = parse_axis(parts.next());
            SizeDirective::new(width, height, mode)
        });

    (canonical, directive)
}

/// Extension including the dot, taken from the last `.` of the final
/// component. Empty when there is none.
fn extension(name: &str) -> &str {
    let leaf_start = name.rfind('/').map_or(0, |i| i + 1);
    match name[leaf_start..].rfind('.') {
        Some(dot) => &name[leaf_start + dot..],
        None => "",
    }
}

fn parse_axis(token: Option<&str>) -> u32 {
    token.and_then(|t| t.parse().ok()).unwrap_or(0)
}
