//! Default paths and settings.

/// Font read when no path is given.
pub const DEFAULT_FONT: &str = "font.woff2";

/// Mapping written when no path is given.
pub const DEFAULT_OUTPUT: &str = "font_map.json";

/// Suffix appended to the font stem to name the image directory.
pub const IMAGE_DIR_SUFFIX: &str = "_images";

/// Glyph canvas edge length in pixels.
pub const CANVAS_SIZE: u32 = 64;

/// Progress is printed every this many glyphs.
pub const PROGRESS_INTERVAL: usize = 100;

/// Records shown in the summary preview.
pub const PREVIEW_LIMIT: usize = 20;
