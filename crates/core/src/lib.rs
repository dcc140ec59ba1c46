//! Scrapekit core: font de-obfuscation and mirror-aware install pipelines.

pub mod config;
pub mod io;
pub mod pipeline;
pub mod report;

pub use io::{ImageStore, write_font_map};
pub use pipeline::{
    Extraction, FontMap, FontMapOptions, GlyphRecord, InstallOutcome, InstallRequest, Installer,
    decode_font, extract_font_map,
};
pub use report::{Summary, print_summary, summarize};
