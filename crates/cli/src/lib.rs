//! Scrapekit command line front ends.

pub mod font_decode;
pub mod smart_install;
