//! `font-decode`: map obfuscated web font glyphs to the characters they draw.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use font_raster::Canvas;
use glyph_ocr::{DEFAULT_BINARY, DEFAULT_LANGUAGE, TesseractOcr};
use log::info;
use scrapekit_core::{
    FontMapOptions, decode_font,
    config::{CANVAS_SIZE, DEFAULT_FONT, DEFAULT_OUTPUT},
    pipeline::default_image_dir,
    print_summary, write_font_map,
};

#[derive(Debug, Parser)]
#[command(name = "font-decode", version)]
#[command(about = "Recover the characters behind an obfuscated web font")]
pub struct Cli {
    /// Font file (WOFF2, WOFF, TTF or OTF)
    #[arg(long, default_value = DEFAULT_FONT)]
    pub font: PathBuf,

    /// JSON mapping to write
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Directory for glyph images (default: <FONT STEM>_images next to the font)
    #[arg(long, value_name = "DIR", conflicts_with = "no_images")]
    pub image_dir: Option<PathBuf>,

    /// Do not save glyph images
    #[arg(long)]
    pub no_images: bool,

    /// Canvas edge length in pixels
    #[arg(long, default_value_t = CANVAS_SIZE, value_parser = clap::value_parser!(u32).range(16..=1024))]
    pub size: u32,

    /// Tesseract language model
    #[arg(long, default_value = DEFAULT_LANGUAGE)]
    pub lang: String,

    /// Tesseract executable
    #[arg(long, default_value = DEFAULT_BINARY)]
    pub tesseract: String,
}

impl Cli {
    fn options(&self) -> FontMapOptions {
        let image_dir = if self.no_images {
            None
        } else {
            Some(self.image_dir.clone().unwrap_or_else(|| default_image_dir(&self.font)))
        };
        FontMapOptions {
            font: self.font.clone(),
            image_dir,
            canvas: Canvas::new(self.size, self.size),
        }
    }

    pub fn run(self) -> Result<()> {
        println!("Font glyph decoder");

        if !self.font.exists() {
            bail!(
                "Font file '{}' does not exist; place it at '{DEFAULT_FONT}' or pass --font",
                self.font.display()
            );
        }

        println!("Initializing OCR engine...");
        let ocr = TesseractOcr::new(&self.tesseract, &self.lang);
        let version = ocr.probe().context("Failed to initialize OCR engine")?;
        info!("{version}, language {}", ocr.language());

        let extraction = decode_font(&self.options(), &ocr)?;
        if extraction.map.is_empty() {
            bail!("No glyph mappings extracted");
        }

        println!("\nSaving results...");
        write_font_map(&extraction.map, &self.output)?;
        println!("Font map saved to: {}", self.output.display());

        print_summary(&extraction.map);
        println!("\nDone");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    #[test]
    fn defaults_match_the_fixed_layout() {
        let cli = Cli::parse_from(["font-decode"]);
        assert_eq!(cli.font, Path::new("font.woff2"));
        assert_eq!(cli.output, Path::new("font_map.json"));

        let options = cli.options();
        assert_eq!(options.image_dir.as_deref(), Some(Path::new("font_images")));
        assert_eq!(options.canvas, Canvas::DEFAULT);
    }

    #[test]
    fn no_images_disables_saving() {
        let cli = Cli::parse_from(["font-decode", "--font", "x/site.woff", "--no-images"]);
        assert_eq!(cli.options().image_dir, None);
    }

    #[test]
    fn explicit_image_dir_and_size() {
        let cli = Cli::parse_from(["font-decode", "--image-dir", "out", "--size", "96"]);
        let options = cli.options();
        assert_eq!(options.image_dir.as_deref(), Some(Path::new("out")));
        assert_eq!(options.canvas, Canvas::new(96, 96));
    }

    #[test]
    fn rejects_tiny_canvas() {
        assert!(Cli::try_parse_from(["font-decode", "--size", "4"]).is_err());
    }

    #[test]
    fn image_dir_conflicts_with_no_images() {
        assert!(
            Cli::try_parse_from(["font-decode", "--image-dir", "out", "--no-images"]).is_err()
        );
    }
}
