//! Glyph rendering into OCR-friendly bitmaps.
//!
//! Glyphs are drawn black on white, centered on a fixed canvas, then
//! sharpened and binarized so the classifier sees crisp strokes.

use std::io::Cursor;

use ab_glyph_rasterizer::{Rasterizer, point};
use image::{GrayImage, ImageFormat, Luma, imageops};
use kurbo::{Affine, BezPath, PathEl, Point, Rect, Shape};
use log::debug;
use read_fonts::types::GlyphId;
use skrifa::{
    FontRef, MetadataProvider,
    charmap::Charmap,
    instance::{LocationRef, Size},
    outline::{DrawSettings, OutlineGlyphCollection, OutlinePen},
};

use crate::{
    Error, FontFile, Result,
    sizing::{Canvas, fit_font_size},
};

const WHITE: u8 = 255;
const BLACK: u8 = 0;
const THRESHOLD: u8 = 128;
const FLATTEN_TOLERANCE: f64 = 0.1;

/// 3x3 sharpening kernel; weights sum to 16.
const SHARPEN_KERNEL: [f32; 9] = [-2.0, -2.0, -2.0, -2.0, 32.0, -2.0, -2.0, -2.0, -2.0];

/// Collects skrifa outline commands into a kurbo path.
#[derive(Default)]
struct PathPen(BezPath);

impl OutlinePen for PathPen {
    fn move_to(&mut self, x: f32, y: f32) {
        self.0.move_to((x as f64, y as f64));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.0.line_to((x as f64, y as f64));
    }

    fn quad_to(&mut self, cx0: f32, cy0: f32, x: f32, y: f32) {
        self.0.quad_to((cx0 as f64, cy0 as f64), (x as f64, y as f64));
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        self.0.curve_to((cx0 as f64, cy0 as f64), (cx1 as f64, cy1 as f64), (x as f64, y as f64));
    }

    fn close(&mut self) {
        self.0.close_path();
    }
}

/// Renders code points of one font onto a fixed-size canvas.
pub struct GlyphRasterizer<'a> {
    charmap: Charmap<'a>,
    outlines: OutlineGlyphCollection<'a>,
    canvas: Canvas,
}

impl<'a> GlyphRasterizer<'a> {
    pub fn new(font: &'a FontFile, canvas: Canvas) -> Result<Self> {
        let font: FontRef<'a> = font.font_ref()?;
        Ok(Self { charmap: font.charmap(), outlines: font.outline_glyphs(), canvas })
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Render a code point as a sharpened, binarized grayscale image.
    ///
    /// Code points without a glyph, and glyphs without contours, produce a
    /// blank canvas.
    pub fn render(&self, code_point: u32) -> Result<GrayImage> {
        let mut image = GrayImage::from_pixel(self.canvas.width, self.canvas.height, Luma([WHITE]));

        let Some(gid) = self.charmap.map(code_point) else {
            debug!("U+{code_point:04X} has no glyph");
            return Ok(image);
        };

        let size = fit_font_size(self.canvas, |size| {
            self.outline(gid, size).ok().map(|path| {
                let bbox = ink_box(&path);
                (bbox.width(), bbox.height())
            })
        });

        let path = match self.outline(gid, size) {
            Ok(path) => path,
            Err(e) => {
                debug!("{e}; retrying at default size");
                self.outline(gid, self.canvas.fallback_size())?
            }
        };
        if path.elements().is_empty() {
            return Ok(image);
        }

        let bbox = ink_box(&path);
        let dx = ((self.canvas.width as f64 - bbox.width()) / 2.0).floor() - bbox.x0;
        let dy = ((self.canvas.height as f64 - bbox.height()) / 2.0).floor() - bbox.y0;
        let placed = Affine::translate((dx, dy)) * path;

        self.fill(&placed, &mut image);
        Ok(binarize(sharpen(&image)))
    }

    /// Glyph outline at `size` pixels per em, in y-down image coordinates.
    fn outline(&self, gid: GlyphId, size: f32) -> Result<BezPath> {
        let glyph = self.outlines.get(gid).ok_or_else(|| Error::Draw {
            glyph_id: gid.to_u32(),
            size,
            message: "glyph has no outline".into(),
        })?;

        let mut pen = PathPen::default();
        let settings = DrawSettings::unhinted(Size::new(size), LocationRef::default());
        glyph.draw(settings, &mut pen).map_err(|e| Error::Draw {
            glyph_id: gid.to_u32(),
            size,
            message: e.to_string(),
        })?;

        Ok(Affine::FLIP_Y * pen.0)
    }

    fn fill(&self, path: &BezPath, image: &mut GrayImage) {
        let (width, height) = (self.canvas.width as f64, self.canvas.height as f64);
        let clamp = |p: Point| point(p.x.clamp(0.0, width) as f32, p.y.clamp(0.0, height) as f32);

        let mut rasterizer = Rasterizer::new(self.canvas.width as usize, self.canvas.height as usize);
        let mut start = Point::ZERO;
        let mut current = Point::ZERO;

        kurbo::flatten(path.elements().iter().copied(), FLATTEN_TOLERANCE, |el| match el {
            PathEl::MoveTo(p) => {
                if current != start {
                    rasterizer.draw_line(clamp(current), clamp(start));
                }
                start = p;
                current = p;
            }
            PathEl::LineTo(p) => {
                rasterizer.draw_line(clamp(current), clamp(p));
                current = p;
            }
            PathEl::ClosePath => {
                if current != start {
                    rasterizer.draw_line(clamp(current), clamp(start));
                }
                current = start;
            }
            // flatten only emits the three variants above
            PathEl::QuadTo(..) | PathEl::CurveTo(..) => {}
        });
        if current != start {
            rasterizer.draw_line(clamp(current), clamp(start));
        }

        rasterizer.for_each_pixel_2d(|x, y, alpha| {
            let ink = (alpha.clamp(0.0, 1.0) * WHITE as f32).round() as u8;
            image.put_pixel(x, y, Luma([WHITE - ink]));
        });
    }
}

/// Bounding box of the drawn ink, or an empty rect for an empty path.
fn ink_box(path: &BezPath) -> Rect {
    if path.elements().is_empty() { Rect::ZERO } else { path.bounding_box() }
}

/// Apply the sharpening kernel, leaving the one-pixel border untouched.
pub fn sharpen(image: &GrayImage) -> GrayImage {
    let mut out: GrayImage = imageops::filter3x3(image, &SHARPEN_KERNEL);
    let (width, height) = image.dimensions();
    for (x, y, pixel) in image.enumerate_pixels() {
        if x == 0 || y == 0 || x + 1 == width || y + 1 == height {
            out.put_pixel(x, y, *pixel);
        }
    }
    out
}

/// Map every pixel to pure black or white.
pub fn binarize(mut image: GrayImage) -> GrayImage {
    for pixel in image.pixels_mut() {
        pixel.0[0] = if pixel.0[0] < THRESHOLD { BLACK } else { WHITE };
    }
    image
}

/// Encode a grayscale image as PNG.
pub fn encode_png(image: &GrayImage) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageFormat::Png)?;
    Ok(buffer.into_inner())
}
