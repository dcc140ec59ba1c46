//! Font container decoding and character map extraction.

use std::{
    borrow::Cow,
    collections::HashMap,
    fs::read,
    path::{Path, PathBuf},
};

use log::debug;
use read_fonts::{
    FontRef, TableProvider,
    tables::postscript::{Charset, dict},
    types::GlyphId,
};
use skrifa::{GlyphNameSource, GlyphNames, MetadataProvider};

use crate::{Error, Result};

const WOFF2_SIGNATURE: &[u8; 4] = b"wOF2";
const WOFF_SIGNATURE: &[u8; 4] = b"wOFF";

/// Container format detected from the leading signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Woff2,
    Woff,
    Sfnt,
}

impl Container {
    pub fn sniff(data: &[u8]) -> Self {
        match data.get(..4) {
            Some(sig) if sig == WOFF2_SIGNATURE => Container::Woff2,
            Some(sig) if sig == WOFF_SIGNATURE => Container::Woff,
            _ => Container::Sfnt,
        }
    }
}

/// Unwraps WOFF and WOFF2 containers into plain sfnt data.
///
/// Data without a web font signature is returned unchanged.
pub fn decode_container(data: &[u8]) -> Result<Cow<'_, [u8]>> {
    match Container::sniff(data) {
        Container::Woff2 => wuff::decompress_woff2(data)
            .map(Cow::Owned)
            .map_err(|e| Error::Decompress { format: "WOFF2", message: format!("{e:?}") }),
        Container::Woff => wuff::decompress_woff1(data)
            .map(Cow::Owned)
            .map_err(|e| Error::Decompress { format: "WOFF", message: format!("{e:?}") }),
        Container::Sfnt => Ok(Cow::Borrowed(data)),
    }
}

/// One character map entry with its resolved glyph name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmapEntry {
    pub code_point: u32,
    pub glyph_id: u32,
    pub glyph_name: String,
}

/// A decoded font held in memory.
#[derive(Debug, Clone)]
pub struct FontFile {
    path: Option<PathBuf>,
    data: Vec<u8>,
}

impl FontFile {
    /// Read and decode a font file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::NotFound(path.to_path_buf()));
        }
        let raw = read(path)
            .map_err(|source| Error::ReadFont { path: path.to_path_buf(), source })?;
        debug!("{}: {:?} container, {} bytes", path.display(), Container::sniff(&raw), raw.len());

        let mut font = Self::from_bytes(&raw)?;
        font.path = Some(path.to_path_buf());
        Ok(font)
    }

    /// Decode font data that is already in memory.
    pub fn from_bytes(raw: &[u8]) -> Result<Self> {
        let data = decode_container(raw)?.into_owned();
        FontRef::new(&data)?;
        Ok(Self { path: None, data })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Decoded sfnt bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn font_ref(&self) -> Result<FontRef<'_>> {
        Ok(FontRef::new(&self.data)?)
    }

    /// Entries of the best Unicode character map, in ascending code point order.
    pub fn cmap_entries(&self) -> Result<Vec<CmapEntry>> {
        let font = self.font_ref()?;
        let mappings: Vec<(u32, GlyphId)> = font.charmap().mappings().collect();
        let namer = GlyphNamer::new(&font, &mappings);

        let entries = mappings
            .iter()
            .map(|&(code_point, gid)| CmapEntry {
                code_point,
                glyph_id: gid.to_u32(),
                glyph_name: namer.name(gid),
            })
            .collect();
        Ok(entries)
    }
}

/// Resolves glyph names the way font tooling conventionally does.
///
/// Stored names come from `post` or a name-keyed CFF charset. Without them,
/// CID-keyed CFF glyphs are named `cidNNNNN`, mapped glyphs get `uniXXXX`
/// or `uXXXXX` from their lowest code point, and the rest `glyphNNNNN`.
struct GlyphNamer<'a> {
    names: GlyphNames<'a>,
    cids: Option<Charset<'a>>,
    code_points: HashMap<GlyphId, u32>,
}

impl<'a> GlyphNamer<'a> {
    fn new(font: &FontRef<'a>, mappings: &[(u32, GlyphId)]) -> Self {
        let names = font.glyph_names();
        let cids = match names.source() {
            GlyphNameSource::Synthesized => cid_charset(font),
            GlyphNameSource::Post | GlyphNameSource::Cff => None,
        };

        let mut code_points = HashMap::with_capacity(mappings.len());
        for &(code_point, gid) in mappings {
            code_points.entry(gid).or_insert(code_point);
        }
        Self { names, cids, code_points }
    }

    fn name(&self, gid: GlyphId) -> String {
        if let Some(name) = self.names.get(gid).filter(|name| !name.is_synthesized()) {
            return name.as_str().to_owned();
        }
        if gid == GlyphId::NOTDEF {
            return ".notdef".to_owned();
        }
        if let Some(cid) = self.cids.as_ref().and_then(|cids| cids.string_id(gid).ok()) {
            return format!("cid{:05}", cid.to_u16());
        }
        match self.code_points.get(&gid) {
            Some(&code_point) => code_point_glyph_name(code_point),
            None => format!("glyph{:05}", gid.to_u32()),
        }
    }
}

/// `uniXXXX` in the BMP, `uXXXXX` above it.
fn code_point_glyph_name(code_point: u32) -> String {
    if code_point <= 0xFFFF { format!("uni{code_point:04X}") } else { format!("u{code_point:X}") }
}

/// Charset of a CID-keyed CFF font, mapping glyphs to CIDs.
fn cid_charset<'a>(font: &FontRef<'a>) -> Option<Charset<'a>> {
    let cff = font.cff().ok()?;
    let top_dict = cff.top_dicts().get(0).ok()?;

    let mut is_cid = false;
    let mut charset_offset = None;
    for entry in dict::entries(top_dict, None).filter_map(|entry| entry.ok()) {
        match entry {
            dict::Entry::Ros { .. } => is_cid = true,
            dict::Entry::Charset(offset) => charset_offset = Some(offset),
            _ => {}
        }
    }
    if !is_cid {
        return None;
    }

    let num_glyphs = font.maxp().ok()?.num_glyphs() as u32;
    Charset::new(cff.offset_data(), charset_offset?, num_glyphs).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniff_signatures() {
        assert_eq!(Container::sniff(b"wOF2\0\x01\0\0"), Container::Woff2);
        assert_eq!(Container::sniff(b"wOFF\0\x01\0\0"), Container::Woff);
        assert_eq!(Container::sniff(b"\0\x01\0\0"), Container::Sfnt);
        assert_eq!(Container::sniff(b"OT"), Container::Sfnt);
    }

    #[test]
    fn sfnt_passes_through() {
        let data = font_test_data::VAZIRMATN_VAR;
        let decoded = decode_container(data).unwrap();
        assert!(matches!(decoded, Cow::Borrowed(_)));
        assert_eq!(decoded.len(), data.len());
    }

    #[test]
    fn truncated_woff2_is_an_error() {
        let err = decode_container(b"wOF2 not really a font").unwrap_err();
        assert!(matches!(err, Error::Decompress { format: "WOFF2", .. }));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(FontFile::from_bytes(b"definitely not a font").is_err());
    }

    #[test]
    fn missing_file_is_reported() {
        let err = FontFile::open("does/not/exist.woff2").unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn cid_keyed_cff_glyphs_are_named_by_cid() {
        let font = FontFile::from_bytes(font_test_data::NOTO_SANS_JP_CFF).unwrap();
        let entries = font.cmap_entries().unwrap();

        let a = entries.iter().find(|e| e.code_point == 0x41).unwrap();
        assert_eq!(a.glyph_id, 34);
        assert_eq!(a.glyph_name, "cid00034");
        assert!(entries.iter().all(|e| e.glyph_name.starts_with("cid")));
    }

    #[test]
    fn code_point_names_follow_unicode_convention() {
        assert_eq!(code_point_glyph_name(0xE001), "uniE001");
        assert_eq!(code_point_glyph_name(0x41), "uni0041");
        assert_eq!(code_point_glyph_name(0x1F600), "u1F600");
    }

    #[test]
    fn cmap_entries_are_sorted_and_named() {
        let font = FontFile::from_bytes(font_test_data::VAZIRMATN_VAR).unwrap();
        let entries = font.cmap_entries().unwrap();
        assert!(!entries.is_empty());
        assert!(entries.windows(2).all(|w| w[0].code_point < w[1].code_point));
        assert!(entries.iter().all(|e| !e.glyph_name.is_empty()));
    }
}
