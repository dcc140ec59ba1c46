//! Persistence of glyph images and the font map.

use std::{
    fs::{File, create_dir_all, write},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

use crate::pipeline::font_map::FontMap;

/// Directory of rendered glyph images with collision-safe file names.
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name stem for a glyph: `{glyph}_U{hex}` with unsafe characters removed.
    pub fn file_stem(glyph_name: &str, code_point: u32) -> String {
        let hex = format!("{code_point:04x}");
        let stem: String = format!("{glyph_name}_U{hex}")
            .chars()
            .filter(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
            .collect();
        if stem.is_empty() { format!("char_{hex}") } else { stem }
    }

    /// First `{stem}.png`, `{stem}_1.png`, `{stem}_2.png`, ... not yet on disk.
    fn free_name(&self, stem: &str) -> String {
        let mut name = format!("{stem}.png");
        let mut counter = 1;
        while self.dir.join(&name).exists() {
            name = format!("{stem}_{counter}.png");
            counter += 1;
        }
        name
    }

    /// Write PNG data for a glyph and return the file name used.
    pub fn save(&self, png: &[u8], glyph_name: &str, code_point: u32) -> Result<String> {
        create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create directory: {}", self.dir.display()))?;

        let name = self.free_name(&Self::file_stem(glyph_name, code_point));
        let path = self.dir.join(&name);
        write(&path, png).with_context(|| format!("Failed to write image: {}", path.display()))?;
        Ok(name)
    }
}

/// Write the font map as pretty-printed UTF-8 JSON.
pub fn write_font_map(map: &FontMap, path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, map)
        .with_context(|| format!("Failed to serialize font map to {}", path.display()))?;
    writer.flush().with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stem_keeps_safe_characters() {
        assert_eq!(ImageStore::file_stem("uni4E2D", 0x4e2d), "uni4E2D_U4e2d");
        assert_eq!(ImageStore::file_stem("a/b c", 0x41), "ab_c_U0041");
        assert_eq!(ImageStore::file_stem("one.alt-1", 0x31), "one.alt-1_U0031");
    }

    #[test]
    fn stem_keeps_unicode_letters() {
        assert_eq!(ImageStore::file_stem("中", 0x4e2d), "中_U4e2d");
    }

    #[test]
    fn colliding_names_get_numbered() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path().join("images"));

        let first = store.save(b"png", "glyph", 0x41).unwrap();
        let second = store.save(b"png", "glyph", 0x41).unwrap();
        let third = store.save(b"png", "glyph", 0x41).unwrap();

        assert_eq!(first, "glyph_U0041.png");
        assert_eq!(second, "glyph_U0041_1.png");
        assert_eq!(third, "glyph_U0041_2.png");
        assert!(dir.path().join("images").join(&third).exists());
    }
}
