use std::{
    io::Write,
    process::{Command, Stdio},
};

use log::debug;

use crate::{Error, Recognizer, Result, normalize_text};

pub const DEFAULT_BINARY: &str = "tesseract";

/// Simplified Chinese, the usual target of obfuscated web fonts.
pub const DEFAULT_LANGUAGE: &str = "chi_sim";

/// Page segmentation mode 10: treat the image as a single character.
const SINGLE_CHAR_PSM: &str = "10";

/// OCR through the `tesseract` command line tool.
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    program: String,
    language: String,
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self::new(DEFAULT_BINARY, DEFAULT_LANGUAGE)
    }
}

impl TesseractOcr {
    pub fn new(program: impl Into<String>, language: impl Into<String>) -> Self {
        Self { program: program.into(), language: language.into() }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Check that the engine can be started.
    pub fn probe(&self) -> Result<String> {
        let output = Command::new(&self.program)
            .arg("--version")
            .output()
            .map_err(|source| Error::Spawn { program: self.program.clone(), source })?;
        if !output.status.success() {
            return Err(Error::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        let version = String::from_utf8_lossy(&output.stdout);
        Ok(version.lines().next().unwrap_or_default().trim().to_string())
    }

    fn args(&self) -> [&str; 6] {
        ["stdin", "stdout", "--psm", SINGLE_CHAR_PSM, "-l", &self.language]
    }
}

impl Recognizer for TesseractOcr {
    fn recognize(&self, png: &[u8]) -> Result<String> {
        let mut child = Command::new(&self.program)
            .args(self.args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| Error::Spawn { program: self.program.clone(), source })?;

        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(png),
            None => Ok(()),
        };
        if let Err(e) = written {
            // The engine quit before reading its input; reap it.
            let _ = child.kill();
            let _ = child.wait();
            return Err(e.into());
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(Error::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let raw = String::from_utf8(output.stdout).map_err(|_| Error::InvalidOutput)?;
        debug!("tesseract raw output: {raw:?}");
        Ok(normalize_text(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_character_mode() {
        let ocr = TesseractOcr::new("tesseract", "eng");
        assert_eq!(ocr.args(), ["stdin", "stdout", "--psm", "10", "-l", "eng"]);
    }

    #[test]
    fn defaults() {
        let ocr = TesseractOcr::default();
        assert_eq!(ocr.program(), DEFAULT_BINARY);
        assert_eq!(ocr.language(), "chi_sim");
    }

    #[cfg(unix)]
    #[test]
    fn engine_exiting_early_is_an_io_error() {
        // `true` exits without reading stdin, so a large write hits a closed pipe.
        let ocr = TesseractOcr::new("true", "eng");
        let png = vec![0u8; 1 << 20];
        assert!(matches!(ocr.recognize(&png), Err(Error::Io(_))));
    }

    #[test]
    fn missing_binary_fails_to_spawn() {
        let ocr = TesseractOcr::new("scrapekit-no-such-ocr-binary", "eng");
        assert!(matches!(ocr.probe(), Err(Error::Spawn { .. })));
        assert!(matches!(ocr.recognize(b"png"), Err(Error::Spawn { .. })));
    }
}
