//! Writing rendered drawings to disk

use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

use crate::engine::EngineError;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("no render instance is live")]
    NoInstance,

    #[error("no SVG is mounted in the container")]
    NoSvg,

    #[error("engine could not export: {0}")]
    Engine(#[from] EngineError),

    #[error("malformed data URL: {0}")]
    DataUrl(String),

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("failed to write export: {0}")]
    Io(#[from] std::io::Error),
}

/// A decoded `data:` URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl DataUrl {
    /// Decode `data:<mime>;base64,<payload>`
    pub fn parse(url: &str) -> Result<Self, ExportError> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| ExportError::DataUrl("missing 'data:' scheme".to_string()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| ExportError::DataUrl("missing ',' separator".to_string()))?;
        let mime = header
            .strip_suffix(";base64")
            .ok_or_else(|| ExportError::DataUrl("only base64 payloads are supported".to_string()))?;

        Ok(Self {
            mime: mime.to_string(),
            bytes: STANDARD.decode(payload)?,
        })
    }
}

/// Write serialized SVG markup
pub fn write_svg(path: &Path, svg: &str) -> Result<(), ExportError> {
    if !svg.contains("<svg") {
        return Err(ExportError::NoSvg);
    }
    std::fs::write(path, svg)?;
    Ok(())
}

/// Decode a data URL and write its bytes
pub fn write_data_url(path: &Path, url: &str) -> Result<DataUrl, ExportError> {
    let decoded = DataUrl::parse(url)?;
    std::fs::write(path, &decoded.bytes)?;
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_data_url() {
        let url = format!("data:image/svg+xml;base64,{}", STANDARD.encode("<svg/>"));
        let decoded = DataUrl::parse(&url).unwrap();
        assert_eq!(decoded.mime, "image/svg+xml");
        assert_eq!(decoded.bytes, b"<svg/>");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(matches!(DataUrl::parse("image/png;base64,AA"), Err(ExportError::DataUrl(_))));
        assert!(matches!(DataUrl::parse("data:image/png,AA"), Err(ExportError::DataUrl(_))));
        assert!(matches!(DataUrl::parse("data:image/png;base64,@@"), Err(ExportError::Base64(_))));
    }

    #[test]
    fn test_write_svg_requires_markup() {
        let path = std::env::temp_dir().join("infographic-studio-export-empty.svg");
        assert!(matches!(write_svg(&path, ""), Err(ExportError::NoSvg)));
    }

    #[test]
    fn test_write_data_url_round_trip() {
        let path = std::env::temp_dir().join("infographic-studio-export-test.svg");
        let url = format!("data:image/svg+xml;base64,{}", STANDARD.encode("<svg></svg>"));
        write_data_url(&path, &url).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<svg></svg>");
        let _ = std::fs::remove_file(&path);
    }
}
