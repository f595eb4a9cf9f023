//! PNG rasterization of drawn SVG documents

use std::sync::{Arc, OnceLock};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{self, fontdb};

use super::{EngineError, ImageType};

/// System fonts, loaded once per process
fn fonts() -> Arc<fontdb::Database> {
    static FONTS: OnceLock<Arc<fontdb::Database>> = OnceLock::new();
    FONTS
        .get_or_init(|| {
            let mut db = fontdb::Database::new();
            db.load_system_fonts();
            log::debug!("loaded {} font faces for rasterizing", db.len());
            Arc::new(db)
        })
        .clone()
}

/// First family of a CSS `font-family` list
fn primary_font(families: &str) -> Option<String> {
    families
        .split(',')
        .map(|s| s.trim().trim_matches(['"', '\'']))
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// Rasterize SVG markup to PNG bytes at its own size
pub fn rasterize(svg: &str, font_family: &str) -> Result<Vec<u8>, EngineError> {
    let mut opt = usvg::Options::default();
    if let Some(family) = primary_font(font_family) {
        opt.font_family = family;
    }
    opt.fontdb = fonts();

    let tree = usvg::Tree::from_str(svg, &opt)
        .map_err(|e| EngineError::Rasterize(e.to_string()))?;
    let size = tree.size().to_int_size();
    let mut pixmap = Pixmap::new(size.width(), size.height())
        .ok_or_else(|| EngineError::Rasterize("failed to allocate pixmap".to_string()))?;

    resvg::render(&tree, Transform::default(), &mut pixmap.as_mut());
    pixmap
        .encode_png()
        .map_err(|e| EngineError::Rasterize(e.to_string()))
}

/// Rasterize and wrap as a `data:image/png;base64,` URL
pub fn png_data_url(svg: &str, font_family: &str) -> Result<String, EngineError> {
    let png = rasterize(svg, font_family)?;
    Ok(format!("data:{};base64,{}", ImageType::Png.mime(), STANDARD.encode(png)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

    fn ihdr_size(png: &[u8]) -> (u32, u32) {
        let width = u32::from_be_bytes([png[16], png[17], png[18], png[19]]);
        let height = u32::from_be_bytes([png[20], png[21], png[22], png[23]]);
        (width, height)
    }

    #[test]
    fn test_rasterize_keeps_canvas_size() {
        let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" width="120" height="80" viewBox="0 0 120 80"><rect width="120" height="80" fill="#1783ff"/></svg>"##;
        let png = rasterize(svg, "sans-serif").unwrap();
        assert_eq!(png[..8], PNG_SIGNATURE);
        assert_eq!(ihdr_size(&png), (120, 80));
    }

    #[test]
    fn test_data_url_prefix() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="4"/>"#;
        let url = png_data_url(svg, "").unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_malformed_markup_is_an_error() {
        assert!(matches!(
            rasterize("<svg", "sans-serif"),
            Err(EngineError::Rasterize(_))
        ));
    }

    #[test]
    fn test_primary_font() {
        assert_eq!(
            primary_font("\"Alibaba PuHuiTi\", sans-serif").as_deref(),
            Some("Alibaba PuHuiTi")
        );
        assert_eq!(primary_font(" , "), None);
    }
}
