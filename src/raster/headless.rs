//! Headless rasterizer built on usvg/resvg, encoding through `image`.

use std::future::Future;
use std::sync::Arc;

use image::ImageEncoder;
use image::codecs::{jpeg::JpegEncoder, png::PngEncoder, webp::WebPEncoder};
use image::ExtendedColorType;
use resvg::tiny_skia::{Pixmap, Transform};

use super::backend::{Decoded, Rasterizer};
use crate::format::OutputFormat;

/// [`Rasterizer`] that parses with usvg and renders with resvg/tiny-skia.
///
/// Parsing and encoding are CPU-bound and run on tokio's blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResvgRasterizer;

impl ResvgRasterizer {
    pub fn new() -> Self {
        Self
    }
}

impl Rasterizer for ResvgRasterizer {
    type Image = usvg::Tree;
    type Surface = Pixmap;

    fn decode(
        &self,
        source: Arc<[u8]>,
    ) -> impl Future<Output = Result<Decoded<usvg::Tree>, String>> + Send {
        async move {
            tokio::task::spawn_blocking(move || parse_svg(&source))
                .await
                .map_err(|e| format!("decoder task failed: {e}"))?
        }
    }

    fn surface(&self, width: u32, height: u32) -> Option<Pixmap> {
        Pixmap::new(width, height)
    }

    #[allow(clippy::cast_precision_loss)]
    fn draw(&self, image: &usvg::Tree, surface: &mut Pixmap) -> Result<(), String> {
        let size = image.size();
        let sx = surface.width() as f32 / size.width();
        let sy = surface.height() as f32 / size.height();
        if !sx.is_finite() || !sy.is_finite() {
            return Err(format!(
                "cannot scale {}x{} image onto surface",
                size.width(),
                size.height()
            ));
        }

        resvg::render(image, Transform::from_scale(sx, sy), &mut surface.as_mut());
        Ok(())
    }

    fn encode(
        &self,
        surface: Pixmap,
        format: OutputFormat,
        quality: f32,
    ) -> impl Future<Output = Result<Vec<u8>, String>> + Send {
        async move {
            tokio::task::spawn_blocking(move || encode_pixmap(&surface, format, quality))
                .await
                .map_err(|e| format!("encoder task failed: {e}"))?
        }
    }
}

/// Parse SVG bytes and report the rounded intrinsic size.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_svg(data: &[u8]) -> Result<Decoded<usvg::Tree>, String> {
    let tree = usvg::Tree::from_data(data, &usvg::Options::default()).map_err(|e| e.to_string())?;
    let size = tree.size();
    Ok(Decoded {
        width: size.width().round() as u32,
        height: size.height().round() as u32,
        image: tree,
    })
}

/// Encode a rendered pixmap into `format`.
fn encode_pixmap(pixmap: &Pixmap, format: OutputFormat, quality: f32) -> Result<Vec<u8>, String> {
    let (width, height) = (pixmap.width(), pixmap.height());
    let rgba = demultiply(pixmap);
    let mut out = Vec::new();

    let result = match format {
        OutputFormat::Png => {
            PngEncoder::new(&mut out).write_image(&rgba, width, height, ExtendedColorType::Rgba8)
        }
        OutputFormat::Jpg => {
            // JPEG has no alpha channel; transparent pixels come out black
            let rgb: Vec<u8> = rgba
                .chunks_exact(4)
                .flat_map(|px| [px[0], px[1], px[2]])
                .collect();
            JpegEncoder::new_with_quality(&mut out, quality_percent(quality)).write_image(
                &rgb,
                width,
                height,
                ExtendedColorType::Rgb8,
            )
        }
        // `image` only ships a lossless WebP encoder
        OutputFormat::Webp => WebPEncoder::new_lossless(&mut out).write_image(
            &rgba,
            width,
            height,
            ExtendedColorType::Rgba8,
        ),
    };
    result.map_err(|e| e.to_string())?;

    if out.is_empty() {
        return Err("encoder produced no output".to_string());
    }
    Ok(out)
}

/// tiny-skia stores premultiplied RGBA; encoders expect straight alpha.
fn demultiply(pixmap: &Pixmap) -> Vec<u8> {
    pixmap
        .pixels()
        .iter()
        .flat_map(|px| {
            let c = px.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect()
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn quality_percent(quality: f32) -> u8 {
    (quality.clamp(0.0, 1.0) * 100.0).round().max(1.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED_SQUARE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"><rect width="10" height="10" fill="red"/></svg>"#;
    const WIDE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="300" height="200"><rect width="300" height="200" fill="blue"/></svg>"#;

    #[test]
    fn test_parse_reports_intrinsic_size() {
        let decoded = parse_svg(WIDE.as_bytes()).unwrap();
        assert_eq!((decoded.width, decoded.height), (300, 200));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_svg(b"definitely not svg").is_err());
    }

    #[test]
    fn test_draw_stretches_to_surface() {
        let raster = ResvgRasterizer::new();
        let decoded = parse_svg(RED_SQUARE.as_bytes()).unwrap();
        let mut surface = raster.surface(40, 20).unwrap();
        raster.draw(&decoded.image, &mut surface).unwrap();

        for (x, y) in [(0, 0), (39, 19), (20, 10)] {
            let px = surface.pixel(x, y).unwrap().demultiply();
            assert_eq!((px.red(), px.green(), px.blue(), px.alpha()), (255, 0, 0, 255));
        }
    }

    #[test]
    fn test_surface_unavailable_for_zero_size() {
        assert!(ResvgRasterizer::new().surface(0, 10).is_none());
    }

    #[test]
    fn test_encode_magic_bytes() {
        let mut pixmap = Pixmap::new(4, 4).unwrap();
        pixmap.fill(resvg::tiny_skia::Color::from_rgba8(0, 128, 255, 255));

        let png = encode_pixmap(&pixmap, OutputFormat::Png, 0.95).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");

        let jpg = encode_pixmap(&pixmap, OutputFormat::Jpg, 0.95).unwrap();
        assert_eq!(&jpg[..2], &[0xFF, 0xD8]);

        let webp = encode_pixmap(&pixmap, OutputFormat::Webp, 0.95).unwrap();
        assert_eq!(&webp[..4], b"RIFF");
        assert_eq!(&webp[8..12], b"WEBP");
    }

    #[test]
    fn test_png_roundtrip_dimensions() {
        let pixmap = Pixmap::new(7, 3).unwrap();
        let png = encode_pixmap(&pixmap, OutputFormat::Png, 0.95).unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (7, 3));
    }

    #[test]
    fn test_quality_percent() {
        assert_eq!(quality_percent(0.95), 95);
        assert_eq!(quality_percent(2.0), 100);
        assert_eq!(quality_percent(0.0), 1);
    }

    #[tokio::test]
    async fn test_async_decode_and_encode() {
        let raster = ResvgRasterizer::new();
        let decoded = raster.decode(Arc::from(WIDE.as_bytes())).await.unwrap();
        let mut surface = raster.surface(60, 40).unwrap();
        raster.draw(&decoded.image, &mut surface).unwrap();
        let bytes = raster.encode(surface, OutputFormat::Png, 0.95).await.unwrap();
        assert!(!bytes.is_empty());
    }
}
