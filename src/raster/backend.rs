//! Rasterization capabilities the pipeline is written against.

use std::future::Future;
use std::sync::Arc;

use crate::format::OutputFormat;

/// Decoded vector image with its intrinsic size.
///
/// A size of zero means the decoder could not determine it.
#[derive(Debug)]
pub struct Decoded<I> {
    pub image: I,
    pub width: u32,
    pub height: u32,
}

/// Decode, draw and encode steps of a conversion.
///
/// Errors are plain messages; the pipeline maps them onto
/// [`ConvertError`](super::ConvertError) variants by step.
pub trait Rasterizer: Send + Sync + 'static {
    /// Drawable produced by [`decode`](Self::decode).
    type Image: Send + 'static;
    /// Off-screen bitmap surface.
    type Surface: Send + 'static;

    /// Decode vector source bytes.
    fn decode(
        &self,
        source: Arc<[u8]>,
    ) -> impl Future<Output = Result<Decoded<Self::Image>, String>> + Send;

    /// Allocate a blank surface, `None` if the runtime cannot provide one.
    fn surface(&self, width: u32, height: u32) -> Option<Self::Surface>;

    /// Draw `image` stretched to cover the whole surface.
    fn draw(&self, image: &Self::Image, surface: &mut Self::Surface) -> Result<(), String>;

    /// Encode the surface. `quality` is in `0.0..=1.0` and only applies to
    /// lossy formats.
    fn encode(
        &self,
        surface: Self::Surface,
        format: OutputFormat,
        quality: f32,
    ) -> impl Future<Output = Result<Vec<u8>, String>> + Send;
}
