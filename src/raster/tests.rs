//! Pipeline tests against fake capabilities.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use super::*;
use crate::blob::{BlobStore, BlobUrl};

// ============================================================================
// Test doubles
// ============================================================================

/// Blob host that records every allocation and every release per URL.
#[derive(Default)]
struct CountingHost {
    inner: BlobStore,
    allocations: Mutex<Vec<BlobUrl>>,
    releases: Mutex<HashMap<BlobUrl, usize>>,
}

impl CountingHost {
    fn allocated(&self) -> usize {
        self.allocations.lock().len()
    }

    fn released(&self) -> usize {
        self.releases.lock().values().sum()
    }

    fn release_count(&self, url: &BlobUrl) -> usize {
        self.releases.lock().get(url).copied().unwrap_or(0)
    }
}

impl BlobHost for CountingHost {
    fn allocate(&self, data: Arc<[u8]>) -> BlobUrl {
        let url = self.inner.allocate(data);
        self.allocations.lock().push(url.clone());
        url
    }

    fn fetch(&self, url: &BlobUrl) -> Option<Arc<[u8]>> {
        self.inner.fetch(url)
    }

    fn release(&self, url: &BlobUrl) {
        *self.releases.lock().entry(url.clone()).or_default() += 1;
        self.inner.release(url);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Fault {
    None,
    DecodeError,
    SurfaceMissing,
    DrawError,
    EncodeError,
    EncodeEmpty,
}

/// Rasterizer whose "image" is the source text and whose output bytes
/// spell out what was drawn, so results can be checked byte for byte.
struct FakeRasterizer {
    intrinsic: (u32, u32),
    decode_delay: Duration,
    fault: Fault,
}

impl FakeRasterizer {
    fn new(width: u32, height: u32) -> Self {
        Self {
            intrinsic: (width, height),
            decode_delay: Duration::ZERO,
            fault: Fault::None,
        }
    }

    fn delayed(mut self, delay: Duration) -> Self {
        self.decode_delay = delay;
        self
    }

    fn failing(mut self, fault: Fault) -> Self {
        self.fault = fault;
        self
    }
}

struct FakeSurface {
    width: u32,
    height: u32,
    drawn: Option<String>,
}

impl Rasterizer for FakeRasterizer {
    type Image = String;
    type Surface = FakeSurface;

    fn decode(
        &self,
        source: Arc<[u8]>,
    ) -> impl Future<Output = Result<Decoded<String>, String>> + Send {
        let delay = self.decode_delay;
        let fault = self.fault;
        let (width, height) = self.intrinsic;
        async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            if fault == Fault::DecodeError {
                return Err("unexpected end of document".to_string());
            }
            Ok(Decoded {
                image: String::from_utf8_lossy(&source).into_owned(),
                width,
                height,
            })
        }
    }

    fn surface(&self, width: u32, height: u32) -> Option<FakeSurface> {
        (self.fault != Fault::SurfaceMissing).then_some(FakeSurface {
            width,
            height,
            drawn: None,
        })
    }

    fn draw(&self, image: &String, surface: &mut FakeSurface) -> Result<(), String> {
        if self.fault == Fault::DrawError {
            return Err("tainted canvas".to_string());
        }
        surface.drawn = Some(image.clone());
        Ok(())
    }

    fn encode(
        &self,
        surface: FakeSurface,
        format: OutputFormat,
        _quality: f32,
    ) -> impl Future<Output = Result<Vec<u8>, String>> + Send {
        let fault = self.fault;
        async move {
            tokio::task::yield_now().await;
            match fault {
                Fault::EncodeError => Err("out of memory".to_string()),
                Fault::EncodeEmpty => Ok(Vec::new()),
                _ => Ok(format!(
                    "{}|{}x{}|{}",
                    surface.drawn.unwrap_or_default(),
                    surface.width,
                    surface.height,
                    format
                )
                .into_bytes()),
            }
        }
    }
}

fn pipeline(rasterizer: FakeRasterizer) -> (Pipeline<FakeRasterizer>, Arc<CountingHost>) {
    let counting = Arc::new(CountingHost::default());
    let host: Arc<dyn BlobHost> = counting.clone();
    let defaults = Arc::new(DefaultDimensions::new(DimensionConfig::default()));
    (Pipeline::new(host, rasterizer, defaults), counting)
}

fn source(name: &str) -> SourceAsset {
    SourceAsset::new(name, name.as_bytes().to_vec())
}

// ============================================================================
// Success path
// ============================================================================

#[tokio::test]
async fn test_width_request_derives_height() {
    let (pipeline, _) = pipeline(FakeRasterizer::new(300, 200));
    let request = DimensionConfig::new(Some(600), None).with_aspect_lock(true);

    let artifact = pipeline
        .convert(&source("chart.svg"), OutputFormat::Png, Some(&request))
        .await
        .unwrap();

    assert_eq!((artifact.width, artifact.height), (600, 400));
    assert_eq!((artifact.original_width, artifact.original_height), (300, 200));
    assert_eq!(artifact.original_name, "chart.png");
    assert_eq!(artifact.format, OutputFormat::Png);
}

#[tokio::test]
async fn test_size_matches_handle_content() {
    let (pipeline, _) = pipeline(FakeRasterizer::new(10, 10));
    let artifact = pipeline
        .convert(&source("dot.svg"), OutputFormat::Png, None)
        .await
        .unwrap();

    let bytes = artifact.handle.bytes().unwrap();
    assert_eq!(artifact.size, bytes.len());
    assert_eq!(artifact.size, artifact.handle.len());
    assert_eq!(&*bytes, b"dot.svg|10x10|png");
}

#[tokio::test]
async fn test_defaults_apply_without_request() {
    let (pipeline, _) = pipeline(FakeRasterizer::new(300, 200));
    pipeline.defaults().update(&DimensionConfig::new(Some(50), Some(60)));

    let artifact = pipeline
        .convert(&source("a.svg"), OutputFormat::Webp, None)
        .await
        .unwrap();
    assert_eq!((artifact.width, artifact.height), (50, 60));
}

#[tokio::test]
async fn test_zero_intrinsic_uses_fallback() {
    let (pipeline, _) = pipeline(FakeRasterizer::new(0, 0));
    let artifact = pipeline
        .convert(&source("empty.svg"), OutputFormat::Jpg, None)
        .await
        .unwrap();
    assert_eq!((artifact.original_width, artifact.original_height), (800, 600));
    assert_eq!((artifact.width, artifact.height), (800, 600));
}

#[tokio::test]
async fn test_zero_height_keeps_intrinsic_width() {
    let (pipeline, _) = pipeline(FakeRasterizer::new(120, 0));
    let request = DimensionConfig::new(Some(400), None);
    let artifact = pipeline
        .convert(&source("flat.svg"), OutputFormat::Png, Some(&request))
        .await
        .unwrap();
    assert_eq!((artifact.original_width, artifact.original_height), (120, 600));
    assert_eq!((artifact.width, artifact.height), (400, 2000));
}

#[tokio::test]
async fn test_fresh_id_per_conversion() {
    let (pipeline, _) = pipeline(FakeRasterizer::new(10, 10));
    let a = pipeline.convert(&source("a.svg"), OutputFormat::Png, None).await.unwrap();
    let b = pipeline.convert(&source("a.svg"), OutputFormat::Png, None).await.unwrap();
    assert_ne!(a.id, b.id);
    assert_ne!(a.handle.url(), b.handle.url());
}

// ============================================================================
// Resource safety
// ============================================================================

#[tokio::test]
async fn test_temp_resource_released_on_success() {
    let (pipeline, host) = pipeline(FakeRasterizer::new(10, 10));
    let artifact = pipeline
        .convert(&source("a.svg"), OutputFormat::Png, None)
        .await
        .unwrap();

    // temp source blob + output handle
    assert_eq!(host.allocated(), 2);
    let temp_url = host.allocations.lock()[0].clone();
    assert_eq!(host.release_count(&temp_url), 1);
    assert_eq!(host.release_count(artifact.handle.url()), 0);

    let out_url = artifact.handle.url().clone();
    drop(artifact);
    assert_eq!(host.release_count(&out_url), 1);
}

#[tokio::test]
async fn test_temp_resource_released_on_every_failure() {
    let faults = [
        (Fault::DecodeError, "decode_failed"),
        (Fault::SurfaceMissing, "surface_unavailable"),
        (Fault::DrawError, "encode_failed"),
        (Fault::EncodeError, "encode_failed"),
        (Fault::EncodeEmpty, "encode_failed"),
    ];
    for (fault, kind) in faults {
        let (pipeline, host) = pipeline(FakeRasterizer::new(10, 10).failing(fault));
        let err = pipeline
            .convert(&source("bad.svg"), OutputFormat::Png, None)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), kind, "wrong error for {fault:?}");
        assert_eq!(host.allocated(), 1, "no artifact handle for {fault:?}");
        assert_eq!(host.released(), 1, "temp blob not released for {fault:?}");
        assert!(host.inner.is_empty());
    }
}

#[tokio::test]
async fn test_draw_error_message() {
    let (pipeline, _) = pipeline(FakeRasterizer::new(10, 10).failing(Fault::DrawError));
    let err = pipeline
        .convert(&source("a.svg"), OutputFormat::Png, None)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ConvertError::EncodeFailed("failed to process SVG: tainted canvas".into())
    );
}

#[tokio::test(start_paused = true)]
async fn test_decode_timeout() {
    let (pipeline, host) =
        pipeline(FakeRasterizer::new(10, 10).delayed(DECODE_TIMEOUT + Duration::from_secs(1)));

    let err = pipeline
        .convert(&source("slow.svg"), OutputFormat::Png, None)
        .await
        .unwrap_err();

    assert_eq!(err, ConvertError::DecodeTimeout(DECODE_TIMEOUT));
    assert_eq!(host.allocated(), 1);
    assert_eq!(host.released(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_decode_just_under_timeout_succeeds() {
    let (pipeline, _) =
        pipeline(FakeRasterizer::new(10, 10).delayed(DECODE_TIMEOUT - Duration::from_millis(1)));
    assert!(
        pipeline
            .convert(&source("slow.svg"), OutputFormat::Png, None)
            .await
            .is_ok()
    );
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_concurrent_conversions_do_not_mix() {
    let (pipeline, host) = pipeline(FakeRasterizer::new(300, 200).delayed(Duration::from_millis(50)));

    let wide = DimensionConfig::new(Some(600), None);
    let tall = DimensionConfig::new(None, Some(50));
    let first = source("first.svg");
    let second = source("second.svg");

    let (a, b) = tokio::join!(
        pipeline.convert(&first, OutputFormat::Png, Some(&wide)),
        pipeline.convert(&second, OutputFormat::Jpg, Some(&tall)),
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_eq!((a.width, a.height), (600, 400));
    assert_eq!((b.width, b.height), (75, 50));
    assert_eq!(&*a.handle.bytes().unwrap(), b"first.svg|600x400|png");
    assert_eq!(&*b.handle.bytes().unwrap(), b"second.svg|75x50|jpg");

    // two temp blobs released, two artifact handles alive
    assert_eq!(host.allocated(), 4);
    assert_eq!(host.released(), 2);
}
