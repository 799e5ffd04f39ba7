//! Process-wide session.
//!
//! One [`Session`] backed by the headless rasterizer, created on first
//! access. UI layers and the CLI reach it through [`session`].

use std::sync::LazyLock;

use crate::raster::ResvgRasterizer;
use crate::session::Session;

static SESSION: LazyLock<Session<ResvgRasterizer>> =
    LazyLock::new(|| Session::new(ResvgRasterizer::new()));

#[inline]
pub fn session() -> &'static Session<ResvgRasterizer> {
    &SESSION
}

/// Release every artifact still held by the process-wide registry.
pub fn shutdown() {
    let session = session();
    let held = session.list().len();
    session.clear();
    crate::debug!("state"; "released {} artifact(s)", held);
}
