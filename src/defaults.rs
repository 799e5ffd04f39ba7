//! Process-wide default dimensions with atomic replacement.
//!
//! Uses `arc-swap` for lock-free reads: every conversion loads the current
//! snapshot, and updates swap in a merged copy via read-copy-update, so
//! concurrent partial updates never drop each other's fields.

use arc_swap::ArcSwap;

use crate::dimension::DimensionConfig;

pub struct DefaultDimensions {
    current: ArcSwap<DimensionConfig>,
}

impl DefaultDimensions {
    pub fn new(initial: DimensionConfig) -> Self {
        Self {
            current: ArcSwap::from_pointee(initial),
        }
    }

    /// Current defaults snapshot.
    #[inline]
    pub fn get(&self) -> DimensionConfig {
        **self.current.load()
    }

    /// Merge the supplied fields of `partial` into the defaults.
    pub fn update(&self, partial: &DimensionConfig) -> DimensionConfig {
        let previous = self.current.rcu(|current| {
            let mut merged = **current;
            merged.merge(partial);
            merged
        });
        let mut merged = *previous;
        merged.merge(partial);
        crate::debug!("defaults"; "now {:?}", merged);
        merged
    }
}

impl Default for DefaultDimensions {
    fn default() -> Self {
        Self::new(DimensionConfig::initial_defaults())
    }
}
