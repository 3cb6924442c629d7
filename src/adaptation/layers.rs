//! Viewport to layer mapping for transport adapters
//!
//! Spatial layers are assumed to halve resolution per step below the top
//! layer. Video is letterboxed into the viewport, so a layer is big enough
//! once it matches the viewport in either dimension.

use crate::consumers::LayerState;
use crate::types::ViewportSize;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerSelection {
    pub spatial: u8,
    pub temporal: u8,
}

/// Resolution of spatial layer `index`.
pub fn layer_resolution(layers: &LayerState, index: u8) -> ViewportSize {
    let top = layers.spatial_layers.max(1) - 1;
    let shift = u32::from(top.saturating_sub(index)).min(31);
    ViewportSize::new(layers.width >> shift, layers.height >> shift)
}

/// Lowest spatial layer covering the viewport, with the highest temporal
/// layer. When even the lowest spatial layer is more than twice the
/// viewport, the temporal layer steps down once to save bandwidth.
pub fn select_layers(layers: &LayerState, viewport: ViewportSize) -> LayerSelection {
    let top = layers.spatial_layers.max(1) - 1;

    let spatial = (0..=top)
        .find(|&index| {
            let res = layer_resolution(layers, index);
            res.width >= viewport.width || res.height >= viewport.height
        })
        .unwrap_or(top);

    let mut temporal = layers.temporal_layers.saturating_sub(1);
    if spatial == 0 && temporal > 0 {
        let lowest = layer_resolution(layers, 0);
        let oversized = u64::from(lowest.width) > 2 * u64::from(viewport.width)
            || u64::from(lowest.height) > 2 * u64::from(viewport.height);
        if oversized {
            temporal -= 1;
        }
    }

    LayerSelection { spatial, temporal }
}
