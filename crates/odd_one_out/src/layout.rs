//! Grid layout: how many cells of a fixed size fit a viewport, and where they go.
//!
//! Coordinates are world units with the origin at the viewport centre and `y` pointing up,
//! which is what a `Camera2d` gives us. Row 0 is the bottom row.

use bevy::math::{Rect, Vec2};
use bevy::prelude::Resource;
use tracing::debug;

use crate::error::ConfigError;

/// Side margins taken off the viewport when sizing the grid. More than the two edges need,
/// the rest is room for the labels.
const USABLE_MARGIN_FACTOR: f32 = 2.5;
/// Distance of the first cell from the viewport edge, in side margins.
const ORIGIN_MARGIN_FACTOR: f32 = 1.25;
/// Upper bound on rows × cols.
pub const MAX_SLOTS: i64 = 4096;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn half_size(self) -> Vec2 {
        Vec2::new(self.width, self.height) * 0.5
    }

    fn validate(self) -> Result<Self, ConfigError> {
        let valid = |v: f32| v.is_finite() && v > 0.0;
        if valid(self.width) && valid(self.height) {
            Ok(self)
        } else {
            Err(ConfigError::InvalidViewport {
                width: self.width,
                height: self.height,
            })
        }
    }
}

/// Fixed inputs of the layout besides the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    /// Width and height of a (square) cell
    pub item_size: f32,
    /// Smallest gap allowed between two cells
    pub min_gutter: f32,
    /// Margin reserved on the left/right (`x`) and bottom/top (`y`) edges
    pub side_margin: Vec2,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            item_size: 45.0,
            min_gutter: 20.0,
            side_margin: Vec2::new(70.0, 30.0),
        }
    }
}

impl LayoutParams {
    fn validate(&self) -> Result<(), ConfigError> {
        if !self.item_size.is_finite() || self.item_size <= 0.0 {
            return Err(ConfigError::InvalidItemSize(self.item_size));
        }
        if !self.min_gutter.is_finite() || self.min_gutter < 0.0 {
            return Err(ConfigError::InvalidGutter(self.min_gutter));
        }
        Ok(())
    }
}

/// One grid cell. Immutable for a given viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellSlot {
    /// `row * cols + col`
    pub index: usize,
    pub row: u32,
    pub col: u32,
    /// Centre of the cell
    pub position: Vec2,
    pub size: f32,
}

impl CellSlot {
    pub fn contains(&self, point: Vec2) -> bool {
        let half = self.size * 0.5;
        (point.x - self.position.x).abs() <= half && (point.y - self.position.y).abs() <= half
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridLayout {
    pub rows: u32,
    pub cols: u32,
    pub col_spacing: f32,
    pub row_spacing: f32,
    /// Area the grid was sized against, centred on the viewport
    pub usable_area: Rect,
    pub slots: Vec<CellSlot>,
}

impl GridLayout {
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn slot(&self, index: usize) -> Option<&CellSlot> {
        self.slots.get(index)
    }
}

/// Number of cells that fit on one axis, and the usable length they were fitted into.
fn fit_axis(extent: f32, margin: f32, params: &LayoutParams) -> (f32, i64) {
    let usable = USABLE_MARGIN_FACTOR.mul_add(-margin, extent);
    let count = (usable / (params.item_size + params.min_gutter)).floor() as i64;
    (usable, count)
}

/// Spreads the leftover length evenly between cells. A single cell has no gap to fill.
fn axis_spacing(usable: f32, count: u32, item_size: f32) -> f32 {
    let gaps = count.saturating_sub(1);
    if gaps == 0 {
        debug!("Single cell on axis, spacing set to 0");
        return 0.0;
    }
    (count as f32).mul_add(-item_size, usable) / gaps as f32
}

pub fn compute_layout(viewport: Viewport, params: &LayoutParams) -> Result<GridLayout, ConfigError> {
    let viewport = viewport.validate()?;
    params.validate()?;

    let (usable_height, rows) = fit_axis(viewport.height, params.side_margin.y, params);
    let (usable_width, cols) = fit_axis(viewport.width, params.side_margin.x, params);
    if rows < 1 || cols < 1 {
        return Err(ConfigError::ViewportTooSmall {
            width: viewport.width,
            height: viewport.height,
            rows,
            cols,
        });
    }
    if rows.saturating_mul(cols) > MAX_SLOTS {
        return Err(ConfigError::TooManySlots { rows, cols });
    }
    // both in 1..=MAX_SLOTS from here
    let (rows, cols) = (rows as u32, cols as u32);

    let row_spacing = axis_spacing(usable_height, rows, params.item_size);
    let col_spacing = axis_spacing(usable_width, cols, params.item_size);

    let origin = params.side_margin * ORIGIN_MARGIN_FACTOR - viewport.half_size();
    let step = Vec2::new(params.item_size + col_spacing, params.item_size + row_spacing);

    let slots = (0..rows)
        .flat_map(|row| (0..cols).map(move |col| (row, col)))
        .enumerate()
        .map(|(index, (row, col))| CellSlot {
            index,
            row,
            col,
            position: origin + Vec2::new(col as f32, row as f32) * step,
            size: params.item_size,
        })
        .collect();

    debug!(
        "Layout for {}x{}: {rows} rows, {cols} cols, spacing {col_spacing}x{row_spacing}",
        viewport.width, viewport.height
    );

    Ok(GridLayout {
        rows,
        cols,
        col_spacing,
        row_spacing,
        usable_area: Rect::from_center_size(Vec2::ZERO, Vec2::new(usable_width, usable_height)),
        slots,
    })
}

#[derive(Debug)]
struct CachedLayout {
    viewport: Viewport,
    params: LayoutParams,
    layout: GridLayout,
}

/// Last computed layout, reused until the viewport (or the parameters) change.
#[derive(Resource, Debug, Default)]
pub struct LayoutCache {
    entry: Option<CachedLayout>,
}

impl LayoutCache {
    pub fn layout_for(
        &mut self,
        viewport: Viewport,
        params: &LayoutParams,
    ) -> Result<&GridLayout, ConfigError> {
        match &mut self.entry {
            Some(entry) if entry.viewport == viewport && entry.params == *params => {
                Ok(&entry.layout)
            }
            entry => {
                let layout = compute_layout(viewport, params)?;
                let cached = entry.insert(CachedLayout {
                    viewport,
                    params: *params,
                    layout,
                });
                Ok(&cached.layout)
            }
        }
    }

    /// Layout handed out by the last successful [`Self::layout_for`].
    pub fn current(&self) -> Option<&GridLayout> {
        self.entry.as_ref().map(|entry| &entry.layout)
    }

    pub fn is_cached_for(&self, viewport: Viewport) -> bool {
        self.entry
            .as_ref()
            .is_some_and(|entry| entry.viewport == viewport)
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;
    const BOUNDS_TOLERANCE: f32 = 1e-2;

    fn reference_params() -> LayoutParams {
        LayoutParams {
            item_size: 45.0,
            min_gutter: 20.0,
            side_margin: Vec2::new(70.0, 30.0),
        }
    }

    #[test]
    fn test_reference_viewport() {
        let layout = compute_layout(Viewport::new(400.0, 800.0), &reference_params())
            .expect("400x800 fits a grid");

        // usable 725 high / 65 per cell, usable 225 wide / 65 per cell
        assert_eq!(layout.rows, 11, "rows");
        assert_eq!(layout.cols, 3, "cols");
        assert!(
            (layout.row_spacing - 23.0).abs() < EPSILON,
            "(725 - 11 * 45) / 10, got {}",
            layout.row_spacing
        );
        assert!(
            (layout.col_spacing - 45.0).abs() < EPSILON,
            "(225 - 3 * 45) / 2, got {}",
            layout.col_spacing
        );
        assert_eq!(layout.slot_count(), 33, "rows * cols slots");
    }

    #[test]
    fn test_reference_positions() {
        let layout = compute_layout(Viewport::new(400.0, 800.0), &reference_params())
            .expect("400x800 fits a grid");

        let first = layout.slot(0).expect("bottom left slot");
        assert_eq!((first.row, first.col), (0, 0), "first slot is bottom left");
        assert!(
            first.position.distance(Vec2::new(-112.5, -362.5)) < EPSILON,
            "origin is 1.25 margins in from the corner, got {}",
            first.position
        );

        let second = layout.slot(1).expect("second slot");
        assert_eq!((second.row, second.col), (0, 1), "slots go left to right first");
        assert!(
            second.position.distance(Vec2::new(-22.5, -362.5)) < EPSILON,
            "one item plus one column gap to the right, got {}",
            second.position
        );

        let last = layout.slots.last().expect("top right slot");
        assert_eq!((last.row, last.col), (10, 2), "last slot is top right");
        assert!(
            last.position.distance(Vec2::new(67.5, 317.5)) < EPSILON,
            "got {}",
            last.position
        );
    }

    #[test]
    fn test_slot_indices_follow_rows() {
        let layout = compute_layout(Viewport::new(400.0, 800.0), &reference_params())
            .expect("400x800 fits a grid");
        for slot in &layout.slots {
            assert_eq!(
                slot.index,
                (slot.row * layout.cols + slot.col) as usize,
                "index of {slot:?}"
            );
            assert!((slot.size - 45.0).abs() < EPSILON, "cells keep the item size");
        }
    }

    #[test]
    fn test_slots_stay_inside_usable_area() {
        let params = reference_params();
        for width in (260..=1400).step_by(37) {
            for height in (160..=2000).step_by(53) {
                let viewport = Viewport::new(width as f32, height as f32);
                let Ok(layout) = compute_layout(viewport, &params) else {
                    continue;
                };
                assert!(layout.rows >= 1 && layout.cols >= 1, "{viewport:?}");
                let area = layout.usable_area;
                for slot in &layout.slots {
                    let far_edge = slot.position + Vec2::splat(slot.size * 0.5);
                    assert!(
                        slot.position.cmpge(area.min - BOUNDS_TOLERANCE).all()
                            && far_edge.cmple(area.max + BOUNDS_TOLERANCE).all(),
                        "{slot:?} outside {area:?} for {viewport:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_huge_viewport_is_rejected() {
        let params = reference_params();
        let result = compute_layout(Viewport::new(1.0e9, 1.0e9), &params);
        assert!(
            matches!(result, Err(ConfigError::TooManySlots { rows, cols }) if rows > 1_000 && cols > 1_000),
            "counts are reported, not wrapped: {result:?}"
        );
        assert!(
            matches!(
                compute_layout(Viewport::new(f32::MAX, 800.0), &params),
                Err(ConfigError::TooManySlots { .. })
            ),
            "largest finite width"
        );

        // 64 rows of 64 columns is still accepted
        let pitch = params.item_size + params.min_gutter;
        let side = |margin: f32| 64.0f32.mul_add(pitch, 2.5 * margin) + 1.0;
        let layout = compute_layout(
            Viewport::new(side(params.side_margin.x), side(params.side_margin.y)),
            &params,
        )
        .expect("at the cap");
        assert_eq!(layout.slot_count() as i64, MAX_SLOTS, "64 x 64 grid");
    }

    #[test]
    fn test_single_row_and_column_have_no_spacing() {
        // usable 100x100: one 45 + 20 cell on each axis
        let viewport = Viewport::new(100.0 + 2.5 * 70.0, 100.0 + 2.5 * 30.0);
        let layout = compute_layout(viewport, &reference_params()).expect("one cell fits");

        assert_eq!((layout.rows, layout.cols), (1, 1), "single cell grid");
        assert!(layout.row_spacing.abs() < f32::EPSILON, "no row gap to spread");
        assert!(layout.col_spacing.abs() < f32::EPSILON, "no column gap to spread");
        assert!(layout.row_spacing.is_finite() && layout.col_spacing.is_finite(), "no NaN");
        assert_eq!(layout.slot_count(), 1, "one slot");
    }

    #[test]
    fn test_viewport_too_small() {
        let err = compute_layout(Viewport::new(200.0, 800.0), &reference_params())
            .expect_err("25 usable pixels cannot hold a column");
        assert!(
            matches!(err, ConfigError::ViewportTooSmall { cols: 0, .. }),
            "got {err:?}"
        );

        let err = compute_layout(Viewport::new(100.0, 50.0), &reference_params())
            .expect_err("negative usable area");
        assert!(
            matches!(err, ConfigError::ViewportTooSmall { rows, cols, .. } if rows < 1 && cols < 1),
            "got {err:?}"
        );
    }

    #[test]
    fn test_invalid_inputs() {
        let params = reference_params();
        assert_eq!(
            compute_layout(Viewport::new(0.0, 800.0), &params),
            Err(ConfigError::InvalidViewport {
                width: 0.0,
                height: 800.0
            }),
            "zero width"
        );
        assert!(
            matches!(
                compute_layout(Viewport::new(f32::NAN, 800.0), &params),
                Err(ConfigError::InvalidViewport { .. })
            ),
            "NaN width"
        );

        let no_item = LayoutParams {
            item_size: 0.0,
            ..params
        };
        assert_eq!(
            compute_layout(Viewport::new(400.0, 800.0), &no_item),
            Err(ConfigError::InvalidItemSize(0.0)),
            "zero item size"
        );

        let negative_gutter = LayoutParams {
            min_gutter: -1.0,
            ..params
        };
        assert_eq!(
            compute_layout(Viewport::new(400.0, 800.0), &negative_gutter),
            Err(ConfigError::InvalidGutter(-1.0)),
            "negative gutter"
        );
    }

    #[test]
    fn test_layout_is_deterministic() {
        let viewport = Viewport::new(390.0, 844.0);
        let first = compute_layout(viewport, &reference_params()).expect("fits");
        let second = compute_layout(viewport, &reference_params()).expect("fits");
        assert_eq!(first, second, "same inputs give the same slots");
    }

    #[test]
    fn test_cache_reuses_and_invalidates() {
        let params = reference_params();
        let mut cache = LayoutCache::default();
        let portrait = Viewport::new(400.0, 800.0);
        let landscape = Viewport::new(800.0, 400.0);

        let first = cache.layout_for(portrait, &params).expect("fits").clone();
        assert!(cache.is_cached_for(portrait), "cached after first access");
        let again = cache.layout_for(portrait, &params).expect("fits").clone();
        assert_eq!(first, again, "cached layout returned");

        let rotated = cache.layout_for(landscape, &params).expect("fits").clone();
        assert!(cache.is_cached_for(landscape), "new viewport replaces the entry");
        assert!(!cache.is_cached_for(portrait), "old viewport dropped");
        assert_ne!((first.rows, first.cols), (rotated.rows, rotated.cols), "recomputed");

        assert_eq!(cache.current(), Some(&rotated), "current layout is the last one handed out");

        cache.invalidate();
        assert!(!cache.is_cached_for(landscape), "invalidated");
        assert!(cache.current().is_none(), "nothing cached");
    }

    #[test]
    fn test_cache_keeps_errors_out() {
        let mut cache = LayoutCache::default();
        let tiny = Viewport::new(10.0, 10.0);
        assert!(cache.layout_for(tiny, &reference_params()).is_err(), "too small");
        assert!(!cache.is_cached_for(tiny), "failed layouts are not cached");
    }
}
