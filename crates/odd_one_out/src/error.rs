use thiserror::Error;

/// Invalid layout or round inputs. Fatal to the session: the board cannot be drawn.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Viewport must have a positive finite size, got {width}x{height}")]
    InvalidViewport { width: f32, height: f32 },

    #[error("Item size must be positive, got {0}")]
    InvalidItemSize(f32),

    #[error("Minimum gutter must be non-negative, got {0}")]
    InvalidGutter(f32),

    #[error(
        "Viewport {width}x{height} is too small for the grid - fits {rows} rows and {cols} columns"
    )]
    ViewportTooSmall {
        width: f32,
        height: f32,
        rows: i64,
        cols: i64,
    },

    #[error("Grid of {rows} rows and {cols} columns has more than {max} slots", max = crate::layout::MAX_SLOTS)]
    TooManySlots { rows: i64, cols: i64 },

    #[error("Icon catalog needs at least 2 icons, got {0}")]
    CatalogTooSmall(usize),

    #[error("Icon catalog lists {0:?} more than once")]
    DuplicateIcon(String),

    #[error("A round needs at least one slot")]
    NoSlots,

    #[error("Levels start at 1, got {0}")]
    InvalidLevel(u32),
}
