mod app;
pub use app::*;

pub mod input;

mod host;
pub use host::*;
