//! Bioassay and reaction-chemistry tables rendered as standard scientific
//! figures.
//!
//! ```text
//! loader ─▶ RawTable ─▶ normalize/split ─▶ layout planner ─▶ Figure ─▶ render
//! ```

pub mod cli;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod layout;
pub mod render;
pub mod session;
pub mod style;

pub use config::{ChartKind, ChartOptions};
pub use error::{ChartError, Result};
pub use session::ChartSession;
