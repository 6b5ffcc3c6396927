//! Ticker lookup pipeline for the admin dashboard: submit a symbol, unwrap
//! the endpoint's payload, reshape its column-major blocks into rows,
//! project the four dashboard tables and render them to HTML surfaces.

pub mod columnar;
pub mod config;
pub mod controller;
pub mod error;
pub mod fetch;
pub mod payload;
pub mod render;
pub mod surface;
pub mod views;

pub use columnar::{columnar_to_rows, Row};
pub use config::Config;
pub use controller::{Outcome, SubmissionController};
pub use error::SubmitError;
pub use payload::unwrap_payload;
pub use render::render_table;
pub use views::{project_all, Table, ViewKind};
