#![forbid(unsafe_code)]

//! Headless commit-history lane graph renderer.
//!
//! Input is an ordered, already laid-out history window (each commit carries a column and a
//! lane); output is the set of path and point primitives needed to draw it, plus the canvas
//! size. Turning primitives into pixels is left to the caller (see [`svg`] for a minimal SVG
//! serializer).

pub mod config;
pub mod graph;
pub mod model;
pub mod path;
pub mod svg;
mod timing;

pub use config::{RenderConfig, SkipPolicy};
pub use graph::{GraphRenderer, layout_history, pos_x, pos_y, unresolved_children};
pub use model::{
    Commit, CommitHistory, Lane, PathPrimitive, PointPrimitive, Primitive, RenderOutput,
};
pub use path::PathData;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid render config: {field} {message}")]
    InvalidConfig {
        field: &'static str,
        message: String,
    },
    #[error("invalid commit model: {message}")]
    InvalidModel { message: String },
    #[error("commit {parent} references child {child} which is not part of the history window")]
    UnresolvedChild { parent: String, child: String },
    #[error("history JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Parses a JSON history document and lays it out in one stateless pass.
pub fn layout_history_json(text: &str, config: &RenderConfig) -> Result<RenderOutput> {
    let history: CommitHistory = serde_json::from_str(text)?;
    layout_history(&history, config)
}
