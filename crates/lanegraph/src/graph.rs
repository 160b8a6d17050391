//! Edge routing for an annotated history window.
//!
//! Rows are walked once in order. Every `commit -> child` edge becomes one connector whose
//! shape depends on how the child relates to the commit (same column, branch-out, or one of the
//! two sides of a merge). Commits still owed parent edges when the walk ends get a trailing
//! connector running down past the last row, marking history that is not loaded yet.

use crate::config::{
    EDGE_STROKE_WIDTH, POINT_BORDER_COLOR, POINT_BORDER_WIDTH, RenderConfig, SkipPolicy,
};
use crate::model::{Commit, CommitHistory, PathPrimitive, PointPrimitive, RenderOutput};
use crate::path::PathData;
use crate::timing::{Phase, PhaseClock};
use crate::{Error, Result};
use rustc_hash::{FxHashMap, FxHashSet};

/// Column center: `(col + 1) * column_width`.
pub fn pos_x(col: usize, config: &RenderConfig) -> f64 {
    (col as f64 + 1.0) * config.column_width
}

/// Row center: `(row + 0.5) * row_height`.
pub fn pos_y(row: usize, config: &RenderConfig) -> f64 {
    (row as f64 + 0.5) * config.row_height
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EdgeKind {
    SameColumn,
    BranchOut,
    MergeBase,
    MergeIn,
}

fn classify(commit: &Commit, child: &Commit, base_of_merge: bool) -> EdgeKind {
    if child.col == commit.col {
        EdgeKind::SameColumn
    } else if child.parent_ids.len() == 1 {
        EdgeKind::BranchOut
    } else if base_of_merge {
        EdgeKind::MergeBase
    } else {
        EdgeKind::MergeIn
    }
}

/// Commit id -> row, built once per render. Also rejects records the walk cannot draw.
fn index_rows(history: &CommitHistory) -> Result<FxHashMap<&str, usize>> {
    let mut rows: FxHashMap<&str, usize> = FxHashMap::default();
    rows.reserve(history.commits.len());
    for (row, commit) in history.commits.iter().enumerate() {
        if commit.id.is_empty() {
            return Err(Error::InvalidModel {
                message: format!("commit at row {row} has an empty id"),
            });
        }
        if history.lane_of(commit).is_none() {
            return Err(Error::InvalidModel {
                message: format!(
                    "commit {} references lane {} but only {} lanes exist",
                    commit.id,
                    commit.lane,
                    history.lanes.len()
                ),
            });
        }
        if rows.insert(commit.id.as_str(), row).is_some() {
            return Err(Error::InvalidModel {
                message: format!("duplicate commit id: {}", commit.id),
            });
        }
    }
    Ok(rows)
}

fn lane_color<'a>(history: &'a CommitHistory, commit: &Commit) -> &'a str {
    // Lane indices are checked by `index_rows`.
    history
        .lane_of(commit)
        .map(|lane| lane.color.as_str())
        .unwrap_or_default()
}

struct Walk<'a> {
    /// One edge batch per row, in row order.
    batches: Vec<Vec<PathPrimitive>>,
    points: Vec<PointPrimitive>,
    /// Commit id -> parent edges still owed.
    pending: FxHashMap<&'a str, usize>,
    max_col: usize,
}

fn edge_path(
    history: &CommitHistory,
    config: &RenderConfig,
    (commit, row): (&Commit, usize),
    (child, child_row): (&Commit, usize),
    base_of_merge: bool,
) -> PathPrimitive {
    let x = pos_x(commit.col, config);
    let y = pos_y(row, config);
    let child_x = pos_x(child.col, config);
    let child_y = pos_y(child_row, config);
    let half_row = config.row_height / 2.0;

    let kind = classify(commit, child, base_of_merge);
    tracing::trace!(parent = %commit.id, child = %child.id, ?kind, "route edge");

    let (d, stroke) = match kind {
        EdgeKind::SameColumn => (
            PathData::new().move_to(x, y).line_to(child_x, child_y),
            lane_color(history, child),
        ),
        EdgeKind::BranchOut | EdgeKind::MergeBase => (
            PathData::new()
                .move_to(x, y)
                .line_to(child_x, y - half_row)
                .line_to(child_x, child_y),
            lane_color(history, child),
        ),
        EdgeKind::MergeIn => (
            PathData::new()
                .move_to(x, y)
                .line_to(x, child_y + half_row)
                .line_to(child_x, child_y),
            lane_color(history, commit),
        ),
    };

    PathPrimitive {
        key: format!("p_{}_{}", commit.id, child.id),
        d: d.value(),
        stroke: stroke.to_string(),
        stroke_width: EDGE_STROKE_WIDTH,
    }
}

fn walk<'a>(
    history: &'a CommitHistory,
    config: &RenderConfig,
    rows: &FxHashMap<&str, usize>,
) -> Result<Walk<'a>> {
    let mut out = Walk {
        batches: Vec::with_capacity(history.commits.len()),
        points: Vec::with_capacity(history.commits.len()),
        pending: FxHashMap::default(),
        max_col: 0,
    };

    for (row, commit) in history.commits.iter().enumerate() {
        if !commit.is_root() {
            out.pending
                .insert(commit.id.as_str(), commit.parent_ids.len());
        }
        out.max_col = out.max_col.max(commit.col);

        let mut batch = Vec::with_capacity(commit.children.len());
        for child_id in &commit.children {
            // Parent edges the child was still owed before this one.
            let owed_before = out.pending.get(child_id.as_str()).copied();
            let resolved = match out.pending.get_mut(child_id.as_str()) {
                Some(remaining) => {
                    *remaining = remaining.saturating_sub(1);
                    *remaining == 0
                }
                None => false,
            };
            if resolved {
                out.pending.remove(child_id.as_str());
            }

            let Some(&child_row) = rows.get(child_id.as_str()) else {
                if config.strict_topology {
                    return Err(Error::UnresolvedChild {
                        parent: commit.id.clone(),
                        child: child_id.clone(),
                    });
                }
                tracing::warn!(
                    parent = %commit.id,
                    child = %child_id,
                    "skipping edge to child outside the history window"
                );
                continue;
            };
            let child = &history.commits[child_row];
            // The first parent to draw an edge into the child is its merge base. A child that is
            // not pending (drawn below this row) falls back to parent-list order.
            let base_of_merge = match owed_before {
                Some(owed) => owed == child.parent_ids.len(),
                None => commit.is_base_of_merge(child),
            };
            batch.push(edge_path(
                history,
                config,
                (commit, row),
                (child, child_row),
                base_of_merge,
            ));
        }
        out.batches.push(batch);

        out.points.push(PointPrimitive {
            key: format!("c_{}", commit.id),
            cx: pos_x(commit.col, config),
            cy: pos_y(row, config),
            r: config.circle_radius,
            fill: lane_color(history, commit).to_string(),
            stroke: POINT_BORDER_COLOR.to_string(),
            stroke_width: POINT_BORDER_WIDTH,
        });
    }

    Ok(out)
}

/// Trailing connectors from the virtual row past the end of the window up to every commit
/// that is still owed parent edges, ordered by row.
fn resolve_pending(
    history: &CommitHistory,
    config: &RenderConfig,
    rows: &FxHashMap<&str, usize>,
    pending: &FxHashMap<&str, usize>,
) -> Vec<PathPrimitive> {
    let mut orphan_rows: Vec<usize> = pending
        .keys()
        .filter_map(|id| rows.get(id).copied())
        .collect();
    orphan_rows.sort_unstable();

    let bottom = pos_y(history.commits.len(), config);
    orphan_rows
        .into_iter()
        .map(|row| {
            let commit = &history.commits[row];
            let x = pos_x(commit.col, config);
            PathPrimitive {
                key: format!("future_{}", commit.id),
                d: PathData::new()
                    .move_to(x, bottom)
                    .line_to(x, pos_y(row, config))
                    .value(),
                stroke: lane_color(history, commit).to_string(),
                stroke_width: EDGE_STROKE_WIDTH,
            }
        })
        .collect()
}

/// Lays out one history window. Stateless: no render-skip cache is involved.
pub fn layout_history(history: &CommitHistory, config: &RenderConfig) -> Result<RenderOutput> {
    let mut clock = PhaseClock::from_env();

    clock.time(Phase::Validate, || config.validate())?;
    let rows = clock.time(Phase::Index, || index_rows(history))?;
    let walked = clock.time(Phase::Walk, || walk(history, config, &rows))?;
    let pending_count = walked.pending.len();
    let paths = clock.time(Phase::Resolve, || {
        let future = resolve_pending(history, config, &rows, &walked.pending);
        // Later rows paint first; pending connectors go last.
        let mut paths: Vec<PathPrimitive> =
            walked.batches.into_iter().rev().flatten().collect();
        paths.extend(future);
        paths
    });

    let output = RenderOutput {
        width: config.column_width * (walked.max_col as f64 + 2.0),
        height: config.row_height * history.commits.len() as f64,
        paths,
        points: walked.points,
    };

    tracing::debug!(
        commits = history.commits.len(),
        paths = output.paths.len(),
        pending = pending_count,
        width = output.width,
        height = output.height,
        "laid out history window"
    );

    clock.finish(history.commits.len(), output.paths.len());

    Ok(output)
}

/// Stateful renderer that skips recomputation when the input looks unchanged.
///
/// With [`SkipPolicy::CommitCount`] "unchanged" means "same number of commits as the last
/// successful render". This is an approximation; call [`GraphRenderer::invalidate`] (or use
/// [`SkipPolicy::Never`]) when the content can change at constant length.
pub struct GraphRenderer {
    config: RenderConfig,
    cached_count: Option<usize>,
    last_output: Option<RenderOutput>,
    on_width_change: Option<Box<dyn FnMut(f64)>>,
}

impl std::fmt::Debug for GraphRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphRenderer")
            .field("config", &self.config)
            .field("cached_count", &self.cached_count)
            .field("has_output", &self.last_output.is_some())
            .field("has_width_callback", &self.on_width_change.is_some())
            .finish()
    }
}

impl GraphRenderer {
    pub fn new(config: RenderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            cached_count: None,
            last_output: None,
            on_width_change: None,
        })
    }

    /// Registers a callback invoked with the canvas width after every render that is not
    /// skipped.
    pub fn on_width_change(mut self, callback: impl FnMut(f64) + 'static) -> Self {
        self.on_width_change = Some(Box::new(callback));
        self
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn last_output(&self) -> Option<&RenderOutput> {
        self.last_output.as_ref()
    }

    /// Forgets the cached commit count so the next render always recomputes.
    pub fn invalidate(&mut self) {
        self.cached_count = None;
    }

    fn should_skip(&self, commit_count: usize) -> bool {
        match self.config.skip_policy {
            SkipPolicy::CommitCount => self.cached_count == Some(commit_count),
            SkipPolicy::Never => false,
        }
    }

    /// Renders `history`, or returns `Ok(None)` when the skip heuristic decides the previous
    /// output (see [`GraphRenderer::last_output`]) is still current.
    ///
    /// The count cache is only updated after a successful render, so a failing input is
    /// reported again on the next call instead of being skipped.
    pub fn render(&mut self, history: &CommitHistory) -> Result<Option<&RenderOutput>> {
        let commit_count = history.commits.len();
        if self.should_skip(commit_count) {
            tracing::debug!(commits = commit_count, "commit count unchanged; skipping render");
            return Ok(None);
        }

        let output = layout_history(history, &self.config)?;
        self.cached_count = Some(commit_count);
        if let Some(callback) = self.on_width_change.as_mut() {
            callback(output.width);
        }
        self.last_output = Some(output);
        Ok(self.last_output.as_ref())
    }
}

/// Ids reachable as children from the window that are not rows of it.
///
/// Useful for diagnosing [`Error::UnresolvedChild`] before rendering in strict mode.
pub fn unresolved_children(history: &CommitHistory) -> Vec<(&str, &str)> {
    let ids: FxHashSet<&str> = history.commits.iter().map(|c| c.id.as_str()).collect();
    history
        .commits
        .iter()
        .flat_map(|c| {
            c.children
                .iter()
                .filter(|child| !ids.contains(child.as_str()))
                .map(move |child| (c.id.as_str(), child.as_str()))
        })
        .collect()
}
