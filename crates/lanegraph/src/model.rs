use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lane {
    pub color: String,
}

/// A commit as handed over by the layout stage: already positioned in a column and attached to
/// a lane. Row is implied by the commit's index in [`CommitHistory::commits`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
    pub id: String,
    pub col: usize,
    /// Index into [`CommitHistory::lanes`].
    pub lane: usize,
    #[serde(default)]
    pub parent_ids: Vec<String>,
    /// Ids of child commits, in the order their edges are drawn.
    #[serde(default)]
    pub children: Vec<String>,
}

impl Commit {
    pub fn is_root(&self) -> bool {
        self.parent_ids.is_empty()
    }

    /// Whether `self` is listed first among `child`'s parents.
    ///
    /// The walk decides the merge base by draw order; this list order is only used for children
    /// that have not been reached yet when their parent is drawn.
    pub fn is_base_of_merge(&self, child: &Commit) -> bool {
        child
            .parent_ids
            .first()
            .is_some_and(|first| first.as_str() == self.id.as_str())
    }
}

/// One window of annotated history, ordered by row (newest first in the usual case).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommitHistory {
    #[serde(default)]
    pub lanes: Vec<Lane>,
    #[serde(default)]
    pub commits: Vec<Commit>,
}

impl CommitHistory {
    pub fn new(lanes: Vec<Lane>, commits: Vec<Commit>) -> Self {
        Self { lanes, commits }
    }

    pub fn len(&self) -> usize {
        self.commits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    pub fn lane_of(&self, commit: &Commit) -> Option<&Lane> {
        self.lanes.get(commit.lane)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathPrimitive {
    pub key: String,
    pub d: String,
    pub stroke: String,
    pub stroke_width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointPrimitive {
    pub key: String,
    pub cx: f64,
    pub cy: f64,
    pub r: f64,
    pub fill: String,
    pub stroke: String,
    pub stroke_width: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive<'a> {
    Path(&'a PathPrimitive),
    Point(&'a PointPrimitive),
}

impl<'a> Primitive<'a> {
    pub fn key(&self) -> &'a str {
        match self {
            Primitive::Path(p) => &p.key,
            Primitive::Point(p) => &p.key,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderOutput {
    pub width: f64,
    pub height: f64,
    /// Edge connectors: resolved edges first, then pending (`future_*`) edges.
    pub paths: Vec<PathPrimitive>,
    /// One circle per commit, in row order.
    pub points: Vec<PointPrimitive>,
}

impl RenderOutput {
    /// All primitives in paint order: connectors below, commit circles on top.
    pub fn primitives(&self) -> impl Iterator<Item = Primitive<'_>> + '_ {
        self.paths
            .iter()
            .map(Primitive::Path)
            .chain(self.points.iter().map(Primitive::Point))
    }

    pub fn path(&self, key: &str) -> Option<&PathPrimitive> {
        self.paths.iter().find(|p| p.key == key)
    }

    pub fn point(&self, key: &str) -> Option<&PointPrimitive> {
        self.points.iter().find(|p| p.key == key)
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty() && self.points.is_empty()
    }
}
