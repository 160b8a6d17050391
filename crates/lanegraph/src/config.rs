use crate::{Error, Result};
use serde::{Deserialize, Serialize};

pub const EDGE_STROKE_WIDTH: f64 = 2.0;
pub const POINT_BORDER_WIDTH: f64 = 1.0;
pub const POINT_BORDER_COLOR: &str = "#fff";

const DEFAULT_CIRCLE_RADIUS: f64 = 4.0;
const DEFAULT_COLUMN_WIDTH: f64 = 16.0;
const DEFAULT_ROW_HEIGHT: f64 = 24.0;

/// When [`crate::GraphRenderer::render`] may reuse its previous output.
///
/// `CommitCount` treats two inputs with the same number of commits as unchanged. That is a
/// coarse approximation: distinct histories of equal length are not re-rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SkipPolicy {
    #[default]
    CommitCount,
    Never,
}

/// Geometry and behavior knobs for one renderer.
///
/// The three sizes are required when deserializing; [`RenderConfig::default`] is only a
/// starting point for callers that build the config in code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderConfig {
    pub circle_radius: f64,
    pub column_width: f64,
    pub row_height: f64,
    #[serde(default)]
    pub skip_policy: SkipPolicy,
    /// Fail on child references that are not part of the history window. When false those
    /// edges are skipped with a warning.
    #[serde(default = "default_strict_topology")]
    pub strict_topology: bool,
}

fn default_strict_topology() -> bool {
    true
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            circle_radius: DEFAULT_CIRCLE_RADIUS,
            column_width: DEFAULT_COLUMN_WIDTH,
            row_height: DEFAULT_ROW_HEIGHT,
            skip_policy: SkipPolicy::default(),
            strict_topology: default_strict_topology(),
        }
    }
}

fn cfg_get<'a>(cfg: &'a serde_json::Value, path: &[&str]) -> Option<&'a serde_json::Value> {
    let mut cur = cfg;
    for k in path {
        cur = cur.get(*k)?;
    }
    Some(cur)
}

fn required_f64(cfg: &serde_json::Value, path: &[&str], field: &'static str) -> Result<f64> {
    let Some(value) = cfg_get(cfg, path) else {
        return Err(Error::InvalidConfig {
            field,
            message: format!("is required (missing {})", path.join(".")),
        });
    };
    value.as_f64().ok_or_else(|| Error::InvalidConfig {
        field,
        message: format!("must be a number (got {value})"),
    })
}

impl RenderConfig {
    pub fn new(circle_radius: f64, column_width: f64, row_height: f64) -> Self {
        Self {
            circle_radius,
            column_width,
            row_height,
            ..Self::default()
        }
    }

    pub fn with_skip_policy(mut self, skip_policy: SkipPolicy) -> Self {
        self.skip_policy = skip_policy;
        self
    }

    pub fn with_strict_topology(mut self, strict: bool) -> Self {
        self.strict_topology = strict;
        self
    }

    /// Reads the `graph` section of an effective-config object.
    ///
    /// `circleRadius`, `columnWidth` and `rowHeight` are required numbers; `skipPolicy` and
    /// `strictTopology` are optional. The result is validated before it is returned.
    pub fn from_json(cfg: &serde_json::Value) -> Result<Self> {
        let skip_policy = match cfg_get(cfg, &["graph", "skipPolicy"]) {
            None => SkipPolicy::default(),
            Some(v) => match v.as_str() {
                Some("commitCount") => SkipPolicy::CommitCount,
                Some("never") => SkipPolicy::Never,
                _ => {
                    return Err(Error::InvalidConfig {
                        field: "skip_policy",
                        message: format!("must be \"commitCount\" or \"never\" (got {v})"),
                    });
                }
            },
        };
        let strict_topology = match cfg_get(cfg, &["graph", "strictTopology"]) {
            None => default_strict_topology(),
            Some(v) => v.as_bool().ok_or_else(|| Error::InvalidConfig {
                field: "strict_topology",
                message: format!("must be a boolean (got {v})"),
            })?,
        };

        let config = Self {
            circle_radius: required_f64(cfg, &["graph", "circleRadius"], "circle_radius")?,
            column_width: required_f64(cfg, &["graph", "columnWidth"], "column_width")?,
            row_height: required_f64(cfg, &["graph", "rowHeight"], "row_height")?,
            skip_policy,
            strict_topology,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("circle_radius", self.circle_radius),
            ("column_width", self.column_width),
            ("row_height", self.row_height),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::InvalidConfig {
                    field,
                    message: format!("must be a finite positive number (got {value})"),
                });
            }
        }
        Ok(())
    }
}
