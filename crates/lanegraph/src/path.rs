use std::fmt::Write as _;

/// Accumulates absolute `M`/`L` commands for a single connector.
///
/// Builder methods consume and return the value, so a half-built path never escapes the
/// expression that builds it:
///
/// ```
/// use lanegraph::PathData;
///
/// let d = PathData::new().move_to(16.0, 12.0).line_to(16.0, 36.0).value();
/// assert_eq!(d, "M16,12L16,36");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[must_use]
pub struct PathData {
    data: String,
}

impl PathData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(self, x: f64, y: f64) -> Self {
        self.command('M', x, y)
    }

    pub fn line_to(self, x: f64, y: f64) -> Self {
        self.command('L', x, y)
    }

    pub fn value(self) -> String {
        self.data
    }

    fn command(mut self, op: char, x: f64, y: f64) -> Self {
        self.data.push(op);
        fmt_into(&mut self.data, x);
        self.data.push(',');
        fmt_into(&mut self.data, y);
        self
    }
}

pub(crate) fn fmt(v: f64) -> String {
    let mut out = String::new();
    fmt_into(&mut out, v);
    out
}

/// Grid coordinates are snapped to thousandths of a pixel before printing, so products of
/// fractional sizes never leak float noise (`0.1 * 3` prints `0.3`) and `-0` prints `0`.
pub(crate) fn fmt_into(out: &mut String, v: f64) {
    const SCALE: f64 = 1000.0;

    if !v.is_finite() {
        out.push('0');
        return;
    }
    let snapped = (v * SCALE).round() / SCALE;
    if snapped == 0.0 {
        out.push('0');
    } else {
        let _ = write!(out, "{snapped}");
    }
}
