use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    PointBeyondLimit,
    Run,
    Trend,
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SignalKind::PointBeyondLimit => "point beyond limit",
            SignalKind::Run => "run",
            SignalKind::Trend => "trend",
        };
        f.write_str(label)
    }
}

/// A special-cause signal covering the points `start..=end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Signal {
    pub kind: SignalKind,
    pub start: usize,
    pub end: usize,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{} at point {}", self.kind, self.start)
        } else {
            write!(f, "{} over points {}..={}", self.kind, self.start, self.end)
        }
    }
}

/// Process behavior chart of a throughput series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityVerdict {
    pub samples: usize,
    pub average: f64,
    pub moving_range_average: f64,
    pub upper_limit: f64,
    pub lower_limit: f64,
    pub signals: Vec<Signal>,
    pub score: u8,
    pub is_predictable: bool,
}

impl QualityVerdict {
    pub fn count(&self, kind: SignalKind) -> usize {
        self.signals.iter().filter(|signal| signal.kind == kind).count()
    }
}
