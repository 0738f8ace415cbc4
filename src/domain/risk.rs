use serde::{Deserialize, Serialize};

/// A discrete event that may delay a forecast.
///
/// Each trial draws the event independently; when it fires, `impact` periods
/// are added to that trial's completion time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskEvent {
    pub name: String,
    pub probability: f64,
    pub impact: f64,
}

impl RiskEvent {
    pub fn new(name: impl Into<String>, probability: f64, impact: f64) -> Self {
        Self {
            name: name.into(),
            probability,
            impact,
        }
    }
}
