use serde::{Deserialize, Serialize};

/// The four diagnostic metrics computed for one symbol at one point in time.
///
/// Created fresh for every analysis and never stored. Serializes to a JSON object
/// with exactly the keys `sharpe`, `beta`, `piotroski` and `altman`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub sharpe: f64,
    pub beta: f64,
    pub piotroski: u8,
    pub altman: f64,
}
