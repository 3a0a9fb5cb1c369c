//! Running score and reason trail for a single evaluation

/// Accumulates the score and the ordered trail of fired rules while a
/// transaction moves through the scoring stages.
///
/// A rule contributes through [`ScoreTrail::apply`]: a zero delta leaves both
/// the score and the trail untouched, a nonzero delta is added and recorded
/// as `label(<signed delta>)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreTrail {
    score: i64,
    reasons: Vec<String>,
}

impl ScoreTrail {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one rule outcome.
    pub fn apply(&mut self, delta: i64, label: &str) {
        if delta != 0 {
            self.score += delta;
            self.reasons.push(format!("{label}({delta:+})"));
        }
    }

    /// Score as accumulated so far; later stages may branch on it.
    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn into_parts(self) -> (i64, Vec<String>) {
        (self.score, self.reasons)
    }
}
