use serde::Serialize;

/// Scalar values pulled out of the hook payload, with zero-value defaults applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatusInput {
    pub model: String,
    pub cwd: String,
    pub cost_usd: f64,
    pub duration_ms: u64,
    /// Context window usage, floored. Not clamped to 0..=100.
    pub context_pct: i64,
}
