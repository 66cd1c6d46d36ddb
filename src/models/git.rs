use serde::Serialize;

/// Branch and working-tree state for the git segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GitStatus {
    /// Checked-out branch, or `HEAD` when detached.
    pub branch: String,
    /// Uncommitted changes present in the working tree.
    pub dirty: bool,
}
