//! Classification of a teardown attempt.
//!
//! A first run has nothing to remove, and that must not count as a failure.

/// Stderr fragments (lowercased) the runtime prints when there is nothing to remove.
const NOTHING_TO_REMOVE_MARKERS: &[&str] = &[
    "no such",
    "not found",
    "no resource found",
    "no configuration file",
];

/// What a teardown attempt amounted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TeardownOutcome {
    /// The runtime reported success.
    Removed,
    /// The runtime failed only because nothing was running.
    NothingToRemove,
    /// Any other failure; carries the runtime's stderr.
    Failed(String),
}

/// Classify a teardown by exit status and stderr.
#[must_use]
pub fn classify_teardown(success: bool, stderr: &str) -> TeardownOutcome {
    if success {
        return TeardownOutcome::Removed;
    }
    let lowered = stderr.to_lowercase();
    if NOTHING_TO_REMOVE_MARKERS.iter().any(|m| lowered.contains(m)) {
        TeardownOutcome::NothingToRemove
    } else {
        TeardownOutcome::Failed(stderr.trim().to_string())
    }
}
