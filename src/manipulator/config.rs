//! Configuration of a [TreeManipulator](crate::manipulator::TreeManipulator).

use crate::graph::{ConstructionPolicy, DEFAULT_REDUCE_THRESHOLD};

/// Settings used when building the graph of a
/// [TreeManipulator](crate::manipulator::TreeManipulator).
///
/// # Configuration
/// * [`with_policy(policy)`](Self::with_policy)
///     - How polytomies are represented, see [ConstructionPolicy]
///       (default: [ConstructionPolicy::Mimic]).
/// * [`with_reduce_threshold(threshold)`](Self::with_reduce_threshold)
///     - Branch length at or below which [ConstructionPolicy::Reduce]
///       absorbs subtrees (default: [DEFAULT_REDUCE_THRESHOLD]).
///
/// # Example
/// ```
/// use reroot::graph::ConstructionPolicy;
/// use reroot::manipulator::ManipulatorConfig;
///
/// let config = ManipulatorConfig::default()
///     .with_policy(ConstructionPolicy::Reduce)
///     .with_reduce_threshold(1e-6);
/// assert_eq!(config.policy(), ConstructionPolicy::Reduce);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManipulatorConfig {
    policy: ConstructionPolicy,
    reduce_threshold: f64,
}

impl Default for ManipulatorConfig {
    fn default() -> Self {
        ManipulatorConfig {
            policy: ConstructionPolicy::default(),
            reduce_threshold: DEFAULT_REDUCE_THRESHOLD,
        }
    }
}

impl ManipulatorConfig {
    /// Creates a configuration with the given policy and default threshold.
    pub fn new(policy: ConstructionPolicy) -> Self {
        Self::default().with_policy(policy)
    }

    /// Sets the construction policy.
    pub fn with_policy(mut self, policy: ConstructionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the threshold used by [ConstructionPolicy::Reduce].
    ///
    /// # Panics
    /// Panics if `threshold` is negative or not finite.
    pub fn with_reduce_threshold(mut self, threshold: f64) -> Self {
        assert!(
            threshold >= 0.0 && threshold.is_finite(),
            "Reduce threshold must be non-negative and finite, got {threshold}"
        );
        self.reduce_threshold = threshold;
        self
    }

    /// Returns the construction policy.
    pub fn policy(&self) -> ConstructionPolicy {
        self.policy
    }

    /// Returns the threshold used by [ConstructionPolicy::Reduce].
    pub fn reduce_threshold(&self) -> f64 {
        self.reduce_threshold
    }
}
