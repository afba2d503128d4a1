/// What to do when partitioning a node along its split plane puts all of
/// its primitives on one side.
///
/// This cannot happen with exact arithmetic (the mean lies strictly between
/// the smallest and the largest centroid), but rounding of the mean can make
/// it happen for centroids that are very close to each other.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EmptySplitFallback {
    /// Split the primitives into two halves by count, ignoring their
    /// positions.
    #[default]
    HalveByCount,

    /// Abort the build with [`crate::BuildError::DegenerateSplit`].
    Fail,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BvhConfig {
    pub empty_split: EmptySplitFallback,

    /// Whether to check the tree's invariants after each build; enabled by
    /// default in debug builds.
    pub validate: bool,
}

impl Default for BvhConfig {
    fn default() -> Self {
        Self {
            empty_split: Default::default(),
            validate: cfg!(debug_assertions),
        }
    }
}
