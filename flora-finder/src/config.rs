use crate::geometry::EdgePolicy;

/// What the index builder does with a record it cannot ingest.
///
/// Applies to malformed geometry and to attributes that fail typed
/// conversion. Records of the wrong geometry kind are always skipped and are
/// not governed by this policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedPolicy {
    /// Abort the whole build with the record's error.
    #[default]
    Abort,
    /// Drop the record, log it and keep going.
    Skip,
}

/// Build and query settings for a polygon index.
///
/// Settings are not stored in snapshots; pass the same configuration when
/// restoring if query behaviour must match.
///
/// # Examples
///
/// ```rust
/// use flora_finder::{EdgePolicy, LookupConfig, MalformedPolicy};
///
/// let config = LookupConfig::builder()
///     .edge_policy(EdgePolicy::Exclusive)
///     .malformed_policy(MalformedPolicy::Skip)
///     .build();
/// assert_eq!(config.edge_policy(), EdgePolicy::Exclusive);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupConfig {
    edge_policy: EdgePolicy,
    malformed_policy: MalformedPolicy,
}

impl LookupConfig {
    /// Default configuration: boundary-inclusive containment, abort on
    /// malformed records.
    #[inline]
    pub fn new() -> LookupConfig {
        LookupConfig::default()
    }

    #[inline]
    pub fn builder() -> LookupConfigBuilder {
        LookupConfigBuilder::new()
    }

    #[inline]
    pub fn edge_policy(&self) -> EdgePolicy {
        self.edge_policy
    }

    #[inline]
    pub fn malformed_policy(&self) -> MalformedPolicy {
        self.malformed_policy
    }
}

/// Fluent builder for [`LookupConfig`].
#[derive(Debug, Default)]
pub struct LookupConfigBuilder {
    config: LookupConfig,
}

impl LookupConfigBuilder {
    #[inline]
    pub fn new() -> LookupConfigBuilder {
        LookupConfigBuilder::default()
    }

    /// Sets how points lying exactly on a ring are classified.
    pub fn edge_policy(mut self, policy: EdgePolicy) -> Self {
        self.config.edge_policy = policy;
        self
    }

    /// Sets how malformed source records are handled during a build.
    pub fn malformed_policy(mut self, policy: MalformedPolicy) -> Self {
        self.config.malformed_policy = policy;
        self
    }

    /// Preset for bulk ingestion of real-world layers: skip bad records.
    pub fn lenient_preset(self) -> Self {
        self.malformed_policy(MalformedPolicy::Skip)
    }

    pub fn build(self) -> LookupConfig {
        self.config
    }
}
