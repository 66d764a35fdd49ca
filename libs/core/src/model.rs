//! Data model: classification keys and zone-indexed count trees.

use std::collections::BTreeMap;
use std::fmt;

/// Operating platform of a reservation or instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Platform {
    Linux,
    Windows,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Windows => "windows",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Network locality of a reservation or instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NetworkLocality {
    Classic,
    Vpc,
}

impl NetworkLocality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::Vpc => "vpc",
        }
    }

    /// Label the provider's modify call expects for this locality.
    pub fn provider_label(&self) -> &'static str {
        match self {
            Self::Classic => "EC2-Classic",
            Self::Vpc => "EC2-VPC",
        }
    }
}

impl fmt::Display for NetworkLocality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fungibility bucket: reservations and running instances are
/// commensurable only within the same key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassificationKey {
    pub platform: Platform,
    pub locality: NetworkLocality,
    pub shape: String,
}

impl ClassificationKey {
    pub fn new(platform: Platform, locality: NetworkLocality, shape: impl Into<String>) -> Self {
        Self {
            platform,
            locality,
            shape: shape.into(),
        }
    }
}

impl fmt::Display for ClassificationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.platform, self.locality, self.shape)
    }
}

/// Zone-id → count. `BTreeMap` so zones are always visited in lexicographic
/// order, which makes the greedy planner's tie-breaking deterministic.
pub type ZoneCounts = BTreeMap<String, u64>;

/// Per-key zone-level counts. One representation, three meanings that must
/// not be conflated: current reservation distribution, running-instance
/// distribution, and desired reservation distribution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneDistribution(BTreeMap<ClassificationKey, ZoneCounts>);

impl ZoneDistribution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add to the count for a (key, zone) leaf, creating it as needed.
    pub fn add(&mut self, key: ClassificationKey, zone: impl Into<String>, count: u64) {
        *self
            .0
            .entry(key)
            .or_default()
            .entry(zone.into())
            .or_insert(0) += count;
    }

    /// Replace the whole zone-mapping for a key.
    pub fn insert(&mut self, key: ClassificationKey, zones: ZoneCounts) {
        self.0.insert(key, zones);
    }

    pub fn get(&self, key: &ClassificationKey) -> Option<&ZoneCounts> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &ClassificationKey) -> Option<ZoneCounts> {
        self.0.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ClassificationKey, &ZoneCounts)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &ClassificationKey> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Zone-agnostic reserved capacity per key, used as a consumable budget
/// during planning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReservationPool(BTreeMap<ClassificationKey, u64>);

impl ReservationPool {
    /// Collapse a reservation distribution by summing zone counts per key.
    pub fn from_distribution(reservations: &ZoneDistribution) -> Self {
        Self(
            reservations
                .iter()
                .map(|(key, zones)| (key.clone(), zones.values().sum()))
                .collect(),
        )
    }

    pub fn get(&self, key: &ClassificationKey) -> Option<u64> {
        self.0.get(key).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn from_entries(entries: Vec<(ClassificationKey, u64)>) -> Self {
        Self(entries.into_iter().collect())
    }
}

/// The pruned subset of a desired distribution: only branches whose zone
/// layout differs from the current reservation state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeTree(ZoneDistribution);

impl ChangeTree {
    pub fn new(distribution: ZoneDistribution) -> Self {
        Self(distribution)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ClassificationKey, &ZoneCounts)> {
        self.0.iter()
    }

    pub fn get(&self, key: &ClassificationKey) -> Option<&ZoneCounts> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
