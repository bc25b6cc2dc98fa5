//! Fundamental identifier and geometric types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// 2D point/vector in world space. Every position in the engine uses this.
pub type Vec2 = glam::DVec2;

/// Opaque entity identifier handed out by the state store.
///
/// Ids are allocated from a monotonic counter, so ordering by id is
/// ordering by creation.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EntityId(pub u32);

impl EntityId {
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl std::str::FromStr for EntityId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim_start_matches('#').parse().map(EntityId)
    }
}

/// Bitmask of terrain properties.
///
/// Stored as a plain integer so scene files stay readable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TerrainFlags(pub u32);

impl TerrainFlags {
    pub const NONE: Self = Self(0);
    /// Matches every feature, flagged or not.
    pub const ALL: Self = Self(u32::MAX);
    /// Blocks line of sight.
    pub const OPAQUE: Self = Self(1 << 0);
    /// Passable on foot.
    pub const WALKABLE: Self = Self(1 << 1);
    /// Passable by vehicles.
    pub const DRIVABLE: Self = Self(1 << 2);
    pub const WATER: Self = Self(1 << 3);
    /// Map edge. Never crossed by a move.
    pub const BOUNDARY: Self = Self(1 << 4);

    pub fn bits(self) -> u32 {
        self.0
    }

    /// True if any bit of `mask` is set.
    pub fn intersects(self, mask: TerrainFlags) -> bool {
        self.0 & mask.0 != 0
    }

    pub fn contains(self, mask: TerrainFlags) -> bool {
        self.0 & mask.0 == mask.0
    }
}

impl std::ops::BitOr for TerrainFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitAnd for TerrainFlags {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}
