//! The interface search runs against.

use flanker_core::actions::Action;
use flanker_core::constants::{SCORE_ACTIVE, SCORE_PINNED, SCORE_SUPPRESSED, WIN_SCORE};
use flanker_core::enums::{Faction, UnitStatus};
use flanker_core::errors::StoreError;

/// A game state as seen by search.
///
/// Branch functions never mutate `self`; each branch is an independent
/// copy. Branches for actions the rules reject are simply absent.
pub trait RepresentationState: Sized + Send + Sync {
    type Action: Clone + std::fmt::Debug + Send + Sync;

    fn copy(&self) -> Result<Self, StoreError>;

    /// Candidate actions for the faction holding initiative. May draw on
    /// the representation's own RNG.
    fn get_actions(&mut self) -> Result<Vec<Self::Action>, StoreError>;

    /// Every outcome of `action` with its probability. Empty when the
    /// action is not available.
    fn get_branches(&self, action: &Self::Action) -> Result<Vec<(f64, Self)>, StoreError>;

    /// The single most likely outcome of `action`, or `None` when the
    /// action is not available.
    fn get_deterministic_branch(&self, action: &Self::Action) -> Result<Option<Self>, StoreError>;

    fn get_score(&self, maximizing_faction: Faction) -> Result<f64, StoreError>;

    fn get_winner(&self) -> Result<Option<Faction>, StoreError>;

    fn get_initiative(&self) -> Result<Faction, StoreError>;

    /// Translate an action of this representation into a concrete action
    /// against the real world.
    fn deabstract(&self, action: &Self::Action) -> Action;
}

/// Heuristic worth of one unit in the given state.
pub fn status_value(status: UnitStatus) -> f64 {
    match status {
        UnitStatus::Active => SCORE_ACTIVE,
        UnitStatus::Pinned => SCORE_PINNED,
        UnitStatus::Suppressed => SCORE_SUPPRESSED,
    }
}

/// Linear status score, or the terminal score once a winner exists.
pub fn score_units(
    winner: Option<Faction>,
    units: impl IntoIterator<Item = (Faction, UnitStatus)>,
    maximizing_faction: Faction,
) -> f64 {
    if let Some(winner) = winner {
        return if winner == maximizing_faction {
            WIN_SCORE
        } else {
            -WIN_SCORE
        };
    }
    units
        .into_iter()
        .map(|(faction, status)| {
            let value = status_value(status);
            if faction == maximizing_faction {
                value
            } else {
                -value
            }
        })
        .sum()
}
