//! Depth-limited game-tree search.
//!
//! Scores are always from the point of view of `maximizing_faction`. The
//! side to move at each node is whoever holds initiative there, so one
//! faction may take several plies in a row.

use rayon::prelude::*;

use flanker_core::enums::Faction;
use flanker_core::errors::StoreError;

use crate::config::{SearchConfig, SearchPolicy};
use crate::representation::RepresentationState;

/// Result of a search from the root.
#[derive(Debug, Clone)]
pub struct SearchOutcome<A> {
    pub score: f64,
    /// `None` when the root is terminal or no action was available.
    pub action: Option<A>,
    /// Nodes visited, root included.
    pub nodes: usize,
}

pub fn search<S: RepresentationState>(
    state: &mut S,
    config: &SearchConfig,
    maximizing_faction: Faction,
) -> Result<SearchOutcome<S::Action>, StoreError> {
    let outcome = if config.parallel && config.depth > 0 {
        search_parallel(state, config, maximizing_faction)?
    } else {
        let mut nodes = 0;
        let (score, action) = match config.policy {
            SearchPolicy::Minimax => minimax(
                state,
                config.depth,
                f64::NEG_INFINITY,
                f64::INFINITY,
                maximizing_faction,
                &mut nodes,
            )?,
            SearchPolicy::Expectimax => {
                expectimax(state, config.depth, maximizing_faction, &mut nodes)?
            }
        };
        SearchOutcome {
            score,
            action,
            nodes,
        }
    };

    tracing::debug!(
        policy = ?config.policy,
        depth = config.depth,
        nodes = outcome.nodes,
        score = outcome.score,
        action = ?outcome.action,
        "search complete"
    );
    Ok(outcome)
}

/// Alpha-beta minimax over deterministic branches.
pub fn minimax<S: RepresentationState>(
    state: &mut S,
    depth: u32,
    mut alpha: f64,
    mut beta: f64,
    maximizing_faction: Faction,
    nodes: &mut usize,
) -> Result<(f64, Option<S::Action>), StoreError> {
    *nodes += 1;
    if let Some(score) = cutoff_score(state, depth, maximizing_faction)? {
        return Ok((score, None));
    }
    let actions = state.get_actions()?;
    let maximizing = state.get_initiative()? == maximizing_faction;

    let mut best = Best::new(maximizing);
    for action in actions {
        let Some(mut branch) = state.get_deterministic_branch(&action)? else {
            continue;
        };
        let (score, _) = minimax(&mut branch, depth - 1, alpha, beta, maximizing_faction, nodes)?;
        best.offer(score, action);

        if maximizing {
            alpha = alpha.max(best.score);
        } else {
            beta = beta.min(best.score);
        }
        if beta <= alpha {
            break;
        }
    }
    best.finish(state, maximizing_faction)
}

/// Expectimax over every probability-weighted branch.
pub fn expectimax<S: RepresentationState>(
    state: &mut S,
    depth: u32,
    maximizing_faction: Faction,
    nodes: &mut usize,
) -> Result<(f64, Option<S::Action>), StoreError> {
    *nodes += 1;
    if let Some(score) = cutoff_score(state, depth, maximizing_faction)? {
        return Ok((score, None));
    }
    let actions = state.get_actions()?;
    let maximizing = state.get_initiative()? == maximizing_faction;

    let mut best = Best::new(maximizing);
    for action in actions {
        let branches = state.get_branches(&action)?;
        if branches.is_empty() {
            continue;
        }
        let mut expected = 0.0;
        for (probability, mut branch) in branches {
            let (score, _) = expectimax(&mut branch, depth - 1, maximizing_faction, nodes)?;
            expected += probability * score;
        }
        best.offer(expected, action);
    }
    best.finish(state, maximizing_faction)
}

/// Root expansion on the rayon pool. Each worker owns its branch copies;
/// results are combined in action order, so the chosen action matches a
/// sequential search.
fn search_parallel<S: RepresentationState>(
    state: &mut S,
    config: &SearchConfig,
    maximizing_faction: Faction,
) -> Result<SearchOutcome<S::Action>, StoreError> {
    if let Some(score) = cutoff_score(state, config.depth, maximizing_faction)? {
        return Ok(SearchOutcome {
            score,
            action: None,
            nodes: 1,
        });
    }
    let actions = state.get_actions()?;
    let maximizing = state.get_initiative()? == maximizing_faction;
    let depth = config.depth - 1;
    let root: &S = state;

    let evaluated: Vec<Option<(f64, usize)>> = actions
        .par_iter()
        .map(|action| -> Result<Option<(f64, usize)>, StoreError> {
            let mut nodes = 0;
            let score = match config.policy {
                SearchPolicy::Minimax => {
                    let Some(mut branch) = root.get_deterministic_branch(action)? else {
                        return Ok(None);
                    };
                    minimax(
                        &mut branch,
                        depth,
                        f64::NEG_INFINITY,
                        f64::INFINITY,
                        maximizing_faction,
                        &mut nodes,
                    )?
                    .0
                }
                SearchPolicy::Expectimax => {
                    let branches = root.get_branches(action)?;
                    if branches.is_empty() {
                        return Ok(None);
                    }
                    let mut expected = 0.0;
                    for (probability, mut branch) in branches {
                        let (score, _) =
                            expectimax(&mut branch, depth, maximizing_faction, &mut nodes)?;
                        expected += probability * score;
                    }
                    expected
                }
            };
            Ok(Some((score, nodes)))
        })
        .collect::<Result<_, _>>()?;

    let mut best = Best::new(maximizing);
    let mut nodes = 1;
    for (action, result) in actions.into_iter().zip(evaluated) {
        if let Some((score, visited)) = result {
            nodes += visited;
            best.offer(score, action);
        }
    }
    let (score, action) = best.finish(state, maximizing_faction)?;
    Ok(SearchOutcome {
        score,
        action,
        nodes,
    })
}

/// Score of a node that is not expanded: decided games are worth the
/// terminal score shifted by the remaining depth, so sooner wins and
/// later losses rank higher.
fn cutoff_score<S: RepresentationState>(
    state: &S,
    depth: u32,
    maximizing_faction: Faction,
) -> Result<Option<f64>, StoreError> {
    if let Some(winner) = state.get_winner()? {
        let score = state.get_score(maximizing_faction)?;
        let shift = f64::from(depth);
        return Ok(Some(if winner == maximizing_faction {
            score + shift
        } else {
            score - shift
        }));
    }
    if depth == 0 {
        return Ok(Some(state.get_score(maximizing_faction)?));
    }
    Ok(None)
}

/// Running best child. The first strictly better score wins ties.
struct Best<A> {
    maximizing: bool,
    score: f64,
    action: Option<A>,
}

impl<A> Best<A> {
    fn new(maximizing: bool) -> Self {
        Self {
            maximizing,
            score: if maximizing {
                f64::NEG_INFINITY
            } else {
                f64::INFINITY
            },
            action: None,
        }
    }

    fn offer(&mut self, score: f64, action: A) {
        let better = if self.maximizing {
            score > self.score
        } else {
            score < self.score
        };
        if better {
            self.score = score;
            self.action = Some(action);
        }
    }

    /// A node where no action was available scores as a leaf.
    fn finish<S: RepresentationState>(
        self,
        state: &S,
        maximizing_faction: Faction,
    ) -> Result<(f64, Option<A>), StoreError> {
        match self.action {
            Some(action) => Ok((self.score, Some(action))),
            None => Ok((state.get_score(maximizing_faction)?, None)),
        }
    }
}
