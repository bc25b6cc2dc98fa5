//! Rules constants and tuning parameters.

// --- Geometry ---

/// Cross products at or below this magnitude are treated as parallel.
pub const INTERSECT_EPSILON: f64 = 1e-9;

/// Rotation (radians) applied to the point-in-polygon probe ray.
pub const PROBE_ROTATION: f64 = 1e-6;

/// Reach of visibility rays.
pub const LOS_RADIUS: f64 = 1000.0;

/// Perpendicular offset of the paired rays cast at each obstacle vertex.
pub const LOS_JITTER: f64 = 1e-6;

/// Ray hits closer than this to the aimed vertex snap onto it.
pub const LOS_SNAP_DISTANCE: f64 = 1e-3;

/// Colinearity tolerance when merging visibility polygon points.
pub const LOS_COLINEAR_EPSILON: f64 = 1e-9;

// --- Movement ---

/// Length of one movement subdivision step.
pub const MOVE_STEP: f64 = 1.0;

/// Longest straight move a unit may attempt in one action.
pub const MAX_MOVE_DISTANCE: f64 = 1000.0;

// --- Fire ---

/// Fire outcome distribution. Must sum to 1.
pub const FIRE_MISS_PROBABILITY: f64 = 0.30;
pub const FIRE_PIN_PROBABILITY: f64 = 0.40;
pub const FIRE_SUPPRESS_PROBABILITY: f64 = 0.25;
pub const FIRE_KILL_PROBABILITY: f64 = 0.05;

// --- Assault ---

/// Melee rolls below the threshold for the target's status succeed.
pub const ASSAULT_THRESHOLD_ACTIVE: f64 = 0.5;
pub const ASSAULT_THRESHOLD_PINNED: f64 = 0.7;
pub const ASSAULT_THRESHOLD_SUPPRESSED: f64 = 0.95;

// --- Scoring ---

/// Score of a decided game, from the winner's point of view.
pub const WIN_SCORE: f64 = 10_000.0;

pub const SCORE_ACTIVE: f64 = 3.0;
pub const SCORE_PINNED: f64 = 2.0;
pub const SCORE_SUPPRESSED: f64 = 1.0;

// --- AI ---

/// Safety cap on actions an agent may apply in one initiative.
pub const MAX_ACTIONS_PER_INITIATIVE: usize = 20;

/// Default search depth for tree-search agents.
pub const DEFAULT_SEARCH_DEPTH: u32 = 4;

/// Random move samples per unit in the unabstracted representation.
pub const UNABSTRACTED_RANDOM_MOVES: usize = 5;

/// Half-extent of the random move offset box.
pub const UNABSTRACTED_MOVE_RANGE: i32 = 50;

/// Destinations sampled per unit in the waypoint representation.
pub const WAYPOINT_MOVE_SAMPLES: usize = 10;

/// Default waypoint grid spacing; also the default path tolerance.
pub const DEFAULT_GRID_SPACING: f64 = 20.0;

/// Default inset of the first grid row/column from the boundary.
pub const DEFAULT_GRID_OFFSET: f64 = 10.0;

/// Default RNG seed for a new world.
pub const DEFAULT_SEED: u64 = 42;

/// Probability of each fire outcome, in `FireOutcome::ALL` order.
pub const FIRE_DISTRIBUTION: [f64; 4] = [
    FIRE_MISS_PROBABILITY,
    FIRE_PIN_PROBABILITY,
    FIRE_SUPPRESS_PROBABILITY,
    FIRE_KILL_PROBABILITY,
];
