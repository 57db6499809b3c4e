//! Tunable thresholds and constants shared by the validator and the engine.

/// Width and depth of the four directional sampling rectangles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SampleSize {
    pub width: u32,
    pub depth: u32,
}

impl SampleSize {
    pub const fn new(width: u32, depth: u32) -> Self {
        Self { width, depth }
    }
}

/// Game configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GameConfig {
    /// Personality threshold "mid" applied to every trait.
    pub mid: f64,
    /// Personality threshold "high" applied to every trait.
    pub high: f64,
    /// Path length to the exit under which a winner enters its final phase.
    pub dist_approach: u32,
    /// Length of the visited-cells trail kept per robot.
    pub max_passed_cells: usize,
    /// Number of turn-coordinate sequences kept per robot.
    pub max_sequence_memory: usize,
    /// Sample sizes for low, mid and high intelligence.
    pub sample_low: SampleSize,
    pub sample_mid: SampleSize,
    pub sample_high: SampleSize,
    /// Manhattan distance up to which path search is exhaustive.
    pub short_path_limit: u32,
    /// Stride of a stepping cell in the long sampled search.
    pub long_path_stride: u32,
    /// Candidate stepping cells kept per axis in the long sampled search.
    pub long_path_candidates: usize,
    /// Iteration cap of the long sampled search.
    pub long_path_max_iterations: usize,
    /// Highest attack probability accepted by a risky move (risk level 1).
    pub risky_move_ceiling: f64,
    /// Longest grenade range a robot can reach through bonuses.
    pub max_grenade_range: u32,
}

impl GameConfig {
    pub const DEFAULT_MID: f64 = 0.5;
    pub const DEFAULT_HIGH: f64 = 0.7;
    pub const DEFAULT_DIST_APPROACH: u32 = 5;
    pub const DEFAULT_MAX_PASSED_CELLS: usize = 10;
    pub const DEFAULT_MAX_SEQUENCE_MEMORY: usize = 4;

    pub fn new() -> Self {
        Self {
            mid: Self::DEFAULT_MID,
            high: Self::DEFAULT_HIGH,
            dist_approach: Self::DEFAULT_DIST_APPROACH,
            max_passed_cells: Self::DEFAULT_MAX_PASSED_CELLS,
            max_sequence_memory: Self::DEFAULT_MAX_SEQUENCE_MEMORY,
            sample_low: SampleSize::new(3, 5),
            sample_mid: SampleSize::new(5, 7),
            sample_high: SampleSize::new(7, 9),
            short_path_limit: 4,
            long_path_stride: 4,
            long_path_candidates: 3,
            long_path_max_iterations: 64,
            risky_move_ceiling: 0.55,
            max_grenade_range: 5,
        }
    }

    pub fn with_thresholds(mut self, mid: f64, high: f64) -> Self {
        self.mid = mid;
        self.high = high;
        self
    }

    pub fn with_dist_approach(mut self, dist_approach: u32) -> Self {
        self.dist_approach = dist_approach;
        self
    }

    #[inline]
    pub fn is_mid(&self, value: f64) -> bool {
        value >= self.mid
    }

    #[inline]
    pub fn is_high(&self, value: f64) -> bool {
        value >= self.high
    }

    /// Sample size matching an intelligence scalar.
    pub fn sample_size(&self, intelligence: f64) -> SampleSize {
        if self.is_high(intelligence) {
            self.sample_high
        } else if self.is_mid(intelligence) {
            self.sample_mid
        } else {
            self.sample_low
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}
