//! Solver configuration.
//!
//! Loaded in layers: built-in defaults, an optional file, then environment
//! variables prefixed with `CONNECTIONS` (nested keys separated by `__`).

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::board::MAX_BOARD_WORDS;
use crate::error::{RsaError, RsaResult};

/// Softmax rationality parameters for each reasoning level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RationalityConfig {
    /// Literal listener peakiness over similarity scores.
    pub alpha0: f64,
    /// Pragmatic speaker rationality.
    pub alpha1: f64,
    /// Pragmatic listener rationality.
    pub alpha2: f64,
}

impl Default for RationalityConfig {
    fn default() -> Self {
        Self {
            alpha0: 10.0,
            alpha1: 1.0,
            alpha2: 1.0,
        }
    }
}

/// Complete solver configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub group_size: usize,
    pub groups: usize,
    pub rationality: RationalityConfig,
    /// Pragmatic rounds beyond the literal listener.
    pub reasoning_depth: u32,
    /// Minimum mean group confidence for acceptance, in `[0, 1]`.
    pub confidence_floor: f64,
    pub max_rounds: u32,
    pub round_timeout_ms: u64,
    /// Probability cap applied to claimed words outside the listener's top group.
    pub miss_penalty_floor: f64,
    /// Hypotheses requested per oracle call.
    pub max_proposals: usize,
    /// Weight of the claimed-word centroid in an utterance's meaning vector.
    pub centroid_weight: f64,
    /// Upper bound on branch-and-bound nodes per search.
    pub search_node_limit: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            group_size: 4,
            groups: 4,
            rationality: RationalityConfig::default(),
            reasoning_depth: 1,
            confidence_floor: 0.5,
            max_rounds: 3,
            round_timeout_ms: 30_000,
            miss_penalty_floor: 1e-3,
            max_proposals: 8,
            centroid_weight: 0.0,
            search_node_limit: 1_000_000,
        }
    }
}

/// The subset of configuration the inference engine reads.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    pub group_size: usize,
    pub rationality: RationalityConfig,
    pub reasoning_depth: u32,
    pub miss_penalty_floor: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        SolverConfig::default().engine()
    }
}

/// The subset of configuration the partition search reads.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchConfig {
    pub group_size: usize,
    pub groups: usize,
    pub node_limit: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SolverConfig::default().search()
    }
}

impl SolverConfig {
    /// Load configuration from defaults, an optional file, and the environment.
    pub fn load(path: Option<&str>) -> RsaResult<Self> {
        let defaults = ::config::Config::try_from(&SolverConfig::default())
            .map_err(|e| RsaError::Configuration(e.to_string()))?;
        let mut builder = ::config::Config::builder().add_source(defaults);

        if let Some(path) = path {
            builder = builder.add_source(::config::File::with_name(path).required(true));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("CONNECTIONS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let loaded: SolverConfig = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| RsaError::Configuration(e.to_string()))?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Reject configurations the engine, search or loop cannot honour.
    pub fn validate(&self) -> RsaResult<()> {
        let fail = |msg: String| Err(RsaError::Configuration(msg));

        if self.group_size == 0 || self.groups == 0 {
            return fail(format!(
                "group_size ({}) and groups ({}) must be positive",
                self.group_size, self.groups
            ));
        }
        if self.board_size() > MAX_BOARD_WORDS {
            return fail(format!(
                "board of {} words exceeds the maximum of {}",
                self.board_size(),
                MAX_BOARD_WORDS
            ));
        }
        let alphas = [
            ("alpha0", self.rationality.alpha0),
            ("alpha1", self.rationality.alpha1),
            ("alpha2", self.rationality.alpha2),
        ];
        for (name, alpha) in alphas {
            if !(alpha.is_finite() && alpha > 0.0) {
                return fail(format!("{} must be a positive real, got {}", name, alpha));
            }
        }
        if !(0.0..=1.0).contains(&self.confidence_floor) {
            return fail(format!(
                "confidence_floor must be in [0, 1], got {}",
                self.confidence_floor
            ));
        }
        if self.max_rounds == 0 {
            return fail("max_rounds must be positive".into());
        }
        if self.round_timeout_ms == 0 {
            return fail("round_timeout_ms must be positive".into());
        }
        if !(self.miss_penalty_floor > 0.0 && self.miss_penalty_floor <= 1.0) {
            return fail(format!(
                "miss_penalty_floor must be in (0, 1], got {}",
                self.miss_penalty_floor
            ));
        }
        if !(0.0..=1.0).contains(&self.centroid_weight) {
            return fail(format!(
                "centroid_weight must be in [0, 1], got {}",
                self.centroid_weight
            ));
        }
        if self.max_proposals == 0 {
            return fail("max_proposals must be positive".into());
        }
        if self.search_node_limit == 0 {
            return fail("search_node_limit must be positive".into());
        }
        Ok(())
    }

    pub fn board_size(&self) -> usize {
        self.group_size * self.groups
    }

    pub fn round_timeout(&self) -> Duration {
        Duration::from_millis(self.round_timeout_ms)
    }

    pub fn engine(&self) -> EngineConfig {
        EngineConfig {
            group_size: self.group_size,
            rationality: self.rationality.clone(),
            reasoning_depth: self.reasoning_depth,
            miss_penalty_floor: self.miss_penalty_floor,
        }
    }

    pub fn search(&self) -> SearchConfig {
        SearchConfig {
            group_size: self.group_size,
            groups: self.groups,
            node_limit: self.search_node_limit,
        }
    }

    /// Same configuration with a different board shape, used when solving
    /// the remainder of a partially solved board.
    pub fn with_shape(&self, group_size: usize, groups: usize) -> Self {
        Self {
            group_size,
            groups,
            ..self.clone()
        }
    }
}
