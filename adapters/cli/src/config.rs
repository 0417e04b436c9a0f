//! Agent configuration loaded from TOML.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use blastfield_system_annealing::{AnnealingConfig, ScoreFactors};
use blastfield_system_lookahead::LookaheadWeights;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Planner used to choose each move.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Pick a lookahead depth and mode from the state of the match.
    #[default]
    Auto,
    /// Always run a standard lookahead at the configured depth.
    Lookahead,
    /// Optimise a fixed-length sequence with simulated annealing.
    Annealing,
}

/// How the annealing planner expects opponents to behave.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpponentModel {
    /// Opponents stand still.
    #[default]
    Idle,
    /// Opponents step wherever they survive longest.
    Evasive,
}

/// Complete configuration of the agent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Planner used to choose each move.
    pub strategy: Strategy,
    /// Plies searched by [`Strategy::Lookahead`].
    pub lookahead_depth: usize,
    /// Predict the closest opponent with its own search before planning.
    pub model_opponent: bool,
    /// Opponent behaviour assumed by the annealing planner.
    pub opponents: OpponentModel,
    /// Weights of the lookahead score.
    pub lookahead: LookaheadWeights,
    /// Tuning of the annealing run.
    pub annealing: AnnealingConfig,
    /// Weights of the annealing terminal evaluation.
    pub scoring: ScoreFactors,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Auto,
            lookahead_depth: 4,
            model_opponent: false,
            opponents: OpponentModel::Idle,
            lookahead: LookaheadWeights::default(),
            annealing: AnnealingConfig::default(),
            scoring: ScoreFactors::default(),
        }
    }
}

impl AgentConfig {
    /// Reads a configuration file; missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read agent configuration {}", path.display()))?;
        Self::from_toml(&contents)
            .with_context(|| format!("failed to load agent configuration {}", path.display()))
    }

    /// Parses a configuration from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse agent configuration")
    }
}
