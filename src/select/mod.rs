//! The selection pipeline: gather → weigh → draw → record.
//!
//! A pass is logically single-threaded and runs to completion: candidates
//! are gathered for the trigger (or focus set), weighed against a
//! pass-scoped satisfiability cache, folded into a per-action tally, and
//! one action is drawn by weighted lottery. The winning rule's alias, if
//! any, lands in the rejoinder slot. All per-pass state lives in locals
//! created here and dropped on return; concurrent passes would need one
//! [`ActionSelector`] each.

mod cache;
mod gather;
mod lottery;
mod weight;

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult, SelectResult};
use crate::rejoinder::RejoinderState;
use crate::rule::Rule;
use crate::world::{ContextEvaluator, RandomSource, RuleSource, Trigger};

use cache::ContextCache;
use weight::PassMode;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for an [`ActionSelector`], persisted as TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Whether rule importance scores take part in weighting. Off by
    /// default: without a running attention subsystem every importance is
    /// zero and the topic boost substitutes for it in triggered passes.
    #[serde(default)]
    pub importance_scoring: bool,
    /// The currently active conversation topic, if any.
    #[serde(default)]
    pub active_topic: Option<String>,
    /// Importance substitute for on-topic rules (default: 1.0).
    #[serde(default = "default_topic_boost")]
    pub topic_boost: f32,
    /// Importance substitute for off-topic rules (default: 0.5).
    #[serde(default = "default_off_topic_boost")]
    pub off_topic_boost: f32,
}

fn default_topic_boost() -> f32 {
    1.0
}
fn default_off_topic_boost() -> f32 {
    0.5
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            importance_scoring: false,
            active_topic: None,
            topic_boost: default_topic_boost(),
            off_topic_boost: default_off_topic_boost(),
        }
    }
}

impl SelectorConfig {
    /// Load from a TOML file.
    pub fn load(path: &std::path::Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Save to a TOML file.
    pub fn save(&self, path: &std::path::Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Result of one selection pass, with diagnostics.
#[derive(Debug, Clone)]
pub struct SelectionOutcome {
    /// The winning rule, or `None` when no action is currently applicable.
    pub winner: Option<Arc<Rule>>,
    /// Candidate rules after gathering and dedup.
    pub gathered: usize,
    /// Candidates excluded for contributing zero or negative weight.
    pub excluded: usize,
    /// Distinct actions that reached the lottery.
    pub actions: usize,
    /// Context evaluator invocations this pass made.
    pub evaluations: usize,
}

impl SelectionOutcome {
    /// Returns `true` if no action was applicable.
    pub fn is_empty(&self) -> bool {
        self.winner.is_none()
    }
}

// ---------------------------------------------------------------------------
// Selector
// ---------------------------------------------------------------------------

/// Action selector for one behavior component.
///
/// Owns the configuration, the random source, and the rejoinder slot; the
/// rule source and context evaluator are collaborators passed per call.
pub struct ActionSelector<R = StdRng> {
    config: SelectorConfig,
    random: R,
    rejoinder: RejoinderState,
}

impl ActionSelector<StdRng> {
    /// Create a selector drawing from the OS entropy source.
    pub fn new(config: SelectorConfig) -> Self {
        Self::with_random(config, StdRng::from_entropy())
    }
}

impl<R: RandomSource> ActionSelector<R> {
    /// Create a selector with an explicit random source.
    pub fn with_random(config: SelectorConfig, random: R) -> Self {
        Self {
            config,
            random,
            rejoinder: RejoinderState::new(),
        }
    }

    /// The selector configuration.
    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    /// Mutable access, e.g. to switch the active topic between passes.
    pub fn config_mut(&mut self) -> &mut SelectorConfig {
        &mut self.config
    }

    /// The rejoinder slot.
    pub fn rejoinder(&self) -> &RejoinderState {
        &self.rejoinder
    }

    /// Mutable access, e.g. to restore persisted rejoinder state.
    pub fn rejoinder_mut(&mut self) -> &mut RejoinderState {
        &mut self.rejoinder
    }

    /// Run an input-driven selection pass.
    ///
    /// Gathers exact, wildcard, and indexed matches for the trigger,
    /// dedups by condition identity, and draws one action. Returns an
    /// empty outcome (not an error) when nothing matches or every
    /// candidate weighs zero.
    pub fn select_from_trigger(
        &mut self,
        trigger: &Trigger,
        source: &dyn RuleSource,
        evaluator: &mut dyn ContextEvaluator,
    ) -> SelectResult<SelectionOutcome> {
        let candidates = gather::gather_triggered(trigger, source);
        self.run_pass(candidates, PassMode::Triggered, evaluator)
    }

    /// Run an attention-driven selection pass over the focus set (or the
    /// whole pool when the focus filter is disabled).
    ///
    /// Focus passes always weigh raw importance; the topic-boost fallback
    /// applies only to triggered passes.
    pub fn select_from_focus(
        &mut self,
        source: &dyn RuleSource,
        evaluator: &mut dyn ContextEvaluator,
    ) -> SelectResult<SelectionOutcome> {
        let candidates = gather::gather_focus(source);
        self.run_pass(candidates, PassMode::Focus, evaluator)
    }

    fn run_pass(
        &mut self,
        candidates: Vec<Arc<Rule>>,
        mode: PassMode,
        evaluator: &mut dyn ContextEvaluator,
    ) -> SelectResult<SelectionOutcome> {
        let mut cache = ContextCache::new();
        let tally =
            weight::tally_candidates(&candidates, mode, &self.config, &mut cache, evaluator)?;
        let winner = lottery::draw(&tally, &mut self.random);

        match &winner {
            Some(rule) => {
                if let Some(alias) = &rule.alias {
                    self.rejoinder.record(alias.clone());
                }
                tracing::debug!(rule = %rule.name, action = %rule.action, "selected action");
            }
            None => {
                tracing::debug!(candidates = candidates.len(), "no applicable action");
            }
        }

        Ok(SelectionOutcome {
            winner,
            gathered: candidates.len(),
            excluded: tally.excluded(),
            actions: tally.len(),
            evaluations: cache.evaluations(),
        })
    }
}
