//! Rule weighting and per-action aggregation.
//!
//! A rule's weight is `strength × satisfiability × importance-term`. In a
//! triggered pass with importance scoring disabled, the importance term
//! falls back to a binary topic boost; without that fallback, an idle
//! attention subsystem (all importances zero) would starve selection
//! entirely. A focus pass presupposes attention is running and always
//! weighs raw importance.
//!
//! Weights aggregate per action as an arithmetic mean, so an action backed
//! by many weak rules does not outdraw one backed by a single strong rule.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::SelectResult;
use crate::rule::{Action, ActionId, Rule};
use crate::select::SelectorConfig;
use crate::select::cache::ContextCache;
use crate::world::ContextEvaluator;

/// Which entry point is running the pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PassMode {
    Triggered,
    Focus,
}

/// Weight of a single rule under the given pass mode and config.
pub(crate) fn rule_weight(
    rule: &Rule,
    satisfiability: f32,
    mode: PassMode,
    config: &SelectorConfig,
) -> f32 {
    let importance_term = match mode {
        PassMode::Triggered if !config.importance_scoring => topic_boost(rule, config),
        _ => rule.importance,
    };
    rule.strength * satisfiability * importance_term
}

/// Binary topic boost: full weight on the active topic, half weight off it.
fn topic_boost(rule: &Rule, config: &SelectorConfig) -> f32 {
    let on_topic = config
        .active_topic
        .as_deref()
        .is_some_and(|topic| rule.on_topic(topic));
    if on_topic {
        config.topic_boost
    } else {
        config.off_topic_boost
    }
}

// ---------------------------------------------------------------------------
// Per-action aggregation
// ---------------------------------------------------------------------------

/// Aggregate weight of one action across its contributing rules.
#[derive(Debug)]
pub(crate) struct ActionEntry {
    pub(crate) action: Arc<Action>,
    /// First rule that contributed to this action; returned when the
    /// action wins, so the choice is deterministic.
    pub(crate) exemplar: Arc<Rule>,
    pub(crate) count: usize,
    pub(crate) sum: f32,
}

impl ActionEntry {
    /// Mean weight across contributing rules.
    pub(crate) fn mean(&self) -> f32 {
        self.sum / self.count as f32
    }
}

/// Ordered per-action weight table for one pass.
///
/// Entries keep insertion (gather) order, which fixes the walk order of
/// the lottery and thereby the tie-break between equal-weight actions.
/// Only positive-weight rules are ever added; an action never appears
/// with a zero or negative sum.
#[derive(Debug, Default)]
pub(crate) struct ActionTally {
    entries: Vec<ActionEntry>,
    index: HashMap<ActionId, usize>,
    excluded: usize,
}

impl ActionTally {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn add(&mut self, rule: &Arc<Rule>, weight: f32) {
        match self.index.get(&rule.action.id()) {
            Some(&i) => {
                let entry = &mut self.entries[i];
                entry.count += 1;
                entry.sum += weight;
            }
            None => {
                self.index.insert(rule.action.id(), self.entries.len());
                self.entries.push(ActionEntry {
                    action: rule.action.clone(),
                    exemplar: rule.clone(),
                    count: 1,
                    sum: weight,
                });
            }
        }
    }

    pub(crate) fn entries(&self) -> &[ActionEntry] {
        &self.entries
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Candidates whose weight came out zero or negative, logged and
    /// dropped rather than aggregated.
    pub(crate) fn excluded(&self) -> usize {
        self.excluded
    }
}

/// Weigh every candidate and fold the survivors into a per-action tally.
pub(crate) fn tally_candidates(
    candidates: &[Arc<Rule>],
    mode: PassMode,
    config: &SelectorConfig,
    cache: &mut ContextCache,
    evaluator: &mut dyn ContextEvaluator,
) -> SelectResult<ActionTally> {
    let mut tally = ActionTally::new();
    for rule in candidates {
        let satisfiability = cache.score(&rule.condition, evaluator)?;
        let weight = rule_weight(rule, satisfiability, mode, config);
        if weight <= 0.0 {
            tracing::debug!(
                rule = %rule.name,
                satisfiability,
                strength = rule.strength,
                "rule contributed no weight, excluded from tally"
            );
            tally.excluded += 1;
            continue;
        }
        tally.add(rule, weight);
    }
    Ok(tally)
}
