//! Candidate gathering: find the rules relevant to the current pass.
//!
//! Triggered gathering unions three sources — literal matches, the
//! wildcard registry, and the approximate structural index — in that
//! order. Focus gathering takes the salient subset or, when the focus
//! filter is off, the whole registered pool. Either way the result is
//! deduplicated by condition identity, keeping the first-seen instance.

use std::collections::HashSet;
use std::sync::Arc;

use crate::rule::{ConditionId, Rule};
use crate::world::{RuleSource, Trigger};

/// Gather candidates for a triggered pass.
///
/// A trigger with no extracted structure matches nothing; that is an
/// empty result, not an error, and no source is consulted.
pub(crate) fn gather_triggered(trigger: &Trigger, source: &dyn RuleSource) -> Vec<Arc<Rule>> {
    if trigger.is_empty() {
        return Vec::new();
    }

    let exact = source.exact_matches(trigger);
    let wildcard = source.wildcard_rules();
    let indexed = source.indexed_matches(trigger);
    tracing::debug!(
        exact = exact.len(),
        wildcard = wildcard.len(),
        indexed = indexed.len(),
        "gathered trigger candidates"
    );

    dedup_by_condition(exact.into_iter().chain(wildcard).chain(indexed))
}

/// Gather candidates for a focus (attention-driven) pass.
pub(crate) fn gather_focus(source: &dyn RuleSource) -> Vec<Arc<Rule>> {
    let candidates = match source.focus_rules() {
        Some(salient) => {
            tracing::debug!(salient = salient.len(), "gathered focus candidates");
            salient
        }
        None => source.all_rules(),
    };
    dedup_by_condition(candidates)
}

/// Keep one rule per condition identity, preserving first-seen order.
fn dedup_by_condition(rules: impl IntoIterator<Item = Arc<Rule>>) -> Vec<Arc<Rule>> {
    let mut seen: HashSet<ConditionId> = HashSet::new();
    rules
        .into_iter()
        .filter(|r| seen.insert(r.condition.id()))
        .collect()
}
