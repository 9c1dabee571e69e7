//! In-memory registered-rule pool.
//!
//! [`RulePool`] owns the rule instances for one behavior component and
//! answers the gathering queries of [`RuleSource`]: a signature index for
//! literal matches, a registry of context-free (no-constant) rules, and an
//! inverted constant-term index for approximate structural matches. Hosts
//! with a knowledge-graph backend implement [`RuleSource`] against their
//! own indexes instead.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use crate::error::RuleResult;
use crate::rule::{Action, Condition, ConditionKind, Rule, RuleId};
use crate::script::{self, RuleDef};
use crate::world::{RuleSource, Trigger};

/// Owner and index of the rules registered with one behavior component.
#[derive(Debug, Default)]
pub struct RulePool {
    rules: Vec<Arc<Rule>>,
    /// Ground (all-constant) condition signature → rule indices.
    exact: HashMap<Vec<String>, Vec<usize>>,
    /// Rules whose condition has no constant terms.
    wildcard: Vec<usize>,
    /// Constant token → indices of rules whose condition contains it.
    term_index: HashMap<String, Vec<usize>>,
    /// Actions interned by name, shared across rules.
    actions: HashMap<String, Arc<Action>>,
    /// Salient subset; `None` disables the focus filter.
    focus: Option<HashSet<RuleId>>,
}

impl RulePool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered rule instances.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if no rules are registered.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Intern an action by name, creating it on first use.
    pub fn action(&mut self, name: &str) -> Arc<Action> {
        self.actions
            .entry(name.to_string())
            .or_insert_with(|| Action::named(name))
            .clone()
    }

    /// Register a rule, validating its weights and indexing its condition.
    pub fn add(&mut self, rule: Rule) -> RuleResult<Arc<Rule>> {
        rule.validate()?;
        let rule = Arc::new(rule);
        let idx = self.rules.len();

        if rule.condition.is_wildcard() {
            self.wildcard.push(idx);
        } else {
            for constant in rule.condition.constants() {
                self.term_index
                    .entry(constant.to_string())
                    .or_default()
                    .push(idx);
            }
            if rule.condition.is_ground() {
                let signature: Vec<String> =
                    rule.condition.constants().map(str::to_string).collect();
                self.exact.entry(signature).or_default().push(idx);
            }
        }

        tracing::trace!(rule = %rule.name, condition = %rule.condition, "rule registered");
        self.rules.push(rule.clone());
        Ok(rule)
    }

    /// Restrict focus-mode gathering to the given salient rules.
    pub fn set_focus(&mut self, ids: impl IntoIterator<Item = RuleId>) {
        self.focus = Some(ids.into_iter().collect());
    }

    /// Disable the focus filter; focus-mode gathering sees the whole pool.
    pub fn clear_focus(&mut self) {
        self.focus = None;
    }

    /// Instantiate a batch of definitions. A definition with several goals
    /// becomes one rule instance per goal, all sharing a single condition.
    /// Returns the number of instances registered.
    pub fn load_defs(&mut self, defs: Vec<RuleDef>) -> RuleResult<usize> {
        let mut registered = 0;
        for def in defs {
            let condition = match script::parse_pattern(&def.when)? {
                ConditionKind::Pattern(terms) => Condition::pattern(terms),
                ConditionKind::Wildcard => Condition::wildcard(),
            };
            let action = self.action(&def.action);

            let goals: Vec<Option<String>> = if def.goals.is_empty() {
                vec![None]
            } else {
                def.goals.iter().cloned().map(Some).collect()
            };

            for goal in goals {
                let mut rule = Rule::new(&def.name, condition.clone(), action.clone())
                    .with_strength(def.strength)
                    .with_importance(def.importance);
                rule.goal = goal;
                rule.alias = def.alias.clone();
                rule.topic = def.topic.clone();
                self.add(rule)?;
                registered += 1;
            }
        }
        tracing::debug!(registered, total = self.rules.len(), "rule definitions loaded");
        Ok(registered)
    }

    /// Load rules from the `@rule` text format.
    pub fn load_script(&mut self, text: &str) -> RuleResult<usize> {
        let defs = script::parse_script(text)?;
        self.load_defs(defs)
    }

    /// Load rules from a JSON pack.
    pub fn load_json(&mut self, json: &str) -> RuleResult<usize> {
        let defs = script::parse_json(json)?;
        self.load_defs(defs)
    }

    fn collect(&self, indices: impl IntoIterator<Item = usize>) -> Vec<Arc<Rule>> {
        indices.into_iter().map(|i| self.rules[i].clone()).collect()
    }
}

impl RuleSource for RulePool {
    fn exact_matches(&self, trigger: &Trigger) -> Vec<Arc<Rule>> {
        match self.exact.get(trigger.terms()) {
            Some(indices) => self.collect(indices.iter().copied()),
            None => Vec::new(),
        }
    }

    fn wildcard_rules(&self) -> Vec<Arc<Rule>> {
        self.collect(self.wildcard.iter().copied())
    }

    fn indexed_matches(&self, trigger: &Trigger) -> Vec<Arc<Rule>> {
        let trigger_terms: HashSet<&str> =
            trigger.terms().iter().map(String::as_str).collect();

        // Candidates share at least one constant with the trigger; a match
        // requires every constant of the condition to appear in the trigger.
        let mut candidates = BTreeSet::new();
        for term in &trigger_terms {
            if let Some(indices) = self.term_index.get(*term) {
                candidates.extend(indices.iter().copied());
            }
        }

        let matching = candidates.into_iter().filter(|&i| {
            self.rules[i]
                .condition
                .constants()
                .all(|c| trigger_terms.contains(c))
        });
        self.collect(matching)
    }

    fn focus_rules(&self) -> Option<Vec<Arc<Rule>>> {
        let focus = self.focus.as_ref()?;
        Some(
            self.rules
                .iter()
                .filter(|r| focus.contains(&r.id))
                .cloned()
                .collect(),
        )
    }

    fn all_rules(&self) -> Vec<Arc<Rule>> {
        self.rules.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::Term;

    fn ground(pool: &mut RulePool, name: &str, terms: &[&str], action: &str) -> Arc<Rule> {
        let condition =
            Condition::pattern(terms.iter().map(|t| Term::Constant(t.to_string())).collect());
        let action = pool.action(action);
        pool.add(Rule::new(name, condition, action)).unwrap()
    }

    #[test]
    fn exact_match_requires_full_signature() {
        let mut pool = RulePool::new();
        ground(&mut pool, "hello", &["greet", "hello"], "say-hello");

        let hit = pool.exact_matches(&Trigger::from_terms(["greet", "hello"]));
        assert_eq!(hit.len(), 1);
        assert_eq!(hit[0].name, "hello");

        assert!(pool.exact_matches(&Trigger::from_terms(["greet"])).is_empty());
        assert!(
            pool.exact_matches(&Trigger::from_terms(["hello", "greet"]))
                .is_empty()
        );
    }

    #[test]
    fn wildcard_registry_holds_constant_free_rules() {
        let mut pool = RulePool::new();
        let star = Condition::wildcard();
        let vars_only = Condition::pattern(vec![Term::Variable("x".into())]);
        let action = pool.action("idle-chatter");
        pool.add(Rule::new("star", star, action.clone())).unwrap();
        pool.add(Rule::new("vars", vars_only, action)).unwrap();
        ground(&mut pool, "ground", &["ping"], "pong");

        let wild = pool.wildcard_rules();
        assert_eq!(wild.len(), 2);
        assert_eq!(wild[0].name, "star");
        assert_eq!(wild[1].name, "vars");
    }

    #[test]
    fn indexed_match_is_constant_subset() {
        let mut pool = RulePool::new();
        let cond = Condition::pattern(vec![
            Term::Constant("see".into()),
            Term::Variable("x".into()),
            Term::Constant("face".into()),
        ]);
        let action = pool.action("track-face");
        pool.add(Rule::new("face", cond, action)).unwrap();

        // All constants present in the trigger → match.
        let hits = pool.indexed_matches(&Trigger::from_terms(["see", "a", "face"]));
        assert_eq!(hits.len(), 1);

        // Missing one constant → no match.
        assert!(pool.indexed_matches(&Trigger::from_terms(["see", "a"])).is_empty());
    }

    #[test]
    fn indexed_match_preserves_registration_order() {
        let mut pool = RulePool::new();
        ground(&mut pool, "b", &["ping", "loud"], "pong");
        ground(&mut pool, "a", &["ping"], "pong");

        let hits = pool.indexed_matches(&Trigger::from_terms(["ping", "loud"]));
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].name, "b");
        assert_eq!(hits[1].name, "a");
    }

    #[test]
    fn focus_filter_toggles() {
        let mut pool = RulePool::new();
        let r1 = ground(&mut pool, "one", &["a"], "act-a");
        let _r2 = ground(&mut pool, "two", &["b"], "act-b");

        assert!(pool.focus_rules().is_none());

        pool.set_focus([r1.id]);
        let focused = pool.focus_rules().unwrap();
        assert_eq!(focused.len(), 1);
        assert_eq!(focused[0].name, "one");

        pool.clear_focus();
        assert!(pool.focus_rules().is_none());
        assert_eq!(pool.all_rules().len(), 2);
    }

    #[test]
    fn actions_are_interned_by_name() {
        let mut pool = RulePool::new();
        let a = pool.action("say-hello");
        let b = pool.action("say-hello");
        assert_eq!(a.id(), b.id());
        let c = pool.action("say-goodbye");
        assert_ne!(a.id(), c.id());
    }

    #[test]
    fn multi_goal_def_shares_one_condition() {
        let mut pool = RulePool::new();
        let mut def = RuleDef::new("greet", "(greet hello)", "say-hello");
        def.goals = vec!["sociality".into(), "novelty".into()];
        let registered = pool.load_defs(vec![def]).unwrap();
        assert_eq!(registered, 2);

        let rules = pool.all_rules();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].condition.id(), rules[1].condition.id());
        assert_eq!(rules[0].action.id(), rules[1].action.id());
        assert_ne!(rules[0].id, rules[1].id);
        assert_eq!(rules[0].goal.as_deref(), Some("sociality"));
        assert_eq!(rules[1].goal.as_deref(), Some("novelty"));
    }

    #[test]
    fn add_rejects_invalid_strength() {
        let mut pool = RulePool::new();
        let action = pool.action("noop");
        let rule = Rule::new("bad", Condition::wildcard(), action).with_strength(2.0);
        assert!(pool.add(rule).is_err());
        assert!(pool.is_empty());
    }

    #[test]
    fn load_script_end_to_end() {
        let mut pool = RulePool::new();
        let count = pool
            .load_script("@rule ping\n  when: (ping)\n  do: pong\n")
            .unwrap();
        assert_eq!(count, 1);
        let hits = pool.exact_matches(&Trigger::from_terms(["ping"]));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].action.name(), "pong");
    }
}
