//! Core rule types for the sekhem engine.
//!
//! A [`Rule`] associates a [`Condition`] with an [`Action`] at a given
//! strength. Conditions and actions are identity-compared: every constructed
//! instance gets a unique id, and two rules share a condition only by
//! sharing the same `Arc<Condition>`. This is what candidate deduplication
//! and per-action aggregation key on.

use std::num::NonZeroU64;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::error::{RuleError, RuleResult};

// ---------------------------------------------------------------------------
// Identity ids
// ---------------------------------------------------------------------------

macro_rules! identity_id {
    ($(#[$doc:meta])* $name:ident, $prefix:literal, $counter:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[repr(transparent)]
        pub struct $name(NonZeroU64);

        impl $name {
            /// Create from a raw `u64`. Returns `None` if `raw` is zero.
            pub fn new(raw: u64) -> Option<Self> {
                NonZeroU64::new(raw).map($name)
            }

            /// Get the underlying `u64` value.
            pub fn get(self) -> u64 {
                self.0.get()
            }

            /// Allocate the next process-unique id.
            pub(crate) fn next() -> Self {
                static $counter: AtomicU64 = AtomicU64::new(1);
                loop {
                    let raw = $counter.fetch_add(1, Ordering::Relaxed);
                    if let Some(n) = NonZeroU64::new(raw) {
                        return $name(n);
                    }
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($prefix, ":{}"), self.0)
            }
        }
    };
}

identity_id!(
    /// Unique identity of a [`Condition`] instance.
    ///
    /// Uses `NonZeroU64` so that `Option<ConditionId>` is the same size as
    /// `ConditionId`.
    ConditionId, "cond", NEXT_CONDITION
);
identity_id!(
    /// Unique identity of an [`Action`] instance.
    ActionId, "act", NEXT_ACTION
);
identity_id!(
    /// Unique identity of a [`Rule`] instance.
    RuleId, "rule", NEXT_RULE
);

// ---------------------------------------------------------------------------
// Terms and conditions
// ---------------------------------------------------------------------------

/// A term in a structured condition pattern: a literal constant or a
/// variable to be bound during evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Term {
    /// A literal token that must appear in the trigger.
    Constant(String),
    /// A variable slot (e.g., `?who`), bound by the context evaluator.
    Variable(String),
}

impl Term {
    /// Parse a term from a string token. Variables start with `?`,
    /// everything else is a constant.
    pub fn parse(token: &str) -> Self {
        let token = token.trim();
        if let Some(var) = token.strip_prefix('?') {
            Self::Variable(var.to_string())
        } else {
            Self::Constant(token.to_string())
        }
    }

    /// Returns `true` if this term is a variable.
    pub fn is_variable(&self) -> bool {
        matches!(self, Self::Variable(_))
    }
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Term::Constant(c) => write!(f, "{c}"),
            Term::Variable(v) => write!(f, "?{v}"),
        }
    }
}

/// The shape of a condition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConditionKind {
    /// A structured pattern of constant and variable terms.
    Pattern(Vec<Term>),
    /// A context-free template that matches any trigger.
    Wildcard,
}

/// The condition half of a rule.
///
/// Conditions are constructed behind `Arc` and compared by [`ConditionId`];
/// cloning the `Arc` is how several rules share one condition.
#[derive(Debug)]
pub struct Condition {
    id: ConditionId,
    kind: ConditionKind,
}

impl Condition {
    /// Create a structured pattern condition.
    pub fn pattern(terms: Vec<Term>) -> Arc<Self> {
        Arc::new(Self {
            id: ConditionId::next(),
            kind: ConditionKind::Pattern(terms),
        })
    }

    /// Create a wildcard condition.
    pub fn wildcard() -> Arc<Self> {
        Arc::new(Self {
            id: ConditionId::next(),
            kind: ConditionKind::Wildcard,
        })
    }

    /// The identity of this condition instance.
    pub fn id(&self) -> ConditionId {
        self.id
    }

    /// The structural shape of this condition.
    pub fn kind(&self) -> &ConditionKind {
        &self.kind
    }

    /// Returns `true` if the condition carries no constant terms.
    ///
    /// Such conditions are context-free templates: they belong in the
    /// wildcard registry rather than the exact or term indexes.
    pub fn is_wildcard(&self) -> bool {
        match &self.kind {
            ConditionKind::Wildcard => true,
            ConditionKind::Pattern(terms) => terms.iter().all(Term::is_variable),
        }
    }

    /// Iterate over the constant tokens of this condition, in order.
    pub fn constants(&self) -> impl Iterator<Item = &str> {
        let terms = match &self.kind {
            ConditionKind::Pattern(terms) => terms.as_slice(),
            ConditionKind::Wildcard => &[],
        };
        terms.iter().filter_map(|t| match t {
            Term::Constant(c) => Some(c.as_str()),
            Term::Variable(_) => None,
        })
    }

    /// Returns `true` if the pattern consists solely of constants.
    pub fn is_ground(&self) -> bool {
        match &self.kind {
            ConditionKind::Pattern(terms) => {
                !terms.is_empty() && terms.iter().all(|t| !t.is_variable())
            }
            ConditionKind::Wildcard => false,
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ConditionKind::Wildcard => write!(f, "*"),
            ConditionKind::Pattern(terms) => {
                write!(f, "(")?;
                for (i, t) in terms.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{t}")?;
                }
                write!(f, ")")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// The action half of a rule: an opaque named payload.
///
/// The selection core never interprets an action; it only groups rules by
/// [`ActionId`] and hands the winner back to the host for execution.
#[derive(Debug)]
pub struct Action {
    id: ActionId,
    name: String,
}

impl Action {
    /// Create a new action with the given name.
    pub fn named(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            id: ActionId::next(),
            name: name.into(),
        })
    }

    /// The identity of this action instance.
    pub fn id(&self) -> ActionId {
        self.id
    }

    /// The host-facing name of this action.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// A condition→action rule with selection weights.
///
/// Rules are immutable once registered; the selection pass only reads them.
/// A rule serving several goals is registered as one instance per goal, all
/// sharing the same condition.
#[derive(Debug, Clone)]
pub struct Rule {
    /// Unique identity of this rule instance.
    pub id: RuleId,
    /// Human-readable name (not necessarily unique across goals).
    pub name: String,
    /// The condition evaluated for satisfiability.
    pub condition: Arc<Condition>,
    /// The action proposed when this rule contributes to selection.
    pub action: Arc<Action>,
    /// The goal this instance serves, if any.
    pub goal: Option<String>,
    /// The rule's own confidence in [0, 1].
    pub strength: f32,
    /// Externally assigned salience score, >= 0. Zero when the attention
    /// subsystem is not running.
    pub importance: f32,
    /// External identifier recorded when this rule wins, used by the
    /// rejoinder mechanism. Many rules have none.
    pub alias: Option<String>,
    /// Topic/group membership used by the topic-boost fallback.
    pub topic: Option<String>,
}

impl Rule {
    /// Create a rule with default weights (strength 1.0, importance 0.0).
    pub fn new(name: impl Into<String>, condition: Arc<Condition>, action: Arc<Action>) -> Self {
        Self {
            id: RuleId::next(),
            name: name.into(),
            condition,
            action,
            goal: None,
            strength: 1.0,
            importance: 0.0,
            alias: None,
            topic: None,
        }
    }

    /// Set the strength.
    pub fn with_strength(mut self, strength: f32) -> Self {
        self.strength = strength;
        self
    }

    /// Set the importance.
    pub fn with_importance(mut self, importance: f32) -> Self {
        self.importance = importance;
        self
    }

    /// Set the goal this instance serves.
    pub fn with_goal(mut self, goal: impl Into<String>) -> Self {
        self.goal = Some(goal.into());
        self
    }

    /// Set the rejoinder alias.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Set the topic.
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    /// Check the weight invariants: strength in [0, 1], importance >= 0.
    pub fn validate(&self) -> RuleResult<()> {
        if !(0.0..=1.0).contains(&self.strength) {
            return Err(RuleError::InvalidStrength {
                rule_name: self.name.clone(),
                value: self.strength,
            });
        }
        if self.importance < 0.0 || !self.importance.is_finite() {
            return Err(RuleError::InvalidImportance {
                rule_name: self.name.clone(),
                value: self.importance,
            });
        }
        Ok(())
    }

    /// Returns `true` if this rule belongs to the given topic.
    pub fn on_topic(&self, topic: &str) -> bool {
        self.topic.as_deref() == Some(topic)
    }
}
