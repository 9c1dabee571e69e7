//! Rule authoring formats.
//!
//! Rules are data, not code — they can be loaded from a JSON pack or from
//! a line-oriented text format, or constructed programmatically against
//! [`crate::pool::RulePool`]. A [`RuleDef`] is the storage-level record;
//! the pool instantiates it into live [`crate::rule::Rule`] instances,
//! one per goal, sharing a single condition.
//!
//! Text format:
//!
//! ```text
//! @rule greet-hello
//!   when: (greet hello ?who)
//!   do: say-hello
//!   strength: 0.9
//!   goals: sociality, novelty
//!   alias: GREET.HELLO
//!   topic: greetings
//! ```
//!
//! Lines outside `@rule` blocks are ignored, as are `#` comments.

use serde::{Deserialize, Serialize};

use crate::error::{RuleError, RuleResult};
use crate::rule::{ConditionKind, Term};

// ---------------------------------------------------------------------------
// Rule definitions
// ---------------------------------------------------------------------------

/// A storage-level rule definition, loadable from JSON or the text format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleDef {
    /// Rule name.
    pub name: String,
    /// Condition pattern text: `(term term ?var)` or `*` for wildcard.
    pub when: String,
    /// Name of the action to propose; actions are interned by name.
    #[serde(rename = "do")]
    pub action: String,
    /// Rule strength in [0, 1].
    #[serde(default = "default_strength")]
    pub strength: f32,
    /// Initial importance score, >= 0.
    #[serde(default)]
    pub importance: f32,
    /// Goals served; one rule instance is registered per goal, all sharing
    /// the same condition. Empty means a single goal-less instance.
    #[serde(default)]
    pub goals: Vec<String>,
    /// Rejoinder alias recorded when this rule wins.
    #[serde(default)]
    pub alias: Option<String>,
    /// Topic membership for the topic-boost fallback.
    #[serde(default)]
    pub topic: Option<String>,
}

fn default_strength() -> f32 {
    1.0
}

impl RuleDef {
    /// Create a definition with default weights.
    pub fn new(
        name: impl Into<String>,
        when: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            when: when.into(),
            action: action.into(),
            strength: default_strength(),
            importance: 0.0,
            goals: Vec::new(),
            alias: None,
            topic: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Pattern parsing
// ---------------------------------------------------------------------------

/// Parse a condition pattern from `(term term ?var)` syntax.
///
/// A bare `*` is the wildcard condition. Parentheses are optional.
pub fn parse_pattern(s: &str) -> RuleResult<ConditionKind> {
    let s = s.trim();
    if s == "*" {
        return Ok(ConditionKind::Wildcard);
    }
    let inner = s
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .unwrap_or(s);
    let terms: Vec<Term> = inner.split_whitespace().map(Term::parse).collect();
    if terms.is_empty() {
        return Err(RuleError::ScriptParse {
            line: 0,
            message: format!("pattern must have at least one term: '{s}'"),
        });
    }
    Ok(ConditionKind::Pattern(terms))
}

// ---------------------------------------------------------------------------
// JSON packs
// ---------------------------------------------------------------------------

/// Parse a rule pack from a JSON array of definitions.
pub fn parse_json(json: &str) -> RuleResult<Vec<RuleDef>> {
    serde_json::from_str(json).map_err(|e| RuleError::JsonParse {
        message: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Text scripts
// ---------------------------------------------------------------------------

/// Parse rule definitions from the `@rule` text format.
pub fn parse_script(text: &str) -> RuleResult<Vec<RuleDef>> {
    let mut defs = Vec::new();
    let mut current: Option<(usize, RuleDef)> = None;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(rest) = line.strip_prefix("@rule") {
            finish_block(&mut current, &mut defs)?;
            let name = rest.trim();
            if name.is_empty() {
                return Err(RuleError::ScriptParse {
                    line: line_no,
                    message: "@rule requires a name".into(),
                });
            }
            current = Some((line_no, RuleDef::new(name, "", "")));
            continue;
        }

        let Some((_, def)) = current.as_mut() else {
            // Stray line outside any block; ignored like the legacy formats.
            continue;
        };

        if let Some(value) = line.strip_prefix("when:") {
            let value = value.trim();
            // Validate the pattern eagerly so the error carries a line number.
            parse_pattern(value).map_err(|e| at_line(e, line_no))?;
            def.when = value.to_string();
        } else if let Some(value) = line.strip_prefix("do:") {
            def.action = value.trim().to_string();
        } else if let Some(value) = line.strip_prefix("strength:") {
            def.strength = parse_number(value, "strength", line_no)?;
        } else if let Some(value) = line.strip_prefix("importance:") {
            def.importance = parse_number(value, "importance", line_no)?;
        } else if let Some(value) = line.strip_prefix("goals:") {
            def.goals = value
                .split(',')
                .map(|g| g.trim().to_string())
                .filter(|g| !g.is_empty())
                .collect();
        } else if let Some(value) = line.strip_prefix("alias:") {
            def.alias = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("topic:") {
            def.topic = Some(value.trim().to_string());
        }
        // Unknown keys are skipped.
    }

    finish_block(&mut current, &mut defs)?;
    Ok(defs)
}

fn finish_block(
    current: &mut Option<(usize, RuleDef)>,
    defs: &mut Vec<RuleDef>,
) -> RuleResult<()> {
    let Some((line, def)) = current.take() else {
        return Ok(());
    };
    if def.when.is_empty() {
        return Err(RuleError::ScriptParse {
            line,
            message: format!("rule '{}' has no 'when:' pattern", def.name),
        });
    }
    if def.action.is_empty() {
        return Err(RuleError::ScriptParse {
            line,
            message: format!("rule '{}' has no 'do:' action", def.name),
        });
    }
    defs.push(def);
    Ok(())
}

fn parse_number(value: &str, key: &str, line: usize) -> RuleResult<f32> {
    value
        .trim()
        .parse::<f32>()
        .map_err(|e| RuleError::ScriptParse {
            line,
            message: format!("invalid {key}: {e}"),
        })
}

fn at_line(err: RuleError, line: usize) -> RuleError {
    match err {
        RuleError::ScriptParse { message, .. } => RuleError::ScriptParse { line, message },
        other => other,
    }
}
