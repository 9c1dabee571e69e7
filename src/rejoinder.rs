//! Rejoinder state: the record of which rule last fired.
//!
//! Follow-up dialogue logic (rejoinders, "why did you do that" replies)
//! lives outside the selection core; all it needs from a pass is the alias
//! of the winning rule. The slot is owned by the host and handed to the
//! selector, never reached through ambient globals.

use serde::{Deserialize, Serialize};

/// Process-wide record of the most recently selected rule's alias.
///
/// Overwritten on every successful selection whose winner carries an
/// alias; selection never clears it. Callers that need "no rule fired"
/// semantics must inspect the selection outcome directly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RejoinderState {
    last_alias: Option<String>,
}

impl RejoinderState {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the slot with the alias of a rule that just fired.
    pub fn record(&mut self, alias: impl Into<String>) {
        self.last_alias = Some(alias.into());
    }

    /// The alias of the last rule that fired, if any rule with an alias
    /// has fired yet.
    pub fn last(&self) -> Option<&str> {
        self.last_alias.as_deref()
    }
}
