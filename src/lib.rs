//! # sekhem
//!
//! A behavior rule engine: given a pool of condition→action rules, gather
//! the ones relevant to the current input, weigh each candidate action by
//! rule strength, context satisfiability, and importance, and pick one
//! action by weighted lottery — recording which rule fired for the
//! rejoinder logic downstream.
//!
//! ## Architecture
//!
//! - **Rules** (`rule`): identity-compared conditions, opaque actions, and
//!   immutable weighted rules
//! - **Pool** (`pool`): in-memory registry answering exact, wildcard, and
//!   approximate-index gathering queries
//! - **Selection** (`select`): the pass pipeline — per-pass satisfiability
//!   cache, per-action mean-weight tally, roulette draw
//! - **Collaborators** (`world`): the traits a host wires in — context
//!   evaluation, rule sources, randomness
//! - **Rejoinder** (`rejoinder`): the "which rule fired last" slot
//!
//! ## Library usage
//!
//! ```no_run
//! use sekhem::error::SelectResult;
//! use sekhem::pool::RulePool;
//! use sekhem::rule::Condition;
//! use sekhem::select::{ActionSelector, SelectorConfig};
//! use sekhem::world::{ContextEvaluator, Trigger};
//!
//! struct AlwaysSatisfied;
//!
//! impl ContextEvaluator for AlwaysSatisfied {
//!     fn evaluate(&mut self, _condition: &Condition) -> SelectResult<f32> {
//!         Ok(1.0)
//!     }
//! }
//!
//! let mut pool = RulePool::new();
//! pool.load_script(
//!     "@rule greet-hello\n  when: (greet hello)\n  do: say-hello\n  alias: GREET.HELLO\n",
//! )
//! .unwrap();
//!
//! let mut selector = ActionSelector::new(SelectorConfig::default());
//! let outcome = selector
//!     .select_from_trigger(
//!         &Trigger::from_terms(["greet", "hello"]),
//!         &pool,
//!         &mut AlwaysSatisfied,
//!     )
//!     .unwrap();
//! if let Some(rule) = &outcome.winner {
//!     println!("firing {}", rule.action.name());
//! }
//! ```

pub mod error;
pub mod pool;
pub mod rejoinder;
pub mod rule;
pub mod script;
pub mod select;
pub mod world;
