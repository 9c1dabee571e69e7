//! Rich diagnostic error types for the sekhem engine.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]`
//! derives, providing error codes and help text. Note that an empty
//! selection is never an error: a pass that matches nothing returns an
//! empty outcome, and these types cover only rule authoring, configuration,
//! and collaborator failures.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the sekhem engine.
#[derive(Debug, Error, Diagnostic)]
pub enum SekhemError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Rule(#[from] RuleError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Select(#[from] SelectError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

pub type SekhemResult<T> = std::result::Result<T, SekhemError>;

// ---------------------------------------------------------------------------
// Rule errors
// ---------------------------------------------------------------------------

/// Errors from rule construction and loading.
#[derive(Debug, Error, Diagnostic)]
pub enum RuleError {
    #[error("rule '{rule_name}' has strength {value}, outside [0, 1]")]
    #[diagnostic(
        code(sekhem::rule::invalid_strength),
        help("Strength is the rule's own confidence; scale it into [0, 1].")
    )]
    InvalidStrength { rule_name: String, value: f32 },

    #[error("rule '{rule_name}' has importance {value}; importance must be finite and >= 0")]
    #[diagnostic(
        code(sekhem::rule::invalid_importance),
        help(
            "Importance comes from the attention subsystem. Leave it at 0.0 \
             and disable importance scoring if no attention scores exist."
        )
    )]
    InvalidImportance { rule_name: String, value: f32 },

    #[error("rule script parse error at line {line}: {message}")]
    #[diagnostic(
        code(sekhem::rule::script_parse),
        help("Rule blocks start with '@rule <name>' followed by indented 'when:' and 'do:' lines.")
    )]
    ScriptParse { line: usize, message: String },

    #[error("rule JSON parse error: {message}")]
    #[diagnostic(
        code(sekhem::rule::json_parse),
        help("Rule packs are a JSON array of rule definition objects.")
    )]
    JsonParse { message: String },
}

pub type RuleResult<T> = std::result::Result<T, RuleError>;

// ---------------------------------------------------------------------------
// Selection errors
// ---------------------------------------------------------------------------

/// Errors surfaced during a selection pass.
///
/// The pass itself never fails; the only failure source is a collaborator.
/// A pass is stateless and idempotent, so callers may simply re-invoke it
/// with the same trigger once the collaborator recovers.
#[derive(Debug, Error, Diagnostic)]
pub enum SelectError {
    #[error("context evaluator failed on {condition}: {message}")]
    #[diagnostic(
        code(sekhem::select::evaluator),
        help("The satisfiability evaluator raised; the pass was abandoned and may be retried.")
    )]
    Evaluator { condition: String, message: String },
}

pub type SelectResult<T> = std::result::Result<T, SelectError>;

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors from selector configuration files.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read selector config: {path}")]
    #[diagnostic(
        code(sekhem::config::read),
        help("Ensure the config file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse selector config: {path}")]
    #[diagnostic(
        code(sekhem::config::parse),
        help("Check the TOML syntax in the selector config file.")
    )]
    Parse { path: String, message: String },

    #[error("failed to write selector config: {path}")]
    #[diagnostic(
        code(sekhem::config::write),
        help("Ensure you have write permissions to the config directory.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
