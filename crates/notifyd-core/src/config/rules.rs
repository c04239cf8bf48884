//! Per-application rule configuration.
//!
//! Rules are evaluated in file order. Each rule has a set of criteria that
//! must all hold and a set of actions; see the engine's rule matcher for the
//! merge order when several rules match.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::types::Urgency;

/// A string criterion: exact text or a regular expression.
///
/// In TOML: `app_name = "Spotify"` or `app_name = { regex = "^Spot" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Pattern {
    /// Regular expression, matched anywhere in the field unless anchored.
    Regex {
        /// The expression.
        regex: String,
    },
    /// Exact, case-sensitive equality.
    Exact(String),
}

impl Pattern {
    /// Compile-check the pattern.
    pub fn validate(&self) -> Result<(), AppError> {
        if let Self::Regex { regex } = self {
            Regex::new(regex)?;
        }
        Ok(())
    }
}

/// Criteria a notification must satisfy for a rule to apply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleCriteria {
    /// Sending application.
    #[serde(default)]
    pub app_name: Option<Pattern>,
    /// Summary line.
    #[serde(default)]
    pub summary: Option<Pattern>,
    /// Body text.
    #[serde(default)]
    pub body: Option<Pattern>,
    /// `category` hint.
    #[serde(default)]
    pub category: Option<Pattern>,
    /// `desktop-entry` hint.
    #[serde(default)]
    pub desktop_entry: Option<Pattern>,
    /// Urgency requested by the sender.
    #[serde(default)]
    pub urgency: Option<Urgency>,
}

impl RuleCriteria {
    fn patterns(&self) -> impl Iterator<Item = &Pattern> {
        [
            &self.app_name,
            &self.summary,
            &self.body,
            &self.category,
            &self.desktop_entry,
        ]
        .into_iter()
        .flatten()
    }
}

/// Actions applied when a rule matches. Unset fields leave the category
/// open for later rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleActions {
    /// Timeout override in milliseconds, `0` = never expire.
    #[serde(default)]
    pub timeout: Option<u32>,
    /// CSS class handed to the renderer.
    #[serde(default)]
    pub css_class: Option<String>,
    /// Never archive into history.
    #[serde(default)]
    pub skip_history: Option<bool>,
    /// Never show; only archive.
    #[serde(default)]
    pub block: Option<bool>,
    /// Urgency override.
    #[serde(default)]
    pub urgency: Option<Urgency>,
}

/// A configured rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Optional label used in logs.
    #[serde(default)]
    pub name: Option<String>,
    /// Match criteria.
    #[serde(default)]
    pub criteria: RuleCriteria,
    /// Actions to apply.
    #[serde(default)]
    pub actions: RuleActions,
}

impl RuleConfig {
    /// Compile-check every pattern of the rule.
    pub fn validate(&self) -> Result<(), AppError> {
        for pattern in self.criteria.patterns() {
            pattern.validate()?;
        }
        Ok(())
    }

    /// Label for logging: the configured name or the rule's position.
    pub fn label(&self, index: usize) -> String {
        self.name.clone().unwrap_or_else(|| format!("rule#{index}"))
    }
}
