//! Rule matcher.
//!
//! Patterns are compiled once at construction; evaluation holds no state and
//! returns the same [`ActionSet`] for the same candidate every time.

use regex::Regex;
use tracing::debug;

use notifyd_core::config::{Pattern, RuleActions, RuleConfig, RuleCriteria};
use notifyd_core::error::AppError;
use notifyd_core::types::Urgency;

use crate::handler::Candidate;

use super::actions::ActionSet;

#[derive(Debug)]
enum CompiledPattern {
    Exact(String),
    Regex(Regex),
}

impl CompiledPattern {
    fn compile(pattern: &Pattern) -> Result<Self, AppError> {
        Ok(match pattern {
            Pattern::Exact(text) => Self::Exact(text.clone()),
            Pattern::Regex { regex } => Self::Regex(Regex::new(regex)?),
        })
    }

    fn matches(&self, value: &str) -> bool {
        match self {
            Self::Exact(text) => text == value,
            Self::Regex(regex) => regex.is_match(value),
        }
    }
}

#[derive(Debug)]
struct CompiledCriteria {
    app_name: Option<CompiledPattern>,
    summary: Option<CompiledPattern>,
    body: Option<CompiledPattern>,
    category: Option<CompiledPattern>,
    desktop_entry: Option<CompiledPattern>,
    urgency: Option<Urgency>,
}

impl CompiledCriteria {
    fn compile(criteria: &RuleCriteria) -> Result<Self, AppError> {
        let compile = |p: &Option<Pattern>| p.as_ref().map(CompiledPattern::compile).transpose();
        Ok(Self {
            app_name: compile(&criteria.app_name)?,
            summary: compile(&criteria.summary)?,
            body: compile(&criteria.body)?,
            category: compile(&criteria.category)?,
            desktop_entry: compile(&criteria.desktop_entry)?,
            urgency: criteria.urgency,
        })
    }

    /// Checked in a fixed order; the first failing criterion ends the check.
    fn matches(&self, candidate: &Candidate) -> bool {
        if let Some(pattern) = &self.app_name {
            if !pattern.matches(&candidate.app_name) {
                return false;
            }
        }
        if let Some(pattern) = &self.summary {
            if !pattern.matches(&candidate.summary) {
                return false;
            }
        }
        if let Some(pattern) = &self.body {
            if !pattern.matches(&candidate.body) {
                return false;
            }
        }
        if let Some(pattern) = &self.category {
            match candidate.hints.category() {
                Some(category) if pattern.matches(category) => {}
                _ => return false,
            }
        }
        if let Some(pattern) = &self.desktop_entry {
            match candidate.hints.desktop_entry() {
                Some(entry) if pattern.matches(entry) => {}
                _ => return false,
            }
        }
        if let Some(urgency) = self.urgency {
            if candidate.urgency != urgency {
                return false;
            }
        }
        true
    }
}

#[derive(Debug)]
struct CompiledRule {
    label: String,
    criteria: CompiledCriteria,
    actions: RuleActions,
}

/// Evaluates configured rules against candidates.
#[derive(Debug, Default)]
pub struct RuleMatcher {
    rules: Vec<CompiledRule>,
}

impl RuleMatcher {
    /// Compile the configured rules, preserving their order.
    pub fn new(rules: &[RuleConfig]) -> Result<Self, AppError> {
        let rules = rules
            .iter()
            .enumerate()
            .map(|(index, rule)| {
                let label = rule.label(index);
                let criteria = CompiledCriteria::compile(&rule.criteria).map_err(|e| {
                    AppError::configuration(format!("{label}: {}", e.message))
                })?;
                Ok(CompiledRule {
                    label,
                    criteria,
                    actions: rule.actions.clone(),
                })
            })
            .collect::<Result<Vec<_>, AppError>>()?;

        Ok(Self { rules })
    }

    /// Fold the actions of every matching rule, in configuration order.
    pub fn evaluate(&self, candidate: &Candidate) -> ActionSet {
        let mut set = ActionSet::default();
        for (index, rule) in self.rules.iter().enumerate() {
            if rule.criteria.matches(candidate) {
                debug!(
                    "Notification from '{}' matched {}",
                    candidate.app_name, rule.label
                );
                set.apply(index, &rule.actions);
            }
        }
        set
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rules are configured.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
