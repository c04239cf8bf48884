//! Merged rule actions.
//!
//! Matching rules are folded in configuration order. The first rule that
//! sets a category owns it; later rules only fill categories that are still
//! open.

use notifyd_core::config::RuleActions;
use notifyd_core::types::Urgency;

/// The outcome of evaluating every rule against one candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionSet {
    /// Timeout override in milliseconds.
    pub timeout: Option<u32>,
    /// CSS class for the renderer.
    pub css_class: Option<String>,
    /// History-skip flag.
    pub skip_history: Option<bool>,
    /// Block flag.
    pub block: Option<bool>,
    /// Urgency override.
    pub urgency: Option<Urgency>,
    /// Indices of the rules that matched, in evaluation order.
    pub matched: Vec<usize>,
}

impl ActionSet {
    /// Fold one matching rule's actions into the set.
    pub fn apply(&mut self, index: usize, patch: &RuleActions) {
        self.matched.push(index);
        fill(&mut self.timeout, patch.timeout);
        fill(&mut self.css_class, patch.css_class.clone());
        fill(&mut self.skip_history, patch.skip_history);
        fill(&mut self.block, patch.block);
        fill(&mut self.urgency, patch.urgency);
    }

    /// Whether closure must not be archived.
    pub fn skips_history(&self) -> bool {
        self.skip_history.unwrap_or(false)
    }

    /// Whether the candidate must never become active.
    pub fn blocks(&self) -> bool {
        self.block.unwrap_or(false)
    }

    /// Whether no rule matched.
    pub fn is_empty(&self) -> bool {
        self.matched.is_empty()
    }
}

fn fill<T>(slot: &mut Option<T>, value: Option<T>) {
    if slot.is_none() {
        *slot = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_rule_owns_a_category() {
        let mut set = ActionSet::default();
        set.apply(
            0,
            &RuleActions {
                timeout: Some(3000),
                ..Default::default()
            },
        );
        set.apply(
            1,
            &RuleActions {
                timeout: Some(100),
                css_class: Some("muted".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(set.timeout, Some(3000));
        assert_eq!(set.css_class.as_deref(), Some("muted"));
        assert_eq!(set.matched, vec![0, 1]);
    }

    #[test]
    fn test_explicit_false_closes_the_category() {
        let mut set = ActionSet::default();
        set.apply(
            0,
            &RuleActions {
                block: Some(false),
                ..Default::default()
            },
        );
        set.apply(
            1,
            &RuleActions {
                block: Some(true),
                skip_history: Some(true),
                ..Default::default()
            },
        );
        assert!(!set.blocks());
        assert!(set.skips_history());
    }

    #[test]
    fn test_empty_set() {
        let set = ActionSet::default();
        assert!(set.is_empty());
        assert!(!set.blocks());
        assert!(!set.skips_history());
    }
}
