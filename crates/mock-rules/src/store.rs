//! Rule storage: draft and active rule sets.
//!
//! [`RuleStore`] is the contract the page controller consumes. Editing only
//! ever touches the draft list; saving promotes drafts into the active list.
//! Every draft mutation publishes a [`StoreEvent`].

use crate::events::{EventBus, StoreEvent, Subscriber};
use crate::rule::{MockRule, RuleId};
use tracing::debug;

pub trait RuleStore {
    fn draft_rules(&self) -> &[MockRule];
    fn active_rules(&self) -> &[MockRule];

    fn insert_draft_rule(&mut self, index: usize, rule: MockRule);
    fn remove_draft_rule(&mut self, index: usize) -> Option<MockRule>;
    /// Move one draft rule. Both indexes must be in bounds.
    fn move_draft_rule(&mut self, from: usize, to: usize);
    fn update_draft_rule(&mut self, index: usize, update: &mut dyn FnMut(&mut MockRule));

    /// Promote one draft rule into the active set.
    fn save_rule(&mut self, index: usize);
    /// Revert one draft rule to its active copy, dropping it if it was never saved.
    fn reset_rule(&mut self, index: usize);
    fn save_rules(&mut self);
    fn reset_rules_to_default(&mut self);
    fn reset_rule_drafts(&mut self);
    /// Replace the draft rules with a loaded rule set.
    fn load_saved_rules(&mut self, rules: Vec<MockRule>);

    fn are_some_rules_unsaved(&self) -> bool;
    fn are_some_rules_non_default(&self) -> bool;

    fn subscribe(&mut self, subscriber: Subscriber<StoreEvent>);

    fn draft_ids(&self) -> Vec<RuleId> {
        self.draft_rules().iter().map(|rule| rule.id).collect()
    }
}

/// Process-local store.
#[derive(Debug)]
pub struct MemoryRuleStore {
    defaults: Vec<MockRule>,
    active: Vec<MockRule>,
    draft: Vec<MockRule>,
    events: EventBus<StoreEvent>,
}

impl MemoryRuleStore {
    /// A store whose draft and active sets both start as `defaults`.
    pub fn new(defaults: Vec<MockRule>) -> Self {
        Self {
            active: defaults.clone(),
            draft: defaults.clone(),
            defaults,
            events: EventBus::new(),
        }
    }

    pub fn defaults(&self) -> &[MockRule] {
        &self.defaults
    }

    /// Run a draft mutation and publish what changed.
    fn mutate_draft<T>(&mut self, mutation: impl FnOnce(&mut Vec<MockRule>) -> T) -> T {
        let before = self.draft_ids();
        let result = mutation(&mut self.draft);
        let after = self.draft_ids();
        if before != after {
            debug!(rules = after.len(), "draft rule ids changed");
            self.events.publish(&StoreEvent::DraftIdsChanged(after));
        }
        result
    }
}

impl RuleStore for MemoryRuleStore {
    fn draft_rules(&self) -> &[MockRule] {
        &self.draft
    }

    fn active_rules(&self) -> &[MockRule] {
        &self.active
    }

    fn insert_draft_rule(&mut self, index: usize, rule: MockRule) {
        self.mutate_draft(|draft| {
            let index = index.min(draft.len());
            draft.insert(index, rule);
        });
    }

    fn remove_draft_rule(&mut self, index: usize) -> Option<MockRule> {
        self.mutate_draft(|draft| (index < draft.len()).then(|| draft.remove(index)))
    }

    fn move_draft_rule(&mut self, from: usize, to: usize) {
        self.mutate_draft(|draft| {
            if from < draft.len() && to < draft.len() {
                let rule = draft.remove(from);
                draft.insert(to, rule);
            }
        });
    }

    fn update_draft_rule(&mut self, index: usize, update: &mut dyn FnMut(&mut MockRule)) {
        let Some(rule) = self.draft.get_mut(index) else {
            return;
        };
        update(rule);
        let id = rule.id;
        self.events.publish(&StoreEvent::DraftRuleUpdated(id));
    }

    fn save_rule(&mut self, index: usize) {
        let Some(rule) = self.draft.get(index).cloned() else {
            return;
        };
        match self.active.iter().position(|active| active.id == rule.id) {
            Some(position) => self.active[position] = rule,
            None => {
                let position = index.min(self.active.len());
                self.active.insert(position, rule);
            }
        }
        self.events.publish(&StoreEvent::RulesSaved);
    }

    fn reset_rule(&mut self, index: usize) {
        let Some(id) = self.draft.get(index).map(|rule| rule.id) else {
            return;
        };
        match self.active.iter().find(|active| active.id == id).cloned() {
            Some(saved) => {
                self.draft[index] = saved;
                self.events.publish(&StoreEvent::DraftRuleUpdated(id));
            }
            None => {
                self.mutate_draft(|draft| draft.remove(index));
            }
        }
    }

    fn save_rules(&mut self) {
        self.active = self.draft.clone();
        self.events.publish(&StoreEvent::RulesSaved);
    }

    fn reset_rules_to_default(&mut self) {
        let defaults = self.defaults.clone();
        self.active = defaults.clone();
        self.mutate_draft(|draft| *draft = defaults);
        self.events.publish(&StoreEvent::RulesSaved);
    }

    fn reset_rule_drafts(&mut self) {
        let active = self.active.clone();
        self.mutate_draft(|draft| *draft = active);
    }

    fn load_saved_rules(&mut self, rules: Vec<MockRule>) {
        self.mutate_draft(|draft| *draft = rules);
    }

    fn are_some_rules_unsaved(&self) -> bool {
        self.draft != self.active
    }

    fn are_some_rules_non_default(&self) -> bool {
        self.draft != self.defaults
    }

    fn subscribe(&mut self, subscriber: Subscriber<StoreEvent>) {
        self.events.subscribe(subscriber);
    }
}
