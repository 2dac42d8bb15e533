//! The mock page controller.
//!
//! [`MockPage`] owns the transient UI state of the rule list (which rules
//! are collapsed, which rule is being dragged, where focus should land after
//! adding a rule) and turns page actions into store calls.
//!
//! The collapsed-state map is reconciled by a standing subscription to the
//! store's id-change events, so it follows every change to the rule list
//! whatever caused it: adding, deleting, importing, resetting or reordering.

use crate::editor::{InitialMatcherSelector, NewMatcherRow};
use crate::error::{FormError, Result, RulesError};
use crate::events::StoreEvent;
use crate::handler::Handler;
use crate::matcher::{Matcher, MatcherKind};
use crate::rule::{MockRule, RuleId};
use crate::ruleset::{self, RuleSetExport};
use crate::store::RuleStore;
use chrono::{DateTime, Local};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Default delay between adding a rule and focusing it.
pub const DEFAULT_FOCUS_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageConfig {
    /// How long after `add_rule` the new rule's selector should get focus.
    pub focus_delay: Duration,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            focus_delay: DEFAULT_FOCUS_DELAY,
        }
    }
}

/// Per-rule collapsed flags, one entry per known rule id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollapsedState {
    collapsed: HashMap<RuleId, bool>,
}

impl CollapsedState {
    /// Add collapsed entries for new ids and drop entries for vanished ones.
    pub fn reconcile(&mut self, ids: &[RuleId]) {
        self.collapsed.retain(|id, _| ids.contains(id));
        for id in ids {
            self.collapsed.entry(*id).or_insert(true);
        }
    }

    pub fn is_collapsed(&self, id: &RuleId) -> Option<bool> {
        self.collapsed.get(id).copied()
    }

    pub fn set(&mut self, id: RuleId, collapsed: bool) {
        self.collapsed.insert(id, collapsed);
    }

    /// Flip one flag, returning its new value.
    pub fn toggle(&mut self, id: &RuleId) -> Option<bool> {
        let flag = self.collapsed.get_mut(id)?;
        *flag = !*flag;
        Some(*flag)
    }

    pub fn collapse_all(&mut self) {
        self.collapsed.values_mut().for_each(|flag| *flag = true);
    }

    pub fn ids(&self) -> impl Iterator<Item = &RuleId> {
        self.collapsed.keys()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingFocus {
    rule: RuleId,
    due: Instant,
}

pub struct MockPage<S: RuleStore> {
    store: S,
    collapsed: Rc<RefCell<CollapsedState>>,
    moving: Option<usize>,
    pending_focus: Option<PendingFocus>,
    config: PageConfig,
}

impl<S: RuleStore> MockPage<S> {
    pub fn new(mut store: S, config: PageConfig) -> Self {
        let collapsed = Rc::new(RefCell::new(CollapsedState::default()));
        collapsed.borrow_mut().reconcile(&store.draft_ids());

        let reaction = Rc::clone(&collapsed);
        store.subscribe(Box::new(move |event: &StoreEvent| {
            if let StoreEvent::DraftIdsChanged(ids) = event {
                reaction.borrow_mut().reconcile(ids);
            }
        }));

        Self {
            store,
            collapsed,
            moving: None,
            pending_focus: None,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    pub fn rules(&self) -> &[MockRule] {
        self.store.draft_rules()
    }

    pub fn rule(&self, id: RuleId) -> Option<&MockRule> {
        self.rules().iter().find(|rule| rule.id == id)
    }

    /// Draft index of a rule.
    pub fn rule_index(&self, id: RuleId) -> Result<usize> {
        self.rules()
            .iter()
            .position(|rule| rule.id == id)
            .ok_or_else(|| {
                warn!(rule = %id, "rule not found");
                RulesError::RuleNotFound(id)
            })
    }

    /// Collapsed flag of a rule; unknown ids read as collapsed.
    pub fn is_collapsed(&self, id: RuleId) -> bool {
        self.collapsed.borrow().is_collapsed(&id).unwrap_or(true)
    }

    /// Snapshot of the collapsed-state map.
    pub fn collapsed_state(&self) -> CollapsedState {
        self.collapsed.borrow().clone()
    }

    pub fn moving_index(&self) -> Option<usize> {
        self.moving
    }

    pub fn are_some_rules_unsaved(&self) -> bool {
        self.store.are_some_rules_unsaved()
    }

    pub fn are_some_rules_non_default(&self) -> bool {
        self.store.are_some_rules_non_default()
    }

    /// Whether a draft rule differs from its active copy, or has none.
    pub fn is_rule_unsaved(&self, id: RuleId) -> bool {
        let draft = self.rule(id);
        let active = self.store.active_rules().iter().find(|rule| rule.id == id);
        match (draft, active) {
            (Some(draft), Some(active)) => draft != active,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    // ========================================================================
    // Rule list operations
    // ========================================================================

    /// Add an empty rule at the top of the list, expanded.
    ///
    /// Focus moves to the new rule once [`take_due_focus`](Self::take_due_focus)
    /// is polled after the configured delay.
    pub fn add_rule(&mut self, now: Instant) -> RuleId {
        let rule = MockRule::new();
        let id = rule.id;
        self.collapsed.borrow_mut().set(id, false);
        self.store.insert_draft_rule(0, rule);
        self.pending_focus = Some(PendingFocus {
            rule: id,
            due: now + self.config.focus_delay,
        });
        debug!(rule = %id, "added rule");
        id
    }

    /// Index of the rule that should receive focus, once the delay after
    /// `add_rule` has elapsed. A rule that vanished in the meantime is
    /// silently skipped.
    pub fn take_due_focus(&mut self, now: Instant) -> Option<usize> {
        let pending = self.pending_focus?;
        if now < pending.due {
            return None;
        }
        self.pending_focus = None;
        let index = self.rules().iter().position(|rule| rule.id == pending.rule);
        if index.is_none() {
            debug!(rule = %pending.rule, "focus target no longer exists");
        }
        index
    }

    pub fn save_rule(&mut self, id: RuleId) -> Result<()> {
        let index = self.rule_index(id)?;
        self.store.save_rule(index);
        self.collapsed.borrow_mut().set(id, true);
        info!(rule = %id, "saved rule");
        Ok(())
    }

    pub fn reset_rule(&mut self, id: RuleId) -> Result<()> {
        let index = self.rule_index(id)?;
        self.store.reset_rule(index);
        debug!(rule = %id, "reset rule");
        Ok(())
    }

    pub fn save_all(&mut self) {
        self.store.save_rules();
        self.collapsed.borrow_mut().collapse_all();
        info!(rules = self.rules().len(), "saved all rules");
    }

    pub fn reset_to_defaults(&mut self) {
        self.store.reset_rules_to_default();
        self.collapsed.borrow_mut().collapse_all();
        info!("reset rules to defaults");
    }

    pub fn reset_rule_drafts(&mut self) {
        self.store.reset_rule_drafts();
        self.collapsed.borrow_mut().collapse_all();
        info!("discarded unsaved rule changes");
    }

    pub fn delete_rule(&mut self, id: RuleId) -> Result<MockRule> {
        let index = self.rule_index(id)?;
        let removed = self
            .store
            .remove_draft_rule(index)
            .ok_or(RulesError::RuleNotFound(id))?;
        debug!(rule = %id, "deleted rule");
        Ok(removed)
    }

    /// Flip a rule between collapsed and expanded, returning the new state.
    pub fn toggle_rule_collapsed(&mut self, id: RuleId) -> Result<bool> {
        self.collapsed
            .borrow_mut()
            .toggle(&id)
            .ok_or(RulesError::RuleNotFound(id))
    }

    pub fn set_rule_collapsed(&mut self, id: RuleId, collapsed: bool) -> Result<()> {
        self.rule_index(id)?;
        self.collapsed.borrow_mut().set(id, collapsed);
        Ok(())
    }

    /// Record that the rule at `index` has been picked up.
    pub fn start_moving_rule(&mut self, index: usize) {
        self.moving = Some(index);
    }

    pub fn cancel_moving_rule(&mut self) {
        self.moving = None;
    }

    /// Drop a dragged rule: remove it from `old_index`, reinsert at `new_index`.
    pub fn move_rule(&mut self, old_index: usize, new_index: usize) -> Result<()> {
        let len = self.rules().len();
        self.moving = None;
        if old_index >= len || new_index >= len {
            return Err(RulesError::InvalidMove {
                from: old_index,
                to: new_index,
                len,
            });
        }
        if old_index != new_index {
            self.store.move_draft_rule(old_index, new_index);
            debug!(from = old_index, to = new_index, "moved rule");
        }
        Ok(())
    }

    /// Replace the draft rules with a serialized rule set.
    pub fn import_rules(&mut self, content: &str) -> Result<usize> {
        let rules = ruleset::parse_rules(content)?;
        let count = rules.len();
        self.store.load_saved_rules(rules);
        info!(rules = count, "imported rules");
        Ok(count)
    }

    /// Replace the draft rules with a rule-set file; see
    /// [`ruleset::read_rules_file`] for `mime`.
    pub fn import_rules_file(&mut self, path: &Path, mime: Option<&str>) -> Result<usize> {
        let rules = ruleset::read_rules_file(path, mime)?;
        let count = rules.len();
        self.store.load_saved_rules(rules);
        info!(rules = count, path = %path.display(), "imported rules");
        Ok(count)
    }

    /// Serialize the draft rules, named for the given local time.
    pub fn export_rules(&self, at: DateTime<Local>) -> Result<RuleSetExport> {
        ruleset::export_rules(self.rules(), &at)
    }

    // ========================================================================
    // Matcher and handler editing
    // ========================================================================

    fn update_rule(&mut self, id: RuleId, mut update: impl FnMut(&mut MockRule)) -> Result<()> {
        let index = self.rule_index(id)?;
        self.store
            .update_draft_rule(index, &mut |rule: &mut MockRule| update(rule));
        Ok(())
    }

    fn matcher_count(&self, id: RuleId) -> Result<usize> {
        let index = self.rule_index(id)?;
        Ok(self.rules()[index].matchers.len())
    }

    /// Set a rule's primary matcher from the initial matcher selector.
    ///
    /// Replaces the current initial matcher, or goes in front of the list
    /// when the rule starts with a narrowing matcher.
    pub fn set_initial_matcher(&mut self, id: RuleId, kind: MatcherKind) -> Result<()> {
        let index = self.rule_index(id)?;
        let rule = &self.rules()[index];
        let replaces_first = rule.initial_matcher().is_some();
        let matcher = InitialMatcherSelector::for_rule(&rule.matchers)
            .select(kind)
            .ok_or(RulesError::InvalidMatcherConfig(FormError::NotConfigurable))?;
        self.update_rule(id, |rule| {
            if replaces_first {
                rule.matchers[0] = matcher.clone();
            } else {
                rule.matchers.insert(0, matcher.clone());
            }
        })
    }

    pub fn add_matcher(&mut self, id: RuleId, matcher: Matcher) -> Result<()> {
        self.update_rule(id, |rule| rule.matchers.push(matcher.clone()))
    }

    /// Commit a new matcher row into a rule, returning how many matchers
    /// were added.
    pub fn commit_new_matcher(&mut self, id: RuleId, row: &mut NewMatcherRow) -> Result<usize> {
        self.rule_index(id)?;
        let mut added = Vec::new();
        let count = row.commit(|matcher| added.push(matcher));
        if count > 0 {
            self.update_rule(id, |rule| rule.matchers.extend(added.iter().cloned()))?;
        }
        Ok(count)
    }

    /// Replace the matcher at `index` with zero or more matchers.
    pub fn replace_matcher(
        &mut self,
        id: RuleId,
        index: usize,
        replacements: Vec<Matcher>,
    ) -> Result<()> {
        if index >= self.matcher_count(id)? {
            return Err(RulesError::MatcherIndexOutOfRange { rule: id, index });
        }
        self.update_rule(id, |rule| {
            rule.matchers.splice(index..=index, replacements.iter().cloned());
        })
    }

    pub fn delete_matcher(&mut self, id: RuleId, index: usize) -> Result<Matcher> {
        if index >= self.matcher_count(id)? {
            return Err(RulesError::MatcherIndexOutOfRange { rule: id, index });
        }
        let mut removed = None;
        self.update_rule(id, |rule| removed = Some(rule.matchers.remove(index)))?;
        removed.ok_or(RulesError::MatcherIndexOutOfRange { rule: id, index })
    }

    pub fn set_handler(&mut self, id: RuleId, handler: Handler) -> Result<()> {
        self.update_rule(id, |rule| rule.handler = handler.clone())
    }

    pub fn set_title(&mut self, id: RuleId, title: Option<String>) -> Result<()> {
        self.update_rule(id, |rule| rule.title = title.clone())
    }
}
