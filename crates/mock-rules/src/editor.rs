//! Matcher row editors.
//!
//! Three editors build up a rule's ordered matcher list:
//!
//! - [`InitialMatcherSelector`] picks the rule's primary trigger.
//! - [`ExistingMatcherRow`] edits or deletes an already-committed matcher.
//! - [`NewMatcherRow`] drafts, validates and commits an additional matcher.
//!
//! Editors never touch the store; they hand finished matchers back to the
//! caller, which applies them through the page controller.

use crate::error::FormError;
use crate::form::{configure, input_hint, render_input};
use crate::matcher::{Matcher, MatcherKind};
use crate::registry::{additional_matcher_kinds, describable, initial_matcher_kinds};
use crate::rule::initial_matcher;

/// One entry in a matcher kind selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorOption {
    /// The rule has no matcher yet and so never matches.
    Never,
    Kind {
        kind: MatcherKind,
        description: &'static str,
    },
}

impl SelectorOption {
    pub fn label(&self) -> &'static str {
        match self {
            SelectorOption::Never => "Never",
            SelectorOption::Kind { description, .. } => description,
        }
    }

    pub fn kind(&self) -> Option<MatcherKind> {
        match self {
            SelectorOption::Never => None,
            SelectorOption::Kind { kind, .. } => Some(*kind),
        }
    }
}

// ============================================================================
// Initial matcher
// ============================================================================

/// Single-choice selector for a rule's first matcher.
#[derive(Debug, Clone, PartialEq)]
pub struct InitialMatcherSelector {
    options: Vec<SelectorOption>,
    selected: Option<MatcherKind>,
}

impl InitialMatcherSelector {
    /// Selector state for a rule's matcher list. A list that starts with
    /// a narrowing matcher has no initial matcher yet and shows "Never".
    pub fn for_rule(matchers: &[Matcher]) -> Self {
        let selected = initial_matcher(matchers).map(Matcher::kind);
        let mut options = Vec::new();
        if selected.is_none() {
            options.push(SelectorOption::Never);
        }
        options.extend(
            describable(initial_matcher_kinds())
                .into_iter()
                .map(|(kind, description)| SelectorOption::Kind { kind, description }),
        );
        Self { options, selected }
    }

    pub fn options(&self) -> &[SelectorOption] {
        &self.options
    }

    pub fn selected(&self) -> Option<MatcherKind> {
        self.selected
    }

    /// Position of the current selection in [`options`](Self::options).
    pub fn selected_index(&self) -> usize {
        self.options
            .iter()
            .position(|option| option.kind() == self.selected)
            .unwrap_or(0)
    }

    /// Select a kind, returning its default-configured matcher.
    ///
    /// Returns `None` for kinds this selector does not offer.
    pub fn select(&mut self, kind: MatcherKind) -> Option<Matcher> {
        let offered = self
            .options
            .iter()
            .any(|option| option.kind() == Some(kind));
        if !offered {
            return None;
        }
        self.selected = Some(kind);
        Some(Matcher::default_for(kind))
    }
}

// ============================================================================
// Existing matcher row
// ============================================================================

/// Inline editor for a committed matcher.
#[derive(Debug, Clone, PartialEq)]
pub struct ExistingMatcherRow {
    index: usize,
    matcher: Matcher,
    input: String,
    error: Option<FormError>,
}

impl ExistingMatcherRow {
    pub fn new(index: usize, matcher: Matcher) -> Self {
        let input = render_input(&matcher);
        Self {
            index,
            matcher,
            input,
            error: None,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn error(&self) -> Option<&FormError> {
        self.error.as_ref()
    }

    pub fn description(&self) -> String {
        self.matcher.explain()
    }

    /// Replace the edited text.
    ///
    /// On valid input returns the matchers that should replace this one,
    /// which may be more than one. Invalid input is kept for display and
    /// nothing is returned.
    pub fn apply_edit(&mut self, input: impl Into<String>) -> Option<Vec<Matcher>> {
        self.input = input.into();
        match configure(self.matcher.kind(), &self.input) {
            Ok(replacements) if !replacements.is_empty() => {
                self.error = None;
                Some(replacements)
            }
            Ok(_) => {
                self.error = Some(FormError::Empty);
                None
            }
            Err(e) => {
                self.error = Some(e);
                None
            }
        }
    }
}

// ============================================================================
// New matcher row
// ============================================================================

/// Observable state of a [`NewMatcherRow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewMatcherState {
    NoKindSelected,
    KindSelected,
    ConfiguringValid,
    ConfiguringInvalid,
}

/// Which control of the new matcher row has input focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowFocus {
    #[default]
    KindSelector,
    Input,
}

/// Draft editor for an additional matcher.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewMatcherRow {
    kind: Option<MatcherKind>,
    input: String,
    draft: Vec<Matcher>,
    invalid: Option<FormError>,
    focus: RowFocus,
}

impl NewMatcherRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for the kind selector.
    pub fn options() -> Vec<SelectorOption> {
        describable(additional_matcher_kinds())
            .into_iter()
            .map(|(kind, description)| SelectorOption::Kind { kind, description })
            .collect()
    }

    pub fn state(&self) -> NewMatcherState {
        match (self.kind, self.invalid.is_some(), self.draft.is_empty()) {
            (None, _, _) => NewMatcherState::NoKindSelected,
            (Some(_), true, _) => NewMatcherState::ConfiguringInvalid,
            (Some(_), false, true) => NewMatcherState::KindSelected,
            (Some(_), false, false) => NewMatcherState::ConfiguringValid,
        }
    }

    pub fn kind(&self) -> Option<MatcherKind> {
        self.kind
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn hint(&self) -> &'static str {
        self.kind.map(input_hint).unwrap_or("")
    }

    pub fn draft(&self) -> &[Matcher] {
        &self.draft
    }

    pub fn error(&self) -> Option<&FormError> {
        self.invalid.as_ref()
    }

    pub fn focus(&self) -> RowFocus {
        self.focus
    }

    /// Pick the kind of matcher to draft. Resets any draft in progress.
    pub fn select_kind(&mut self, kind: MatcherKind) {
        self.kind = Some(kind);
        self.input.clear();
        self.draft.clear();
        self.invalid = None;
        self.focus = RowFocus::Input;
    }

    /// Replace the draft with freshly configured matchers.
    pub fn update_draft(&mut self, matchers: Vec<Matcher>) {
        self.draft = matchers;
        self.invalid = None;
    }

    /// Record that the configuration form holds invalid input.
    pub fn mark_invalid(&mut self, error: FormError) {
        self.invalid = Some(error);
    }

    /// Feed new form text through the kind's configuration form.
    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
        let Some(kind) = self.kind else {
            return;
        };
        match configure(kind, &self.input) {
            Ok(matchers) => self.update_draft(matchers),
            Err(e) => self.mark_invalid(e),
        }
    }

    pub fn can_commit(&self) -> bool {
        self.state() == NewMatcherState::ConfiguringValid
    }

    /// Hand every drafted matcher to `on_add`, in order, then reset.
    ///
    /// Returns the number of matchers added; zero when there was nothing
    /// valid to commit, in which case the row is left untouched.
    pub fn commit(&mut self, mut on_add: impl FnMut(Matcher)) -> usize {
        if !self.can_commit() {
            return 0;
        }
        let draft = std::mem::take(&mut self.draft);
        let added = draft.len();
        for matcher in draft {
            on_add(matcher);
        }
        *self = Self::default();
        added
    }

    /// Throw away the draft without committing.
    pub fn discard(&mut self) {
        *self = Self::default();
    }
}
