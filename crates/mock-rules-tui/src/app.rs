//! Application state and logic for the TUI

use crate::components::{FieldAction, TextField};
use crate::event::ctrl_key;
use crate::theme::Theme;
use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent};
use mock_rules::form::{
    configure_handler, handler_input_hint, handler_takes_input, render_handler_input,
};
use mock_rules::ruleset::{self, write_export};
use mock_rules::{
    lint_ruleset_json, ExistingMatcherRow, Handler, HandlerKind, InitialMatcherSelector,
    LintReport, MemoryRuleStore, MockPage, MockRule, NewMatcherRow, PageConfig, RowFocus,
    RuleId,
};
use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// How long a status message stays in the status bar
const STATUS_TTL: Duration = Duration::from_secs(5);

/// Runtime settings, filled from the command line
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub refresh_interval: Duration,
    /// Folder offered by the import and export prompts
    pub export_dir: PathBuf,
    pub page: PageConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_millis(250),
            export_dir: dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")),
            page: PageConfig::default(),
        }
    }
}

/// Current view/screen
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    RuleList,
    RuleEditor { rule: RuleId },
}

/// One row of the rule editor, top to bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorRow {
    Title,
    InitialMatcher,
    /// An additional matcher, by its index in the rule's matcher list
    Matcher(usize),
    NewMatcher,
    Handler,
}

/// Overlay (modal) state
#[derive(Debug, Clone, PartialEq)]
pub enum Overlay {
    None,
    Help,
    Confirm {
        message: String,
        action: PendingAction,
    },
    Error {
        message: String,
    },
    Success {
        message: String,
    },
    FilePathInput {
        prompt: String,
        action: FileAction,
    },
    Picker {
        title: String,
        target: PickerTarget,
        options: Vec<String>,
        selected: usize,
    },
    TextInput {
        prompt: String,
        hint: String,
        action: TextAction,
        error: Option<String>,
    },
    ImportPreview {
        path: PathBuf,
        content: String,
        report: LintReport,
    },
    Export {
        filename: String,
        content: String,
    },
}

/// Actions that need confirmation
#[derive(Debug, Clone, PartialEq)]
pub enum PendingAction {
    DiscardDrafts,
    ResetToDefaults,
    Quit,
}

/// File-related actions
#[derive(Debug, Clone, PartialEq)]
pub enum FileAction {
    Import,
    Export,
}

/// What a picker selection applies to
#[derive(Debug, Clone, PartialEq)]
pub enum PickerTarget {
    InitialMatcher { rule: RuleId },
    NewMatcher { rule: RuleId },
    Handler { rule: RuleId },
}

/// What a submitted text input applies to
#[derive(Debug, Clone, PartialEq)]
pub enum TextAction {
    Title { rule: RuleId },
    EditMatcher { rule: RuleId, row: ExistingMatcherRow },
    NewMatcher { rule: RuleId },
    Handler { rule: RuleId, kind: HandlerKind },
}

/// Status message level
#[derive(Debug, Clone, PartialEq)]
pub enum StatusLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Main application state
pub struct App {
    // Navigation
    pub view: View,
    pub overlay: Overlay,

    // Data
    pub page: MockPage<MemoryRuleStore>,

    // UI State
    pub rule_list_state: ListState,
    pub editor_selected: usize,
    pub new_matcher: NewMatcherRow,
    pub field: TextField,
    pub status_message: Option<(String, StatusLevel, Instant)>,
    pub help_scroll: u16,
    pub help_max_scroll: u16,
    pub export_scroll_offset: u16,
    pub theme: Theme,
    /// Last known terminal size
    pub screen: Rect,

    // Runtime
    pub config: AppConfig,
    pub should_quit: bool,
}

impl App {
    /// Create an app editing a store seeded with `defaults`
    pub fn new(config: AppConfig, defaults: Vec<MockRule>) -> Self {
        let page = MockPage::new(MemoryRuleStore::new(defaults), config.page.clone());
        let mut rule_list_state = ListState::default();
        if !page.rules().is_empty() {
            rule_list_state.select(Some(0));
        }

        Self {
            view: View::RuleList,
            overlay: Overlay::None,
            page,
            rule_list_state,
            editor_selected: 0,
            new_matcher: NewMatcherRow::new(),
            field: TextField::default(),
            status_message: None,
            help_scroll: 0,
            help_max_scroll: 0,
            export_scroll_offset: 0,
            theme: Theme::default(),
            screen: Rect::new(0, 0, 80, 24),
            config,
            should_quit: false,
        }
    }

    /// Track the terminal size so scrolling stops at the last visible line
    pub fn on_resize(&mut self, width: u16, height: u16) {
        self.screen = Rect::new(0, 0, width, height);
        self.help_max_scroll = crate::ui::help_max_scroll(self.screen);
        self.help_scroll = self.help_scroll.min(self.help_max_scroll);
    }

    /// Set a status message
    pub fn set_status(&mut self, message: String, level: StatusLevel) {
        self.status_message = Some((message, level, Instant::now()));
    }

    /// Clear status if expired
    pub fn clear_expired_status(&mut self) {
        if let Some((_, _, time)) = &self.status_message {
            if time.elapsed() > STATUS_TTL {
                self.status_message = None;
            }
        }
    }

    /// Periodic work: deferred focus after adding a rule, status expiry
    pub fn on_tick(&mut self, now: Instant) {
        if let Some(index) = self.page.take_due_focus(now) {
            if let Some(id) = self.page.rules().get(index).map(|rule| rule.id) {
                self.rule_list_state.select(Some(index));
                if self.overlay == Overlay::None {
                    self.open_editor(id);
                    self.editor_selected = 1;
                }
            }
        }
        self.clear_expired_status();
    }

    // ========================================================================
    // Rule list
    // ========================================================================

    pub fn selected_index(&self) -> Option<usize> {
        self.rule_list_state
            .selected()
            .filter(|i| *i < self.page.rules().len())
    }

    pub fn selected_rule(&self) -> Option<&MockRule> {
        self.selected_index().and_then(|i| self.page.rules().get(i))
    }

    fn selected_rule_id(&self) -> Option<RuleId> {
        self.selected_rule().map(|rule| rule.id)
    }

    /// Keep the list selection inside the rule list
    fn clamp_selection(&mut self) {
        let len = self.page.rules().len();
        match self.rule_list_state.selected() {
            _ if len == 0 => self.rule_list_state.select(None),
            Some(i) if i >= len => self.rule_list_state.select(Some(len - 1)),
            None => self.rule_list_state.select(Some(0)),
            Some(_) => {}
        }
    }

    /// Move selection down, wrapping; while moving a rule this picks the drop target
    pub fn select_next(&mut self) {
        let len = self.page.rules().len();
        if len == 0 {
            return;
        }
        let next = match self.rule_list_state.selected() {
            Some(i) if self.page.moving_index().is_some() => (i + 1).min(len - 1),
            Some(i) => (i + 1) % len,
            None => 0,
        };
        self.rule_list_state.select(Some(next));
    }

    /// Move selection up, wrapping; while moving a rule this picks the drop target
    pub fn select_previous(&mut self) {
        let len = self.page.rules().len();
        if len == 0 {
            return;
        }
        let previous = match self.rule_list_state.selected() {
            Some(i) if self.page.moving_index().is_some() => i.saturating_sub(1),
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.rule_list_state.select(Some(previous));
    }

    pub fn add_rule(&mut self) {
        let id = self.page.add_rule(Instant::now());
        self.rule_list_state.select(Some(0));
        debug!(rule = %id, "rule added from list");
        self.set_status("Added a new rule".to_string(), StatusLevel::Info);
    }

    pub fn toggle_selected(&mut self) {
        if let Some(id) = self.selected_rule_id() {
            if let Err(e) = self.page.toggle_rule_collapsed(id) {
                self.set_status(e.to_string(), StatusLevel::Error);
            }
        }
    }

    pub fn save_selected(&mut self) {
        let Some(id) = self.selected_rule_id() else {
            return;
        };
        match self.page.save_rule(id) {
            Ok(()) => self.set_status("Rule saved".to_string(), StatusLevel::Success),
            Err(e) => self.set_status(e.to_string(), StatusLevel::Error),
        }
    }

    pub fn reset_selected(&mut self) {
        let Some(id) = self.selected_rule_id() else {
            return;
        };
        match self.page.reset_rule(id) {
            Ok(()) => {
                self.clamp_selection();
                self.set_status("Rule reset".to_string(), StatusLevel::Info);
            }
            Err(e) => self.set_status(e.to_string(), StatusLevel::Error),
        }
    }

    pub fn delete_selected(&mut self) {
        let Some(id) = self.selected_rule_id() else {
            return;
        };
        match self.page.delete_rule(id) {
            Ok(_) => {
                self.clamp_selection();
                self.set_status("Rule deleted".to_string(), StatusLevel::Info);
            }
            Err(e) => self.set_status(e.to_string(), StatusLevel::Error),
        }
    }

    pub fn save_all(&mut self) {
        self.page.save_all();
        self.set_status("All rules saved".to_string(), StatusLevel::Success);
    }

    pub fn confirm_discard_drafts(&mut self) {
        if !self.page.are_some_rules_unsaved() {
            self.set_status("No unsaved changes".to_string(), StatusLevel::Info);
            return;
        }
        self.overlay = Overlay::Confirm {
            message: "Discard all unsaved rule changes?".to_string(),
            action: PendingAction::DiscardDrafts,
        };
    }

    pub fn confirm_reset_to_defaults(&mut self) {
        self.overlay = Overlay::Confirm {
            message: "Reset all rules to the defaults?\nSaved rules will be lost.".to_string(),
            action: PendingAction::ResetToDefaults,
        };
    }

    pub fn request_quit(&mut self) {
        if self.page.are_some_rules_unsaved() {
            self.overlay = Overlay::Confirm {
                message: "There are unsaved rule changes. Quit anyway?".to_string(),
                action: PendingAction::Quit,
            };
        } else {
            self.should_quit = true;
        }
    }

    /// Execute a confirmed action
    pub fn execute_pending_action(&mut self, action: &PendingAction) {
        self.overlay = Overlay::None;
        match action {
            PendingAction::DiscardDrafts => {
                self.page.reset_rule_drafts();
                self.clamp_selection();
                self.set_status("Unsaved changes discarded".to_string(), StatusLevel::Info);
            }
            PendingAction::ResetToDefaults => {
                self.page.reset_to_defaults();
                self.clamp_selection();
                self.set_status("Rules reset to defaults".to_string(), StatusLevel::Info);
            }
            PendingAction::Quit => self.should_quit = true,
        }
    }

    // ========================================================================
    // Reordering
    // ========================================================================

    pub fn start_moving(&mut self) {
        if let Some(index) = self.selected_index() {
            self.page.start_moving_rule(index);
            self.set_status(
                "Moving rule: j/k to choose a position, Space/Enter to drop, Esc to cancel"
                    .to_string(),
                StatusLevel::Info,
            );
        }
    }

    pub fn drop_moving(&mut self) {
        let (Some(from), Some(to)) = (self.page.moving_index(), self.selected_index()) else {
            self.cancel_moving();
            return;
        };
        match self.page.move_rule(from, to) {
            Ok(()) => {
                self.rule_list_state.select(Some(to));
                self.status_message = None;
            }
            Err(e) => self.set_status(e.to_string(), StatusLevel::Error),
        }
    }

    pub fn cancel_moving(&mut self) {
        if let Some(from) = self.page.moving_index() {
            self.page.cancel_moving_rule();
            self.rule_list_state.select(Some(from));
            self.status_message = None;
        }
    }

    // ========================================================================
    // Rule editor
    // ========================================================================

    pub fn open_editor(&mut self, id: RuleId) {
        if let Err(e) = self.page.set_rule_collapsed(id, false) {
            self.set_status(e.to_string(), StatusLevel::Error);
            return;
        }
        self.view = View::RuleEditor { rule: id };
        self.editor_selected = 0;
        self.new_matcher.discard();
    }

    pub fn close_editor(&mut self) {
        if let View::RuleEditor { rule } = self.view {
            if let Ok(index) = self.page.rule_index(rule) {
                self.rule_list_state.select(Some(index));
            }
        }
        self.view = View::RuleList;
        self.new_matcher.discard();
        self.clamp_selection();
    }

    /// The rule open in the editor, if it still exists
    pub fn editor_rule(&self) -> Option<&MockRule> {
        match &self.view {
            View::RuleEditor { rule } => self.page.rule(*rule),
            View::RuleList => None,
        }
    }

    /// Editor rows for a rule
    pub fn editor_rows(rule: &MockRule) -> Vec<EditorRow> {
        let mut rows = vec![EditorRow::Title, EditorRow::InitialMatcher];
        let additional = rule.additional_matchers_start()..rule.matchers.len();
        rows.extend(additional.map(EditorRow::Matcher));
        rows.push(EditorRow::NewMatcher);
        rows.push(EditorRow::Handler);
        rows
    }

    fn selected_editor_row(&self) -> Option<(RuleId, EditorRow)> {
        let rule = self.editor_rule()?;
        let rows = Self::editor_rows(rule);
        let row = rows.get(self.editor_selected.min(rows.len() - 1)).copied()?;
        Some((rule.id, row))
    }

    fn editor_move(&mut self, down: bool) {
        let Some(rule) = self.editor_rule() else {
            return;
        };
        let last = Self::editor_rows(rule).len() - 1;
        self.editor_selected = if down {
            (self.editor_selected + 1).min(last)
        } else {
            self.editor_selected.saturating_sub(1)
        };
    }

    /// Enter on an editor row
    pub fn activate_editor_row(&mut self) {
        let Some((id, row)) = self.selected_editor_row() else {
            return;
        };
        match row {
            EditorRow::Title => self.edit_title(id),
            EditorRow::InitialMatcher => self.show_initial_matcher_picker(id),
            EditorRow::Matcher(index) => self.edit_matcher(id, index),
            EditorRow::NewMatcher => self.show_new_matcher_picker(id),
            EditorRow::Handler => self.show_handler_picker(id),
        }
    }

    pub fn delete_editor_row(&mut self) {
        let Some((id, EditorRow::Matcher(index))) = self.selected_editor_row() else {
            return;
        };
        match self.page.delete_matcher(id, index) {
            Ok(removed) => {
                self.editor_move(false);
                self.set_status(
                    format!("Removed matcher {}", removed.explain()),
                    StatusLevel::Info,
                );
            }
            Err(e) => self.set_status(e.to_string(), StatusLevel::Error),
        }
    }

    pub fn edit_title(&mut self, id: RuleId) {
        let title = self
            .page
            .rule(id)
            .and_then(|rule| rule.title.clone())
            .unwrap_or_default();
        self.field = TextField::new(title);
        self.overlay = Overlay::TextInput {
            prompt: "Rule title".to_string(),
            hint: "Leave empty to show the rule summary".to_string(),
            action: TextAction::Title { rule: id },
            error: None,
        };
    }

    fn edit_matcher(&mut self, id: RuleId, index: usize) {
        let Some(matcher) = self
            .page
            .rule(id)
            .and_then(|r| r.matchers.get(index))
            .cloned()
        else {
            return;
        };
        if mock_rules::describe_matcher_kind(matcher.kind()).is_none() {
            self.set_status(
                "This matcher cannot be edited here".to_string(),
                StatusLevel::Warning,
            );
            return;
        }
        let hint = mock_rules::form::input_hint(matcher.kind());
        let row = ExistingMatcherRow::new(index, matcher);
        self.field = TextField::new(row.input());
        self.overlay = Overlay::TextInput {
            prompt: format!("Edit matcher: {}", row.description()),
            hint: hint.to_string(),
            action: TextAction::EditMatcher { rule: id, row },
            error: None,
        };
    }

    fn show_initial_matcher_picker(&mut self, id: RuleId) {
        let Some(rule) = self.page.rule(id) else {
            return;
        };
        let selector = InitialMatcherSelector::for_rule(&rule.matchers);
        self.overlay = Overlay::Picker {
            title: "Match".to_string(),
            target: PickerTarget::InitialMatcher { rule: id },
            options: selector
                .options()
                .iter()
                .map(|o| o.label().to_string())
                .collect(),
            selected: selector.selected_index(),
        };
    }

    fn show_new_matcher_picker(&mut self, id: RuleId) {
        self.new_matcher.discard();
        self.overlay = Overlay::Picker {
            title: "Add another matcher".to_string(),
            target: PickerTarget::NewMatcher { rule: id },
            options: NewMatcherRow::options()
                .iter()
                .map(|o| o.label().to_string())
                .collect(),
            selected: 0,
        };
    }

    fn show_handler_picker(&mut self, id: RuleId) {
        let current = self
            .page
            .rule(id)
            .map(|rule| rule.handler.kind())
            .unwrap_or(HandlerKind::Passthrough);
        self.overlay = Overlay::Picker {
            title: "Then".to_string(),
            target: PickerTarget::Handler { rule: id },
            options: HandlerKind::ALL
                .iter()
                .map(|kind| kind.label().to_string())
                .collect(),
            selected: HandlerKind::ALL
                .iter()
                .position(|kind| *kind == current)
                .unwrap_or(0),
        };
    }

    /// Apply the chosen picker option
    pub fn apply_picker(&mut self, target: &PickerTarget, selected: usize) {
        self.overlay = Overlay::None;
        match target {
            PickerTarget::InitialMatcher { rule } => {
                let Some(current) = self.page.rule(*rule) else {
                    return;
                };
                let selector = InitialMatcherSelector::for_rule(&current.matchers);
                let Some(kind) = selector.options().get(selected).and_then(|o| o.kind()) else {
                    return;
                };
                if let Err(e) = self.page.set_initial_matcher(*rule, kind) {
                    self.set_status(e.to_string(), StatusLevel::Error);
                }
            }
            PickerTarget::NewMatcher { rule } => {
                let Some(kind) = NewMatcherRow::options()
                    .get(selected)
                    .and_then(|o| o.kind())
                else {
                    return;
                };
                self.new_matcher.select_kind(kind);
                self.field = TextField::default();
                self.overlay = Overlay::TextInput {
                    prompt: NewMatcherRow::options()[selected].label().to_string(),
                    hint: self.new_matcher.hint().to_string(),
                    action: TextAction::NewMatcher { rule: *rule },
                    error: None,
                };
            }
            PickerTarget::Handler { rule } => {
                let Some(kind) = HandlerKind::ALL.get(selected).copied() else {
                    return;
                };
                if !handler_takes_input(kind) {
                    if let Err(e) = self.page.set_handler(*rule, Handler::default_for(kind)) {
                        self.set_status(e.to_string(), StatusLevel::Error);
                    }
                    return;
                }
                let prefill = self
                    .page
                    .rule(*rule)
                    .filter(|r| r.handler.kind() == kind)
                    .map(|r| render_handler_input(&r.handler))
                    .unwrap_or_default();
                self.field = TextField::new(prefill);
                self.overlay = Overlay::TextInput {
                    prompt: kind.label().to_string(),
                    hint: handler_input_hint(kind).to_string(),
                    action: TextAction::Handler { rule: *rule, kind },
                    error: None,
                };
            }
        }
    }

    fn set_input_error(&mut self, message: Option<String>) {
        if let Overlay::TextInput { error, .. } = &mut self.overlay {
            *error = message;
        }
    }

    /// Live validation while typing
    fn on_text_changed(&mut self, action: &TextAction) {
        if let TextAction::NewMatcher { .. } = action {
            self.new_matcher.set_input(self.field.value());
            let error = self.new_matcher.error().map(|e| e.to_string());
            self.set_input_error(error);
        }
    }

    /// Apply a submitted text input; invalid input keeps the prompt open
    pub fn submit_text(&mut self, action: &TextAction) {
        let value = self.field.value().to_string();
        let result = match action {
            TextAction::Title { rule } => {
                let title = Some(value.trim().to_string()).filter(|t| !t.is_empty());
                self.page.set_title(*rule, title).map_err(|e| e.to_string())
            }
            TextAction::EditMatcher { rule, row } => {
                let mut row = row.clone();
                match row.apply_edit(value) {
                    Some(replacements) => self
                        .page
                        .replace_matcher(*rule, row.index(), replacements)
                        .map_err(|e| e.to_string()),
                    None => Err(row
                        .error()
                        .map(|e| e.to_string())
                        .unwrap_or_else(|| "Invalid value".to_string())),
                }
            }
            TextAction::NewMatcher { rule } => {
                self.new_matcher.set_input(value);
                match self.page.commit_new_matcher(*rule, &mut self.new_matcher) {
                    Ok(0) => Err(self
                        .new_matcher
                        .error()
                        .map(|e| e.to_string())
                        .unwrap_or_else(|| "Enter a value first".to_string())),
                    Ok(added) => {
                        self.editor_selected += added;
                        Ok(())
                    }
                    Err(e) => Err(e.to_string()),
                }
            }
            TextAction::Handler { rule, kind } => {
                let current = self
                    .page
                    .rule(*rule)
                    .map(|r| r.handler.clone())
                    .unwrap_or_default();
                configure_handler(*kind, &value, &current)
                    .map_err(|e| e.to_string())
                    .and_then(|handler| {
                        self.page
                            .set_handler(*rule, handler)
                            .map_err(|e| e.to_string())
                    })
            }
        };

        match result {
            Ok(()) => {
                self.overlay = Overlay::None;
                self.field.clear();
                // a committed row hands focus back to its kind selector
                if let TextAction::NewMatcher { rule } = action {
                    if self.new_matcher.focus() == RowFocus::KindSelector {
                        self.show_new_matcher_picker(*rule);
                    }
                }
            }
            Err(message) => self.set_input_error(Some(message)),
        }
    }

    fn cancel_text(&mut self, action: &TextAction) {
        if let TextAction::NewMatcher { .. } = action {
            self.new_matcher.discard();
        }
        self.overlay = Overlay::None;
        self.field.clear();
    }

    pub fn save_editor_rule(&mut self) {
        let View::RuleEditor { rule } = self.view else {
            return;
        };
        match self.page.save_rule(rule) {
            Ok(()) => {
                self.set_status("Rule saved".to_string(), StatusLevel::Success);
                self.close_editor();
            }
            Err(e) => self.set_status(e.to_string(), StatusLevel::Error),
        }
    }

    pub fn reset_editor_rule(&mut self) {
        let View::RuleEditor { rule } = self.view else {
            return;
        };
        match self.page.reset_rule(rule) {
            Ok(()) => {
                self.new_matcher.discard();
                if self.page.rule(rule).is_none() {
                    self.close_editor();
                }
                self.set_status("Rule reset".to_string(), StatusLevel::Info);
            }
            Err(e) => self.set_status(e.to_string(), StatusLevel::Error),
        }
    }

    // ========================================================================
    // Import / export
    // ========================================================================

    /// Expand tilde in path to home directory
    fn expand_path(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        } else if path == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
        PathBuf::from(path)
    }

    pub fn show_import_dialog(&mut self) {
        self.field = TextField::new(self.config.export_dir.to_string_lossy());
        self.overlay = Overlay::FilePathInput {
            prompt: "Import rules from file (.htkrules or .json)".to_string(),
            action: FileAction::Import,
        };
    }

    pub fn show_export_dialog(&mut self) {
        self.field = TextField::new(self.config.export_dir.to_string_lossy());
        self.overlay = Overlay::FilePathInput {
            prompt: "Export rules to folder".to_string(),
            action: FileAction::Export,
        };
    }

    /// Read and lint a rule file, then ask before replacing the drafts
    pub fn preview_import(&mut self, path: &str) {
        let path = Self::expand_path(path);
        if !ruleset::is_ruleset_path(&path) {
            self.overlay = Overlay::Error {
                message: format!("{} is not a .htkrules or .json file", path.display()),
            };
            return;
        }
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let report = lint_ruleset_json(&content);
                info!(path = %path.display(), summary = %report.summary(), "linted rule file");
                self.overlay = Overlay::ImportPreview {
                    path,
                    content,
                    report,
                };
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read rule file");
                self.overlay = Overlay::Error {
                    message: format!("Failed to read {}: {}", path.display(), e),
                };
            }
        }
    }

    pub fn import_content(&mut self, path: &Path, content: &str) {
        match self.page.import_rules(content) {
            Ok(count) => {
                self.view = View::RuleList;
                self.rule_list_state.select(if count > 0 { Some(0) } else { None });
                self.overlay = Overlay::Success {
                    message: format!(
                        "Imported {} rules from {}\nSave to make them active.",
                        count,
                        path.display()
                    ),
                };
            }
            Err(e) => {
                self.overlay = Overlay::Error {
                    message: e.to_string(),
                };
            }
        }
    }

    pub fn export_to_folder(&mut self, folder: &str) {
        let dir = Self::expand_path(folder);
        let result = self
            .page
            .export_rules(Local::now())
            .and_then(|export| write_export(&dir, &export));
        match result {
            Ok(path) => {
                self.overlay = Overlay::None;
                self.set_status(
                    format!("Exported rules to {}", path.display()),
                    StatusLevel::Success,
                );
            }
            Err(e) => {
                self.overlay = Overlay::Error {
                    message: e.to_string(),
                };
            }
        }
    }

    pub fn show_export_preview(&mut self) {
        match self.page.export_rules(Local::now()) {
            Ok(export) => {
                self.export_scroll_offset = 0;
                self.overlay = Overlay::Export {
                    filename: export.filename,
                    content: export.contents,
                };
            }
            Err(e) => self.set_status(e.to_string(), StatusLevel::Error),
        }
    }

    /// Copy content to clipboard
    pub fn copy_to_clipboard(&mut self, content: &str) {
        match arboard::Clipboard::new() {
            Ok(mut clipboard) => {
                if let Err(e) = clipboard.set_text(content.to_string()) {
                    self.set_status(format!("Failed to copy: {}", e), StatusLevel::Error);
                } else {
                    self.set_status("Copied to clipboard".to_string(), StatusLevel::Success);
                }
            }
            Err(e) => {
                self.set_status(
                    format!("Clipboard not available: {}", e),
                    StatusLevel::Error,
                );
            }
        }
    }

    /// Paste from clipboard, returning the text if successful
    fn paste_from_clipboard(&self) -> Option<String> {
        arboard::Clipboard::new()
            .ok()
            .and_then(|mut cb| cb.get_text().ok())
    }

    // ========================================================================
    // Key handling
    // ========================================================================

    /// Handle keyboard input
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        // Handle overlays first
        match &self.overlay.clone() {
            Overlay::Help => {
                match key.code {
                    KeyCode::Esc | KeyCode::Char('?') => {
                        self.overlay = Overlay::None;
                        self.help_scroll = 0;
                    }
                    KeyCode::Up | KeyCode::Char('k') => {
                        self.help_scroll = self.help_scroll.saturating_sub(1);
                    }
                    KeyCode::Down | KeyCode::Char('j') => {
                        if self.help_scroll < self.help_max_scroll {
                            self.help_scroll += 1;
                        }
                    }
                    KeyCode::PageUp => {
                        self.help_scroll = self.help_scroll.saturating_sub(10);
                    }
                    KeyCode::PageDown => {
                        self.help_scroll = (self.help_scroll + 10).min(self.help_max_scroll);
                    }
                    _ => {}
                }
                return;
            }
            Overlay::Confirm { action, .. } => {
                match key.code {
                    KeyCode::Enter | KeyCode::Char('y') => self.execute_pending_action(action),
                    KeyCode::Esc | KeyCode::Char('n') => self.overlay = Overlay::None,
                    _ => {}
                }
                return;
            }
            Overlay::Error { .. } => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
                    self.overlay = Overlay::None;
                }
                return;
            }
            Overlay::Success { .. } => {
                self.overlay = Overlay::None;
                return;
            }
            Overlay::FilePathInput { action, .. } => {
                self.handle_file_path_input(key, action);
                return;
            }
            Overlay::Picker {
                target,
                options,
                selected,
                ..
            } => {
                self.handle_picker_input(key, target, options.len(), *selected);
                return;
            }
            Overlay::TextInput { action, .. } => {
                self.handle_text_input(key, action);
                return;
            }
            Overlay::ImportPreview {
                path,
                content,
                report,
            } => {
                match key.code {
                    KeyCode::Enter if report.is_valid() => self.import_content(path, content),
                    KeyCode::Esc => self.overlay = Overlay::None,
                    _ => {}
                }
                return;
            }
            Overlay::Export { content, .. } => {
                self.handle_export_preview(key, content);
                return;
            }
            Overlay::None => {}
        }

        // Moving a rule captures the list keys
        if self.page.moving_index().is_some() {
            match key.code {
                KeyCode::Char('j') | KeyCode::Down => self.select_next(),
                KeyCode::Char('k') | KeyCode::Up => self.select_previous(),
                KeyCode::Char(' ') | KeyCode::Enter => self.drop_moving(),
                KeyCode::Esc => self.cancel_moving(),
                _ => {}
            }
            return;
        }

        // Global keys
        match key.code {
            KeyCode::Char('?') => {
                self.overlay = Overlay::Help;
                self.help_scroll = 0;
                self.help_max_scroll = crate::ui::help_max_scroll(self.screen);
                return;
            }
            KeyCode::Char('c') if ctrl_key(&key, 'c') => {
                self.request_quit();
                return;
            }
            _ => {}
        }

        // View-specific keys
        match self.view.clone() {
            View::RuleList => self.handle_rule_list_event(key),
            View::RuleEditor { .. } => self.handle_rule_editor_event(key),
        }
    }

    /// Insert bracketed-paste text into whichever input is open
    pub fn handle_paste(&mut self, text: &str) {
        match self.overlay.clone() {
            Overlay::TextInput { action, .. } => {
                self.field.insert_str(text);
                self.on_text_changed(&action);
            }
            Overlay::FilePathInput { .. } => self.field.insert_str(text),
            _ => {}
        }
    }

    fn handle_rule_list_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.select_previous(),
            KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => {
                if let Some(id) = self.selected_rule_id() {
                    self.open_editor(id);
                }
            }
            KeyCode::Char('o') | KeyCode::Tab => self.toggle_selected(),
            KeyCode::Char(' ') => self.start_moving(),
            KeyCode::Char('n') | KeyCode::Char('a') => self.add_rule(),
            KeyCode::Char('d') | KeyCode::Delete => self.delete_selected(),
            KeyCode::Char('s') => self.save_selected(),
            KeyCode::Char('S') => self.save_all(),
            KeyCode::Char('r') => self.reset_selected(),
            KeyCode::Char('R') => self.confirm_discard_drafts(),
            KeyCode::Char('D') => self.confirm_reset_to_defaults(),
            KeyCode::Char('i') => self.show_import_dialog(),
            KeyCode::Char('e') => self.show_export_dialog(),
            KeyCode::Char('x') => self.show_export_preview(),
            KeyCode::Char('q') | KeyCode::Esc => self.request_quit(),
            _ => {}
        }
    }

    fn handle_rule_editor_event(&mut self, key: KeyEvent) {
        if self.editor_rule().is_none() {
            self.close_editor();
            return;
        }
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.editor_move(true),
            KeyCode::Char('k') | KeyCode::Up => self.editor_move(false),
            KeyCode::Enter => self.activate_editor_row(),
            KeyCode::Char('d') | KeyCode::Delete => self.delete_editor_row(),
            KeyCode::Char('t') => {
                if let View::RuleEditor { rule } = self.view {
                    self.edit_title(rule);
                }
            }
            KeyCode::Char('s') => self.save_editor_rule(),
            KeyCode::Char('r') => self.reset_editor_rule(),
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('h') | KeyCode::Left => {
                self.close_editor()
            }
            _ => {}
        }
    }

    fn handle_picker_input(
        &mut self,
        key: KeyEvent,
        target: &PickerTarget,
        len: usize,
        selected: usize,
    ) {
        let moved = match key.code {
            KeyCode::Char('j') | KeyCode::Down => (selected + 1) % len.max(1),
            KeyCode::Char('k') | KeyCode::Up => (selected + len.max(1) - 1) % len.max(1),
            KeyCode::Home => 0,
            KeyCode::End => len.saturating_sub(1),
            KeyCode::Enter => {
                self.apply_picker(target, selected);
                return;
            }
            KeyCode::Esc => {
                self.overlay = Overlay::None;
                return;
            }
            _ => return,
        };
        if let Overlay::Picker { selected, .. } = &mut self.overlay {
            *selected = moved;
        }
    }

    fn handle_text_input(&mut self, key: KeyEvent, action: &TextAction) {
        match self.field.handle_key(key) {
            FieldAction::Submit => self.submit_text(action),
            FieldAction::Cancel => self.cancel_text(action),
            FieldAction::Changed => self.on_text_changed(action),
            FieldAction::PasteRequest => {
                if let Some(text) = self.paste_from_clipboard() {
                    self.field.insert_str(&text);
                    self.on_text_changed(action);
                }
            }
            FieldAction::None => {}
        }
    }

    fn handle_file_path_input(&mut self, key: KeyEvent, action: &FileAction) {
        match self.field.handle_key(key) {
            FieldAction::Cancel => self.overlay = Overlay::None,
            FieldAction::Submit => {
                let path = self.field.value().to_string();
                if path.is_empty() {
                    return;
                }
                match action {
                    FileAction::Import => self.preview_import(&path),
                    FileAction::Export => self.export_to_folder(&path),
                }
            }
            FieldAction::PasteRequest => {
                if let Some(text) = self.paste_from_clipboard() {
                    self.field.insert_str(&text);
                }
            }
            FieldAction::Changed | FieldAction::None => {}
        }
    }

    fn handle_export_preview(&mut self, key: KeyEvent, content: &str) {
        let max_scroll = content.lines().count().saturating_sub(10) as u16;
        match key.code {
            KeyCode::Esc => {
                self.overlay = Overlay::None;
                self.export_scroll_offset = 0;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.export_scroll_offset = self.export_scroll_offset.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.export_scroll_offset = (self.export_scroll_offset + 1).min(max_scroll);
            }
            KeyCode::PageUp => {
                self.export_scroll_offset = self.export_scroll_offset.saturating_sub(10);
            }
            KeyCode::PageDown => {
                self.export_scroll_offset = (self.export_scroll_offset + 10).min(max_scroll);
            }
            KeyCode::Char('c') => self.copy_to_clipboard(content),
            KeyCode::Char('s') => self.show_export_dialog(),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use mock_rules::{builtin_default_rules, HttpMethod, Matcher, MatcherKind};

    fn app_in(dir: &Path) -> App {
        let config = AppConfig {
            export_dir: dir.to_path_buf(),
            ..AppConfig::default()
        };
        App::new(config, builtin_default_rules())
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_new_rule_gets_focus_after_delay() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path());
        press(&mut app, KeyCode::Char('n'));

        assert_eq!(app.page.rules().len(), 2);
        assert_eq!(app.view, View::RuleList);

        app.on_tick(Instant::now() + Duration::from_secs(1));
        let id = app.page.rules()[0].id;
        assert_eq!(app.view, View::RuleEditor { rule: id });
        assert_eq!(
            App::editor_rows(&app.page.rules()[0])[app.editor_selected],
            EditorRow::InitialMatcher
        );
    }

    #[test]
    fn test_build_rule_in_editor() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path());
        press(&mut app, KeyCode::Char('n'));
        app.on_tick(Instant::now() + Duration::from_secs(1));

        // Never -> GET requests
        press(&mut app, KeyCode::Enter);
        assert!(matches!(app.overlay, Overlay::Picker { selected: 0, .. }));
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(
            app.page.rules()[0].matchers,
            vec![Matcher::Method {
                method: HttpMethod::Get
            }]
        );

        // New matcher row: path with a query adds two matchers
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "api");
        assert!(matches!(app.overlay, Overlay::TextInput { error: Some(_), .. }));
        press(&mut app, KeyCode::Home);
        type_text(&mut app, "/");
        press(&mut app, KeyCode::End);
        type_text(&mut app, "?page=2");
        press(&mut app, KeyCode::Enter);

        // committing hands focus back to the kind selector
        assert!(matches!(
            app.overlay,
            Overlay::Picker {
                target: PickerTarget::NewMatcher { .. },
                ..
            }
        ));
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.overlay, Overlay::None);

        let matchers = &app.page.rules()[0].matchers;
        assert_eq!(matchers.len(), 3);
        assert_eq!(matchers[1].kind(), MatcherKind::SimplePath);
        assert_eq!(matchers[2].kind(), MatcherKind::ExactQuery);
    }

    #[test]
    fn test_first_added_matcher_gets_its_own_row() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path());
        press(&mut app, KeyCode::Char('n'));
        app.on_tick(Instant::now() + Duration::from_secs(1));

        // skip the initial matcher and add a path straight away
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "/api");
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Esc);

        let rule = &app.page.rules()[0];
        assert_eq!(rule.matchers.len(), 1);
        assert_eq!(rule.matchers[0].kind(), MatcherKind::SimplePath);
        assert_eq!(
            App::editor_rows(rule),
            vec![
                EditorRow::Title,
                EditorRow::InitialMatcher,
                EditorRow::Matcher(0),
                EditorRow::NewMatcher,
                EditorRow::Handler,
            ]
        );
        assert_eq!(InitialMatcherSelector::for_rule(&rule.matchers).selected(), None);
        assert_eq!(app.editor_selected, 3);
    }

    #[test]
    fn test_help_scroll_stops_at_last_visible_line() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path());
        app.on_resize(100, 30);
        press(&mut app, KeyCode::Char('?'));
        let max = app.help_max_scroll;
        assert_eq!(max, crate::ui::help_max_scroll(Rect::new(0, 0, 100, 30)));

        for _ in 0..200 {
            press(&mut app, KeyCode::Down);
        }
        assert_eq!(app.help_scroll, max);
        press(&mut app, KeyCode::Up);
        assert_eq!(app.help_scroll, max.saturating_sub(1));

        // growing the terminal pulls the offset back in range
        app.on_resize(100, 200);
        assert_eq!(app.help_max_scroll, 0);
        assert_eq!(app.help_scroll, 0);
    }

    #[test]
    fn test_handler_form_validation_keeps_prompt_open() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path());
        let id = app.page.rules()[0].id;
        app.open_editor(id);
        app.show_handler_picker(id);

        // Passthrough -> Forward -> Fixed response
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "999");
        press(&mut app, KeyCode::Enter);
        assert!(matches!(app.overlay, Overlay::TextInput { error: Some(_), .. }));

        app.field = TextField::new("201 created");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.overlay, Overlay::None);
        assert_eq!(app.page.rules()[0].handler.kind(), HandlerKind::StaticResponse);
        assert!(app.page.is_rule_unsaved(id));
    }

    #[test]
    fn test_keyboard_reorder() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path());
        press(&mut app, KeyCode::Char('n'));
        let ids: Vec<_> = app.page.rules().iter().map(|r| r.id).collect();

        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.page.moving_index(), Some(0));
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char(' '));

        let moved: Vec<_> = app.page.rules().iter().map(|r| r.id).collect();
        assert_eq!(moved, vec![ids[1], ids[0]]);
        assert_eq!(app.page.moving_index(), None);
        assert_eq!(app.selected_index(), Some(1));
    }

    #[test]
    fn test_cancel_move_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path());
        press(&mut app, KeyCode::Char('n'));
        let before = app.page.rules().to_vec();

        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Esc);

        assert_eq!(app.page.rules(), before.as_slice());
        assert_eq!(app.selected_index(), Some(0));
    }

    #[test]
    fn test_export_then_import_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path());
        press(&mut app, KeyCode::Char('n'));
        let id = app.page.rules()[0].id;
        app.page.set_initial_matcher(id, MatcherKind::Wildcard).unwrap();
        let exported = app.page.rules().to_vec();

        press(&mut app, KeyCode::Char('e'));
        press(&mut app, KeyCode::Enter);
        let file = std::fs::read_dir(dir.path())
            .unwrap()
            .next()
            .unwrap()
            .unwrap()
            .path();
        assert_eq!(file.extension().unwrap(), "htkrules");

        app.execute_pending_action(&PendingAction::ResetToDefaults);
        assert_eq!(app.page.rules().len(), 1);

        press(&mut app, KeyCode::Char('i'));
        app.field = TextField::new(file.to_string_lossy());
        press(&mut app, KeyCode::Enter);
        assert!(matches!(app.overlay, Overlay::ImportPreview { .. }));
        press(&mut app, KeyCode::Enter);

        assert!(matches!(app.overlay, Overlay::Success { .. }));
        assert_eq!(app.page.rules(), exported.as_slice());
    }

    #[test]
    fn test_invalid_import_is_blocked() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, r#"{"not": "rules"}"#).unwrap();
        let mut app = app_in(dir.path());
        let before = app.page.rules().to_vec();

        app.preview_import(&path.to_string_lossy());
        assert!(matches!(
            &app.overlay,
            Overlay::ImportPreview { report, .. } if !report.is_valid()
        ));
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Esc);

        assert_eq!(app.overlay, Overlay::None);
        assert_eq!(app.page.rules(), before.as_slice());
    }

    #[test]
    fn test_quit_asks_when_unsaved() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path());
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);

        let mut app = app_in(dir.path());
        press(&mut app, KeyCode::Char('n'));
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit);
        assert!(matches!(
            app.overlay,
            Overlay::Confirm {
                action: PendingAction::Quit,
                ..
            }
        ));
        press(&mut app, KeyCode::Enter);
        assert!(app.should_quit);
    }

    #[test]
    fn test_reset_unsaved_rule_in_editor_returns_to_list() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path());
        press(&mut app, KeyCode::Char('n'));
        press(&mut app, KeyCode::Enter);
        assert!(matches!(app.view, View::RuleEditor { .. }));

        press(&mut app, KeyCode::Char('r'));
        assert_eq!(app.view, View::RuleList);
        assert_eq!(app.page.rules().len(), 1);
        assert_eq!(app.selected_index(), Some(0));
    }

    #[test]
    fn test_paste_goes_to_open_prompt_only() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(dir.path());

        app.handle_paste("ignored");
        assert_eq!(app.overlay, Overlay::None);

        press(&mut app, KeyCode::Char('i'));
        assert!(matches!(app.overlay, Overlay::FilePathInput { .. }));
        app.field.clear();
        app.handle_paste("/tmp/rules\n.json");
        assert_eq!(app.field.value(), "/tmp/rules.json");
    }
}
