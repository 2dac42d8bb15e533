//! End-to-end flows through the mock page controller.

use mock_rules::ruleset::{read_rules_file, write_export};
use mock_rules::{
    builtin_default_rules, lint_ruleset_json, summarize_rule, HttpMethod, InitialMatcherSelector,
    Matcher, MatcherKind, MemoryRuleStore, MockPage, MockRule, NewMatcherRow, PageConfig, RuleId,
    RuleStore, SelectorOption,
};
use proptest::prelude::*;
use std::collections::HashSet;
use std::time::{Duration, Instant};

fn new_page() -> MockPage<MemoryRuleStore> {
    MockPage::new(
        MemoryRuleStore::new(builtin_default_rules()),
        PageConfig::default(),
    )
}

fn assert_collapsed_keys_match(page: &MockPage<MemoryRuleStore>) {
    let keys: HashSet<RuleId> = page.collapsed_state().ids().copied().collect();
    let ids: HashSet<RuleId> = page.rules().iter().map(|rule| rule.id).collect();
    assert_eq!(keys, ids);
}

#[test]
fn build_save_and_summarize_a_rule() {
    let mut page = new_page();
    let start = Instant::now();
    let id = page.add_rule(start);

    assert_eq!(page.take_due_focus(start + Duration::from_millis(100)), Some(0));

    page.set_initial_matcher(id, MatcherKind::Method(HttpMethod::Post))
        .unwrap();
    let mut row = NewMatcherRow::new();
    row.select_kind(MatcherKind::SimplePath);
    row.set_input("/orders?draft=true");
    assert_eq!(page.commit_new_matcher(id, &mut row).unwrap(), 2);

    let summary = summarize_rule(&page.rules()[0]);
    assert_eq!(
        summary.matchers,
        "POST requests for /orders, and with a query exactly matching `?draft=true`"
    );
    assert!(page.are_some_rules_unsaved());

    page.save_rule(id).unwrap();
    assert!(!page.are_some_rules_unsaved());
    assert!(page.are_some_rules_non_default());
    assert!(page.is_collapsed(id));
}

#[test]
fn export_to_disk_and_import_back() {
    let dir = tempfile::tempdir().unwrap();
    let mut page = new_page();
    let id = page.add_rule(Instant::now());
    page.add_matcher(
        id,
        Matcher::Host {
            host: "example.com".to_string(),
        },
    )
    .unwrap();
    let exported = page.rules().to_vec();

    let export = page.export_rules(chrono::Local::now()).unwrap();
    assert!(lint_ruleset_json(&export.contents).is_valid());
    let path = write_export(dir.path(), &export).unwrap();

    page.reset_to_defaults();
    assert_eq!(page.rules(), builtin_default_rules().as_slice());

    assert_eq!(page.import_rules_file(&path, None).unwrap(), exported.len());
    assert_eq!(page.rules(), exported.as_slice());
    assert_eq!(read_rules_file(&path, None).unwrap(), exported);
    assert_collapsed_keys_match(&page);
}

#[test]
fn imported_rule_without_initial_matcher_keeps_its_matchers() {
    let narrowing = vec![
        Matcher::SimplePath {
            path: "/orders".to_string(),
        },
        Matcher::ExactQuery {
            query: "?draft=true".to_string(),
        },
    ];
    let rules = vec![MockRule::new().with_matchers(narrowing.clone())];
    let content = mock_rules::ruleset::serialize_rules(&rules).unwrap();
    let mut page = new_page();
    page.import_rules(&content).unwrap();
    let rule = &page.rules()[0];
    let id = rule.id;

    assert!(rule.initial_matcher().is_none());
    assert_eq!(rule.additional_matchers_start(), 0);
    let selector = InitialMatcherSelector::for_rule(&rule.matchers);
    assert_eq!(
        selector.options()[selector.selected_index()],
        SelectorOption::Never
    );

    page.set_initial_matcher(id, MatcherKind::Method(HttpMethod::Delete))
        .unwrap();
    let matchers = &page.rules()[0].matchers;
    assert_eq!(matchers.len(), 3);
    assert_eq!(&matchers[1..], narrowing.as_slice());
    assert!(summarize_rule(&page.rules()[0])
        .matchers
        .starts_with("DELETE requests"));
}

#[test]
fn import_with_duplicate_ids_keeps_collapsed_map_in_step() {
    let twin = MockRule::new().with_matchers(vec![Matcher::Wildcard]);
    let rules = [twin.clone(), twin.clone(), MockRule::new()];
    let content = mock_rules::ruleset::serialize_rules(&rules).unwrap();
    let report = lint_ruleset_json(&content);
    assert!(report.is_valid());
    assert!(report.has_code("W001"));

    let mut page = new_page();
    page.import_rules(&content).unwrap();
    assert_eq!(page.rules().len(), 3);
    assert_collapsed_keys_match(&page);

    page.delete_rule(twin.id).unwrap();
    assert_eq!(page.rules().len(), 2);
    assert_collapsed_keys_match(&page);
}

#[test]
fn store_defaults_come_from_loaded_rules() {
    let rules = vec![MockRule::new().with_matchers(vec![Matcher::Wildcard])];
    let page = MockPage::new(MemoryRuleStore::new(rules.clone()), PageConfig::default());
    assert_eq!(page.store().defaults(), rules.as_slice());
    assert_eq!(page.store().active_rules(), rules.as_slice());
    assert!(!page.are_some_rules_non_default());
}

#[derive(Debug, Clone)]
enum Action {
    Add,
    Delete(usize),
    Move(usize, usize),
    Toggle(usize),
    Save(usize),
    Reset(usize),
    SaveAll,
    ResetDrafts,
    ResetDefaults,
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        3 => Just(Action::Add),
        2 => any::<usize>().prop_map(Action::Delete),
        2 => (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Action::Move(a, b)),
        1 => any::<usize>().prop_map(Action::Toggle),
        1 => any::<usize>().prop_map(Action::Save),
        1 => any::<usize>().prop_map(Action::Reset),
        1 => Just(Action::SaveAll),
        1 => Just(Action::ResetDrafts),
        1 => Just(Action::ResetDefaults),
    ]
}

proptest! {
    #[test]
    fn collapsed_keys_track_rule_ids(actions in prop::collection::vec(action(), 0..40)) {
        let mut page = new_page();
        let now = Instant::now();

        for action in actions {
            let len = page.rules().len();
            let id_at = |page: &MockPage<MemoryRuleStore>, n: usize| {
                (len > 0).then(|| page.rules()[n % len].id)
            };
            match action {
                Action::Add => {
                    let id = page.add_rule(now);
                    prop_assert!(!page.is_collapsed(id));
                }
                Action::Delete(n) => {
                    if let Some(id) = id_at(&page, n) {
                        page.delete_rule(id).unwrap();
                    }
                }
                Action::Move(a, b) => {
                    if len > 0 {
                        let before: HashSet<RuleId> =
                            page.rules().iter().map(|r| r.id).collect();
                        let moved = page.rules()[a % len].id;
                        page.start_moving_rule(a % len);
                        page.move_rule(a % len, b % len).unwrap();
                        let after: HashSet<RuleId> =
                            page.rules().iter().map(|r| r.id).collect();
                        prop_assert_eq!(before, after);
                        prop_assert_eq!(page.rules()[b % len].id, moved);
                        prop_assert_eq!(page.moving_index(), None);
                    }
                }
                Action::Toggle(n) => {
                    if let Some(id) = id_at(&page, n) {
                        let was = page.is_collapsed(id);
                        prop_assert_eq!(page.toggle_rule_collapsed(id).unwrap(), !was);
                    }
                }
                Action::Save(n) => {
                    if let Some(id) = id_at(&page, n) {
                        page.save_rule(id).unwrap();
                        prop_assert!(page.is_collapsed(id));
                    }
                }
                Action::Reset(n) => {
                    if let Some(id) = id_at(&page, n) {
                        page.reset_rule(id).unwrap();
                    }
                }
                Action::SaveAll => page.save_all(),
                Action::ResetDrafts => page.reset_rule_drafts(),
                Action::ResetDefaults => page.reset_to_defaults(),
            }

            let keys: HashSet<RuleId> = page.collapsed_state().ids().copied().collect();
            let ids: HashSet<RuleId> = page.rules().iter().map(|rule| rule.id).collect();
            prop_assert_eq!(keys, ids);
        }
    }
}
