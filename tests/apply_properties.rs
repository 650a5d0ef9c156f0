use pkgpicker::apply::{ApplyEngine, ApplyOptions, Confirmation};
use pkgpicker::cache::{CacheOptions, Namespace, QueryCache};
use pkgpicker::conflicts::{ConflictMode, ConflictRule};
use pkgpicker::error::PickerError;
use pkgpicker::gateway::{CommandOutput, RecordingGateway};
use pkgpicker::history::HistoryLog;
use pkgpicker::plan::{PlanSnapshot, PlanStore};
use pkgpicker::profiles::ProfileStore;
use pkgpicker::utils::paths::DataLayout;
use std::collections::BTreeSet;
use std::sync::Arc;
use tempfile::tempdir;

fn engine(gw: &Arc<RecordingGateway>, history: &HistoryLog) -> ApplyEngine {
    ApplyEngine::new(gw.clone(), history.clone(), ApplyOptions::default())
}

#[test]
fn failed_validation_runs_nothing() {
    let dir = tempdir().unwrap();
    let history = HistoryLog::new(dir.path().join("history.log"));
    let gw = Arc::new(RecordingGateway::new());

    let mut plan = PlanStore::new();
    plan.plan_repo_packages(["greetd", "sddm"]);
    let rules = vec![ConflictRule::new(
        "greeter",
        &["greetd", "sddm", "gdm"],
        ConflictMode::AtMostOne,
    )];

    let result = engine(&gw, &history).apply(
        &mut plan,
        &BTreeSet::new(),
        &rules,
        Confirmation::confirmed_by_operator(),
    );

    assert!(matches!(result, Err(PickerError::ConflictViolation(_))));
    assert_eq!(gw.call_count(), 0);
    assert!(history.parse(10).unwrap().is_empty());
    assert!(plan.state().add_repo.contains("sddm"));
}

#[test]
fn three_batches_for_install_remove_enable() {
    let dir = tempdir().unwrap();
    let history = HistoryLog::new(dir.path().join("history.log"));
    let gw = Arc::new(RecordingGateway::new());

    let mut plan = PlanStore::new();
    plan.plan_repo_packages(["git"]);
    plan.plan_removals(["nano"]);
    plan.plan_enable("sshd.service");

    let report = engine(&gw, &history)
        .apply(
            &mut plan,
            &BTreeSet::new(),
            &[],
            Confirmation::confirmed_by_operator(),
        )
        .unwrap();

    assert_eq!(report.outcomes.len(), 3);
    assert!(report.all_succeeded());

    let commands = gw.commands();
    assert_eq!(commands.len(), 3);
    assert!(commands[0].contains(&"git".to_string()));
    assert!(commands[1].contains(&"-Rns".to_string()));
    assert!(commands[2].contains(&"sshd.service".to_string()));
    assert!(!commands.iter().flatten().any(|arg| arg == "yay"));

    let entries = history.parse(10).unwrap();
    let actions: Vec<&str> = entries.iter().map(|e| e.action.as_str()).collect();
    assert_eq!(actions, vec!["service_enable", "remove", "install_repo"]);
    assert!(entries.iter().all(|e| e.rc == 0));
}

#[test]
fn failed_batch_does_not_stop_the_rest() {
    let dir = tempdir().unwrap();
    let history = HistoryLog::new(dir.path().join("history.log"));
    let gw = Arc::new(
        RecordingGateway::new().respond_to(
            "pacman",
            CommandOutput::new(1, "error: target not found: nano"),
        ),
    );

    let mut plan = PlanStore::new();
    plan.plan_removals(["nano"]);
    plan.plan_enable("sshd.service");

    let report = engine(&gw, &history)
        .apply(
            &mut plan,
            &BTreeSet::new(),
            &[],
            Confirmation::confirmed_by_operator(),
        )
        .unwrap();

    assert!(!report.all_succeeded());
    assert_eq!(report.outcomes.len(), 2);
    assert!(report.failure_summary().contains("target not found"));
    assert!(plan.state().remove.contains("nano"));

    let entries = history.parse(10).unwrap();
    assert_eq!(entries[0].rc, 0);
    assert_eq!(entries[1].rc, 1);
}

#[test]
fn repeated_search_hits_the_cache() {
    let dir = tempdir().unwrap();
    let layout = DataLayout::new(dir.path());
    let gw = Arc::new(RecordingGateway::new().respond_to(
        "pacman",
        CommandOutput::new(0, "extra/ripgrep 14.1.1-1\n    fast grep\n"),
    ));
    let cache = QueryCache::new(&layout, gw.clone(), CacheOptions::default());

    let first = cache.search_at(Namespace::Repo, "ripgrep", 1_000);
    let second = cache.search_at(Namespace::Repo, "ripgrep", 1_500);

    assert_eq!(first, second);
    assert_eq!(first[0].name, "ripgrep");
    assert_eq!(gw.call_count(), 1);
}

#[test]
fn expired_cache_drops_both_namespaces() {
    let dir = tempdir().unwrap();
    let layout = DataLayout::new(dir.path());
    let gw = Arc::new(RecordingGateway::new());
    let options = CacheOptions {
        ttl_secs: 60,
        ..CacheOptions::default()
    };
    let cache = QueryCache::new(&layout, gw.clone(), options);

    cache.search_at(Namespace::Aur, "paru", 1_000);
    cache.search_at(Namespace::Repo, "git", 1_000);
    assert!(cache.document().aur.contains_key("paru"));

    cache.search_at(Namespace::Repo, "vim", 1_000 + 61);
    let doc = cache.document();
    assert!(doc.aur.is_empty());
    assert!(!doc.repo.contains_key("git"));
    assert!(doc.repo.contains_key("vim"));
    assert_eq!(doc.ts, 1_061);
}

#[test]
fn history_reads_newest_first() {
    let dir = tempdir().unwrap();
    let history = HistoryLog::new(dir.path().join("history.log"));

    history
        .append("install_repo", &["sudo pacman -S git".to_string()], 0)
        .unwrap();
    history
        .append("remove", &["sudo pacman -Rns nano".to_string()], 1)
        .unwrap();

    let entries = history.parse(10).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].action, "remove");
    assert_eq!(entries[0].rc, 1);
    assert_eq!(entries[1].action, "install_repo");
    assert_eq!(entries[1].commands, vec!["sudo pacman -S git"]);
}

#[test]
fn profiles_round_trip_including_empty() {
    let dir = tempdir().unwrap();
    let store = ProfileStore::new(dir.path().join("profiles"));

    store.save("empty", &PlanSnapshot::default()).unwrap();
    assert_eq!(store.load("empty").unwrap(), PlanSnapshot::default());

    let mut plan = PlanStore::new();
    plan.toggle_selection("firefox", pkgpicker::config::Source::Repo);
    plan.plan_repo_packages(["git"]);
    plan.plan_disable("cups.service");
    plan.apply_builtin_preset(pkgpicker::plan::Preset::HyprlandTuigreet);
    store.save("desk", &plan.snapshot()).unwrap();

    assert_eq!(store.load("desk").unwrap(), plan.snapshot());
    assert_eq!(store.list().unwrap(), vec!["desk", "empty"]);
}
