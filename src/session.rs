//! Coordinating worker for interactive front ends.
//!
//! One thread owns the plan, the query cache, the history log, the apply
//! engine and the catalog. Callers talk to it through a cloneable
//! [`SessionHandle`]; every request carries its own reply channel, so
//! mutations are applied one at a time in arrival order.

use crate::apply::{ApplyEngine, ApplyReport, Confirmation};
use crate::cache::{InstalledInfo, Namespace, QueryCache, SearchHit};
use crate::config::{Catalog, Source};
use crate::error::{PickerError, Result};
use crate::history::{HistoryEntry, HistoryLog};
use crate::plan::{PlanSnapshot, PlanStore, Preset};
use std::collections::BTreeSet;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;

/// One mutation of the plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanEdit {
    ToggleSelection { name: String, source: Source },
    ClearSelection,
    CommitSelection,
    ToggleService(String),
    PlanEnable(String),
    PlanDisable(String),
    ClearServicePlan,
    ToggleRemoval(String),
    PlanRemovals(Vec<String>),
    PlanRepoPackages(Vec<String>),
    ApplyPreset(Preset),
    /// Add a catalog target's packages by id.
    AddTarget(String),
    SetGenerateConfigs(bool),
    Restore(PlanSnapshot),
    Reset,
}

pub enum SessionCommand {
    Search {
        namespace: Namespace,
        query: String,
        reply: Sender<Vec<SearchHit>>,
    },
    InstalledInfo {
        package: String,
        reply: Sender<InstalledInfo>,
    },
    EditPlan {
        edit: PlanEdit,
        reply: Sender<Result<PlanSnapshot>>,
    },
    Snapshot {
        reply: Sender<PlanSnapshot>,
    },
    Apply {
        installed: BTreeSet<String>,
        confirmation: Confirmation,
        reply: Sender<Result<ApplyReport>>,
    },
    History {
        max: usize,
        reply: Sender<Result<Vec<HistoryEntry>>>,
    },
    Shutdown,
}

/// Everything the worker takes ownership of.
pub struct SessionParts {
    pub plan: PlanStore,
    pub cache: QueryCache,
    pub history: HistoryLog,
    pub engine: ApplyEngine,
    pub catalog: Catalog,
}

#[derive(Clone)]
pub struct SessionHandle {
    tx: Sender<SessionCommand>,
}

/// Start the worker thread.
pub fn spawn(parts: SessionParts) -> (SessionHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel();
    let worker = std::thread::spawn(move || run_worker(parts, rx));
    (SessionHandle { tx }, worker)
}

fn run_worker(mut parts: SessionParts, rx: Receiver<SessionCommand>) {
    tracing::debug!("session worker started");
    while let Ok(command) = rx.recv() {
        // a dropped reply receiver only means the caller stopped waiting
        match command {
            SessionCommand::Search {
                namespace,
                query,
                reply,
            } => {
                let _ = reply.send(parts.cache.search(namespace, &query));
            }
            SessionCommand::InstalledInfo { package, reply } => {
                let _ = reply.send(parts.cache.installed_info(&package));
            }
            SessionCommand::EditPlan { edit, reply } => {
                let result = apply_edit(&mut parts.plan, &parts.catalog, edit)
                    .map(|()| parts.plan.snapshot());
                let _ = reply.send(result);
            }
            SessionCommand::Snapshot { reply } => {
                let _ = reply.send(parts.plan.snapshot());
            }
            SessionCommand::Apply {
                installed,
                confirmation,
                reply,
            } => {
                let result = parts.engine.apply(
                    &mut parts.plan,
                    &installed,
                    &parts.catalog.conflicts,
                    confirmation,
                );
                let _ = reply.send(result);
            }
            SessionCommand::History { max, reply } => {
                let _ = reply.send(parts.history.parse(max));
            }
            SessionCommand::Shutdown => break,
        }
    }
    tracing::debug!("session worker stopped");
}

fn apply_edit(plan: &mut PlanStore, catalog: &Catalog, edit: PlanEdit) -> Result<()> {
    match edit {
        PlanEdit::ToggleSelection { name, source } => plan.toggle_selection(&name, source),
        PlanEdit::ClearSelection => plan.clear_selection(),
        PlanEdit::CommitSelection => plan.commit_selection_to_plan(),
        PlanEdit::ToggleService(unit) => {
            plan.toggle_service_plan(&unit);
        }
        PlanEdit::PlanEnable(unit) => plan.plan_enable(&unit),
        PlanEdit::PlanDisable(unit) => plan.plan_disable(&unit),
        PlanEdit::ClearServicePlan => plan.clear_service_plan(),
        PlanEdit::ToggleRemoval(name) => plan.toggle_removal(&name),
        PlanEdit::PlanRemovals(names) => plan.plan_removals(names),
        PlanEdit::PlanRepoPackages(names) => plan.plan_repo_packages(names),
        PlanEdit::ApplyPreset(preset) => plan.apply_builtin_preset(preset),
        PlanEdit::AddTarget(id) => {
            let target = catalog
                .target(&id)
                .ok_or_else(|| PickerError::ConfigError(format!("Unknown target '{}'", id)))?;
            plan.add_target(target);
        }
        PlanEdit::SetGenerateConfigs(on) => plan.set_generate_configs(on),
        PlanEdit::Restore(snapshot) => plan.restore(snapshot)?,
        PlanEdit::Reset => plan.reset(),
    }
    Ok(())
}

impl SessionHandle {
    fn request<T>(&self, make: impl FnOnce(Sender<T>) -> SessionCommand) -> Result<T> {
        let (reply, rx) = mpsc::channel();
        self.tx
            .send(make(reply))
            .map_err(|_| PickerError::SessionClosed)?;
        rx.recv().map_err(|_| PickerError::SessionClosed)
    }

    pub fn search(&self, namespace: Namespace, query: &str) -> Result<Vec<SearchHit>> {
        self.request(|reply| SessionCommand::Search {
            namespace,
            query: query.to_string(),
            reply,
        })
    }

    pub fn installed_info(&self, package: &str) -> Result<InstalledInfo> {
        self.request(|reply| SessionCommand::InstalledInfo {
            package: package.to_string(),
            reply,
        })
    }

    pub fn edit(&self, edit: PlanEdit) -> Result<PlanSnapshot> {
        self.request(|reply| SessionCommand::EditPlan { edit, reply })?
    }

    pub fn snapshot(&self) -> Result<PlanSnapshot> {
        self.request(|reply| SessionCommand::Snapshot { reply })
    }

    pub fn apply(
        &self,
        installed: BTreeSet<String>,
        confirmation: Confirmation,
    ) -> Result<ApplyReport> {
        self.request(|reply| SessionCommand::Apply {
            installed,
            confirmation,
            reply,
        })?
    }

    pub fn history(&self, max: usize) -> Result<Vec<HistoryEntry>> {
        self.request(|reply| SessionCommand::History { max, reply })?
    }

    /// Ask the worker to stop after the requests already queued.
    pub fn shutdown(&self) -> Result<()> {
        self.tx
            .send(SessionCommand::Shutdown)
            .map_err(|_| PickerError::SessionClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apply::ApplyOptions;
    use crate::cache::CacheOptions;
    use crate::config::Target;
    use crate::gateway::RecordingGateway;
    use crate::utils::paths::DataLayout;
    use std::sync::Arc;
    use tempfile::{TempDir, tempdir};

    fn start(gw: Arc<RecordingGateway>, catalog: Catalog) -> (SessionHandle, JoinHandle<()>, TempDir) {
        let dir = tempdir().unwrap();
        let layout = DataLayout::new(dir.path());
        let history = HistoryLog::new(layout.history_log());
        let parts = SessionParts {
            plan: PlanStore::new(),
            cache: QueryCache::new(&layout, gw.clone(), CacheOptions::default()),
            history: history.clone(),
            engine: ApplyEngine::new(gw, history, ApplyOptions::default()),
            catalog,
        };
        let (handle, worker) = spawn(parts);
        (handle, worker, dir)
    }

    #[test]
    fn concurrent_edits_are_serialized() {
        let (handle, worker, _dir) = start(Arc::new(RecordingGateway::new()), Catalog::default());

        let threads: Vec<_> = (0..8)
            .map(|t| {
                let handle = handle.clone();
                std::thread::spawn(move || {
                    for i in 0..25 {
                        handle
                            .edit(PlanEdit::PlanRepoPackages(vec![format!("pkg-{}-{}", t, i)]))
                            .unwrap();
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }

        assert_eq!(handle.snapshot().unwrap().add_repo.len(), 200);
        handle.shutdown().unwrap();
        worker.join().unwrap();
        assert!(matches!(handle.snapshot(), Err(PickerError::SessionClosed)));
    }

    #[test]
    fn apply_runs_on_worker_and_records_history() {
        let gw = Arc::new(RecordingGateway::new());
        let (handle, worker, _dir) = start(gw.clone(), Catalog::default());

        handle
            .edit(PlanEdit::ToggleSelection {
                name: "git".into(),
                source: Source::Repo,
            })
            .unwrap();
        handle.edit(PlanEdit::CommitSelection).unwrap();
        let report = handle
            .apply(BTreeSet::new(), Confirmation::confirmed_by_operator())
            .unwrap();

        assert!(report.all_succeeded());
        assert_eq!(gw.commands().len(), 1);
        assert_eq!(handle.history(10).unwrap()[0].action, "install_repo");
        assert!(handle.snapshot().unwrap().add_repo.is_empty());

        handle.shutdown().unwrap();
        worker.join().unwrap();
    }

    #[test]
    fn unknown_target_is_an_error() {
        let catalog = Catalog {
            targets: vec![Target {
                id: "desk".into(),
                name: "Desktop".into(),
                required_packages: vec!["kitty".into()],
                recommended_packages: vec![],
                services: vec![],
                preset: "hyprland".into(),
            }],
            ..Catalog::default()
        };
        let (handle, worker, _dir) = start(Arc::new(RecordingGateway::new()), catalog);

        assert!(handle.edit(PlanEdit::AddTarget("laptop".into())).is_err());
        let snap = handle.edit(PlanEdit::AddTarget("desk".into())).unwrap();
        assert!(snap.add_repo.contains("kitty"));

        handle.shutdown().unwrap();
        worker.join().unwrap();
    }
}
