//! Route tree watcher for development hot reload.
//!
//! File events are forwarded into a channel; a single consumer drains
//! bursts, scaffolds blank files and runs one compile pass per burst.

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};

use crate::compiler::{CompilePass, Scaffolder};
use crate::routing::SnapshotStore;

/// Quiet period used to gather related events into one pass.
const BURST_WINDOW: Duration = Duration::from_millis(50);

/// A change observed under a routes root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteEvent {
    Changed(PathBuf),
    Removed(PathBuf),
}

impl RouteEvent {
    pub fn path(&self) -> &PathBuf {
        match self {
            RouteEvent::Changed(path) | RouteEvent::Removed(path) => path,
        }
    }

    fn from_notify(event: Event) -> Vec<RouteEvent> {
        match event.kind {
            EventKind::Create(_) | EventKind::Modify(_) => {
                event.paths.into_iter().map(RouteEvent::Changed).collect()
            }
            EventKind::Remove(_) => event.paths.into_iter().map(RouteEvent::Removed).collect(),
            _ => Vec::new(),
        }
    }
}

/// Watches one or more routes roots.
pub struct RouteWatcher {
    roots: Vec<PathBuf>,
    poll_interval: Duration,
    event_tx: mpsc::UnboundedSender<RouteEvent>,
}

impl RouteWatcher {
    /// Create a watcher over `roots` (duplicates are watched once).
    ///
    /// Returns the watcher and a receiver for route events.
    pub fn new(
        roots: impl IntoIterator<Item = PathBuf>,
        poll_interval: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<RouteEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let mut roots: Vec<PathBuf> = roots.into_iter().collect();
        roots.sort();
        roots.dedup();

        (
            Self {
                roots,
                poll_interval,
                event_tx,
            },
            event_rx,
        )
    }

    /// Start watching. Events stop when the returned handle is dropped.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.event_tx.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    for route_event in RouteEvent::from_notify(event) {
                        tracing::debug!(path = ?route_event.path(), "Route file event");
                        let _ = tx.send(route_event);
                    }
                }
                Err(e) => tracing::error!(error = %e, "Watch error"),
            },
            Config::default().with_poll_interval(self.poll_interval),
        )?;

        for root in &self.roots {
            watcher.watch(root, RecursiveMode::Recursive)?;
            tracing::info!(path = ?root, "Route watcher started");
        }
        Ok(watcher)
    }
}

/// Serialized consumer of route events.
pub struct DevCompiler {
    pass: Arc<CompilePass>,
    scaffolder: Arc<Scaffolder>,
    store: SnapshotStore,
}

impl DevCompiler {
    pub fn new(pass: Arc<CompilePass>, scaffolder: Arc<Scaffolder>, store: SnapshotStore) -> Self {
        Self {
            pass,
            scaffolder,
            store,
        }
    }

    /// Process events until the channel closes or shutdown fires.
    pub async fn run(
        self,
        mut events: mpsc::UnboundedReceiver<RouteEvent>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        loop {
            let first = tokio::select! {
                event = events.recv() => match event {
                    Some(event) => event,
                    None => break,
                },
                _ = shutdown.recv() => break,
            };

            tokio::time::sleep(BURST_WINDOW).await;
            let mut burst = vec![first];
            while let Ok(event) = events.try_recv() {
                burst.push(event);
            }

            self.handle_burst(burst).await;
        }
        tracing::info!("Route compiler stopped");
    }

    /// Scaffold changed files, then run one pass and publish it.
    pub async fn handle_burst(&self, burst: Vec<RouteEvent>) {
        let mut relevant = false;
        let mut scaffolds = Vec::new();

        for event in burst {
            // directory renames only report directory paths, so any event
            // under a routes root forces a pass
            if !self.pass.watches(event.path()) {
                continue;
            }
            relevant = true;

            let RouteEvent::Changed(path) = event else {
                continue;
            };
            if let Some(compiler) = self.pass.owner(&path) {
                let descriptor = compiler.describe(&path);
                let scaffolder = self.scaffolder.clone();
                scaffolds.push(tokio::spawn(async move {
                    scaffolder.ensure(&path, &descriptor).await
                }));
            }
        }

        if !relevant {
            return;
        }

        for task in scaffolds {
            match task.await {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => tracing::error!(error = %e, "Scaffold failed"),
                Err(e) => tracing::error!(error = %e, "Scaffold task aborted"),
            }
        }

        let pass = self.pass.clone();
        match tokio::task::spawn_blocking(move || pass.run()).await {
            Ok(Ok(snapshot)) => self.store.publish(snapshot),
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Compile pass failed, keeping current routes")
            }
            Err(e) => tracing::error!(error = %e, "Compile pass aborted, keeping current routes"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RoutesConfig, TreeConfig};
    use crate::render::Pages;
    use crate::routing::RouteSnapshot;
    use std::fs;
    use std::path::Path;

    fn dev_compiler(root: &Path) -> (DevCompiler, SnapshotStore) {
        let mut server = TreeConfig::server();
        server.routes_dir = root.join("routes");
        server.router_module = root.join("components/Router.tsx");
        server.manifest = root.join("dist/routes.server.json");
        let mut client = TreeConfig::client();
        client.routes_dir = root.join("routes");
        client.router_module = root.join("components/Router.client.tsx");
        client.manifest = root.join("dist/routes.client.json");

        let pass = Arc::new(CompilePass::new(&RoutesConfig { server, client }, Pages::default()));
        let store = SnapshotStore::new(RouteSnapshot::empty());
        (
            DevCompiler::new(pass, Arc::new(Scaffolder::new()), store.clone()),
            store,
        )
    }

    #[test]
    fn test_roots_deduplicated() {
        let (watcher, _rx) = RouteWatcher::new(
            vec![PathBuf::from("src/routes"), PathBuf::from("src/routes")],
            Duration::from_millis(500),
        );
        assert_eq!(watcher.roots, vec![PathBuf::from("src/routes")]);
    }

    #[tokio::test]
    async fn test_burst_scaffolds_and_publishes() {
        let dir = tempfile::tempdir().unwrap();
        let routes = dir.path().join("routes");
        fs::create_dir_all(&routes).unwrap();
        fs::write(routes.join("_slug.tsx"), "").unwrap();

        let (compiler, store) = dev_compiler(dir.path());
        compiler
            .handle_burst(vec![RouteEvent::Changed(routes.join("_slug.tsx"))])
            .await;

        assert!(fs::read_to_string(routes.join("_slug.tsx")).unwrap().contains("slug: string"));
        let snapshot = store.load();
        assert_eq!(snapshot.generation, 1);
        assert_eq!(snapshot.server.table().dynamic_routes.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_pass_keeps_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let (compiler, store) = dev_compiler(dir.path());

        // routes root does not exist, so the pass fails
        compiler
            .handle_burst(vec![RouteEvent::Removed(dir.path().join("routes/a.tsx"))])
            .await;
        assert_eq!(store.load().generation, 0);
    }

    #[tokio::test]
    async fn test_directory_rename_recompiles() {
        let dir = tempfile::tempdir().unwrap();
        let routes = dir.path().join("routes");
        fs::create_dir_all(routes.join("user")).unwrap();
        fs::write(routes.join("user/_id.tsx"), "export default () => null;").unwrap();

        let (compiler, store) = dev_compiler(dir.path());
        compiler
            .handle_burst(vec![RouteEvent::Changed(routes.join("user/_id.tsx"))])
            .await;
        assert!(store.load().server.table().match_path("/user/1").is_some());

        fs::rename(routes.join("user"), routes.join("member")).unwrap();
        compiler
            .handle_burst(vec![
                RouteEvent::Removed(routes.join("user")),
                RouteEvent::Changed(routes.join("member")),
            ])
            .await;

        let snapshot = store.load();
        assert_eq!(snapshot.generation, 2);
        assert!(snapshot.server.table().match_path("/user/1").is_none());
        assert!(snapshot.server.table().match_path("/member/1").is_some());
    }

    #[tokio::test]
    async fn test_unrelated_events_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let (compiler, store) = dev_compiler(dir.path());
        compiler
            .handle_burst(vec![RouteEvent::Changed(dir.path().join("README.md"))])
            .await;
        assert_eq!(store.load().generation, 0);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let (compiler, _store) = dev_compiler(dir.path());
        let (_tx, rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let handle = tokio::spawn(compiler.run(rx, shutdown_rx));
        shutdown_tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
