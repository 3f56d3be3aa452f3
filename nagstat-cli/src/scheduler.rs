//! Polling scheduler.
//!
//! Every backend gets its own tokio task, so a slow or failing server never
//! holds up the others. Reports are collected with `join_all` for one-shot
//! runs, or streamed over an mpsc channel in watch mode.

use chrono::{DateTime, Local};
use futures::future::join_all;
use nagstat_backends::{BackendAdapter, BackendRegistry};
use nagstat_core::{BackendConfig, BackendError, BackendKind, BackendResult, Host, HostMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, warn};

/// An adapter shared between the scheduler and its poll tasks.
pub type SharedAdapter = Arc<dyn BackendAdapter>;

/// Outcome of one poll cycle against one backend.
#[derive(Debug)]
pub struct PollReport {
    /// Instance name.
    pub server: String,
    /// Backend type.
    pub kind: BackendKind,
    /// Fresh host map, or why there is none.
    pub result: BackendResult<HostMap>,
    /// When the cycle finished.
    pub finished_at: DateTime<Local>,
}

impl PollReport {
    fn new(adapter: &dyn BackendAdapter, result: BackendResult<HostMap>) -> Self {
        Self {
            server: adapter.name().to_string(),
            kind: adapter.kind(),
            result,
            finished_at: Local::now(),
        }
    }

    /// Number of failing hosts and services, zero on error.
    pub fn problem_count(&self) -> usize {
        self.result.as_ref().map_or(0, count_problems)
    }
}

/// Counts failing hosts and services across a host map.
pub fn count_problems(hosts: &HostMap) -> usize {
    hosts.values().map(Host::problem_count).sum()
}

/// Builds HTTP-backed adapters for the given servers.
pub fn connect<'a>(
    servers: impl IntoIterator<Item = &'a BackendConfig>,
) -> BackendResult<Vec<SharedAdapter>> {
    servers
        .into_iter()
        .map(|server| BackendRegistry::create_http(server.clone()).map(SharedAdapter::from))
        .collect()
}

/// Runs one authenticate + fetch cycle.
pub async fn poll_once(adapter: &dyn BackendAdapter) -> PollReport {
    let result = match adapter.authenticate().await {
        Ok(()) => adapter.fetch_status().await,
        Err(e) => Err(e),
    };
    if let Err(e) = &result {
        debug!(backend = %adapter.name(), transient = e.is_transient(), "Poll cycle failed");
    }
    PollReport::new(adapter, result)
}

/// Polls every adapter concurrently and returns reports in adapter order.
pub async fn poll_all(adapters: &[SharedAdapter]) -> Vec<PollReport> {
    let handles: Vec<_> = adapters
        .iter()
        .map(|adapter| {
            let adapter = Arc::clone(adapter);
            tokio::spawn(async move { poll_once(adapter.as_ref()).await })
        })
        .collect();

    join_all(handles)
        .await
        .into_iter()
        .zip(adapters)
        .map(|(joined, adapter)| {
            joined.unwrap_or_else(|e| {
                warn!(backend = %adapter.name(), error = %e, "Poll task died");
                PollReport::new(
                    adapter.as_ref(),
                    Err(BackendError::Transport(format!("poll task failed: {e}"))),
                )
            })
        })
        .collect()
}

/// Starts one long-lived poll task per adapter.
///
/// Each task polls on `period` and forwards its reports to `tx`; a task
/// stops once the receiving side is dropped. Missed ticks are skipped so a
/// slow cycle never queues up a burst of polls.
pub fn spawn_watchers(
    adapters: &[SharedAdapter],
    period: Duration,
    tx: &mpsc::Sender<PollReport>,
) -> Vec<JoinHandle<()>> {
    adapters
        .iter()
        .map(|adapter| {
            let adapter = Arc::clone(adapter);
            let tx = tx.clone();
            tokio::spawn(async move {
                let mut ticker = interval(period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
                loop {
                    ticker.tick().await;
                    let report = poll_once(adapter.as_ref()).await;
                    if tx.send(report).await.is_err() {
                        debug!(backend = %adapter.name(), "Report channel closed, stopping");
                        break;
                    }
                }
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use nagstat_core::Status;
    use nagstat_fetch::{ScriptedTransport, Transport};

    const OPSVIEW_STATUS: &str = r#"{"list":[
        {"name":"web01","state":"up","services":[
            {"name":"http","state":"critical","output":"timeout"},
            {"name":"disk","state":"ok","output":"fine"}]},
        {"name":"db01","state":"down","services":[]}]}"#;

    fn opsview(transport: &Arc<ScriptedTransport>) -> SharedAdapter {
        let config = BackendConfig::new("ops", "opsview", "https://opsview.example.com")
            .with_credentials("admin", "secret");
        let adapter =
            BackendRegistry::create(config, Arc::clone(transport) as Arc<dyn Transport>).unwrap();
        SharedAdapter::from(adapter)
    }

    fn thruk(transport: &Arc<ScriptedTransport>) -> SharedAdapter {
        let config = BackendConfig::new("thr", "thruk", "https://thruk.example.com/thruk")
            .with_credentials("admin", "secret");
        let adapter =
            BackendRegistry::create(config, Arc::clone(transport) as Arc<dyn Transport>).unwrap();
        SharedAdapter::from(adapter)
    }

    #[test]
    fn test_count_problems() {
        let mut hosts = HostMap::new();
        let mut web = Host::new("web01", "ops", Status::Up);
        web.add_service(nagstat_core::Service::new("web01", "http", "ops", Status::Warning));
        hosts.insert(web.name.clone(), web);
        hosts.insert("db01".into(), Host::new("db01", "ops", Status::Down));
        assert_eq!(count_problems(&hosts), 2);
        assert_eq!(count_problems(&HostMap::new()), 0);
    }

    #[tokio::test]
    async fn test_poll_all_isolates_failures() {
        let ops_transport = Arc::new(ScriptedTransport::new());
        ops_transport
            .respond("/rest/login", r#"{"token":"tok"}"#)
            .respond("/rest/status/service", OPSVIEW_STATUS);

        let thruk_transport = Arc::new(ScriptedTransport::new());
        thruk_transport
            .respond("login.cgi", "")
            .time_out("style=hostdetail");

        let adapters = vec![thruk(&thruk_transport), opsview(&ops_transport)];
        let reports = poll_all(&adapters).await;

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].server, "thr");
        assert!(matches!(reports[0].result, Err(BackendError::Transport(_))));
        assert_eq!(reports[0].problem_count(), 0);

        assert_eq!(reports[1].kind, BackendKind::Opsview);
        let hosts = reports[1].result.as_ref().unwrap();
        assert_eq!(hosts.len(), 2);
        assert_eq!(reports[1].problem_count(), 2);
    }

    #[tokio::test]
    async fn test_auth_failure_is_reported() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond("/rest/login", r#"{"message":"invalid"}"#);

        let report = poll_once(opsview(&transport).as_ref()).await;
        assert!(matches!(report.result, Err(BackendError::Auth(_))));
        assert!(transport.requests_to("/rest/status").is_empty());
    }

    #[tokio::test]
    async fn test_watchers_stream_reports() {
        let ops_transport = Arc::new(ScriptedTransport::new());
        ops_transport
            .respond("/rest/login", r#"{"token":"tok"}"#)
            .respond("/rest/status/service", OPSVIEW_STATUS);
        let thruk_transport = Arc::new(ScriptedTransport::new());
        thruk_transport
            .respond("login.cgi", "")
            .respond("style=hostdetail", "[]")
            .respond("servicestatustypes", "[]");

        let adapters = vec![opsview(&ops_transport), thruk(&thruk_transport)];
        let (tx, mut rx) = mpsc::channel(8);
        let handles = spawn_watchers(&adapters, Duration::from_secs(3600), &tx);
        drop(tx);

        let mut servers = Vec::new();
        for _ in 0..2 {
            let report = rx.recv().await.unwrap();
            assert!(report.result.is_ok());
            servers.push(report.server);
        }
        servers.sort();
        assert_eq!(servers, vec!["ops", "thr"]);

        for handle in handles {
            handle.abort();
        }
    }
}
