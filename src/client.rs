//! Network driver for [`ClientReconciler`].
//!
//! In connected mode a session is: open the WebSocket, bulk-load
//! `/api/snapshot`, then apply text frames as deltas while reloading the
//! snapshot every reload interval. When the link drops the client waits
//! the reconnect delay and starts a fresh session, for as long as it runs.
//!
//! In offline-demo mode the client never touches the network: it loads the
//! built-in sample snapshot and feeds itself simulated case deltas.

use std::time::Duration;

use futures_util::StreamExt;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::config::{DashboardConfig, RunMode};
use crate::delta::Delta;
use crate::models::{CaseRecord, Snapshot};
use crate::reconciler::{ClientReconciler, ReconcileError, ViewChange, ViewHandler};
use crate::seed;
use crate::simulation;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}

type DashboardStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub struct DashboardClient {
    base_url: String,
    mode: RunMode,
    reload_interval: Duration,
    simulation_interval: Duration,
    http: reqwest::Client,
    reconciler: ClientReconciler,
}

impl DashboardClient {
    pub fn new(config: &DashboardConfig, handlers: Vec<Box<dyn ViewHandler>>) -> Self {
        Self {
            base_url: config.server_url.trim_end_matches('/').to_string(),
            mode: config.mode,
            reload_interval: config.reload_interval,
            simulation_interval: config.simulation_interval,
            http: reqwest::Client::new(),
            reconciler: ClientReconciler::new(handlers),
        }
    }

    pub fn reconciler(&self) -> &ClientReconciler {
        &self.reconciler
    }

    fn ws_url(&self) -> String {
        // http → ws, https → wss
        format!("{}/ws", self.base_url.replacen("http", "ws", 1))
    }

    /// Run for the lifetime of the task. Never returns on its own.
    pub async fn run(&mut self) {
        match self.mode {
            RunMode::OfflineDemo => self.run_offline().await,
            RunMode::Connected => loop {
                match self.run_session().await {
                    Ok(()) => tracing::info!("Dashboard connection closed"),
                    Err(e) => tracing::warn!(error = %e, "Dashboard connection failed"),
                }
                let delay = self.reconciler.on_connection_lost();
                tracing::info!(delay_secs = delay.as_secs(), "Reconnecting");
                tokio::time::sleep(delay).await;
            },
        }
    }

    /// One connection: connect, resync, stream deltas until the link drops.
    pub async fn run_session(&mut self) -> Result<(), ClientError> {
        // Subscribe first so nothing published during the fetch is missed.
        let mut ws = self.connect().await?;
        self.resync().await?;

        let mut reload = tokio::time::interval(self.reload_interval);
        reload.tick().await;

        loop {
            tokio::select! {
                frame = ws.next() => match frame {
                    Some(Ok(Message::Text(text))) => self.apply_text(&text),
                    Some(Ok(Message::Close(_))) | None => return Ok(()),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                },
                _ = reload.tick() => if let Err(e) = self.resync().await {
                    tracing::warn!(error = %e, "Periodic reload failed");
                },
            }
        }
    }

    async fn connect(&mut self) -> Result<DashboardStream, ClientError> {
        let url = self.ws_url();
        let (ws, _) = tokio_tungstenite::connect_async(url.as_str()).await?;
        self.reconciler.on_connected();
        tracing::info!(%url, "Dashboard stream connected");
        Ok(ws)
    }

    async fn resync(&mut self) -> Result<(), ClientError> {
        let snapshot = self.fetch_snapshot().await?;
        self.reconciler.bulk_load(snapshot);
        Ok(())
    }

    pub async fn fetch_snapshot(&self) -> Result<Snapshot, ClientError> {
        let snapshot = self
            .http
            .get(format!("{}/api/snapshot", self.base_url))
            .send()
            .await?
            .error_for_status()?
            .json::<Snapshot>()
            .await?;
        Ok(snapshot)
    }

    /// A bad frame is logged and dropped; the stream carries on.
    fn apply_text(&mut self, text: &str) {
        match self.reconciler.merge_text(text) {
            Ok(_) => {}
            Err(ReconcileError::AlertInSnapshot(id)) => {
                tracing::debug!(alert_id = id, "Skipped alert already in snapshot")
            }
            Err(e) => tracing::warn!(error = %e, "Dropped delta"),
        }
    }

    async fn run_offline(&mut self) {
        tracing::info!("Offline demo: using built-in sample data");
        self.reconciler.bulk_load(seed::sample_snapshot());

        let mut rng = StdRng::from_entropy();
        let mut ticker = tokio::time::interval(self.simulation_interval);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            self.offline_tick(&mut rng);
        }
    }

    fn offline_tick<R: Rng>(&mut self, rng: &mut R) -> Option<ViewChange> {
        let tick = simulation::next_case_tick(self.reconciler.store(), rng)?;
        let record = CaseRecord::new(&tick.ward, &tick.disease, tick.new_cases, tick.total_cases);
        match self.reconciler.merge(Delta::CaseUpdate(record)) {
            Ok(change) => Some(change),
            Err(e) => {
                tracing::warn!(error = %e, "Simulated delta rejected");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::api::start_dashboard_server;
    use crate::core_state::CoreState;
    use crate::db;
    use crate::models::enums::{AlertSeverity, AlertType};
    use crate::models::{AggregateStats, CaseKey, NewAlert};
    use crate::reconciler::ConnectionState;

    #[derive(Clone, Default)]
    struct RecordingView {
        seen: Arc<Mutex<Vec<(ViewChange, u64)>>>,
    }

    impl ViewHandler for RecordingView {
        fn on_change(&mut self, change: &ViewChange, stats: &AggregateStats) {
            self.seen
                .lock()
                .unwrap()
                .push((change.clone(), stats.total_cases));
        }
    }

    fn saw(seen: &Mutex<Vec<(ViewChange, u64)>>, change: &ViewChange) -> Option<u64> {
        seen.lock()
            .unwrap()
            .iter()
            .find(|(c, _)| c == change)
            .map(|(_, total)| *total)
    }

    async fn wait_until<F: Fn() -> bool>(check: F) {
        for _ in 0..250 {
            if check() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("condition never met");
    }

    #[test]
    fn ws_url_follows_scheme() {
        let mut config = DashboardConfig {
            server_url: "http://10.0.0.5:3000/".into(),
            ..DashboardConfig::default()
        };
        assert_eq!(DashboardClient::new(&config, vec![]).ws_url(), "ws://10.0.0.5:3000/ws");
        config.server_url = "https://health.example".into();
        assert_eq!(DashboardClient::new(&config, vec![]).ws_url(), "wss://health.example/ws");
    }

    #[test]
    fn offline_tick_merges_into_sample_data() {
        let config = DashboardConfig {
            mode: RunMode::OfflineDemo,
            ..DashboardConfig::default()
        };
        let mut client = DashboardClient::new(&config, vec![]);
        client.reconciler.bulk_load(seed::sample_snapshot());
        let before = client.reconciler().store().aggregate_stats().total_cases;

        let mut rng = StdRng::seed_from_u64(3);
        let changes: Vec<_> = (0..100).filter_map(|_| client.offline_tick(&mut rng)).collect();
        assert!(!changes.is_empty());
        assert!(changes.iter().all(|c| matches!(c, ViewChange::Case(_))));
        assert!(client.reconciler().store().aggregate_stats().total_cases >= before);
        assert_eq!(client.reconciler().store().cases().count(), 5);
    }

    #[tokio::test]
    async fn session_fails_without_server() {
        let config = DashboardConfig {
            server_url: "http://127.0.0.1:9".into(),
            ..DashboardConfig::default()
        };
        let mut client = DashboardClient::new(&config, vec![]);
        assert!(matches!(
            client.run_session().await,
            Err(ClientError::WebSocket(_))
        ));
        assert_eq!(client.reconciler().state(), ConnectionState::AwaitingResync);
    }

    #[tokio::test]
    async fn session_mirrors_server_updates() {
        let core = Arc::new(
            CoreState::with_connection(db::open_memory_database().unwrap(), RunMode::OfflineDemo)
                .unwrap(),
        );
        let mut server = start_dashboard_server(
            core.clone(),
            SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0),
            None,
        )
        .await
        .unwrap();

        let config = DashboardConfig {
            server_url: format!("http://127.0.0.1:{}", server.session.port),
            ..DashboardConfig::default()
        };
        let view = RecordingView::default();
        let seen = view.seen.clone();
        let mut client = DashboardClient::new(&config, vec![Box::new(view)]);
        let session = tokio::spawn(async move { client.run_session().await });

        wait_until(|| saw(&seen, &ViewChange::Reloaded).is_some()).await;
        wait_until(|| core.subscriber_count().unwrap() == 1).await;

        core.record_case("Ward-7", "Cholera", 5, 5).unwrap();
        let expected = ViewChange::Case(CaseKey::new("Ward-7", "Cholera"));
        wait_until(|| saw(&seen, &expected).is_some()).await;
        assert_eq!(saw(&seen, &expected), Some(205));

        session.abort();
        server.shutdown();
    }

    #[tokio::test]
    async fn alert_raised_during_resync_is_counted_once() {
        let core = Arc::new(
            CoreState::with_connection(db::open_memory_database().unwrap(), RunMode::OfflineDemo)
                .unwrap(),
        );
        let mut server = start_dashboard_server(
            core.clone(),
            SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0),
            None,
        )
        .await
        .unwrap();

        let config = DashboardConfig {
            server_url: format!("http://127.0.0.1:{}", server.session.port),
            ..DashboardConfig::default()
        };
        let mut client = DashboardClient::new(&config, vec![]);
        let mut ws = client.connect().await.unwrap();
        wait_until(|| core.subscriber_count().unwrap() == 1).await;

        let raised = core
            .raise_alert(NewAlert {
                id: None,
                alert_type: AlertType::Warning,
                title: "Cholera Alert".into(),
                message: "Cases rising near the market".into(),
                ward: Some("Ward-7".into()),
                severity: AlertSeverity::Medium,
            })
            .unwrap();
        client.resync().await.unwrap();

        let frame = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        let text = match frame {
            Message::Text(text) => text,
            other => panic!("expected a text frame, got {other:?}"),
        };
        assert!(text.contains("new_alert"));
        client.apply_text(&text);

        let server_stats = core.read_store().unwrap().aggregate_stats();
        let client_stats = client.reconciler().store().aggregate_stats();
        assert_eq!(server_stats.active_alerts, 4);
        assert_eq!(client_stats, server_stats);
        assert_eq!(client.reconciler().store().alerts()[0].id, raised.id);

        server.shutdown();
    }
}
