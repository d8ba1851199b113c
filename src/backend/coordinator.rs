#![cfg(feature = "server")]
use chrono::Utc;
use futures::future::join_all;
use once_cell::sync::OnceCell;
use reqwest::Client;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::backend::config::{DashboardConfig, ResourceEndpoint};
use crate::backend::fetcher::ResourceFetcher;
use crate::shared::types::{DashboardSnapshot, RefreshSummaryDto};

/// Coordinator the server functions read from. Installed once at boot.
static INSTALLED: OnceCell<Arc<RefreshCoordinator>> = OnceCell::new();

pub fn install(coordinator: Arc<RefreshCoordinator>) -> bool {
    INSTALLED.set(coordinator).is_ok()
}

pub fn installed() -> Option<&'static Arc<RefreshCoordinator>> {
    INSTALLED.get()
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ScheduleState {
    pub started: bool,
    pub last_refresh_at: Option<String>,
    pub last_event: Option<String>,
    pub next_refresh_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceOutcome {
    pub name: String,
    pub result: Result<(), String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    AllSucceeded,
    Partial { failed: Vec<String> },
    AllFailed,
    /// Nothing was fetched: no resources, or the coordinator is stopped.
    Skipped,
}

/// Per-resource results of one refresh cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshReport {
    pub outcomes: Vec<ResourceOutcome>,
}

impl RefreshReport {
    pub fn failed(&self) -> impl Iterator<Item = &ResourceOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &ResourceOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_ok())
    }

    pub fn outcome(&self) -> RefreshOutcome {
        let failed: Vec<String> = self.failed().map(|o| o.name.clone()).collect();
        match (self.outcomes.len(), failed.len()) {
            (0, _) => RefreshOutcome::Skipped,
            (_, 0) => RefreshOutcome::AllSucceeded,
            (total, n) if n == total => RefreshOutcome::AllFailed,
            _ => RefreshOutcome::Partial { failed },
        }
    }
}

impl From<&RefreshReport> for RefreshSummaryDto {
    fn from(report: &RefreshReport) -> Self {
        Self {
            skipped: report.outcomes.is_empty(),
            succeeded: report.succeeded().map(|o| o.name.clone()).collect(),
            failed: report
                .outcomes
                .iter()
                .filter_map(|o| match &o.result {
                    Err(msg) => Some((o.name.clone(), msg.clone())),
                    Ok(()) => None,
                })
                .collect(),
        }
    }
}

/// Owns the fetchers of every resource and the timer that refreshes them.
///
/// Lifecycle: `start` spawns the timer (first cycle runs at once), `stop`
/// aborts it and freezes all state. A stopped coordinator cannot be
/// restarted.
#[derive(Debug)]
pub struct RefreshCoordinator {
    fetchers: Vec<Arc<ResourceFetcher>>,
    interval: Duration,
    live: Arc<AtomicBool>,
    timer: RwLock<Option<JoinHandle<()>>>,
    schedule: RwLock<ScheduleState>,
}

impl RefreshCoordinator {
    pub fn new(client: Client, endpoints: Vec<ResourceEndpoint>, interval: Duration) -> Self {
        let live = Arc::new(AtomicBool::new(true));
        let fetchers = endpoints
            .into_iter()
            .map(|ep| {
                Arc::new(ResourceFetcher::with_live_flag(
                    ep.name,
                    ep.url,
                    client.clone(),
                    live.clone(),
                ))
            })
            .collect();
        Self {
            fetchers,
            interval,
            live,
            timer: RwLock::new(None),
            schedule: RwLock::new(ScheduleState::default()),
        }
    }

    pub fn from_config(config: &DashboardConfig) -> anyhow::Result<Self> {
        Ok(Self::new(
            config.http_client()?,
            config.endpoints(),
            config.refresh_interval,
        ))
    }

    pub fn resource(&self, name: &str) -> Option<&Arc<ResourceFetcher>> {
        self.fetchers.iter().find(|f| f.name() == name)
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    /// Refreshes every resource concurrently and waits until all settle.
    ///
    /// One resource failing neither cancels nor delays the others, and the
    /// cycle as a whole never fails. Overlapping calls are not serialized:
    /// for a given resource the last one to finish wins.
    pub async fn refresh_all(&self) -> RefreshReport {
        if !self.is_live() {
            warn!("[coordinator] refresh requested after stop; ignoring");
            return RefreshReport::default();
        }
        let started = Instant::now();
        self.update_schedule(|s| {
            s.last_refresh_at = Some(Utc::now().to_rfc3339());
            s.last_event = Some("refreshing".into());
        })
        .await;

        let outcomes = join_all(self.fetchers.iter().map(|f| async move {
            let result = f.refresh().await.map(|_| ()).map_err(|e| e.to_string());
            ResourceOutcome {
                name: f.name().to_string(),
                result,
            }
        }))
        .await;
        let report = RefreshReport { outcomes };

        let event = match report.outcome() {
            RefreshOutcome::AllSucceeded => "all resources refreshed".to_string(),
            RefreshOutcome::Partial { failed } => format!("partial success; failed: {}", failed.join(", ")),
            RefreshOutcome::AllFailed => "all resources failed".to_string(),
            RefreshOutcome::Skipped => "nothing to refresh".to_string(),
        };
        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "[coordinator] {}",
            event
        );
        self.update_schedule(|s| s.last_event = Some(event)).await;
        report
    }

    /// Runs a cycle unless one is already in flight; `None` means skipped.
    pub async fn refresh_unless_busy(&self) -> Option<RefreshReport> {
        if self.is_refreshing().await {
            debug!("[coordinator] refresh already in flight; skipping");
            return None;
        }
        Some(self.refresh_all().await)
    }

    pub async fn is_refreshing(&self) -> bool {
        for f in &self.fetchers {
            if f.is_loading().await {
                return true;
            }
        }
        false
    }

    /// Spawns the refresh timer. No-op if it is already running.
    pub async fn start(self: &Arc<Self>) {
        if !self.is_live() {
            warn!("[coordinator] start called after stop; not restarting");
            return;
        }
        let mut timer = self.timer.write().await;
        if let Some(h) = timer.as_ref() {
            if !h.is_finished() {
                return;
            }
        }
        info!(
            "[coordinator] starting: {} resource(s), cadence every {} s",
            self.fetchers.len(),
            self.interval.as_secs_f64()
        );
        let this = Arc::clone(self);
        *timer = Some(tokio::spawn(this.run_timer()));
        drop(timer);
        self.update_schedule(|s| s.started = true).await;
    }

    /// Cancels the timer (and the cycle it has in flight) and freezes state.
    pub async fn stop(&self) {
        self.live.store(false, Ordering::SeqCst);
        let handle = self.timer.write().await.take();
        if let Some(h) = handle {
            h.abort();
            let _ = h.await;
        }
        for f in &self.fetchers {
            f.settle().await;
        }
        drop(self.schedule.write().await);
        info!("[coordinator] stopped");
    }

    pub async fn is_running(&self) -> bool {
        self.is_live()
            && self
                .timer
                .read()
                .await
                .as_ref()
                .map(|h| !h.is_finished())
                .unwrap_or(false)
    }

    pub async fn schedule(&self) -> ScheduleState {
        self.schedule.read().await.clone()
    }

    pub async fn snapshot(&self) -> DashboardSnapshot {
        let mut resources = BTreeMap::new();
        let mut is_refreshing = false;
        for f in &self.fetchers {
            let state = f.state().await;
            is_refreshing |= state.is_loading();
            resources.insert(f.name().to_string(), state);
        }
        let schedule = self.schedule().await;
        DashboardSnapshot {
            resources,
            is_refreshing,
            running: self.is_running().await,
            last_refresh_at: schedule.last_refresh_at,
            next_refresh_at: schedule.next_refresh_at,
        }
    }

    async fn run_timer(self: Arc<Self>) {
        let mut interval = tokio::time::interval(self.interval);
        // a slow cycle delays the next one instead of stacking ticks
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            let tick_at = interval.tick().await;
            self.refresh_all().await;

            let until_next = tick_at
                .checked_add(self.interval)
                .map(|due| due.saturating_duration_since(Instant::now()))
                .unwrap_or(self.interval);
            let next = chrono::Duration::from_std(until_next)
                .ok()
                .and_then(|d| Utc::now().checked_add_signed(d))
                .map(|t| t.to_rfc3339());
            match &next {
                Some(at) => debug!("[coordinator] next refresh at {at}"),
                None => warn!("[coordinator] next refresh is out of calendar range"),
            }
            self.update_schedule(|s| s.next_refresh_at = next).await;
        }
    }

    async fn update_schedule(&self, update: impl FnOnce(&mut ScheduleState)) {
        let mut w = self.schedule.write().await;
        if !self.is_live() {
            return;
        }
        update(&mut *w);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::types::{ResourceStatus, RESOURCE_COPILOT, RESOURCE_OPENROUTER};
    use crate::shared::view::{select, ViewState};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn endpoints(server: &MockServer) -> Vec<ResourceEndpoint> {
        vec![
            ResourceEndpoint {
                name: RESOURCE_OPENROUTER.into(),
                url: format!("{}/a", server.uri()),
            },
            ResourceEndpoint {
                name: RESOURCE_COPILOT.into(),
                url: format!("{}/b", server.uri()),
            },
        ]
    }

    fn coordinator(server: &MockServer, interval: Duration) -> Arc<RefreshCoordinator> {
        Arc::new(RefreshCoordinator::new(
            Client::new(),
            endpoints(server),
            interval,
        ))
    }

    async fn mount(server: &MockServer, route: &str, template: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(template)
            .mount(server)
            .await;
    }

    async fn request_count(server: &MockServer) -> usize {
        server.received_requests().await.unwrap_or_default().len()
    }

    #[tokio::test]
    async fn partial_success_does_not_fail_the_cycle() {
        let server = MockServer::start().await;
        mount(
            &server,
            "/a",
            ResponseTemplate::new(200).set_body_json(json!({"percentRemaining": 50})),
        )
        .await;
        mount(
            &server,
            "/b",
            ResponseTemplate::new(500).set_body_string("rate limited"),
        )
        .await;

        let c = coordinator(&server, Duration::from_secs(60));
        let report = c.refresh_all().await;
        assert_eq!(
            report.outcome(),
            RefreshOutcome::Partial {
                failed: vec![RESOURCE_COPILOT.to_string()]
            }
        );

        let copilot = c.resource(RESOURCE_COPILOT).unwrap();
        assert_eq!(copilot.state().await.status, ResourceStatus::Error);
        assert!(c.resource("missing").is_none());

        let snap = c.snapshot().await;
        let a = snap.resource(RESOURCE_OPENROUTER);
        let b = snap.resource(RESOURCE_COPILOT);
        assert!(matches!(select(&a), ViewState::Ready { refresh_error: None, .. }));
        match select(&b) {
            ViewState::Error { message } => {
                assert!(message.contains("500") && message.contains("rate limited"))
            }
            other => panic!("expected error view, got {other:?}"),
        }
        assert!(!snap.is_refreshing);

        let summary = RefreshSummaryDto::from(&report);
        assert_eq!(summary.succeeded, vec![RESOURCE_OPENROUTER.to_string()]);
        assert_eq!(summary.failed.len(), 1);
        assert!(!summary.skipped);
    }

    #[tokio::test]
    async fn waits_for_every_fetch_to_settle() {
        let server = MockServer::start().await;
        mount(&server, "/a", ResponseTemplate::new(404)).await;
        mount(
            &server,
            "/b",
            ResponseTemplate::new(200)
                .set_body_json(json!({"ok": true}))
                .set_delay(Duration::from_millis(300)),
        )
        .await;

        let c = coordinator(&server, Duration::from_secs(60));
        let started = std::time::Instant::now();
        let report = c.refresh_all().await;
        assert!(started.elapsed() >= Duration::from_millis(300));
        assert_eq!(report.outcomes.len(), 2);

        let snap = c.snapshot().await;
        assert_eq!(snap.resource(RESOURCE_OPENROUTER).status, ResourceStatus::Error);
        assert_eq!(snap.resource(RESOURCE_COPILOT).status, ResourceStatus::Ok);
    }

    #[tokio::test]
    async fn fetches_run_concurrently() {
        let server = MockServer::start().await;
        for route in ["/a", "/b"] {
            mount(
                &server,
                route,
                ResponseTemplate::new(200)
                    .set_body_json(json!({}))
                    .set_delay(Duration::from_millis(400)),
            )
            .await;
        }

        let c = coordinator(&server, Duration::from_secs(60));
        let started = std::time::Instant::now();
        assert_eq!(c.refresh_all().await.outcome(), RefreshOutcome::AllSucceeded);
        assert!(started.elapsed() < Duration::from_millis(750));
    }

    #[tokio::test]
    async fn reports_refreshing_while_in_flight() {
        let server = MockServer::start().await;
        mount(
            &server,
            "/a",
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_millis(300)),
        )
        .await;
        mount(&server, "/b", ResponseTemplate::new(503)).await;

        let c = coordinator(&server, Duration::from_secs(60));
        assert!(!c.is_refreshing().await);
        let task = tokio::spawn({
            let c = c.clone();
            async move { c.refresh_all().await }
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(c.is_refreshing().await);
        assert!(c.snapshot().await.is_refreshing);

        let report = task.await.unwrap();
        assert_eq!(
            report.outcome(),
            RefreshOutcome::Partial {
                failed: vec![RESOURCE_COPILOT.to_string()]
            }
        );
        assert!(!c.is_refreshing().await);
    }

    #[tokio::test]
    async fn all_failed_is_reported_not_raised() {
        let server = MockServer::start().await;
        mount(&server, "/a", ResponseTemplate::new(500)).await;
        mount(&server, "/b", ResponseTemplate::new(502)).await;

        let c = coordinator(&server, Duration::from_secs(60));
        assert_eq!(c.refresh_all().await.outcome(), RefreshOutcome::AllFailed);
    }

    #[tokio::test]
    async fn timer_refreshes_immediately_then_on_interval() {
        let server = MockServer::start().await;
        mount(&server, "/a", ResponseTemplate::new(200).set_body_json(json!({}))).await;
        mount(&server, "/b", ResponseTemplate::new(200).set_body_json(json!({}))).await;

        let c = coordinator(&server, Duration::from_millis(100));
        c.start().await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(request_count(&server).await, 2);
        assert!(c.is_running().await);

        tokio::time::sleep(Duration::from_millis(300)).await;
        c.stop().await;
        let seen = request_count(&server).await;
        assert!(seen >= 4, "expected repeated cycles, saw {seen} requests");
        assert!(!c.is_running().await);

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(request_count(&server).await, seen);
    }

    #[tokio::test]
    async fn start_twice_keeps_one_timer() {
        let server = MockServer::start().await;
        mount(&server, "/a", ResponseTemplate::new(200).set_body_json(json!({}))).await;
        mount(&server, "/b", ResponseTemplate::new(200).set_body_json(json!({}))).await;

        let c = coordinator(&server, Duration::from_secs(60));
        c.start().await;
        c.start().await;
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(request_count(&server).await, 2);

        let schedule = c.schedule().await;
        assert!(schedule.started);
        assert!(schedule.next_refresh_at.is_some());
        assert!(c.snapshot().await.next_refresh_at.is_some());
        c.stop().await;
    }

    #[tokio::test]
    async fn no_state_changes_after_stop() {
        let server = MockServer::start().await;
        for route in ["/a", "/b"] {
            mount(
                &server,
                route,
                ResponseTemplate::new(200)
                    .set_body_json(json!({"late": true}))
                    .set_delay(Duration::from_millis(300)),
            )
            .await;
        }

        let c = coordinator(&server, Duration::from_secs(60));
        let in_flight = tokio::spawn({
            let c = c.clone();
            async move { c.refresh_all().await }
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        let before = c.snapshot().await;
        c.stop().await;
        in_flight.await.unwrap();

        let after = c.snapshot().await;
        assert_eq!(after.resources, before.resources);
        assert!(after.resources.values().all(|s| s.data.is_none()));

        // a trigger after teardown is ignored entirely
        let requests = request_count(&server).await;
        assert_eq!(c.refresh_all().await.outcome(), RefreshOutcome::Skipped);
        assert_eq!(request_count(&server).await, requests);

        c.start().await;
        assert!(!c.is_running().await);
    }

    #[tokio::test]
    async fn stop_cancels_the_timer_cycle_in_flight() {
        let server = MockServer::start().await;
        for route in ["/a", "/b"] {
            mount(
                &server,
                route,
                ResponseTemplate::new(200)
                    .set_body_json(json!({}))
                    .set_delay(Duration::from_millis(500)),
            )
            .await;
        }

        let c = coordinator(&server, Duration::from_secs(60));
        c.start().await;
        tokio::time::sleep(Duration::from_millis(100)).await;
        c.stop().await;
        tokio::time::sleep(Duration::from_millis(600)).await;

        let snap = c.snapshot().await;
        assert!(snap.resources.values().all(|s| s.data.is_none()));
        assert!(!snap.running);
    }

    #[tokio::test]
    async fn timer_survives_an_interval_past_the_clock_range() {
        let server = MockServer::start().await;
        mount(&server, "/a", ResponseTemplate::new(200).set_body_json(json!({}))).await;
        mount(&server, "/b", ResponseTemplate::new(200).set_body_json(json!({}))).await;

        let c = coordinator(&server, Duration::from_secs(u64::MAX));
        c.start().await;
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(request_count(&server).await, 2);
        assert!(c.is_running().await);
        let schedule = c.schedule().await;
        assert!(schedule.last_refresh_at.is_some());
        assert!(schedule.next_refresh_at.is_none());
        c.stop().await;
    }

    #[tokio::test]
    async fn refresh_unless_busy_skips_while_in_flight() {
        let server = MockServer::start().await;
        for route in ["/a", "/b"] {
            mount(
                &server,
                route,
                ResponseTemplate::new(200)
                    .set_body_json(json!({}))
                    .set_delay(Duration::from_millis(300)),
            )
            .await;
        }

        let c = coordinator(&server, Duration::from_secs(60));
        let first = tokio::spawn({
            let c = c.clone();
            async move { c.refresh_all().await }
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(c.refresh_unless_busy().await.is_none());
        assert_eq!(request_count(&server).await, 2);

        first.await.unwrap();
        let report = c.refresh_unless_busy().await.expect("idle coordinator refreshes");
        assert_eq!(report.outcome(), RefreshOutcome::AllSucceeded);
        assert_eq!(request_count(&server).await, 4);
    }

    #[test]
    fn empty_report_is_skipped() {
        let report = RefreshReport::default();
        assert_eq!(report.outcome(), RefreshOutcome::Skipped);
        assert!(RefreshSummaryDto::from(&report).skipped);
    }
}
