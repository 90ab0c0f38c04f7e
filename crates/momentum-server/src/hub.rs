//! `SessionHub`: the single owner of session state.
//!
//! Every operation takes the hub's store lock for its whole critical
//! section, including the publish that follows a mutation. Operations on
//! one session are therefore applied and broadcast strictly in the order
//! they acquired the lock. Nothing awaits while the lock is held.
//!
//! Lock order is always store, then broadcast manager.

use std::sync::{Arc, Weak};
use std::time::Duration;

use metrics::{counter, gauge};
use momentum_core::errors::Result;
use momentum_core::mutation::{plan_goal, plan_momentum, require_session};
use momentum_core::{
    ChannelId, ClampPolicy, Envelope, EnvelopeKind, GoalChanged, GoalRequest, HubError, IdGenerator,
    LifecycleState, MomentumChanged, MomentumRequest, ReclaimOutcome, Session, SessionId, SessionSnapshot,
    SessionStore, StateChange, lifecycle,
};
use momentum_settings::{ClampPolicyMode, SessionSettings};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::metrics::{
    MUTATION_ERRORS_TOTAL, MUTATIONS_TOTAL, SESSIONS_ACTIVE, SESSIONS_CREATED_TOTAL, SESSIONS_RECLAIMED_TOTAL,
    SESSIONS_REVIVED_TOTAL,
};
use crate::reaper::{DEFAULT_RECLAIM_GRACE, Reaper};
use crate::websocket::broadcast::BroadcastManager;
use crate::websocket::connection::{ClientConnection, ConnectionId};

/// Session rules used by the hub.
#[derive(Clone, Debug)]
pub struct HubConfig {
    /// Generator for new session IDs.
    pub id_generator: IdGenerator,
    /// Goal for both sides of a new session.
    pub default_goal: i64,
    /// How long an unwatched session survives.
    pub reclaim_grace: Duration,
    /// Clamping rules for updates.
    pub policy: ClampPolicy,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            id_generator: IdGenerator::default(),
            default_goal: momentum_core::session::DEFAULT_GOAL,
            reclaim_grace: DEFAULT_RECLAIM_GRACE,
            policy: ClampPolicy::default(),
        }
    }
}

impl HubConfig {
    /// Derive the hub configuration from session settings.
    pub fn from_settings(settings: &SessionSettings) -> Self {
        Self {
            id_generator: IdGenerator::new(
                settings.id_length,
                settings.fallback_id_length,
                settings.max_id_attempts,
            ),
            default_goal: settings.default_goal,
            reclaim_grace: Duration::from_secs(settings.reclaim_grace_secs),
            policy: clamp_policy(settings.clamp_policy),
        }
    }
}

/// Map the configured policy name onto its rules.
pub fn clamp_policy(mode: ClampPolicyMode) -> ClampPolicy {
    match mode {
        ClampPolicyMode::Baseline => ClampPolicy::baseline(),
        ClampPolicyMode::Capped => ClampPolicy::capped(),
    }
}

/// Owner of the session store, the reclaim timers, and the fan-out.
pub struct SessionHub {
    store: Mutex<SessionStore>,
    broadcast: Arc<BroadcastManager>,
    reaper: Reaper,
    policy: ClampPolicy,
    this: Weak<SessionHub>,
}

impl SessionHub {
    /// Create a hub publishing through `broadcast`.
    pub fn new(config: HubConfig, broadcast: Arc<BroadcastManager>) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            store: Mutex::new(SessionStore::new(config.id_generator, config.default_goal)),
            broadcast,
            reaper: Reaper::new(config.reclaim_grace),
            policy: config.policy,
            this: this.clone(),
        })
    }

    /// The broadcast manager this hub publishes through.
    pub fn broadcast(&self) -> &Arc<BroadcastManager> {
        &self.broadcast
    }

    /// Active clamping rules.
    pub fn policy(&self) -> ClampPolicy {
        self.policy
    }

    /// Find the session a page visit refers to, creating it if needed.
    ///
    /// A live `requested` ID is reused as is. An unknown one is created
    /// under that exact ID so stale links keep working. `None` or an empty
    /// ID gets a freshly generated one.
    pub fn resolve_session(&self, requested: Option<&str>) -> (SessionId, SessionSnapshot) {
        let mut store = self.store.lock();
        let requested = requested.filter(|s| !s.is_empty());
        if let Some((id, session)) = requested.and_then(|id| store.get(id).map(|s| (id, s))) {
            debug!(session_id = id, "reusing existing session");
            return (SessionId::from(id), session.snapshot());
        }
        let (id, snapshot) = Self::create_locked(&mut store, requested.map(SessionId::from));
        info!(session_id = %id, sessions = store.count(), "session resolved");
        (id, snapshot)
    }

    /// Add to or overwrite one side's momentum and publish the result.
    pub fn apply_momentum(&self, req: &MomentumRequest) -> Result<MomentumChanged> {
        debug!(
            session_id = req.session_id.as_deref(),
            is_player = req.is_player,
            is_set = req.is_set,
            momentum = req.momentum,
            "momentum update in"
        );
        let result = self.mutate(req.session_id.as_deref(), |session, policy| {
            let (next, changed) = plan_momentum(session, policy, req.into());
            (next, changed, StateChange::Momentum(changed))
        });
        record_mutation("momentum", result.as_ref().map(|_| ()));
        if let Ok(changed) = &result {
            debug!(is_player = changed.is_player, new_momentum = changed.new_momentum, "momentum update out");
        }
        result
    }

    /// Overwrite one side's goal and publish the result.
    pub fn apply_goal(&self, req: &GoalRequest) -> Result<GoalChanged> {
        debug!(
            session_id = req.session_id.as_deref(),
            is_player = req.is_player,
            goal = req.goal,
            "goal update in"
        );
        let result = self.mutate(req.session_id.as_deref(), |session, policy| {
            let (next, changed) = plan_goal(session, policy, req.into());
            (next, changed, StateChange::Goal(changed))
        });
        record_mutation("goal", result.as_ref().map(|_| ()));
        if let Ok(changed) = &result {
            debug!(is_player = changed.is_player, new_goal = changed.new_goal, "goal update out");
        }
        result
    }

    /// Current visible state of a session. Never creates anything.
    pub fn query_state(&self, id: &str) -> Result<SessionSnapshot> {
        if id.is_empty() {
            return Err(HubError::MissingSessionId);
        }
        self.store
            .lock()
            .get(id)
            .map(Session::snapshot)
            .ok_or_else(|| HubError::SessionNotFound(SessionId::from(id)))
    }

    /// Handle one text frame from a WebSocket client.
    ///
    /// Frames that are not a valid subscription envelope are ignored.
    pub fn on_connection_message(&self, connection: &Arc<ClientConnection>, raw: &str) {
        let Some(envelope) = Envelope::parse(raw) else {
            debug!(conn_id = %connection.id, "ignoring malformed envelope");
            return;
        };
        match envelope.kind {
            EnvelopeKind::Subscribe => self.subscribe(connection, &envelope.session_id),
            EnvelopeKind::Unsubscribe => self.unsubscribe(&connection.id, &envelope.session_id),
        }
    }

    /// Start delivering a session's updates to `connection` and count it
    /// as a guest. Cancels any pending reclaim. An unknown session is
    /// created under the given ID.
    pub fn subscribe(&self, connection: &Arc<ClientConnection>, session_id: &str) {
        let mut store = self.store.lock();
        let id = SessionId::from(session_id);
        if !store.contains(session_id) {
            let _ = Self::create_locked(&mut store, Some(id.clone()));
        }
        let guests = lifecycle::add_guest(&mut store, session_id);
        if self.reaper.cancel(session_id) {
            info!(session_id, "pending reclaim cancelled by new guest");
        }
        let channel = ChannelId::watcher(&id);
        let _ = self.broadcast.subscribe(&channel, connection);
        debug!(
            conn_id = %connection.id,
            session_id,
            guests,
            watchers = self.broadcast.subscriber_count(&channel),
            "subscribed"
        );
    }

    /// Stop delivering a session's updates to a connection and count one
    /// guest fewer. Arms the reclaim timer once no guests remain.
    ///
    /// The count is decremented even if the connection was not a member.
    pub fn unsubscribe(&self, connection_id: &ConnectionId, session_id: &str) {
        let mut store = self.store.lock();
        let id = SessionId::from(session_id);
        let was_member = self.broadcast.unsubscribe(&ChannelId::watcher(&id), connection_id);
        debug!(conn_id = %connection_id, session_id, was_member, "unsubscribed");
        self.release_guest(&mut store, id);
    }

    /// Drop a closed connection from every channel it joined, releasing
    /// one guest per channel.
    pub fn on_connection_closed(&self, connection_id: &ConnectionId) {
        let mut store = self.store.lock();
        let channels = self.broadcast.remove(connection_id);
        if !channels.is_empty() {
            debug!(conn_id = %connection_id, channels = channels.len(), "releasing channels of closed connection");
        }
        for channel in channels {
            self.release_guest(&mut store, channel.session_id().clone());
        }
    }

    /// Lifecycle state of a session as seen right now.
    pub fn lifecycle_state(&self, id: &str) -> LifecycleState {
        let store = self.store.lock();
        match (store.contains(id), self.reaper.is_pending(id)) {
            (false, _) => LifecycleState::Reclaimed,
            (true, true) => LifecycleState::Draining,
            (true, false) => LifecycleState::Active,
        }
    }

    /// Guest count of a session, if it exists.
    pub fn guest_count(&self, id: &str) -> Option<i64> {
        self.store.lock().get(id).map(Session::guest_count)
    }

    /// Number of live sessions.
    pub fn session_count(&self) -> usize {
        self.store.lock().count()
    }

    /// Number of armed reclaim timers.
    pub fn pending_reclaims(&self) -> usize {
        self.reaper.pending_count()
    }

    /// Cancel all reclaim timers. Sessions stay in memory until the
    /// process exits.
    pub fn shutdown(&self) {
        self.reaper.shutdown();
        info!("session hub shut down");
    }

    // ── internals ──────────────────────────────────────────────────────

    /// Validate, plan, serialize, commit, then publish. Nothing is committed
    /// or published unless every earlier step succeeded.
    fn mutate<T>(
        &self,
        session_id: Option<&str>,
        plan: impl FnOnce(&Session, &ClampPolicy) -> (Session, T, StateChange),
    ) -> Result<T> {
        let mut store = self.store.lock();
        let (id, session) = require_session(&store, session_id)?;
        let (next, changed, event) = plan(session, &self.policy);
        let payload = Arc::new(serde_json::to_string(&event)?);
        if !store.commit(&id, next) {
            return Err(HubError::SessionNotFound(id));
        }
        let _ = self.broadcast.publish(&ChannelId::watcher(&id), &payload);
        drop(store);
        Ok(changed)
    }

    fn create_locked(store: &mut SessionStore, id: Option<SessionId>) -> (SessionId, SessionSnapshot) {
        let origin = if id.is_some() { "requested" } else { "generated" };
        let (id, session) = store.create(id);
        let snapshot = session.snapshot();
        counter!(SESSIONS_CREATED_TOTAL, "origin" => origin).increment(1);
        record_active(store);
        (id, snapshot)
    }

    fn release_guest(&self, store: &mut SessionStore, id: SessionId) {
        let Some(guests) = lifecycle::remove_guest(store, &id) else {
            debug!(session_id = %id, "release for unknown session ignored");
            return;
        };
        if guests < 0 {
            warn!(session_id = %id, guests, "guest count went negative");
        }
        if lifecycle::is_quiescent(guests) {
            let hub = self.this.clone();
            info!(session_id = %id, grace_secs = self.reaper.grace().as_secs(), "no guests left, scheduling reclaim");
            self.reaper.schedule(id, move |id| {
                if let Some(hub) = hub.upgrade() {
                    hub.reclaim(id);
                }
            });
        }
    }

    fn reclaim(&self, id: &SessionId) {
        let mut store = self.store.lock();
        match lifecycle::reclaim_if_quiescent(&mut store, id) {
            ReclaimOutcome::Reclaimed => {
                counter!(SESSIONS_RECLAIMED_TOTAL).increment(1);
                record_active(&store);
            }
            ReclaimOutcome::Revived => counter!(SESSIONS_REVIVED_TOTAL).increment(1),
            ReclaimOutcome::AlreadyGone => debug!(session_id = %id, "reclaim found session already gone"),
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn record_active(store: &SessionStore) {
    gauge!(SESSIONS_ACTIVE).set(store.count() as f64);
}

fn record_mutation(kind: &'static str, result: std::result::Result<(), &HubError>) {
    match result {
        Ok(()) => counter!(MUTATIONS_TOTAL, "kind" => kind).increment(1),
        Err(e) => {
            counter!(MUTATION_ERRORS_TOTAL, "kind" => kind, "error_type" => e.error_kind()).increment(1);
            if e.is_client_error() {
                debug!(kind, error = %e, "mutation rejected");
            } else {
                warn!(kind, error = %e, "mutation failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tokio::sync::mpsc;

    const GRACE: Duration = Duration::from_secs(30);

    fn make_hub() -> Arc<SessionHub> {
        SessionHub::new(HubConfig::default(), Arc::new(BroadcastManager::new()))
    }

    fn make_conn(id: &str) -> (Arc<ClientConnection>, mpsc::Receiver<Arc<String>>) {
        let (tx, rx) = mpsc::channel(32);
        (Arc::new(ClientConnection::new(ConnectionId::from(id), tx)), rx)
    }

    fn momentum(id: &str, is_player: bool, is_set: bool, value: i64) -> MomentumRequest {
        MomentumRequest {
            session_id: Some(id.to_owned()),
            is_player,
            is_set,
            momentum: value,
        }
    }

    fn goal(id: &str, is_player: bool, value: i64) -> GoalRequest {
        GoalRequest {
            session_id: Some(id.to_owned()),
            is_player,
            goal: value,
        }
    }

    async fn settle() {
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
    }

    #[test]
    fn config_from_settings_maps_policy() {
        let mut settings = SessionSettings::default();
        settings.clamp_policy = ClampPolicyMode::Baseline;
        settings.reclaim_grace_secs = 5;
        let cfg = HubConfig::from_settings(&settings);
        assert_eq!(cfg.policy, ClampPolicy::baseline());
        assert_eq!(cfg.reclaim_grace, Duration::from_secs(5));
        assert_eq!(cfg.id_generator.length(), 4);
    }

    #[test]
    fn resolve_generates_reuses_and_creates_requested() {
        let hub = make_hub();
        let (generated, snapshot) = hub.resolve_session(None);
        assert_eq!(generated.len(), 4);
        assert_eq!(snapshot.player_goal, 10);

        let (same, _) = hub.resolve_session(Some(generated.as_str()));
        assert_eq!(same, generated);
        assert_eq!(hub.session_count(), 1);

        let (requested, _) = hub.resolve_session(Some("AB12"));
        assert_eq!(requested.as_str(), "AB12");
        assert_eq!(hub.session_count(), 2);

        let (_, _) = hub.resolve_session(Some(""));
        assert_eq!(hub.session_count(), 3);
    }

    #[test]
    fn resolve_existing_keeps_state() {
        let hub = make_hub();
        let _ = hub.resolve_session(Some("AB12"));
        let _ = hub.apply_goal(&goal("AB12", true, 15)).unwrap();
        let (_, snapshot) = hub.resolve_session(Some("AB12"));
        assert_eq!(snapshot.player_goal, 15);
    }

    #[tokio::test]
    async fn worked_example() {
        let hub = make_hub();
        let (conn, mut rx) = make_conn("c1");
        let (id, snapshot) = hub.resolve_session(Some("AB12"));
        assert_eq!(
            snapshot,
            SessionSnapshot { player_goal: 10, player_momentum: 0, opponent_goal: 10, opponent_momentum: 0 }
        );
        hub.subscribe(&conn, &id);

        let changed = hub.apply_momentum(&momentum("AB12", true, false, 5)).unwrap();
        assert_eq!(changed, MomentumChanged { is_player: true, new_momentum: 5 });
        let msg: serde_json::Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
        assert_eq!(msg, serde_json::json!({"isPlayer": true, "newMomentum": 5}));

        let changed = hub.apply_momentum(&momentum("AB12", true, false, -20)).unwrap();
        assert_eq!(changed.new_momentum, 0);
        let msg: serde_json::Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
        assert_eq!(msg["newMomentum"], 0);
        assert_eq!(hub.query_state("AB12").unwrap().player_momentum, 0);
    }

    #[tokio::test]
    async fn goal_update_is_published() {
        let hub = make_hub();
        let (conn, mut rx) = make_conn("c1");
        hub.subscribe(&conn, "AB12");
        let changed = hub.apply_goal(&goal("AB12", false, 5_000)).unwrap();
        assert_eq!(changed, GoalChanged { is_player: false, new_goal: 1_000 });
        let msg: serde_json::Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
        assert_eq!(msg, serde_json::json!({"isPlayer": false, "newGoal": 1000}));
    }

    #[test]
    fn set_reads_back() {
        let hub = make_hub();
        let _ = hub.resolve_session(Some("AB12"));
        let _ = hub.apply_momentum(&momentum("AB12", false, false, 40)).unwrap();
        let _ = hub.apply_momentum(&momentum("AB12", false, true, 3)).unwrap();
        assert_eq!(hub.query_state("AB12").unwrap().opponent_momentum, 3);
    }

    #[test]
    fn baseline_policy_applies() {
        let config = HubConfig { policy: ClampPolicy::baseline(), ..HubConfig::default() };
        let hub = SessionHub::new(config, Arc::new(BroadcastManager::new()));
        let _ = hub.resolve_session(Some("AB12"));
        assert_eq!(hub.apply_goal(&goal("AB12", true, 5_000)).unwrap().new_goal, 5_000);
        assert_eq!(hub.policy(), ClampPolicy::baseline());
    }

    #[tokio::test]
    async fn failed_mutation_publishes_nothing() {
        let hub = make_hub();
        let (conn, mut rx) = make_conn("c1");
        hub.subscribe(&conn, "AB12");
        assert_matches!(
            hub.apply_momentum(&momentum("ZZZZ", true, false, 1)),
            Err(HubError::SessionNotFound(_))
        );
        let mut missing = momentum("AB12", true, false, 1);
        missing.session_id = None;
        assert_matches!(hub.apply_momentum(&missing), Err(HubError::MissingSessionId));
        assert!(rx.try_recv().is_err());
        assert_eq!(hub.session_count(), 1);
    }

    #[test]
    fn query_unknown_is_not_found() {
        let hub = make_hub();
        assert_matches!(hub.query_state("NOPE"), Err(HubError::SessionNotFound(_)));
        assert_matches!(hub.query_state(""), Err(HubError::MissingSessionId));
        assert_eq!(hub.session_count(), 0);
    }

    #[tokio::test]
    async fn updates_only_reach_their_session() {
        let hub = make_hub();
        let (a, mut rx_a) = make_conn("a");
        let (b, mut rx_b) = make_conn("b");
        hub.subscribe(&a, "AAAA");
        hub.subscribe(&b, "BBBB");
        let _ = hub.apply_momentum(&momentum("AAAA", true, false, 1)).unwrap();
        assert!(rx_a.recv().await.is_some());
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn envelopes_drive_subscriptions() {
        let hub = make_hub();
        let (conn, _rx) = make_conn("c1");
        hub.on_connection_message(&conn, r#"{"sessionId":"AB12","type":"subscribe"}"#);
        assert_eq!(hub.guest_count("AB12"), Some(1));
        hub.on_connection_message(&conn, "garbage");
        hub.on_connection_message(&conn, r#"{"sessionId":"AB12","type":"dance"}"#);
        assert_eq!(hub.guest_count("AB12"), Some(1));
        hub.on_connection_message(&conn, r#"{"sessionId":"AB12","type":"unsubscribe"}"#);
        assert_eq!(hub.guest_count("AB12"), Some(0));
        assert_eq!(hub.lifecycle_state("AB12"), LifecycleState::Draining);
    }

    #[tokio::test(start_paused = true)]
    async fn unwatched_session_survives_grace_then_is_reclaimed() {
        let hub = make_hub();
        let (conn, _rx) = make_conn("c1");
        hub.subscribe(&conn, "AB12");
        hub.unsubscribe(&conn.id, "AB12");
        settle().await;

        tokio::time::advance(GRACE - Duration::from_secs(1)).await;
        settle().await;
        assert!(hub.query_state("AB12").is_ok());
        assert_eq!(hub.lifecycle_state("AB12"), LifecycleState::Draining);

        tokio::time::advance(Duration::from_secs(2)).await;
        settle().await;
        assert_matches!(hub.query_state("AB12"), Err(HubError::SessionNotFound(_)));
        assert_eq!(hub.lifecycle_state("AB12"), LifecycleState::Reclaimed);
        assert_eq!(hub.pending_reclaims(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn page_only_sessions_are_never_armed() {
        let hub = make_hub();
        for _ in 0..50 {
            let _ = hub.resolve_session(None);
        }
        settle().await;
        tokio::time::advance(Duration::from_secs(3600)).await;
        settle().await;
        assert_eq!(hub.session_count(), 50);
        assert_eq!(hub.pending_reclaims(), 0);

        // The first watcher to leave arms the timer as usual.
        let (id, _) = hub.resolve_session(None);
        let (conn, _rx) = make_conn("c1");
        hub.subscribe(&conn, &id);
        hub.unsubscribe(&conn.id, &id);
        settle().await;
        tokio::time::advance(GRACE + Duration::from_secs(1)).await;
        settle().await;
        assert_eq!(hub.session_count(), 50);
    }

    #[tokio::test(start_paused = true)]
    async fn resubscribe_within_grace_cancels_reclaim() {
        let hub = make_hub();
        let (conn, _rx) = make_conn("c1");
        hub.subscribe(&conn, "AB12");
        hub.unsubscribe(&conn.id, "AB12");
        settle().await;
        tokio::time::advance(Duration::from_secs(10)).await;

        let (again, _rx2) = make_conn("c2");
        hub.subscribe(&again, "AB12");
        assert_eq!(hub.pending_reclaims(), 0);
        assert_eq!(hub.lifecycle_state("AB12"), LifecycleState::Active);

        tokio::time::advance(GRACE * 2).await;
        settle().await;
        assert!(hub.query_state("AB12").is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn closing_connection_releases_its_guests() {
        let hub = make_hub();
        let (conn, _rx) = make_conn("c1");
        hub.broadcast().add(conn.clone());
        hub.subscribe(&conn, "AB12");
        assert_eq!(hub.guest_count("AB12"), Some(1));

        hub.on_connection_closed(&conn.id);
        assert_eq!(hub.guest_count("AB12"), Some(0));
        assert_eq!(hub.broadcast().connection_count(), 0);
        settle().await;

        tokio::time::advance(GRACE + Duration::from_secs(1)).await;
        settle().await;
        assert_eq!(hub.session_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn one_of_two_guests_leaving_keeps_session_active() {
        let hub = make_hub();
        let (a, _rx_a) = make_conn("a");
        let (b, _rx_b) = make_conn("b");
        hub.subscribe(&a, "AB12");
        hub.subscribe(&b, "AB12");
        hub.unsubscribe(&a.id, "AB12");
        assert_eq!(hub.pending_reclaims(), 0);

        tokio::time::advance(GRACE * 2).await;
        settle().await;
        assert_eq!(hub.lifecycle_state("AB12"), LifecycleState::Active);
    }

    #[tokio::test(start_paused = true)]
    async fn unmatched_unsubscribe_is_harmless() {
        let hub = make_hub();
        let _ = hub.resolve_session(Some("AB12"));
        hub.unsubscribe(&ConnectionId::from("stranger"), "AB12");
        assert_eq!(hub.guest_count("AB12"), Some(-1));
        hub.unsubscribe(&ConnectionId::from("stranger"), "NEVER");
        assert_eq!(hub.session_count(), 1);
        settle().await;

        tokio::time::advance(GRACE + Duration::from_secs(1)).await;
        settle().await;
        assert_eq!(hub.session_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_pending_reclaims() {
        let hub = make_hub();
        let (conn, _rx) = make_conn("c1");
        hub.subscribe(&conn, "AB12");
        hub.unsubscribe(&conn.id, "AB12");
        settle().await;
        hub.shutdown();
        tokio::time::advance(GRACE * 2).await;
        settle().await;
        assert!(hub.query_state("AB12").is_ok());
    }

    #[test]
    fn momentum_never_negative_on_either_side() {
        let hub = make_hub();
        let _ = hub.resolve_session(Some("AB12"));
        for (is_player, delta) in [(true, -5), (false, 3), (false, -50), (true, 100), (true, -1_000)] {
            let _ = hub.apply_momentum(&momentum("AB12", is_player, false, delta)).unwrap();
            let s = hub.query_state("AB12").unwrap();
            assert!(s.player_momentum >= 0 && s.opponent_momentum >= 0);
        }
        let s = hub.query_state("AB12").unwrap();
        assert_eq!(s.opponent_momentum, 0);
    }
}
