//! Session metric store.
//!
//! Owns a private prometheus `Registry` with the two exported series and
//! implements the `MetricsPublisher` port. Shared between the scheduler
//! (writer) and the HTTP handler (reader) as `Arc<SessionMetricStore>`.

use parking_lot::RwLock;
use prometheus::{Encoder, IntGauge, IntGaugeVec, Opts, Registry, TextEncoder};
use tracing::debug;
use who_core::models::session::AggregationResult;
use who_core::ports::publisher::MetricsPublisher;

/// Name of the distinct-user gauge
pub const UNIQUE_USERS_METRIC: &str = "system_unique_logged_in_users";

/// Name of the per-(username, ip) session gauge
pub const USER_SESSIONS_METRIC: &str = "system_user_sessions";

/// Labels of [`USER_SESSIONS_METRIC`]
pub const SESSION_LABELS: [&str; 2] = ["username", "ip"];

/// Prometheus-backed store for the last completed cycle
pub struct SessionMetricStore {
    registry: Registry,
    unique_users: IntGauge,
    user_sessions: IntGaugeVec,
    /// Write side held for a whole clear-then-repopulate; read side for a gather.
    snapshot: RwLock<()>,
}

impl SessionMetricStore {
    /// Create the gauges and register them in a fresh registry
    pub fn new() -> Result<Self, prometheus::Error> {
        let unique_users = IntGauge::new(
            UNIQUE_USERS_METRIC,
            "Number of unique logged-in users on the system",
        )?;
        let user_sessions = IntGaugeVec::new(
            Opts::new(
                USER_SESSIONS_METRIC,
                "Number of active sessions per user with IP addresses",
            ),
            &SESSION_LABELS,
        )?;

        let registry = Registry::new();
        registry.register(Box::new(unique_users.clone()))?;
        registry.register(Box::new(user_sessions.clone()))?;

        Ok(Self {
            registry,
            unique_users,
            user_sessions,
            snapshot: RwLock::new(()),
        })
    }

    /// Encode the current snapshot in the text exposition format
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let families = {
            let _guard = self.snapshot.read();
            self.registry.gather()
        };

        let mut buffer = Vec::new();
        TextEncoder::new().encode(&families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    /// Current value of the distinct-user gauge
    pub fn unique_users(&self) -> i64 {
        self.unique_users.get()
    }

    /// Current value for one (username, ip) pair, `None` when not exported
    pub fn sessions(&self, username: &str, ip: &str) -> Option<i64> {
        let _guard = self.snapshot.read();
        self.registry
            .gather()
            .into_iter()
            .filter(|family| family.get_name() == USER_SESSIONS_METRIC)
            .flat_map(|family| family.get_metric().to_vec())
            .find(|metric| {
                let labels = metric.get_label();
                labels
                    .iter()
                    .any(|l| l.get_name() == "username" && l.get_value() == username)
                    && labels
                        .iter()
                        .any(|l| l.get_name() == "ip" && l.get_value() == ip)
            })
            .map(|metric| metric.get_gauge().get_value() as i64)
    }

    /// Number of exported (username, ip) samples
    pub fn session_series_count(&self) -> usize {
        let _guard = self.snapshot.read();
        self.registry
            .gather()
            .iter()
            .filter(|family| family.get_name() == USER_SESSIONS_METRIC)
            .map(|family| family.get_metric().len())
            .sum()
    }
}

impl MetricsPublisher for SessionMetricStore {
    fn publish(&self, result: &AggregationResult) {
        let _guard = self.snapshot.write();

        self.unique_users.set(to_gauge(result.unique_users as u64));

        self.user_sessions.reset();
        for (key, count) in &result.session_counts {
            self.user_sessions
                .with_label_values(&[key.username.as_str(), key.address.as_str()])
                .set(to_gauge(*count));
        }

        debug!(
            "published {} users, {} session series",
            result.unique_users,
            result.session_counts.len()
        );
    }
}

fn to_gauge(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use who_core::models::session::SessionKey;

    fn result(unique_users: usize, sessions: &[(&str, &str, u64)]) -> AggregationResult {
        AggregationResult {
            unique_users,
            session_counts: sessions
                .iter()
                .map(|(user, ip, count)| (SessionKey::new(*user, *ip), *count))
                .collect(),
            malformed_lines: Vec::new(),
        }
    }

    #[test]
    fn new_store_renders_scalar_gauge() {
        let store = SessionMetricStore::new().unwrap();
        let text = store.render().unwrap();

        assert!(text.contains("# TYPE system_unique_logged_in_users gauge"));
        assert!(text.contains("system_unique_logged_in_users 0"));
        assert_eq!(store.session_series_count(), 0);
    }

    #[test]
    fn publish_sets_both_series() {
        let store = SessionMetricStore::new().unwrap();
        store.publish(&result(
            2,
            &[
                ("alice", "10.0.0.1", 1),
                ("alice", "10.0.0.2", 1),
                ("bob", "10.0.0.1", 3),
            ],
        ));

        assert_eq!(store.unique_users(), 2);
        assert_eq!(store.sessions("alice", "10.0.0.1"), Some(1));
        assert_eq!(store.sessions("bob", "10.0.0.1"), Some(3));
        assert_eq!(store.session_series_count(), 3);

        let text = store.render().unwrap();
        assert!(text.contains("# HELP system_user_sessions"));
        let bob = text
            .lines()
            .find(|l| l.starts_with("system_user_sessions{") && l.contains(r#"username="bob""#))
            .unwrap();
        assert!(bob.contains(r#"ip="10.0.0.1""#));
        assert!(bob.ends_with(" 3"));
        assert!(text.contains("system_unique_logged_in_users 2"));
    }

    #[test]
    fn publish_drops_stale_pairs() {
        let store = SessionMetricStore::new().unwrap();
        store.publish(&result(2, &[("alice", "10.0.0.1", 1), ("bob", "10.0.0.2", 1)]));
        store.publish(&result(1, &[("alice", "10.0.0.1", 2)]));

        assert_eq!(store.unique_users(), 1);
        assert_eq!(store.sessions("alice", "10.0.0.1"), Some(2));
        assert_eq!(store.sessions("bob", "10.0.0.2"), None);
        assert!(!store.render().unwrap().contains("bob"));
    }

    #[test]
    fn empty_cycle_clears_labeled_series() {
        let store = SessionMetricStore::new().unwrap();
        store.publish(&result(1, &[("alice", "10.0.0.1", 1)]));
        store.publish(&AggregationResult::default());

        assert_eq!(store.unique_users(), 0);
        assert_eq!(store.session_series_count(), 0);
    }

    #[test]
    fn stores_are_independent() {
        let first = SessionMetricStore::new().unwrap();
        let second = SessionMetricStore::new().unwrap();
        first.publish(&result(5, &[]));

        assert_eq!(first.unique_users(), 5);
        assert_eq!(second.unique_users(), 0);
    }
}
