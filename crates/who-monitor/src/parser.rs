//! Session table aggregation.
//!
//! Turns raw `who` output into the distinct-user count and the
//! per-(username, address) session counts. Pure; no I/O besides logging.

use std::collections::HashSet;

use tracing::{debug, warn};
use who_core::models::session::{AggregationResult, SessionRecord};

/// Aggregate one cycle of session-listing output.
///
/// Empty lines are skipped silently. Lines with too few fields are logged,
/// recorded in [`AggregationResult::malformed_lines`] and skipped; the rest
/// of the batch is still processed.
pub fn aggregate(raw: &str) -> AggregationResult {
    let mut users: HashSet<String> = HashSet::new();
    let mut result = AggregationResult::default();

    for line in raw.split('\n') {
        if line.is_empty() {
            continue;
        }

        let record = match SessionRecord::parse_line(line) {
            Ok(record) => record,
            Err(e) => {
                warn!("skipping malformed line: {}", e.line);
                result.malformed_lines.push(e.line);
                continue;
            }
        };

        *result.session_counts.entry(record.key()).or_insert(0) += 1;
        users.insert(record.username);
    }

    result.unique_users = users.len();

    debug!(
        "aggregated {} sessions for {} users ({} malformed lines)",
        result.total_sessions(),
        result.unique_users,
        result.malformed_lines.len()
    );

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    const THREE_SESSIONS: &str = "\
alice  pts/0  2024-01-01 10:00 (10.0.0.1)
alice  pts/1  2024-01-01 10:05 (10.0.0.2)
bob    pts/2  2024-01-01 11:00 (10.0.0.1)
";

    #[test]
    fn counts_users_and_sessions() {
        let result = aggregate(THREE_SESSIONS);

        assert_eq!(result.unique_users, 2);
        assert_eq!(result.session_counts.len(), 3);
        assert_eq!(result.sessions_for("alice", "10.0.0.1"), 1);
        assert_eq!(result.sessions_for("alice", "10.0.0.2"), 1);
        assert_eq!(result.sessions_for("bob", "10.0.0.1"), 1);
        assert!(result.malformed_lines.is_empty());
    }

    #[test]
    fn duplicate_lines_increment_the_same_counter() {
        let raw = "alice pts/0 2024-01-01 10:00 (10.0.0.1)\n\
                   alice pts/0 2024-01-01 10:00 (10.0.0.1)\n";
        let result = aggregate(raw);

        assert_eq!(result.unique_users, 1);
        assert_eq!(result.session_counts.len(), 1);
        assert_eq!(result.sessions_for("alice", "10.0.0.1"), 2);
    }

    #[test]
    fn empty_input_yields_empty_result() {
        let result = aggregate("");
        assert_eq!(result, AggregationResult::default());
    }

    #[test]
    fn empty_lines_are_not_diagnosed() {
        let raw = "\n\nalice pts/0 2024-01-01 10:00 (10.0.0.1)\n\n\n";
        let result = aggregate(raw);

        assert_eq!(result.total_sessions(), 1);
        assert!(result.malformed_lines.is_empty());
    }

    #[test]
    fn four_field_line_is_skipped_five_is_accepted() {
        let raw = "root tty1 2024-01-01 09:00\n\
                   dave pts/4 2024-01-01 09:30 10.1.1.1\n";
        let result = aggregate(raw);

        assert_eq!(result.malformed_lines, vec!["root tty1 2024-01-01 09:00"]);
        assert_eq!(result.unique_users, 1);
        assert_eq!(result.sessions_for("dave", "10.1.1.1"), 1);
    }

    #[test]
    fn malformed_lines_do_not_abort_the_batch() {
        let raw = "garbage\n\
                   alice pts/0 2024-01-01 10:00 (10.0.0.1)\n\
                   x y\n\
                   bob pts/1 2024-01-01 10:01 (10.0.0.9)\n";
        let result = aggregate(raw);

        assert_eq!(result.malformed_lines.len(), 2);
        assert_eq!(result.unique_users, 2);
        assert_eq!(result.total_sessions(), 2);
    }

    #[test]
    fn whitespace_only_line_is_malformed() {
        let result = aggregate("   \n");
        assert_eq!(result.malformed_lines, vec!["   "]);
        assert_eq!(result.total_sessions(), 0);
    }

    #[test]
    fn crlf_input_is_tokenized_cleanly() {
        let raw = "alice pts/0 2024-01-01 10:00 (10.0.0.1)\r\n";
        let result = aggregate(raw);
        assert_eq!(result.sessions_for("alice", "10.0.0.1"), 1);
    }

    #[test]
    fn user_with_many_addresses_counts_once() {
        let raw = "eve pts/0 2024-01-01 10:00 (10.0.0.1)\n\
                   eve pts/1 2024-01-01 10:00 (10.0.0.2)\n\
                   eve pts/2 2024-01-01 10:00 (10.0.0.3)\n\
                   eve pts/3 2024-01-01 10:00 (10.0.0.3)\n";
        let result = aggregate(raw);

        assert_eq!(result.unique_users, 1);
        assert_eq!(result.session_counts.len(), 3);
        assert_eq!(result.sessions_for("eve", "10.0.0.3"), 2);
    }

    #[test]
    fn no_case_normalization() {
        let raw = "Alice pts/0 2024-01-01 10:00 (HOST)\n\
                   alice pts/1 2024-01-01 10:00 (host)\n";
        let result = aggregate(raw);

        assert_eq!(result.unique_users, 2);
        assert_eq!(result.sessions_for("Alice", "HOST"), 1);
        assert_eq!(result.sessions_for("alice", "host"), 1);
    }

    #[test]
    fn session_sum_matches_accepted_lines() {
        let raw = format!("{THREE_SESSIONS}short line\n{THREE_SESSIONS}\n");
        let result = aggregate(&raw);

        let accepted = raw
            .split('\n')
            .filter(|l| l.split_whitespace().count() >= 5)
            .count() as u64;
        assert_eq!(result.total_sessions(), accepted);
        assert_eq!(result.total_sessions(), 6);
        assert_eq!(result.unique_users, 2);
    }
}
