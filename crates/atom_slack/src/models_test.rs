#[cfg(test)]
mod tests {
    use crate::models::{ts_to_rfc3339, SlackMessage};
    use crate::skills::{briefing_query, is_slack_id};
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn slack_ids() {
        assert!(is_slack_id("C024BE91L"));
        assert!(is_slack_id("U0G9QF9C6X"));
        assert!(!is_slack_id("#general"));
        assert!(!is_slack_id("c024be91l"));
        assert!(!is_slack_id("X024BE91L"));
        assert!(!is_slack_id("C1234"));
    }

    #[test]
    fn ts_conversion() {
        assert_eq!(
            ts_to_rfc3339("1712345678.000200").as_deref(),
            Some("2024-04-05T19:34:38.000Z")
        );
        assert_eq!(
            ts_to_rfc3339("1712345678.5").as_deref(),
            Some("2024-04-05T19:34:38.500Z")
        );
        assert_eq!(ts_to_rfc3339("not-a-ts"), None);
    }

    #[test]
    fn search_match_mapping() {
        let raw = json!({
            "ts": "1712345678.000200",
            "thread_ts": "1712345600.000100",
            "user": "U0G9QF9C6",
            "username": "ada",
            "text": "ship it",
            "permalink": "https://acme.slack.com/archives/C1/p1",
            "channel": {"id": "C024BE91L", "name": "general"}
        });
        let message = SlackMessage::from_search_match(&raw);
        assert_eq!(message.id, "1712345678.000200");
        assert_eq!(message.thread_id.as_deref(), Some("1712345600.000100"));
        assert_eq!(message.user_name.as_deref(), Some("ada"));
        assert_eq!(message.channel_name.as_deref(), Some("general"));
        assert_eq!(message.permalink.as_deref(), Some("https://acme.slack.com/archives/C1/p1"));
        assert_eq!(message.raw, raw);
    }

    #[test]
    fn history_entry_leaves_names_for_enrichment() {
        let raw = json!({"ts": "1712345678.000200", "user": "U0G9QF9C6", "text": "hi"});
        let message = SlackMessage::from_history(&raw, Some("D0123ABCD"));
        assert_eq!(message.channel_id.as_deref(), Some("D0123ABCD"));
        assert!(message.channel_name.is_none());
        assert!(message.user_name.is_none());
    }

    #[test]
    fn briefing_query_with_and_without_user() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 28).unwrap();
        assert_eq!(
            briefing_query(Some("U0G9QF9C6"), date),
            "(@U0G9QF9C6 OR to:U0G9QF9C6 OR in:U0G9QF9C6) after:2026-02-28 before:2026-03-01 sort:timestamp dir:desc"
        );
        assert_eq!(
            briefing_query(None, date),
            "(is:dm) after:2026-02-28 before:2026-03-01 sort:timestamp dir:desc"
        );
    }
}
