//! Property tests for log error extraction

use dex_connection::tx_submit::extract_log_errors;
use proptest::prelude::*;

// Log text that cannot itself contain the marker or a line break
fn plain_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 _.,:()]{0,40}".prop_filter("no marker", |s| !s.contains("Error: "))
}

proptest! {
    #[test]
    fn every_marked_line_yields_its_message_once(
        lines in prop::collection::vec((plain_text(), any::<bool>(), plain_text()), 0..20)
    ) {
        let mut logs = Vec::new();
        let mut expected = Vec::new();
        for (prefix, marked, message) in &lines {
            if *marked {
                logs.push(format!("{}Error: {}", prefix, message));
                expected.push(message.clone());
            } else {
                logs.push(format!("{}|{}", prefix, message));
            }
        }

        prop_assert_eq!(extract_log_errors(&logs), expected);
    }

    #[test]
    fn unmarked_logs_yield_nothing(lines in prop::collection::vec(plain_text(), 0..20)) {
        prop_assert!(extract_log_errors(&lines).is_empty());
    }
}
