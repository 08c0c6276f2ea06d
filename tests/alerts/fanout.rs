//! Availability matching and fan-out.

use availability_alerts::{validate_availability_event, FanoutReason};

use crate::support::{event_body, harness, sorted, subscribe_body};

#[test]
fn zero_count_skips_without_query() {
    let h = harness();
    h.alerts.create_subscription(&subscribe_body("a@x.com", "iPad"));

    let event = validate_availability_event(&event_body("iPad", 0)).unwrap();
    let result = h.alerts.matcher().handle(&event).unwrap();

    assert!(result.skipped);
    assert!(result.notified.is_empty());
    assert_eq!(result.reason, FanoutReason::NotActionable);
    assert_eq!(h.store.queries(), 0);
    assert!(h.sink.notifications().is_empty());
}

#[test]
fn no_subscribers_queries_once() {
    let h = harness();
    h.alerts.create_subscription(&subscribe_body("a@x.com", "iPad"));

    let event = validate_availability_event(&event_body("Galaxy S24", 4)).unwrap();
    let result = h.alerts.matcher().handle(&event).unwrap();

    assert!(!result.skipped);
    assert!(result.notified.is_empty());
    assert_eq!(result.reason, FanoutReason::NoSubscribers);
    assert_eq!(h.store.queries(), 1);
    assert!(h.sink.notifications().is_empty());
}

#[test]
fn n_subscribers_get_one_sink_call() {
    let h = harness();
    let emails = ["a@x.com", "b@x.com", "c@x.com", "d@x.com"];
    for email in emails {
        h.subscribe("Pixel 8", email);
    }
    h.subscribe("iPad", "e@x.com");

    let event = validate_availability_event(&event_body("Pixel 8", 2)).unwrap();
    let result = h.alerts.matcher().handle(&event).unwrap();

    assert_eq!(result.reason, FanoutReason::Notified);
    assert_eq!(sorted(result.notified.clone()), emails.to_vec());
    assert_eq!(h.store.queries(), 1);

    let sent = h.sink.notifications();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipients, result.notified);
    assert_eq!(sent[0].event, event);
}

#[test]
fn two_subscribers_scenario() {
    let h = harness();
    h.alerts.create_subscription(&subscribe_body("a@x.com", "Pixel 8"));
    h.alerts.create_subscription(&subscribe_body("b@x.com", "Pixel 8"));

    let reply = h.alerts.device_availability(&event_body("Pixel 8", 3));
    assert_eq!(reply.status, 202);

    let sent = h.sink.notifications();
    assert_eq!(sent.len(), 1);
    assert_eq!(sorted(sent[0].recipients.clone()), vec!["a@x.com", "b@x.com"]);
}

#[test]
fn resubscribing_does_not_duplicate_recipients() {
    let h = harness();
    h.alerts.create_subscription(&subscribe_body("a@x.com", "Pixel 8"));
    h.alerts.create_subscription(&subscribe_body("a@x.com", "Pixel 8"));

    let event = validate_availability_event(&event_body("Pixel 8", 1)).unwrap();
    let result = h.alerts.matcher().handle(&event).unwrap();

    assert_eq!(result.notified, vec!["a@x.com"]);
}

#[test]
fn invalid_event_reports_all_errors() {
    let h = harness();
    let reply = h.alerts.device_availability(&serde_json::json!({
        "deviceModel": "iPad",
        "availableCount": -1,
        "timestamp": "not-a-date"
    }));

    assert_eq!(reply.status, 400);
    assert_eq!(
        reply.body["details"],
        serde_json::json!([
            "availableCount must be a non-negative integer",
            "timestamp must be a valid date/time string"
        ])
    );
    assert_eq!(h.store.queries(), 0);
}
