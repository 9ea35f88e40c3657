use std::rc::Rc;

use chrono::NaiveTime;
use state_inspect::{FixedClock, SubscriberId, SubscriberRegistry};

fn registry() -> SubscriberRegistry {
    let clock = Rc::new(FixedClock(NaiveTime::from_hms_milli_opt(16, 20, 0, 5).unwrap()));
    SubscriberRegistry::new("Unknown", clock)
}

#[test]
fn repeated_passes_aggregate_paths() {
    let mut registry = registry();
    for reads in [&["a"][..], &["a", "b"][..], &["c"][..]] {
        let token = registry.begin_read_pass(Some("Panel"));
        for path in reads {
            registry.record_read(path);
        }
        assert!(registry.finalize_pass(token));
    }
    let record = registry.get(&SubscriberId::new("snapshot-Panel")).unwrap();
    assert_eq!(record.paths, vec!["a", "b", "c"]);
    assert_eq!(record.render_count, 3);
    assert_eq!(record.last_render, "16:20:00.005");
}

#[test]
fn last_context_wins() {
    let mut registry = registry();
    let first = registry.begin_read_pass(Some("A"));
    registry.record_read("a.x");
    let second = registry.begin_read_pass(Some("B"));
    registry.record_read("b.y");

    assert!(!registry.finalize_pass(first));
    assert!(registry.is_tracking());
    assert!(registry.finalize_pass(second));
    assert!(!registry.finalize_pass(second));

    let a = registry.get(&SubscriberId::new("snapshot-A")).unwrap();
    let b = registry.get(&SubscriberId::new("snapshot-B")).unwrap();
    assert!(a.paths.is_empty());
    assert_eq!(a.render_count, 1);
    assert_eq!(b.paths, vec!["b.y"]);
}

#[test]
fn unlabeled_pass_uses_default_label() {
    let mut registry = registry();
    let token = registry.begin_read_pass(None);
    registry.finalize_pass(token);
    let record = registry.get(&SubscriberId::new("snapshot-Unknown")).unwrap();
    assert_eq!(record.component, "Unknown");
}

#[test]
fn subscriptions_and_passes_share_one_listing() {
    let mut registry = registry();
    let sub = registry.register_subscription(Some("Counter"));
    let token = registry.begin_read_pass(Some("Counter"));
    registry.record_read("count");
    registry.finalize_pass(token);
    registry.notify(&sub);

    let records = registry.records();
    assert_eq!(registry.len(), 2);
    assert_eq!(records[0].id, sub);
    assert_eq!(records[0].render_count, 1);
    assert!(records[0].paths.is_empty());
    assert_eq!(records[1].id.as_str(), "snapshot-Counter");
    assert_eq!(records[1].paths, vec!["count"]);
}
