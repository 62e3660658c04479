use std::time::{Duration, Instant};

use coin_spark::debounce::Debouncer;

#[test]
fn value_is_released_only_after_delay() {
    let t0 = Instant::now();
    let mut d = Debouncer::new(Duration::from_millis(240));
    d.push("b", t0);

    assert_eq!(d.poll(t0 + Duration::from_millis(100)), None);
    assert!(d.is_pending());
    assert_eq!(d.poll(t0 + Duration::from_millis(240)), Some("b"));
    assert!(!d.is_pending());
    assert_eq!(d.poll(t0 + Duration::from_millis(500)), None);
}

#[test]
fn new_push_restarts_the_delay_and_drops_stale_value() {
    let t0 = Instant::now();
    let mut d = Debouncer::new(Duration::from_millis(240));
    d.push("b".to_string(), t0);
    d.push("bt".to_string(), t0 + Duration::from_millis(200));

    assert_eq!(d.poll(t0 + Duration::from_millis(300)), None);
    assert_eq!(
        d.poll(t0 + Duration::from_millis(440)),
        Some("bt".to_string())
    );
}

#[test]
fn cancel_discards_pending_value() {
    let t0 = Instant::now();
    let mut d = Debouncer::new(Duration::from_millis(10));
    d.push(1, t0);
    d.cancel();
    assert_eq!(d.poll(t0 + Duration::from_secs(1)), None);
    assert_eq!(d.delay(), Duration::from_millis(10));
}
