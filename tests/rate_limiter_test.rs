//! Tests for [`RateLimiter`]: per-caller sliding-window admission.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use cardseer::{RateLimitConfig, RateLimiter};

#[test]
fn config_defaults() {
    let config = RateLimitConfig::default();
    assert_eq!(config.max_calls, 10);
    assert_eq!(config.interval, Duration::from_secs(60));
}

#[tokio::test(start_paused = true)]
async fn eleventh_call_in_window_rejected() {
    let limiter = RateLimiter::default();
    for _ in 0..10 {
        assert!(limiter.allow(1));
    }
    assert!(!limiter.allow(1));
}

#[tokio::test(start_paused = true)]
async fn window_slides() {
    let limiter = RateLimiter::default();

    for _ in 0..5 {
        assert!(limiter.allow(1));
    }
    tokio::time::advance(Duration::from_secs(30)).await;
    for _ in 0..5 {
        assert!(limiter.allow(1));
    }
    assert!(!limiter.allow(1));

    // The first five are now older than the interval.
    tokio::time::advance(Duration::from_secs(31)).await;
    assert_eq!(limiter.remaining(1), 5);
    for _ in 0..5 {
        assert!(limiter.allow(1));
    }
    assert!(!limiter.allow(1));
}

#[tokio::test(start_paused = true)]
async fn entry_exactly_one_interval_old_still_counts() {
    let limiter = RateLimiter::new(RateLimitConfig::new().max_calls(1));
    assert!(limiter.allow(1));

    tokio::time::advance(Duration::from_secs(60)).await;
    assert!(!limiter.allow(1));

    tokio::time::advance(Duration::from_millis(1)).await;
    assert!(limiter.allow(1));
}

#[tokio::test(start_paused = true)]
async fn rejection_does_not_extend_the_wait() {
    let limiter = RateLimiter::new(
        RateLimitConfig::new()
            .max_calls(2)
            .interval(Duration::from_secs(10)),
    );
    assert!(limiter.allow(9));
    assert!(limiter.allow(9));

    // Hammering while throttled records nothing.
    for _ in 0..5 {
        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(!limiter.allow(9));
    }

    tokio::time::advance(Duration::from_secs(6)).await;
    assert!(limiter.allow(9));
}

#[test]
fn concurrent_calls_never_exceed_limit() {
    let limiter = Arc::new(RateLimiter::default());
    let admitted = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..64)
        .map(|_| {
            let limiter = Arc::clone(&limiter);
            let admitted = Arc::clone(&admitted);
            std::thread::spawn(move || {
                if limiter.allow(77) {
                    admitted.fetch_add(1, Ordering::SeqCst);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(admitted.load(Ordering::SeqCst), 10);
    assert_eq!(limiter.remaining(77), 0);
}
