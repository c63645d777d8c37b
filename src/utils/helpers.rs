//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the application.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Local, Utc};
use tracing::warn;

/// Backoff policy for `retry_with_backoff`
#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    pub retries: u32,
    pub initial_delay: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            retries: 3,
            initial_delay: Duration::from_millis(1000),
        }
    }
}

/// Run `op` until it succeeds or the retries are used up, doubling the delay each time
pub async fn retry_with_backoff<T, E, F, Fut>(policy: Backoff, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut delay = policy.initial_delay;
    let mut remaining = policy.retries;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if remaining == 0 => return Err(e),
            Err(e) => {
                warn!(error = %e, retries_left = remaining, delay_ms = delay.as_millis() as u64, "Request failed, retrying");
                tokio::time::sleep(delay).await;
                remaining -= 1;
                delay *= 2;
            }
        }
    }
}

/// Case-insensitive substring test
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Wall-clock time as `HH:MM:SS`, as the dashboard shows it
pub fn format_clock(timestamp: DateTime<Utc>) -> String {
    timestamp.with_timezone(&Local).format("%H:%M:%S").to_string()
}

/// Truncate text to a maximum length with ellipsis
pub fn truncate_text(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max_length.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("Maria Garcia", "garc"));
        assert!(contains_ignore_case("B.Tech CSE - IoT", "iot"));
        assert!(contains_ignore_case("anything", ""));
        assert!(!contains_ignore_case("Alex", "bob"));
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("a long student name", 10), "a long ...");
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_succeeds_after_failures() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();

        let result: Result<u32, String> = retry_with_backoff(Backoff::default(), || {
            let counter = counter.clone();
            async move {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                if n < 2 { Err("boom".to_string()) } else { Ok(n) }
            }
        })
        .await;

        assert_eq!(result, Ok(2));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_waits_between_attempts() {
        let mut first = true;
        let mut retry = tokio_test::task::spawn(retry_with_backoff(Backoff::default(), move || {
            let fail = std::mem::replace(&mut first, false);
            async move { if fail { Err("boom") } else { Ok(()) } }
        }));

        tokio_test::assert_pending!(retry.poll());
        tokio::time::advance(Duration::from_millis(1000)).await;
        tokio_test::assert_ready_ok!(retry.poll());
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_gives_up() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();

        let result: Result<(), String> = retry_with_backoff(Backoff::default(), || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err("down".to_string())
            }
        })
        .await;

        assert_eq!(result, Err("down".to_string()));
        assert_eq!(attempts.load(Ordering::SeqCst), 4);
    }
}
