use crate::core::rates::{RateSource, Rates};
use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

/// Holds the last successful fetch of `inner` until it is invalidated.
///
/// The lock is held across the inner fetch, so overlapping callers share a
/// single request. Failures are not cached.
pub struct CachingRateSource<T: RateSource> {
    inner: T,
    cached: Mutex<Option<Rates>>,
}

impl<T: RateSource> CachingRateSource<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            cached: Mutex::new(None),
        }
    }

    pub async fn invalidate(&self) {
        let mut cached = self.cached.lock().await;
        debug!("Invalidating cached rates");
        *cached = None;
    }
}

#[async_trait]
impl<T: RateSource> RateSource for CachingRateSource<T> {
    async fn fetch_rates(&self) -> Result<Rates> {
        let mut cached = self.cached.lock().await;
        if let Some(rates) = cached.as_ref() {
            debug!("Cache hit for rates: {}", rates.base_currency);
            return Ok(rates.clone());
        }
        debug!("Cache miss for rates");
        let rates = self.inner.fetch_rates().await?;
        *cached = Some(rates.clone());
        Ok(rates)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Counts calls and fails while `failing` is set.
    #[derive(Default)]
    pub(crate) struct MockRateSource {
        pub call_count: AtomicUsize,
        pub failing: AtomicBool,
    }

    #[async_trait]
    impl RateSource for Arc<MockRateSource> {
        async fn fetch_rates(&self) -> Result<Rates> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            if self.failing.load(Ordering::SeqCst) {
                return Err(anyhow!("Request error: connection refused"));
            }
            Ok(Rates::new(
                "INR",
                HashMap::from([("USD".to_string(), 83.1), ("EUR".to_string(), 0.011)]),
            ))
        }
    }

    #[tokio::test]
    async fn test_caching_rate_source() {
        let inner = Arc::new(MockRateSource::default());
        let caching = CachingRateSource::new(Arc::clone(&inner));

        let first = caching.fetch_rates().await.unwrap();
        assert_eq!(first.get("USD"), Some(83.1));
        assert_eq!(inner.call_count.load(Ordering::SeqCst), 1);

        let second = caching.fetch_rates().await.unwrap();
        assert_eq!(second, first);
        assert_eq!(inner.call_count.load(Ordering::SeqCst), 1);

        caching.invalidate().await;
        caching.fetch_rates().await.unwrap();
        assert_eq!(inner.call_count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let inner = Arc::new(MockRateSource::default());
        inner.failing.store(true, Ordering::SeqCst);
        let caching = CachingRateSource::new(Arc::clone(&inner));

        assert!(caching.fetch_rates().await.is_err());
        inner.failing.store(false, Ordering::SeqCst);
        assert!(caching.fetch_rates().await.is_ok());
        assert_eq!(inner.call_count.load(Ordering::SeqCst), 2);
    }
}
