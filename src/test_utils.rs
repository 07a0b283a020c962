use crate::core::error::UpstreamError;
use crate::core::rates::{RateSource, RateTable};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Serves a fixed table (or a fixed failure) and counts fetches.
pub(crate) struct StaticSource {
    table: Option<RateTable>,
    call_count: AtomicUsize,
}

impl StaticSource {
    pub(crate) fn new(table: RateTable) -> Self {
        Self {
            table: Some(table),
            call_count: AtomicUsize::new(0),
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            table: None,
            call_count: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RateSource for StaticSource {
    async fn fetch(&self) -> Result<RateTable, UpstreamError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.table.clone().ok_or_else(|| UpstreamError::Parse {
            url: "static://rates".to_string(),
            reason: "source unavailable".to_string(),
        })
    }
}
