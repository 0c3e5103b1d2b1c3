pub mod ratgdo;

use crate::metrics::{MetricDesc, MetricSample};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

#[async_trait]
pub trait Collector: Send + Sync {
    /// name of the collector as used in logs
    fn name(&self) -> &'static str;

    /// every descriptor this collector may emit, fixed for its lifetime.
    fn describe(&self) -> Vec<Arc<MetricDesc>>;

    /// run one scrape. failures are reported through the samples, never as an error.
    async fn collect(&self) -> Vec<MetricSample>;
}

/// Run `collect` and log its latency.
pub async fn timed_collect(collector: &dyn Collector) -> Vec<MetricSample> {
    let start = Instant::now();
    let samples = collector.collect().await;
    let latency = start.elapsed();

    tracing::debug!(
        collector = collector.name(),
        samples = samples.len(),
        latency_us = latency.as_micros() as u64,
        "scrape finished"
    );

    samples
}
