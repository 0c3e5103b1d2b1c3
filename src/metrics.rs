//! Metric descriptors, per-scrape samples and their text exposition.
//!
//! Descriptors are built once and shared behind `Arc`; samples point back at
//! the descriptor they belong to so a scrape can never emit a metric that was
//! not announced up front.

use prometheus_client::collector::Collector as ExpositionCollector;
use prometheus_client::encoding::text::encode;
use prometheus_client::encoding::{DescriptorEncoder, EncodeMetric};
use prometheus_client::metrics::gauge::ConstGauge;
use prometheus_client::metrics::MetricType;
use prometheus_client::registry::Registry;
use std::sync::Arc;

/// Content type produced by [`render`].
pub const OPENMETRICS_CONTENT_TYPE: &str =
    "application/openmetrics-text; version=1.0.0; charset=utf-8";

/// Static identity of a gauge: name, help text and its single label key.
#[derive(Debug, PartialEq, Eq)]
pub struct MetricDesc {
    pub name: &'static str,
    pub help: &'static str,
    pub label: &'static str,
}

impl MetricDesc {
    pub fn new(name: &'static str, help: &'static str, label: &'static str) -> Arc<Self> {
        Arc::new(Self { name, help, label })
    }
}

/// One gauge value observed during a scrape.
#[derive(Debug, Clone)]
pub struct MetricSample {
    pub desc: Arc<MetricDesc>,
    pub value: f64,
    /// `None` when the label value is not known, e.g. before auth succeeded.
    pub label_value: Option<String>,
}

impl MetricSample {
    pub fn new(desc: &Arc<MetricDesc>, value: f64, label_value: Option<String>) -> Self {
        Self {
            desc: Arc::clone(desc),
            value,
            label_value,
        }
    }
}

/// Samples of one scrape, grouped by descriptor in announcement order.
#[derive(Debug)]
struct ScrapeSnapshot {
    families: Vec<(Arc<MetricDesc>, Vec<MetricSample>)>,
}

impl ScrapeSnapshot {
    fn new(descs: &[Arc<MetricDesc>], samples: &[MetricSample]) -> Self {
        let families = descs
            .iter()
            .map(|desc| {
                let members: Vec<MetricSample> = samples
                    .iter()
                    .filter(|s| Arc::ptr_eq(&s.desc, desc))
                    .cloned()
                    .collect();
                (Arc::clone(desc), members)
            })
            .filter(|(_, members)| !members.is_empty())
            .collect();
        Self { families }
    }
}

impl ExpositionCollector for ScrapeSnapshot {
    fn encode(&self, mut encoder: DescriptorEncoder) -> Result<(), std::fmt::Error> {
        for (desc, members) in &self.families {
            let mut family = encoder.encode_descriptor(desc.name, desc.help, None, MetricType::Gauge)?;
            // an unlabeled series has to go through the family encoder itself,
            // encode_family would write `name{}`
            let mut bare = None;
            for sample in members {
                match &sample.label_value {
                    Some(v) => {
                        let labels = vec![(desc.label.to_string(), v.clone())];
                        ConstGauge::new(sample.value).encode(family.encode_family(&labels)?)?;
                    }
                    None => bare = Some(sample.value),
                }
            }
            if let Some(value) = bare {
                ConstGauge::new(value).encode(family)?;
            }
        }
        Ok(())
    }
}

/// Render a scrape in OpenMetrics text format.
///
/// Families without samples are left out; samples whose descriptor is not in
/// `descs` are dropped.
pub fn render(descs: &[Arc<MetricDesc>], samples: &[MetricSample]) -> Result<String, std::fmt::Error> {
    let mut registry = Registry::default();
    registry.register_collector(Box::new(ScrapeSnapshot::new(descs, samples)));

    let mut buf = String::new();
    encode(&mut buf, &registry)?;
    Ok(buf)
}
