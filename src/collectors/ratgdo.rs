use super::Collector;
use crate::client::{DeviceApi, DoorState, StatusRecord};
use crate::metrics::{MetricDesc, MetricSample};
use async_trait::async_trait;
use std::sync::Arc;

pub const DEVICE_LABEL: &str = "device";

/// Device label used when auth succeeded but the status could not be read.
pub const UNKNOWN_DEVICE: &str = "unknown";

/// Descriptor set for a ratgdo device, built once per collector.
#[derive(Debug)]
pub struct RatgdoMetrics {
    pub up: Arc<MetricDesc>,
    pub uptime: Arc<MetricDesc>,
    pub openings: Arc<MetricDesc>,
    pub free_heap: Arc<MetricDesc>,
    pub door_state: Arc<MetricDesc>,
    /// Registered but never sampled: the lock state is not exported yet.
    pub lock_state: Arc<MetricDesc>,
    pub open_duration: Arc<MetricDesc>,
    pub light_on: Arc<MetricDesc>,
}

impl RatgdoMetrics {
    pub fn new() -> Self {
        Self {
            up: MetricDesc::new(
                "ratgdo_up",
                "Whether the exporter could reach the ratgdo API",
                DEVICE_LABEL,
            ),
            uptime: MetricDesc::new("ratgdo_uptime_seconds", "Uptime of the device", DEVICE_LABEL),
            // Gauge on purpose: the device owns the counter, we only mirror it.
            openings: MetricDesc::new(
                "ratgdo_openings_total",
                "Number of garage door openings",
                DEVICE_LABEL,
            ),
            free_heap: MetricDesc::new(
                "ratgdo_free_heap_bytes",
                "Amount of free heap memory on the device",
                DEVICE_LABEL,
            ),
            door_state: MetricDesc::new(
                "ratgdo_garage_door_state",
                "State of the garage door, either open, closed, or unknown",
                DEVICE_LABEL,
            ),
            lock_state: MetricDesc::new(
                "ratgdo_garage_door_lock_state",
                "Describes if the garage door is locked or not",
                DEVICE_LABEL,
            ),
            open_duration: MetricDesc::new(
                "ratgdo_open_duration",
                "Duration of a lift cycle",
                DEVICE_LABEL,
            ),
            light_on: MetricDesc::new(
                "ratgdo_garage_light_on",
                "Status of the garage light",
                DEVICE_LABEL,
            ),
        }
    }

    pub fn all(&self) -> Vec<Arc<MetricDesc>> {
        vec![
            self.up.clone(),
            self.uptime.clone(),
            self.openings.clone(),
            self.free_heap.clone(),
            self.door_state.clone(),
            self.lock_state.clone(),
            self.open_duration.clone(),
            self.light_on.clone(),
        ]
    }
}

impl Default for RatgdoMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Open -> 1, Closed -> 0, anything else -> -1.
pub fn door_state_value(state: &DoorState) -> f64 {
    match state {
        DoorState::Open => 1.0,
        DoorState::Closed => 0.0,
        DoorState::Unrecognized(_) => -1.0,
    }
}

pub fn light_value(on: bool) -> f64 {
    if on {
        1.0
    } else {
        0.0
    }
}

/// Polls one ratgdo device per scrape: auth, then status.json.
pub struct RatgdoCollector<A> {
    api: A,
    metrics: RatgdoMetrics,
}

impl<A: DeviceApi> RatgdoCollector<A> {
    pub fn new(api: A) -> Self {
        Self::with_metrics(api, RatgdoMetrics::new())
    }

    pub fn with_metrics(api: A, metrics: RatgdoMetrics) -> Self {
        Self { api, metrics }
    }

    fn status_samples(&self, status: &StatusRecord) -> Vec<MetricSample> {
        let m = &self.metrics;
        let device = || Some(status.device_name.clone());
        vec![
            MetricSample::new(&m.up, 1.0, device()),
            MetricSample::new(&m.uptime, status.uptime_seconds, device()),
            MetricSample::new(&m.openings, status.openings_count, device()),
            MetricSample::new(&m.free_heap, status.free_heap_bytes, device()),
            MetricSample::new(&m.open_duration, status.open_duration_seconds, device()),
            MetricSample::new(&m.door_state, door_state_value(&status.door_state), device()),
            MetricSample::new(&m.light_on, light_value(status.light_on), device()),
        ]
    }
}

#[async_trait]
impl<A: DeviceApi> Collector for RatgdoCollector<A> {
    fn name(&self) -> &'static str {
        "ratgdo"
    }

    fn describe(&self) -> Vec<Arc<MetricDesc>> {
        self.metrics.all()
    }

    async fn collect(&self) -> Vec<MetricSample> {
        if let Err(e) = self.api.authenticate().await {
            tracing::warn!(error = %e, "ratgdo auth failed");
            return vec![MetricSample::new(&self.metrics.up, 0.0, None)];
        }

        let status = match self.api.get_status().await {
            Ok(status) => status,
            Err(e) => {
                tracing::warn!(error = %e, "failed to get ratgdo status");
                return vec![MetricSample::new(
                    &self.metrics.up,
                    0.0,
                    Some(UNKNOWN_DEVICE.to_string()),
                )];
            }
        };
        tracing::debug!(?status, "ratgdo status received");

        self.status_samples(&status)
    }
}
