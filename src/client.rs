use crate::errors::ClientError;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Deserializer};
use std::time::Duration;

/// Bound applied to every call against the device.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

pub const AUTH_PATH: &str = "/auth";
pub const STATUS_PATH: &str = "/status.json";

/// The two-step protocol spoken by a ratgdo device.
#[async_trait]
pub trait DeviceApi: Send + Sync {
    /// GET /auth, succeeding only on HTTP 200.
    async fn authenticate(&self) -> Result<(), ClientError>;

    /// GET /status.json and decode it.
    async fn get_status(&self) -> Result<StatusRecord, ClientError>;
}

/// Snapshot of the device as reported by status.json.
///
/// Missing and `null` fields decode to their zero value, unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StatusRecord {
    #[serde(rename = "upTime", deserialize_with = "null_as_default")]
    pub uptime_seconds: f64,
    #[serde(rename = "freeHeap", deserialize_with = "null_as_default")]
    pub free_heap_bytes: f64,
    #[serde(rename = "minHeap", deserialize_with = "null_as_default")]
    pub min_heap_bytes: f64,
    #[serde(rename = "openingsCount", deserialize_with = "null_as_default")]
    pub openings_count: f64,
    #[serde(rename = "openDuration", deserialize_with = "null_as_default")]
    pub open_duration_seconds: f64,
    #[serde(rename = "wifiRSSI", deserialize_with = "null_as_default")]
    pub wifi_rssi: String,
    #[serde(rename = "garageDoorState", deserialize_with = "null_as_default")]
    pub door_state: DoorState,
    #[serde(rename = "garageLockState", deserialize_with = "null_as_default")]
    pub lock_state: LockState,
    #[serde(rename = "deviceName", deserialize_with = "null_as_default")]
    pub device_name: String,
    #[serde(rename = "garageLightOn", deserialize_with = "null_as_default")]
    pub light_on: bool,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl StatusRecord {
    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }
}

/// Door position. Anything other than the exact strings "Open" and "Closed"
/// is kept verbatim as `Unrecognized`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum DoorState {
    Open,
    Closed,
    Unrecognized(String),
}

impl From<String> for DoorState {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "Open" => DoorState::Open,
            "Closed" => DoorState::Closed,
            _ => DoorState::Unrecognized(raw),
        }
    }
}

impl Default for DoorState {
    fn default() -> Self {
        DoorState::Unrecognized(String::new())
    }
}

/// Remote lock state. Decoded but not exported.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum LockState {
    Locked,
    Unlocked,
    Unrecognized(String),
}

impl From<String> for LockState {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "Locked" => LockState::Locked,
            "Unlocked" => LockState::Unlocked,
            _ => LockState::Unrecognized(raw),
        }
    }
}

impl Default for LockState {
    fn default() -> Self {
        LockState::Unrecognized(String::new())
    }
}

/// reqwest-backed client for a single device.
///
/// Holds no session state, so one instance can serve any number of
/// concurrent scrapes.
#[derive(Debug, Clone)]
pub struct StatusClient {
    base_url: String,
    timeout: Duration,
    http: reqwest::Client,
}

impl StatusClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let base_url = normalize_base_url(base_url);
        reqwest::Url::parse(&base_url).map_err(|e| ClientError::InvalidUrl {
            url: base_url.clone(),
            reason: e.to_string(),
        })?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Transport {
                endpoint: base_url.clone(),
                source: e,
            })?;

        Ok(Self {
            base_url,
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request_error(&self, endpoint: &str, source: reqwest::Error) -> ClientError {
        if source.is_timeout() {
            ClientError::Timeout {
                endpoint: endpoint.to_string(),
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else {
            ClientError::Transport {
                endpoint: endpoint.to_string(),
                source,
            }
        }
    }

    /// Single GET that only accepts HTTP 200.
    async fn get_ok(&self, endpoint: &str) -> Result<reqwest::Response, ClientError> {
        let resp = self
            .http
            .get(endpoint)
            .send()
            .await
            .map_err(|e| self.request_error(endpoint, e))?;

        if resp.status() != StatusCode::OK {
            return Err(ClientError::UnexpectedStatus {
                endpoint: endpoint.to_string(),
                status: resp.status().as_u16(),
            });
        }
        Ok(resp)
    }
}

#[async_trait]
impl DeviceApi for StatusClient {
    async fn authenticate(&self) -> Result<(), ClientError> {
        let endpoint = self.endpoint(AUTH_PATH);
        self.get_ok(&endpoint).await?;
        tracing::debug!(%endpoint, "ratgdo auth accepted");
        Ok(())
    }

    async fn get_status(&self) -> Result<StatusRecord, ClientError> {
        let endpoint = self.endpoint(STATUS_PATH);
        let body = self
            .get_ok(&endpoint)
            .await?
            .text()
            .await
            .map_err(|e| self.request_error(&endpoint, e))?;

        StatusRecord::from_json(&body).map_err(|e| ClientError::Decode {
            endpoint,
            source: e,
        })
    }
}

/// Prepend `http://` when no scheme is given and drop trailing slashes,
/// so `localhost` and `http://ratgdo.local/` both work.
pub fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_STATUS: &str = r#"{
        "upTime": 86400.25,
        "freeHeap": 15000,
        "minHeap": 9800,
        "openingsCount": 42,
        "openDuration": 13.2,
        "wifiRSSI": "-61 dBm",
        "garageDoorState": "Closed",
        "garageLockState": "Unlocked",
        "deviceName": "garage1",
        "garageLightOn": false,
        "firmwareVersion": "2.5.7"
    }"#;

    #[test]
    fn test_decode_full_status() {
        let record = StatusRecord::from_json(SAMPLE_STATUS).unwrap();
        assert!((record.uptime_seconds - 86400.25).abs() < f64::EPSILON);
        assert_eq!(record.free_heap_bytes, 15000.0);
        assert_eq!(record.min_heap_bytes, 9800.0);
        assert_eq!(record.openings_count, 42.0);
        assert_eq!(record.wifi_rssi, "-61 dBm");
        assert_eq!(record.door_state, DoorState::Closed);
        assert_eq!(record.lock_state, LockState::Unlocked);
        assert_eq!(record.device_name, "garage1");
        assert!(!record.light_on);
    }

    #[test]
    fn test_decode_missing_fields_default_to_zero() {
        let record = StatusRecord::from_json(r#"{"deviceName":"garage1"}"#).unwrap();
        assert_eq!(record.device_name, "garage1");
        assert_eq!(record.uptime_seconds, 0.0);
        assert_eq!(record.door_state, DoorState::Unrecognized(String::new()));
        assert_eq!(record.lock_state, LockState::Unrecognized(String::new()));
        assert!(!record.light_on);
    }

    #[test]
    fn test_decode_null_fields_as_zero_values() {
        let body = r#"{"deviceName":"garage1","garageDoorState":null,"garageLockState":null,
            "wifiRSSI":null,"upTime":null,"garageLightOn":null,"openingsCount":7}"#;
        let record = StatusRecord::from_json(body).unwrap();
        assert_eq!(record.device_name, "garage1");
        assert_eq!(record.door_state, DoorState::Unrecognized(String::new()));
        assert_eq!(record.lock_state, LockState::Unrecognized(String::new()));
        assert_eq!(record.wifi_rssi, "");
        assert_eq!(record.uptime_seconds, 0.0);
        assert!(!record.light_on);
        assert_eq!(record.openings_count, 7.0);
    }

    #[test]
    fn test_decode_malformed_body() {
        assert!(StatusRecord::from_json("<html>not json</html>").is_err());
        assert!(StatusRecord::from_json(r#"{"upTime":"soon"}"#).is_err());
    }

    #[test]
    fn test_door_state_is_case_sensitive() {
        assert_eq!(DoorState::from("Open".to_string()), DoorState::Open);
        assert_eq!(DoorState::from("Closed".to_string()), DoorState::Closed);
        assert_eq!(
            DoorState::from("open".to_string()),
            DoorState::Unrecognized("open".into())
        );
        assert_eq!(
            DoorState::from("Ajar".to_string()),
            DoorState::Unrecognized("Ajar".into())
        );
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url("localhost"), "http://localhost");
        assert_eq!(normalize_base_url("http://ratgdo.local/"), "http://ratgdo.local");
        assert_eq!(
            normalize_base_url(" https://10.0.0.5:8080 "),
            "https://10.0.0.5:8080"
        );
    }

    #[test]
    fn test_client_rejects_unparseable_url() {
        let err = StatusClient::new("http://exa mple").unwrap_err();
        assert!(matches!(err, ClientError::InvalidUrl { .. }));
    }

    #[test]
    fn test_client_endpoints() {
        let client = StatusClient::new("ratgdo.local/").unwrap();
        assert_eq!(client.base_url(), "http://ratgdo.local");
        assert_eq!(client.endpoint(AUTH_PATH), "http://ratgdo.local/auth");
        assert_eq!(client.endpoint(STATUS_PATH), "http://ratgdo.local/status.json");
    }
}
