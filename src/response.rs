use std::collections::HashMap;

use serde::Serialize;

/// Name echoed in health and stats bodies.
pub const SERVICE_NAME: &str = "phone-address-microservice";

#[derive(Debug, Serialize)]
pub struct RecordResponse {
    pub phone: String,
    pub address: String,
    pub status: String,
}

impl RecordResponse {
    pub fn found(phone: String, address: String) -> Self {
        Self {
            phone,
            address,
            status: "success".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub message: String,
    pub phone: String,
    pub address: String,
    pub status: String,
    pub ttl_days: u64,
}

impl CreatedResponse {
    pub fn new(phone: String, address: String, ttl_days: u64) -> Self {
        Self {
            message: "Record created successfully".to_string(),
            phone,
            address,
            status: "created".to_string(),
            ttl_days,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UpdatedResponse {
    pub message: String,
    pub phone: String,
    pub address: String,
    pub status: String,
}

impl UpdatedResponse {
    pub fn new(phone: String, address: String) -> Self {
        Self {
            message: "Address updated successfully".to_string(),
            phone,
            address,
            status: "updated".to_string(),
        }
    }
}

/// Administrative listing: total key count plus the fetched subset.
#[derive(Debug, Serialize)]
pub struct RecordsResponse {
    pub total_records: usize,
    pub displayed_records: usize,
    pub records: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_records: usize,
    pub service: &'static str,
    pub redis_status: &'static str,
    pub sample_size: usize,
}

impl StatsResponse {
    pub fn new(total_records: usize, connected: bool) -> Self {
        Self {
            total_records,
            service: SERVICE_NAME,
            redis_status: if connected { "connected" } else { "disconnected" },
            sample_size: total_records.min(5),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub redis: &'static str,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy",
            service: SERVICE_NAME,
            redis: "connected",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_sample_size_caps_at_five() {
        assert_eq!(StatsResponse::new(3, true).sample_size, 3);
        assert_eq!(StatsResponse::new(12, true).sample_size, 5);
        assert_eq!(StatsResponse::new(0, false).sample_size, 0);
    }

    #[test]
    fn test_health_body_shape() {
        let json = serde_json::to_value(HealthResponse::healthy()).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["service"], SERVICE_NAME);
        assert_eq!(json["redis"], "connected");
    }
}
