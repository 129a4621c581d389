use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct MaintenanceRecord {
    pub created_at: NaiveDateTime,
    pub request_type: Option<String>,
    pub location: String,
    pub note: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverviewStats {
    pub total_requests: u64,
    pub most_common_request: Option<String>,
    pub most_common_request_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TrendsStats {
    pub monthly_request_counts: BTreeMap<String, u64>,
    pub top_growing_requests: BTreeMap<String, u64>,
}
