use chrono::Datelike;

use crate::models::{MaintenanceRecord, MonthKey, OverviewStats, TrendsStats};

const PM_REPEAT_THRESHOLD: u64 = 2;
const TOP_REQUEST_LIMIT: usize = 3;

pub struct FriendlySuggestions {
    entries: std::collections::HashMap<String, String>,
}

impl FriendlySuggestions {
    pub fn builtin() -> Self {
        let mut entries = std::collections::HashMap::new();
        entries.insert(
            "A/C Not working".to_string(),
            "Create a PM plan to service all locations A/C units".to_string(),
        );
        Self { entries }
    }

    pub fn suggestion_for(&self, request_type: &str) -> String {
        self.entries
            .get(request_type)
            .cloned()
            .unwrap_or_else(|| request_type.to_string())
    }
}

pub fn rank_by_type(records: &[MaintenanceRecord]) -> Vec<(String, u64)> {
    let mut counts: std::collections::HashMap<String, u64> =
        std::collections::HashMap::new();

    for record in records {
        if let Some(request_type) = &record.request_type {
            *counts.entry(request_type.clone()).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<(String, u64)> = counts.into_iter().collect();
    // Ties resolve by request type so rankings stay deterministic.
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
}

pub fn overview(records: &[MaintenanceRecord]) -> OverviewStats {
    let ranked = rank_by_type(records);

    match ranked.into_iter().next() {
        Some((request_type, count)) => OverviewStats {
            total_requests: records.len() as u64,
            most_common_request: Some(request_type),
            most_common_request_count: count,
        },
        None => OverviewStats {
            total_requests: 0,
            most_common_request: None,
            most_common_request_count: 0,
        },
    }
}

pub fn monthly_trends(records: &[MaintenanceRecord]) -> TrendsStats {
    let ranked = rank_by_type(records);
    if ranked.is_empty() {
        return TrendsStats::default();
    }

    let mut monthly_request_counts: std::collections::BTreeMap<String, u64> =
        std::collections::BTreeMap::new();

    for record in records {
        let period = format!(
            "{:04}-{:02}",
            record.created_at.year(),
            record.created_at.month()
        );
        *monthly_request_counts.entry(period).or_insert(0) += 1;
    }

    TrendsStats {
        monthly_request_counts,
        top_growing_requests: ranked.into_iter().take(TOP_REQUEST_LIMIT).collect(),
    }
}

pub fn preventative_candidates(
    records: &[MaintenanceRecord],
    suggestions: &FriendlySuggestions,
) -> Vec<String> {
    rank_by_type(records)
        .into_iter()
        .filter(|(_, count)| *count > PM_REPEAT_THRESHOLD)
        .map(|(request_type, _)| suggestions.suggestion_for(&request_type))
        .collect()
}

pub fn available_months(records: &[MaintenanceRecord]) -> Vec<MonthKey> {
    let mut seen: std::collections::HashSet<(i32, u32)> = std::collections::HashSet::new();

    for record in records {
        seen.insert((record.created_at.year(), record.created_at.month()));
    }

    let mut months: Vec<MonthKey> = seen
        .into_iter()
        .map(|(year, month)| MonthKey { year, month })
        .collect();
    months.sort_by(|a, b| b.year.cmp(&a.year).then(b.month.cmp(&a.month)));
    months
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn request_on(
        year: i32,
        month: u32,
        day: u32,
        request_type: Option<&str>,
    ) -> MaintenanceRecord {
        MaintenanceRecord {
            created_at: NaiveDate::from_ymd_opt(year, month, day)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
            request_type: request_type.map(String::from),
            location: "Building A".to_string(),
            note: "logged by front desk".to_string(),
        }
    }

    #[test]
    fn overview_on_empty_set_is_zeroed() {
        let stats = overview(&[]);
        assert_eq!(stats.total_requests, 0);
        assert_eq!(stats.most_common_request, None);
        assert_eq!(stats.most_common_request_count, 0);
    }

    #[test]
    fn overview_without_typed_requests_is_zeroed() {
        let records = vec![
            request_on(2024, 8, 1, None),
            request_on(2024, 8, 2, None),
        ];
        let stats = overview(&records);
        assert_eq!(stats.total_requests, 0);
        assert_eq!(stats.most_common_request, None);
    }

    #[test]
    fn overview_counts_most_common_type() {
        let records = vec![
            request_on(2024, 8, 1, Some("A/C Not working")),
            request_on(2024, 8, 2, Some("A/C Not working")),
            request_on(2024, 8, 3, Some("Leaky faucet")),
        ];
        let stats = overview(&records);
        assert_eq!(stats.total_requests, 3);
        assert_eq!(stats.most_common_request.as_deref(), Some("A/C Not working"));
        assert_eq!(stats.most_common_request_count, 2);
    }

    #[test]
    fn ranking_ties_resolve_lexicographically() {
        let records = vec![
            request_on(2024, 8, 1, Some("Leaky faucet")),
            request_on(2024, 8, 2, Some("Broken window")),
            request_on(2024, 8, 3, Some("Leaky faucet")),
            request_on(2024, 8, 4, Some("Broken window")),
        ];
        let ranked = rank_by_type(&records);
        assert_eq!(ranked[0].0, "Broken window");
        assert_eq!(ranked[1].0, "Leaky faucet");

        let stats = overview(&records);
        assert_eq!(stats.most_common_request.as_deref(), Some("Broken window"));
    }

    #[test]
    fn trends_bucket_by_record_month() {
        let records = vec![
            request_on(2024, 8, 5, Some("A/C Not working")),
            request_on(2024, 8, 20, None),
            request_on(2024, 7, 30, Some("Leaky faucet")),
        ];
        let trends = monthly_trends(&records);
        assert_eq!(trends.monthly_request_counts.get("2024-07"), Some(&1));
        assert_eq!(trends.monthly_request_counts.get("2024-08"), Some(&2));
    }

    #[test]
    fn trends_keep_three_most_frequent_types() {
        let mut records = Vec::new();
        for _ in 0..3 {
            records.push(request_on(2024, 8, 1, Some("A/C Not working")));
        }
        for _ in 0..2 {
            records.push(request_on(2024, 8, 2, Some("Broken window")));
            records.push(request_on(2024, 8, 3, Some("Leaky faucet")));
        }
        records.push(request_on(2024, 8, 4, Some("Pest control")));

        let trends = monthly_trends(&records);
        assert_eq!(trends.top_growing_requests.len(), 3);
        assert_eq!(trends.top_growing_requests.get("A/C Not working"), Some(&3));
        assert_eq!(trends.top_growing_requests.get("Broken window"), Some(&2));
        assert_eq!(trends.top_growing_requests.get("Leaky faucet"), Some(&2));
        assert!(!trends.top_growing_requests.contains_key("Pest control"));
    }

    #[test]
    fn trends_on_empty_set_are_empty() {
        let trends = monthly_trends(&[]);
        assert!(trends.monthly_request_counts.is_empty());
        assert!(trends.top_growing_requests.is_empty());

        let untyped = vec![request_on(2024, 8, 1, None)];
        let trends = monthly_trends(&untyped);
        assert!(trends.monthly_request_counts.is_empty());
    }

    #[test]
    fn preventative_requires_more_than_two_occurrences() {
        let mut records = Vec::new();
        for day in 1..=3 {
            records.push(request_on(2024, 8, day, Some("A/C Not working")));
        }
        for day in 4..=5 {
            records.push(request_on(2024, 8, day, Some("Leaky faucet")));
        }

        let candidates = preventative_candidates(&records, &FriendlySuggestions::builtin());
        assert_eq!(
            candidates,
            vec!["Create a PM plan to service all locations A/C units".to_string()]
        );
    }

    #[test]
    fn preventative_passes_unmapped_types_through() {
        let mut records = Vec::new();
        for day in 1..=4 {
            records.push(request_on(2024, 8, day, Some("Broken window")));
        }
        for day in 5..=7 {
            records.push(request_on(2024, 8, day, Some("A/C Not working")));
        }

        let candidates = preventative_candidates(&records, &FriendlySuggestions::builtin());
        assert_eq!(
            candidates,
            vec![
                "Broken window".to_string(),
                "Create a PM plan to service all locations A/C units".to_string(),
            ]
        );
    }

    #[test]
    fn preventative_on_empty_set_is_empty() {
        let candidates = preventative_candidates(&[], &FriendlySuggestions::builtin());
        assert!(candidates.is_empty());
    }

    #[test]
    fn available_months_are_distinct_and_descending() {
        let records = vec![
            request_on(2024, 8, 1, Some("Leaky faucet")),
            request_on(2024, 8, 15, Some("Broken window")),
            request_on(2023, 12, 1, None),
        ];
        let months = available_months(&records);
        assert_eq!(
            months,
            vec![
                MonthKey { year: 2024, month: 8 },
                MonthKey { year: 2023, month: 12 },
            ]
        );
    }

    #[test]
    fn operations_are_idempotent() {
        let records = vec![
            request_on(2024, 8, 1, Some("A/C Not working")),
            request_on(2024, 7, 2, Some("Leaky faucet")),
        ];
        assert_eq!(overview(&records), overview(&records));
        assert_eq!(monthly_trends(&records), monthly_trends(&records));
        assert_eq!(available_months(&records), available_months(&records));
    }
}
