use std::fmt::Write;

use crate::models::{MaintenanceRecord, MonthKey};
use crate::stats::{self, FriendlySuggestions};

pub fn build_report(
    selected: MonthKey,
    records: &[MaintenanceRecord],
    suggestions: &FriendlySuggestions,
) -> String {
    let overview = stats::overview(records);
    let trends = stats::monthly_trends(records);
    let candidates = stats::preventative_candidates(records, suggestions);

    let mut output = String::new();

    let _ = writeln!(output, "# Maintenance Request Report");
    let _ = writeln!(
        output,
        "Covering {:04}-{:02}",
        selected.year, selected.month
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Overview");

    if overview.total_requests == 0 {
        let _ = writeln!(output, "No categorized requests recorded for this month.");
    } else {
        let _ = writeln!(output, "- Total requests: {}", overview.total_requests);
        if let Some(request_type) = &overview.most_common_request {
            let _ = writeln!(
                output,
                "- Most common: {} ({} requests)",
                request_type, overview.most_common_request_count
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Monthly Volume");

    if trends.monthly_request_counts.is_empty() {
        let _ = writeln!(output, "No requests recorded for this month.");
    } else {
        for (period, count) in &trends.monthly_request_counts {
            let _ = writeln!(output, "- {}: {} requests", period, count);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Top Request Types");

    let ranked = stats::rank_by_type(records);
    if ranked.is_empty() {
        let _ = writeln!(output, "No categorized requests recorded for this month.");
    } else {
        for (request_type, count) in ranked.iter().take(3) {
            let _ = writeln!(output, "- {}: {} requests", request_type, count);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Preventative Maintenance Candidates");

    if candidates.is_empty() {
        let _ = writeln!(
            output,
            "No request types above the repeat threshold this month."
        );
    } else {
        for candidate in &candidates {
            let _ = writeln!(output, "- {}", candidate);
        }
    }

    let mut recent = records.to_vec();
    recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Requests");

    if recent.is_empty() {
        let _ = writeln!(output, "No requests recorded for this month.");
    } else {
        for record in recent.iter().take(5) {
            let _ = writeln!(
                output,
                "- {} ({}) at {}: {}",
                record.created_at,
                record.request_type.as_deref().unwrap_or("uncategorized"),
                record.location,
                record.note
            );
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn report_falls_back_on_empty_month() {
        let report = build_report(
            MonthKey {
                year: 2024,
                month: 8,
            },
            &[],
            &FriendlySuggestions::builtin(),
        );
        assert!(report.contains("# Maintenance Request Report"));
        assert!(report.contains("No requests recorded for this month."));
    }

    #[test]
    fn report_lists_candidates_with_friendly_names() {
        let records: Vec<MaintenanceRecord> = (1..=3)
            .map(|day| MaintenanceRecord {
                created_at: NaiveDate::from_ymd_opt(2024, 8, day)
                    .unwrap()
                    .and_hms_opt(10, 0, 0)
                    .unwrap(),
                request_type: Some("A/C Not working".to_string()),
                location: "Riverside office".to_string(),
                note: "warm air".to_string(),
            })
            .collect();

        let report = build_report(
            MonthKey {
                year: 2024,
                month: 8,
            },
            &records,
            &FriendlySuggestions::builtin(),
        );
        assert!(report.contains("Create a PM plan to service all locations A/C units"));
        assert!(report.contains("- Total requests: 3"));
    }
}
