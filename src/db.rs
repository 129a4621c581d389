use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::MaintenanceRecord;

pub const MONTH_QUERY: &str = "SELECT created_at, request_type, location, note \
     FROM maintenance_insights.requests \
     WHERE created_at >= $1 AND created_at < $2 \
     ORDER BY created_at";

pub const REQUEST_COLUMNS: [&str; 4] = ["created_at", "request_type", "location", "note"];

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let requests = vec![
        (
            "seed-001",
            "2024-08-02 09:15",
            Some("A/C Not working"),
            "Riverside office",
            "Unit blowing warm air since Monday",
        ),
        (
            "seed-002",
            "2024-08-06 14:40",
            Some("A/C Not working"),
            "Main street branch",
            "Lobby thermostat reads 85F",
        ),
        (
            "seed-003",
            "2024-08-11 08:05",
            Some("A/C Not working"),
            "Riverside office",
            "Compressor cycling on and off",
        ),
        (
            "seed-004",
            "2024-08-13 16:20",
            Some("Leaky faucet"),
            "Harbor warehouse",
            "Break room sink dripping",
        ),
        (
            "seed-005",
            "2024-08-19 10:55",
            Some("Leaky faucet"),
            "Main street branch",
            "Second floor restroom",
        ),
        (
            "seed-006",
            "2024-08-21 12:30",
            Some("Broken window"),
            "Harbor warehouse",
            "Crack in loading dock pane",
        ),
        (
            "seed-007",
            "2024-08-27 07:45",
            None,
            "Riverside office",
            "Walk-in report, no category given",
        ),
        (
            "seed-008",
            "2024-07-09 11:00",
            Some("Leaky faucet"),
            "Riverside office",
            "Kitchenette tap will not close",
        ),
        (
            "seed-009",
            "2024-07-23 15:10",
            Some("Pest control"),
            "Main street branch",
            "Ants near the rear entrance",
        ),
        (
            "seed-010",
            "2023-12-04 09:35",
            Some("Heating failure"),
            "Harbor warehouse",
            "Office radiators cold",
        ),
    ];

    for (source_key, created_at, request_type, location, note) in requests {
        let created_at = NaiveDateTime::parse_from_str(created_at, "%Y-%m-%d %H:%M")
            .context("invalid seed timestamp")?;

        sqlx::query(
            r#"
            INSERT INTO maintenance_insights.requests
            (id, created_at, request_type, location, note, source_key)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(created_at)
        .bind(request_type)
        .bind(location)
        .bind(note)
        .bind(source_key)
        .execute(pool)
        .await?;
    }

    Ok(())
}

pub async fn fetch_month(
    pool: &PgPool,
    year: i32,
    month: u32,
) -> anyhow::Result<Vec<MaintenanceRecord>> {
    // Out-of-range selectors have no calendar bounds and match nothing.
    let Some((start, end)) = month_bounds(year, month) else {
        return Ok(Vec::new());
    };

    let rows = sqlx::query(MONTH_QUERY)
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await?;

    Ok(rows.iter().map(record_from_row).collect())
}

pub async fn fetch_all(pool: &PgPool) -> anyhow::Result<Vec<MaintenanceRecord>> {
    let rows = sqlx::query(
        "SELECT created_at, request_type, location, note \
         FROM maintenance_insights.requests \
         ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(record_from_row).collect())
}

fn record_from_row(row: &PgRow) -> MaintenanceRecord {
    MaintenanceRecord {
        created_at: row.get("created_at"),
        request_type: row.get("request_type"),
        location: row.get("location"),
        note: row.get("note"),
    }
}

fn month_bounds(year: i32, month: u32) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let end = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((start.and_hms_opt(0, 0, 0)?, end.and_hms_opt(0, 0, 0)?))
}

pub async fn import_csv(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        created_at: NaiveDateTime,
        request_type: Option<String>,
        location: String,
        note: Option<String>,
        source_key: Option<String>,
    }

    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut inserted = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        let source_key = row
            .source_key
            .unwrap_or_else(|| format!("import-{}", Uuid::new_v4()));

        let result = sqlx::query(
            r#"
            INSERT INTO maintenance_insights.requests
            (id, created_at, request_type, location, note, source_key)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(row.created_at)
        .bind(&row.request_type)
        .bind(&row.location)
        .bind(row.note.unwrap_or_default())
        .bind(source_key)
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            inserted += 1;
        }
    }

    Ok(inserted)
}
