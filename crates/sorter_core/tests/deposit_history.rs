use chrono::NaiveDate;
use sorter_core::db::open_db_in_memory;
use sorter_core::service::history_service::{normalize_history_days, HISTORY_MAX_DAYS};
use sorter_core::{DepositEvent, HistoryService, LedgerRepository, SqliteLedgerRepository};

fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn append(repo: &SqliteLedgerRepository<'_>, ts: &str, bin: i64, delta_g: i64) {
    repo.append(&DepositEvent {
        ts: ts.to_string(),
        bin,
        material: "Resto".to_string(),
        delta_g,
        fill_percent: 0,
    })
    .unwrap();
}

#[test]
fn empty_ledger_yields_all_zero_week_ending_today() {
    let conn = open_db_in_memory().unwrap();
    let service = HistoryService::new(SqliteLedgerRepository::new(&conn));

    let history = service.compute_history(7, day(2024, 3, 2)).unwrap();

    assert_eq!(
        history.labels,
        [
            "2024-02-25",
            "2024-02-26",
            "2024-02-27",
            "2024-02-28",
            "2024-02-29",
            "2024-03-01",
            "2024-03-02"
        ]
    );
    for bin in ["1", "2", "3"] {
        assert_eq!(history.per_bin[bin], vec![0; 7], "bin {bin}");
    }
    assert_eq!(history.total, vec![0; 7]);
}

#[test]
fn events_are_bucketed_by_day_and_bin_with_totals() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteLedgerRepository::new(&conn);
    append(&repo, "2024-05-05T08:00:00Z", 1, 300);
    append(&repo, "2024-05-05T09:00:00Z", 1, -50);
    append(&repo, "2024-05-05T10:00:00Z", 3, 20);
    append(&repo, "2024-05-07T23:59:59Z", 2, 400);
    // Outside the window on both sides.
    append(&repo, "2024-05-04T23:59:59Z", 1, 9999);
    append(&repo, "2024-05-08T00:00:00Z", 1, 9999);

    let service = HistoryService::new(repo);
    let history = service.compute_history(3, day(2024, 5, 7)).unwrap();

    assert_eq!(history.labels, ["2024-05-05", "2024-05-06", "2024-05-07"]);
    assert_eq!(history.per_bin["1"], [250, 0, 0]);
    assert_eq!(history.per_bin["2"], [0, 0, 400]);
    assert_eq!(history.per_bin["3"], [20, 0, 0]);
    assert_eq!(history.total, [270, 0, 400]);
}

#[test]
fn single_day_window_covers_only_today() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteLedgerRepository::new(&conn);
    append(&repo, "2024-05-07T12:00:00Z", 2, 15);
    append(&repo, "2024-05-06T12:00:00Z", 2, 99);

    let history = HistoryService::new(repo)
        .compute_history(1, day(2024, 5, 7))
        .unwrap();
    assert_eq!(history.labels, ["2024-05-07"]);
    assert_eq!(history.total, [15]);
}

#[test]
fn history_serializes_series_under_bins_key() {
    let conn = open_db_in_memory().unwrap();
    let history = HistoryService::new(SqliteLedgerRepository::new(&conn))
        .compute_history(2, day(2024, 1, 1))
        .unwrap();

    let json = serde_json::to_value(&history).unwrap();
    assert_eq!(json["labels"], serde_json::json!(["2023-12-31", "2024-01-01"]));
    assert_eq!(json["bins"]["2"], serde_json::json!([0, 0]));
    assert_eq!(json["total"], serde_json::json!([0, 0]));
}

#[test]
fn window_size_is_normalized() {
    assert_eq!(normalize_history_days(0), 7);
    assert_eq!(normalize_history_days(30), 30);
    assert_eq!(normalize_history_days(10_000), HISTORY_MAX_DAYS);

    let conn = open_db_in_memory().unwrap();
    let history = HistoryService::new(SqliteLedgerRepository::new(&conn))
        .compute_history(0, day(2024, 1, 10))
        .unwrap();
    assert_eq!(history.labels.len(), 7);
}

#[test]
fn daily_total_saturates_instead_of_overflowing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteLedgerRepository::new(&conn);
    for bin in [1, 2, 3] {
        append(&repo, "2024-05-07T09:00:00Z", bin, 4_000_000_000_000_000_000);
    }

    let history = HistoryService::new(SqliteLedgerRepository::new(&conn))
        .compute_history(1, day(2024, 5, 7))
        .unwrap();

    assert_eq!(history.per_bin["3"], [4_000_000_000_000_000_000]);
    assert_eq!(history.total, [i64::MAX]);
}
