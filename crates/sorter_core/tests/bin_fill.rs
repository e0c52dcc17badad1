use chrono::NaiveDate;
use rusqlite::Connection;
use sorter_core::db::{open_db, open_db_in_memory};
use sorter_core::{
    BinReconcileReport, BinRepository, BinService, DepositEvent, DepositReport, LedgerRepository, LedgerService,
    LedgerServiceError, SqliteBinRepository, SqliteLedgerRepository, DepositValidationError,
    MAX_DELTA_G_ABS,
};

fn deposit(ts: &str, bin: i64, delta_g: i64) -> DepositEvent {
    DepositEvent {
        ts: ts.to_string(),
        bin,
        material: "Metal".to_string(),
        delta_g,
        fill_percent: 0,
    }
}

fn bin_views(conn: &Connection) -> Vec<sorter_core::BinView> {
    BinService::new(
        SqliteBinRepository::new(conn),
        SqliteLedgerRepository::new(conn),
    )
    .compute_bin_views()
    .unwrap()
}

#[test]
fn empty_ledger_reports_three_empty_bins_in_id_order() {
    let conn = open_db_in_memory().unwrap();
    let views = bin_views(&conn);

    assert_eq!(views.iter().map(|view| view.id).collect::<Vec<_>>(), [1, 2, 3]);
    assert!(views.iter().all(|view| view.grams == 0 && view.percent == 0));
    assert_eq!(views[1].name, "Orgánico");
}

#[test]
fn corrections_are_summed_with_deposits() {
    let conn = open_db_in_memory().unwrap();
    let ledger = LedgerService::new(SqliteLedgerRepository::new(&conn));
    let now = "2024-05-01T12:00:00Z";

    let first: DepositReport = serde_json::from_str(r#"{"bin": 1, "delta_g": 300}"#).unwrap();
    let correction: DepositReport =
        serde_json::from_str(r#"{"bin": 1, "delta_g": -50}"#).unwrap();
    ledger.record(first, now).unwrap();
    ledger.record(correction, now).unwrap();

    let views = bin_views(&conn);
    assert_eq!(views[0].grams, 250);
    assert_eq!(views[0].percent, 5);
    assert_eq!(views[1].grams, 0);
}

#[test]
fn sums_are_independent_of_interleaving_across_bins() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteLedgerRepository::new(&conn);
    let deltas = [(1, 100), (2, 40), (1, -30), (3, 7), (2, 60), (3, 3), (1, 5)];

    for (index, (bin, delta)) in deltas.iter().enumerate() {
        repo.append(&deposit(&format!("2024-05-01T10:00:{index:02}Z"), *bin, *delta))
            .unwrap();
    }

    for bin in 1..=3 {
        let expected: i64 = deltas
            .iter()
            .filter(|(id, _)| *id == bin)
            .map(|(_, delta)| delta)
            .sum();
        assert_eq!(repo.sum_by_bin(bin).unwrap(), expected, "bin {bin}");
    }
}

#[test]
fn percent_follows_capacity_and_is_not_clamped() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteLedgerRepository::new(&conn);
    repo.append(&deposit("2024-05-01T10:00:00Z", 2, 2500)).unwrap();
    repo.append(&deposit("2024-05-01T10:00:01Z", 3, 6000)).unwrap();

    let views = bin_views(&conn);
    assert_eq!(views[1].percent, 50);
    assert_eq!(views[2].percent, 120);
}

#[test]
fn per_day_sum_only_counts_that_utc_day() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteLedgerRepository::new(&conn);
    repo.append(&deposit("2024-04-30T23:59:59Z", 1, 1)).unwrap();
    repo.append(&deposit("2024-05-01T00:00:00Z", 1, 10)).unwrap();
    repo.append(&deposit("2024-05-01T23:59:59Z", 1, 100)).unwrap();
    repo.append(&deposit("2024-05-01T12:00:00Z", 2, 1000)).unwrap();
    repo.append(&deposit("2024-05-02T00:00:00Z", 1, 10000)).unwrap();

    let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
    assert_eq!(repo.sum_by_bin_and_day(1, day).unwrap(), 110);
    assert_eq!(repo.sum_by_bin_and_day(2, day).unwrap(), 1000);
    assert_eq!(repo.sum_by_bin_and_day(3, day).unwrap(), 0);
}

#[test]
fn recent_returns_latest_events_oldest_first() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteLedgerRepository::new(&conn);
    for n in 0..5 {
        repo.append(&deposit(&format!("2024-05-01T10:00:0{n}Z"), 1, n))
            .unwrap();
    }

    let recent = repo.recent(3).unwrap();
    assert_eq!(
        recent.iter().map(|event| event.delta_g).collect::<Vec<_>>(),
        [2, 3, 4]
    );
    assert_eq!(repo.recent(0).unwrap().len(), 5);
}

#[test]
fn invalid_report_is_rejected_without_touching_ledger() {
    let conn = open_db_in_memory().unwrap();
    let ledger = LedgerService::new(SqliteLedgerRepository::new(&conn));

    let report: DepositReport = serde_json::from_str(r#"{"bin": 9, "delta_g": 10}"#).unwrap();
    let err = ledger.record(report, "2024-05-01T12:00:00Z").unwrap_err();
    assert!(matches!(err, LedgerServiceError::Validation(_)));
    assert!(ledger.recent(0).unwrap().is_empty());
}

#[test]
fn oversized_delta_is_rejected_and_fill_stays_readable() {
    let conn = open_db_in_memory().unwrap();
    let ledger = LedgerService::new(SqliteLedgerRepository::new(&conn));
    let now = "2024-05-07T10:00:00Z";

    for _ in 0..3 {
        let report: DepositReport =
            serde_json::from_value(serde_json::json!({"bin": 1, "delta_g": MAX_DELTA_G_ABS}))
                .unwrap();
        ledger.record(report, now).unwrap();
    }
    for delta_g in [i64::MAX, i64::MIN] {
        let report: DepositReport =
            serde_json::from_value(serde_json::json!({"bin": 1, "delta_g": delta_g})).unwrap();
        let err = ledger.record(report, now).unwrap_err();
        assert!(matches!(
            err,
            LedgerServiceError::Validation(DepositValidationError::DeltaOutOfRange(_))
        ));
    }

    let views = bin_views(&conn);
    assert_eq!(views[0].grams, 3 * MAX_DELTA_G_ABS);
    assert_eq!(ledger.recent(0).unwrap().len(), 3);
}

#[test]
fn reconcile_repairs_stale_bin_rows_from_older_databases() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.db");
    let legacy = Connection::open(&path).unwrap();
    legacy
        .execute_batch(
            "CREATE TABLE bins(id INTEGER PRIMARY KEY, name TEXT NOT NULL, capacity_kg REAL NOT NULL);
             INSERT INTO bins VALUES (0, 'Plástico', 5.0), (1, 'Metal', 8.0), (4, 'Vidrio', 5.0);",
        )
        .unwrap();
    drop(legacy);

    let conn = open_db(&path).unwrap();
    let bins = SqliteBinRepository::new(&conn);
    let report = bins.reconcile_canonical_bins().unwrap();
    assert_eq!(report.removed, 2);
    assert_eq!(report.inserted, 0);

    let listed = bins.list_bins().unwrap();
    assert_eq!(listed.iter().map(|bin| bin.id).collect::<Vec<_>>(), [1, 2, 3]);
    assert_eq!(listed[0].capacity_kg, 8.0);

    let again = bins.reconcile_canonical_bins().unwrap();
    assert_eq!(again, BinReconcileReport::default());
}

#[test]
fn list_bins_fills_missing_canonical_rows_with_defaults() {
    let conn = open_db_in_memory().unwrap();
    conn.execute("DELETE FROM bins WHERE id = 2;", []).unwrap();

    let bins = SqliteBinRepository::new(&conn);
    let listed = bins.list_bins().unwrap();
    assert_eq!(listed.len(), 3);
    assert_eq!(listed[1].name, "Orgánico");

    let report = bins.reconcile_canonical_bins().unwrap();
    assert_eq!(report.inserted, 1);
}
