use std::path::Path;

use bid_roster::data::sqlite::{SqliteError, SqliteRoster};
use bid_roster::data::{CanonicalRecord, Dataset};
use bid_roster::query::{distinct_teams, player_details, search, ALL_TEAMS};
use rusqlite::{params, Connection};

fn records() -> Vec<CanonicalRecord> {
    let rec = |name: Option<&str>, nickname: Option<&str>, team: &str, record_date: &str| {
        CanonicalRecord {
            full_name: name.map(str::to_string),
            nickname: nickname.map(str::to_string),
            team: Some(team.to_string()),
            record_date: Some(record_date.to_string()),
            start_date: Some("2024-01-01".to_string()),
            registration_id: Some(format!("R-{record_date}")),
            ..CanonicalRecord::default()
        }
    };
    vec![
        rec(Some("CARLOS SILVA"), None, "Tigers", "2024-03-10"),
        rec(Some("ANA SILVA"), Some("ANINHA"), "Lions", "2024-01-10"),
        rec(None, Some("SILVINHA"), "Lions", "2024-02-10"),
        rec(Some("ANA SILVA"), Some("ANINHA"), " Hawks ", "2023-07-01"),
        rec(Some("BRUNO COSTA"), None, "Lions", "2022-01-01"),
    ]
}

fn write_db(path: &Path, records: &[CanonicalRecord]) {
    let conn = Connection::open(path).expect("db should open");
    conn.execute_batch(
        "CREATE TABLE bid (
            full_name TEXT, nickname TEXT, team TEXT, age TEXT, birth_date TEXT,
            contract_id TEXT, start_date TEXT, record_date TEXT, registration_id TEXT,
            federation_id TEXT
        )",
    )
    .expect("table should be created");
    for r in records {
        conn.execute(
            "INSERT INTO bid VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                r.full_name,
                r.nickname,
                r.team,
                r.age,
                r.birth_date,
                r.contract_id,
                r.start_date,
                r.record_date,
                r.registration_id,
                r.federation_id
            ],
        )
        .expect("row should insert");
    }
}

#[test]
fn sqlite_backend_matches_in_memory_engine() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = dir.path().join("bid.sqlite");
    write_db(&db, &records());

    let roster = SqliteRoster::open(&db, "bid").expect("roster should open");
    let dataset = Dataset::from_records(records());

    assert_eq!(roster.count().expect("count"), 5);
    assert_eq!(roster.distinct_teams().expect("teams"), distinct_teams(&dataset));

    for (name, team, limit) in [
        ("silva", Some(ALL_TEAMS), 10),
        ("silva", Some("Lions"), 10),
        ("", None, 3),
        ("ANINHA", Some(""), 10),
        ("nobody", None, 10),
    ] {
        assert_eq!(
            roster.search(name, team, limit).expect("search"),
            search(&dataset, name, team, limit),
            "search({name:?}, {team:?}, {limit})"
        );
    }

    assert_eq!(
        roster.player_details("ana").expect("details"),
        player_details(&dataset, "ana")
    );
}

#[test]
fn numeric_cells_read_back_as_text() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = dir.path().join("bid.sqlite");
    write_db(&db, &[]);
    let conn = Connection::open(&db).expect("db should open");
    conn.execute(
        "INSERT INTO bid (full_name, team, age) VALUES ('JOAO', 'Hawks', 21)",
        [],
    )
    .expect("row should insert");
    drop(conn);

    let roster = SqliteRoster::open(&db, "bid").expect("roster should open");
    let rows = roster.search("joao", None, 10).expect("search");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].age.as_deref(), Some("21"));
    assert_eq!(rows[0].nickname, None);
}

#[test]
fn table_names_must_be_identifiers() {
    let conn = Connection::open_in_memory().expect("memory db");
    let err = SqliteRoster::from_connection(conn, "bid; DROP TABLE bid").expect_err("should reject");
    assert!(matches!(err, SqliteError::InvalidTable(_)));
}
