use graphicone_models::db::open_db_in_memory;
use graphicone_models::model::account::{AccessData, Account, Follower, TemporaryPass};
use graphicone_models::model::billing::Payment;
use graphicone_models::model::content::{Board, Graph, Tag};
use graphicone_models::model::discussion::{Interest, ProsAndCons, ProsAndConsSelect};
use graphicone_models::model::equity::{Equity, IntrinioDump};
use graphicone_models::model::notification::{PushNotificationSetting, PushNotificationType};
use graphicone_models::model::{key2, key3};
use graphicone_models::{FieldValue, RecordStore, RepoError, SqliteRecordStore};
use serde_json::json;
use std::thread::sleep;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as i64
}

#[test]
fn insert_fills_database_defaults() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    let before = now_ms() - 1_000;

    let account = store.insert(&Account::new("alice", "a@example.com")).unwrap();
    assert!(account.join_date.unwrap() >= before);
    assert_eq!(account.interests, Some(json!({})));

    let board = store.insert(&Board::new("Macro", "alice")).unwrap();
    assert!(board.timestamp.unwrap() >= before);
    assert_eq!(board.members, json!([]));
    assert_eq!(board.graphs_count, Some(0));

    let graph = store.insert(&Graph::new("charts/a.png", json!({}))).unwrap();
    assert!(graph.publish_date.unwrap() >= before);
    assert_eq!(graph.upvote, 0);

    let follower = store.insert(&Follower::new("alice", "bob")).unwrap();
    assert!(follower.id.is_some());
    assert!(!follower.fellow && !follower.accept_status && !follower.declined);
    assert!(follower.timestamp.is_some());
}

#[test]
fn default_timestamps_keep_millisecond_precision() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();

    let mut join_dates = Vec::new();
    for index in 0..20 {
        let username = format!("user{index}");
        let account = store
            .insert(&Account::new(username.as_str(), format!("{username}@example.com")))
            .unwrap();
        join_dates.push(account.join_date.unwrap());
        sleep(Duration::from_millis(7));
    }

    assert!(join_dates.windows(2).all(|pair| pair[0] <= pair[1]));
    assert!(join_dates.iter().any(|millis| millis % 1000 != 0));
    assert!(join_dates[19] - join_dates[0] >= 7 * 19);
}

#[test]
fn temporary_pass_defaults_to_one_day_validity() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    store.insert(&Account::new("alice", "a@example.com")).unwrap();

    let pass = TemporaryPass::new("alice", "a@example.com", "x1y2");
    assert!(!pass.is_valid_at(now_ms()));

    let stored = store.insert(&pass).unwrap();
    let valid_until = stored.valid_until.unwrap();
    let now = now_ms();
    assert!(valid_until > now + DAY_MS - 60_000);
    assert!(valid_until <= now + DAY_MS + 1_000);
    assert!(stored.is_valid_at(now));
    assert!(!stored.is_valid_at(valid_until + 1));
}

#[test]
fn upsert_refreshes_snapshot_without_touching_equity() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    let mut dump = IntrinioDump::new("AAPL");
    dump.last_price = Some(180.5);
    store.insert(&dump).unwrap();
    store.insert(&Equity::new("AAPL", "Apple")).unwrap();

    dump.last_price = Some(190.25);
    dump.data = json!({"source": "nightly"});
    let refreshed = store.upsert(&dump).unwrap();

    assert_eq!(refreshed.last_price, Some(190.25));
    assert_eq!(refreshed.data, json!({"source": "nightly"}));
    assert_eq!(store.count::<IntrinioDump>().unwrap(), 1);
    assert!(store.get::<Equity>(&"AAPL".to_string()).unwrap().is_some());
}

#[test]
fn payment_upsert_overwrites_state_and_keeps_insert_timestamp() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();

    let mut payment = Payment::new("alice");
    payment.transaction_id = Some("t-1".to_string());
    let first = store.upsert(&payment).unwrap();
    assert!(first.is_subscribed);

    payment.transaction_id = Some("t-2".to_string());
    payment.is_subscribed = false;
    let second = store.upsert(&payment).unwrap();

    assert_eq!(second.transaction_id.as_deref(), Some("t-2"));
    assert!(!second.is_subscribed);
    assert_eq!(second.insert_timestamp, first.insert_timestamp);
    assert_eq!(store.count::<Payment>().unwrap(), 1);
}

#[test]
fn access_data_is_append_only() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    store.insert(&Account::new("alice", "a@example.com")).unwrap();

    let login = store.insert(&AccessData::login("alice", 1_000)).unwrap();
    store.insert(&AccessData::logout("alice", 2_000)).unwrap();

    let mut changed = login.clone();
    changed.login_timestamp = Some(5_000);
    assert!(matches!(
        store.update(&changed),
        Err(RepoError::AppendOnly("access_data"))
    ));
    assert!(matches!(
        store.delete::<AccessData>(&login.id.unwrap()),
        Err(RepoError::AppendOnly("access_data"))
    ));

    let entries: Vec<AccessData> = store.list().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0], login);
    assert_eq!(entries[1].logout_timestamp, Some(2_000));
}

#[test]
fn graph_parent_may_name_a_missing_graph() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();

    let mut graph = Graph::new("charts/a.png", json!({}));
    graph.parent = Some("G999".to_string());
    let stored = store.insert(&graph).unwrap();

    assert_eq!(stored.parent.as_deref(), Some("G999"));
}

#[test]
fn update_and_delete_report_missing_rows() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();

    match store.update(&Account::new("ghost", "g@example.com")) {
        Err(RepoError::NotFound { table, key }) => {
            assert_eq!(table, "account");
            assert_eq!(key, "ghost");
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(matches!(
        store.delete::<Tag>(&key3("rates", "G1", "ghost")),
        Err(RepoError::NotFound { table: "tag", .. })
    ));
    assert!(matches!(
        store.update(&Tag::new("rates", "G1", "ghost")),
        Err(RepoError::NotFound { table: "tag", .. })
    ));
}

#[test]
fn update_overwrites_non_key_columns() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    store.insert(&Account::new("alice", "a@example.com")).unwrap();

    let mut board = store.insert(&Board::new("Macro", "alice")).unwrap();
    board.name = "Macro views".to_string();
    board.members = json!(["bob", "carol"]);
    board.graphs_count = Some(3);
    store.update(&board).unwrap();

    let stored = store
        .get::<Board>(board.id.as_ref().unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(stored, board);
}

#[test]
fn update_keeps_stored_value_of_unset_defaulted_columns() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    let mut account = store.insert(&Account::new("alice", "a@example.com")).unwrap();
    let join_date = account.join_date;

    account.interests = None;
    account.join_date = None;
    account.occupation = Some("analyst".to_string());
    store.update(&account).unwrap();

    let stored = store.get::<Account>(&"alice".to_string()).unwrap().unwrap();
    assert_eq!(stored.occupation.as_deref(), Some("analyst"));
    assert_eq!(stored.interests, Some(json!({})));
    assert_eq!(stored.join_date, join_date);
}

#[test]
fn composite_keys_address_single_rows() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    store.insert(&Account::new("alice", "a@example.com")).unwrap();
    store
        .insert(&PushNotificationType::new("digest", "summary"))
        .unwrap();
    store
        .insert(&PushNotificationType::new("mentions", "social"))
        .unwrap();

    store
        .insert(&PushNotificationSetting::new("alice", "digest", "daily"))
        .unwrap();
    store
        .insert(&PushNotificationSetting::new("alice", "mentions", "weekly"))
        .unwrap();

    let setting = store
        .get::<PushNotificationSetting>(&key2("alice", "mentions"))
        .unwrap()
        .unwrap();
    assert_eq!(setting.frequency, "weekly");
    assert_eq!(setting.notification_time, "14:00");
    assert!(setting.enable);
}

#[test]
fn find_by_filters_on_declared_columns_only() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    store.insert(&Account::new("alice", "a@example.com")).unwrap();
    store.insert(&Account::new("bob", "b@example.com")).unwrap();
    store.insert(&Board::new("A", "alice")).unwrap();
    store.insert(&Board::new("B", "bob")).unwrap();
    store.insert(&Board::new("C", "alice")).unwrap();
    let mut unowned = Board::new("D", "nobody");
    unowned.owner = None;
    store.insert(&unowned).unwrap();

    let boards: Vec<Board> = store.find_by("owner", "alice".into()).unwrap();
    let names: Vec<&str> = boards.iter().map(|board| board.name.as_str()).collect();
    assert_eq!(names, vec!["A", "C"]);

    let boards: Vec<Board> = store.find_by("owner", FieldValue::Null).unwrap();
    assert_eq!(boards.len(), 1);
    assert_eq!(boards[0].name, "D");

    match store.find_by::<Board>("color", "red".into()) {
        Err(RepoError::UnknownColumn { table, column }) => {
            assert_eq!(table, "board");
            assert_eq!(column, "color");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn votes_per_author_are_not_limited() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    store.insert(&Account::new("bob", "b@example.com")).unwrap();
    let discussion = store.insert(&ProsAndCons::new("Rates will fall")).unwrap();
    assert!(discussion.is_active);
    assert_eq!(discussion.graphs, json!([]));

    store
        .insert(&ProsAndConsSelect::new(discussion.id.clone(), "bob", true))
        .unwrap();
    store
        .insert(&ProsAndConsSelect::new(discussion.id.clone(), "bob", false))
        .unwrap();

    let votes: Vec<ProsAndConsSelect> = store
        .find_by("pros_and_cons_id", discussion.id.clone().into())
        .unwrap();
    assert_eq!(votes.len(), 2);
}

#[test]
fn interests_get_rowid_keys() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();

    let first = store.insert(&Interest::new("Technology")).unwrap();
    let second = store.insert(&Interest::new("Energy")).unwrap();

    let first_id = first.id.unwrap();
    assert!(second.id.unwrap() > first_id);
    assert_eq!(
        store.get::<Interest>(&first_id).unwrap().map(|i| i.name),
        Some("Technology".to_string())
    );
}

#[test]
fn writes_join_an_open_caller_transaction() {
    let mut conn = open_db_in_memory().unwrap();

    let tx = conn.transaction().unwrap();
    {
        let store = SqliteRecordStore::try_new(&tx).unwrap();
        store.insert(&Account::new("alice", "a@example.com")).unwrap();
        let board = store.insert(&Board::new("Macro", "alice")).unwrap();
        assert_eq!(board.id.as_deref(), Some("B1000000000000"));
    }
    tx.rollback().unwrap();

    let store = SqliteRecordStore::try_new(&conn).unwrap();
    assert_eq!(store.count::<Account>().unwrap(), 0);
    assert_eq!(store.count::<Board>().unwrap(), 0);
    store.insert(&Account::new("alice", "a@example.com")).unwrap();
    let board = store.insert(&Board::new("Macro", "alice")).unwrap();
    assert_eq!(board.id.as_deref(), Some("B1000000000001"));
}
