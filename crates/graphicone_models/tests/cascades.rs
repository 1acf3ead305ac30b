use graphicone_models::db::open_db_in_memory;
use graphicone_models::model::account::{AccessData, Account, TemporaryPass};
use graphicone_models::model::billing::{Space, Subscription};
use graphicone_models::model::content::{Board, Graph, Tag};
use graphicone_models::model::discussion::{PcArgument, ProsAndCons, ProsAndConsSelect};
use graphicone_models::model::equity::{
    Equity, ExposedEquity, ExposedEquityFields, IntrinioDump,
};
use graphicone_models::model::notification::{
    EmailNotification, PushNotificationSetting, PushNotificationType,
};
use graphicone_models::{ConstraintKind, RecordStore, RepoError, SqliteRecordStore};
use rusqlite::Connection;
use serde_json::json;

fn account(store: &SqliteRecordStore<'_>, username: &str) {
    store
        .insert(&Account::new(username, format!("{username}@example.com")))
        .unwrap();
}

fn graph(store: &SqliteRecordStore<'_>, publisher: Option<&str>) -> String {
    let mut graph = Graph::new("charts/a.png", json!({"username": publisher}));
    graph.publisher = publisher.map(str::to_string);
    store.insert(&graph).unwrap().id.unwrap()
}

#[test]
fn deleting_account_removes_owned_rows() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    account(&store, "alice");
    account(&store, "bob");
    let graph_id = graph(&store, None);

    store
        .insert(&EmailNotification::new("alice", "monday", true))
        .unwrap();
    store
        .insert(&PushNotificationType::new("daily_digest", "digest"))
        .unwrap();
    store
        .insert(&PushNotificationSetting::new("alice", "daily_digest", "daily"))
        .unwrap();
    store.insert(&Board::new("Macro", "alice")).unwrap();
    store.insert(&Board::new("Other", "bob")).unwrap();
    store.insert(&Subscription::new("alice", "Pro")).unwrap();
    store.insert(&Space::new("space-1", "alice")).unwrap();
    store.insert(&Tag::new("rates", graph_id.clone(), "alice")).unwrap();
    store
        .insert(&TemporaryPass::new("alice", "alice@example.com", "x1y2"))
        .unwrap();
    store.insert(&AccessData::login("alice", 1_000)).unwrap();
    store.insert(&IntrinioDump::new("AAPL")).unwrap();
    store.insert(&Equity::new("AAPL", "Apple")).unwrap();
    store
        .insert(&ExposedEquity::new("AAPL", graph_id.clone(), "alice"))
        .unwrap();
    store
        .insert(&ExposedEquityFields::new("AAPL", "alice"))
        .unwrap();
    let mut own_discussion = ProsAndCons::new("Rates will fall");
    own_discussion.author = Some("alice".to_string());
    store.insert(&own_discussion).unwrap();
    let mut other_discussion = ProsAndCons::new("Oil will rise");
    other_discussion.author = Some("bob".to_string());
    let other_discussion = store.insert(&other_discussion).unwrap();
    store
        .insert(&ProsAndConsSelect::new(other_discussion.id.clone(), "alice", true))
        .unwrap();
    store
        .insert(&ProsAndConsSelect::new(other_discussion.id.clone(), "bob", false))
        .unwrap();

    store.delete::<Account>(&"alice".to_string()).unwrap();

    assert_eq!(store.count::<EmailNotification>().unwrap(), 0);
    assert_eq!(store.count::<PushNotificationSetting>().unwrap(), 0);
    assert_eq!(store.count::<Subscription>().unwrap(), 0);
    assert_eq!(store.count::<Space>().unwrap(), 0);
    assert_eq!(store.count::<Tag>().unwrap(), 0);
    assert_eq!(store.count::<TemporaryPass>().unwrap(), 0);
    assert_eq!(store.count::<AccessData>().unwrap(), 0);
    assert_eq!(store.count::<ExposedEquity>().unwrap(), 0);
    assert_eq!(store.count::<ExposedEquityFields>().unwrap(), 0);
    assert_eq!(store.count::<PushNotificationType>().unwrap(), 1);
    assert_eq!(store.count::<Equity>().unwrap(), 1);

    let discussions: Vec<ProsAndCons> = store.list().unwrap();
    assert_eq!(discussions, vec![other_discussion]);
    let votes: Vec<ProsAndConsSelect> = store.list().unwrap();
    assert_eq!(votes.len(), 1);
    assert_eq!(votes[0].vote_author, "bob");

    let boards: Vec<Board> = store.list().unwrap();
    assert_eq!(boards.len(), 1);
    assert_eq!(boards[0].owner.as_deref(), Some("bob"));
    assert!(store.get::<Graph>(&graph_id).unwrap().is_some());
}

#[test]
fn deleting_intrinio_dump_cascades_through_equity_to_exposures() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    account(&store, "alice");
    let graph_id = graph(&store, Some("alice"));

    store.insert(&IntrinioDump::new("AAPL")).unwrap();
    store.insert(&IntrinioDump::new("MSFT")).unwrap();
    store.insert(&Equity::new("AAPL", "Apple")).unwrap();
    store.insert(&Equity::new("MSFT", "Microsoft")).unwrap();
    store
        .insert(&ExposedEquity::new("AAPL", graph_id.clone(), "alice"))
        .unwrap();
    store
        .insert(&ExposedEquity::new("MSFT", graph_id.clone(), "alice"))
        .unwrap();

    store.delete::<IntrinioDump>(&"AAPL".to_string()).unwrap();

    assert!(store.get::<Equity>(&"AAPL".to_string()).unwrap().is_none());
    let exposures: Vec<ExposedEquity> = store.list().unwrap();
    assert_eq!(exposures, vec![ExposedEquity::new("MSFT", graph_id, "alice")]);
}

#[test]
fn deleting_graph_removes_tags_exposures_and_discussions() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    account(&store, "alice");
    account(&store, "bob");
    let graph_id = graph(&store, Some("alice"));

    store.insert(&Tag::new("rates", graph_id.clone(), "bob")).unwrap();
    store.insert(&IntrinioDump::new("AAPL")).unwrap();
    store.insert(&Equity::new("AAPL", "Apple")).unwrap();
    store
        .insert(&ExposedEquity::new("AAPL", graph_id.clone(), "alice"))
        .unwrap();
    let mut discussion = ProsAndCons::new("Rates will fall");
    discussion.graph_id = Some(graph_id.clone());
    let discussion = store.insert(&discussion).unwrap();
    store
        .insert(&ProsAndConsSelect::new(discussion.id.clone(), "bob", true))
        .unwrap();
    store
        .insert(&PcArgument::new("Rates will fall", "macro"))
        .unwrap();

    store.delete::<Graph>(&graph_id).unwrap();

    assert_eq!(store.count::<Tag>().unwrap(), 0);
    assert_eq!(store.count::<ExposedEquity>().unwrap(), 0);
    assert_eq!(store.count::<ProsAndCons>().unwrap(), 0);
    assert_eq!(store.count::<ProsAndConsSelect>().unwrap(), 0);
    assert_eq!(store.count::<PcArgument>().unwrap(), 0);
    assert_eq!(store.count::<Equity>().unwrap(), 1);
}

#[test]
fn publisher_with_graphs_blocks_account_delete_until_cleared() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    account(&store, "alice");
    let graph_id = graph(&store, Some("alice"));

    match store.delete::<Account>(&"alice".to_string()) {
        Err(RepoError::Constraint(violation)) => {
            assert_eq!(violation.kind, ConstraintKind::ForeignKey);
            assert_eq!(violation.table, "account");
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(store.get::<Account>(&"alice".to_string()).unwrap().is_some());

    let mut stored = store.get::<Graph>(&graph_id).unwrap().unwrap();
    stored.publisher = None;
    store.update(&stored).unwrap();

    store.delete::<Account>(&"alice".to_string()).unwrap();
    assert!(store.get::<Graph>(&graph_id).unwrap().is_some());
}

#[test]
fn demo_board_reference_blocks_board_delete() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecordStore::try_new(&conn).unwrap();
    account(&store, "alice");
    let board = store.insert(&Board::new("Demo", "alice")).unwrap();
    let mut subscription = Subscription::new("alice", "Pro");
    subscription.demo_board_id = board.id.clone();
    store.insert(&subscription).unwrap();

    let err = store.delete::<Board>(board.id.as_ref().unwrap()).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Constraint(ref violation) if violation.kind == ConstraintKind::ForeignKey
    ));
}

#[test]
fn failed_delete_inside_caller_transaction_leaves_it_usable() {
    let mut conn: Connection = open_db_in_memory().unwrap();
    {
        let store = SqliteRecordStore::try_new(&conn).unwrap();
        account(&store, "alice");
        graph(&store, Some("alice"));
    }

    let tx = conn.transaction().unwrap();
    {
        let store = SqliteRecordStore::try_new(&tx).unwrap();
        assert!(store.delete::<Account>(&"alice".to_string()).is_err());
        account(&store, "bob");
    }
    tx.commit().unwrap();

    let store = SqliteRecordStore::try_new(&conn).unwrap();
    assert_eq!(store.count::<Account>().unwrap(), 2);
}
