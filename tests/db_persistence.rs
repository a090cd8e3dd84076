mod common;

use supportdesk::db::{service::DbService, Sender};
use supportdesk::error::ChatError;
use uuid::Uuid;

#[test]
fn test_session_lifecycle() {
    let pool = common::memory_pool();
    let conn = pool.lock().unwrap();

    let session = DbService::insert_session(&conn).unwrap();

    let fetched = DbService::get_session(&conn, session.id).unwrap().unwrap();
    assert_eq!(fetched.id, session.id);

    let list = DbService::list_sessions(&conn, 10, 0).unwrap();
    assert_eq!(list.len(), 1);

    assert!(DbService::get_session(&conn, Uuid::new_v4()).unwrap().is_none());
}

#[test]
fn test_messages_reload_in_send_order() {
    let pool = common::memory_pool();
    let conn = pool.lock().unwrap();
    let session = DbService::insert_session(&conn).unwrap();

    let sent: Vec<String> = (0..12).map(|i| format!("message {}", i)).collect();
    for (i, text) in sent.iter().enumerate() {
        let sender = if i % 2 == 0 { Sender::User } else { Sender::Bot };
        let stored = DbService::insert_message(&conn, session.id, sender, text).unwrap();
        assert_eq!(stored.session_id, session.id);
        assert_eq!(stored.sender, sender.as_str());
    }

    let history = DbService::get_messages(&conn, session.id, 100, 0).unwrap();
    let reloaded: Vec<String> = history.iter().map(|m| m.content.clone()).collect();
    assert_eq!(reloaded, sent);
    assert_eq!(history[0].sender, "user");
    assert_eq!(history[1].sender, "bot");
}

#[test]
fn test_recent_messages_are_the_tail_oldest_first() {
    let pool = common::memory_pool();
    let conn = pool.lock().unwrap();
    let session = DbService::insert_session(&conn).unwrap();
    let other = DbService::insert_session(&conn).unwrap();

    for i in 1..=25 {
        DbService::insert_message(&conn, session.id, Sender::User, &format!("m{}", i)).unwrap();
    }
    DbService::insert_message(&conn, other.id, Sender::User, "elsewhere").unwrap();

    let recent = DbService::get_recent_messages(&conn, session.id, 20).unwrap();
    assert_eq!(recent.len(), 20);
    assert_eq!(recent.first().unwrap().content, "m6");
    assert_eq!(recent.last().unwrap().content, "m25");
    assert!(recent.iter().all(|m| m.session_id == session.id));
}

#[test]
fn test_faqs_keep_insertion_order() {
    let pool = common::memory_pool();
    let conn = pool.lock().unwrap();

    let first = DbService::insert_faq(&conn, "hours", "9 to 5").unwrap();
    let second = DbService::insert_faq(&conn, "shipping", "3 days").unwrap();
    let third = DbService::insert_faq(&conn, "refund", "30 days").unwrap();

    let ids: Vec<i64> = DbService::list_faqs(&conn).unwrap().iter().map(|f| f.id).collect();
    assert_eq!(ids, vec![first.id, second.id, third.id]);

    assert!(DbService::delete_faq(&conn, second.id).unwrap());
    assert!(!DbService::delete_faq(&conn, second.id).unwrap());
    let remaining = DbService::list_faqs(&conn).unwrap();
    assert_eq!(remaining, vec![first, third]);
}

#[test]
fn test_escalation_records() {
    let pool = common::memory_pool();
    let conn = pool.lock().unwrap();
    let session = DbService::insert_session(&conn).unwrap();

    let record = DbService::insert_escalation(&conn, session.id, "I need a person").unwrap();
    assert_eq!(record.session_id, session.id);
    assert_eq!(record.user_message, "I need a person");

    let listed = DbService::list_escalations(&conn, 10).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, record.id);
}

#[test]
fn test_all_messages_reads_past_one_page() {
    let pool = common::memory_pool();
    let conn = pool.lock().unwrap();
    let session = DbService::insert_session(&conn).unwrap();

    for i in 0..10 {
        DbService::insert_message(&conn, session.id, Sender::User, &format!("m{}", i)).unwrap();
    }

    let all = DbService::get_all_messages(&conn, session.id, 3).unwrap();
    let contents: Vec<String> = all.iter().map(|m| m.content.clone()).collect();
    let expected: Vec<String> = (0..10).map(|i| format!("m{}", i)).collect();
    assert_eq!(contents, expected);

    // Exact multiple of the page size
    let exact = DbService::get_all_messages(&conn, session.id, 5).unwrap();
    assert_eq!(exact.len(), 10);
}

#[test]
fn test_corrupt_rows_surface_as_errors() {
    let pool = common::memory_pool();
    let conn = pool.lock().unwrap();
    conn.execute(
        "INSERT INTO escalations (session_id, user_message) VALUES ('not-a-uuid', 'help')",
        [],
    )
    .unwrap();

    let err = DbService::list_escalations(&conn, 10).unwrap_err();
    assert!(matches!(err, duckdb::Error::FromSqlConversionFailure(1, _, _)));
    assert!(matches!(ChatError::from(err), ChatError::Dependency(_)));
}
