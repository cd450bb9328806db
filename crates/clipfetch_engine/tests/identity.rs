use std::fs;

use clipfetch_engine::{IdentityError, SessionId, SessionStore};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn assert_uuid_v4(id: &SessionId) {
    let text = id.as_str();
    assert_eq!(text.len(), 36);
    let groups: Vec<&str> = text.split('-').collect();
    assert_eq!(
        groups.iter().map(|g| g.len()).collect::<Vec<_>>(),
        vec![8, 4, 4, 4, 12]
    );
    assert!(text
        .chars()
        .all(|c| c == '-' || (c.is_ascii_hexdigit() && !c.is_ascii_uppercase())));
    assert!(groups[2].starts_with('4'));
    assert!(matches!(groups[3].chars().next(), Some('8' | '9' | 'a' | 'b')));
}

#[test]
fn generated_ids_are_v4_and_distinct() {
    let a = SessionId::generate();
    let b = SessionId::generate();
    assert_uuid_v4(&a);
    assert_uuid_v4(&b);
    assert_ne!(a, b);
}

#[test]
fn first_use_creates_and_persists() {
    let temp = TempDir::new().unwrap();
    let store = SessionStore::new(temp.path().join("state"));
    assert_eq!(store.load().unwrap(), None);

    let id = store.get_or_create();
    assert_uuid_v4(&id);
    assert!(store.path().is_file());
    assert_eq!(store.load().unwrap(), Some(id));
}

#[test]
fn identity_is_stable_across_stores() {
    let temp = TempDir::new().unwrap();
    let first = SessionStore::new(temp.path().to_path_buf()).get_or_create();
    let second = SessionStore::new(temp.path().to_path_buf()).get_or_create();
    assert_eq!(first, second);
}

#[test]
fn corrupt_file_yields_ephemeral_id_and_is_left_alone() {
    let temp = TempDir::new().unwrap();
    let store = SessionStore::new(temp.path().to_path_buf());
    fs::write(store.path(), "not ron at all {").unwrap();

    assert!(matches!(store.load(), Err(IdentityError::Parse { .. })));
    let a = store.get_or_create();
    let b = store.get_or_create();
    assert_uuid_v4(&a);
    assert_ne!(a, b);
    assert_eq!(
        fs::read_to_string(store.path()).unwrap(),
        "not ron at all {"
    );
}

#[test]
fn blank_stored_id_is_rejected() {
    let temp = TempDir::new().unwrap();
    let store = SessionStore::new(temp.path().to_path_buf());
    fs::write(store.path(), "(session_id: \"  \")").unwrap();
    assert!(matches!(store.load(), Err(IdentityError::Empty(_))));
}

#[test]
fn reads_a_hand_written_file() {
    let temp = TempDir::new().unwrap();
    let store = SessionStore::new(temp.path().to_path_buf());
    fs::write(
        store.path(),
        "(\n    session_id: \"0b6f3e4a-1c2d-4e5f-8a9b-0c1d2e3f4a5b\",\n)\n",
    )
    .unwrap();
    assert_eq!(
        store.get_or_create().as_str(),
        "0b6f3e4a-1c2d-4e5f-8a9b-0c1d2e3f4a5b"
    );
}
