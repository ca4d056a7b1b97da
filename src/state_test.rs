use super::*;

#[test]
fn session_new_is_empty() {
    let session = Session::new();
    assert!(session.user.is_none());
    assert!(session.items.is_empty());
    assert!(session.staged_images.is_empty());
    assert!(session.notices.is_empty());
}

#[test]
fn session_touch_advances_last_seen() {
    let mut session = Session::new();
    let before = session.last_seen;
    std::thread::sleep(std::time::Duration::from_millis(2));
    session.touch();
    assert!(session.last_seen > before);
}

#[tokio::test]
async fn seed_session_registers_session() {
    let state = test_helpers::test_app_state();
    let id = test_helpers::seed_session(&state, Some(HouseholdMember::Diego)).await;

    let sessions = state.sessions.read().await;
    let session = sessions.get(&id).expect("session should exist");
    assert_eq!(session.user, Some(HouseholdMember::Diego));
}

#[test]
fn app_state_clones_share_sessions() {
    let state = test_helpers::test_app_state();
    let clone = state.clone();
    assert!(Arc::ptr_eq(&state.sessions, &clone.sessions));
}
