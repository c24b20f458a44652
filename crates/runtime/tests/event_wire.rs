mod common;

use serde_json::Value;

use checkers_core::{JoinRequest, Square};

use common::harness;

#[tokio::test]
async fn events_serialize_with_type_and_data() {
    let h = harness();
    let handle = h.runtime.handle();
    let room = handle.create_room().await;

    let a = handle
        .join_room(&room.id, JoinRequest::with_client_id("alice").display_name("Alice"))
        .await
        .expect("join");
    handle
        .join_room(&room.id, JoinRequest::with_client_id("bob"))
        .await
        .expect("join");
    handle
        .make_move(&room.id, &a.seat.session_id, Square::new(2, 1), Square::new(3, 0))
        .await
        .expect("legal move");

    h.runtime.shutdown().await.expect("clean shutdown");
    let events = h.recorder.events();

    let snapshot: Value = serde_json::from_str(&events[0].to_json().expect("encodes"))
        .expect("valid json");
    assert_eq!(snapshot["type"], "room_updated");
    assert_eq!(snapshot["data"]["room"]["id"], "room-1");
    assert_eq!(snapshot["data"]["room"]["status"], "waiting");
    assert_eq!(snapshot["data"]["room"]["players"][0]["color"], "light");
    assert_eq!(snapshot["data"]["room"]["players"][0]["display_name"], "Alice");
    assert_eq!(events[0].channel(), "room:room-1");

    let moved: Value = serde_json::from_str(&events[2].to_json().expect("encodes"))
        .expect("valid json");
    assert_eq!(moved["type"], "board_changed");
    assert_eq!(moved["data"]["turn"], "dark");
    assert_eq!(moved["data"]["last_move"]["to"]["row"], 3);
    assert_eq!(moved["data"]["last_move"]["to"]["col"], 0);
}
