mod common;

use checkers_core::{
    Color, EndReason, JoinRequest, Piece, Provenance, RoomId, RoomStatus, Square,
};
use runtime::{ErrorKind, RoomEvent, RuntimeConfig};

use common::{FailingPublisher, harness, harness_with};

fn sq(row: u8, col: u8) -> Square {
    Square::new(row, col)
}

/// A whole match from creation to reclamation.
///
/// 1. Two players join and the room starts playing with light to move
/// 2. Light steps forward, dark's illegal reply is rejected without effect
/// 3. Dark leaves mid-game and light wins by forfeit
/// 4. Light leaves and the empty room is reclaimed
#[tokio::test]
async fn full_match_lifecycle() {
    let h = harness();
    let handle = h.runtime.handle();

    // ================================================================
    // PHASE 1: Seating
    // ================================================================
    let room = handle.create_room().await;
    assert_eq!(room.id.as_str(), "room-1");
    assert_eq!(room.status, RoomStatus::Waiting);
    assert_eq!(room.board.count(Color::Light), 12);
    assert_eq!(room.board.count(Color::Dark), 12);

    let a = handle
        .join_room(&room.id, JoinRequest::with_client_id("alice"))
        .await
        .expect("first join should succeed");
    assert_eq!(a.seat.color, Color::Light);
    assert_eq!(a.room.status, RoomStatus::Waiting);

    let b = handle
        .join_room(&room.id, JoinRequest::with_client_id("bob").display_name("Bob"))
        .await
        .expect("second join should succeed");
    assert_eq!(b.seat.color, Color::Dark);
    assert_eq!(b.room.status, RoomStatus::Playing);
    assert_eq!(b.room.turn, Color::Light);
    assert_ne!(a.seat.session_id, b.seat.session_id);

    // ================================================================
    // PHASE 2: Moves
    // ================================================================
    let after = handle
        .make_move(&room.id, &a.seat.session_id, sq(2, 1), sq(3, 2))
        .await
        .expect("light opening should be legal");
    assert_eq!(after.turn, Color::Dark);
    assert_eq!(after.board.piece_at(sq(3, 2)), Some(Piece::man(Color::Light)));
    assert_eq!(after.board.piece_at(sq(2, 1)), None);

    let err = handle
        .make_move(&room.id, &b.seat.session_id, sq(5, 0), sq(3, 2))
        .await
        .expect_err("two-row step without a capture is illegal");
    assert_eq!(err.kind(), ErrorKind::IllegalDestination);
    assert_eq!(err.error_code(), "MOVE_ILLEGAL_DESTINATION");

    let unchanged = handle.get_room(&room.id).await.expect("room exists");
    assert_eq!(unchanged, after);

    let err = handle
        .make_move(&room.id, &a.seat.session_id, sq(3, 2), sq(4, 3))
        .await
        .expect_err("light already moved");
    assert_eq!(err.kind(), ErrorKind::NotYourTurn);

    // ================================================================
    // PHASE 3: Forfeit
    // ================================================================
    let forfeited = handle
        .leave_room(&room.id, &b.seat.session_id)
        .await
        .expect("dark can leave");
    assert_eq!(forfeited.status, RoomStatus::Finished);
    assert_eq!(forfeited.winner, Some(Color::Light));
    assert_eq!(forfeited.end_reason, Some(EndReason::OpponentLeft));
    assert_eq!(forfeited.player_count(), 1);

    let err = handle
        .make_move(&room.id, &a.seat.session_id, sq(3, 2), sq(4, 3))
        .await
        .expect_err("finished rooms reject moves");
    assert_eq!(err.kind(), ErrorKind::NotPlaying);

    // ================================================================
    // PHASE 4: Reclamation
    // ================================================================
    let emptied = handle
        .leave_room(&room.id, &a.seat.session_id)
        .await
        .expect("light can leave");
    assert!(emptied.is_empty());

    let err = handle.get_room(&room.id).await.expect_err("room was reaped");
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(handle.stats().await.rooms, 0);

    h.runtime.shutdown().await.expect("clean shutdown");
    assert_eq!(
        h.recorder.names(),
        [
            "room-update",
            "room-update",
            "game-move",
            "room-update",
            "room-update",
            "player-left",
            "room-update",
            "player-left",
            "room-closed",
        ]
    );
}

#[tokio::test]
async fn repeated_joins_map_to_the_existing_seat() {
    let h = harness();
    let handle = h.runtime.handle();
    let room = handle.create_room().await;

    let first = handle
        .join_room(&room.id, JoinRequest::with_client_id("alice"))
        .await
        .expect("join");
    let again = handle
        .join_room(&room.id, JoinRequest::with_client_id("alice"))
        .await
        .expect("repeat join");

    assert_eq!(first.seat, again.seat);
    assert_eq!(again.room.player_count(), 1);
    assert_eq!(again.room.version, first.room.version);

    h.runtime.shutdown().await.expect("clean shutdown");
    assert_eq!(h.recorder.names(), ["room-update"]);
}

#[tokio::test]
async fn provenance_duplicates_fold_only_inside_the_window() {
    let h = harness_with(RuntimeConfig::default().with_rejoin_window_ms(2_000));
    let handle = h.runtime.handle();
    let room = handle.create_room().await;
    let origin = || JoinRequest::default().provenance(Provenance::new("10.0.0.7", "Firefox"));

    h.clock.set(1_000);
    let first = handle.join_room(&room.id, origin()).await.expect("join");

    h.clock.advance(500);
    let duplicate = handle.join_room(&room.id, origin()).await.expect("duplicate");
    assert_eq!(duplicate.seat, first.seat);
    assert_eq!(duplicate.room.player_count(), 1);

    h.clock.advance(5_000);
    let second = handle.join_room(&room.id, origin()).await.expect("late join");
    assert_ne!(second.seat.session_id, first.seat.session_id);
    assert_eq!(second.seat.color, Color::Dark);
    assert_eq!(second.room.status, RoomStatus::Playing);
}

#[tokio::test]
async fn third_player_is_turned_away() {
    let h = harness();
    let handle = h.runtime.handle();
    let room = handle.create_room().await;

    for client in ["alice", "bob"] {
        handle
            .join_room(&room.id, JoinRequest::with_client_id(client))
            .await
            .expect("seat available");
    }

    let err = handle
        .join_room(&room.id, JoinRequest::with_client_id("carol"))
        .await
        .expect_err("room is full");
    assert_eq!(err.kind(), ErrorKind::RoomFull);
    assert_eq!(err.error_code(), "JOIN_ROOM_FULL");

    let room = handle.get_room(&room.id).await.expect("room exists");
    assert_eq!(room.player_count(), 2);
}

#[tokio::test]
async fn freed_seat_goes_to_the_missing_color() {
    let h = harness();
    let handle = h.runtime.handle();
    let room = handle.create_room().await;

    let light = handle
        .join_room(&room.id, JoinRequest::with_client_id("alice"))
        .await
        .expect("join");
    handle
        .join_room(&room.id, JoinRequest::with_client_id("bob"))
        .await
        .expect("join");
    handle
        .leave_room(&room.id, &light.seat.session_id)
        .await
        .expect("leave");

    let late = handle
        .join_room(&room.id, JoinRequest::with_client_id("carol"))
        .await
        .expect("a seat was freed");
    assert_eq!(late.seat.color, Color::Light);
    assert_eq!(late.room.status, RoomStatus::Finished);
    assert_eq!(late.room.winner, Some(Color::Dark));
}

#[tokio::test]
async fn concurrent_joins_never_overfill_a_room() {
    let h = harness();
    let handle = h.runtime.handle();
    let room = handle.create_room().await;

    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let handle = handle.clone();
            let room_id = room.id.clone();
            tokio::spawn(async move {
                handle
                    .join_room(&room_id, JoinRequest::with_client_id(format!("client-{i}")))
                    .await
            })
        })
        .collect();

    let mut seated = Vec::new();
    let mut full = 0;
    for task in tasks {
        match task.await.expect("task panicked") {
            Ok(joined) => seated.push(joined.seat.color),
            Err(err) => {
                assert_eq!(err.kind(), ErrorKind::RoomFull);
                full += 1;
            }
        }
    }

    seated.sort_by_key(|c| c.to_string());
    assert_eq!(seated, [Color::Dark, Color::Light]);
    assert_eq!(full, 14);

    let room = handle.get_room(&room.id).await.expect("room exists");
    assert_eq!(room.player_count(), 2);
    assert_eq!(room.status, RoomStatus::Playing);
}

#[tokio::test]
async fn unknown_rooms_and_sessions_are_rejected() {
    let h = harness();
    let handle = h.runtime.handle();
    let missing: RoomId = "nope".into();

    let not_found = [
        handle.get_room(&missing).await.map(drop),
        handle
            .join_room(&missing, JoinRequest::default())
            .await
            .map(drop),
        handle.leave_room(&missing, &"s".into()).await.map(drop),
        handle
            .make_move(&missing, &"s".into(), sq(2, 1), sq(3, 2))
            .await
            .map(drop),
        handle.valid_moves(&missing, sq(2, 1)).await.map(drop),
        handle.subscribe(&missing).await.map(drop),
    ];
    for result in not_found {
        let err = result.expect_err("room does not exist");
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.error_code(), "ROOM_NOT_FOUND");
    }

    let room = handle.create_room().await;
    let err = handle
        .leave_room(&room.id, &"stranger".into())
        .await
        .expect_err("not seated");
    assert_eq!(err.kind(), ErrorKind::UnknownPlayer);

    let err = handle
        .make_move(&room.id, &"stranger".into(), sq(2, 1), sq(3, 2))
        .await
        .expect_err("waiting room");
    assert_eq!(err.kind(), ErrorKind::NotPlaying);
}

#[tokio::test]
async fn valid_moves_lists_reachable_squares() {
    let h = harness();
    let handle = h.runtime.handle();
    let room = handle.create_room().await;

    let moves = handle.valid_moves(&room.id, sq(2, 1)).await.expect("room exists");
    assert_eq!(moves, [sq(3, 0), sq(3, 2)]);

    let moves = handle.valid_moves(&room.id, sq(5, 2)).await.expect("room exists");
    assert_eq!(moves, [sq(4, 1), sq(4, 3)]);

    assert!(handle.valid_moves(&room.id, sq(1, 0)).await.expect("room exists").is_empty());
    assert!(handle.valid_moves(&room.id, sq(4, 1)).await.expect("room exists").is_empty());
}

#[tokio::test]
async fn rooms_are_listed_newest_first() {
    let h = harness();
    let handle = h.runtime.handle();

    for at in [10, 30, 20] {
        h.clock.set(at);
        handle.create_room().await;
    }

    let listed: Vec<_> = handle
        .list_rooms()
        .await
        .into_iter()
        .map(|s| (s.id.to_string(), s.created_at.0))
        .collect();
    assert_eq!(
        listed,
        [
            ("room-2".to_string(), 30),
            ("room-3".to_string(), 20),
            ("room-1".to_string(), 10),
        ]
    );
    assert_eq!(handle.stats().await.rooms, 3);
}

#[tokio::test]
async fn subscribers_see_room_events_in_order() {
    let h = harness();
    let handle = h.runtime.handle();
    let room = handle.create_room().await;
    let mut events = handle.subscribe(&room.id).await.expect("room exists");

    let a = handle
        .join_room(&room.id, JoinRequest::with_client_id("alice"))
        .await
        .expect("join");
    handle
        .join_room(&room.id, JoinRequest::with_client_id("bob"))
        .await
        .expect("join");
    handle
        .make_move(&room.id, &a.seat.session_id, sq(2, 3), sq(3, 4))
        .await
        .expect("legal move");

    let mut received = Vec::new();
    for _ in 0..4 {
        let event = tokio::time::timeout(std::time::Duration::from_secs(1), events.recv())
            .await
            .expect("event should arrive")
            .expect("channel open");
        received.push(event);
    }

    let names: Vec<_> = received.iter().map(RoomEvent::name).collect();
    assert_eq!(names, ["room-update", "room-update", "game-move", "room-update"]);

    let RoomEvent::BoardChanged {
        turn, last_move, ..
    } = &received[2]
    else {
        panic!("expected a board change, got {:?}", received[2]);
    };
    assert_eq!(*turn, Color::Dark);
    assert_eq!(last_move.from, sq(2, 3));
    assert_eq!(last_move.to, sq(3, 4));

    let RoomEvent::RoomUpdated { room: snapshot } = &received[3] else {
        panic!("expected a snapshot, got {:?}", received[3]);
    };
    assert_eq!(snapshot.version, 3);
    assert_eq!(snapshot.last_move.map(|m| m.to), Some(sq(3, 4)));
}

#[tokio::test]
async fn failing_sink_does_not_affect_transitions() {
    let runtime = runtime::Runtime::builder()
        .publisher(FailingPublisher)
        .build();
    let handle = runtime.handle();

    let room = handle.create_room().await;
    let joined = handle
        .join_room(&room.id, JoinRequest::default())
        .await
        .expect("join succeeds regardless of sinks");
    assert_eq!(joined.room.player_count(), 1);

    runtime.shutdown().await.expect("clean shutdown");
}

#[tokio::test]
async fn closed_rooms_leave_no_channel_behind() {
    let h = harness();
    let handle = h.runtime.handle();
    let bus = h.runtime.event_bus();
    let room = handle.create_room().await;

    let mut events = handle.subscribe(&room.id).await.expect("room exists");
    assert_eq!(bus.channel_count().await, 1);

    let only = handle
        .join_room(&room.id, JoinRequest::with_client_id("alice"))
        .await
        .expect("join");
    handle
        .leave_room(&room.id, &only.seat.session_id)
        .await
        .expect("leave");

    let mut last = None;
    for _ in 0..4 {
        let event = tokio::time::timeout(std::time::Duration::from_secs(1), events.recv())
            .await
            .expect("event should arrive")
            .expect("channel open");
        last = Some(event);
    }
    assert_eq!(
        last,
        Some(RoomEvent::RoomClosed {
            room_id: room.id.clone()
        })
    );

    // Joining the worker guarantees the bus has finished handling the close.
    h.runtime.shutdown().await.expect("clean shutdown");
    assert_eq!(bus.channel_count().await, 0);

    let err = handle
        .subscribe(&room.id)
        .await
        .expect_err("reaped rooms cannot be subscribed to");
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(bus.channel_count().await, 0);
}
