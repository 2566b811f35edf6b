//! End-to-end tests driving the coordinators through
//! [`GameService::dispatch`], the way a transport adapter would.

use banter::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::mpsc::UnboundedReceiver;

fn service() -> (GameService, UnboundedReceiver<Notification>) {
    GameService::new(StdRng::seed_from_u64(7))
}

fn conn(id: u64) -> ConnectionId {
    ConnectionId(format!("conn-{id}"))
}

fn player(id: u64, name: &str) -> Player {
    Player::new(UserId(id), conn(id), name)
}

fn drain(rx: &mut UnboundedReceiver<Notification>) -> Vec<Notification> {
    let mut out = Vec::new();
    while let Ok(note) = rx.try_recv() {
        out.push(note);
    }
    out
}

/// Pulls the room code out of the `JoinRoom` notice a create produced.
fn created_code(notes: &[Notification]) -> RoomCode {
    notes
        .iter()
        .find_map(|n| match n {
            Notification::JoinRoom { code, .. } => Some(code.clone()),
            _ => None,
        })
        .expect("create should emit JoinRoom")
}

/// The last room snapshot broadcast on the channel.
fn last_refresh(notes: &[Notification]) -> Room {
    notes
        .iter()
        .rev()
        .find_map(|n| match n {
            Notification::RoomRefreshed { room } => Some(room.clone()),
            _ => None,
        })
        .expect("expected a RoomRefreshed broadcast")
}

/// Creates a room for alice (user 1), joins bob (user 2), loads one
/// owner question, readies bob, and starts the game. Returns the code.
async fn running_game(
    service: &GameService,
    rx: &mut UnboundedReceiver<Notification>,
    question_text: &str,
) -> RoomCode {
    service
        .dispatch(
            &conn(1),
            Command::CreateRoom {
                player: player(1, "alice"),
            },
        )
        .await
        .unwrap();
    let code = created_code(&drain(rx));

    service
        .dispatch(
            &conn(2),
            Command::JoinRoom {
                player: player(2, "bob"),
                code: Some(code.clone()),
                password: None,
                owner_id: None,
            },
        )
        .await
        .unwrap();
    service
        .dispatch(
            &conn(1),
            Command::AddQuestions {
                code: code.clone(),
                user_id: UserId(1),
                questions: vec![Question::new(
                    QuestionId(1),
                    question_text,
                    UserId(1),
                    false,
                )],
            },
        )
        .await
        .unwrap();
    service
        .dispatch(
            &conn(2),
            Command::SetReady {
                code: code.clone(),
                user_id: UserId(2),
                ready: true,
            },
        )
        .await
        .unwrap();
    service
        .dispatch(&conn(1), Command::StartGame { code: code.clone() })
        .await
        .unwrap();
    code
}

#[tokio::test]
async fn test_dispatch_create_room_emits_join_then_refresh() {
    let (service, mut rx) = service();

    service
        .dispatch(
            &conn(1),
            Command::CreateRoom {
                player: player(1, "alice"),
            },
        )
        .await
        .unwrap();

    let notes = drain(&mut rx);
    assert_eq!(notes.len(), 2);
    assert!(matches!(&notes[0], Notification::JoinRoom { .. }));
    let room = last_refresh(&notes);
    assert_eq!(room.owner, UserId(1));
    assert_eq!(room.phase, RoomPhase::Lobby);
}

#[tokio::test]
async fn test_dispatch_overrides_claimed_connection_identity() {
    let (service, mut rx) = service();

    // The client claims somebody else's connection; the dispatch
    // connection wins, so owner commands from conn-1 still work.
    let mut spoofed = player(1, "alice");
    spoofed.connection_id = ConnectionId::from("spoofed");
    service
        .dispatch(&conn(1), Command::CreateRoom { player: spoofed })
        .await
        .unwrap();
    let code = created_code(&drain(&mut rx));
    service
        .dispatch(
            &conn(1),
            Command::AddQuestions {
                code: code.clone(),
                user_id: UserId(1),
                questions: vec![Question::new(
                    QuestionId(1),
                    "q",
                    UserId(1),
                    false,
                )],
            },
        )
        .await
        .unwrap();
    drain(&mut rx);

    service
        .dispatch(&conn(1), Command::StartGame { code })
        .await
        .unwrap();

    let room = last_refresh(&drain(&mut rx));
    assert_eq!(room.phase, RoomPhase::Answering);
}

#[tokio::test]
async fn test_dispatch_unknown_room_surfaces_game_error() {
    let (service, _rx) = service();

    let result = service
        .dispatch(
            &conn(1),
            Command::StartGame {
                code: RoomCode::from("Nowhere9"),
            },
        )
        .await;

    assert!(matches!(
        result,
        Err(BanterError::Game(GameError::RoomNotFound(_)))
    ));
}

#[tokio::test]
async fn test_dispatch_full_round_with_name_substitution() {
    let (service, mut rx) = service();
    let code =
        running_game(&service, &mut rx, "**** is cool").await;

    let room = last_refresh(&drain(&mut rx));
    assert_eq!(room.phase, RoomPhase::Answering);
    assert_eq!(room.round, 1);
    assert!(room.questions.is_empty());
    let current = room.current_question.as_ref().unwrap();
    let featured = room.players.iter().find(|p| {
        Some(p.user_id) == current.selected_player
    });
    assert_eq!(
        current.text,
        format!("{} is cool", featured.unwrap().name)
    );

    // Both answer; the owner closes answering.
    service
        .dispatch(
            &conn(1),
            Command::AddAnswer {
                code: code.clone(),
                answer: Answer::new(AnswerId(1), UserId(1), "says alice"),
            },
        )
        .await
        .unwrap();
    service
        .dispatch(
            &conn(2),
            Command::AddAnswer {
                code: code.clone(),
                answer: Answer::new(AnswerId(2), UserId(2), "says bob"),
            },
        )
        .await
        .unwrap();
    service
        .dispatch(
            &conn(1),
            Command::MarkAllUnready { code: code.clone() },
        )
        .await
        .unwrap();

    // Bob votes for alice, twice; the repeat must not double-score.
    for _ in 0..2 {
        service
            .dispatch(
                &conn(2),
                Command::ChooseAnswer {
                    code: code.clone(),
                    voter: UserId(2),
                    answer_owner: UserId(1),
                },
            )
            .await
            .unwrap();
    }

    let room = last_refresh(&drain(&mut rx));
    assert_eq!(room.phase, RoomPhase::Voting);
    let alice = room.players.iter().find(|p| p.user_id == UserId(1));
    assert_eq!(alice.unwrap().points, 10);
    assert_eq!(alice.unwrap().answer.as_ref().unwrap().votes, 1);
}

#[tokio::test]
async fn test_dispatch_new_round_from_guest_is_silent() {
    let (service, mut rx) = service();
    let code = running_game(&service, &mut rx, "q").await;
    drain(&mut rx);

    service
        .dispatch(&conn(2), Command::NewRound { code })
        .await
        .unwrap();

    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn test_dispatch_leave_room_closes_owned_room() {
    let (service, mut rx) = service();
    service
        .dispatch(
            &conn(1),
            Command::CreateRoom {
                player: player(1, "alice"),
            },
        )
        .await
        .unwrap();
    let code = created_code(&drain(&mut rx));

    service
        .dispatch(
            &conn(1),
            Command::LeaveRoom {
                code: code.clone(),
                user_id: UserId(1),
            },
        )
        .await
        .unwrap();

    let notes = drain(&mut rx);
    assert!(notes
        .iter()
        .any(|n| matches!(n, Notification::RoomClosed { .. })));
    assert!(service.rooms().registry().is_empty());
}

#[tokio::test]
async fn test_dispatch_refresh_public_rooms_broadcasts_list() {
    let (service, mut rx) = service();
    drain(&mut rx);

    service
        .dispatch(&conn(1), Command::RefreshPublicRooms)
        .await
        .unwrap();

    match drain(&mut rx).as_slice() {
        [Notification::PublicRoomsRefreshed { rooms }] => {
            assert!(rooms.is_empty());
        }
        other => panic!("expected a list refresh, got {other:?}"),
    }
}

#[tokio::test]
async fn test_dispatch_join_with_bad_code_notifies_not_errors() {
    let (service, mut rx) = service();

    let result = service
        .dispatch(
            &conn(2),
            Command::JoinRoom {
                player: player(2, "bob"),
                code: Some(RoomCode::from("Nowhere9")),
                password: None,
                owner_id: None,
            },
        )
        .await;

    assert!(result.is_ok(), "resolution failure is not a dispatch error");
    assert!(matches!(
        drain(&mut rx).as_slice(),
        [Notification::ValidationError { field_id, .. }] if field_id == "code"
    ));
}
