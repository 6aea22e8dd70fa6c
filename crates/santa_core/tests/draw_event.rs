use rand::rngs::StdRng;
use rand::SeedableRng;
use rusqlite::Connection;
use santa_core::db::open_db_in_memory;
use santa_core::{
    draw_event, AddParticipantRequest, CreateEventRequest, DrawError, EventId, EventService,
    EventServiceError, SqliteEventRepository, SqliteParticipantRepository, SqliteUserRepository,
    UserId, UserRepository,
};
use std::collections::{HashMap, HashSet};

fn service(
    conn: &Connection,
) -> EventService<SqliteEventRepository<'_>, SqliteParticipantRepository<'_>> {
    EventService::new(
        SqliteEventRepository::new(conn),
        SqliteParticipantRepository::new(conn),
    )
}

fn seeded_event(conn: &Connection, participant_count: usize) -> (UserId, EventId) {
    let owner = SqliteUserRepository::new(conn)
        .create_user("owner@example.com", "Owner", "pbkdf2-sha256$1$00$00")
        .unwrap()
        .id;
    let service = service(conn);
    let event = service
        .create_event(
            owner,
            &CreateEventRequest {
                name: "Family".to_string(),
                description: String::new(),
                budget: 30.0,
                exchange_date: "2026-12-24".to_string(),
            },
        )
        .unwrap();

    for index in 0..participant_count {
        service
            .add_participant(
                owner,
                event.id,
                &AddParticipantRequest {
                    name: format!("Person {index}"),
                    email: format!("person{index}@example.com"),
                    wishlist: format!("gift {index}"),
                },
            )
            .unwrap();
    }

    (owner, event.id)
}

fn assignments(conn: &Connection, owner: UserId, event_id: EventId) -> HashMap<String, String> {
    let detail = service(conn).get_event(owner, event_id).unwrap();
    let names: HashMap<_, _> = detail
        .participants
        .iter()
        .map(|p| (p.id, p.name.clone()))
        .collect();
    detail
        .participants
        .iter()
        .map(|p| {
            let receiver = p.assigned_to.expect("every participant is assigned");
            (p.name.clone(), names[&receiver].clone())
        })
        .collect()
}

#[test]
fn draw_persists_a_derangement_and_marks_event() {
    let mut conn = open_db_in_memory().unwrap();
    let (owner, event_id) = seeded_event(&conn, 6);
    let mut rng = StdRng::seed_from_u64(11);

    let outcome = draw_event(&mut conn, owner, event_id, &mut rng).unwrap();
    assert_eq!(outcome.assignments, 6);
    assert_eq!(outcome.event_id, event_id);

    let detail = service(&conn).get_event(owner, event_id).unwrap();
    assert!(detail.event.drawn);

    let pairs = assignments(&conn, owner, event_id);
    assert_eq!(pairs.len(), 6);
    let receivers: HashSet<_> = pairs.values().collect();
    assert_eq!(receivers.len(), 6);
    for (giver, receiver) in &pairs {
        assert_ne!(giver, receiver);
    }
}

#[test]
fn second_draw_is_rejected_and_first_result_kept() {
    let mut conn = open_db_in_memory().unwrap();
    let (owner, event_id) = seeded_event(&conn, 4);
    let mut rng = StdRng::seed_from_u64(12);

    draw_event(&mut conn, owner, event_id, &mut rng).unwrap();
    let first = assignments(&conn, owner, event_id);

    let err = draw_event(&mut conn, owner, event_id, &mut rng).unwrap_err();
    assert!(matches!(err, DrawError::AlreadyDrawn(id) if id == event_id));
    assert_eq!(assignments(&conn, owner, event_id), first);
}

#[test]
fn draw_with_two_participants_is_rejected_without_side_effects() {
    let mut conn = open_db_in_memory().unwrap();
    let (owner, event_id) = seeded_event(&conn, 2);
    let mut rng = StdRng::seed_from_u64(13);

    let err = draw_event(&mut conn, owner, event_id, &mut rng).unwrap_err();
    assert!(matches!(
        err,
        DrawError::InsufficientParticipants {
            actual: 2,
            required: 3
        }
    ));

    let detail = service(&conn).get_event(owner, event_id).unwrap();
    assert!(!detail.event.drawn);
    assert!(detail.participants.iter().all(|p| p.assigned_to.is_none()));
}

#[test]
fn draw_by_other_user_is_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let (_, event_id) = seeded_event(&conn, 3);
    let intruder = SqliteUserRepository::new(&conn)
        .create_user("intruder@example.com", "Intruder", "pbkdf2-sha256$1$00$00")
        .unwrap()
        .id;
    let mut rng = StdRng::seed_from_u64(14);

    let err = draw_event(&mut conn, intruder, event_id, &mut rng).unwrap_err();
    assert!(matches!(err, DrawError::EventNotFound(_)));
}

#[test]
fn participants_read_their_assignment_after_draw() {
    let mut conn = open_db_in_memory().unwrap();
    let (owner, event_id) = seeded_event(&conn, 3);
    let mut rng = StdRng::seed_from_u64(15);
    draw_event(&mut conn, owner, event_id, &mut rng).unwrap();

    let pairs = assignments(&conn, owner, event_id);
    let view = service(&conn)
        .lookup_assignment(event_id, "Person0@Example.com")
        .unwrap();
    assert_eq!(view.participant_name, "Person 0");
    assert_eq!(view.receiver_name, pairs["Person 0"]);
    let receiver_index = view.receiver_name.trim_start_matches("Person ");
    assert_eq!(view.receiver_wishlist, format!("gift {receiver_index}"));
}

#[test]
fn adding_participant_after_draw_is_rejected() {
    let mut conn = open_db_in_memory().unwrap();
    let (owner, event_id) = seeded_event(&conn, 3);
    let mut rng = StdRng::seed_from_u64(16);
    draw_event(&mut conn, owner, event_id, &mut rng).unwrap();

    let err = service(&conn)
        .add_participant(
            owner,
            event_id,
            &AddParticipantRequest {
                name: "Latecomer".to_string(),
                email: String::new(),
                wishlist: String::new(),
            },
        )
        .unwrap_err();
    assert!(matches!(err, EventServiceError::AlreadyDrawn(_)));
}
