//! Integration tests for the world: store calls and the events they publish.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use arena::broadcast::Subscription;
use arena::core::{ErrorKind, StopHandle, StopSignal};
use arena::shared::{Direction, Dot, DotsMask, Location};
use arena::{Event, EventKind, World, WorldConfig, WorldError};

#[derive(Debug)]
struct Snake(u32);

fn loc(dots: &[(u8, u8)]) -> Location {
    dots.iter().map(|&d| Dot::from(d)).collect()
}

fn small_world() -> World<Snake> {
    let config = WorldConfig {
        width: 10,
        height: 10,
        ..WorldConfig::default()
    };
    World::new(&config).unwrap()
}

fn next(events: &Subscription<Event<Snake>>) -> Event<Snake> {
    events.recv_timeout(Duration::from_secs(2)).unwrap()
}

#[test]
fn test_create_and_delete_publish_events() {
    let world = small_world();
    let (_handle, stop) = StopHandle::new();
    world.start(&stop);
    let events = world.events(&stop, 16);

    let snake = Arc::new(Snake(1));
    let body = loc(&[(0, 0), (0, 1)]);
    world.create_object(&snake, &body).unwrap();
    world.delete_object(&snake, &body).unwrap();

    let created = next(&events);
    assert_eq!(created.kind(), EventKind::Created);
    assert!(Arc::ptr_eq(created.as_object().unwrap(), &snake));

    let deleted = next(&events);
    assert_eq!(deleted.kind(), EventKind::Deleted);
    assert!(Arc::ptr_eq(deleted.as_object().unwrap(), &snake));

    assert_eq!(world.stats().objects, 0);
    assert_eq!(world.stats().occupied_dots, 0);
    world.close();
}

#[test]
fn test_conflict_publishes_error_event() {
    let world = small_world();
    let (_handle, stop) = StopHandle::new();
    world.start(&stop);
    let events = world.events(&stop, 16);

    let (o1, o2) = (Arc::new(Snake(1)), Arc::new(Snake(2)));
    world.create_object(&o1, &loc(&[(0, 0), (0, 1)])).unwrap();
    let err = world.create_object(&o2, &loc(&[(0, 1), (0, 2)])).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(world.get_objects().len(), 1);

    assert_eq!(next(&events).kind(), EventKind::Created);
    let failure = next(&events);
    assert_eq!(failure.kind(), EventKind::Error);
    assert_eq!(failure.as_error(), Some(&err));
    world.close();
}

#[test]
fn test_lookups() {
    let world = small_world();
    let (_handle, stop) = StopHandle::new();
    world.start(&stop);
    let events = world.events(&stop, 16);

    let snake = Arc::new(Snake(7));
    world.create_object(&snake, &loc(&[(5, 5), (5, 6)])).unwrap();
    assert_eq!(next(&events).kind(), EventKind::Created);

    assert!(world.location_occupied(&loc(&[(5, 5), (5, 6)])));
    assert!(world.get_object_by_dot(Dot::new(1, 1)).is_none());

    let found = world.get_object_by_dot(Dot::new(5, 6)).unwrap();
    assert_eq!(found.0, 7);
    let checked = next(&events);
    assert_eq!(checked.kind(), EventKind::Checked);
    assert!(Arc::ptr_eq(checked.as_object().unwrap(), &snake));

    let all = world.get_objects_by_dots(&loc(&[(5, 5), (5, 6), (0, 0)]));
    assert_eq!(all.len(), 1);
    assert_eq!(next(&events).kind(), EventKind::Checked);

    // Neither the occupancy check nor a missed lookup publishes anything
    assert!(events.recv_timeout(Duration::from_millis(100)).is_err());
    world.close();
}

#[test]
fn test_subscribers_agree_on_order() {
    let world = small_world();
    let (_handle, stop) = StopHandle::new();
    world.start(&stop);
    let subscribers: Vec<_> = (0..3).map(|_| world.events(&stop, 16)).collect();

    let snakes: Vec<_> = (0..3).map(|id| Arc::new(Snake(id))).collect();
    for (row, snake) in (0u8..).zip(&snakes) {
        world.create_object(snake, &loc(&[(0, row)])).unwrap();
    }

    for events in &subscribers {
        let ids: Vec<u32> = (0..3).map(|_| next(events).as_object().unwrap().0).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }
    world.close();
}

#[test]
fn test_move_and_random_placement() {
    let world = small_world();
    let (_handle, stop) = StopHandle::new();
    world.start(&stop);
    let events = world.events(&stop, 64);

    let snake = Arc::new(Snake(1));
    let body = world.create_object_random_rect(&snake, 1, 2).unwrap();
    assert_eq!(body.dot_count(), 2);

    let head = body.dot(0).unwrap();
    let moved = loc(&[(head.x, head.y)]);
    world.update_object(&snake, &body, &moved).unwrap();
    assert_eq!(world.stats().occupied_dots, 1);

    let tank = Arc::new(Snake(2));
    let hull = world
        .create_object_random_by_dots_mask(&tank, &DotsMask::tank())
        .unwrap();
    assert_eq!(hull.dot_count(), DotsMask::tank().dot_count());

    let kinds: Vec<EventKind> = (0..3).map(|_| next(&events).kind()).collect();
    assert_eq!(kinds, vec![EventKind::Created, EventKind::Updated, EventKind::Created]);
    world.close();
}

#[test]
fn test_events_before_start_are_delivered() {
    let world = small_world();
    let events = world.events(&StopSignal::never(), 16);

    let snake = Arc::new(Snake(1));
    world.create_object(&snake, &loc(&[(1, 1)])).unwrap();
    assert!(events.recv_timeout(Duration::from_millis(100)).is_err());

    let (_handle, stop) = StopHandle::new();
    world.start(&stop);
    let created = next(&events);
    assert_eq!(created.kind(), EventKind::Created);
    assert!(Arc::ptr_eq(created.as_object().unwrap(), &snake));
    world.close();
}

#[test]
fn test_store_calls_never_wait_on_an_unstarted_world() {
    let world = small_world();
    let _events = world.events(&StopSignal::never(), 4);

    // Far more events than the ingress queue holds
    let started_at = Instant::now();
    for id in 0..500 {
        let _ = world.get_objects_by_dots(&loc(&[(0, 0)]));
        let _ = world.create_object(&Arc::new(Snake(id)), &Location::default());
    }
    assert!(started_at.elapsed() < Duration::from_secs(2));
}

#[test]
fn test_nothing_published_after_close() {
    let world = small_world();
    let (_handle, stop) = StopHandle::new();
    world.start(&stop);
    let events = world.events(&StopSignal::never(), 4);
    world.close();

    world.create_object(&Arc::new(Snake(1)), &loc(&[(2, 2)])).unwrap();
    assert!(events.recv_timeout(Duration::from_millis(100)).is_err());
    assert_eq!(world.stats().objects, 1);
}

#[test]
fn test_dropped_event_stream_unsubscribes() {
    let world = small_world();
    let (_handle, stop) = StopHandle::new();
    world.start(&stop);

    let events = world.events(&stop, 4);
    assert_eq!(world.stats().subscribers, 1);
    drop(events);

    let deadline = Instant::now() + Duration::from_secs(2);
    while world.stats().subscribers != 0 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(world.stats().subscribers, 0);
    world.close();
}

#[test]
fn test_store_errors_without_subscribers() {
    let world = small_world();
    let err = world.create_object(&Arc::new(Snake(1)), &Location::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(matches!(err, WorldError::Playground(_)));
}

#[test]
fn test_navigate_wraps() {
    let world: World<Snake> = World::new(&WorldConfig::default()).unwrap();
    assert_eq!(world.navigate(Dot::new(0, 0), Direction::West, 1).unwrap(), Dot::new(99, 0));
    assert_eq!(world.navigate(Dot::new(99, 0), Direction::East, 1).unwrap(), Dot::new(0, 0));
}

#[test]
fn test_invalid_config_rejected() {
    let config = WorldConfig {
        height: 0,
        ..WorldConfig::default()
    };
    let err = World::<Snake>::new(&config).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn test_concurrent_movers_never_share_a_dot() {
    let world = Arc::new(small_world());
    let (handle, stop) = StopHandle::new();
    world.start(&stop);
    let events = world.events(&stop, 8);

    let movers: Vec<_> = (0..6)
        .map(|id| {
            let world = Arc::clone(&world);
            thread::spawn(move || {
                let snake = Arc::new(Snake(id));
                let mut body = world.create_object_random_dot(&snake).unwrap();
                let direction = Direction::ALL[id as usize % 4];
                for _ in 0..200 {
                    let head = body.dot(0).unwrap();
                    let target = Location::from(world.navigate(head, direction, 1).unwrap());
                    if world.update_object(&snake, &body, &target).is_ok() {
                        body = target;
                    }
                }
                body
            })
        })
        .collect();
    let bodies: Vec<Location> = movers.into_iter().map(|m| m.join().unwrap()).collect();

    let stats = world.stats();
    assert_eq!(stats.objects, 6);
    assert_eq!(stats.occupied_dots, 6);
    for body in &bodies {
        assert!(world.location_occupied(body));
    }

    // The slow subscriber kept only its newest events and is still attached
    assert!(events.len() <= 8);
    handle.stop();
}
