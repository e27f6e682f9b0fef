//! Route validation tests
//!
//! Progress tracking along a loaded route, the draft editor used by the route
//! creator, and route persistence through the store and its worker.

use std::fs;
use std::thread;
use std::time::Duration;

use drive_sim::simulation::{
    read_routes, JsonRouteStore, MemoryRouteStore, Position, Route, RouteDraftManager,
    RouteProgress, RouteProgressTracker, RouteRequest, RouteRequests, RouteResponse, RouteStore,
    Waypoint, INVALID_DRAFT_MESSAGE,
};

fn straight_route(id: &str, zs: &[f32]) -> Route {
    Route {
        id: id.to_string(),
        name: format!("Route {}", id),
        description: String::new(),
        difficulty: None,
        created: 0,
        updated: 0,
        author: "alice".to_string(),
        length: 0.0,
        waypoints: zs
            .iter()
            .map(|z| Waypoint::standard(Position::new(0.0, 0.0, *z)))
            .collect(),
    }
}

fn at(z: f32) -> Position {
    Position::new(0.0, 1.0, z)
}

/// Wait for the worker to answer `count` requests
fn poll_until(requests: &mut RouteRequests, count: usize) -> Vec<RouteResponse> {
    let mut responses = Vec::new();
    for _ in 0..500 {
        responses.extend(requests.poll());
        if responses.len() >= count {
            break;
        }
        thread::sleep(Duration::from_millis(2));
    }
    responses
}

// ---------------------------------------------------------------------------
// Progress tracking

#[test]
fn test_tracker_starts_idle() {
    let mut tracker = RouteProgressTracker::new();
    assert_eq!(tracker.state(), RouteProgress::Idle);
    assert_eq!(tracker.tick(&at(0.0)), None);
    assert!(!tracker.is_at_final_waypoint());
}

#[test]
fn test_tracker_advances_one_waypoint_per_tick() {
    let mut tracker = RouteProgressTracker::new();
    // All three waypoints are inside the radius of the same point
    tracker.load_route(straight_route("r", &[0.0, 1.0, 2.0]));

    assert_eq!(tracker.tick(&at(1.0)), Some(1));
    assert_eq!(tracker.tick(&at(1.0)), Some(2));
    // The last waypoint is never advanced past
    assert_eq!(tracker.tick(&at(1.0)), None);
    assert_eq!(tracker.current_index(), 2);
    assert!(tracker.is_at_final_waypoint());
}

#[test]
fn test_tracker_progress_is_monotonic() {
    let mut tracker = RouteProgressTracker::new();
    tracker.load_route(straight_route("r", &[0.0, 50.0, 100.0, 150.0]));

    let mut last = 0;
    // Drive out and back again
    let path = (0..=200).chain((0..=200).rev());
    for z in path {
        tracker.tick(&at(z as f32));
        let index = tracker.current_index();
        assert!(index >= last);
        assert!(index <= last + 1);
        last = index;
    }
    assert_eq!(last, 3);
}

#[test]
fn test_tracker_measures_distance() {
    let mut tracker = RouteProgressTracker::new();
    tracker.load_route(straight_route("r", &[100.0, 200.0]));

    tracker.tick(&Position::new(0.0, 0.0, 40.0));
    assert_eq!(
        tracker.state(),
        RouteProgress::Tracking {
            index: 0,
            distance: 60.0
        }
    );
    assert!(!tracker.is_at_final_waypoint());
}

#[test]
fn test_waypoint_radius_overrides_default() {
    let mut route = straight_route("r", &[20.0, 100.0]);
    route.waypoints[0].radius = Some(25.0);
    let mut tracker = RouteProgressTracker::new();
    tracker.load_route(route);

    assert_eq!(tracker.tick(&at(0.0)), Some(1));
}

#[test]
fn test_final_waypoint_needs_a_measurement() {
    let mut tracker = RouteProgressTracker::new();
    tracker.load_route(straight_route("r", &[500.0]));
    assert!(!tracker.is_at_final_waypoint());

    tracker.tick(&at(0.0));
    assert!(!tracker.is_at_final_waypoint());
    tracker.tick(&at(495.0));
    assert!(tracker.is_at_final_waypoint());
}

#[test]
fn test_empty_route_is_a_no_op() {
    let mut tracker = RouteProgressTracker::new();
    tracker.load_route(straight_route("empty", &[]));

    assert_eq!(tracker.tick(&at(0.0)), None);
    assert_eq!(tracker.current_waypoint(), None);
    assert!(!tracker.is_at_final_waypoint());
}

#[test]
fn test_clear_route_is_idempotent() {
    let mut tracker = RouteProgressTracker::new();
    tracker.load_route(straight_route("r", &[0.0, 100.0]));
    tracker.tick(&at(0.0));

    tracker.clear_route();
    assert_eq!(tracker.state(), RouteProgress::Idle);
    assert_eq!(tracker.current_index(), 0);
    tracker.clear_route();
    assert_eq!(tracker.state(), RouteProgress::Idle);
    assert_eq!(tracker.tick(&at(0.0)), None);
}

#[test]
fn test_loading_restarts_progress() {
    let mut tracker = RouteProgressTracker::new();
    tracker.load_route(straight_route("a", &[0.0, 1.0, 2.0]));
    tracker.tick(&at(0.0));
    tracker.tick(&at(0.0));
    assert_eq!(tracker.current_index(), 2);

    tracker.load_route(straight_route("b", &[300.0, 400.0]));
    assert_eq!(tracker.current_index(), 0);
    assert_eq!(tracker.route().map(|r| r.id.as_str()), Some("b"));
}

// ---------------------------------------------------------------------------
// Draft editing

#[test]
fn test_draft_ids_are_unique() {
    let mut draft = RouteDraftManager::new();
    let a = draft.append(Position::ZERO);
    let b = draft.append(Position::ZERO);
    assert_ne!(a, b);
    assert!(draft.remove(&a));
    let c = draft.append(Position::ZERO);
    assert_ne!(a, c);
    assert_ne!(b, c);
}

#[test]
fn test_draft_remove_and_update() {
    let mut draft = RouteDraftManager::new();
    let a = draft.append(Position::new(0.0, 0.0, 0.0));
    let b = draft.append(Position::new(0.0, 0.0, 10.0));

    assert!(draft.select(Some(&b)));
    assert!(draft.update(&b, Position::new(0.0, 0.0, 20.0)));
    assert_eq!(draft.waypoints()[1].position.z, 20.0);
    assert!(!draft.update("missing", Position::ZERO));

    assert!(draft.remove(&b));
    assert_eq!(draft.selected(), None);
    assert!(!draft.remove(&b));
    assert_eq!(draft.len(), 1);
    assert_eq!(draft.waypoints()[0].id, a);
}

#[test]
fn test_draft_reorder() {
    let mut draft = RouteDraftManager::new();
    let ids: Vec<String> = (0..4).map(|i| draft.append(Position::new(0.0, 0.0, i as f32))).collect();
    let order = |d: &RouteDraftManager| d.waypoints().iter().map(|w| w.id.clone()).collect::<Vec<_>>();

    assert!(draft.reorder(0, 3));
    assert_eq!(order(&draft), vec![ids[1].clone(), ids[2].clone(), ids[3].clone(), ids[0].clone()]);

    // Out of range indices change nothing
    assert!(!draft.reorder(0, 4));
    assert!(!draft.reorder(9, 0));
    assert!(!draft.move_up(0));
    assert!(!draft.move_down(3));
    assert!(!draft.move_down(usize::MAX));

    assert!(draft.move_up(3));
    assert!(draft.move_down(0));
    assert_eq!(order(&draft), vec![ids[2].clone(), ids[1].clone(), ids[0].clone(), ids[3].clone()]);
}

#[test]
fn test_draft_selection_rejects_unknown_ids() {
    let mut draft = RouteDraftManager::new();
    let a = draft.append(Position::ZERO);
    assert!(draft.select(Some(&a)));
    assert!(!draft.select(Some("nope")));
    assert_eq!(draft.selected(), Some(a.as_str()));
    assert!(draft.select(None));
    assert_eq!(draft.selected(), None);
}

#[test]
fn test_draft_validity() {
    let mut draft = RouteDraftManager::new();
    assert!(!draft.is_valid());

    draft.append(Position::new(0.0, 0.0, 0.0));
    draft.append(Position::new(3.0, 0.0, 4.0));
    assert!(!draft.is_valid());

    draft.set_name("   ");
    assert!(!draft.is_valid());
    let err = draft.to_route("id", "alice", 1).unwrap_err();
    assert_eq!(err.to_string(), INVALID_DRAFT_MESSAGE);

    draft.set_name("  Commute ");
    draft.set_description("to work");
    assert!(draft.is_valid());
    assert_eq!(draft.length(), 5.0);

    let route = draft.to_route("id", "alice", 42).expect("valid draft");
    assert_eq!(route.name, "Commute");
    assert_eq!(route.description, "to work");
    assert_eq!(route.author, "alice");
    assert_eq!(route.created, 42);
    assert_eq!(route.updated, 42);
    assert_eq!(route.length, 5.0);
    assert_eq!(route.waypoints.len(), 2);
    assert_eq!(route.waypoints[1].position(), Position::new(3.0, 0.0, 4.0));

    // Building a route leaves the draft intact
    assert_eq!(draft.len(), 2);

    draft.clear();
    assert!(draft.is_empty());
    assert_eq!(draft.name(), "");
    assert!(!draft.is_valid());
}

// ---------------------------------------------------------------------------
// Persistence

#[test]
fn test_memory_store_crud_and_auth() {
    let mut store = MemoryRouteStore::new();
    store.upsert(straight_route("a", &[0.0, 10.0])).unwrap();
    store.upsert(straight_route("b", &[0.0, 20.0])).unwrap();
    assert_eq!(store.len(), 2);

    let fetched = store.fetch("a").unwrap().expect("stored");
    assert_eq!(fetched.waypoints.len(), 2);
    assert_eq!(store.fetch("zzz").unwrap(), None);

    let err = store.delete("a", "mallory").unwrap_err();
    assert_eq!(err.to_string(), "Only the author can delete this route");
    assert_eq!(store.len(), 2);

    store.delete("a", "alice").unwrap();
    assert_eq!(store.fetch("a").unwrap(), None);
    assert_eq!(store.len(), 1);
}

#[test]
fn test_store_filters() {
    let mut store = MemoryRouteStore::new();
    let mut easy = straight_route("easy", &[0.0]);
    easy.difficulty = Some("easy".into());
    easy.updated = 5;
    let mut hard = straight_route("hard", &[0.0]);
    hard.difficulty = Some("hard".into());
    hard.author = "bob".into();
    hard.updated = 9;
    store.upsert(easy).unwrap();
    store.upsert(hard).unwrap();

    let listed: Vec<String> = store.list_summaries().unwrap().into_iter().map(|s| s.id).collect();
    assert_eq!(listed, vec!["hard", "easy"]);

    let by_bob = store.by_author("bob").unwrap();
    assert_eq!(by_bob.len(), 1);
    assert_eq!(by_bob[0].id, "hard");

    let easy_routes = store.by_difficulty("easy").unwrap();
    assert_eq!(easy_routes.len(), 1);
    assert_eq!(easy_routes[0].waypoint_count, 1);
}

#[test]
fn test_json_store_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("routes.json");

    let mut store = JsonRouteStore::open(&path).unwrap();
    assert!(store.list_summaries().unwrap().is_empty());
    store.upsert(straight_route("a", &[0.0, 10.0])).unwrap();
    store.upsert(straight_route("b", &[0.0, 20.0])).unwrap();
    store.delete("b", "alice").unwrap();

    let on_disk = read_routes(&path).unwrap();
    assert_eq!(on_disk.len(), 1);
    assert_eq!(on_disk[0].id, "a");

    let reopened = JsonRouteStore::open(&path).unwrap();
    assert_eq!(reopened.fetch("a").unwrap(), Some(straight_route("a", &[0.0, 10.0])));
}

#[test]
fn test_json_store_uses_wire_names() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("routes.json");
    let mut store = JsonRouteStore::open(&path).unwrap();
    store.upsert(straight_route("a", &[0.0])).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"waypointType\": \"standard\""));
    assert!(text.contains("\"coordinates\""));
    assert!(!text.contains("labelText"));
}

#[test]
fn test_json_store_keeps_routes_when_write_fails() {
    let dir = tempfile::tempdir().unwrap();
    let folder = dir.path().join("store");
    fs::create_dir(&folder).unwrap();
    let path = folder.join("routes.json");

    let mut store = JsonRouteStore::open(&path).unwrap();
    store.upsert(straight_route("x", &[0.0, 10.0])).unwrap();

    // Every later write fails
    fs::remove_dir_all(&folder).unwrap();

    let err = store.upsert(straight_route("y", &[0.0, 5.0])).unwrap_err();
    assert!(err.to_string().starts_with("Failed to write"), "{:#}", err);
    let ids: Vec<String> = store.list_summaries().unwrap().into_iter().map(|s| s.id).collect();
    assert_eq!(ids, vec!["x".to_string()]);

    // A failed overwrite keeps the old version
    assert!(store.upsert(straight_route("x", &[0.0, 99.0])).is_err());
    assert_eq!(store.fetch("x").unwrap(), Some(straight_route("x", &[0.0, 10.0])));

    assert!(store.delete("x", "alice").is_err());
    assert!(store.fetch("x").unwrap().is_some());
}

#[test]
fn test_json_store_rejects_garbage() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("routes.json");
    fs::write(&path, "not json").unwrap();
    assert!(JsonRouteStore::open(&path).is_err());
}

#[test]
fn test_requests_run_on_worker() {
    let mut requests = RouteRequests::spawn(MemoryRouteStore::new());
    requests
        .submit(RouteRequest::Save {
            route: straight_route("a", &[0.0, 10.0]),
        })
        .unwrap();
    requests.submit(RouteRequest::Fetch { id: "a".into() }).unwrap();
    requests.submit(RouteRequest::List).unwrap();

    let responses = poll_until(&mut requests, 3);
    assert_eq!(responses.len(), 3);
    assert_eq!(responses[0], RouteResponse::Saved { id: "a".into() });
    match &responses[1] {
        RouteResponse::Fetched(Some(route)) => assert_eq!(route.id, "a"),
        other => panic!("Unexpected response {:?}", other),
    }
    match &responses[2] {
        RouteResponse::Listed(summaries) => assert_eq!(summaries.len(), 1),
        other => panic!("Unexpected response {:?}", other),
    }
    assert_eq!(requests.in_flight(), 0);
}

#[test]
fn test_request_failures_are_reported() {
    let mut requests = RouteRequests::spawn(MemoryRouteStore::new());
    requests
        .submit(RouteRequest::Save {
            route: straight_route("a", &[0.0]),
        })
        .unwrap();
    requests
        .submit(RouteRequest::Delete {
            id: "a".into(),
            caller: "mallory".into(),
        })
        .unwrap();
    requests
        .submit(RouteRequest::Delete {
            id: "missing".into(),
            caller: "alice".into(),
        })
        .unwrap();

    let responses = poll_until(&mut requests, 3);
    assert_eq!(
        responses[1],
        RouteResponse::Failed {
            message: "Only the author can delete this route".into()
        }
    );
    assert_eq!(
        responses[2],
        RouteResponse::Failed {
            message: "Route missing not found".into()
        }
    );
}

#[test]
fn test_poll_does_not_block() {
    let mut requests = RouteRequests::spawn(MemoryRouteStore::new());
    assert!(requests.poll().is_empty());
    assert_eq!(requests.in_flight(), 0);
}
