use std::fs;
use std::process::{Command, Output};

fn run_headless(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_drive_sim"))
        .args(args)
        .env("RUST_LOG", "warn,drive_sim=info")
        .output()
        .expect("Failed to execute simulation")
}

/// Test that the simulation runs in headless mode without crashing
#[test]
fn test_headless_simulation_runs() {
    let output = run_headless(&["--ticks", "100", "--summary-every", "0"]);

    assert!(
        output.status.success(),
        "Simulation failed to run in headless mode. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("=== Final State ==="),
        "Simulation did not complete properly. stdout: {}",
        stdout
    );
    assert!(stdout.contains("Corridor Map"), "Missing map output");
}

/// Test that the summary reports scenery and traffic
#[test]
fn test_summary_statistics_printed() {
    let output = run_headless(&["--ticks", "40", "--summary-every", "20"]);
    assert!(output.status.success(), "Simulation failed to run");

    let stdout = String::from_utf8_lossy(&output.stdout);
    for needle in ["--- Scenery ---", "--- Traffic ---", "Roads:", "Pole pairs:", "After tick 20"] {
        assert!(stdout.contains(needle), "Missing '{}' in output", needle);
    }

    let cars = stdout
        .lines()
        .skip_while(|line| !line.contains("=== Final State ==="))
        .filter(|line| line.trim_start().starts_with("Car "))
        .count();
    assert_eq!(cars, 12, "Traffic pool should always hold 12 cars");
}

/// Test that the truck actually moves under the scripted throttle
#[test]
fn test_truck_drives_forward() {
    let output = run_headless(&["--ticks", "100", "--summary-every", "0"]);
    assert!(output.status.success(), "Simulation failed to run");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let agent_line = stdout
        .lines()
        .skip_while(|line| !line.contains("=== Final State ==="))
        .find(|line| line.starts_with("Agent:"))
        .expect("Could not find 'Agent:' line");

    // Format: "Agent: pos=(x, y, z) heading=h speed=s"
    let speed: f32 = agent_line
        .split("speed=")
        .nth(1)
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or_else(|| panic!("Could not parse speed from line: {}", agent_line));
    assert!(speed > 0.0, "Truck should be moving, got speed {}", speed);
}

#[test]
fn test_walk_and_route_creator_modes_run() {
    for mode in ["walk", "route-creator"] {
        let output = run_headless(&["--ticks", "120", "--summary-every", "0", "--mode", mode]);
        assert!(
            output.status.success(),
            "Mode {} failed. stderr: {}",
            mode,
            String::from_utf8_lossy(&output.stderr)
        );
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains(&format!("Mode: {}", mode)), "Mode {} not reported", mode);
    }
}

#[test]
fn test_route_creator_builds_a_draft() {
    let output = run_headless(&["--ticks", "150", "--summary-every", "0", "--mode", "route-creator"]);
    assert!(output.status.success(), "Simulation failed to run");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--- Draft ---"), "No draft reported");
    assert!(stdout.contains("with 3 waypoints"), "Expected a waypoint every 50 ticks");
}

#[test]
fn test_route_creator_saves_draft_to_store() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("routes.json");
    let store = path.to_str().expect("utf-8 path");

    let output = run_headless(&[
        "--ticks",
        "150",
        "--summary-every",
        "0",
        "--mode",
        "route-creator",
        "--store",
        store,
    ]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(String::from_utf8_lossy(&output.stdout).contains("Saved route route-"));

    let routes = drive_sim::simulation::read_routes(&path).expect("store written");
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].author, "headless");
    assert_eq!(routes[0].name, "Headless route");
    assert_eq!(routes[0].waypoints.len(), 3);

    // A second run adds to the same file
    let again = run_headless(&["--ticks", "100", "--summary-every", "0", "--mode", "route-creator", "--store", store]);
    assert!(again.status.success());
    assert_eq!(drive_sim::simulation::read_routes(&path).expect("store written").len(), 2);
}

#[test]
fn test_route_file_is_tracked() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("route.json");
    fs::write(
        &path,
        r#"{
            "id": "r1",
            "name": "Straight",
            "description": "",
            "created": 0,
            "updated": 0,
            "author": "tester",
            "length": 200.0,
            "waypoints": [
                {"coordinates": {"x": 0, "y": 0, "z": 0}, "waypointType": "start"},
                {"coordinates": {"x": 0, "y": 0, "z": 200}, "waypointType": "finish"}
            ]
        }"#,
    )
    .expect("write route");

    let output = run_headless(&[
        "--ticks",
        "10",
        "--summary-every",
        "0",
        "--route",
        path.to_str().expect("utf-8 path"),
    ]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--- Route ---"), "Route not reported");
    assert!(stdout.contains("Straight: waypoint 2/2"), "stdout: {}", stdout);
}

#[test]
fn test_route_store_lookup_by_id() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("routes.json");
    fs::write(
        &path,
        r#"[{
            "id": "loop",
            "name": "Loop",
            "description": "short",
            "difficulty": "easy",
            "created": 1,
            "updated": 2,
            "author": "tester",
            "length": 50.0,
            "waypoints": [
                {"coordinates": {"x": 0, "y": 0, "z": 30}, "waypointType": "start", "radius": 5},
                {"coordinates": {"x": 0, "y": 0, "z": 80}, "waypointType": "finish"}
            ]
        }]"#,
    )
    .expect("write routes");
    let path = path.to_str().expect("utf-8 path");

    let output = run_headless(&["--ticks", "5", "--summary-every", "0", "--route", path, "--route-id", "loop"]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(String::from_utf8_lossy(&output.stdout).contains("Loop: waypoint 1/2"));

    let missing = run_headless(&["--ticks", "5", "--route", path, "--route-id", "nope"]);
    assert!(!missing.status.success(), "Unknown route id should fail");
    assert!(String::from_utf8_lossy(&missing.stderr).contains("not found"));
}

#[test]
fn test_invalid_route_file_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ not json").expect("write");

    let output = run_headless(&["--ticks", "5", "--route", path.to_str().expect("utf-8 path")]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to load route"));
}
