//! Landing controller driven end to end with the MAVLink status notifier

use mavlink::common::{MavSeverity, STATUSTEXT_DATA};
use plane_landing::communication::mavlink::{
    take_pending_statustext_messages, GlobalStatusText, StatusNotifier,
};
use plane_landing::plane::{LandingController, LandingTick};
use plane_landing_core::landing::{AbortContext, LandingType, RestartPoint, SlopeStage};
use plane_landing_core::mission::{
    MissionCommand, MissionStorage, MissionStore, MAV_CMD_DO_LAND_START, MAV_CMD_NAV_LAND,
    MAV_CMD_NAV_WAYPOINT,
};
use plane_landing_core::navigation::geo::offset_position;
use plane_landing_core::navigation::{Location, MockNavController, NavCommand, VehicleState};
use plane_landing_core::parameters::{register_all, ParamValue, ParameterStore};
use plane_landing_core::traits::MockClock;
use serial_test::serial;

const LAND: Location = Location::new(-353632621, 1491652374, 58400);
const LEG_LENGTH: f32 = 1000.0;
const GROUNDSPEED: f32 = 20.0;

fn store(landing_type: i32) -> ParameterStore {
    let mut store = ParameterStore::new();
    register_all(&mut store).unwrap();
    store.set("LAND_TYPE", ParamValue::Int(landing_type)).unwrap();
    store
}

fn prev_wp() -> Location {
    offset_position(&LAND, -LEG_LENGTH, 0.0).with_alt(LAND.alt + 4000)
}

fn mission() -> MissionStorage {
    let mut m = MissionStorage::new();
    m.add_command(MissionCommand::new(MAV_CMD_NAV_WAYPOINT, LAND)).unwrap();
    m.add_command(MissionCommand::new(
        MAV_CMD_DO_LAND_START,
        offset_position(&LAND, -1200.0, 0.0),
    ))
    .unwrap();
    m.add_command(MissionCommand::new(MAV_CMD_NAV_WAYPOINT, prev_wp())).unwrap();
    m.add_command(MissionCommand::new(MAV_CMD_NAV_LAND, LAND)).unwrap();
    m.start();
    assert!(m.set_current_cmd(3));
    m
}

fn text_of(msg: &STATUSTEXT_DATA) -> String {
    let end = msg.text.iter().position(|&b| b == 0).unwrap_or(msg.text.len());
    String::from_utf8_lossy(&msg.text[..end]).into_owned()
}

fn find<'a>(pending: &'a [STATUSTEXT_DATA], needle: &str) -> Option<&'a STATUSTEXT_DATA> {
    pending.iter().find(|msg| text_of(msg).contains(needle))
}

fn tick_at(along: f32, alt_cm: i32) -> LandingTick {
    LandingTick {
        prev_wp: prev_wp(),
        next_wp: LAND,
        state: VehicleState {
            location: offset_position(&LAND, along - LEG_LENGTH, 0.0).with_alt(alt_cm),
            groundspeed: GROUNDSPEED,
            airspeed: Some(GROUNDSPEED),
            ..Default::default()
        },
        height: (alt_cm - LAND.alt) as f32 * 0.01,
        sink_rate: 0.9,
        wp_proportion: along / LEG_LENGTH,
        is_armed: true,
        is_flying: true,
        rangefinder_in_range: false,
    }
}

#[test]
fn test_glide_slope_landing_reports_to_gcs() {
    let mut c = LandingController::new(MockClock::with_initial(5_000), StatusNotifier::new(), &store(0));
    let mut nav = MockNavController::new();
    let mut m = mission();
    c.begin(
        &MissionCommand::new(MAV_CMD_NAV_LAND, LAND),
        40.0,
        &VehicleState::default(),
        &mut nav,
        &mut m,
    );

    let mut along = 0.0;
    let mut alt_cm = prev_wp().alt;
    for _ in 0..1_000 {
        c.clock().advance(100);
        along += GROUNDSPEED * 0.1;
        let tick = tick_at(along, alt_cm);
        if let Some(target) = c.setup_glide_slope(&prev_wp(), &LAND, &tick.state, &mut nav, &mut m) {
            alt_cm = target.target_alt_cm;
        }
        assert!(!c.update(&tick_at(along, alt_cm), &mut nav, &mut m));
        if c.dispatcher().is_flaring() {
            break;
        }
    }
    assert_eq!(c.dispatcher().glide_slope().map(|s| s.stage()), Some(SlopeStage::Final));
    assert!(c.is_throttle_suppressed());
    assert!(c.is_complete());
    assert_eq!(c.target_airspeed_cm(&VehicleState::default()), 1200);

    let pending = c.gcs_mut().take_pending_statustext();
    let start = find(&pending, "Landing approach start at 40m").unwrap();
    assert_eq!(start.severity, MavSeverity::MAV_SEVERITY_INFO);
    assert_eq!(start.id, 0);
    assert!(find(&pending, "Landing glide slope").is_some());
    let flare = find(&pending, "Flare ").unwrap();
    assert_eq!(flare.severity, MavSeverity::MAV_SEVERITY_INFO);
    assert!(c.gcs().is_empty());
}

#[test]
fn test_invalid_type_completes_with_critical_text() {
    let mut c = LandingController::new(MockClock::new(), StatusNotifier::new(), &store(7));
    let mut nav = MockNavController::new();
    let mut m = mission();
    c.begin(
        &MissionCommand::new(MAV_CMD_NAV_LAND, LAND),
        40.0,
        &VehicleState::default(),
        &mut nav,
        &mut m,
    );
    assert!(c.update(&tick_at(100.0, LAND.alt + 3000), &mut nav, &mut m));

    let pending = c.gcs_mut().take_pending_statustext();
    assert_eq!(pending.len(), 1);
    assert_eq!(text_of(&pending[0]), "Landing configuration error, invalid LAND_TYPE");
    assert_eq!(pending[0].severity, MavSeverity::MAV_SEVERITY_CRITICAL);
    assert_eq!(c.target_airspeed_cm(&VehicleState::default()), 1200);
}

#[test]
fn test_deepstall_begin_heads_for_approach_target() {
    let mut c = LandingController::new(MockClock::new(), StatusNotifier::new(), &store(1));
    assert_eq!(c.dispatcher().landing_type(), Ok(LandingType::Deepstall));
    let mut nav = MockNavController::new();
    let mut m = mission();
    let cmd = MissionCommand::new(MAV_CMD_NAV_LAND, LAND).with_param1(50.0);
    c.begin(&cmd, 80.0, &VehicleState::default(), &mut nav, &mut m);

    let mut tick = tick_at(0.0, LAND.alt + 8000);
    tick.state.location = offset_position(&LAND, -2000.0, 0.0).with_alt(LAND.alt + 8000);
    assert!(!c.update(&tick, &mut nav, &mut m));
    match nav.last_command {
        NavCommand::Waypoint { prev, .. } => assert_eq!(prev, tick.state.location),
        other => panic!("unexpected nav command {:?}", other),
    }
    assert!(c.navigation_target().is_some());
    assert!(!c.is_throttle_suppressed());
    assert_eq!(c.rudder_command(), 0.0);

    let pending = c.gcs_mut().take_pending_statustext();
    let msg = find(&pending, "Deepstall: landing, approach height 50m").unwrap();
    assert_eq!(msg.chunk_seq, 0);
    assert_eq!(msg.severity, MavSeverity::MAV_SEVERITY_INFO);
}

#[test]
fn test_go_around_climbs_out_and_restarts() {
    let mut c = LandingController::new(MockClock::new(), StatusNotifier::new(), &store(0));
    let mut nav = MockNavController::new();
    let mut m = mission();
    c.begin(
        &MissionCommand::new(MAV_CMD_NAV_LAND, LAND),
        40.0,
        &VehicleState::default(),
        &mut nav,
        &mut m,
    );
    assert!(c.request_go_around());
    assert!(c.dispatcher().commanded_go_around());

    let current = offset_position(&LAND, -300.0, 0.0).with_alt(LAND.alt + 5000);
    let status = c.abort_climb(
        &AbortContext {
            prev_wp: prev_wp(),
            next_wp: LAND,
            current,
            relative_alt_cm: 5000,
            takeoff_alt_rel_cm: 3000,
        },
        &mut nav,
        &mut m,
    );
    assert_eq!(status.next_wp, Some(current));
    assert_eq!(status.restart, Some(Ok(RestartPoint::LandStart { index: 1 })));
    assert_eq!(m.current_nav_index(), 2);

    let pending = c.gcs_mut().take_pending_statustext();
    let restarted = find(&pending, "Restarted landing via DO_LAND_START: 1").unwrap();
    assert_eq!(restarted.severity, MavSeverity::MAV_SEVERITY_NOTICE);

    c.finish();
    assert!(!c.dispatcher().commanded_go_around());
}

#[test]
#[serial]
fn test_global_sink_collects_landing_text() {
    let _ = take_pending_statustext_messages();
    let mut c = LandingController::new(MockClock::new(), GlobalStatusText, &store(0));
    let mut nav = MockNavController::new();
    let mut m = mission();
    c.begin(
        &MissionCommand::new(MAV_CMD_NAV_LAND, LAND),
        25.0,
        &VehicleState::default(),
        &mut nav,
        &mut m,
    );

    let pending = take_pending_statustext_messages();
    assert!(find(&pending, "Landing approach start at 25m").is_some());
    assert!(take_pending_statustext_messages().is_empty());
}
