//! Sarathi demo runner
//!
//! Pilots a simulated robot through a small room with a doorway, or, with
//! `--tap-demo`, runs a wait/tap/respond loop fed by simulated cube taps.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info, warn};

use sarathi::config::SarathiConfig;
use sarathi::core::{Point2D, Pose2D};
use sarathi::error::{Result, SarathiError};
use sarathi::fsm::{Event, EventKind, Idle, Print, StateMachine, Transition, Trigger};
use sarathi::pilot::{PilotContext, PilotToPose};
use sarathi::shapes::Shape;
use sarathi::sim::SimRobot;
use sarathi::world::{Doorway, ObstacleCatalog, WorldMap};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (defaults to sarathi.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Target X in mm
    #[arg(long, default_value = "1500.0")]
    target_x: f32,

    /// Target Y in mm
    #[arg(long, default_value = "200.0")]
    target_y: f32,

    /// Target heading in radians
    #[arg(long, default_value = "0.0")]
    target_heading: f32,

    /// Give up after this many seconds
    #[arg(long, default_value = "60")]
    timeout_secs: u64,

    /// Run the tap demo instead of the pilot
    #[arg(long)]
    tap_demo: bool,
}

fn load_config(path: Option<&Path>) -> Result<SarathiConfig> {
    match path {
        Some(path) => SarathiConfig::load(path),
        None if Path::new("sarathi.toml").exists() => SarathiConfig::load(Path::new("sarathi.toml")),
        None => Ok(SarathiConfig::default()),
    }
}

/// Two wall segments with a doorway between them, and a crate.
fn demo_world() -> WorldMap {
    let mut map = WorldMap::new();
    map.add_obstacle("wall_south", Shape::rectangle(Point2D::new(750.0, -400.0), (20.0, 600.0), 0.0));
    map.add_obstacle("wall_north", Shape::rectangle(Point2D::new(750.0, 400.0), (20.0, 600.0), 0.0));
    map.add_doorway(Doorway::new("door", Point2D::new(750.0, 0.0), 0.0, 100.0));
    map.add_obstacle("crate", Shape::rectangle(Point2D::new(350.0, 0.0), (120.0, 120.0), 0.3));
    map
}

fn run_pilot(args: &Args, config: &SarathiConfig) -> Result<()> {
    let world = demo_world();
    let robot = Arc::new(
        SimRobot::new(Pose2D::identity(), config.motion.sim_speed).with_doorways(world.doorways()),
    );
    let ctx = Arc::new(PilotContext::new(robot, Arc::new(world), config));

    let mut sm = StateMachine::new("main", Idle);
    let root = sm.root();
    let target = Pose2D::new(args.target_x, args.target_y, args.target_heading);
    let pilot = PilotToPose::new(Some(target)).install(&mut sm, root, "pilot", ctx)?;
    let arrived = sm.add_child(root, "arrived", Print::new("arrived at target"))?;
    let failed = sm.add_child(root, "failed", Print::new("pilot failed"))?;
    sm.add_transition(Transition::new("pilot=C=>arrived", Trigger::Completion).from(pilot.node).to(arrived))?;
    sm.add_transition(Transition::new("pilot=F=>failed", Trigger::Failure).from(pilot.node).to(failed))?;
    sm.set_event_observer(|event| {
        if let EventKind::PilotStatus { kind, detail } = &event.kind {
            warn!("pilot status {}: {}", kind, detail);
        }
    });

    sm.start(Event::external(EventKind::Completion))?;
    let finished = sm.run_until(
        |sm| sm.is_running(arrived) || sm.is_running(failed),
        Duration::from_secs(args.timeout_secs),
    )?;
    let reached = sm.is_running(arrived);
    sm.stop();

    match (finished, reached) {
        (true, true) => Ok(()),
        (true, false) => Err(SarathiError::Execution("pilot failed".to_string())),
        (false, _) => Err(SarathiError::Execution(format!(
            "no result within {}s",
            args.timeout_secs
        ))),
    }
}

fn run_tap_demo(args: &Args) -> Result<()> {
    let mut sm = StateMachine::new("tapspeak", Idle);
    let root = sm.root();
    let wait = sm.add_child(root, "wait", Idle)?;
    let speak = sm.add_child(root, "speak", Print::new("cube tapped"))?;
    sm.add_transition(Transition::new("wait=Tap=>speak", Trigger::Tap(None)).from(wait).to(speak))?;
    sm.add_transition(Transition::new("speak=C=>wait", Trigger::Completion).from(speak).to(wait))?;
    sm.start(Event::external(EventKind::Completion))?;

    let sender = sm.event_sender();
    thread::Builder::new().name("taps".into()).spawn(move || {
        for source in [1, 2, 3, 1] {
            thread::sleep(Duration::from_millis(300));
            if sender.send(Event::tap(source)).is_err() {
                return;
            }
        }
    })?;

    let handled = sm.run_for(Duration::from_secs(args.timeout_secs.min(2)))?;
    info!("tap demo dispatched {} events", handled);
    sm.stop();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.filter)),
        )
        .init();

    info!("Sarathi v{}", env!("CARGO_PKG_VERSION"));

    let result = if args.tap_demo {
        run_tap_demo(&args)
    } else {
        run_pilot(&args, &config)
    };
    if let Err(e) = &result {
        error!("{}", e);
    }
    result
}
