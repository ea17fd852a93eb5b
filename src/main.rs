//! Headless steering demo
//!
//! A pursuer chases an evader across a walled grid while the evader wanders
//! inside a tether, a herder tries to bump into it and a scout heads for a
//! fixed point. Pass a `.ron` or `.json` steering profile as the first
//! argument to override the defaults. Use `RUST_LOG=info` (or `debug`) to
//! see the run.

use steering::ai::DEFAULT_TRACKING_INTERVAL;
use steering::hecs::Entity;
use steering::prelude::*;

const TICK: f32 = 1.0 / 30.0;
const TICKS: u64 = 600;
const CONTACT_DISTANCE: f32 = 0.6;

/// One simulated vehicle and the behaviors steering it
struct Agent {
    entity: Entity,
    state: VehicleState,
    behaviors: Vec<Box<dyn Steering>>,
    collision: Option<CollisionSeek>,
}

impl Agent {
    fn spawn(world: &mut World, name: &str, state: VehicleState) -> Self {
        let entity = world.spawn((Name::new(name), Transform::from_position(state.position)));
        Self {
            entity,
            state,
            behaviors: Vec::new(),
            collision: None,
        }
    }

    fn with(mut self, behavior: impl Steering + 'static) -> Self {
        self.behaviors.push(Box::new(behavior));
        self
    }

    /// Sum this tick's forces, post-processing behaviors last
    fn steer(&mut self, world: &World, surface: &GridSurface, events: &mut EventQueue) -> Vec3 {
        let mut ctx = SteeringContext::new(&self.state, world, events).with_surface(surface);
        let mut total = Vec3::ZERO;

        if let Some(collision) = self.collision.as_mut() {
            total += collision.evaluate(&mut ctx).force;
        }
        for post_process in [false, true] {
            for behavior in &mut self.behaviors {
                if behavior.is_post_process() != post_process {
                    continue;
                }
                let output = behavior.evaluate(&mut ctx);
                if !output.is_zero() {
                    log::trace!("{} -> {}", output.behavior, output.force);
                }
                total += output.force;
            }
        }
        total
    }

    /// Write the integrated vehicle back to the world so trackers see it
    fn sync(&self, world: &mut World) {
        if let Ok(mut transform) = world.get_mut::<Transform>(self.entity) {
            transform.position = self.state.position;
            transform.rotation = Quat::from_rotation_arc(Vec3::NEG_Z, self.state.forward);
        }
    }
}

fn build_surface() -> GridSurface {
    let mut surface = GridSurface::new(40, 40, 1.0);
    surface.block((10, 10), (12, 30));
    surface.block((28, 10), (30, 30));
    surface
}

fn load_profile() -> Result<SteeringProfile, ConfigError> {
    match std::env::args().nth(1) {
        Some(path) => {
            let profile = SteeringProfile::load(&path)?;
            log::info!("Loaded steering profile '{}' from {path}", profile.name);
            Ok(profile)
        }
        None => Ok(SteeringProfile::default()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let profile = load_profile()?;
    let surface = build_surface();
    let scheduler = TickScheduler::new();
    let mut world = World::new();
    let mut time = Time::new();
    let mut events = EventQueue::new();

    let vehicle = profile.vehicle;
    let mut evader = Agent::spawn(
        &mut world,
        "evader",
        VehicleState {
            position: Vec3::new(20.0, 0.0, 20.0),
            ..vehicle
        },
    );
    let mut pursuer = Agent::spawn(
        &mut world,
        "pursuer",
        VehicleState {
            position: Vec3::new(5.0, 0.0, 5.0),
            ..vehicle
        },
    );
    let mut herder = Agent::spawn(
        &mut world,
        "herder",
        VehicleState {
            position: Vec3::new(35.0, 0.0, 5.0),
            max_speed: vehicle.max_speed * 0.6,
            ..vehicle
        },
    );
    let scout = Agent::spawn(
        &mut world,
        "scout",
        VehicleState {
            position: Vec3::new(2.0, 0.0, 38.0),
            ..vehicle
        },
    );

    let mut evasion = Evasion::from_config(&scheduler, &profile.evasion);
    evasion.set_menace(Some(pursuer.entity), &world);
    let mut tether = Tether::from_config(&profile.containment);
    if profile.containment.center == Vec3::ZERO {
        tether.set_center(Vec3::new(20.0, 0.0, 20.0));
    }
    evader = evader
        .with(evasion)
        .with(Wander::from_config(&profile.wander))
        .with(tether)
        .with(NavmeshWhiskers::from_config(profile.whiskers));

    let mut pursuit = Pursuit::from_config(&scheduler, &profile.pursuit);
    pursuit.set_quarry(Some(evader.entity), &world);
    pursuer = pursuer
        .with(pursuit)
        .with(NavmeshWhiskers::from_config(profile.whiskers));

    herder.collision =
        Some(CollisionSeek::from_config(&profile.collision).with_target(evader.entity));
    herder = herder.with(NavmeshWhiskers::from_config(profile.whiskers));

    let point = if profile.point.target == Vec3::ZERO {
        SteerForPoint::new(Vec3::new(38.0, 0.0, 38.0))
    } else {
        SteerForPoint::from_config(&profile.point)
    };
    let scout = scout
        .with(point)
        .with(NavmeshWhiskers::from_config(profile.whiskers));

    let mut agents = [evader, pursuer, herder, scout];

    // Independent observer of the evader, sampled on its own cadence
    let interval = if profile.tracker.interval > 0.0 {
        profile.tracker.interval
    } else {
        DEFAULT_TRACKING_INTERVAL
    };
    let mut observer =
        KinematicTracker::tracking(&scheduler, Some(agents[0].entity), interval, &world);
    observer.set_moving_tolerance(profile.tracker.moving_tolerance);

    log::info!(
        "Running {TICKS} ticks with {} scheduled trackers",
        scheduler.len()
    );

    for _ in 0..TICKS {
        time.advance(TICK);
        events.swap();
        for event in events.drain() {
            log::info!("t={:.2}s {event:?}", time.elapsed());
        }

        scheduler.run(time.elapsed(), &world);

        for agent in &mut agents {
            let force = agent.steer(&world, &surface, &mut events);
            agent.state.integrate(force, time.delta_seconds());
            agent.sync(&mut world);
        }

        let (evader, position) = (agents[0].entity, agents[0].state.position);
        let chaser = &mut agents[2];
        if chaser.state.position.distance(position) < CONTACT_DISTANCE {
            if let Some(collision) = chaser.collision.as_mut() {
                collision.register_contact(evader, &world, &world, &mut events);
            }
        }

        if time.ticks() % 60 == 0 {
            log::info!(
                "t={:.1}s evader {:.2} speed {:.2} (tracked {:.2}, moving: {})",
                time.elapsed(),
                agents[0].state.position,
                agents[0].state.speed(),
                observer.velocity_smoothed().length(),
                observer.is_moving()
            );
        }
    }

    for agent in &agents {
        let name = world
            .get::<Name>(agent.entity)
            .map(|name| name.0.clone())
            .unwrap_or_default();
        log::info!("{name} finished at {:.2}", agent.state.position);
    }

    Ok(())
}
