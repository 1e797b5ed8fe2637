//! Pick engine demo driver
//!
//! Builds a small collider scene, registers one pick of each kind and runs a
//! fixed number of frames while a second thread polls cached results.
//!
//! Usage: `pick_demo [config.toml|config.ron]`

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use pick_engine::foundation::logging;
use pick_engine::foundation::math::{vectors, Pose, Vec3};
use pick_engine::input::{PointerTracker, Viewport};
use pick_engine::physics::{BoundingSphere, Collider, ColliderWorld};
use pick_engine::picking::{
    Hand, PickCollaborators, PickError, PickFilter, PickId, PickManager, PickProperties,
    RayPickProperties, StaticControllers, StaticSkeleton, StylusPickProperties, TargetCategory,
    TargetId, AVATAR_JOINT, HEAD_JOINT, MOUSE_JOINT,
};
use pick_engine::config::{Config, ConfigError, PickManagerConfig};

const FRAME_COUNT: u32 = 120;
const FRAME_TIME: Duration = Duration::from_millis(4);
const POLL_INTERVAL: Duration = Duration::from_millis(10);

const AVATAR_VOLUME: &str = r#"
type = "collision"
enabled = true
filter = 8
position = [0.0, 1.5, -2.0]
orientation = [0.0, 0.0, 0.0, 1.0]

[shape]
shapeType = "sphere"
dimensions = [1.0, 1.0, 1.0]
"#;

/// Demo failures
#[derive(thiserror::Error, Debug)]
enum DemoError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Pick error: {0}")]
    Pick(#[from] PickError),

    #[error("Result reader thread panicked")]
    Reader,
}

fn load_config() -> Result<PickManagerConfig, DemoError> {
    let config = match std::env::args().nth(1) {
        Some(path) => PickManagerConfig::load_from_file(&path)?,
        None => PickManagerConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn build_world() -> ColliderWorld {
    let world = ColliderWorld::new();
    world.insert(Collider::sphere(
        TargetId(1),
        TargetCategory::DomainEntity,
        BoundingSphere::new(Vec3::new(0.0, -5.0, 0.0), 1.0),
    ));
    world.insert(Collider::sphere(
        TargetId(2),
        TargetCategory::LocalEntity,
        BoundingSphere::new(Vec3::new(0.0, 1.7, -4.0), 0.5),
    ));
    world.insert(Collider::sphere(
        TargetId(3),
        TargetCategory::Avatar,
        BoundingSphere::new(Vec3::new(0.3, 1.5, -2.2), 0.4),
    ));
    world.insert(
        Collider::sphere(
            TargetId(4),
            TargetCategory::DomainEntity,
            BoundingSphere::new(Vec3::new(0.3, 1.0, -0.6), 0.2),
        )
        .invisible(),
    );
    world
}

fn register_picks(manager: &PickManager) -> Result<Vec<(&'static str, PickId)>, DemoError> {
    let mut picks = Vec::new();

    picks.push((
        "floor ray",
        manager.try_add_pick(RayPickProperties {
            enabled: true,
            filter: PickFilter::ENTITIES,
            max_distance: 10.0,
            position: Some(Vec3::zeros()),
            direction: vectors::down(),
            ..Default::default()
        })?,
    ));
    picks.push((
        "gaze ray",
        manager.try_add_pick(RayPickProperties {
            enabled: true,
            filter: PickFilter::ENTITIES | PickFilter::AVATARS,
            joint: Some(AVATAR_JOINT.to_string()),
            dir_offset: vectors::forward(),
            ..Default::default()
        })?,
    ));
    picks.push((
        "mouse ray",
        manager.try_add_pick(RayPickProperties {
            enabled: true,
            filter: PickFilter::ENTITIES,
            joint: Some(MOUSE_JOINT.to_string()),
            ..Default::default()
        })?,
    ));
    picks.push((
        "right stylus",
        manager.try_add_pick(StylusPickProperties {
            hand: 1,
            enabled: true,
            filter: PickFilter::ENTITIES | PickFilter::INVISIBLE | PickFilter::VISIBLE,
            ..Default::default()
        })?,
    ));
    picks.push((
        "avatar volume",
        manager.try_add_pick(PickProperties::from_toml_str(AVATAR_VOLUME)?)?,
    ));

    Ok(picks)
}

fn main() -> Result<(), DemoError> {
    let config = load_config()?;
    logging::init_with_level(&config.log_level);
    log::info!("Starting pick demo with {:?}", config);

    let skeleton = Arc::new(StaticSkeleton::new());
    skeleton.set_joint(HEAD_JOINT, Pose::from_position(Vec3::new(0.0, 1.7, 0.0)));

    let controllers = Arc::new(StaticControllers::new());
    controllers.set_hand(Hand::Right, Pose::from_position(Vec3::new(0.3, 1.0, 0.0)));

    let pointer = Arc::new(PointerTracker::new(800, 600));
    pointer.update_position(400.0, 300.0);
    pointer.set_viewport(Some(
        Viewport::perspective(Vec3::new(0.0, 3.0, 3.0), 60.0, 800.0 / 600.0, 0.1, 100.0)
            .looking_at(Vec3::new(0.0, -5.0, 0.0), vectors::up()),
    ));

    let collaborators = PickCollaborators::new()
        .with_physics(Arc::new(build_world()))
        .with_skeleton(skeleton.clone())
        .with_controllers(controllers)
        .with_pointer(pointer);
    let manager = Arc::new(PickManager::from_config(&config, collaborators));
    let picks = register_picks(&manager)?;
    log::info!("Registered {} picks", manager.pick_count());

    let running = Arc::new(AtomicBool::new(true));
    let reader = {
        let manager = Arc::clone(&manager);
        let running = Arc::clone(&running);
        let picks = picks.clone();
        thread::spawn(move || {
            let mut polls = 0_u32;
            while running.load(Ordering::Acquire) {
                for (name, id) in &picks {
                    if let Some(result) = manager.get_prev_pick_result(*id) {
                        log::trace!("{}: hit={} target={:?}", name, result.is_hit(), result.target());
                    }
                }
                polls += 1;
                thread::sleep(POLL_INTERVAL);
            }
            polls
        })
    };

    for frame in 0..FRAME_COUNT {
        // Sway the head so the gaze ray sweeps across the scene
        let sway = (frame as f32 * 0.05).sin() * 0.5;
        skeleton.set_joint(HEAD_JOINT, Pose::from_position(Vec3::new(sway, 1.7, 0.0)));

        let report = manager.run_evaluation_pass();
        if report.budget_exhausted {
            log::debug!("Frame {}: {} picks deferred", frame, report.skipped);
        }
        thread::sleep(FRAME_TIME);
    }

    running.store(false, Ordering::Release);
    let polls = reader.join().map_err(|_| DemoError::Reader)?;
    log::info!("Reader thread polled results {} times", polls);

    for (name, id) in &picks {
        match manager.get_prev_pick_result(*id) {
            Some(result) => log::info!(
                "{}: hit={} target={:?} distance={:?} type={:?}",
                name,
                result.is_hit(),
                result.target(),
                result.distance(),
                result.intersection()
            ),
            None => log::info!("{}: not evaluated", name),
        }
    }
    log::info!("Last pass: {:?}", manager.last_pass_report());

    Ok(())
}
