//! Scene editor demo
//!
//! Drives the ECS the way the editor does: build (or load) a small scene,
//! apply a few structural edits, log the resulting world positions and
//! save the scene as RON.
//!
//! Usage: `scene_editor_demo [--config world.toml] [--scene in.ron] [--out out.ron]`

use scene_ecs::foundation::logging::{self, LevelFilter};
use scene_ecs::foundation::math::utils::yaw;
use scene_ecs::prelude::*;
use std::path::PathBuf;

/// Demo errors
#[derive(thiserror::Error, Debug)]
enum DemoError {
    #[error("ECS error: {0}")]
    Ecs(#[from] EcsError),

    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Bad arguments: {0}")]
    Args(String),

    #[error("World has no transform system")]
    NoTransforms,
}

/// Per-object render settings edited in the inspector
#[derive(Debug, Clone)]
struct Renderable {
    entity: Entity,
    mesh: &'static str,
    visible: bool,
}

impl Component for Renderable {
    fn for_entity(entity: Entity) -> Self {
        Self {
            entity,
            mesh: "cube",
            visible: true,
        }
    }

    fn entity(&self) -> Entity {
        self.entity
    }

    fn set_entity(&mut self, entity: Entity) {
        self.entity = entity;
    }
}

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    scene: Option<PathBuf>,
    out: Option<PathBuf>,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, DemoError> {
        let mut parsed = Self::default();
        while let Some(flag) = args.next() {
            let value = args
                .next()
                .map(PathBuf::from)
                .ok_or_else(|| DemoError::Args(format!("missing value for {flag}")))?;
            match flag.as_str() {
                "--config" => parsed.config = Some(value),
                "--scene" => parsed.scene = Some(value),
                "--out" => parsed.out = Some(value),
                other => return Err(DemoError::Args(format!("unknown flag {other}"))),
            }
        }
        Ok(parsed)
    }
}

/// Spawn a node with a transform and a renderable
fn spawn(world: &mut World, position: Vec3, mesh: &'static str) -> Result<Entity, DemoError> {
    let entity = world.create_entity();
    world.attach(entity, LocalTransform::from_pose(Pose::from_position(position)))?;
    world.attach(
        entity,
        Renderable {
            entity,
            mesh,
            visible: true,
        },
    )?;
    Ok(entity)
}

/// Table with a lamp and a cup on top, plus a chair beside it
fn build_sample_scene(world: &mut World) -> Result<Vec<Entity>, DemoError> {
    let table = spawn(world, Vec3::new(0.0, 0.0, 0.0), "table")?;
    let lamp = spawn(world, Vec3::new(0.4, 0.8, 0.0), "lamp")?;
    let cup = spawn(world, Vec3::new(-0.3, 0.8, 0.2), "cup")?;
    let chair = spawn(world, Vec3::new(0.0, 0.0, 1.0), "chair")?;

    let transforms = world.transforms_mut().ok_or(DemoError::NoTransforms)?;
    transforms.add_child(table, lamp)?;
    transforms.add_child(table, cup)?;
    transforms.set_local_scale(cup, Vec3::new(0.2, 0.2, 0.2))?;

    Ok(vec![table, lamp, cup, chair])
}

/// Reparent, move, attempt a cycle, delete
fn run_edits(world: &mut World, entities: &[Entity]) -> Result<(), DemoError> {
    let (Some(&table), Some(&cup), Some(&chair)) = (entities.first(), entities.get(2), entities.get(3)) else {
        log::info!("Scene has fewer than four nodes, skipping edits");
        return Ok(());
    };

    let transforms = world.transforms_mut().ok_or(DemoError::NoTransforms)?;

    log::info!("Moving the cup onto the chair");
    transforms.add_child(chair, cup)?;

    log::info!("Turning the table a quarter turn");
    transforms.set_local_pose(table, Pose::new(Vec3::new(2.0, 0.0, 0.0), yaw(90.0)))?;

    log::info!("Trying to put the chair under the cup");
    match transforms.add_child(cup, chair) {
        Err(EcsError::InvalidArgument(reason)) => log::info!("Rejected as expected: {reason}"),
        other => log::warn!("Cycle was not rejected: {other:?}"),
    }

    log::info!("Deleting the chair and everything on it");
    world.destroy_entity(chair);
    Ok(())
}

fn log_scene(world: &World) {
    let Some(transforms) = world.transforms() else {
        return;
    };
    let renderables = world.system::<PooledSystem<Renderable>>();

    for record in transforms.world_transforms() {
        let mesh = renderables
            .and_then(|system| system.get(record.entity))
            .filter(|renderable| renderable.visible)
            .map_or("-", |renderable| renderable.mesh);
        let p = record.position();
        log::info!(
            "{} [{mesh}] parent={} world=({:.2}, {:.2}, {:.2})",
            record.entity,
            transforms.get_parent(record.entity),
            p.x,
            p.y,
            p.z
        );
    }
}

fn run() -> Result<(), DemoError> {
    let args = Args::parse(std::env::args().skip(1))?;

    let config = match &args.config {
        Some(path) => WorldConfig::load_from_file(path)?,
        None => WorldConfig::new("editor_demo"),
    };

    let mut world = World::with_transform_system(config)?;
    world.register_pooled::<Renderable>("Renderable")?;

    let entities = match &args.scene {
        Some(path) => SceneDocument::load(path)?.restore(&mut world)?,
        None => build_sample_scene(&mut world)?,
    };

    log::info!("Initial scene:");
    log_scene(&world);

    run_edits(&mut world, &entities)?;

    log::info!("Edited scene:");
    log_scene(&world);

    let transforms = world.transforms().ok_or(DemoError::NoTransforms)?;
    let document = SceneDocument::capture(transforms);
    match &args.out {
        Some(path) => document.save(path)?,
        None => println!("{}", document.to_ron_string()?),
    }
    Ok(())
}

fn main() {
    logging::init_with_level(LevelFilter::Info);
    log::info!("Starting scene editor demo");

    if let Err(e) = run() {
        log::error!("Demo failed: {e}");
        std::process::exit(1);
    }

    log::info!("Scene editor demo finished successfully");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_world() -> World {
        let mut world = World::with_transform_system(WorldConfig::new("demo_test")).unwrap();
        world.register_pooled::<Renderable>("Renderable").unwrap();
        world
    }

    #[test]
    fn test_args_parse() {
        let args = ["--scene", "in.ron", "--out", "out.ron"].map(String::from);
        let parsed = Args::parse(args.into_iter()).unwrap();

        assert_eq!(parsed.scene, Some(PathBuf::from("in.ron")));
        assert_eq!(parsed.out, Some(PathBuf::from("out.ron")));
        assert!(parsed.config.is_none());

        assert!(Args::parse(["--bogus", "x"].map(String::from).into_iter()).is_err());
        assert!(Args::parse(["--out"].map(String::from).into_iter()).is_err());
    }

    #[test]
    fn test_edits_leave_table_lamp() {
        let mut world = demo_world();
        let entities = build_sample_scene(&mut world).unwrap();
        run_edits(&mut world, &entities).unwrap();

        let transforms = world.transforms().unwrap();
        let (table, lamp, cup, chair) = (entities[0], entities[1], entities[2], entities[3]);

        assert!(!transforms.has_transform(chair));
        assert!(!transforms.has_transform(cup));
        assert_eq!(transforms.children(table), &[lamp]);

        let renderables = world.system::<PooledSystem<Renderable>>().unwrap();
        assert!(renderables.get(chair).is_none());
        assert!(renderables.get(cup).is_none());
        assert_eq!(renderables.len(), 2);
        assert_eq!(renderables.get(lamp).map(|r| r.mesh), Some("lamp"));

        // lamp offset (0.4, 0.8, 0) yawed 90 about the table at x = 2
        let lamp_world = transforms.get_world_transform(lamp).unwrap().position();
        assert!((lamp_world - Vec3::new(2.0, 0.8, -0.4)).norm() < 1e-5);
    }
}
