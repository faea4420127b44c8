//! Example: Spawn rigid crates across a grid of tables.
//!
//! Run with: cargo run --example spawn_scene

use glam::Vec3;

use gantry_core::materials::PreviewSurfaceCfg;
use gantry_core::schemas::{CollisionPropertiesCfg, MassPropertiesCfg, RigidBodyPropertiesCfg};
use gantry_core::shapes::{spawn_cuboid, CuboidCfg};
use gantry_stage::{export_subtree, MemoryStage, PrimPath, Stage};

fn main() {
    env_logger::init();

    match run() {
        Ok(()) => println!("\nDone."),
        Err(e) => eprintln!("Error: {}", e),
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut stage = MemoryStage::new();

    // Four table prims for the crates to land on.
    println!("=== Building scene ===");
    for i in 0..4 {
        let table = PrimPath::new(&format!("/World/Table_{}", i))?;
        stage.define_prim(&table, "Xform")?;
    }
    println!("Tables: {}", stage.find_matching("/World/Table_[0-9]+")?.len());

    // One spawn call places a crate on every table: the first match is
    // authored directly, the rest are clones of it.
    let cfg = CuboidCfg {
        size: Vec3::splat(0.3),
        translation: Some(Vec3::new(0.0, 0.0, 1.05)),
        rigid_props: Some(RigidBodyPropertiesCfg::default()),
        mass_props: Some(MassPropertiesCfg {
            mass: Some(2.0),
            ..Default::default()
        }),
        collision_props: Some(CollisionPropertiesCfg::default()),
        visual_material: Some(PreviewSurfaceCfg {
            diffuse_color: Vec3::new(0.8, 0.3, 0.1),
            ..Default::default()
        }),
        ..Default::default()
    };

    println!("\n=== Spawning crates ===");
    let first = spawn_cuboid(&mut stage, "/World/Table_[0-9]+/Crate", &cfg)?;
    println!("Spawned at: {}", first);

    let crates = stage.find_matching("/World/Table_[0-9]+/Crate")?;
    println!("Crates on stage: {}", crates.len());
    for path in &crates {
        println!("  {}", path);
    }
    println!("Total prims: {}", stage.prim_count());

    // Snapshot the authored crate so it can be respawned elsewhere.
    let out = std::env::temp_dir().join("spawn_scene_crate.json");
    export_subtree(&stage, &first, &out)?;
    println!("\nExported {} to {}", first, out.display());

    Ok(())
}
