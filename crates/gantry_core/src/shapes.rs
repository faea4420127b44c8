//! Primitive shape spawners.
//!
//! Cuboids and spheres, spawned from template paths with the usual
//! fan-out. Each spawner authors geometry first, then any configured
//! physics properties, then any configured materials (authored as
//! children of the shape and bound to it).

use glam::Vec3;

use gantry_stage::{PrimPath, Stage, StageError, Value};

use crate::materials::{
    bind_physics_material, bind_visual_material, define_preview_surface,
    define_rigid_body_material, PreviewSurfaceCfg, RigidBodyMaterialCfg,
};
use crate::schemas::{
    apply_collision_properties, apply_mass_properties, apply_rigid_body_properties,
    CollisionPropertiesCfg, MassPropertiesCfg, RigidBodyPropertiesCfg,
};
use crate::spawn::{spawn_and_clone, SpawnCfg, SpawnResult};

/// Attribute carrying a cuboid's edge lengths.
pub const SIZE_ATTR: &str = "size";

/// Attribute carrying a sphere's radius.
pub const RADIUS_ATTR: &str = "radius";

/// Attribute carrying a local translation.
pub const TRANSLATE_ATTR: &str = "xformOp:translate";

/// Child prim name for a shape's visual material.
const VISUAL_MATERIAL_CHILD: &str = "Material";

/// Child prim name for a shape's physics material.
const PHYSICS_MATERIAL_CHILD: &str = "PhysicsMaterial";

/// Cuboid spawn settings.
#[derive(Clone, Debug)]
pub struct CuboidCfg {
    /// Shared spawn settings
    pub spawn: SpawnCfg,

    /// Edge lengths (x, y, z)
    pub size: Vec3,

    /// Local translation, if any
    pub translation: Option<Vec3>,

    /// Rigid body properties to apply, if any
    pub rigid_props: Option<RigidBodyPropertiesCfg>,

    /// Mass properties to apply, if any
    pub mass_props: Option<MassPropertiesCfg>,

    /// Collision properties to apply, if any
    pub collision_props: Option<CollisionPropertiesCfg>,

    /// Visual material to author and bind, if any
    pub visual_material: Option<PreviewSurfaceCfg>,

    /// Physics material to author and bind, if any
    pub physics_material: Option<RigidBodyMaterialCfg>,
}

impl Default for CuboidCfg {
    fn default() -> Self {
        Self {
            spawn: SpawnCfg::default(),
            size: Vec3::ONE,
            translation: None,
            rigid_props: None,
            mass_props: None,
            collision_props: None,
            visual_material: None,
            physics_material: None,
        }
    }
}

/// Sphere spawn settings.
#[derive(Clone, Debug)]
pub struct SphereCfg {
    /// Shared spawn settings
    pub spawn: SpawnCfg,

    /// Sphere radius
    pub radius: f32,

    /// Local translation, if any
    pub translation: Option<Vec3>,

    /// Rigid body properties to apply, if any
    pub rigid_props: Option<RigidBodyPropertiesCfg>,

    /// Mass properties to apply, if any
    pub mass_props: Option<MassPropertiesCfg>,

    /// Collision properties to apply, if any
    pub collision_props: Option<CollisionPropertiesCfg>,

    /// Visual material to author and bind, if any
    pub visual_material: Option<PreviewSurfaceCfg>,

    /// Physics material to author and bind, if any
    pub physics_material: Option<RigidBodyMaterialCfg>,
}

impl Default for SphereCfg {
    fn default() -> Self {
        Self {
            spawn: SpawnCfg::default(),
            radius: 0.5,
            translation: None,
            rigid_props: None,
            mass_props: None,
            collision_props: None,
            visual_material: None,
            physics_material: None,
        }
    }
}

/// Spawn a cuboid from a template path, fanning out to every match.
pub fn spawn_cuboid<S: Stage>(
    stage: &mut S,
    template: &str,
    cfg: &CuboidCfg,
) -> SpawnResult<PrimPath> {
    spawn_and_clone(stage, template, &cfg.spawn, |stage, path| {
        stage.define_prim(path, "Cube")?;
        stage.set_attribute(path, SIZE_ATTR, Value::Float3(cfg.size))?;
        finish_shape(
            stage,
            path,
            cfg.translation,
            cfg.rigid_props.as_ref(),
            cfg.mass_props.as_ref(),
            cfg.collision_props.as_ref(),
            cfg.visual_material.as_ref(),
            cfg.physics_material.as_ref(),
        )
    })
}

/// Spawn a sphere from a template path, fanning out to every match.
pub fn spawn_sphere<S: Stage>(
    stage: &mut S,
    template: &str,
    cfg: &SphereCfg,
) -> SpawnResult<PrimPath> {
    spawn_and_clone(stage, template, &cfg.spawn, |stage, path| {
        stage.define_prim(path, "Sphere")?;
        stage.set_attribute(path, RADIUS_ATTR, Value::Float(cfg.radius))?;
        finish_shape(
            stage,
            path,
            cfg.translation,
            cfg.rigid_props.as_ref(),
            cfg.mass_props.as_ref(),
            cfg.collision_props.as_ref(),
            cfg.visual_material.as_ref(),
            cfg.physics_material.as_ref(),
        )
    })
}

/// Shared tail of every shape build: transform, physics, materials.
#[allow(clippy::too_many_arguments)]
fn finish_shape<S: Stage>(
    stage: &mut S,
    path: &PrimPath,
    translation: Option<Vec3>,
    rigid_props: Option<&RigidBodyPropertiesCfg>,
    mass_props: Option<&MassPropertiesCfg>,
    collision_props: Option<&CollisionPropertiesCfg>,
    visual_material: Option<&PreviewSurfaceCfg>,
    physics_material: Option<&RigidBodyMaterialCfg>,
) -> SpawnResult<PrimPath> {
    if let Some(translation) = translation {
        stage.set_attribute(path, TRANSLATE_ATTR, Value::Float3(translation))?;
    }

    if let Some(cfg) = rigid_props {
        apply_rigid_body_properties(stage, path, cfg)?;
    }
    if let Some(cfg) = mass_props {
        apply_mass_properties(stage, path, cfg)?;
    }
    if let Some(cfg) = collision_props {
        apply_collision_properties(stage, path, cfg)?;
    }

    if let Some(cfg) = visual_material {
        let material = path.child(VISUAL_MATERIAL_CHILD).map_err(StageError::from)?;
        define_preview_surface(stage, &material, cfg)?;
        bind_visual_material(stage, path, &material, true)?;
    }
    if let Some(cfg) = physics_material {
        let material = path.child(PHYSICS_MATERIAL_CHILD).map_err(StageError::from)?;
        define_rigid_body_material(stage, &material, cfg)?;
        bind_physics_material(stage, path, &material, true)?;
    }

    Ok(path.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::{
        MATERIAL_BINDING_ATTR, PHYSICS_BINDING_ATTR, PHYSICS_MATERIAL_API, PHYSICS_STRENGTH_ATTR,
        STRENGTH_STRONGER,
    };
    use crate::schemas::{COLLISION_API, MASS_API, RIGID_BODY_API};
    use crate::spawn::SpawnError;
    use gantry_stage::{MemoryStage, StageError};

    fn path(s: &str) -> PrimPath {
        PrimPath::new(s).unwrap()
    }

    fn stage_with(prims: &[(&str, &str)]) -> MemoryStage {
        let mut stage = MemoryStage::new();
        for (p, type_name) in prims {
            stage.define_prim(&path(p), type_name).unwrap();
        }
        stage
    }

    #[test]
    fn test_spawn_cuboid_defaults() {
        let mut stage = stage_with(&[("/World", "Xform")]);

        let spawned = spawn_cuboid(&mut stage, "/World/Box", &CuboidCfg::default()).unwrap();

        assert_eq!(stage.prim(&spawned).unwrap().type_name, "Cube");
        assert_eq!(stage.attribute(&spawned, SIZE_ATTR), Some(&Value::Float3(Vec3::ONE)));
        assert_eq!(stage.attribute(&spawned, TRANSLATE_ATTR), None);
        assert!(!stage.has_api(&spawned, RIGID_BODY_API));
    }

    #[test]
    fn test_spawn_sphere_with_physics() {
        let mut stage = stage_with(&[("/World", "Xform")]);

        let cfg = SphereCfg {
            radius: 0.25,
            translation: Some(Vec3::new(0.0, 0.0, 1.0)),
            rigid_props: Some(RigidBodyPropertiesCfg::default()),
            mass_props: Some(MassPropertiesCfg {
                mass: Some(2.0),
                density: None,
            }),
            collision_props: Some(CollisionPropertiesCfg::default()),
            ..Default::default()
        };
        let spawned = spawn_sphere(&mut stage, "/World/Ball", &cfg).unwrap();

        assert_eq!(stage.attribute(&spawned, RADIUS_ATTR), Some(&Value::Float(0.25)));
        assert_eq!(
            stage.attribute(&spawned, TRANSLATE_ATTR),
            Some(&Value::Float3(Vec3::new(0.0, 0.0, 1.0)))
        );
        assert!(stage.has_api(&spawned, RIGID_BODY_API));
        assert!(stage.has_api(&spawned, MASS_API));
        assert!(stage.has_api(&spawned, COLLISION_API));
        assert_eq!(stage.attribute(&spawned, "physics:mass"), Some(&Value::Float(2.0)));
    }

    #[test]
    fn test_spawn_on_existing_path_fails() {
        let mut stage = stage_with(&[("/World/Box", "Cube")]);

        let err = spawn_cuboid(&mut stage, "/World/Box", &CuboidCfg::default()).unwrap_err();
        assert!(matches!(err, SpawnError::Stage(StageError::PrimExists(_))));
    }

    #[test]
    fn test_cuboid_materials_are_authored_and_bound() {
        let mut stage = stage_with(&[("/World", "Xform")]);

        let cfg = CuboidCfg {
            collision_props: Some(CollisionPropertiesCfg::default()),
            visual_material: Some(PreviewSurfaceCfg {
                diffuse_color: Vec3::new(0.1, 0.6, 0.1),
                ..Default::default()
            }),
            physics_material: Some(RigidBodyMaterialCfg::default()),
            ..Default::default()
        };
        let spawned = spawn_cuboid(&mut stage, "/World/Crate", &cfg).unwrap();

        let visual = path("/World/Crate/Material");
        let physical = path("/World/Crate/PhysicsMaterial");
        assert_eq!(stage.prim(&visual).unwrap().type_name, "Material");
        assert!(stage.has_api(&physical, PHYSICS_MATERIAL_API));
        assert_eq!(
            stage.attribute(&spawned, MATERIAL_BINDING_ATTR),
            Some(&Value::token(visual.as_str()))
        );
        assert_eq!(
            stage.attribute(&spawned, PHYSICS_BINDING_ATTR),
            Some(&Value::token(physical.as_str()))
        );
        assert_eq!(
            stage.attribute(&spawned, PHYSICS_STRENGTH_ATTR),
            Some(&Value::token(STRENGTH_STRONGER))
        );
    }

    #[test]
    fn test_cuboid_fanout_copies_whole_shape() {
        let mut stage = stage_with(&[("/World/Table_0", "Xform"), ("/World/Table_1", "Xform")]);

        let cfg = CuboidCfg {
            size: Vec3::splat(0.3),
            visual_material: Some(PreviewSurfaceCfg::default()),
            ..Default::default()
        };
        let first = spawn_cuboid(&mut stage, "/World/Table_[0-9]+/Crate", &cfg).unwrap();

        assert_eq!(first, path("/World/Table_0/Crate"));
        // the clone received the geometry and the material child
        let clone = path("/World/Table_1/Crate");
        assert_eq!(stage.prim(&clone).unwrap().type_name, "Cube");
        assert!(stage.has_prim(&path("/World/Table_1/Crate/Material")));
    }
}
