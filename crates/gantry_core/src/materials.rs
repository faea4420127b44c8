//! Materials: authoring and binding.
//!
//! Two material kinds are covered: preview-surface shading materials
//! and rigid-body physics materials. Binding walks a subtree with
//! [`apply_to_subtree`], so a binding authored high up prunes the
//! branch and descendants inherit it rather than repeating it.

use glam::Vec3;

use gantry_stage::{PrimPath, Stage, StageError, StageResult, Value};

use crate::apply::{apply_to_subtree, ApplyReport};
use crate::schemas::{COLLISION_API, DEFORMABLE_BODY_API, PHYSX_SCENE_API};
use crate::spawn::{spawn_and_clone, SpawnCfg, SpawnResult};

/// Attribute carrying the visual material binding.
pub const MATERIAL_BINDING_ATTR: &str = "material:binding";

/// Attribute carrying the physics material binding.
pub const PHYSICS_BINDING_ATTR: &str = "material:binding:physics";

/// Attribute carrying the visual binding strength token.
pub const BINDING_STRENGTH_ATTR: &str = "material:binding:strength";

/// Attribute carrying the physics binding strength token.
pub const PHYSICS_STRENGTH_ATTR: &str = "material:binding:physics:strength";

/// Binding strength token that overrides descendant bindings.
pub const STRENGTH_STRONGER: &str = "strongerThanDescendants";

/// Binding strength token that yields to descendant bindings.
pub const STRENGTH_WEAKER: &str = "weakerThanDescendants";

/// API schema name for physics materials.
pub const PHYSICS_MATERIAL_API: &str = "PhysicsMaterialAPI";

/// Prim type name for PhysX particle systems.
pub const PARTICLE_SYSTEM_TYPE: &str = "PhysxParticleSystem";

/// Preview-surface shading settings.
#[derive(Clone, Debug)]
pub struct PreviewSurfaceCfg {
    /// Shared spawn settings (used by the template spawner)
    pub spawn: SpawnCfg,

    /// Diffuse/albedo color (RGB, 0-1)
    pub diffuse_color: Vec3,

    /// Metallic factor (0=dielectric, 1=metal)
    pub metallic: f32,

    /// Roughness factor (0=smooth, 1=rough)
    pub roughness: f32,

    /// Emissive color (RGB)
    pub emissive_color: Vec3,

    /// Opacity (0=transparent, 1=opaque)
    pub opacity: f32,
}

impl Default for PreviewSurfaceCfg {
    fn default() -> Self {
        Self {
            spawn: SpawnCfg::default(),
            diffuse_color: Vec3::new(0.5, 0.5, 0.5), // Grey default
            metallic: 0.0,
            roughness: 0.5,
            emissive_color: Vec3::ZERO,
            opacity: 1.0,
        }
    }
}

/// Rigid-body physics material settings.
#[derive(Clone, Debug)]
pub struct RigidBodyMaterialCfg {
    /// Shared spawn settings (used by the template spawner)
    pub spawn: SpawnCfg,

    /// Friction while at rest
    pub static_friction: f32,

    /// Friction while sliding
    pub dynamic_friction: f32,

    /// Bounciness on impact
    pub restitution: f32,
}

impl Default for RigidBodyMaterialCfg {
    fn default() -> Self {
        Self {
            spawn: SpawnCfg::default(),
            static_friction: 0.5,
            dynamic_friction: 0.5,
            restitution: 0.0,
        }
    }
}

/// Author a preview-surface material prim at a concrete path.
pub fn define_preview_surface<S: Stage>(
    stage: &mut S,
    path: &PrimPath,
    cfg: &PreviewSurfaceCfg,
) -> StageResult<()> {
    stage.define_prim(path, "Material")?;
    stage.set_attribute(path, "inputs:diffuseColor", Value::Float3(cfg.diffuse_color))?;
    stage.set_attribute(path, "inputs:metallic", Value::Float(cfg.metallic))?;
    stage.set_attribute(path, "inputs:roughness", Value::Float(cfg.roughness))?;
    stage.set_attribute(path, "inputs:emissiveColor", Value::Float3(cfg.emissive_color))?;
    stage.set_attribute(path, "inputs:opacity", Value::Float(cfg.opacity))?;
    Ok(())
}

/// Author a rigid-body physics material prim at a concrete path.
pub fn define_rigid_body_material<S: Stage>(
    stage: &mut S,
    path: &PrimPath,
    cfg: &RigidBodyMaterialCfg,
) -> StageResult<()> {
    stage.define_prim(path, "Material")?;
    stage.apply_api(path, PHYSICS_MATERIAL_API)?;
    stage.set_attribute(path, "physics:staticFriction", Value::Float(cfg.static_friction))?;
    stage.set_attribute(path, "physics:dynamicFriction", Value::Float(cfg.dynamic_friction))?;
    stage.set_attribute(path, "physics:restitution", Value::Float(cfg.restitution))?;
    Ok(())
}

/// Spawn a preview-surface material from a template path, fanning out
/// to every match.
pub fn spawn_preview_surface<S: Stage>(
    stage: &mut S,
    template: &str,
    cfg: &PreviewSurfaceCfg,
) -> SpawnResult<PrimPath> {
    spawn_and_clone(stage, template, &cfg.spawn, |stage, path| {
        define_preview_surface(stage, path, cfg)?;
        Ok(path.clone())
    })
}

/// Spawn a rigid-body physics material from a template path, fanning
/// out to every match.
pub fn spawn_rigid_body_material<S: Stage>(
    stage: &mut S,
    template: &str,
    cfg: &RigidBodyMaterialCfg,
) -> SpawnResult<PrimPath> {
    spawn_and_clone(stage, template, &cfg.spawn, |stage, path| {
        define_rigid_body_material(stage, path, cfg)?;
        Ok(path.clone())
    })
}

/// Bind a visual material to a subtree.
///
/// The binding lands on the first typed prim along each branch
/// (typeless placeholders are descended through), so a single
/// root-level binding is the common outcome. Fails up front when the
/// material prim does not exist.
pub fn bind_visual_material<S: Stage>(
    stage: &mut S,
    root: &PrimPath,
    material: &PrimPath,
    stronger_than_descendants: bool,
) -> Result<ApplyReport, StageError> {
    if !stage.has_prim(material) {
        return Err(StageError::PrimNotFound(material.clone()));
    }
    let strength = if stronger_than_descendants {
        STRENGTH_STRONGER
    } else {
        STRENGTH_WEAKER
    };
    apply_to_subtree(stage, root, "bind_visual_material", |stage, path| {
        let typed = stage.prim(path).map(|p| p.is_typed()).unwrap_or(false);
        if !typed {
            return Ok(false);
        }
        stage.set_attribute(path, MATERIAL_BINDING_ATTR, Value::token(material.as_str()))?;
        stage.set_attribute(path, BINDING_STRENGTH_ATTR, Value::token(strength))?;
        Ok(true)
    })
}

/// Bind a physics material to a subtree.
///
/// The binding only takes on physics-enabled prims: those carrying the
/// collision, deformable body, or PhysX scene API, and particle-system
/// prims. Anything else is descended through.
pub fn bind_physics_material<S: Stage>(
    stage: &mut S,
    root: &PrimPath,
    material: &PrimPath,
    stronger_than_descendants: bool,
) -> Result<ApplyReport, StageError> {
    if !stage.has_prim(material) {
        return Err(StageError::PrimNotFound(material.clone()));
    }
    let strength = if stronger_than_descendants {
        STRENGTH_STRONGER
    } else {
        STRENGTH_WEAKER
    };
    apply_to_subtree(stage, root, "bind_physics_material", |stage, path| {
        let eligible = stage.has_api(path, COLLISION_API)
            || stage.has_api(path, DEFORMABLE_BODY_API)
            || stage.has_api(path, PHYSX_SCENE_API)
            || stage
                .prim(path)
                .map(|p| p.type_name == PARTICLE_SYSTEM_TYPE)
                .unwrap_or(false);
        if !eligible {
            log::debug!(
                "'{}' is not a collider, deformable body, PhysX scene, or particle system; not binding",
                path
            );
            return Ok(false);
        }
        stage.set_attribute(path, PHYSICS_BINDING_ATTR, Value::token(material.as_str()))?;
        stage.set_attribute(path, PHYSICS_STRENGTH_ATTR, Value::token(strength))?;
        Ok(true)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gantry_stage::MemoryStage;

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
    fn test_spawn_preview_surface_authors_inputs() {
        let mut stage = stage_with(&[("/World/Looks", "Scope")]);

        let cfg = PreviewSurfaceCfg {
            diffuse_color: Vec3::new(0.8, 0.1, 0.1),
            ..Default::default()
        };
        let material = spawn_preview_surface(&mut stage, "/World/Looks/Red", &cfg).unwrap();

        assert_eq!(stage.prim(&material).unwrap().type_name, "Material");
        assert_eq!(
            stage.attribute(&material, "inputs:diffuseColor"),
            Some(&Value::Float3(Vec3::new(0.8, 0.1, 0.1)))
        );
        assert_eq!(stage.attribute(&material, "inputs:opacity"), Some(&Value::Float(1.0)));
    }

    #[test]
    fn test_spawn_rigid_body_material() {
        let mut stage = stage_with(&[("/World/Looks", "Scope")]);

        let cfg = RigidBodyMaterialCfg {
            static_friction: 0.9,
            ..Default::default()
        };
        let material = spawn_rigid_body_material(&mut stage, "/World/Looks/Rubber", &cfg).unwrap();

        assert!(stage.has_api(&material, PHYSICS_MATERIAL_API));
        assert_eq!(
            stage.attribute(&material, "physics:staticFriction"),
            Some(&Value::Float(0.9))
        );
        assert_eq!(
            stage.attribute(&material, "physics:restitution"),
            Some(&Value::Float(0.0))
        );
    }

    #[test]
    fn test_bind_visual_stops_at_typed_root() {
        let mut stage = stage_with(&[
            ("/World/box", "Cube"),
            ("/World/box/nested", "Cube"),
            ("/World/Looks/Red", "Material"),
        ]);

        let report =
            bind_visual_material(&mut stage, &path("/World/box"), &path("/World/Looks/Red"), true)
                .unwrap();

        assert_eq!(report.applied, 1);
        assert_eq!(
            stage.attribute(&path("/World/box"), MATERIAL_BINDING_ATTR),
            Some(&Value::token("/World/Looks/Red"))
        );
        assert_eq!(
            stage.attribute(&path("/World/box"), BINDING_STRENGTH_ATTR),
            Some(&Value::token(STRENGTH_STRONGER))
        );
        // pruned below the binding
        assert_eq!(stage.attribute(&path("/World/box/nested"), MATERIAL_BINDING_ATTR), None);
    }

    #[test]
    fn test_bind_visual_descends_through_placeholders() {
        let mut stage = stage_with(&[
            ("/World/group/box", "Cube"),
            ("/World/Looks/Red", "Material"),
        ]);
        // /World/group is an implicit typeless placeholder

        let report = bind_visual_material(
            &mut stage,
            &path("/World/group"),
            &path("/World/Looks/Red"),
            false,
        )
        .unwrap();

        assert_eq!(report.applied, 1);
        assert_eq!(stage.attribute(&path("/World/group"), MATERIAL_BINDING_ATTR), None);
        assert_eq!(
            stage.attribute(&path("/World/group/box"), MATERIAL_BINDING_ATTR),
            Some(&Value::token("/World/Looks/Red"))
        );
        assert_eq!(
            stage.attribute(&path("/World/group/box"), BINDING_STRENGTH_ATTR),
            Some(&Value::token(STRENGTH_WEAKER))
        );
    }

    #[test]
    fn test_bind_missing_material_fails() {
        let mut stage = stage_with(&[("/World/box", "Cube")]);

        let err = bind_visual_material(&mut stage, &path("/World/box"), &path("/Nowhere"), true)
            .unwrap_err();
        assert!(matches!(err, StageError::PrimNotFound(_)));

        let err = bind_physics_material(&mut stage, &path("/World/box"), &path("/Nowhere"), true)
            .unwrap_err();
        assert!(matches!(err, StageError::PrimNotFound(_)));
    }

    #[test]
    fn test_bind_physics_requires_collision() {
        let mut stage = stage_with(&[
            ("/Robot", "Xform"),
            ("/Robot/visual", "Cube"),
            ("/Robot/collider", "Cube"),
            ("/World/Looks/Rubber", "Material"),
        ]);
        stage.apply_api(&path("/Robot/collider"), COLLISION_API).unwrap();

        let report =
            bind_physics_material(&mut stage, &path("/Robot"), &path("/World/Looks/Rubber"), true)
                .unwrap();

        assert_eq!(report.applied, 1);
        assert_eq!(
            stage.attribute(&path("/Robot/collider"), PHYSICS_BINDING_ATTR),
            Some(&Value::token("/World/Looks/Rubber"))
        );
        assert_eq!(
            stage.attribute(&path("/Robot/collider"), PHYSICS_STRENGTH_ATTR),
            Some(&Value::token(STRENGTH_STRONGER))
        );
        assert_eq!(stage.attribute(&path("/Robot/visual"), PHYSICS_BINDING_ATTR), None);
    }

    #[test]
    fn test_bind_physics_takes_particle_systems() {
        let mut stage = stage_with(&[
            ("/World/spill", "PhysxParticleSystem"),
            ("/World/Looks/Gel", "Material"),
        ]);

        let report = bind_physics_material(
            &mut stage,
            &path("/World/spill"),
            &path("/World/Looks/Gel"),
            false,
        )
        .unwrap();

        assert_eq!(report.applied, 1);
        assert_eq!(
            stage.attribute(&path("/World/spill"), PHYSICS_BINDING_ATTR),
            Some(&Value::token("/World/Looks/Gel"))
        );
        // the weaker token comes through on the physics binding
        assert_eq!(
            stage.attribute(&path("/World/spill"), PHYSICS_STRENGTH_ATTR),
            Some(&Value::token(STRENGTH_WEAKER))
        );
    }
}
