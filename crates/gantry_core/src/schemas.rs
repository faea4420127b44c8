//! Physics schema properties.
//!
//! Each property group comes as a config struct of optional fields and
//! a pair of operations: `apply_*` puts the API schema on one prim and
//! authors the configured attributes there, while `modify_*` walks a
//! subtree, authors the attributes on the prims already carrying the
//! API, and prunes below them. The walk shape means a schema never
//! ends up authored at two nesting levels of the same branch.

use gantry_stage::{PrimPath, Stage, StageError, StageResult, Value};

use crate::apply::{apply_to_subtree, ApplyReport};

/// API schema name for rigid bodies.
pub const RIGID_BODY_API: &str = "PhysicsRigidBodyAPI";

/// API schema name for collision.
pub const COLLISION_API: &str = "PhysicsCollisionAPI";

/// API schema name for mass properties.
pub const MASS_API: &str = "PhysicsMassAPI";

/// API schema name for articulation roots.
pub const ARTICULATION_ROOT_API: &str = "PhysicsArticulationRootAPI";

/// API schema name for contact reporting.
pub const CONTACT_REPORT_API: &str = "PhysxContactReportAPI";

/// API schema name for deformable bodies.
pub const DEFORMABLE_BODY_API: &str = "PhysxDeformableBodyAPI";

/// API schema name for PhysX scene settings.
pub const PHYSX_SCENE_API: &str = "PhysxSceneAPI";

/// Attribute carrying the contact-report force threshold.
pub const CONTACT_THRESHOLD_ATTR: &str = "physxContactReport:threshold";

/// Rigid body settings. Only `Some` fields are authored.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RigidBodyPropertiesCfg {
    /// Enable or disable the body
    pub rigid_body_enabled: Option<bool>,

    /// Drive the body kinematically instead of dynamically
    pub kinematic_enabled: Option<bool>,

    /// Exempt the body from gravity
    pub disable_gravity: Option<bool>,

    /// Linear velocity damping
    pub linear_damping: Option<f32>,

    /// Angular velocity damping
    pub angular_damping: Option<f32>,

    /// Linear velocity clamp
    pub max_linear_velocity: Option<f32>,

    /// Angular velocity clamp
    pub max_angular_velocity: Option<f32>,

    /// Energy below which the body may go to sleep
    pub sleep_threshold: Option<f32>,
}

/// Collision settings. Only `Some` fields are authored.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CollisionPropertiesCfg {
    /// Enable or disable collision
    pub collision_enabled: Option<bool>,

    /// Distance at which contacts start being generated
    pub contact_offset: Option<f32>,

    /// Distance at which bodies come to rest
    pub rest_offset: Option<f32>,

    /// Torsional friction patch radius
    pub torsional_patch_radius: Option<f32>,
}

/// Mass settings. Only `Some` fields are authored.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MassPropertiesCfg {
    /// Explicit mass
    pub mass: Option<f32>,

    /// Density, used when no explicit mass is set
    pub density: Option<f32>,
}

/// Articulation root settings. Only `Some` fields are authored.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ArticulationRootPropertiesCfg {
    /// Enable or disable the articulation
    pub articulation_enabled: Option<bool>,

    /// Allow links of the articulation to collide with each other
    pub enabled_self_collisions: Option<bool>,

    /// Energy below which the articulation may go to sleep
    pub sleep_threshold: Option<f32>,

    /// Stabilization energy threshold
    pub stabilization_threshold: Option<f32>,
}

fn set_optional<S, V>(stage: &mut S, path: &PrimPath, name: &str, value: Option<V>) -> StageResult<()>
where
    S: Stage,
    V: Into<Value>,
{
    if let Some(value) = value {
        stage.set_attribute(path, name, value.into())?;
    }
    Ok(())
}

fn write_rigid_body_attrs<S: Stage>(
    stage: &mut S,
    path: &PrimPath,
    cfg: &RigidBodyPropertiesCfg,
) -> StageResult<()> {
    set_optional(stage, path, "physics:rigidBodyEnabled", cfg.rigid_body_enabled)?;
    set_optional(stage, path, "physics:kinematicEnabled", cfg.kinematic_enabled)?;
    set_optional(stage, path, "physxRigidBody:disableGravity", cfg.disable_gravity)?;
    set_optional(stage, path, "physxRigidBody:linearDamping", cfg.linear_damping)?;
    set_optional(stage, path, "physxRigidBody:angularDamping", cfg.angular_damping)?;
    set_optional(stage, path, "physxRigidBody:maxLinearVelocity", cfg.max_linear_velocity)?;
    set_optional(stage, path, "physxRigidBody:maxAngularVelocity", cfg.max_angular_velocity)?;
    set_optional(stage, path, "physxRigidBody:sleepThreshold", cfg.sleep_threshold)?;
    Ok(())
}

fn write_collision_attrs<S: Stage>(
    stage: &mut S,
    path: &PrimPath,
    cfg: &CollisionPropertiesCfg,
) -> StageResult<()> {
    set_optional(stage, path, "physics:collisionEnabled", cfg.collision_enabled)?;
    set_optional(stage, path, "physxCollision:contactOffset", cfg.contact_offset)?;
    set_optional(stage, path, "physxCollision:restOffset", cfg.rest_offset)?;
    set_optional(
        stage,
        path,
        "physxCollision:torsionalPatchRadius",
        cfg.torsional_patch_radius,
    )?;
    Ok(())
}

fn write_mass_attrs<S: Stage>(
    stage: &mut S,
    path: &PrimPath,
    cfg: &MassPropertiesCfg,
) -> StageResult<()> {
    set_optional(stage, path, "physics:mass", cfg.mass)?;
    set_optional(stage, path, "physics:density", cfg.density)?;
    Ok(())
}

fn write_articulation_attrs<S: Stage>(
    stage: &mut S,
    path: &PrimPath,
    cfg: &ArticulationRootPropertiesCfg,
) -> StageResult<()> {
    set_optional(
        stage,
        path,
        "physxArticulation:articulationEnabled",
        cfg.articulation_enabled,
    )?;
    set_optional(
        stage,
        path,
        "physxArticulation:enabledSelfCollisions",
        cfg.enabled_self_collisions,
    )?;
    set_optional(stage, path, "physxArticulation:sleepThreshold", cfg.sleep_threshold)?;
    set_optional(
        stage,
        path,
        "physxArticulation:stabilizationThreshold",
        cfg.stabilization_threshold,
    )?;
    Ok(())
}

/// Apply the rigid body API to one prim and author the configured
/// settings there.
pub fn apply_rigid_body_properties<S: Stage>(
    stage: &mut S,
    path: &PrimPath,
    cfg: &RigidBodyPropertiesCfg,
) -> StageResult<()> {
    stage.apply_api(path, RIGID_BODY_API)?;
    write_rigid_body_attrs(stage, path, cfg)
}

/// Apply the collision API to one prim and author the configured
/// settings there.
pub fn apply_collision_properties<S: Stage>(
    stage: &mut S,
    path: &PrimPath,
    cfg: &CollisionPropertiesCfg,
) -> StageResult<()> {
    stage.apply_api(path, COLLISION_API)?;
    write_collision_attrs(stage, path, cfg)
}

/// Apply the mass API to one prim and author the configured settings
/// there.
pub fn apply_mass_properties<S: Stage>(
    stage: &mut S,
    path: &PrimPath,
    cfg: &MassPropertiesCfg,
) -> StageResult<()> {
    stage.apply_api(path, MASS_API)?;
    write_mass_attrs(stage, path, cfg)
}

/// Apply the articulation root API to one prim and author the
/// configured settings there.
pub fn apply_articulation_root_properties<S: Stage>(
    stage: &mut S,
    path: &PrimPath,
    cfg: &ArticulationRootPropertiesCfg,
) -> StageResult<()> {
    stage.apply_api(path, ARTICULATION_ROOT_API)?;
    write_articulation_attrs(stage, path, cfg)
}

/// Author rigid body settings on the API-bearing prims of a subtree.
pub fn modify_rigid_body_properties<S: Stage>(
    stage: &mut S,
    root: &PrimPath,
    cfg: &RigidBodyPropertiesCfg,
) -> Result<ApplyReport, StageError> {
    apply_to_subtree(stage, root, "modify_rigid_body_properties", |stage, path| {
        if !stage.has_api(path, RIGID_BODY_API) {
            return Ok(false);
        }
        write_rigid_body_attrs(stage, path, cfg)?;
        Ok(true)
    })
}

/// Author collision settings on the API-bearing prims of a subtree.
pub fn modify_collision_properties<S: Stage>(
    stage: &mut S,
    root: &PrimPath,
    cfg: &CollisionPropertiesCfg,
) -> Result<ApplyReport, StageError> {
    apply_to_subtree(stage, root, "modify_collision_properties", |stage, path| {
        if !stage.has_api(path, COLLISION_API) {
            return Ok(false);
        }
        write_collision_attrs(stage, path, cfg)?;
        Ok(true)
    })
}

/// Author mass settings on the API-bearing prims of a subtree.
pub fn modify_mass_properties<S: Stage>(
    stage: &mut S,
    root: &PrimPath,
    cfg: &MassPropertiesCfg,
) -> Result<ApplyReport, StageError> {
    apply_to_subtree(stage, root, "modify_mass_properties", |stage, path| {
        if !stage.has_api(path, MASS_API) {
            return Ok(false);
        }
        write_mass_attrs(stage, path, cfg)?;
        Ok(true)
    })
}

/// Author articulation root settings on the API-bearing prims of a
/// subtree.
pub fn modify_articulation_root_properties<S: Stage>(
    stage: &mut S,
    root: &PrimPath,
    cfg: &ArticulationRootPropertiesCfg,
) -> Result<ApplyReport, StageError> {
    apply_to_subtree(
        stage,
        root,
        "modify_articulation_root_properties",
        |stage, path| {
            if !stage.has_api(path, ARTICULATION_ROOT_API) {
                return Ok(false);
            }
            write_articulation_attrs(stage, path, cfg)?;
            Ok(true)
        },
    )
}

/// Enable contact reporting on a subtree's rigid bodies.
///
/// Walks down each branch to the first prim carrying the rigid body
/// API, gives it the contact report API and the minimum force
/// threshold, and prunes below it.
pub fn activate_contact_sensors<S: Stage>(
    stage: &mut S,
    root: &PrimPath,
    threshold: f32,
) -> Result<ApplyReport, StageError> {
    apply_to_subtree(stage, root, "activate_contact_sensors", |stage, path| {
        if !stage.has_api(path, RIGID_BODY_API) {
            return Ok(false);
        }
        stage.apply_api(path, CONTACT_REPORT_API)?;
        stage.set_attribute(path, CONTACT_THRESHOLD_ATTR, Value::Float(threshold))?;
        Ok(true)
    })
}
