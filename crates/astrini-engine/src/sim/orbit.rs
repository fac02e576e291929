/// Closed-form placement of bodies on their spins and orbits.
///
/// Every angle is a periodic function of the Julian day, so placing the same
/// instant twice gives the same transforms. f64 throughout: Julian days are
/// in the millions and the scaled angle reaches ~1e9 degrees before the
/// modulo.

use glam::{DQuat, DVec3};

use crate::api::types::{BodyId, NodeId};
use crate::core::config::{BodyConfig, ConfigError, InclinationMode, Scaled, SimConfig};
use crate::core::scene::{LocalTransform, SceneGraph};

/// Spin angle in degrees: the period is applied before the modulo so very
/// large day counts keep their fractional part.
pub fn spin_angle(spin_period: f64, spin_offset: f64, julian_day: f64) -> f64 {
    ((360.0 / spin_period) * julian_day).rem_euclid(360.0) + spin_offset
}

/// Orbit angle in degrees, same construction as [`spin_angle`].
pub fn orbit_angle(orbit_period: f64, orbit_offset: f64, julian_day: f64) -> f64 {
    ((360.0 / orbit_period) * julian_day).rem_euclid(360.0) + orbit_offset
}

/// Angles of one body at one instant, degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Angles {
    pub spin: f64,
    pub orbit: Option<f64>,
}

#[derive(Debug, Clone, Copy)]
struct OrbitNodes {
    /// Compass node carrying the orbital inclination.
    plane: NodeId,
    /// Rotated by the orbit angle about the parent.
    root: NodeId,
}

#[derive(Debug, Clone)]
pub struct Orbit {
    pub parent: Option<BodyId>,
    pub period: f64,
    pub offset: f64,
    pub distance: Scaled,
    /// Distance at the current scale blend.
    pub current_distance: f64,
    pub inclination: f64,
    pub inclination_exaggerated: f64,
    pub mode: InclinationMode,
}

impl Orbit {
    /// Plane inclination in degrees for the active mode.
    pub fn active_inclination(&self) -> f64 {
        match self.mode {
            InclinationMode::Flat => 0.0,
            InclinationMode::Real => self.inclination,
            InclinationMode::Exaggerated => self.inclination_exaggerated,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Body {
    pub name: String,
    pub radius: Scaled,
    /// Radius at the current scale blend.
    pub current_radius: f64,
    pub spin_period: f64,
    pub spin_offset: f64,
    pub axial_tilt: f64,
    pub tilted: bool,
    pub orbit: Option<Orbit>,
    orbit_nodes: Option<OrbitNodes>,
    /// Carries the body along its orbit; children's planes hang here.
    system: NodeId,
    /// World-fixed orientation (the axial tilt).
    compass: NodeId,
    /// The visible, spinning mesh.
    mesh: NodeId,
}

impl Body {
    pub fn angles(&self, julian_day: f64) -> Angles {
        Angles {
            spin: spin_angle(self.spin_period, self.spin_offset, julian_day),
            orbit: self
                .orbit
                .as_ref()
                .map(|o| orbit_angle(o.period, o.offset, julian_day)),
        }
    }

    pub fn system_node(&self) -> NodeId {
        self.system
    }

    pub fn compass_node(&self) -> NodeId {
        self.compass
    }

    pub fn mesh_node(&self) -> NodeId {
        self.mesh
    }

    /// Degrees of world-fixed tilt currently applied.
    pub fn active_tilt(&self) -> f64 {
        if self.tilted { self.axial_tilt } else { 0.0 }
    }
}

/// All bodies and the scene nodes they own.
#[derive(Debug, Clone)]
pub struct OrbitalModel {
    bodies: Vec<Body>,
}

impl OrbitalModel {
    /// Validate the configuration and create every body's node chain.
    pub fn build(config: &SimConfig, graph: &mut SceneGraph) -> Result<Self, ConfigError> {
        config.validate()?;
        let blend = config.scale.initial_blend;
        let mut model = Self { bodies: Vec::with_capacity(config.bodies.len()) };
        for body in &config.bodies {
            let built = model.build_body(body, blend, graph)?;
            model.bodies.push(built);
        }
        log::info!("orbit: built {} bodies, {} scene nodes", model.bodies.len(), graph.len());
        Ok(model)
    }

    fn build_body(
        &self,
        config: &BodyConfig,
        blend: f64,
        graph: &mut SceneGraph,
    ) -> Result<Body, ConfigError> {

        let (orbit, orbit_nodes, system) = match &config.orbit {
            Some(o) => {
                let parent = match &o.parent {
                    Some(p) => Some(self.find(p).ok_or_else(|| ConfigError::UnknownParent {
                        body: config.name.clone(),
                        parent: p.clone(),
                    })?),
                    None => None,
                };
                let anchor = parent.map(|p| self.bodies[p.index()].system);
                let plane = graph.add_compass(anchor, LocalTransform::new());
                let root = graph.add(Some(plane), LocalTransform::new());
                let current_distance = o.distance.at(blend);
                let system = graph.add(
                    Some(root),
                    LocalTransform::new().with_offset(DVec3::new(current_distance, 0.0, 0.0)),
                );
                let orbit = Orbit {
                    parent,
                    period: o.period,
                    offset: o.offset,
                    distance: o.distance,
                    current_distance,
                    inclination: o.inclination,
                    inclination_exaggerated: o.inclination_exaggerated,
                    mode: o.inclination_mode,
                };
                (Some(orbit), Some(OrbitNodes { plane, root }), system)
            }
            None => {
                let system = graph.add(None, LocalTransform::new());
                (None, None, system)
            }
        };

        let compass = graph.add_compass(Some(system), LocalTransform::new());
        let current_radius = config.radius.at(blend);
        let mesh = graph.add(Some(compass), LocalTransform::new().with_scale(current_radius));
        graph.set_renderable(mesh, true);

        Ok(Body {
            name: config.name.clone(),
            radius: config.radius,
            current_radius,
            spin_period: config.spin_period,
            spin_offset: config.spin_offset,
            axial_tilt: config.axial_tilt,
            tilted: config.tilted,
            orbit,
            orbit_nodes,
            system,
            compass,
            mesh,
        })
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = BodyId> {
        (0..self.bodies.len() as u32).map(BodyId)
    }

    pub fn find(&self, name: &str) -> Option<BodyId> {
        self.bodies
            .iter()
            .position(|b| b.name == name)
            .map(|i| BodyId(i as u32))
    }

    /// Angles of every body at `julian_day`. Pure.
    pub fn angles(&self, julian_day: f64) -> Vec<Angles> {
        self.bodies.iter().map(|b| b.angles(julian_day)).collect()
    }

    /// Write every body's transforms for `julian_day` into the graph.
    pub fn place(&self, julian_day: f64, graph: &mut SceneGraph) {
        for body in &self.bodies {
            let angles = body.angles(julian_day);

            if let (Some(orbit), Some(nodes), Some(orbit_deg)) =
                (&body.orbit, body.orbit_nodes, angles.orbit)
            {
                let plane = DQuat::from_rotation_x(orbit.active_inclination().to_radians());
                graph.set_local(nodes.plane, LocalTransform::new().with_rotation(plane));
                let spin = DQuat::from_rotation_z(orbit_deg.to_radians());
                graph.set_local(nodes.root, LocalTransform::new().with_rotation(spin));
                graph.set_local(
                    body.system,
                    LocalTransform::new().with_offset(DVec3::new(orbit.current_distance, 0.0, 0.0)),
                );
            }

            let tilt = DQuat::from_rotation_x(body.active_tilt().to_radians());
            graph.set_local(body.compass, LocalTransform::new().with_rotation(tilt));
            graph.set_local(
                body.mesh,
                LocalTransform::new()
                    .with_rotation(DQuat::from_rotation_z(angles.spin.to_radians()))
                    .with_scale(body.current_radius),
            );
        }
    }

    /// Recompute every radius and distance for a scale blend in [0, 1].
    pub fn apply_blend(&mut self, blend: f64) {
        for body in &mut self.bodies {
            body.current_radius = body.radius.at(blend);
            if let Some(orbit) = &mut body.orbit {
                orbit.current_distance = orbit.distance.at(blend);
            }
        }
    }

    /// World position of a body's centre as of the last propagate.
    pub fn world_position(&self, id: BodyId, graph: &SceneGraph) -> Option<DVec3> {
        self.body(id).and_then(|b| graph.world_position(b.mesh))
    }

    /// Flip a body's axial tilt. Returns the new state.
    pub fn toggle_tilt(&mut self, id: BodyId) -> Option<bool> {
        let body = self.bodies.get_mut(id.index())?;
        body.tilted = !body.tilted;
        log::debug!("orbit: {} tilt {}", body.name, if body.tilted { "on" } else { "off" });
        Some(body.tilted)
    }

    /// Switch a body's orbital plane to the real (or, with `hard`, the
    /// exaggerated) inclination; asking for the active mode flattens it.
    pub fn toggle_inclination(&mut self, id: BodyId, hard: bool) -> Option<InclinationMode> {
        let body = self.bodies.get_mut(id.index())?;
        let orbit = body.orbit.as_mut()?;
        let wanted = if hard { InclinationMode::Exaggerated } else { InclinationMode::Real };
        orbit.mode = if orbit.mode == wanted { InclinationMode::Flat } else { wanted };
        log::debug!("orbit: {} inclination {:?}", body.name, orbit.mode);
        Some(orbit.mode)
    }
}
