/// Stylized ↔ realistic scale blend.
///
/// A single factor in [0, 1] drives every radius and distance in the
/// orbital model. Toggling animates towards the opposite endpoint from
/// wherever the blend currently is, so a double press reverses smoothly
/// instead of popping.

use crate::core::config::ScaleConfig;
use crate::extensions::easing::Easing;
use crate::extensions::tween::Tween;
use crate::sim::orbit::OrbitalModel;

#[derive(Debug, Clone)]
pub struct ScaleController {
    blend: f64,
    animation: Option<Tween>,
    duration: f64,
    easing: Easing,
}

impl ScaleController {
    pub fn new(config: &ScaleConfig) -> Self {
        Self {
            blend: config.initial_blend.clamp(0.0, 1.0),
            animation: None,
            duration: config.transition_secs,
            easing: config.easing,
        }
    }

    pub fn blend(&self) -> f64 {
        self.blend
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Endpoint the blend is at or heading for.
    pub fn target(&self) -> f64 {
        match &self.animation {
            Some(tween) => tween.to,
            None => self.blend.round(),
        }
    }

    /// Jump straight to `blend` (clamped), cancelling any animation.
    pub fn set_blend(&mut self, blend: f64, model: &mut OrbitalModel) {
        self.animation = None;
        self.blend = if blend.is_nan() { 0.0 } else { blend.clamp(0.0, 1.0) };
        model.apply_blend(self.blend);
    }

    /// Start animating towards the other endpoint.
    pub fn toggle(&mut self) {
        let to = if self.target() >= 0.5 { 0.0 } else { 1.0 };
        log::debug!("scale: blending {:.3} -> {}", self.blend, to);
        self.animation = Some(Tween::new(self.blend, to, self.duration, self.easing));
    }

    /// Advance the animation and push the blend into the model.
    pub fn tick(&mut self, dt: f64, model: &mut OrbitalModel) {
        let Some(tween) = &mut self.animation else { return };
        tween.tick(dt);
        self.blend = tween.value().clamp(0.0, 1.0);
        if tween.is_complete() {
            self.animation = None;
        }
        model.apply_blend(self.blend);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimConfig;
    use crate::core::scene::SceneGraph;

    fn setup() -> (ScaleController, OrbitalModel) {
        let config = SimConfig::default();
        let mut graph = SceneGraph::new();
        let model = OrbitalModel::build(&config, &mut graph).unwrap();
        (ScaleController::new(&config.scale), model)
    }

    fn assert_within_endpoints(model: &OrbitalModel) {
        for body in model.bodies() {
            let r = body.current_radius;
            assert!(r >= body.radius.min() && r <= body.radius.max(), "{} radius {r}", body.name);
            if let Some(orbit) = &body.orbit {
                let d = orbit.current_distance;
                assert!(d >= orbit.distance.min() && d <= orbit.distance.max());
            }
        }
    }

    #[test]
    fn set_blend_clamps_and_keeps_lengths_in_range() {
        let (mut scale, mut model) = setup();
        for v in [-3.0, 0.0, 0.25, 0.999, 1.0, 7.5, f64::NAN] {
            scale.set_blend(v, &mut model);
            assert!((0.0..=1.0).contains(&scale.blend()));
            assert_within_endpoints(&model);
        }
    }

    #[test]
    fn toggle_reaches_realistic_endpoint() {
        let (mut scale, mut model) = setup();
        scale.toggle();
        for _ in 0..200 {
            scale.tick(1.0 / 60.0, &mut model);
        }
        assert!(!scale.is_animating());
        assert_eq!(scale.blend(), 1.0);
        assert_within_endpoints(&model);
    }

    #[test]
    fn toggle_mid_animation_reverses_from_current_value() {
        let (mut scale, mut model) = setup();
        scale.toggle();
        for _ in 0..30 {
            scale.tick(1.0 / 60.0, &mut model);
        }
        let mid = scale.blend();
        assert!(mid > 0.0 && mid < 1.0);

        scale.toggle();
        assert_eq!(scale.target(), 0.0);
        scale.tick(1.0 / 60.0, &mut model);
        // No pop: the first reversed step stays close to where we were.
        assert!((scale.blend() - mid).abs() < 0.05);
        assert!(scale.blend() <= mid);

        for _ in 0..200 {
            scale.tick(1.0 / 60.0, &mut model);
        }
        assert_eq!(scale.blend(), 0.0);
    }
}
