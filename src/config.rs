//! Simulation tuning.
//!
//! Every field is optional when deserialized; omitted fields fall back to the
//! defaults below. Field names are camelCase on the wire:
//!
//! ```json
//! { "alphaDecay": 0.05, "chargeStrength": -60, "centerX": 400, "centerY": 300 }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_LINK_DISTANCE: f64 = 30.0;

/// Alpha decay that takes alpha from 1 to 0.001 in 300 ticks.
pub fn default_alpha_decay() -> f64 {
    1.0 - 0.001_f64.powf(1.0 / 300.0)
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct SimulationConfig {
    pub alpha_start: f64,
    pub alpha_min: f64,
    pub alpha_decay: f64,
    pub alpha_target: f64,
    /// Fraction of velocity kept after each tick.
    pub velocity_decay: f64,
    /// Barnes-Hut opening threshold.
    pub theta: f64,
    /// Fixed rest length for every link. When absent each link rests at the sum
    /// of its endpoint radii plus [`DEFAULT_LINK_DISTANCE`].
    pub link_distance: Option<f64>,
    pub link_iterations: usize,
    /// Negative repels, positive attracts.
    pub charge_strength: f64,
    pub charge_distance_min: f64,
    pub charge_distance_max: Option<f64>,
    /// Collision passes per tick. Zero disables collision.
    pub collision_iterations: usize,
    pub collision_strength: f64,
    /// Centering is only active when at least one of `center_x`/`center_y` is set.
    pub center_x: Option<f64>,
    pub center_y: Option<f64>,
    pub center_strength: f64,
    /// Alpha a cooled simulation is reheated to when a drag starts.
    pub drag_reheat_alpha: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            alpha_start: 1.0,
            alpha_min: 0.001,
            alpha_decay: default_alpha_decay(),
            alpha_target: 0.0,
            velocity_decay: 0.6,
            theta: 0.9,
            link_distance: None,
            link_iterations: 1,
            charge_strength: -30.0,
            charge_distance_min: 1.0,
            charge_distance_max: None,
            collision_iterations: 1,
            collision_strength: 0.7,
            center_x: None,
            center_y: None,
            center_strength: 1.0,
            drag_reheat_alpha: 0.3,
        }
    }
}

impl SimulationConfig {
    pub fn with_center(mut self, x: f64, y: f64) -> Self {
        self.center_x = Some(x);
        self.center_y = Some(y);
        self
    }

    pub fn with_charge_strength(mut self, strength: f64) -> Self {
        self.charge_strength = strength;
        self
    }

    pub fn with_link_distance(mut self, distance: f64) -> Self {
        self.link_distance = Some(distance);
        self
    }

    /// Point the center force pulls towards, if centering is enabled.
    pub fn center(&self) -> Option<(f64, f64)> {
        if self.center_x.is_none() && self.center_y.is_none() {
            return None;
        }
        Some((self.center_x.unwrap_or(0.0), self.center_y.unwrap_or(0.0)))
    }

    pub fn validate(&self) -> Result<()> {
        unit_interval("alphaStart", self.alpha_start)?;
        unit_interval("alphaMin", self.alpha_min)?;
        finite("alphaDecay", self.alpha_decay)?;
        if self.alpha_decay <= 0.0 || self.alpha_decay > 1.0 {
            return Err(Error::invalid_config(
                "alphaDecay",
                format!("{} is outside (0, 1]", self.alpha_decay),
            ));
        }
        unit_interval("alphaTarget", self.alpha_target)?;
        if self.alpha_target > self.alpha_start {
            return Err(Error::invalid_config(
                "alphaTarget",
                format!(
                    "{} exceeds alphaStart {}",
                    self.alpha_target, self.alpha_start
                ),
            ));
        }
        unit_interval("velocityDecay", self.velocity_decay)?;
        positive("theta", self.theta)?;
        if let Some(distance) = self.link_distance {
            positive("linkDistance", distance)?;
        }
        if self.link_iterations == 0 {
            return Err(Error::invalid_config("linkIterations", "must be at least 1"));
        }
        finite("chargeStrength", self.charge_strength)?;
        positive("chargeDistanceMin", self.charge_distance_min)?;
        if let Some(max) = self.charge_distance_max {
            finite("chargeDistanceMax", max)?;
            if max <= self.charge_distance_min {
                return Err(Error::invalid_config(
                    "chargeDistanceMax",
                    format!(
                        "{max} must exceed chargeDistanceMin {}",
                        self.charge_distance_min
                    ),
                ));
            }
        }
        unit_interval("collisionStrength", self.collision_strength)?;
        if let Some(x) = self.center_x {
            finite("centerX", x)?;
        }
        if let Some(y) = self.center_y {
            finite("centerY", y)?;
        }
        unit_interval("centerStrength", self.center_strength)?;
        unit_interval("dragReheatAlpha", self.drag_reheat_alpha)?;
        if self.drag_reheat_alpha < self.alpha_target {
            return Err(Error::invalid_config(
                "dragReheatAlpha",
                format!(
                    "{} is below alphaTarget {}",
                    self.drag_reheat_alpha, self.alpha_target
                ),
            ));
        }
        Ok(())
    }
}

fn finite(field: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Error::invalid_config(field, format!("{value} is not finite")))
    }
}

fn positive(field: &str, value: f64) -> Result<()> {
    finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(Error::invalid_config(field, format!("{value} must be positive")))
    }
}

fn unit_interval(field: &str, value: f64) -> Result<()> {
    finite(field, value)?;
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::invalid_config(
            field,
            format!("{value} is outside [0, 1]"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_decay_cools_in_three_hundred_ticks() {
        let decay = default_alpha_decay();
        assert!((decay - 0.0228).abs() < 1e-4);
        let alpha = (1.0 - decay).powi(300);
        assert!((alpha - 0.001).abs() < 1e-9);
    }

    #[test]
    fn defaults_are_valid() {
        assert_eq!(SimulationConfig::default().validate(), Ok(()));
    }

    #[test]
    fn omitted_fields_fall_back_to_defaults() {
        let config: SimulationConfig =
            serde_json::from_str(r#"{ "chargeStrength": -80, "centerX": 5 }"#).unwrap();
        assert_eq!(config.charge_strength, -80.0);
        assert_eq!(config.velocity_decay, 0.6);
        assert_eq!(config.center(), Some((5.0, 0.0)));
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn rejects_alpha_decay_outside_unit_interval() {
        for decay in [0.0, -0.1, 1.5, f64::NAN] {
            let config = SimulationConfig {
                alpha_decay: decay,
                ..Default::default()
            };
            assert!(matches!(
                config.validate(),
                Err(Error::InvalidConfig { ref field, .. }) if field == "alphaDecay"
            ));
        }

        let config = SimulationConfig {
            alpha_decay: 1.0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn rejects_target_above_start() {
        let config = SimulationConfig {
            alpha_start: 0.5,
            alpha_target: 0.6,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidConfig { ref field, .. }) if field == "alphaTarget"
        ));
    }

    #[test]
    fn rejects_reheat_below_target() {
        let config = SimulationConfig {
            alpha_target: 0.4,
            drag_reheat_alpha: 0.2,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidConfig { ref field, .. }) if field == "dragReheatAlpha"
        ));

        let config = SimulationConfig {
            alpha_target: 0.3,
            ..Default::default()
        };
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn rejects_inverted_charge_distance_bounds() {
        let config = SimulationConfig {
            charge_distance_min: 10.0,
            charge_distance_max: Some(5.0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let parsed = serde_json::from_str::<SimulationConfig>(r#"{ "alphaDeacy": 0.1 }"#);
        assert!(parsed.is_err());
    }
}
