//! Configuration for coalition formation.
//!
//! The [`FormationConfig`] struct bundles every tunable of the per-step
//! formation engine so that callers (tick cycle, tests) can override
//! defaults. The core crate builds it from the `formation` section of
//! `caucus-config.yaml`.

use serde::Deserialize;

/// Which coalition model a run uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoalitionModel {
    /// Flat, party-bound coalitions of actors with join/leave/dissolve
    /// transitions and incentive-weighted voting.
    #[default]
    Flat,
    /// Nested blocs: voters and blocs pair recursively until one bloc
    /// holds a strict majority.
    Nested,
}

/// Tunables for the flat formation engine applied each opinion-formation tick.
#[derive(Debug, Clone, PartialEq)]
pub struct FormationConfig {
    /// Join when `distance < join_factor * coalition_importance / actor_importance`
    /// (default: 0.05).
    pub join_factor: f64,

    /// Leave when `distance > leave_factor * coalition_importance / actor_importance`
    /// (default: 0.1).
    pub leave_factor: f64,

    /// Whether a joining actor must share the coalition's financial class
    /// (default: true).
    pub require_financial_match: bool,
}

impl Default for FormationConfig {
    fn default() -> Self {
        Self {
            join_factor: 0.05,
            leave_factor: 0.1,
            require_financial_match: true,
        }
    }
}

impl FormationConfig {
    /// Distance under which an actor joins a coalition.
    ///
    /// A zero-importance actor yields an infinite threshold; zero over zero
    /// yields NaN, which admits nothing.
    pub fn join_threshold(&self, coalition_importance: f64, actor_importance: f64) -> f64 {
        self.join_factor * coalition_importance / actor_importance
    }

    /// Distance over which an actor leaves its coalition.
    pub fn leave_threshold(&self, coalition_importance: f64, actor_importance: f64) -> f64 {
        self.leave_factor * coalition_importance / actor_importance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = FormationConfig::default();
        assert!((cfg.join_factor - 0.05).abs() < 1e-12);
        assert!((cfg.leave_factor - 0.1).abs() < 1e-12);
        assert!(cfg.require_financial_match);
        assert_eq!(CoalitionModel::default(), CoalitionModel::Flat);
    }

    #[test]
    fn thresholds_scale_with_relative_importance() {
        let cfg = FormationConfig::default();
        assert!((cfg.join_threshold(4.0, 1.0) - 0.2).abs() < 1e-12);
        assert!((cfg.leave_threshold(2.0, 4.0) - 0.05).abs() < 1e-12);
    }

    #[test]
    fn zero_importance_actor_never_leaves() {
        let cfg = FormationConfig::default();
        assert!(cfg.leave_threshold(1.0, 0.0).is_infinite());
        assert!(cfg.join_threshold(0.0, 0.0).is_nan());
    }
}
