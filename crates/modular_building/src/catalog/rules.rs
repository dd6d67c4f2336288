//! Per-connector-type acceptance rules applied on top of type and distance matching.
//!
//! A rule sees the world transforms of a slot and a candidate socket that already
//! coincide and share a connector type, and decides whether they connect. Rules are
//! data: register them on [`crate::catalog::ConnectorCatalog`] per [`ConnectorType`],
//! or describe them with [`RuleSpec`] when catalogs are authored as assets.
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::connector::ConnectorType;
use crate::transform::Transform;

/// Predicate deciding whether a coincident slot/socket pair connects.
pub trait ConnectionRule: Send + Sync {
    fn accepts(&self, slot: &Transform, socket: &Transform) -> bool;
}

impl<F> ConnectionRule for F
where
    F: Fn(&Transform, &Transform) -> bool + Send + Sync,
{
    #[inline]
    fn accepts(&self, slot: &Transform, socket: &Transform) -> bool {
        (self)(slot, socket)
    }
}

/// Accepts pairs whose forward axes are parallel in either direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AlignedAxes {
    /// Minimum `|dot|` of the two forward axes, in [0, 1].
    pub min_abs_dot: f32,
}

impl AlignedAxes {
    pub fn new(min_abs_dot: f32) -> Self {
        Self { min_abs_dot }
    }
}

impl ConnectionRule for AlignedAxes {
    fn accepts(&self, slot: &Transform, socket: &Transform) -> bool {
        slot.forward().dot(socket.forward()).abs() >= self.min_abs_dot
    }
}

/// Accepts pairs whose forward axes point at each other.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Facing {
    /// Minimum `-dot` of the two forward axes, in [-1, 1].
    pub min_dot: f32,
}

impl Facing {
    pub fn new(min_dot: f32) -> Self {
        Self { min_dot }
    }
}

impl ConnectionRule for Facing {
    fn accepts(&self, slot: &Transform, socket: &Transform) -> bool {
        -slot.forward().dot(socket.forward()) >= self.min_dot
    }
}

/// Serializable description of a built-in rule.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RuleSpec {
    AlignedAxes { min_abs_dot: f32 },
    Facing { min_dot: f32 },
}

impl RuleSpec {
    pub fn build(self) -> Arc<dyn ConnectionRule> {
        match self {
            RuleSpec::AlignedAxes { min_abs_dot } => Arc::new(AlignedAxes::new(min_abs_dot)),
            RuleSpec::Facing { min_dot } => Arc::new(Facing::new(min_dot)),
        }
    }
}

/// Rules keyed by connector type. Types without a rule accept every coincident pair.
#[derive(Clone, Default)]
pub struct ConnectionRules {
    rules: HashMap<ConnectorType, Arc<dyn ConnectionRule>>,
}

impl ConnectionRules {
    pub fn new() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// Installs `rule` for `connector_type`, replacing any previous rule.
    pub fn insert<R>(&mut self, connector_type: ConnectorType, rule: R)
    where
        R: ConnectionRule + 'static,
    {
        self.rules.insert(connector_type, Arc::new(rule));
    }

    pub fn insert_arc(&mut self, connector_type: ConnectorType, rule: Arc<dyn ConnectionRule>) {
        self.rules.insert(connector_type, rule);
    }

    pub fn insert_spec(&mut self, connector_type: ConnectorType, spec: RuleSpec) {
        self.rules.insert(connector_type, spec.build());
    }

    pub fn remove(&mut self, connector_type: ConnectorType) -> bool {
        self.rules.remove(&connector_type).is_some()
    }

    pub fn contains(&self, connector_type: ConnectorType) -> bool {
        self.rules.contains_key(&connector_type)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    #[inline]
    pub fn accepts(
        &self,
        connector_type: ConnectorType,
        slot: &Transform,
        socket: &Transform,
    ) -> bool {
        match self.rules.get(&connector_type) {
            Some(rule) => rule.accepts(slot, socket),
            None => true,
        }
    }
}

impl fmt::Debug for ConnectionRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<_> = self.rules.keys().collect();
        types.sort();
        f.debug_struct("ConnectionRules")
            .field("types", &types)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::{FRAC_PI_2, PI};

    use glam::Vec3;

    use super::*;

    fn yawed(yaw: f32) -> Transform {
        Transform::from_position_yaw(Vec3::ZERO, yaw)
    }

    #[test]
    fn aligned_axes_accepts_parallel_and_antiparallel() {
        let rule = AlignedAxes::new(0.9);
        assert!(rule.accepts(&yawed(0.0), &yawed(0.0)));
        assert!(rule.accepts(&yawed(0.0), &yawed(PI)));
        assert!(!rule.accepts(&yawed(0.0), &yawed(FRAC_PI_2)));
    }

    #[test]
    fn facing_requires_opposed_axes() {
        let rule = Facing::new(0.9);
        assert!(rule.accepts(&yawed(0.0), &yawed(PI)));
        assert!(!rule.accepts(&yawed(0.0), &yawed(0.0)));
    }

    #[test]
    fn missing_rule_accepts_everything() {
        let rules = ConnectionRules::new();
        assert!(rules.accepts(ConnectorType::Wall, &yawed(0.0), &yawed(FRAC_PI_2)));
    }

    #[test]
    fn closures_and_specs_install_per_type() {
        let mut rules = ConnectionRules::new();
        rules.insert(ConnectorType::Floor, |_: &Transform, _: &Transform| false);
        rules.insert_spec(ConnectorType::Wall, RuleSpec::Facing { min_dot: 0.5 });
        assert_eq!(rules.len(), 2);
        assert!(!rules.accepts(ConnectorType::Floor, &yawed(0.0), &yawed(0.0)));
        assert!(rules.accepts(ConnectorType::Wall, &yawed(0.0), &yawed(PI)));
        assert!(rules.accepts(ConnectorType::Foundation, &yawed(0.0), &yawed(1.0)));
        assert!(rules.remove(ConnectorType::Floor));
        assert!(!rules.contains(ConnectorType::Floor));
    }
}
