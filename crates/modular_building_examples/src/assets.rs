//! RON catalog assets.
//!
//! Connector transforms are authored as a position plus a yaw in degrees, which is
//! all a grid-based building kit needs and keeps the files readable.
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use glam::Vec3;
use modular_building::prelude::*;
use serde::{Deserialize, Serialize};

/// Asset describing a complete [`ConnectorCatalog`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CatalogAsset {
    pub part_types: Vec<PartTypeDef>,
    #[serde(default)]
    pub rules: Vec<RuleDef>,
}

/// Part type definition within a [`CatalogAsset`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PartTypeDef {
    pub id: PartTypeId,
    pub name: String,
    #[serde(default)]
    pub can_start_assembly: bool,
    #[serde(default)]
    pub slots: Vec<ConnectorDef>,
    #[serde(default)]
    pub sockets: Vec<ConnectorDef>,
}

/// A slot or socket in part-local space.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ConnectorDef {
    pub connector_type: ConnectorType,
    pub position: (f32, f32, f32),
    #[serde(default)]
    pub yaw_degrees: f32,
    /// Only meaningful for slots.
    #[serde(default)]
    pub ignore_for_placement: bool,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct RuleDef {
    pub connector_type: ConnectorType,
    pub rule: RuleSpec,
}

impl ConnectorDef {
    fn local(&self) -> Transform {
        Transform::from_position_yaw(Vec3::from(self.position), self.yaw_degrees.to_radians())
    }
}

impl From<&PartTypeDef> for PartType {
    fn from(def: &PartTypeDef) -> Self {
        let mut template = ConnectorTemplate::new();
        for slot in &def.slots {
            let descriptor = SlotDescriptor::new(slot.connector_type, slot.local());
            template = template.with_slot(if slot.ignore_for_placement {
                descriptor.ignored_for_placement()
            } else {
                descriptor
            });
        }
        for socket in &def.sockets {
            template =
                template.with_socket(SocketDescriptor::new(socket.connector_type, socket.local()));
        }
        PartType::new(def.id, def.name.clone(), template)
            .with_can_start_assembly(def.can_start_assembly)
    }
}

impl TryFrom<&CatalogAsset> for ConnectorCatalog {
    type Error = Error;

    fn try_from(asset: &CatalogAsset) -> Result<Self> {
        let mut catalog = ConnectorCatalog::new();
        for def in &asset.part_types {
            catalog.register(def.into())?;
        }
        for rule in &asset.rules {
            catalog
                .rules_mut()
                .insert_spec(rule.connector_type, rule.rule);
        }
        Ok(catalog)
    }
}

impl CatalogAsset {
    pub fn from_ron_str(source: &str) -> anyhow::Result<Self> {
        ron::from_str(source).map_err(|e| anyhow::anyhow!(e))
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        ron::de::from_bytes(&bytes).map_err(|e| anyhow::anyhow!(e))
    }

    /// Validates every template and builds a shareable catalog.
    pub fn to_catalog(&self) -> anyhow::Result<Arc<ConnectorCatalog>> {
        Ok(Arc::new(ConnectorCatalog::try_from(self)?))
    }
}
