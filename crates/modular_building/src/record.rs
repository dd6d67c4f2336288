//! Persisted form of an assembly: its type and parts list, nothing derived.
//!
//! Slots, sockets and adjacency are recomputed on load, so a record only carries
//! `(part type, position, orientation)` per part. Two encodings are offered:
//! serde derives (behind the `serde` feature) and a fixed little-endian binary layout:
//!
//! ```text
//! u32 assembly_type
//! u32 part_count
//! part_count x { u32 part_type, f32 x, f32 y, f32 z, f32 qx, f32 qy, f32 qz, f32 qw }
//! ```
use std::io::{Read, Write};
use std::sync::Arc;

use glam::{Quat, Vec3};
use mint::{Quaternion, Vector3};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::assembly::{Assembly, AssemblyConfig, Part, RebuildSummary};
use crate::catalog::{AssemblyTypeId, ConnectorCatalog, PartTypeId};
use crate::error::{Error, Result};
use crate::transform::Transform;

const PART_RECORD_BYTES: usize = 4 + 3 * 4 + 4 * 4;

/// A single persisted part.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PartRecord {
    pub part_type: PartTypeId,
    pub position: Vector3<f32>,
    pub orientation: Quaternion<f32>,
}

impl PartRecord {
    pub fn transform(&self) -> Transform {
        Transform::new(Vec3::from(self.position), Quat::from(self.orientation))
    }
}

impl From<&Part> for PartRecord {
    fn from(part: &Part) -> Self {
        Self {
            part_type: part.part_type,
            position: part.transform.position.into(),
            orientation: part.transform.orientation.into(),
        }
    }
}

impl From<&PartRecord> for Part {
    fn from(record: &PartRecord) -> Self {
        Part::new(record.part_type, record.transform())
    }
}

/// A persisted assembly.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AssemblyRecord {
    pub assembly_type: AssemblyTypeId,
    pub parts: Vec<PartRecord>,
}

impl AssemblyRecord {
    pub fn from_assembly(assembly: &Assembly) -> Self {
        Self {
            assembly_type: assembly.assembly_type(),
            parts: assembly.parts().iter().map(PartRecord::from).collect(),
        }
    }

    pub fn to_parts(&self) -> Vec<Part> {
        self.parts.iter().map(Part::from).collect()
    }

    /// Builds a fresh assembly and rebuilds it once. The anchor is the first part's
    /// transform, or the identity for an empty record.
    pub fn into_assembly(
        &self,
        catalog: Arc<ConnectorCatalog>,
        config: AssemblyConfig,
    ) -> Result<Assembly> {
        let anchor = self
            .parts
            .first()
            .map(PartRecord::transform)
            .unwrap_or(Transform::IDENTITY);
        let mut assembly = Assembly::try_new(self.assembly_type, anchor, catalog, config)?;
        assembly.replace_parts(self.to_parts());
        assembly.rebuild()?;
        Ok(assembly)
    }

    /// Replaces the parts of an existing assembly with this record's parts and
    /// rebuilds. Fails without changes if a part type is not in the assembly's catalog.
    pub fn restore_parts(&self, assembly: &mut Assembly) -> Result<RebuildSummary> {
        if let Some(unknown) = self
            .parts
            .iter()
            .find(|p| !assembly.catalog().contains(p.part_type))
        {
            return Err(Error::UnknownPartType(unknown.part_type));
        }
        assembly.replace_parts(self.to_parts());
        assembly.rebuild()
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        let count = u32::try_from(self.parts.len())
            .map_err(|_| Error::Decode(format!("too many parts: {}", self.parts.len())))?;
        writer.write_all(&self.assembly_type.to_le_bytes())?;
        writer.write_all(&count.to_le_bytes())?;
        for part in &self.parts {
            let p = part.position;
            let q = part.orientation;
            writer.write_all(&part.part_type.to_le_bytes())?;
            for value in [p.x, p.y, p.z, q.v.x, q.v.y, q.v.z, q.s] {
                writer.write_all(&value.to_le_bytes())?;
            }
        }
        Ok(())
    }

    /// Reads one record. A stream that ends early yields [`Error::Io`].
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let assembly_type = read_u32(reader)?;
        let count = read_u32(reader)? as usize;
        // The count is untrusted; let the vector grow past this as parts actually arrive.
        let mut parts = Vec::with_capacity(count.min(4096));
        let mut buf = [0u8; PART_RECORD_BYTES];
        for i in 0..count {
            reader.read_exact(&mut buf)?;
            let f = |at: usize| f32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]]);
            let part_type = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
            let values = [f(4), f(8), f(12), f(16), f(20), f(24), f(28)];
            if values.iter().any(|v| !v.is_finite()) {
                return Err(Error::Decode(format!("part {i} has a non-finite transform")));
            }
            parts.push(PartRecord {
                part_type,
                position: Vector3 {
                    x: values[0],
                    y: values[1],
                    z: values[2],
                },
                orientation: Quaternion {
                    v: Vector3 {
                        x: values[3],
                        y: values[4],
                        z: values[5],
                    },
                    s: values[6],
                },
            });
        }
        Ok(Self {
            assembly_type,
            parts,
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(8 + self.parts.len() * PART_RECORD_BYTES);
        self.write_to(&mut out)?;
        Ok(out)
    }

    /// Decodes a record that must span all of `bytes`.
    pub fn from_bytes(mut bytes: &[u8]) -> Result<Self> {
        let record = Self::read_from(&mut bytes)?;
        if !bytes.is_empty() {
            return Err(Error::Decode(format!(
                "{} trailing bytes after record",
                bytes.len()
            )));
        }
        Ok(record)
    }
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use glam::Vec3;

    use super::*;
    use crate::catalog::testing::*;
    use crate::connector::Occupancy;
    use crate::error::ErrorKind;

    fn small_house() -> Assembly {
        let mut assembly = Assembly::new(7, Transform::from_position(Vec3::new(1.0, 0.0, 2.0)), catalog());
        assembly.add_part(FOUNDATION, None).unwrap();
        assembly.rebuild().unwrap();
        for ordinal in [NORTH_WALL, EAST_WALL, SOUTH_WALL, NORTH_NEIGHBOUR] {
            let slot = assembly.slots_of(0)[ordinal];
            let part_type = if ordinal == NORTH_NEIGHBOUR { FOUNDATION } else { WALL };
            assembly.add_part(part_type, Some(&slot)).unwrap();
        }
        assembly.rebuild().unwrap();
        assembly
    }

    fn occupancy(assembly: &Assembly) -> Vec<Occupancy> {
        assembly.graph().adjacency().map(|(_, o)| o).collect()
    }

    #[test]
    fn binary_round_trip_restores_adjacency() {
        let original = small_house();
        let bytes = AssemblyRecord::from_assembly(&original).to_bytes().unwrap();
        assert_eq!(bytes.len(), 8 + original.len() * PART_RECORD_BYTES);

        let record = AssemblyRecord::from_bytes(&bytes).unwrap();
        assert_eq!(record.assembly_type, 7);
        let loaded = record
            .into_assembly(catalog(), AssemblyConfig::default())
            .unwrap();
        assert!(loaded.is_clean());
        assert_eq!(loaded.parts(), original.parts());
        assert_eq!(occupancy(&loaded), occupancy(&original));
        assert_eq!(loaded.anchor(), original.anchor());
    }

    #[test]
    fn layout_is_little_endian_xyzw() {
        let record = AssemblyRecord {
            assembly_type: 0x0102_0304,
            parts: vec![PartRecord::from(&Part::new(
                9,
                Transform::new(Vec3::new(1.0, 2.0, 3.0), Quat::from_xyzw(0.0, 0.0, 0.0, 1.0)),
            ))],
        };
        let bytes = record.to_bytes().unwrap();
        assert_eq!(&bytes[0..4], &[4, 3, 2, 1]);
        assert_eq!(&bytes[4..8], &1u32.to_le_bytes());
        assert_eq!(&bytes[8..12], &9u32.to_le_bytes());
        assert_eq!(&bytes[12..16], &1.0f32.to_le_bytes());
        assert_eq!(&bytes[20..24], &3.0f32.to_le_bytes());
        assert_eq!(&bytes[36..40], &1.0f32.to_le_bytes());
    }

    #[test]
    fn truncated_input_is_io_error() {
        let bytes = AssemblyRecord::from_assembly(&small_house()).to_bytes().unwrap();
        for cut in [0, 3, 8, bytes.len() - 1] {
            let err = AssemblyRecord::from_bytes(&bytes[..cut]).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Io, "cut at {cut}");
        }
    }

    #[test]
    fn trailing_bytes_are_decode_error() {
        let mut bytes = AssemblyRecord::from_assembly(&small_house()).to_bytes().unwrap();
        bytes.push(0);
        assert!(matches!(
            AssemblyRecord::from_bytes(&bytes),
            Err(Error::Decode(_))
        ));
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let mut bytes = AssemblyRecord::from_assembly(&small_house()).to_bytes().unwrap();
        bytes[12..16].copy_from_slice(&f32::NAN.to_le_bytes());
        assert!(matches!(
            AssemblyRecord::from_bytes(&bytes),
            Err(Error::Decode(_))
        ));
    }

    #[test]
    fn empty_record_loads_with_identity_anchor() {
        let record = AssemblyRecord {
            assembly_type: 3,
            parts: Vec::new(),
        };
        let loaded = AssemblyRecord::from_bytes(&record.to_bytes().unwrap())
            .unwrap()
            .into_assembly(catalog(), AssemblyConfig::default())
            .unwrap();
        assert!(loaded.is_empty());
        assert!(loaded.is_clean());
        assert_eq!(loaded.anchor(), Transform::IDENTITY);
    }

    #[test]
    fn restore_parts_replaces_and_rebuilds() {
        let source = small_house();
        let record = AssemblyRecord::from_assembly(&source);
        let mut target = Assembly::new(7, Transform::IDENTITY, catalog());
        target.add_part(WALL, None).unwrap();

        let summary = record.restore_parts(&mut target).unwrap();
        assert_eq!(summary.parts, source.len());
        assert_eq!(occupancy(&target), occupancy(&source));
    }

    #[test]
    fn restore_parts_with_unknown_type_changes_nothing() {
        let mut record = AssemblyRecord::from_assembly(&small_house());
        record.parts[2].part_type = UNKNOWN;
        let mut target = small_house();
        let before = target.parts().to_vec();
        assert!(matches!(
            record.restore_parts(&mut target),
            Err(Error::UnknownPartType(UNKNOWN))
        ));
        assert_eq!(target.parts(), before.as_slice());
        assert!(target.is_clean());
    }

    #[test]
    fn rotated_parts_survive_round_trip() {
        let part = Part::new(
            WALL,
            Transform::from_position_yaw(Vec3::new(-3.0, 0.5, 4.25), FRAC_PI_2),
        );
        let record = PartRecord::from(&part);
        assert_eq!(Part::from(&record), part);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_json_round_trip() {
        let record = AssemblyRecord::from_assembly(&small_house());
        let json = serde_json::to_string(&record).unwrap();
        let back: AssemblyRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
