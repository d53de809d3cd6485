use crate::core::dynamics::NodalDofs;
use crate::math::{Real, Vector};

bitflags::bitflags! {
    pub struct NodeFlags: u32 {
        const NONE = 0;
        const ACTIVE = 1 << 0;
    }
}

/// Identity of one enrichment field at a node. Interface fields are keyed by
/// the particle material, discontinuity fields by the level-set column and
/// side, so the two id spaces can never collide when both modes are enabled.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EnrichmentId {
    Interface(usize),
    Side { column: usize, negative: bool },
}

/// Per-material accumulators of an enriched (interface/discontinuity) node,
/// plus the contact quantities derived from them.
///
/// Contact quantities stay at their zero-initialized state when the node
/// ends up with a single material for the step.
#[derive(Clone, Debug)]
pub struct MaterialNodeDofs {
    pub material: EnrichmentId,
    pub dofs: NodalDofs,
    /// Mass-weighted mapped displacement of this material at the node.
    pub displacement: Vector<Real>,
    /// Volume-weighted shape-gradient contributions of this material.
    pub domain_gradient: Vector<Real>,
    /// Unconstrained change in momentum over the step (post-force,
    /// pre-constraint).
    pub momentum_change: Vector<Real>,
    /// Relative displacement of the other materials w.r.t. this one.
    pub separation: Vector<Real>,
    /// Unit outward normal of the local contact surface; zero when the
    /// domain gradient was too small to normalize.
    pub normal: Vector<Real>,
}

impl MaterialNodeDofs {
    pub fn new(material: EnrichmentId) -> Self {
        Self {
            material,
            dofs: NodalDofs::default(),
            displacement: na::zero(),
            domain_gradient: na::zero(),
            momentum_change: na::zero(),
            separation: na::zero(),
            normal: na::zero(),
        }
    }
}

/// One node of the background mesh, as seen by a single partition.
///
/// Nodes are re-initialized to zero every step before re-accumulation; they
/// hold no state across steps except topology.
#[derive(Clone, Debug)]
pub struct MeshNode {
    pub dofs: NodalDofs,
    pub flags: NodeFlags,
    /// Enrichment storage, one entry per material id present at this node.
    /// Populated only in interface/discontinuity mode.
    pub materials: Vec<MaterialNodeDofs>,
}

impl Default for MeshNode {
    fn default() -> Self {
        Self {
            dofs: NodalDofs::default(),
            flags: NodeFlags::NONE,
            materials: vec![],
        }
    }
}

impl MeshNode {
    pub fn reset(&mut self) {
        self.dofs.reset();
        self.flags = NodeFlags::NONE;
        self.materials.clear();
    }

    pub fn active(&self) -> bool {
        self.flags.contains(NodeFlags::ACTIVE)
    }

    pub fn set_active(&mut self, active: bool) {
        self.flags.set(NodeFlags::ACTIVE, active);
    }

    /// Tags `material` as present at this node, returning its entry.
    pub fn tag_material(&mut self, material: EnrichmentId) -> &mut MaterialNodeDofs {
        if let Some(i) = self.materials.iter().position(|e| e.material == material) {
            &mut self.materials[i]
        } else {
            self.materials.push(MaterialNodeDofs::new(material));
            self.materials.last_mut().unwrap()
        }
    }

    /// The entry for `material`, if this node was tagged with it.
    ///
    /// Unlike [`MeshNode::tag_material`] this never allocates, so it is safe
    /// to call from the concurrent force-mapping tasks once tagging is done.
    pub fn material_entry(&mut self, material: EnrichmentId) -> Option<&mut MaterialNodeDofs> {
        self.materials
            .iter_mut()
            .find(|e| e.material == material)
    }

    pub fn material_entry_ref(&self, material: EnrichmentId) -> Option<&MaterialNodeDofs> {
        self.materials.iter().find(|e| e.material == material)
    }

    /// Whether more than one material is present at this node.
    pub fn multimaterial(&self) -> bool {
        self.materials.len() > 1
    }
}

#[cfg(test)]
mod test {
    use super::{EnrichmentId, MeshNode, NodeFlags};

    #[test]
    fn reset_clears_activation_and_enrichment() {
        let mut node = MeshNode::default();
        node.set_active(true);
        node.tag_material(EnrichmentId::Interface(0)).dofs.mass = 1.0;
        node.tag_material(EnrichmentId::Interface(1));
        assert!(node.multimaterial());

        node.reset();
        assert_eq!(node.flags, NodeFlags::NONE);
        assert!(node.materials.is_empty());
        assert_eq!(node.dofs.mass, 0.0);
    }

    #[test]
    fn tagging_is_idempotent_per_material() {
        let mut node = MeshNode::default();
        node.tag_material(EnrichmentId::Interface(2));
        node.tag_material(EnrichmentId::Interface(2));
        node.tag_material(EnrichmentId::Interface(5));
        assert_eq!(node.materials.len(), 2);
        assert!(node.material_entry(EnrichmentId::Interface(5)).is_some());
        assert!(node.material_entry(EnrichmentId::Interface(4)).is_none());
    }

    #[test]
    fn interface_and_side_ids_never_alias() {
        let mut node = MeshNode::default();
        node.tag_material(EnrichmentId::Interface(0));
        node.tag_material(EnrichmentId::Side {
            column: 0,
            negative: false,
        });
        assert_eq!(node.materials.len(), 2);
        assert!(node
            .material_entry(EnrichmentId::Side {
                column: 0,
                negative: false,
            })
            .is_some());
    }
}
