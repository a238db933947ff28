//! NodeStore - the simulation's node array.
//!
//! Nodes are kept in SoA (Structure of Arrays) columns so the host can take
//! zero-copy views of positions and so each force walks only the columns it
//! needs. The root is always slot 0; stack nodes follow in dataset order.

use std::collections::HashMap;

use super::dataset::CloudDataset;
use super::node::{NodeId, NodeKind, NodeState};
use crate::error::{CloudError, Result};

/// The owned node array shared (by `&mut`) with every force in turn.
#[derive(Debug, Default)]
pub struct NodeStore {
    /// Host-facing ids, by slot.
    keys: Vec<String>,

    /// Map from host id to slot.
    key_to_id: HashMap<String, NodeId>,

    pub(crate) kinds: Vec<NodeKind>,

    /// Domain per slot (None for the root).
    pub(crate) domains: Vec<Option<String>>,

    /// Dataset radius at the reference viewport.
    pub(crate) base_radius: Vec<f32>,

    /// Current base radius (viewport-scaled).
    pub(crate) radius: Vec<f32>,

    /// Emphasis multiplier.
    pub(crate) scale: Vec<f32>,

    pub(crate) pos_x: Vec<f32>,
    pub(crate) pos_y: Vec<f32>,
    pub(crate) vel_x: Vec<f32>,
    pub(crate) vel_y: Vec<f32>,

    /// Seed angle, clockwise from 12 o'clock.
    pub(crate) angle_hint: Vec<f32>,

    pub(crate) states: Vec<NodeState>,

    icon_keys: Vec<Option<String>>,
    color_keys: Vec<Option<String>>,
}

impl NodeStore {
    /// Build the root plus one stack node per dataset entry.
    ///
    /// Positions start at the origin and radii at zero; the seeder fills them
    /// once a viewport is known.
    pub fn from_dataset(dataset: &CloudDataset) -> Result<Self> {
        let count = dataset.stacks.len() + 1;
        let mut store = Self::with_capacity(count);

        store.push(dataset.root_id().to_string(), NodeKind::Root, None, 0.0, None, None)?;
        store.states[0].set_pinned(true);

        for entry in &dataset.stacks {
            if entry.id == dataset.root_id() {
                return Err(CloudError::RootIdCollision { id: entry.id.clone() });
            }
            store.push(
                entry.id.clone(),
                NodeKind::Stack,
                Some(entry.domain.clone()),
                entry.base_radius,
                entry.icon_key.clone(),
                entry.color_key.clone(),
            )?;
        }

        Ok(store)
    }

    fn with_capacity(capacity: usize) -> Self {
        Self {
            keys: Vec::with_capacity(capacity),
            key_to_id: HashMap::with_capacity(capacity),
            kinds: Vec::with_capacity(capacity),
            domains: Vec::with_capacity(capacity),
            base_radius: Vec::with_capacity(capacity),
            radius: Vec::with_capacity(capacity),
            scale: Vec::with_capacity(capacity),
            pos_x: Vec::with_capacity(capacity),
            pos_y: Vec::with_capacity(capacity),
            vel_x: Vec::with_capacity(capacity),
            vel_y: Vec::with_capacity(capacity),
            angle_hint: Vec::with_capacity(capacity),
            states: Vec::with_capacity(capacity),
            icon_keys: Vec::with_capacity(capacity),
            color_keys: Vec::with_capacity(capacity),
        }
    }

    fn push(
        &mut self,
        key: String,
        kind: NodeKind,
        domain: Option<String>,
        base_radius: f32,
        icon_key: Option<String>,
        color_key: Option<String>,
    ) -> Result<NodeId> {
        if self.key_to_id.contains_key(&key) {
            return Err(CloudError::DuplicateNodeId { id: key });
        }

        let id = NodeId(self.keys.len() as u32);
        self.key_to_id.insert(key.clone(), id);
        self.keys.push(key);
        self.kinds.push(kind);
        self.domains.push(domain);
        self.base_radius.push(base_radius);
        self.radius.push(0.0);
        self.scale.push(1.0);
        self.pos_x.push(0.0);
        self.pos_y.push(0.0);
        self.vel_x.push(0.0);
        self.vel_y.push(0.0);
        self.angle_hint.push(0.0);
        self.states.push(NodeState::new());
        self.icon_keys.push(icon_key);
        self.color_keys.push(color_key);
        Ok(id)
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Number of stack nodes.
    pub fn stack_count(&self) -> usize {
        self.len().saturating_sub(1)
    }

    /// Host id of a slot.
    pub fn key(&self, id: NodeId) -> Option<&str> {
        self.keys.get(id.index()).map(String::as_str)
    }

    /// All host ids in slot order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Slot of a host id.
    pub fn id_of(&self, key: &str) -> Option<NodeId> {
        self.key_to_id.get(key).copied()
    }

    /// Whether a slot holds the root.
    #[inline]
    pub fn is_root(&self, i: usize) -> bool {
        self.kinds.get(i) == Some(&NodeKind::Root)
    }

    pub fn domain(&self, id: NodeId) -> Option<&str> {
        self.domains.get(id.index()).and_then(|d| d.as_deref())
    }

    pub fn icon_key(&self, id: NodeId) -> Option<&str> {
        self.icon_keys.get(id.index()).and_then(|k| k.as_deref())
    }

    pub fn color_key(&self, id: NodeId) -> Option<&str> {
        self.color_keys.get(id.index()).and_then(|k| k.as_deref())
    }

    pub fn position(&self, id: NodeId) -> Option<(f32, f32)> {
        let i = id.index();
        (i < self.len()).then(|| (self.pos_x[i], self.pos_y[i]))
    }

    pub fn radius(&self, id: NodeId) -> Option<f32> {
        self.radius.get(id.index()).copied()
    }

    pub fn scale(&self, id: NodeId) -> Option<f32> {
        self.scale.get(id.index()).copied()
    }

    pub fn state(&self, id: NodeId) -> Option<NodeState> {
        self.states.get(id.index()).copied()
    }

    /// `radius × scale` for a slot.
    #[inline]
    pub fn effective_radius(&self, i: usize) -> f32 {
        self.radius[i] * self.scale[i]
    }

    /// Current base radii in slot order.
    pub fn radii(&self) -> &[f32] {
        &self.radius
    }

    /// Set a node's scale factor.
    ///
    /// Returns true if the stored value changed. Non-finite and non-positive
    /// factors are ignored.
    pub fn set_scale(&mut self, id: NodeId, scale: f32) -> bool {
        let i = id.index();
        if i >= self.len() || !scale.is_finite() || scale <= 0.0 {
            return false;
        }
        if (self.scale[i] - scale).abs() <= f32::EPSILON {
            return false;
        }
        self.scale[i] = scale;
        true
    }

    /// Whether forces may act on a slot this tick.
    ///
    /// Pinned slots, non-finite positions and non-positive radii are skipped.
    #[inline]
    pub fn is_active(&self, i: usize) -> bool {
        !self.states[i].is_pinned() && self.is_well_formed(i)
    }

    /// Finite position and a finite, positive effective radius.
    #[inline]
    pub fn is_well_formed(&self, i: usize) -> bool {
        let r = self.effective_radius(i);
        self.pos_x[i].is_finite() && self.pos_y[i].is_finite() && r.is_finite() && r > 0.0
    }

    /// Get X positions slice.
    pub fn positions_x(&self) -> &[f32] {
        &self.pos_x
    }

    /// Get Y positions slice.
    pub fn positions_y(&self) -> &[f32] {
        &self.pos_y
    }

    /// Zero every velocity.
    pub fn halt(&mut self) {
        self.vel_x.iter_mut().for_each(|v| *v = 0.0);
        self.vel_y.iter_mut().for_each(|v| *v = 0.0);
    }

    /// Release every node.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
