use std::collections::hash_map::Entry;
use std::fmt::Debug;
use std::hash::Hash;

use fxhash::FxHashMap;
use prism_gpu as gpu;

use crate::bvh::{builder, serializer};
use crate::{utils, BvhConfig, BvhNodes, BvhPrimitive, Instance, Result};

/// Bounding volume hierarchy over instances, rebuilt whenever they move.
///
/// Shares node layout with [`crate::Bvh`], except that leaves point at
/// instances - leaf's `index` is the instance's position among all instances
/// ordered by their handles, see [`Self::handle()`].
#[derive(Clone, Debug)]
pub struct Tbvh<H> {
    instances: FxHashMap<H, Instance>,
    handles: Vec<H>,
    nodes: BvhNodes,
    buffer: Vec<gpu::BvhNode>,
    dirty: bool,
}

impl<H> Tbvh<H>
where
    H: Copy + Eq + Hash + Ord + Debug,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a new instance or replaces an existing one.
    pub fn add(&mut self, handle: H, instance: Instance) {
        match self.instances.entry(handle) {
            Entry::Occupied(mut entry) => {
                if *entry.get() != instance {
                    entry.insert(instance);
                    self.dirty = true;
                }
            }

            Entry::Vacant(entry) => {
                entry.insert(instance);
                self.dirty = true;
            }
        }
    }

    pub fn remove(&mut self, handle: &H) -> Option<Instance> {
        let instance = self.instances.remove(handle)?;

        self.dirty = true;

        Some(instance)
    }

    pub fn get(&self, handle: &H) -> Option<&Instance> {
        self.instances.get(handle)
    }

    /// Rebuilds the tree, if any instance has changed since the last refresh.
    pub fn refresh(&mut self, config: &BvhConfig) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }

        self.handles.clear();
        self.handles.extend(self.instances.keys().copied());
        self.handles.sort_unstable();

        self.nodes.clear();
        self.buffer.clear();

        if self.handles.is_empty() {
            self.dirty = false;

            return Ok(());
        }

        log::debug!("Building TBVH; instances = {}", self.handles.len());

        let mut primitives: Vec<_> = self
            .handles
            .iter()
            .enumerate()
            .map(|(idx, handle)| {
                let bounds = self.instances[handle].world_bounds();

                BvhPrimitive::from_bounds(idx as u32, bounds)
            })
            .collect();

        let result = utils::measure("tbvh-build", || {
            builder::run(&mut self.nodes, &mut primitives, config)
        })
        .and_then(|_| {
            if config.validate {
                self.nodes.validate(primitives.len())
            } else {
                Ok(())
            }
        });

        if let Err(err) = result {
            self.nodes.clear();

            // Stay dirty, so that the next refresh tries again
            return Err(err);
        }

        serializer::run(&self.nodes, &mut self.buffer);

        self.dirty = false;

        Ok(())
    }

    /// Returns the packed nodes, with the root at index zero.
    pub fn root(&self) -> &[gpu::BvhNode] {
        &self.buffer
    }

    /// Returns the number of nodes.
    pub fn size(&self) -> usize {
        self.buffer.len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.buffer)
    }

    pub fn nodes(&self) -> &BvhNodes {
        &self.nodes
    }

    /// Translates leaf's `index` back into the instance's handle.
    ///
    /// Valid as of the last refresh.
    pub fn handle(&self, index: u32) -> Option<H> {
        self.handles.get(index as usize).copied()
    }

    /// Returns the number of instances.
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

impl<H> Default for Tbvh<H> {
    fn default() -> Self {
        Self {
            instances: Default::default(),
            handles: Default::default(),
            nodes: Default::default(),
            buffer: Default::default(),
            dirty: false,
        }
    }
}
