//! Caller-owned collection of live shapes.
//!
//! [`ShapeRegistry`] owns its shapes and hands out [`ShapeId`]s. Iteration follows creation
//! order. The registry remembers the thread that created it and refuses to create or destroy
//! shapes from any other thread, since the GL context is only current there.

use std::sync::Arc;
use std::thread::ThreadId;

use indexmap::IndexMap;

use super::{Dimension, Gl, Shape};
use crate::config::ShapeConfig;
use crate::error::{Result, ShapeError};

/// Key of a shape inside its [`ShapeRegistry`]. Ids are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(u64);

impl std::fmt::Display for ShapeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Live shapes keyed by [`ShapeId`], in creation order.
pub struct ShapeRegistry<G: Gl> {
    shapes: IndexMap<ShapeId, Shape<G>>,
    next_id: u64,
    owner: ThreadId,
}

impl<G: Gl> ShapeRegistry<G> {
    pub fn new() -> Self {
        Self {
            shapes: IndexMap::new(),
            next_id: 0,
            owner: std::thread::current().id(),
        }
    }

    /// Builds a [`Shape`] and registers it.
    pub fn create(
        &mut self,
        gl: &Arc<G>,
        vertex_count: usize,
        dimension: Dimension,
        config: &ShapeConfig,
    ) -> Result<ShapeId> {
        self.ensure_owner()?;
        let shape = Shape::new(gl, vertex_count, dimension, config)?;
        self.insert(shape)
    }

    /// Registers a shape built elsewhere.
    pub fn insert(&mut self, shape: Shape<G>) -> Result<ShapeId> {
        self.ensure_owner()?;
        let id = ShapeId(self.next_id);
        self.next_id += 1;
        self.shapes.insert(id, shape);
        Ok(id)
    }

    /// Removes the shape and releases its GPU objects.
    ///
    /// Fails with [`ShapeError::UnknownShape`] if `id` is not live, which means the caller's
    /// bookkeeping disagrees with the registry.
    pub fn destroy(&mut self, id: ShapeId) -> Result<()> {
        self.ensure_owner()?;
        match self.shapes.shift_remove(&id) {
            Some(shape) => {
                drop(shape);
                log::debug!("Destroyed shape {id}");
                Ok(())
            }
            None => Err(ShapeError::UnknownShape(id)),
        }
    }

    /// Destroys every shape, oldest first.
    pub fn clear(&mut self) {
        for (id, shape) in self.shapes.drain(..) {
            drop(shape);
            log::debug!("Destroyed shape {id}");
        }
    }

    pub fn get(&self, id: ShapeId) -> Option<&Shape<G>> {
        self.shapes.get(&id)
    }

    pub fn get_mut(&mut self, id: ShapeId) -> Option<&mut Shape<G>> {
        self.shapes.get_mut(&id)
    }

    pub fn contains(&self, id: ShapeId) -> bool {
        self.shapes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = ShapeId> + '_ {
        self.shapes.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ShapeId, &Shape<G>)> {
        self.shapes.iter().map(|(id, shape)| (*id, shape))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (ShapeId, &mut Shape<G>)> {
        self.shapes.iter_mut().map(|(id, shape)| (*id, shape))
    }

    fn ensure_owner(&self) -> Result<()> {
        if std::thread::current().id() != self.owner {
            return Err(ShapeError::WrongThread);
        }
        Ok(())
    }
}

impl<G: Gl> Default for ShapeRegistry<G> {
    fn default() -> Self {
        Self::new()
    }
}
