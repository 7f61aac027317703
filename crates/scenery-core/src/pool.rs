//! Pre-spawned instances handed out by kind.
//!
//! Each kind is a fixed array with a cursor. `get` hands out the slot under
//! the cursor and advances; `put_back` steps the cursor back and stores the
//! returned node there. Running off either end is a programming error.

use crate::errors::SceneError;
use crate::runtime::Runtime;
use crate::stack::SceneStack;
use crate::types::NodeId;
use std::collections::HashMap;
use tracing::{debug, warn};

#[derive(Debug)]
struct PoolEntry {
    template: String,
    items: Vec<Option<NodeId>>,
    cursor: usize,
}

#[derive(Debug, Default)]
pub struct ObjectPool {
    pools: HashMap<String, PoolEntry>,
}

impl ObjectPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns `count` instances of `template` into the pool for `kind`,
    /// replacing any previous pool of that kind. Returns how many spawned.
    pub fn init(
        &mut self,
        stack: &mut SceneStack,
        rt: &mut Runtime,
        count: usize,
        template: &str,
        kind: &str,
    ) -> usize {
        let items: Vec<Option<NodeId>> = (0..count).map(|_| stack.spawn(rt, template)).collect();
        let spawned = items.iter().flatten().count();
        if spawned < count {
            warn!(
                "Pool '{}' filled {} of {} slots; '{}' did not resolve",
                kind, spawned, count, template
            );
        }
        debug!("Pool '{}' ready with {} '{}'", kind, spawned, template);
        self.pools.insert(
            kind.to_string(),
            PoolEntry {
                template: template.to_string(),
                items,
                cursor: 0,
            },
        );
        spawned
    }

    pub fn get(&mut self, kind: &str) -> Result<NodeId, SceneError> {
        let entry = self.entry_mut(kind)?;
        let index = entry.cursor;
        let id = entry
            .items
            .get(index)
            .copied()
            .flatten()
            .ok_or_else(|| SceneError::PoolExhausted {
                pool: kind.to_string(),
                index,
            })?;
        entry.cursor += 1;
        Ok(id)
    }

    pub fn put_back(&mut self, id: NodeId, kind: &str) -> Result<(), SceneError> {
        let entry = self.entry_mut(kind)?;
        if entry.cursor == 0 {
            return Err(SceneError::PoolUnderflow(kind.to_string()));
        }
        entry.cursor -= 1;
        entry.items[entry.cursor] = Some(id);
        Ok(())
    }

    /// Rewinds the cursor; every slot is available again.
    pub fn clear(&mut self, kind: &str) -> Result<(), SceneError> {
        self.entry_mut(kind)?.cursor = 0;
        Ok(())
    }

    /// Slots left before `get` fails.
    pub fn available(&self, kind: &str) -> Option<usize> {
        self.pools
            .get(kind)
            .map(|e| e.items[e.cursor..].iter().take_while(|slot| slot.is_some()).count())
    }

    pub fn template(&self, kind: &str) -> Option<&str> {
        self.pools.get(kind).map(|e| e.template.as_str())
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.pools.contains_key(kind)
    }

    fn entry_mut(&mut self, kind: &str) -> Result<&mut PoolEntry, SceneError> {
        self.pools
            .get_mut(kind)
            .ok_or_else(|| SceneError::UnknownPool(kind.to_string()))
    }
}
