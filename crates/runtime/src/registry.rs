//! Room registry: creation, lookup, listing and reclamation.
//!
//! The registry map and each room sit behind separate locks. Lock order is
//! always registry first, then room, so a request for one room never waits on
//! another room's transition.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::{debug, info};

use checkers_core::{Room, RoomId, RoomSummary, Timestamp};

use crate::api::{Result, RuntimeError};

/// A room plus its reclamation flag.
///
/// Once `retired` is set the slot is detached from the registry; anyone
/// still holding it must treat the room as gone.
pub struct RoomSlot {
    room: Room,
    retired: bool,
}

impl RoomSlot {
    fn new(room: Room) -> Self {
        Self {
            room,
            retired: false,
        }
    }

    pub fn room(&self) -> &Room {
        &self.room
    }

    /// Mutable access to a live room. Retired rooms report `NotFound`.
    pub fn live_mut(&mut self) -> Result<&mut Room> {
        if self.retired {
            return Err(RuntimeError::not_found(&self.room.id));
        }
        Ok(&mut self.room)
    }

    pub fn is_retired(&self) -> bool {
        self.retired
    }
}

type SharedSlot = Arc<Mutex<RoomSlot>>;

/// Process-lifetime collection of rooms.
#[derive(Default)]
pub struct RoomRegistry {
    rooms: RwLock<HashMap<RoomId, SharedSlot>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a fresh waiting room under an unused identifier.
    ///
    /// `next_id` is called again until it yields an id not already taken.
    pub async fn create(&self, mut next_id: impl FnMut() -> RoomId, created_at: Timestamp) -> Room {
        let mut rooms = self.rooms.write().await;

        let mut id = next_id();
        while rooms.contains_key(&id) {
            debug!("room id {} already taken, regenerating", id);
            id = next_id();
        }

        let room = Room::new(id.clone(), created_at);
        rooms.insert(id, Arc::new(Mutex::new(RoomSlot::new(room.clone()))));
        info!("room {} created ({} live)", room.id, rooms.len());
        room
    }

    /// Locks a live room for exclusive access.
    pub async fn lock(&self, id: &RoomId) -> Result<OwnedMutexGuard<RoomSlot>> {
        let slot = self.slot(id).await?;
        let guard = slot.lock_owned().await;
        if guard.is_retired() {
            return Err(RuntimeError::not_found(id));
        }
        Ok(guard)
    }

    /// Clone of a room's current state.
    pub async fn get(&self, id: &RoomId) -> Result<Room> {
        Ok(self.lock(id).await?.room().clone())
    }

    /// Summaries of all rooms, newest first.
    pub async fn list(&self) -> Vec<RoomSummary> {
        let rooms = self.rooms.read().await;
        let mut summaries = Vec::with_capacity(rooms.len());
        for slot in rooms.values() {
            summaries.push(slot.lock().await.room().summary());
        }
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        summaries
    }

    /// Removes a room whose roster is empty. Returns true if it was removed.
    ///
    /// A room that gained a player since the caller saw it empty is kept.
    pub async fn reap(&self, id: &RoomId) -> bool {
        let mut rooms = self.rooms.write().await;
        let Some(slot) = rooms.get(id).cloned() else {
            return false;
        };

        let mut slot = slot.lock().await;
        if slot.retired || !slot.room.is_empty() {
            return false;
        }
        slot.retired = true;
        rooms.remove(id);
        info!("room {} reaped ({} live)", id, rooms.len());
        true
    }

    /// Number of live rooms.
    pub async fn len(&self) -> usize {
        self.rooms.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rooms.read().await.is_empty()
    }

    async fn slot(&self, id: &RoomId) -> Result<SharedSlot> {
        self.rooms
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| RuntimeError::not_found(id))
    }
}
