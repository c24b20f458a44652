use rand::Rng;
use uuid::Uuid;

use checkers_core::{RoomId, SessionId};

/// Generator for room and session identifiers.
///
/// Room ids only need to be unlikely to collide; the registry regenerates on
/// collision. Session ids double as seat credentials and must be unguessable.
pub trait IdProvider: Send + Sync {
    fn room_id(&self) -> RoomId;
    fn session_id(&self) -> SessionId;
}

/// Random hex room ids and UUID v4 session ids.
#[derive(Debug, Clone)]
pub struct RandomIds {
    room_id_len: usize,
}

impl RandomIds {
    pub const MIN_ROOM_ID_LEN: usize = 4;
    pub const MAX_ROOM_ID_LEN: usize = 32;

    pub fn new(room_id_len: usize) -> Self {
        Self {
            room_id_len: room_id_len.clamp(Self::MIN_ROOM_ID_LEN, Self::MAX_ROOM_ID_LEN),
        }
    }

    pub fn room_id_len(&self) -> usize {
        self.room_id_len
    }
}

impl Default for RandomIds {
    fn default() -> Self {
        Self::new(8)
    }
}

impl IdProvider for RandomIds {
    fn room_id(&self) -> RoomId {
        let mut bytes = [0u8; Self::MAX_ROOM_ID_LEN / 2];
        rand::thread_rng().fill(&mut bytes);
        let mut id = hex::encode(bytes);
        id.truncate(self.room_id_len);
        RoomId::new(id)
    }

    fn session_id(&self) -> SessionId {
        SessionId::new(Uuid::new_v4().to_string())
    }
}
