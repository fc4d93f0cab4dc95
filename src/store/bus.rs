use std::collections::HashMap;
use std::sync::Mutex;

use tokio::sync::broadcast;
use uuid::Uuid;

const CHANNEL_CAPACITY: usize = 256;

/// One broadcast per room event. `except` lets joined/typing/left signals
/// skip the originating connection; each connection's forward task filters.
#[derive(Debug, Clone)]
pub struct Envelope<T> {
    pub payload: T,
    pub except: Option<Uuid>,
}

/// Per-room fan-out groups, one `broadcast` channel per room. Delivery is
/// best-effort: a lagged or gone receiver never stalls the rest.
pub struct RoomBus<T> {
    channels: Mutex<HashMap<String, broadcast::Sender<Envelope<T>>>>,
}

impl<T: Clone> RoomBus<T> {
    pub fn new() -> Self {
        Self {
            channels: Mutex::new(HashMap::new()),
        }
    }

    pub fn subscribe(&self, room_id: &str) -> broadcast::Receiver<Envelope<T>> {
        self.channels
            .lock()
            .unwrap()
            .entry(room_id.to_owned())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Returns how many receivers the envelope reached. A room with no
    /// subscribers is not an error; its dead channel is dropped.
    pub fn broadcast(&self, room_id: &str, payload: T, except: Option<Uuid>) -> usize {
        let mut channels = self.channels.lock().unwrap();
        let Some(tx) = channels.get(room_id) else {
            return 0;
        };

        match tx.send(Envelope { payload, except }) {
            Ok(receivers) => receivers,
            Err(_) => {
                channels.remove(room_id);
                0
            }
        }
    }
}

impl<T: Clone> Default for RoomBus<T> {
    fn default() -> Self {
        Self::new()
    }
}
