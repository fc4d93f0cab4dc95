use std::collections::HashMap;
use std::sync::Mutex;

use uuid::Uuid;

use crate::model::PresenceEntry;

/// Connection id -> (identity, room). One entry per live connection; the
/// entry is the source of truth for "who left" when the transport drops.
#[derive(Default)]
pub struct PresenceTracker {
    entries: Mutex<HashMap<Uuid, PresenceEntry>>,
}

impl PresenceTracker {
    /// Last join wins; a connection is only ever in one room.
    pub fn join(&self, conn_id: Uuid, entry: PresenceEntry) {
        self.entries.lock().unwrap().insert(conn_id, entry);
    }

    pub fn get(&self, conn_id: Uuid) -> Option<PresenceEntry> {
        self.entries.lock().unwrap().get(&conn_id).cloned()
    }

    /// Removes and returns the entry. A second call for the same connection
    /// returns `None`, which is what keeps the departure notification to
    /// exactly one even if the transport signals disconnect twice.
    pub fn leave(&self, conn_id: Uuid) -> Option<PresenceEntry> {
        self.entries.lock().unwrap().remove(&conn_id)
    }
}
