use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Mutex;

use time::OffsetDateTime;

use crate::model::{Report, Room};

/// The room id was not in the registry. Reports and history lookups never
/// create rooms as a side effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomNotFound(pub String);

#[derive(Default)]
pub struct RoomRegistry {
    rooms: Mutex<HashMap<String, Room>>,
}

impl RoomRegistry {
    /// Create-or-fetch for an unordered participant pair. Holding the map
    /// lock across the check and the insert is what keeps two concurrent
    /// calls for the same pair from creating two rooms.
    pub fn ensure_room(&self, a: &str, b: &str) -> (Room, bool) {
        let id = Room::key(a, b);
        let mut rooms = self.rooms.lock().unwrap();

        match rooms.entry(id) {
            Entry::Occupied(entry) => (entry.get().clone(), false),
            Entry::Vacant(entry) => {
                let room = Room {
                    id: entry.key().clone(),
                    participants: [a.to_owned(), b.to_owned()],
                    created_at: OffsetDateTime::now_utc(),
                    is_reported: false,
                    report: None,
                };
                (entry.insert(room).clone(), true)
            }
        }
    }

    pub fn get(&self, room_id: &str) -> Option<Room> {
        self.rooms.lock().unwrap().get(room_id).cloned()
    }

    /// Flag a room for moderation. A repeat report overwrites the previous
    /// one; there is no accumulation.
    pub fn report(
        &self,
        room_id: &str,
        reason: String,
        reported_by: String,
    ) -> Result<Report, RoomNotFound> {
        let mut rooms = self.rooms.lock().unwrap();
        let room = rooms
            .get_mut(room_id)
            .ok_or_else(|| RoomNotFound(room_id.to_owned()))?;

        let report = Report {
            reason,
            reported_by,
            reported_at: OffsetDateTime::now_utc(),
        };
        room.is_reported = true;
        room.report = Some(report.clone());
        Ok(report)
    }

    pub fn list_flagged(&self) -> Vec<Room> {
        self.rooms
            .lock()
            .unwrap()
            .values()
            .filter(|room| room.is_reported)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn ensure_room_is_idempotent_and_order_independent() {
        let registry = RoomRegistry::default();

        let (room, created) = registry.ensure_room("1", "2");
        assert!(created);
        assert_eq!(room.id, "1-2");

        let (same, created) = registry.ensure_room("2", "1");
        assert!(!created);
        assert_eq!(same.id, room.id);
        assert_eq!(same.created_at, room.created_at);
    }

    #[test]
    fn concurrent_ensure_creates_exactly_one_room() {
        let registry = Arc::new(RoomRegistry::default());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                std::thread::spawn(move || registry.ensure_room("7", "3").1)
            })
            .collect();

        let creations = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|created| *created)
            .count();
        assert_eq!(creations, 1);
    }

    #[test]
    fn report_unknown_room_is_not_found_and_creates_nothing() {
        let registry = RoomRegistry::default();

        let err = registry
            .report("9-9", "spam".to_owned(), "9".to_owned())
            .unwrap_err();
        assert_eq!(err, RoomNotFound("9-9".to_owned()));
        assert!(registry.get("9-9").is_none());
    }

    #[test]
    fn second_report_overwrites_the_first() {
        let registry = RoomRegistry::default();
        registry.ensure_room("1", "2");

        registry
            .report("1-2", "spam".to_owned(), "1".to_owned())
            .unwrap();
        let second = registry
            .report("1-2", "harassment".to_owned(), "2".to_owned())
            .unwrap();

        let room = registry.get("1-2").unwrap();
        assert!(room.is_reported);
        assert_eq!(room.report, Some(second));

        assert_eq!(registry.list_flagged().len(), 1);
    }
}
