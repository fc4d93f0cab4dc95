use std::collections::HashMap;
use std::sync::Mutex;

use crate::model::Message;

/// Per-room append-only message history. Appending for an unknown room id
/// creates the log rather than failing; the relay never drops a send because
/// room metadata is momentarily missing.
pub struct MessageLog {
    /// Oldest messages are evicted past this many per room. 0 = unbounded.
    limit: usize,
    logs: Mutex<HashMap<String, Vec<Message>>>,
}

impl MessageLog {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            logs: Mutex::new(HashMap::new()),
        }
    }

    pub fn append(&self, message: Message) {
        let mut logs = self.logs.lock().unwrap();
        let log = logs.entry(message.room_id.clone()).or_default();
        log.push(message);

        if self.limit > 0 && log.len() > self.limit {
            let excess = log.len() - self.limit;
            log.drain(..excess);
        }
    }

    /// Copy-on-read view in append order. Later appends are not visible
    /// through a snapshot already taken. Empty for unknown rooms.
    pub fn snapshot(&self, room_id: &str) -> Vec<Message> {
        self.logs
            .lock()
            .unwrap()
            .get(room_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use time::OffsetDateTime;
    use uuid::Uuid;

    use super::*;
    use crate::model::MessageKind;

    fn message(room_id: &str, content: &str) -> Message {
        Message {
            id: Uuid::new_v4(),
            kind: MessageKind::Text,
            content: content.to_owned(),
            user_id: "1".to_owned(),
            username: "Alice".to_owned(),
            room_id: room_id.to_owned(),
            timestamp: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn snapshot_preserves_append_order() {
        let log = MessageLog::new(0);
        log.append(message("1-2", "first"));
        log.append(message("1-2", "second"));
        log.append(message("1-2", "third"));

        let history: Vec<_> = log
            .snapshot("1-2")
            .into_iter()
            .map(|m| m.content)
            .collect();
        assert_eq!(history, ["first", "second", "third"]);
    }

    #[test]
    fn snapshot_of_unknown_room_is_empty() {
        let log = MessageLog::new(0);
        assert!(log.snapshot("nope").is_empty());
    }

    #[test]
    fn snapshot_does_not_observe_later_appends() {
        let log = MessageLog::new(0);
        log.append(message("1-2", "first"));

        let snapshot = log.snapshot("1-2");
        log.append(message("1-2", "second"));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(log.snapshot("1-2").len(), 2);
    }

    #[test]
    fn retention_limit_evicts_from_the_head() {
        let log = MessageLog::new(2);
        log.append(message("1-2", "first"));
        log.append(message("1-2", "second"));
        log.append(message("1-2", "third"));

        let history: Vec<_> = log
            .snapshot("1-2")
            .into_iter()
            .map(|m| m.content)
            .collect();
        assert_eq!(history, ["second", "third"]);
    }
}
