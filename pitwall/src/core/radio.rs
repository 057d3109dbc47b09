use helpers::buffer::RingBuffer;
use std::collections::HashSet;

/// Number of radio events retained in the feed.
pub const RADIO_FEED_CAPACITY: usize = 50;

/// * `key` - Identity used for deduplication (an event with a known key is dropped)
/// * `lap_number` - Lap in which the event occurred
/// * `message` - Radio message
/// * `timestamp` - (s) Race time at which the event occurred
#[derive(Debug, Clone, PartialEq)]
pub struct RadioEvent {
    pub key: String,
    pub lap_number: u32,
    pub message: String,
    pub timestamp: f64,
}

/// RadioFeed is an append-only history of the most recent radio events. Every key is accepted
/// only once per race, even if the first event with that key has already left the history.
#[derive(Debug, Clone)]
pub struct RadioFeed {
    history: RingBuffer<RadioEvent>,
    seen_keys: HashSet<String>,
}

impl Default for RadioFeed {
    fn default() -> Self {
        RadioFeed::new(RADIO_FEED_CAPACITY)
    }
}

impl RadioFeed {
    pub fn new(capacity: usize) -> RadioFeed {
        RadioFeed {
            history: RingBuffer::new(capacity),
            seen_keys: HashSet::new(),
        }
    }

    /// push appends an event and returns true, or returns false if the key is already known.
    pub fn push(&mut self, event: RadioEvent) -> bool {
        if !self.seen_keys.insert(event.key.to_owned()) {
            return false;
        }
        self.history.push(event);
        true
    }

    pub fn last_alert(&self) -> Option<&RadioEvent> {
        self.history.last()
    }

    /// events returns the retained events from the oldest to the newest one.
    pub fn events(&self) -> Vec<RadioEvent> {
        self.history.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn clear(&mut self) {
        self.history.clear();
        self.seen_keys.clear();
    }
}
