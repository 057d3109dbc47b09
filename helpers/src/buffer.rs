/// RingBuffer provides a buffer with a user-defined capacity. As soon as the capacity is reached,
/// the buffer overwrites old values when new values are pushed to it.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    vals: Vec<T>,
    capacity: usize,
    idx: usize,
}

impl<T> RingBuffer<T> {
    pub fn new(capacity: usize) -> RingBuffer<T> {
        // a buffer without capacity would silently drop every value
        let capacity = capacity.max(1);

        RingBuffer {
            vals: Vec::with_capacity(capacity),
            capacity,
            idx: 0,
        }
    }
    pub fn push(&mut self, val: T) {
        if self.vals.len() < self.capacity {
            self.vals.push(val);
        } else {
            self.vals[self.idx] = val;
            self.idx = (self.idx + 1) % self.capacity;
        }
    }
    pub fn len(&self) -> usize {
        self.vals.len()
    }
    pub fn is_empty(&self) -> bool {
        self.vals.is_empty()
    }
    pub fn clear(&mut self) {
        self.vals.clear();
        self.idx = 0;
    }
    /// iter returns the stored values from the oldest to the newest one.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.vals[self.idx..].iter().chain(self.vals[..self.idx].iter())
    }
    /// last returns the newest value.
    pub fn last(&self) -> Option<&T> {
        if self.vals.is_empty() {
            None
        } else if self.idx == 0 {
            self.vals.last()
        } else {
            self.vals.get(self.idx - 1)
        }
    }
}
