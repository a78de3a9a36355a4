use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

/// A bounded, thread-safe FIFO of optional elements.
///
/// `None` is the shutdown sentinel: a producer enqueues one per consumer at
/// end-of-stream, and a consumer that pops `None` must treat it as its own
/// termination signal, never swallow it. Data pushes block while the queue
/// is at capacity; shutdown tokens bypass the capacity check so teardown can
/// never deadlock against a full queue.
///
/// Ordering is FIFO per item. There is no fairness guarantee among
/// consumers, and the pipe itself cannot fail.
#[derive(Debug)]
pub struct Pipe<T> {
    queue: Mutex<VecDeque<Option<T>>>,
    capacity: usize,
    not_empty: Condvar,
    not_full: Condvar,
}

impl<T> Pipe<T> {
    pub fn bounded(capacity: usize) -> Self {
        assert!(capacity > 0, "pipe capacity must be non-zero");
        Self {
            queue: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
        }
    }

    /// Enqueues one value, blocking while the queue is full, and wakes one
    /// consumer.
    pub fn push(&self, value: T) {
        let mut queue = self.queue.lock().unwrap();
        while queue.len() >= self.capacity {
            queue = self.not_full.wait(queue).unwrap();
        }
        queue.push_back(Some(value));
        drop(queue);
        self.not_empty.notify_one();
    }

    /// Flushes a whole batch under a single lock acquisition, then wakes all
    /// consumers. Waits for room item by item without releasing the queue to
    /// other producers in between.
    pub fn push_all<I>(&self, batch: I)
    where
        I: IntoIterator<Item = T>,
    {
        let mut queue = self.queue.lock().unwrap();
        for value in batch {
            while queue.len() >= self.capacity {
                queue = self.not_full.wait(queue).unwrap();
            }
            queue.push_back(Some(value));
        }
        drop(queue);
        self.not_empty.notify_all();
    }

    /// Enqueues a shutdown token. Not subject to the capacity bound.
    pub fn push_shutdown(&self) {
        let mut queue = self.queue.lock().unwrap();
        queue.push_back(None);
        drop(queue);
        self.not_empty.notify_one();
    }

    /// Blocks until the queue is non-empty and pops the front element.
    /// `None` is the shutdown token.
    pub fn pop_blocking(&self) -> Option<T> {
        let mut queue = self.queue.lock().unwrap();
        loop {
            if let Some(item) = queue.pop_front() {
                drop(queue);
                self.not_full.notify_one();
                return item;
            }
            queue = self.not_empty.wait(queue).unwrap();
        }
    }

    /// Blocks until the queue is non-empty, then takes up to `max` elements
    /// under the same lock acquisition, stopping early after a shutdown
    /// token. Always returns at least one element.
    pub fn pop_blocking_batch(&self, max: usize) -> Vec<Option<T>> {
        let mut queue = self.queue.lock().unwrap();
        while queue.is_empty() {
            queue = self.not_empty.wait(queue).unwrap();
        }
        let mut taken = Vec::with_capacity(max);
        while taken.len() < max {
            match queue.pop_front() {
                Some(item) => {
                    let stop = item.is_none();
                    taken.push(item);
                    if stop {
                        break;
                    }
                }
                None => break,
            }
        }
        drop(queue);
        self.not_full.notify_all();
        taken
    }

    /// Non-blocking bulk take of up to `max` elements; may return an empty
    /// vector.
    pub fn drain_up_to(&self, max: usize) -> Vec<Option<T>> {
        let mut queue = self.queue.lock().unwrap();
        let count = queue.len().min(max);
        let taken: Vec<Option<T>> = queue.drain(..count).collect();
        drop(queue);
        if !taken.is_empty() {
            self.not_full.notify_all();
        }
        taken
    }

    pub fn len(&self) -> usize {
        self.queue.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().unwrap().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_fifo_order() {
        let pipe = Pipe::bounded(8);
        pipe.push(1);
        pipe.push(2);
        pipe.push(3);
        assert_eq!(pipe.pop_blocking(), Some(1));
        assert_eq!(pipe.pop_blocking(), Some(2));
        assert_eq!(pipe.pop_blocking(), Some(3));
    }

    #[test]
    fn test_shutdown_token_is_popped_in_order() {
        let pipe = Pipe::bounded(8);
        pipe.push(7);
        pipe.push_shutdown();
        assert_eq!(pipe.pop_blocking(), Some(7));
        assert_eq!(pipe.pop_blocking(), None);
        assert!(pipe.is_empty());
    }

    #[test]
    fn test_pop_blocking_batch_stops_after_token() {
        let pipe = Pipe::bounded(8);
        pipe.push(1);
        pipe.push_shutdown();
        pipe.push(2);

        let batch = pipe.pop_blocking_batch(4);
        assert_eq!(batch, vec![Some(1), None]);
        assert_eq!(pipe.pop_blocking(), Some(2));
    }

    #[test]
    fn test_pop_blocking_batch_respects_max() {
        let pipe = Pipe::bounded(8);
        for i in 0..5 {
            pipe.push(i);
        }
        let batch = pipe.pop_blocking_batch(2);
        assert_eq!(batch, vec![Some(0), Some(1)]);
        assert_eq!(pipe.len(), 3);
    }

    #[test]
    fn test_drain_up_to_is_non_blocking() {
        let pipe: Pipe<u32> = Pipe::bounded(4);
        assert!(pipe.drain_up_to(4).is_empty());

        pipe.push(1);
        pipe.push(2);
        assert_eq!(pipe.drain_up_to(8), vec![Some(1), Some(2)]);
    }

    #[test]
    fn test_pop_blocks_until_push() {
        let pipe = Arc::new(Pipe::bounded(4));
        let producer = {
            let pipe = Arc::clone(&pipe);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                pipe.push(42);
            })
        };
        assert_eq!(pipe.pop_blocking(), Some(42));
        producer.join().unwrap();
    }

    #[test]
    fn test_push_blocks_at_capacity() {
        let pipe = Arc::new(Pipe::bounded(2));
        pipe.push(1);
        pipe.push(2);

        let producer = {
            let pipe = Arc::clone(&pipe);
            thread::spawn(move || {
                // Blocks until the consumer below makes room
                pipe.push(3);
            })
        };
        thread::sleep(Duration::from_millis(20));
        assert_eq!(pipe.len(), 2);

        assert_eq!(pipe.pop_blocking(), Some(1));
        producer.join().unwrap();
        assert_eq!(pipe.pop_blocking(), Some(2));
        assert_eq!(pipe.pop_blocking(), Some(3));
    }

    #[test]
    fn test_shutdown_bypasses_capacity() {
        let pipe = Pipe::bounded(1);
        pipe.push(1);
        // Must not block even though the queue is full
        pipe.push_shutdown();
        assert_eq!(pipe.len(), 2);
    }

    #[test]
    fn test_push_all_batch() {
        let pipe = Pipe::bounded(8);
        pipe.push_all(vec![1, 2, 3]);
        assert_eq!(pipe.drain_up_to(8), vec![Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn test_many_producers_one_consumer() {
        let pipe = Arc::new(Pipe::bounded(4));
        let mut producers = Vec::new();
        for base in 0..4u32 {
            let pipe = Arc::clone(&pipe);
            producers.push(thread::spawn(move || {
                for i in 0..25 {
                    pipe.push(base * 100 + i);
                }
                pipe.push_shutdown();
            }));
        }

        let mut seen = Vec::new();
        let mut remaining = 4;
        while remaining > 0 {
            match pipe.pop_blocking() {
                Some(value) => seen.push(value),
                None => remaining -= 1,
            }
        }
        for producer in producers {
            producer.join().unwrap();
        }
        seen.sort_unstable();
        let expected: Vec<u32> = (0..4u32)
            .flat_map(|base| (0..25).map(move |i| base * 100 + i))
            .collect();
        assert_eq!(seen, expected);
        assert!(pipe.is_empty());
    }
}
