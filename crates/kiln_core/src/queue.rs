//! Cross-thread command queues
//!
//! A producer thread pushes commands at any time; the owning thread drains the
//! queue exactly once per tick. Commands pushed while a drain is running are
//! deferred to the next drain.

use parking_lot::Mutex;

/// FIFO of commands consumed by a single owning thread.
pub struct CommandQueue<C> {
    pending: Mutex<Vec<C>>,
    /// Drained allocation handed back to `pending` on the next execute.
    spare: Mutex<Vec<C>>,
}

impl<C> CommandQueue<C> {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(Vec::new()),
            spare: Mutex::new(Vec::new()),
        }
    }

    /// Enqueue a command. Safe to call concurrently with [`execute`](Self::execute).
    pub fn push(&self, command: C) {
        self.pending.lock().push(command);
    }

    /// Take every pending command and run `handler` on each, in push order.
    ///
    /// Only the owning thread should call this. The lock is released before any
    /// handler runs, so handlers may push onto this same queue; those commands
    /// wait for the next call. Returns the number of commands handled.
    pub fn execute(&self, mut handler: impl FnMut(C)) -> usize {
        let mut batch = std::mem::take(&mut *self.spare.lock());
        std::mem::swap(&mut batch, &mut *self.pending.lock());

        let count = batch.len();
        for command in batch.drain(..) {
            handler(command);
        }
        *self.spare.lock() = batch;
        count
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }
}

impl<C> Default for CommandQueue<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn executes_in_push_order_and_clears() {
        let queue = CommandQueue::new();
        queue.push(1);
        queue.push(2);
        queue.push(3);

        let mut seen = Vec::new();
        assert_eq!(queue.execute(|c| seen.push(c)), 3);
        assert_eq!(seen, vec![1, 2, 3]);
        assert!(queue.is_empty());
        assert_eq!(queue.execute(|_| panic!("queue should be empty")), 0);
    }

    #[test]
    fn pushes_during_execute_are_deferred() {
        let queue = CommandQueue::new();
        queue.push(10);

        let mut seen = Vec::new();
        queue.execute(|c| {
            seen.push(c);
            queue.push(c + 1);
        });
        assert_eq!(seen, vec![10]);
        assert_eq!(queue.len(), 1);

        queue.execute(|c| seen.push(c));
        assert_eq!(seen, vec![10, 11]);
    }

    #[test]
    fn concurrent_producers_lose_nothing() {
        let queue = Arc::new(CommandQueue::new());
        let producers: Vec<_> = (0..4)
            .map(|p| {
                let queue = Arc::clone(&queue);
                std::thread::spawn(move || {
                    for i in 0..250 {
                        queue.push(p * 1000 + i);
                    }
                })
            })
            .collect();

        let mut seen = Vec::new();
        while seen.len() < 1000 {
            queue.execute(|c| seen.push(c));
            std::thread::yield_now();
        }
        for producer in producers {
            producer.join().unwrap();
        }
        queue.execute(|c| seen.push(c));

        assert_eq!(seen.len(), 1000);
        // Each producer's commands arrive in its own push order.
        for p in 0..4 {
            let own: Vec<_> = seen.iter().filter(|&&c| c / 1000 == p).collect();
            assert!(own.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
