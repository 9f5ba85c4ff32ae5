//! Channel: Multi-producer, single-consumer task mailbox.
//!
//! A thin layer over `crossbeam_channel` that adds the two things the screen
//! loop needs and crossbeam does not offer directly:
//!
//! - The receiver can mint new senders at any time, including after every
//!   previous sender was dropped (a screen re-installs after suspension).
//! - "All senders gone" is observable as end-of-stream even though the
//!   receiver itself keeps the underlying channel open.
//!
//! Dropping the last [`Sender`] enqueues a hangup marker that wakes a blocked
//! [`Receiver::receive`], which then reports end-of-stream. The queue is
//! unbounded: producers never block.

use crossbeam_channel as cb;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

enum Message<T> {
    Item(T),
    Hangup,
}

struct Counters {
    senders: AtomicUsize,
    queued: AtomicUsize,
}

/// Producer half. Cheap to clone and safe to move across threads.
pub struct Sender<T> {
    inner: cb::Sender<Message<T>>,
    counters: Arc<Counters>,
}

/// Consumer half. Owned by the screen loop thread.
pub struct Receiver<T> {
    inner: cb::Receiver<Message<T>>,
    // Kept so that `make_sender` works after all senders are gone.
    loopback: cb::Sender<Message<T>>,
    counters: Arc<Counters>,
}

/// Create a receiver with no senders yet.
pub fn channel<T>() -> Receiver<T> {
    let (tx, rx) = cb::unbounded();
    Receiver {
        inner: rx,
        loopback: tx,
        counters: Arc::new(Counters {
            senders: AtomicUsize::new(0),
            queued: AtomicUsize::new(0),
        }),
    }
}

impl<T> Sender<T> {
    /// Enqueue an item. Never blocks.
    pub fn send(&self, item: T) {
        self.counters.queued.fetch_add(1, Ordering::AcqRel);
        if self.inner.send(Message::Item(item)).is_err() {
            // Receiver dropped: nobody will ever read it.
            self.counters.queued.fetch_sub(1, Ordering::AcqRel);
        }
    }
}

impl<T> Clone for Sender<T> {
    fn clone(&self) -> Self {
        self.counters.senders.fetch_add(1, Ordering::AcqRel);
        Self {
            inner: self.inner.clone(),
            counters: Arc::clone(&self.counters),
        }
    }
}

impl<T> Drop for Sender<T> {
    fn drop(&mut self) {
        if self.counters.senders.fetch_sub(1, Ordering::AcqRel) == 1 {
            let _ = self.inner.send(Message::Hangup);
        }
    }
}

impl<T> Receiver<T> {
    /// Create a new producer for this channel.
    pub fn make_sender(&self) -> Sender<T> {
        self.counters.senders.fetch_add(1, Ordering::AcqRel);
        Sender {
            inner: self.loopback.clone(),
            counters: Arc::clone(&self.counters),
        }
    }

    /// Block until an item arrives. Returns `None` once the queue is empty and
    /// no sender is left.
    pub fn receive(&self) -> Option<T> {
        loop {
            if self.has_quitted() {
                return None;
            }
            match self.inner.recv() {
                Ok(Message::Item(item)) => return Some(self.take(item)),
                // Either end-of-stream (re-checked above) or a stale marker
                // from a generation of senders that has since been replaced.
                Ok(Message::Hangup) => {}
                Err(_) => return None,
            }
        }
    }

    /// Return the next item if one is already queued.
    pub fn receive_non_blocking(&self) -> Option<T> {
        loop {
            match self.inner.try_recv() {
                Ok(Message::Item(item)) => return Some(self.take(item)),
                Ok(Message::Hangup) => {}
                Err(_) => return None,
            }
        }
    }

    /// Whether at least one item is queued.
    pub fn has_pending(&self) -> bool {
        self.counters.queued.load(Ordering::Acquire) > 0
    }

    /// Whether the queue is drained and every sender has been dropped.
    pub fn has_quitted(&self) -> bool {
        self.counters.senders.load(Ordering::Acquire) == 0 && !self.has_pending()
    }

    /// Number of live senders.
    pub fn sender_count(&self) -> usize {
        self.counters.senders.load(Ordering::Acquire)
    }

    fn take(&self, item: T) -> T {
        self.counters.queued.fetch_sub(1, Ordering::AcqRel);
        item
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_channel_basic() {
        let receiver = channel::<i32>();
        let sender = receiver.make_sender();
        assert!(!receiver.has_pending());
        sender.send(1);
        sender.send(2);
        assert!(receiver.has_pending());
        assert_eq!(receiver.receive(), Some(1));
        assert_eq!(receiver.receive_non_blocking(), Some(2));
        assert_eq!(receiver.receive_non_blocking(), None);
        assert!(!receiver.has_quitted());
    }

    #[test]
    fn test_channel_end_of_stream() {
        let receiver = channel::<i32>();
        let sender = receiver.make_sender();
        let clone = sender.clone();
        assert_eq!(receiver.sender_count(), 2);
        sender.send(7);
        drop(sender);
        drop(clone);

        // Items queued before the hangup are still delivered.
        assert!(!receiver.has_quitted());
        assert_eq!(receiver.receive(), Some(7));
        assert!(receiver.has_quitted());
        assert_eq!(receiver.receive(), None);
        assert_eq!(receiver.receive(), None);
    }

    #[test]
    fn test_channel_receive_wakes_on_hangup() {
        let receiver = channel::<i32>();
        let sender = receiver.make_sender();
        let producer = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            drop(sender);
        });
        assert_eq!(receiver.receive(), None);
        producer.join().unwrap();
    }

    #[test]
    fn test_channel_reopen_after_hangup() {
        let receiver = channel::<&str>();
        drop(receiver.make_sender());
        assert!(receiver.has_quitted());

        let sender = receiver.make_sender();
        sender.send("again");
        assert!(!receiver.has_quitted());
        assert_eq!(receiver.receive(), Some("again"));
    }

    #[test]
    fn test_channel_multi_producer_order() {
        let receiver = channel::<(u8, u32)>();
        let handles: Vec<_> = (0..3u8)
            .map(|id| {
                let sender = receiver.make_sender();
                thread::spawn(move || {
                    for n in 0..100 {
                        sender.send((id, n));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let mut last = [None::<u32>; 3];
        let mut count = 0;
        while let Some((id, n)) = receiver.receive() {
            let slot = &mut last[usize::from(id)];
            assert!(slot.map_or(true, |prev| prev < n), "per-producer FIFO");
            *slot = Some(n);
            count += 1;
        }
        assert_eq!(count, 300);
    }
}
