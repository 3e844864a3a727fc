//! Conversation sequencer - single-flight, FIFO task execution per
//! conversation.
//!
//! This is the central concurrency-correctness mechanism: it is what makes
//! "the user sent two messages within 50 ms" safe against interleaved state
//! mutation. Tasks for different conversations run fully concurrently.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::domain::foundation::ConversationId;

/// Keyed registry of in-flight conversation chains.
///
/// One instance per process, constructed with no ambient globals. Each
/// conversation id maps to the tail of its chain; an enqueued task first
/// awaits the captured predecessor (swallowing its failure), runs, then
/// removes its registry entry if a later enqueue has not already replaced
/// it.
pub struct ConversationSequencer {
    slots: Mutex<HashMap<ConversationId, Slot>>,
    next_generation: AtomicU64,
}

struct Slot {
    generation: u64,
    done: oneshot::Receiver<()>,
}

impl ConversationSequencer {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            next_generation: AtomicU64::new(0),
        }
    }

    /// Enqueues `task` behind any in-flight work for `conversation`.
    ///
    /// The predecessor slot is captured and replaced synchronously, so the
    /// chain order is the call order. The returned handle resolves with
    /// the task's own result. A failed or panicked predecessor never
    /// aborts a later independent task; its completion signal is awaited
    /// and its error discarded.
    pub fn enqueue<F, T>(self: &Arc<Self>, conversation: ConversationId, task: F) -> JoinHandle<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (done_tx, done_rx) = oneshot::channel();
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);

        let predecessor = self.slots_guard().insert(
            conversation.clone(),
            Slot {
                generation,
                done: done_rx,
            },
        );

        let guard = SlotGuard {
            registry: Arc::clone(self),
            conversation,
            generation,
            done_tx: Some(done_tx),
        };
        tokio::spawn(async move {
            // Held across the task so a panic still signals the successor
            // and releases the registry entry during unwind.
            let _guard = guard;
            if let Some(prev) = predecessor {
                // Err means the predecessor dropped its sender (panic or
                // abort); either way its slot is free now.
                let _ = prev.done.await;
            }

            task.await
        })
    }

    /// Number of conversations with an installed chain (test observability).
    pub fn active_conversations(&self) -> usize {
        self.slots_guard().len()
    }

    fn slots_guard(&self) -> MutexGuard<'_, HashMap<ConversationId, Slot>> {
        // Critical sections are a map insert/remove; recover from poison.
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for ConversationSequencer {
    fn default() -> Self {
        Self::new()
    }
}

/// Signals completion and releases the registry entry when the task
/// finishes, whether it returned or unwound.
struct SlotGuard {
    registry: Arc<ConversationSequencer>,
    conversation: ConversationId,
    generation: u64,
    done_tx: Option<oneshot::Sender<()>>,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        if let Some(done_tx) = self.done_tx.take() {
            let _ = done_tx.send(());
        }
        let mut slots = self.registry.slots_guard();
        if slots.get(&self.conversation).map(|s| s.generation) == Some(self.generation) {
            slots.remove(&self.conversation);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;
    use tokio::sync::Mutex as TokioMutex;

    fn conv(addr: &str) -> ConversationId {
        ConversationId::new(addr).unwrap()
    }

    #[tokio::test]
    async fn tasks_for_one_conversation_never_overlap() {
        let sequencer = Arc::new(ConversationSequencer::new());
        let running = Arc::new(AtomicUsize::new(0));
        let overlaps = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let running = Arc::clone(&running);
            let overlaps = Arc::clone(&overlaps);
            handles.push(sequencer.enqueue(conv("919800000001"), async move {
                if running.fetch_add(1, Ordering::SeqCst) != 0 {
                    overlaps.fetch_add(1, Ordering::SeqCst);
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
                running.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(overlaps.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn tasks_run_in_enqueue_order() {
        let sequencer = Arc::new(ConversationSequencer::new());
        let seen = Arc::new(TokioMutex::new(Vec::new()));

        let mut handles = Vec::new();
        for n in 0..8 {
            let seen = Arc::clone(&seen);
            handles.push(sequencer.enqueue(conv("919800000002"), async move {
                seen.lock().await.push(n);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(*seen.lock().await, vec![0, 1, 2, 3, 4, 5, 6, 7]);
    }

    #[tokio::test]
    async fn different_conversations_run_concurrently() {
        let sequencer = Arc::new(ConversationSequencer::new());
        let started = std::time::Instant::now();

        let a = sequencer.enqueue(conv("919800000003"), async {
            tokio::time::sleep(Duration::from_millis(60)).await;
        });
        let b = sequencer.enqueue(conv("919800000004"), async {
            tokio::time::sleep(Duration::from_millis(60)).await;
        });
        a.await.unwrap();
        b.await.unwrap();

        // Serial execution would take at least 120 ms.
        assert!(started.elapsed() < Duration::from_millis(110));
    }

    #[tokio::test]
    async fn failed_predecessor_does_not_abort_successor() {
        let sequencer = Arc::new(ConversationSequencer::new());

        let panicking = sequencer.enqueue(conv("919800000005"), async {
            panic!("task blew up");
        });
        let follower = sequencer.enqueue(conv("919800000005"), async { 42 });

        assert!(panicking.await.is_err());
        assert_eq!(follower.await.unwrap(), 42);
    }

    #[tokio::test]
    async fn panicking_task_releases_its_registry_entry() {
        let sequencer = Arc::new(ConversationSequencer::new());

        let handle = sequencer.enqueue(conv("919800000008"), async {
            panic!("task blew up");
        });
        assert!(handle.await.is_err());

        assert_eq!(sequencer.active_conversations(), 0);
    }

    #[tokio::test]
    async fn registry_entry_is_removed_once_the_chain_settles() {
        let sequencer = Arc::new(ConversationSequencer::new());

        sequencer
            .enqueue(conv("919800000006"), async {})
            .await
            .unwrap();

        assert_eq!(sequencer.active_conversations(), 0);
    }

    #[tokio::test]
    async fn second_event_observes_the_firsts_mutation() {
        let sequencer = Arc::new(ConversationSequencer::new());
        let state = Arc::new(TokioMutex::new(String::from("start")));

        let first = {
            let state = Arc::clone(&state);
            sequencer.enqueue(conv("919800000007"), async move {
                // Hold the slot long enough for the second event to arrive.
                tokio::time::sleep(Duration::from_millis(10)).await;
                let mut guard = state.lock().await;
                assert_eq!(*guard, "start");
                *guard = "after-first".to_string();
            })
        };
        let second = {
            let state = Arc::clone(&state);
            sequencer.enqueue(conv("919800000007"), async move {
                let mut guard = state.lock().await;
                // No lost update: the first task's write is visible.
                assert_eq!(*guard, "after-first");
                *guard = "after-second".to_string();
            })
        };

        first.await.unwrap();
        second.await.unwrap();
        assert_eq!(*state.lock().await, "after-second");
    }
}
