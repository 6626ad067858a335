//! The single-writer serialization queue.
//!
//! A bounded channel plus one dedicated worker thread turn concurrent
//! callers into a strictly sequential stream of transactions against one
//! `rusqlite::Connection`, so nothing above this crate needs its own
//! locking discipline around the database.

use std::any::Any;
use std::path::Path;
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::thread::JoinHandle;
use std::time::Duration;

use quest_core::QuestError;
use rusqlite::Connection;

/// Bounded channel capacity: submitters block once this many tasks are
/// queued.
pub const DEFAULT_CAPACITY: usize = 100;
/// Maximum attempts per work unit before the error is surfaced to the caller.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
/// Linear backoff unit: the worker sleeps `attempt * base_delay` between
/// attempts, never after the last one.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(100);

type BoxedResult = Result<Box<dyn Any + Send>, QuestError>;
type BoxedOp = Box<dyn Fn(&Connection) -> BoxedResult + Send>;
type BoxedReply = Box<dyn FnOnce(BoxedResult) + Send>;

struct Task {
    op: BoxedOp,
    reply: BoxedReply,
}

/// Tuning knobs for a [`Queue`]. Tests shrink `base_delay` so retry tests
/// stay fast.
#[derive(Debug, Clone, Copy)]
pub struct QueueConfig {
    pub capacity: usize,
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl QueueConfig {
    /// A config tuned for tests: same capacity and attempt budget, a
    /// millisecond base delay instead of 100ms.
    pub fn for_tests() -> Self {
        Self {
            base_delay: Duration::from_millis(1),
            ..Self::default()
        }
    }
}

/// The single-writer FIFO that owns the database connection.
///
/// `execute` is the one primitive: submit a closure over a live
/// `&Connection`, block until the worker thread has run it to completion
/// (with retry) and get the result back. Work units run strictly in
/// submission order, one at a time.
pub struct Queue {
    sender: Option<SyncSender<Task>>,
    worker: Option<JoinHandle<()>>,
    max_attempts: u32,
}

impl Queue {
    /// Open `path` (creating it if needed) on a dedicated worker thread.
    /// `init` runs once inside that thread before the first task is served,
    /// so schema setup observes the same single-writer guarantee as every
    /// other statement.
    pub fn open<F>(
        path: impl AsRef<Path>,
        config: QueueConfig,
        init: F,
    ) -> quest_core::Result<Self>
    where
        F: FnOnce(&Connection) -> quest_core::Result<()> + Send + 'static,
    {
        let path = path.as_ref().to_owned();
        Self::start(
            config,
            move || Connection::open(&path).map_err(QuestError::from),
            init,
        )
    }

    /// Open an in-memory database. Used by property tests and by callers
    /// that want an ephemeral store.
    pub fn open_in_memory<F>(config: QueueConfig, init: F) -> quest_core::Result<Self>
    where
        F: FnOnce(&Connection) -> quest_core::Result<()> + Send + 'static,
    {
        Self::start(
            config,
            || Connection::open_in_memory().map_err(QuestError::from),
            init,
        )
    }

    fn start<O, F>(config: QueueConfig, open_conn: O, init: F) -> quest_core::Result<Self>
    where
        O: FnOnce() -> quest_core::Result<Connection> + Send + 'static,
        F: FnOnce(&Connection) -> quest_core::Result<()> + Send + 'static,
    {
        let (tx, rx): (SyncSender<Task>, Receiver<Task>) =
            mpsc::sync_channel(config.capacity.max(1));
        let (ready_tx, ready_rx) = mpsc::channel::<quest_core::Result<()>>();
        let max_attempts = config.max_attempts.max(1);
        let base_delay = config.base_delay;

        let worker = std::thread::Builder::new()
            .name("quest-queue-worker".to_string())
            .spawn(move || {
                let conn = match open_conn().and_then(|conn| {
                    init(&conn)?;
                    Ok(conn)
                }) {
                    Ok(conn) => {
                        let _ = ready_tx.send(Ok(()));
                        conn
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };

                for task in rx.iter() {
                    let mut attempt = 0u32;
                    let result = loop {
                        attempt += 1;
                        match (task.op)(&conn) {
                            Ok(value) => break Ok(value),
                            Err(err) if attempt < max_attempts => {
                                tracing::warn!(
                                    attempt,
                                    max_attempts,
                                    error = %err,
                                    "quest-queue: task failed, retrying"
                                );
                                std::thread::sleep(base_delay * attempt);
                            }
                            Err(err) => {
                                tracing::warn!(
                                    attempt,
                                    error = %err,
                                    "quest-queue: task failed, giving up"
                                );
                                break Err(err);
                            }
                        }
                    };
                    (task.reply)(result);
                }
            })
            .expect("failed to spawn quest-queue worker thread");

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(QuestError::QueueClosed),
        }

        Ok(Self {
            sender: Some(tx),
            worker: Some(worker),
            max_attempts,
        })
    }

    /// Submit `work` and block until it (or its retries) complete.
    ///
    /// `work` is `Fn`, not `FnOnce`: the worker may call it more than once
    /// on retry, so it must not consume anything it captures.
    pub fn execute<T, W>(&self, work: W) -> quest_core::Result<T>
    where
        T: Send + 'static,
        W: Fn(&Connection) -> quest_core::Result<T> + Send + 'static,
    {
        let sender = self.sender.as_ref().ok_or(QuestError::QueueClosed)?;
        let (reply_tx, reply_rx) = mpsc::sync_channel::<BoxedResult>(1);

        let op: BoxedOp =
            Box::new(move |conn| work(conn).map(|v| Box::new(v) as Box<dyn Any + Send>));
        let reply: BoxedReply = Box::new(move |result| {
            let _ = reply_tx.send(result);
        });

        sender
            .send(Task { op, reply })
            .map_err(|_| QuestError::QueueClosed)?;

        let boxed = reply_rx.recv().map_err(|_| QuestError::QueueClosed)??;
        Ok(*boxed
            .downcast::<T>()
            .expect("quest-queue: task result type mismatch"))
    }

    /// The retry budget this queue was configured with.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Close the submission side and wait for the worker to drain and exit.
    /// Submitting after this returns `QuestError::QueueClosed`.
    pub fn shutdown(&mut self) {
        self.sender.take();
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Queue {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn test_queue() -> Queue {
        Queue::open_in_memory(QueueConfig::for_tests(), |_| Ok(())).unwrap()
    }

    #[test]
    fn execute_runs_work_against_a_live_connection() {
        let queue = test_queue();
        queue
            .execute(|conn| {
                conn.execute("CREATE TABLE t (id INTEGER)", [])?;
                Ok(())
            })
            .unwrap();

        let count: i64 = queue
            .execute(|conn| {
                conn.query_row("SELECT count(*) FROM t", [], |row| row.get(0))
                    .map_err(QuestError::from)
            })
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn succeeds_on_third_attempt_with_exactly_three_tries() {
        let queue = test_queue();
        let attempts = Arc::new(AtomicU32::new(0));
        let counted = attempts.clone();

        let result: quest_core::Result<i32> = queue.execute(move |_conn| {
            let n = counted.fetch_add(1, Ordering::SeqCst) + 1;
            if n < 3 {
                Err(QuestError::Constraint("transient".into()))
            } else {
                Ok(42)
            }
        });

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn fails_after_exactly_three_attempts() {
        let queue = test_queue();
        let attempts = Arc::new(AtomicU32::new(0));
        let counted = attempts.clone();

        let result: quest_core::Result<()> = queue.execute(move |_conn| {
            counted.fetch_add(1, Ordering::SeqCst);
            Err(QuestError::Constraint("permanent".into()))
        });

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn results_are_delivered_in_submission_order_per_submitter() {
        let queue = test_queue();
        queue
            .execute(|conn| {
                conn.execute("CREATE TABLE seq (n INTEGER)", [])?;
                Ok(())
            })
            .unwrap();

        for i in 0..20i64 {
            queue
                .execute(move |conn| {
                    conn.execute("INSERT INTO seq (n) VALUES (?1)", [i])?;
                    Ok(())
                })
                .unwrap();
        }

        let values: Vec<i64> = {
            let conn_check: Vec<i64> = queue
                .execute(|conn| {
                    let mut stmt = conn.prepare("SELECT n FROM seq ORDER BY rowid")?;
                    let rows = stmt
                        .query_map([], |row| row.get(0))?
                        .collect::<Result<Vec<i64>, _>>()?;
                    Ok(rows)
                })
                .unwrap();
            conn_check
        };

        assert_eq!(values, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn shutdown_then_execute_is_queue_closed() {
        let mut queue = test_queue();
        queue.shutdown();
        let result: quest_core::Result<()> = queue.execute(|_| Ok(()));
        assert!(matches!(result, Err(QuestError::QueueClosed)));
    }

    #[test]
    fn init_error_propagates_from_open() {
        let result = Queue::open_in_memory(QueueConfig::for_tests(), |_conn| {
            Err(QuestError::Constraint("bad schema".into()))
        });
        assert!(result.is_err());
    }
}
