/// Fixed-size pool of persistent worker threads.
///
/// Work is a flat batch of independent closures. `queue_task` only records a
/// closure; `execute` hands queued closures to idle workers, wakes them, and
/// blocks the calling thread until the whole batch has drained.
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{error, trace};

use crate::error::{Result, TornadoError};
use crate::{count_add, count_call};

pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Lifecycle of a queued task
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum TaskState {
    Queued = 0,
    Assigned = 1,
    Computing = 2,
    Finished = 3,
}

impl TaskState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => TaskState::Queued,
            1 => TaskState::Assigned,
            2 => TaskState::Computing,
            _ => TaskState::Finished,
        }
    }
}

/// A closure plus its shared state cell.
/// The state cell is shared with the worker that ends up running the closure.
pub struct WorkerTask {
    job: Option<Job>,
    state: Arc<AtomicU8>,
}

impl WorkerTask {
    fn new(job: Job) -> Self {
        Self {
            job: Some(job),
            state: Arc::new(AtomicU8::new(TaskState::Queued as u8)),
        }
    }

    pub fn state(&self) -> TaskState {
        TaskState::from_u8(self.state.load(Ordering::Acquire))
    }
}

/// What a worker finds in its mailbox when it wakes up
struct Assignment {
    job: Job,
    state: Arc<AtomicU8>,
}

#[derive(Default)]
struct WorkerSlot {
    assignment: Option<Assignment>,
    computing: bool,
}

impl WorkerSlot {
    #[inline]
    fn is_idle(&self) -> bool {
        self.assignment.is_none() && !self.computing
    }
}

struct PoolShared {
    slots: Mutex<Vec<WorkerSlot>>,
    wake: Condvar,
    stopping: AtomicBool,
    panicked: AtomicU64,
}

impl PoolShared {
    // Tasks never run under this lock, so a poisoned guard is still consistent.
    fn lock_slots(&self) -> MutexGuard<'_, Vec<WorkerSlot>> {
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

pub struct WorkerPool {
    shared: Arc<PoolShared>,
    handles: Vec<JoinHandle<()>>,
    queue: Vec<WorkerTask>,
}

impl WorkerPool {
    /// Spawns `num_workers` threads. Zero means "one per hardware thread".
    pub fn new(num_workers: usize) -> Result<Self> {
        let num_workers = if num_workers == 0 {
            thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        } else {
            num_workers
        };

        let shared = Arc::new(PoolShared {
            slots: Mutex::new((0..num_workers).map(|_| WorkerSlot::default()).collect()),
            wake: Condvar::new(),
            stopping: AtomicBool::new(false),
            panicked: AtomicU64::new(0),
        });

        // Workers that did start are stopped and joined by Drop if a later spawn fails
        let mut pool = Self {
            shared,
            handles: Vec::with_capacity(num_workers),
            queue: Vec::new(),
        };
        for id in 0..num_workers {
            let shared = Arc::clone(&pool.shared);
            let handle = thread::Builder::new()
                .name(format!("tornado-worker-{id}"))
                .spawn(move || worker_lifecycle(id, shared))
                .map_err(|source| TornadoError::WorkerSpawn { id, source })?;
            pool.handles.push(handle);
        }

        Ok(pool)
    }

    /// Appends a task to the batch. No worker is woken until `execute`.
    pub fn queue_task<F>(&mut self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.queue.push(WorkerTask::new(Box::new(task)));
    }

    /// Runs every queued task and returns once all of them have finished.
    pub fn execute(&mut self) {
        if self.queue.is_empty() {
            return;
        }
        trace!(tasks = self.queue.len(), workers = self.num_workers(), "dispatching batch");

        let mut next_unassigned = 0;
        while next_unassigned < self.queue.len() {
            let mut assigned_any = false;
            {
                let mut slots = self.shared.lock_slots();
                for slot in slots.iter_mut().filter(|s| s.is_idle()) {
                    let Some(task) = self.queue.get_mut(next_unassigned) else {
                        break;
                    };
                    if let Some(job) = task.job.take() {
                        task.state.store(TaskState::Assigned as u8, Ordering::Release);
                        slot.assignment = Some(Assignment {
                            job,
                            state: Arc::clone(&task.state),
                        });
                        assigned_any = true;
                    }
                    next_unassigned += 1;
                }
            }

            if assigned_any {
                self.shared.wake.notify_all();
            } else {
                thread::yield_now();
            }
        }

        // Everything is handed out; wait for the stragglers.
        loop {
            if self.shared.lock_slots().iter().all(WorkerSlot::is_idle) {
                break;
            }
            thread::sleep(Duration::from_micros(20));
        }

        count_add!(pool_tasks_executed, self.queue.len() as u64);
        self.queue.clear();
    }

    /// Number of tasks that have not been handed to a worker yet
    pub fn queue_length(&self) -> usize {
        self.queue
            .iter()
            .filter(|t| t.state() == TaskState::Queued)
            .count()
    }

    pub fn num_workers(&self) -> usize {
        self.handles.len()
    }

    pub fn num_active_workers(&self) -> usize {
        self.shared
            .lock_slots()
            .iter()
            .filter(|s| !s.is_idle())
            .count()
    }

    /// Tasks that panicked since the pool was created
    pub fn panicked_tasks(&self) -> u64 {
        self.shared.panicked.load(Ordering::Relaxed)
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shared.stopping.store(true, Ordering::Release);

        // Take the slot lock so no worker can miss the wakeup between
        // checking the stop flag and going to sleep.
        drop(self.shared.lock_slots());
        self.shared.wake.notify_all();

        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
    }
}

fn worker_lifecycle(id: usize, shared: Arc<PoolShared>) {
    loop {
        let assignment = {
            let mut slots = shared.lock_slots();
            loop {
                if shared.stopping.load(Ordering::Acquire) {
                    return;
                }
                if let Some(assignment) = slots[id].assignment.take() {
                    slots[id].computing = true;
                    break assignment;
                }
                slots = shared
                    .wake
                    .wait(slots)
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
            }
        };

        assignment
            .state
            .store(TaskState::Computing as u8, Ordering::Release);

        let job = assignment.job;
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(job)) {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_owned())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".to_owned());
            error!(worker = id, %message, "worker task panicked");
            shared.panicked.fetch_add(1, Ordering::Relaxed);
        }
        count_call!(pool_tasks_completed);

        assignment
            .state
            .store(TaskState::Finished as u8, Ordering::Release);
        shared.lock_slots()[id].computing = false;
    }
}
