//! Tick-driven task scheduler.
//!
//! The host calls [`TickScheduler::tick`] once per server tick. Tasks are
//! plain closures; they run on the ticking thread with the scheduler unlocked
//! so they may schedule or cancel other tasks.

use crate::error::{GuiError, GuiResult};
use parking_lot::Mutex;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{error, trace};

type TaskFn = Arc<Mutex<Box<dyn FnMut() + Send>>>;

/// Cancellation handle for a scheduled task. Cancelling twice is a no-op.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    id: u64,
    cancelled: Arc<AtomicBool>,
}

impl TaskHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

struct ScheduledTask {
    handle: TaskHandle,
    next_run: u64,
    period: Option<u64>,
    callback: TaskFn,
}

#[derive(Default)]
struct SchedulerState {
    tick: u64,
    tasks: Vec<ScheduledTask>,
}

#[derive(Default)]
pub struct TickScheduler {
    state: Mutex<SchedulerState>,
    next_id: AtomicU64,
}

impl TickScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `task` once, `delay` ticks from now. A delay of 0 runs it on the
    /// next tick.
    pub fn schedule_once<F>(&self, delay: u64, task: F) -> TaskHandle
    where
        F: FnOnce() + Send + 'static,
    {
        let mut task = Some(task);
        self.insert(delay, None, move || {
            if let Some(task) = task.take() {
                task();
            }
        })
    }

    /// Runs `task` first after `delay` ticks and then every `period` ticks.
    pub fn schedule_repeating<F>(&self, delay: u64, period: u64, task: F) -> GuiResult<TaskHandle>
    where
        F: FnMut() + Send + 'static,
    {
        if period == 0 {
            return Err(GuiError::InvalidPeriod);
        }
        Ok(self.insert(delay, Some(period), task))
    }

    fn insert<F>(&self, delay: u64, period: Option<u64>, task: F) -> TaskHandle
    where
        F: FnMut() + Send + 'static,
    {
        let handle = TaskHandle {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            cancelled: Arc::new(AtomicBool::new(false)),
        };
        let mut state = self.state.lock();
        let next_run = state.tick + delay.max(1);
        state.tasks.push(ScheduledTask {
            handle: handle.clone(),
            next_run,
            period,
            callback: Arc::new(Mutex::new(Box::new(task))),
        });
        trace!("Scheduled task {} for tick {}", handle.id, next_run);
        handle
    }

    /// Advances one tick and runs everything due. Returns how many tasks ran.
    ///
    /// A task cancelled by an earlier task of the same tick is skipped.
    pub fn tick(&self) -> usize {
        let due: Vec<(TaskHandle, bool, TaskFn)> = {
            let mut state = self.state.lock();
            state.tick += 1;
            let now = state.tick;
            state.tasks.retain(|task| !task.handle.is_cancelled());

            let mut due = Vec::new();
            for task in state.tasks.iter_mut().filter(|t| t.next_run <= now) {
                due.push((task.handle.clone(), task.period.is_none(), task.callback.clone()));
                if let Some(period) = task.period {
                    task.next_run = now + period;
                }
            }
            state.tasks.retain(|task| task.period.is_some() || task.next_run > now);
            due
        };

        let mut ran = 0;
        for (handle, once, callback) in &due {
            if handle.is_cancelled() {
                trace!("Skipping task {}, cancelled earlier this tick", handle.id);
                continue;
            }
            let result = catch_unwind(AssertUnwindSafe(|| {
                let mut task = callback.lock();
                (*task)()
            }));
            if let Err(panic) = result {
                error!("Scheduled task {} panicked: {}", handle.id, GuiError::from_panic(panic));
            }
            if *once {
                handle.cancel();
            }
            ran += 1;
        }
        ran
    }

    pub fn current_tick(&self) -> u64 {
        self.state.lock().tick
    }

    /// Tasks still waiting to run.
    pub fn pending(&self) -> usize {
        self.state
            .lock()
            .tasks
            .iter()
            .filter(|t| !t.handle.is_cancelled())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_repeating_task_period() {
        let scheduler = TickScheduler::new();
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        scheduler
            .schedule_repeating(20, 20, move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        for _ in 0..19 {
            scheduler.tick();
        }
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        scheduler.tick();
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        for _ in 0..40 {
            scheduler.tick();
        }
        assert_eq!(runs.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_once_runs_once_and_cancel_is_idempotent() {
        let scheduler = TickScheduler::new();
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        scheduler.schedule_once(2, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let counter = runs.clone();
        let cancelled = scheduler.schedule_once(1, move || {
            counter.fetch_add(100, Ordering::SeqCst);
        });
        cancelled.cancel();
        cancelled.cancel();

        for _ in 0..5 {
            scheduler.tick();
        }
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(scheduler.current_tick(), 5);
    }

    #[test]
    fn test_zero_period_rejected() {
        let scheduler = TickScheduler::new();
        assert!(matches!(
            scheduler.schedule_repeating(0, 0, || {}),
            Err(GuiError::InvalidPeriod)
        ));
    }

    #[test]
    fn test_panicking_task_is_isolated() {
        let scheduler = TickScheduler::new();
        let runs = Arc::new(AtomicUsize::new(0));
        scheduler.schedule_once(1, || panic!("boom"));
        let counter = runs.clone();
        scheduler.schedule_once(1, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(scheduler.tick(), 2);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_task_cancelled_earlier_in_same_tick_does_not_run() {
        let scheduler = TickScheduler::new();
        let runs = Arc::new(AtomicUsize::new(0));
        let victim: Arc<Mutex<Option<TaskHandle>>> = Arc::new(Mutex::new(None));

        let target = victim.clone();
        scheduler.schedule_once(1, move || {
            if let Some(handle) = target.lock().as_ref() {
                handle.cancel();
            }
        });
        let counter = runs.clone();
        let handle = scheduler
            .schedule_repeating(1, 1, move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        *victim.lock() = Some(handle.clone());

        assert_eq!(scheduler.tick(), 1);
        scheduler.tick();
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        assert!(handle.is_cancelled());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_finished_once_task_reads_as_cancelled() {
        let scheduler = TickScheduler::new();
        let handle = scheduler.schedule_once(1, || {});
        assert!(!handle.is_cancelled());
        scheduler.tick();
        assert!(handle.is_cancelled());
    }

    #[test]
    fn test_tasks_may_schedule_from_inside() {
        let scheduler = Arc::new(TickScheduler::new());
        let runs = Arc::new(AtomicUsize::new(0));
        let inner = scheduler.clone();
        let counter = runs.clone();
        scheduler.schedule_once(1, move || {
            let counter = counter.clone();
            inner.schedule_once(1, move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        });

        scheduler.tick();
        scheduler.tick();
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }
}
