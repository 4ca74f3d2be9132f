//! Cooperative task table driven by the shell's frame pump.
//!
//! Two styles of game loop live here. Interval tasks fire on a fixed period
//! whether or not the game is paused, so they check the pause flag themselves.
//! Frame tasks run once per pump and may return [`FrameControl::Suspend`];
//! a suspended frame task is skipped until someone calls
//! [`Scheduler::resume`], which is exactly what a resume hook does.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(u64);

/// What a frame task wants after running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameControl {
    Continue,
    Suspend,
}

enum Job {
    Interval {
        period: Duration,
        next_due: Instant,
        run: Box<dyn FnMut()>,
    },
    Timeout {
        due: Instant,
        run: Box<dyn FnOnce()>,
    },
    Frame {
        suspended: bool,
        run: Box<dyn FnMut() -> FrameControl>,
    },
}

struct SchedulerState {
    now: Instant,
    next_id: u64,
    jobs: BTreeMap<TaskId, Job>,
    /// Task currently executing (taken out of `jobs`).
    running: Option<TaskId>,
    /// Set when the running task is cancelled from inside itself.
    running_cancelled: bool,
    /// Period change requested for the running interval task.
    running_period: Option<Duration>,
}

/// Shared handle to the host's task table.
#[derive(Clone)]
pub struct Scheduler {
    state: Rc<RefCell<SchedulerState>>,
}

impl Scheduler {
    pub fn new(now: Instant) -> Self {
        Self {
            state: Rc::new(RefCell::new(SchedulerState {
                now,
                next_id: 1,
                jobs: BTreeMap::new(),
                running: None,
                running_cancelled: false,
                running_period: None,
            })),
        }
    }

    /// Time of the latest pump.
    pub fn now(&self) -> Instant {
        self.state.borrow().now
    }

    fn insert(&self, job: Job) -> TaskId {
        let mut state = self.state.borrow_mut();
        let id = TaskId(state.next_id);
        state.next_id += 1;
        state.jobs.insert(id, job);
        id
    }

    /// Runs `run` every `period`, first one `period` from now.
    pub fn every(&self, period: Duration, run: impl FnMut() + 'static) -> TaskId {
        let next_due = self.now() + period;
        self.insert(Job::Interval {
            period,
            next_due,
            run: Box::new(run),
        })
    }

    /// Runs `run` once after `delay`.
    pub fn after(&self, delay: Duration, run: impl FnOnce() + 'static) -> TaskId {
        let due = self.now() + delay;
        self.insert(Job::Timeout {
            due,
            run: Box::new(run),
        })
    }

    /// Runs `run` on every pump until it returns [`FrameControl::Suspend`].
    pub fn frame(&self, run: impl FnMut() -> FrameControl + 'static) -> TaskId {
        self.insert(Job::Frame {
            suspended: false,
            run: Box::new(run),
        })
    }

    /// Id of the task being run, when called from inside one.
    pub fn current(&self) -> Option<TaskId> {
        self.state.borrow().running
    }

    /// Changes the period of an interval task, counted from now.
    pub fn set_period(&self, id: TaskId, period: Duration) {
        let mut state = self.state.borrow_mut();
        if state.running == Some(id) {
            state.running_period = Some(period);
            return;
        }
        let now = state.now;
        if let Some(Job::Interval {
            period: current,
            next_due,
            ..
        }) = state.jobs.get_mut(&id)
        {
            *current = period;
            *next_due = now + period;
        }
    }

    /// Re-enters a suspended frame task. Returns whether it was suspended.
    pub fn resume(&self, id: TaskId) -> bool {
        match self.state.borrow_mut().jobs.get_mut(&id) {
            Some(Job::Frame { suspended, .. }) if *suspended => {
                *suspended = false;
                true
            }
            _ => false,
        }
    }

    pub fn suspend(&self, id: TaskId) {
        if let Some(Job::Frame { suspended, .. }) = self.state.borrow_mut().jobs.get_mut(&id) {
            *suspended = true;
        }
    }

    pub fn is_suspended(&self, id: TaskId) -> bool {
        matches!(
            self.state.borrow().jobs.get(&id),
            Some(Job::Frame { suspended: true, .. })
        )
    }

    pub fn is_scheduled(&self, id: TaskId) -> bool {
        let state = self.state.borrow();
        state.jobs.contains_key(&id) || (state.running == Some(id) && !state.running_cancelled)
    }

    pub fn cancel(&self, id: TaskId) {
        let mut state = self.state.borrow_mut();
        if state.jobs.remove(&id).is_none() && state.running == Some(id) {
            state.running_cancelled = true;
        }
    }

    /// Drops every task, including the one currently running.
    pub fn cancel_all(&self) {
        let mut state = self.state.borrow_mut();
        state.jobs.clear();
        if state.running.is_some() {
            state.running_cancelled = true;
        }
    }

    /// Number of live tasks, suspended ones included.
    pub fn len(&self) -> usize {
        let state = self.state.borrow();
        state.jobs.len() + usize::from(state.running.is_some() && !state.running_cancelled)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Advances the clock to `now`, runs every due timer, then every
    /// non-suspended frame task once. Tasks created during the pump first run
    /// on the next one.
    pub fn pump(&self, now: Instant) {
        let candidates: Vec<TaskId> = {
            let mut state = self.state.borrow_mut();
            if now > state.now {
                state.now = now;
            }
            state.jobs.keys().copied().collect()
        };

        // Timers first so a frame sees this pump's interval effects.
        for &id in &candidates {
            self.run_if(id, |job| match job {
                Job::Interval { next_due, .. } => *next_due <= now,
                Job::Timeout { due, .. } => *due <= now,
                Job::Frame { .. } => false,
            });
        }
        for &id in &candidates {
            self.run_if(id, |job| matches!(job, Job::Frame { suspended: false, .. }));
        }
    }

    fn run_if(&self, id: TaskId, ready: impl Fn(&Job) -> bool) {
        let job = {
            let mut state = self.state.borrow_mut();
            match state.jobs.get(&id) {
                Some(job) if ready(job) => {}
                _ => return,
            }
            state.running = Some(id);
            state.running_cancelled = false;
            state.running_period = None;
            state.jobs.remove(&id)
        };
        let Some(job) = job else { return };

        trace!(?id, "running task");
        let survivor = match job {
            Job::Interval {
                period,
                next_due,
                mut run,
            } => {
                run();
                let now = self.now();
                let mut next_due = next_due + period;
                if next_due <= now {
                    // Fell behind: fire once, then re-align instead of bursting.
                    next_due = now + period;
                }
                Some(Job::Interval {
                    period,
                    next_due,
                    run,
                })
            }
            Job::Timeout { run, .. } => {
                run();
                None
            }
            Job::Frame { mut run, .. } => {
                let control = run();
                Some(Job::Frame {
                    suspended: control == FrameControl::Suspend,
                    run,
                })
            }
        };

        let mut state = self.state.borrow_mut();
        state.running = None;
        if state.running_cancelled {
            state.running_cancelled = false;
            return;
        }
        if let Some(mut job) = survivor {
            if let (Some(new_period), Job::Interval { period, next_due, .. }) =
                (state.running_period.take(), &mut job)
            {
                *period = new_period;
                *next_due = state.now + new_period;
            }
            state.jobs.insert(id, job);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn counter() -> (Rc<Cell<u32>>, impl FnMut() + 'static) {
        let count = Rc::new(Cell::new(0));
        let inner = Rc::clone(&count);
        (count, move || inner.set(inner.get() + 1))
    }

    #[test]
    fn interval_fires_on_period_and_realigns_when_late() {
        let t0 = Instant::now();
        let scheduler = Scheduler::new(t0);
        let (count, tick) = counter();
        scheduler.every(ms(100), tick);

        scheduler.pump(t0 + ms(50));
        assert_eq!(count.get(), 0);
        scheduler.pump(t0 + ms(100));
        assert_eq!(count.get(), 1);
        // Way behind: one catch-up run, not five.
        scheduler.pump(t0 + ms(650));
        assert_eq!(count.get(), 2);
        scheduler.pump(t0 + ms(700));
        assert_eq!(count.get(), 2);
        scheduler.pump(t0 + ms(750));
        assert_eq!(count.get(), 3);
    }

    #[test]
    fn timeout_runs_once() {
        let t0 = Instant::now();
        let scheduler = Scheduler::new(t0);
        let (count, tick) = counter();
        let id = scheduler.after(ms(300), tick);
        scheduler.pump(t0 + ms(299));
        assert!(scheduler.is_scheduled(id));
        scheduler.pump(t0 + ms(300));
        scheduler.pump(t0 + ms(900));
        assert_eq!(count.get(), 1);
        assert!(!scheduler.is_scheduled(id));
    }

    #[test]
    fn suspended_frame_task_waits_for_resume() {
        let t0 = Instant::now();
        let scheduler = Scheduler::new(t0);
        let runs = Rc::new(Cell::new(0));
        let inner = Rc::clone(&runs);
        let id = scheduler.frame(move || {
            inner.set(inner.get() + 1);
            if inner.get() == 2 {
                FrameControl::Suspend
            } else {
                FrameControl::Continue
            }
        });

        for i in 1..=5 {
            scheduler.pump(t0 + ms(16 * i));
        }
        assert_eq!(runs.get(), 2);
        assert!(scheduler.is_suspended(id));

        assert!(scheduler.resume(id));
        assert!(!scheduler.resume(id));
        scheduler.pump(t0 + ms(200));
        assert_eq!(runs.get(), 3);
    }

    #[test]
    fn task_can_cancel_itself() {
        let t0 = Instant::now();
        let scheduler = Scheduler::new(t0);
        let handle = scheduler.clone();
        let slot: Rc<Cell<Option<TaskId>>> = Rc::new(Cell::new(None));
        let own = Rc::clone(&slot);
        let id = scheduler.every(ms(10), move || {
            if let Some(id) = own.get() {
                handle.cancel(id);
            }
        });
        slot.set(Some(id));
        scheduler.pump(t0 + ms(10));
        assert!(!scheduler.is_scheduled(id));
        assert!(scheduler.is_empty());
    }

    #[test]
    fn tasks_scheduled_during_pump_wait_for_next_pump() {
        let t0 = Instant::now();
        let scheduler = Scheduler::new(t0);
        let handle = scheduler.clone();
        let (count, tick) = counter();
        let tick = Rc::new(RefCell::new(Some(tick)));
        scheduler.after(ms(0), move || {
            if let Some(mut tick) = tick.borrow_mut().take() {
                handle.frame(move || {
                    tick();
                    FrameControl::Continue
                });
            }
        });
        scheduler.pump(t0);
        assert_eq!(count.get(), 0);
        scheduler.pump(t0 + ms(16));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn cancel_all_clears_everything() {
        let t0 = Instant::now();
        let scheduler = Scheduler::new(t0);
        let (count, tick) = counter();
        scheduler.every(ms(10), tick);
        scheduler.frame(|| FrameControl::Continue);
        scheduler.after(ms(5), || {});
        assert_eq!(scheduler.len(), 3);
        scheduler.cancel_all();
        scheduler.pump(t0 + ms(100));
        assert_eq!(count.get(), 0);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn set_period_from_inside_task() {
        let t0 = Instant::now();
        let scheduler = Scheduler::new(t0);
        let handle = scheduler.clone();
        let slot: Rc<Cell<Option<TaskId>>> = Rc::new(Cell::new(None));
        let own = Rc::clone(&slot);
        let (count, mut tick) = counter();
        let id = scheduler.every(ms(100), move || {
            tick();
            if let Some(id) = own.get() {
                handle.set_period(id, ms(50));
            }
        });
        slot.set(Some(id));
        scheduler.pump(t0 + ms(100));
        scheduler.pump(t0 + ms(150));
        assert_eq!(count.get(), 2);
    }
}
