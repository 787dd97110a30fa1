//! Per-frame callback dispatcher.
//!
//! Two ordered lists: `system` callbacks run before `tree` callbacks every
//! frame. Both lists are snapshotted when a frame starts, so registrations made
//! from inside a callback apply from the next frame on.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use anyhow::anyhow;
use smallvec::SmallVec;

/// Seconds since the previous frame and since the clock origin.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameTime {
    pub delta: f64,
    pub total: f64,
}

type CallbackFn = dyn FnMut(FrameTime) -> anyhow::Result<()>;

/// Shared handle to a frame callback. Identity is the allocation, so clones of
/// one handle compare equal and two closures with the same body do not.
#[derive(Clone)]
pub struct FrameCallback(Rc<RefCell<CallbackFn>>);

impl FrameCallback {
    pub fn new<F>(f: F) -> Self
    where
        F: FnMut(FrameTime) -> anyhow::Result<()> + 'static,
    {
        Self(Rc::new(RefCell::new(f)))
    }

    pub fn ptr_eq(&self, other: &FrameCallback) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }

    fn call(&self, time: FrameTime) -> anyhow::Result<()> {
        let mut f = self
            .0
            .try_borrow_mut()
            .map_err(|_| anyhow!("frame callback invoked while already running"))?;
        (&mut *f)(time)
    }
}

impl fmt::Debug for FrameCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FrameCallback({:p})", Rc::as_ptr(&self.0))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallbackList {
    System,
    Tree,
}

#[derive(Debug)]
pub struct CallbackFailure {
    pub list: CallbackList,
    pub index: usize,
    pub error: anyhow::Error,
}

/// What happened during one frame.
#[derive(Debug, Default)]
pub struct FrameReport {
    pub frame: u64,
    pub time: FrameTime,
    pub invoked: usize,
    pub failures: Vec<CallbackFailure>,
}

impl FrameReport {
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }
}

type Snapshot = SmallVec<[FrameCallback; 8]>;

pub struct FrameLoop {
    system: RefCell<Vec<FrameCallback>>,
    tree: RefCell<Vec<FrameCallback>>,
    /// Timestamp of the last frame that ran, in milliseconds.
    past: Cell<f64>,
    frames: Cell<u64>,
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameLoop {
    pub fn new() -> Self {
        Self {
            system: RefCell::new(Vec::new()),
            tree: RefCell::new(Vec::new()),
            past: Cell::new(0.0),
            frames: Cell::new(0),
        }
    }

    fn list(&self, list: CallbackList) -> &RefCell<Vec<FrameCallback>> {
        match list {
            CallbackList::System => &self.system,
            CallbackList::Tree => &self.tree,
        }
    }

    /// `append = true` pushes `callback`; `false` removes its first occurrence.
    pub fn update(&self, list: CallbackList, callback: &FrameCallback, append: bool) {
        let mut callbacks = self.list(list).borrow_mut();
        if append {
            callbacks.push(callback.clone());
        } else if let Some(pos) = callbacks.iter().position(|c| c.ptr_eq(callback)) {
            callbacks.remove(pos);
        }
    }

    pub fn update_system(&self, callback: &FrameCallback, append: bool) {
        self.update(CallbackList::System, callback, append);
    }

    pub fn update_tree(&self, callback: &FrameCallback, append: bool) {
        self.update(CallbackList::Tree, callback, append);
    }

    pub fn register_system(&self, callback: &FrameCallback) {
        self.update_system(callback, true);
    }

    pub fn unregister_system(&self, callback: &FrameCallback) {
        self.update_system(callback, false);
    }

    pub fn register_tree(&self, callback: &FrameCallback) {
        self.update_tree(callback, true);
    }

    pub fn unregister_tree(&self, callback: &FrameCallback) {
        self.update_tree(callback, false);
    }

    pub fn len(&self, list: CallbackList) -> usize {
        self.list(list).borrow().len()
    }

    pub fn contains(&self, list: CallbackList, callback: &FrameCallback) -> bool {
        self.list(list).borrow().iter().any(|c| c.ptr_eq(callback))
    }

    pub fn frames(&self) -> u64 {
        self.frames.get()
    }

    /// Timestamp of the last frame that ran, in milliseconds.
    pub fn now_ms(&self) -> f64 {
        self.past.get()
    }

    /// Drops every callback and rewinds the clock.
    pub fn reset(&self) {
        self.system.borrow_mut().clear();
        self.tree.borrow_mut().clear();
        self.past.set(0.0);
        self.frames.set(0);
    }

    /// Runs one frame at `now_ms`. Returns `None` when `now_ms` does not move
    /// the clock forward; no callbacks run for such a tick.
    pub fn tick(&self, now_ms: f64) -> Option<FrameReport> {
        let past = self.past.get();
        if !(now_ms > past) {
            log::debug!("skipping frame at {now_ms}ms, clock is at {past}ms");
            return None;
        }

        let time = FrameTime {
            delta: (now_ms - past) * 0.001,
            total: now_ms * 0.001,
        };
        self.past.set(now_ms);
        let frame = self.frames.get() + 1;
        self.frames.set(frame);

        let system: Snapshot = self.system.borrow().iter().cloned().collect();
        let tree: Snapshot = self.tree.borrow().iter().cloned().collect();

        let mut report = FrameReport {
            frame,
            time,
            ..Default::default()
        };
        for (list, callbacks) in [(CallbackList::System, system), (CallbackList::Tree, tree)] {
            for (index, callback) in callbacks.iter().enumerate() {
                report.invoked += 1;
                if let Err(error) = callback.call(time) {
                    log::error!("{list:?} frame callback #{index} failed: {error:#}");
                    report.failures.push(CallbackFailure { list, index, error });
                }
            }
        }
        Some(report)
    }
}

thread_local! {
    static DEFAULT_LOOP: Rc<FrameLoop> = Rc::new(FrameLoop::new());
}

/// The loop behind the free functions of this module, one per thread.
pub fn default_loop() -> Rc<FrameLoop> {
    DEFAULT_LOOP.with(Rc::clone)
}

pub fn update_system(callback: &FrameCallback, append: bool) {
    DEFAULT_LOOP.with(|l| l.update_system(callback, append));
}

pub fn update_tree(callback: &FrameCallback, append: bool) {
    DEFAULT_LOOP.with(|l| l.update_tree(callback, append));
}

pub fn register_system(callback: &FrameCallback) {
    update_system(callback, true);
}

pub fn unregister_system(callback: &FrameCallback) {
    update_system(callback, false);
}

pub fn register_tree(callback: &FrameCallback) {
    update_tree(callback, true);
}

pub fn unregister_tree(callback: &FrameCallback) {
    update_tree(callback, false);
}

pub fn tick(now_ms: f64) -> Option<FrameReport> {
    // Clone out of the thread-local so callbacks can reach it again.
    default_loop().tick(now_ms)
}

pub fn reset() {
    DEFAULT_LOOP.with(|l| l.reset());
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use anyhow::bail;

    use super::*;

    fn logger(log: &Rc<RefCell<Vec<&'static str>>>, name: &'static str) -> FrameCallback {
        let log = Rc::clone(log);
        FrameCallback::new(move |_| {
            log.borrow_mut().push(name);
            Ok(())
        })
    }

    #[test]
    fn system_runs_before_tree() {
        let frame_loop = FrameLoop::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        frame_loop.register_tree(&logger(&log, "tree-a"));
        frame_loop.register_system(&logger(&log, "system-a"));
        frame_loop.register_tree(&logger(&log, "tree-b"));
        frame_loop.register_system(&logger(&log, "system-b"));

        frame_loop.tick(16.0).unwrap();
        assert_eq!(*log.borrow(), ["system-a", "system-b", "tree-a", "tree-b"]);
    }

    #[test]
    fn register_then_unregister_restores_list() {
        let frame_loop = FrameLoop::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let a = logger(&log, "a");
        let b = logger(&log, "b");
        frame_loop.register_tree(&a);
        frame_loop.register_tree(&b);

        let extra = logger(&log, "extra");
        frame_loop.register_tree(&extra);
        frame_loop.unregister_tree(&extra);

        assert_eq!(frame_loop.len(CallbackList::Tree), 2);
        frame_loop.tick(1.0).unwrap();
        assert_eq!(*log.borrow(), ["a", "b"]);
    }

    #[test]
    fn unregister_removes_first_match_only() {
        let frame_loop = FrameLoop::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let a = logger(&log, "a");
        let b = logger(&log, "b");
        frame_loop.register_system(&a);
        frame_loop.register_system(&b);
        frame_loop.register_system(&a);

        frame_loop.unregister_system(&a);
        frame_loop.tick(1.0).unwrap();
        assert_eq!(*log.borrow(), ["b", "a"]);
    }

    #[test]
    fn unregister_unknown_is_noop() {
        let frame_loop = FrameLoop::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        frame_loop.register_tree(&logger(&log, "a"));
        frame_loop.unregister_tree(&logger(&log, "a"));
        assert_eq!(frame_loop.len(CallbackList::Tree), 1);
    }

    #[test]
    fn time_strictly_increases() {
        let frame_loop = FrameLoop::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        frame_loop.register_system(&FrameCallback::new(move |t| {
            sink.borrow_mut().push(t);
            Ok(())
        }));

        for now in [16.0, 33.0, 33.0, 20.0, 50.0] {
            frame_loop.tick(now);
        }

        let seen = seen.borrow();
        assert_eq!(seen.len(), 3);
        assert!((seen[0].delta - 0.016).abs() < 1e-9);
        assert!((seen[2].delta - 0.017).abs() < 1e-9);
        assert!((seen[2].total - 0.050).abs() < 1e-9);
        for pair in seen.windows(2) {
            assert!(pair[1].total > pair[0].total);
            assert!(pair[1].delta > 0.0);
        }
        assert_eq!(frame_loop.frames(), 3);
    }

    #[test]
    fn registrations_inside_a_frame_apply_next_frame() {
        let frame_loop = Rc::new(FrameLoop::new());
        let log = Rc::new(RefCell::new(Vec::new()));
        let late = logger(&log, "late");

        let inner_loop = Rc::clone(&frame_loop);
        let inner_log = Rc::clone(&log);
        let late_handle = late.clone();
        let adder = FrameCallback::new(move |_| {
            inner_log.borrow_mut().push("adder");
            inner_loop.register_system(&late_handle);
            Ok(())
        });
        frame_loop.register_system(&adder);

        frame_loop.tick(1.0).unwrap();
        assert_eq!(*log.borrow(), ["adder"]);

        frame_loop.unregister_system(&adder);
        frame_loop.tick(2.0).unwrap();
        assert_eq!(*log.borrow(), ["adder", "late"]);
    }

    #[test]
    fn failing_callback_does_not_stop_the_frame() {
        let frame_loop = FrameLoop::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        frame_loop.register_system(&FrameCallback::new(|_| bail!("boom")));
        frame_loop.register_tree(&logger(&log, "tree"));

        let report = frame_loop.tick(5.0).unwrap();
        assert_eq!(report.invoked, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].list, CallbackList::System);
        assert_eq!(*log.borrow(), ["tree"]);
    }

    #[test]
    fn default_loop_free_functions() {
        reset();
        let log = Rc::new(RefCell::new(Vec::new()));
        let cb = logger(&log, "free");
        update_tree(&cb, true);
        assert!(tick(10.0).is_some());
        update_tree(&cb, false);
        assert!(tick(20.0).is_some());
        assert_eq!(*log.borrow(), ["free"]);
        assert_eq!(default_loop().len(CallbackList::Tree), 0);
        reset();
    }
}
