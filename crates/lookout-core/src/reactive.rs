//! Reactive primitives: signals, effects and batching.
//!
//! This module provides the fine-grained reactivity that the hook registry
//! builds on.
//!
//! # Core Concepts
//!
//! - **Signal**: A reactive container that holds a value and notifies subscribers when it changes
//! - **Effect**: A side-effect that re-runs when its dependencies change
//!
//! # Example
//!
//! ```
//! use lookout_core::reactive::*;
//!
//! let count = Signal::new(0);
//!
//! let seen = count.clone();
//! let _effect = Effect::new(move || {
//!     println!("Count is: {}", seen.get());
//! });
//!
//! count.set(1); // Prints: "Count is: 1"
//! ```

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

// ============================================================================
// Runtime Context
// ============================================================================

// Per-thread runtime state for tracking reactive subscriptions.
//
// The runtime maintains:
// - A stack of observers (effects currently being run or observed)
// - A queue of pending effects to run
// - Batching depth
thread_local! {
    static RUNTIME: RefCell<Runtime> = RefCell::new(Runtime::new());
}

struct Runtime {
    /// Stack of currently executing observers
    observer_stack: Vec<ObserverId>,

    /// Effects that need to run
    pending_effects: Vec<ObserverId>,

    /// Number of nested `batch` calls currently open
    batch_depth: usize,
}

impl Runtime {
    fn new() -> Self {
        Self {
            observer_stack: Vec::new(),
            pending_effects: Vec::new(),
            batch_depth: 0,
        }
    }
}

/// Identifier for an observer (effect).
///
/// Slots are reused once an effect is disposed; the generation tells a
/// stale id from the slot's current occupant.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
struct ObserverId {
    slot: usize,
    generation: u32,
}

/// Pops the observer pushed by [`ObserverGuard::push`], even on unwind.
struct ObserverGuard;

impl ObserverGuard {
    fn push(id: ObserverId) -> Self {
        RUNTIME.with(|rt| rt.borrow_mut().observer_stack.push(id));
        ObserverGuard
    }
}

impl Drop for ObserverGuard {
    fn drop(&mut self) {
        RUNTIME.with(|rt| {
            rt.borrow_mut().observer_stack.pop();
        });
    }
}

// ============================================================================
// Signal
// ============================================================================

/// A reactive container that holds a value and notifies subscribers when it changes.
///
/// Signals are the foundational reactive primitive. Reading a signal while an
/// observer is active subscribes that observer to the signal. Setting a signal
/// notifies all subscribers to re-run.
///
/// Cloning a signal yields another handle to the same cell; use
/// [`Signal::ptr_eq`] to check whether two handles share it.
///
/// # Example
///
/// ```
/// use lookout_core::Signal;
///
/// let count = Signal::new(0);
///
/// // Read the value
/// assert_eq!(count.get(), 0);
///
/// // Update the value (triggers subscribers)
/// count.set(5);
///
/// // Update based on current value
/// count.update(|n| *n += 1);
/// assert_eq!(count.get(), 6);
/// ```
pub struct Signal<T> {
    inner: Rc<SignalInner<T>>,
}

struct SignalInner<T> {
    value: RefCell<T>,
    subscribers: RefCell<HashSet<ObserverId>>,
}

impl<T> Signal<T> {
    /// Create a new signal with the given initial value.
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(SignalInner {
                value: RefCell::new(value),
                subscribers: RefCell::new(HashSet::new()),
            }),
        }
    }

    /// Returns `true` if both handles point at the same signal.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Subscribe the current observer (if any) to this signal.
    fn track(&self) {
        RUNTIME.with(|rt| {
            let rt = rt.borrow();
            if let Some(&observer) = rt.observer_stack.last() {
                self.inner.subscribers.borrow_mut().insert(observer);
            }
        });
    }

    /// Notify all subscribers that the value has changed.
    ///
    /// Subscribers whose effect has been disposed are dropped.
    fn notify(&self) {
        let subscribers: Vec<_> = {
            let mut subscribers = self.inner.subscribers.borrow_mut();
            subscribers.retain(|&id| EFFECTS.with(|effects| effects.borrow().get(id).is_some()));
            subscribers.iter().copied().collect()
        };

        let flush = RUNTIME.with(|rt| {
            let mut rt = rt.borrow_mut();
            for observer in subscribers {
                if !rt.pending_effects.contains(&observer) {
                    rt.pending_effects.push(observer);
                }
            }
            rt.batch_depth == 0
        });

        if flush {
            flush_effects();
        }
    }
}

impl<T: Clone> Signal<T> {
    /// Get the current value of the signal.
    ///
    /// If called while an observer is active, this subscribes the observer
    /// to this signal.
    pub fn get(&self) -> T {
        self.track();
        self.inner.value.borrow().clone()
    }
}

impl<T> Signal<T> {
    /// Get a reference to the current value without cloning.
    ///
    /// If called while an observer is active, this subscribes the observer
    /// to this signal.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.track();
        f(&*self.inner.value.borrow())
    }

    /// Set the signal to a new value.
    ///
    /// This will notify all subscribers to re-run.
    pub fn set(&self, value: T) {
        *self.inner.value.borrow_mut() = value;
        self.notify();
    }

    /// Update the signal's value using a function.
    ///
    /// This will notify all subscribers to re-run.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        f(&mut *self.inner.value.borrow_mut());
        self.notify();
    }
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("value", &*self.inner.value.borrow())
            .finish()
    }
}

// ============================================================================
// Effect
// ============================================================================

// Storage for all effects (needed because effects reference themselves)
thread_local! {
    static EFFECTS: RefCell<EffectTable> = const {
        RefCell::new(EffectTable {
            slots: Vec::new(),
            free: Vec::new(),
        })
    };
}

struct EffectSlot {
    generation: u32,
    inner: Option<Rc<EffectInner>>,
}

struct EffectTable {
    slots: Vec<EffectSlot>,
    /// Slots emptied by `dispose`, reused before the table grows.
    free: Vec<usize>,
}

impl EffectTable {
    fn insert(&mut self, inner: Rc<EffectInner>) -> ObserverId {
        match self.free.pop() {
            Some(slot) => {
                let entry = &mut self.slots[slot];
                entry.generation = entry.generation.wrapping_add(1);
                entry.inner = Some(inner);
                ObserverId {
                    slot,
                    generation: entry.generation,
                }
            }
            None => {
                self.slots.push(EffectSlot {
                    generation: 0,
                    inner: Some(inner),
                });
                ObserverId {
                    slot: self.slots.len() - 1,
                    generation: 0,
                }
            }
        }
    }

    fn get(&self, id: ObserverId) -> Option<&Rc<EffectInner>> {
        self.slots
            .get(id.slot)
            .filter(|entry| entry.generation == id.generation)
            .and_then(|entry| entry.inner.as_ref())
    }

    fn remove(&mut self, id: ObserverId) -> Option<Rc<EffectInner>> {
        let entry = self
            .slots
            .get_mut(id.slot)
            .filter(|entry| entry.generation == id.generation)?;
        let inner = entry.inner.take()?;
        self.free.push(id.slot);
        Some(inner)
    }
}

/// A side-effect that re-runs when its dependencies change.
///
/// Effects track which signals they read and re-run when any of those
/// signals change.
///
/// # Example
///
/// ```
/// use lookout_core::{Effect, Signal};
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let count = Signal::new(0);
/// let runs = Rc::new(Cell::new(0));
///
/// let (seen, counter) = (count.clone(), runs.clone());
/// let _effect = Effect::new(move || {
///     let _ = seen.get();
///     counter.set(counter.get() + 1);
/// });
///
/// count.set(1);
/// assert_eq!(runs.get(), 2);
/// ```
pub struct Effect {
    id: ObserverId,
}

struct EffectInner {
    f: RefCell<Box<dyn FnMut()>>,
    disposed: Cell<bool>,
    /// Set when the effect is triggered while it is already running.
    rerun: Cell<bool>,
}

impl Effect {
    /// Create a new effect that runs immediately and re-runs when dependencies change.
    pub fn new<F: FnMut() + 'static>(f: F) -> Self {
        let effect = Self::new_deferred(f);
        run_effect(effect.id);
        effect
    }

    /// Create an effect that doesn't run immediately.
    ///
    /// A deferred effect only runs when a signal read inside [`Effect::observe`]
    /// (or a previous run) changes.
    pub fn new_deferred<F: FnMut() + 'static>(f: F) -> Self {
        let inner = Rc::new(EffectInner {
            f: RefCell::new(Box::new(f)),
            disposed: Cell::new(false),
            rerun: Cell::new(false),
        });

        let id = EFFECTS.with(|effects| effects.borrow_mut().insert(inner));
        Effect { id }
    }

    /// Run `f` with this effect as the current observer.
    ///
    /// Every signal read inside `f` subscribes this effect, without running
    /// the effect's own function.
    pub fn observe<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = ObserverGuard::push(self.id);
        f()
    }

    /// Dispose of this effect, preventing it from running again.
    ///
    /// The effect's closure is released immediately.
    pub fn dispose(&self) {
        let inner = EFFECTS.with(|effects| effects.borrow_mut().remove(self.id));
        if let Some(inner) = inner {
            inner.disposed.set(true);
        }
    }

    /// Returns `true` once [`Effect::dispose`] has been called.
    pub fn is_disposed(&self) -> bool {
        EFFECTS.with(|effects| {
            effects
                .borrow()
                .get(self.id)
                .is_none_or(|inner| inner.disposed.get())
        })
    }
}

impl fmt::Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Effect").field("id", &self.id.slot).finish()
    }
}

/// Run a specific effect by ID
fn run_effect(id: ObserverId) {
    let effect = EFFECTS.with(|effects| effects.borrow().get(id).cloned());

    if let Some(inner) = effect {
        if inner.disposed.get() {
            return;
        }

        // Triggered from inside its own run: run again once that run returns.
        let Ok(mut f) = inner.f.try_borrow_mut() else {
            inner.rerun.set(true);
            return;
        };
        loop {
            inner.rerun.set(false);
            {
                let _guard = ObserverGuard::push(id);
                f();
            }
            if !inner.rerun.get() || inner.disposed.get() {
                break;
            }
        }
    }
}

/// Flush all pending effects
fn flush_effects() {
    loop {
        let effect_id = RUNTIME.with(|rt| rt.borrow_mut().pending_effects.pop());

        match effect_id {
            Some(id) => run_effect(id),
            None => break,
        }
    }
}

// ============================================================================
// Batching
// ============================================================================

/// Batch multiple signal updates to avoid redundant effect runs.
///
/// Effects will only run once after the outermost batch completes, even if
/// multiple signals they depend on are updated.
///
/// # Example
///
/// ```
/// use lookout_core::{batch, Signal};
///
/// let count = Signal::new(0);
/// let name = Signal::new(String::new());
///
/// batch(|| {
///     count.set(1);
///     name.set("Alice".to_string());
///     // Effects only run once, after this batch
/// });
/// ```
pub fn batch<R>(f: impl FnOnce() -> R) -> R {
    struct BatchGuard;

    impl Drop for BatchGuard {
        fn drop(&mut self) {
            let outermost = RUNTIME.with(|rt| {
                let mut rt = rt.borrow_mut();
                rt.batch_depth -= 1;
                rt.batch_depth == 0
            });
            if outermost && !std::thread::panicking() {
                flush_effects();
            }
        }
    }

    RUNTIME.with(|rt| rt.borrow_mut().batch_depth += 1);
    let _guard = BatchGuard;
    f()
}

// ============================================================================
// Utility functions
// ============================================================================

/// Run a function without tracking any signal reads.
///
/// Useful for reading signals from callbacks that may fire while an
/// unrelated observer is active.
pub fn untracked<R>(f: impl FnOnce() -> R) -> R {
    // Temporarily remove the current observer
    let observer = RUNTIME.with(|rt| rt.borrow_mut().observer_stack.pop());

    let result = f();

    // Restore the observer
    if let Some(obs) = observer {
        RUNTIME.with(|rt| {
            rt.borrow_mut().observer_stack.push(obs);
        });
    }

    result
}
