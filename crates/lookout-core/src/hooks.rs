//! React-style hooks API for managing state across renders.
//!
//! Hooks let you "hook into" a [`Component`]'s rendering lifecycle to keep
//! state, run side effects with cleanup, and memoize derived values. A
//! component is rendered by calling [`Component::render`] with a closure;
//! every hook called inside that closure is bound to the component.
//!
//! # Quick Start
//!
//! ```
//! use lookout_core::{use_signal, Component};
//!
//! let component = Component::new();
//!
//! let count = component.render(|| {
//!     let count = use_signal(|| 0);
//!     count.get()
//! });
//! assert_eq!(count, 0);
//! ```
//!
//! # Available Hooks
//!
//! | Hook | Purpose |
//! |------|---------|
//! | [`use_signal`] | Reactive state that invalidates the component |
//! | [`use_ref`] | Mutable reference that doesn't invalidate the component |
//! | [`use_effect_cleanup`] | Effects with cleanup functions |
//! | [`use_memo`] | Memoized computations |
//!
//! # Invalidation
//!
//! Every signal read while a component renders subscribes the component.
//! When one of those signals is set later, the component is marked dirty
//! ([`Component::is_dirty`]) and the callback registered with
//! [`Component::on_invalidate`] runs, so the host can schedule a render.
//!
//! # Rules of Hooks
//!
//! Hooks must be called in the **exact same order** on every render. This is
//! because hooks are identified by their position in the call sequence, not
//! by any name or key.
//!
//! ## ✅ DO: Call hooks at the top level
//!
//! ```ignore
//! component.render(|| {
//!     let count = use_signal(|| 0);
//!     let (handle, size) = use_size(&host);
//!     // ...
//! });
//! ```
//!
//! ## ❌ DON'T: Call hooks conditionally or in loops
//!
//! ```ignore
//! component.render(|| {
//!     if show_extra {
//!         let extra = use_signal(|| "extra data"); // ❌ WRONG!
//!     }
//! });
//! ```
//!
//! # Error Messages
//!
//! Misusing hooks is a programming error and panics with a descriptive
//! message:
//!
//! ```text
//! lookout hooks error: `use_signal` called outside of render!
//! ```
//!
//! ```text
//! lookout hooks error: Hook count mismatch!
//! Previous render had 3 hooks, current render has 2 hooks.
//! ```
//!
//! ```text
//! lookout hooks error: Hook order mismatch at index 1!
//! Previous render: `use_effect_cleanup`
//! Current render: `use_signal`
//! ```
//!
//! # Teardown
//!
//! [`Component::unmount`] (also run on drop) calls every pending effect
//! cleanup in reverse registration order, then forgets all hook state.

use crate::reactive::{Effect, Signal};
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

// ============================================================================
// Hook Registry
// ============================================================================

/// Metadata about a hook for debugging purposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookMeta {
    /// The hook function name (e.g., "use_signal", "use_effect_cleanup")
    pub hook_type: &'static str,
    /// The type of value stored (from std::any::type_name)
    pub value_type: &'static str,
}

/// Internal storage for a single hook.
struct HookEntry {
    value: Box<dyn Any>,
    meta: HookMeta,
    /// Runs when the owning component is unmounted.
    dispose: Option<Box<dyn FnOnce()>>,
}

/// Registry that manages hook state across renders of one component.
///
/// The registry maintains a list of hooks and tracks the current position
/// during rendering. Hooks are identified by their index in the call order.
struct HookRegistry {
    /// Stored hook values, indexed by call order
    hooks: Vec<HookEntry>,
    /// Current hook index during rendering (reset to 0 each render)
    current_index: usize,
    /// Whether we're currently inside a render cycle
    is_rendering: bool,
    /// Expected hook count from previous render (for mismatch detection)
    expected_count: Option<usize>,
    /// Number of completed renders (for debugging)
    render_count: usize,
}

impl HookRegistry {
    fn new() -> Self {
        Self {
            hooks: Vec::new(),
            current_index: 0,
            is_rendering: false,
            expected_count: None,
            render_count: 0,
        }
    }

    /// Reset hook index and begin a new render cycle.
    fn begin_render(&mut self) {
        self.current_index = 0;
        self.is_rendering = true;
    }

    /// Validate hook count and end the render cycle.
    fn end_render(&mut self) {
        self.is_rendering = false;

        if let Some(expected) = self.expected_count
            && self.current_index != expected
        {
            panic!(
                "\n\n\x1b[1;31mlookout hooks error: Hook count mismatch!\x1b[0m\n\
                Previous render had {} hooks, current render has {} hooks.\n\
                Render number: {}\n\n\
                This usually happens when:\n\
                - A hook is called inside a conditional (if/match)\n\
                - A hook is called inside a loop with varying iterations\n\
                - A hook is called after an early return\n\n\
                Hooks must be called in the exact same order every render.\n",
                expected, self.current_index, self.render_count
            );
        }

        self.expected_count = Some(self.current_index);
        self.render_count += 1;
    }

    /// Core hook implementation - gets or creates a hook at the current index.
    fn use_hook<T: Clone + 'static>(
        &mut self,
        hook_type: &'static str,
        init: impl FnOnce() -> T,
    ) -> T {
        self.use_hook_with_dispose(hook_type, init, None::<fn(T)>)
    }

    /// Like [`HookRegistry::use_hook`], registering `dispose` to run with the
    /// stored value when the component unmounts.
    fn use_hook_with_dispose<T: Clone + 'static>(
        &mut self,
        hook_type: &'static str,
        init: impl FnOnce() -> T,
        dispose: Option<impl FnOnce(T) + 'static>,
    ) -> T {
        if !self.is_rendering {
            panic!("{}", outside_render_message(hook_type));
        }

        let index = self.current_index;
        self.current_index += 1;

        if let Some(entry) = self.hooks.get(index) {
            if entry.meta.hook_type != hook_type {
                panic!(
                    "\n\n\x1b[1;31mlookout hooks error: Hook order mismatch at index {}!\x1b[0m\n\
                    Previous render: `{}`\n\
                    Current render: `{}`\n\n\
                    Hooks must be called in the exact same order every render.\n",
                    index, entry.meta.hook_type, hook_type
                );
            }

            match entry.value.downcast_ref::<T>() {
                Some(value) => value.clone(),
                None => panic!(
                    "\n\n\x1b[1;31mlookout hooks error: Hook type mismatch at index {}!\x1b[0m\n\
                    Previous render stored `{}`, current render expects `{}`.\n",
                    index,
                    entry.meta.value_type,
                    std::any::type_name::<T>()
                ),
            }
        } else {
            // First render - create new hook
            let value = init();
            let meta = HookMeta {
                hook_type,
                value_type: std::any::type_name::<T>(),
            };
            let dispose = dispose.map(|dispose| {
                let stored = value.clone();
                Box::new(move || dispose(stored)) as Box<dyn FnOnce()>
            });

            self.hooks.push(HookEntry {
                value: Box::new(value.clone()),
                meta,
                dispose,
            });

            value
        }
    }

    /// Forget all hooks, returning their disposers in registration order.
    fn teardown(&mut self) -> Vec<Box<dyn FnOnce()>> {
        let disposers = self
            .hooks
            .drain(..)
            .filter_map(|entry| entry.dispose)
            .collect();
        self.current_index = 0;
        self.is_rendering = false;
        self.expected_count = None;
        self.render_count = 0;
        disposers
    }
}

fn outside_render_message(hook_type: &str) -> String {
    format!(
        "\n\n\x1b[1;31mlookout hooks error: `{hook_type}` called outside of render!\x1b[0m\n\
        Hooks can only be called inside `Component::render`.\n\
        Make sure you're not calling hooks in:\n\
        - Event handlers\n\
        - Host callbacks (resize, timers, window events)\n\
        - Static initializers\n"
    )
}

// Stack of registries for components currently rendering on this thread.
thread_local! {
    static CURRENT: RefCell<Vec<Rc<RefCell<HookRegistry>>>> = const { RefCell::new(Vec::new()) };
}

/// Run `f` against the registry of the component currently rendering.
fn with_registry<R>(hook_type: &'static str, f: impl FnOnce(&mut HookRegistry) -> R) -> R {
    let registry = CURRENT.with(|stack| stack.borrow().last().cloned());
    let Some(registry) = registry else {
        panic!("{}", outside_render_message(hook_type));
    };
    let mut registry = registry.borrow_mut();
    f(&mut registry)
}

/// Marks a registry as current for the duration of one render.
struct RenderFrame {
    registry: Rc<RefCell<HookRegistry>>,
}

impl RenderFrame {
    fn enter(registry: Rc<RefCell<HookRegistry>>) -> Self {
        registry.borrow_mut().begin_render();
        CURRENT.with(|stack| stack.borrow_mut().push(Rc::clone(&registry)));
        Self { registry }
    }

    fn finish(self) {
        self.registry.borrow_mut().end_render();
    }
}

impl Drop for RenderFrame {
    fn drop(&mut self) {
        CURRENT.with(|stack| {
            stack.borrow_mut().pop();
        });
        if let Ok(mut registry) = self.registry.try_borrow_mut() {
            registry.is_rendering = false;
        }
    }
}

// ============================================================================
// Component
// ============================================================================

/// A unit of hook state: one render function's worth of hooks.
///
/// The component tracks signals read during [`Component::render`] and marks
/// itself dirty when any of them change.
pub struct Component {
    registry: Rc<RefCell<HookRegistry>>,
    observer: Effect,
    dirty: Rc<Cell<bool>>,
    on_invalidate: Rc<RefCell<Option<Rc<dyn Fn()>>>>,
}

impl Component {
    /// Create a component that has never rendered.
    pub fn new() -> Self {
        let dirty = Rc::new(Cell::new(true));
        let on_invalidate: Rc<RefCell<Option<Rc<dyn Fn()>>>> = Rc::new(RefCell::new(None));

        let observer = Effect::new_deferred({
            let dirty = Rc::clone(&dirty);
            let on_invalidate = Rc::clone(&on_invalidate);
            move || {
                dirty.set(true);
                let callback = on_invalidate.borrow().clone();
                if let Some(callback) = callback {
                    callback();
                }
            }
        });

        Self {
            registry: Rc::new(RefCell::new(HookRegistry::new())),
            observer,
            dirty,
            on_invalidate,
        }
    }

    /// Render the component by running `f` with this component's hooks.
    ///
    /// Clears the dirty flag before `f` runs; state changed during `f` marks
    /// the component dirty again.
    pub fn render<R>(&self, f: impl FnOnce() -> R) -> R {
        self.dirty.set(false);
        let frame = RenderFrame::enter(Rc::clone(&self.registry));
        let output = self.observer.observe(f);
        frame.finish();
        output
    }

    /// Returns `true` when state read by the last render has changed since.
    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    /// Register a callback to run each time the component is invalidated.
    ///
    /// Replaces any previously registered callback. The callback may render
    /// the component itself; state that render changes invalidates the
    /// component again once the callback returns.
    pub fn on_invalidate(&self, callback: impl Fn() + 'static) {
        *self.on_invalidate.borrow_mut() = Some(Rc::new(callback));
    }

    /// Number of completed renders since creation or the last unmount.
    pub fn render_count(&self) -> usize {
        self.registry.borrow().render_count
    }

    /// Get debug information about registered hooks.
    ///
    /// Returns a list of [`HookMeta`] describing each registered hook in
    /// call order.
    pub fn hooks_debug_info(&self) -> Vec<HookMeta> {
        self.registry
            .borrow()
            .hooks
            .iter()
            .map(|entry| entry.meta.clone())
            .collect()
    }

    /// Tear down all hook state, running effect cleanups in reverse order.
    ///
    /// The component may be rendered again afterwards, starting from scratch.
    pub fn unmount(&self) {
        let disposers = self.registry.borrow_mut().teardown();
        if disposers.is_empty() {
            return;
        }
        tracing::debug!("Unmounting component: {} cleanups", disposers.len());
        for dispose in disposers.into_iter().rev() {
            dispose();
        }
    }
}

impl Default for Component {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Component {
    fn drop(&mut self) {
        self.unmount();
        self.observer.dispose();
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("hooks", &self.hooks_debug_info())
            .field("dirty", &self.dirty.get())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Public API - Hook functions
// ============================================================================

/// Create or retrieve a persistent reactive signal.
///
/// This is the primary hook for managing state. The initializer function
/// is only called on the first render; later renders return a handle to the
/// same signal.
///
/// # Example
///
/// ```
/// use lookout_core::{use_signal, Component};
///
/// let component = Component::new();
/// let count = component.render(|| {
///     let count = use_signal(|| 0);
///     let _ = count.get(); // reading subscribes the component
///     count
/// });
/// count.set(1);
/// assert!(component.is_dirty());
/// ```
pub fn use_signal<T: Clone + 'static>(init: impl FnOnce() -> T) -> Signal<T> {
    with_registry("use_signal", |registry| {
        registry.use_hook("use_signal", || Signal::new(init()))
    })
}

/// Create or retrieve a mutable reference that persists across renders.
///
/// Unlike signals, refs don't invalidate the component when mutated. Use them
/// for values that need to persist but shouldn't cause renders, such as the
/// latest version of a callback.
pub fn use_ref<T: 'static>(init: impl FnOnce() -> T) -> RefHandle<T> {
    let inner = with_registry("use_ref", |registry| {
        registry.use_hook("use_ref", || Rc::new(RefCell::new(init())))
    });
    RefHandle { inner }
}

/// Handle to a ref value created by [`use_ref`].
pub struct RefHandle<T> {
    inner: Rc<RefCell<T>>,
}

impl<T> RefHandle<T> {
    /// Get a reference to the current value.
    pub fn borrow(&self) -> std::cell::Ref<'_, T> {
        self.inner.borrow()
    }

    /// Get a mutable reference to the current value.
    pub fn borrow_mut(&self) -> std::cell::RefMut<'_, T> {
        self.inner.borrow_mut()
    }

    /// Set the value directly.
    pub fn set(&self, value: T) {
        *self.inner.borrow_mut() = value;
    }
}

impl<T: Clone> RefHandle<T> {
    /// Get a clone of the current value.
    pub fn get(&self) -> T {
        self.inner.borrow().clone()
    }
}

impl<T> Clone for RefHandle<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for RefHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RefHandle").field(&*self.inner.borrow()).finish()
    }
}

/// Storage for effect dependencies and cleanup function.
struct EffectState<D> {
    deps: Option<D>,
    cleanup: Option<Box<dyn FnOnce()>>,
}

/// Run a side effect with a cleanup function when dependencies change.
///
/// The effect runs during the render in which `deps` first differs from the
/// previous render's value. The previous cleanup always runs before the next
/// effect, and the last cleanup runs when the component unmounts.
///
/// # Example
///
/// ```ignore
/// use_effect_cleanup(
///     move |(host, element)| {
///         let subscription = host.observe_resize(&element, callback);
///         move || drop(subscription)
///     },
///     (host.clone(), element.clone()),
/// );
/// ```
///
/// The effect receives a clone of the dependencies it fired for.
pub fn use_effect_cleanup<F, C, D>(effect_fn: F, deps: D)
where
    F: FnOnce(D) -> C,
    C: FnOnce() + 'static,
    D: PartialEq + Clone + 'static,
{
    let state_ref = with_registry("use_effect_cleanup", |registry| {
        registry.use_hook_with_dispose::<Rc<RefCell<EffectState<D>>>>(
            "use_effect_cleanup",
            || {
                Rc::new(RefCell::new(EffectState {
                    deps: None,
                    cleanup: None,
                }))
            },
            Some(|state: Rc<RefCell<EffectState<D>>>| {
                let cleanup = state.borrow_mut().cleanup.take();
                if let Some(cleanup) = cleanup {
                    cleanup();
                }
            }),
        )
    });

    let should_run = match &state_ref.borrow().deps {
        None => true, // First run
        Some(old_deps) => old_deps != &deps,
    };
    if !should_run {
        return;
    }

    // Run cleanup from previous effect before the new one subscribes
    let previous = state_ref.borrow_mut().cleanup.take();
    if let Some(cleanup) = previous {
        cleanup();
    }

    state_ref.borrow_mut().deps = Some(deps.clone());

    let cleanup = effect_fn(deps);
    state_ref.borrow_mut().cleanup = Some(Box::new(cleanup));
}

/// Storage for memoized computation state.
struct MemoState<T, D> {
    value: Option<T>,
    deps: Option<D>,
}

/// Memoize a computation based on dependencies.
///
/// The compute function only runs when dependencies change.
/// Returns the cached value on subsequent renders if deps are the same.
///
/// # Example
///
/// ```
/// use lookout_core::{use_memo, Component};
///
/// let component = Component::new();
/// let first = component.render(|| use_memo(|| "computed", 1));
/// let second = component.render(|| use_memo(|| "computed again", 1));
/// assert_eq!(first, second);
/// ```
pub fn use_memo<T, F, D>(compute: F, deps: D) -> T
where
    T: Clone + 'static,
    F: FnOnce() -> T,
    D: PartialEq + Clone + 'static,
{
    let state_ref = with_registry("use_memo", |registry| {
        registry.use_hook::<Rc<RefCell<MemoState<T, D>>>>("use_memo", || {
            Rc::new(RefCell::new(MemoState {
                value: None,
                deps: None,
            }))
        })
    });

    let mut state = state_ref.borrow_mut();

    if let (Some(value), Some(old_deps)) = (&state.value, &state.deps)
        && old_deps == &deps
    {
        return value.clone();
    }

    let value = compute();
    state.value = Some(value.clone());
    state.deps = Some(deps);
    value
}
