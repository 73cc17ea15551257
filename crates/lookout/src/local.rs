//! An in-process [`Host`] driven by the embedding event loop.
//!
//! [`LocalHost`] keeps resize observers, timers and window listeners in
//! plain tables and delivers to them only when asked: the embedder (or a
//! test) reports resizes with [`LocalHost::notify_resize`], moves a virtual
//! clock with [`LocalHost::advance`], and forwards window events with
//! [`LocalHost::dispatch`]. Registrations and releases are recorded so their
//! order can be inspected with [`LocalHost::operations`].

use crate::error::Result;
use crate::geometry::{Point, Rect, Size};
use crate::host::{
    Disposition, Element, Host, ResizeCallback, ResizeEntry, Subscription, WindowEvent,
    WindowListener,
};
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Window size of a host created with [`LocalHost::new`].
pub const DEFAULT_WINDOW_SIZE: Size = Size::new(800.0, 600.0);

/// Shortest timer period; shorter requests are rounded up.
const MIN_PERIOD: Duration = Duration::from_millis(1);

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(0);

/// A positioned element owned by the embedder.
///
/// Clones share the element; equality is identity.
#[derive(Clone)]
pub struct Node {
    inner: Rc<NodeInner>,
}

struct NodeInner {
    id: u64,
    rect: Cell<Rect>,
}

impl Node {
    /// Create an element occupying `rect`.
    pub fn new(rect: Rect) -> Self {
        Self {
            inner: Rc::new(NodeInner {
                id: NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed),
                rect: Cell::new(rect),
            }),
        }
    }

    /// Process-unique id, for logs.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// The element's current border box.
    pub fn rect(&self) -> Rect {
        self.inner.rect.get()
    }

    /// Replace the element's border box.
    ///
    /// This does not notify resize observers; call
    /// [`LocalHost::notify_resize`] for that.
    pub fn set_rect(&self, rect: Rect) {
        self.inner.rect.set(rect);
    }

    /// Move the element, keeping its size.
    pub fn move_to(&self, origin: Point) {
        let rect = self.rect();
        self.set_rect(rect.with_origin(origin));
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Node {}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.inner.id)
            .field("rect", &self.rect())
            .finish()
    }
}

impl Element for Node {
    fn bounding_rect(&self) -> Rect {
        self.rect()
    }
}

/// A registration or release performed on a [`LocalHost`].
///
/// Each carries the id of the registration it concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostOp {
    ObserveResize(u64),
    UnobserveResize(u64),
    SetInterval(u64),
    ClearInterval(u64),
    Listen(u64),
    Unlisten(u64),
}

struct ResizeObserver<E> {
    id: u64,
    target: E,
    callback: ResizeCallback<E>,
}

struct Timer {
    id: u64,
    period: Duration,
    due: Duration,
    tick: Rc<dyn Fn()>,
}

struct State<E> {
    next_id: u64,
    now: Duration,
    window_size: Size,
    observers: Vec<ResizeObserver<E>>,
    timers: Vec<Timer>,
    listeners: Vec<(u64, WindowListener)>,
    operations: Vec<HostOp>,
}

impl<E> State<E> {
    fn register(&mut self, op: impl FnOnce(u64) -> HostOp) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.operations.push(op(id));
        id
    }
}

/// An in-process host with a virtual clock.
///
/// Clones share the same host; equality is identity.
pub struct LocalHost<E = Node> {
    inner: Rc<RefCell<State<E>>>,
}

impl LocalHost<Node> {
    /// A host for [`Node`] elements with an 800×600 window.
    pub fn new() -> Self {
        Self::with_window_size(DEFAULT_WINDOW_SIZE)
    }
}

impl Default for LocalHost<Node> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Element> LocalHost<E> {
    /// A host whose window starts at `window_size`.
    pub fn with_window_size(window_size: Size) -> Self {
        Self {
            inner: Rc::new(RefCell::new(State {
                next_id: 0,
                now: Duration::ZERO,
                window_size,
                observers: Vec::new(),
                timers: Vec::new(),
                listeners: Vec::new(),
                operations: Vec::new(),
            })),
        }
    }

    /// Report that `target`'s content box is now `content_box`.
    ///
    /// Every observer of `target` receives a one-entry batch. The first
    /// callback error stops delivery and is returned.
    pub fn notify_resize(&self, target: &E, content_box: Size) -> Result<()> {
        let callbacks: Vec<_> = self
            .inner
            .borrow()
            .observers
            .iter()
            .filter(|observer| observer.target == *target)
            .map(|observer| Rc::clone(&observer.callback))
            .collect();

        let entries = [ResizeEntry {
            target: target.clone(),
            content_box,
        }];
        for callback in callbacks {
            callback(&entries)?;
        }
        Ok(())
    }

    /// Deliver `entries` as one batch to every active resize observer.
    ///
    /// Unlike [`LocalHost::notify_resize`], the batch is not filtered by
    /// target, which reproduces hosts that coalesce notifications.
    pub fn broadcast_resize(&self, entries: &[ResizeEntry<E>]) -> Result<()> {
        let callbacks: Vec<_> = self
            .inner
            .borrow()
            .observers
            .iter()
            .map(|observer| Rc::clone(&observer.callback))
            .collect();

        for callback in callbacks {
            callback(entries)?;
        }
        Ok(())
    }

    /// Move the virtual clock forward by `elapsed`, firing due timers.
    ///
    /// Timers fire in due order; a timer due several times within `elapsed`
    /// fires once per period.
    pub fn advance(&self, elapsed: Duration) {
        let deadline = self.inner.borrow().now + elapsed;

        while let Some(tick) = self.next_due_tick(deadline) {
            tick();
        }
        self.inner.borrow_mut().now = deadline;
    }

    fn next_due_tick(&self, deadline: Duration) -> Option<Rc<dyn Fn()>> {
        let mut state = self.inner.borrow_mut();
        let timer = state
            .timers
            .iter_mut()
            .filter(|timer| timer.due <= deadline)
            .min_by_key(|timer| (timer.due, timer.id))?;

        let due = timer.due;
        timer.due += timer.period;
        let tick = Rc::clone(&timer.tick);
        state.now = due;
        Some(tick)
    }

    /// Virtual time elapsed since the host was created.
    pub fn now(&self) -> Duration {
        self.inner.borrow().now
    }

    /// Deliver `event` to every window listener.
    ///
    /// A [`WindowEvent::Resized`] updates the window size before delivery.
    /// Returns [`Disposition::PreventDefault`] if any listener asked for it.
    pub fn dispatch(&self, event: WindowEvent) -> Disposition {
        let listeners: Vec<_> = {
            let mut state = self.inner.borrow_mut();
            if let WindowEvent::Resized(size) = event {
                state.window_size = size;
            }
            state
                .listeners
                .iter()
                .map(|(_, listener)| Rc::clone(listener))
                .collect()
        };

        listeners
            .into_iter()
            .fold(Disposition::Proceed, |disposition, listener| {
                disposition.merge(listener(&event))
            })
    }

    /// Number of resize observers currently registered.
    pub fn active_resize_observers(&self) -> usize {
        self.inner.borrow().observers.len()
    }

    /// Number of interval timers currently running.
    pub fn active_timers(&self) -> usize {
        self.inner.borrow().timers.len()
    }

    /// Number of window listeners currently registered.
    pub fn active_window_listeners(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    /// Every registration and release since creation or the last
    /// [`LocalHost::clear_operations`], oldest first.
    pub fn operations(&self) -> Vec<HostOp> {
        self.inner.borrow().operations.clone()
    }

    /// Empty the operations journal.
    ///
    /// Long-running embedders should call this periodically; the journal
    /// otherwise keeps every registration ever made.
    pub fn clear_operations(&self) {
        self.inner.borrow_mut().operations.clear();
    }

    fn subscription(
        &self,
        release: impl FnOnce(&mut State<E>) -> Option<Box<dyn Any>> + 'static,
    ) -> Subscription {
        let state: Weak<RefCell<State<E>>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(state) = state.upgrade() {
                // Drop the released entry only after the borrow ends.
                let released = release(&mut state.borrow_mut());
                drop(released);
            }
        })
    }
}

impl<E: Element> Host for LocalHost<E> {
    type Element = E;

    fn observe_resize(&self, element: &E, callback: ResizeCallback<E>) -> Subscription {
        let id = {
            let mut state = self.inner.borrow_mut();
            let id = state.register(HostOp::ObserveResize);
            state.observers.push(ResizeObserver {
                id,
                target: element.clone(),
                callback,
            });
            id
        };
        tracing::trace!("Resize observer {} registered", id);

        self.subscription(move |state| {
            let index = state.observers.iter().position(|entry| entry.id == id)?;
            state.operations.push(HostOp::UnobserveResize(id));
            Some(Box::new(state.observers.remove(index)) as Box<dyn Any>)
        })
    }

    fn set_interval(&self, period: Duration, tick: Rc<dyn Fn()>) -> Subscription {
        let period = period.max(MIN_PERIOD);
        let id = {
            let mut state = self.inner.borrow_mut();
            let id = state.register(HostOp::SetInterval);
            let due = state.now + period;
            state.timers.push(Timer {
                id,
                period,
                due,
                tick,
            });
            id
        };
        tracing::trace!("Timer {} set every {:?}", id, period);

        self.subscription(move |state| {
            let index = state.timers.iter().position(|timer| timer.id == id)?;
            state.operations.push(HostOp::ClearInterval(id));
            Some(Box::new(state.timers.remove(index)) as Box<dyn Any>)
        })
    }

    fn window_size(&self) -> Size {
        self.inner.borrow().window_size
    }

    fn listen_window(&self, listener: WindowListener) -> Subscription {
        let id = {
            let mut state = self.inner.borrow_mut();
            let id = state.register(HostOp::Listen);
            state.listeners.push((id, listener));
            id
        };
        tracing::trace!("Window listener {} registered", id);

        self.subscription(move |state| {
            let index = state.listeners.iter().position(|(entry, _)| *entry == id)?;
            state.operations.push(HostOp::Unlisten(id));
            Some(Box::new(state.listeners.remove(index)) as Box<dyn Any>)
        })
    }
}

impl<E> Clone for LocalHost<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E> PartialEq for LocalHost<E> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<E> Eq for LocalHost<E> {}

impl<E> fmt::Debug for LocalHost<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.borrow();
        f.debug_struct("LocalHost")
            .field("now", &state.now)
            .field("window_size", &state.window_size)
            .field("observers", &state.observers.len())
            .field("timers", &state.timers.len())
            .field("listeners", &state.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn counter() -> (Rc<Cell<u32>>, Rc<dyn Fn()>) {
        let count = Rc::new(Cell::new(0));
        let tick_count = Rc::clone(&count);
        (count, Rc::new(move || tick_count.set(tick_count.get() + 1)))
    }

    #[test]
    fn node_identity() {
        let node = Node::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        let twin = Node::new(node.rect());
        assert_eq!(node, node.clone());
        assert_ne!(node, twin);
        assert_ne!(node.id(), twin.id());

        node.move_to(Point::new(5.0, 5.0));
        assert_eq!(node.bounding_rect(), Rect::new(5.0, 5.0, 15.0, 15.0));
    }

    #[test]
    fn timers_fire_once_per_period() {
        let host = LocalHost::new();
        let (count, tick) = counter();
        let subscription = host.set_interval(Duration::from_millis(100), tick);

        host.advance(Duration::from_millis(99));
        assert_eq!(count.get(), 0);
        host.advance(Duration::from_millis(1));
        assert_eq!(count.get(), 1);
        host.advance(Duration::from_millis(350));
        assert_eq!(count.get(), 4);
        assert_eq!(host.now(), Duration::from_millis(450));

        subscription.cancel();
        host.advance(Duration::from_secs(1));
        assert_eq!(count.get(), 4);
        assert_eq!(host.active_timers(), 0);
    }

    #[test]
    fn zero_period_does_not_spin() {
        let host = LocalHost::new();
        let (count, tick) = counter();
        let _subscription = host.set_interval(Duration::ZERO, tick);

        host.advance(Duration::from_millis(3));
        assert_eq!(count.get(), 3);
    }

    #[test]
    fn resize_goes_to_observers_of_the_target() {
        let host = LocalHost::new();
        let (a, b) = (Node::new(Rect::ZERO), Node::new(Rect::ZERO));
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&seen);
        let _subscription = host.observe_resize(
            &a,
            Rc::new(move |entries: &[ResizeEntry<Node>]| {
                sink.borrow_mut().extend(entries.iter().map(|e| e.content_box));
                Ok(())
            }),
        );

        host.notify_resize(&b, Size::new(1.0, 1.0)).unwrap();
        host.notify_resize(&a, Size::new(2.0, 2.0)).unwrap();
        assert_eq!(*seen.borrow(), [Size::new(2.0, 2.0)]);
    }

    #[test]
    fn callback_error_is_returned() {
        let host = LocalHost::new();
        let node = Node::new(Rect::ZERO);
        let _subscription = host.observe_resize(
            &node,
            Rc::new(|entries: &[ResizeEntry<Node>]| {
                Err(Error::IntegrityViolation {
                    entries: entries.len(),
                })
            }),
        );

        assert_eq!(
            host.notify_resize(&node, Size::ZERO),
            Err(Error::IntegrityViolation { entries: 1 })
        );
    }

    #[test]
    fn dispatch_merges_dispositions_and_tracks_window_size() {
        let host = LocalHost::new();
        assert_eq!(host.window_size(), DEFAULT_WINDOW_SIZE);

        let (count, _) = counter();
        let seen = Rc::clone(&count);
        let _first = host.listen_window(Rc::new(move |_: &WindowEvent| {
            seen.set(seen.get() + 1);
            Disposition::Proceed
        }));
        let _second = host.listen_window(Rc::new(|event: &WindowEvent| match event {
            WindowEvent::CloseRequested => Disposition::PreventDefault,
            _ => Disposition::Proceed,
        }));

        assert_eq!(
            host.dispatch(WindowEvent::Resized(Size::new(1024.0, 768.0))),
            Disposition::Proceed
        );
        assert_eq!(host.window_size(), Size::new(1024.0, 768.0));
        assert_eq!(
            host.dispatch(WindowEvent::CloseRequested),
            Disposition::PreventDefault
        );
        // Prevention does not stop delivery to other listeners
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn operations_record_registration_order() {
        let host = LocalHost::new();
        let node = Node::new(Rect::ZERO);
        let observer = host.observe_resize(&node, Rc::new(|_: &[ResizeEntry<Node>]| Ok(())));
        let listener = host.listen_window(Rc::new(|_: &WindowEvent| Disposition::Proceed));

        drop(observer);
        listener.cancel();
        assert_eq!(
            host.operations(),
            [
                HostOp::ObserveResize(0),
                HostOp::Listen(1),
                HostOp::UnobserveResize(0),
                HostOp::Unlisten(1),
            ]
        );

        host.clear_operations();
        assert!(host.operations().is_empty());
        let _observer = host.observe_resize(&node, Rc::new(|_: &[ResizeEntry<Node>]| Ok(())));
        assert_eq!(host.operations(), [HostOp::ObserveResize(2)]);
    }

    #[test]
    fn subscriptions_outliving_the_host_are_inert() {
        let host = LocalHost::new();
        let (_, tick) = counter();
        let subscription = host.set_interval(Duration::from_millis(10), tick);
        drop(host);
        subscription.cancel();
    }
}
