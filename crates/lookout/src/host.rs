//! The capabilities lookout needs from its environment.
//!
//! A [`Host`] supplies the native primitives the trackers are built on:
//! resize notifications for elements, a repeating timer, the window size,
//! and a stream of window-level events. Every registration returns a
//! [`Subscription`] that unregisters when cancelled or dropped.
//!
//! [`LocalHost`](crate::local::LocalHost) is an in-process implementation
//! driven by the embedding event loop.

use crate::error::Result;
use crate::geometry::{Point, Rect, Size, Vec2};
use crate::input::{KeyPress, Modifiers, MouseButton};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

/// A UI element that can be observed.
///
/// Elements are cheap handles: cloning must yield a handle to the same
/// element, and equality must mean "same element".
pub trait Element: Clone + PartialEq + 'static {
    /// The element's border box in viewport coordinates.
    fn bounding_rect(&self) -> Rect;
}

/// One observed element in a resize notification.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeEntry<E> {
    /// The element whose size changed.
    pub target: E,
    /// The element's content box, excluding border and padding.
    pub content_box: Size,
}

/// Callback for a batch of resize notifications.
///
/// An error aborts delivery and is returned to whoever delivered the batch.
pub type ResizeCallback<E> = Rc<dyn Fn(&[ResizeEntry<E>]) -> Result<()>>;

/// Callback for window-level events.
pub type WindowListener = Rc<dyn Fn(&WindowEvent) -> Disposition>;

/// What a listener wants done with an event's default action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Disposition {
    /// Let the default action happen.
    #[default]
    Proceed,
    /// Suppress the default action (page scroll, window close, ...).
    PreventDefault,
}

impl Disposition {
    /// Combine two dispositions; prevention wins.
    pub fn merge(self, other: Self) -> Self {
        if self.is_prevented() || other.is_prevented() {
            Self::PreventDefault
        } else {
            Self::Proceed
        }
    }

    /// Returns `true` for [`Disposition::PreventDefault`].
    pub fn is_prevented(self) -> bool {
        self == Self::PreventDefault
    }
}

/// Window-level events delivered to [`WindowListener`]s.
///
/// Positions and sizes are in logical pixels. `Wheel` deltas follow the web
/// convention: positive `y` scrolls down.
#[derive(Debug, Clone, PartialEq)]
pub enum WindowEvent {
    /// The window's inner size changed.
    Resized(Size),
    /// The window's content scrolled.
    Scrolled,
    /// A key was pressed.
    KeyDown(KeyPress),
    /// A key was released.
    KeyUp(KeyPress),
    /// The pointer moved inside the window.
    PointerMoved(Point),
    /// The pointer left the window.
    PointerLeft,
    /// A mouse button was pressed.
    PointerDown {
        button: MouseButton,
        position: Point,
        modifiers: Modifiers,
    },
    /// A mouse button was released.
    PointerUp {
        button: MouseButton,
        position: Point,
        modifiers: Modifiers,
    },
    /// The wheel or trackpad scrolled.
    Wheel { delta: Vec2, modifiers: Modifiers },
    /// A pinch gesture; positive deltas magnify.
    Pinch(f64),
    /// The user asked to close the window.
    CloseRequested,
}

/// A live registration with a [`Host`].
///
/// Cancelling (or dropping) the subscription unregisters it exactly once.
#[must_use = "dropping a Subscription unregisters it immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Create a subscription that runs `cancel` when released.
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription with nothing to release.
    pub fn empty() -> Self {
        Self { cancel: None }
    }

    /// Release the registration now.
    pub fn cancel(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Native capabilities of the UI environment.
///
/// Hosts are cheap handles; equality must mean "same host". All callbacks
/// run on the host's (single) event-loop thread.
pub trait Host: Clone + PartialEq + 'static {
    /// The element type this host can observe.
    type Element: Element;

    /// Deliver resize notifications for `element` to `callback`.
    fn observe_resize(
        &self,
        element: &Self::Element,
        callback: ResizeCallback<Self::Element>,
    ) -> Subscription;

    /// Call `tick` every `period` until the subscription is released.
    fn set_interval(&self, period: Duration, tick: Rc<dyn Fn()>) -> Subscription;

    /// The window's current inner size.
    fn window_size(&self) -> Size;

    /// Deliver window-level events to `listener`.
    fn listen_window(&self, listener: WindowListener) -> Subscription;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn subscription_releases_once() {
        let released = Rc::new(Cell::new(0));
        let counter = Rc::clone(&released);
        let subscription = Subscription::new(move || counter.set(counter.get() + 1));

        subscription.cancel();
        assert_eq!(released.get(), 1);
    }

    #[test]
    fn dropping_subscription_releases() {
        let released = Rc::new(Cell::new(false));
        {
            let flag = Rc::clone(&released);
            let _subscription = Subscription::new(move || flag.set(true));
        }
        assert!(released.get());
    }

    #[test]
    fn prevention_wins_when_merging() {
        use Disposition::*;
        assert_eq!(Proceed.merge(Proceed), Proceed);
        assert_eq!(Proceed.merge(PreventDefault), PreventDefault);
        assert_eq!(PreventDefault.merge(Proceed), PreventDefault);
    }
}
