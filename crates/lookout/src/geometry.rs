//! Geometry snapshots and the equality guard.
//!
//! Geometry values themselves come from [`kurbo`]. Trackers hand them out
//! wrapped in a [`Snapshot`], a shared immutable value whose equality is
//! *identity*: two snapshots are equal only if they are the same snapshot.
//! [`stabilize`] keeps the previous snapshot whenever a new observation has
//! the same value, so consumers that compare snapshots (memoized values,
//! effect dependencies) only react to real changes.
//!
//! ```
//! use lookout::geometry::{stabilize, Size, Snapshot};
//!
//! let first = stabilize(None, Size::new(100.0, 50.0));
//! let same = stabilize(Some(&first), Size::new(100.0, 50.0));
//! let wider = stabilize(Some(&same), Size::new(120.0, 50.0));
//!
//! assert_eq!(first, same);
//! assert_ne!(same, wider);
//! assert_eq!(*wider, Size::new(120.0, 50.0));
//! ```

use lookout_core::{Signal, untracked};
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

pub use kurbo::{Point, Rect, Size, Vec2};

/// On-screen position of an element's top-left corner.
pub type Location = Point;

/// An element's position and size together.
pub type BoundingBox = Rect;

/// Build a bounding box from a location and a size.
pub fn bounding_box(location: Location, size: Size) -> BoundingBox {
    Rect::from_origin_size(location, size)
}

/// An immutable, shared geometry value with identity.
///
/// `PartialEq` compares identity, not value; dereference to compare values.
pub struct Snapshot<T>(Rc<T>);

impl<T> Snapshot<T> {
    /// Wrap `value` in a fresh snapshot.
    pub fn new(value: T) -> Self {
        Self(Rc::new(value))
    }

    /// Returns `true` if both snapshots are the same snapshot.
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Rc::ptr_eq(&this.0, &other.0)
    }
}

impl<T> Clone for Snapshot<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T> Deref for Snapshot<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> PartialEq for Snapshot<T> {
    fn eq(&self, other: &Self) -> bool {
        Self::ptr_eq(self, other)
    }
}

impl<T> Eq for Snapshot<T> {}

impl<T: fmt::Debug> fmt::Debug for Snapshot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Snapshot").field(&*self.0).finish()
    }
}

/// Keep `previous` if it already holds `candidate`, else snapshot `candidate`.
pub fn stabilize<T: PartialEq>(previous: Option<&Snapshot<T>>, candidate: T) -> Snapshot<T> {
    match previous {
        Some(previous) if **previous == candidate => previous.clone(),
        _ => Snapshot::new(candidate),
    }
}

/// Store `candidate` in `state` unless it equals the stored value.
///
/// Returns `true` if the signal was updated.
pub(crate) fn store_stable<T>(state: &Signal<Option<Snapshot<T>>>, candidate: T) -> bool
where
    T: PartialEq + fmt::Debug + 'static,
{
    let previous = untracked(|| state.get());
    let next = stabilize(previous.as_ref(), candidate);
    if previous.as_ref() == Some(&next) {
        tracing::trace!("Suppressed unchanged {:?}", *next);
        return false;
    }
    tracing::trace!("Accepted {:?}", *next);
    state.set(Some(next));
    true
}
