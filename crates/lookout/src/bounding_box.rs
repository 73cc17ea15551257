//! The composed bounding-box tracker.
//!
//! [`use_box`] runs a size tracker and a location tracker side by side and
//! derives one [`BoundingBox`] from their outputs. A single [`BoxHandle`]
//! attaches the same element to both trackers.

use crate::element::AttachHandle;
use crate::geometry::{BoundingBox, Location, Size, Snapshot, bounding_box};
use crate::host::Host;
use crate::location::{LocationOptions, use_location};
use crate::size::use_size;
use lookout_core::{batch, use_memo};
use std::fmt;

/// Attaches one element to both trackers of a [`use_box`] call.
pub struct BoxHandle<E> {
    size: AttachHandle<E>,
    location: AttachHandle<E>,
}

impl<E: Clone + PartialEq + 'static> BoxHandle<E> {
    /// Attach `element` to the size and location trackers.
    ///
    /// Both trackers see the element in the same update, so the component
    /// is invalidated once. `None` is ignored, as with [`AttachHandle`].
    pub fn attach(&self, element: Option<E>) {
        batch(|| {
            self.size.attach(element.clone());
            self.location.attach(element);
        });
    }

    /// The attached element, without subscribing the caller.
    pub fn current(&self) -> Option<E> {
        self.size.current()
    }

    /// The handle feeding the size tracker.
    pub fn size_handle(&self) -> &AttachHandle<E> {
        &self.size
    }

    /// The handle feeding the location tracker.
    pub fn location_handle(&self) -> &AttachHandle<E> {
        &self.location
    }
}

impl<E> Clone for BoxHandle<E> {
    fn clone(&self) -> Self {
        Self {
            size: self.size.clone(),
            location: self.location.clone(),
        }
    }
}

impl<E> PartialEq for BoxHandle<E> {
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size && self.location == other.location
    }
}

impl<E> Eq for BoxHandle<E> {}

impl<E> fmt::Debug for BoxHandle<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoxHandle").finish_non_exhaustive()
    }
}

/// Track the bounding box of the attached element.
///
/// The box is `None` until both the size and the location are known. A new
/// box snapshot is built only when the size snapshot or the location
/// snapshot changed since the last render; otherwise the previous snapshot
/// is returned again.
pub fn use_box<H: Host>(
    host: &H,
    options: LocationOptions,
) -> (BoxHandle<H::Element>, Option<Snapshot<BoundingBox>>) {
    let (size_handle, size) = use_size(host);
    let (location_handle, location) = use_location(host, options);

    let combined = use_memo(
        || compose(location.as_deref().copied(), size.as_deref().copied()),
        (location.clone(), size.clone()),
    );

    let handle = BoxHandle {
        size: size_handle,
        location: location_handle,
    };
    (handle, combined)
}

fn compose(location: Option<Location>, size: Option<Size>) -> Option<Snapshot<BoundingBox>> {
    let (location, size) = (location?, size?);
    Some(Snapshot::new(bounding_box(location, size)))
}
