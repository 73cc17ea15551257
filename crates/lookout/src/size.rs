//! Tracking an element's content-box size.
//!
//! The size is driven by the host's resize notifications rather than by
//! polling. While an element is attached, exactly one resize observer is
//! registered for it; attaching another element releases that observer
//! before observing the new one.

use crate::element::{AttachHandle, use_element};
use crate::error::{Error, Result};
use crate::geometry::{Size, Snapshot, store_stable};
use crate::host::{Host, ResizeCallback, ResizeEntry};
use lookout_core::{Signal, untracked, use_effect_cleanup, use_signal};
use std::rc::Rc;

/// Track the content-box size of the attached element.
///
/// Returns the attach handle and the last observed size. The size is `None`
/// until the host reports the element's first resize notification, and is
/// reset to `None` when a different element is attached.
///
/// A notification that does not carry exactly one entry makes the resize
/// callback fail with [`Error::IntegrityViolation`]. A one-entry batch for
/// another element is ignored.
pub fn use_size<H: Host>(host: &H) -> (AttachHandle<H::Element>, Option<Snapshot<Size>>) {
    let (handle, element) = use_element::<H::Element>();
    let size = use_signal(|| None::<Snapshot<Size>>);

    let tracked = size.clone();
    use_effect_cleanup(
        move |(host, element)| observe_size(host, element, tracked),
        (host.clone(), element),
    );

    (handle, size.get())
}

/// Subscribe `size` to resize notifications for `element`.
///
/// Returns the cleanup that releases the subscription.
fn observe_size<H: Host>(
    host: H,
    element: Option<H::Element>,
    size: Signal<Option<Snapshot<Size>>>,
) -> impl FnOnce() + 'static {
    if untracked(|| size.with(Option::is_some)) {
        size.set(None);
    }

    let subscription = element.map(|element| {
        tracing::debug!("Observing element size");
        let target = element.clone();
        let callback: ResizeCallback<H::Element> =
            Rc::new(move |entries: &[ResizeEntry<H::Element>]| -> Result<()> {
                if let Some(content_box) = single_content_box(entries, &target)? {
                    store_stable(&size, content_box);
                }
                Ok(())
            });
        host.observe_resize(&element, callback)
    });

    move || {
        if let Some(subscription) = subscription {
            tracing::debug!("Releasing size observer");
            subscription.cancel();
        }
    }
}

/// Extract `element`'s content box from a notification for a single element.
///
/// Returns `Ok(None)` when the only entry is for some other element.
pub fn single_content_box<E: PartialEq>(
    entries: &[ResizeEntry<E>],
    element: &E,
) -> Result<Option<Size>> {
    match entries {
        [entry] if entry.target == *element => Ok(Some(entry.content_box)),
        [_] => {
            tracing::trace!("Ignoring resize entry for another element");
            Ok(None)
        }
        _ => {
            tracing::warn!(
                "Size tracker received {} resize entries for one element",
                entries.len()
            );
            Err(Error::IntegrityViolation {
                entries: entries.len(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::local::{HostOp, LocalHost, Node};
    use lookout_core::Component;
    use std::cell::RefCell;

    fn node() -> Node {
        Node::new(Rect::new(0.0, 0.0, 100.0, 50.0))
    }

    #[test]
    fn size_starts_unset_and_follows_notifications() {
        let host = LocalHost::new();
        let component = Component::new();
        let element = node();

        let (handle, size) = component.render(|| use_size(&host));
        assert!(size.is_none());
        assert_eq!(host.active_resize_observers(), 0);

        handle.attach(Some(element.clone()));
        let (_, size) = component.render(|| use_size(&host));
        assert!(size.is_none());
        assert_eq!(host.active_resize_observers(), 1);

        host.notify_resize(&element, Size::new(100.0, 50.0)).unwrap();
        assert!(component.is_dirty());
        let (_, size) = component.render(|| use_size(&host));
        assert_eq!(size.as_deref(), Some(&Size::new(100.0, 50.0)));
    }

    #[test]
    fn unchanged_notification_keeps_snapshot() {
        let host = LocalHost::new();
        let component = Component::new();
        let element = node();

        let (handle, _) = component.render(|| use_size(&host));
        handle.attach(Some(element.clone()));
        component.render(|| use_size(&host));

        host.notify_resize(&element, Size::new(100.0, 50.0)).unwrap();
        let (_, first) = component.render(|| use_size(&host));
        let first = first.unwrap();

        host.notify_resize(&element, Size::new(100.0, 50.0)).unwrap();
        assert!(!component.is_dirty());
        let (_, same) = component.render(|| use_size(&host));
        assert!(Snapshot::ptr_eq(&first, &same.unwrap()));

        host.notify_resize(&element, Size::new(120.0, 50.0)).unwrap();
        assert!(component.is_dirty());
        let (_, wider) = component.render(|| use_size(&host));
        let wider = wider.unwrap();
        assert!(!Snapshot::ptr_eq(&first, &wider));
        assert_eq!(*wider, Size::new(120.0, 50.0));
    }

    #[test]
    fn empty_batch_is_an_integrity_violation() {
        let entries: [ResizeEntry<Node>; 0] = [];
        assert_eq!(
            single_content_box(&entries, &node()),
            Err(Error::IntegrityViolation { entries: 0 })
        );
    }

    #[test]
    fn integrity_violation_reaches_the_caller() {
        let host = LocalHost::new();
        let component = Component::new();
        let (a, b) = (node(), node());

        let (handle, _) = component.render(|| use_size(&host));
        handle.attach(Some(a.clone()));
        component.render(|| use_size(&host));

        assert_eq!(
            host.broadcast_resize(&[]),
            Err(Error::IntegrityViolation { entries: 0 })
        );

        let batch = [
            ResizeEntry {
                target: a,
                content_box: Size::new(1.0, 1.0),
            },
            ResizeEntry {
                target: b,
                content_box: Size::new(2.0, 2.0),
            },
        ];
        assert_eq!(
            host.broadcast_resize(&batch),
            Err(Error::IntegrityViolation { entries: 2 })
        );
    }

    #[test]
    fn entry_for_another_element_is_ignored() {
        let host = LocalHost::new();
        let component = Component::new();
        let (a, other) = (node(), node());

        let (handle, _) = component.render(|| use_size(&host));
        handle.attach(Some(a.clone()));
        component.render(|| use_size(&host));
        host.notify_resize(&a, Size::new(100.0, 50.0)).unwrap();
        component.render(|| use_size(&host));

        let foreign = [ResizeEntry {
            target: other,
            content_box: Size::new(999.0, 999.0),
        }];
        assert_eq!(host.broadcast_resize(&foreign), Ok(()));
        assert!(!component.is_dirty());
        let (_, size) = component.render(|| use_size(&host));
        assert_eq!(size.as_deref(), Some(&Size::new(100.0, 50.0)));
    }

    #[test]
    fn synchronous_rerender_on_rebind() {
        let host = LocalHost::new();
        let component = Rc::new(Component::new());
        let latest = Rc::new(RefCell::new(None));
        let (a, b) = (node(), node());

        let (handle, _) = component.render(|| use_size(&host));
        component.on_invalidate({
            let (component, host, latest) = (Rc::downgrade(&component), host.clone(), latest.clone());
            move || {
                if let Some(component) = component.upgrade() {
                    let (_, size) = component.render(|| use_size(&host));
                    *latest.borrow_mut() = size;
                }
            }
        });

        handle.attach(Some(a.clone()));
        host.notify_resize(&a, Size::new(100.0, 50.0)).unwrap();
        assert_eq!(latest.borrow().as_deref(), Some(&Size::new(100.0, 50.0)));

        handle.attach(Some(b.clone()));
        assert!(latest.borrow().is_none());
        assert!(!component.is_dirty());
        assert_eq!(host.active_resize_observers(), 1);

        host.notify_resize(&b, Size::new(30.0, 40.0)).unwrap();
        assert_eq!(latest.borrow().as_deref(), Some(&Size::new(30.0, 40.0)));
    }

    #[test]
    fn rebinding_releases_old_observer_first() {
        let host = LocalHost::new();
        let component = Component::new();
        let (a, b) = (node(), node());

        let (handle, _) = component.render(|| use_size(&host));
        handle.attach(Some(a.clone()));
        component.render(|| use_size(&host));
        host.notify_resize(&a, Size::new(100.0, 50.0)).unwrap();
        component.render(|| use_size(&host));

        handle.attach(None);
        handle.attach(Some(b.clone()));
        let (_, size) = component.render(|| use_size(&host));
        assert!(size.is_none(), "size of the previous element must not leak");
        assert_eq!(host.active_resize_observers(), 1);

        let ops = host.operations();
        let released = ops
            .iter()
            .position(|op| matches!(op, HostOp::UnobserveResize(_)))
            .unwrap();
        let resubscribed = ops
            .iter()
            .rposition(|op| matches!(op, HostOp::ObserveResize(_)))
            .unwrap();
        assert!(released < resubscribed);

        // The old element is no longer observed
        host.notify_resize(&a, Size::new(1.0, 1.0)).unwrap();
        let (_, size) = component.render(|| use_size(&host));
        assert!(size.is_none());

        host.notify_resize(&b, Size::new(30.0, 40.0)).unwrap();
        let (_, size) = component.render(|| use_size(&host));
        assert_eq!(size.as_deref(), Some(&Size::new(30.0, 40.0)));
    }

    #[test]
    fn unmount_releases_observer() {
        let host = LocalHost::new();
        let component = Component::new();

        let (handle, _) = component.render(|| use_size(&host));
        handle.attach(Some(node()));
        component.render(|| use_size(&host));
        assert_eq!(host.active_resize_observers(), 1);

        component.unmount();
        assert_eq!(host.active_resize_observers(), 0);
    }
}
