//! Whether the pointer is over an element.

use crate::element::{AttachHandle, use_element};
use crate::geometry::Point;
use crate::host::{Disposition, Element, Host, WindowEvent, WindowListener};
use lookout_core::{Signal, untracked, use_effect_cleanup, use_signal};
use std::rc::Rc;

/// Track whether the pointer is inside the attached element's bounds.
///
/// Hover is `false` until the pointer moves over the element, and whenever
/// no element is attached.
pub fn use_hover<H: Host>(host: &H) -> (AttachHandle<H::Element>, bool) {
    let (handle, element) = use_element::<H::Element>();
    let hovered = use_signal(|| false);

    let tracked = hovered.clone();
    use_effect_cleanup(
        move |(host, element): (H, Option<H::Element>)| {
            set_if_changed(&tracked, false);
            let subscription = element.map(|element| {
                let listener: WindowListener = Rc::new(move |event: &WindowEvent| {
                    if let Some(inside) = pointer_inside(&element, event) {
                        set_if_changed(&tracked, inside);
                    }
                    Disposition::Proceed
                });
                host.listen_window(listener)
            });
            move || drop(subscription)
        },
        (host.clone(), element),
    );

    (handle, hovered.get())
}

fn pointer_inside<E: Element>(element: &E, event: &WindowEvent) -> Option<bool> {
    let contains = |position: &Point| element.bounding_rect().contains(*position);
    match event {
        WindowEvent::PointerMoved(position) => Some(contains(position)),
        WindowEvent::PointerDown { position, .. } | WindowEvent::PointerUp { position, .. } => {
            Some(contains(position))
        }
        WindowEvent::PointerLeft => Some(false),
        _ => None,
    }
}

fn set_if_changed(signal: &Signal<bool>, value: bool) {
    if untracked(|| signal.get()) != value {
        signal.set(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::local::{LocalHost, Node};
    use lookout_core::Component;

    #[test]
    fn follows_pointer_over_element() {
        let host = LocalHost::new();
        let component = Component::new();
        let element = Node::new(Rect::new(10.0, 10.0, 50.0, 50.0));

        let (handle, hovered) = component.render(|| use_hover(&host));
        assert!(!hovered);
        handle.attach(Some(element));
        component.render(|| use_hover(&host));

        host.dispatch(WindowEvent::PointerMoved(Point::new(20.0, 20.0)));
        let (_, hovered) = component.render(|| use_hover(&host));
        assert!(hovered);

        // Moving within the element changes nothing
        host.dispatch(WindowEvent::PointerMoved(Point::new(30.0, 30.0)));
        assert!(!component.is_dirty());

        host.dispatch(WindowEvent::PointerMoved(Point::new(80.0, 20.0)));
        let (_, hovered) = component.render(|| use_hover(&host));
        assert!(!hovered);
    }

    #[test]
    fn leaving_window_clears_hover() {
        let host = LocalHost::new();
        let component = Component::new();

        let (handle, _) = component.render(|| use_hover(&host));
        handle.attach(Some(Node::new(Rect::new(0.0, 0.0, 100.0, 100.0))));
        component.render(|| use_hover(&host));

        host.dispatch(WindowEvent::PointerMoved(Point::new(50.0, 50.0)));
        host.dispatch(WindowEvent::PointerLeft);
        let (_, hovered) = component.render(|| use_hover(&host));
        assert!(!hovered);
    }

    #[test]
    fn listens_only_while_attached() {
        let host = LocalHost::new();
        let component = Component::new();

        let (handle, _) = component.render(|| use_hover(&host));
        assert_eq!(host.active_window_listeners(), 0);

        handle.attach(Some(Node::new(Rect::ZERO)));
        component.render(|| use_hover(&host));
        assert_eq!(host.active_window_listeners(), 1);

        handle.attach(Some(Node::new(Rect::ZERO)));
        component.render(|| use_hover(&host));
        assert_eq!(host.active_window_listeners(), 1);

        component.unmount();
        assert_eq!(host.active_window_listeners(), 0);
    }
}
