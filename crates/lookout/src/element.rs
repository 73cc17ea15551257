//! Binding a component to the element it observes.

use lookout_core::{Signal, untracked, use_signal};
use std::fmt;

/// A stable handle for attaching an element to a component.
///
/// The handle is created on a component's first render and every later
/// render returns the same handle, so it can be used as an effect
/// dependency. Two handles are equal if they are the same handle.
pub struct AttachHandle<E> {
    slot: Signal<Option<E>>,
}

impl<E: Clone + PartialEq + 'static> AttachHandle<E> {
    /// Attach `element`.
    ///
    /// `None` is ignored: frameworks report a detached ref as `None` during
    /// unrelated re-renders, and that must not clear the bound element.
    /// Attaching a different element replaces the current one.
    pub fn attach(&self, element: Option<E>) {
        let Some(element) = element else {
            return;
        };
        if untracked(|| self.slot.with(|current| current.as_ref() == Some(&element))) {
            return;
        }
        self.slot.set(Some(element));
    }

    /// The attached element, without subscribing the caller.
    pub fn current(&self) -> Option<E> {
        untracked(|| self.slot.get())
    }
}

impl<E> Clone for AttachHandle<E> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot.clone(),
        }
    }
}

impl<E> PartialEq for AttachHandle<E> {
    fn eq(&self, other: &Self) -> bool {
        self.slot.ptr_eq(&other.slot)
    }
}

impl<E> Eq for AttachHandle<E> {}

impl<E> fmt::Debug for AttachHandle<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttachHandle").finish_non_exhaustive()
    }
}

/// Track the element attached through the returned handle.
///
/// Returns the handle and the element attached so far, if any. Attaching
/// an element invalidates the component so the next render sees it.
pub fn use_element<E: Clone + PartialEq + 'static>() -> (AttachHandle<E>, Option<E>) {
    let handle = AttachHandle {
        slot: use_signal(|| None),
    };
    let element = handle.slot.get();
    (handle, element)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lookout_core::Component;

    #[test]
    fn handle_is_stable_across_renders() {
        let component = Component::new();
        let (first, _) = component.render(use_element::<u32>);
        let (second, _) = component.render(use_element::<u32>);
        assert_eq!(first, second);

        let other = Component::new();
        let (third, _) = other.render(use_element::<u32>);
        assert_ne!(first, third);
    }

    #[test]
    fn attaching_stores_element_and_invalidates() {
        let component = Component::new();
        let (handle, element) = component.render(use_element::<u32>);
        assert_eq!(element, None);

        handle.attach(Some(7));
        assert!(component.is_dirty());
        assert_eq!(handle.current(), Some(7));

        let (_, element) = component.render(use_element::<u32>);
        assert_eq!(element, Some(7));
    }

    #[test]
    fn attaching_none_keeps_element() {
        let component = Component::new();
        let (handle, _) = component.render(use_element::<u32>);
        handle.attach(Some(7));
        component.render(use_element::<u32>);

        handle.attach(None);
        assert!(!component.is_dirty());
        assert_eq!(handle.current(), Some(7));
    }

    #[test]
    fn reattaching_same_element_is_quiet() {
        let component = Component::new();
        let (handle, _) = component.render(use_element::<u32>);
        handle.attach(Some(7));
        component.render(use_element::<u32>);

        handle.attach(Some(7));
        assert!(!component.is_dirty());

        handle.attach(Some(8));
        assert!(component.is_dirty());
        assert_eq!(handle.current(), Some(8));
    }
}
