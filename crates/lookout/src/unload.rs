//! Asking the user to confirm before the window closes.

use crate::host::{Disposition, Host, WindowEvent, WindowListener};
use lookout_core::use_effect_cleanup;
use std::rc::Rc;

/// Block window close requests while `enabled` is `true`.
///
/// The embedder sees [`Disposition::PreventDefault`] for the close request
/// and is expected to ask the user before closing, typically because there
/// is unsaved work.
pub fn use_unload_warning<H: Host>(host: &H, enabled: bool) {
    use_effect_cleanup(
        move |(host, enabled): (H, bool)| {
            let subscription = enabled.then(|| {
                tracing::debug!("Close requests will be held for confirmation");
                let listener: WindowListener = Rc::new(|event: &WindowEvent| match event {
                    WindowEvent::CloseRequested => Disposition::PreventDefault,
                    _ => Disposition::Proceed,
                });
                host.listen_window(listener)
            });
            move || drop(subscription)
        },
        (host.clone(), enabled),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local::LocalHost;
    use lookout_core::Component;

    #[test]
    fn close_is_prevented_only_while_enabled() {
        let host = LocalHost::new();
        let component = Component::new();

        component.render(|| use_unload_warning(&host, false));
        assert_eq!(host.dispatch(WindowEvent::CloseRequested), Disposition::Proceed);

        component.render(|| use_unload_warning(&host, true));
        assert_eq!(
            host.dispatch(WindowEvent::CloseRequested),
            Disposition::PreventDefault
        );
        assert_eq!(host.dispatch(WindowEvent::Scrolled), Disposition::Proceed);

        component.render(|| use_unload_warning(&host, false));
        assert_eq!(host.dispatch(WindowEvent::CloseRequested), Disposition::Proceed);
        assert_eq!(host.active_window_listeners(), 0);
    }

    #[test]
    fn unmount_stops_warning() {
        let host = LocalHost::new();
        let component = Component::new();
        component.render(|| use_unload_warning(&host, true));

        component.unmount();
        assert_eq!(host.dispatch(WindowEvent::CloseRequested), Disposition::Proceed);
    }
}
