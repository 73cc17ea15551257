//! Tracking the window's inner size.
//!
//! All components on a thread that track the same host's window share one
//! window listener. The first [`use_window_size`] for a host installs it and
//! the last one to unmount removes it.

use crate::geometry::{Size, Snapshot, stabilize};
use crate::host::{Disposition, Host, Subscription, WindowEvent, WindowListener};
use lookout_core::{Signal, untracked, use_effect_cleanup, use_ref};
use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

struct WindowSizeSource<H> {
    host: H,
    size: Signal<Snapshot<Size>>,
    users: usize,
    _listener: Subscription,
}

thread_local! {
    static SOURCES: RefCell<Vec<Box<dyn Any>>> = const { RefCell::new(Vec::new()) };
}

/// Number of hosts with a shared window-size listener on this thread.
pub fn active_window_listeners() -> usize {
    SOURCES.with(|sources| sources.borrow().len())
}

fn acquire<H: Host>(host: &H) -> Signal<Snapshot<Size>> {
    let shared = SOURCES.with(|sources| {
        sources
            .borrow_mut()
            .iter_mut()
            .filter_map(|source| source.downcast_mut::<WindowSizeSource<H>>())
            .find(|source| source.host == *host)
            .map(|source| {
                source.users += 1;
                source.size.clone()
            })
    });
    if let Some(size) = shared {
        return size;
    }

    let size = Signal::new(Snapshot::new(host.window_size()));
    let listener: WindowListener = {
        let size = size.clone();
        let host = host.clone();
        Rc::new(move |event: &WindowEvent| {
            if matches!(event, WindowEvent::Resized(_) | WindowEvent::Scrolled) {
                refresh(&size, host.window_size());
            }
            Disposition::Proceed
        })
    };
    let subscription = host.listen_window(listener);
    tracing::debug!("Installed shared window size listener");

    SOURCES.with(|sources| {
        sources.borrow_mut().push(Box::new(WindowSizeSource {
            host: host.clone(),
            size: size.clone(),
            users: 1,
            _listener: subscription,
        }));
    });
    size
}

fn release<H: Host>(host: &H) {
    let removed = SOURCES.with(|sources| {
        let mut sources = sources.borrow_mut();
        let index = sources.iter_mut().position(|source| {
            source
                .downcast_mut::<WindowSizeSource<H>>()
                .is_some_and(|source| source.host == *host)
        })?;
        let source = sources[index].downcast_mut::<WindowSizeSource<H>>()?;
        source.users -= 1;
        if source.users > 0 {
            return None;
        }
        Some(sources.remove(index))
    });

    // Unregistering touches the host, so it happens outside the registry borrow.
    if let Some(source) = removed {
        tracing::debug!("Removed shared window size listener");
        drop(source);
    }
}

fn refresh(size: &Signal<Snapshot<Size>>, candidate: Size) {
    let previous = untracked(|| size.get());
    let next = stabilize(Some(&previous), candidate);
    if !Snapshot::ptr_eq(&previous, &next) {
        tracing::trace!("Window size is now {:?}", *next);
        size.set(next);
    }
}

/// Track the host window's inner size.
///
/// The size is read from the host when the first tracker for that host
/// mounts, then refreshed whenever the window is resized or scrolled. The
/// snapshot changes only when the size does.
pub fn use_window_size<H: Host>(host: &H) -> Snapshot<Size> {
    let shared = use_ref(|| None::<Signal<Snapshot<Size>>>);

    let slot = shared.clone();
    use_effect_cleanup(
        move |host: H| {
            slot.set(Some(acquire(&host)));
            move || release(&host)
        },
        host.clone(),
    );

    let signal = shared.get();
    match signal {
        Some(size) => size.get(),
        None => Snapshot::new(host.window_size()),
    }
}
