//! Tracking an element's on-screen position.
//!
//! Hosts have no notification for position changes (an ancestor scrolling
//! or a layout shift moves an element without resizing it), so the location
//! is polled on a fixed interval. Smaller intervals track movement more
//! closely at the cost of polling even when nothing moves.

use crate::element::{AttachHandle, use_element};
use crate::geometry::{Location, Snapshot, store_stable};
use crate::host::{Element, Host};
use lookout_core::{Signal, untracked, use_effect_cleanup, use_signal};
use std::rc::Rc;
use std::time::Duration;

/// Default polling interval for [`use_location`], in milliseconds.
pub const DEFAULT_REFRESH_DELAY_MS: u64 = 100;

/// Configuration for [`use_location`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocationOptions {
    /// Time between two position reads.
    pub refresh_delay: Duration,
}

impl LocationOptions {
    /// Poll every `delay_ms` milliseconds.
    pub fn with_refresh_delay_ms(delay_ms: u64) -> Self {
        Self {
            refresh_delay: Duration::from_millis(delay_ms),
        }
    }
}

impl Default for LocationOptions {
    fn default() -> Self {
        Self::with_refresh_delay_ms(DEFAULT_REFRESH_DELAY_MS)
    }
}

/// Track the viewport position of the attached element.
///
/// Returns the attach handle and the last read location. The location is
/// `None` until the first tick after an element is attached, and is reset
/// to `None` when a different element is attached.
pub fn use_location<H: Host>(
    host: &H,
    options: LocationOptions,
) -> (AttachHandle<H::Element>, Option<Snapshot<Location>>) {
    let (handle, element) = use_element::<H::Element>();
    let location = use_signal(|| None::<Snapshot<Location>>);

    // A new element must not report the previous element's position. Only
    // rebinding resets; a new refresh delay keeps the last reading.
    let stale = location.clone();
    use_effect_cleanup(
        move |_| {
            if untracked(|| stale.with(Option::is_some)) {
                stale.set(None);
            }
            || {}
        },
        element.clone(),
    );

    let tracked = location.clone();
    use_effect_cleanup(
        move |(host, element, refresh_delay)| poll_location(host, element, refresh_delay, tracked),
        (host.clone(), element, options.refresh_delay),
    );

    (handle, location.get())
}

fn poll_location<H: Host>(
    host: H,
    element: Option<H::Element>,
    refresh_delay: Duration,
    location: Signal<Option<Snapshot<Location>>>,
) -> impl FnOnce() + 'static {
    let subscription = element.map(|element| {
        tracing::debug!("Polling element location every {:?}", refresh_delay);
        let tick = Rc::new(move || {
            store_stable(&location, element.bounding_rect().origin());
        });
        host.set_interval(refresh_delay, tick)
    });

    move || {
        if let Some(subscription) = subscription {
            tracing::debug!("Stopping location polling");
            subscription.cancel();
        }
    }
}
