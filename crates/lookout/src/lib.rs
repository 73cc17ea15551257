//! Lookout - React-style hooks for element geometry, window state and input.
//!
//! Lookout tracks where things are on screen. Its centerpiece is
//! [`use_box`], which follows an element's size (through the host's resize
//! notifications) and position (by polling) and combines them into one
//! bounding box that only changes when the element actually moves or
//! resizes.
//!
//! # Quick Start
//!
//! ```
//! use lookout::prelude::*;
//! use std::time::Duration;
//!
//! let host = LocalHost::new();
//! let component = Component::new();
//! let element = Node::new(Rect::new(10.0, 20.0, 110.0, 70.0));
//!
//! let (handle, bounds) = component.render(|| use_box(&host, LocationOptions::default()));
//! assert!(bounds.is_none());
//!
//! handle.attach(Some(element.clone()));
//! component.render(|| use_box(&host, LocationOptions::default()));
//!
//! host.notify_resize(&element, Size::new(100.0, 50.0)).unwrap();
//! host.advance(Duration::from_millis(100));
//!
//! let (_, bounds) = component.render(|| use_box(&host, LocationOptions::default()));
//! assert_eq!(bounds.as_deref(), Some(&Rect::new(10.0, 20.0, 110.0, 70.0)));
//! ```
//!
//! # Available Hooks
//!
//! | Hook | Purpose |
//! |------|---------|
//! | [`use_box`] | Bounding box of an element |
//! | [`use_size`] | Content-box size of an element |
//! | [`use_location`] | Viewport position of an element, polled |
//! | [`use_element`] | Bind a component to an element |
//! | [`use_window_size`] | Inner size of the window, shared per host |
//! | [`use_hover`] | Whether the pointer is over an element |
//! | [`use_zoom`] | Zoom level with wheel, pinch and keyboard gestures |
//! | [`use_key_binding`] | Run a handler for a key combination |
//! | [`use_mouse_binding`] | Run a handler for a mouse button combination |
//! | [`use_unload_warning`] | Hold window close requests |
//!
//! The general-purpose hooks (`use_signal`, `use_ref`, `use_effect_cleanup`,
//! `use_memo`) and the [`Component`] they run in live in [`lookout_core`]
//! and are re-exported here. The same rules of hooks apply: call them in the
//! same order on every render.
//!
//! # Hosts
//!
//! Trackers never talk to a windowing system directly. They ask a [`Host`]
//! for resize notifications, timers and window events. [`LocalHost`] is a
//! host the embedder drives by hand; with the `winit` feature,
//! `winit_events::WinitTranslator` feeds it from a winit event loop.
//!
//! [`use_box`]: bounding_box::use_box
//! [`use_size`]: size::use_size
//! [`use_location`]: location::use_location
//! [`use_element`]: element::use_element
//! [`use_window_size`]: window::use_window_size
//! [`use_hover`]: hover::use_hover
//! [`use_zoom`]: zoom::use_zoom
//! [`use_key_binding`]: input::use_key_binding
//! [`use_mouse_binding`]: input::use_mouse_binding
//! [`use_unload_warning`]: unload::use_unload_warning
//! [`Component`]: lookout_core::Component
//! [`Host`]: host::Host
//! [`LocalHost`]: local::LocalHost

pub mod bounding_box;
pub mod element;
pub mod error;
pub mod geometry;
pub mod host;
pub mod hover;
pub mod input;
pub mod local;
pub mod location;
pub mod size;
pub mod unload;
pub mod window;
pub mod zoom;

#[cfg(feature = "winit")]
pub mod winit_events;

pub mod prelude {
    //! Common imports for lookout applications.
    pub use crate::bounding_box::{BoxHandle, use_box};
    pub use crate::element::{AttachHandle, use_element};
    pub use crate::error::{Error, Result};
    pub use crate::geometry::{BoundingBox, Location, Point, Rect, Size, Snapshot, Vec2};
    pub use crate::host::{Disposition, Element, Host, Subscription, WindowEvent};
    pub use crate::hover::use_hover;
    pub use crate::input::{
        Key, KeyBinding, KeyPress, Modifiers, MouseBinding, MouseButton, NamedKey,
        use_key_binding, use_mouse_binding,
    };
    pub use crate::local::{LocalHost, Node};
    pub use crate::location::{LocationOptions, use_location};
    pub use crate::size::use_size;
    pub use crate::unload::use_unload_warning;
    pub use crate::window::use_window_size;
    pub use crate::zoom::{ZoomControls, ZoomOptions, use_zoom};
    pub use lookout_core::{
        Component, RefHandle, Signal, batch, untracked, use_effect_cleanup, use_memo, use_ref,
        use_signal,
    };
}

// Re-export the main entry points at crate root
pub use bounding_box::{BoxHandle, use_box};
pub use error::{Error, Result};
pub use host::Host;
pub use lookout_core::{Component, Signal, batch, untracked};

pub use lookout_core as core;
