//! Zoom level state driven by wheel, pinch and keyboard gestures.
//!
//! [`use_zoom`] keeps a zoom level and listens to the host window for the
//! usual zoom gestures:
//!
//! - Ctrl/Meta + wheel: one step in per upward event, one step out per
//!   downward event
//! - pinch: multiply by `1 + delta`
//! - Ctrl/Meta + `=` (or `+`), `-`, `0`: step in, step out, reset
//!
//! Handled gestures have their default action (page zoom or scroll)
//! prevented.

use crate::host::{Disposition, Host, WindowEvent, WindowListener};
use crate::input::{Key, KeyPress, Modifiers};
use lookout_core::{Signal, untracked, use_effect_cleanup, use_ref, use_signal};
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Zoom changes smaller than this are ignored.
const EPSILON: f64 = 1e-9;

/// Configuration for [`use_zoom`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomOptions {
    /// Level on mount and after [`ZoomControls::reset`].
    pub initial: f64,
    pub min: f64,
    pub max: f64,
    /// Amount added or removed by one zoom step.
    pub step: f64,
}

impl Default for ZoomOptions {
    fn default() -> Self {
        Self {
            initial: 1.0,
            min: 0.25,
            max: 4.0,
            step: 0.1,
        }
    }
}

impl ZoomOptions {
    /// Swap an inverted range and clamp `initial` into it.
    ///
    /// Non-finite fields fall back to their defaults.
    fn normalized(self) -> Self {
        let defaults = Self::default();
        let finite_or = |value: f64, fallback: f64| {
            if value.is_finite() { value } else { fallback }
        };

        let (min, max) = (
            finite_or(self.min, defaults.min),
            finite_or(self.max, defaults.max),
        );
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self {
            initial: finite_or(self.initial, defaults.initial).clamp(min, max),
            min,
            max,
            step: finite_or(self.step, defaults.step).abs(),
        }
    }

    fn clamp(&self, level: f64) -> f64 {
        level.clamp(self.min, self.max)
    }
}

/// Handle for changing a [`use_zoom`] level.
///
/// The same controls are returned on every render.
#[derive(Clone)]
pub struct ZoomControls {
    level: Signal<f64>,
    options: Rc<Cell<ZoomOptions>>,
}

impl ZoomControls {
    /// The current level, without subscribing the caller.
    pub fn level(&self) -> f64 {
        untracked(|| self.level.get())
    }

    /// Set the level, clamped to the configured range.
    pub fn set(&self, level: f64) {
        let level = self.options.get().clamp(level);
        if (level - self.level()).abs() > EPSILON {
            tracing::trace!("Zoom level is now {}", level);
            self.level.set(level);
        }
    }

    pub fn zoom_in(&self) {
        self.set(self.level() + self.options.get().step);
    }

    pub fn zoom_out(&self) {
        self.set(self.level() - self.options.get().step);
    }

    /// Return to the initial level.
    pub fn reset(&self) {
        self.set(self.options.get().initial);
    }

    /// Multiply the level by `factor`.
    pub fn zoom_by_factor(&self, factor: f64) {
        if factor.is_finite() && factor > 0.0 {
            self.set(self.level() * factor);
        }
    }

    /// Apply a window event, returning whether it was a zoom gesture.
    fn handle(&self, event: &WindowEvent) -> Disposition {
        match event {
            WindowEvent::Wheel { delta, modifiers } if is_zoom_modifier(*modifiers) => {
                if delta.y < 0.0 {
                    self.zoom_in();
                } else if delta.y > 0.0 {
                    self.zoom_out();
                }
                Disposition::PreventDefault
            }
            WindowEvent::Pinch(delta) => {
                self.zoom_by_factor(1.0 + delta);
                Disposition::PreventDefault
            }
            WindowEvent::KeyDown(press) => self.handle_key(press),
            _ => Disposition::Proceed,
        }
    }

    fn handle_key(&self, press: &KeyPress) -> Disposition {
        // Shift is often needed to type '+', so it is ignored.
        let modifiers = press.modifiers - Modifiers::SHIFT;
        let extra = modifiers - (Modifiers::CONTROL | Modifiers::META);
        if !is_zoom_modifier(modifiers) || !extra.is_empty() {
            return Disposition::Proceed;
        }
        match press.key {
            Key::Character('=' | '+') => self.zoom_in(),
            Key::Character('-') => self.zoom_out(),
            Key::Character('0') => self.reset(),
            _ => return Disposition::Proceed,
        }
        Disposition::PreventDefault
    }
}

impl PartialEq for ZoomControls {
    fn eq(&self, other: &Self) -> bool {
        self.level.ptr_eq(&other.level)
    }
}

impl fmt::Debug for ZoomControls {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZoomControls")
            .field("level", &self.level())
            .field("options", &self.options.get())
            .finish()
    }
}

fn is_zoom_modifier(modifiers: Modifiers) -> bool {
    modifiers.intersects(Modifiers::CONTROL | Modifiers::META)
}

/// Track a zoom level and the window's zoom gestures.
///
/// Returns the current level and the controls for changing it. New
/// `options` take effect immediately; a level outside a new range is
/// clamped into it.
pub fn use_zoom<H: Host>(host: &H, options: ZoomOptions) -> (f64, ZoomControls) {
    let options = options.normalized();
    let level = use_signal(|| options.initial);
    let shared_options = use_ref(|| Rc::new(Cell::new(options))).get();

    let controls = ZoomControls {
        level: level.clone(),
        options: shared_options,
    };
    if controls.options.get() != options {
        controls.options.set(options);
        controls.set(controls.level());
    }

    let gestures = controls.clone();
    use_effect_cleanup(
        move |host: H| {
            let listener: WindowListener =
                Rc::new(move |event: &WindowEvent| gestures.handle(event));
            let subscription = host.listen_window(listener);
            move || subscription.cancel()
        },
        host.clone(),
    );

    (level.get(), controls)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vec2;
    use crate::local::LocalHost;
    use lookout_core::Component;

    fn assert_level(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected zoom {expected}, got {actual}"
        );
    }

    fn key(c: char, modifiers: Modifiers) -> WindowEvent {
        WindowEvent::KeyDown(KeyPress::new(Key::Character(c), modifiers))
    }

    #[test]
    fn options_are_normalized() {
        let options = ZoomOptions {
            initial: 10.0,
            min: 2.0,
            max: 0.5,
            step: -0.5,
        }
        .normalized();
        assert_eq!(options.min, 0.5);
        assert_eq!(options.max, 2.0);
        assert_eq!(options.initial, 2.0);
        assert_eq!(options.step, 0.5);
    }

    #[test]
    fn non_finite_options_fall_back_to_defaults() {
        let options = ZoomOptions {
            initial: f64::NAN,
            min: f64::NAN,
            max: f64::INFINITY,
            step: f64::NAN,
        }
        .normalized();
        assert_eq!(options, ZoomOptions::default());

        let options = ZoomOptions {
            min: 2.0,
            max: f64::NAN,
            ..ZoomOptions::default()
        }
        .normalized();
        assert_eq!((options.min, options.max), (2.0, 4.0));
        assert_eq!(options.initial, 2.0);
    }

    #[test]
    fn controls_step_and_clamp() {
        let host = LocalHost::new();
        let component = Component::new();
        let (level, controls) = component.render(|| use_zoom(&host, ZoomOptions::default()));
        assert_level(level, 1.0);

        controls.zoom_in();
        controls.zoom_in();
        assert!(component.is_dirty());
        let (level, again) = component.render(|| use_zoom(&host, ZoomOptions::default()));
        assert_level(level, 1.2);
        assert_eq!(controls, again);

        controls.set(100.0);
        assert_level(controls.level(), 4.0);
        controls.set(0.0);
        assert_level(controls.level(), 0.25);

        controls.zoom_by_factor(2.0);
        assert_level(controls.level(), 0.5);
        controls.reset();
        assert_level(controls.level(), 1.0);
    }

    #[test]
    fn setting_same_level_is_quiet() {
        let host = LocalHost::new();
        let component = Component::new();
        let (_, controls) = component.render(|| use_zoom(&host, ZoomOptions::default()));

        controls.set(1.0);
        controls.set(4.0);
        component.render(|| use_zoom(&host, ZoomOptions::default()));
        controls.zoom_in();
        assert!(!component.is_dirty());
    }

    #[test]
    fn modified_wheel_zooms() {
        let host = LocalHost::new();
        let component = Component::new();
        let (_, controls) = component.render(|| use_zoom(&host, ZoomOptions::default()));

        let wheel = |y, modifiers| WindowEvent::Wheel {
            delta: Vec2::new(0.0, y),
            modifiers,
        };
        assert_eq!(
            host.dispatch(wheel(-3.0, Modifiers::empty())),
            Disposition::Proceed
        );
        assert_level(controls.level(), 1.0);

        assert_eq!(
            host.dispatch(wheel(-3.0, Modifiers::CONTROL)),
            Disposition::PreventDefault
        );
        assert_level(controls.level(), 1.1);
        host.dispatch(wheel(3.0, Modifiers::META));
        host.dispatch(wheel(3.0, Modifiers::META));
        assert_level(controls.level(), 0.9);
    }

    #[test]
    fn pinch_scales_level() {
        let host = LocalHost::new();
        let component = Component::new();
        let (_, controls) = component.render(|| use_zoom(&host, ZoomOptions::default()));

        assert_eq!(host.dispatch(WindowEvent::Pinch(0.5)), Disposition::PreventDefault);
        assert_level(controls.level(), 1.5);
        host.dispatch(WindowEvent::Pinch(-0.5));
        assert_level(controls.level(), 0.75);
    }

    #[test]
    fn keyboard_shortcuts() {
        let host = LocalHost::new();
        let component = Component::new();
        let (_, controls) = component.render(|| use_zoom(&host, ZoomOptions::default()));

        assert_eq!(host.dispatch(key('=', Modifiers::CONTROL)), Disposition::PreventDefault);
        host.dispatch(key('+', Modifiers::CONTROL | Modifiers::SHIFT));
        assert_level(controls.level(), 1.2);

        host.dispatch(key('-', Modifiers::META));
        assert_level(controls.level(), 1.1);

        assert_eq!(host.dispatch(key('0', Modifiers::ALT)), Disposition::Proceed);
        assert_eq!(
            host.dispatch(key('0', Modifiers::CONTROL | Modifiers::ALT)),
            Disposition::Proceed
        );
        assert_level(controls.level(), 1.1);

        host.dispatch(key('0', Modifiers::CONTROL));
        assert_level(controls.level(), 1.0);
    }

    #[test]
    fn narrowing_range_clamps_level() {
        let host = LocalHost::new();
        let component = Component::new();
        let (_, controls) = component.render(|| use_zoom(&host, ZoomOptions::default()));
        controls.set(3.0);

        let narrow = ZoomOptions {
            max: 2.0,
            ..ZoomOptions::default()
        };
        component.render(|| use_zoom(&host, narrow));
        assert_level(controls.level(), 2.0);
        assert_eq!(host.active_window_listeners(), 1);

        component.unmount();
        assert_eq!(host.active_window_listeners(), 0);
    }
}
