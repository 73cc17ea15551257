//! Translating winit window events into lookout [`WindowEvent`]s.
//!
//! winit reports positions and sizes in physical pixels, keeps modifier
//! state in a separate event and reports wheel deltas with "positive is
//! up". [`WinitTranslator`] carries the state needed to turn that stream
//! into self-contained [`WindowEvent`]s that can be handed to
//! [`LocalHost::dispatch`](crate::local::LocalHost::dispatch).
//!
//! ```ignore
//! let mut translator = WinitTranslator::new(window.scale_factor());
//! // in ApplicationHandler::window_event
//! if let Some(event) = translator.translate(&event) {
//!     let disposition = host.dispatch(event);
//! }
//! ```

use crate::geometry::{Point, Size, Vec2};
use crate::host::WindowEvent;
use crate::input::{Key, KeyPress, Modifiers, MouseButton, NamedKey};
use ::winit::event::{ElementState, MouseScrollDelta, WindowEvent as NativeEvent};
use ::winit::keyboard::{Key as NativeKey, ModifiersState, NamedKey as NativeNamedKey};

/// Logical pixels scrolled per wheel line.
pub const LINE_HEIGHT: f64 = 20.0;

/// Stateful translator for one window's event stream.
#[derive(Debug, Clone)]
pub struct WinitTranslator {
    modifiers: Modifiers,
    cursor: Point,
    scale_factor: f64,
}

impl WinitTranslator {
    /// A translator for a window with the given scale factor.
    pub fn new(scale_factor: f64) -> Self {
        Self {
            modifiers: Modifiers::empty(),
            cursor: Point::ZERO,
            scale_factor,
        }
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    /// Modifiers currently held, as last reported by winit.
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Translate one winit event.
    ///
    /// Returns `None` for events with no lookout counterpart and for events
    /// that only update the translator's state.
    pub fn translate(&mut self, event: &NativeEvent) -> Option<WindowEvent> {
        match event {
            NativeEvent::Resized(size) => {
                let size = size.to_logical::<f64>(self.scale_factor);
                Some(WindowEvent::Resized(Size::new(size.width, size.height)))
            }
            NativeEvent::ScaleFactorChanged { scale_factor, .. } => {
                tracing::debug!("Scale factor changed to {}", scale_factor);
                self.scale_factor = *scale_factor;
                None
            }
            NativeEvent::ModifiersChanged(modifiers) => {
                self.modifiers = translate_modifiers(modifiers.state());
                None
            }
            NativeEvent::CursorMoved { position, .. } => {
                let position = position.to_logical::<f64>(self.scale_factor);
                self.cursor = Point::new(position.x, position.y);
                Some(WindowEvent::PointerMoved(self.cursor))
            }
            NativeEvent::CursorLeft { .. } => Some(WindowEvent::PointerLeft),
            NativeEvent::KeyboardInput {
                event,
                is_synthetic: false,
                ..
            } => {
                let press = KeyPress {
                    key: translate_key(&event.logical_key)?,
                    modifiers: self.modifiers,
                    repeat: event.repeat,
                };
                Some(match event.state {
                    ElementState::Pressed => WindowEvent::KeyDown(press),
                    ElementState::Released => WindowEvent::KeyUp(press),
                })
            }
            NativeEvent::MouseInput { state, button, .. } => {
                let button = translate_button(*button)?;
                let (position, modifiers) = (self.cursor, self.modifiers);
                Some(match state {
                    ElementState::Pressed => WindowEvent::PointerDown {
                        button,
                        position,
                        modifiers,
                    },
                    ElementState::Released => WindowEvent::PointerUp {
                        button,
                        position,
                        modifiers,
                    },
                })
            }
            NativeEvent::MouseWheel { delta, .. } => Some(WindowEvent::Wheel {
                delta: wheel_delta(*delta, self.scale_factor),
                modifiers: self.modifiers,
            }),
            NativeEvent::PinchGesture { delta, .. } => Some(WindowEvent::Pinch(*delta)),
            NativeEvent::CloseRequested => Some(WindowEvent::CloseRequested),
            _ => None,
        }
    }
}

impl Default for WinitTranslator {
    fn default() -> Self {
        Self::new(1.0)
    }
}

pub fn translate_modifiers(state: ModifiersState) -> Modifiers {
    let mut modifiers = Modifiers::empty();
    modifiers.set(Modifiers::SHIFT, state.shift_key());
    modifiers.set(Modifiers::CONTROL, state.control_key());
    modifiers.set(Modifiers::ALT, state.alt_key());
    modifiers.set(Modifiers::META, state.super_key());
    modifiers
}

pub fn translate_key(key: &NativeKey) -> Option<Key> {
    match key {
        NativeKey::Named(named) => {
            let named = match named {
                NativeNamedKey::Enter => NamedKey::Enter,
                NativeNamedKey::Escape => NamedKey::Escape,
                NativeNamedKey::Tab => NamedKey::Tab,
                NativeNamedKey::Backspace => NamedKey::Backspace,
                NativeNamedKey::Delete => NamedKey::Delete,
                NativeNamedKey::Space => NamedKey::Space,
                NativeNamedKey::ArrowUp => NamedKey::ArrowUp,
                NativeNamedKey::ArrowDown => NamedKey::ArrowDown,
                NativeNamedKey::ArrowLeft => NamedKey::ArrowLeft,
                NativeNamedKey::ArrowRight => NamedKey::ArrowRight,
                NativeNamedKey::Home => NamedKey::Home,
                NativeNamedKey::End => NamedKey::End,
                NativeNamedKey::PageUp => NamedKey::PageUp,
                NativeNamedKey::PageDown => NamedKey::PageDown,
                _ => return None,
            };
            Some(Key::Named(named))
        }
        NativeKey::Character(text) => {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(' '), None) => Some(Key::Named(NamedKey::Space)),
                (Some(c), None) => Some(Key::Character(c)),
                _ => None,
            }
        }
        _ => None,
    }
}

pub fn translate_button(button: ::winit::event::MouseButton) -> Option<MouseButton> {
    use ::winit::event::MouseButton as Native;
    match button {
        Native::Left => Some(MouseButton::Primary),
        Native::Right => Some(MouseButton::Secondary),
        Native::Middle => Some(MouseButton::Middle),
        Native::Back => Some(MouseButton::Back),
        Native::Forward => Some(MouseButton::Forward),
        Native::Other(_) => None,
    }
}

/// Convert a winit wheel delta to logical pixels, positive `y` down.
pub fn wheel_delta(delta: MouseScrollDelta, scale_factor: f64) -> Vec2 {
    match delta {
        MouseScrollDelta::LineDelta(x, y) => {
            Vec2::new(-f64::from(x) * LINE_HEIGHT, -f64::from(y) * LINE_HEIGHT)
        }
        MouseScrollDelta::PixelDelta(position) => {
            let position = position.to_logical::<f64>(scale_factor);
            Vec2::new(-position.x, -position.y)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::winit::dpi::{PhysicalPosition, PhysicalSize};

    #[test]
    fn resize_is_reported_in_logical_pixels() {
        let mut translator = WinitTranslator::new(2.0);
        let event = NativeEvent::Resized(PhysicalSize::new(1600, 1200));
        assert_eq!(
            translator.translate(&event),
            Some(WindowEvent::Resized(Size::new(800.0, 600.0)))
        );
    }

    #[test]
    fn modifiers_are_remembered() {
        let mut translator = WinitTranslator::default();
        let state = ModifiersState::CONTROL | ModifiersState::SHIFT;
        assert_eq!(
            translator.translate(&NativeEvent::ModifiersChanged(state.into())),
            None
        );
        assert_eq!(translator.modifiers(), Modifiers::CONTROL | Modifiers::SHIFT);
    }

    #[test]
    fn translates_keys() {
        assert_eq!(
            translate_key(&NativeKey::Character("k".into())),
            Some(Key::Character('k'))
        );
        assert_eq!(
            translate_key(&NativeKey::Character(" ".into())),
            Some(Key::Named(NamedKey::Space))
        );
        assert_eq!(
            translate_key(&NativeKey::Named(NativeNamedKey::Escape)),
            Some(Key::Named(NamedKey::Escape))
        );
        assert_eq!(translate_key(&NativeKey::Character("ab".into())), None);
        assert_eq!(translate_key(&NativeKey::Named(NativeNamedKey::F1)), None);
    }

    #[test]
    fn translates_buttons() {
        use ::winit::event::MouseButton as Native;
        assert_eq!(translate_button(Native::Left), Some(MouseButton::Primary));
        assert_eq!(translate_button(Native::Right), Some(MouseButton::Secondary));
        assert_eq!(translate_button(Native::Other(9)), None);
    }

    #[test]
    fn wheel_delta_points_down() {
        assert_eq!(
            wheel_delta(MouseScrollDelta::LineDelta(0.0, 1.0), 1.0),
            Vec2::new(0.0, -LINE_HEIGHT)
        );
        assert_eq!(
            wheel_delta(
                MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, -40.0)),
                2.0
            ),
            Vec2::new(0.0, 20.0)
        );
    }

    #[test]
    fn close_request_passes_through() {
        let mut translator = WinitTranslator::default();
        assert_eq!(
            translator.translate(&NativeEvent::CloseRequested),
            Some(WindowEvent::CloseRequested)
        );
    }
}
