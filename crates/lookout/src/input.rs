//! Keyboard and mouse bindings.
//!
//! A [`KeyBinding`] pairs a key with an exact set of modifiers and can be
//! parsed from the usual `"Ctrl+Shift+K"` notation:
//!
//! ```
//! use lookout::input::{Key, KeyBinding, Modifiers};
//!
//! let save: KeyBinding = "Ctrl+S".parse().unwrap();
//! assert_eq!(save.key, Key::Character('s'));
//! assert_eq!(save.modifiers, Modifiers::CONTROL);
//! assert_eq!(save.to_string(), "Ctrl+S");
//! ```
//!
//! [`use_key_binding`] and [`use_mouse_binding`] attach such bindings to a
//! host's window events for as long as the component is mounted.

use crate::error::{Error, Result};
use crate::geometry::Point;
use crate::host::{Disposition, Host, WindowEvent, WindowListener};
use bitflags::bitflags;
use lookout_core::{use_effect_cleanup, use_ref};
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

bitflags! {
    /// Keyboard modifiers held during an input event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 1;
        const CONTROL = 1 << 1;
        const ALT = 1 << 2;
        /// Command on macOS, the Windows key elsewhere.
        const META = 1 << 3;
    }
}

/// Keys with a name rather than a printable character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKey {
    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,
    Space,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    PageUp,
    PageDown,
}

impl NamedKey {
    const ALL: [Self; 14] = [
        Self::Enter,
        Self::Escape,
        Self::Tab,
        Self::Backspace,
        Self::Delete,
        Self::Space,
        Self::ArrowUp,
        Self::ArrowDown,
        Self::ArrowLeft,
        Self::ArrowRight,
        Self::Home,
        Self::End,
        Self::PageUp,
        Self::PageDown,
    ];

    fn name(self) -> &'static str {
        match self {
            Self::Enter => "Enter",
            Self::Escape => "Escape",
            Self::Tab => "Tab",
            Self::Backspace => "Backspace",
            Self::Delete => "Delete",
            Self::Space => "Space",
            Self::ArrowUp => "ArrowUp",
            Self::ArrowDown => "ArrowDown",
            Self::ArrowLeft => "ArrowLeft",
            Self::ArrowRight => "ArrowRight",
            Self::Home => "Home",
            Self::End => "End",
            Self::PageUp => "PageUp",
            Self::PageDown => "PageDown",
        }
    }

    fn parse(token: &str) -> Option<Self> {
        let alias = match token.to_ascii_lowercase().as_str() {
            "return" => Some(Self::Enter),
            "esc" => Some(Self::Escape),
            "del" => Some(Self::Delete),
            "up" => Some(Self::ArrowUp),
            "down" => Some(Self::ArrowDown),
            "left" => Some(Self::ArrowLeft),
            "right" => Some(Self::ArrowRight),
            _ => None,
        };
        alias.or_else(|| {
            Self::ALL
                .into_iter()
                .find(|key| key.name().eq_ignore_ascii_case(token))
        })
    }
}

/// A key as reported by the keyboard layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A printable character.
    Character(char),
    /// A non-printable key.
    Named(NamedKey),
}

impl Key {
    /// Compare keys, ignoring letter case.
    pub fn matches(self, other: Self) -> bool {
        match (self, other) {
            (Self::Character(a), Self::Character(b)) => a.to_lowercase().eq(b.to_lowercase()),
            (Self::Named(a), Self::Named(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Character(c) => c.to_uppercase().try_for_each(|c| fmt::Write::write_char(f, c)),
            Self::Named(named) => f.write_str(named.name()),
        }
    }
}

/// A key press or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub modifiers: Modifiers,
    /// `true` when generated by key repeat.
    pub repeat: bool,
}

impl KeyPress {
    /// A non-repeating press of `key` with `modifiers` held.
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self {
            key,
            modifiers,
            repeat: false,
        }
    }
}

/// Mouse buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Usually the left button.
    Primary,
    /// Usually the right button.
    Secondary,
    Middle,
    Back,
    Forward,
}

/// A key plus the exact modifiers that must be held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyBinding {
    /// Bind `key` with `modifiers`.
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    /// Returns `true` if `press` is this binding.
    ///
    /// Modifiers must match exactly; letter case is ignored.
    pub fn matches(&self, press: &KeyPress) -> bool {
        self.modifiers == press.modifiers && self.key.matches(press.key)
    }
}

impl FromStr for KeyBinding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason| Error::InvalidBinding {
            binding: s.to_string(),
            reason,
        };

        let trimmed = s.trim();
        // A trailing "++" binds the plus key itself.
        let (modifier_part, key_part) = if trimmed == "+" {
            ("", "+")
        } else if let Some(rest) = trimmed.strip_suffix("++") {
            (rest, "+")
        } else {
            trimmed.rsplit_once('+').unwrap_or(("", trimmed))
        };

        let mut modifiers = Modifiers::empty();
        if !modifier_part.is_empty() {
            for token in modifier_part.split('+') {
                let modifier = match token.trim().to_ascii_lowercase().as_str() {
                    "ctrl" | "control" => Modifiers::CONTROL,
                    "shift" => Modifiers::SHIFT,
                    "alt" | "option" => Modifiers::ALT,
                    "meta" | "cmd" | "command" | "super" | "win" => Modifiers::META,
                    "" => return Err(invalid("empty modifier")),
                    _ => return Err(invalid("unknown modifier")),
                };
                if modifiers.contains(modifier) {
                    return Err(invalid("repeated modifier"));
                }
                modifiers |= modifier;
            }
        }

        let key_token = key_part.trim();
        let key = if let Some(named) = NamedKey::parse(key_token) {
            Key::Named(named)
        } else {
            let mut chars = key_token.chars();
            match (chars.next(), chars.next()) {
                (None, _) => return Err(invalid("missing key")),
                (Some(c), None) => Key::Character(c.to_lowercase().next().unwrap_or(c)),
                (Some(_), Some(_)) => return Err(invalid("unknown key")),
            }
        };

        Ok(Self { key, modifiers })
    }
}

impl fmt::Display for KeyBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(Modifiers, &str); 4] = [
            (Modifiers::CONTROL, "Ctrl"),
            (Modifiers::ALT, "Alt"),
            (Modifiers::SHIFT, "Shift"),
            (Modifiers::META, "Meta"),
        ];
        for (modifier, name) in NAMES {
            if self.modifiers.contains(modifier) {
                write!(f, "{name}+")?;
            }
        }
        write!(f, "{}", self.key)
    }
}

/// A mouse button plus the exact modifiers that must be held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MouseBinding {
    pub button: MouseButton,
    pub modifiers: Modifiers,
}

impl MouseBinding {
    /// Bind `button` with `modifiers`.
    pub fn new(button: MouseButton, modifiers: Modifiers) -> Self {
        Self { button, modifiers }
    }

    /// Returns `true` if a press of `button` with `modifiers` is this binding.
    pub fn matches(&self, button: MouseButton, modifiers: Modifiers) -> bool {
        self.button == button && self.modifiers == modifiers
    }
}

/// Call `handler` whenever `binding` is pressed.
///
/// The matching key press has its default action prevented. `handler` may
/// be a fresh closure on every render; the latest one is called without
/// re-subscribing. The window listener is only replaced when `host` or
/// `binding` change.
pub fn use_key_binding<H: Host>(host: &H, binding: KeyBinding, handler: impl Fn() + 'static) {
    let latest = use_ref::<Rc<dyn Fn()>>(|| Rc::new(|| {}));
    latest.set(Rc::new(handler));

    use_effect_cleanup(
        move |(host, binding): (H, KeyBinding)| {
            tracing::debug!("Binding key {}", binding);
            let listener: WindowListener = Rc::new(move |event: &WindowEvent| match event {
                WindowEvent::KeyDown(press) if binding.matches(press) => {
                    let handler = latest.get();
                    handler();
                    Disposition::PreventDefault
                }
                _ => Disposition::Proceed,
            });
            let subscription = host.listen_window(listener);
            move || subscription.cancel()
        },
        (host.clone(), binding),
    );
}

/// Call `handler` with the pointer position whenever `binding` is pressed.
///
/// Same handler and subscription rules as [`use_key_binding`].
pub fn use_mouse_binding<H: Host>(
    host: &H,
    binding: MouseBinding,
    handler: impl Fn(Point) + 'static,
) {
    let latest = use_ref::<Rc<dyn Fn(Point)>>(|| Rc::new(|_| {}));
    latest.set(Rc::new(handler));

    use_effect_cleanup(
        move |(host, binding): (H, MouseBinding)| {
            let listener: WindowListener = Rc::new(move |event: &WindowEvent| match event {
                WindowEvent::PointerDown {
                    button,
                    position,
                    modifiers,
                } if binding.matches(*button, *modifiers) => {
                    let handler = latest.get();
                    handler(*position);
                    Disposition::PreventDefault
                }
                _ => Disposition::Proceed,
            });
            let subscription = host.listen_window(listener);
            move || subscription.cancel()
        },
        (host.clone(), binding),
    );
}
