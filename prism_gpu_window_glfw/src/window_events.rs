/// Typed per-window event handlers
///
/// One optional closure per GLFW event kind. Registering a handler replaces
/// the previous one for that kind; events with no handler are dropped.

use std::path::PathBuf;

use glam::{DVec2, IVec2, UVec2, Vec2};
use glfw::{Action, Key, Modifiers, MouseButton, WindowEvent};

type Handler<Args> = Option<Box<dyn FnMut(Args)>>;

// ============================================================================
// Handler table
// ============================================================================

#[derive(Default)]
pub struct WindowEvents {
    position: Handler<IVec2>,
    size: Handler<UVec2>,
    close: Handler<()>,
    refresh: Handler<()>,
    focus: Handler<bool>,
    iconify: Handler<bool>,
    maximize: Handler<bool>,
    framebuffer_size: Handler<UVec2>,
    content_scale: Handler<Vec2>,
    mouse_button: Handler<(MouseButton, Action, Modifiers)>,
    cursor_position: Handler<DVec2>,
    cursor_enter: Handler<bool>,
    scroll: Handler<DVec2>,
    key: Handler<(Key, i32, Action, Modifiers)>,
    char: Handler<char>,
    char_mods: Handler<(char, Modifiers)>,
    file_drop: Handler<Vec<PathBuf>>,
}

impl std::fmt::Debug for WindowEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowEvents")
            .field("registered", &self.registered())
            .finish()
    }
}

impl WindowEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_position(&mut self, handler: impl FnMut(IVec2) + 'static) {
        self.position = Some(Box::new(handler));
    }

    pub fn on_size(&mut self, handler: impl FnMut(UVec2) + 'static) {
        self.size = Some(Box::new(handler));
    }

    pub fn on_close(&mut self, mut handler: impl FnMut() + 'static) {
        self.close = Some(Box::new(move |()| handler()));
    }

    pub fn on_refresh(&mut self, mut handler: impl FnMut() + 'static) {
        self.refresh = Some(Box::new(move |()| handler()));
    }

    pub fn on_focus(&mut self, handler: impl FnMut(bool) + 'static) {
        self.focus = Some(Box::new(handler));
    }

    pub fn on_iconify(&mut self, handler: impl FnMut(bool) + 'static) {
        self.iconify = Some(Box::new(handler));
    }

    pub fn on_maximize(&mut self, handler: impl FnMut(bool) + 'static) {
        self.maximize = Some(Box::new(handler));
    }

    /// Drawable size in pixels, which differs from `on_size` on HiDPI displays
    pub fn on_framebuffer_size(&mut self, handler: impl FnMut(UVec2) + 'static) {
        self.framebuffer_size = Some(Box::new(handler));
    }

    pub fn on_content_scale(&mut self, handler: impl FnMut(Vec2) + 'static) {
        self.content_scale = Some(Box::new(handler));
    }

    pub fn on_mouse_button(
        &mut self,
        mut handler: impl FnMut(MouseButton, Action, Modifiers) + 'static,
    ) {
        self.mouse_button = Some(Box::new(move |(button, action, mods)| handler(button, action, mods)));
    }

    pub fn on_cursor_position(&mut self, handler: impl FnMut(DVec2) + 'static) {
        self.cursor_position = Some(Box::new(handler));
    }

    pub fn on_cursor_enter(&mut self, handler: impl FnMut(bool) + 'static) {
        self.cursor_enter = Some(Box::new(handler));
    }

    pub fn on_scroll(&mut self, handler: impl FnMut(DVec2) + 'static) {
        self.scroll = Some(Box::new(handler));
    }

    /// Key handler receives the key, its platform scancode, the action and modifiers
    pub fn on_key(&mut self, mut handler: impl FnMut(Key, i32, Action, Modifiers) + 'static) {
        self.key = Some(Box::new(move |(key, scancode, action, mods)| handler(key, scancode, action, mods)));
    }

    pub fn on_char(&mut self, handler: impl FnMut(char) + 'static) {
        self.char = Some(Box::new(handler));
    }

    pub fn on_char_mods(&mut self, mut handler: impl FnMut(char, Modifiers) + 'static) {
        self.char_mods = Some(Box::new(move |(character, mods)| handler(character, mods)));
    }

    pub fn on_file_drop(&mut self, handler: impl FnMut(Vec<PathBuf>) + 'static) {
        self.file_drop = Some(Box::new(handler));
    }

    /// Drop every registered handler
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Number of event kinds with a handler
    pub fn registered(&self) -> usize {
        [
            self.position.is_some(),
            self.size.is_some(),
            self.close.is_some(),
            self.refresh.is_some(),
            self.focus.is_some(),
            self.iconify.is_some(),
            self.maximize.is_some(),
            self.framebuffer_size.is_some(),
            self.content_scale.is_some(),
            self.mouse_button.is_some(),
            self.cursor_position.is_some(),
            self.cursor_enter.is_some(),
            self.scroll.is_some(),
            self.key.is_some(),
            self.char.is_some(),
            self.char_mods.is_some(),
            self.file_drop.is_some(),
        ]
        .iter()
        .filter(|registered| **registered)
        .count()
    }

    /// Route one event to its handler
    ///
    /// Returns false when no handler is registered for the event kind.
    pub fn dispatch(&mut self, event: WindowEvent) -> bool {
        match event {
            WindowEvent::Pos(x, y) => call(&mut self.position, IVec2::new(x, y)),
            WindowEvent::Size(width, height) => call(&mut self.size, extent(width, height)),
            WindowEvent::Close => call(&mut self.close, ()),
            WindowEvent::Refresh => call(&mut self.refresh, ()),
            WindowEvent::Focus(focused) => call(&mut self.focus, focused),
            WindowEvent::Iconify(iconified) => call(&mut self.iconify, iconified),
            WindowEvent::Maximize(maximized) => call(&mut self.maximize, maximized),
            WindowEvent::FramebufferSize(width, height) => {
                call(&mut self.framebuffer_size, extent(width, height))
            }
            WindowEvent::ContentScale(x, y) => call(&mut self.content_scale, Vec2::new(x, y)),
            WindowEvent::MouseButton(button, action, mods) => {
                call(&mut self.mouse_button, (button, action, mods))
            }
            WindowEvent::CursorPos(x, y) => call(&mut self.cursor_position, DVec2::new(x, y)),
            WindowEvent::CursorEnter(entered) => call(&mut self.cursor_enter, entered),
            WindowEvent::Scroll(x, y) => call(&mut self.scroll, DVec2::new(x, y)),
            WindowEvent::Key(key, scancode, action, mods) => {
                call(&mut self.key, (key, scancode, action, mods))
            }
            WindowEvent::Char(character) => call(&mut self.char, character),
            WindowEvent::CharModifiers(character, mods) => {
                call(&mut self.char_mods, (character, mods))
            }
            WindowEvent::FileDrop(paths) => call(&mut self.file_drop, paths),
            #[allow(unreachable_patterns)]
            _ => false,
        }
    }
}

fn call<Args>(handler: &mut Handler<Args>, args: Args) -> bool {
    match handler {
        Some(handler) => {
            handler(args);
            true
        }
        None => false,
    }
}

/// GLFW reports sizes as signed integers
fn extent(width: i32, height: i32) -> UVec2 {
    UVec2::new(width.max(0) as u32, height.max(0) as u32)
}

#[cfg(test)]
#[path = "window_events_tests.rs"]
mod tests;
