use std::cell::RefCell;
use std::rc::Rc;

use crossterm::event::KeyEvent;

pub type KeyListener = Box<dyn FnMut(KeyEvent)>;
/// Receives (column, row) of a click, relative to the game panel.
pub type PointerListener = Box<dyn FnMut(u16, u16)>;

#[derive(Default)]
struct Surface {
    lines: Vec<String>,
    key_listener: Option<KeyListener>,
    pointer_listener: Option<PointerListener>,
    /// One counter per listener slot, bumped by `clear` and by registering
    /// into that slot, so a dispatch can tell whether its listener was
    /// replaced while it ran.
    key_generation: u64,
    pointer_generation: u64,
}

/// The game panel: what the game draws plus the raw listeners it attached.
/// Clearing the panel drops both content and listeners.
#[derive(Clone, Default)]
pub struct MountPoint {
    surface: Rc<RefCell<Surface>>,
}

impl MountPoint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_lines(&self, lines: Vec<String>) {
        self.surface.borrow_mut().lines = lines;
    }

    pub fn lines(&self) -> Vec<String> {
        self.surface.borrow().lines.clone()
    }

    pub fn is_empty(&self) -> bool {
        let surface = self.surface.borrow();
        surface.lines.is_empty() && surface.key_listener.is_none() && surface.pointer_listener.is_none()
    }

    pub fn on_key(&self, listener: impl FnMut(KeyEvent) + 'static) {
        let mut surface = self.surface.borrow_mut();
        surface.key_listener = Some(Box::new(listener));
        surface.key_generation += 1;
    }

    pub fn on_pointer(&self, listener: impl FnMut(u16, u16) + 'static) {
        let mut surface = self.surface.borrow_mut();
        surface.pointer_listener = Some(Box::new(listener));
        surface.pointer_generation += 1;
    }

    pub fn clear(&self) {
        let mut surface = self.surface.borrow_mut();
        surface.lines.clear();
        surface.key_listener = None;
        surface.pointer_listener = None;
        surface.key_generation += 1;
        surface.pointer_generation += 1;
    }

    /// Hands `key` to the game's key listener. Returns whether one was attached.
    pub fn dispatch_key(&self, key: KeyEvent) -> bool {
        let (mut listener, generation) = {
            let mut surface = self.surface.borrow_mut();
            match surface.key_listener.take() {
                Some(listener) => (listener, surface.key_generation),
                None => return false,
            }
        };
        listener(key);
        let mut surface = self.surface.borrow_mut();
        if surface.key_generation == generation {
            surface.key_listener = Some(listener);
        }
        true
    }

    pub fn dispatch_pointer(&self, column: u16, row: u16) -> bool {
        let (mut listener, generation) = {
            let mut surface = self.surface.borrow_mut();
            match surface.pointer_listener.take() {
                Some(listener) => (listener, surface.pointer_generation),
                None => return false,
            }
        };
        listener(column, row);
        let mut surface = self.surface.borrow_mut();
        if surface.pointer_generation == generation {
            surface.pointer_listener = Some(listener);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};
    use std::cell::Cell;

    #[test]
    fn clear_drops_content_and_listeners() {
        let mount = MountPoint::new();
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        mount.set_lines(vec!["hello".into()]);
        mount.on_key(move |_| counter.set(counter.get() + 1));

        assert!(mount.dispatch_key(KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE)));
        mount.clear();
        assert!(mount.is_empty());
        assert!(!mount.dispatch_key(KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE)));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn listener_can_redraw_the_panel() {
        let mount = MountPoint::new();
        let panel = mount.clone();
        mount.on_pointer(move |col, row| panel.set_lines(vec![format!("{col},{row}")]));
        assert!(mount.dispatch_pointer(3, 4));
        assert_eq!(mount.lines(), vec!["3,4".to_string()]);
        assert!(mount.dispatch_pointer(1, 1));
        assert_eq!(mount.lines(), vec!["1,1".to_string()]);
    }

    #[test]
    fn registering_the_other_listener_keeps_the_running_one() {
        let mount = MountPoint::new();
        let panel = mount.clone();
        mount.on_key(move |_| panel.on_pointer(|_, _| {}));
        let space = KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE);
        assert!(mount.dispatch_key(space));
        assert!(mount.dispatch_key(space));

        let panel = mount.clone();
        mount.on_pointer(move |_, _| panel.on_key(|_| {}));
        assert!(mount.dispatch_pointer(0, 0));
        assert!(mount.dispatch_pointer(0, 0));
    }

    #[test]
    fn replacing_a_listener_from_inside_it_wins() {
        let mount = MountPoint::new();
        let panel = mount.clone();
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        mount.on_key(move |_| {
            let counter = Rc::clone(&counter);
            panel.on_key(move |_| counter.set(counter.get() + 1));
        });
        let space = KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE);
        mount.dispatch_key(space);
        mount.dispatch_key(space);
        assert_eq!(hits.get(), 1);
    }
}
