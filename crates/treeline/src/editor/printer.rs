use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::screen::Screen;

/// Thread-safe handle for printing while the editor runs.
///
/// When a prompt is on screen the text is printed above it and the
/// prompt and the line being edited are restored afterwards. Otherwise,
/// for example while a callback runs, the text is written as is.
#[derive(Clone)]
pub struct Printer {
    screen: Arc<Mutex<Screen>>,
}

impl Printer {
    pub(crate) fn new(screen: Arc<Mutex<Screen>>) -> Self {
        Self { screen }
    }

    pub fn print(&self, text: &str) -> io::Result<()> {
        let mut screen = lock(&self.screen);
        if screen.prompt_visible {
            screen.interject(text)
        } else {
            screen.write_raw(text)
        }
    }
}

pub(crate) fn lock(screen: &Mutex<Screen>) -> MutexGuard<'_, Screen> {
    screen.lock().unwrap_or_else(PoisonError::into_inner)
}
