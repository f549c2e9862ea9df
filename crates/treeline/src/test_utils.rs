use std::env;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, OnceLock};

use crossterm::style::ContentStyle;

use crate::commands::CommandTree;
use crate::editor::Terminal;
use crate::terminal::{Input, Output};

pub fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .expect("env lock")
}

pub struct EnvVarGuard {
    key: &'static str,
    original: Option<String>,
}

impl EnvVarGuard {
    pub fn set(key: &'static str, value: String) -> Self {
        let original = env::var(key).ok();
        env::set_var(key, value);
        Self { key, original }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        if let Some(value) = &self.original {
            env::set_var(self.key, value);
        } else {
            env::remove_var(self.key);
        }
    }
}

/// Output captured in memory. Clones share the buffer.
#[derive(Clone)]
pub struct SharedOutput {
    buf: Arc<Mutex<Vec<u8>>>,
    cols: usize,
}

impl SharedOutput {
    pub fn new(cols: usize) -> Self {
        Self {
            buf: Arc::new(Mutex::new(Vec::new())),
            cols,
        }
    }

    /// Everything written since the last call.
    pub fn take(&self) -> String {
        let bytes = std::mem::take(&mut *self.buf.lock().expect("output lock"));
        String::from_utf8(bytes).expect("utf-8 output")
    }
}

impl Write for SharedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.lock().expect("output lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Output for SharedOutput {
    fn columns(&self) -> usize {
        self.cols
    }
}

/// Input that is already exhausted.
pub struct NoInput;

impl Input for NoInput {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        Ok(None)
    }
}

/// A terminal with prompt `t` that reads `keys` and then hits end of input.
pub fn scripted_terminal(tree: CommandTree, keys: &str) -> (Terminal, SharedOutput) {
    let out = SharedOutput::new(80);
    let mut term = Terminal::builder("t", tree)
        .io(NoInput, out.clone())
        .init_content(keys)
        .build()
        .expect("build terminal");
    term.set_prompt_style(ContentStyle::new());
    (term, out)
}
