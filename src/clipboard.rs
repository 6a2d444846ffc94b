//! Clipboard output.
//!
//! The library core only needs "put this text somewhere and tell me if it
//! worked", so callers depend on [`ClipboardSink`] rather than the system
//! clipboard directly.

use tracing::{debug, warn};

pub trait ClipboardSink {
    /// Copies `text`. Returns true on success.
    fn copy(&mut self, text: &str) -> bool;
}

/// The operating system clipboard, opened lazily on first use.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
    hold_until_taken: bool,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// For short-lived processes. On X11 and Wayland the copied text is
    /// served by this process, so `copy` blocks until a clipboard manager or
    /// another application takes the selection over.
    pub fn holding() -> Self {
        Self {
            inner: None,
            hold_until_taken: true,
        }
    }

    #[cfg(all(
        unix,
        not(any(target_os = "macos", target_os = "android", target_os = "emscripten"))
    ))]
    fn set_text(clipboard: &mut arboard::Clipboard, text: &str, hold: bool) -> Result<(), arboard::Error> {
        use arboard::SetExtLinux;
        if hold {
            clipboard.set().wait().text(text.to_string())
        } else {
            clipboard.set_text(text.to_string())
        }
    }

    #[cfg(not(all(
        unix,
        not(any(target_os = "macos", target_os = "android", target_os = "emscripten"))
    )))]
    fn set_text(clipboard: &mut arboard::Clipboard, text: &str, _hold: bool) -> Result<(), arboard::Error> {
        clipboard.set_text(text.to_string())
    }

    fn handle(&mut self) -> Option<&mut arboard::Clipboard> {
        if self.inner.is_none() {
            match arboard::Clipboard::new() {
                Ok(clipboard) => self.inner = Some(clipboard),
                Err(e) => {
                    warn!(error = %e, "clipboard_open_failed");
                    return None;
                }
            }
        }
        self.inner.as_mut()
    }
}

impl ClipboardSink for SystemClipboard {
    fn copy(&mut self, text: &str) -> bool {
        let hold = self.hold_until_taken;
        let Some(clipboard) = self.handle() else {
            return false;
        };
        if hold {
            debug!("clipboard_holding_selection");
        }
        match Self::set_text(clipboard, text, hold) {
            Ok(()) => {
                debug!(chars = text.chars().count(), "clipboard_copied");
                true
            }
            Err(e) => {
                warn!(error = %e, "clipboard_write_failed");
                // Reopen on the next attempt.
                self.inner = None;
                false
            }
        }
    }
}

/// Collects copied text in memory. Used by tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    pub copies: Vec<String>,
    pub fail: bool,
}

#[cfg(test)]
impl ClipboardSink for MemoryClipboard {
    fn copy(&mut self, text: &str) -> bool {
        if self.fail {
            return false;
        }
        self.copies.push(text.to_string());
        true
    }
}
