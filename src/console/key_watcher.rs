use super::raw_terminal::RawTerminal;
use crate::{info, warn};
use std::{
    io::{self, ErrorKind, Read},
    os::fd::AsRawFd,
    thread::{self, JoinHandle},
};
use tokio_util::sync::CancellationToken;

/// Why a key watcher stopped reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyWatchEnd {
    QuitKey,
    Cancelled,
    InputClosed,
}

pub fn is_quit_key(byte: u8) -> bool { matches!(byte, b'q' | b'Q') }

/// Watches the operator's keyboard and raises the cancellation signal on `q` or `Q`.
pub struct KeyWatcher;

impl KeyWatcher {
    /// Starts watching stdin on a dedicated thread.
    ///
    /// Returns `None` without touching the terminal when stdin is not a tty.
    pub fn spawn_stdin(c_tok: CancellationToken) -> Option<JoinHandle<()>> {
        let stdin = io::stdin();
        let fd = stdin.as_raw_fd();
        if !RawTerminal::is_tty(fd) {
            info!("Stdin is not a terminal, quit key disabled. Use Ctrl-C to stop.");
            return None;
        }
        let handle = thread::spawn(move || {
            let _raw = match RawTerminal::enable(fd) {
                Ok(raw) => raw,
                Err(e) => {
                    warn!("Could not switch terminal to raw mode, quit key disabled: {e}");
                    return;
                }
            };
            info!("Press 'q' to stop the simulation.");
            // A raw-mode read returns 0 bytes on every timeout, not only at end of input.
            Self::watch(stdin.lock(), &c_tok, false);
        });
        Some(handle)
    }

    /// Reads single bytes from `reader` until a quit key shows up, `c_tok` is cancelled or
    /// the input fails. A quit key cancels `c_tok`.
    ///
    /// With `empty_is_eof` unset an empty read counts as a timeout and reading goes on.
    pub fn watch<R: Read>(
        mut reader: R,
        c_tok: &CancellationToken,
        empty_is_eof: bool,
    ) -> KeyWatchEnd {
        let mut buf = [0u8; 1];
        loop {
            if c_tok.is_cancelled() {
                return KeyWatchEnd::Cancelled;
            }
            match reader.read(&mut buf) {
                Ok(0) if empty_is_eof => return KeyWatchEnd::InputClosed,
                Ok(0) => (),
                Ok(_) if is_quit_key(buf[0]) => {
                    info!("Quit key pressed, stopping.");
                    c_tok.cancel();
                    return KeyWatchEnd::QuitKey;
                }
                Ok(_) => (),
                Err(e) if e.kind() == ErrorKind::Interrupted => (),
                Err(e) => {
                    warn!("Reading the quit key failed: {e}");
                    return KeyWatchEnd::InputClosed;
                }
            }
        }
    }
}
