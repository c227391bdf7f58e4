use super::*;
use std::io::{Cursor, Read};
use tokio_util::sync::CancellationToken;

#[test]
fn test_quit_keys() {
    assert!(is_quit_key(b'q'));
    assert!(is_quit_key(b'Q'));
    for other in [b'a', b' ', b'\n', 0x03, 0x1b, b'w'] {
        assert!(!is_quit_key(other));
    }
}

#[test]
fn test_watch_cancels_on_quit_key() {
    let c_tok = CancellationToken::new();
    let end = KeyWatcher::watch(Cursor::new(b"abc\nQrest"), &c_tok, true);
    assert_eq!(end, KeyWatchEnd::QuitKey);
    assert!(c_tok.is_cancelled());
}

#[test]
fn test_watch_ignores_other_keys() {
    let c_tok = CancellationToken::new();
    let end = KeyWatcher::watch(Cursor::new(b"hello world\n"), &c_tok, true);
    assert_eq!(end, KeyWatchEnd::InputClosed);
    assert!(!c_tok.is_cancelled());
}

#[test]
fn test_watch_stops_when_cancelled_elsewhere() {
    let c_tok = CancellationToken::new();
    c_tok.cancel();
    let end = KeyWatcher::watch(Cursor::new(b"q"), &c_tok, true);
    assert_eq!(end, KeyWatchEnd::Cancelled);
}

/// Yields empty reads like a raw terminal timing out, cancelling after a few.
struct IdleTerminal {
    reads: usize,
    c_tok: CancellationToken,
}

impl Read for IdleTerminal {
    fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
        self.reads += 1;
        if self.reads == 3 {
            self.c_tok.cancel();
        }
        Ok(0)
    }
}

#[test]
fn test_watch_treats_empty_reads_as_timeouts() {
    let c_tok = CancellationToken::new();
    let term = IdleTerminal { reads: 0, c_tok: c_tok.clone() };
    let end = KeyWatcher::watch(term, &c_tok, false);
    assert_eq!(end, KeyWatchEnd::Cancelled);
}
