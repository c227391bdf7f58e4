use std::{io, mem::MaybeUninit, os::fd::RawFd};

/// Puts a terminal into non-canonical, no-echo mode with a short read timeout and
/// restores the previous settings on drop.
pub struct RawTerminal {
    fd: RawFd,
    saved: libc::termios,
}

impl RawTerminal {
    /// Read timeout in tenths of a second.
    const READ_TIMEOUT_DS: libc::cc_t = 1;

    pub fn is_tty(fd: RawFd) -> bool { unsafe { libc::isatty(fd) == 1 } }

    /// Switches `fd` to raw mode.
    ///
    /// # Errors
    /// - The OS error if the terminal attributes cannot be read or written.
    pub fn enable(fd: RawFd) -> io::Result<Self> {
        let mut saved = MaybeUninit::<libc::termios>::uninit();
        if unsafe { libc::tcgetattr(fd, saved.as_mut_ptr()) } != 0 {
            return Err(io::Error::last_os_error());
        }
        let saved = unsafe { saved.assume_init() };
        let mut raw = saved;
        raw.c_lflag &= !(libc::ICANON | libc::ECHO);
        raw.c_cc[libc::VMIN] = 0;
        raw.c_cc[libc::VTIME] = Self::READ_TIMEOUT_DS;
        if unsafe { libc::tcsetattr(fd, libc::TCSANOW, &raw) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(Self { fd, saved })
    }
}

impl Drop for RawTerminal {
    fn drop(&mut self) {
        unsafe {
            libc::tcsetattr(self.fd, libc::TCSANOW, &self.saved);
        }
    }
}
