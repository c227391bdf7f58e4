mod key_watcher;
mod raw_terminal;
#[cfg(test)]
mod tests;

pub use key_watcher::KeyWatcher;

#[cfg(test)]
pub use key_watcher::{KeyWatchEnd, is_quit_key};
