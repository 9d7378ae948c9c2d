use core_types::{CueError, NotificationSink};
use std::io::Write;

/// Rings the terminal bell (BEL on stderr)
///
/// Most terminals turn BEL into a short beep or a visual flash, which is
/// the closest native equivalent of the browser tone.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalBell;

impl NotificationSink for TerminalBell {
    fn play_cue(&self) -> Result<(), CueError> {
        let mut stderr = std::io::stderr().lock();
        stderr
            .write_all(b"\x07")
            .and_then(|()| stderr.flush())
            .map_err(|e| CueError::Unavailable(e.to_string()))
    }
}
