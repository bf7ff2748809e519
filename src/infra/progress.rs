//! Progress reporting infrastructure with terminal display coordination.

use crate::infra::error::{SigningError, SigningResult};
use std::io::{self, Write};
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

/// Progress indicator types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStyle {
    /// Spinner redrawn in place on every phase change
    Spinner,
    /// One line per phase change (log friendly)
    Plain,
    /// Silent mode (no visual indicator)
    Silent,
}

impl FromStr for ProgressStyle {
    type Err = SigningError;

    fn from_str(s: &str) -> SigningResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "spinner" => Ok(ProgressStyle::Spinner),
            "plain" => Ok(ProgressStyle::Plain),
            "silent" => Ok(ProgressStyle::Silent),
            _ => Err(SigningError::ValidationError(format!(
                "Unknown progress style: {s}"
            ))),
        }
    }
}

/// Receives phase changes of a signing attempt.
pub trait ProgressReporter: Send + Sync {
    /// Set the current status message
    fn set_message(&self, message: &str);

    /// Mark the operation as completed
    fn finish(&self);

    /// Mark the operation as failed with error message
    fn finish_with_error(&self, error: &str);
}

struct TerminalState {
    message: String,
    frame: usize,
    finished: bool,
    start_time: Instant,
}

/// Terminal-based progress indicator.
///
/// A message arriving after `finish` starts a new run, so one reporter can
/// follow several attempts.
pub struct TerminalProgress {
    style: ProgressStyle,
    state: Mutex<TerminalState>,
}

const SPINNER_FRAMES: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

impl TerminalProgress {
    /// Create a new terminal progress indicator
    #[must_use]
    pub fn new(style: ProgressStyle) -> Self {
        Self {
            style,
            state: Mutex::new(TerminalState {
                message: String::new(),
                frame: 0,
                finished: false,
                start_time: Instant::now(),
            }),
        }
    }

    #[must_use]
    pub fn style(&self) -> ProgressStyle {
        self.style
    }

    fn lock(&self) -> MutexGuard<'_, TerminalState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn render(&self, state: &mut TerminalState) {
        let elapsed = state.start_time.elapsed().as_secs_f64();
        let mut stdout = io::stdout();

        // Output failures are not worth aborting a signature for
        let _ = match self.style {
            ProgressStyle::Spinner => {
                let spinner = SPINNER_FRAMES[state.frame % SPINNER_FRAMES.len()];
                state.frame += 1;
                write!(
                    stdout,
                    "\r{}\r{spinner} {} - {elapsed:.1}s",
                    " ".repeat(80),
                    state.message
                )
            }
            ProgressStyle::Plain => writeln!(stdout, "[{elapsed:>5.1}s] {}", state.message),
            ProgressStyle::Silent => Ok(()),
        };
        let _ = stdout.flush();
    }

    fn clear_line(&self) {
        if self.style == ProgressStyle::Spinner {
            print!("\r{}\r", " ".repeat(80));
            let _ = io::stdout().flush();
        }
    }
}

impl ProgressReporter for TerminalProgress {
    fn set_message(&self, message: &str) {
        let mut state = self.lock();
        if state.finished {
            state.finished = false;
            state.frame = 0;
            state.start_time = Instant::now();
        }
        state.message = message.to_string();
        self.render(&mut state);
    }

    fn finish(&self) {
        let mut state = self.lock();
        if state.finished || self.style == ProgressStyle::Silent {
            state.finished = true;
            return;
        }
        state.finished = true;
        self.clear_line();

        let elapsed = state.start_time.elapsed();
        println!(
            "[+] {} - Completed in {:.1}s",
            state.message,
            elapsed.as_secs_f64()
        );
    }

    fn finish_with_error(&self, error: &str) {
        let mut state = self.lock();
        if state.finished || self.style == ProgressStyle::Silent {
            state.finished = true;
            return;
        }
        state.finished = true;
        self.clear_line();

        let elapsed = state.start_time.elapsed();
        println!(
            "[!] {} - Failed after {:.1}s: {}",
            state.message,
            elapsed.as_secs_f64(),
            error
        );
    }
}

/// Null progress reporter for silent operations
pub struct NullProgress;

impl ProgressReporter for NullProgress {
    fn set_message(&self, _message: &str) {}
    fn finish(&self) {}
    fn finish_with_error(&self, _error: &str) {}
}

/// Progress factory for creating appropriate progress indicators
pub struct ProgressFactory;

impl ProgressFactory {
    /// Create a progress reporter based on environment and preferences.
    ///
    /// Without an explicit style, a spinner is used on a terminal and
    /// nothing otherwise.
    #[must_use]
    pub fn create_reporter(style: Option<ProgressStyle>) -> Box<dyn ProgressReporter> {
        match style {
            Some(ProgressStyle::Silent) => Box::new(NullProgress),
            Some(style) => Box::new(TerminalProgress::new(style)),
            None if atty::is(atty::Stream::Stdout) => {
                Box::new(TerminalProgress::new(ProgressStyle::Spinner))
            }
            None => Box::new(NullProgress),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_style_parsing() {
        assert_eq!("spinner".parse::<ProgressStyle>().unwrap(), ProgressStyle::Spinner);
        assert_eq!("Plain".parse::<ProgressStyle>().unwrap(), ProgressStyle::Plain);
        assert_eq!("silent".parse::<ProgressStyle>().unwrap(), ProgressStyle::Silent);
        assert!("bar".parse::<ProgressStyle>().is_err());
    }

    #[test]
    fn test_finish_is_reported_once() {
        let progress = TerminalProgress::new(ProgressStyle::Silent);
        progress.set_message("Preparing document");
        progress.finish();
        progress.finish_with_error("late failure");

        let state = progress.lock();
        assert!(state.finished);
        assert_eq!(state.message, "Preparing document");
    }

    #[test]
    fn test_new_message_after_finish_starts_another_run() {
        let progress = TerminalProgress::new(ProgressStyle::Spinner);
        progress.set_message("Preparing document");
        progress.finish_with_error("Failed to prepare PDF!");
        assert!(progress.lock().finished);

        progress.set_message("Reading certificate");
        let state = progress.lock();
        assert!(!state.finished);
        assert_eq!(state.message, "Reading certificate");
        assert_eq!(state.frame, 1);
    }

    #[test]
    fn test_spinner_advances_frames() {
        let progress = TerminalProgress::new(ProgressStyle::Spinner);
        progress.set_message("one");
        progress.set_message("two");
        assert_eq!(progress.lock().frame, 2);
    }
}
