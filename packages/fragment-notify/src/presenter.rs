//! Presentation capability.
//!
//! The notifier never renders anything itself. It hands a message and a
//! `blocking` flag to a [`Presenter`], which decides what a modal or a toast
//! looks like on its surface.
//!
//! | Presenter            | Surface                                   |
//! |----------------------|-------------------------------------------|
//! | `TerminalPresenter`  | Framed block (modal) or one line (toast)  |
//! | `ChannelPresenter`   | [`Notification`] values for a UI task     |
//! | `NoopPresenter`      | Nothing                                   |
//!
//! Presenters must return promptly. A modal is rendered or queued, never
//! awaited until the user dismisses it.

use std::fmt;
use std::io::Write;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use colored::Colorize;
use console::measure_text_width;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::error::PresentError;

/// How a notification is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Presentation {
    /// Holds the user's attention until dismissed.
    Modal,
    /// Transient banner that goes away on its own.
    Toast,
}

impl Presentation {
    pub fn from_blocking(blocking: bool) -> Self {
        if blocking {
            Self::Modal
        } else {
            Self::Toast
        }
    }
}

impl fmt::Display for Presentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Presentation::Modal => write!(f, "modal"),
            Presentation::Toast => write!(f, "toast"),
        }
    }
}

/// A notification ready for a UI layer to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub message: String,
    pub presentation: Presentation,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(message: impl Into<String>, presentation: Presentation) -> Self {
        Self {
            id: Uuid::new_v4(),
            message: message.into(),
            presentation,
            created_at: Utc::now(),
        }
    }
}

/// Something that can put a message in front of the user.
pub trait Presenter: Send + Sync {
    /// Show `message`, as a modal when `blocking` is true, otherwise as a toast.
    fn notify(&self, message: &str, blocking: bool) -> Result<(), PresentError>;
}

/// Accepts every notification and shows nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPresenter;

impl Presenter for NoopPresenter {
    fn notify(&self, _message: &str, _blocking: bool) -> Result<(), PresentError> {
        Ok(())
    }
}

/// Renders notifications as text on a writer.
pub struct TerminalPresenter<W> {
    out: Mutex<W>,
}

impl TerminalPresenter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> TerminalPresenter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<W: Write + Send> Presenter for TerminalPresenter<W> {
    fn notify(&self, message: &str, blocking: bool) -> Result<(), PresentError> {
        let mut out = self
            .out
            .lock()
            .map_err(|_| PresentError::Unavailable("terminal writer poisoned".to_string()))?;

        if blocking {
            let mut lines: Vec<&str> = message.lines().collect();
            if lines.is_empty() {
                lines.push("");
            }
            // Display columns, not chars, so wide glyphs keep the frame square.
            let inner = lines
                .iter()
                .map(|line| measure_text_width(line))
                .max()
                .unwrap_or(0);
            let border = "═".repeat(inner + 4);

            writeln!(out, "{}", format!("╔{border}╗").bright_red())?;
            for line in lines {
                let pad = " ".repeat(inner - measure_text_width(line));
                writeln!(
                    out,
                    "{}  {}{}  {}",
                    "║".bright_red(),
                    line.bold(),
                    pad,
                    "║".bright_red()
                )?;
            }
            writeln!(out, "{}", format!("╚{border}╝").bright_red())?;
        } else {
            let flat = message
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(out, "{} {}", "⚠".yellow(), flat)?;
        }
        out.flush()?;
        Ok(())
    }
}

impl<W> fmt::Debug for TerminalPresenter<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TerminalPresenter").finish_non_exhaustive()
    }
}

/// Forwards notifications to a UI task over an unbounded channel.
///
/// Sending never waits. Once the receiving side is dropped every call
/// reports [`PresentError::Unavailable`].
#[derive(Debug, Clone)]
pub struct ChannelPresenter {
    sender: mpsc::UnboundedSender<Notification>,
}

impl ChannelPresenter {
    /// Create a presenter and the receiver the UI layer drains.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl Presenter for ChannelPresenter {
    fn notify(&self, message: &str, blocking: bool) -> Result<(), PresentError> {
        self.sender
            .send(Notification::new(message, Presentation::from_blocking(blocking)))
            .map_err(|_| PresentError::Unavailable("notification receiver dropped".to_string()))
    }
}
