//! Console narration and pacing.
//!
//! Every pipeline prints through a [`Narrator`]. Pauses only exist to pace
//! the output and never influence stage results.

use crate::sim::CancellationToken;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::debug;

const BOX_WIDTH: usize = 64;
const RULE_WIDTH: usize = 70;

/// Pacing settings for narration.
#[derive(Debug, Clone, PartialEq)]
pub struct PacingConfig {
    /// Multiplier applied to every pause. `0.0` disables pauses.
    pub scale: f64,
    /// Show a spinner while paused.
    pub show_spinner: bool,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            scale: 1.0,
            show_spinner: true,
        }
    }
}

/// Prints narration lines and paces them.
#[derive(Debug, Clone)]
pub struct Narrator {
    echo: bool,
    pacing: PacingConfig,
    cancel: Option<CancellationToken>,
}

impl Narrator {
    pub fn new(echo: bool, pacing: PacingConfig) -> Self {
        Self {
            echo,
            pacing,
            cancel: None,
        }
    }

    /// No output and no pauses.
    #[cfg(test)]
    pub fn silent() -> Self {
        Self::new(
            false,
            PacingConfig {
                scale: 0.0,
                show_spinner: false,
            },
        )
    }

    /// Let pauses end early once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }

    pub fn say(&self, line: impl AsRef<str>) {
        if self.echo {
            println!("{}", line.as_ref());
        }
    }

    /// A double-ruled header with a title, as used between major sections.
    pub fn header(&self, title: &str) {
        self.say(format!("\n{}", "=".repeat(RULE_WIDTH)));
        self.say(title);
        self.say("=".repeat(RULE_WIDTH));
    }

    /// A single light rule, optionally followed by a title and another rule.
    pub fn rule(&self, title: Option<&str>) {
        self.say("─".repeat(RULE_WIDTH));
        if let Some(title) = title {
            self.say(title);
            self.say("─".repeat(RULE_WIDTH));
        }
    }

    /// A boxed banner.
    pub fn banner(&self, lines: &[&str]) {
        if !self.echo {
            return;
        }
        for line in boxed(lines) {
            println!("{}", line);
        }
    }

    /// Pause for `seconds`, scaled by the pacing factor.
    pub async fn pause(&self, seconds: f64) {
        let scaled = seconds * self.pacing.scale;
        if !(scaled.is_finite() && scaled > 0.0) || self.is_cancelled() {
            return;
        }
        let duration = Duration::from_secs_f64(scaled);

        let spinner = if self.echo && self.pacing.show_spinner {
            let pb = ProgressBar::new_spinner();
            let template = ProgressStyle::default_spinner().template("{spinner:.cyan} {elapsed}");
            if let Ok(style) = template {
                pb.set_style(style);
            }
            pb.enable_steady_tick(Duration::from_millis(80));
            Some(pb)
        } else {
            None
        };

        match &self.cancel {
            Some(token) => {
                tokio::select! {
                    _ = tokio::time::sleep(duration) => {}
                    _ = token.cancelled() => debug!("Pause cut short by cancellation"),
                }
            }
            None => tokio::time::sleep(duration).await,
        }

        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }
    }
}

/// Lay out `lines` inside a box-drawing frame.
pub fn boxed(lines: &[&str]) -> Vec<String> {
    let mut out = Vec::with_capacity(lines.len() + 2);
    out.push(format!("╔{}╗", "═".repeat(BOX_WIDTH)));
    for line in lines {
        let width = line.chars().count();
        let padding = BOX_WIDTH.saturating_sub(width);
        out.push(format!("║{}{}║", line, " ".repeat(padding)));
    }
    out.push(format!("╚{}╝", "═".repeat(BOX_WIDTH)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_boxed_pads_lines() {
        let lines = boxed(&["  hello"]);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with('╔'));
        assert_eq!(lines[1].chars().count(), BOX_WIDTH + 2);
        assert!(lines[2].ends_with('╝'));
    }

    #[tokio::test]
    async fn test_silent_narrator_does_not_pause() {
        let narrator = Narrator::silent();
        let start = Instant::now();
        narrator.pause(5.0).await;
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_cancelled_narrator_skips_pause() {
        let token = CancellationToken::new();
        token.cancel("stop");
        let narrator = Narrator::new(
            false,
            PacingConfig {
                scale: 1.0,
                show_spinner: false,
            },
        )
        .with_cancellation(token);

        let start = Instant::now();
        narrator.pause(5.0).await;
        assert!(start.elapsed() < Duration::from_secs(1));
        assert!(narrator.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancellation_interrupts_running_pause() {
        let token = CancellationToken::new();
        let narrator = Narrator::new(
            false,
            PacingConfig {
                scale: 1.0,
                show_spinner: false,
            },
        )
        .with_cancellation(token.clone());

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            token.cancel("interrupt");
        });

        let start = Instant::now();
        narrator.pause(10.0).await;
        canceller.await.unwrap();
        assert!(start.elapsed() < Duration::from_secs(5));
    }
}
