//! Terminal-backed notifier and navigator.

use async_trait::async_trait;
use std::io::{self, BufRead, Write};
use std::sync::Mutex;

use vcrs_client::ui::NoticeLevel;
use vcrs_client::{Navigator, Notice, Notifier, Page};

/// Prints notices and asks for `y/N` confirmation on stdin.
pub struct TerminalNotifier {
    assume_yes: bool,
}

impl TerminalNotifier {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

#[async_trait]
impl Notifier for TerminalNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Info => println!("{}", notice.text),
            NoticeLevel::Error => eprintln!("{}", notice.text),
        }
    }

    async fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        let prompt = prompt.to_string();
        let answer = tokio::task::spawn_blocking(move || -> io::Result<String> {
            print!("{} [y/N] ", prompt);
            io::stdout().flush()?;
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;
            Ok(line)
        })
        .await;

        match answer {
            Ok(Ok(line)) => is_yes(&line),
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Could not read confirmation");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "Confirmation prompt aborted");
                false
            }
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Remembers the last navigation so the CLI can follow it.
#[derive(Default)]
pub struct PageTracker {
    pending: Mutex<Option<Page>>,
}

impl PageTracker {
    pub fn take(&self) -> Option<Page> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner()).take()
    }
}

impl Navigator for PageTracker {
    fn navigate(&self, page: Page) {
        tracing::debug!(%page, "Navigate");
        *self.pending.lock().unwrap_or_else(|e| e.into_inner()) = Some(page);
    }
}
