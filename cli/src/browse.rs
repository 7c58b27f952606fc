//! Interactive paging loop.

use catalog_core::{BookCatalogClient, BookId, Transport};
use tracing::debug;

pub const HELP: &str = "n next | p previous | r refresh | v <id> view | d <id> delete | i init | q quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowseCommand {
    Next,
    Previous,
    Refresh,
    View(BookId),
    Delete(BookId),
    Init,
    Help,
    Quit,
}

impl BrowseCommand {
    /// `None` for input that is not a command; blank input is `None` too.
    pub fn parse(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let command = words.next()?;
        let argument = words.next();
        if words.next().is_some() {
            return None;
        }
        let id = || argument.and_then(|w| w.parse::<BookId>().ok());
        match (command, argument) {
            ("n", None) => Some(Self::Next),
            ("p", None) => Some(Self::Previous),
            ("r", None) => Some(Self::Refresh),
            ("i", None) => Some(Self::Init),
            ("q", None) => Some(Self::Quit),
            ("h" | "?", None) => Some(Self::Help),
            ("v", Some(_)) => id().map(Self::View),
            ("d", Some(_)) => id().map(Self::Delete),
            _ => None,
        }
    }
}

async fn read_command() -> Option<String> {
    let prompt = tokio::task::spawn_blocking(|| {
        inquire::Text::new("catalog>").with_help_message(HELP).prompt()
    })
    .await;
    match prompt {
        Ok(Ok(line)) => Some(line),
        Ok(Err(err)) => {
            debug!(error = %err, "prompt closed");
            None
        }
        Err(err) => {
            debug!(error = %err, "prompt task failed");
            None
        }
    }
}

/// Run until the user quits or stdin closes. Failures are already reported
/// through the client's notifier, so they only end up in the debug log here.
pub async fn run<T: Transport>(client: &BookCatalogClient<T>) {
    client.start().await;

    while let Some(line) = read_command().await {
        let Some(command) = BrowseCommand::parse(&line) else {
            if !line.trim().is_empty() {
                println!("{HELP}");
            }
            continue;
        };
        let result = match command {
            BrowseCommand::Next => client.change_page(1).await.map(drop),
            BrowseCommand::Previous => client.change_page(-1).await.map(drop),
            BrowseCommand::Refresh => client.refresh().await.map(drop),
            BrowseCommand::View(id) => client.view_book(id).await.map(drop),
            BrowseCommand::Delete(id) => client.delete_book(id).await.map(drop),
            BrowseCommand::Init => client.initialize_sample_data().await.map(drop),
            BrowseCommand::Help => {
                println!("{HELP}");
                Ok(())
            }
            BrowseCommand::Quit => break,
        };
        if let Err(err) = result {
            debug!(?command, error = %err, "browse command failed");
        }
    }
}
