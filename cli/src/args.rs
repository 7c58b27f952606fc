//! Command-line surface and configuration.

use catalog_core::config::{DEFAULT_BASE_URL, DEFAULT_PAGE_SIZE};
use catalog_core::{BookForm, BookId, ClientConfig};
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "catalog", version, about = "Browse and edit the book catalog")]
pub struct Cli {
    /// Root URL of the catalog API.
    #[arg(long, global = true, env = "CATALOG_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Books per page.
    #[arg(long, global = true, env = "CATALOG_PAGE_SIZE", default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: u32,

    /// Answer yes to every confirmation prompt.
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.base_url.clone()).with_page_size(self.page_size)
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check that the API and its database are up.
    Health,
    /// Show one page of books.
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Show a single book.
    Show { id: BookId },
    /// Add a book.
    Add(BookArgs),
    /// Change a book; omitted fields keep their current value.
    Edit {
        id: BookId,
        #[command(flatten)]
        fields: EditArgs,
    },
    /// Delete a book.
    Delete { id: BookId },
    /// Show catalog statistics.
    Stats,
    /// Seed the catalog with sample books.
    Init,
    /// Page through the catalog interactively.
    Browse,
}

#[derive(Debug, Args)]
pub struct BookArgs {
    #[arg(long, default_value = "")]
    pub title: String,
    #[arg(long, default_value = "")]
    pub author: String,
    #[arg(long, default_value = "")]
    pub isbn: String,
    #[arg(long, default_value = "")]
    pub publisher: String,
    #[arg(long, default_value = "")]
    pub price: String,
    #[arg(long, default_value = "")]
    pub description: String,
}

impl From<BookArgs> for BookForm {
    fn from(args: BookArgs) -> Self {
        Self {
            title: args.title,
            author: args.author,
            isbn: args.isbn,
            publisher: args.publisher,
            price: args.price,
            description: args.description,
        }
    }
}

#[derive(Debug, Args)]
pub struct EditArgs {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub author: Option<String>,
    #[arg(long)]
    pub isbn: Option<String>,
    #[arg(long)]
    pub publisher: Option<String>,
    #[arg(long)]
    pub price: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
}

impl EditArgs {
    /// Overlay the given flags on a form pre-filled from the server.
    pub fn apply(self, mut form: BookForm) -> BookForm {
        let fields = [
            (self.title, &mut form.title),
            (self.author, &mut form.author),
            (self.isbn, &mut form.isbn),
            (self.publisher, &mut form.publisher),
            (self.price, &mut form.price),
            (self.description, &mut form.description),
        ];
        for (value, slot) in fields {
            if let Some(value) = value {
                *slot = value;
            }
        }
        form
    }
}
