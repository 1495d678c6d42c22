//! `verse books`: lists the registry in corpus order, optionally checking that
//! every document can be loaded.

use anyhow::Result;

use scripture_search_core::loader::{DocumentLoader, LoadError};
use scripture_search_core::registry::Book;

use crate::config::Config;
use crate::corpus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookStatus {
    Ok,
    NotFound,
    Error,
}

impl BookStatus {
    pub fn label(self) -> &'static str {
        match self {
            BookStatus::Ok => "OK",
            BookStatus::NotFound => "NOT FOUND",
            BookStatus::Error => "ERROR",
        }
    }
}

pub async fn run_books(config: &Config, check: bool) -> Result<()> {
    let engine = corpus::open(config)?;
    let books = engine.registry().corpus();

    if !check {
        println!("{:<16} {:<20} ALIASES", "BOOK", "ID");
        for book in books {
            println!("{}", book_row(book));
        }
        return Ok(());
    }

    println!("{:<16} {:<20} {:<10} ALIASES", "BOOK", "ID", "STATUS");
    let mut healthy = 0;
    for book in books {
        let status = match engine.loader().load(&book.id).await {
            Ok(_) => BookStatus::Ok,
            Err(LoadError::NotFound(_)) => BookStatus::NotFound,
            Err(e) => {
                tracing::warn!(document = %book.id, error = %e, "book check failed");
                BookStatus::Error
            }
        };
        if status == BookStatus::Ok {
            healthy += 1;
        }
        println!(
            "{:<16} {:<20} {:<10} {}",
            book.name,
            book.id,
            status.label(),
            book.aliases.join(", ")
        );
    }
    println!();
    println!("{} of {} books available", healthy, books.len());
    Ok(())
}

fn book_row(book: &Book) -> String {
    format!("{:<16} {:<20} {}", book.name, book.id, book.aliases.join(", "))
}
