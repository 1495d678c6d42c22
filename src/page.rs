//! `verse page`: shows one page container of a book, the context a verse was
//! found in.

use anyhow::{bail, Context, Result};
use std::fmt::Write as _;

use scripture_search_core::engine::{PageView, QueryError};

use crate::config::Config;
use crate::corpus;

/// `page_number` is 1-based, as typed on the command line.
pub async fn run_page(config: &Config, book: &str, page_number: usize, raw: bool) -> Result<()> {
    if page_number == 0 {
        bail!("Page numbers start at 1");
    }

    let engine = corpus::open(config)?;
    let Some(entry) = engine.registry().find(book) else {
        bail!("Book \"{}\" not found", book);
    };
    let document_id = entry.id.clone();

    let view = match engine.page(&document_id, page_number - 1).await {
        Ok(view) => view,
        Err(QueryError::DocumentNotFound(_)) => bail!("Book \"{}\" not found", entry.name),
        Err(e) => return Err(e).with_context(|| format!("Failed to open {}", document_id)),
    };

    match view {
        Some(view) => {
            print!("{}", render_page(&view, raw));
            Ok(())
        }
        None => bail!("{} has no page {}", entry.name, page_number),
    }
}

pub fn render_page(view: &PageView, raw: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} - Page {}", view.display_name, view.page_index + 1);
    for paragraph in &view.paragraphs {
        if raw {
            let _ = writeln!(out, "\n{}", paragraph.raw.trim());
        } else if !paragraph.lines.is_empty() {
            let _ = writeln!(out, "\n{}", paragraph.lines.join("\n"));
        }
    }
    out
}
