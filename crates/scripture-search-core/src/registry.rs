//! Book registry: user-typed aliases to canonical document ids, plus the
//! fixed corpus order used by keyword search.
//!
//! The registry is built once at startup and read-only afterwards. Every id
//! an alias can reach is part of the corpus list by construction.

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("book id must not be empty")]
    EmptyId,
    #[error("duplicate book id: {0}")]
    DuplicateId(String),
    #[error("alias '{alias}' maps to both '{first}' and '{second}'")]
    ConflictingAlias {
        alias: String,
        first: String,
        second: String,
    },
}

/// One document in the corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Book {
    pub id: String,
    pub name: String,
    pub aliases: Vec<String>,
}

impl Book {
    /// Builds a book whose display name is derived from its id.
    pub fn new(id: impl Into<String>, aliases: &[&str]) -> Self {
        let id = id.into();
        Self {
            name: display_name_for(&id),
            id,
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// `"Mathiu.html"` → `"Mathiu"`, `"Pitor.htm"` → `"Pitor"`.
pub fn display_name_for(id: &str) -> String {
    id.strip_suffix(".html")
        .or_else(|| id.strip_suffix(".htm"))
        .unwrap_or(id)
        .to_string()
}

/// Trim and lower-case, the form aliases are stored and looked up in.
pub fn normalize_alias(alias: &str) -> String {
    alias.trim().to_lowercase()
}

#[derive(Debug, Clone)]
pub struct BookRegistry {
    books: Vec<Book>,
    by_id: HashMap<String, usize>,
    by_alias: HashMap<String, usize>,
}

impl BookRegistry {
    /// Builds a registry; `books` order is the corpus order.
    pub fn new(books: Vec<Book>) -> Result<Self, RegistryError> {
        let mut by_id = HashMap::with_capacity(books.len());
        let mut by_alias = HashMap::new();

        for (idx, book) in books.iter().enumerate() {
            if book.id.trim().is_empty() {
                return Err(RegistryError::EmptyId);
            }
            if by_id.insert(book.id.clone(), idx).is_some() {
                return Err(RegistryError::DuplicateId(book.id.clone()));
            }
            for alias in &book.aliases {
                let key = normalize_alias(alias);
                if key.is_empty() {
                    continue;
                }
                if let Some(prev) = by_alias.insert(key.clone(), idx) {
                    if prev != idx {
                        return Err(RegistryError::ConflictingAlias {
                            alias: key,
                            first: books[prev].id.clone(),
                            second: book.id.clone(),
                        });
                    }
                }
            }
        }

        Ok(Self {
            books,
            by_id,
            by_alias,
        })
    }

    /// The corpus shipped with the application.
    pub fn builtin() -> Self {
        let books = vec![
            Book::new("Aron.html", &["aron"]),
            Book::new("Ephesus.html", &["ephesus"]),
            Book::new("Galasia.html", &["galasia"]),
            Book::new("Hibru.html", &["hibru"]),
            Book::new("Jakob.html", &["jakob", "james"]),
            Book::new("John.html", &["john"]),
            Book::new("John1,2&3.html", &["john1,2&3"]),
            Book::new("Jud.html", &["jud", "jude"]),
            Book::new("Kapeklang.html", &["kapeklang"]),
            Book::new("Kolose.html", &["kolose"]),
            Book::new("Korinth1.html", &["korinth1"]),
            Book::new("Korinth2.html", &["korinth2"]),
            Book::new("Luk.html", &["luk", "luke"]),
            Book::new("Mark.html", &["mark"]),
            Book::new("Mathiu.html", &["mathiu"]),
            Book::new("Philemon.html", &["philemon"]),
            Book::new("Philippi.html", &["philippi"]),
            Book::new("Phurkimo.html", &["phurkimo"]),
            Book::new("Pitor.htm", &["pitor", "peter"]),
            Book::new("Pitor2.html", &["pitor2"]),
            Book::new("Rom.html", &["rom", "romans"]),
            Book::new("Sangho.html", &["sangho"]),
            Book::new("Thesalonika1.html", &["thesalonika1"]),
            Book::new("Thesalonika2.html", &["thesalonika2"]),
            Book::new("Timothi1.html", &["timothi1"]),
            Book::new("Timothi2.html", &["timothi2"]),
            Book::new("Titus.html", &["titus"]),
        ];
        // Static table; ids and aliases are unique.
        match Self::new(books) {
            Ok(registry) => registry,
            Err(e) => unreachable!("built-in registry is invalid: {e}"),
        }
    }

    /// Looks up a user-typed book name.
    pub fn resolve(&self, alias: &str) -> Option<&Book> {
        self.by_alias
            .get(&normalize_alias(alias))
            .map(|&idx| &self.books[idx])
    }

    pub fn book(&self, id: &str) -> Option<&Book> {
        self.by_id.get(id).map(|&idx| &self.books[idx])
    }

    /// Resolves either an alias or a canonical id.
    pub fn find(&self, name: &str) -> Option<&Book> {
        self.resolve(name).or_else(|| self.book(name.trim()))
    }

    /// All books in corpus order.
    pub fn corpus(&self) -> &[Book] {
        &self.books
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_strips_extension() {
        assert_eq!(display_name_for("Mathiu.html"), "Mathiu");
        assert_eq!(display_name_for("Pitor.htm"), "Pitor");
        assert_eq!(display_name_for("Notes"), "Notes");
    }

    #[test]
    fn resolve_is_case_insensitive_and_trimmed() {
        let registry = BookRegistry::builtin();
        let book = registry.resolve("  MaThIu ").unwrap();
        assert_eq!(book.id, "Mathiu.html");
        assert_eq!(book.name, "Mathiu");
    }

    #[test]
    fn aliases_share_a_document() {
        let registry = BookRegistry::builtin();
        assert_eq!(registry.resolve("luk").unwrap().id, "Luk.html");
        assert_eq!(registry.resolve("luke").unwrap().id, "Luk.html");
        assert_eq!(registry.resolve("peter").unwrap().id, "Pitor.htm");
    }

    #[test]
    fn punctuated_alias_resolves() {
        let registry = BookRegistry::builtin();
        assert_eq!(registry.resolve("John1,2&3").unwrap().id, "John1,2&3.html");
    }

    #[test]
    fn every_alias_target_is_in_corpus() {
        let registry = BookRegistry::builtin();
        assert_eq!(registry.len(), 27);
        for book in registry.corpus() {
            for alias in &book.aliases {
                let target = registry.resolve(alias).unwrap();
                assert!(registry.corpus().iter().any(|b| b.id == target.id));
            }
        }
    }

    #[test]
    fn corpus_order_is_preserved() {
        let registry = BookRegistry::builtin();
        let ids: Vec<&str> = registry.corpus().iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids[0], "Aron.html");
        assert_eq!(ids[26], "Titus.html");
    }

    #[test]
    fn find_accepts_id_or_alias() {
        let registry = BookRegistry::builtin();
        assert_eq!(registry.find("romans").unwrap().id, "Rom.html");
        assert_eq!(registry.find("Rom.html").unwrap().id, "Rom.html");
        assert!(registry.find("Genesis").is_none());
    }

    #[test]
    fn duplicate_id_rejected() {
        let err = BookRegistry::new(vec![Book::new("A.html", &["a"]), Book::new("A.html", &[])])
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateId("A.html".to_string()));
    }

    #[test]
    fn conflicting_alias_rejected() {
        let err = BookRegistry::new(vec![
            Book::new("A.html", &["same"]),
            Book::new("B.html", &["Same "]),
        ])
        .unwrap_err();
        assert!(matches!(err, RegistryError::ConflictingAlias { .. }));
    }

    #[test]
    fn empty_id_rejected() {
        let err = BookRegistry::new(vec![Book::new("  ", &[])]).unwrap_err();
        assert_eq!(err, RegistryError::EmptyId);
    }
}
