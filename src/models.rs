//! Domain models that mirror the `books` table. They stay plain data holders
//! so the persistence layer and the menu can pass them around freely.

use std::fmt;
use std::str::FromStr;

use crate::error::{InventoryError, Result};

/// Column header printed above every listing of books.
pub const BOOK_HEADER: &str = "ID : Title : Author : Quantity";

#[derive(Debug, Clone, PartialEq, Eq)]
/// One inventory item.
pub struct Book {
    /// Four-digit identifier chosen by the operator; doubles as the primary key.
    pub id: i64,
    /// Unique title.
    pub title: String,
    pub author: String,
    /// Copies in stock. Never negative.
    pub qty: i64,
}

impl fmt::Display for Book {
    /// Fixed-column listing line: `id : title : author : qty`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} : {} : {} : {}",
            self.id, self.title, self.author, self.qty
        )
    }
}

/// Payload for inserting a book. Unlike [`Book`] this is built from operator
/// input before the store has accepted it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub qty: i64,
}

impl NewBook {
    /// Build the payload from the raw strings typed at each prompt. Only the
    /// numeric fields are checked here; everything else is left to the
    /// table constraints.
    pub fn parse(id: &str, title: &str, author: &str, qty: &str) -> Result<Self> {
        Ok(Self {
            id: parse_number(BookField::Id, id)?,
            title: title.to_string(),
            author: author.to_string(),
            qty: parse_number(BookField::Quantity, qty)?,
        })
    }
}

/// The columns an operator may change after a book exists.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BookField {
    Id,
    Title,
    Author,
    Quantity,
}

impl BookField {
    /// Pair the field with a typed value, parsing numbers where needed.
    pub fn with_value(self, raw: &str) -> Result<BookUpdate> {
        Ok(match self {
            BookField::Id => BookUpdate::Id(parse_number(self, raw)?),
            BookField::Title => BookUpdate::Title(raw.to_string()),
            BookField::Author => BookUpdate::Author(raw.to_string()),
            BookField::Quantity => BookUpdate::Quantity(parse_number(self, raw)?),
        })
    }
}

impl FromStr for BookField {
    type Err = InventoryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "id" => Ok(BookField::Id),
            "title" => Ok(BookField::Title),
            "author" => Ok(BookField::Author),
            "quantity" | "qty" => Ok(BookField::Quantity),
            _ => Err(InventoryError::UnknownField(s.trim().to_string())),
        }
    }
}

impl fmt::Display for BookField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BookField::Id => "ID",
            BookField::Title => "Title",
            BookField::Author => "Author",
            BookField::Quantity => "Quantity",
        };
        f.write_str(name)
    }
}

/// A single-column change, ready to be bound to an `UPDATE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookUpdate {
    Id(i64),
    Title(String),
    Author(String),
    Quantity(i64),
}

impl BookUpdate {
    pub fn field(&self) -> BookField {
        match self {
            BookUpdate::Id(_) => BookField::Id,
            BookUpdate::Title(_) => BookField::Title,
            BookUpdate::Author(_) => BookField::Author,
            BookUpdate::Quantity(_) => BookField::Quantity,
        }
    }
}

/// What to show in a listing.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Selection<'a> {
    /// Every book in the store.
    All,
    /// The books with these ids, in this order. Empty means nothing matched.
    Ids(&'a [i64]),
}

fn parse_number(field: BookField, raw: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| InventoryError::InvalidNumber {
            field,
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn book_renders_as_fixed_columns() {
        let book = Book {
            id: 1001,
            title: "Foo".into(),
            author: "Bar".into(),
            qty: 3,
        };
        assert_eq!(book.to_string(), "1001 : Foo : Bar : 3");
    }

    #[test]
    fn field_names_parse_case_insensitively() {
        assert_eq!("Title".parse::<BookField>().unwrap(), BookField::Title);
        assert_eq!(" QUANTITY ".parse::<BookField>().unwrap(), BookField::Quantity);
        assert_eq!("qty".parse::<BookField>().unwrap(), BookField::Quantity);
        assert_eq!("id".parse::<BookField>().unwrap(), BookField::Id);
        assert!(matches!(
            "isbn".parse::<BookField>(),
            Err(InventoryError::UnknownField(name)) if name == "isbn"
        ));
    }

    #[test]
    fn numeric_fields_reject_text() {
        let err = BookField::Quantity.with_value("lots").unwrap_err();
        assert!(matches!(
            err,
            InventoryError::InvalidNumber { field: BookField::Quantity, .. }
        ));
        assert_eq!(
            BookField::Title.with_value("Dune").unwrap(),
            BookUpdate::Title("Dune".into())
        );
        assert_eq!(BookField::Id.with_value(" 1002 ").unwrap(), BookUpdate::Id(1002));
    }

    #[test]
    fn new_book_keeps_negative_quantity_for_the_store_to_reject() {
        let book = NewBook::parse("1001", "Foo", "Bar", "-1").unwrap();
        assert_eq!(book.qty, -1);
        assert!(NewBook::parse("abcd", "Foo", "Bar", "1").is_err());
    }
}
