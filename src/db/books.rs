use rusqlite::{params, Connection, Error as SqlError, ErrorCode, OptionalExtension, Params};
use tracing::{debug, info};

use crate::error::{InventoryError, Result};
use crate::models::{Book, BookUpdate, NewBook};

/// How many books the restock report shows.
pub const RESTOCK_LIMIT: usize = 5;

/// Resolve a typed search term to matching book ids.
///
/// A term that parses as an integer is only ever compared against `id`.
/// Anything else must equal a title or an author exactly; partial matches
/// are not returned. An empty result means nothing matched.
pub fn find_book_ids(conn: &Connection, term: &str) -> Result<Vec<i64>> {
    let term = term.trim();
    let ids = match term.parse::<i64>() {
        Ok(id) => query_ids(
            conn,
            "SELECT id FROM books WHERE id = ?1 ORDER BY id",
            params![id],
        )?,
        Err(_) => query_ids(
            conn,
            "SELECT id FROM books WHERE title = ?1 OR author = ?1 ORDER BY id",
            params![term],
        )?,
    };
    debug!(term, matches = ids.len(), "resolved search term");
    Ok(ids)
}

/// Ids of the books with the fewest copies, lowest first. Ties fall back to
/// id order.
pub fn lowest_stock_ids(conn: &Connection, limit: usize) -> Result<Vec<i64>> {
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    query_ids(
        conn,
        "SELECT id FROM books ORDER BY qty ASC, id ASC LIMIT ?1",
        params![limit],
    )
}

pub fn fetch_book(conn: &Connection, id: i64) -> Result<Option<Book>> {
    let book = conn
        .query_row(
            "SELECT id, title, author, qty FROM books WHERE id = ?1",
            params![id],
            book_from_row,
        )
        .optional()?;
    Ok(book)
}

/// Fetch the books for `ids`, keeping the caller's order. Ids that no longer
/// exist are skipped.
pub fn fetch_books(conn: &Connection, ids: &[i64]) -> Result<Vec<Book>> {
    let mut books = Vec::with_capacity(ids.len());
    for &id in ids {
        if let Some(book) = fetch_book(conn, id)? {
            books.push(book);
        }
    }
    Ok(books)
}

pub fn fetch_all_books(conn: &Connection) -> Result<Vec<Book>> {
    let mut stmt = conn.prepare("SELECT id, title, author, qty FROM books ORDER BY id")?;
    let books = stmt
        .query_map([], book_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(books)
}

/// Insert a new book. The write runs in its own transaction so a rejected
/// row leaves the table untouched.
pub fn create_book(conn: &Connection, book: &NewBook) -> Result<Book> {
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO books (id, title, author, qty) VALUES (?1, ?2, ?3, ?4)",
        params![book.id, book.title, book.author, book.qty],
    )
    .map_err(map_constraint)?;
    tx.commit()?;

    info!(id = book.id, title = %book.title, qty = book.qty, "book added");
    Ok(Book {
        id: book.id,
        title: book.title.clone(),
        author: book.author.clone(),
        qty: book.qty,
    })
}

/// Change one column of the book with `id`.
pub fn update_book(conn: &Connection, id: i64, update: &BookUpdate) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    let updated = match update {
        BookUpdate::Id(new_id) => {
            tx.execute("UPDATE books SET id = ?1 WHERE id = ?2", params![new_id, id])
        }
        BookUpdate::Title(title) => {
            tx.execute("UPDATE books SET title = ?1 WHERE id = ?2", params![title, id])
        }
        BookUpdate::Author(author) => {
            tx.execute("UPDATE books SET author = ?1 WHERE id = ?2", params![author, id])
        }
        BookUpdate::Quantity(qty) => {
            tx.execute("UPDATE books SET qty = ?1 WHERE id = ?2", params![qty, id])
        }
    }
    .map_err(map_constraint)?;

    if updated == 0 {
        return Err(InventoryError::NotFound(id));
    }
    tx.commit()?;

    info!(id, field = %update.field(), "book updated");
    Ok(())
}

pub fn delete_book(conn: &Connection, id: i64) -> Result<()> {
    let deleted = conn.execute("DELETE FROM books WHERE id = ?1", params![id])?;

    if deleted == 0 {
        Err(InventoryError::NotFound(id))
    } else {
        info!(id, "book deleted");
        Ok(())
    }
}

fn query_ids<P: Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<i64>> {
    let mut stmt = conn.prepare(sql)?;
    let ids = stmt
        .query_map(params, |row| row.get(0))?
        .collect::<std::result::Result<Vec<i64>, _>>()?;
    Ok(ids)
}

fn book_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Book> {
    Ok(Book {
        id: row.get(0)?,
        title: row.get(1)?,
        author: row.get(2)?,
        qty: row.get(3)?,
    })
}

/// Separate writes the table refused from genuine database failures.
fn map_constraint(err: SqlError) -> InventoryError {
    if matches!(
        err.sqlite_error_code(),
        Some(ErrorCode::ConstraintViolation) | Some(ErrorCode::TypeMismatch)
    ) {
        InventoryError::Rejected(err)
    } else {
        InventoryError::Storage(err)
    }
}
