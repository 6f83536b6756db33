//! Line-driven menu shared by every front-end.
//!
//! The operator answers one prompt at a time, so the flows (add, update,
//! delete, search) are modelled as states of [`Session`]. Each submitted line
//! moves the session to its next state and appends whatever should be shown
//! to an output buffer. Repeated ambiguous deletes or chained searches simply
//! loop through the same states instead of nesting calls.

use std::mem;

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::warn;

use crate::db::{
    create_book, delete_book, fetch_all_books, fetch_books, find_book_ids, lowest_stock_ids,
    update_book, RESTOCK_LIMIT,
};
use crate::error::InventoryError;
use crate::models::{BookField, NewBook, Selection, BOOK_HEADER};

/// Main menu, one entry per line.
pub const MENU_LINES: &[&str] = &[
    "==========Main Menu=============",
    "1 - Enter a new book",
    "2 - Update book",
    "3 - Delete book",
    "4 - Search books",
    "5 - View all books",
    "6 - View books with lowest stock",
    "0 - Exit",
];

const NOT_FOUND: &str = "Book not found";
const ADD_HINT: &[&str] = &[
    "Oops! Please try again making sure of the following:",
    "ID must be a unique 4-digit number",
    "Title must be unique",
    "The quantity is a number of 0 or more",
];
const UPDATE_HINT: &str = "Oops! You can't update a book with those values.";
const SEARCH_CHOICES: &[&str] = &[
    "Enter one of the following if you would like to:",
    "s - search for another book/books",
    "d - delete the book",
    "u - update the book",
    "press Enter to return to the menu",
];

/// Whether the front-end should keep reading input.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Step {
    Continue,
    Exit,
}

/// Answers collected so far while adding a book.
#[derive(Debug, Default, Clone)]
struct BookDraft {
    id: Option<String>,
    title: Option<String>,
    author: Option<String>,
}

#[derive(Debug, Clone)]
enum State {
    Menu,
    NewBook(BookDraft),
    UpdateLookup,
    UpdateField { id: i64 },
    UpdateValue { id: i64, field: BookField },
    DeleteLookup,
    DeleteConfirm { id: i64 },
    SearchLookup,
    SearchAction { ids: Vec<i64> },
}

/// The menu state machine.
#[derive(Debug, Clone)]
pub struct Session {
    state: State,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self { state: State::Menu }
    }

    /// True when the next line will be read as a main menu choice.
    pub fn at_menu(&self) -> bool {
        matches!(self.state, State::Menu)
    }

    pub fn menu_lines(&self) -> &'static [&'static str] {
        MENU_LINES
    }

    /// Text shown in front of the input for the current state.
    pub fn prompt(&self) -> &'static str {
        match &self.state {
            State::Menu => "Please enter one of the following numbers: ",
            State::NewBook(draft) => {
                if draft.id.is_none() {
                    "4-digit ID: "
                } else if draft.title.is_none() {
                    "Title: "
                } else if draft.author.is_none() {
                    "Author: "
                } else {
                    "Quantity in stock: "
                }
            }
            State::UpdateLookup => "Enter the ID or title of the book you would like to update: ",
            State::UpdateField { .. } => {
                "Enter the field you would like to change (ID, Title, Author, Quantity): "
            }
            State::UpdateValue { .. } => "Enter the new value: ",
            State::DeleteLookup => "Enter the ID or title of the book you would like to delete: ",
            State::DeleteConfirm { .. } => "Are you sure you want to delete this book? (y/n) ",
            State::SearchLookup => "Enter the ID, title, author of the book/books to display: ",
            State::SearchAction { .. } => "Choice (s/d/u): ",
        }
    }

    /// Feed one line of operator input and collect the resulting output.
    pub fn submit(&mut self, conn: &Connection, line: &str, out: &mut Vec<String>) -> Result<Step> {
        let state = mem::replace(&mut self.state, State::Menu);
        let (next, step) = match state {
            State::Menu => self.handle_menu_choice(conn, line, out)?,
            State::NewBook(draft) => (self.handle_new_book(conn, draft, line, out), Step::Continue),
            State::UpdateLookup => {
                let ids = find_book_ids(conn, line).context("failed to look up book")?;
                (begin_update(&ids, out), Step::Continue)
            }
            State::UpdateField { id } => (choose_update_field(id, line, out), Step::Continue),
            State::UpdateValue { id, field } => {
                apply_update(conn, id, field, line, out);
                (State::Menu, Step::Continue)
            }
            State::DeleteLookup => {
                let ids = find_book_ids(conn, line).context("failed to look up book")?;
                (begin_delete(conn, &ids, out)?, Step::Continue)
            }
            State::DeleteConfirm { id } => {
                confirm_delete(conn, id, line, out)?;
                (State::Menu, Step::Continue)
            }
            State::SearchLookup => {
                let ids = find_book_ids(conn, line).context("failed to look up book")?;
                (show_search_results(conn, ids, out)?, Step::Continue)
            }
            State::SearchAction { ids } => (handle_search_choice(conn, ids, line, out)?, Step::Continue),
        };
        self.state = next;
        Ok(step)
    }

    fn handle_menu_choice(
        &self,
        conn: &Connection,
        line: &str,
        out: &mut Vec<String>,
    ) -> Result<(State, Step)> {
        let next = match line.trim() {
            "1" => {
                out.push("Please enter the following information about the book:".to_string());
                State::NewBook(BookDraft::default())
            }
            "2" => State::UpdateLookup,
            "3" => State::DeleteLookup,
            "4" => State::SearchLookup,
            "5" => {
                display_books(conn, Selection::All, out)?;
                State::Menu
            }
            "6" => {
                restock_report(conn, out)?;
                State::Menu
            }
            "0" => return Ok((State::Menu, Step::Exit)),
            _ => {
                out.push("Invalid choice".to_string());
                State::Menu
            }
        };
        Ok((next, Step::Continue))
    }

    fn handle_new_book(
        &self,
        conn: &Connection,
        mut draft: BookDraft,
        line: &str,
        out: &mut Vec<String>,
    ) -> State {
        let value = line.trim();
        if !draft.is_complete() {
            draft.record(value);
            return State::NewBook(draft);
        }

        match draft.finish(value).and_then(|book| create_book(conn, &book)) {
            Ok(_) => out.push("Book added.".to_string()),
            Err(err) => {
                warn!(error = %err, "book not added");
                out.extend(ADD_HINT.iter().map(|line| line.to_string()));
            }
        }
        State::Menu
    }
}

impl BookDraft {
    /// All answers except the quantity have been given.
    fn is_complete(&self) -> bool {
        self.author.is_some()
    }

    fn record(&mut self, value: &str) {
        let slot = if self.id.is_none() {
            &mut self.id
        } else if self.title.is_none() {
            &mut self.title
        } else {
            &mut self.author
        };
        *slot = Some(value.to_string());
    }

    fn finish(&self, qty: &str) -> Result<NewBook, InventoryError> {
        NewBook::parse(
            self.id.as_deref().unwrap_or_default(),
            self.title.as_deref().unwrap_or_default(),
            self.author.as_deref().unwrap_or_default(),
            qty,
        )
    }
}

/// Print the books named by `selection` under the column header.
pub fn display_books(conn: &Connection, selection: Selection<'_>, out: &mut Vec<String>) -> Result<()> {
    let books = match selection {
        Selection::All => {
            let books = fetch_all_books(conn).context("failed to load books")?;
            if books.is_empty() {
                out.push(BOOK_HEADER.to_string());
                out.push("No books in stock.".to_string());
                return Ok(());
            }
            books
        }
        Selection::Ids(ids) if ids.is_empty() => {
            out.push(NOT_FOUND.to_string());
            return Ok(());
        }
        Selection::Ids(ids) => fetch_books(conn, ids).context("failed to load books")?,
    };

    out.push(BOOK_HEADER.to_string());
    out.extend(books.iter().map(|book| book.to_string()));
    Ok(())
}

/// The five books closest to running out.
pub fn restock_report(conn: &Connection, out: &mut Vec<String>) -> Result<()> {
    let ids = lowest_stock_ids(conn, RESTOCK_LIMIT).context("failed to load stock levels")?;
    out.push("These are the five books with the lowest quantity in stock:".to_string());
    display_books(conn, Selection::Ids(&ids), out)?;
    out.push(
        "If you would like to restock a book use the update function from the menu to do so."
            .to_string(),
    );
    Ok(())
}

fn begin_update(ids: &[i64], out: &mut Vec<String>) -> State {
    match ids.first() {
        // Several matches: the first one is edited.
        Some(&id) => State::UpdateField { id },
        None => {
            out.push(NOT_FOUND.to_string());
            State::Menu
        }
    }
}

fn choose_update_field(id: i64, line: &str, out: &mut Vec<String>) -> State {
    match line.parse::<BookField>() {
        Ok(field) => State::UpdateValue { id, field },
        Err(_) => {
            out.push("Invalid field".to_string());
            State::Menu
        }
    }
}

fn apply_update(conn: &Connection, id: i64, field: BookField, line: &str, out: &mut Vec<String>) {
    let result = field
        .with_value(line.trim())
        .and_then(|update| update_book(conn, id, &update));
    match result {
        Ok(()) => out.push("Book updated".to_string()),
        Err(err) => {
            warn!(id, %field, error = %err, "book not updated");
            out.push(UPDATE_HINT.to_string());
        }
    }
}

fn begin_delete(conn: &Connection, ids: &[i64], out: &mut Vec<String>) -> Result<State> {
    match ids {
        [] => {
            out.push(NOT_FOUND.to_string());
            Ok(State::Menu)
        }
        [id] => {
            display_books(conn, Selection::Ids(ids), out)?;
            Ok(State::DeleteConfirm { id: *id })
        }
        _ => {
            out.push("These are the books you are trying to delete:".to_string());
            display_books(conn, Selection::Ids(ids), out)?;
            out.push(
                "Please only enter the unique ID or title of ONE book you would like to delete"
                    .to_string(),
            );
            Ok(State::DeleteLookup)
        }
    }
}

fn confirm_delete(conn: &Connection, id: i64, line: &str, out: &mut Vec<String>) -> Result<()> {
    if !line.trim().eq_ignore_ascii_case("y") {
        out.push("Returning to menu.".to_string());
        return Ok(());
    }

    match delete_book(conn, id) {
        Ok(()) => out.push("Book deleted".to_string()),
        Err(InventoryError::NotFound(_)) => out.push(NOT_FOUND.to_string()),
        Err(err) => return Err(err).context("failed to delete book"),
    }
    Ok(())
}

fn show_search_results(conn: &Connection, ids: Vec<i64>, out: &mut Vec<String>) -> Result<State> {
    display_books(conn, Selection::Ids(&ids), out)?;
    out.push(String::new());
    out.extend(SEARCH_CHOICES.iter().map(|line| line.to_string()));
    Ok(State::SearchAction { ids })
}

fn handle_search_choice(
    conn: &Connection,
    ids: Vec<i64>,
    line: &str,
    out: &mut Vec<String>,
) -> Result<State> {
    match line.trim() {
        "s" => Ok(State::SearchLookup),
        "d" => begin_delete(conn, &ids, out),
        "u" => Ok(begin_update(&ids, out)),
        _ => Ok(State::Menu),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{fetch_book, init_schema};

    fn store() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    /// Submit each line in turn and return everything printed.
    fn run(session: &mut Session, conn: &Connection, lines: &[&str]) -> Vec<String> {
        let mut out = Vec::new();
        for line in lines {
            session.submit(conn, line, &mut out).unwrap();
        }
        out
    }

    fn seed(conn: &Connection) {
        let mut session = Session::new();
        run(&mut session, conn, &["1", "1001", "Dune", "Frank Herbert", "2"]);
        run(&mut session, conn, &["1", "1002", "Dune Messiah", "Frank Herbert", "5"]);
        run(&mut session, conn, &["1", "1003", "Emma", "Jane Austen", "1"]);
    }

    #[test]
    fn prompts_follow_the_add_flow() {
        let conn = store();
        let mut session = Session::new();
        let mut out = Vec::new();

        assert!(session.at_menu());
        session.submit(&conn, "1", &mut out).unwrap();
        assert_eq!(session.prompt(), "4-digit ID: ");
        session.submit(&conn, "1001", &mut out).unwrap();
        assert_eq!(session.prompt(), "Title: ");
        session.submit(&conn, "Foo", &mut out).unwrap();
        assert_eq!(session.prompt(), "Author: ");
        session.submit(&conn, "Bar", &mut out).unwrap();
        assert_eq!(session.prompt(), "Quantity in stock: ");
        session.submit(&conn, "3", &mut out).unwrap();

        assert!(session.at_menu());
        assert_eq!(out.last().unwrap(), "Book added.");
    }

    #[test]
    fn bad_quantity_prints_the_hint() {
        let conn = store();
        let mut session = Session::new();

        let out = run(&mut session, &conn, &["1", "1001", "Foo", "Bar", "-2"]);
        assert_eq!(&out[1..], ADD_HINT);

        let out = run(&mut session, &conn, &["1", "1001", "Foo", "Bar", "many"]);
        assert_eq!(out.last().unwrap(), ADD_HINT.last().unwrap());
        assert!(fetch_book(&conn, 1001).unwrap().is_none());
    }

    #[test]
    fn unknown_menu_choice_is_reported() {
        let conn = store();
        let mut session = Session::new();
        assert_eq!(run(&mut session, &conn, &["9"]), vec!["Invalid choice"]);
        assert!(session.at_menu());
    }

    #[test]
    fn zero_exits() {
        let conn = store();
        let mut session = Session::new();
        let mut out = Vec::new();
        assert_eq!(session.submit(&conn, "0", &mut out).unwrap(), Step::Exit);
        assert!(out.is_empty());
    }

    #[test]
    fn update_unknown_field_does_not_claim_success() {
        let conn = store();
        seed(&conn);
        let mut session = Session::new();

        let out = run(&mut session, &conn, &["2", "Emma", "isbn"]);
        assert_eq!(out, vec!["Invalid field"]);
        assert!(session.at_menu());
        assert_eq!(fetch_book(&conn, 1003).unwrap().unwrap().qty, 1);
    }

    #[test]
    fn update_uses_first_of_several_matches() {
        let conn = store();
        seed(&conn);
        let mut session = Session::new();

        let out = run(&mut session, &conn, &["2", "Frank Herbert", "quantity", "40"]);
        assert_eq!(out, vec!["Book updated"]);
        assert_eq!(fetch_book(&conn, 1001).unwrap().unwrap().qty, 40);
        assert_eq!(fetch_book(&conn, 1002).unwrap().unwrap().qty, 5);
    }

    #[test]
    fn update_with_bad_value_rolls_back() {
        let conn = store();
        seed(&conn);
        let mut session = Session::new();

        let out = run(&mut session, &conn, &["2", "1003", "Title", "Dune"]);
        assert_eq!(out, vec![UPDATE_HINT]);
        assert_eq!(fetch_book(&conn, 1003).unwrap().unwrap().title, "Emma");
    }

    #[test]
    fn update_of_missing_book_returns_to_menu() {
        let conn = store();
        let mut session = Session::new();
        assert_eq!(run(&mut session, &conn, &["2", "Nope"]), vec![NOT_FOUND]);
        assert!(session.at_menu());
    }

    #[test]
    fn delete_needs_a_yes() {
        let conn = store();
        seed(&conn);
        let mut session = Session::new();

        let out = run(&mut session, &conn, &["3", "Emma", "n"]);
        assert_eq!(out.last().unwrap(), "Returning to menu.");
        assert!(fetch_book(&conn, 1003).unwrap().is_some());

        let out = run(&mut session, &conn, &["3", "Emma", "y"]);
        assert_eq!(out[0], BOOK_HEADER);
        assert_eq!(out[1], "1003 : Emma : Jane Austen : 1");
        assert_eq!(out.last().unwrap(), "Book deleted");
        assert!(fetch_book(&conn, 1003).unwrap().is_none());
        assert_eq!(fetch_all_books(&conn).unwrap().len(), 2);
    }

    #[test]
    fn ambiguous_delete_asks_again() {
        let conn = store();
        seed(&conn);
        let mut session = Session::new();

        let out = run(&mut session, &conn, &["3", "Frank Herbert", "Frank Herbert"]);
        assert_eq!(
            out.iter()
                .filter(|line| line.as_str() == "These are the books you are trying to delete:")
                .count(),
            2
        );
        assert_eq!(
            session.prompt(),
            "Enter the ID or title of the book you would like to delete: "
        );

        run(&mut session, &conn, &["1002", "y"]);
        assert!(fetch_book(&conn, 1002).unwrap().is_none());
        assert!(fetch_book(&conn, 1001).unwrap().is_some());
    }

    #[test]
    fn search_offers_follow_up_actions() {
        let conn = store();
        seed(&conn);
        let mut session = Session::new();

        let out = run(&mut session, &conn, &["4", "Dune"]);
        assert_eq!(out[0], BOOK_HEADER);
        assert_eq!(out[1], "1001 : Dune : Frank Herbert : 2");
        assert!(out.contains(&"s - search for another book/books".to_string()));

        let out = run(&mut session, &conn, &["s", "Jane Austen"]);
        assert_eq!(out[1], "1003 : Emma : Jane Austen : 1");

        let out = run(&mut session, &conn, &["u", "qty", "8"]);
        assert_eq!(out, vec!["Book updated"]);
        assert_eq!(fetch_book(&conn, 1003).unwrap().unwrap().qty, 8);

        run(&mut session, &conn, &["4", "Emma"]);
        assert!(matches!(session.state, State::SearchAction { .. }));
        run(&mut session, &conn, &[""]);
        assert!(session.at_menu());
    }

    #[test]
    fn search_without_match_says_not_found() {
        let conn = store();
        let mut session = Session::new();
        let out = run(&mut session, &conn, &["4", "Nothing"]);
        assert_eq!(out[0], NOT_FOUND);
    }

    #[test]
    fn listing_and_restock() {
        let conn = store();
        let mut session = Session::new();

        let out = run(&mut session, &conn, &["5"]);
        assert_eq!(out, vec![BOOK_HEADER, "No books in stock."]);

        let out = run(&mut session, &conn, &["6"]);
        assert_eq!(out[1], NOT_FOUND);

        seed(&conn);
        let out = run(&mut session, &conn, &["5"]);
        assert_eq!(out.len(), 4);

        let out = run(&mut session, &conn, &["6"]);
        assert_eq!(
            out[1..5],
            [
                BOOK_HEADER.to_string(),
                "1003 : Emma : Jane Austen : 1".to_string(),
                "1001 : Dune : Frank Herbert : 2".to_string(),
                "1002 : Dune Messiah : Frank Herbert : 5".to_string(),
            ]
        );
    }
}
