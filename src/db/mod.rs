//! Persistence module split across logical submodules.

mod books;
mod connection;

pub use books::{
    create_book, delete_book, fetch_all_books, fetch_book, fetch_books, find_book_ids,
    lowest_stock_ids, update_book, RESTOCK_LIMIT,
};
pub use connection::{
    close_store, data_dir, db_path, ensure_schema, ensure_schema_at, init_schema, log_path,
};
