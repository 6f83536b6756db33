//! Binary entry point: open the store, run whichever front-end suits the
//! terminal, and close the store on the way out.
use std::io::{self, IsTerminal};

use bookstore_inventory::{close_store, db, ensure_schema, logging, run_app, run_plain, App};

fn main() -> anyhow::Result<()> {
    logging::init(&db::log_path()?)?;
    let conn = ensure_schema()?;

    let conn = if io::stdin().is_terminal() && io::stdout().is_terminal() {
        let mut app = App::new(conn);
        run_app(&mut app)?;
        app.into_connection()
    } else {
        run_plain(&conn, io::stdin().lock(), io::stdout().lock())?;
        conn
    };

    close_store(conn)
}
