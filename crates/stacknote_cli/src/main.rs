//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `stacknote_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use stacknote_core::db::open_db_in_memory;
use stacknote_core::{ItemService, ListPresenter, SqliteItemRepository};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("stacknote_core ping={}", stacknote_core::ping());
    println!("stacknote_core version={}", stacknote_core::core_version());

    // Why: drive one add/move round through the real store so the probe
    // catches wiring regressions beyond crate linkage.
    let conn = open_db_in_memory()?;
    let repo = SqliteItemRepository::try_new(&conn)?;
    let mut presenter = ListPresenter::new(ItemService::new(repo))?;

    presenter.add_item("first")?;
    presenter.add_item("second")?;
    presenter.add_item("third")?;
    presenter.move_row(0, 3)?;

    for (index, row) in presenter.rows().iter().enumerate() {
        println!("row {index}: {}", row.title);
    }

    Ok(())
}
