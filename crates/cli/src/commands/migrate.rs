use bayline_db::migrations;

use crate::commands::{with_pool, CommandResult};

/// Bring the shop database schema up to date. Safe to rerun: applied steps
/// are recorded in the migration ledger and skipped on later runs.
pub fn run() -> CommandResult {
    with_pool("migrate", |pool| async move {
        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;

        let known = migrations::MIGRATOR.iter().count();
        Ok(format!("schema is current ({known} migrations in the embedded set)"))
    })
}
