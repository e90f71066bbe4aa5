use bayline_db::{migrations, SeedDataset};

use crate::commands::{with_pool, CommandResult};

/// Load the deterministic demo fixtures: a walk-in customer, their vehicle,
/// two technicians, and a three-tier labor and parts pricing matrix. The
/// fixture SQL upserts by fixed ids, so reseeding never duplicates rows.
pub fn run() -> CommandResult {
    with_pool("seed", |pool| async move {
        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;

        SeedDataset::load(&pool)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), 5u8))?;

        let verified = SeedDataset::verify(&pool)
            .await
            .map_err(|error| ("seed_verification", error.to_string(), 6u8))?;
        if !verified {
            return Err((
                "seed_verification",
                "seeded rows failed the verification check".to_string(),
                6u8,
            ));
        }

        Ok("loaded customer, vehicle, technician, and matrix fixtures".to_string())
    })
}
