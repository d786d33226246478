pub use sea_orm_migration::prelude::*;

mod m20250901_000001_initial;
mod m20250901_000002_seed_defaults;
mod m20250902_000001_add_chain_cursors;
mod m20250902_000002_add_ticket_available_at;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250901_000001_initial::Migration),
            Box::new(m20250901_000002_seed_defaults::Migration),
            Box::new(m20250902_000001_add_chain_cursors::Migration),
            Box::new(m20250902_000002_add_ticket_available_at::Migration),
        ]
    }
}
