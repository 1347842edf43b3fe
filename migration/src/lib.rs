pub use sea_orm_migration::prelude::*;

mod m20251001_000001_create_catalog;
mod m20251001_000002_create_coupons_and_shipping;
mod m20251002_000001_create_orders;
mod m20251003_000001_create_events;
mod m20251005_000001_create_valentine_cards;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251001_000001_create_catalog::Migration),
            Box::new(m20251001_000002_create_coupons_and_shipping::Migration),
            Box::new(m20251002_000001_create_orders::Migration),
            Box::new(m20251003_000001_create_events::Migration),
            Box::new(m20251005_000001_create_valentine_cards::Migration),
        ]
    }
}
