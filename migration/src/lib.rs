pub use sea_orm_migration::prelude::*;

mod m20250901_000001_create_users;
mod m20250901_000002_create_catalog;
mod m20250902_000001_create_carts;
mod m20250903_000001_create_orders;
mod m20250905_000001_add_wishlists_and_coupons;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250901_000001_create_users::Migration),
            Box::new(m20250901_000002_create_catalog::Migration),
            Box::new(m20250902_000001_create_carts::Migration),
            Box::new(m20250903_000001_create_orders::Migration),
            Box::new(m20250905_000001_add_wishlists_and_coupons::Migration),
        ]
    }
}
