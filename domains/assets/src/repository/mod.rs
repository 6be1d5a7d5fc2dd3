//! Repository implementations for the Assets domain

pub mod assets;

use sqlx::PgPool;

pub use assets::AssetRepository;

/// Combined repository access for the Assets domain
#[derive(Clone)]
pub struct AssetsRepositories {
    pub assets: AssetRepository,
}

impl AssetsRepositories {
    pub fn new(pool: PgPool) -> Self {
        Self {
            assets: AssetRepository::new(pool),
        }
    }
}
