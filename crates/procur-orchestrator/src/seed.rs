use async_trait::async_trait;
use procur_types::VendorProfile;

/// Host-supplied vendor universe (§6 "Consumed" interfaces). A run's shortlist
/// is drawn from whatever this returns; the pipeline has no opinion on where
/// vendor records come from (a database, a static file, a partner API).
#[async_trait]
pub trait SeedCatalog: Send + Sync {
    async fn load(&self) -> Result<Vec<VendorProfile>, String>;
}

/// In-memory catalog for tests and simple hosts that already hold their
/// vendor records.
pub struct StaticSeedCatalog {
    vendors: Vec<VendorProfile>,
}

impl StaticSeedCatalog {
    pub fn new(vendors: Vec<VendorProfile>) -> Self {
        Self { vendors }
    }
}

#[async_trait]
impl SeedCatalog for StaticSeedCatalog {
    async fn load(&self) -> Result<Vec<VendorProfile>, String> {
        Ok(self.vendors.clone())
    }
}
