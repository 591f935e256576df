pub mod archive;
mod memory;
mod postgres;
pub mod seed;
pub mod store;
#[cfg(feature = "test-utils")]
pub mod testutil;

pub use archive::HeadlineArchive;
pub use headline_common::{HeadlineError, Result};
pub use memory::InMemoryHeadlineStore;
pub use postgres::PgHeadlineStore;
pub use seed::{Dataset, DatasetArticle, SeedError, SeedOutcome, SeedReport, Seeder};
pub use store::HeadlineStore;
