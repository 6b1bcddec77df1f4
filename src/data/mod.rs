mod fetch;
mod fixture;
mod provider;
mod storage;

pub use fetch::fulfil;
pub use fixture::{FixtureData, FixtureProvider};
pub use provider::{CrossRateDataSource, CrossRateSnapshot, InstrumentDataSource, InstrumentHistory};
pub use storage::{JsonFileSettingsStore, MemorySettingsStore, UserSettingsStore};
