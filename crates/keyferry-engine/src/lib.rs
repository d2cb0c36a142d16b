//! keyferry-engine: store/retrieve flows between key directories and the vault

pub mod bundle;
pub mod engine;

pub use engine::{
    bundle_to_records, records_to_bundle, retrieve_keys, store_keys, RetrieveOutcome,
    StoreOutcome,
};
