//! Store layer behind the RPC procedures.
//! - `store::KvStore` is the seam between the HTTP layer and the backing store.
//! - `store::redis_store` forwards to Redis; `store::memory` keeps data in process.
//! - Errors are flattened into `ServiceError` so the RPC layer can map them.

pub mod errors;
pub mod store;

pub use errors::ServiceError;
pub use store::{connect, KvStore};
