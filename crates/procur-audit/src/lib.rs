//! Audit trail, negotiation memory, and tag-indexed retrieval (spec components
//! J and K). Every store here is append-only and keyed by `(request_id,
//! vendor_id)`, sharded across async mutexes so concurrent vendor negotiations
//! never contend on a single lock.

pub mod memory;
pub mod retrieval;
pub mod trail;

pub use memory::*;
pub use retrieval::*;
pub use trail::*;
