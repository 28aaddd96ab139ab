//! Vendor matcher (spec component E): infers a request's category, scores a
//! vendor's fit against it, and produces the composite score the shortlist
//! gate and presentation bundles key off.

pub mod category;
pub mod matcher;

pub use category::*;
pub use matcher::*;
