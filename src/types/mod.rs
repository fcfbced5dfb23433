//! Shared types: pagination and response envelopes.

mod pagination;
mod response;
mod serde_util;

pub use pagination::{Paginated, PaginationParams};
pub use response::{BulkDeleteResponse, MessageResponse, NoContent};
pub use serde_util::double_option;
