pub mod error;
pub mod handlers;
pub mod response;
pub mod routes;

pub use error::{ApiError, ApiResult};
pub use response::{ApiResponse, PaginatedResponse};
pub use routes::{create_routes, AppState};
