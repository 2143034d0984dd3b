pub mod auth;
pub mod recover;
pub mod response;

pub use auth::{jwt_guard, AuthSecret};
pub use recover::recover;
pub use response::{ApiResponse, ApiResult};
