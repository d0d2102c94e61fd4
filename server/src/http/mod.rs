pub mod content_type;
pub mod error;
pub mod handlers;
pub mod server;
pub mod state;


pub use error::{ApiError, ApiResult};
pub use server::{router, start_server, API_BASE_PATH};
pub use state::AppState;
