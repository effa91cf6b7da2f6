pub mod gate;
pub mod response;

pub use gate::gate_middleware;
pub use response::{ApiResponse, ApiResult};
