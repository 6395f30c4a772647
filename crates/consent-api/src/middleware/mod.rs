pub mod cors;
pub mod error_handler;
pub mod request_id;

pub use cors::setup_cors;
pub use error_handler::ErrorHandler;
pub use request_id::RequestId;
