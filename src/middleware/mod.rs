mod auth;
mod request_id;

pub use auth::{AdminUser, AuthUser};
pub use request_id::{make_span, request_id_middleware, RequestId, REQUEST_ID_HEADER};
