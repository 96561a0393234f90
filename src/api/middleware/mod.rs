//! API middleware.

mod session;

pub use session::{expired_session_cookie, session_cookie, session_middleware, CurrentUser};
