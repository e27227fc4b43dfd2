pub mod session;

pub use session::{bearer_token, require_session, Session};
