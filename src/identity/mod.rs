//! Viewer identity as supplied by the surrounding platform's request layer.
//! Keep the public surface thin; authentication itself happens upstream.

mod principal;
mod request_context;

pub use principal::{Principal, Attrs, ROLE_ADMIN, ROLE_GLOBAL_ADMIN};
pub use request_context::RequestContext;
