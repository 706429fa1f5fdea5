pub mod auth_redirect;
pub mod session_cookie;
