mod admin;

pub use admin::{AdminAuthMiddlewareFactory, AdminToken, ADMIN_TOKEN_HEADER};
