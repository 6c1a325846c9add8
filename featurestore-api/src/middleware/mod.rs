mod auth;

pub use auth::{auth_middleware, AuthContext};
