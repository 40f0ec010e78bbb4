pub mod fallback;
pub mod local;
pub mod remote;
pub mod resolver;
pub mod schema;
