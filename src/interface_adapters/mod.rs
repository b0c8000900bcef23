pub mod clients;
pub mod handlers;
pub mod protocol;
pub mod rate_limit;
pub mod routes;
pub mod security;
pub mod state;
