// handlers/public/mod.rs - Public handlers (no session required)
//
// Routes listed in the auth config's public routes. The auth pages only hand
// off to the hosted auth service; the callback stores the session it returns.
pub mod auth;
pub mod health;

pub use health::health;
