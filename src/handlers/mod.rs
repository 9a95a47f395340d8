// handlers/mod.rs - Two handler tiers
//
// Public (no session) → Protected (session required, see middleware::require_user)
pub mod public;    // Tier 1: /login, /logout, /auth/*, /health
pub mod protected; // Tier 2: pages and /api/*
