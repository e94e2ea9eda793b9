// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (JWT auth, Principal in request extensions)
//
// Handlers stay thin: extract, call a service, wrap the result in the
// success envelope. Access decisions live in the services.
pub mod extract;
pub mod protected; // Tier 2: JWT authentication required (/api/*)
pub mod public; // Tier 1: No authentication required (/, /health, /api/auth/register|login)
