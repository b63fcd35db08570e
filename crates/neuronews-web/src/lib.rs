//! neuronews-web — the authenticated trigger surface for the two batch
//! runs. Two POST endpoints, one per orchestrator, guarded by a
//! shared-secret bearer token.

pub mod auth;
pub mod handlers;
pub mod router;
pub mod state;
