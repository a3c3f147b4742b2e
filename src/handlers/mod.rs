// handlers/mod.rs - Two-tier handler layout
//
// Public (no session needed: signup, signin, token, health)
// Protected (session needed: signout, articles, comments)
pub mod protected;
pub mod public;
