// Test modules for luxrig-bridge
//
// Each source module with business logic has a matching test file here that
// exercises it through the public crate API. Upstream HTTP behavior lives in
// the integration tests under tests/.

// Shared fixtures and in-memory adapters
pub mod helpers;

pub mod core_types;
