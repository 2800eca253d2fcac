//! Exit codes of the `techval` binary. Part of the public contract for CI gates.

pub const OK: i32 = 0;
pub const GATE_FAILED: i32 = 1; // At least one criterion failed
pub const CONFIG_ERROR: i32 = 2; // Bad config/inputs, or the engine could not produce results
