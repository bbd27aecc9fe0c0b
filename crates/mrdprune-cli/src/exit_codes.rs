//! Standard exit codes for CLI operations
//!
//! These exit codes follow Unix conventions and sysexits.h where applicable.

/// Success - operation completed without errors
pub const SUCCESS: i32 = 0;

/// General error - unspecified failure, or a deletion that failed or only
/// partially completed
pub const ERROR: i32 = 1;

/// Backend error - a list or delete call against the API server failed
pub const BACKEND_ERROR: i32 = 3;

/// Conversion error - a cluster record did not have the expected shape
pub const CONVERSION_ERROR: i32 = 4;

/// Usage error - invalid arguments or options (following sysexits.h convention)
pub const USAGE_ERROR: i32 = 64;
