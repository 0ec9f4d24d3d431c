/**
 * State Accounts for Launch Guard
 *
 * Account structs plus the pure protection logic they carry.
 */

pub mod launch;
pub mod wallet_limits;
pub mod metrics;
pub mod circuit_breaker;
pub mod liquidity_lock;
pub mod participation;
pub mod veto;

pub use launch::*;
pub use wallet_limits::*;
pub use metrics::*;
pub use circuit_breaker::*;
pub use liquidity_lock::*;
pub use participation::*;
pub use veto::*;
