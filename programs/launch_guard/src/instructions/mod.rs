/**
 * Instructions for Launch Guard
 */

pub mod launch;
pub mod contribution;
pub mod trade;
pub mod monitor;
pub mod veto;
pub mod liquidity;

pub use launch::*;
pub use contribution::*;
pub use trade::*;
pub use monitor::*;
pub use veto::*;
pub use liquidity::*;
