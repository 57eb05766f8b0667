//! Shared data structures for wear forecasting
//!
//! - `measurement`: recorded wear readings and asset identity
//! - `regime`: elapsed-day points and the maintenance-bounded spans built from them
//! - `forecast`: threshold-crossing outcomes and forecast reports
//! - `comparison`: fleet wear-rate comparison output

mod measurement;
mod regime;
mod forecast;
mod comparison;

pub use measurement::*;
pub use regime::*;
pub use forecast::*;
pub use comparison::*;
