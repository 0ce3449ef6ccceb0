mod consumption;
mod history;
mod measurement;
mod refill;
pub mod units;

pub use consumption::*;
pub use history::*;
pub use measurement::*;
pub use refill::*;
