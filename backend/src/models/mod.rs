pub mod flight;
pub mod state;
pub mod time;

pub use flight::*;
pub use state::*;
pub use time::*;
