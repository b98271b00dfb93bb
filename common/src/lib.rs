pub mod analysis;
pub mod extract;
pub mod prices;
pub mod range;

pub use analysis::*;
pub use extract::*;
pub use prices::*;
pub use range::*;
