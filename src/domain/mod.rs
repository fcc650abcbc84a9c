mod budget;
mod category;
mod money;
mod record;
mod summary;

pub use budget::*;
pub use category::*;
pub use money::*;
pub use record::*;
pub use summary::*;
