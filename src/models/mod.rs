mod product;
mod purchase;
mod receipt;

pub use product::*;
pub use purchase::*;
pub use receipt::*;
