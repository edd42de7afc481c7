mod auction;
mod item;
mod product;

pub use auction::*;
pub use item::*;
pub use product::*;
