pub mod bag;
pub mod compare;
pub mod error;
pub mod linked;
pub mod rbtree;

pub use bag::*;
pub use compare::*;
pub use error::*;
pub use linked::*;
pub use rbtree::*;
