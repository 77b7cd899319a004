pub mod analyze;
pub mod error;
pub mod grammar;
pub mod ll1_table;
pub mod nullable_first_follow;
pub mod parse;
pub mod pretty_print;

pub use analyze::ParseTree;
pub use error::{Error, Result};
pub use grammar::{Grammar, Production};
pub use ll1_table::{LL1Table, TableCell};

pub const EPSILON: char = 'ε';
pub const END_MARK: char = '$';
