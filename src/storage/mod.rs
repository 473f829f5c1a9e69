// Storage Module
//
// The query engine reads profiles through the Database trait; it never
// mutates them. The on-disk profile format lives outside this crate.

pub mod memory;

pub use self::memory::MemoryDatabase;

use crate::catalog::Schema;
use crate::common::Value;
use crate::query::executor::result::QueryResult;

/// One row of values, positionally matching the columns it was selected with
pub type Record = Vec<Value>;

/// Iterator over records produced by `Database::select_from`
pub type Records<'a> = Box<dyn Iterator<Item = Record> + 'a>;

/// A profile as seen by the query engine
pub trait Database {
    /// Relations and fields of the profile
    fn schema(&self) -> &Schema;

    /// Rows of `relation`, each holding the requested `columns` in order
    fn select_from<'a>(&'a self, relation: &str, columns: &[String]) -> QueryResult<Records<'a>>;
}
