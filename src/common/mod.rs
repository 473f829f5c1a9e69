// Common Types Module
//
// Values shared by stored rows and query literals.

pub mod value;

pub use self::value::{cast, Value};
