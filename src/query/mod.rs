//! Filter-to-query compilation: allow-listed predicates, sort columns and
//! grouping expressions, with user values only ever bound as parameters.

pub mod compiler;
pub mod predicate;

pub use compiler::CompiledQuery;
pub use predicate::QueryParam;
