pub mod example;
pub mod result;

pub use example::{ExampleWord, StructuredExample};
pub use result::{LookupResult, ResultPayload};
