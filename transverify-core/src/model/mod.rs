pub mod pair;
pub mod snapshot;
