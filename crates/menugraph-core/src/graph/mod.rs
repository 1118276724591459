//! Graph engines driven by schema ownership

pub mod cascade;
pub mod deep_copy;

pub use cascade::{cascade_delete, cascade_delete_one, deletion_closure, CascadeReport};
pub use deep_copy::{deep_copy, DetachedGraph};
