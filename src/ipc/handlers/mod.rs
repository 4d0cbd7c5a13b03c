//! JSON-RPC method handlers, one module per method family.

pub mod lifecycle;
pub mod tools;
