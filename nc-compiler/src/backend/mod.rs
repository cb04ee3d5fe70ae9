//! Execution backends for IR modules.
//!
//! Only the reference interpreter exists; native code emission is out of scope.

pub mod interp;

pub use interp::{run, BufferHost, Host, RuntimeError, StdHost};
