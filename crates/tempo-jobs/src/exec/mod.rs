//! Execution substrates. Each strategy has a `spawn`/`start` entry that
//! consumes the job and returns a handle with stop/join semantics — jobs
//! compose with their execution context instead of inheriting from it.

pub mod cooperative;
pub mod process;
pub mod threaded;

pub use cooperative::EventLoop;
pub use process::ProcessHandle;
pub use threaded::ThreadedHandle;
