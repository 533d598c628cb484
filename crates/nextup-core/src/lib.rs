// Library root for the selection engine.
//
// The pool, selection history and draw scheduler are the leaves; `engine`
// composes them into the facade that the terminal app (and tests) drive.
// Sources, sinks and config are the collaborators the facade talks to.

pub mod config;
pub mod draw;
pub mod engine;
pub mod history;
pub mod pool;
pub mod sink;
pub mod source;

pub use draw::{DrawState, SpinDuration};
pub use engine::{Engine, EngineEvent, PickOutcome, PoolRow, Snapshot};
pub use history::SelectionHistory;
pub use pool::{Entry, Pool};
pub use source::{Source, SourceLoader};
