//! Rest countdown: state machine, scheduling and the async driver.

mod controller;
mod driver;
mod error;
mod event;
mod scheduler;
mod token;

pub use controller::TimerController;
pub use driver::{open, Capabilities, SessionDriver, SessionHandle};
pub use error::SessionError;
pub use event::{RestEvent, UserAction, Wakeup};
pub use scheduler::{ManualScheduler, Scheduler, TokioScheduler};
pub use token::{AlertToken, TokenSource};
