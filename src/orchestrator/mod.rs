//! Background orchestration: the alert sweep loop, the periodic model
//! training job, and the time abstraction both are paced by.

pub mod clock;
pub mod sweep;
pub mod training;

// Re-export main orchestrators
pub use clock::{Clock, ManualClock, SystemClock};
pub use sweep::{AlertScheduler, SweepPacing};
pub use training::TrainingJob;
