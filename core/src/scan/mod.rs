pub mod events;
pub mod orchestrator;
pub mod path;
pub mod slew;

pub use events::{LogStatus, OutcomeKind, PointProgress, ScanEvent, ScanPhase, StatusSink};
pub use orchestrator::{ScanOrchestrator, ScanOutcome, ScanReport, Visualizer};
pub use path::{generate, ScanPoint};
pub use slew::{slew_to_target, wait_for_slew};
