//! Service layer: image IO and progress reporting

pub mod io;
pub mod progress;

pub use io::ImageIOService;
pub use progress::{
    ConsoleProgressReporter, NoOpProgressReporter, PipelineStage, ProgressReporter,
    ProgressUpdate, StageCeilings,
};
