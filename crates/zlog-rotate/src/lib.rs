//! zlog Rotate - Rotating file writer bounded by size, age, and backup count

mod backup;
mod rotation;
mod writer;

pub use backup::BackupFile;
pub use rotation::RotationConfig;
pub use writer::RotatingWriter;
