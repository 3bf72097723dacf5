// Keypoint stream and analysis data models

pub mod analysis;
pub mod angle;
pub mod keypoint;
pub mod rep;

pub use analysis::*;
pub use angle::*;
pub use keypoint::*;
pub use rep::*;
