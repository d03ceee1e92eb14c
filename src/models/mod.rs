pub mod alert;
pub mod case;
pub mod enums;
pub mod hospital;
pub mod snapshot;
pub mod stats;
pub mod vaccination;

pub use alert::*;
pub use case::*;
pub use hospital::*;
pub use snapshot::*;
pub use stats::*;
pub use vaccination::*;
