pub mod creations;
pub mod generation;
pub mod identity;
pub mod metrics;
pub mod providers;
pub mod quota_gate;

pub use creations::*;
pub use generation::*;
pub use identity::*;
pub use self::metrics::*;
pub use quota_gate::*;
