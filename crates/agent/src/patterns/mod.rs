//! Work patterns: reusable multi-agent composition strategies.
//!
//! 1. **Debate**: planning and critique members iterate until consensus,
//!    then an optional executing member runs the agreed plan
//! 2. **Sequential**: rag → reviewing → rewriting pipeline over a shared
//!    context
//!
//! Both implement [`WorkPattern`]: bind members once, then invoke awaited,
//! spawned, or blocking.

pub mod debate;
pub mod sequential;
pub mod work_pattern;

pub use debate::{
    DebatePattern, DebateRequest, DebateResult, DebateSettings, Round, consensus_score,
};
pub use sequential::{PipelineRequest, PipelineResult, SequentialPattern, StageRecord};
pub use work_pattern::{Slot, WorkPattern};

#[cfg(test)]
pub(crate) mod test_helpers;
