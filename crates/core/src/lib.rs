// crates/core/src/lib.rs
pub mod assistant;
pub mod device;
pub mod merge;
pub mod retry;
pub mod section;
pub mod session_id;
pub mod types;

pub use assistant::{fallback_reply, ApiProvider, AssistantError, AssistantProvider};
pub use device::{classify_user_agent, DeviceInfo, DeviceType};
pub use merge::{apply_action, apply_event, EventInput};
pub use retry::{retry_on_conflict, ConflictRetryError, WriteAttempt};
pub use section::Section;
pub use session_id::new_session_id;
pub use types::*;
