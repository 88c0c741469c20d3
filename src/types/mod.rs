mod device_category;
mod operating_system;
mod user_agent;
mod user_agent_type;
mod version_number;

pub use device_category::*;
pub use operating_system::*;
pub use user_agent::*;
pub use user_agent_type::*;
pub use version_number::*;

pub(crate) use user_agent::{unknown, UserAgentBuilder};
