pub mod delivery;
pub mod instance;
pub mod recipient;
pub mod session;
pub mod settings;
pub mod template;

pub use delivery::DeliveryRecord;
pub use instance::{ChannelInstance, ChannelType, InstanceStatus};
pub use recipient::{DeliveryState, GroupCandidate, GuestCandidate, Recipient};
pub use session::{DispatchOutcome, DispatchPhase, DispatchSession};
pub use settings::{CampaignSettings, DelayPolicy};
pub use template::{TemplatePool, TemplateVars};
