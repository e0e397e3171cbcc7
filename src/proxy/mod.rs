// proxy module - forwarding logic between inbound requests and the provider

pub mod events;
pub mod headers;
pub mod scripts;
pub mod upstream;

pub use events::{send_custom_event, ClientInfo, CustomEvent, EventPayload};
pub use scripts::ScriptStore;
pub use upstream::UpstreamClient;
