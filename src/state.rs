use crate::config::ProxyConfig;
use crate::proxy::scripts::ScriptStore;
use crate::proxy::upstream::UpstreamClient;

/// Shared application state.
///
/// Built once at startup from the resolved configuration and injected into
/// handlers; nothing here is looked up from ambient globals per request.
pub struct AppState {
    pub config: ProxyConfig,
    pub upstream: UpstreamClient,
    pub scripts: ScriptStore,
}

impl AppState {
    pub fn new(config: ProxyConfig) -> Result<Self, String> {
        let upstream = UpstreamClient::new(&config)?;
        Ok(Self {
            config,
            upstream,
            scripts: ScriptStore::new(),
        })
    }
}
