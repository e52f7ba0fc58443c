use std::sync::Arc;

use crate::api::HttpGateway;
use crate::config::{self, AppPaths, Settings};
use crate::engine::{Confirmer, MailboxEngine, SyncPolicy};
use crate::error::AppResult;
use crate::sync::{self, RefresherHandle};

/// Everything a UI needs to drive the engine for one profile.
pub struct SyncContext {
    pub profile: String,
    pub paths: AppPaths,
    pub settings: Settings,
    pub engine: Arc<MailboxEngine<HttpGateway>>,
}

impl SyncContext {
    pub fn bootstrap(profile: &str, confirmer: impl Confirmer + 'static) -> AppResult<Self> {
        let paths = AppPaths::discover()?;
        Self::with_paths(profile, paths, confirmer)
    }

    pub fn with_paths(
        profile: &str,
        paths: AppPaths,
        confirmer: impl Confirmer + 'static,
    ) -> AppResult<Self> {
        let profile = config::resolve_profile(profile)?;
        let settings = config::load_settings(&paths, &profile)?;
        let policy = SyncPolicy::from_settings(&settings)?;
        let gateway = HttpGateway::new(settings.endpoint(), policy.call_timeout)?;
        let engine = MailboxEngine::new(gateway)
            .with_policy(policy)
            .with_confirmer(confirmer);

        log::debug!(
            "profile `{profile}` using endpoint {}",
            engine.gateway().base_url()
        );

        Ok(Self {
            profile,
            paths,
            settings,
            engine: Arc::new(engine),
        })
    }

    /// Starts periodic and invalidation-driven refetching.
    pub fn start_refresher(&self) -> AppResult<RefresherHandle> {
        let interval = self.settings.refresh_interval()?;
        Ok(sync::spawn_refresher(Arc::clone(&self.engine), interval))
    }
}
