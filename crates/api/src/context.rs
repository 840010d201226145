//! Application context - wires the hexagonal architecture together.

use std::sync::Arc;

use slated_core::{
    AvailabilityChecker, CommandService, EditSessions, EventMutator, Orchestrator, SlotFinder,
};
use slated_core::ports::{CalendarPort, CredentialStore, EventExtractor};
use slated_domain::constants::CALENDAR_TIMEZONE;
use slated_domain::{Config, Result, WorkWindow};
use slated_infra::{
    DbManager, GoogleCalendarClient, GoogleOAuth, HttpClient, LlmEventExtractor,
    RefreshingCredentialStore, SqliteCredentialStore, TokenCipher,
};

/// Shared state handed to every route handler.
pub struct AppContext {
    pub config: Config,
    pub work_window: WorkWindow,
    pub credentials: Arc<dyn CredentialStore>,
    pub oauth: Arc<GoogleOAuth>,
    pub orchestrator: Orchestrator,
    pub commands: CommandService,
    pub calendar: Arc<dyn CalendarPort>,
}

impl AppContext {
    /// Build the full dependency graph from validated configuration.
    ///
    /// Fails closed on a bad encryption key or unreachable database - both
    /// are startup errors.
    pub fn build(config: Config) -> Result<Self> {
        let cipher = Arc::new(TokenCipher::new(&config.security.encryption_key)?);

        let db = Arc::new(DbManager::new(&config.database.path, config.database.pool_size)?);
        db.run_migrations()?;

        let http = HttpClient::new()?;
        let calendar: Arc<dyn CalendarPort> =
            Arc::new(GoogleCalendarClient::new(http.clone()));
        let extractor: Arc<dyn EventExtractor> =
            Arc::new(LlmEventExtractor::new(http.clone(), &config.extractor));
        let oauth = Arc::new(GoogleOAuth::new(http, config.google.clone()));

        // Reads go through the refreshing decorator so an expired access
        // token is renewed and persisted before any calendar call.
        let credentials: Arc<dyn CredentialStore> = Arc::new(RefreshingCredentialStore::new(
            Arc::new(SqliteCredentialStore::new(db, cipher)),
            oauth.clone(),
        ));

        let work_window = WorkWindow::parse(&config.server.work_hours)?;
        let sessions = Arc::new(EditSessions::new());

        let orchestrator = Orchestrator::new(
            credentials.clone(),
            extractor.clone(),
            SlotFinder::new(calendar.clone()),
            AvailabilityChecker::new(calendar.clone()),
            EventMutator::new(calendar.clone(), sessions.clone()),
            sessions,
            work_window,
            CALENDAR_TIMEZONE.to_string(),
        );

        let commands = CommandService::new(
            credentials.clone(),
            calendar.clone(),
            extractor,
            work_window,
            CALENDAR_TIMEZONE.to_string(),
        );

        Ok(Self { config, work_window, credentials, oauth, orchestrator, commands, calendar })
    }
}
