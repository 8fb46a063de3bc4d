//! App registry and configuration
//!
//! An [`App`] holds the project credentials and the shared HTTP client that
//! the account directory and the profile database use. Credentials come from
//! the bootstrap process, either as [`AppOptions`] literals or through
//! [`AppOptions::from_env`].

use crate::auth::{AccountService, Auth};
use crate::database::{Database, RestBackend};
use crate::error::ServiceError;
use crate::profile::{ProfileStore, ProfileStoreOptions};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Name used when [`AppOptions::app_name`] is `None`
pub const DEFAULT_APP_NAME: &str = "[DEFAULT]";

/// Production Identity Toolkit endpoint
pub const IDENTITY_TOOLKIT_ENDPOINT: &str = "https://identitytoolkit.googleapis.com/v1";

/// Global map of App names to App instances
static APP_INSTANCES: Lazy<RwLock<HashMap<String, App>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// App instance
///
/// Each app name has at most one App instance.
#[derive(Clone)]
pub struct App {
    inner: Arc<AppInner>,
}

struct AppInner {
    name: String,
    options: AppOptions,
    http_client: reqwest::Client,
}

/// App configuration options
#[derive(Clone, Debug)]
pub struct AppOptions {
    /// Web API key
    pub api_key: String,
    /// Google Cloud project ID
    pub project_id: String,
    /// Realtime Database URL, e.g. `https://my-project-default-rtdb.firebaseio.com`
    pub database_url: Option<String>,
    /// OAuth2 access token for admin calls (account management, database access)
    pub access_token: Option<String>,
    /// Identity Toolkit base URL; `None` selects the production endpoint
    pub identity_endpoint: Option<String>,
    /// App name (optional, defaults to "[DEFAULT]")
    pub app_name: Option<String>,
}

impl AppOptions {
    /// Read options from environment variables
    ///
    /// | Variable | Field |
    /// |---|---|
    /// | `FIREBASE_API_KEY` | `api_key` (required) |
    /// | `FIREBASE_PROJECT_ID` | `project_id` (required) |
    /// | `FIREBASE_DATABASE_URL` | `database_url` |
    /// | `FIREBASE_ACCESS_TOKEN` | `access_token` |
    /// | `FIREBASE_AUTH_EMULATOR_HOST` | `identity_endpoint` (emulator) |
    pub fn from_env() -> Result<Self, ServiceError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ServiceError> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = non_empty("FIREBASE_API_KEY").ok_or(ServiceError::ApiKeyNotConfigured)?;
        let project_id = non_empty("FIREBASE_PROJECT_ID")
            .ok_or_else(|| ServiceError::config("FIREBASE_PROJECT_ID is not set"))?;

        let emulator_host = non_empty("FIREBASE_AUTH_EMULATOR_HOST");
        let identity_endpoint = emulator_host
            .as_ref()
            .map(|host| format!("http://{}/identitytoolkit.googleapis.com/v1", host));

        // The Auth emulator accepts "owner" as an admin credential
        let access_token = match (non_empty("FIREBASE_ACCESS_TOKEN"), &emulator_host) {
            (Some(token), _) => Some(token),
            (None, Some(_)) => Some("owner".to_string()),
            (None, None) => None,
        };

        Ok(Self {
            api_key,
            project_id,
            database_url: non_empty("FIREBASE_DATABASE_URL"),
            access_token,
            identity_endpoint,
            app_name: None,
        })
    }

    /// Identity Toolkit base URL without a trailing slash
    pub fn identity_endpoint(&self) -> &str {
        self.identity_endpoint
            .as_deref()
            .unwrap_or(IDENTITY_TOOLKIT_ENDPOINT)
            .trim_end_matches('/')
    }
}

impl App {
    /// Create a new App with the given options
    ///
    /// If an app with the same name already exists, returns the existing instance.
    ///
    /// # Example
    /// ```no_run
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// use firebase_account_profiles::{App, AppOptions};
    ///
    /// let options = AppOptions {
    ///     api_key: "YOUR_API_KEY".to_string(),
    ///     project_id: "your-project-id".to_string(),
    ///     database_url: Some("https://your-project-default-rtdb.firebaseio.com".to_string()),
    ///     access_token: None,
    ///     identity_endpoint: None,
    ///     app_name: None,
    /// };
    /// let app = App::create(options).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create(options: AppOptions) -> Result<Self, ServiceError> {
        // Validate options (error case first)
        if options.api_key.is_empty() {
            return Err(ServiceError::ApiKeyNotConfigured);
        }
        if options.project_id.is_empty() {
            return Err(ServiceError::config("Project ID cannot be empty"));
        }

        let name = match options.app_name.clone() {
            None => DEFAULT_APP_NAME.to_string(),
            Some(n) => n,
        };

        let mut instances = APP_INSTANCES.write().await;

        if let Some(app) = instances.get(&name) {
            return Ok(app.clone());
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ServiceError::internal(format!("Failed to create HTTP client: {}", e)))?;

        let app = App {
            inner: Arc::new(AppInner {
                name: name.clone(),
                options,
                http_client,
            }),
        };

        instances.insert(name.clone(), app.clone());
        tracing::debug!(app = %name, "app created");

        Ok(app)
    }

    /// Get the default App instance
    pub async fn get_instance() -> Result<Self, ServiceError> {
        Self::get_instance_with_name(DEFAULT_APP_NAME).await
    }

    /// Get a named App instance
    pub async fn get_instance_with_name(name: &str) -> Result<Self, ServiceError> {
        let instances = APP_INSTANCES.read().await;
        instances.get(name).cloned().ok_or_else(|| {
            ServiceError::internal(format!(
                "App '{}' not found. Call App::create() first.",
                name
            ))
        })
    }

    /// Get the app name
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Get the app options
    pub fn options(&self) -> &AppOptions {
        &self.inner.options
    }

    /// Shared HTTP client
    pub(crate) fn http_client(&self) -> &reqwest::Client {
        &self.inner.http_client
    }

    /// Identity Toolkit client for this app
    pub fn auth(&self) -> Auth {
        Auth::new(self.options(), self.http_client().clone())
    }

    /// Realtime Database handle for this app
    ///
    /// # Errors
    /// `Config` when no database URL is configured.
    pub fn database(&self) -> Result<Database, ServiceError> {
        let Some(url) = self.options().database_url.as_deref() else {
            return Err(ServiceError::config("database_url is not configured"));
        };
        let backend = RestBackend::new(
            url,
            self.options().access_token.clone(),
            self.http_client().clone(),
        );
        Ok(Database::new(Arc::new(backend)))
    }

    /// Profile store wired to this app's directory and database
    pub fn profile_store(&self, options: ProfileStoreOptions) -> Result<ProfileStore, ServiceError> {
        let accounts = AccountService::new(Arc::new(self.auth()));
        Ok(ProfileStore::with_options(accounts, self.database()?, options))
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("name", &self.inner.name)
            .field("project_id", &self.inner.options.project_id)
            .finish()
    }
}
