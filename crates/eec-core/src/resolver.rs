//! Layered configuration resolution
//!
//! The `ConfigResolver` merges the three sources in a fixed order, with
//! later sources overriding earlier ones:
//!
//! 1. Store namespace (when `store_namespace` is set)
//! 2. Environment variables (when `env_namespace` is set)
//! 3. Command-line arguments (always)

use crate::request::ConfigRequest;
use crate::resolved::ResolvedConfig;
use crate::sources::{EnvSource, ProcessEnv, StoreQuery, load_args, load_env, load_store};
use crate::transport::{HttpTransport, StoreTransport};
use crate::{Error, Result};

/// Outcome of [`ConfigResolver::resolve_lenient`]
///
/// Unlike [`ConfigResolver::resolve`], a store failure does not discard the
/// environment and argument layers.
#[derive(Debug)]
pub struct Resolution {
    /// Whatever the layers that succeeded produced
    pub config: ResolvedConfig,

    /// Why the store layer contributed nothing, if it failed
    pub store_error: Option<Error>,

    /// Required keys absent from `config`
    pub missing_keys: Vec<String>,
}

impl Resolution {
    /// Every enabled layer loaded and every required key is present
    pub fn is_complete(&self) -> bool {
        self.store_error.is_none() && self.missing_keys.is_empty()
    }

    /// Convert to the strict result, store errors first
    pub fn into_result(self) -> Result<ResolvedConfig> {
        if let Some(err) = self.store_error {
            return Err(err);
        }
        if !self.missing_keys.is_empty() {
            return Err(Error::MissingKeys {
                keys: self.missing_keys,
            });
        }
        Ok(self.config)
    }
}

/// Resolves configuration for one request
///
/// The environment table and argument vector are passed to each call so the
/// same resolver can be run against the real process or a test fixture.
///
/// # Example
///
/// ```no_run
/// use eec_core::{ConfigRequest, ConfigResolver, ProcessEnv};
///
/// let request = ConfigRequest::new()
///     .with_store_namespace("cfg/vast-service/")
///     .with_env_namespace("VAST");
/// let args: Vec<String> = std::env::args().collect();
///
/// let config = ConfigResolver::new(request).resolve(&ProcessEnv, args.as_slice())?;
/// println!("{:?}", config.get("dbHost"));
/// # Ok::<(), eec_core::Error>(())
/// ```
pub struct ConfigResolver {
    request: ConfigRequest,
    transport: Box<dyn StoreTransport>,
}

impl ConfigResolver {
    /// Create a resolver that reaches the store over HTTP
    pub fn new(request: ConfigRequest) -> Self {
        Self::with_transport(request, HttpTransport::new())
    }

    /// Create a resolver with a custom store transport
    pub fn with_transport(request: ConfigRequest, transport: impl StoreTransport + 'static) -> Self {
        Self {
            request,
            transport: Box::new(transport),
        }
    }

    pub fn request(&self) -> &ConfigRequest {
        &self.request
    }

    /// Resolve the configuration by merging all enabled sources
    ///
    /// Any store failure aborts the whole resolution; no partial map is
    /// returned. Missing required keys are reported as
    /// [`Error::MissingKeys`].
    pub fn resolve<S: AsRef<str>>(&self, env: &dyn EnvSource, args: &[S]) -> Result<ResolvedConfig> {
        let mut config = ResolvedConfig::new();
        self.load_store_layer(env, &mut config)?;
        self.load_local_layers(env, args, &mut config);

        let missing = config.missing(self.request.required_keys.as_slice());
        if !missing.is_empty() {
            return Err(Error::MissingKeys { keys: missing });
        }
        Ok(config)
    }

    /// Resolve like [`resolve`](Self::resolve), keeping the environment and
    /// argument layers when the store layer fails
    pub fn resolve_lenient<S: AsRef<str>>(&self, env: &dyn EnvSource, args: &[S]) -> Resolution {
        let mut config = ResolvedConfig::new();
        let store_error = match self.load_store_layer(env, &mut config) {
            Ok(()) => None,
            Err(err) => {
                tracing::warn!(error = %err, "Store layer failed, continuing without it");
                Some(err)
            }
        };
        self.load_local_layers(env, args, &mut config);

        let missing_keys = config.missing(self.request.required_keys.as_slice());
        Resolution {
            config,
            store_error,
            missing_keys,
        }
    }

    // Layer 1 - Store namespace
    fn load_store_layer(&self, env: &dyn EnvSource, config: &mut ResolvedConfig) -> Result<()> {
        let Some(query) = StoreQuery::from_request(&self.request, env) else {
            tracing::debug!("No store namespace (layer 1), skipping");
            return Ok(());
        };

        let url = query.url();
        tracing::debug!(namespace = %query.namespace, %url, "Loading store config (layer 1)");
        let count = load_store(&query, self.transport.as_ref(), config)?;
        tracing::debug!(count, "Loaded store config (layer 1)");
        Ok(())
    }

    // Layers 2 and 3 cannot fail
    fn load_local_layers<S: AsRef<str>>(
        &self,
        env: &dyn EnvSource,
        args: &[S],
        config: &mut ResolvedConfig,
    ) {
        // Layer 2 - Environment variables
        match self.request.env_namespace.as_deref() {
            Some(namespace) => {
                let count = load_env(namespace, env, config);
                tracing::debug!(namespace, count, "Loaded environment config (layer 2)");
            }
            None => tracing::debug!("No environment namespace (layer 2), skipping"),
        }

        // Layer 3 - Command-line arguments
        let count = load_args(args, config);
        tracing::debug!(count, "Loaded argument config (layer 3)");
    }
}

/// Resolve `request` against the real process environment and arguments
///
/// Arguments that are not valid Unicode are converted lossily.
pub fn resolve_from_process(request: ConfigRequest) -> Result<ResolvedConfig> {
    let args: Vec<String> = std::env::args_os()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();
    ConfigResolver::new(request).resolve(&ProcessEnv, args.as_slice())
}
