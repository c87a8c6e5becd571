//! Access keys and the sources they are loaded from.

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{AwsError, Result};

const ACCESS_KEY_ENV: &str = "AWS_ACCESS_KEY_ID";
const SECRET_KEY_ENV: &str = "AWS_SECRET_ACCESS_KEY";
const PROFILE_ENV: &str = "AWS_PROFILE";
const DEFAULT_PROFILE: &str = "default";

/// AWS access key pair used to sign requests.
///
/// `Debug` prints the key id only.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl Credential {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Credential {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential({}, <redacted>)", self.access_key_id)
    }
}

/// A source of credentials.
pub trait CredentialProvider {
    fn resolve(&self) -> Result<Credential>;

    /// Label used when a chain reports which sources failed.
    fn name(&self) -> &'static str {
        "custom"
    }
}

/// Always yields the same key pair.
#[derive(Debug, Clone)]
pub struct StaticProvider(Credential);

impl StaticProvider {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        StaticProvider(Credential::new(access_key_id, secret_access_key))
    }
}

impl From<Credential> for StaticProvider {
    fn from(credential: Credential) -> Self {
        StaticProvider(credential)
    }
}

impl CredentialProvider for StaticProvider {
    fn resolve(&self) -> Result<Credential> {
        Ok(self.0.clone())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

/// Reads `AWS_ACCESS_KEY_ID` and `AWS_SECRET_ACCESS_KEY`.
///
/// Both variables must be set. Their values are passed through as-is; a bad key
/// pair is reported by the service.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvProvider;

fn required_var(name: &str) -> Result<String> {
    env::var(name).map_err(|e| AwsError::Credential(format!("{name}: {e}")))
}

impl CredentialProvider for EnvProvider {
    fn resolve(&self) -> Result<Credential> {
        Ok(Credential::new(
            required_var(ACCESS_KEY_ENV)?,
            required_var(SECRET_KEY_ENV)?,
        ))
    }

    fn name(&self) -> &'static str {
        "env"
    }
}

/// A parsed shared credentials file (`~/.aws/credentials`).
///
/// INI sections map to profiles; keys outside a section, blank lines and
/// `#`/`;` comments are skipped.
#[derive(Debug, Clone, Default)]
pub struct CredentialsFile {
    profiles: HashMap<String, HashMap<String, String>>,
}

impl CredentialsFile {
    pub fn parse(content: &str) -> Self {
        let mut profiles: HashMap<String, HashMap<String, String>> = HashMap::new();
        let mut current: Option<String> = None;

        for raw in content.lines() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with(['#', ';']) {
                continue;
            }
            if let Some(section) = line.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
                let section = section.trim().to_string();
                profiles.entry(section.clone()).or_default();
                current = Some(section);
            } else if let Some(profile) = &current
                && let Some((key, value)) = line.split_once('=')
            {
                profiles
                    .entry(profile.clone())
                    .or_default()
                    .insert(key.trim().to_string(), value.trim().to_string());
            }
        }

        CredentialsFile { profiles }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AwsError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Ok(Self::parse(&content))
    }

    /// Location used when no explicit path is given.
    pub fn default_path() -> Result<PathBuf> {
        let home = env::var_os("HOME")
            .or_else(|| env::var_os("USERPROFILE"))
            .ok_or_else(|| AwsError::Config("neither HOME nor USERPROFILE is set".into()))?;
        Ok(PathBuf::from(home).join(".aws").join("credentials"))
    }

    pub fn has_profile(&self, name: &str) -> bool {
        self.profiles.contains_key(name)
    }

    /// Key pair stored under profile `name`.
    pub fn credential(&self, name: &str) -> Result<Credential> {
        let section = self
            .profiles
            .get(name)
            .ok_or_else(|| AwsError::Credential(format!("profile [{name}] not found")))?;
        let field = |key: &str| {
            section.get(key).cloned().ok_or_else(|| {
                AwsError::Credential(format!("profile [{name}] has no {key}"))
            })
        };
        Ok(Credential::new(
            field("aws_access_key_id")?,
            field("aws_secret_access_key")?,
        ))
    }
}

/// Loads a profile from the shared credentials file.
///
/// Unless set explicitly, the profile is `$AWS_PROFILE` (or `default`) and the
/// file is `~/.aws/credentials`, both looked up at resolve time.
#[derive(Debug, Clone, Default)]
pub struct ProfileProvider {
    profile: Option<String>,
    path: Option<PathBuf>,
}

impl ProfileProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(self, profile: impl Into<String>) -> Self {
        ProfileProvider {
            profile: Some(profile.into()),
            ..self
        }
    }

    pub fn with_file(self, path: impl Into<PathBuf>) -> Self {
        ProfileProvider {
            path: Some(path.into()),
            ..self
        }
    }

    fn profile_name(&self) -> String {
        match &self.profile {
            Some(name) => name.clone(),
            None => env::var(PROFILE_ENV).unwrap_or_else(|_| DEFAULT_PROFILE.to_string()),
        }
    }
}

impl CredentialProvider for ProfileProvider {
    fn resolve(&self) -> Result<Credential> {
        let path = match &self.path {
            Some(path) => path.clone(),
            None => CredentialsFile::default_path()?,
        };
        CredentialsFile::load(&path)?.credential(&self.profile_name())
    }

    fn name(&self) -> &'static str {
        "profile"
    }
}

/// Asks each provider in turn; the first key pair found wins.
pub struct ChainProvider {
    providers: Vec<Box<dyn CredentialProvider + Send + Sync>>,
}

impl ChainProvider {
    pub fn new(providers: Vec<Box<dyn CredentialProvider + Send + Sync>>) -> Self {
        ChainProvider { providers }
    }

    /// Environment first, then the shared credentials file.
    pub fn default_chain() -> Self {
        Self::new(vec![Box::new(EnvProvider), Box::new(ProfileProvider::new())])
    }

    pub fn push(mut self, provider: impl CredentialProvider + Send + Sync + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }
}

impl CredentialProvider for ChainProvider {
    fn resolve(&self) -> Result<Credential> {
        let mut failures = Vec::with_capacity(self.providers.len());
        for provider in &self.providers {
            match provider.resolve() {
                Ok(credential) => {
                    tracing::debug!(source = provider.name(), "credential resolved");
                    return Ok(credential);
                }
                Err(e) => {
                    tracing::debug!(
                        source = provider.name(),
                        error = %e,
                        "credential source skipped"
                    );
                    failures.push(format!("{}: {}", provider.name(), e));
                }
            }
        }
        if failures.is_empty() {
            return Err(AwsError::Credential("no credential sources configured".into()));
        }
        Err(AwsError::Credential(format!(
            "no credentials found ({})",
            failures.join("; ")
        )))
    }

    fn name(&self) -> &'static str {
        "chain"
    }
}
