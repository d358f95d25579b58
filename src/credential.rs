use std::env;
use std::fs;
use std::path::PathBuf;

use crate::error::{AsinError, Result};

/// Environment variable holding the access key id.
pub const ENV_KEY: &str = "ASIN_KEY";
/// Environment variable holding the secret key.
pub const ENV_SECRET: &str = "ASIN_SECRET";
/// Environment variable holding the associate tag.
pub const ENV_TAG: &str = "ASIN_TAG";

/// Access credentials for the product API.
///
/// The `Debug` implementation redacts `secret_access_key` to prevent
/// accidental leakage in logs.
#[derive(Clone, Default)]
pub struct Credential {
    pub access_key_id: String,
    pub secret_access_key: String,
    /// Associate (affiliate) tag, sent as `AssociateTag` when present.
    pub associate_tag: Option<String>,
}

impl Credential {
    /// Creates a credential without an associate tag.
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            associate_tag: None,
        }
    }

    /// Sets the associate tag.
    pub fn with_associate_tag(mut self, tag: impl Into<String>) -> Self {
        self.associate_tag = Some(tag.into());
        self
    }

    /// Fails unless both the access key id and the secret are non-empty.
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.secret_access_key.is_empty() {
            missing.push("secret");
        }
        if self.access_key_id.is_empty() {
            missing.push("key");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(AsinError::Config(format!(
                "you are missing mandatory configuration options. please set [{}]",
                missing.join(", ")
            )))
        }
    }

    /// The associate tag to send, if one is configured and non-blank.
    pub(crate) fn associate_tag(&self) -> Option<&str> {
        self.associate_tag
            .as_deref()
            .filter(|tag| !tag.trim().is_empty())
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"****")
            .field("associate_tag", &self.associate_tag)
            .finish()
    }
}

/// Resolves a [`Credential`] from a specific source.
pub trait CredentialProvider {
    /// Attempt to resolve a credential from this provider.
    fn resolve(&self) -> Result<Credential>;
}

/// Provides a credential from explicitly specified values.
pub struct StaticProvider {
    credential: Credential,
}

impl StaticProvider {
    pub fn new(credential: Credential) -> Self {
        Self { credential }
    }
}

impl CredentialProvider for StaticProvider {
    fn resolve(&self) -> Result<Credential> {
        Ok(self.credential.clone())
    }
}

/// Provides a credential from environment variables.
///
/// Reads `ASIN_KEY` and `ASIN_SECRET`, plus the optional `ASIN_TAG`.
pub struct EnvProvider;

impl CredentialProvider for EnvProvider {
    fn resolve(&self) -> Result<Credential> {
        let key = env::var(ENV_KEY)
            .map_err(|_| AsinError::Credential(format!("{ENV_KEY} not set")))?;
        let secret = env::var(ENV_SECRET)
            .map_err(|_| AsinError::Credential(format!("{ENV_SECRET} not set")))?;

        if key.is_empty() || secret.is_empty() {
            return Err(AsinError::Credential(format!(
                "{ENV_KEY} or {ENV_SECRET} is empty"
            )));
        }

        Ok(Credential {
            access_key_id: key,
            secret_access_key: secret,
            associate_tag: env::var(ENV_TAG).ok().filter(|tag| !tag.is_empty()),
        })
    }
}

/// Provides a credential from an INI-style credentials file.
///
/// Reads `~/.asin/credentials`; the default section is `default`:
///
/// ```text
/// [default]
/// key = AKIA...
/// secret = ...
/// associate_tag = mytag-20
/// ```
pub struct ProfileProvider {
    profile_name: String,
    file_path: Option<PathBuf>,
}

impl Default for ProfileProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileProvider {
    /// Creates a provider that reads the `default` profile.
    pub fn new() -> Self {
        Self {
            profile_name: "default".to_string(),
            file_path: None,
        }
    }

    /// Specifies a custom profile name.
    pub fn with_profile(mut self, name: impl Into<String>) -> Self {
        self.profile_name = name.into();
        self
    }

    /// Specifies a custom file path instead of the default location.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    fn default_path() -> Result<PathBuf> {
        let home = env::var("HOME")
            .or_else(|_| env::var("USERPROFILE"))
            .map_err(|_| AsinError::Config("cannot determine home directory".into()))?;
        Ok(PathBuf::from(home).join(".asin").join("credentials"))
    }

    fn parse_ini(content: &str, profile: &str) -> Result<Credential> {
        let section_header = format!("[{}]", profile);
        let mut in_section = false;
        let mut key = None;
        let mut secret = None;
        let mut associate_tag = None;

        for line in content.lines() {
            let line = line.trim();
            if line.starts_with('[') {
                in_section = line == section_header;
                continue;
            }
            if !in_section || line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            if let Some((name, value)) = line.split_once('=') {
                let value = value.trim().to_string();
                match name.trim() {
                    "key" => key = Some(value),
                    "secret" => secret = Some(value),
                    "associate_tag" => associate_tag = Some(value),
                    _ => {}
                }
            }
        }

        match (key, secret) {
            (Some(key), Some(secret)) => Ok(Credential {
                access_key_id: key,
                secret_access_key: secret,
                associate_tag: associate_tag.filter(|tag| !tag.is_empty()),
            }),
            _ => Err(AsinError::Config(format!(
                "profile '{}' missing key or secret",
                profile
            ))),
        }
    }
}

impl CredentialProvider for ProfileProvider {
    fn resolve(&self) -> Result<Credential> {
        let path = match &self.file_path {
            Some(p) => p.clone(),
            None => Self::default_path()?,
        };
        let content = fs::read_to_string(&path).map_err(|e| {
            AsinError::Config(format!(
                "cannot read credentials file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::parse_ini(&content, &self.profile_name)
    }
}

/// Tries multiple credential providers in order and returns the first success.
pub struct ChainProvider {
    providers: Vec<Box<dyn CredentialProvider>>,
}

impl ChainProvider {
    /// Creates a chain with the given providers.
    pub fn new(providers: Vec<Box<dyn CredentialProvider>>) -> Self {
        Self { providers }
    }

    /// Creates the default credential chain: Env → Profile.
    pub fn default_chain() -> Self {
        Self {
            providers: vec![Box::new(EnvProvider), Box::new(ProfileProvider::new())],
        }
    }
}

impl CredentialProvider for ChainProvider {
    fn resolve(&self) -> Result<Credential> {
        let mut last_err = AsinError::Credential("no credential providers configured".into());
        for provider in &self.providers {
            match provider.resolve() {
                Ok(cred) => return Ok(cred),
                Err(e) => last_err = e,
            }
        }
        Err(AsinError::Credential(format!(
            "all credential providers failed, last error: {}",
            last_err
        )))
    }
}
