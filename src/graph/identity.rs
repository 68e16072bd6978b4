//! Assembly identity for the types and methods of a [`crate::graph::TypeGraph`].
//!
//! Every type node records the assembly it was loaded from. The preservation pass only ever
//! looks at the simple name (provenance is decided by name), but the full identity is kept so
//! that two side-by-side versions of the same library stay distinct graph owners.
//!
//! # Display Name Format
//!
//! ```text
//! Name, Version=major.minor.build.revision, Culture=culture
//! ```
//!
//! Only the simple name is required; a missing version parses as `0.0.0.0` and a missing or
//! `neutral` culture parses as `None`.

use std::{fmt, fmt::Write, str::FromStr};

use crate::{Error, Result};

/// Identity of a loaded assembly.
///
/// Equality and hashing cover the name, version and culture, so the identity can be used as a
/// key for per-assembly caches such as the provenance memo.
///
/// # Examples
///
/// ```rust
/// use nsmark::graph::{AssemblyIdentity, AssemblyVersion};
///
/// let identity = AssemblyIdentity::parse("Xamarin.iOS, Version=0.0.0.0")?;
/// assert_eq!(identity.simple_name(), "Xamarin.iOS");
/// assert_eq!(identity.version, AssemblyVersion::UNKNOWN);
/// # Ok::<(), nsmark::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssemblyIdentity {
    /// Simple assembly name (e.g., "Xamarin.iOS", "System.Net.Http").
    pub name: String,
    /// Four-part version number.
    pub version: AssemblyVersion,
    /// Culture of satellite assemblies, `None` for culture-neutral assemblies.
    pub culture: Option<String>,
}

/// Four-part version numbering for .NET assemblies.
///
/// Versions are compared component-wise in order: major, minor, build, revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct AssemblyVersion {
    /// Major version component.
    pub major: u16,
    /// Minor version component.
    pub minor: u16,
    /// Build version component.
    pub build: u16,
    /// Revision version component.
    pub revision: u16,
}

impl AssemblyIdentity {
    /// Create a culture-neutral identity.
    ///
    /// # Arguments
    ///
    /// * `name` - Simple assembly name
    /// * `version` - Four-part version
    pub fn new(name: impl Into<String>, version: AssemblyVersion) -> Self {
        Self {
            name: name.into(),
            version,
            culture: None,
        }
    }

    /// Parse an identity from a .NET display name.
    ///
    /// Unknown components (`PublicKeyToken=`, `ProcessorArchitecture=`, ...) are ignored, they
    /// carry no meaning for the preservation pass.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] if the name is empty or the version cannot be parsed.
    pub fn parse(display_name: &str) -> Result<Self> {
        let mut parts = display_name.split(',').map(str::trim);

        let name = parts.next().unwrap_or_default();
        if name.is_empty() {
            return Err(malformed_error!("Assembly name cannot be empty"));
        }

        let mut version = AssemblyVersion::UNKNOWN;
        let mut culture = None;
        for part in parts {
            if let Some(value) = part.strip_prefix("Version=") {
                version = AssemblyVersion::parse(value)?;
            } else if let Some(value) = part.strip_prefix("Culture=") {
                if value != "neutral" && !value.is_empty() {
                    culture = Some(value.to_string());
                }
            }
        }

        Ok(Self {
            name: name.to_string(),
            version,
            culture,
        })
    }

    /// Generate the display name string for this assembly identity.
    #[must_use]
    pub fn display_name(&self) -> String {
        let mut result = String::with_capacity(self.name.len() + 40);
        result.push_str(&self.name);
        let _ = write!(result, ", Version={}", self.version);
        let _ = write!(
            result,
            ", Culture={}",
            self.culture.as_deref().unwrap_or("neutral")
        );
        result
    }

    /// Get the simple assembly name without version or culture information.
    #[must_use]
    pub fn simple_name(&self) -> &str {
        &self.name
    }
}

impl AssemblyVersion {
    /// Sentinel value representing an unknown or unspecified version (0.0.0.0).
    pub const UNKNOWN: Self = Self {
        major: 0,
        minor: 0,
        build: 0,
        revision: 0,
    };

    /// Create a new assembly version with the specified components.
    #[must_use]
    pub const fn new(major: u16, minor: u16, build: u16, revision: u16) -> Self {
        Self {
            major,
            minor,
            build,
            revision,
        }
    }

    /// Parse a dotted version string with one to four components.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] for more than four components or components that are
    /// not valid `u16` values.
    pub fn parse(version_str: &str) -> Result<Self> {
        let parts: Vec<&str> = version_str.split('.').collect();
        if parts.len() > 4 {
            return Err(malformed_error!("Invalid version format: {}", version_str));
        }

        let mut components = [0u16; 4];
        for (i, part) in parts.iter().enumerate() {
            components[i] = part
                .parse::<u16>()
                .map_err(|_| malformed_error!("Invalid version component: {}", part))?;
        }

        Ok(Self::new(
            components[0],
            components[1],
            components[2],
            components[3],
        ))
    }
}

impl fmt::Display for AssemblyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

impl fmt::Display for AssemblyIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for AssemblyIdentity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl FromStr for AssemblyVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
