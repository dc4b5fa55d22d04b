use crate::errors::InspectrsError;
use core::fmt::{
    Display,
    Formatter,
};
use core::str::FromStr;

/// The API version this client speaks when the user requests nothing else.
pub const DEFAULT_API_VERSION: ApiVersion = ApiVersion { major: 1, minor: 0 };

/// The maximum API version this client was designed to work with. This does not mean that newer
/// versions won't work at all -- the server might still support them.
pub const MAX_API_VERSION: ApiVersion = ApiVersion {
    major: 1,
    minor: 13,
};

/// `ApiVersion` is an ordered (major, minor) pair identifying the negotiated request/response
/// contract between client and server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ApiVersion {
    /// The major version component -- always 1 for this API family.
    pub major: u32,
    /// The minor version component.
    pub minor: u32,
}

impl ApiVersion {
    /// Return a new instance of `ApiVersion` from its components.
    #[must_use]
    pub const fn new(
        major: u32,
        minor: u32,
    ) -> Self {
        Self { major, minor }
    }
}

impl Display for ApiVersion {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> core::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl From<(u32, u32)> for ApiVersion {
    fn from(pair: (u32, u32)) -> Self {
        Self {
            major: pair.0,
            minor: pair.1,
        }
    }
}

impl FromStr for ApiVersion {
    type Err = InspectrsError;

    /// Parse a version from its external string representation -- either "MAJ" (minimum supported
    /// minor version is assumed) or "MAJ.MIN". This is the single normalizing boundary for
    /// version inputs; internal code only ever sees `ApiVersion` values.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || {
            InspectrsError::Validation(format!(
                "malformed API version '{s}': expect a string in form of MAJ or MAJ.MIN"
            ))
        };

        let mut components = s.split('.');

        let major = components
            .next()
            .and_then(|c| c.parse::<u32>().ok())
            .ok_or_else(malformed)?;

        let minor = match components.next() {
            Some(c) => c.parse::<u32>().map_err(|_ignored| malformed())?,
            None => 0,
        };

        if components.next().is_some() {
            return Err(malformed());
        }

        Ok(Self { major, minor })
    }
}

/// `VersionRange` is the \[minimum, maximum\] supported version range advertised by a server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionRange {
    /// The minimum version the server supports.
    pub minimum: ApiVersion,
    /// The maximum version the server supports.
    pub maximum: ApiVersion,
}

impl VersionRange {
    /// Return a new instance of `VersionRange` from its bounds.
    #[must_use]
    pub const fn new(
        minimum: ApiVersion,
        maximum: ApiVersion,
    ) -> Self {
        Self { minimum, maximum }
    }

    /// Indicates if the given version is supported by this range. The major component must match
    /// the advertised family exactly -- major version families are not interoperable -- and the
    /// minor component must fall within the advertised bounds.
    #[must_use]
    pub fn supports(
        &self,
        version: ApiVersion,
    ) -> bool {
        version.major == self.minimum.major
            && version.major == self.maximum.major
            && self.minimum <= version
            && version <= self.maximum
    }
}

impl Display for VersionRange {
    fn fmt(
        &self,
        f: &mut Formatter<'_>,
    ) -> core::fmt::Result {
        write!(f, "{} to {}", self.minimum, self.maximum)
    }
}

impl Default for VersionRange {
    /// The range assumed for servers that do not advertise version support at all.
    fn default() -> Self {
        Self {
            minimum: DEFAULT_API_VERSION,
            maximum: DEFAULT_API_VERSION,
        }
    }
}

/// Resolve the version to send on subsequent requests, given the version the user requested and
/// the range the server advertised.
///
/// A server that does not advertise version support at all (an older server) resolves to the
/// fixed legacy default -- negotiation is skipped and this never fails.
///
/// # Errors
///
/// Returns a `VersionMismatch` error if the requested version falls outside the advertised range.
pub fn negotiate(
    requested: ApiVersion,
    advertised: Option<VersionRange>,
) -> Result<ApiVersion, InspectrsError> {
    let Some(range) = advertised else {
        return Ok(DEFAULT_API_VERSION);
    };

    if range.supports(requested) {
        Ok(requested)
    } else {
        Err(InspectrsError::VersionMismatch {
            requested,
            supported: range,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_major_only() {
        let v: ApiVersion = "1".parse().unwrap();

        assert_eq!(v, ApiVersion::new(1, 0));
    }

    #[test]
    fn parse_major_minor() {
        let v: ApiVersion = "1.9".parse().unwrap();

        assert_eq!(v, ApiVersion::new(1, 9));
    }

    #[test]
    fn parse_rejects_garbage() {
        for bad in ["", "one", "1.two", "1.2.3", "1..2"] {
            assert!(
                bad.parse::<ApiVersion>().is_err(),
                "'{bad}' should not parse"
            );
        }
    }

    #[test]
    fn ordering_is_lexicographic() {
        assert!(ApiVersion::new(1, 2) < ApiVersion::new(1, 10));
        assert!(ApiVersion::new(1, 10) < ApiVersion::new(2, 0));
    }

    #[test]
    fn display_round_trips() {
        let v = ApiVersion::new(1, 13);

        assert_eq!(v, v.to_string().parse().unwrap());
    }

    fn range() -> VersionRange {
        VersionRange::new(ApiVersion::new(1, 1), ApiVersion::new(1, 9))
    }

    #[test]
    fn negotiate_in_range_returns_requested_unchanged() {
        for minor in 1..=9 {
            let requested = ApiVersion::new(1, minor);

            let resolved = negotiate(requested, Some(range())).unwrap();

            assert_eq!(requested, resolved);
        }
    }

    #[test]
    fn negotiate_below_range_fails() {
        let err = negotiate(ApiVersion::new(1, 0), Some(range())).unwrap_err();

        assert!(matches!(err, InspectrsError::VersionMismatch { .. }));
    }

    #[test]
    fn negotiate_above_range_fails() {
        let err = negotiate(ApiVersion::new(1, 10), Some(range())).unwrap_err();

        assert!(matches!(err, InspectrsError::VersionMismatch { .. }));
    }

    #[test]
    fn negotiate_wrong_major_fails() {
        let err = negotiate(ApiVersion::new(2, 5), Some(range())).unwrap_err();

        assert!(matches!(err, InspectrsError::VersionMismatch { .. }));
    }

    #[test]
    fn negotiate_without_advertised_range_assumes_legacy_default() {
        let resolved = negotiate(ApiVersion::new(1, 5), None).unwrap();

        assert_eq!(DEFAULT_API_VERSION, resolved);
    }
}
