use std::fmt;

/// dBase III without memo
pub const DBASE_III: u8 = 0x03;
/// Looser variant seen in some county exports
pub const DBASE_III_VARIANT: u8 = 0x74;

/// Decides whether a DBF file's leading version byte is acceptable for a run
pub trait VersionValidator: Send + Sync {
    fn validate(&self, version: u8) -> Result<(), String>;
}

impl<F> VersionValidator for F
where
    F: Fn(u8) -> bool + Send + Sync,
{
    fn validate(&self, version: u8) -> Result<(), String> {
        if self(version) {
            Ok(())
        } else {
            Err("rejected by validator".to_string())
        }
    }
}

/// Allow-list of version bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedVersions(Vec<u8>);

impl AcceptedVersions {
    pub fn new<I: IntoIterator<Item = u8>>(versions: I) -> Self {
        let mut list: Vec<u8> = versions.into_iter().collect();
        list.sort_unstable();
        list.dedup();
        Self(list)
    }

    /// Only plain dBase III files
    pub fn strict() -> Self {
        Self::new([DBASE_III])
    }

    pub fn with(mut self, version: u8) -> Self {
        if !self.0.contains(&version) {
            self.0.push(version);
            self.0.sort_unstable();
        }
        self
    }

    pub fn contains(&self, version: u8) -> bool {
        self.0.contains(&version)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

impl Default for AcceptedVersions {
    fn default() -> Self {
        Self::new([DBASE_III, DBASE_III_VARIANT])
    }
}

impl fmt::Display for AcceptedVersions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.0.iter().map(|v| format!("{v:#04x}")).collect();
        write!(f, "{}", rendered.join(", "))
    }
}

impl VersionValidator for AcceptedVersions {
    fn validate(&self, version: u8) -> Result<(), String> {
        if self.contains(version) {
            Ok(())
        } else {
            Err(format!("expected one of {self}"))
        }
    }
}

/// Parse a version byte given as hex (`0x30`) or decimal (`48`)
pub fn parse_version_byte(input: &str) -> Result<u8, String> {
    let trimmed = input.trim();
    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => trimmed.parse::<u8>(),
    };
    parsed.map_err(|e| format!("invalid version byte '{input}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_allow_list() {
        let accepted = AcceptedVersions::default();
        assert!(accepted.validate(0x03).is_ok());
        assert!(accepted.validate(0x74).is_ok());
        assert!(accepted.validate(0x30).is_err());
    }

    #[test]
    fn test_strict_rejects_variant() {
        let strict = AcceptedVersions::strict();
        assert!(strict.validate(0x03).is_ok());
        assert!(strict.validate(0x74).is_err());
    }

    #[test]
    fn test_with_extends_list() {
        let accepted = AcceptedVersions::default().with(0x30).with(0x30);
        assert_eq!(accepted.as_slice(), &[0x03, 0x30, 0x74]);
        assert_eq!(accepted.to_string(), "0x03, 0x30, 0x74");
    }

    #[test]
    fn test_closure_validator() {
        let only_foxpro = |v: u8| v == 0x30;
        assert!(only_foxpro.validate(0x30).is_ok());
        assert!(only_foxpro.validate(0x03).is_err());
    }

    #[test]
    fn test_parse_version_byte() {
        assert_eq!(parse_version_byte("0x30"), Ok(0x30));
        assert_eq!(parse_version_byte("0X8B"), Ok(0x8b));
        assert_eq!(parse_version_byte("3"), Ok(3));
        assert!(parse_version_byte("0x100").is_err());
        assert!(parse_version_byte("three").is_err());
    }
}
