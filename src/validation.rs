//! Input validation for player-supplied names and quantities.
//!
//! Usernames, guild names and pet names all end up in logs, push events and
//! store keys, so they are validated up front, before any state is read.

use std::collections::HashSet;

/// Name validation errors with helpful messages.
#[derive(Debug, thiserror::Error)]
pub enum NameError {
    #[error("name is too short (minimum {min} characters)")]
    TooShort { min: usize },

    #[error("name is too long (maximum {max} characters)")]
    TooLong { max: usize },

    #[error("name cannot start or end with whitespace")]
    InvalidWhitespace,

    #[error("name contains invalid characters: {chars}")]
    InvalidCharacters { chars: String },

    #[error("name is a reserved system name")]
    Reserved,
}

const USERNAME_MIN: usize = 2;
const USERNAME_MAX: usize = 16;
const GUILD_NAME_MIN: usize = 3;
const GUILD_NAME_MAX: usize = 24;
const PET_NAME_MAX: usize = 20;

fn reserved_names() -> HashSet<&'static str> {
    ["admin", "system", "server", "guild", "npc", "all"]
        .into_iter()
        .collect()
}

/// Validate an account username. Returns the trimmed name on success.
///
/// Usernames are restricted to ASCII alphanumerics plus `_` and `-` so they
/// can be embedded in store keys and event payloads without escaping.
pub fn validate_username(raw: &str) -> Result<String, NameError> {
    if raw != raw.trim() {
        return Err(NameError::InvalidWhitespace);
    }
    let name = raw.trim();
    if name.len() < USERNAME_MIN {
        return Err(NameError::TooShort { min: USERNAME_MIN });
    }
    if name.len() > USERNAME_MAX {
        return Err(NameError::TooLong { max: USERNAME_MAX });
    }
    let bad: String = name
        .chars()
        .filter(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
        .collect();
    if !bad.is_empty() {
        return Err(NameError::InvalidCharacters { chars: bad });
    }
    if reserved_names().contains(name.to_ascii_lowercase().as_str()) {
        return Err(NameError::Reserved);
    }
    Ok(name.to_string())
}

/// Validate a guild name. Spaces are allowed in the interior.
pub fn validate_guild_name(raw: &str) -> Result<String, NameError> {
    if raw != raw.trim() {
        return Err(NameError::InvalidWhitespace);
    }
    let name = raw.trim();
    if name.len() < GUILD_NAME_MIN {
        return Err(NameError::TooShort {
            min: GUILD_NAME_MIN,
        });
    }
    if name.len() > GUILD_NAME_MAX {
        return Err(NameError::TooLong {
            max: GUILD_NAME_MAX,
        });
    }
    let bad: String = name
        .chars()
        .filter(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-' || *c == ' '))
        .collect();
    if !bad.is_empty() {
        return Err(NameError::InvalidCharacters { chars: bad });
    }
    if reserved_names().contains(name.to_ascii_lowercase().as_str()) {
        return Err(NameError::Reserved);
    }
    Ok(name.to_string())
}

/// Validate a pet name. Single character names are fine.
pub fn validate_pet_name(raw: &str) -> Result<String, NameError> {
    if raw != raw.trim() {
        return Err(NameError::InvalidWhitespace);
    }
    let name = raw.trim();
    if name.is_empty() {
        return Err(NameError::TooShort { min: 1 });
    }
    if name.len() > PET_NAME_MAX {
        return Err(NameError::TooLong { max: PET_NAME_MAX });
    }
    let bad: String = name
        .chars()
        .filter(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-' || *c == ' '))
        .collect();
    if !bad.is_empty() {
        return Err(NameError::InvalidCharacters { chars: bad });
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_usernames() {
        assert_eq!(validate_username("alice").unwrap(), "alice");
        assert_eq!(validate_username("Bob_42").unwrap(), "Bob_42");
    }

    #[test]
    fn rejects_bad_usernames() {
        assert!(validate_username("a").is_err());
        assert!(validate_username(" padded ").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username("admin").is_err());
        assert!(validate_username("way_too_long_username_here").is_err());
    }

    #[test]
    fn guild_names_allow_spaces() {
        assert_eq!(
            validate_guild_name("Iron Vanguard").unwrap(),
            "Iron Vanguard"
        );
        assert!(validate_guild_name("x").is_err());
        assert!(validate_guild_name("bad/name").is_err());
    }
}
