//! MQTT topic names and filters.
//!
//! Names are what the charger publishes to; filters are what it subscribes
//! with. Matching follows the MQTT 3.1.1 / 5.0 rules: `+` stands for exactly
//! one level, `#` for the remaining levels including the parent, and a filter
//! that starts with a wildcard never matches a `$`-prefixed name.

use core::fmt;

/// Topics are length-prefixed with a u16 on the wire.
pub const MAX_TOPIC_LEN: usize = 65_535;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    Empty,
    TooLong,
    NulCharacter,
    WildcardInName,
    MisplacedWildcard,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Error::Empty => "topic is empty",
            Error::TooLong => "topic is longer than 65535 bytes",
            Error::NulCharacter => "topic contains a NUL character",
            Error::WildcardInName => "topic name contains a wildcard",
            Error::MisplacedWildcard => "wildcard does not occupy a whole level",
        };
        f.write_str(msg)
    }
}

fn validate_common(topic: &str) -> Result<(), Error> {
    if topic.is_empty() {
        return Err(Error::Empty);
    }
    if topic.len() > MAX_TOPIC_LEN {
        return Err(Error::TooLong);
    }
    if topic.contains('\0') {
        return Err(Error::NulCharacter);
    }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), Error> {
    validate_common(name)?;
    if name.contains(['+', '#']) {
        return Err(Error::WildcardInName);
    }
    Ok(())
}

pub fn validate_filter(filter: &str) -> Result<(), Error> {
    validate_common(filter)?;

    let mut levels = filter.split('/').peekable();
    while let Some(level) = levels.next() {
        let last = levels.peek().is_none();
        match level {
            "+" => {}
            "#" if last => {}
            _ if level.contains(['+', '#']) => return Err(Error::MisplacedWildcard),
            _ => {}
        }
    }
    Ok(())
}

/// Whether `name` is delivered to a subscription on `filter`.
pub fn matches(filter: &str, name: &str) -> bool {
    if name.starts_with('$') && filter.starts_with(['+', '#']) {
        return false;
    }

    let mut filter_levels = filter.split('/');
    let mut name_levels = name.split('/');
    loop {
        match (filter_levels.next(), name_levels.next()) {
            (Some("#"), _) => return true,
            (Some("+"), Some(_)) => {}
            (Some(f), Some(n)) if f == n => {}
            (None, None) => return true,
            _ => return false,
        }
    }
}

/// The levels of `name` below the `#` of `filter`.
///
/// Returns `None` when the filter does not end in `#` or does not match.
/// A name equal to the filter's parent level yields an empty suffix.
pub fn command_suffix<'n>(filter: &str, name: &'n str) -> Option<&'n str> {
    if !filter.ends_with('#') || !matches(filter, name) {
        return None;
    }

    let depth = filter.split('/').count() - 1;
    if depth == 0 {
        return Some(name);
    }

    match name.match_indices('/').nth(depth - 1) {
        Some((i, _)) => Some(&name[i + 1..]),
        None => Some(""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMMANDS: &str = "home/commands/OpenMQTTCharger/#";

    #[test]
    fn publish_topics_are_names() {
        assert_eq!(validate_name("home/OpenMQTTCharger/Volt"), Ok(()));
        assert_eq!(validate_name("home/OpenMQTTCharger/LWT"), Ok(()));
        assert_eq!(validate_name("/leading/slash"), Ok(()));
        assert_eq!(validate_name(COMMANDS), Err(Error::WildcardInName));
        assert_eq!(validate_name("a/+/b"), Err(Error::WildcardInName));
        assert_eq!(validate_name(""), Err(Error::Empty));
        assert_eq!(validate_name("a\0b"), Err(Error::NulCharacter));
    }

    #[test]
    fn oversized_topic() {
        let long = "a".repeat(MAX_TOPIC_LEN + 1);
        assert_eq!(validate_name(&long), Err(Error::TooLong));
        assert_eq!(validate_name(&long[1..]), Ok(()));
    }

    #[test]
    fn filter_wildcards_must_fill_a_level() {
        assert_eq!(validate_filter(COMMANDS), Ok(()));
        assert_eq!(validate_filter("#"), Ok(()));
        assert_eq!(validate_filter("+"), Ok(()));
        assert_eq!(validate_filter("home/+/Volt"), Ok(()));
        assert_eq!(validate_filter("home/#/Volt"), Err(Error::MisplacedWildcard));
        assert_eq!(validate_filter("home/cmd#"), Err(Error::MisplacedWildcard));
        assert_eq!(validate_filter("home/a+/b"), Err(Error::MisplacedWildcard));
        assert_eq!(validate_filter("home/commands"), Ok(()));
    }

    #[test]
    fn multi_level_wildcard() {
        assert!(matches(COMMANDS, "home/commands/OpenMQTTCharger/relay"));
        assert!(matches(COMMANDS, "home/commands/OpenMQTTCharger/relay/set"));
        assert!(matches(COMMANDS, "home/commands/OpenMQTTCharger"));
        assert!(!matches(COMMANDS, "home/commands/OpenMQTTGateway/relay"));
        assert!(!matches(COMMANDS, "home/OpenMQTTCharger/Volt"));
    }

    #[test]
    fn single_level_wildcard() {
        assert!(matches("home/+/Volt", "home/OpenMQTTCharger/Volt"));
        assert!(!matches("home/+/Volt", "home/a/b/Volt"));
        assert!(!matches("home/+", "home"));
        assert!(matches("home/+", "home/"));
    }

    #[test]
    fn exact_filters() {
        assert!(matches("a/b", "a/b"));
        assert!(!matches("a/b", "a/b/c"));
        assert!(!matches("a/b/c", "a/b"));
    }

    #[test]
    fn system_topics_hidden_from_leading_wildcards() {
        assert!(!matches("#", "$SYS/broker/uptime"));
        assert!(!matches("+/broker/uptime", "$SYS/broker/uptime"));
        assert!(matches("$SYS/#", "$SYS/broker/uptime"));
    }

    #[test]
    fn suffix_below_command_prefix() {
        assert_eq!(
            command_suffix(COMMANDS, "home/commands/OpenMQTTCharger/relay/set"),
            Some("relay/set")
        );
        assert_eq!(command_suffix(COMMANDS, "home/commands/OpenMQTTCharger"), Some(""));
        assert_eq!(command_suffix(COMMANDS, "home/OpenMQTTCharger/Volt"), None);
        assert_eq!(command_suffix("#", "any/thing"), Some("any/thing"));
        assert_eq!(command_suffix("home/+/#", "home/x/y"), Some("y"));
        assert_eq!(command_suffix("home/cmd", "home/cmd"), None);
    }
}
