//! Centralized display formatting for hero names and confidence values.
//!
//! All human-facing strings go through this module so notifications,
//! summaries, and any future overlay agree on spelling.

/// Prefix the game uses for hero entity keys on the minimap.
pub const HERO_NAME_PREFIX: &str = "npc_dota_hero_";

/// Strip the internal hero prefix and any non-alphanumeric noise.
///
/// # Examples
/// ```
/// use wardscry_types::formatting::sanitize_hero_name;
/// assert_eq!(sanitize_hero_name("npc_dota_hero_crystal_maiden"), "crystal_maiden");
/// assert_eq!(sanitize_hero_name("crystal_maiden"), "crystal_maiden");
/// assert_eq!(sanitize_hero_name(""), "");
/// ```
pub fn sanitize_hero_name(name: &str) -> String {
    let clean = name.strip_prefix(HERO_NAME_PREFIX).unwrap_or(name);
    clean
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

/// Derive a title-cased display name from the internal hero key.
///
/// The key is stripped of its prefix and split on `_`, with each word
/// title-cased.
///
/// # Examples
/// ```
/// use wardscry_types::formatting::display_hero_name;
/// assert_eq!(display_hero_name("npc_dota_hero_crystal_maiden"), "Crystal Maiden");
/// assert_eq!(display_hero_name("npc_dota_hero_axe"), "Axe");
/// ```
pub fn display_hero_name(name: &str) -> String {
    sanitize_hero_name(name)
        .split('_')
        .filter(|w| !w.is_empty())
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// Qualifier prepended to a kill attribution based on mapping confidence.
///
/// Below 0.5 the attribution is "possible", below 0.7 "probable", and above
/// that it is stated without hedging.
///
/// # Examples
/// ```
/// use wardscry_types::formatting::confidence_qualifier;
/// assert_eq!(confidence_qualifier(0.3), Some("possible"));
/// assert_eq!(confidence_qualifier(0.6), Some("probable"));
/// assert_eq!(confidence_qualifier(0.9), None);
/// ```
pub fn confidence_qualifier(confidence: f64) -> Option<&'static str> {
    if confidence < 0.5 {
        Some("possible")
    } else if confidence < 0.7 {
        Some("probable")
    } else {
        None
    }
}

/// Format a confidence value as a percentage for summaries.
///
/// # Examples
/// ```
/// use wardscry_types::formatting::format_confidence;
/// assert_eq!(format_confidence(0.853), "85%");
/// ```
pub fn format_confidence(confidence: f64) -> String {
    format!("{:.0}%", confidence * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_multi_word() {
        assert_eq!(display_hero_name("npc_dota_hero_shadow_fiend"), "Shadow Fiend");
    }

    #[test]
    fn test_display_name_without_prefix() {
        assert_eq!(display_hero_name("mirana"), "Mirana");
    }

    #[test]
    fn test_sanitize_drops_control_chars() {
        assert_eq!(sanitize_hero_name("npc_dota_hero_axe\x1b[0m"), "axe0m");
    }

    #[test]
    fn test_qualifier_boundaries() {
        assert_eq!(confidence_qualifier(0.49), Some("possible"));
        assert_eq!(confidence_qualifier(0.5), Some("probable"));
        assert_eq!(confidence_qualifier(0.69), Some("probable"));
        assert_eq!(confidence_qualifier(0.7), None);
    }
}
