//! Relative major/minor grouping.
//!
//! Relative keys share a key signature, so a major key and its relative minor
//! are shown as one bar ("C / A minor"). The table covers the 24 keys under
//! the 30 spellings the search API emits; enharmonic spellings ("A♭ Minor",
//! "G# Minor") keep separate labels.

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

use crate::models::{Grouping, NormalizedKey};

/// Normalized key -> relative pairing label. Built once, never mutated.
pub static RELATIVE_KEY_GROUPS: Lazy<FxHashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut m = FxHashMap::default();

    // === MINOR KEYS ===
    m.insert("A♭ Minor", "C♭ / A♭ minor");
    m.insert("E♭ Minor", "G♭ / E♭ minor");
    m.insert("B♭ Minor", "D♭ / B♭ minor");
    m.insert("F Minor", "A♭ / F minor");
    m.insert("C Minor", "E♭ / C minor");
    m.insert("G Minor", "B♭ / G minor");
    m.insert("D Minor", "F / D minor");
    m.insert("A Minor", "C / A minor");
    m.insert("E Minor", "G / E minor");
    m.insert("B Minor", "D / B minor");
    m.insert("F# Minor", "A / F# minor");
    m.insert("C# Minor", "E / C# minor");
    m.insert("G# Minor", "B / G# minor");
    m.insert("D# Minor", "F# / D# minor");
    m.insert("A# Minor", "C# / A# minor");

    // === MAJOR KEYS ===
    m.insert("C♭ Major", "C♭ / A♭ minor");
    m.insert("G♭ Major", "G♭ / E♭ minor");
    m.insert("D♭ Major", "D♭ / B♭ minor");
    m.insert("A♭ Major", "A♭ / F minor");
    m.insert("E♭ Major", "E♭ / C minor");
    m.insert("B♭ Major", "B♭ / G minor");
    m.insert("F Major", "F / D minor");
    m.insert("C Major", "C / A minor");
    m.insert("G Major", "G / E minor");
    m.insert("D Major", "D / B minor");
    m.insert("A Major", "A / F# minor");
    m.insert("E Major", "E / C# minor");
    m.insert("B Major", "B / G# minor");
    m.insert("F# Major", "F# / D# minor");
    m.insert("C# Major", "C# / A# minor");

    m
});

/// How a record's display group is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupBy {
    /// Each normalized key is its own group
    #[default]
    Key,
    /// Relative major/minor pairing from [`RELATIVE_KEY_GROUPS`]
    Relative,
}

/// What happens to keys that have no group: keys missing from the relative
/// table when grouping by relative key, and `Unknown` in either mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UngroupedPolicy {
    /// The normalized key becomes its own group
    #[default]
    Permissive,
    /// The record is dropped
    Strict,
}

fn ungrouped(key: &NormalizedKey, policy: UngroupedPolicy) -> Grouping {
    match policy {
        UngroupedPolicy::Permissive => Grouping::Group(key.as_str().to_string()),
        UngroupedPolicy::Strict => Grouping::Skip,
    }
}

/// Look up the display group for a normalized key.
pub fn group_key(
    key: &NormalizedKey,
    table: &FxHashMap<&'static str, &'static str>,
    policy: UngroupedPolicy,
) -> Grouping {
    match table.get(key.as_str()) {
        Some(label) => Grouping::Group((*label).to_string()),
        None => ungrouped(key, policy),
    }
}

/// Group a key according to the grouping mode, using the static table.
pub fn group_for(key: &NormalizedKey, group_by: GroupBy, policy: UngroupedPolicy) -> Grouping {
    match group_by {
        GroupBy::Relative => group_key(key, &RELATIVE_KEY_GROUPS, policy),
        GroupBy::Key if key.is_unknown() => ungrouped(key, policy),
        GroupBy::Key => Grouping::Group(key.as_str().to_string()),
    }
}

/// True when the key has a relative pairing in the table.
pub fn has_relative_pairing(key: &NormalizedKey) -> bool {
    RELATIVE_KEY_GROUPS.contains_key(key.as_str())
}

/// True when the key gets a group of its own under `group_by`, without
/// falling back on the ungrouped policy.
pub fn has_group(key: &NormalizedKey, group_by: GroupBy) -> bool {
    match group_by {
        GroupBy::Relative => has_relative_pairing(key),
        GroupBy::Key => !key.is_unknown(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_key;
    use rustc_hash::FxHashSet;

    #[test]
    fn test_table_covers_every_key() {
        assert_eq!(RELATIVE_KEY_GROUPS.len(), 30);

        let labels: FxHashSet<&str> = RELATIVE_KEY_GROUPS.values().copied().collect();
        assert_eq!(labels.len(), 15);

        // Every entry is already in normalized form
        for key in RELATIVE_KEY_GROUPS.keys() {
            assert_eq!(normalize_key(key).as_str(), *key);
        }
    }

    #[test]
    fn test_relative_pairs_share_a_label() {
        let pairs = [
            ("C Major", "A Minor"),
            ("G Major", "E Minor"),
            ("E♭ Major", "C Minor"),
            ("A Major", "F# Minor"),
            ("C♭ Major", "A♭ Minor"),
        ];
        for (major, minor) in pairs {
            assert_eq!(RELATIVE_KEY_GROUPS[major], RELATIVE_KEY_GROUPS[minor]);
        }
    }

    #[test]
    fn test_group_key_found() {
        let key = normalize_key("Bb Major");
        assert_eq!(
            group_key(&key, &RELATIVE_KEY_GROUPS, UngroupedPolicy::Strict),
            Grouping::Group("B♭ / G minor".to_string())
        );
    }

    #[test]
    fn test_group_key_missing_permissive() {
        // Spelled with a sharp that the table only carries as a flat
        let key = normalize_key("D# Major");
        assert!(!has_relative_pairing(&key));
        assert_eq!(
            group_key(&key, &RELATIVE_KEY_GROUPS, UngroupedPolicy::Permissive),
            Grouping::Group("D# Major".to_string())
        );
        assert_eq!(
            group_key(&NormalizedKey::unknown(), &RELATIVE_KEY_GROUPS, UngroupedPolicy::Permissive),
            Grouping::Group("Unknown".to_string())
        );
    }

    #[test]
    fn test_group_key_missing_strict() {
        let key = normalize_key("D# Major");
        assert_eq!(
            group_key(&key, &RELATIVE_KEY_GROUPS, UngroupedPolicy::Strict),
            Grouping::Skip
        );
    }

    #[test]
    fn test_group_by_key_ignores_table() {
        let key = normalize_key("A Minor");
        assert_eq!(
            group_for(&key, GroupBy::Key, UngroupedPolicy::Strict),
            Grouping::Group("A Minor".to_string())
        );
        assert_eq!(
            group_for(&key, GroupBy::Relative, UngroupedPolicy::Strict),
            Grouping::Group("C / A minor".to_string())
        );
    }

    #[test]
    fn test_group_by_key_unknown_follows_policy() {
        let unknown = NormalizedKey::unknown();
        assert!(!has_group(&unknown, GroupBy::Key));
        assert_eq!(
            group_for(&unknown, GroupBy::Key, UngroupedPolicy::Strict),
            Grouping::Skip
        );
        assert_eq!(
            group_for(&unknown, GroupBy::Key, UngroupedPolicy::Permissive),
            Grouping::Group("Unknown".to_string())
        );

        // Keys outside the relative table still group on their own by key
        let key = normalize_key("D# Major");
        assert!(has_group(&key, GroupBy::Key));
        assert_eq!(
            group_for(&key, GroupBy::Key, UngroupedPolicy::Strict),
            Grouping::Group("D# Major".to_string())
        );
    }
}
