//! Static sender identifier → display name table.

/// Known sender identifiers and their display names
const SENDER_NAMES: &[(&str, &str)] = &[
    ("0Tg8s7vP15A90NeUM4rnC", "籾山ひめり"),
    ("Ga_ddM7JhAnlRnkYXsDHG", "春野莉々"),
    ("WjMBMFAFdQ6zmzm34dpj5", "葉月紗蘭"),
    ("NSTLZy-J08YuwqPkkVpb2", "城月菜央"),
    ("6lToHXxrSpkyDT9jmPUOE", "たかねこファンクラブ運営"),
    ("jv8afDOWLZqPpdJ6Mlymq", "星谷美来"),
    ("a4npPurePgMCD5wEmekQO", "東山恵里沙"),
    ("2Ssu8-WzAOXlFZkeD01VU", "松本ももな"),
    ("SKuzAY-gIlD25a5-yGmhZ", "日向端ひな"),
    ("3-3vzS6FMV9lCvNjGscEg", "橋本桃呼"),
    ("VaKS0gcqUZTDi_asf5Xn2", "涼海すう"),
];

/// Resolve a sender identifier to its display name
///
/// Falls back to the raw identifier when unmapped. Internal spaces are
/// stripped so the name is usable as a directory component.
pub fn resolve_sender_name(sender_id: &str) -> String {
    SENDER_NAMES
        .iter()
        .find(|(id, _)| *id == sender_id)
        .map(|(_, name)| *name)
        .unwrap_or(sender_id)
        .replace(' ', "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_sender_resolves_to_display_name() {
        assert_eq!(resolve_sender_name("a4npPurePgMCD5wEmekQO"), "東山恵里沙");
    }

    #[test]
    fn unknown_sender_falls_back_to_raw_id() {
        assert_eq!(resolve_sender_name("not-a-known-id"), "not-a-known-id");
    }

    #[test]
    fn internal_spaces_are_stripped() {
        assert_eq!(resolve_sender_name("spaced out id"), "spacedoutid");
    }
}
