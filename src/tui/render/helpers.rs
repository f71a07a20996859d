use crate::model::IconKey;
use crate::model::user::Roster;

/// Glyph for each icon key. Unknown keys never reach here: they
/// deserialize to `IconKey::Feature`.
pub fn icon_glyph(icon: IconKey) -> &'static str {
    match icon {
        IconKey::Feature => "◆",
        IconKey::Bug => "✖",
        IconKey::Design => "✎",
        IconKey::Research => "⌕",
        IconKey::Docs => "≡",
        IconKey::Infra => "⚙",
        IconKey::Idea => "✦",
        IconKey::Release => "⚑",
    }
}

/// "Ada Lovelace" -> "AL", "me" -> "ME"
pub fn initials(name: &str) -> String {
    let words: Vec<&str> = name.split_whitespace().collect();
    match words.as_slice() {
        [] => String::new(),
        [one] => one.chars().take(2).flat_map(char::to_uppercase).collect(),
        [first, .., last] => first
            .chars()
            .take(1)
            .chain(last.chars().take(1))
            .flat_map(char::to_uppercase)
            .collect(),
    }
}

/// Space-separated initials of the assigned users
pub fn assignee_chips(ids: &[String], roster: &Roster) -> String {
    ids.iter()
        .map(|id| initials(roster.display_name(id)))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::user::User;

    #[test]
    fn every_icon_has_a_glyph() {
        for key in IconKey::ALL {
            assert!(!icon_glyph(key).is_empty());
        }
    }

    #[test]
    fn initials_from_names() {
        assert_eq!(initials("Ada Lovelace"), "AL");
        assert_eq!(initials("Grace Brewster Hopper"), "GH");
        assert_eq!(initials("me"), "ME");
        assert_eq!(initials(""), "");
    }

    #[test]
    fn chips_use_roster_names() {
        let roster = Roster::new(vec![User {
            id: "u1".into(),
            name: "Ada Lovelace".into(),
            color: String::new(),
            role: Default::default(),
        }]);
        let ids = vec!["u1".to_string(), "ghost".to_string()];
        assert_eq!(assignee_chips(&ids, &roster), "AL GH");
    }
}
