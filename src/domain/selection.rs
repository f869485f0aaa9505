//! Eligibility filtering for dispatch candidates. Pure functions, order
//! preserving, no de-duplication (a destination listed twice is sent
//! twice; the dispatcher warns about it at session start).

use crate::domain::models::{GroupCandidate, GuestCandidate, Recipient};

const MIN_PHONE_DIGITS: usize = 10;

pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// A guest is sendable iff it opted in and its phone normalizes to at
/// least ten digits. The normalized number becomes the destination.
pub fn eligible_guests(candidates: &[GuestCandidate]) -> Vec<Recipient> {
    candidates
        .iter()
        .filter(|guest| guest.wants_info)
        .filter_map(|guest| {
            let digits = digits_only(&guest.phone);
            if digits.len() >= MIN_PHONE_DIGITS {
                Some(Recipient {
                    name: guest.name.clone(),
                    address: digits,
                })
            } else {
                None
            }
        })
        .collect()
}

/// A group is sendable iff the operator checked it and it carries an
/// identifier. No format validation beyond existence.
pub fn selected_groups(candidates: &[GroupCandidate]) -> Vec<Recipient> {
    candidates
        .iter()
        .filter(|group| group.selected && !group.group_id.trim().is_empty())
        .map(|group| Recipient {
            name: group.name.clone(),
            address: group.group_id.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guest(name: &str, phone: &str, wants_info: bool) -> GuestCandidate {
        GuestCandidate {
            name: name.to_string(),
            phone: phone.to_string(),
            wants_info,
        }
    }

    #[test]
    fn opted_in_guest_with_valid_phone_is_eligible() {
        let eligible = eligible_guests(&[guest("Ana", "11987654321", true)]);
        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].address, "11987654321");
    }

    #[test]
    fn short_phone_is_rejected() {
        assert!(eligible_guests(&[guest("Ana", "123", true)]).is_empty());
    }

    #[test]
    fn opted_out_guest_is_rejected() {
        assert!(eligible_guests(&[guest("Ana", "11987654321", false)]).is_empty());
    }

    #[test]
    fn phone_is_normalized_before_length_check() {
        let eligible = eligible_guests(&[guest("Beto", "+55 (11) 98765-4321", true)]);
        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].address, "5511987654321");
    }

    #[test]
    fn input_order_is_preserved() {
        let eligible = eligible_guests(&[
            guest("Caio", "11911111111", true),
            guest("Ana", "11922222222", false),
            guest("Beto", "11933333333", true),
        ]);
        let names: Vec<&str> = eligible.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Caio", "Beto"]);
    }

    #[test]
    fn duplicate_addresses_are_kept() {
        let eligible = eligible_guests(&[
            guest("Ana", "11987654321", true),
            guest("Ana de novo", "11987654321", true),
        ]);
        assert_eq!(eligible.len(), 2);
    }

    #[test]
    fn only_checked_groups_with_ids_are_selected() {
        let groups = vec![
            GroupCandidate {
                group_id: "123@g.us".into(),
                name: "Festas 2026".into(),
                selected: true,
            },
            GroupCandidate {
                group_id: "456@g.us".into(),
                name: "Fornecedores".into(),
                selected: false,
            },
            GroupCandidate {
                group_id: "  ".into(),
                name: "Sem id".into(),
                selected: true,
            },
        ];
        let selected = selected_groups(&groups);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].address, "123@g.us");
    }
}
