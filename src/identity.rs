use std::collections::HashMap;

use crate::models::Member;

/// Key used to decide that two member records are the same person.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_uppercase()
}

/// Stable member id for a name: a 32-bit rolling hash (`h * 31 + c` over UTF-16
/// code units, wrapping) of the normalized name, as `GEN-<abs(h)>`.
///
/// Not collision-free. Two names that collide are merged into one member.
pub fn derive_id(name: &str) -> String {
    let mut hash: i32 = 0;
    for unit in normalize_name(name).encode_utf16() {
        hash = (hash << 5).wrapping_sub(hash).wrapping_add(unit as i32);
    }
    format!("GEN-{}", (hash as i64).abs())
}

/// What an import has to do to existing members before its rows are written.
#[derive(Debug, Default, PartialEq)]
pub struct MergePlan {
    /// Incoming member id -> id of the existing member that absorbs it.
    pub redirects: HashMap<String, String>,
    /// (victim id, survivor id): existing duplicates to fold into the survivor.
    pub victims: Vec<(String, String)>,
}

impl MergePlan {
    pub fn target_for<'a>(&'a self, incoming_id: &'a str) -> &'a str {
        self.redirects
            .get(incoming_id)
            .map(String::as_str)
            .unwrap_or(incoming_id)
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.victims.is_empty() && self.redirects.iter().all(|(from, to)| from == to)
    }
}

/// Group `existing` by normalized name (first-seen order) and, for every incoming
/// name that matches a group, pick the first existing record as survivor. The
/// rest of that group become victims.
pub fn plan_merge(existing: &[Member], incoming: &[Member]) -> MergePlan {
    let mut groups: HashMap<String, Vec<&str>> = HashMap::new();
    for m in existing {
        groups
            .entry(normalize_name(&m.name))
            .or_default()
            .push(m.id.as_str());
    }

    let mut plan = MergePlan::default();
    let mut handled: Vec<String> = Vec::new();
    for m in incoming {
        let key = normalize_name(&m.name);
        let Some(group) = groups.get(&key) else {
            continue;
        };
        let survivor = group[0];
        plan.redirects.insert(m.id.clone(), survivor.to_string());
        if handled.contains(&key) {
            continue;
        }
        handled.push(key);
        for victim in &group[1..] {
            plan.victims.push((victim.to_string(), survivor.to_string()));
        }
    }
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fellowship::Fellowship;
    use crate::models::MemberStatus;

    fn member(id: &str, name: &str) -> Member {
        Member {
            id: id.to_string(),
            name: name.to_string(),
            phone: "0000000000".to_string(),
            fellowship: Fellowship::Ephesus,
            status: MemberStatus::Active,
            ytd_total: 0.0,
            last_gift_date: None,
        }
    }

    #[test]
    fn test_derive_id_matches_rolling_hash() {
        // "A" = 65 -> 65; "AB" = 65*31 + 66 = 2081
        assert_eq!(derive_id("a"), "GEN-65");
        assert_eq!(derive_id("ab"), "GEN-2081");
        assert_eq!(derive_id(""), "GEN-0");
    }

    #[test]
    fn test_derive_id_ignores_case_and_padding() {
        assert_eq!(derive_id("Ama Boateng"), derive_id("  AMA BOATENG "));
        assert_ne!(derive_id("Ama Boateng"), derive_id("Ama Boatang"));
    }

    #[test]
    fn test_derive_id_wraps_on_long_names() {
        let id = derive_id("Nana Kwame Asante-Boakye Nkrumah Osei Tutu Agyeman Prempeh");
        assert!(id.starts_with("GEN-"));
        let n: i64 = id["GEN-".len()..].parse().unwrap();
        assert!(n >= 0 && n <= 2_147_483_648);
    }

    #[test]
    fn test_plan_merge_picks_first_existing_as_survivor() {
        let existing = vec![
            member("MEM-1", "Kofi Mensah"),
            member("MEM-2", "kofi mensah "),
            member("MEM-3", "Abena Osei"),
        ];
        let incoming = vec![member(&derive_id("KOFI MENSAH"), "KOFI MENSAH")];
        let plan = plan_merge(&existing, &incoming);
        assert_eq!(plan.target_for(&derive_id("KOFI MENSAH")), "MEM-1");
        assert_eq!(plan.victims, vec![("MEM-2".to_string(), "MEM-1".to_string())]);
    }

    #[test]
    fn test_plan_merge_leaves_new_names_alone() {
        let existing = vec![member("MEM-1", "Kofi Mensah")];
        let incoming = vec![member("GEN-9", "Yaw Darko")];
        let plan = plan_merge(&existing, &incoming);
        assert!(plan.is_empty());
        assert_eq!(plan.target_for("GEN-9"), "GEN-9");
    }

    #[test]
    fn test_plan_merge_reimport_of_same_member_is_noop() {
        let id = derive_id("Yaw Darko");
        let existing = vec![member(&id, "Yaw Darko")];
        let incoming = vec![member(&id, "Yaw Darko")];
        let plan = plan_merge(&existing, &incoming);
        assert!(plan.is_empty());
    }

    #[test]
    fn test_plan_merge_lists_victims_once_per_name() {
        let existing = vec![
            member("MEM-1", "Esi"),
            member("MEM-2", "ESI"),
            member("MEM-3", "esi"),
        ];
        let incoming = vec![member("GEN-1", "Esi"), member("GEN-1", "esi")];
        let plan = plan_merge(&existing, &incoming);
        assert_eq!(plan.victims.len(), 2);
    }
}
