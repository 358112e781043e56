//! Node classifier
//!
//! Separates real egress nodes from routing groups and from the placeholder
//! entries subscriptions use to advertise remaining traffic or expiry dates.
//! Both tables are process-wide constants.

use crate::daemon::{ProxyEntry, ProxyTable};

/// Type tags the daemon uses for routing groups and built-in pseudo-nodes
///
/// Known gap: the daemon may report kinds not listed here; those are
/// classified as real.
pub const ROUTING_GROUP_KINDS: [&str; 10] = [
    "Selector",
    "Direct",
    "Reject",
    "RejectDrop",
    "Pass",
    "Compatible",
    "URLTest",
    "Fallback",
    "LoadBalance",
    "Relay",
];

/// Substrings marking subscription-metadata placeholder entries
pub const INFO_KEYWORDS: [&str; 6] = [
    "剩余流量",
    "距离下次",
    "套餐到期",
    "过期时间",
    "到期时间",
    "官网",
];

/// Returns false iff `type_tag` is one of [`ROUTING_GROUP_KINDS`]
pub fn is_real_proxy(type_tag: &str) -> bool {
    !ROUTING_GROUP_KINDS.contains(&type_tag)
}

/// Returns true iff `name` contains any of [`INFO_KEYWORDS`]
pub fn is_info_node(name: &str) -> bool {
    INFO_KEYWORDS.iter().any(|keyword| name.contains(keyword))
}

/// A node may be probed or selected iff it is real and not a placeholder
pub fn is_eligible(name: &str, type_tag: &str) -> bool {
    is_real_proxy(type_tag) && !is_info_node(name)
}

/// Every eligible entry of the table, in table (name) order
pub fn eligible_nodes(table: &ProxyTable) -> Vec<(&str, &ProxyEntry)> {
    table
        .entries()
        .filter(|(name, entry)| is_eligible(name, &entry.kind))
        .collect()
}

/// Eligible members of `group`, in the group's own member order
///
/// Members absent from the table are skipped: without a type tag they
/// cannot be shown to be real.
pub fn eligible_members<'a>(
    group: &'a ProxyEntry,
    table: &'a ProxyTable,
) -> Vec<(&'a str, &'a ProxyEntry)> {
    group
        .all
        .iter()
        .filter_map(|member| match table.get(member) {
            Some(entry) => Some((member.as_str(), entry)),
            None => {
                tracing::debug!(
                    group = %group.name,
                    member = %member,
                    "Group member missing from node table, skipping"
                );
                None
            }
        })
        .filter(|(name, entry)| is_eligible(name, &entry.kind))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(json: &str) -> ProxyTable {
        serde_json::from_str(json).expect("should parse table")
    }

    #[test]
    fn test_routing_group_kinds_are_not_real() {
        for kind in ROUTING_GROUP_KINDS {
            assert!(!is_real_proxy(kind), "{} should not be real", kind);
        }
    }

    #[test]
    fn test_leaf_kinds_are_real() {
        for kind in ["Shadowsocks", "Vmess", "Vless", "Trojan", "Hysteria2", "WireGuard"] {
            assert!(is_real_proxy(kind), "{} should be real", kind);
        }
    }

    #[test]
    fn test_group_kind_match_is_exact() {
        assert!(is_real_proxy("selector"));
        assert!(is_real_proxy("URLTest2"));
    }

    #[test]
    fn test_info_nodes_detected_by_substring() {
        assert!(is_info_node("剩余流量：120.5 GB"));
        assert!(is_info_node("套餐到期：2026-12-31"));
        assert!(is_info_node("官网 example.com"));
        assert!(!is_info_node("🇭🇰 Hong Kong 01"));
        assert!(!is_info_node(""));
    }

    #[test]
    fn test_eligibility_combines_both_rules() {
        assert!(is_eligible("HK 01", "Shadowsocks"));
        assert!(!is_eligible("Proxies", "Selector"));
        assert!(!is_eligible("距离下次重置剩余：12 天", "Shadowsocks"));
    }

    #[test]
    fn test_eligible_nodes_filters_table() {
        let table = table(
            r#"{"proxies": {
                "Proxies": {"type": "Selector", "all": ["HK", "JP"]},
                "Auto": {"type": "URLTest", "all": ["HK", "JP"]},
                "DIRECT": {"type": "Direct"},
                "REJECT": {"type": "Reject"},
                "HK": {"type": "Shadowsocks"},
                "JP": {"type": "Trojan"},
                "剩余流量：10 GB": {"type": "Shadowsocks"}
            }}"#,
        );

        let names: Vec<&str> = eligible_nodes(&table).into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["HK", "JP"]);
    }

    #[test]
    fn test_eligible_members_keep_group_order_and_skip_unknown() {
        let table = table(
            r#"{"proxies": {
                "Proxies": {"type": "Selector", "all": ["Auto", "JP", "ghost", "HK", "DIRECT"]},
                "Auto": {"type": "URLTest", "all": ["HK", "JP"]},
                "DIRECT": {"type": "Direct"},
                "HK": {"type": "Shadowsocks"},
                "JP": {"type": "Trojan"}
            }}"#,
        );
        let group = table.get("Proxies").unwrap();

        let names: Vec<&str> = eligible_members(group, &table)
            .into_iter()
            .map(|(n, _)| n)
            .collect();
        assert_eq!(names, vec!["JP", "HK"]);
    }
}
