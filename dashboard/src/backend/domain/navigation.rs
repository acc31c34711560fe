//! Navigation policy for the sidebar.
//!
//! Which links a role sees is a pure function of the role, read off a static
//! table. Tiers nest (`Admin ⊇ Accountant ⊇ User`) and the Admin-only views
//! come last, so every role's list is an order-preserving filtered
//! view of the same table.

use shared::{NavEntry, Role, Session};
use std::collections::BTreeSet;

/// Position of a role in the nesting; higher sees more
fn tier(role: Role) -> u8 {
    match role {
        Role::User => 0,
        Role::Accountant => 1,
        Role::Admin => 2,
    }
}

/// (label, path, lowest role that sees the entry), in display order
const NAV_TABLE: &[(&str, &str, Role)] = &[
    ("Trips", "/trips", Role::User),
    ("Expenses", "/expenses", Role::Accountant),
    ("Reports", "/reports", Role::User),
    ("Customers", "/customers", Role::Accountant),
    ("About", "/about", Role::User),
    ("PRT", "/prt", Role::Admin),
    ("Admin", "/admin", Role::Admin),
];

fn build_entry(label: &str, path: &str, minimum: Role) -> NavEntry {
    let visible_for: BTreeSet<Role> = Role::ALL
        .into_iter()
        .filter(|role| tier(*role) >= tier(minimum))
        .collect();
    NavEntry {
        label: label.to_string(),
        path: path.to_string(),
        visible_for,
    }
}

/// The full entry table, in display order
pub fn navigation_table() -> Vec<NavEntry> {
    NAV_TABLE
        .iter()
        .map(|(label, path, minimum)| build_entry(label, path, *minimum))
        .collect()
}

/// Entries visible to `role`, in table order
pub fn visible_entries(role: Role) -> Vec<NavEntry> {
    navigation_table()
        .into_iter()
        .filter(|entry| entry.visible_for.contains(&role))
        .collect()
}

/// What the sidebar renders for a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sidebar {
    pub entries: Vec<NavEntry>,
    pub welcome_label: String,
    pub show_logout: bool,
}

impl Sidebar {
    /// Signed-out sessions get no links, only the greeting
    pub fn for_session(session: &Session) -> Self {
        let entries = if session.is_authenticated {
            visible_entries(session.role)
        } else {
            Vec::new()
        };
        Self {
            entries,
            welcome_label: format!("Welcome, {}", session.display_name()),
            show_logout: session.is_authenticated,
        }
    }

    pub fn paths(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.path.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(role: Role) -> Vec<String> {
        visible_entries(role).into_iter().map(|entry| entry.label).collect()
    }

    #[test]
    fn test_entries_per_role() {
        assert_eq!(labels(Role::User), vec!["Trips", "Reports", "About"]);
        assert_eq!(
            labels(Role::Accountant),
            vec!["Trips", "Expenses", "Reports", "Customers", "About"]
        );
        assert_eq!(
            labels(Role::Admin),
            vec!["Trips", "Expenses", "Reports", "Customers", "About", "PRT", "Admin"]
        );
    }

    #[test]
    fn test_tiers_nest() {
        let admin = visible_entries(Role::Admin);
        let accountant = visible_entries(Role::Accountant);
        let user = visible_entries(Role::User);
        assert!(user.iter().all(|entry| accountant.contains(entry)));
        assert!(accountant.iter().all(|entry| admin.contains(entry)));
    }

    #[test]
    fn test_entries_keep_table_order_and_are_deterministic() {
        let table = navigation_table();
        for role in Role::ALL {
            let visible = visible_entries(role);
            assert_eq!(visible, visible_entries(role));

            let positions: Vec<usize> = visible
                .iter()
                .map(|entry| table.iter().position(|row| row == entry).unwrap())
                .collect();
            assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
        }
    }

    #[test]
    fn test_admin_only_entries_are_appended() {
        let admin = labels(Role::Admin);
        assert_eq!(&admin[admin.len() - 2..], ["PRT", "Admin"]);
        let prt = navigation_table().into_iter().find(|e| e.path == "/prt").unwrap();
        assert_eq!(prt.visible_for, BTreeSet::from([Role::Admin]));
    }

    #[test]
    fn test_sidebar_for_signed_out_session() {
        let sidebar = Sidebar::for_session(&Session::default());
        assert!(sidebar.entries.is_empty());
        assert!(!sidebar.show_logout);
        assert_eq!(sidebar.welcome_label, "Welcome, User");
    }

    #[test]
    fn test_sidebar_for_accountant() {
        let sidebar = Sidebar::for_session(&Session::signed_in("Omar", Role::Accountant));
        assert_eq!(
            sidebar.paths(),
            vec!["/trips", "/expenses", "/reports", "/customers", "/about"]
        );
        assert_eq!(sidebar.welcome_label, "Welcome, Omar");
        assert!(sidebar.show_logout);
    }
}
