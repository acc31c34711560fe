//! Role gates for page actions.
//!
//! Advisory only: this decides which buttons a page offers, it does not
//! protect the store.

use shared::{Role, Session};
use std::fmt;

/// Actions a record page can offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Search,
    Export,
    Create,
    Edit,
    Delete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Action::Search => "Search",
            Action::Export => "Export",
            Action::Create => "Add New",
            Action::Edit => "Edit",
            Action::Delete => "Delete",
        };
        f.write_str(label)
    }
}

pub struct ActionPolicy;

impl ActionPolicy {
    /// Search is open to everyone, export needs a signed-in session and
    /// writes need a signed-in non-`User` role
    pub fn allows(session: &Session, action: Action) -> bool {
        match action {
            Action::Search => true,
            Action::Export => session.is_authenticated,
            Action::Create | Action::Edit | Action::Delete => {
                session.is_authenticated && can_write(session.role)
            }
        }
    }

    /// Every action `allows` grants for this session, in declaration order
    pub fn allowed_actions(session: &Session) -> Vec<Action> {
        [Action::Search, Action::Export, Action::Create, Action::Edit, Action::Delete]
            .into_iter()
            .filter(|action| Self::allows(session, *action))
            .collect()
    }
}

fn can_write(role: Role) -> bool {
    match role {
        Role::Admin | Role::Accountant => true,
        Role::User => false,
    }
}
