use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::store::{Collection, Record, RecordStore, Repository, StoreError};

/// Role string carried by the session; the engine stores it but never enforces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Parent,
    Coach,
    Director,
    Spectator,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Role::Parent => "parent",
            Role::Coach => "coach",
            Role::Director => "director",
            Role::Spectator => "spectator",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub role: Role,
    pub name: String,
}

impl Record for User {
    const COLLECTION: Collection = Collection::Users;

    fn key(&self) -> &str {
        &self.email
    }
}

/// Identities seeded on first run so the workflow is usable without an account system.
pub const DEMO_IDENTITIES: [(&str, Role, &str); 2] = [
    ("coach@example.com", Role::Coach, "Coach Demo"),
    ("director@example.com", Role::Director, "Director Demo"),
];

pub struct UserDirectory<S> {
    users: Repository<S, User>,
}

impl<S: RecordStore> UserDirectory<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            users: Repository::new(store),
        }
    }

    /// Register `email` unless it is already known. Existing users keep their role and name.
    pub fn ensure_user(
        &self,
        email: &str,
        role: Role,
        name: &str,
    ) -> Result<Option<User>, StoreError> {
        let email = email.trim();
        if email.is_empty() {
            return Ok(None);
        }
        let user = self.users.get_or_insert(User {
            email: email.to_string(),
            role,
            name: name.to_string(),
        })?;
        Ok(Some(user))
    }

    /// Change a user's role, creating the user (named after the address) when unknown.
    pub fn upsert_role(&self, email: &str, role: Role) -> Result<Option<User>, StoreError> {
        let email = email.trim();
        if email.is_empty() {
            return Ok(None);
        }

        let updated = self.users.modify(email, |user| {
            let changed = user.role != role;
            user.role = role;
            changed
        })?;
        if updated.is_some() {
            return Ok(updated);
        }

        let name = match email.split('@').next() {
            Some(local) if !local.is_empty() => local.to_string(),
            _ => "User".to_string(),
        };
        let user = self.users.insert(User {
            email: email.to_string(),
            role,
            name,
        })?;
        Ok(Some(user))
    }

    pub fn get(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.users.get(email.trim())
    }

    pub fn list_by_role(&self, role: Role) -> Result<Vec<User>, StoreError> {
        self.users.list(|user| user.role == role)
    }

    pub fn seed_demo_identities(&self) -> Result<(), StoreError> {
        for (email, role, name) in DEMO_IDENTITIES {
            if self.users.get(email)?.is_none() {
                self.users.insert(User {
                    email: email.to_string(),
                    role,
                    name: name.to_string(),
                })?;
                info!(email, role = role.label(), "seeded demo identity");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn directory() -> UserDirectory<MemoryStore> {
        UserDirectory::new(Arc::new(MemoryStore::default()))
    }

    #[test]
    fn ensure_user_never_overwrites() {
        let users = directory();
        users
            .ensure_user("pat@example.com", Role::Parent, "Pat")
            .expect("ensure");
        let again = users
            .ensure_user("pat@example.com", Role::Director, "Someone Else")
            .expect("ensure")
            .expect("user");

        assert_eq!(again.role, Role::Parent);
        assert_eq!(again.name, "Pat");
        assert_eq!(users.ensure_user("  ", Role::Coach, "x").expect("ensure"), None);
    }

    #[test]
    fn upsert_role_creates_from_address() {
        let users = directory();
        let created = users
            .upsert_role("ref@league.org", Role::Director)
            .expect("upsert")
            .expect("user");
        assert_eq!(created.name, "ref");

        users
            .upsert_role("ref@league.org", Role::Coach)
            .expect("upsert");
        assert_eq!(
            users.get("ref@league.org").expect("get").map(|u| u.role),
            Some(Role::Coach)
        );
    }

    #[test]
    fn demo_seeding_is_idempotent() {
        let users = directory();
        users.seed_demo_identities().expect("seed");
        users.seed_demo_identities().expect("seed again");

        assert_eq!(users.list_by_role(Role::Coach).expect("list").len(), 1);
        let directors = users.list_by_role(Role::Director).expect("list");
        assert_eq!(directors.len(), 1);
        assert_eq!(directors[0].email, "director@example.com");
    }
}
