use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::models::User;

#[derive(Clone)]
pub struct UserService {
    users: Arc<RwLock<BTreeMap<String, User>>>,
}

impl Default for UserService {
    fn default() -> Self {
        Self::new()
    }
}

impl UserService {
    pub fn new() -> Self {
        let users = ["alice", "bob"]
            .into_iter()
            .map(|name| {
                let user = User {
                    username: name.to_string(),
                    email: format!("{name}@example.com"),
                    class: "1".to_string(),
                    children: Vec::new(),
                };
                (name.to_string(), user)
            })
            .collect();
        Self {
            users: Arc::new(RwLock::new(users)),
        }
    }

    pub async fn get(&self, username: &str) -> Option<User> {
        self.users.read().await.get(username).cloned()
    }

    pub async fn list(&self) -> Vec<User> {
        self.users.read().await.values().cloned().collect()
    }

    /// Insert or replace a user.
    pub async fn save(&self, user: User) -> User {
        self.users
            .write()
            .await
            .insert(user.username.clone(), user.clone());
        user
    }
}
