use serde::{Deserialize, Serialize};

/// Role attached to an account
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Guest,
    Admin,
}

/// A username/password pair with the account it unlocks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub username: String,
    pub password: String,
    pub role: Role,
    pub name: String,
    pub email: Option<String>,
}

/// Account entry as written in the credentials file
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialEntry {
    pub password: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl CredentialEntry {
    pub fn into_credential(self, username: String) -> Credential {
        Credential {
            name: self.name.unwrap_or_else(|| username.clone()),
            username,
            password: self.password,
            role: self.role,
            email: self.email,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        let role: Role = serde_json::from_str("\"guest\"").unwrap();
        assert_eq!(role, Role::Guest);
    }

    #[test]
    fn test_entry_defaults_name_to_username() {
        let entry: CredentialEntry = serde_json::from_str(r#"{"password": "pw"}"#).unwrap();
        let credential = entry.into_credential("sam".to_string());
        assert_eq!(credential.name, "sam");
        assert_eq!(credential.role, Role::Guest);
    }
}
