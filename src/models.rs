use serde::{Deserialize, Deserializer, Serialize};

/// One registered shortcut to a remote shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasRecord {
    pub alias: String,
    #[serde(default)]
    pub user: String,
    pub hostname: String,
    #[serde(deserialize_with = "port_from_any")]
    pub port: String,
    #[serde(default, deserialize_with = "flag_from_any")]
    pub mosh: bool,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub options: String,
}

impl AliasRecord {
    pub fn new(alias: &str, user: &str, hostname: &str, port: &str) -> Self {
        Self {
            alias: normalize_alias(alias),
            user: user.to_string(),
            hostname: hostname.to_string(),
            port: port.to_string(),
            mosh: false,
            key: String::new(),
            options: String::new(),
        }
    }

    /// `user@hostname`, or just the hostname when no login name is set.
    pub fn destination(&self) -> String {
        if self.user.is_empty() {
            self.hostname.clone()
        } else {
            format!("{}@{}", self.user, self.hostname)
        }
    }

    pub fn kind(&self) -> &'static str {
        if self.mosh {
            "SSH+Mosh"
        } else {
            "SSH"
        }
    }
}

pub fn normalize_alias(alias: &str) -> String {
    alias.trim().to_lowercase()
}

// Older stores wrote the port as a string and the mosh flag as "True"/"".
fn port_from_any<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Number(u64),
        Text(String),
    }

    Ok(match Port::deserialize(deserializer)? {
        Port::Number(n) => n.to_string(),
        Port::Text(s) => s,
    })
}

fn flag_from_any<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
        Null(()),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Text(s) => !s.is_empty() && !s.eq_ignore_ascii_case("false"),
        Flag::Null(()) => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_lowercases_alias() {
        let record = AliasRecord::new("Server1", "root", "10.0.0.5", "22");
        assert_eq!(record.alias, "server1");
    }

    #[test]
    fn destination_omits_empty_user() {
        let mut record = AliasRecord::new("web1", "root", "10.0.0.5", "22");
        assert_eq!(record.destination(), "root@10.0.0.5");
        record.user.clear();
        assert_eq!(record.destination(), "10.0.0.5");
    }

    #[test]
    fn accepts_legacy_string_fields() {
        let json = r#"{"alias":"db","user":"admin","hostname":"db.local","port":"2222","mosh":"True","key":"","options":""}"#;
        let record: AliasRecord = serde_json::from_str(json).unwrap();
        assert!(record.mosh);
        assert_eq!(record.port, "2222");

        let json = r#"{"alias":"db","hostname":"db.local","port":22,"mosh":""}"#;
        let record: AliasRecord = serde_json::from_str(json).unwrap();
        assert!(!record.mosh);
        assert_eq!(record.port, "22");
        assert_eq!(record.user, "");
        assert_eq!(record.key, "");
    }
}
