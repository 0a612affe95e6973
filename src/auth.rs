//! Credentials and the on-disk session snapshot.
//!
//! Passwords are stored as argon2 hashes in the users table. Login writes
//! a small JSON snapshot in the platform data dir; the TUI requires it at
//! startup and revalidates it against the users table.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result, anyhow, bail};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::db::Database;
use crate::types::{Role, User, UserStatus};

const MIN_PASSWORD_LEN: usize = 6;

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
    })
}

/// Pre-store validation shared by the registration dialog and the CLI.
/// The message is suitable for direct display.
pub fn validate_registration(email: &str, password: &str, confirmation: &str) -> Result<(), String> {
    if !email_regex().is_match(email.trim()) {
        return Err("Email address is not valid".to_string());
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        ));
    }
    if password != confirmation {
        return Err("Passwords do not match".to_string());
    }
    Ok(())
}

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|error| anyhow!("failed to hash password: {error}"))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Create a pending account. Validation runs before the store is touched.
pub fn register(
    db: &Database,
    email: &str,
    display_name: Option<String>,
    password: &str,
    confirmation: &str,
) -> Result<User> {
    if let Err(message) = validate_registration(email, password, confirmation) {
        bail!("{message}");
    }
    let hash = hash_password(password)?;
    db.create_user(email, display_name, hash, Role::User, UserStatus::Pending)
}

/// Verify credentials. The same message covers an unknown email and a
/// wrong password.
pub fn login(db: &Database, email: &str, password: &str) -> Result<User> {
    let Some((user, hash)) = db.user_credentials(email)? else {
        bail!("invalid email or password");
    };
    if !verify_password(password, &hash) {
        bail!("invalid email or password");
    }
    if user.status == UserStatus::Inactive {
        bail!("account '{}' is inactive", user.email);
    }
    Ok(user)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: Uuid,
    pub email: String,
    pub logged_in_at: String,
}

impl Session {
    pub fn for_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            logged_in_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn snapshot_path() -> Option<PathBuf> {
        let mut path = dirs::data_dir()?;
        path.push("teamboard");
        path.push("session.json");
        Some(path)
    }

    pub fn load() -> Option<Self> {
        let path = Self::snapshot_path()?;
        Self::load_from_path(&path)
    }

    fn load_from_path(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(session) => Some(session),
                Err(error) => {
                    warn!("failed to parse session snapshot '{}': {}", path.display(), error);
                    None
                }
            },
            Err(error) => {
                warn!("failed to read session snapshot '{}': {}", path.display(), error);
                None
            }
        }
    }

    pub fn save(&self) -> Result<()> {
        let path =
            Self::snapshot_path().ok_or_else(|| anyhow!("unable to determine data path"))?;
        self.save_to_path(&path)
    }

    fn save_to_path(&self, path: &Path) -> Result<()> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow!("invalid session snapshot path"))?;
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create data directory '{}'", parent.display()))?;

        let contents =
            serde_json::to_string_pretty(self).context("failed to serialize session snapshot")?;

        let file_name = path
            .file_name()
            .ok_or_else(|| anyhow!("invalid session snapshot file name"))?
            .to_string_lossy()
            .to_string();
        let tmp_path = path.with_file_name(format!(".{file_name}.tmp"));

        fs::write(&tmp_path, contents).with_context(|| {
            format!(
                "failed to write temporary session file '{}'",
                tmp_path.display()
            )
        })?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "failed to rename session file '{}' to '{}'",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }

    pub fn clear() -> Result<()> {
        let Some(path) = Self::snapshot_path() else {
            return Ok(());
        };
        Self::clear_at_path(&path)
    }

    fn clear_at_path(path: &Path) -> Result<()> {
        if path.exists() {
            fs::remove_file(path).with_context(|| {
                format!("failed to remove session snapshot '{}'", path.display())
            })?;
        }
        Ok(())
    }

    /// Resolve the snapshot against the users table. A deleted or inactive
    /// user invalidates the session.
    pub fn validate(&self, db: &Database) -> Result<Option<User>> {
        let Some(user) = db.find_user_by_email(&self.email)? else {
            return Ok(None);
        };
        if user.id != self.user_id || user.status == UserStatus::Inactive {
            return Ok(None);
        }
        Ok(Some(user))
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use tempfile::TempDir;

    use super::*;

    fn setup() -> Result<Database> {
        Database::open(":memory:")
    }

    #[test]
    fn test_registration_validation_precedes_store() {
        assert_eq!(
            validate_registration("not-an-email", "secret1", "secret1"),
            Err("Email address is not valid".to_string())
        );
        assert_eq!(
            validate_registration("ana@example.com", "short", "short"),
            Err("Password must be at least 6 characters".to_string())
        );
        assert_eq!(
            validate_registration("ana@example.com", "secret1", "secret2"),
            Err("Passwords do not match".to_string())
        );
        assert_eq!(
            validate_registration(" ana@example.com ", "secret1", "secret1"),
            Ok(())
        );
    }

    #[test]
    fn test_register_creates_pending_user_with_hashed_password() -> Result<()> {
        let db = setup()?;
        let user = register(
            &db,
            "Ana@Example.com",
            Some("Ana".to_string()),
            "secret1",
            "secret1",
        )?;

        assert_eq!(user.email, "ana@example.com");
        assert_eq!(user.role, Role::User);
        assert_eq!(user.status, UserStatus::Pending);

        let (_, hash) = db
            .user_credentials("ana@example.com")?
            .expect("credentials should exist");
        assert_ne!(hash, "secret1");
        assert!(verify_password("secret1", &hash));
        assert!(!verify_password("wrong", &hash));

        Ok(())
    }

    #[test]
    fn test_register_rejects_invalid_input_without_insert() -> Result<()> {
        let db = setup()?;
        assert!(register(&db, "bad", None, "secret1", "secret1").is_err());
        assert!(register(&db, "ana@example.com", None, "short", "short").is_err());
        assert!(db.list_users()?.is_empty());
        Ok(())
    }

    #[test]
    fn test_login_verifies_credentials() -> Result<()> {
        let db = setup()?;
        let registered = register(&db, "ana@example.com", None, "secret1", "secret1")?;

        let user = login(&db, "ana@example.com", "secret1")?;
        assert_eq!(user.id, registered.id);

        assert!(login(&db, "ana@example.com", "wrong").is_err());
        assert!(login(&db, "nobody@example.com", "secret1").is_err());

        db.update_user_status(registered.id, UserStatus::Inactive)?;
        assert!(login(&db, "ana@example.com", "secret1").is_err());

        Ok(())
    }

    #[test]
    fn test_session_snapshot_roundtrip() -> Result<()> {
        let db = setup()?;
        let user = register(&db, "ana@example.com", None, "secret1", "secret1")?;
        let temp = TempDir::new()?;
        let path = temp.path().join("teamboard").join("session.json");

        let session = Session::for_user(&user);
        session.save_to_path(&path)?;

        let loaded = Session::load_from_path(&path).expect("snapshot should load");
        assert_eq!(loaded, session);

        Session::clear_at_path(&path)?;
        assert!(Session::load_from_path(&path).is_none());
        Session::clear_at_path(&path)?;

        Ok(())
    }

    #[test]
    fn test_corrupt_snapshot_loads_as_none() -> Result<()> {
        let temp = TempDir::new()?;
        let path = temp.path().join("session.json");
        fs::write(&path, "{not json")?;
        assert!(Session::load_from_path(&path).is_none());
        Ok(())
    }

    #[test]
    fn test_session_validation_against_users_table() -> Result<()> {
        let db = setup()?;
        let user = register(&db, "ana@example.com", None, "secret1", "secret1")?;
        let session = Session::for_user(&user);

        assert!(session.validate(&db)?.is_some());

        db.update_user_status(user.id, UserStatus::Inactive)?;
        assert!(session.validate(&db)?.is_none());

        db.update_user_status(user.id, UserStatus::Active)?;
        let stale = Session {
            user_id: Uuid::new_v4(),
            email: user.email.clone(),
            logged_in_at: session.logged_in_at.clone(),
        };
        assert!(stale.validate(&db)?.is_none());

        let deleted = Session {
            user_id: user.id,
            email: "gone@example.com".to_string(),
            logged_in_at: session.logged_in_at,
        };
        assert!(deleted.validate(&db)?.is_none());

        Ok(())
    }
}
