//! Users view: profile listing and the profile edit dialog.
//!
//! Edits go straight through the store; the board store picks them up on
//! the next reconciliation. Flipping status to inactive is the soft
//! delete.

use anyhow::Result;
use uuid::Uuid;

use crate::db::Database;
use crate::types::{Role, User, UserStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub status: UserStatus,
    pub created_at: String,
}

/// One row per profile; the name falls back to the email local-part.
pub fn user_rows(users: &[User]) -> Vec<UserRow> {
    users
        .iter()
        .map(|user| UserRow {
            user_id: user.id,
            name: user.name().to_string(),
            email: user.email.clone(),
            role: user.role,
            status: user.status,
            created_at: user.created_at.clone(),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ProfileEditorField {
    DisplayName,
    Role,
    Status,
    Save,
    Cancel,
}

impl ProfileEditorField {
    pub const ALL: [ProfileEditorField; 5] = [
        ProfileEditorField::DisplayName,
        ProfileEditorField::Role,
        ProfileEditorField::Status,
        ProfileEditorField::Save,
        ProfileEditorField::Cancel,
    ];
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ProfileEditorState {
    pub user_id: Uuid,
    pub email: String,
    pub display_name_input: String,
    pub role: Role,
    pub status: UserStatus,
    pub focused_field: ProfileEditorField,
}

impl ProfileEditorState {
    pub fn for_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            display_name_input: user.display_name.clone().unwrap_or_default(),
            role: user.role,
            status: user.status,
            focused_field: ProfileEditorField::DisplayName,
        }
    }

    pub fn focus_next(&mut self) {
        let index = ProfileEditorField::ALL
            .iter()
            .position(|f| *f == self.focused_field)
            .unwrap_or(0);
        self.focused_field =
            ProfileEditorField::ALL[(index + 1) % ProfileEditorField::ALL.len()];
    }

    pub fn cycle_role(&mut self) {
        let index = Role::ALL
            .iter()
            .position(|r| *r == self.role)
            .unwrap_or(0);
        self.role = Role::ALL[(index + 1) % Role::ALL.len()];
    }

    pub fn cycle_status(&mut self) {
        let index = UserStatus::ALL
            .iter()
            .position(|s| *s == self.status)
            .unwrap_or(0);
        self.status = UserStatus::ALL[(index + 1) % UserStatus::ALL.len()];
    }

    /// Persist all three fields and return the stored profile. A blank
    /// display name clears it back to the email fallback.
    pub fn save(&self, db: &Database) -> Result<User> {
        let display_name = {
            let trimmed = self.display_name_input.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        };
        db.update_user_profile(self.user_id, display_name)?;
        db.update_user_role(self.user_id, self.role)?;
        db.update_user_status(self.user_id, self.status)?;
        db.get_user(self.user_id)
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;

    use super::*;

    fn setup() -> Result<(Database, User)> {
        let db = Database::open(":memory:")?;
        let user = db.create_user(
            "ana@example.com",
            None,
            "hash",
            Role::User,
            UserStatus::Pending,
        )?;
        Ok((db, user))
    }

    #[test]
    fn test_user_rows_fall_back_to_email_local_part() -> Result<()> {
        let (db, plain) = setup()?;
        let named = db.create_user(
            "bruno@example.com",
            Some("Bruno".to_string()),
            "hash",
            Role::Manager,
            UserStatus::Active,
        )?;

        let rows = user_rows(&[plain.clone(), named.clone()]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "ana");
        assert_eq!(rows[0].role, Role::User);
        assert_eq!(rows[1].name, "Bruno");
        assert_eq!(rows[1].status, UserStatus::Active);

        Ok(())
    }

    #[test]
    fn test_profile_save_updates_all_fields() -> Result<()> {
        let (db, user) = setup()?;

        let mut editor = ProfileEditorState::for_user(&user);
        editor.display_name_input = "  Ana Lima  ".to_string();
        editor.cycle_role();
        editor.cycle_status();
        assert_eq!(editor.role, Role::Manager);
        assert_eq!(editor.status, UserStatus::Active);

        let saved = editor.save(&db)?;
        assert_eq!(saved.display_name.as_deref(), Some("Ana Lima"));
        assert_eq!(saved.role, Role::Manager);
        assert_eq!(saved.status, UserStatus::Active);

        Ok(())
    }

    #[test]
    fn test_blank_display_name_restores_fallback() -> Result<()> {
        let (db, user) = setup()?;
        db.update_user_profile(user.id, Some("Ana".to_string()))?;

        let mut editor = ProfileEditorState::for_user(&db.get_user(user.id)?);
        assert_eq!(editor.display_name_input, "Ana");
        editor.display_name_input = "   ".to_string();

        let saved = editor.save(&db)?;
        assert_eq!(saved.display_name, None);
        assert_eq!(saved.name(), "ana");

        Ok(())
    }

    #[test]
    fn test_status_flip_to_inactive_is_the_soft_delete() -> Result<()> {
        let (db, user) = setup()?;
        let mut editor = ProfileEditorState::for_user(&user);
        editor.status = UserStatus::Inactive;
        let saved = editor.save(&db)?;

        assert_eq!(saved.status, UserStatus::Inactive);
        assert!(!saved.is_online());
        // The row survives; only presence and login are affected.
        assert_eq!(db.list_users()?.len(), 1);

        Ok(())
    }
}
