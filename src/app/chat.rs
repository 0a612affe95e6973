//! Direct-message side panel: contacts, one open conversation, and the
//! per-sender unread map.
//!
//! Sending never appends optimistically; the conversation is reloaded
//! after the insert. A lagged bus receiver reconciles everything from the
//! store instead of replaying dropped events.

use std::collections::HashMap;

use anyhow::Result;
use uuid::Uuid;

use crate::db::Database;
use crate::events::{ChangeBus, ChangeEvent};
use crate::types::{ChatMessage, User};

#[derive(Debug)]
pub struct Contact<'a> {
    pub user: &'a User,
    pub online: bool,
}

/// Everyone except the current user, in directory order.
pub fn contacts(users: &[User], current_user: Uuid) -> Vec<Contact<'_>> {
    users
        .iter()
        .filter(|user| user.id != current_user)
        .map(|user| Contact {
            user,
            online: user.is_online(),
        })
        .collect()
}

#[derive(Debug)]
pub struct ChatPanel {
    current_user: Uuid,
    open_contact: Option<Uuid>,
    messages: Vec<ChatMessage>,
    unread: HashMap<Uuid, i64>,
    pub draft_input: String,
}

impl ChatPanel {
    pub fn new(current_user: Uuid) -> Self {
        Self {
            current_user,
            open_contact: None,
            messages: Vec::new(),
            unread: HashMap::new(),
            draft_input: String::new(),
        }
    }

    pub fn open_contact(&self) -> Option<Uuid> {
        self.open_contact
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn unread_count(&self, contact: Uuid) -> i64 {
        self.unread.get(&contact).copied().unwrap_or(0)
    }

    pub fn total_unread(&self) -> i64 {
        self.unread.values().sum()
    }

    /// Open a conversation: zero the contact's counter, issue one batch
    /// mark-read, then load the history with current read flags.
    pub fn open_conversation(&mut self, db: &Database, contact: Uuid) -> Result<()> {
        self.unread.remove(&contact);
        db.mark_conversation_read(contact, self.current_user)?;
        self.messages = db.conversation(self.current_user, contact)?;
        self.open_contact = Some(contact);
        Ok(())
    }

    pub fn close_conversation(&mut self) {
        self.open_contact = None;
        self.messages.clear();
        self.draft_input.clear();
    }

    /// Insert the draft, publish it, and reload the conversation. A blank
    /// draft is a no-op.
    pub fn send(&mut self, db: &Database, bus: &ChangeBus) -> Result<Option<ChatMessage>> {
        let Some(contact) = self.open_contact else {
            return Ok(None);
        };
        if self.draft_input.trim().is_empty() {
            return Ok(None);
        }

        let message = db.send_message(self.current_user, contact, &self.draft_input)?;
        self.draft_input.clear();
        bus.publish(ChangeEvent::MessageInserted {
            message: message.clone(),
        });
        self.messages = db.conversation(self.current_user, contact)?;
        Ok(Some(message))
    }

    /// React to a bus event. Returns the message when the caller should
    /// raise a notification for it, None otherwise.
    pub fn handle_event(
        &mut self,
        db: &Database,
        event: &ChangeEvent,
    ) -> Result<Option<ChatMessage>> {
        let ChangeEvent::MessageInserted { message } = event else {
            return Ok(None);
        };
        if message.receiver_id != self.current_user || message.sender_id == self.current_user {
            return Ok(None);
        }

        if self.open_contact == Some(message.sender_id) {
            db.mark_conversation_read(message.sender_id, self.current_user)?;
            let mut delivered = message.clone();
            delivered.read = true;
            self.messages.push(delivered);
            return Ok(None);
        }

        *self.unread.entry(message.sender_id).or_insert(0) += 1;
        Ok(Some(message.clone()))
    }

    /// Rebuild unread counters and the open conversation from the store.
    /// Used after a lagged receiver and on each poll cycle.
    pub fn reconcile(&mut self, db: &Database) -> Result<()> {
        self.unread = db
            .unread_counts(self.current_user)?
            .into_iter()
            .filter(|(sender, _)| self.open_contact != Some(*sender))
            .collect();
        if let Some(contact) = self.open_contact {
            db.mark_conversation_read(contact, self.current_user)?;
            self.messages = db.conversation(self.current_user, contact)?;
        }
        Ok(())
    }
}
