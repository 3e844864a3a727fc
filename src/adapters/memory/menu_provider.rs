//! Scripted menu provider for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;
use std::time::Duration;

use crate::domain::conversation::{Button, OutboundPayload};
use crate::domain::foundation::ConversationId;
use crate::ports::{MenuError, MenuProvider};

/// Menu provider that returns a predictable placeholder payload.
///
/// The body encodes the requested menu name (and language when present) so
/// tests can assert which menu was resolved without duplicating production
/// copy. Supports an artificial delay (deadline tests) and a failure mode.
pub struct ScriptedMenuProvider {
    delay: RwLock<Option<Duration>>,
    failing: AtomicBool,
}

impl ScriptedMenuProvider {
    pub fn new() -> Self {
        Self {
            delay: RwLock::new(None),
            failing: AtomicBool::new(false),
        }
    }

    /// Delays every subsequent lookup by `delay`.
    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.write().expect("delay lock poisoned") = delay;
    }

    /// Makes every subsequent lookup fail.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl Default for ScriptedMenuProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MenuProvider for ScriptedMenuProvider {
    async fn menu(
        &self,
        _conversation: &ConversationId,
        language: Option<&str>,
        menu: &str,
    ) -> Result<OutboundPayload, MenuError> {
        let delay = *self.delay.read().expect("delay lock poisoned");
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(MenuError::Unavailable("simulated outage".to_string()));
        }
        let body = match language {
            Some(lang) => format!("menu:{menu}:{lang}"),
            None => format!("menu:{menu}"),
        };
        Ok(OutboundPayload::Buttons {
            body,
            buttons: vec![Button::new("main_menu", "Main menu")],
        })
    }
}
