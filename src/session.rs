use crate::identity::Identity;

/// Durable slot for the session record. Implementations only move strings;
/// parsing and normalization stay in `SessionStore`.
pub trait SessionStorage {
    fn read(&self) -> anyhow::Result<Option<String>>;
    fn write(&mut self, record: &str) -> anyhow::Result<()>;
    fn erase(&mut self) -> anyhow::Result<()>;
}

/// The one owner of "who is logged in" for this process.
pub struct SessionStore {
    current: Option<Identity>,
    storage: Box<dyn SessionStorage>,
}

impl SessionStore {
    pub fn new(storage: Box<dyn SessionStorage>) -> Self {
        Self {
            current: None,
            storage,
        }
    }

    pub fn current(&self) -> Option<&Identity> {
        self.current.as_ref()
    }

    /// Reload from the durable record. Missing, unreadable or malformed
    /// records all mean "logged out"; nothing is written back.
    pub fn restore(&mut self) -> Option<Identity> {
        self.current = match self.storage.read() {
            Ok(Some(raw)) => match Identity::from_json(&raw) {
                Ok(ident) => Some(ident),
                Err(e) => {
                    tracing::warn!(error = %e, "discarding malformed session record");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "session storage unreadable; treating as logged out");
                None
            }
        };
        if let Some(ident) = &self.current {
            tracing::info!(user_id = ident.id, role = ident.role.as_str(), "session restored");
        }
        self.current.clone()
    }

    /// Replace the in-memory identity and mirror it durably: one write for
    /// `Some`, one erase for `None`. Storage failures are logged, not returned.
    pub fn set(&mut self, identity: Option<Identity>) {
        match &identity {
            Some(ident) => {
                let record = ident.to_record().to_string();
                if let Err(e) = self.storage.write(&record) {
                    tracing::warn!(error = %e, "failed to persist session record");
                }
            }
            None => {
                if let Err(e) = self.storage.erase() {
                    tracing::warn!(error = %e, "failed to erase session record");
                }
            }
        }
        self.current = identity;
    }

    pub fn logout(&mut self) {
        if let Some(ident) = &self.current {
            tracing::info!(user_id = ident.id, "logout");
        }
        self.set(None);
    }
}
