use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};

use sea_orm::DatabaseConnection;

use crate::{ResultEngine, UserSettings};

mod accounts;
mod categories;
mod settings;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Settings and accounts service.
///
/// Holds the last committed settings snapshot of each user it has seen. A
/// snapshot is replaced only after the write that produced it has committed,
/// so a failed write leaves readers on the previous document. Reads always
/// check the store; the snapshot is reused only while it matches the row.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    snapshots: RwLock<HashMap<String, Arc<UserSettings>>>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    fn cached_settings(&self, user_id: &str) -> Option<Arc<UserSettings>> {
        self.snapshots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(user_id)
            .cloned()
    }

    fn forget_settings(&self, user_id: &str) {
        self.snapshots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(user_id);
    }

    fn publish_settings(&self, settings: UserSettings) -> Arc<UserSettings> {
        let settings = Arc::new(settings);
        self.snapshots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(settings.user_id.clone(), Arc::clone(&settings));
        settings
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`, checking the database is reachable.
    pub async fn build(self) -> ResultEngine<Engine> {
        self.database.ping().await?;
        Ok(Engine {
            database: self.database,
            snapshots: RwLock::new(HashMap::new()),
        })
    }
}
