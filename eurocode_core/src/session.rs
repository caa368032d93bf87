//! # Session
//!
//! The `Session` is the root container for one load-combination study: who is
//! working on which job, the editable load table, and the last generated
//! combinations.
//!
//! ## Structure
//!
//! ```text
//! Session
//! ├── meta: SessionMetadata (engineer, job info, timestamps)
//! ├── settings: GenerationSettings (partial factors, formula digits)
//! ├── registry: LoadRegistry (loads + coefficient mode)
//! └── combinations: Option<CombinationSet> (last generation, if still current)
//! ```
//!
//! Combinations are never shown against a load table they were not computed
//! from: any mutable access to the registry drops the stored set, and a new
//! generation is needed.
//!
//! ## Example
//!
//! ```rust
//! use eurocode_core::session::Session;
//!
//! let mut session = Session::new("Jeanne Ingénieure", "25-042", "SCI Les Tilleuls");
//! assert_eq!(session.generate().unwrap().len(), 4);
//!
//! let id = session.registry().loads()[0].id;
//! session.registry_mut().set_value(id, 30.0).unwrap();
//! assert!(session.combinations().is_none());
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::errors::CalcResult;
use crate::loads::{generate_with, CombinationSet, GenerationSettings, LoadRegistry};

/// Root session container.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    /// Engineer and job information
    pub meta: SessionMetadata,

    /// Settings used by [`Session::generate`]
    pub settings: GenerationSettings,

    registry: LoadRegistry,

    combinations: Option<CombinationSet>,
}

impl Session {
    /// Create a session seeded with the default load table.
    ///
    /// # Arguments
    ///
    /// * `engineer` - Name of the responsible engineer
    /// * `job_id` - Job/project number (e.g., "25-001")
    /// * `client` - Client name
    pub fn new(engineer: impl Into<String>, job_id: impl Into<String>, client: impl Into<String>) -> Self {
        Self::with_registry(engineer, job_id, client, LoadRegistry::with_seed_data())
    }

    /// Create a session around an existing load table
    pub fn with_registry(
        engineer: impl Into<String>,
        job_id: impl Into<String>,
        client: impl Into<String>,
        registry: LoadRegistry,
    ) -> Self {
        let now = Utc::now();
        Session {
            meta: SessionMetadata {
                engineer: engineer.into(),
                job_id: job_id.into(),
                client: client.into(),
                created: now,
                modified: now,
            },
            settings: GenerationSettings::default(),
            registry,
            combinations: None,
        }
    }

    /// Read-only access to the load table
    pub fn registry(&self) -> &LoadRegistry {
        &self.registry
    }

    /// Mutable access to the load table.
    ///
    /// Note: this drops the stored combinations and marks the session as
    /// modified, whether or not the caller actually changes anything.
    pub fn registry_mut(&mut self) -> &mut LoadRegistry {
        self.invalidate();
        self.touch();
        &mut self.registry
    }

    /// Generate combinations from the current load table and store them.
    ///
    /// On failure (e.g. no variable load) the session is left unchanged and
    /// the error is returned for display.
    pub fn generate(&mut self) -> CalcResult<&CombinationSet> {
        let snapshot = self.registry.snapshot();
        let set = generate_with(&snapshot, &self.settings)?;
        Ok(self.combinations.insert(set))
    }

    /// Last generated combinations, if they still match the load table
    pub fn combinations(&self) -> Option<&CombinationSet> {
        self.combinations
            .as_ref()
            .filter(|set| self.registry.is_current(set))
    }

    /// Drop the stored combinations
    pub fn invalidate(&mut self) {
        if self.combinations.take().is_some() {
            debug!(revision = self.registry.revision(), "combinations invalidated");
        }
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }
}

impl Default for Session {
    fn default() -> Self {
        Session::new("", "", "")
    }
}

/// Session header information.
#[derive(Debug, Clone, Serialize)]
pub struct SessionMetadata {
    /// Name of the responsible engineer
    pub engineer: String,

    /// Job/project number
    pub job_id: String,

    /// Client name
    pub client: String,

    /// When the session was started
    pub created: DateTime<Utc>,

    /// When the load table was last touched
    pub modified: DateTime<Utc>,
}
