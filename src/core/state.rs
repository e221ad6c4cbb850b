use std::sync::Arc;

use sqlx::MySqlPool;

use crate::core::config::Settings;
use crate::repositories::sale_exercises::ExerciseSource;

#[derive(Clone)]
pub(crate) struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    settings: Settings,
    db: MySqlPool,
    exercises: Arc<dyn ExerciseSource>,
}

impl AppState {
    pub(crate) fn new(
        settings: Settings,
        db: MySqlPool,
        exercises: impl ExerciseSource + 'static,
    ) -> Self {
        Self { inner: Arc::new(InnerState { settings, db, exercises: Arc::new(exercises) }) }
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub(crate) fn db(&self) -> &MySqlPool {
        &self.inner.db
    }

    pub(crate) fn exercises(&self) -> &dyn ExerciseSource {
        self.inner.exercises.as_ref()
    }
}
