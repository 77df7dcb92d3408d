use std::sync::Arc;

use thiserror::Error;

use crate::domain::UserId;
use crate::services::learning_session::{LearningError, LearningSessionService};
use crate::store::{StoreError, UserDirectory};

#[derive(Debug, Error)]
pub enum OnboardingError {
    #[error("{op} failed")]
    Internal {
        op: &'static str,
        #[source]
        source: StoreError,
    },
    #[error(transparent)]
    Learning(#[from] LearningError),
}

pub struct OnboardingService {
    users: Arc<dyn UserDirectory>,
    learning: Arc<LearningSessionService>,
}

impl OnboardingService {
    pub fn new(users: Arc<dyn UserDirectory>, learning: Arc<LearningSessionService>) -> Self {
        Self { users, learning }
    }

    /// Idempotent.
    pub async fn start(&self, user_id: UserId) -> Result<(), OnboardingError> {
        const OP: &str = "start";

        self.users
            .create_user(user_id)
            .await
            .map_err(|source| OnboardingError::Internal { op: OP, source })?;

        tracing::debug!(user_id, "{OP} succeeded");

        Ok(())
    }

    /// Ends any running session, then deletes the user with everything the
    /// user owns. Idempotent.
    pub async fn remove_me(&self, user_id: UserId) -> Result<(), OnboardingError> {
        const OP: &str = "remove_me";

        self.learning.exit(user_id).await?;

        let deleted = self
            .users
            .delete_user(user_id)
            .await
            .map_err(|source| OnboardingError::Internal { op: OP, source })?;
        if !deleted {
            tracing::warn!(user_id, "{OP}: user not found");
        }

        tracing::debug!(user_id, "{OP} succeeded");

        Ok(())
    }
}
