//! Background job that expires overdue admin invitations.

use persistence::repositories::AdminInvitationRepository;
use sqlx::PgPool;
use tracing::info;

use super::scheduler::{Job, JobFrequency};

/// Flips pending invitations past their expiry to `expired`.
pub struct InvitationExpiryJob {
    repo: AdminInvitationRepository,
    interval_minutes: u64,
}

impl InvitationExpiryJob {
    pub fn new(pool: PgPool, interval_minutes: u64) -> Self {
        Self {
            repo: AdminInvitationRepository::new(pool),
            interval_minutes,
        }
    }
}

#[async_trait::async_trait]
impl Job for InvitationExpiryJob {
    fn name(&self) -> &'static str {
        "invitation_expiry"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Minutes(self.interval_minutes)
    }

    fn run_immediately(&self) -> bool {
        true
    }

    async fn execute(&self) -> Result<(), String> {
        let expired = self
            .repo
            .expire_overdue()
            .await
            .map_err(|e| format!("Failed to expire invitations: {}", e))?;

        persistence::metrics::record_invitations_expired(expired);
        if expired > 0 {
            info!(expired, "Expired overdue admin invitations");
        }
        Ok(())
    }
}
