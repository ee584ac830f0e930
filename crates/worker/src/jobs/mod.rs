//! Background job scheduler and job implementations.

mod invitation_expiry;
mod pool_metrics;
mod scheduler;

pub use invitation_expiry::InvitationExpiryJob;
pub use pool_metrics::PoolMetricsJob;
pub use scheduler::{Job, JobFrequency, JobScheduler};
