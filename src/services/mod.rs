pub mod analytics;
pub mod email;
pub mod messaging;
pub mod notifications;
pub mod payments;
pub mod scheduling;
