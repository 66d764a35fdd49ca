//! Provider gateway for reservation state.
//!
//! The gateway is the one seam between zoneshift and the cloud provider:
//! list active reservations, list running instances, and atomically replace
//! the zone layout of a reservation group. Everything above this crate is
//! pure computation, so the gateway is a trait and tests substitute
//! [`MockGateway`] for the real [`HttpGateway`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod http;
mod mock;

pub use http::{HttpGateway, ProviderCredentials};
pub use mock::{MockGateway, ModifyCall};

/// Errors surfaced by gateway operations.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transport-level failure (DNS, TLS, connection reset, timeout).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("provider API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The provider answered 2xx but the body did not decode.
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),

    /// Supplied credentials cannot be encoded into a request.
    #[error("invalid credentials: {0}")]
    Credentials(String),
}

/// An active capacity reservation as reported by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationRecord {
    /// Provider-assigned reservation identifier.
    pub id: String,

    /// Free-text description; encodes platform and network locality.
    #[serde(default)]
    pub description: String,

    /// Instance shape the reservation covers.
    pub instance_type: String,

    /// Zone the reservation is currently pinned to.
    pub availability_zone: String,

    /// Number of instances this reservation covers.
    pub instance_count: u64,
}

/// A running instance as reported by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceRecord {
    /// Instance shape.
    pub instance_type: String,

    /// Zone the instance is placed in.
    pub placement_zone: String,

    /// Virtual network id, if the instance runs inside one.
    #[serde(default)]
    pub vpc_id: Option<String>,

    /// Platform label; providers omit it for the default platform.
    #[serde(default)]
    pub platform: Option<String>,
}

/// One zone/count leaf of a reservation modify request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetConfiguration {
    pub availability_zone: String,

    /// Network locality label the provider expects ("EC2-Classic"/"EC2-VPC").
    pub locality_label: String,

    pub instance_type: String,

    pub instance_count: u64,
}

/// Operations zoneshift needs from the provider.
///
/// `modify_reservations` replaces the zone layout of the given reservations
/// atomically. The client token distinguishes submissions; the provider does
/// not deduplicate on it, so callers must make tokens unique per attempt.
#[async_trait]
pub trait ProviderGateway: Send + Sync {
    async fn list_active_reservations(&self) -> Result<Vec<ReservationRecord>, ProviderError>;

    async fn list_running_instances(&self) -> Result<Vec<InstanceRecord>, ProviderError>;

    async fn modify_reservations(
        &self,
        client_token: &str,
        reservation_ids: &[String],
        targets: &[TargetConfiguration],
    ) -> Result<(), ProviderError>;
}
