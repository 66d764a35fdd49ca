//! Mock gateway for testing and development.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::{
    InstanceRecord, ProviderError, ProviderGateway, ReservationRecord, TargetConfiguration,
};

/// One recorded `modify_reservations` call.
#[derive(Debug, Clone)]
pub struct ModifyCall {
    pub client_token: String,
    pub reservation_ids: Vec<String>,
    pub targets: Vec<TargetConfiguration>,
}

/// In-memory gateway returning canned state and recording mutations.
#[derive(Default)]
pub struct MockGateway {
    reservations: Mutex<Vec<ReservationRecord>>,
    instances: Mutex<Vec<InstanceRecord>>,
    modify_calls: Mutex<Vec<ModifyCall>>,

    /// When set, list calls fail with this many consecutive errors.
    fail_lists: Mutex<u32>,

    /// When true, every modify call fails.
    fail_modifies: Mutex<bool>,

    /// Instance shapes whose modify calls fail.
    fail_modify_shapes: Mutex<Vec<String>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reservations(self, reservations: Vec<ReservationRecord>) -> Self {
        *self.reservations.lock().unwrap() = reservations;
        self
    }

    pub fn with_instances(self, instances: Vec<InstanceRecord>) -> Self {
        *self.instances.lock().unwrap() = instances;
        self
    }

    /// Make the next `n` list calls fail.
    pub fn fail_next_lists(&self, n: u32) {
        *self.fail_lists.lock().unwrap() = n;
    }

    /// Make every modify call fail.
    pub fn fail_modifies(&self) {
        *self.fail_modifies.lock().unwrap() = true;
    }

    /// Make modify calls touching this instance shape fail.
    pub fn fail_modifies_for_shape(&self, instance_type: &str) {
        self.fail_modify_shapes
            .lock()
            .unwrap()
            .push(instance_type.to_string());
    }

    /// Replace the canned reservation state (e.g. to simulate an applied change).
    pub fn set_reservations(&self, reservations: Vec<ReservationRecord>) {
        *self.reservations.lock().unwrap() = reservations;
    }

    /// Calls recorded so far, oldest first.
    pub fn recorded_modifies(&self) -> Vec<ModifyCall> {
        self.modify_calls.lock().unwrap().clone()
    }

    fn check_list_failure(&self) -> Result<(), ProviderError> {
        let mut remaining = self.fail_lists.lock().unwrap();
        if *remaining > 0 {
            *remaining -= 1;
            return Err(ProviderError::Api {
                status: 503,
                message: "mock list failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ProviderGateway for MockGateway {
    async fn list_active_reservations(&self) -> Result<Vec<ReservationRecord>, ProviderError> {
        self.check_list_failure()?;
        Ok(self.reservations.lock().unwrap().clone())
    }

    async fn list_running_instances(&self) -> Result<Vec<InstanceRecord>, ProviderError> {
        self.check_list_failure()?;
        Ok(self.instances.lock().unwrap().clone())
    }

    async fn modify_reservations(
        &self,
        client_token: &str,
        reservation_ids: &[String],
        targets: &[TargetConfiguration],
    ) -> Result<(), ProviderError> {
        let shape_blocked = {
            let shapes = self.fail_modify_shapes.lock().unwrap();
            targets
                .iter()
                .any(|t| shapes.iter().any(|s| s == &t.instance_type))
        };
        if *self.fail_modifies.lock().unwrap() || shape_blocked {
            return Err(ProviderError::Api {
                status: 500,
                message: "mock modify failure".to_string(),
            });
        }

        self.modify_calls.lock().unwrap().push(ModifyCall {
            client_token: client_token.to_string(),
            reservation_ids: reservation_ids.to_vec(),
            targets: targets.to_vec(),
        });
        Ok(())
    }
}
