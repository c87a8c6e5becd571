//! Amazon EC2 actions.

use serde::Deserialize;

use crate::action::{Action, Service};
use crate::client::Client;
use crate::error::Result;
use crate::request::Request;
use crate::response::ItemSet;
use crate::transport::Transport;

/// Describes instances, optionally limited to the given IDs.
#[derive(Debug, Clone, Default)]
pub struct DescribeInstances {
    pub instance_ids: Vec<String>,
}

impl Action for DescribeInstances {
    const NAME: &'static str = "DescribeInstances";
    const SERVICE: Service = Service::Ec2;
    type Response = DescribeInstancesResponse;

    fn add_params(&self, request: &mut Request) {
        // EC2 list parameters are 1-based.
        for (i, id) in self.instance_ids.iter().enumerate() {
            request.add(format!("InstanceId.{}", i + 1), id.clone());
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeInstancesResponse {
    #[serde(default)]
    pub request_id: String,
    #[serde(default)]
    pub reservation_set: ItemSet<Reservation>,
}

impl DescribeInstancesResponse {
    pub fn reservations(&self) -> &[Reservation] {
        &self.reservation_set.items
    }

    /// All instances across every reservation.
    pub fn instances(&self) -> impl Iterator<Item = &Instance> {
        self.reservation_set
            .items
            .iter()
            .flat_map(|r| r.instances_set.items.iter())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub reservation_id: String,
    #[serde(default)]
    pub owner_id: String,
    #[serde(default)]
    pub instances_set: ItemSet<Instance>,
}

impl Reservation {
    pub fn instances(&self) -> &[Instance] {
        &self.instances_set.items
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    pub instance_id: String,
    #[serde(default)]
    pub image_id: String,
    #[serde(default)]
    pub instance_state: InstanceState,
    #[serde(default)]
    pub dns_name: String,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub instance_type: String,
}

impl Instance {
    pub fn state_name(&self) -> &str {
        &self.instance_state.name
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InstanceState {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub name: String,
}

impl<T: Transport> Client<T> {
    /// Describes every instance visible to the account.
    pub async fn describe_instances(&self) -> Result<DescribeInstancesResponse> {
        self.call(&DescribeInstances::default()).await
    }
}
