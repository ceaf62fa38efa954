//! Microsoft Bookings on top of the generic OData client.
//!
//! ```ignore
//! use std::sync::Arc;
//! use bookings_client::auth::{ClientCredentials, RefreshingProvider};
//! use bookings_client::bookings::{BookingsApi, BOOKING_BUSINESS};
//! use bookings_client::config::{ClientConfig, ClientCredentialsConfig};
//! use bookings_client::odata::{ServiceClient, TrackedEntity};
//!
//! let creds = ClientCredentialsConfig::new("tenant", "client-id", "secret");
//! let provider = Arc::new(RefreshingProvider::new(ClientCredentials::new(creds)));
//! let api = BookingsApi::new(ServiceClient::new(&ClientConfig::default(), provider)?);
//!
//! let mut business = TrackedEntity::new_tracked(&BOOKING_BUSINESS);
//! business.set("display_name", "Contoso")?;
//! api.create_business(&mut business).await?;
//! api.publish(business.id().unwrap_or_default()).await?;
//! ```

/// Entity schemas for the Bookings entity sets.
pub mod schemas;
/// Complex and enum value types used as field values.
pub mod types;

pub use schemas::{BOOKING_APPOINTMENT, BOOKING_BUSINESS, BOOKING_SERVICE, BOOKING_STAFF_MEMBER};
pub use types::{BookingReminder, DateTimeTimeZone, ReminderRecipients, StaffRole};

use crate::error::Result;
use crate::odata::action::ActionResult;
use crate::odata::collection::PagedCollection;
use crate::odata::entity::TrackedEntity;
use crate::odata::serviceclient::ServiceClient;

pub const BUSINESSES_PATH: &str = "solutions/bookingBusinesses";

const STAFF_MEMBERS: &str = "staffMembers";
const SERVICES: &str = "services";
const APPOINTMENTS: &str = "appointments";

/// Bookings entity sets and actions bound to one [`ServiceClient`].
#[derive(Clone)]
pub struct BookingsApi {
    client: ServiceClient,
}

impl BookingsApi {
    pub fn new(client: ServiceClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ServiceClient {
        &self.client
    }

    pub fn business_path(business_id: &str) -> String {
        ServiceClient::entity_path(BUSINESSES_PATH, business_id)
    }

    fn child_collection(business_id: &str, segment: &str) -> String {
        format!("{}/{}", Self::business_path(business_id), segment)
    }

    pub async fn list_businesses(&self) -> Result<PagedCollection> {
        self.client.list(BUSINESSES_PATH, &BOOKING_BUSINESS).await
    }

    pub async fn get_business(&self, business_id: &str) -> Result<TrackedEntity> {
        self.client
            .get_by_key(BUSINESSES_PATH, &BOOKING_BUSINESS, business_id)
            .await
    }

    pub async fn create_business(&self, business: &mut TrackedEntity) -> Result<()> {
        self.client.create(BUSINESSES_PATH, business).await
    }

    pub async fn list_staff_members(&self, business_id: &str) -> Result<PagedCollection> {
        let path = Self::child_collection(business_id, STAFF_MEMBERS);
        self.client.list(&path, &BOOKING_STAFF_MEMBER).await
    }

    pub async fn create_staff_member(
        &self,
        business_id: &str,
        staff: &mut TrackedEntity,
    ) -> Result<()> {
        let path = Self::child_collection(business_id, STAFF_MEMBERS);
        self.client.create(&path, staff).await
    }

    pub async fn list_services(&self, business_id: &str) -> Result<PagedCollection> {
        let path = Self::child_collection(business_id, SERVICES);
        self.client.list(&path, &BOOKING_SERVICE).await
    }

    pub async fn list_appointments(&self, business_id: &str) -> Result<PagedCollection> {
        let path = Self::child_collection(business_id, APPOINTMENTS);
        self.client.list(&path, &BOOKING_APPOINTMENT).await
    }

    pub async fn create_appointment(
        &self,
        business_id: &str,
        appointment: &mut TrackedEntity,
    ) -> Result<()> {
        let path = Self::child_collection(business_id, APPOINTMENTS);
        self.client.create(&path, appointment).await
    }

    /// Makes the business's scheduling page available to customers.
    pub async fn publish(&self, business_id: &str) -> Result<ActionResult> {
        self.client
            .invoke_action(&Self::business_path(business_id), "publish", None)
            .await
    }

    /// Hides the scheduling page again.
    pub async fn unpublish(&self, business_id: &str) -> Result<ActionResult> {
        self.client
            .invoke_action(&Self::business_path(business_id), "unpublish", None)
            .await
    }
}
