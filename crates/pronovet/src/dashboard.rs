//! Dashboard endpoints.

use pronovet_protocol::RequestDescriptor;
use pronovet_transport::HttpTransport;
use serde::{Deserialize, Serialize};

use crate::{ApiClient, PronovetError};

/// Record counts shown on the dashboard. Missing counts read as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardStats {
    pub buildings: u64,
    pub units: u64,
    pub companies: u64,
    /// Number of contacts. The API names this field in the singular.
    pub contact: u64,
    pub odforms: u64,
    pub users: u64,
}

/// A contact whose unit lease expires within the next six months.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpiringContact {
    pub id: u64,
    pub company: String,
    pub location: String,
    pub building: String,
    pub unit_name: String,
    /// `MM/DD/YYYY`.
    pub lease_expiry: String,
    /// Gross floor area, preformatted with thousands separators.
    pub gfa: String,
}

impl<T: HttpTransport> ApiClient<T> {
    pub async fn dashboard_stats(&self) -> Result<DashboardStats, PronovetError> {
        self.fetch_json(&RequestDescriptor::get("dashboard/")).await
    }

    /// Contacts with leases expiring soon, soonest first.
    pub async fn expiring_contacts(
        &self,
    ) -> Result<Vec<ExpiringContact>, PronovetError> {
        self.fetch_json(&RequestDescriptor::get("contacts/expiring"))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dashboard_stats_missing_fields_default_to_zero() {
        let stats: DashboardStats =
            serde_json::from_str(r#"{"buildings":12,"units":140}"#).unwrap();
        assert_eq!(stats.buildings, 12);
        assert_eq!(stats.units, 140);
        assert_eq!(stats.contact, 0);
        assert_eq!(stats.users, 0);
    }

    #[test]
    fn test_expiring_contact_decodes_server_row() {
        let row: ExpiringContact = serde_json::from_str(
            r#"{"id":5,"company":"Acme","location":"Makati","building":"Tower One",
                "unit_name":"12F","lease_expiry":"03/31/2027","gfa":"1,250.00"}"#,
        )
        .unwrap();
        assert_eq!(row.unit_name, "12F");
        assert_eq!(row.gfa, "1,250.00");
    }
}
