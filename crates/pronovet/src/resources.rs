//! Typed CRUD over the API's REST collections.
//!
//! Each [`Resource`] is a DRF-style collection: `GET` lists it, `POST`
//! creates in it, and `{path}{id}/` addresses a single record. Record
//! shapes are left to the caller; any `serde` type works, including
//! `serde_json::Value`.

use std::fmt;

use pronovet_protocol::{MultipartForm, RequestDescriptor};
use pronovet_transport::HttpTransport;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{ApiClient, PronovetError};

/// A REST collection exposed by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Buildings,
    Units,
    Companies,
    Contacts,
    OdForms,
    Addresses,
    BuildingImages,
    UnitImages,
    Users,
    /// The staff-only user list. Deleting a record deactivates the
    /// account rather than removing it.
    AdminUsers,
}

impl Resource {
    pub const ALL: [Resource; 10] = [
        Resource::Buildings,
        Resource::Units,
        Resource::Companies,
        Resource::Contacts,
        Resource::OdForms,
        Resource::Addresses,
        Resource::BuildingImages,
        Resource::UnitImages,
        Resource::Users,
        Resource::AdminUsers,
    ];

    /// The collection path, relative to the API base.
    pub fn path(&self) -> &'static str {
        match self {
            Self::Buildings => "buildings/",
            Self::Units => "units/",
            Self::Companies => "companies/",
            Self::Contacts => "contacts/",
            Self::OdForms => "odforms/",
            Self::Addresses => "addresses/",
            Self::BuildingImages => "building-images/",
            Self::UnitImages => "unit-images/",
            Self::Users => "users/",
            Self::AdminUsers => "admin/users/",
        }
    }

    /// The path of one record.
    pub fn item_path(&self, id: u64) -> String {
        format!("{}{id}/", self.path())
    }

    /// Looks a resource up by its collection name (`"units"`,
    /// `"building-images"`, ...). A trailing slash is accepted.
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim_matches('/');
        Self::ALL
            .into_iter()
            .find(|r| r.path().trim_end_matches('/') == name)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path().trim_end_matches('/'))
    }
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// Paging and search parameters for [`ApiClient::list`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub search: Option<String>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn page_size(mut self, size: u32) -> Self {
        self.page_size = Some(size);
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    fn apply(&self, mut descriptor: RequestDescriptor) -> RequestDescriptor {
        if let Some(page) = self.page {
            descriptor = descriptor.query("page", page);
        }
        if let Some(size) = self.page_size {
            descriptor = descriptor.query("page_size", size);
        }
        if let Some(term) = self.search.as_deref().filter(|t| !t.is_empty()) {
            descriptor = descriptor.query("search", term);
        }
        descriptor
    }
}

/// One page of a collection.
///
/// Paginated collections answer `{count, next, previous, results}`;
/// the rest answer a bare array, which becomes a single page holding
/// everything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Listing<T> {
    Paged(Page<T>),
    Bare(Vec<T>),
}

impl<T> From<Listing<T>> for Page<T> {
    fn from(listing: Listing<T>) -> Self {
        match listing {
            Listing::Paged(page) => page,
            Listing::Bare(results) => Page {
                count: results.len() as u64,
                next: None,
                previous: None,
                results,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Building logs
// ---------------------------------------------------------------------------

/// An entry in a building's change log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingLog {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub user_display: Option<String>,
}

impl BuildingLog {
    /// Who wrote the entry, preferring the display name.
    pub fn author(&self) -> Option<&str> {
        self.user_display.as_deref().or(self.user.as_deref())
    }
}

/// When a building was last changed, and by whom.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastEdited {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
}

#[derive(Serialize)]
struct NewLog<'a> {
    message: &'a str,
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

impl<T: HttpTransport> ApiClient<T> {
    /// Lists a collection.
    pub async fn list<R: DeserializeOwned>(
        &self,
        resource: Resource,
        query: &ListQuery,
    ) -> Result<Page<R>, PronovetError> {
        let descriptor = query.apply(RequestDescriptor::get(resource.path()));
        let listing: Listing<R> = self.fetch_json(&descriptor).await?;
        Ok(listing.into())
    }

    pub async fn retrieve<R: DeserializeOwned>(
        &self,
        resource: Resource,
        id: u64,
    ) -> Result<R, PronovetError> {
        self.fetch_json(&RequestDescriptor::get(resource.item_path(id)))
            .await
    }

    /// Creates a record and returns the server's copy of it.
    pub async fn create<B: Serialize, R: DeserializeOwned>(
        &self,
        resource: Resource,
        body: &B,
    ) -> Result<R, PronovetError> {
        let descriptor = RequestDescriptor::post(resource.path()).json(body)?;
        self.fetch_json(&descriptor).await
    }

    /// Partially updates a record (`PATCH`).
    pub async fn update<B: Serialize, R: DeserializeOwned>(
        &self,
        resource: Resource,
        id: u64,
        body: &B,
    ) -> Result<R, PronovetError> {
        let descriptor =
            RequestDescriptor::patch(resource.item_path(id)).json(body)?;
        self.fetch_json(&descriptor).await
    }

    pub async fn delete(
        &self,
        resource: Resource,
        id: u64,
    ) -> Result<(), PronovetError> {
        self.fetch(&RequestDescriptor::delete(resource.item_path(id)))
            .await?;
        tracing::info!(%resource, id, "record deleted");
        Ok(())
    }

    pub async fn building_logs(
        &self,
        building: u64,
    ) -> Result<Vec<BuildingLog>, PronovetError> {
        self.fetch_json(&RequestDescriptor::get(format!(
            "buildings/{building}/logs/"
        )))
        .await
    }

    /// Appends a note to a building's change log.
    pub async fn add_building_log(
        &self,
        building: u64,
        message: &str,
    ) -> Result<BuildingLog, PronovetError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(PronovetError::Validation(
                "log message must not be empty".to_string(),
            ));
        }
        let descriptor =
            RequestDescriptor::post(format!("buildings/{building}/logs/"))
                .json(&NewLog { message })?;
        self.fetch_json(&descriptor).await
    }

    /// Uploads a photo of a building. Returns the new
    /// `building-images/` record.
    pub async fn upload_building_image<R: DeserializeOwned>(
        &self,
        building: u64,
        file_name: &str,
        bytes: impl Into<Vec<u8>>,
    ) -> Result<R, PronovetError> {
        self.upload_image(Resource::BuildingImages, "building", building, file_name, bytes.into())
            .await
    }

    /// Uploads a photo of a unit. Returns the new `unit-images/` record.
    pub async fn upload_unit_image<R: DeserializeOwned>(
        &self,
        unit: u64,
        file_name: &str,
        bytes: impl Into<Vec<u8>>,
    ) -> Result<R, PronovetError> {
        self.upload_image(Resource::UnitImages, "unit", unit, file_name, bytes.into())
            .await
    }

    async fn upload_image<R: DeserializeOwned>(
        &self,
        resource: Resource,
        owner_field: &str,
        owner: u64,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<R, PronovetError> {
        if bytes.is_empty() {
            return Err(PronovetError::Validation(
                "image must not be empty".to_string(),
            ));
        }
        let form = MultipartForm::new()
            .text(owner_field, owner)
            .file("image", file_name, bytes);
        let descriptor = RequestDescriptor::post(resource.path()).multipart(form);
        let record = self.fetch_json(&descriptor).await?;
        tracing::info!(%resource, owner, file_name, "image uploaded");
        Ok(record)
    }

    pub async fn building_last_edited(
        &self,
        building: u64,
    ) -> Result<LastEdited, PronovetError> {
        self.fetch_json(&RequestDescriptor::get(format!(
            "buildings/{building}/last_edited/"
        )))
        .await
    }
}
