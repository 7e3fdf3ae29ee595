//! CRUD wrappers for the admin collections
//!
//! Each admin screen is backed by one REST collection; the service here is
//! the same thin list/get/create/update/delete plumbing for all of them.

use super::error::ClientError;
use super::{ApiClient, ApiRequest};
use crate::types::NotificationBroadcast;
use lavacar_core::{ApiError, Pagination, Validate};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Backend collections managed from the admin panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Clients,
    Vehicles,
    Plans,
    Coupons,
    Services,
    Units,
    Users,
    Payments,
    Notifications,
}

impl Resource {
    pub const ALL: [Self; 9] = [
        Self::Clients,
        Self::Vehicles,
        Self::Plans,
        Self::Coupons,
        Self::Services,
        Self::Units,
        Self::Users,
        Self::Payments,
        Self::Notifications,
    ];

    /// Collection name, also the key of the list array in responses
    pub const fn name(self) -> &'static str {
        match self {
            Self::Clients => "clients",
            Self::Vehicles => "vehicles",
            Self::Plans => "plans",
            Self::Coupons => "coupons",
            Self::Services => "services",
            Self::Units => "units",
            Self::Users => "users",
            Self::Payments => "payments",
            Self::Notifications => "notifications",
        }
    }

    pub fn path(self) -> String {
        format!("/{}", self.name())
    }

    pub fn item_path(self, id: &str) -> String {
        format!("/{}/{id}", self.name())
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Resource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|r| r.name() == wanted)
            .ok_or_else(|| {
                let known: Vec<_> = Self::ALL.iter().map(|r| r.name()).collect();
                format!("unknown resource '{s}', expected one of: {}", known.join(", "))
            })
    }
}

/// One page of a collection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub total_pages: u32,
}

impl<T> Page<T> {
    /// Pager state for this page
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.total_pages)
    }
}

impl<T: DeserializeOwned> Page<T> {
    /// Pull the item array out of a list response.
    ///
    /// The array sits under the collection name (`{"users": [...]}`), or
    /// under `data`/`items`; a bare array is accepted too.
    ///
    /// # Errors
    ///
    /// Returns an error if no item array is found or items fail to decode
    pub fn from_response(resource: Resource, page: u32, body: Value) -> Result<Self, ClientError> {
        let (items, total_pages) = match body {
            Value::Array(items) => (Value::Array(items), 1),
            Value::Object(mut map) => {
                let items = [resource.name(), "data", "items"]
                    .into_iter()
                    .find_map(|key| map.remove(key))
                    .ok_or_else(|| {
                        ClientError::UnexpectedResponse(format!(
                            "list response for {resource} has no item array"
                        ))
                    })?;
                let total_pages = ["totalPages", "total_pages", "pages"]
                    .into_iter()
                    .find_map(|key| map.get(key).and_then(Value::as_u64))
                    .map_or(1, |n| u32::try_from(n).unwrap_or(u32::MAX));
                (items, total_pages)
            }
            other => {
                return Err(ClientError::UnexpectedResponse(format!(
                    "unexpected list response for {resource}: {other}"
                )));
            }
        };

        Ok(Self {
            items: serde_json::from_value(items)?,
            page,
            total_pages,
        })
    }
}

/// CRUD operations on one [`Resource`]
#[derive(Debug, Clone, Copy)]
pub struct ResourceService<'a> {
    client: &'a ApiClient,
    resource: Resource,
}

impl ApiClient {
    pub const fn resource(&self, resource: Resource) -> ResourceService<'_> {
        ResourceService {
            client: self,
            resource,
        }
    }

    /// Push a notification to every subscriber
    ///
    /// # Errors
    ///
    /// `400` if the notification fails validation, otherwise see
    /// [`ApiClient::request`]
    pub async fn broadcast_notification(
        &self,
        notification: &NotificationBroadcast,
    ) -> Result<Value, ApiError> {
        self.resource(Resource::Notifications)
            .create(notification)
            .await
    }
}

impl ResourceService<'_> {
    pub const fn kind(&self) -> Resource {
        self.resource
    }

    /// `GET /{resource}?page=n`
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`]; a response without an item array is a
    /// `500`
    pub async fn list<T: DeserializeOwned>(&self, page: u32) -> Result<Page<T>, ApiError> {
        let page = page.max(1);
        let request = ApiRequest::get(self.resource.path()).param("page", page);
        let body: Value = self.client.request(request).await?;
        Ok(Page::from_response(self.resource, page, body)?)
    }

    /// `GET /{resource}/{id}`
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`]
    pub async fn get<T: DeserializeOwned>(&self, id: &str) -> Result<T, ApiError> {
        self.client.get(&self.resource.item_path(id)).await
    }

    /// `POST /{resource}` after local validation
    ///
    /// # Errors
    ///
    /// `400` if `body` fails validation, otherwise see [`ApiClient::request`]
    pub async fn create<B, T>(&self, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + Validate,
        T: DeserializeOwned,
    {
        body.validate()?;
        self.client.post(&self.resource.path(), body).await
    }

    /// `PUT /{resource}/{id}` after local validation
    ///
    /// # Errors
    ///
    /// `400` if `body` fails validation, otherwise see [`ApiClient::request`]
    pub async fn update<B, T>(&self, id: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + Validate,
        T: DeserializeOwned,
    {
        body.validate()?;
        self.client.put(&self.resource.item_path(id), body).await
    }

    /// `DELETE /{resource}/{id}`
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`]
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let _: Option<Value> = self.client.delete(&self.resource.item_path(id)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_resource_names() {
        assert_eq!("Vehicles".parse::<Resource>(), Ok(Resource::Vehicles));
        assert_eq!(Resource::Units.item_path("42"), "/units/42");
        assert!("carros".parse::<Resource>().is_err());
    }

    #[test]
    fn page_from_named_array() {
        let body = json!({"users": [{"id": 1}, {"id": 2}], "totalPages": 5});
        let page: Page<Value> = Page::from_response(Resource::Users, 2, body).unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total_pages, 5);
        assert_eq!(page.pagination().previous(), Some(1));
    }

    #[test]
    fn page_from_data_or_bare_array() {
        let body = json!({"data": ["a"], "total_pages": 3});
        let page: Page<String> = Page::from_response(Resource::Plans, 1, body).unwrap();
        assert_eq!(page.items, vec!["a".to_string()]);
        assert_eq!(page.total_pages, 3);

        let page: Page<u8> = Page::from_response(Resource::Plans, 1, json!([1, 2])).unwrap();
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn page_without_items_is_an_error() {
        let err = Page::<Value>::from_response(Resource::Coupons, 1, json!({"total": 0}))
            .unwrap_err();
        assert!(matches!(err, ClientError::UnexpectedResponse(_)));
        assert_eq!(ApiError::from(err).code, 500);

        let err = Page::<Value>::from_response(Resource::Coupons, 1, json!("ok")).unwrap_err();
        assert!(matches!(err, ClientError::UnexpectedResponse(_)));
    }
}
