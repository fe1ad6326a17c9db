//! Property listing API client and local listing filter.
//!
//! Public reads need no session; developer writes send the stored bearer
//! token and drop the session on a 401. `create` is the one non-idempotent
//! call and is only retried when the connection never opened.

#[cfg(test)]
#[path = "properties_test.rs"]
mod properties_test;

use serde::{Deserialize, Serialize};

use crate::config::{ClientConfig, ConfigError};
use crate::error::{AuthError, AuthResult};
use crate::net::http::{ApiResponse, ApiTransport, classify_failure, parse_body};
use crate::net::retry::{with_retry, with_retry_unsent};
use crate::token_store::TokenStore;

pub const PROPERTIES_PATH: &str = "/api/properties";

const TITLE_MAX: usize = 200;
const LOCATION_MAX: usize = 100;
const PROPERTY_TYPE_MAX: usize = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PropertyStatus {
    Available,
    Sold,
    #[serde(other)]
    Other,
}

/// A listing as returned by the backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub location: String,
    pub property_type: String,
    pub bedrooms: u32,
    pub bathrooms: u32,
    /// Floor area in square meters.
    pub area: f64,
    pub status: PropertyStatus,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub developer_name: Option<String>,
    #[serde(default)]
    pub developer_email: Option<String>,
}

/// Create/update payload for a developer's listing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDraft {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub location: String,
    pub property_type: String,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub area: f64,
}

impl PropertyDraft {
    /// Check the draft the way the backend's bean validation would.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` naming the first offending field.
    pub fn validate(&self) -> AuthResult<()> {
        text_field(&self.title, "Title", Some(TITLE_MAX))?;
        text_field(&self.description, "Description", None)?;
        text_field(&self.location, "Location", Some(LOCATION_MAX))?;
        text_field(&self.property_type, "Property type", Some(PROPERTY_TYPE_MAX))?;
        if !(self.price.is_finite() && self.price > 0.0) {
            return Err(AuthError::Validation("Price must be greater than 0".to_owned()));
        }
        if self.bedrooms == 0 {
            return Err(AuthError::Validation("Bedrooms must be positive".to_owned()));
        }
        if self.bathrooms == 0 {
            return Err(AuthError::Validation("Bathrooms must be positive".to_owned()));
        }
        if !(self.area.is_finite() && self.area > 0.0) {
            return Err(AuthError::Validation("Area must be positive".to_owned()));
        }
        Ok(())
    }
}

fn text_field(value: &str, label: &str, max: Option<usize>) -> AuthResult<()> {
    if value.trim().is_empty() {
        return Err(AuthError::Validation(format!("{label} is required")));
    }
    if let Some(max) = max {
        if value.chars().count() > max {
            return Err(AuthError::Validation(format!("{label} must not exceed {max} characters")));
        }
    }
    Ok(())
}

// =============================================================================
// FILTER
// =============================================================================

/// Search box + location + price range, applied client-side.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertyFilter {
    /// Case-insensitive match against title, description or location.
    pub search: Option<String>,
    /// Case-insensitive match against location only.
    pub location: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

impl PropertyFilter {
    #[must_use]
    pub fn matches(&self, property: &Property) -> bool {
        if let Some(needle) = normalized(self.search.as_deref()) {
            let hit = [&property.title, &property.description, &property.location]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        if let Some(needle) = normalized(self.location.as_deref()) {
            if !property.location.to_lowercase().contains(&needle) {
                return false;
            }
        }
        self.min_price.is_none_or(|min| property.price >= min) && self.max_price.is_none_or(|max| property.price <= max)
    }

    #[must_use]
    pub fn apply<'a>(&self, properties: &'a [Property]) -> Vec<&'a Property> {
        properties.iter().filter(|p| self.matches(p)).collect()
    }
}

fn normalized(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim).filter(|s| !s.is_empty()).map(str::to_lowercase)
}

// =============================================================================
// CLIENT
// =============================================================================

#[derive(Clone)]
pub struct PropertyClient {
    transport: ApiTransport,
    store: TokenStore,
}

impl PropertyClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: ClientConfig, store: TokenStore) -> Result<Self, ConfigError> {
        Ok(Self { transport: ApiTransport::new(config)?, store })
    }

    /// All listings. No session required.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    pub async fn list(&self) -> AuthResult<Vec<Property>> {
        let transport = &self.transport;
        with_retry(transport.retry_policy(), "list_properties", move || async move {
            let response = transport.send(transport.get(PROPERTIES_PATH)).await?;
            expect_body(&response, "Failed to fetch properties")
        })
        .await
    }

    /// One listing by id. No session required.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend rejects it.
    pub async fn get(&self, id: u64) -> AuthResult<Property> {
        let path = format!("{PROPERTIES_PATH}/{id}");
        let (transport, path) = (&self.transport, path.as_str());
        with_retry(transport.retry_policy(), "get_property", move || async move {
            let response = transport.send(transport.get(path)).await?;
            expect_body(&response, "Failed to fetch property")
        })
        .await
    }

    /// Listings owned by the signed-in developer.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::SessionInvalid` without a valid session, or any
    /// request/backend failure.
    pub async fn mine(&self) -> AuthResult<Vec<Property>> {
        let path = format!("{PROPERTIES_PATH}/developer/my-properties");
        let (transport, store, path) = (&self.transport, &self.store, path.as_str());
        with_retry(transport.retry_policy(), "my_properties", move || async move {
            let response = transport.send_authorized(store, transport.get(path)).await?;
            expect_body(&response, "Failed to fetch your properties")
        })
        .await
    }

    /// # Errors
    ///
    /// Returns `AuthError::Validation` for an invalid draft, otherwise as [`PropertyClient::mine`].
    pub async fn create(&self, draft: &PropertyDraft) -> AuthResult<Property> {
        draft.validate()?;
        let path = format!("{PROPERTIES_PATH}/developer");
        let (transport, store, path) = (&self.transport, &self.store, path.as_str());
        let property: Property = with_retry_unsent(transport.retry_policy(), "create_property", move || async move {
            let response = transport.send_authorized(store, transport.post(path).json(draft)).await?;
            expect_body(&response, "Failed to create property")
        })
        .await?;
        tracing::info!(property_id = property.id, "property created");
        Ok(property)
    }

    /// # Errors
    ///
    /// Returns `AuthError::Validation` for an invalid draft, otherwise as [`PropertyClient::mine`].
    pub async fn update(&self, id: u64, draft: &PropertyDraft) -> AuthResult<Property> {
        draft.validate()?;
        let path = format!("{PROPERTIES_PATH}/developer/{id}");
        let (transport, store, path) = (&self.transport, &self.store, path.as_str());
        with_retry(transport.retry_policy(), "update_property", move || async move {
            let response = transport.send_authorized(store, transport.put(path).json(draft)).await?;
            expect_body(&response, "Failed to update property")
        })
        .await
    }

    /// # Errors
    ///
    /// As [`PropertyClient::mine`].
    pub async fn delete(&self, id: u64) -> AuthResult<()> {
        let path = format!("{PROPERTIES_PATH}/developer/{id}");
        let (transport, store, path) = (&self.transport, &self.store, path.as_str());
        with_retry(transport.retry_policy(), "delete_property", move || async move {
            let response = transport.send_authorized(store, transport.delete(path)).await?;
            if !response.is_success() {
                return Err(classify_failure(&response, &["message", "error"], "Failed to delete property"));
            }
            Ok(())
        })
        .await?;
        tracing::info!(property_id = id, "property deleted");
        Ok(())
    }

    /// # Errors
    ///
    /// As [`PropertyClient::mine`].
    pub async fn mark_sold(&self, id: u64) -> AuthResult<Property> {
        let path = format!("{PROPERTIES_PATH}/developer/{id}/mark-sold");
        let (transport, store, path) = (&self.transport, &self.store, path.as_str());
        with_retry(transport.retry_policy(), "mark_property_sold", move || async move {
            let response = transport.send_authorized(store, transport.put(path)).await?;
            expect_body(&response, "Failed to mark property as sold")
        })
        .await
    }
}

fn expect_body<T: serde::de::DeserializeOwned>(response: &ApiResponse, fallback: &str) -> AuthResult<T> {
    if !response.is_success() {
        return Err(classify_failure(response, &["message", "error"], fallback));
    }
    parse_body(response)
}
