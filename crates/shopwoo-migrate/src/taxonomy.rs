//! Category, tag, and brand terms: find by name or create.

use std::fmt;

use serde_json::Value;
use shopwoo_woo::{id_of, ApiResponse, TermRef, WooClient};

use crate::error::TaxonomyError;

/// Error code the store returns when creating a term whose name is taken.
const TERM_EXISTS: &str = "term_exists";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxonomyKind {
    Category,
    Tag,
    /// Requires a brands plugin; stores without one answer 404.
    Brand,
}

impl TaxonomyKind {
    #[must_use]
    pub fn endpoint(self) -> &'static str {
        match self {
            Self::Category => "products/categories",
            Self::Tag => "products/tags",
            Self::Brand => "products/brands",
        }
    }
}

impl fmt::Display for TaxonomyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Category => "category",
            Self::Tag => "tag",
            Self::Brand => "brand",
        })
    }
}

/// How a product's vendor ended up attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VendorResolution {
    /// Attached as a brand term.
    Brand(TermRef),
    /// Brand endpoint failed; the vendor was merged into the tag list.
    TagFallback,
    /// No vendor, or neither brand nor tag could be resolved.
    Unresolved,
}

pub struct TaxonomyResolver<'a> {
    client: &'a WooClient,
}

impl<'a> TaxonomyResolver<'a> {
    #[must_use]
    pub fn new(client: &'a WooClient) -> Self {
        Self { client }
    }

    /// Resolves every name to a term id, creating missing terms.
    ///
    /// Names are trimmed and de-duplicated case-insensitively (first spelling
    /// wins). A name that cannot be resolved is logged and left out; the
    /// result never contains the same id twice.
    pub async fn ensure(&self, kind: TaxonomyKind, names: &[String]) -> Vec<TermRef> {
        let mut seen: Vec<String> = Vec::new();
        let mut terms: Vec<TermRef> = Vec::new();

        for name in names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
            let folded = name.to_lowercase();
            if seen.contains(&folded) {
                continue;
            }
            seen.push(folded);

            match self.find_or_create(kind, name).await {
                Ok(term) if !terms.contains(&term) => terms.push(term),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(
                        kind = %kind,
                        name,
                        error = %e,
                        "could not resolve term, skipping"
                    );
                }
            }
        }
        terms
    }

    /// Attaches `vendor` as a brand, falling back to a tag merged into
    /// `tags` when the brand endpoint fails for any reason.
    pub async fn resolve_vendor(
        &self,
        vendor: Option<&str>,
        tags: &mut Vec<TermRef>,
    ) -> VendorResolution {
        let Some(vendor) = vendor.map(str::trim).filter(|v| !v.is_empty()) else {
            return VendorResolution::Unresolved;
        };

        match self.find_or_create(TaxonomyKind::Brand, vendor).await {
            Ok(term) => return VendorResolution::Brand(term),
            Err(e) => {
                tracing::warn!(vendor, error = %e, "brand sync failed, falling back to tag");
            }
        }

        let fallback = self.ensure(TaxonomyKind::Tag, &[vendor.to_owned()]).await;
        if fallback.is_empty() {
            return VendorResolution::Unresolved;
        }
        for term in fallback {
            if !tags.contains(&term) {
                tags.push(term);
            }
        }
        VendorResolution::TagFallback
    }

    /// Searches for a term named `name` (case-insensitive exact match) and
    /// creates it when absent.
    ///
    /// # Errors
    ///
    /// - [`TaxonomyError::Woo`] on transport failure.
    /// - [`TaxonomyError::Rejected`] when the create is refused for a reason
    ///   other than the term already existing.
    /// - [`TaxonomyError::MissingId`] when the store answers without an id.
    pub async fn find_or_create(
        &self,
        kind: TaxonomyKind,
        name: &str,
    ) -> Result<TermRef, TaxonomyError> {
        let search = self
            .client
            .get(kind.endpoint(), &[("search", name), ("per_page", "100")])
            .await?;
        if search.is_success() {
            if let Some(found) = matching_term(&search.body, name) {
                return found.ok_or_else(|| missing_id(kind, name));
            }
        } else {
            tracing::debug!(
                kind = %kind,
                name,
                status = search.status,
                "term search failed, trying create"
            );
        }

        let created = self
            .client
            .post(kind.endpoint(), &serde_json::json!({ "name": name }))
            .await?;
        if created.is_success() {
            tracing::info!(kind = %kind, name, "created term");
            return created
                .id()
                .map(|id| TermRef { id })
                .ok_or_else(|| missing_id(kind, name));
        }
        if let Some(id) = existing_term_id(&created) {
            return Ok(TermRef { id });
        }
        Err(TaxonomyError::Rejected {
            kind,
            name: name.to_owned(),
            status: created.status,
            message: created.describe(),
        })
    }
}

/// Picks the term named `name` out of a search result.
///
/// `None` means no match; `Some(None)` a match without a usable id.
fn matching_term(body: &Value, name: &str) -> Option<Option<TermRef>> {
    let wanted = name.trim().to_lowercase();
    let term = match body {
        Value::Array(items) => items.iter().find(|item| {
            item.get("name")
                .and_then(Value::as_str)
                .is_some_and(|n| n.trim().to_lowercase() == wanted)
        })?,
        Value::Object(_) if body.get("id").is_some() => body,
        _ => return None,
    };
    Some(term.get("id").and_then(id_of).map(|id| TermRef { id }))
}

/// `data.resource_id` of a `term_exists` rejection.
fn existing_term_id(response: &ApiResponse) -> Option<i64> {
    if response.error_code() != Some(TERM_EXISTS) {
        return None;
    }
    response
        .body
        .get("data")
        .and_then(|data| data.get("resource_id"))
        .and_then(id_of)
}

fn missing_id(kind: TaxonomyKind, name: &str) -> TaxonomyError {
    TaxonomyError::MissingId {
        kind,
        name: name.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn matching_term_is_case_insensitive_and_exact() {
        let body = json!([
            {"id": 1, "name": "Shirts & Tops"},
            {"id": 2, "name": "shirts"}
        ]);
        assert_eq!(
            matching_term(&body, "Shirts"),
            Some(Some(TermRef { id: 2 }))
        );
        assert_eq!(matching_term(&body, "Shirt"), None);
    }

    #[test]
    fn matching_term_accepts_single_object_and_string_id() {
        assert_eq!(
            matching_term(&json!({"id": "9", "name": "Other"}), "Acme"),
            Some(Some(TermRef { id: 9 }))
        );
        assert_eq!(
            matching_term(&json!([{"id": "abc", "name": "Acme"}]), "Acme"),
            Some(None)
        );
        assert_eq!(matching_term(&json!({"code": "x"}), "Acme"), None);
    }

    #[test]
    fn existing_term_id_reads_resource_id() {
        let response = ApiResponse::from_text(
            400,
            r#"{"code":"term_exists","message":"A term with the name provided already exists.","data":{"status":400,"resource_id":31}}"#,
        );
        assert_eq!(existing_term_id(&response), Some(31));

        let other = ApiResponse::from_text(400, r#"{"code":"rest_invalid_param"}"#);
        assert_eq!(existing_term_id(&other), None);
    }

    #[test]
    fn endpoints_and_labels() {
        assert_eq!(TaxonomyKind::Category.endpoint(), "products/categories");
        assert_eq!(TaxonomyKind::Brand.endpoint(), "products/brands");
        assert_eq!(TaxonomyKind::Tag.to_string(), "tag");
    }
}
