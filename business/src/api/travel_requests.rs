//! Travel request operations: the submit/approve/book flow.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, FieldError};
use crate::gateway::ApiGateway;

/// Where a request stands in the approval flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    Booked,
}

/// A travel request as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelRequest {
    pub id: i64,
    pub employee_id: i64,
    pub employee_name: String,
    pub destination: String,
    pub depart_date: NaiveDate,
    pub return_date: NaiveDate,
    pub purpose: String,
    pub status: RequestStatus,
    pub estimated_cost: Option<f64>,
    pub ticket_reference: Option<String>,
}

/// A request as entered in the submit form, validated client-side before
/// anything touches the network.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelRequestDraft {
    pub destination: String,
    pub depart_date: Option<NaiveDate>,
    pub return_date: Option<NaiveDate>,
    pub purpose: String,
    pub estimated_cost: Option<f64>,
}

impl TravelRequestDraft {
    /// Form-schema validation. Failures surface inline per field and are
    /// never sent to the backend.
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut fields = Vec::new();

        if self.destination.trim().is_empty() {
            fields.push(FieldError::new("destination", "Destination is required"));
        }
        if self.purpose.trim().is_empty() {
            fields.push(FieldError::new("purpose", "Purpose is required"));
        }
        match (self.depart_date, self.return_date) {
            (None, _) => fields.push(FieldError::new("departDate", "Departure date is required")),
            (_, None) => fields.push(FieldError::new("returnDate", "Return date is required")),
            (Some(depart), Some(ret)) if ret < depart => {
                fields.push(FieldError::new(
                    "returnDate",
                    "Return date cannot be before departure",
                ));
            }
            _ => {}
        }
        if let Some(cost) = self.estimated_cost
            && cost < 0.0
        {
            fields.push(FieldError::new(
                "estimatedCost",
                "Estimated cost cannot be negative",
            ));
        }

        if fields.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation { fields })
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RejectRequest {
    reason: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BookRequest {
    ticket_reference: String,
}

/// All requests (manager/travel-admin view).
pub async fn list(gateway: &ApiGateway) -> Result<Vec<TravelRequest>, ApiError> {
    gateway.get_list("/TravelRequest").await
}

/// Requests belonging to one employee.
///
/// The backend answers 404 for employees with no requests yet; the gateway
/// whitelists this path shape, so new users see an empty dashboard rather
/// than an error banner.
pub async fn list_by_user(
    gateway: &ApiGateway,
    user_id: i64,
) -> Result<Vec<TravelRequest>, ApiError> {
    gateway.get_list(&format!("/TravelRequest/user/{user_id}")).await
}

/// Submit a new request. Validates the draft first; invalid drafts never
/// reach the network.
pub async fn submit(
    gateway: &ApiGateway,
    draft: &TravelRequestDraft,
) -> Result<TravelRequest, ApiError> {
    draft.validate()?;
    gateway.post("/TravelRequest", draft).await
}

/// Manager approval.
pub async fn approve(gateway: &ApiGateway, id: i64) -> Result<TravelRequest, ApiError> {
    gateway
        .put(&format!("/TravelRequest/{id}/approve"), &serde_json::json!({}))
        .await
}

/// Manager rejection, with a reason shown to the employee.
pub async fn reject(
    gateway: &ApiGateway,
    id: i64,
    reason: &str,
) -> Result<TravelRequest, ApiError> {
    gateway
        .put(
            &format!("/TravelRequest/{id}/reject"),
            &RejectRequest {
                reason: reason.to_string(),
            },
        )
        .await
}

/// Travel-admin booking, recording the ticket reference.
pub async fn book(
    gateway: &ApiGateway,
    id: i64,
    ticket_reference: &str,
) -> Result<TravelRequest, ApiError> {
    gateway
        .put(
            &format!("/TravelRequest/{id}/book"),
            &BookRequest {
                ticket_reference: ticket_reference.to_string(),
            },
        )
        .await
}
