//! User, department, and project lookups for the admin screens.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::gateway::ApiGateway;
use crate::vault::Role;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub display_name: Option<String>,
    pub role: Role,
    pub department_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: i64,
    pub name: String,
    pub manager_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub active: bool,
}

pub async fn list_users(gateway: &ApiGateway) -> Result<Vec<User>, ApiError> {
    gateway.get_list("/User").await
}

pub async fn get_user(gateway: &ApiGateway, id: i64) -> Result<User, ApiError> {
    gateway.get(&format!("/User/{id}")).await
}

pub async fn list_departments(gateway: &ApiGateway) -> Result<Vec<Department>, ApiError> {
    gateway.get_list("/Department").await
}

/// Single department lookup. Unlike the per-user request listing, a 404
/// here is a real error; departments are seeded data and are expected to
/// exist.
pub async fn get_department(gateway: &ApiGateway, id: i64) -> Result<Department, ApiError> {
    gateway.get(&format!("/Department/{id}")).await
}

pub async fn list_projects(gateway: &ApiGateway) -> Result<Vec<Project>, ApiError> {
    gateway.get_list("/Project").await
}

pub async fn get_project(gateway: &ApiGateway, id: i64) -> Result<Project, ApiError> {
    gateway.get(&format!("/Project/{id}")).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_deserializes_from_wire_casing() {
        let json = serde_json::json!({
            "id": 12,
            "username": "kadams",
            "displayName": "Kai Adams",
            "role": "travelAdmin",
            "departmentId": 3
        });

        let user: User = serde_json::from_value(json).expect("deserialize");
        assert_eq!(user.role, Role::TravelAdmin);
        assert_eq!(user.department_id, Some(3));
    }

    #[test]
    fn test_project_round_trip() {
        let project = Project {
            id: 8,
            code: "TRV-OPS".to_string(),
            name: "Travel Ops".to_string(),
            active: true,
        };

        let json = serde_json::to_value(&project).expect("serialize");
        assert_eq!(json["code"], "TRV-OPS");

        let back: Project = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, project);
    }
}
