use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::validation::{self, FieldErrors, Presence, TextRule};

const NAME_MAX: usize = 255;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: i64,
    pub owner: i64,
    pub name: String,
    pub duration_minutes: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewService {
    pub name: String,
    pub duration_minutes: i64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServicePatch {
    pub name: Option<String>,
    pub duration_minutes: Option<i64>,
}

fn parse_fields(
    body: &Value,
    presence: Presence,
) -> Result<(Option<String>, Option<i64>), FieldErrors> {
    let obj = validation::object(body)?;
    let mut errors = FieldErrors::new();

    // "owner" and "id" are read-only and ignored when supplied.
    let name = validation::text(obj, "name", presence, TextRule::bounded(NAME_MAX), &mut errors);
    let duration_minutes =
        validation::positive_int(obj, "duration_minutes", presence, &mut errors);

    if errors.is_empty() {
        Ok((name, duration_minutes))
    } else {
        Err(errors)
    }
}

impl NewService {
    pub fn from_json(body: &Value) -> Result<Self, FieldErrors> {
        match parse_fields(body, Presence::Required)? {
            (Some(name), Some(duration_minutes)) => Ok(NewService {
                name,
                duration_minutes,
            }),
            _ => Err(FieldErrors::single(
                "non_field_errors",
                validation::REQUIRED,
            )),
        }
    }
}

impl ServicePatch {
    pub fn from_json(body: &Value) -> Result<Self, FieldErrors> {
        let (name, duration_minutes) = parse_fields(body, Presence::Optional)?;
        Ok(ServicePatch {
            name,
            duration_minutes,
        })
    }

    pub fn apply(self, service: &mut Service) {
        if let Some(name) = self.name {
            service.name = name;
        }
        if let Some(minutes) = self.duration_minutes {
            service.duration_minutes = minutes;
        }
    }
}

impl From<NewService> for ServicePatch {
    fn from(new: NewService) -> Self {
        ServicePatch {
            name: Some(new.name),
            duration_minutes: Some(new.duration_minutes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_service_ignores_client_owner() {
        let new = NewService::from_json(&json!({
            "name": "Water Heater Install",
            "duration_minutes": 150,
            "owner": 99
        }))
        .unwrap();
        assert_eq!(new.name, "Water Heater Install");
        assert_eq!(new.duration_minutes, 150);
    }

    #[test]
    fn test_new_service_requires_positive_duration() {
        let errors = NewService::from_json(&json!({"name": "Plumbing", "duration_minutes": 0}))
            .unwrap_err();
        assert!(errors.contains("duration_minutes"));

        let errors = NewService::from_json(&json!({"name": "Plumbing", "duration_minutes": -5}))
            .unwrap_err();
        assert!(errors.contains("duration_minutes"));
    }

    #[test]
    fn test_new_service_missing_fields() {
        let errors = NewService::from_json(&json!({})).unwrap_err();
        assert!(errors.contains("name"));
        assert!(errors.contains("duration_minutes"));
    }

    #[test]
    fn test_patch_applies_subset() {
        let mut service = Service {
            id: 1,
            owner: 7,
            name: "Old Name".to_string(),
            duration_minutes: 60,
        };
        ServicePatch::from_json(&json!({"duration_minutes": 45}))
            .unwrap()
            .apply(&mut service);
        assert_eq!(service.name, "Old Name");
        assert_eq!(service.duration_minutes, 45);
        assert_eq!(service.owner, 7);
    }
}
