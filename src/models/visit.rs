use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::validation::{self, FieldErrors, Presence, TextRule};

const NAME_MAX: usize = 255;
const PHONE_MAX: usize = 20;

/// Appointments and jobs share one shape but live in separate tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitKind {
    Appointment,
    Job,
}

impl VisitKind {
    pub fn table(&self) -> &'static str {
        match self {
            VisitKind::Appointment => "appointments",
            VisitKind::Job => "jobs",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            VisitKind::Appointment => "Appointment",
            VisitKind::Job => "Job",
        }
    }

    pub fn not_found(&self) -> String {
        format!("{} not found", self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    pub id: i64,
    pub customer_name: String,
    pub customer_phone: String,
    pub address: String,
    pub description: String,
    pub scheduled_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewVisit {
    pub customer_name: String,
    pub customer_phone: String,
    pub address: String,
    pub description: Option<String>,
    pub scheduled_time: DateTime<Utc>,
}

impl NewVisit {
    /// Validates a full field set; `description` stays optional.
    pub fn from_json(body: &Value) -> Result<Self, FieldErrors> {
        let obj = validation::object(body)?;
        let mut errors = FieldErrors::new();

        let customer_name = validation::text(
            obj,
            "customer_name",
            Presence::Required,
            TextRule::bounded(NAME_MAX),
            &mut errors,
        );
        let customer_phone = validation::text(
            obj,
            "customer_phone",
            Presence::Required,
            TextRule::bounded(PHONE_MAX),
            &mut errors,
        );
        let address = validation::text(
            obj,
            "address",
            Presence::Required,
            TextRule::unbounded(),
            &mut errors,
        );
        let description = validation::text(
            obj,
            "description",
            Presence::Optional,
            TextRule::blank_ok(),
            &mut errors,
        );
        let scheduled_time =
            validation::datetime(obj, "scheduled_time", Presence::Required, &mut errors);

        match (customer_name, customer_phone, address, scheduled_time) {
            (Some(customer_name), Some(customer_phone), Some(address), Some(scheduled_time))
                if errors.is_empty() =>
            {
                Ok(NewVisit {
                    customer_name,
                    customer_phone,
                    address,
                    description,
                    scheduled_time,
                })
            }
            _ => Err(errors),
        }
    }
}

/// Field changes for an existing visit; `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisitPatch {
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub scheduled_time: Option<DateTime<Utc>>,
}

impl VisitPatch {
    pub fn from_json(body: &Value) -> Result<Self, FieldErrors> {
        let obj = validation::object(body)?;
        let mut errors = FieldErrors::new();

        let patch = VisitPatch {
            customer_name: validation::text(
                obj,
                "customer_name",
                Presence::Optional,
                TextRule::bounded(NAME_MAX),
                &mut errors,
            ),
            customer_phone: validation::text(
                obj,
                "customer_phone",
                Presence::Optional,
                TextRule::bounded(PHONE_MAX),
                &mut errors,
            ),
            address: validation::text(
                obj,
                "address",
                Presence::Optional,
                TextRule::unbounded(),
                &mut errors,
            ),
            description: validation::text(
                obj,
                "description",
                Presence::Optional,
                TextRule::blank_ok(),
                &mut errors,
            ),
            scheduled_time: validation::datetime(
                obj,
                "scheduled_time",
                Presence::Optional,
                &mut errors,
            ),
        };

        if errors.is_empty() {
            Ok(patch)
        } else {
            Err(errors)
        }
    }

    pub fn apply(self, visit: &mut Visit) {
        if let Some(v) = self.customer_name {
            visit.customer_name = v;
        }
        if let Some(v) = self.customer_phone {
            visit.customer_phone = v;
        }
        if let Some(v) = self.address {
            visit.address = v;
        }
        if let Some(v) = self.description {
            visit.description = v;
        }
        if let Some(v) = self.scheduled_time {
            visit.scheduled_time = v;
        }
    }
}

impl From<NewVisit> for VisitPatch {
    fn from(new: NewVisit) -> Self {
        VisitPatch {
            customer_name: Some(new.customer_name),
            customer_phone: Some(new.customer_phone),
            address: Some(new.address),
            description: new.description,
            scheduled_time: Some(new.scheduled_time),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Visit {
        Visit {
            id: 1,
            customer_name: "Dana".to_string(),
            customer_phone: "111-222-3333".to_string(),
            address: "400 Oak St".to_string(),
            description: "Install new faucet".to_string(),
            scheduled_time: "2025-06-04T09:00:00Z".parse().unwrap(),
            created_at: "2025-06-01T00:00:00Z".parse().unwrap(),
        }
    }

    #[test]
    fn test_new_visit_reports_every_missing_field() {
        let errors = NewVisit::from_json(&json!({})).unwrap_err();
        for field in ["customer_name", "customer_phone", "address", "scheduled_time"] {
            assert!(errors.contains(field), "missing error for {field}");
        }
        assert!(!errors.contains("description"));
    }

    #[test]
    fn test_new_visit_description_is_optional() {
        let new = NewVisit::from_json(&json!({
            "customer_name": "John Doe",
            "customer_phone": "555-1234",
            "address": "123 Main St",
            "scheduled_time": "2025-06-01T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(new.description, None);
        assert_eq!(new.customer_name, "John Doe");
    }

    #[test]
    fn test_new_visit_rejects_bad_datetime() {
        let errors = NewVisit::from_json(&json!({
            "customer_name": "John Doe",
            "customer_phone": "555-1234",
            "address": "123 Main St",
            "scheduled_time": "tomorrow"
        }))
        .unwrap_err();
        assert!(errors.contains("scheduled_time"));
        assert!(!errors.contains("customer_name"));
    }

    #[test]
    fn test_patch_touches_only_supplied_fields() {
        let mut visit = sample();
        let patch = VisitPatch::from_json(&json!({"description": "Replace faucet"})).unwrap();
        patch.apply(&mut visit);
        assert_eq!(visit.description, "Replace faucet");
        assert_eq!(visit.customer_name, "Dana");
        assert_eq!(visit.address, "400 Oak St");
    }

    #[test]
    fn test_patch_still_validates_supplied_fields() {
        let errors = VisitPatch::from_json(&json!({"customer_name": ""})).unwrap_err();
        assert!(errors.contains("customer_name"));
    }

    #[test]
    fn test_full_update_keeps_description_when_omitted() {
        let mut visit = sample();
        let new = NewVisit::from_json(&json!({
            "customer_name": "Dana Updated",
            "customer_phone": "444-555-6666",
            "address": "500 Elm St",
            "scheduled_time": "2025-06-05T10:00:00Z"
        }))
        .unwrap();
        VisitPatch::from(new).apply(&mut visit);
        assert_eq!(visit.customer_name, "Dana Updated");
        assert_eq!(visit.description, "Install new faucet");
        assert_eq!(visit.id, 1);
    }

    #[test]
    fn test_visit_serializes_utc_with_z_suffix() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["scheduled_time"], "2025-06-04T09:00:00Z");
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(VisitKind::Appointment.not_found(), "Appointment not found");
        assert_eq!(VisitKind::Job.not_found(), "Job not found");
        assert_eq!(VisitKind::Job.table(), "jobs");
    }
}
