//! Lead-related API types

use leadflow_core::LeadStatus;
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::validation::{HasUpdates, ValidateNonEmpty};

/// Request to create a new lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateLeadRequest {
    /// Contact or company name
    pub name: String,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Pipeline status (defaults to `new`)
    pub status: Option<LeadStatus>,
    /// Where the lead came from (website, referral, ...)
    pub source: Option<String>,
    pub estimated_value: Option<f64>,
}

impl CreateLeadRequest {
    pub fn validate(&self) -> ApiResult<()> {
        self.name.validate_non_empty("name")?;
        validate_estimated_value(self.estimated_value)
    }
}

/// Request to update an existing lead. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UpdateLeadRequest {
    pub name: Option<String>,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: Option<LeadStatus>,
    pub source: Option<String>,
    pub estimated_value: Option<f64>,
}

impl UpdateLeadRequest {
    pub fn validate(&self) -> ApiResult<()> {
        self.validate_has_updates()?;
        if self.name.is_some() {
            self.name.validate_non_empty("name")?;
        }
        validate_estimated_value(self.estimated_value)
    }
}

impl HasUpdates for UpdateLeadRequest {
    fn has_any_updates(&self) -> bool {
        self.name.is_some()
            || self.company.is_some()
            || self.email.is_some()
            || self.phone.is_some()
            || self.status.is_some()
            || self.source.is_some()
            || self.estimated_value.is_some()
    }
}

fn validate_estimated_value(value: Option<f64>) -> ApiResult<()> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(crate::error::ApiError::invalid_range(
            "estimated_value",
            0,
            "infinito",
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadflow_test_utils::fixtures::create_lead_body;
    use leadflow_test_utils::generators::arb_lead_status;
    use proptest::prelude::*;

    #[test]
    fn test_create_lead_requires_name() {
        let req: CreateLeadRequest = serde_json::from_str(r#"{"name": "  "}"#).unwrap();
        assert!(req.validate().is_err());

        let req: CreateLeadRequest =
            serde_json::from_str(r#"{"name": "Acme", "status": "qualified"}"#).unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.status, Some(LeadStatus::Qualified));
    }

    #[test]
    fn test_negative_estimated_value_rejected() {
        let req = CreateLeadRequest {
            name: "Acme".to_string(),
            company: None,
            email: None,
            phone: None,
            status: None,
            source: None,
            estimated_value: Some(-10.0),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_empty_update_rejected() {
        assert!(UpdateLeadRequest::default().validate().is_err());
        let req = UpdateLeadRequest {
            phone: Some("+55 11 99999-0000".to_string()),
            ..Default::default()
        };
        assert!(req.validate().is_ok());
    }

    proptest! {
        #[test]
        fn prop_every_pipeline_status_is_accepted(status in arb_lead_status()) {
            let mut body = create_lead_body("Acme");
            body["status"] = serde_json::json!(status.as_db_str());
            let req: CreateLeadRequest = serde_json::from_value(body).unwrap();
            prop_assert!(req.validate().is_ok());
            prop_assert_eq!(req.status, Some(status));

            let update = UpdateLeadRequest {
                status: Some(status),
                ..Default::default()
            };
            prop_assert!(update.validate().is_ok());
        }
    }
}
