//! Typed form schemas and layout for the three report templates.
//!
//! Form data arrives as free JSON on the report row; rendering parses
//! it into the template's schema first so a malformed draft fails with
//! a clear validation error instead of a half-rendered document.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::warn;

use crate::core::error::{AppError, Result};
use crate::features::reports::models::ReportType;
use crate::modules::pdf::document::PdfBuilder;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmokeAlarmDetail {
    #[serde(default)]
    pub voltage: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub expiration: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectricalSmokeForm {
    pub property_address: String,
    pub report_date: String,
    #[serde(default)]
    pub electrical_safety_check: bool,
    #[serde(default)]
    pub smoke_safety_check: bool,
    #[serde(default)]
    pub installation_extent: BTreeMap<String, bool>,
    #[serde(default)]
    pub visual_inspection: BTreeMap<String, bool>,
    #[serde(default)]
    pub polarity_testing: BTreeMap<String, bool>,
    #[serde(default)]
    pub earth_continuity_testing: BTreeMap<String, bool>,
    #[serde(default)]
    pub rcd_testing_passed: bool,
    #[serde(default)]
    pub smoke_alarms_working: bool,
    #[serde(default)]
    pub next_smoke_alarm_check_date: String,
    #[serde(default)]
    pub smoke_alarm_details: Vec<SmokeAlarmDetail>,
    #[serde(default)]
    pub observation: String,
    #[serde(default)]
    pub recommendation: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub electrical_safety_check_completed_by: String,
    #[serde(default)]
    pub licence_number: String,
    #[serde(default)]
    pub inspection_date: String,
    #[serde(default)]
    pub next_inspection_due_date: String,
    #[serde(default)]
    pub signature_date: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasForm {
    pub property_address: String,
    pub report_date: String,
    #[serde(default)]
    pub gas_safety_check: bool,
    #[serde(default)]
    pub appliance_checks: BTreeMap<String, bool>,
    #[serde(default)]
    pub leak_test_passed: bool,
    #[serde(default)]
    pub carbon_monoxide_reading: Option<String>,
    #[serde(default)]
    pub observation: String,
    #[serde(default)]
    pub recommendation: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub gas_safety_check_completed_by: String,
    #[serde(default)]
    pub licence_number: String,
    #[serde(default)]
    pub inspection_date: String,
    #[serde(default)]
    pub next_inspection_due_date: String,
    #[serde(default)]
    pub signature_date: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmokeForm {
    pub property_address: String,
    pub report_date: String,
    #[serde(default)]
    pub smoke_safety_check: bool,
    #[serde(default)]
    pub smoke_alarms_working: bool,
    #[serde(default)]
    pub next_smoke_alarm_check_date: String,
    #[serde(default)]
    pub smoke_alarm_details: Vec<SmokeAlarmDetail>,
    #[serde(default)]
    pub observation: String,
    #[serde(default)]
    pub recommendation: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub smoke_safety_check_completed_by: String,
    #[serde(default)]
    pub inspection_date: String,
    #[serde(default)]
    pub next_inspection_due_date: String,
    #[serde(default)]
    pub signature_date: String,
}

/// Closed set of templates, dispatched by the report's type tag.
#[derive(Debug, Clone)]
pub enum ReportForm {
    ElectricalAndSmoke(Box<ElectricalSmokeForm>),
    Gas(Box<GasForm>),
    Smoke(Box<SmokeForm>),
}

impl ReportForm {
    pub fn parse(report_type: ReportType, form_data: &serde_json::Value) -> Result<Self> {
        let parsed = match report_type {
            ReportType::ElectricalAndSmoke => serde_json::from_value(form_data.clone())
                .map(|f| Self::ElectricalAndSmoke(Box::new(f))),
            ReportType::Gas => {
                serde_json::from_value(form_data.clone()).map(|f| Self::Gas(Box::new(f)))
            }
            ReportType::Smoke => {
                serde_json::from_value(form_data.clone()).map(|f| Self::Smoke(Box::new(f)))
            }
        };
        parsed.map_err(|err| {
            AppError::Validation(format!("Invalid form data for {} report: {}", report_type, err))
        })
    }

    pub fn property_address(&self) -> &str {
        match self {
            Self::ElectricalAndSmoke(f) => &f.property_address,
            Self::Gas(f) => &f.property_address,
            Self::Smoke(f) => &f.property_address,
        }
    }

    fn images(&self) -> &[String] {
        match self {
            Self::ElectricalAndSmoke(f) => &f.images,
            Self::Gas(f) => &f.images,
            Self::Smoke(f) => &f.images,
        }
    }

    fn layout(&self, builder: &mut PdfBuilder) {
        match self {
            Self::ElectricalAndSmoke(form) => layout_electrical_smoke(builder, form),
            Self::Gas(form) => layout_gas(builder, form),
            Self::Smoke(form) => layout_smoke(builder, form),
        }
    }
}

/// Renders a report form into PDF bytes. Referenced images are checked
/// over HTTP so broken links surface in the finished document instead
/// of silently vanishing.
pub struct ReportRenderer {
    http: reqwest::Client,
}

impl Default for ReportRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportRenderer {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    pub async fn render(
        &self,
        report_type: ReportType,
        form_data: &serde_json::Value,
    ) -> Result<Vec<u8>> {
        let form = ReportForm::parse(report_type, form_data)?;

        let mut builder = PdfBuilder::new();
        form.layout(&mut builder);

        if !form.images().is_empty() {
            builder.section("Attachments");
            for (idx, url) in form.images().iter().enumerate() {
                match self.probe_image(url).await {
                    Ok(size) => {
                        builder.labeled(&format!("Image {}", idx + 1), &format!("{} ({} bytes)", url, size));
                    }
                    Err(err) => {
                        warn!(url = %url, error = %err, "report image unavailable");
                        builder.labeled(&format!("Image {}", idx + 1), &format!("{} (unavailable)", url));
                    }
                }
            }
        }

        Ok(builder.build())
    }

    async fn probe_image(&self, url: &str) -> std::result::Result<usize, reqwest::Error> {
        let body = self.http.get(url).send().await?.error_for_status()?.bytes().await?;
        Ok(body.len())
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

fn checklist(builder: &mut PdfBuilder, title: &str, items: &BTreeMap<String, bool>) {
    if items.is_empty() {
        return;
    }
    builder.section(title);
    for (name, checked) in items {
        builder.labeled(name, yes_no(*checked));
    }
}

fn alarm_table(builder: &mut PdfBuilder, details: &[SmokeAlarmDetail]) {
    if details.is_empty() {
        return;
    }
    builder.section("Smoke Alarm Details");
    for (idx, alarm) in details.iter().enumerate() {
        builder.text(&format!(
            "{}. Location: {} | Level: {} | Voltage: {} | Status: {} | Expires: {}",
            idx + 1,
            alarm.location,
            alarm.level,
            alarm.voltage,
            alarm.status,
            alarm.expiration
        ));
    }
}

fn notes(builder: &mut PdfBuilder, observation: &str, recommendation: &str) {
    if !observation.is_empty() {
        builder.section("Observation");
        builder.text(observation);
    }
    if !recommendation.is_empty() {
        builder.section("Recommendation");
        builder.text(recommendation);
    }
}

fn layout_electrical_smoke(builder: &mut PdfBuilder, form: &ElectricalSmokeForm) {
    builder
        .heading("Electrical & Smoke Safety Report")
        .spacer()
        .labeled("Property Address", &form.property_address)
        .labeled("Report Date", &form.report_date)
        .labeled("Electrical Safety Check", yes_no(form.electrical_safety_check))
        .labeled("Smoke Safety Check", yes_no(form.smoke_safety_check));

    checklist(builder, "Extent of Installation", &form.installation_extent);
    checklist(builder, "Visual Inspection", &form.visual_inspection);
    checklist(builder, "Polarity Testing", &form.polarity_testing);
    checklist(builder, "Earth Continuity Testing", &form.earth_continuity_testing);

    builder
        .section("Testing Results")
        .labeled("RCD Testing Passed", yes_no(form.rcd_testing_passed))
        .labeled("Smoke Alarms Working", yes_no(form.smoke_alarms_working))
        .labeled("Next Smoke Alarm Check", &form.next_smoke_alarm_check_date);

    alarm_table(builder, &form.smoke_alarm_details);
    notes(builder, &form.observation, &form.recommendation);

    builder
        .section("Sign-off")
        .labeled("Completed By", &form.electrical_safety_check_completed_by)
        .labeled("Licence Number", &form.licence_number)
        .labeled("Inspection Date", &form.inspection_date)
        .labeled("Next Inspection Due", &form.next_inspection_due_date)
        .labeled("Signature Date", &form.signature_date);
}

fn layout_gas(builder: &mut PdfBuilder, form: &GasForm) {
    builder
        .heading("Gas Safety Report")
        .spacer()
        .labeled("Property Address", &form.property_address)
        .labeled("Report Date", &form.report_date)
        .labeled("Gas Safety Check", yes_no(form.gas_safety_check));

    checklist(builder, "Appliance Checks", &form.appliance_checks);

    builder
        .section("Testing Results")
        .labeled("Leak Test Passed", yes_no(form.leak_test_passed));
    if let Some(reading) = &form.carbon_monoxide_reading {
        builder.labeled("Carbon Monoxide Reading", reading);
    }

    notes(builder, &form.observation, &form.recommendation);

    builder
        .section("Sign-off")
        .labeled("Completed By", &form.gas_safety_check_completed_by)
        .labeled("Licence Number", &form.licence_number)
        .labeled("Inspection Date", &form.inspection_date)
        .labeled("Next Inspection Due", &form.next_inspection_due_date)
        .labeled("Signature Date", &form.signature_date);
}

fn layout_smoke(builder: &mut PdfBuilder, form: &SmokeForm) {
    builder
        .heading("Smoke Safety Report")
        .spacer()
        .labeled("Property Address", &form.property_address)
        .labeled("Report Date", &form.report_date)
        .labeled("Smoke Safety Check", yes_no(form.smoke_safety_check))
        .labeled("Smoke Alarms Working", yes_no(form.smoke_alarms_working))
        .labeled("Next Smoke Alarm Check", &form.next_smoke_alarm_check_date);

    alarm_table(builder, &form.smoke_alarm_details);
    notes(builder, &form.observation, &form.recommendation);

    builder
        .section("Sign-off")
        .labeled("Completed By", &form.smoke_safety_check_completed_by)
        .labeled("Inspection Date", &form.inspection_date)
        .labeled("Next Inspection Due", &form.next_inspection_due_date)
        .labeled("Signature Date", &form.signature_date);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_electrical_smoke_form_with_camel_case_keys() {
        let value = json!({
            "propertyAddress": "12 Flinders Ln, Melbourne",
            "reportDate": "2025-02-01",
            "electricalSafetyCheck": true,
            "installationExtent": {"Main switchboard": true},
            "smokeAlarmDetails": [
                {"voltage": "9V", "status": "OK", "location": "Hallway", "level": "Ground", "expiration": "2032-01"}
            ],
            "images": []
        });
        let form = ReportForm::parse(ReportType::ElectricalAndSmoke, &value).unwrap();
        assert_eq!(form.property_address(), "12 Flinders Ln, Melbourne");
        match form {
            ReportForm::ElectricalAndSmoke(f) => {
                assert!(f.electrical_safety_check);
                assert_eq!(f.smoke_alarm_details.len(), 1);
                assert_eq!(f.smoke_alarm_details[0].location, "Hallway");
            }
            other => panic!("wrong variant: {:?}", other),
        }
    }

    #[test]
    fn missing_required_fields_fail_validation() {
        let value = json!({"reportDate": "2025-02-01"});
        let err = ReportForm::parse(ReportType::Gas, &value).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn renders_smoke_report_to_pdf_bytes() {
        let value = json!({
            "propertyAddress": "3/55 Collins St",
            "reportDate": "2025-03-10",
            "smokeSafetyCheck": true,
            "smokeAlarmsWorking": true,
            "observation": "All alarms within expiry."
        });
        let renderer = ReportRenderer::new();
        let bytes = tokio_test::block_on(renderer.render(ReportType::Smoke, &value)).unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.starts_with("%PDF-1.4"));
        assert!(text.contains("3/55 Collins St"));
        assert!(text.contains("Smoke Safety Report"));
    }
}
