use anyhow::{anyhow, Context, Result};
use serde_json::{json, Value};
use timetable_render_core::config::RenderRequestConfig;
use timetable_render_core::{RenderData, RenderSource};

/// Fetches renders from the vendor's timetable viewer endpoint.
///
/// One blocking POST per week. No retries: a failed week fails the run.
pub struct HttpRenderSource {
    config: RenderRequestConfig,
    signature: String,
}

impl HttpRenderSource {
    pub fn new(config: RenderRequestConfig, signature: impl Into<String>) -> Self {
        Self {
            config,
            signature: signature.into(),
        }
    }

    /// JSON body of the render request for `week`
    pub fn request_body(&self, week: u32) -> Value {
        json!({
            "divWidth": self.config.div_width,
            "divHeight": self.config.div_height,
            "domain": self.config.domain,
            "headerEnabled": false,
            "selectedWeek": week,
            "selectedSchool": { "guid": self.config.school_guid },
            "selectedSignatures": { "signature": self.signature },
        })
    }
}

impl RenderSource for HttpRenderSource {
    fn fetch_week(&self, iso_year: i32, week: u32) -> Result<RenderData> {
        // The endpoint resolves the week within the current school year
        log::debug!(
            "POST {} for {iso_year}-W{week:02} ({})",
            self.config.url,
            self.config.domain
        );

        let response = ureq::post(&self.config.url)
            .set("Content-Type", "application/json; charset=UTF-8")
            .set("Accept", "application/json")
            .send_string(&self.request_body(week).to_string())
            .map_err(|e| match e {
                ureq::Error::Status(code, response) => anyhow!(
                    "Render request for week {week} failed: HTTP {code} {}",
                    response.status_text()
                ),
                other => anyhow!("Render request for week {week} failed: {other}"),
            })?;

        if response.status() != 200 {
            return Err(anyhow!(
                "Render request for week {week} failed: HTTP {} {}",
                response.status(),
                response.status_text()
            ));
        }

        let body = response
            .into_string()
            .with_context(|| format!("Failed to read render response for week {week}"))?;
        RenderData::from_json_str(&body)
            .with_context(|| format!("Unexpected render response for week {week}"))
    }

    fn name(&self) -> &str {
        "http"
    }
}
