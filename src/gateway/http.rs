use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::actuators::{LedColor, SoundCue};
use crate::config::KioskConfig;
use crate::models::{NewMeasurement, NewPlate, NewProfile, Plate, Profile};

use super::types::{HealthStatus, PlateList, ProfileList, ScanCompletePayload, WeightReading};
use super::{DeviceBackend, GatewayError};

/// Typed request/response wrapper over the device backend's HTTP API.
///
/// Every call carries a bounded timeout: 60s for capture/analyze (inference
/// is slow), 10s for everything else. Failures come back as a classified
/// [`GatewayError`], never a raw transport error. No retry logic lives here.
pub struct HttpDeviceGateway {
    http: Client,
    base_url: String,
    control_timeout: Duration,
    inference_timeout: Duration,
}

impl HttpDeviceGateway {
    pub fn new(config: &KioskConfig) -> Result<Self> {
        let http = Client::builder()
            .build()
            .context("failed to build backend HTTP client")?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            control_timeout: config.control_timeout,
            inference_timeout: config.inference_timeout,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        timeout: Duration,
    ) -> Result<T, GatewayError> {
        let response = self
            .http
            .get(self.url(path))
            .timeout(timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::from_status(status));
        }

        response
            .json::<T>()
            .await
            .map_err(|err| GatewayError::Unexpected(format!("malformed response: {err}")))
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        timeout: Duration,
    ) -> Result<T, GatewayError> {
        let response = self
            .http
            .post(self.url(path))
            .json(body)
            .timeout(timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::from_status(status));
        }

        response
            .json::<T>()
            .await
            .map_err(|err| GatewayError::Unexpected(format!("malformed response: {err}")))
    }

    /// POST with no meaningful response body (actuators, tare).
    async fn post_empty(&self, path: &str) -> Result<(), GatewayError> {
        let response = self
            .http
            .post(self.url(path))
            .timeout(self.control_timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::from_status(status));
        }
        Ok(())
    }

    pub async fn health(&self) -> Result<HealthStatus, GatewayError> {
        self.get_json("/api/health", self.control_timeout).await
    }

    /// Zero the scale with whatever currently sits on it.
    pub async fn tare_scale(&self) -> Result<(), GatewayError> {
        self.post_empty("/api/scale/tare").await
    }

    pub async fn list_profiles(&self) -> Result<Vec<Profile>, GatewayError> {
        let list: ProfileList = self.get_json("/api/profiles", self.control_timeout).await?;
        Ok(list.profiles)
    }

    pub async fn create_profile(&self, profile: &NewProfile) -> Result<Profile, GatewayError> {
        self.post_json("/api/profiles", profile, self.control_timeout)
            .await
    }

    pub async fn update_profile(
        &self,
        profile_id: i64,
        profile: &NewProfile,
    ) -> Result<(), GatewayError> {
        let response = self
            .http
            .put(self.url(&format!("/api/profiles/{profile_id}")))
            .json(profile)
            .timeout(self.control_timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::from_status(status));
        }
        Ok(())
    }

    pub async fn delete_profile(&self, profile_id: i64) -> Result<(), GatewayError> {
        let response = self
            .http
            .delete(self.url(&format!("/api/profiles/{profile_id}")))
            .timeout(self.control_timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::from_status(status));
        }
        Ok(())
    }

    pub async fn list_plates(&self) -> Result<Vec<Plate>, GatewayError> {
        let list: PlateList = self.get_json("/api/plates", self.control_timeout).await?;
        Ok(list.plates)
    }

    pub async fn create_plate(&self, plate: &NewPlate) -> Result<Plate, GatewayError> {
        self.post_json("/api/plates", plate, self.control_timeout)
            .await
    }

    pub async fn delete_plate(&self, plate_id: i64) -> Result<(), GatewayError> {
        let response = self
            .http
            .delete(self.url(&format!("/api/plates/{plate_id}")))
            .timeout(self.control_timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::from_status(status));
        }
        Ok(())
    }
}

#[async_trait]
impl DeviceBackend for HttpDeviceGateway {
    async fn fetch_weight(&self) -> Result<f64, GatewayError> {
        let reading: WeightReading = self
            .get_json("/api/scale/weight", self.control_timeout)
            .await?;
        Ok(reading.weight)
    }

    async fn capture_image(&self) -> Result<Vec<u8>, GatewayError> {
        let response = self
            .http
            .get(self.url("/api/camera/capture"))
            .timeout(self.inference_timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::from_status(status));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|err| GatewayError::Unexpected(format!("image body read failed: {err}")))?;
        debug!("captured image: {} bytes", bytes.len());
        Ok(bytes.to_vec())
    }

    async fn scan_complete(
        &self,
        plate_id: Option<i64>,
    ) -> Result<ScanCompletePayload, GatewayError> {
        let body = serde_json::json!({ "plate_id": plate_id });
        self.post_json("/api/scan-complete", &body, self.inference_timeout)
            .await
    }

    async fn save_measurement(&self, measurement: &NewMeasurement) -> Result<(), GatewayError> {
        let _: serde_json::Value = self
            .post_json("/api/measurements", measurement, self.control_timeout)
            .await?;
        Ok(())
    }

    async fn set_led(&self, color: LedColor) -> Result<(), GatewayError> {
        self.post_empty(&format!("/api/led/{}", color.as_str())).await
    }

    async fn play_sound(&self, cue: SoundCue) -> Result<(), GatewayError> {
        self.post_empty(&format!("/api/speaker/{}", cue.as_str()))
            .await
    }
}
