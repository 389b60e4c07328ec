//! Address geocoding collaborator

use serde::Deserialize;
use std::time::Duration;

use crate::{
    config::GeocodingConfig,
    error::{AppError, AppResult},
    models::library::AddressInput,
};

/// Fallback coordinates used when no provider is configured (city center of
/// the pilot deployment).
const FALLBACK_LATITUDE: f64 = -23.5505;
const FALLBACK_LONGITUDE: f64 = -46.6333;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Deserialize)]
struct ProviderResult {
    lat: String,
    lon: String,
}

/// Black-box address resolver: returns coordinates or nothing.
///
/// `Ok(None)` means the address could not be located (caller decides how to
/// surface that); a provider or transport failure is an external-service
/// error.
#[derive(Clone)]
pub struct GeocodingService {
    config: GeocodingConfig,
    client: reqwest::Client,
}

impl GeocodingService {
    pub fn new(config: GeocodingConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub async fn resolve(&self, address: &AddressInput) -> AppResult<Option<Coordinates>> {
        if self.config.provider_url.is_empty() {
            tracing::warn!("No geocoding provider configured, using fallback coordinates");
            return Ok(Some(Coordinates {
                latitude: FALLBACK_LATITUDE,
                longitude: FALLBACK_LONGITUDE,
            }));
        }

        let query = format!(
            "{} {}, {}, {}, {}",
            address.street, address.number, address.city, address.state, address.zip_code
        );

        tracing::debug!(query, "resolving address");

        let response = self
            .client
            .get(&self.config.provider_url)
            .query(&[("q", query.as_str()), ("format", "json"), ("limit", "1")])
            .timeout(Duration::from_secs(self.config.timeout_seconds))
            .send()
            .await
            .map_err(|e| {
                AppError::ExternalService(format!("Geocoding provider unreachable: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(AppError::ExternalService(format!(
                "Geocoding provider returned status {}",
                response.status()
            )));
        }

        let results: Vec<ProviderResult> = response.json().await.map_err(|e| {
            AppError::ExternalService(format!("Invalid geocoding response: {}", e))
        })?;

        let Some(first) = results.first() else {
            tracing::debug!("address not found by geocoding provider");
            return Ok(None);
        };

        let latitude = first.lat.parse::<f64>();
        let longitude = first.lon.parse::<f64>();
        match (latitude, longitude) {
            (Ok(latitude), Ok(longitude)) => Ok(Some(Coordinates {
                latitude,
                longitude,
            })),
            _ => Err(AppError::ExternalService(
                "Geocoding provider returned unparseable coordinates".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address() -> AddressInput {
        AddressInput {
            zip_code: "01310-100".to_string(),
            street: "Avenida Paulista".to_string(),
            number: "1578".to_string(),
            complement: None,
            district: None,
            city: "São Paulo".to_string(),
            state: "SP".to_string(),
        }
    }

    #[tokio::test]
    async fn no_provider_falls_back_to_fixed_coordinates() {
        let service = GeocodingService::new(GeocodingConfig {
            provider_url: String::new(),
            timeout_seconds: 1,
        });

        let coords = service.resolve(&address()).await.unwrap().unwrap();
        assert_eq!(coords.latitude, FALLBACK_LATITUDE);
        assert_eq!(coords.longitude, FALLBACK_LONGITUDE);
    }

    #[tokio::test]
    async fn unreachable_provider_is_an_external_service_error() {
        let service = GeocodingService::new(GeocodingConfig {
            // Nothing listens here; reqwest fails fast on connection refused.
            provider_url: "http://127.0.0.1:9".to_string(),
            timeout_seconds: 1,
        });

        assert!(matches!(
            service.resolve(&address()).await,
            Err(AppError::ExternalService(_))
        ));
    }
}
