use crate::models::GeoLocation;
use crate::traits::LocationProvider;
use crate::SearchError;

pub const CURRENT_LOCATION_QUERY: &str = "Minha localização atual";
pub const LOCATION_UNSUPPORTED_MESSAGE: &str = "Geolocalização não é suportada neste ambiente.";
pub const LOCATION_FAILED_MESSAGE: &str =
    "Não foi possível obter sua localização. Por favor, digite o endereço.";

pub const LATITUDE_VAR: &str = "LOCALFINDER_LATITUDE";
pub const LONGITUDE_VAR: &str = "LOCALFINDER_LONGITUDE";

#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub GeoLocation);

impl LocationProvider for FixedLocation {
    fn current_location(&self) -> Result<GeoLocation, SearchError> {
        checked(self.0)
    }
}

/// Device location published through `LOCALFINDER_LATITUDE` / `LOCALFINDER_LONGITUDE`.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvLocation;

impl LocationProvider for EnvLocation {
    fn current_location(&self) -> Result<GeoLocation, SearchError> {
        location_from_lookup(|name| std::env::var(name).ok())
    }
}

pub fn location_from_lookup<F>(lookup: F) -> Result<GeoLocation, SearchError>
where
    F: Fn(&str) -> Option<String>,
{
    let latitude = lookup(LATITUDE_VAR);
    let longitude = lookup(LONGITUDE_VAR);

    let (latitude, longitude) = match (latitude, longitude) {
        (None, None) => {
            return Err(SearchError::GeolocationUnavailable(
                LOCATION_UNSUPPORTED_MESSAGE.to_string(),
            ))
        }
        (Some(latitude), Some(longitude)) => (latitude, longitude),
        _ => {
            return Err(SearchError::GeolocationUnavailable(
                LOCATION_FAILED_MESSAGE.to_string(),
            ))
        }
    };

    let parse = |raw: String| {
        raw.trim().parse::<f64>().map_err(|_| {
            SearchError::GeolocationUnavailable(LOCATION_FAILED_MESSAGE.to_string())
        })
    };

    checked(GeoLocation {
        latitude: parse(latitude)?,
        longitude: parse(longitude)?,
    })
}

fn checked(location: GeoLocation) -> Result<GeoLocation, SearchError> {
    if location.is_valid() {
        Ok(location)
    } else {
        Err(SearchError::GeolocationUnavailable(
            LOCATION_FAILED_MESSAGE.to_string(),
        ))
    }
}
