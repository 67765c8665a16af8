//! Location source fed from configuration.
//!
//! Desktop and CLI builds have no positioning hardware; the fix is supplied
//! by the user and the permission answer is a setting.

use async_trait::async_trait;
use pois_core::{DeviceLocation, LocationError, LocationPermission, LocationSource};

/// [`LocationSource`] returning a fixed, pre-configured reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfiguredLocationSource {
    permission: LocationPermission,
    fix: Option<DeviceLocation>,
}

impl ConfiguredLocationSource {
    /// Build a source with an explicit permission and optional fix.
    #[must_use]
    pub const fn new(permission: LocationPermission, fix: Option<DeviceLocation>) -> Self {
        Self { permission, fix }
    }

    /// Permission granted, reporting `fix` on every request.
    #[must_use]
    pub const fn granted(fix: DeviceLocation) -> Self {
        Self::new(LocationPermission::Granted, Some(fix))
    }

    /// Permission refused.
    #[must_use]
    pub const fn denied() -> Self {
        Self::new(LocationPermission::Denied, None)
    }
}

#[async_trait]
impl LocationSource for ConfiguredLocationSource {
    fn permission(&self) -> LocationPermission {
        self.permission
    }

    async fn current_fix(&self) -> Result<Option<DeviceLocation>, LocationError> {
        let Some(fix) = self.fix else {
            return Ok(None);
        };
        DeviceLocation::validated(fix.latitude, fix.longitude)
            .map(Some)
            .map_err(|err| LocationError::Unavailable {
                message: err.to_string(),
            })
    }
}
