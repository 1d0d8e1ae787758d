//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements [`ConfigPort`] for the watch.  The config is stored as one
//! postcard blob under `classwatch::devcfg`.
//!
//! - Validation: [`DeviceConfig::validate`] runs before every write and
//!   after every read; a stored config that no longer validates is
//!   reported as corrupted.
//! - Atomic writes: ESP-IDF NVS commits are atomic per `nvs_commit()`.
//! - Off-target the store is an in-memory map (dev/test only).

use log::{info, warn};

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::DeviceConfig;

#[cfg(not(feature = "espidf"))]
use std::collections::HashMap;

#[cfg(feature = "espidf")]
use esp_idf_svc::nvs::{EspDefaultNvsPartition, EspNvs, NvsDefault};

const CONFIG_NAMESPACE: &str = "classwatch";
const CONFIG_KEY: &str = "devcfg";

/// Upper bound on the serialized config blob.
const MAX_BLOB_SIZE: usize = 512;

pub struct NvsAdapter {
    #[cfg(feature = "espidf")]
    nvs: EspNvs<NvsDefault>,
    #[cfg(not(feature = "espidf"))]
    store: HashMap<String, Vec<u8>>,
}

#[cfg(feature = "espidf")]
impl NvsAdapter {
    /// Open the config namespace on the default NVS partition.
    pub fn new(partition: EspDefaultNvsPartition) -> Result<Self, ConfigError> {
        let nvs = EspNvs::new(partition, CONFIG_NAMESPACE, true).map_err(|e| {
            warn!("NvsAdapter: cannot open namespace '{}' ({})", CONFIG_NAMESPACE, e);
            ConfigError::IoError
        })?;
        info!("NvsAdapter: ESP-IDF NVS ready");
        Ok(Self { nvs })
    }

    fn read_blob<'a>(&self, buf: &'a mut [u8]) -> Result<Option<&'a [u8]>, ConfigError> {
        self.nvs.get_blob(CONFIG_KEY, buf).map_err(|e| {
            warn!("NvsAdapter: NVS read error {}", e);
            ConfigError::IoError
        })
    }

    fn write_blob(&mut self, bytes: &[u8]) -> Result<(), ConfigError> {
        self.nvs.set_blob(CONFIG_KEY, bytes).map_err(|e| {
            warn!("NvsAdapter: NVS write error {}", e);
            ConfigError::IoError
        })
    }
}

#[cfg(not(feature = "espidf"))]
impl NvsAdapter {
    /// In-memory backend.
    pub fn new() -> Result<Self, ConfigError> {
        info!("NvsAdapter: simulation backend");
        Ok(Self { store: HashMap::new() })
    }

    fn composite_key() -> String {
        format!("{}::{}", CONFIG_NAMESPACE, CONFIG_KEY)
    }

    fn read_blob<'a>(&self, buf: &'a mut [u8]) -> Result<Option<&'a [u8]>, ConfigError> {
        match self.store.get(&Self::composite_key()) {
            Some(data) if data.len() > buf.len() => Err(ConfigError::Corrupted),
            Some(data) => {
                buf[..data.len()].copy_from_slice(data);
                Ok(Some(&buf[..data.len()]))
            }
            None => Ok(None),
        }
    }

    fn write_blob(&mut self, bytes: &[u8]) -> Result<(), ConfigError> {
        self.store.insert(Self::composite_key(), bytes.to_vec());
        Ok(())
    }

    /// Overwrite the stored blob without validation (test hook).
    #[cfg(test)]
    fn write_raw(&mut self, bytes: &[u8]) {
        self.store.insert(Self::composite_key(), bytes.to_vec());
    }
}

impl ConfigPort for NvsAdapter {
    fn load(&self) -> Result<DeviceConfig, ConfigError> {
        let mut buf = [0u8; MAX_BLOB_SIZE];
        let Some(bytes) = self.read_blob(&mut buf)? else {
            info!("NvsAdapter: no stored config, using defaults");
            return Ok(DeviceConfig::default());
        };

        let cfg: DeviceConfig = postcard::from_bytes(bytes).map_err(|_| ConfigError::Corrupted)?;
        if let Err(e) = cfg.validate() {
            warn!("NvsAdapter: stored config invalid ({})", e);
            return Err(ConfigError::Corrupted);
        }
        info!("NvsAdapter: loaded config ({} bytes)", bytes.len());
        Ok(cfg)
    }

    fn save(&mut self, config: &DeviceConfig) -> Result<(), ConfigError> {
        config.validate()?;

        let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;
        if bytes.len() > MAX_BLOB_SIZE {
            return Err(ConfigError::StorageFull);
        }
        self.write_blob(&bytes)?;
        info!("NvsAdapter: config saved ({} bytes)", bytes.len());
        Ok(())
    }
}
