//! Parameter management types
//!
//! A bounded name/value store plus typed parameter groups. Each group
//! registers its defaults and reads itself back with range clamping.

pub mod airframe;
pub mod deepstall;
pub mod error;
pub mod landing;
pub mod storage;

pub use airframe::AirframeParams;
pub use deepstall::DeepstallParams;
pub use error::ParameterError;
pub use landing::LandingParams;
pub use storage::{ParamValue, ParameterStore};
pub use storage::{MAX_PARAMS, PARAM_NAME_LEN};

/// Register every landing-related parameter group
pub fn register_all(store: &mut ParameterStore) -> Result<(), ParameterError> {
    AirframeParams::register_defaults(store)?;
    LandingParams::register_defaults(store)?;
    DeepstallParams::register_defaults(store)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_all_fits_store() {
        let mut store = ParameterStore::new();
        register_all(&mut store).unwrap();
        assert_eq!(store.len(), 6 + 14 + 17);
        assert!(store.len() <= MAX_PARAMS);
    }
}
