//! Configuration access port.
//!
//! Sections and keys are plain strings. Values come back raw; parsing and
//! range checks belong to `config_validation`.

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
}
