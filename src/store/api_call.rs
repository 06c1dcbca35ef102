//! Loading-state wrapper for fetched data

use std::fmt;

/// Lifecycle of one API call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadStatus {
    #[default]
    Init,
    Loading,
    Loaded,
    Error,
}

impl LoadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadStatus::Init => "init",
            LoadStatus::Loading => "loading",
            LoadStatus::Loaded => "loaded",
            LoadStatus::Error => "error",
        }
    }

    /// True once the call has either loaded or failed
    pub fn is_settled(&self) -> bool {
        matches!(self, LoadStatus::Loaded | LoadStatus::Error)
    }
}

impl fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Data plus the status of the call that produced it
///
/// Starting a new load keeps the previous data until the result arrives.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiCall<T> {
    pub status: LoadStatus,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiCall<T> {
    pub fn new() -> Self {
        Self {
            status: LoadStatus::Init,
            data: None,
            error: None,
        }
    }

    pub fn start_loading(&mut self) {
        self.status = LoadStatus::Loading;
        self.error = None;
    }

    pub fn set_loaded(&mut self, data: T) {
        self.status = LoadStatus::Loaded;
        self.data = Some(data);
        self.error = None;
    }

    pub fn set_error(&mut self, error: impl Into<String>) {
        self.status = LoadStatus::Error;
        self.error = Some(error.into());
    }

    pub fn is_loading(&self) -> bool {
        self.status == LoadStatus::Loading
    }

    pub fn is_loaded(&self) -> bool {
        self.status == LoadStatus::Loaded
    }
}

impl<T> Default for ApiCall<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_call_transitions() {
        let mut call: ApiCall<u32> = ApiCall::new();
        assert_eq!(call.status, LoadStatus::Init);
        assert!(!call.status.is_settled());

        call.start_loading();
        assert!(call.is_loading());

        call.set_loaded(7);
        assert!(call.is_loaded());
        assert_eq!(call.data, Some(7));

        // Reloading keeps stale data visible
        call.start_loading();
        assert_eq!(call.data, Some(7));

        call.set_error("boom");
        assert_eq!(call.status, LoadStatus::Error);
        assert_eq!(call.error.as_deref(), Some("boom"));
        assert!(call.status.is_settled());
    }
}
