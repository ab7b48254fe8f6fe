//! Per-session dashboard context: demo login gate, selected data source,
//! date range and filters. One value per session, passed explicitly.

use chrono::{Duration, NaiveDate, Utc};
use pulseboard_core::config::AuthConfig;
use pulseboard_core::error::{PulseError, PulseResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};
use uuid::Uuid;

/// Lower-cases and strips separators so "North America", "north_america"
/// and "north-america" compare equal.
fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    #[default]
    All,
    NorthAmerica,
    Europe,
    Asia,
    SouthAmerica,
}

impl Region {
    const OPTIONS: [Region; 5] = [
        Region::All,
        Region::NorthAmerica,
        Region::Europe,
        Region::Asia,
        Region::SouthAmerica,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Region::All => "All Regions",
            Region::NorthAmerica => "North America",
            Region::Europe => "Europe",
            Region::Asia => "Asia",
            Region::SouthAmerica => "South America",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    #[default]
    All,
    Web,
    Ios,
    Android,
    Desktop,
}

impl Platform {
    const OPTIONS: [Platform; 5] = [
        Platform::All,
        Platform::Web,
        Platform::Ios,
        Platform::Android,
        Platform::Desktop,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Platform::All => "All Platforms",
            Platform::Web => "Web",
            Platform::Ios => "iOS",
            Platform::Android => "Android",
            Platform::Desktop => "Desktop",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    #[default]
    All,
    Desktop,
    Mobile,
    Tablet,
}

impl DeviceType {
    const OPTIONS: [DeviceType; 4] = [
        DeviceType::All,
        DeviceType::Desktop,
        DeviceType::Mobile,
        DeviceType::Tablet,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DeviceType::All => "All Devices",
            DeviceType::Desktop => "Desktop",
            DeviceType::Mobile => "Mobile",
            DeviceType::Tablet => "Tablet",
        }
    }
}

// "all" is accepted on its own as well as the full "All Regions" style label.
macro_rules! filter_option {
    ($ty:ident, $category:literal) => {
        impl FromStr for $ty {
            type Err = PulseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = normalize(s);
                if wanted == "all" {
                    return Ok($ty::All);
                }
                $ty::OPTIONS
                    .iter()
                    .find(|opt| normalize(opt.label()) == wanted)
                    .copied()
                    .ok_or_else(|| PulseError::UnknownOption {
                        category: $category,
                        value: s.to_string(),
                    })
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

filter_option!(Region, "region");
filter_option!(Platform, "platform");
filter_option!(DeviceType, "device type");

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFilters {
    pub region: Region,
    pub platform: Platform,
    pub device: DeviceType,
}

/// Explicit state for one dashboard session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionContext {
    pub session_id: Uuid,
    authenticated: bool,
    username: Option<String>,
    data_source: String,
    date_range: (NaiveDate, NaiveDate),
    filters: SessionFilters,
}

impl SessionContext {
    pub fn new(data_source: impl Into<String>) -> Self {
        let today = Utc::now().date_naive();
        Self {
            session_id: Uuid::new_v4(),
            authenticated: false,
            username: None,
            data_source: data_source.into(),
            date_range: (today - Duration::days(30), today),
            filters: SessionFilters::default(),
        }
    }

    /// Demo login: a plain comparison against the configured credentials.
    pub fn login(&mut self, username: &str, password: &str, auth: &AuthConfig) -> PulseResult<()> {
        if username == auth.username && password == auth.password {
            self.authenticated = true;
            self.username = Some(username.to_string());
            info!(session_id = %self.session_id, user = username, "Login successful");
            Ok(())
        } else {
            warn!(session_id = %self.session_id, user = username, "Login rejected");
            Err(PulseError::InvalidCredentials(username.to_string()))
        }
    }

    pub fn logout(&mut self) {
        self.authenticated = false;
        self.username = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn require_authenticated(&self) -> PulseResult<()> {
        if self.authenticated {
            Ok(())
        } else {
            Err(PulseError::Unauthenticated)
        }
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn data_source(&self) -> &str {
        &self.data_source
    }

    pub fn select_data_source(&mut self, name: &str, available: &[String]) -> PulseResult<()> {
        if !available.iter().any(|s| s == name) {
            return Err(PulseError::UnknownOption {
                category: "data source",
                value: name.to_string(),
            });
        }
        self.data_source = name.to_string();
        info!(session_id = %self.session_id, data_source = name, "Data source selected");
        Ok(())
    }

    pub fn date_range(&self) -> (NaiveDate, NaiveDate) {
        self.date_range
    }

    /// Reversed bounds are swapped.
    pub fn set_date_range(&mut self, start: NaiveDate, end: NaiveDate) {
        self.date_range = if start <= end { (start, end) } else { (end, start) };
    }

    pub fn filters(&self) -> SessionFilters {
        self.filters
    }

    pub fn apply_filters(&mut self, filters: SessionFilters) {
        info!(
            session_id = %self.session_id,
            region = %filters.region,
            platform = %filters.platform,
            device = %filters.device,
            "Filters applied"
        );
        self.filters = filters;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sources() -> Vec<String> {
        vec![
            "PostgreSQL - Main Analytics".to_string(),
            "BigQuery - Marketing Data".to_string(),
        ]
    }

    #[test]
    fn test_login_flow() {
        let auth = AuthConfig::default();
        let mut session = SessionContext::new("PostgreSQL - Main Analytics");
        assert!(matches!(
            session.require_authenticated(),
            Err(PulseError::Unauthenticated)
        ));

        let err = session.login("admin", "wrong", &auth).unwrap_err();
        assert!(matches!(err, PulseError::InvalidCredentials(_)));
        assert!(!session.is_authenticated());

        session.login("admin", "password", &auth).unwrap();
        assert!(session.require_authenticated().is_ok());
        assert_eq!(session.username(), Some("admin"));

        session.logout();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_sessions_are_independent() {
        let auth = AuthConfig::default();
        let mut a = SessionContext::new("PostgreSQL - Main Analytics");
        let b = SessionContext::new("PostgreSQL - Main Analytics");
        a.login("admin", "password", &auth).unwrap();
        assert!(a.is_authenticated());
        assert!(!b.is_authenticated());
        assert_ne!(a.session_id, b.session_id);
    }

    #[test]
    fn test_select_data_source() {
        let mut session = SessionContext::new("PostgreSQL - Main Analytics");
        session
            .select_data_source("BigQuery - Marketing Data", &sources())
            .unwrap();
        assert_eq!(session.data_source(), "BigQuery - Marketing Data");
        assert!(session.select_data_source("Oracle", &sources()).is_err());
        assert_eq!(session.data_source(), "BigQuery - Marketing Data");
    }

    #[test]
    fn test_default_date_range() {
        let session = SessionContext::new("x");
        let (start, end) = session.date_range();
        assert_eq!(end - start, Duration::days(30));
    }

    #[test]
    fn test_reversed_date_range_is_swapped() {
        let mut session = SessionContext::new("x");
        let a = NaiveDate::from_ymd_opt(2026, 10, 1).unwrap();
        let b = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();
        session.set_date_range(a, b);
        assert_eq!(session.date_range(), (b, a));
    }

    #[test]
    fn test_filter_parsing() {
        assert_eq!("North America".parse::<Region>().unwrap(), Region::NorthAmerica);
        assert_eq!("south_america".parse::<Region>().unwrap(), Region::SouthAmerica);
        assert_eq!("all".parse::<Region>().unwrap(), Region::All);
        assert_eq!("All Platforms".parse::<Platform>().unwrap(), Platform::All);
        assert_eq!("ios".parse::<Platform>().unwrap(), Platform::Ios);
        assert_eq!("Tablet".parse::<DeviceType>().unwrap(), DeviceType::Tablet);
        assert!("Mars".parse::<Region>().is_err());
        assert_eq!(Platform::Ios.to_string(), "iOS");
    }

    #[test]
    fn test_apply_filters() {
        let mut session = SessionContext::new("x");
        assert_eq!(session.filters(), SessionFilters::default());
        let filters = SessionFilters {
            region: Region::Europe,
            platform: Platform::Web,
            device: DeviceType::Mobile,
        };
        session.apply_filters(filters);
        assert_eq!(session.filters(), filters);
    }
}
