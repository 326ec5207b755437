use crate::db::StoreError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = StoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(StoreError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(Collection {
    Patients => "patients",
    Appointments => "appointments",
    FollowUps => "followups",
    Doctors => "doctors",
});

str_enum!(AppointmentStatus {
    Scheduled => "Scheduled",
    Completed => "Completed",
    Cancelled => "Cancelled",
});

str_enum!(FollowUpStatus {
    Pending => "Pending",
    Completed => "Completed",
});

impl AppointmentStatus {
    /// Badge class for the appointments table.
    pub fn badge_class(&self) -> &'static str {
        match self {
            Self::Scheduled => "bg-primary",
            Self::Completed => "bg-success",
            Self::Cancelled => "bg-danger",
        }
    }
}

impl FollowUpStatus {
    pub fn badge_class(&self) -> &'static str {
        match self {
            Self::Pending => "bg-warning",
            Self::Completed => "bg-success",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn appointment_status_round_trip() {
        for (variant, s) in [
            (AppointmentStatus::Scheduled, "Scheduled"),
            (AppointmentStatus::Completed, "Completed"),
            (AppointmentStatus::Cancelled, "Cancelled"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(AppointmentStatus::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn collection_names_match_stored_collections() {
        assert_eq!(Collection::Patients.as_str(), "patients");
        assert_eq!(Collection::FollowUps.as_str(), "followups");
        assert_eq!(Collection::from_str("doctors").unwrap(), Collection::Doctors);
    }

    #[test]
    fn serde_uses_stored_spelling() {
        let json = serde_json::to_string(&FollowUpStatus::Pending).unwrap();
        assert_eq!(json, "\"Pending\"");
        let parsed: AppointmentStatus = serde_json::from_str("\"Cancelled\"").unwrap();
        assert_eq!(parsed, AppointmentStatus::Cancelled);
    }

    #[test]
    fn invalid_enum_returns_error() {
        assert!(AppointmentStatus::from_str("scheduled").is_err());
        assert!(FollowUpStatus::from_str("Done").is_err());
        assert!(Collection::from_str("").is_err());
    }
}
