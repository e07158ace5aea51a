//! Macro for implementing Display and FromStr for status enums
//!
//! Job and session statuses travel as lowercase strings in storage and on the
//! wire. The macro keeps the string mapping in one place and makes parsing
//! case-insensitive.
//!
//! # Example
//!
//! ```rust
//! use calrelay_domain::impl_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum UploadState {
//!     Queued,
//!     Sent,
//! }
//!
//! impl_status_conversions!(UploadState {
//!     Queued => "queued",
//!     Sent => "sent",
//! });
//!
//! assert_eq!(UploadState::Sent.to_string(), "sent");
//! assert_eq!("QUEUED".parse::<UploadState>(), Ok(UploadState::Queued));
//! ```

/// Implements Display and FromStr traits for status enums
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str` - Mapping of enum variants to their lowercase string
///   representations
#[macro_export]
macro_rules! impl_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:literal),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
