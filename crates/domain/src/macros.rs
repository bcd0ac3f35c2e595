//! Macro for string-backed domain enums
//!
//! Front encodes several closed vocabularies as lowercase strings (resource
//! kinds, conversation statuses). This macro generates `as_str`, `ALL`,
//! `Display` and case-insensitive `FromStr` from a single mapping table.
//!
//! # Example
//!
//! ```rust
//! use frontcli_domain::impl_str_enum;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum SortOrder {
//!     Asc,
//!     Desc,
//! }
//!
//! impl_str_enum!(SortOrder {
//!     Asc => "asc",
//!     Desc => "desc",
//! });
//!
//! assert_eq!(SortOrder::Desc.as_str(), "desc");
//! assert_eq!("ASC".parse::<SortOrder>(), Ok(SortOrder::Asc));
//! ```

/// Implements `as_str`, `ALL`, `Display` and `FromStr` for a fieldless enum.
///
/// Parsing trims surrounding whitespace and ignores case; the error carries
/// the enum name and the rejected input.
#[macro_export]
macro_rules! impl_str_enum {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$enum_name] = &[$(Self::$variant),+];

            /// Wire representation of this variant.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let needle = s.trim().to_ascii_lowercase();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|variant| variant.as_str() == needle)
                    .ok_or_else(|| format!("Invalid {}: {}", stringify!($enum_name), s))
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Channel {
        Email,
        Sms,
        Custom,
    }

    impl_str_enum!(Channel {
        Email => "email",
        Sms => "sms",
        Custom => "custom",
    });

    #[test]
    fn display_uses_wire_string() {
        assert_eq!(Channel::Email.to_string(), "email");
        assert_eq!(Channel::Sms.as_str(), "sms");
    }

    #[test]
    fn parse_ignores_case_and_whitespace() {
        assert_eq!(Channel::from_str(" SMS ").unwrap(), Channel::Sms);
        assert_eq!(Channel::from_str("Custom").unwrap(), Channel::Custom);
    }

    #[test]
    fn parse_rejects_unknown() {
        let err = Channel::from_str("fax").unwrap_err();
        assert!(err.contains("Invalid Channel: fax"));
    }

    #[test]
    fn all_lists_every_variant() {
        assert_eq!(Channel::ALL, &[Channel::Email, Channel::Sms, Channel::Custom]);
    }
}
