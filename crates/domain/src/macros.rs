//! Macro for string conversions of API enums
//!
//! amoCRM identifies entity types, note types, sort directions and similar
//! values by short lowercase strings that show up both in JSON bodies and in
//! URL paths/query keys. This macro gives such enums a single source of truth
//! for that string form.
//!
//! # Example
//!
//! ```rust
//! use amocrm_domain::impl_wire_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum CatalogKind {
//!     Regular,
//!     Invoices,
//! }
//!
//! impl_wire_conversions!(CatalogKind {
//!     Regular => "regular",
//!     Invoices => "invoices",
//! });
//!
//! assert_eq!(CatalogKind::Invoices.as_str(), "invoices");
//! assert_eq!("REGULAR".parse::<CatalogKind>().unwrap(), CatalogKind::Regular);
//! ```

/// Implements `as_str`, `Display` and `FromStr` for wire-level enums
///
/// # Arguments
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str` - Mapping of enum variants to their wire strings
///
/// Parsing is case-insensitive; output always uses the mapped string.
#[macro_export]
macro_rules! impl_wire_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Wire representation used in paths, query keys and bodies.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
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

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => ::std::result::Result::Ok(Self::$variant),)+
                    _ => ::std::result::Result::Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
