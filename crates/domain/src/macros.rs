//! Crate-internal macros.

/// Define a closed set of string values (statuses, levels, kinds).
///
/// Generates serde renames, `as_str`, `Display`, an optional `Default`, and a
/// `FromStr` that reports
/// unknown values as [`ValidationError::InvalidField`](crate::error::ValidationError::InvalidField)
/// for the given field name.
macro_rules! wire_enum {
    (
        $(#[doc = $doc:expr])*
        $name:ident, field = $field:literal $(, default = $default:ident)? {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            /// Every value, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Wire / storage representation.
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        $(
            impl Default for $name {
                fn default() -> Self {
                    Self::$default
                }
            }
        )?

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::error::ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err($crate::error::ValidationError::InvalidField {
                        field: $field,
                        reason: format!("unknown value `{other}`"),
                    }),
                }
            }
        }
    };
}
