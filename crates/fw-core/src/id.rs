use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global string interner shared by element and page ids.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Monotonic suffix for generated ids (`frame_12`, `page_3`).
static COUNTER: AtomicU64 = AtomicU64::new(1);

macro_rules! interned_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(Spur);

        impl $name {
            /// Intern `s`, returning the existing handle if already known.
            pub fn intern(s: &str) -> Self {
                Self(INTERNER.get_or_intern(s))
            }

            pub fn as_str(&self) -> &str {
                INTERNER.resolve(&self.0)
            }

            /// Generate an id of the form `{prefix}_{n}`.
            ///
            /// Uniqueness is process-wide only; callers holding a document
            /// must still check for collisions with deserialized ids.
            pub fn with_prefix(prefix: &str) -> Self {
                let n = COUNTER.fetch_add(1, Ordering::Relaxed);
                Self::intern(&format!("{prefix}_{n}"))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "#{}", self.as_str())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Ok(Self::intern(&s))
            }
        }
    };
}

interned_id!(
    /// Handle for an element in the scene tree. 4 bytes, `Copy`, O(1) compare.
    ElementId
);

interned_id!(
    /// Handle for a page (artboard) on the infinite canvas.
    PageId
);
