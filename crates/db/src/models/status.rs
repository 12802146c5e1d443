//! Status helper enums mapping to SMALLINT columns.
//!
//! Each enum variant's discriminant matches the seed order (1-based)
//! documented in the corresponding `CREATE TABLE` migration.

/// Status ID type matching SMALLINT in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Resolve a database status ID back to the enum.
            pub fn from_id(id: StatusId) -> Option<Self> {
                match id {
                    $( $val => Some(Self::$variant), )+
                    _ => None,
                }
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }
    };
}

define_status_enum! {
    /// Shipment lifecycle status.
    ShipmentStatus {
        Pending = 1,
        InStorage = 2,
        Partial = 3,
        Released = 4,
    }
}

define_status_enum! {
    /// Box lifecycle status. `InStorage` (placed by an assignment) and
    /// `Stored` (placed directly at intake) both mean "physically on a rack".
    BoxStatus {
        Pending = 1,
        InStorage = 2,
        Stored = 3,
        Released = 4,
    }
}

define_status_enum! {
    /// Rack capacity status. `Full` is also derived on read whenever pallet
    /// usage reaches capacity.
    RackStatus {
        Active = 1,
        Full = 2,
    }
}

impl ShipmentStatus {
    /// Label used in API responses.
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InStorage => "in_storage",
            Self::Partial => "partial",
            Self::Released => "released",
        }
    }
}

impl RackStatus {
    /// Label used in API responses.
    pub fn label(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Full => "full",
        }
    }

    /// Derive the effective status from recomputed pallet usage: `Full`
    /// once usage reaches capacity, otherwise whatever is stored.
    pub fn derive(stored_id: StatusId, capacity_total: i32, pallet_usage: i32) -> Self {
        if stowage_core::capacity::is_full(capacity_total, pallet_usage) {
            Self::Full
        } else {
            Self::from_id(stored_id).unwrap_or(Self::Active)
        }
    }
}
