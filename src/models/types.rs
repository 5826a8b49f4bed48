use serde::{Deserialize, Serialize};

#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Copy,
            Clone,
            Debug,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[repr(transparent)]
        #[serde(transparent)] // plain UUID string on disk
        pub struct $name(pub uuid::Uuid);

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl $name {
            #[inline]
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }
            #[inline]
            pub fn as_uuid(&self) -> &uuid::Uuid {
                &self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl core::str::FromStr for $name {
            type Err = uuid::Error;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                uuid::Uuid::parse_str(s).map(Self)
            }
        }
    };
}

define_id!(CharacterId);
define_id!(InstanceId);

/// Roles gate access to commands. Ordered from least to most privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Player,  // Regular player
    Builder, // Can spawn content into rooms
    Admin,   // Can do everything
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Player => write!(f, "player"),
            Role::Builder => write!(f, "builder"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

/// Globally unique room key: `area:room`.
pub fn room_key(area: &str, room: &str) -> String {
    format!("{area}:{room}")
}

/// Resolve an exit target relative to the area it was declared in. Targets may be a local
/// room id (`alley`) or a fully qualified key (`docks:pier`).
pub fn qualify_room_key(area: &str, target: &str) -> String {
    if target.contains(':') {
        target.to_string()
    } else {
        room_key(area, target)
    }
}

/// Expand direction shorthands to their canonical label. Unknown labels (e.g. "portal")
/// pass through lowercased, since exits may carry any label.
pub fn normalize_dir(s: &str) -> String {
    let s = s.trim().to_ascii_lowercase();
    let canonical = match s.as_str() {
        "n" | "north" => "north",
        "ne" | "northeast" => "northeast",
        "e" | "east" => "east",
        "se" | "southeast" => "southeast",
        "s" | "south" => "south",
        "sw" | "southwest" => "southwest",
        "w" | "west" => "west",
        "nw" | "northwest" => "northwest",
        "u" | "up" => "up",
        "d" | "down" => "down",
        "in" => "in",
        "out" => "out",
        _ => return s,
    };
    canonical.to_string()
}

/// The direction one arrives from when taking an exit, used for "arrives from the south".
pub fn opposite_dir(dir: &str) -> Option<&'static str> {
    match dir {
        "north" => Some("south"),
        "south" => Some("north"),
        "east" => Some("west"),
        "west" => Some("east"),
        "northeast" => Some("southwest"),
        "southwest" => Some("northeast"),
        "northwest" => Some("southeast"),
        "southeast" => Some("northwest"),
        "up" => Some("below"),
        "down" => Some("above"),
        "in" => Some("outside"),
        "out" => Some("inside"),
        _ => None,
    }
}
