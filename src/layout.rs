//! Per-device zone geometry: zone counts, ring placement, and rotation
//! semantics.
//!
//! Every supported handheld is described by a static [`Layout`]: an ordered
//! list of zones (array index, owning group, polar placement) plus the named
//! groups with their centers and optional rotation tables. The layout is the
//! single source of truth for translating a zone index into a canvas
//! position and back.
//!
//! # Coordinate convention
//!
//! Screen space throughout: the canvas origin is top-left, `+x` points
//! right, `+y` points down. Angle 0 points right and angles grow clockwise,
//! so the top of a ring sits at 270. `position_of` and `hit_test` share this
//! convention; mixing conventions between the two is exactly the
//! click-to-zone mismatch this module exists to prevent.
//!
//! # Rotation rule
//!
//! A group participates in [`rotate`] iff it carries a rotation table whose
//! length equals its member count. Tables are defined for 4-member rings and
//! as a degenerate swap for 2-member groups (clockwise equals
//! counter-clockwise there). Zones in table-less groups (center buttons) are
//! carried over unchanged. A table whose length does not match the group is
//! a layout construction bug, caught by [`validate`] and the unit tests.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::color::Rgb;
use crate::error::{LightError, Result};

/// Default hit-test radius in canvas units.
pub const HIT_RADIUS: f32 = 30.0;

/// Supported handheld device categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    /// Legion Go: two 4-zone joystick rings.
    LegionGo,
    /// ROG Ally: two 2-zone joystick halves.
    RogAlly,
    /// MSI Claw: two 4-zone rings plus a center button zone.
    MsiClaw,
}

impl DeviceKind {
    /// Number of independently colorable zones.
    pub const fn zone_count(self) -> usize {
        match self {
            Self::LegionGo => 8,
            Self::RogAlly => 4,
            Self::MsiClaw => 9,
        }
    }

    /// Upper bound on keyframes per timeline for this category.
    pub const fn max_keyframes(self) -> usize {
        match self {
            Self::LegionGo | Self::RogAlly | Self::MsiClaw => 8,
        }
    }

    /// Human-readable name.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::LegionGo => "Legion Go",
            Self::RogAlly => "ROG Ally",
            Self::MsiClaw => "MSI Claw",
        }
    }

    /// Identifier used in capability strings and on-disk preset files.
    pub const fn id(self) -> &'static str {
        match self {
            Self::LegionGo => "legion_go",
            Self::RogAlly => "rog_ally",
            Self::MsiClaw => "msi_claw",
        }
    }

    /// Map a capability string to a device kind.
    ///
    /// Unknown identifiers fall back to the Legion Go layout so an
    /// unrecognized device still gets a usable editor instead of silent
    /// corruption; the fallback is logged.
    pub fn from_capability(id: &str) -> Self {
        match id {
            "legion_go" | "legion-go" => Self::LegionGo,
            "rog_ally" | "rog-ally" => Self::RogAlly,
            "msi_claw" | "msi-claw" => Self::MsiClaw,
            other => {
                warn!(device = %other, "Unknown device id, falling back to Legion Go layout");
                Self::LegionGo
            }
        }
    }
}

/// One LED zone: its slot in the per-frame color array and its placement.
#[derive(Debug, Clone, Copy)]
pub struct Zone {
    /// Position in the keyframe color array.
    pub index: usize,
    /// Owning group name.
    pub group: &'static str,
    /// Degrees, screen convention (0 = right, 90 = bottom).
    pub angle: f32,
    /// Distance from the group center, as a fraction of `min(width, height)`.
    pub radius: f32,
    /// Short label for overlays.
    pub label: &'static str,
}

/// Rotation permutation for a group.
///
/// Entries are destination zone-array indices, one per group member in
/// layout order: applying `clockwise` moves the color at member position
/// `i` to zone `clockwise[i]`.
#[derive(Debug, Clone, Copy)]
pub struct Rotation {
    pub clockwise: &'static [usize],
    pub counter_clockwise: &'static [usize],
}

/// A named circular group of zones.
#[derive(Debug, Clone, Copy)]
pub struct Group {
    pub name: &'static str,
    /// Center as fractions of the canvas (x of width, y of height).
    pub center: (f32, f32),
    pub rotation: Option<Rotation>,
}

/// Complete geometry for one device category.
#[derive(Debug, Clone, Copy)]
pub struct Layout {
    pub device: DeviceKind,
    pub zones: &'static [Zone],
    pub groups: &'static [Group],
}

const LEGION_GO: Layout = Layout {
    device: DeviceKind::LegionGo,
    zones: &[
        Zone { index: 0, group: "left_stick", angle: 270.0, radius: 0.16, label: "L1" },
        Zone { index: 1, group: "left_stick", angle: 0.0, radius: 0.16, label: "L2" },
        Zone { index: 2, group: "left_stick", angle: 90.0, radius: 0.16, label: "L3" },
        Zone { index: 3, group: "left_stick", angle: 180.0, radius: 0.16, label: "L4" },
        Zone { index: 4, group: "right_stick", angle: 270.0, radius: 0.16, label: "R1" },
        Zone { index: 5, group: "right_stick", angle: 0.0, radius: 0.16, label: "R2" },
        Zone { index: 6, group: "right_stick", angle: 90.0, radius: 0.16, label: "R3" },
        Zone { index: 7, group: "right_stick", angle: 180.0, radius: 0.16, label: "R4" },
    ],
    groups: &[
        Group {
            name: "left_stick",
            center: (0.27, 0.52),
            rotation: Some(Rotation {
                clockwise: &[1, 2, 3, 0],
                counter_clockwise: &[3, 0, 1, 2],
            }),
        },
        Group {
            name: "right_stick",
            center: (0.73, 0.52),
            rotation: Some(Rotation {
                clockwise: &[5, 6, 7, 4],
                counter_clockwise: &[7, 4, 5, 6],
            }),
        },
    ],
};

const ROG_ALLY: Layout = Layout {
    device: DeviceKind::RogAlly,
    zones: &[
        Zone { index: 0, group: "left_stick", angle: 270.0, radius: 0.16, label: "L1" },
        Zone { index: 1, group: "left_stick", angle: 90.0, radius: 0.16, label: "L2" },
        Zone { index: 2, group: "right_stick", angle: 270.0, radius: 0.16, label: "R1" },
        Zone { index: 3, group: "right_stick", angle: 90.0, radius: 0.16, label: "R2" },
    ],
    groups: &[
        // Two-member rings rotate by swapping; the swap is its own inverse,
        // so both directions share the table.
        Group {
            name: "left_stick",
            center: (0.27, 0.52),
            rotation: Some(Rotation {
                clockwise: &[1, 0],
                counter_clockwise: &[1, 0],
            }),
        },
        Group {
            name: "right_stick",
            center: (0.73, 0.52),
            rotation: Some(Rotation {
                clockwise: &[3, 2],
                counter_clockwise: &[3, 2],
            }),
        },
    ],
};

const MSI_CLAW: Layout = Layout {
    device: DeviceKind::MsiClaw,
    zones: &[
        Zone { index: 0, group: "left_stick", angle: 270.0, radius: 0.16, label: "L1" },
        Zone { index: 1, group: "left_stick", angle: 0.0, radius: 0.16, label: "L2" },
        Zone { index: 2, group: "left_stick", angle: 90.0, radius: 0.16, label: "L3" },
        Zone { index: 3, group: "left_stick", angle: 180.0, radius: 0.16, label: "L4" },
        Zone { index: 4, group: "right_stick", angle: 270.0, radius: 0.16, label: "R1" },
        Zone { index: 5, group: "right_stick", angle: 0.0, radius: 0.16, label: "R2" },
        Zone { index: 6, group: "right_stick", angle: 90.0, radius: 0.16, label: "R3" },
        Zone { index: 7, group: "right_stick", angle: 180.0, radius: 0.16, label: "R4" },
        Zone { index: 8, group: "center", angle: 0.0, radius: 0.0, label: "C" },
    ],
    groups: &[
        Group {
            name: "left_stick",
            center: (0.27, 0.52),
            rotation: Some(Rotation {
                clockwise: &[1, 2, 3, 0],
                counter_clockwise: &[3, 0, 1, 2],
            }),
        },
        Group {
            name: "right_stick",
            center: (0.73, 0.52),
            rotation: Some(Rotation {
                clockwise: &[5, 6, 7, 4],
                counter_clockwise: &[7, 4, 5, 6],
            }),
        },
        Group {
            name: "center",
            center: (0.5, 0.42),
            rotation: None,
        },
    ],
};

/// Look up the layout for a device category.
pub const fn layout_for(device: DeviceKind) -> &'static Layout {
    match device {
        DeviceKind::LegionGo => &LEGION_GO,
        DeviceKind::RogAlly => &ROG_ALLY,
        DeviceKind::MsiClaw => &MSI_CLAW,
    }
}

impl Layout {
    /// Zone-array indices belonging to `group`, in layout order.
    pub fn members(&self, group: &str) -> Vec<usize> {
        self.zones
            .iter()
            .filter(|z| z.group == group)
            .map(|z| z.index)
            .collect()
    }

    /// Find the group a zone belongs to.
    pub fn group_of(&self, zone_index: usize) -> Option<&Group> {
        let zone = self.zones.iter().find(|z| z.index == zone_index)?;
        self.groups.iter().find(|g| g.name == zone.group)
    }
}

/// Check structural invariants of a layout.
///
/// Zone indices must be a permutation of `0..N`, every zone's group must
/// exist, and every rotation table must be a permutation of its group's
/// members with matching length.
pub fn validate(layout: &Layout) -> Result<()> {
    let n = layout.zones.len();
    if n != layout.device.zone_count() {
        return Err(LightError::ZoneCountMismatch {
            expected: layout.device.zone_count(),
            actual: n,
        });
    }

    let mut seen = vec![false; n];
    for zone in layout.zones {
        if zone.index >= n || seen[zone.index] {
            return Err(LightError::InvalidZone {
                index: zone.index,
                count: n,
            });
        }
        seen[zone.index] = true;
        if !layout.groups.iter().any(|g| g.name == zone.group) {
            return Err(LightError::Other(format!(
                "zone {} references unknown group '{}'",
                zone.index, zone.group
            )));
        }
    }

    for group in layout.groups {
        let members = layout.members(group.name);
        if let Some(rotation) = &group.rotation {
            for table in [rotation.clockwise, rotation.counter_clockwise] {
                if table.len() != members.len() {
                    return Err(LightError::Other(format!(
                        "rotation table for '{}' has {} entries, group has {} members",
                        group.name,
                        table.len(),
                        members.len()
                    )));
                }
                let mut sorted: Vec<usize> = table.to_vec();
                sorted.sort_unstable();
                let mut expected = members.clone();
                expected.sort_unstable();
                if sorted != expected {
                    return Err(LightError::Other(format!(
                        "rotation table for '{}' is not a permutation of its members",
                        group.name
                    )));
                }
            }
        }
    }

    Ok(())
}

/// Rotate the zone colors of one frame by a single step.
///
/// Every group with a rotation table gets its permutation applied; zones in
/// table-less groups keep their color. The input frame length must match
/// the layout's zone count.
pub fn rotate(frame: &[Rgb], clockwise: bool, layout: &Layout) -> Result<Vec<Rgb>> {
    if frame.len() != layout.zones.len() {
        return Err(LightError::ZoneCountMismatch {
            expected: layout.zones.len(),
            actual: frame.len(),
        });
    }

    let mut rotated = frame.to_vec();
    for group in layout.groups {
        let Some(rotation) = &group.rotation else {
            continue;
        };
        let members = layout.members(group.name);
        let table = if clockwise {
            rotation.clockwise
        } else {
            rotation.counter_clockwise
        };
        debug_assert_eq!(table.len(), members.len(), "rotation table size mismatch");
        for (position, &source_zone) in members.iter().enumerate() {
            rotated[table[position]] = frame[source_zone];
        }
    }
    Ok(rotated)
}

/// Canvas position of a zone's LED marker.
pub fn position_of(zone_index: usize, layout: &Layout, canvas: (f32, f32)) -> Result<(f32, f32)> {
    let zone = layout
        .zones
        .iter()
        .find(|z| z.index == zone_index)
        .ok_or(LightError::InvalidZone {
            index: zone_index,
            count: layout.zones.len(),
        })?;
    let group = layout
        .group_of(zone_index)
        .ok_or_else(|| LightError::Other(format!("zone {zone_index} has no group")))?;

    let (w, h) = canvas;
    let scale = w.min(h);
    let theta = zone.angle.to_radians();
    let x = group.center.0 * w + zone.radius * scale * theta.cos();
    let y = group.center.1 * h + zone.radius * scale * theta.sin();
    Ok((x, y))
}

/// Nearest zone within `radius` of `point`, or `None`.
///
/// Ties are broken by layout order: the first zone at the minimal distance
/// wins, deterministically.
pub fn hit_test(
    point: (f32, f32),
    layout: &Layout,
    canvas: (f32, f32),
    radius: f32,
) -> Option<usize> {
    let mut best: Option<(f32, usize)> = None;
    for zone in layout.zones {
        let Ok((x, y)) = position_of(zone.index, layout, canvas) else {
            continue;
        };
        let dist = ((point.0 - x).powi(2) + (point.1 - y).powi(2)).sqrt();
        if dist <= radius && best.is_none_or(|(d, _)| dist < d) {
            best = Some((dist, zone.index));
        }
    }
    best.map(|(_, index)| index)
}
