//! Shared data types for fabric descriptions.
//!
//! This module defines primitive and site type tags, the per-site-type
//! definition of BELs, SitePIPs and BEL-pin wire paths, and the concrete
//! sites and interconnect nodes of a device.

use crate::ids::{BelId, NodeId, SitePipId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The primitive type of a netlist cell, and the compatibility tag of a BEL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PrimitiveKind {
    /// A look-up table of any input width (`LUT1` through `LUT6`).
    Lut,
    /// A D flip-flop with clock enable and synchronous reset.
    Fdre,
    /// A dedicated global clock buffer.
    Bufgctrl,
    /// A local clock buffer with clock enable.
    Bufhce,
    /// An input buffer attached to a package pin.
    Ibuf,
    /// An output buffer attached to a package pin.
    Obuf,
    /// The constant-low source.
    Gnd,
    /// The constant-high source.
    Vcc,
}

impl PrimitiveKind {
    /// Returns `true` for the logical constant sources, which need no physical resource.
    pub fn is_constant(self) -> bool {
        matches!(self, PrimitiveKind::Gnd | PrimitiveKind::Vcc)
    }

    /// Returns `true` for I/O buffers.
    pub fn is_io(self) -> bool {
        matches!(self, PrimitiveKind::Ibuf | PrimitiveKind::Obuf)
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PrimitiveKind::Lut => "LUT",
            PrimitiveKind::Fdre => "FDRE",
            PrimitiveKind::Bufgctrl => "BUFGCTRL",
            PrimitiveKind::Bufhce => "BUFHCE",
            PrimitiveKind::Ibuf => "IBUF",
            PrimitiveKind::Obuf => "OBUF",
            PrimitiveKind::Gnd => "GND",
            PrimitiveKind::Vcc => "VCC",
        };
        f.write_str(name)
    }
}

/// Error returned when a cell type name is not a known primitive.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown primitive type '{0}'")]
pub struct UnknownPrimitive(pub String);

impl FromStr for PrimitiveKind {
    type Err = UnknownPrimitive;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LUT1" | "LUT2" | "LUT3" | "LUT4" | "LUT5" | "LUT6" | "LUT" => Ok(PrimitiveKind::Lut),
            "FDRE" => Ok(PrimitiveKind::Fdre),
            "BUFGCTRL" => Ok(PrimitiveKind::Bufgctrl),
            "BUFHCE" => Ok(PrimitiveKind::Bufhce),
            "IBUF" => Ok(PrimitiveKind::Ibuf),
            "OBUF" => Ok(PrimitiveKind::Obuf),
            "GND" => Ok(PrimitiveKind::Gnd),
            "VCC" => Ok(PrimitiveKind::Vcc),
            other => Err(UnknownPrimitive(other.to_string())),
        }
    }
}

/// The functional type of a site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SiteType {
    /// A logic slice with four LUTs and four flip-flops.
    #[serde(rename = "SLICEL")]
    SliceL,
    /// A 3.3 V capable I/O site bonded to a package pin.
    #[serde(rename = "IOB33")]
    Iob,
    /// A global clock buffer site.
    #[serde(rename = "BUFGCTRL")]
    Bufgctrl,
    /// A horizontal (regional) clock buffer site.
    #[serde(rename = "BUFHCE")]
    Bufhce,
}

impl fmt::Display for SiteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SiteType::SliceL => "SLICEL",
            SiteType::Iob => "IOB33",
            SiteType::Bufgctrl => "BUFGCTRL",
            SiteType::Bufhce => "BUFHCE",
        };
        f.write_str(name)
    }
}

/// A BEL slot in a site-type definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BelDef {
    /// The BEL name (e.g., "A6LUT", "AFF", "CEUSEDMUX").
    pub name: String,
    /// The primitive this BEL can host; `None` for routing muxes.
    #[serde(default)]
    pub compat: Option<PrimitiveKind>,
}

/// A site-local configuration point: one input of one internal routing mux.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SitePipDef {
    /// The routing mux BEL this SitePIP belongs to.
    pub mux: String,
    /// The mux input pin selected by this SitePIP.
    pub input: String,
    /// The site wire read by the selected input.
    pub input_wire: String,
    /// The site wire driven by the mux output.
    pub output_wire: String,
}

/// The chain of site wires joining a BEL pin to the site boundary.
///
/// `wires[0]` is the wire at the BEL pin and the last entry is the site pin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinPathDef {
    /// The BEL owning the pin.
    pub bel: String,
    /// The BEL pin name.
    pub pin: String,
    /// Site wires from the BEL pin outward.
    pub wires: Vec<String>,
}

/// The internal structure shared by every site of one [`SiteType`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteTypeDef {
    /// The site type this definition describes.
    pub site_type: SiteType,
    /// Placement targets and routing muxes, indexed by [`BelId`].
    pub bels: Vec<BelDef>,
    /// Internal routing configuration points, indexed by [`SitePipId`].
    #[serde(default)]
    pub site_pips: Vec<SitePipDef>,
    /// BEL-pin to site-pin wire paths.
    #[serde(default)]
    pub pin_paths: Vec<PinPathDef>,
}

impl SiteTypeDef {
    /// Returns the BEL at `id`, if it exists.
    pub fn bel(&self, id: BelId) -> Option<&BelDef> {
        self.bels.get(id.index())
    }

    /// Finds a BEL by name.
    pub fn bel_by_name(&self, name: &str) -> Option<BelId> {
        self.bels
            .iter()
            .position(|b| b.name == name)
            .map(|i| BelId::from_raw(i as u32))
    }

    /// Returns the SitePIP at `id`, if it exists.
    pub fn site_pip(&self, id: SitePipId) -> Option<&SitePipDef> {
        self.site_pips.get(id.index())
    }

    /// Finds the SitePIP selecting `input` on `mux`.
    pub fn site_pip_by_input(&self, mux: &str, input: &str) -> Option<SitePipId> {
        self.site_pips
            .iter()
            .position(|p| p.mux == mux && p.input == input)
            .map(|i| SitePipId::from_raw(i as u32))
    }

    /// Finds the SitePIP joining two site wires.
    pub fn site_pip_between(&self, input_wire: &str, output_wire: &str) -> Option<SitePipId> {
        self.site_pips
            .iter()
            .position(|p| p.input_wire == input_wire && p.output_wire == output_wire)
            .map(|i| SitePipId::from_raw(i as u32))
    }

    /// Returns the site-wire path of a BEL pin.
    pub fn pin_path(&self, bel: &str, pin: &str) -> Option<&[String]> {
        self.pin_paths
            .iter()
            .find(|p| p.bel == bel && p.pin == pin)
            .map(|p| p.wires.as_slice())
    }
}

/// A concrete site of a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    /// The site instance name (e.g., "SLICE_X0Y0").
    pub name: String,
    /// The functional type of this site.
    pub site_type: SiteType,
    /// RPM column.
    pub col: i32,
    /// RPM row.
    pub row: i32,
    /// The package pin bonded to this site, for I/O sites.
    #[serde(default)]
    pub package_pin: Option<String>,
}

/// A node of the general interconnect graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// The node name (e.g., "INT_L_X2Y10/NN2BEG0").
    pub name: String,
    /// Column of the node's tile.
    pub col: i32,
    /// Row of the node's tile.
    pub row: i32,
    /// Marks a pass-through resource that a route may not use.
    pub route_thru: bool,
    /// Nodes reachable through one PIP.
    pub fanout: Vec<NodeId>,
}
