//! Fabric description and query interface for the Weft flow.
//!
//! This crate provides the [`Fabric`] trait through which placement, site
//! configuration, clock insertion and routing read the device: sites and
//! their BELs, site-internal SitePIPs and wire paths, package pins, and the
//! general interconnect graph. [`Device`] is an in-memory implementation
//! loaded from a JSON [`DeviceDescription`] or assembled with a
//! [`DeviceBuilder`].
//!
//! # Usage
//!
//! ```
//! use weft_fabric::{DeviceBuilder, Fabric, PrimitiveKind, SiteType};
//!
//! let mut builder = DeviceBuilder::new("tiny");
//! builder.add_site("SLICE_X0Y0", SiteType::SliceL, 0, 0);
//! let device = builder.build().unwrap();
//! assert_eq!(device.compatible_placements(PrimitiveKind::Fdre).len(), 4);
//! ```

#![warn(missing_docs)]

pub mod device;
pub mod error;
pub mod ids;
pub mod templates;
pub mod types;

pub use device::{load_device, Device, DeviceBuilder, DeviceDescription};
pub use error::FabricError;
pub use ids::{BelId, NodeId, SiteId, SitePipId};
pub use types::{
    BelDef, Node, PinPathDef, PrimitiveKind, Site, SitePipDef, SiteType, SiteTypeDef,
    UnknownPrimitive,
};

/// Read-only view of a device.
///
/// Implementors supply sites, site-type definitions and interconnect nodes;
/// compatibility, distance and SitePIP queries are derived from those.
pub trait Fabric: std::fmt::Debug {
    /// Returns the device part name.
    fn device_name(&self) -> &str;

    /// Returns the number of sites. Site IDs are `0..site_count()`.
    fn site_count(&self) -> usize;

    /// Returns the site with the given ID, if it exists.
    fn site(&self, id: SiteId) -> Option<&Site>;

    /// Finds a site by name.
    fn site_by_name(&self, name: &str) -> Option<SiteId>;

    /// Returns the internal structure shared by all sites of a type.
    fn site_type_def(&self, site_type: SiteType) -> Option<&SiteTypeDef>;

    /// Returns the I/O site bonded to a package pin.
    fn site_for_package_pin(&self, pin: &str) -> Option<SiteId>;

    /// Returns the number of interconnect nodes. Node IDs are `0..node_count()`.
    fn node_count(&self) -> usize;

    /// Returns the interconnect node with the given ID, if it exists.
    fn node(&self, id: NodeId) -> Option<&Node>;

    /// Finds an interconnect node by name.
    fn node_by_name(&self, name: &str) -> Option<NodeId>;

    /// Returns the interconnect node a site pin connects to.
    fn site_pin_node(&self, site: SiteId, pin: &str) -> Option<NodeId>;

    /// Returns all sites of the given type, in ID order.
    fn sites_of_type(&self, site_type: SiteType) -> Vec<SiteId> {
        (0..self.site_count() as u32)
            .map(SiteId::from_raw)
            .filter(|&id| self.site(id).is_some_and(|s| s.site_type == site_type))
            .collect()
    }

    /// Returns the type definition of a concrete site.
    fn site_def(&self, site: SiteId) -> Option<&SiteTypeDef> {
        self.site(site).and_then(|s| self.site_type_def(s.site_type))
    }

    /// Returns a BEL of a site.
    fn bel(&self, site: SiteId, bel: BelId) -> Option<&BelDef> {
        self.site_def(site).and_then(|def| def.bel(bel))
    }

    /// Finds a BEL of a site by name.
    fn bel_by_name(&self, site: SiteId, name: &str) -> Option<BelId> {
        self.site_def(site).and_then(|def| def.bel_by_name(name))
    }

    /// Returns every `(site, BEL)` pair able to host `kind`, ordered by site
    /// then BEL.
    fn compatible_placements(&self, kind: PrimitiveKind) -> Vec<(SiteId, BelId)> {
        let mut out = Vec::new();
        for raw in 0..self.site_count() as u32 {
            let site = SiteId::from_raw(raw);
            let Some(def) = self.site_def(site) else {
                continue;
            };
            for (i, bel) in def.bels.iter().enumerate() {
                if bel.compat == Some(kind) {
                    out.push((site, BelId::from_raw(i as u32)));
                }
            }
        }
        out
    }

    /// Manhattan distance between two sites' RPM coordinates.
    ///
    /// Unknown sites are infinitely far away.
    fn site_distance(&self, a: SiteId, b: SiteId) -> u32 {
        match (self.site(a), self.site(b)) {
            (Some(a), Some(b)) => a.col.abs_diff(b.col) + a.row.abs_diff(b.row),
            _ => u32::MAX,
        }
    }

    /// Finds the SitePIP selecting `input` on `mux` in a site.
    fn site_pip(&self, site: SiteId, mux: &str, input: &str) -> Option<SitePipId> {
        self.site_def(site)
            .and_then(|def| def.site_pip_by_input(mux, input))
    }

    /// Finds the SitePIP joining two site wires in a site.
    fn site_pip_between(
        &self,
        site: SiteId,
        input_wire: &str,
        output_wire: &str,
    ) -> Option<SitePipId> {
        self.site_def(site)
            .and_then(|def| def.site_pip_between(input_wire, output_wire))
    }

    /// Returns the definition of a SitePIP in a site.
    fn site_pip_def(&self, site: SiteId, pip: SitePipId) -> Option<&SitePipDef> {
        self.site_def(site).and_then(|def| def.site_pip(pip))
    }

    /// Returns the site-wire path from a BEL pin to the site boundary.
    fn bel_pin_path(&self, site: SiteId, bel: BelId, pin: &str) -> Option<&[String]> {
        let def = self.site_def(site)?;
        let bel = def.bel(bel)?;
        def.pin_path(&bel.name, pin)
    }

    /// Returns the nodes reachable from `id` through one PIP.
    fn node_fanout(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.fanout.as_slice()).unwrap_or(&[])
    }

    /// Manhattan distance between two nodes' tile coordinates.
    fn node_distance(&self, a: NodeId, b: NodeId) -> u32 {
        match (self.node(a), self.node(b)) {
            (Some(a), Some(b)) => a.col.abs_diff(b.col) + a.row.abs_diff(b.row),
            _ => u32::MAX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> (Device, Vec<SiteId>) {
        let mut b = DeviceBuilder::new("grid");
        let s0 = b.add_site("SLICE_X0Y0", SiteType::SliceL, 0, 0);
        let s1 = b.add_site("SLICE_X2Y3", SiteType::SliceL, 2, 3);
        let h0 = b.add_site("BUFHCE_X0Y0", SiteType::Bufhce, -1, 5);
        let io = b.add_io_site("IOB_X0Y0", "E3", 0, 9);
        (b.build().unwrap(), vec![s0, s1, h0, io])
    }

    #[test]
    fn sites_of_type_in_order() {
        let (device, ids) = grid();
        assert_eq!(device.sites_of_type(SiteType::SliceL), vec![ids[0], ids[1]]);
        assert_eq!(device.sites_of_type(SiteType::Bufgctrl), vec![]);
    }

    #[test]
    fn site_distance_is_manhattan() {
        let (device, ids) = grid();
        assert_eq!(device.site_distance(ids[0], ids[1]), 5);
        assert_eq!(device.site_distance(ids[1], ids[0]), 5);
        assert_eq!(device.site_distance(ids[0], ids[2]), 6);
        assert_eq!(device.site_distance(ids[0], SiteId::from_raw(99)), u32::MAX);
    }

    #[test]
    fn compatible_placements_respect_tags() {
        let (device, ids) = grid();
        let ffs = device.compatible_placements(PrimitiveKind::Fdre);
        assert_eq!(ffs.len(), 8);
        for (site, bel) in &ffs {
            assert_eq!(
                device.bel(*site, *bel).unwrap().compat,
                Some(PrimitiveKind::Fdre)
            );
        }
        let ibufs = device.compatible_placements(PrimitiveKind::Ibuf);
        assert_eq!(ibufs.len(), 1);
        assert_eq!(ibufs[0].0, ids[3]);
        assert!(device.compatible_placements(PrimitiveKind::Gnd).is_empty());
    }

    #[test]
    fn bel_pin_path_lookup() {
        let (device, ids) = grid();
        let aff = device.bel_by_name(ids[0], "AFF").unwrap();
        let path = device.bel_pin_path(ids[0], aff, "SR").unwrap();
        assert_eq!(path, ["SRUSEDMUX_OUT", "SR"]);
        assert!(device.bel_pin_path(ids[0], aff, "NOPE").is_none());
    }

    #[test]
    fn site_pip_queries() {
        let (device, ids) = grid();
        let pip = device.site_pip(ids[2], "CEINV", "CE").unwrap();
        assert_eq!(device.site_pip_def(ids[2], pip).unwrap().mux, "CEINV");
        assert_eq!(device.site_pip_between(ids[2], "CE", "CEINV_OUT"), Some(pip));
        assert!(device.site_pip(ids[0], "CEINV", "CE").is_none());
    }

    #[test]
    fn fanout_of_unknown_node_is_empty() {
        let (device, _) = grid();
        assert!(device.node_fanout(NodeId::from_raw(3)).is_empty());
    }
}
