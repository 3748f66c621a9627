//! Core design data structures.
//!
//! Defines the design mutated by the flow: cells (with optional placement and
//! a lifecycle state), nets (one driver, sinks, committed route, lock flag),
//! pins (cell connections to nets, optionally tied to a constant), and the
//! per-site SitePIP state. The [`Design`] is the unit handed to checkpoints.

use crate::ids::{CellId, NetId, PinId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use weft_fabric::{BelId, NodeId, PrimitiveKind, SiteId, SitePipId};

/// The design being implemented.
///
/// Cells, nets and pins live in arenas indexed by their IDs and are never
/// removed. Name indices are rebuilt after deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Design {
    /// The top-level module name.
    pub name: String,
    /// All cells.
    pub cells: Vec<Cell>,
    /// All nets.
    pub nets: Vec<Net>,
    /// All pins.
    pub pins: Vec<Pin>,
    /// SitePIP state of every site touched by configuration.
    pub site_insts: BTreeMap<SiteId, SiteInst>,
    #[serde(skip)]
    cell_by_name: HashMap<String, CellId>,
    #[serde(skip)]
    net_by_name: HashMap<String, NetId>,
}

impl Design {
    /// Creates an empty design.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: Vec::new(),
            nets: Vec::new(),
            pins: Vec::new(),
            site_insts: BTreeMap::new(),
            cell_by_name: HashMap::new(),
            net_by_name: HashMap::new(),
        }
    }

    /// Adds an unplaced cell and returns its ID.
    pub fn add_cell(
        &mut self,
        name: impl Into<String>,
        kind: PrimitiveKind,
        type_name: impl Into<String>,
    ) -> CellId {
        let id = CellId::from_raw(self.cells.len() as u32);
        let name = name.into();
        self.cell_by_name.insert(name.clone(), id);
        self.cells.push(Cell {
            id,
            name,
            kind,
            type_name: type_name.into(),
            properties: BTreeMap::new(),
            pins: Vec::new(),
            placement: None,
            state: CellState::Unplaced,
            pad: None,
        });
        id
    }

    /// Adds an unconnected pin to a cell and returns its ID.
    pub fn add_pin(
        &mut self,
        cell: CellId,
        name: impl Into<String>,
        direction: PinDirection,
    ) -> PinId {
        let id = PinId::from_raw(self.pins.len() as u32);
        self.pins.push(Pin {
            id,
            name: name.into(),
            direction,
            cell,
            net: None,
            tie: None,
        });
        self.cell_mut(cell).pins.push(id);
        id
    }

    /// Returns the named pin of a cell, creating it if it does not exist.
    pub fn ensure_pin(&mut self, cell: CellId, name: &str, direction: PinDirection) -> PinId {
        match self.cell_pin(cell, name) {
            Some(pin) => pin,
            None => self.add_pin(cell, name, direction),
        }
    }

    /// Adds a net driven by `driver` and returns its ID.
    pub fn add_net(&mut self, name: impl Into<String>, kind: NetKind, driver: PinId) -> NetId {
        let id = NetId::from_raw(self.nets.len() as u32);
        let name = name.into();
        self.net_by_name.insert(name.clone(), id);
        self.nets.push(Net {
            id,
            name,
            kind,
            driver,
            sinks: Vec::new(),
            route: None,
            locked: false,
        });
        self.pin_mut(driver).net = Some(id);
        id
    }

    /// Attaches a pin to a net as a sink.
    pub fn connect_sink(&mut self, net: NetId, pin: PinId) {
        self.net_mut(net).sinks.push(pin);
        self.pin_mut(pin).net = Some(net);
    }

    /// Detaches a sink pin from a net. Returns `false` if it was not a sink.
    pub fn disconnect_sink(&mut self, net: NetId, pin: PinId) -> bool {
        let sinks = &mut self.net_mut(net).sinks;
        let Some(pos) = sinks.iter().position(|&p| p == pin) else {
            return false;
        };
        sinks.remove(pos);
        let pin = self.pin_mut(pin);
        if pin.net == Some(net) {
            pin.net = None;
        }
        true
    }

    /// Returns the cell with the given ID.
    pub fn cell(&self, id: CellId) -> &Cell {
        &self.cells[id.as_raw() as usize]
    }

    /// Returns a mutable reference to the cell with the given ID.
    pub fn cell_mut(&mut self, id: CellId) -> &mut Cell {
        &mut self.cells[id.as_raw() as usize]
    }

    /// Returns the net with the given ID.
    pub fn net(&self, id: NetId) -> &Net {
        &self.nets[id.as_raw() as usize]
    }

    /// Returns a mutable reference to the net with the given ID.
    pub fn net_mut(&mut self, id: NetId) -> &mut Net {
        &mut self.nets[id.as_raw() as usize]
    }

    /// Returns the pin with the given ID.
    pub fn pin(&self, id: PinId) -> &Pin {
        &self.pins[id.as_raw() as usize]
    }

    /// Returns a mutable reference to the pin with the given ID.
    pub fn pin_mut(&mut self, id: PinId) -> &mut Pin {
        &mut self.pins[id.as_raw() as usize]
    }

    /// Finds a cell by name.
    pub fn cell_by_name(&self, name: &str) -> Option<CellId> {
        self.cell_by_name.get(name).copied()
    }

    /// Finds a net by name.
    pub fn net_by_name(&self, name: &str) -> Option<NetId> {
        self.net_by_name.get(name).copied()
    }

    /// Finds a pin of a cell by name.
    pub fn cell_pin(&self, cell: CellId, name: &str) -> Option<PinId> {
        self.cell(cell)
            .pins
            .iter()
            .copied()
            .find(|&p| self.pin(p).name == name)
    }

    /// Returns `cell/pin` for reporting.
    pub fn pin_path(&self, pin: PinId) -> String {
        let pin = self.pin(pin);
        format!("{}/{}", self.cell(pin.cell).name, pin.name)
    }

    /// Returns `base` if no cell uses it yet, otherwise `base_1`, `base_2`, ...
    pub fn unique_cell_name(&self, base: &str) -> String {
        unique_name(base, |n| self.cell_by_name.contains_key(n))
    }

    /// Returns `base` if no net uses it yet, otherwise `base_1`, `base_2`, ...
    pub fn unique_net_name(&self, base: &str) -> String {
        unique_name(base, |n| self.net_by_name.contains_key(n))
    }

    /// Returns the SitePIP state of a site, creating an empty one if needed.
    pub fn site_inst_mut(&mut self, site: SiteId) -> &mut SiteInst {
        self.site_insts.entry(site).or_default()
    }

    /// Returns the SitePIP state of a site, if any SitePIP was ever activated there.
    pub fn site_inst(&self, site: SiteId) -> Option<&SiteInst> {
        self.site_insts.get(&site)
    }

    /// Marks a net's route as protected from re-routing.
    pub fn lock_net(&mut self, net: NetId) {
        self.net_mut(net).locked = true;
    }

    /// Clears a net's lock.
    pub fn unlock_net(&mut self, net: NetId) {
        self.net_mut(net).locked = false;
    }

    /// Returns the number of cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Returns the number of nets.
    pub fn net_count(&self) -> usize {
        self.nets.len()
    }

    /// Returns the number of placed cells.
    pub fn placed_count(&self) -> usize {
        self.cells.iter().filter(|c| c.placement.is_some()).count()
    }

    /// Returns whether every cell needing a physical resource is placed.
    pub fn is_fully_placed(&self) -> bool {
        self.cells
            .iter()
            .all(|c| c.kind.is_constant() || c.placement.is_some())
    }

    /// Returns the number of nets with a committed route.
    pub fn routed_count(&self) -> usize {
        self.nets.iter().filter(|n| n.route.is_some()).count()
    }

    /// Rebuilds auxiliary indices after deserialization.
    pub fn rebuild_indices(&mut self) {
        self.cell_by_name = self
            .cells
            .iter()
            .map(|c| (c.name.clone(), c.id))
            .collect();
        self.net_by_name = self.nets.iter().map(|n| (n.name.clone(), n.id)).collect();
    }
}

fn unique_name(base: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(base) {
        return base.to_string();
    }
    (1..)
        .map(|i| format!("{base}_{i}"))
        .find(|n| !taken(n))
        .unwrap_or_else(|| base.to_string())
}

/// Lifecycle of a cell through the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellState {
    /// Loaded, no resource assigned.
    Unplaced,
    /// Holds a `(site, BEL)` in the registry.
    Placed,
    /// All active pins are connected to the site boundary.
    Configured,
}

/// A primitive instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    /// The unique ID of this cell.
    pub id: CellId,
    /// Instance name.
    pub name: String,
    /// Primitive type.
    pub kind: PrimitiveKind,
    /// The type name as written in the netlist (e.g., "LUT4").
    pub type_name: String,
    /// Instance properties (e.g., `INIT`, `IOSTANDARD`).
    pub properties: BTreeMap<String, String>,
    /// Pins owned by this cell.
    pub pins: Vec<PinId>,
    /// Assigned resource.
    pub placement: Option<(SiteId, BelId)>,
    /// Lifecycle state.
    pub state: CellState,
    /// The top-level port an I/O buffer is bonded to.
    pub pad: Option<String>,
}

/// Direction of a pin relative to its cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinDirection {
    /// Driven from outside the cell.
    Input,
    /// Driven by the cell.
    Output,
}

/// A constant logic level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StaticLevel {
    /// Constant low (ground).
    Low,
    /// Constant high (supply).
    High,
}

/// A pin instance on a cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pin {
    /// The unique ID of this pin.
    pub id: PinId,
    /// Logical pin name (e.g., "D", "I0", "CE").
    pub name: String,
    /// Pin direction.
    pub direction: PinDirection,
    /// Owning cell.
    pub cell: CellId,
    /// Connected net.
    pub net: Option<NetId>,
    /// Constant level the pin is tied to.
    pub tie: Option<StaticLevel>,
}

impl Pin {
    /// A pin is active when it carries a signal or a constant.
    pub fn is_active(&self) -> bool {
        self.net.is_some() || self.tie.is_some()
    }
}

/// The role of a net.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetKind {
    /// Ordinary logic signal.
    Signal,
    /// Clock distribution.
    Clock,
    /// Driven by a constant source.
    Static,
}

/// A directed interconnect PIP used by a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteEdge {
    /// Upstream node.
    pub from: NodeId,
    /// Downstream node.
    pub to: NodeId,
}

/// A committed net route.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetRoute {
    /// Deduplicated PIP edges, in the order they were found.
    pub edges: Vec<RouteEdge>,
    /// Sinks that could not be reached.
    pub unrouted: Vec<PinId>,
}

impl NetRoute {
    /// Returns `true` if every sink was reached.
    pub fn is_complete(&self) -> bool {
        self.unrouted.is_empty()
    }
}

/// A net: one driver pin and any number of sink pins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Net {
    /// The unique ID of this net.
    pub id: NetId,
    /// Net name.
    pub name: String,
    /// Net role.
    pub kind: NetKind,
    /// The single driver pin.
    pub driver: PinId,
    /// Sink pins.
    pub sinks: Vec<PinId>,
    /// Committed route.
    pub route: Option<NetRoute>,
    /// A locked route may not be replaced.
    pub locked: bool,
}

/// SitePIP state of one site.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteInst {
    /// The active SitePIP of each mux, keyed by mux name.
    pub active: BTreeMap<String, SitePipId>,
    /// Site wires joined by active SitePIPs, as of the last commit.
    pub routed_wires: BTreeSet<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lut_chain() -> (Design, CellId, CellId, NetId) {
        let mut d = Design::new("top");
        let a = d.add_cell("a", PrimitiveKind::Lut, "LUT2");
        let b = d.add_cell("b", PrimitiveKind::Lut, "LUT1");
        let o = d.add_pin(a, "O", PinDirection::Output);
        let i = d.add_pin(b, "I0", PinDirection::Input);
        let n = d.add_net("a_o", NetKind::Signal, o);
        d.connect_sink(n, i);
        (d, a, b, n)
    }

    #[test]
    fn empty_design() {
        let d = Design::new("top");
        assert_eq!(d.cell_count(), 0);
        assert_eq!(d.net_count(), 0);
        assert!(d.is_fully_placed());
        assert_eq!(d.routed_count(), 0);
    }

    #[test]
    fn connectivity() {
        let (d, a, b, n) = lut_chain();
        let net = d.net(n);
        assert_eq!(d.pin(net.driver).cell, a);
        assert_eq!(net.sinks.len(), 1);
        assert_eq!(d.pin(net.sinks[0]).cell, b);
        assert_eq!(d.pin(net.sinks[0]).net, Some(n));
        assert_eq!(d.pin_path(net.sinks[0]), "b/I0");
    }

    #[test]
    fn disconnect_sink_clears_pin() {
        let (mut d, _, b, n) = lut_chain();
        let i = d.cell_pin(b, "I0").unwrap();
        assert!(d.disconnect_sink(n, i));
        assert!(d.net(n).sinks.is_empty());
        assert_eq!(d.pin(i).net, None);
        assert!(!d.disconnect_sink(n, i));
    }

    #[test]
    fn ensure_pin_reuses_existing() {
        let (mut d, a, _, _) = lut_chain();
        let o = d.cell_pin(a, "O").unwrap();
        assert_eq!(d.ensure_pin(a, "O", PinDirection::Output), o);
        let ce = d.ensure_pin(a, "I1", PinDirection::Input);
        assert_ne!(ce, o);
        assert_eq!(d.cell(a).pins.len(), 2);
    }

    #[test]
    fn unique_names() {
        let (d, _, _, _) = lut_chain();
        assert_eq!(d.unique_cell_name("c"), "c");
        assert_eq!(d.unique_cell_name("a"), "a_1");
        assert_eq!(d.unique_net_name("a_o"), "a_o_1");
    }

    #[test]
    fn constants_do_not_count_as_unplaced() {
        let mut d = Design::new("top");
        d.add_cell("GND", PrimitiveKind::Gnd, "GND");
        assert!(d.is_fully_placed());
        d.add_cell("ff", PrimitiveKind::Fdre, "FDRE");
        assert!(!d.is_fully_placed());
    }

    #[test]
    fn active_pins() {
        let (mut d, a, _, _) = lut_chain();
        let o = d.cell_pin(a, "O").unwrap();
        assert!(d.pin(o).is_active());
        let spare = d.add_pin(a, "I1", PinDirection::Input);
        assert!(!d.pin(spare).is_active());
        d.pin_mut(spare).tie = Some(StaticLevel::High);
        assert!(d.pin(spare).is_active());
    }

    #[test]
    fn lock_and_unlock() {
        let (mut d, _, _, n) = lut_chain();
        d.lock_net(n);
        assert!(d.net(n).locked);
        d.unlock_net(n);
        assert!(!d.net(n).locked);
    }

    #[test]
    fn serde_roundtrip_rebuilds_indices() {
        let (mut d, _, _, _) = lut_chain();
        d.site_inst_mut(SiteId::from_raw(4))
            .active
            .insert("CLKINV".into(), SitePipId::from_raw(2));
        let json = serde_json::to_string(&d).unwrap();
        let mut back: Design = serde_json::from_str(&json).unwrap();
        assert_eq!(back.cell_by_name("a"), None);
        back.rebuild_indices();
        assert_eq!(back.cell_by_name("a"), Some(CellId::from_raw(0)));
        assert_eq!(back.net_by_name("a_o"), Some(NetId::from_raw(0)));
        assert_eq!(
            back.site_inst(SiteId::from_raw(4)).unwrap().active["CLKINV"],
            SitePipId::from_raw(2)
        );
    }
}
