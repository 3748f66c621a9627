//! In-memory reference device built from a JSON description or programmatically.

use crate::error::FabricError;
use crate::ids::{NodeId, SiteId};
use crate::templates::builtin_site_types;
use crate::types::{Node, Site, SiteType, SiteTypeDef};
use crate::Fabric;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// The on-disk JSON form of a device.
///
/// Site types omitted from `site_types` fall back to the built-in templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceDescription {
    /// The device part name.
    pub name: String,
    /// Site-type definitions overriding the built-ins.
    #[serde(default)]
    pub site_types: Vec<SiteTypeDef>,
    /// Every site of the device.
    pub sites: Vec<Site>,
    /// Every interconnect node.
    #[serde(default)]
    pub nodes: Vec<NodeDescription>,
    /// Directed PIP edges between nodes, by name.
    #[serde(default)]
    pub edges: Vec<(String, String)>,
    /// Site pins bound to interconnect nodes.
    #[serde(default)]
    pub site_pins: Vec<SitePinBinding>,
}

/// An interconnect node as written in a [`DeviceDescription`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDescription {
    /// The node name.
    pub name: String,
    /// Column of the node's tile.
    pub col: i32,
    /// Row of the node's tile.
    pub row: i32,
    /// Marks a pass-through resource.
    #[serde(default)]
    pub route_thru: bool,
}

/// Binds one site pin to the interconnect node it touches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SitePinBinding {
    /// The site name.
    pub site: String,
    /// The site pin name.
    pub pin: String,
    /// The node name.
    pub node: String,
}

/// A concrete device implementing [`Fabric`].
#[derive(Debug, Clone)]
pub struct Device {
    name: String,
    site_types: BTreeMap<SiteType, SiteTypeDef>,
    sites: Vec<Site>,
    site_index: HashMap<String, SiteId>,
    package_pins: HashMap<String, SiteId>,
    nodes: Vec<Node>,
    node_index: HashMap<String, NodeId>,
    site_pins: HashMap<(SiteId, String), NodeId>,
}

impl Device {
    /// Builds a device from its description, resolving all names.
    pub fn from_description(desc: DeviceDescription) -> Result<Self, FabricError> {
        let mut builder = DeviceBuilder::new(desc.name);
        for def in desc.site_types {
            builder.site_type(def);
        }
        for site in desc.sites {
            builder.sites.push(site);
        }
        let mut nodes = HashMap::new();
        for node in desc.nodes {
            let id = if node.route_thru {
                builder.add_route_thru(&node.name, node.col, node.row)
            } else {
                builder.add_node(&node.name, node.col, node.row)
            };
            if nodes.insert(node.name.clone(), id).is_some() {
                return Err(FabricError::DuplicateNode(node.name));
            }
        }
        let resolve = |name: &str| {
            nodes
                .get(name)
                .copied()
                .ok_or_else(|| FabricError::UnknownNode(name.to_string()))
        };
        for (from, to) in &desc.edges {
            builder.connect(resolve(from)?, resolve(to)?);
        }
        for binding in desc.site_pins {
            let node = resolve(&binding.node)?;
            let site = builder
                .sites
                .iter()
                .position(|s| s.name == binding.site)
                .map(|i| SiteId::from_raw(i as u32))
                .ok_or_else(|| FabricError::UnknownSite(binding.site.clone()))?;
            builder.bind_site_pin(site, &binding.pin, node);
        }
        builder.build()
    }

    /// Parses a JSON device description.
    pub fn from_json(content: &str) -> Result<Self, FabricError> {
        let desc: DeviceDescription =
            serde_json::from_str(content).map_err(|e| FabricError::Parse(e.to_string()))?;
        Self::from_description(desc)
    }
}

/// Loads a device from a JSON description file.
pub fn load_device(path: &Path) -> Result<Device, FabricError> {
    let content = std::fs::read_to_string(path)?;
    Device::from_json(&content)
}

/// Incrementally constructs a [`Device`].
///
/// IDs are handed out in insertion order. Name uniqueness is checked by
/// [`build`](Self::build).
#[derive(Debug)]
pub struct DeviceBuilder {
    name: String,
    site_types: BTreeMap<SiteType, SiteTypeDef>,
    sites: Vec<Site>,
    nodes: Vec<Node>,
    site_pins: Vec<(SiteId, String, NodeId)>,
}

impl DeviceBuilder {
    /// Starts a device with the built-in site types.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            site_types: builtin_site_types()
                .into_iter()
                .map(|def| (def.site_type, def))
                .collect(),
            sites: Vec::new(),
            nodes: Vec::new(),
            site_pins: Vec::new(),
        }
    }

    /// Replaces the definition of one site type.
    pub fn site_type(&mut self, def: SiteTypeDef) -> &mut Self {
        self.site_types.insert(def.site_type, def);
        self
    }

    /// Adds a site at the given RPM coordinates.
    pub fn add_site(&mut self, name: &str, site_type: SiteType, col: i32, row: i32) -> SiteId {
        self.push_site(Site {
            name: name.to_string(),
            site_type,
            col,
            row,
            package_pin: None,
        })
    }

    /// Adds an I/O site bonded to `package_pin`.
    pub fn add_io_site(&mut self, name: &str, package_pin: &str, col: i32, row: i32) -> SiteId {
        self.push_site(Site {
            name: name.to_string(),
            site_type: SiteType::Iob,
            col,
            row,
            package_pin: Some(package_pin.to_string()),
        })
    }

    fn push_site(&mut self, site: Site) -> SiteId {
        let id = SiteId::from_raw(self.sites.len() as u32);
        self.sites.push(site);
        id
    }

    /// Adds an ordinary interconnect node.
    pub fn add_node(&mut self, name: &str, col: i32, row: i32) -> NodeId {
        self.push_node(name, col, row, false)
    }

    /// Adds a pass-through node that routes may not enter.
    pub fn add_route_thru(&mut self, name: &str, col: i32, row: i32) -> NodeId {
        self.push_node(name, col, row, true)
    }

    fn push_node(&mut self, name: &str, col: i32, row: i32, route_thru: bool) -> NodeId {
        let id = NodeId::from_raw(self.nodes.len() as u32);
        self.nodes.push(Node {
            name: name.to_string(),
            col,
            row,
            route_thru,
            fanout: Vec::new(),
        });
        id
    }

    /// Adds a directed PIP edge. Repeated edges are ignored.
    pub fn connect(&mut self, from: NodeId, to: NodeId) -> &mut Self {
        if let Some(node) = self.nodes.get_mut(from.index()) {
            if !node.fanout.contains(&to) {
                node.fanout.push(to);
            }
        }
        self
    }

    /// Binds a site pin to the node it touches.
    pub fn bind_site_pin(&mut self, site: SiteId, pin: &str, node: NodeId) -> &mut Self {
        self.site_pins.push((site, pin.to_string(), node));
        self
    }

    /// Validates names and references and produces the device.
    pub fn build(self) -> Result<Device, FabricError> {
        let mut site_index = HashMap::new();
        let mut package_pins = HashMap::new();
        for (i, site) in self.sites.iter().enumerate() {
            let id = SiteId::from_raw(i as u32);
            if !self.site_types.contains_key(&site.site_type) {
                return Err(FabricError::MissingSiteType(site.site_type.to_string()));
            }
            if site_index.insert(site.name.clone(), id).is_some() {
                return Err(FabricError::DuplicateSite(site.name.clone()));
            }
            if let Some(pin) = &site.package_pin {
                if package_pins.insert(pin.clone(), id).is_some() {
                    return Err(FabricError::DuplicatePackagePin(pin.clone()));
                }
            }
        }

        let mut node_index = HashMap::new();
        for (i, node) in self.nodes.iter().enumerate() {
            if node_index
                .insert(node.name.clone(), NodeId::from_raw(i as u32))
                .is_some()
            {
                return Err(FabricError::DuplicateNode(node.name.clone()));
            }
            if let Some(bad) = node.fanout.iter().find(|n| n.index() >= self.nodes.len()) {
                return Err(FabricError::UnknownNode(format!("#{bad}")));
            }
        }

        let mut site_pins = HashMap::new();
        for (site, pin, node) in self.site_pins {
            if site.index() >= self.sites.len() {
                return Err(FabricError::UnknownSite(format!("#{site}")));
            }
            if node.index() >= self.nodes.len() {
                return Err(FabricError::UnknownNode(format!("#{node}")));
            }
            site_pins.insert((site, pin), node);
        }

        Ok(Device {
            name: self.name,
            site_types: self.site_types,
            sites: self.sites,
            site_index,
            package_pins,
            nodes: self.nodes,
            node_index,
            site_pins,
        })
    }
}

impl Fabric for Device {
    fn device_name(&self) -> &str {
        &self.name
    }

    fn site_count(&self) -> usize {
        self.sites.len()
    }

    fn site(&self, id: SiteId) -> Option<&Site> {
        self.sites.get(id.index())
    }

    fn site_by_name(&self, name: &str) -> Option<SiteId> {
        self.site_index.get(name).copied()
    }

    fn site_type_def(&self, site_type: SiteType) -> Option<&SiteTypeDef> {
        self.site_types.get(&site_type)
    }

    fn site_for_package_pin(&self, pin: &str) -> Option<SiteId> {
        self.package_pins.get(pin).copied()
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    fn node_by_name(&self, name: &str) -> Option<NodeId> {
        self.node_index.get(name).copied()
    }

    fn site_pin_node(&self, site: SiteId, pin: &str) -> Option<NodeId> {
        self.site_pins.get(&(site, pin.to_string())).copied()
    }
}
