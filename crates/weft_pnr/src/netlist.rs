//! JSON netlist loading.
//!
//! A netlist lists top-level ports, primitive cells and nets. Nets that touch
//! a top-level port are pad nets: they stay inside the I/O site, so instead of
//! a design net the I/O buffer records which port it is bonded to.

use crate::data::{Design, NetKind, PinDirection};
use crate::ids::PinId;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use weft_fabric::{PrimitiveKind, UnknownPrimitive};

/// Errors that can occur while loading a netlist.
#[derive(Debug, thiserror::Error)]
pub enum NetlistError {
    /// The netlist file could not be read.
    #[error("failed to read netlist: {0}")]
    Io(#[from] std::io::Error),

    /// The netlist is not valid JSON of the expected shape.
    #[error("failed to parse netlist: {0}")]
    Parse(String),

    /// A cell has a type the flow does not know.
    #[error("cell '{cell}': {source}")]
    UnknownPrimitive {
        /// The cell name.
        cell: String,
        /// The rejected type name.
        #[source]
        source: UnknownPrimitive,
    },

    /// Two cells share a name.
    #[error("duplicate cell '{0}'")]
    DuplicateCell(String),

    /// Two nets share a name.
    #[error("duplicate net '{0}'")]
    DuplicateNet(String),

    /// A net references a cell that is not declared.
    #[error("net '{net}' references unknown cell '{cell}'")]
    UnknownCell {
        /// The net name.
        net: String,
        /// The missing cell.
        cell: String,
    },

    /// A net references a port that is not declared.
    #[error("net '{net}' references unknown port '{port}'")]
    UnknownPort {
        /// The net name.
        net: String,
        /// The missing port.
        port: String,
    },

    /// A design net does not have exactly one driver.
    #[error("net '{net}' has {count} drivers, expected exactly one")]
    DriverCount {
        /// The net name.
        net: String,
        /// Number of output pins found.
        count: usize,
    },

    /// A pin appears on more than one net.
    #[error("pin '{0}' is connected to more than one net")]
    PinConnectedTwice(String),

    /// A pad net touches something other than an I/O buffer.
    #[error("net '{net}' connects port to '{cell}', which is not an I/O buffer")]
    PadNotOnIoBuffer {
        /// The net name.
        net: String,
        /// The offending cell.
        cell: String,
    },
}

#[derive(Debug, Deserialize)]
struct NetlistFile {
    top: String,
    #[serde(default)]
    ports: Vec<PortEntry>,
    #[serde(default)]
    cells: Vec<CellEntry>,
    #[serde(default)]
    nets: Vec<NetEntry>,
}

#[derive(Debug, Deserialize)]
struct PortEntry {
    name: String,
}

#[derive(Debug, Deserialize)]
struct CellEntry {
    name: String,
    #[serde(rename = "type")]
    type_name: String,
    #[serde(default)]
    properties: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct NetEntry {
    name: String,
    pins: Vec<Endpoint>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Endpoint {
    Port {
        port: String,
    },
    Cell {
        cell: String,
        pin: String,
        direction: PinDirection,
    },
}

/// Reads and converts a netlist file.
pub fn load_netlist(path: &Path) -> Result<Design, NetlistError> {
    let content = std::fs::read_to_string(path)?;
    parse_netlist(&content)
}

/// Converts a netlist from its JSON text.
pub fn parse_netlist(content: &str) -> Result<Design, NetlistError> {
    let file: NetlistFile =
        serde_json::from_str(content).map_err(|e| NetlistError::Parse(e.to_string()))?;
    let mut design = Design::new(file.top);

    for entry in file.cells {
        let kind: PrimitiveKind =
            entry
                .type_name
                .parse()
                .map_err(|source| NetlistError::UnknownPrimitive {
                    cell: entry.name.clone(),
                    source,
                })?;
        if design.cell_by_name(&entry.name).is_some() {
            return Err(NetlistError::DuplicateCell(entry.name));
        }
        let cell = design.add_cell(entry.name, kind, entry.type_name);
        design.cell_mut(cell).properties = entry.properties;
    }

    let ports: HashSet<String> = file.ports.into_iter().map(|p| p.name).collect();
    let mut nets_seen = HashSet::new();
    for net in file.nets {
        if !nets_seen.insert(net.name.clone()) {
            return Err(NetlistError::DuplicateNet(net.name));
        }
        let mut port = None;
        let mut pins = Vec::new();
        for endpoint in &net.pins {
            match endpoint {
                Endpoint::Port { port: name } => {
                    if !ports.contains(name) {
                        return Err(NetlistError::UnknownPort {
                            net: net.name.clone(),
                            port: name.clone(),
                        });
                    }
                    port = Some(name.clone());
                }
                Endpoint::Cell {
                    cell,
                    pin,
                    direction,
                } => {
                    let id = design
                        .cell_by_name(cell)
                        .ok_or_else(|| NetlistError::UnknownCell {
                            net: net.name.clone(),
                            cell: cell.clone(),
                        })?;
                    if let Some(existing) = design.cell_pin(id, pin) {
                        let taken = design.pin(existing).net.is_some()
                            || is_pad_pin(&design, existing)
                            || pins.contains(&existing);
                        if taken {
                            return Err(NetlistError::PinConnectedTwice(
                                design.pin_path(existing),
                            ));
                        }
                    }
                    pins.push(design.ensure_pin(id, pin, *direction));
                }
            }
        }

        if let Some(port) = port {
            bond_pad(&mut design, &net.name, port, &pins)?;
        } else {
            connect_net(&mut design, net.name, &pins)?;
        }
    }
    Ok(design)
}

fn is_pad_pin(design: &Design, pin: PinId) -> bool {
    let p = design.pin(pin);
    let cell = design.cell(p.cell);
    cell.pad.is_some()
        && crate::primitive::descriptor(cell.kind).pad_pin == Some(p.name.as_str())
}

fn bond_pad(
    design: &mut Design,
    net: &str,
    port: String,
    pins: &[PinId],
) -> Result<(), NetlistError> {
    for &pin in pins {
        let cell = design.pin(pin).cell;
        if !design.cell(cell).kind.is_io() {
            return Err(NetlistError::PadNotOnIoBuffer {
                net: net.to_string(),
                cell: design.cell(cell).name.clone(),
            });
        }
        design.cell_mut(cell).pad = Some(port.clone());
    }
    Ok(())
}

fn connect_net(design: &mut Design, name: String, pins: &[PinId]) -> Result<(), NetlistError> {
    let drivers: Vec<PinId> = pins
        .iter()
        .copied()
        .filter(|&p| design.pin(p).direction == PinDirection::Output)
        .collect();
    let [driver] = drivers[..] else {
        return Err(NetlistError::DriverCount {
            net: name,
            count: drivers.len(),
        });
    };
    let kind = match design.cell(design.pin(driver).cell).kind {
        PrimitiveKind::Gnd | PrimitiveKind::Vcc => NetKind::Static,
        PrimitiveKind::Bufgctrl => NetKind::Clock,
        _ => NetKind::Signal,
    };
    let net = design.add_net(name, kind, driver);
    for &pin in pins {
        if pin != driver {
            design.connect_sink(net, pin);
        }
    }
    Ok(())
}
