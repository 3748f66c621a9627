//! Shared test fixtures: a small device with a routable interconnect grid,
//! and a clocked design that exercises every stage.

use crate::data::{Design, NetKind, PinDirection};
use std::collections::BTreeMap;
use weft_config::PinAssignment;
use weft_fabric::{Device, DeviceBuilder, NodeId, PrimitiveKind, SiteId, SiteType};

const GRID: i32 = 4;

fn slice_outputs() -> Vec<String> {
    ["AMUX", "BMUX", "CMUX", "DMUX", "AQ", "BQ", "CQ", "DQ"]
        .map(String::from)
        .to_vec()
}

fn slice_inputs() -> Vec<String> {
    let mut pins = Vec::new();
    for x in ['A', 'B', 'C', 'D'] {
        for k in 1..=6 {
            pins.push(format!("{x}{k}"));
        }
        pins.push(format!("{x}X"));
    }
    pins.extend(["CLK", "CE", "SR"].map(String::from));
    pins
}

fn names(pins: &[&str]) -> Vec<String> {
    pins.iter().map(|p| p.to_string()).collect()
}

struct Grid {
    builder: DeviceBuilder,
    switches: Vec<Vec<NodeId>>,
}

impl Grid {
    fn new(name: &str) -> Self {
        let mut builder = DeviceBuilder::new(name);
        let mut switches = Vec::new();
        for col in 0..GRID {
            let column = (0..GRID)
                .map(|row| builder.add_node(&format!("INT_X{col}Y{row}"), col, row))
                .collect::<Vec<_>>();
            switches.push(column);
        }
        for col in 0..GRID as usize {
            for row in 0..GRID as usize {
                let here = switches[col][row];
                if col + 1 < GRID as usize {
                    let east = switches[col + 1][row];
                    builder.connect(here, east).connect(east, here);
                }
                if row + 1 < GRID as usize {
                    let north = switches[col][row + 1];
                    builder.connect(here, north).connect(north, here);
                }
            }
        }
        Self { builder, switches }
    }

    fn attach(&mut self, site: SiteId, name: &str, col: i32, row: i32, outputs: &[String], inputs: &[String]) {
        let switch = self.switches[col as usize][row as usize];
        for pin in outputs {
            let node = self.builder.add_node(&format!("{name}/{pin}"), col, row);
            self.builder.connect(node, switch);
            self.builder.bind_site_pin(site, pin, node);
        }
        for pin in inputs {
            let node = self.builder.add_node(&format!("{name}/{pin}"), col, row);
            self.builder.connect(switch, node);
            self.builder.bind_site_pin(site, pin, node);
        }
    }

    fn site(&mut self, name: &str, site_type: SiteType, col: i32, row: i32, outputs: &[String], inputs: &[String]) {
        let id = self.builder.add_site(name, site_type, col, row);
        self.attach(id, name, col, row, outputs, inputs);
    }

    fn io_site(&mut self, name: &str, package_pin: &str, col: i32, row: i32) {
        let id = self.builder.add_io_site(name, package_pin, col, row);
        self.attach(id, name, col, row, &names(&["I"]), &names(&["O"]));
    }
}

/// A 4x4 tile device: four slices, three bonded I/O sites, the global clock
/// buffer at `BUFGCTRL_X0Y16`, and three local clock buffers.
pub(crate) fn device() -> Device {
    let mut g = Grid::new("weft-fixture");
    for (col, row) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
        g.site(
            &format!("SLICE_X{col}Y{row}"),
            SiteType::SliceL,
            col,
            row,
            &slice_outputs(),
            &slice_inputs(),
        );
    }
    g.io_site("IOB_X0Y3", "E3", 0, 3);
    g.io_site("IOB_X1Y3", "H5", 1, 3);
    g.io_site("IOB_X2Y3", "C11", 2, 3);
    g.site(
        "BUFGCTRL_X0Y16",
        SiteType::Bufgctrl,
        3,
        3,
        &names(&["O"]),
        &names(&["I0", "I1", "CE0", "CE1", "S0", "S1", "IGNORE0", "IGNORE1"]),
    );
    for (name, col, row) in [
        ("BUFHCE_X0Y0", 3, 0),
        ("BUFHCE_X0Y1", 3, 1),
        ("BUFHCE_X1Y0", 2, 2),
    ] {
        g.site(name, SiteType::Bufhce, col, row, &names(&["O"]), &names(&["I", "CE"]));
    }
    g.builder.build().expect("fixture device is valid")
}

/// A device with a single slice and nothing else.
pub(crate) fn one_slice_device() -> Device {
    let mut g = Grid::new("one-slice");
    g.site("SLICE_X0Y0", SiteType::SliceL, 0, 0, &slice_outputs(), &slice_inputs());
    g.builder.build().expect("fixture device is valid")
}

/// The pin-constraint table matching [`counter_design`].
pub(crate) fn pins() -> BTreeMap<String, PinAssignment> {
    let mut pins = BTreeMap::new();
    pins.insert("i_clk".to_string(), PinAssignment::new("E3", "LVCMOS33"));
    pins
}

/// A clock input buffered through `BUFGCTRL` into `n` flip-flops, each fed
/// back through an inverter LUT.
pub(crate) fn counter_design(n: usize) -> Design {
    let mut d = Design::new("counter");
    let ibuf = d.add_cell("i_clk_IBUF_inst", PrimitiveKind::Ibuf, "IBUF");
    d.cell_mut(ibuf).pad = Some("i_clk".to_string());
    d.add_pin(ibuf, "I", PinDirection::Input);
    let bufg = d.add_cell("i_clk_IBUF_BUFG_inst", PrimitiveKind::Bufgctrl, "BUFGCTRL");

    let ibuf_o = d.add_pin(ibuf, "O", PinDirection::Output);
    let bufg_i = d.add_pin(bufg, "I0", PinDirection::Input);
    let clk_ibuf = d.add_net("i_clk_IBUF", NetKind::Signal, ibuf_o);
    d.connect_sink(clk_ibuf, bufg_i);

    let bufg_o = d.add_pin(bufg, "O", PinDirection::Output);
    let clk = d.add_net("clk", NetKind::Clock, bufg_o);

    for i in 0..n {
        let ff = d.add_cell(format!("q_reg[{i}]"), PrimitiveKind::Fdre, "FDRE");
        let lut = d.add_cell(format!("q[{i}]_i_1"), PrimitiveKind::Lut, "LUT1");
        let c = d.add_pin(ff, "C", PinDirection::Input);
        d.connect_sink(clk, c);
        let q = d.add_pin(ff, "Q", PinDirection::Output);
        let dpin = d.add_pin(ff, "D", PinDirection::Input);
        let i0 = d.add_pin(lut, "I0", PinDirection::Input);
        let o = d.add_pin(lut, "O", PinDirection::Output);
        let qn = d.add_net(format!("q[{i}]"), NetKind::Signal, q);
        d.connect_sink(qn, i0);
        let dn = d.add_net(format!("d[{i}]"), NetKind::Signal, o);
        d.connect_sink(dn, dpin);
    }
    d
}
