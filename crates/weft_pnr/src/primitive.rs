//! Per-primitive behavior table.
//!
//! One [`PrimitiveDescriptor`] per [`PrimitiveKind`] drives placement policy,
//! the fixed constant wiring applied after placement, and the SitePIPs the
//! site configurator activates. Nothing else in the flow branches on the
//! primitive type.

use crate::data::{Design, NetKind, PinDirection, StaticLevel};
use crate::ids::CellId;
use weft_fabric::PrimitiveKind;

/// How the placer picks a resource for a primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementPolicy {
    /// Logical constants occupy no resource.
    Skip,
    /// Placed at the site bonded to the package pin of its pad port.
    Constrained,
    /// Placed at the one designated global clock resource.
    GlobalClock,
    /// Placed by seeded rejection sampling over compatible resources.
    Random,
}

/// How the SitePIP for one pin is found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SitePipRule {
    /// A fixed mux input.
    Fixed {
        /// The routing mux.
        mux: &'static str,
        /// The mux input to select.
        input: &'static str,
    },
    /// The SitePIP joining the first two wires of the pin's site-wire path.
    /// Single-wire paths need none.
    FollowPath,
}

/// A SitePIP requirement for one logical pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinRule {
    /// The logical pin name.
    pub pin: &'static str,
    /// How to find its SitePIP.
    pub rule: SitePipRule,
}

/// The declarative behavior of one primitive type.
#[derive(Debug)]
pub struct PrimitiveDescriptor {
    /// The primitive this entry describes.
    pub kind: PrimitiveKind,
    /// Placement strategy.
    pub placement: PlacementPolicy,
    /// Control inputs tied to constants once the cell is placed, when unused.
    pub static_ties: &'static [(&'static str, StaticLevel)],
    /// Pins whose connection to the site boundary needs a SitePIP.
    pub site_pips: &'static [PinRule],
    /// Logical pin to BEL pin renames; unlisted pins keep their name.
    pub bel_pins: &'static [(&'static str, &'static str)],
    /// The pin facing the package pad, which never joins a design net.
    pub pad_pin: Option<&'static str>,
}

impl PrimitiveDescriptor {
    /// Maps a logical pin name to the BEL pin it lands on.
    pub fn bel_pin<'a>(&self, logical: &'a str) -> &'a str {
        self.bel_pins
            .iter()
            .find(|(from, _)| *from == logical)
            .map(|(_, to)| *to)
            .unwrap_or(logical)
    }
}

const LUT: PrimitiveDescriptor = PrimitiveDescriptor {
    kind: PrimitiveKind::Lut,
    placement: PlacementPolicy::Random,
    static_ties: &[],
    site_pips: &[PinRule {
        pin: "O",
        rule: SitePipRule::FollowPath,
    }],
    bel_pins: &[
        ("I0", "A1"),
        ("I1", "A2"),
        ("I2", "A3"),
        ("I3", "A4"),
        ("I4", "A5"),
        ("I5", "A6"),
        ("O", "O6"),
    ],
    pad_pin: None,
};

const FDRE: PrimitiveDescriptor = PrimitiveDescriptor {
    kind: PrimitiveKind::Fdre,
    placement: PlacementPolicy::Random,
    static_ties: &[("R", StaticLevel::Low), ("CE", StaticLevel::High)],
    site_pips: &[
        PinRule {
            pin: "CE",
            rule: SitePipRule::Fixed {
                mux: "CEUSEDMUX",
                input: "1",
            },
        },
        PinRule {
            pin: "R",
            rule: SitePipRule::Fixed {
                mux: "SRUSEDMUX",
                input: "0",
            },
        },
        PinRule {
            pin: "C",
            rule: SitePipRule::Fixed {
                mux: "CLKINV",
                input: "CLK",
            },
        },
        PinRule {
            pin: "D",
            rule: SitePipRule::FollowPath,
        },
        PinRule {
            pin: "Q",
            rule: SitePipRule::FollowPath,
        },
    ],
    bel_pins: &[("C", "CK"), ("R", "SR")],
    pad_pin: None,
};

const BUFGCTRL: PrimitiveDescriptor = PrimitiveDescriptor {
    kind: PrimitiveKind::Bufgctrl,
    placement: PlacementPolicy::GlobalClock,
    static_ties: &[
        ("CE0", StaticLevel::High),
        ("S0", StaticLevel::High),
        ("CE1", StaticLevel::Low),
        ("S1", StaticLevel::Low),
        ("IGNORE0", StaticLevel::Low),
        ("IGNORE1", StaticLevel::Low),
    ],
    site_pips: &[
        PinRule {
            pin: "CE0",
            rule: SitePipRule::FollowPath,
        },
        PinRule {
            pin: "S0",
            rule: SitePipRule::FollowPath,
        },
    ],
    bel_pins: &[],
    pad_pin: None,
};

const BUFHCE: PrimitiveDescriptor = PrimitiveDescriptor {
    kind: PrimitiveKind::Bufhce,
    placement: PlacementPolicy::Random,
    static_ties: &[("CE", StaticLevel::High)],
    site_pips: &[PinRule {
        pin: "CE",
        rule: SitePipRule::Fixed {
            mux: "CEINV",
            input: "CE",
        },
    }],
    bel_pins: &[],
    pad_pin: None,
};

const IBUF: PrimitiveDescriptor = PrimitiveDescriptor {
    kind: PrimitiveKind::Ibuf,
    placement: PlacementPolicy::Constrained,
    static_ties: &[],
    site_pips: &[],
    bel_pins: &[("O", "OUT")],
    pad_pin: Some("I"),
};

const OBUF: PrimitiveDescriptor = PrimitiveDescriptor {
    kind: PrimitiveKind::Obuf,
    placement: PlacementPolicy::Constrained,
    static_ties: &[],
    site_pips: &[],
    bel_pins: &[("I", "IN")],
    pad_pin: Some("O"),
};

const GND: PrimitiveDescriptor = PrimitiveDescriptor {
    kind: PrimitiveKind::Gnd,
    placement: PlacementPolicy::Skip,
    static_ties: &[],
    site_pips: &[],
    bel_pins: &[],
    pad_pin: None,
};

const VCC: PrimitiveDescriptor = PrimitiveDescriptor {
    kind: PrimitiveKind::Vcc,
    placement: PlacementPolicy::Skip,
    static_ties: &[],
    site_pips: &[],
    bel_pins: &[],
    pad_pin: None,
};

/// Returns the descriptor of a primitive type.
pub fn descriptor(kind: PrimitiveKind) -> &'static PrimitiveDescriptor {
    match kind {
        PrimitiveKind::Lut => &LUT,
        PrimitiveKind::Fdre => &FDRE,
        PrimitiveKind::Bufgctrl => &BUFGCTRL,
        PrimitiveKind::Bufhce => &BUFHCE,
        PrimitiveKind::Ibuf => &IBUF,
        PrimitiveKind::Obuf => &OBUF,
        PrimitiveKind::Gnd => &GND,
        PrimitiveKind::Vcc => &VCC,
    }
}

/// Ties every unused control input listed in the cell's descriptor to its
/// constant. Pins already carrying a non-static signal are left alone.
///
/// Returns how many pins were tied.
pub fn apply_static_ties(design: &mut Design, cell: CellId) -> usize {
    let desc = descriptor(design.cell(cell).kind);
    let mut tied = 0;
    for &(name, level) in desc.static_ties {
        let pin = design.ensure_pin(cell, name, PinDirection::Input);
        let in_use = design
            .pin(pin)
            .net
            .is_some_and(|n| design.net(n).kind != NetKind::Static);
        if in_use {
            continue;
        }
        design.pin_mut(pin).tie = Some(level);
        tied += 1;
    }
    tied
}
