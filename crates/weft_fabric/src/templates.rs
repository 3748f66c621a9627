//! Built-in 7-series style site-type definitions.
//!
//! Devices that do not describe their own site types get these. Only the
//! BELs, muxes and wire paths the flow touches are modelled.

use crate::types::{BelDef, PinPathDef, PrimitiveKind, SitePipDef, SiteType, SiteTypeDef};

const SLICE_LETTERS: [char; 4] = ['A', 'B', 'C', 'D'];

const BUFGCTRL_CONTROLS: [&str; 6] = ["CE0", "CE1", "S0", "S1", "IGNORE0", "IGNORE1"];

/// Returns every built-in site type.
pub fn builtin_site_types() -> Vec<SiteTypeDef> {
    vec![slicel(), iob33(), bufgctrl(), bufhce()]
}

fn bel(name: impl Into<String>, compat: Option<PrimitiveKind>) -> BelDef {
    BelDef {
        name: name.into(),
        compat,
    }
}

fn pip(mux: &str, input: &str, input_wire: &str, output_wire: &str) -> SitePipDef {
    SitePipDef {
        mux: mux.to_string(),
        input: input.to_string(),
        input_wire: input_wire.to_string(),
        output_wire: output_wire.to_string(),
    }
}

fn path(bel: &str, pin: &str, wires: &[&str]) -> PinPathDef {
    PinPathDef {
        bel: bel.to_string(),
        pin: pin.to_string(),
        wires: wires.iter().map(|w| w.to_string()).collect(),
    }
}

/// A logic slice: four 6-input LUTs, four flip-flops, their data muxes, and
/// the shared clock, clock-enable and set/reset muxes.
pub fn slicel() -> SiteTypeDef {
    let mut bels = Vec::new();
    let mut site_pips = Vec::new();
    let mut pin_paths = Vec::new();

    for x in SLICE_LETTERS {
        let lut = format!("{x}6LUT");
        let ff = format!("{x}FF");
        let ffmux = format!("{x}FFMUX");
        let outmux = format!("{x}OUTMUX");
        let o6 = format!("{x}6LUT_O6");
        let ffmux_out = format!("{x}FFMUX_OUT");
        let bypass = format!("{x}X");
        let mux_pin = format!("{x}MUX");

        bels.push(bel(&lut, Some(PrimitiveKind::Lut)));
        bels.push(bel(&ff, Some(PrimitiveKind::Fdre)));
        bels.push(bel(&ffmux, None));
        bels.push(bel(&outmux, None));

        site_pips.push(pip(&ffmux, "BYP", &bypass, &ffmux_out));
        site_pips.push(pip(&ffmux, "D6", &o6, &ffmux_out));
        site_pips.push(pip(&outmux, "O6", &o6, &mux_pin));

        pin_paths.push(path(&lut, "O6", &[o6.as_str(), mux_pin.as_str()]));
        for k in 1..=6 {
            let input = format!("{x}{k}");
            pin_paths.push(path(&lut, &format!("A{k}"), &[input.as_str()]));
        }
        pin_paths.push(path(&ff, "D", &[ffmux_out.as_str(), bypass.as_str()]));
        pin_paths.push(path(&ff, "Q", &[format!("{x}Q").as_str()]));
        pin_paths.push(path(&ff, "CK", &["CLKINV_OUT", "CLK"]));
        pin_paths.push(path(&ff, "CE", &["CEUSEDMUX_OUT", "CE"]));
        pin_paths.push(path(&ff, "SR", &["SRUSEDMUX_OUT", "SR"]));
    }

    bels.push(bel("CLKINV", None));
    bels.push(bel("CEUSEDMUX", None));
    bels.push(bel("SRUSEDMUX", None));

    site_pips.push(pip("CLKINV", "CLK", "CLK", "CLKINV_OUT"));
    site_pips.push(pip("CLKINV", "CLK_B", "CLK", "CLKINV_OUT"));
    site_pips.push(pip("CEUSEDMUX", "IN", "CE", "CEUSEDMUX_OUT"));
    site_pips.push(pip("CEUSEDMUX", "1", "CEUSEDVCC", "CEUSEDMUX_OUT"));
    site_pips.push(pip("SRUSEDMUX", "IN", "SR", "SRUSEDMUX_OUT"));
    site_pips.push(pip("SRUSEDMUX", "0", "SRUSEDGND", "SRUSEDMUX_OUT"));

    SiteTypeDef {
        site_type: SiteType::SliceL,
        bels,
        site_pips,
        pin_paths,
    }
}

/// A bonded I/O site with an input and an output buffer.
pub fn iob33() -> SiteTypeDef {
    SiteTypeDef {
        site_type: SiteType::Iob,
        bels: vec![
            bel("INBUF_EN", Some(PrimitiveKind::Ibuf)),
            bel("OUTBUF", Some(PrimitiveKind::Obuf)),
            bel("PAD", None),
        ],
        site_pips: Vec::new(),
        pin_paths: vec![
            path("INBUF_EN", "OUT", &["I"]),
            path("OUTBUF", "IN", &["O"]),
        ],
    }
}

/// A global clock buffer with an optional inverter on every control input.
pub fn bufgctrl() -> SiteTypeDef {
    let mut bels = vec![bel("BUFGCTRL", Some(PrimitiveKind::Bufgctrl))];
    let mut site_pips = Vec::new();
    let mut pin_paths = vec![
        path("BUFGCTRL", "I0", &["I0"]),
        path("BUFGCTRL", "I1", &["I1"]),
        path("BUFGCTRL", "O", &["O"]),
    ];

    for control in BUFGCTRL_CONTROLS {
        let inv = format!("{control}INV");
        let inv_out = format!("{control}INV_OUT");
        bels.push(bel(&inv, None));
        site_pips.push(pip(&inv, control, control, &inv_out));
        site_pips.push(pip(&inv, &format!("{control}_B"), control, &inv_out));
        pin_paths.push(path("BUFGCTRL", control, &[inv_out.as_str(), control]));
    }

    SiteTypeDef {
        site_type: SiteType::Bufgctrl,
        bels,
        site_pips,
        pin_paths,
    }
}

/// A regional clock buffer with an invertible clock enable.
pub fn bufhce() -> SiteTypeDef {
    SiteTypeDef {
        site_type: SiteType::Bufhce,
        bels: vec![
            bel("BUFHCE", Some(PrimitiveKind::Bufhce)),
            bel("CEINV", None),
        ],
        site_pips: vec![
            pip("CEINV", "CE", "CE", "CEINV_OUT"),
            pip("CEINV", "CE_B", "CE", "CEINV_OUT"),
        ],
        pin_paths: vec![
            path("BUFHCE", "CE", &["CEINV_OUT", "CE"]),
            path("BUFHCE", "I", &["I"]),
            path("BUFHCE", "O", &["O"]),
        ],
    }
}
