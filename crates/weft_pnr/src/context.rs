//! The explicit state shared by every flow stage.

use crate::data::Design;
use crate::placement::registry::PlacementRegistry;
use std::collections::BTreeMap;
use weft_config::{ClockConfig, FlowConfig, PinAssignment, PlacementConfig, RoutingConfig};
use weft_diagnostics::DiagnosticSink;
use weft_fabric::Fabric;

/// Tuning for one run, taken from the flow configuration.
#[derive(Debug, Clone, Default)]
pub struct PnrSettings {
    /// Placer settings.
    pub placement: PlacementConfig,
    /// Clock buffer insertion settings.
    pub clock: ClockConfig,
    /// Router settings.
    pub routing: RoutingConfig,
    /// Pin-constraint table keyed by top-level port.
    pub pins: BTreeMap<String, PinAssignment>,
}

impl PnrSettings {
    /// Extracts the settings the flow stages read from a loaded configuration.
    pub fn from_config(config: &FlowConfig) -> Self {
        Self {
            placement: config.placement.clone(),
            clock: config.clock.clone(),
            routing: config.routing.clone(),
            pins: config.pins.clone(),
        }
    }
}

/// Everything a stage may read or mutate, passed by `&mut` from stage to stage.
pub struct PnrContext<'a> {
    /// The device, read-only.
    pub fabric: &'a dyn Fabric,
    /// The design being implemented.
    pub design: Design,
    /// Occupied `(site, BEL)` pairs.
    pub registry: PlacementRegistry,
    /// Run settings.
    pub settings: PnrSettings,
    /// Where recoverable problems and progress are reported.
    pub sink: &'a DiagnosticSink,
}

impl<'a> PnrContext<'a> {
    /// Creates a context with an empty placement registry.
    pub fn new(
        fabric: &'a dyn Fabric,
        design: Design,
        settings: PnrSettings,
        sink: &'a DiagnosticSink,
    ) -> Self {
        Self {
            fabric,
            design,
            registry: PlacementRegistry::new(),
            settings,
            sink,
        }
    }

    /// Consumes the context, returning the design.
    pub fn into_design(self) -> Design {
        self.design
    }
}
