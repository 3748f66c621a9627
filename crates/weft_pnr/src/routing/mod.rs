//! Interconnect routing.
//!
//! Routes a net from the site pin of its driver to the site pin of every sink
//! through the general interconnect, one maze search per sink. Each per-sink
//! path is grafted onto the tree built so far, so the committed route enters
//! every node at most once.

pub mod generic;
pub mod maze;

use crate::codes;
use crate::context::PnrContext;
use crate::data::{Design, NetRoute, RouteEdge};
use crate::error::PnrError;
use crate::ids::{NetId, PinId};
use crate::primitive::descriptor;
use std::collections::HashSet;
use weft_diagnostics::{Diagnostic, DiagnosticSink, Subject};
use weft_fabric::{Fabric, NodeId};

pub use generic::{GenericRouter, MazeFallbackRouter};
pub use maze::{maze_search, SearchStats};

/// The outcome of routing one net.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetRouteReport {
    /// Search statistics of every sink that was searched for.
    pub searches: Vec<(PinId, SearchStats)>,
    /// Per-sink failures. The net's route lists these sinks as unrouted.
    pub failures: Vec<PnrError>,
    /// Edges in the committed route.
    pub edges: usize,
}

/// Totals over several routed nets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoutingSummary {
    /// Nets that received a route.
    pub routed: usize,
    /// Sinks that could not be reached.
    pub failed_sinks: usize,
    /// Nets rejected as a whole.
    pub rejected: usize,
}

/// Resolves the interconnect node a cell pin attaches to.
///
/// Follows the pin's BEL-pin path out to the site boundary and looks up the
/// node bound to that site pin.
pub fn pin_node(fabric: &dyn Fabric, design: &Design, pin: PinId) -> Result<NodeId, PnrError> {
    let p = design.pin(pin);
    let cell = design.cell(p.cell);
    let unroutable = || PnrError::UnroutableEndpoint {
        net: p
            .net
            .map(|n| design.net(n).name.clone())
            .unwrap_or_default(),
        pin: design.pin_path(pin),
    };
    let (site, bel) = cell.placement.ok_or_else(unroutable)?;
    let bel_pin = descriptor(cell.kind).bel_pin(&p.name);
    let site_pin = fabric
        .bel_pin_path(site, bel, bel_pin)
        .and_then(|path| path.last())
        .ok_or_else(unroutable)?;
    fabric.site_pin_node(site, site_pin).ok_or_else(unroutable)
}

/// Routes every sink of a net and commits the result.
///
/// A locked net is refused with [`PnrError::NetLocked`]; so is a net whose
/// driver has no interconnect node. Unreachable sinks do not fail the call:
/// they are listed in the report and in the route's `unrouted` list.
pub fn route_net(
    fabric: &dyn Fabric,
    design: &mut Design,
    net: NetId,
    hop_penalty: f64,
) -> Result<NetRouteReport, PnrError> {
    let n = design.net(net);
    if n.locked {
        return Err(PnrError::NetLocked {
            net: n.name.clone(),
        });
    }
    let source = pin_node(fabric, design, n.driver)?;

    let mut report = NetRouteReport::default();
    let mut route = NetRoute::default();
    let mut reached = HashSet::from([source]);
    for &sink in &n.sinks {
        let target = match pin_node(fabric, design, sink) {
            Ok(node) => node,
            Err(err) => {
                route.unrouted.push(sink);
                report.failures.push(err);
                continue;
            }
        };
        let (path, stats) = maze_search(fabric, source, target, hop_penalty);
        report.searches.push((sink, stats));
        match path {
            Some(edges) => graft(&mut route.edges, &mut reached, &edges),
            None => {
                route.unrouted.push(sink);
                report.failures.push(PnrError::RouteFailed {
                    net: n.name.clone(),
                    sink: design.pin_path(sink),
                });
            }
        }
    }
    report.edges = route.edges.len();
    design.net_mut(net).route = Some(route);
    Ok(report)
}

/// Appends the part of `path` beyond the last node the tree already reaches.
///
/// `path` is a simple walk out of the tree's root, so the appended suffix
/// starts on the tree and enters only new nodes.
fn graft(tree: &mut Vec<RouteEdge>, reached: &mut HashSet<NodeId>, path: &[RouteEdge]) {
    let start = path
        .iter()
        .rposition(|e| reached.contains(&e.to))
        .map_or(0, |i| i + 1);
    for e in &path[start..] {
        reached.insert(e.to);
        tree.push(*e);
    }
}

/// Routes `nets` and reports every outcome as a diagnostic.
pub(crate) fn route_and_report(
    fabric: &dyn Fabric,
    design: &mut Design,
    nets: &[NetId],
    hop_penalty: f64,
    sink: &DiagnosticSink,
) -> RoutingSummary {
    let mut summary = RoutingSummary::default();
    for &net in nets {
        let name = design.net(net).name.clone();
        match route_net(fabric, design, net, hop_penalty) {
            Ok(report) => {
                summary.routed += 1;
                summary.failed_sinks += report.failures.len();
                for failure in &report.failures {
                    let code = match failure {
                        PnrError::UnroutableEndpoint { .. } => codes::UNROUTABLE_ENDPOINT,
                        _ => codes::ROUTE_FAILED,
                    };
                    sink.emit(Diagnostic::error(
                        code,
                        failure.to_string(),
                        Subject::Net(name.clone()),
                    ));
                }
                let total = design.net(net).sinks.len();
                let visited: usize = report.searches.iter().map(|(_, s)| s.visited).sum();
                sink.emit(Diagnostic::note(
                    codes::ROUTE_STATS,
                    format!(
                        "{} of {total} sinks routed with {} PIPs, {visited} nodes expanded",
                        total - report.failures.len(),
                        report.edges
                    ),
                    Subject::Net(name),
                ));
            }
            Err(err) => {
                summary.rejected += 1;
                let code = match err {
                    PnrError::NetLocked { .. } => codes::NET_LOCKED,
                    _ => codes::UNROUTABLE_ENDPOINT,
                };
                sink.emit(Diagnostic::error(code, err.to_string(), Subject::Net(name)));
            }
        }
    }
    summary
}

/// Routes the clock nets, then locks them if the settings ask for it.
pub fn route_clock_nets(ctx: &mut PnrContext, nets: &[NetId]) -> RoutingSummary {
    let summary = route_and_report(
        ctx.fabric,
        &mut ctx.design,
        nets,
        ctx.settings.routing.hop_penalty,
        ctx.sink,
    );
    if ctx.settings.routing.lock_clock_routes {
        for &net in nets {
            ctx.design.lock_net(net);
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::insert_clock_buffers;
    use crate::context::PnrSettings;
    use crate::fixtures;
    use crate::placement::place;
    use crate::site_config::configure_sites;

    fn settings() -> PnrSettings {
        PnrSettings {
            pins: fixtures::pins(),
            ..PnrSettings::default()
        }
    }

    /// Checks that the edges form a tree out of `source` reaching every
    /// `target`, using only PIPs the fabric has and entering no node twice.
    fn assert_valid_route(fabric: &dyn Fabric, edges: &[RouteEdge], source: NodeId, targets: &[NodeId]) {
        let mut reached = HashSet::from([source]);
        for e in edges {
            assert!(fabric.node_fanout(e.from).contains(&e.to), "{e:?} is not a PIP");
            assert!(!fabric.node(e.to).unwrap().route_thru);
            assert!(reached.contains(&e.from), "{e:?} is disconnected");
            assert!(reached.insert(e.to), "{e:?} enters a node already on the route");
        }
        for t in targets {
            assert!(reached.contains(t));
        }
    }

    #[test]
    fn clock_tree_routes_are_valid_and_locked() {
        let device = fixtures::device();
        let sink = DiagnosticSink::new();
        let mut ctx = PnrContext::new(&device, fixtures::counter_design(2), settings(), &sink);
        place(&mut ctx).unwrap();
        configure_sites(&mut ctx);
        let tree = insert_clock_buffers(&mut ctx).unwrap();
        let summary = route_clock_nets(&mut ctx, &tree.nets());
        assert_eq!(summary.routed, 3);
        assert_eq!(summary.failed_sinks, 0);

        for net in tree.nets() {
            let n = ctx.design.net(net);
            assert!(n.locked);
            let route = n.route.as_ref().unwrap();
            assert!(route.is_complete());
            let mut unique = HashSet::new();
            assert!(route.edges.iter().all(|e| unique.insert(*e)));
            let source = pin_node(&device, &ctx.design, n.driver).unwrap();
            let targets: Vec<_> = n
                .sinks
                .iter()
                .map(|&p| pin_node(&device, &ctx.design, p).unwrap())
                .collect();
            assert_valid_route(&device, &route.edges, source, &targets);
        }
    }

    #[test]
    fn unbuffered_clock_shares_one_trunk() {
        let device = fixtures::device();
        for seed in 0..10 {
            let sink = DiagnosticSink::new();
            let mut s = settings();
            s.placement.seed = seed;
            let mut ctx = PnrContext::new(&device, fixtures::counter_design(3), s, &sink);
            place(&mut ctx).unwrap();
            let clk = ctx.design.net_by_name("clk").unwrap();
            let report = route_net(&device, &mut ctx.design, clk, 0.125).unwrap();
            assert!(report.failures.is_empty());

            let n = ctx.design.net(clk);
            let source = pin_node(&device, &ctx.design, n.driver).unwrap();
            let targets: Vec<_> = n
                .sinks
                .iter()
                .map(|&p| pin_node(&device, &ctx.design, p).unwrap())
                .collect();
            assert_eq!(targets.len(), 3);
            assert_valid_route(&device, &n.route.as_ref().unwrap().edges, source, &targets);
        }
    }

    #[test]
    fn reconverging_paths_are_grafted_at_the_tree() {
        let e = |from: u32, to: u32| RouteEdge {
            from: NodeId::from_raw(from),
            to: NodeId::from_raw(to),
        };
        let root = NodeId::from_raw(0);
        let mut tree = Vec::new();
        let mut reached = HashSet::from([root]);
        // 0 -> 1 -> 3 -> 4, then 0 -> 2 -> 3 -> 5 reaches 3 a second way.
        graft(&mut tree, &mut reached, &[e(0, 1), e(1, 3), e(3, 4)]);
        graft(&mut tree, &mut reached, &[e(0, 2), e(2, 3), e(3, 5)]);
        assert_eq!(tree, vec![e(0, 1), e(1, 3), e(3, 4), e(3, 5)]);

        // A path wholly on the tree adds nothing.
        graft(&mut tree, &mut reached, &[e(0, 1), e(1, 3)]);
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn locked_net_refuses_reroute() {
        let device = fixtures::device();
        let sink = DiagnosticSink::new();
        let mut ctx = PnrContext::new(&device, fixtures::counter_design(1), settings(), &sink);
        place(&mut ctx).unwrap();
        let net = ctx.design.net_by_name("q[0]").unwrap();
        route_net(&device, &mut ctx.design, net, 0.125).unwrap();
        let before = ctx.design.net(net).route.clone();
        ctx.design.lock_net(net);
        assert_eq!(
            route_net(&device, &mut ctx.design, net, 0.125),
            Err(PnrError::NetLocked { net: "q[0]".into() })
        );
        assert_eq!(ctx.design.net(net).route, before);

        ctx.design.unlock_net(net);
        assert!(route_net(&device, &mut ctx.design, net, 0.125).is_ok());
    }

    #[test]
    fn unplaced_sink_is_recorded_unrouted() {
        let device = fixtures::device();
        let sink = DiagnosticSink::new();
        let mut ctx = PnrContext::new(&device, fixtures::counter_design(1), settings(), &sink);
        place(&mut ctx).unwrap();
        let lut = ctx.design.cell_by_name("q[0]_i_1").unwrap();
        ctx.design.cell_mut(lut).placement = None;
        let net = ctx.design.net_by_name("q[0]").unwrap();
        let report = route_net(&device, &mut ctx.design, net, 0.125).unwrap();
        assert_eq!(report.failures.len(), 1);
        assert!(matches!(report.failures[0], PnrError::UnroutableEndpoint { .. }));
        let route = ctx.design.net(net).route.as_ref().unwrap();
        assert!(!route.is_complete());
        assert!(route.edges.is_empty());
    }

    #[test]
    fn unplaced_driver_rejects_the_net() {
        let device = fixtures::device();
        let mut design = fixtures::counter_design(1);
        let net = design.net_by_name("q[0]").unwrap();
        assert!(matches!(
            route_net(&device, &mut design, net, 0.125),
            Err(PnrError::UnroutableEndpoint { .. })
        ));
        assert!(design.net(net).route.is_none());
    }

    #[test]
    fn pin_node_follows_bel_pin_renames() {
        let device = fixtures::device();
        let sink = DiagnosticSink::new();
        let mut ctx = PnrContext::new(&device, fixtures::counter_design(1), settings(), &sink);
        place(&mut ctx).unwrap();
        let ff = ctx.design.cell_by_name("q_reg[0]").unwrap();
        let (site, _) = ctx.design.cell(ff).placement.unwrap();
        let site_name = device.site(site).unwrap().name.clone();
        let c = ctx.design.cell_pin(ff, "C").unwrap();
        let node = pin_node(&device, &ctx.design, c).unwrap();
        assert_eq!(device.node(node).unwrap().name, format!("{site_name}/CLK"));
    }

    #[test]
    fn rejected_nets_are_reported() {
        let device = fixtures::device();
        let sink = DiagnosticSink::new();
        let mut design = fixtures::counter_design(1);
        let net = design.net_by_name("d[0]").unwrap();
        design.lock_net(net);
        let summary = route_and_report(&device, &mut design, &[net], 0.125, &sink);
        assert_eq!(summary.rejected, 1);
        assert_eq!(sink.count_code(codes::NET_LOCKED), 1);
    }
}
