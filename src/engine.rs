//! Route propagation and the hijack trial itself.
//!
//! Grounded on the teacher's `src/engine.rs` announcement-queue flood (same
//! accept/prefer/export dispatch shape, generalized here to call through
//! `policy::{accept, prefer, forward_to}` instead of rank-ordered
//! `PolicyStore` passes) and on the original `bgpsecsim/experiments.py`'s
//! `run_trial` / `attacker_success_rate` for the trial sequence and metric.

use std::collections::VecDeque;

use crate::as_graph::ASGraph;
use crate::fraction::Fraction;
use crate::policy::{accept, forward_to, prefer};
use crate::route::Route;
use crate::shared::{NoRoute, ASN};

/// One (victim, attacker) pair to run through the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trial {
    pub victim_id: ASN,
    pub attacker_id: ASN,
}

/// Flood routes to `victim` from every AS's self-route, breadth-first, until
/// no announcement improves any table. Call on a freshly-cleared graph
/// (every AS's table holding only its self-entry) to get legitimate,
/// hijack-free routing; `hijack_n_hops` runs a second flood seeded from a
/// forged announcement afterwards.
pub fn propagate_from(graph: &mut ASGraph, victim: ASN) {
    let Some(victim_as) = graph.get(victim) else {
        return;
    };
    let victim_bgp_sec = victim_as.bgp_sec_enabled;
    let neighbors: Vec<ASN> = victim_as.neighbors.keys().copied().collect();

    let mut queue: VecDeque<(ASN, Route)> = VecDeque::new();
    for neighbor in neighbors {
        queue.push_back((neighbor, Route::originate(victim, neighbor, victim_bgp_sec)));
    }
    drain_queue(graph, &mut queue);
}

/// Forge a hijack of `victim`'s route, `n_hops` hops out from the origin,
/// and flood it from `attacker`.
///
/// The base route to forge from is found by scanning every AS's current
/// best route to `victim` for one of length exactly `n_hops` — at n_hops=1
/// that's the victim's own self-entry, so the forged path places the
/// attacker as the victim's apparent direct neighbor; larger n_hops walk
/// the base further out along a real path, independent of where `attacker`
/// actually sits in the topology, matching the Lychev partial-deployment
/// experiments where the attacker's "distance" is a dial on the attack,
/// not a fixed adjacency. ASes are scanned in ascending ASN order so the
/// choice is deterministic.
///
/// The forged route is announced to every one of `attacker`'s neighbors
/// unconditionally, the same way `propagate_from` seeds the victim's own
/// neighbors — an originator doesn't run its announcement through its own
/// `forward_to` export filter, only relays downstream do.
pub fn hijack_n_hops(
    graph: &mut ASGraph,
    victim: ASN,
    attacker: ASN,
    n_hops: usize,
) -> Result<(), NoRoute> {
    let mut asns: Vec<ASN> = graph.as_dict.keys().copied().collect();
    asns.sort_unstable();

    let base = asns.iter().find_map(|&asn| {
        graph
            .get(asn)
            .and_then(|a| a.table.get(&victim))
            .filter(|r| r.len() == n_hops)
            .cloned()
    });
    let Some(base) = base else {
        return Err(NoRoute {
            victim,
            hops: n_hops,
        });
    };

    let forged = Route::forge(&base, attacker, n_hops);

    let mut queue: VecDeque<(ASN, Route)> = VecDeque::new();
    if let Some(attacker_as) = graph.get(attacker) {
        let neighbors: Vec<ASN> = attacker_as.neighbors.keys().copied().collect();
        for neighbor in neighbors {
            let next_hop_bgp_sec = graph.get(neighbor).map(|a| a.bgp_sec_enabled).unwrap_or(false);
            queue.push_back((neighbor, forged.forward(neighbor, next_hop_bgp_sec)));
        }
    }
    drain_queue(graph, &mut queue);
    Ok(())
}

/// Fraction of ASes with any route to `victim` whose best path runs
/// through `attacker`, over every AS in the graph (Testable Property 10:
/// `|{a | attacker ∈ a.table[victim].path}| / |{a | victim ∈ a.table}|`,
/// no carve-out for `attacker` itself). Mirrors `attacker_success_rate` in
/// the original: a plain count over every AS's table, no weighting by
/// customer cone or traffic.
pub fn success_rate(graph: &ASGraph, victim: ASN, attacker: ASN) -> Fraction {
    let mut n_bad = 0u64;
    let mut n_total = 0u64;
    for as_obj in graph.iter() {
        if let Some(route) = as_obj.table.get(&victim) {
            n_total += 1;
            if route.contains(attacker) {
                n_bad += 1;
            }
        }
    }
    if n_total == 0 {
        Fraction::ZERO
    } else {
        Fraction::new(n_bad, n_total)
    }
}

/// The full per-trial sequence: reset routing state, flood legitimate
/// routes, hijack, and measure. Shared by the serial CLI path and every
/// worker in the trial pool so the two can never drift apart.
pub fn run_trial(graph: &mut ASGraph, trial: Trial, n_hops: usize) -> Result<Fraction, NoRoute> {
    graph.clear_tables();
    propagate_from(graph, trial.victim_id);
    hijack_n_hops(graph, trial.victim_id, trial.attacker_id, n_hops)?;
    Ok(success_rate(graph, trial.victim_id, trial.attacker_id))
}

/// Re-export `route`, now best at `owner_asn`, to every neighbor that
/// `forward_to` allows, authenticating (or not) per the receiving AS's
/// BGPsec capability.
fn enqueue_exports(
    graph: &ASGraph,
    owner_asn: ASN,
    route: &Route,
    queue: &mut VecDeque<(ASN, Route)>,
) {
    let Some(owner) = graph.get(owner_asn) else {
        return;
    };
    for (&neighbor, &rel) in owner.neighbors.iter() {
        if !forward_to(owner_asn, route, rel, graph) {
            continue;
        }
        let next_hop_bgp_sec = graph.get(neighbor).map(|a| a.bgp_sec_enabled).unwrap_or(false);
        queue.push_back((neighbor, route.forward(neighbor, next_hop_bgp_sec)));
    }
}

/// Process announcements FIFO until the queue is dry: accept, compare
/// against the current best for that origin, install and re-export only on
/// a strict improvement. Shared tail of both `propagate_from` and
/// `hijack_n_hops`.
fn drain_queue(graph: &mut ASGraph, queue: &mut VecDeque<(ASN, Route)>) {
    while let Some((owner_asn, route)) = queue.pop_front() {
        let Some(policy) = graph.get(owner_asn).map(|a| a.policy) else {
            continue;
        };
        if !accept(policy, owner_asn, &route, graph) {
            continue;
        }
        let better = match graph.get(owner_asn).and_then(|a| a.table.get(&route.origin())) {
            Some(current) => prefer(policy, owner_asn, current, &route, graph),
            None => true,
        };
        if !better {
            continue;
        }
        if let Some(owner) = graph.get_mut(owner_asn) {
            owner.table.insert(route.origin(), route.clone());
        }
        enqueue_exports(graph, owner_asn, &route, queue);
    }
}
