//! Routing policy as a tagged variant plus three dispatch functions,
//! replacing the inheritance chain of one `PolicyExtension` subclass per
//! variant (grounded on `policies.rs` / `policy/policy_extensions/*.rs`
//! in the teacher crate, re-architected per the design's note on
//! polymorphic policies and lazy-sequence preference rules).

use crate::as_graph::ASGraph;
use crate::route::Route;
use crate::shared::{Relation, ASN};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    Default,
    Rpki,
    PathEnd,
    BgpsecHigh,
    BgpsecMed,
    BgpsecLow,
    Aspa,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AspaVerdict {
    Valid,
    Invalid,
    Unknown,
}

/// May `route` enter `owner`'s table at all?
pub fn accept(policy: Policy, owner_asn: ASN, route: &Route, graph: &ASGraph) -> bool {
    // Default: loop suppression. `route.final_as()` is always `owner_asn`
    // (the route just arrived at its owner), so only the earlier hops can
    // indicate a loop back to this AS.
    if route.path[..route.path.len() - 1].contains(&owner_asn) {
        return false;
    }
    match policy {
        Policy::Default => true,
        Policy::Rpki | Policy::BgpsecHigh | Policy::BgpsecMed | Policy::BgpsecLow => {
            !route.origin_invalid
        }
        Policy::PathEnd => !route.path_end_invalid,
        Policy::Aspa => validate_aspa(route, graph) != AspaVerdict::Invalid,
    }
}

/// Is `candidate` strictly better than `current`? Both must share an
/// origin and a final AS (the deciding AS); violating that is a caller
/// bug, not a trial-time condition, so it's asserted via `debug_assert`
/// rather than threaded through as a `Result`.
pub fn prefer(
    policy: Policy,
    owner_asn: ASN,
    current: &Route,
    candidate: &Route,
    graph: &ASGraph,
) -> bool {
    debug_assert_eq!(current.origin(), candidate.origin());
    debug_assert_eq!(current.final_as(), owner_asn);
    debug_assert_eq!(candidate.final_as(), owner_asn);
    preference_key(policy, owner_asn, candidate, graph) < preference_key(policy, owner_asn, current, graph)
}

/// Local-preference component: CUSTOMER beats PEER beats PROVIDER;
/// unrecognised first hops (shouldn't happen for any non-self route, but
/// keeps the ordering total) sort last.
fn local_pref(owner_asn: ASN, route: &Route, graph: &ASGraph) -> u32 {
    let Some(first_hop) = route.first_hop() else {
        return u32::MAX;
    };
    let rel = graph.get(owner_asn).and_then(|a| a.relation_to(first_hop));
    match rel {
        Some(Relation::Customer) => 1,
        Some(Relation::Peer) => 2,
        Some(Relation::Provider) => 3,
        None => 4,
    }
}

/// 0 if authenticated (preferred), 1 otherwise — lower sorts first.
fn auth_key(route: &Route) -> u32 {
    if route.authenticated {
        0
    } else {
        1
    }
}

/// Build the lexicographic preference key for `route` at `owner_asn`
/// under `policy`. A `Vec<u32>` rather than a fixed-size tuple so every
/// variant can share the same comparison code; arity is still fixed per
/// policy (no coroutine-style lazy generation of keys).
fn preference_key(policy: Policy, owner_asn: ASN, route: &Route, graph: &ASGraph) -> Vec<u32> {
    let lp = local_pref(owner_asn, route, graph);
    let len = route.len() as u32;
    let nh = route.first_hop().unwrap_or(owner_asn);
    let auth = auth_key(route);
    match policy {
        Policy::BgpsecHigh => vec![auth, lp, len, nh],
        Policy::BgpsecMed => vec![lp, auth, len, nh],
        Policy::BgpsecLow => vec![lp, len, auth, nh],
        Policy::Default | Policy::Rpki | Policy::PathEnd | Policy::Aspa => vec![lp, len, nh],
    }
}

/// Gao-Rexford export: re-advertise to every relation class if the route
/// was learned from a CUSTOMER; otherwise only to CUSTOMERs. Shared by
/// every policy variant — the table in SPEC_FULL lists only accept and
/// preference additions, not forward additions.
pub fn forward_to(owner_asn: ASN, route: &Route, to_relation: Relation, graph: &ASGraph) -> bool {
    let learned_from_customer = route
        .first_hop()
        .and_then(|fh| graph.get(owner_asn).and_then(|a| a.relation_to(fh)))
        == Some(Relation::Customer);
    learned_from_customer || to_relation == Relation::Customer
}

/// Pure function of (route, graph) — no process-wide mutable state, so
/// parallel trials never race on ASPA evaluation and nothing leaks
/// between routes (see DESIGN.md's Open Question resolution).
pub fn validate_aspa(route: &Route, graph: &ASGraph) -> AspaVerdict {
    let path = &route.path;
    if path.len() < 3 {
        return AspaVerdict::Valid; // no interior hop to invalidate
    }

    let mut downstream = false;
    let mut any_invalid = false;
    let mut any_unknown = false;
    let mut any_valid = false;

    for i in 1..path.len() - 1 {
        let _prev = path[i - 1];
        let curr_asn = path[i];
        let next_asn = path[i + 1];

        let Some(curr) = graph.get(curr_asn) else {
            any_unknown = true;
            continue;
        };
        if !curr.aspa_enabled {
            any_unknown = true;
            continue;
        }

        let next_in_providers = curr
            .aspa_providers
            .as_ref()
            .map(|p| p.contains(&next_asn))
            .unwrap_or(false);

        if next_in_providers && !downstream {
            any_valid = true;
        } else if curr.relation_to(next_asn) == Some(Relation::Peer) {
            any_valid = true;
            downstream = true;
        } else {
            let curr_in_next_providers = graph
                .get(next_asn)
                .and_then(|n| n.aspa_providers.as_ref())
                .map(|p| p.contains(&curr_asn))
                .unwrap_or(false);
            if curr_in_next_providers {
                any_valid = true;
                downstream = true;
            } else {
                any_invalid = true;
            }
        }
    }

    if any_invalid {
        AspaVerdict::Invalid
    } else if any_unknown && !any_valid {
        AspaVerdict::Unknown
    } else {
        AspaVerdict::Valid
    }
}
