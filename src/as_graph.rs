use std::collections::{HashMap, HashSet, VecDeque};

use crate::policy::Policy;
use crate::route::Route;
use crate::shared::{Relation, ASN};

/// One Autonomous System. Neighbors are stored by ID in an adjacency map
/// owned by this AS; the graph never hands out references into itself
/// that outlive a borrow, so there is no cyclic-reference/lifetime
/// bookkeeping anywhere in this module.
#[derive(Debug, Clone)]
pub struct AS {
    pub asn: ASN,
    pub neighbors: HashMap<ASN, Relation>,
    pub policy: Policy,
    pub publishes_rpki: bool,
    pub publishes_path_end: bool,
    pub bgp_sec_enabled: bool,
    pub aspa_enabled: bool,
    /// Published provider set under ASPA. Distinct from the real
    /// provider relationships: a bogus attestation can name a provider
    /// set that doesn't match them.
    pub aspa_providers: Option<HashSet<ASN>>,
    /// Best-path table, keyed by origin ASN. The self-entry
    /// (table[self.asn] = Route{path: [self.asn], ..}) is installed at
    /// construction and is never overwritten or cleared.
    pub table: HashMap<ASN, Route>,
}

impl AS {
    pub fn new(asn: ASN, policy: Policy) -> Self {
        let mut table = HashMap::new();
        table.insert(asn, Route::self_route(asn));
        AS {
            asn,
            neighbors: HashMap::new(),
            policy,
            publishes_rpki: false,
            publishes_path_end: false,
            bgp_sec_enabled: false,
            aspa_enabled: false,
            aspa_providers: None,
            table,
        }
    }

    pub fn relation_to(&self, other: ASN) -> Option<Relation> {
        self.neighbors.get(&other).copied()
    }

    pub fn neighbors_of(&self, rel: Relation) -> impl Iterator<Item = ASN> + '_ {
        self.neighbors
            .iter()
            .filter(move |(_, r)| **r == rel)
            .map(|(asn, _)| *asn)
    }

    pub fn customer_count(&self) -> usize {
        self.neighbors_of(Relation::Customer).count()
    }

    pub fn is_tier_one(&self) -> bool {
        self.neighbors_of(Relation::Provider).next().is_none()
    }

    pub fn is_tier_three(&self) -> bool {
        self.neighbors_of(Relation::Customer).next().is_none()
    }

    /// Clear this AS's table back to just its self-entry.
    pub fn clear_table(&mut self) {
        self.table.clear();
        self.table.insert(self.asn, Route::self_route(self.asn));
    }
}

/// One edge of the input relationship graph. `rel` is `-1` (a is
/// provider of b) or `0` (peers), matching CAIDA as-rel serial-1.
#[derive(Debug, Clone, Copy)]
pub struct RelEdge {
    pub a: ASN,
    pub b: ASN,
    pub rel: i8,
}

/// Arena of ASes indexed by ID. Owns all per-trial mutable state (each
/// AS's best-path table); there is no graph-wide mutable cache that a
/// concurrent trial could race on.
#[derive(Debug, Clone)]
pub struct ASGraph {
    pub as_dict: HashMap<ASN, AS>,
}

impl Default for ASGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl ASGraph {
    pub fn new() -> Self {
        ASGraph {
            as_dict: HashMap::new(),
        }
    }

    /// Build a graph from relationship edges, installing symmetric
    /// neighbor entries for each edge. Every referenced ASN gets an AS
    /// running `policy` if it doesn't exist yet.
    pub fn from_edges(edges: &[RelEdge], policy: Policy) -> Self {
        let mut graph = ASGraph::new();
        for edge in edges {
            graph.ensure(edge.a, policy);
            graph.ensure(edge.b, policy);
            if edge.rel == 0 {
                graph.set_relation(edge.a, edge.b, Relation::Peer);
                graph.set_relation(edge.b, edge.a, Relation::Peer);
            } else {
                // a is provider of b
                graph.set_relation(edge.a, edge.b, Relation::Customer);
                graph.set_relation(edge.b, edge.a, Relation::Provider);
            }
        }
        graph
    }

    fn ensure(&mut self, asn: ASN, policy: Policy) {
        self.as_dict.entry(asn).or_insert_with(|| AS::new(asn, policy));
    }

    fn set_relation(&mut self, from: ASN, to: ASN, rel: Relation) {
        if let Some(as_obj) = self.as_dict.get_mut(&from) {
            as_obj.neighbors.insert(to, rel);
        }
    }

    pub fn get(&self, asn: ASN) -> Option<&AS> {
        self.as_dict.get(&asn)
    }

    pub fn get_mut(&mut self, asn: ASN) -> Option<&mut AS> {
        self.as_dict.get_mut(&asn)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AS> {
        self.as_dict.values()
    }

    pub fn len(&self) -> usize {
        self.as_dict.len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_dict.is_empty()
    }

    /// `n` ASes with the largest customer count, descending, ties broken
    /// by ascending ASN for determinism.
    pub fn top_isps(&self, n: usize) -> Vec<ASN> {
        let mut ases: Vec<&AS> = self.as_dict.values().collect();
        ases.sort_by(|a, b| {
            b.customer_count()
                .cmp(&a.customer_count())
                .then(a.asn.cmp(&b.asn))
        });
        ases.into_iter().take(n).map(|a| a.asn).collect()
    }

    /// True iff the directed graph with edges (A -> B) for every B that's
    /// A's CUSTOMER has a cycle.
    pub fn any_customer_provider_cycle(&self) -> bool {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            InStack,
            Done,
        }

        fn visit(asn: ASN, graph: &ASGraph, marks: &mut HashMap<ASN, Mark>) -> bool {
            marks.insert(asn, Mark::InStack);
            if let Some(as_obj) = graph.get(asn) {
                for customer in as_obj.neighbors_of(Relation::Customer) {
                    match marks.get(&customer).copied().unwrap_or(Mark::Unvisited) {
                        Mark::InStack => return true,
                        Mark::Done => continue,
                        Mark::Unvisited => {
                            if visit(customer, graph, marks) {
                                return true;
                            }
                        }
                    }
                }
            }
            marks.insert(asn, Mark::Done);
            false
        }

        let mut marks: HashMap<ASN, Mark> = self
            .as_dict
            .keys()
            .map(|&asn| (asn, Mark::Unvisited))
            .collect();

        for &start in self.as_dict.keys() {
            if marks[&start] == Mark::Unvisited && visit(start, self, &mut marks) {
                return true;
            }
        }
        false
    }

    pub fn tier_one(&self) -> Vec<ASN> {
        self.as_dict
            .values()
            .filter(|a| a.is_tier_one())
            .map(|a| a.asn)
            .collect()
    }

    pub fn tier_three(&self) -> Vec<ASN> {
        self.as_dict
            .values()
            .filter(|a| a.is_tier_three())
            .map(|a| a.asn)
            .collect()
    }

    pub fn tier_two(&self) -> Vec<ASN> {
        self.as_dict
            .values()
            .filter(|a| !a.is_tier_one() && !a.is_tier_three())
            .map(|a| a.asn)
            .collect()
    }

    pub fn clear_tables(&mut self) {
        for as_obj in self.as_dict.values_mut() {
            as_obj.clear_table();
        }
    }

    /// Number of ASes (including `target`) from which a valley-free route
    /// to `target` exists under Gao-Rexford export rules.
    ///
    /// Equivalent to the two-node-per-AS bipartite construction in the
    /// design (L = "received restricted, can only re-export to
    /// customers", R = "received unrestricted, can re-export anywhere"):
    /// rather than materialize L/R nodes explicitly, this walks the same
    /// reachability directly as a BFS over (AS, export-state) pairs,
    /// which is exactly the set of states the bipartite graph encodes.
    /// An AS's state upgrades from restricted to unrestricted but never
    /// the reverse, so each AS is enqueued at most twice.
    pub fn reachability(&self, target: ASN) -> usize {
        self.reachable_from(target).len()
    }

    /// All (targets ->) per-AS reachability in one pass per target. Kept
    /// as a direct loop rather than the topological bitset sweep the
    /// design sketches: correctness here matters far more than constant
    /// factors, and the result is identical.
    pub fn reachability_bulk(&self) -> HashMap<ASN, usize> {
        self.as_dict
            .keys()
            .map(|&target| (target, self.reachability(target)))
            .collect()
    }

    fn reachable_from(&self, target: ASN) -> HashSet<ASN> {
        #[derive(PartialEq, Eq, Clone, Copy)]
        enum State {
            Restricted,
            Unrestricted,
        }

        if !self.as_dict.contains_key(&target) {
            return HashSet::new();
        }

        let mut best: HashMap<ASN, State> = HashMap::new();
        let mut queue: VecDeque<ASN> = VecDeque::new();
        best.insert(target, State::Unrestricted);
        queue.push_back(target);

        while let Some(a) = queue.pop_front() {
            let state = best[&a];
            let Some(as_obj) = self.get(a) else { continue };

            let candidates: Vec<ASN> = match state {
                State::Unrestricted => as_obj.neighbors.keys().copied().collect(),
                State::Restricted => as_obj.neighbors_of(Relation::Customer).collect(),
            };

            for n in candidates {
                let Some(n_obj) = self.get(n) else { continue };
                let n_state = match n_obj.relation_to(a) {
                    Some(Relation::Customer) => State::Unrestricted,
                    _ => State::Restricted,
                };
                let upgrade = match best.get(&n) {
                    None => true,
                    Some(State::Restricted) => n_state == State::Unrestricted,
                    Some(State::Unrestricted) => false,
                };
                if upgrade {
                    best.insert(n, n_state);
                    queue.push_back(n);
                }
            }
        }

        best.into_keys().collect()
    }
}
