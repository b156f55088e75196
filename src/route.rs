use crate::shared::ASN;

/// Immutable announcement. `path[0]` is the origin; `path[path.len()-1]`
/// is the current holder. Never mutated after construction — every
/// propagation step builds a new `Route` from the one it received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub path: Vec<ASN>,
    /// The origin is expected to publish an RPKI ROA but the announced
    /// one is inconsistent.
    pub origin_invalid: bool,
    /// The first hop is expected to publish a path-end record but the
    /// announcement violates it.
    pub path_end_invalid: bool,
    /// BGPsec attestation unbroken along the whole path.
    pub authenticated: bool,
}

impl Route {
    /// The trivial route an AS holds to itself: installed at construction,
    /// never overwritten or cleared.
    pub fn self_route(asn: ASN) -> Self {
        Route {
            path: vec![asn],
            origin_invalid: false,
            path_end_invalid: false,
            authenticated: true,
        }
    }

    /// (i) An AS originating a route to one of its neighbors.
    pub fn originate(origin: ASN, neighbor: ASN, origin_bgp_sec_enabled: bool) -> Self {
        Route {
            path: vec![origin, neighbor],
            origin_invalid: false,
            path_end_invalid: false,
            authenticated: origin_bgp_sec_enabled,
        }
    }

    /// (ii) An AS forwarding an already-accepted route to a next hop.
    pub fn forward(&self, next_hop: ASN, next_hop_bgp_sec_enabled: bool) -> Self {
        let mut path = self.path.clone();
        path.push(next_hop);
        Route {
            path,
            origin_invalid: self.origin_invalid,
            path_end_invalid: self.path_end_invalid,
            authenticated: self.authenticated && next_hop_bgp_sec_enabled,
        }
    }

    /// (iii) Attacker forgery: extend a real `base` route (the victim's
    /// legitimate n-hop path) by one attacker-controlled hop.
    ///
    /// `origin_invalid` is set `true`: the attacker is announcing the
    /// victim's address space from outside the victim's authorised
    /// origin set, which is exactly the condition RPKI origin validation
    /// exists to catch (see DESIGN.md's Open Question resolution).
    pub fn forge(base: &Route, attacker: ASN, n_hops: usize) -> Self {
        let mut path = base.path.clone();
        path.push(attacker);
        Route {
            path,
            origin_invalid: true,
            path_end_invalid: n_hops == 1,
            authenticated: false,
        }
    }

    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn origin(&self) -> ASN {
        self.path[0]
    }

    pub fn final_as(&self) -> ASN {
        self.path[self.path.len() - 1]
    }

    /// The second-to-last AS on the path, i.e. the neighbor the final AS
    /// learned this route from. `None` for a single-hop (self) route.
    pub fn first_hop(&self) -> Option<ASN> {
        if self.path.len() >= 2 {
            Some(self.path[self.path.len() - 2])
        } else {
            None
        }
    }

    /// True iff the path visits any AS more than once.
    pub fn has_cycle(&self) -> bool {
        let mut seen = std::collections::HashSet::with_capacity(self.path.len());
        !self.path.iter().all(|asn| seen.insert(*asn))
    }

    pub fn contains(&self, asn: ASN) -> bool {
        self.path.contains(&asn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_route_is_trivial_and_authenticated() {
        let r = Route::self_route(7);
        assert_eq!(r.path, vec![7]);
        assert!(r.authenticated);
        assert!(!r.origin_invalid);
        assert!(!r.path_end_invalid);
        assert_eq!(r.origin(), 7);
        assert_eq!(r.final_as(), 7);
        assert_eq!(r.first_hop(), None);
    }

    #[test]
    fn originate_builds_two_hop_path() {
        let r = Route::originate(5, 2, true);
        assert_eq!(r.path, vec![5, 2]);
        assert_eq!(r.origin(), 5);
        assert_eq!(r.final_as(), 2);
        assert_eq!(r.first_hop(), Some(5));
        assert!(r.authenticated);
    }

    #[test]
    fn forward_preserves_invalid_flags_and_ands_authenticated() {
        let base = Route::originate(5, 2, true);
        let next = base.forward(1, false);
        assert_eq!(next.path, vec![5, 2, 1]);
        assert!(!next.authenticated);
        assert_eq!(next.origin_invalid, base.origin_invalid);
        assert_eq!(next.path_end_invalid, base.path_end_invalid);
    }

    #[test]
    fn forge_sets_origin_invalid_and_path_end_only_at_n_one() {
        let base = Route {
            path: vec![5, 2],
            origin_invalid: false,
            path_end_invalid: false,
            authenticated: true,
        };
        let forged_n1 = Route::forge(&base, 10, 1);
        assert!(forged_n1.origin_invalid);
        assert!(forged_n1.path_end_invalid);
        assert!(!forged_n1.authenticated);
        assert_eq!(forged_n1.path, vec![5, 2, 10]);

        let forged_n2 = Route::forge(&base, 10, 2);
        assert!(forged_n2.origin_invalid);
        assert!(!forged_n2.path_end_invalid);
    }

    #[test]
    fn cycle_detection() {
        let clean = Route {
            path: vec![1, 2, 3],
            origin_invalid: false,
            path_end_invalid: false,
            authenticated: false,
        };
        assert!(!clean.has_cycle());
        let cyclic = Route {
            path: vec![1, 2, 1],
            origin_invalid: false,
            path_end_invalid: false,
            authenticated: false,
        };
        assert!(cyclic.has_cycle());
    }
}
