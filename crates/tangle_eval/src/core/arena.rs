//! Flat storage for values, references and closures, plus unification.

use smallvec::SmallVec;

use super::value::{Closure, ClosureId, PropMap, RefId, Reference, Value, ValueId};

#[derive(Default)]
pub struct Arena {
    values: Vec<Value>,
    refs: Vec<Reference>,
    closures: Vec<Closure>,
}

impl Arena {
    pub fn new() -> Arena {
        Arena::default()
    }

    pub fn alloc_value(&mut self, v: Value) -> ValueId {
        let id = ValueId(self.values.len() as u32);
        self.values.push(v);
        id
    }

    pub fn alloc_ref(&mut self, r: Reference) -> RefId {
        let id = RefId(self.refs.len() as u32);
        self.refs.push(r);
        id
    }

    pub fn alloc_closure(&mut self, c: Closure) -> ClosureId {
        let id = ClosureId(self.closures.len() as u32);
        self.closures.push(c);
        id
    }

    /// Chase `forward` links to the surviving value, compressing the path.
    pub fn resolve(&mut self, mut id: ValueId) -> ValueId {
        let mut root = id;
        while let Some(next) = self.values[root.index()].forward {
            root = next;
        }
        while let Some(next) = self.values[id.index()].forward {
            self.values[id.index()].forward = Some(root);
            id = next;
        }
        root
    }

    /// Immutable access. Callers must pass a resolved id when they care about
    /// merged state.
    pub fn value(&self, id: ValueId) -> &Value {
        &self.values[id.index()]
    }

    pub fn value_mut(&mut self, id: ValueId) -> &mut Value {
        &mut self.values[id.index()]
    }

    pub fn reference(&self, id: RefId) -> &Reference {
        &self.refs[id.index()]
    }

    pub fn reference_mut(&mut self, id: RefId) -> &mut Reference {
        &mut self.refs[id.index()]
    }

    pub fn closure(&self, id: ClosureId) -> &Closure {
        &self.closures[id.index()]
    }

    pub fn closure_mut(&mut self, id: ClosureId) -> &mut Closure {
        &mut self.closures[id.index()]
    }

    /// The resolved value a reference currently points at. Caches the
    /// resolution back into the reference.
    pub fn ref_value(&mut self, r: RefId) -> ValueId {
        let v = self.refs[r.index()].value;
        let v = self.resolve(v);
        self.refs[r.index()].value = v;
        v
    }

    /// Own-property lookup, no prototype walk.
    pub fn own_property(&mut self, obj: ValueId, name: &str) -> Option<RefId> {
        let obj = self.resolve(obj);
        self.values[obj.index()]
            .props
            .as_ref()
            .and_then(|p| p.get(name).copied())
    }

    /// Property lookup through the prototype chain. Cycles in the chain are
    /// possible after unification, so visited values are tracked.
    pub fn get_property(&mut self, obj: ValueId, name: &str) -> Option<RefId> {
        let mut cur = self.resolve(obj);
        let mut seen: SmallVec<[ValueId; 8]> = SmallVec::new();
        loop {
            if seen.contains(&cur) {
                return None;
            }
            seen.push(cur);
            if let Some(props) = self.values[cur.index()].props.as_ref() {
                if let Some(&r) = props.get(name) {
                    return Some(r);
                }
            }
            match self.values[cur.index()].proto {
                Some(p) => cur = self.resolve(p),
                None => return None,
            }
        }
    }

    /// Insert or replace an own property. Creates the property map if the
    /// value never had one.
    pub fn set_property(&mut self, obj: ValueId, name: &str, r: RefId) {
        let obj = self.resolve(obj);
        let v = &mut self.values[obj.index()];
        v.props
            .get_or_insert_with(PropMap::default)
            .insert(name.to_string(), r);
    }

    /// Unify two values: `loser` is forwarded into `winner` and the pair's
    /// state is merged. Every reference that pointed at the loser now
    /// transparently resolves to the winner.
    ///
    /// Conflicting properties are merged recursively, with the already-set
    /// side surviving regardless of which object it came from. A `merging`
    /// flag on each value stops the recursion on cyclic graphs; a skipped
    /// inner merge only loses precision, never facts already recorded.
    pub fn remap(&mut self, winner: ValueId, loser: ValueId) {
        let w = self.resolve(winner);
        let l = self.resolve(loser);
        if w == l {
            return;
        }
        if self.values[w.index()].merging || self.values[l.index()].merging {
            return;
        }
        self.values[w.index()].merging = true;
        self.values[l.index()].merging = true;

        let l_props = self.values[l.index()].props.take();
        let l_proto = self.values[l.index()].proto.take();
        let l_literal = self.values[l.index()].literal.take();
        let l_func = self.values[l.index()].func.take();
        let l_set = self.values[l.index()].is_set;
        let l_required = self.values[l.index()].is_required;
        let l_native = self.values[l.index()].is_native;
        let l_origin = self.values[l.index()].origin;
        let l_required_by = std::mem::take(&mut self.values[l.index()].required_by);
        self.values[l.index()].forward = Some(w);

        {
            let wv = &mut self.values[w.index()];
            wv.is_set |= l_set;
            wv.is_native |= l_native;
            if wv.is_set {
                wv.is_required = false;
            } else {
                wv.is_required |= l_required;
            }
            if wv.origin.is_none() {
                wv.origin = l_origin;
            }
            if wv.literal.is_none() {
                wv.literal = l_literal;
            }
            if wv.func.is_none() {
                wv.func = l_func;
            }
            for k in l_required_by {
                if !wv.required_by.contains(&k) {
                    wv.required_by.push(k);
                }
            }
        }

        if let Some(l_props) = l_props {
            if self.values[w.index()].props.is_none() {
                self.values[w.index()].props = Some(PropMap::default());
            }
            for (name, lref) in l_props {
                let existing = self.values[w.index()]
                    .props
                    .as_ref()
                    .and_then(|p| p.get(&name).copied());
                match existing {
                    Some(wref) => {
                        let wv = self.ref_value(wref);
                        let lv = self.ref_value(lref);
                        if wv != lv {
                            let w_placeholder =
                                self.values[wv.index()].is_required && !self.values[wv.index()].is_set;
                            let l_placeholder =
                                self.values[lv.index()].is_required && !self.values[lv.index()].is_set;
                            if w_placeholder && !l_placeholder {
                                self.remap(lv, wv);
                            } else {
                                self.remap(wv, lv);
                            }
                        }
                        if self.refs[lref.index()].is_set && !self.refs[wref.index()].is_set {
                            self.refs[wref.index()].is_set = true;
                            self.refs[wref.index()].origin = self.refs[lref.index()].origin;
                        }
                    }
                    None => {
                        // A placeholder the loser carried may already be
                        // satisfied somewhere in the winner's prototype
                        // chain. Resolve it before adopting the property so
                        // deferred calls hanging off it can fire.
                        let lv = self.ref_value(lref);
                        if !self.values[lv.index()].is_set {
                            if let Some(cref) = self.get_property(w, &name) {
                                let cv = self.ref_value(cref);
                                if self.values[cv.index()].is_set && cv != lv {
                                    self.remap(cv, lv);
                                }
                            }
                        }
                        self.values[w.index()]
                            .props
                            .as_mut()
                            .expect("prop map created above")
                            .insert(name, lref);
                    }
                }
            }
        }

        match (self.values[w.index()].proto, l_proto) {
            (Some(wp), Some(lp)) => self.remap(wp, lp),
            (None, Some(lp)) => self.values[w.index()].proto = Some(lp),
            _ => {}
        }

        self.values[w.index()].merging = false;
        self.values[l.index()].merging = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::Literal;

    fn object(arena: &mut Arena) -> ValueId {
        let mut v = Value::default();
        v.props = Some(PropMap::default());
        v.is_set = true;
        arena.alloc_value(v)
    }

    fn placeholder(arena: &mut Arena) -> ValueId {
        let mut v = Value::default();
        v.props = Some(PropMap::default());
        v.is_required = true;
        arena.alloc_value(v)
    }

    #[test]
    fn remap_forwards_old_references() {
        let mut arena = Arena::new();
        let old = placeholder(&mut arena);
        let r = arena.alloc_ref(Reference::new(old, false));
        let new = object(&mut arena);
        arena.remap(new, old);
        assert_eq!(arena.ref_value(r), new);
        assert!(arena.value(new).is_set);
        assert!(!arena.value(new).is_required);
    }

    #[test]
    fn remap_merges_placeholder_props_into_winner() {
        let mut arena = Arena::new();
        let old = placeholder(&mut arena);
        let child = placeholder(&mut arena);
        let child_ref = arena.alloc_ref(Reference::new(child, false));
        arena.set_property(old, "init", child_ref);

        let new = object(&mut arena);
        arena.remap(new, old);
        assert_eq!(arena.get_property(new, "init"), Some(child_ref));
    }

    #[test]
    fn conflicting_props_prefer_the_set_side() {
        let mut arena = Arena::new();
        let a = object(&mut arena);
        let b = object(&mut arena);

        let real = object(&mut arena);
        let real_ref = arena.alloc_ref(Reference::new(real, true));
        arena.set_property(a, "x", real_ref);

        let ghost = placeholder(&mut arena);
        let ghost_ref = arena.alloc_ref(Reference::new(ghost, false));
        arena.set_property(b, "x", ghost_ref);

        arena.remap(a, b);
        // Both slots resolve to the real value now.
        let resolved = arena.ref_value(ghost_ref);
        assert_eq!(resolved, arena.ref_value(real_ref));
        assert!(arena.value(resolved).is_set);
    }

    #[test]
    fn remap_survives_cycles() {
        let mut arena = Arena::new();
        let a = object(&mut arena);
        let b = object(&mut arena);
        let ar = arena.alloc_ref(Reference::new(a, true));
        let br = arena.alloc_ref(Reference::new(b, true));
        arena.set_property(a, "next", br);
        arena.set_property(b, "next", ar);
        arena.remap(a, b);
        assert_eq!(arena.resolve(b), a);
    }

    #[test]
    fn prototype_chain_lookup() {
        let mut arena = Arena::new();
        let base = object(&mut arena);
        let lit = arena.alloc_value({
            let mut v = Value::default();
            v.literal = Some(Literal::Num(3.0));
            v.is_set = true;
            v
        });
        let lref = arena.alloc_ref(Reference::new(lit, true));
        arena.set_property(base, "size", lref);

        let derived = object(&mut arena);
        arena.value_mut(derived).proto = Some(base);
        assert_eq!(arena.get_property(derived, "size"), Some(lref));
        assert_eq!(arena.get_property(derived, "missing"), None);
    }

    #[test]
    fn placeholder_prop_resolves_against_winner_chain() {
        let mut arena = Arena::new();
        // Winner is a function-like object with a method on its prototype
        // reachable through `proto`.
        let proto = object(&mut arena);
        let method = object(&mut arena);
        let method_ref = arena.alloc_ref(Reference::new(method, true));
        arena.set_property(proto, "run", method_ref);
        let winner = object(&mut arena);
        arena.value_mut(winner).proto = Some(proto);

        // Loser gathered an unresolved `run` while it was a placeholder.
        let loser = placeholder(&mut arena);
        let ghost = placeholder(&mut arena);
        let ghost_ref = arena.alloc_ref(Reference::new(ghost, false));
        arena.set_property(loser, "run", ghost_ref);

        arena.remap(winner, loser);
        assert_eq!(arena.ref_value(ghost_ref), method);
    }
}
