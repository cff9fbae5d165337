//! Fact extraction: walk the global namespace and report, for one file, the
//! dotted paths it defined (exports) and the paths it read that some other
//! file has to define (requires).

use hashbrown::HashSet;

use crate::core::value::{KeyId, RefId, ValueId};
use crate::vm::Vm;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Facts {
    pub requires: Vec<String>,
    pub exports: Vec<String>,
}

/// Extract the facts recorded for `key`.
///
/// A path is an export when its slot was explicitly assigned by `key`; the
/// assigned value may itself still be unresolved (`var b = A.mk();` exports
/// `b` even while `A.mk` is pending). It is a require when `key` is among the
/// readers recorded on the value. Paths whose final segment is `prototype` are never requires:
/// reading a prototype is how inheritance is wired, not a load-order
/// constraint beyond the one on the constructor itself. Names under the
/// engine-reserved `@@` prefix are skipped entirely.
pub fn extract(vm: &mut Vm, key: KeyId) -> Facts {
    let mut facts = Facts::default();
    let mut visited: HashSet<ValueId> = HashSet::new();
    let global = vm.global;
    visited.insert(global);
    let mut path: Vec<String> = Vec::new();
    walk(vm, key, global, &mut path, &mut visited, &mut facts);
    facts
}

fn walk(
    vm: &mut Vm,
    key: KeyId,
    obj: ValueId,
    path: &mut Vec<String>,
    visited: &mut HashSet<ValueId>,
    facts: &mut Facts,
) {
    let props: Vec<(String, RefId)> = match vm.arena.value(obj).props.as_ref() {
        Some(p) => p.iter().map(|(k, &r)| (k.clone(), r)).collect(),
        None => return,
    };
    for (name, r) in props {
        if name.starts_with("@@") {
            continue;
        }
        let is_prototype = name == "prototype";
        let v = vm.arena.ref_value(r);
        path.push(name);
        {
            let val = vm.arena.value(v);
            let slot = vm.arena.reference(r);
            if !val.is_native {
                let own_slot = slot.is_set && slot.origin == Some(key);
                // Reading back a slot this file assigned itself is not a
                // dependency on anyone.
                if val.required_by.contains(&key) && !is_prototype && !own_slot {
                    facts.requires.push(path.join("."));
                }
                if own_slot {
                    facts.exports.push(path.join("."));
                }
            }
        }
        // Facts are per path; the visited set only stops the recursion so
        // aliases and cycles stay cheap.
        if visited.insert(v) {
            walk(vm, key, v, path, visited, facts);
        }
        path.pop();
    }
}
