//! Dependency ordering over extracted facts.
//!
//! Two modes: `full_order` arranges every file, tolerating cycles and
//! unsatisfied requires; `partial_order` walks up from requested exports and
//! yields only the files needed to provide them.

use indexmap::IndexMap;

use crate::errors::ResolveError;
use tangle_eval::Logger;

pub struct SortEntry<'a> {
    pub key: &'a str,
    pub exports: &'a [String],
    pub requires: &'a [String],
}

struct Sorter<'a> {
    entries: &'a [SortEntry<'a>],
    visited: Vec<bool>,
    /// Export path to providing file. Last writer wins, as at load time.
    export_map: IndexMap<String, usize, ahash::RandomState>,
    /// Require path to every file that needs it.
    require_map: IndexMap<String, Vec<usize>, ahash::RandomState>,
    sorted: Vec<usize>,
}

impl<'a> Sorter<'a> {
    fn build(entries: &'a [SortEntry<'a>], log: &Logger) -> Sorter<'a> {
        let mut export_map: IndexMap<String, usize, ahash::RandomState> = IndexMap::default();
        let mut require_map: IndexMap<String, Vec<usize>, ahash::RandomState> = IndexMap::default();
        for (i, e) in entries.iter().enumerate() {
            for export in e.exports {
                if let Some(prev) = export_map.insert(export.clone(), i) {
                    if prev != i {
                        log.warn(&format!(
                            "{} redeclares {export}, first declared by {}",
                            e.key, entries[prev].key
                        ));
                    }
                }
            }
            for require in e.requires {
                require_map.entry(require.clone()).or_default().push(i);
            }
        }
        Sorter {
            entries,
            visited: vec![false; entries.len()],
            export_map,
            require_map,
            sorted: Vec::new(),
        }
    }

    /// Place a file after everything that requires one of its exports, then
    /// record it. Reversing the accumulated order at the end puts providers
    /// first.
    fn visit_down(&mut self, n: usize) {
        if self.visited[n] {
            return;
        }
        self.visited[n] = true;
        for export in self.entries[n].exports {
            if let Some(requiring) = self.require_map.shift_remove(export) {
                for m in requiring {
                    self.visit_down(m);
                }
            }
            self.export_map.shift_remove(export);
        }
        self.sorted.push(n);
    }

    /// Place a file after its own providers.
    fn visit_up(&mut self, n: usize) {
        if self.visited[n] {
            return;
        }
        self.visited[n] = true;
        for require in self.entries[n].requires {
            if let Some(&m) = self.export_map.get(require) {
                if m != n {
                    self.visit_up(m);
                }
            }
        }
        self.sorted.push(n);
    }

    fn into_keys(self) -> Vec<String> {
        self.sorted
            .into_iter()
            .map(|n| self.entries[n].key.to_string())
            .collect()
    }
}

/// Order every entry. Files with no requires seed the walk in input order;
/// remaining export providers (cycles, mutual requires) are flushed next,
/// and files whose requires nobody exports come out last.
pub fn full_order(entries: &[SortEntry<'_>], log: &Logger) -> Vec<String> {
    let mut s = Sorter::build(entries, log);

    // Seeds run back to front: the whole accumulated order is reversed at
    // the end, so this keeps independent files in input order.
    for i in (0..entries.len()).rev() {
        if entries[i].requires.is_empty() {
            s.visit_down(i);
        }
    }

    loop {
        let before = s.export_map.len();
        let keys: Vec<String> = s.export_map.keys().rev().cloned().collect();
        for k in keys {
            if let Some(&n) = s.export_map.get(&k) {
                s.visit_down(n);
            }
        }
        if s.export_map.len() == before {
            break;
        }
    }

    let leftover: Vec<Vec<usize>> = s.require_map.values().rev().cloned().collect();
    for nodes in leftover {
        for &n in nodes.iter().rev() {
            s.visit_down(n);
        }
    }

    s.sorted.reverse();
    s.into_keys()
}

/// Order only the files needed to provide `wanted` exports. Unlike the full
/// mode this fails when an export is missing; a partial bundle with a hole
/// in it is useless.
pub fn partial_order(
    entries: &[SortEntry<'_>],
    wanted: &[String],
    log: &Logger,
) -> Result<Vec<String>, ResolveError> {
    let mut s = Sorter::build(entries, log);
    for path in wanted {
        let Some(&n) = s.export_map.get(path) else {
            return Err(ResolveError::UnresolvedExport { path: path.clone() });
        };
        s.visit_up(n);
    }
    Ok(s.into_keys())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry<'a>(key: &'a str, exports: &'a [String], requires: &'a [String]) -> SortEntry<'a> {
        SortEntry {
            key,
            exports,
            requires,
        }
    }

    fn strs(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn providers_come_first() {
        let a_exp = strs(&["A"]);
        let a_req = strs(&[]);
        let b_exp = strs(&[]);
        let b_req = strs(&["A"]);
        let entries = [entry("b.js", &b_exp, &b_req), entry("a.js", &a_exp, &a_req)];
        let order = full_order(&entries, &Logger::default());
        assert_eq!(order, vec!["a.js".to_string(), "b.js".to_string()]);
    }

    #[test]
    fn chains_resolve_transitively() {
        let c_exp = strs(&["C"]);
        let c_req = strs(&[]);
        let a_exp = strs(&["A"]);
        let a_req = strs(&["C"]);
        let b_exp = strs(&[]);
        let b_req = strs(&["A"]);
        let entries = [
            entry("b.js", &b_exp, &b_req),
            entry("a.js", &a_exp, &a_req),
            entry("c.js", &c_exp, &c_req),
        ];
        let order = full_order(&entries, &Logger::default());
        assert_eq!(order, strs(&["c.js", "a.js", "b.js"]));
    }

    #[test]
    fn cycles_do_not_hang() {
        let a_exp = strs(&["A"]);
        let a_req = strs(&["B"]);
        let b_exp = strs(&["B"]);
        let b_req = strs(&["A"]);
        let entries = [entry("a.js", &a_exp, &a_req), entry("b.js", &b_exp, &b_req)];
        let order = full_order(&entries, &Logger::default());
        assert_eq!(order.len(), 2);
    }

    #[test]
    fn unsatisfied_requires_still_appear() {
        let a_exp = strs(&[]);
        let a_req = strs(&["Ghost"]);
        let entries = [entry("a.js", &a_exp, &a_req)];
        let order = full_order(&entries, &Logger::default());
        assert_eq!(order, strs(&["a.js"]));
    }

    #[test]
    fn no_dependency_files_keep_input_order() {
        let e = strs(&[]);
        let entries = [
            entry("one.js", &e, &e),
            entry("two.js", &e, &e),
            entry("three.js", &e, &e),
        ];
        let order = full_order(&entries, &Logger::default());
        assert_eq!(order, strs(&["one.js", "two.js", "three.js"]));
    }

    #[test]
    fn partial_mode_selects_the_needed_subset() {
        let a_exp = strs(&["A"]);
        let a_req = strs(&[]);
        let b_exp = strs(&["B"]);
        let b_req = strs(&["A"]);
        let c_exp = strs(&["C"]);
        let c_req = strs(&[]);
        let entries = [
            entry("a.js", &a_exp, &a_req),
            entry("b.js", &b_exp, &b_req),
            entry("c.js", &c_exp, &c_req),
        ];
        let order = partial_order(&entries, &strs(&["B"]), &Logger::default()).unwrap();
        assert_eq!(order, strs(&["a.js", "b.js"]));
    }

    #[test]
    fn partial_mode_rejects_unknown_exports() {
        let entries = [];
        let err = partial_order(&entries, &strs(&["Nope"]), &Logger::default()).unwrap_err();
        assert_eq!(
            err,
            ResolveError::UnresolvedExport {
                path: "Nope".to_string()
            }
        );
    }

    #[test]
    fn redeclared_exports_warn_and_last_writer_wins() {
        let first = strs(&["Dup"]);
        let second = strs(&["Dup"]);
        let none = strs(&[]);
        let user_req = strs(&["Dup"]);
        let entries = [
            entry("first.js", &first, &none),
            entry("second.js", &second, &none),
            entry("user.js", &none, &user_req),
        ];
        use std::cell::RefCell;
        use std::rc::Rc;
        let warnings: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = warnings.clone();
        let log = Logger::new(
            Rc::new(move |_, msg| sink.borrow_mut().push(msg.to_string())),
            0,
        );
        let order = full_order(&entries, &log);
        assert_eq!(warnings.borrow().len(), 1);
        // user.js must land after the surviving provider.
        let user = order.iter().position(|k| k == "user.js").unwrap();
        let second = order.iter().position(|k| k == "second.js").unwrap();
        assert!(second < user);
    }
}
