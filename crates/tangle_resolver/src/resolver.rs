//! The resolver: per-file evaluation, fact records, caching, and the fixed
//! point over deferred cross-file calls.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use tangle_ast::Program;
use tangle_eval::{Facts, KeyId, Logger, Vm, extract};
use tangle_lexer::Lexer;
use tangle_parser::Parser;

use crate::errors::ResolveError;
use crate::sort::{self, SortEntry};

type SourceFn = Box<dyn FnMut(&str) -> Option<String>>;
type CacheReadFn = Box<dyn FnMut(&str) -> Option<String>>;
type CacheWriteFn = Box<dyn FnMut(&str, &str)>;

/// Host hooks and knobs. Everything is optional; a resolver with no
/// `read_source` can still be fed via [`Resolver::add_source`].
pub struct ResolverOptions {
    /// Load source text for a key.
    pub read_source: Option<SourceFn>,
    /// Fetch a cached fact record for a key, as written by `write_cache`.
    pub read_cache: Option<CacheReadFn>,
    /// Persist a fact record after a file has been evaluated.
    pub write_cache: Option<CacheWriteFn>,
    pub log: Logger,
    /// Names bound to the global object itself.
    pub global_aliases: Vec<String>,
}

impl Default for ResolverOptions {
    fn default() -> ResolverOptions {
        ResolverOptions {
            read_source: None,
            read_cache: None,
            write_cache: None,
            log: Logger::default(),
            global_aliases: vec!["window".to_string()],
        }
    }
}

/// A source handed to [`Resolver::add_source`] directly.
pub enum SourceInput {
    Text(String),
    Ast(Program),
}

/// Cache records are plain JSON so other tooling can produce or inspect
/// them.
#[derive(Serialize, Deserialize)]
struct CacheEntry {
    requires: Vec<String>,
    exports: Vec<String>,
}

struct FileRecord {
    key: KeyId,
    facts: Facts,
    cached: bool,
}

pub struct Resolver {
    vm: Vm,
    read_source: Option<SourceFn>,
    read_cache: Option<CacheReadFn>,
    write_cache: Option<CacheWriteFn>,
    log: Logger,
    records: IndexMap<String, FileRecord, ahash::RandomState>,
}

impl Resolver {
    pub fn new(options: ResolverOptions) -> Resolver {
        let vm = Vm::new(&options.global_aliases, options.log.clone());
        Resolver {
            vm,
            read_source: options.read_source,
            read_cache: options.read_cache,
            write_cache: options.write_cache,
            log: options.log,
            records: IndexMap::default(),
        }
    }

    /// Add a file by key, consulting the cache before loading source.
    /// Re-adding a key replaces its record in place.
    pub fn add(&mut self, key: &str) -> Result<(), ResolveError> {
        if let Some(read_cache) = self.read_cache.as_mut() {
            if let Some(raw) = read_cache(key) {
                match serde_json::from_str::<CacheEntry>(&raw) {
                    Ok(entry) => {
                        self.log.info(&format!("{key}: using cached record"));
                        self.insert_cached(key, entry);
                        return Ok(());
                    }
                    Err(e) => {
                        self.log
                            .warn(&format!("{key}: ignoring unreadable cache record: {e}"));
                    }
                }
            }
        }
        let source = self.read_source.as_mut().and_then(|f| f(key));
        let Some(source) = source else {
            return Err(ResolveError::Key {
                key: key.to_string(),
                message: "no source available".to_string(),
            });
        };
        self.add_source(key, SourceInput::Text(source))
    }

    pub fn add_all<I, S>(&mut self, keys: I) -> Result<(), ResolveError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for key in keys {
            self.add(key.as_ref())?;
        }
        Ok(())
    }

    /// Evaluate a source against the shared global and record its facts.
    pub fn add_source(&mut self, key: &str, input: SourceInput) -> Result<(), ResolveError> {
        let program = match input {
            SourceInput::Text(src) => self.parse(key, &src)?,
            SourceInput::Ast(p) => p,
        };
        let k = self.vm.intern_key(key);
        self.log.info(&format!("evaluating {key}"));
        self.vm.current_origin = Some(k);
        self.vm.eval_program(&program);
        self.vm.current_origin = None;

        let facts = extract(&mut self.vm, k);
        if let Some(write_cache) = self.write_cache.as_mut() {
            let entry = CacheEntry {
                requires: facts.requires.clone(),
                exports: facts.exports.clone(),
            };
            match serde_json::to_string(&entry) {
                Ok(raw) => write_cache(key, &raw),
                Err(e) => self.log.warn(&format!("{key}: cache record not written: {e}")),
            }
        }
        self.insert_record(key, k, facts, false);
        self.settle();
        Ok(())
    }

    /// Recorded facts for a key, if it has been added.
    pub fn facts(&self, key: &str) -> Option<&Facts> {
        self.records.get(key).map(|r| &r.facts)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    /// Order every added file so definitions precede uses.
    pub fn resolve(&mut self) -> Vec<String> {
        let entries: Vec<SortEntry<'_>> = self
            .records
            .iter()
            .map(|(key, rec)| SortEntry {
                key,
                exports: &rec.facts.exports,
                requires: &rec.facts.requires,
            })
            .collect();
        sort::full_order(&entries, &self.log)
    }

    /// Order only the files needed to provide the given exports.
    pub fn resolve_only(&mut self, exports: &[String]) -> Result<Vec<String>, ResolveError> {
        let entries: Vec<SortEntry<'_>> = self
            .records
            .iter()
            .map(|(key, rec)| SortEntry {
                key,
                exports: &rec.facts.exports,
                requires: &rec.facts.requires,
            })
            .collect();
        sort::partial_order(&entries, exports, &self.log)
    }

    fn parse(&mut self, key: &str, src: &str) -> Result<Program, ResolveError> {
        let lexed = Lexer::new(src).lex();
        let parsed = Parser::new(src, &lexed.tokens).parse();
        for d in lexed.diagnostics.iter().chain(parsed.diagnostics.iter()) {
            if d.is_error() {
                return Err(ResolveError::Key {
                    key: key.to_string(),
                    message: d.message.clone(),
                });
            }
            self.log.warn(&format!("{key}: {}", d.message));
        }
        Ok(parsed.program)
    }

    /// A cached file contributes synthetic values at its exported paths so
    /// live files unify against them; its code is gone, so deferred calls
    /// into it can never replay. That is the precision the cache trades
    /// away.
    fn insert_cached(&mut self, key: &str, entry: CacheEntry) {
        let k = self.vm.intern_key(key);
        self.vm.current_origin = Some(k);
        for path in &entry.exports {
            self.define_synthetic(k, path);
        }
        self.vm.current_origin = None;
        let facts = Facts {
            requires: entry.requires,
            exports: entry.exports,
        };
        self.insert_record(key, k, facts, true);
        self.settle();
    }

    /// Materialize an exported path in the global graph, unifying any
    /// placeholders other files have already hung there.
    fn define_synthetic(&mut self, k: KeyId, path: &str) {
        let mut obj = self.vm.global;
        for seg in path.split('.') {
            let r = match self.vm.arena.get_property(obj, seg) {
                Some(r) => r,
                None => {
                    let v = self.vm.new_undefined();
                    let r = self.vm.new_ref(v, false);
                    self.vm.arena.set_property(obj, seg, r);
                    r
                }
            };
            let v = self.vm.arena.ref_value(r);
            if !self.vm.arena.value(v).is_set {
                let nv = self.vm.new_object();
                self.vm.arena.remap(nv, v);
            }
            let slot = self.vm.arena.reference_mut(r);
            if !slot.is_set {
                slot.is_set = true;
                slot.origin = Some(k);
            }
            obj = self.vm.arena.ref_value(r);
        }
    }

    fn insert_record(&mut self, key: &str, k: KeyId, facts: Facts, cached: bool) {
        match self.records.get_mut(key) {
            Some(rec) => {
                rec.facts = facts;
                rec.cached = cached;
            }
            None => {
                self.records.insert(
                    key.to_string(),
                    FileRecord {
                        key: k,
                        facts,
                        cached,
                    },
                );
            }
        }
    }

    /// Replay deferred calls until nothing fires, re-extracting facts for
    /// every live file after each round since replayed bodies touch the
    /// shared graph. Each deferred call fires at most once, which bounds the
    /// loop.
    fn settle(&mut self) {
        loop {
            let fired = self.vm.drain_pending();
            if fired == 0 {
                break;
            }
            self.log
                .debug(&format!("replayed {fired} deferred call(s)"));
            let live: Vec<(String, KeyId)> = self
                .records
                .iter()
                .filter(|(_, rec)| !rec.cached)
                .map(|(key, rec)| (key.clone(), rec.key))
                .collect();
            for (key, k) in live {
                let facts = extract(&mut self.vm, k);
                if let Some(rec) = self.records.get_mut(&key) {
                    rec.facts = facts;
                }
            }
        }
    }
}
