//! The machine: everything one interpreter session owns.

use std::io::{Read, Write};

use log::debug;
use sgc::{Cell, CellRef, Heap, HeapConfig, PrimId, Slot};
use skema_read::{ReadError, Reader};
use skema_util::symbol::{ATOM_FALSE, ATOM_TRUE};
use skema_util::{Diagnostic, Handler, Symbol};

use crate::builtins;
use crate::env;
use crate::error::EvalError;
use crate::eval;
use crate::printer;

/// A built-in callable: takes the machine and a pre-evaluated argument
/// list in source order, returns a cell.
pub type PrimFn = fn(&mut Machine, CellRef) -> Result<CellRef, EvalError>;

struct PrimEntry {
    name: &'static str,
    func: PrimFn,
}

/// One interpreter session: heap, streams, diagnostics, and the
/// primitive table, with the global environment and the canonical true
/// atom held as permanent roots.
pub struct Machine {
    pub heap: Heap,
    input: Reader<Box<dyn Read>>,
    output: Box<dyn Write>,
    handler: Handler,
    prims: Vec<PrimEntry>,
    env_slot: Slot,
    truth_slot: Slot,
}

impl Machine {
    /// Build a machine with the initial environment installed: `#t`
    /// bound to itself, `#f` bound to null, then every primitive.
    pub fn new(
        config: HeapConfig,
        input: Box<dyn Read>,
        output: Box<dyn Write>,
    ) -> Result<Self, EvalError> {
        let mut heap = Heap::new(config)?;

        // Permanent roots, registered below every mark the evaluator
        // will ever take.
        let env = heap.alloc(Cell::Pair(CellRef::NIL, CellRef::NIL))?;
        let env_slot = heap.protect(env);
        let truth = heap.alloc(Cell::Atom(ATOM_TRUE))?;
        let truth_slot = heap.protect(truth);

        let mut machine = Self {
            heap,
            input: Reader::new(input),
            output,
            handler: Handler::new(),
            prims: Vec::new(),
            env_slot,
            truth_slot,
        };
        machine.install_initial_env()?;
        debug!(
            "machine ready: {} primitives, {} cells per semispace",
            machine.prims.len(),
            machine.heap.capacity()
        );
        Ok(machine)
    }

    fn install_initial_env(&mut self) -> Result<(), EvalError> {
        let env = self.heap.root(self.env_slot);
        let truth = self.heap.root(self.truth_slot);
        env::bind(&mut self.heap, env, truth, truth)?;

        let falsity = self.heap.alloc(Cell::Atom(ATOM_FALSE))?;
        let env = self.heap.root(self.env_slot);
        env::bind(&mut self.heap, env, falsity, CellRef::NIL)?;

        for &(name, func) in builtins::PRIMITIVES {
            self.defun(name, func)?;
        }
        Ok(())
    }

    /// Register a native callable and bind it under `name`.
    fn defun(&mut self, name: &'static str, func: PrimFn) -> Result<(), EvalError> {
        let id = PrimId::new(self.prims.len() as u32);
        self.prims.push(PrimEntry { name, func });

        let mark = self.heap.mark();
        let key = self.heap.alloc(Cell::Atom(Symbol::intern(name)))?;
        let key_slot = self.heap.protect(key);
        let value = self.heap.alloc(Cell::Primitive(id))?;
        let env = self.heap.root(self.env_slot);
        let key = self.heap.root(key_slot);
        env::bind(&mut self.heap, env, key, value)?;
        self.heap.release(mark);
        Ok(())
    }

    /// Resolve a primitive identity to its function.
    pub(crate) fn primitive(&self, id: PrimId) -> PrimFn {
        self.prims[id.as_u32() as usize].func
    }

    /// Name a primitive was registered under, for diagnostics.
    pub fn primitive_name(&self, id: PrimId) -> &'static str {
        self.prims[id.as_u32() as usize].name
    }

    /// The global environment.
    pub fn global_env(&self) -> CellRef {
        self.heap.root(self.env_slot)
    }

    /// The canonical true atom.
    pub fn truth(&self) -> CellRef {
        self.heap.root(self.truth_slot)
    }

    /// Read one toplevel expression from the session input.
    pub fn read_value(&mut self) -> Result<CellRef, ReadError> {
        self.input.read_value(&mut self.heap, &self.handler)
    }

    /// Evaluate an expression in the global environment.
    pub fn eval_value(&mut self, expr: CellRef) -> Result<CellRef, EvalError> {
        let env = self.global_env();
        eval::eval(self, expr, env)
    }

    /// Print a value to the session output.
    pub fn write_value(&mut self, value: CellRef) -> Result<(), EvalError> {
        printer::print(&self.heap, value, &mut self.output)?;
        Ok(())
    }

    /// Print a line terminator and flush.
    pub fn write_newline(&mut self) -> Result<(), EvalError> {
        writeln!(self.output)?;
        self.output.flush()?;
        Ok(())
    }

    /// Take any diagnostics collected since the last drain.
    pub fn drain_diagnostics(&self) -> Vec<Diagnostic> {
        self.handler.drain()
    }
}
