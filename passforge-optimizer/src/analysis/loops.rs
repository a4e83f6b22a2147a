//! Natural loop detection

use passforge_core::ir::{BlockId, Function, Module};
use passforge_core::LoopQuery;
use rustc_hash::{FxHashMap, FxHashSet};

/// A natural loop: a header plus every block that reaches a latch without
/// passing through the header
#[derive(Debug, Clone)]
pub struct Loop {
    pub header: BlockId,
    /// Blocks with a back edge to the header
    pub latches: Vec<BlockId>,
    /// All blocks in the loop, header included
    pub blocks: FxHashSet<BlockId>,
}

impl Loop {
    pub fn contains(&self, block: BlockId) -> bool {
        self.blocks.contains(&block)
    }
}

/// Loop structure of one function
#[derive(Debug, Clone, Default)]
pub struct LoopInfo {
    loops: Vec<Loop>,
    dominators: FxHashMap<BlockId, FxHashSet<BlockId>>,
}

impl LoopInfo {
    /// Compute dominators and natural loops for a function body
    pub fn compute(function: &Function) -> Self {
        let mut info = Self::default();
        let Some(entry) = function.entry() else {
            return info;
        };

        let order = reverse_postorder(function, entry.id);
        let preds = function.predecessors();
        info.compute_dominators(&order, &preds);
        info.find_loops(function, &order, &preds);
        info
    }

    fn compute_dominators(
        &mut self,
        order: &[BlockId],
        preds: &FxHashMap<BlockId, Vec<BlockId>>,
    ) {
        let reachable: FxHashSet<BlockId> = order.iter().copied().collect();
        let entry = order[0];

        for &block in order {
            let doms = if block == entry {
                std::iter::once(entry).collect()
            } else {
                reachable.clone()
            };
            self.dominators.insert(block, doms);
        }

        let mut changed = true;
        while changed {
            changed = false;
            for &block in order.iter().skip(1) {
                let mut new_doms: Option<FxHashSet<BlockId>> = None;
                for pred in preds.get(&block).into_iter().flatten() {
                    let Some(pred_doms) = self.dominators.get(pred) else {
                        continue;
                    };
                    new_doms = Some(match new_doms {
                        None => pred_doms.clone(),
                        Some(acc) => acc.intersection(pred_doms).copied().collect(),
                    });
                }
                let mut new_doms = new_doms.unwrap_or_default();
                new_doms.insert(block);
                if self.dominators.get(&block) != Some(&new_doms) {
                    self.dominators.insert(block, new_doms);
                    changed = true;
                }
            }
        }
    }

    fn find_loops(
        &mut self,
        function: &Function,
        order: &[BlockId],
        preds: &FxHashMap<BlockId, Vec<BlockId>>,
    ) {
        let mut by_header: FxHashMap<BlockId, Loop> = FxHashMap::default();

        for &block in order {
            let Some(successors) = function.block(block).map(|b| b.terminator.successors()) else {
                continue;
            };
            for header in successors {
                if !self.dominates(header, block) {
                    continue;
                }
                let entry = by_header.entry(header).or_insert_with(|| Loop {
                    header,
                    latches: Vec::new(),
                    blocks: std::iter::once(header).collect(),
                });
                entry.latches.push(block);

                // Walk predecessors backwards from the latch, stopping at the header
                let mut work = vec![block];
                while let Some(current) = work.pop() {
                    if !entry.blocks.insert(current) {
                        continue;
                    }
                    for pred in preds.get(&current).into_iter().flatten() {
                        if self.dominators.contains_key(pred) {
                            work.push(*pred);
                        }
                    }
                }
            }
        }

        let position: FxHashMap<BlockId, usize> =
            order.iter().enumerate().map(|(i, b)| (*b, i)).collect();
        let mut loops: Vec<Loop> = by_header.into_values().collect();
        loops.sort_by_key(|l| position.get(&l.header).copied().unwrap_or(usize::MAX));
        self.loops = loops;
    }

    /// Check if `a` dominates `b`. Unreachable blocks are dominated by nothing.
    pub fn dominates(&self, a: BlockId, b: BlockId) -> bool {
        self.dominators
            .get(&b)
            .map_or(false, |doms| doms.contains(&a))
    }

    /// Loops ordered by header position in reverse postorder
    pub fn loops(&self) -> &[Loop] {
        &self.loops
    }

    pub fn is_empty(&self) -> bool {
        self.loops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.loops.len()
    }

    /// Check if `block` heads a loop
    pub fn is_loop_header(&self, block: BlockId) -> bool {
        self.loops.iter().any(|l| l.header == block)
    }

    /// Number of loops containing `block`; zero outside any loop
    pub fn loop_depth(&self, block: BlockId) -> usize {
        self.loops.iter().filter(|l| l.contains(block)).count()
    }
}

/// Blocks reachable from `entry`, in reverse postorder
fn reverse_postorder(function: &Function, entry: BlockId) -> Vec<BlockId> {
    let mut visited = FxHashSet::default();
    let mut postorder = Vec::new();
    let mut stack = vec![(entry, 0usize)];
    visited.insert(entry);

    while let Some((block, next)) = stack.pop() {
        let successors = function
            .block(block)
            .map(|b| b.terminator.successors())
            .unwrap_or_default();
        if next < successors.len() {
            stack.push((block, next + 1));
            let succ = successors[next];
            if visited.insert(succ) {
                stack.push((succ, 0));
            }
        } else {
            postorder.push(block);
        }
    }

    postorder.reverse();
    postorder
}

/// Loop structure for every defined function of a module
#[derive(Debug, Clone, Default)]
pub struct ModuleLoopInfo {
    functions: FxHashMap<String, LoopInfo>,
}

impl ModuleLoopInfo {
    pub fn compute(module: &Module) -> Self {
        let functions = module
            .defined_functions()
            .map(|f| (f.name.clone(), LoopInfo::compute(f)))
            .collect();
        Self { functions }
    }

    /// Loop structure of the named function, if it has a body
    pub fn get(&self, function: &str) -> Option<&LoopInfo> {
        self.functions.get(function)
    }
}

impl LoopQuery for ModuleLoopInfo {
    fn has_loops(&self, function: &str) -> bool {
        self.get(function).map_or(false, |info| !info.is_empty())
    }
}
