//! Call graph with bottom-up strongly-connected component ordering

use passforge_core::ir::{CallSite, Module};
use passforge_core::CallGraphQuery;
use rustc_hash::FxHashMap;

/// Direct-call graph of a module
///
/// Nodes are the module's functions. An edge `a -> b` exists when `a`
/// contains a direct call to `b` and `b` is a function of the module.
/// Indirect calls and calls to unknown names contribute no edges.
#[derive(Debug, Clone, Default)]
pub struct CallGraph {
    nodes: Vec<String>,
    edges: FxHashMap<String, Vec<String>>,
    call_sites: FxHashMap<String, Vec<CallSite>>,
    use_counts: FxHashMap<String, usize>,
    sccs: Vec<Vec<String>>,
}

impl CallGraph {
    /// Build the call graph of a module
    pub fn build(module: &Module) -> Self {
        let mut graph = Self {
            nodes: module.functions.iter().map(|f| f.name.clone()).collect(),
            ..Self::default()
        };

        for function in &module.functions {
            let sites = function.call_sites();
            let mut callees: Vec<String> = Vec::new();
            for site in &sites {
                if let Some(callee) = &site.callee {
                    *graph.use_counts.entry(callee.clone()).or_default() += 1;
                    if module.contains(callee) && !callees.contains(callee) {
                        callees.push(callee.clone());
                    }
                }
            }
            for name in function.address_taken_functions() {
                *graph.use_counts.entry(name.to_string()).or_default() += 1;
            }
            graph.edges.insert(function.name.clone(), callees);
            graph.call_sites.insert(function.name.clone(), sites);
        }

        graph.sccs = graph.compute_sccs();
        graph
    }

    /// Functions called directly by `caller`
    pub fn callees(&self, caller: &str) -> &[String] {
        self.edges.get(caller).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Functions of the module, in module order
    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    /// Tarjan's algorithm, iterative. Components come out callees-first.
    fn compute_sccs(&self) -> Vec<Vec<String>> {
        let index_of: FxHashMap<&str, usize> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();
        let successors: Vec<Vec<usize>> = self
            .nodes
            .iter()
            .map(|name| {
                self.callees(name)
                    .iter()
                    .filter_map(|callee| index_of.get(callee.as_str()).copied())
                    .collect()
            })
            .collect();

        let count = self.nodes.len();
        let mut index: Vec<Option<usize>> = vec![None; count];
        let mut lowlink = vec![0usize; count];
        let mut on_stack = vec![false; count];
        let mut stack: Vec<usize> = Vec::new();
        let mut next_index = 0;
        let mut components = Vec::new();

        for start in 0..count {
            if index[start].is_some() {
                continue;
            }
            index[start] = Some(next_index);
            lowlink[start] = next_index;
            next_index += 1;
            stack.push(start);
            on_stack[start] = true;

            let mut work = vec![(start, 0usize)];
            while let Some((node, pos)) = work.pop() {
                if let Some(&succ) = successors[node].get(pos) {
                    work.push((node, pos + 1));
                    match index[succ] {
                        None => {
                            index[succ] = Some(next_index);
                            lowlink[succ] = next_index;
                            next_index += 1;
                            stack.push(succ);
                            on_stack[succ] = true;
                            work.push((succ, 0));
                        }
                        Some(succ_index) if on_stack[succ] => {
                            lowlink[node] = lowlink[node].min(succ_index);
                        }
                        Some(_) => {}
                    }
                    continue;
                }

                if Some(lowlink[node]) == index[node] {
                    let mut members = Vec::new();
                    while let Some(member) = stack.pop() {
                        on_stack[member] = false;
                        members.push(member);
                        if member == node {
                            break;
                        }
                    }
                    members.sort_unstable();
                    components.push(members.into_iter().map(|i| self.nodes[i].clone()).collect());
                }
                if let Some(&(parent, _)) = work.last() {
                    lowlink[parent] = lowlink[parent].min(lowlink[node]);
                }
            }
        }

        components
    }
}

impl CallGraphQuery for CallGraph {
    fn bottom_up_sccs(&self) -> &[Vec<String>] {
        &self.sccs
    }

    fn call_sites(&self, caller: &str) -> &[CallSite] {
        self.call_sites.get(caller).map(Vec::as_slice).unwrap_or(&[])
    }

    fn use_count(&self, function: &str) -> usize {
        self.use_counts.get(function).copied().unwrap_or(0)
    }
}
