//! Graph → Tree.
//!
//! Chooses a spanning tree over the graph's variables, rooted at the top.
//! Each triple becomes exactly one branch: a nested node the first time
//! its other endpoint is reached, a bare variable reference afterwards.
//! Edges are visited in stored triple order.
//!
//! Layout hints recorded by interpretation are used in two passes. With
//! the original top, the triples are first replayed in stored order:
//! each one is written under the innermost open node, `Push` opens a
//! nested node and `Pop` closes one, which rebuilds the tree exactly as
//! it was read. When the order does not fit (the graph was edited, or
//! the top changed) a search places each node at its `Push` edge,
//! whichever end of the edge the pushed node is. If that leaves part of
//! the graph unplaced, the layout is recomputed ignoring the hints.
//! Hints whose `Push` and `Pop` counts differ are ignored outright.

use hashbrown::{HashMap, HashSet};
use tracing::{debug, trace, warn};

use crate::codec::CodecConfig;
use crate::model::{
    invert_role, Atom, Branch, BranchTarget, Epidatum, Graph, TreeNode, Triple, CONCEPT_ROLE,
};
use crate::{Error, Result};

/// Configure a tree from a graph.
///
/// The root is `top` if given, else the graph's top, else the source of
/// the first triple. A graph with neither top nor triples gives `()`.
pub fn graph_to_tree(graph: &Graph, top: Option<&str>, config: &CodecConfig) -> Result<TreeNode> {
    let top = top
        .or(graph.top())
        .or_else(|| graph.triples().first().map(|t| t.source.as_str()));
    let Some(top) = top else {
        return Ok(TreeNode::anonymous());
    };

    let index = GraphIndex::new(graph, top, config);
    if !index.hints_balanced {
        debug!(top, "layout hints do not balance; ignoring them");
    } else {
        if graph.top() == Some(top) {
            if let Some(tree) = replay(&index, top, config)? {
                return Ok(tree);
            }
            trace!(top, "triple order does not follow the recorded layout");
        }
        if let Some(tree) = Layout::new(&index, config, true).run(top)? {
            return Ok(tree);
        }
        debug!(top, "layout hints do not span the graph; retrying without them");
    }
    match Layout::new(&index, config, false).run(top)? {
        Some(tree) => Ok(tree),
        None => Err(Error::Layout(format!("graph is disconnected from top '{top}'"))),
    }
}

// ============================================================================
// Index
// ============================================================================

/// Read-only adjacency over the triple list, by position.
struct GraphIndex<'g> {
    triples: &'g [Triple],
    epidata: Vec<&'g [Epidatum]>,
    variables: HashSet<&'g str>,
    /// Triples touching each variable, in stored order.
    incident: HashMap<&'g str, Vec<usize>>,
    /// Triples carrying `Push(var)` where `var` is one of their endpoints.
    push_sites: HashMap<&'g str, Vec<usize>>,
    /// Every `Push` has a matching `Pop`.
    hints_balanced: bool,
    instance_role: &'g str,
}

impl<'g> GraphIndex<'g> {
    fn new(graph: &'g Graph, top: &'g str, config: &'g CodecConfig) -> Self {
        let triples = graph.triples();
        let mut variables: HashSet<&str> = graph.variables().into_iter().collect();
        variables.insert(top);

        let mut index = Self {
            triples,
            epidata: triples.iter().map(|t| graph.epidata_for(t)).collect(),
            variables,
            incident: HashMap::new(),
            push_sites: HashMap::new(),
            hints_balanced: true,
            instance_role: &config.instance_role,
        };

        let (mut pushes, mut pops) = (0usize, 0usize);
        for (i, triple) in triples.iter().enumerate() {
            let source = triple.source.as_str();
            let target = index.target_var(i);
            index.incident.entry(source).or_default().push(i);
            if let Some(target) = target.filter(|t| *t != source) {
                index.incident.entry(target).or_default().push(i);
            }

            let epidata: &'g [Epidatum] = index.epidata[i];
            for epi in epidata {
                match epi {
                    Epidatum::Push(var) => {
                        pushes += 1;
                        // an inverted branch pushes the edge's source
                        let site = if var == source { Some(source) } else { target.filter(|t| t == var) };
                        if let Some(site) = site {
                            index.push_sites.entry(site).or_default().push(i);
                        }
                    }
                    Epidatum::Pop => pops += 1,
                    _ => {}
                }
            }
        }
        index.hints_balanced = pushes == pops;
        index
    }

    /// The target of triple `i` when it names a variable. Concepts are
    /// never variables, even when spelled like one.
    fn target_var(&self, i: usize) -> Option<&'g str> {
        let triples: &'g [Triple] = self.triples;
        let triple = &triples[i];
        if triple.role == self.instance_role {
            return None;
        }
        triple.target_symbol().filter(|s| self.variables.contains(s))
    }

    fn has_push(&self, i: usize, var: &str) -> bool {
        self.epidata[i].iter().any(|e| e.pushed() == Some(var))
    }

    /// Alignments only; layout hints are regenerated from the tree shape.
    fn surface_epidata(&self, i: usize) -> Vec<Epidatum> {
        self.epidata[i].iter().filter(|e| !e.is_layout()).cloned().collect()
    }
}

// ============================================================================
// Replay
// ============================================================================

/// An open node, the variable it expands, and its branch slot in the
/// parent.
type Frame<'g> = (&'g str, TreeNode, usize);

/// Rebuild the tree from the stored triple order and its `Push`/`Pop`
/// hints. `Ok(None)` when the order does not describe a tree rooted at
/// `top` that expands every variable exactly once.
fn replay<'g>(index: &GraphIndex<'g>, top: &'g str, config: &CodecConfig) -> Result<Option<TreeNode>> {
    let triples: &'g [Triple] = index.triples;
    let mut stack: Vec<Frame<'g>> = vec![(top, TreeNode::new(top), 0)];
    let mut expanded: HashSet<&'g str> = HashSet::new();
    expanded.insert(top);

    for (i, triple) in triples.iter().enumerate() {
        let depth = stack.len();
        let Some((var, node, _)) = stack.last_mut() else {
            return Ok(None);
        };
        let var: &'g str = *var;
        let is_instance = triple.role == index.instance_role;

        let branch = if is_instance && triple.source == var {
            let role = match node.branches.first() {
                None => CONCEPT_ROLE.to_string(),
                Some(first) if first.role == CONCEPT_ROLE => triple.role.clone(),
                // the concept is always the first branch of a node
                Some(_) => return Ok(None),
            };
            Branch { role, target: BranchTarget::Atom(triple.target.clone()), epidata: index.surface_epidata(i) }
        } else if triple.source == var {
            Branch {
                role: triple.role.clone(),
                target: BranchTarget::Atom(triple.target.clone()),
                epidata: index.surface_epidata(i),
            }
        } else if !is_instance && triple.target_symbol() == Some(var) {
            Branch {
                role: invert_role(&triple.role),
                target: BranchTarget::Atom(Atom::Symbol(triple.source.clone())),
                epidata: index.surface_epidata(i),
            }
        } else {
            return Ok(None);
        };
        let other = if is_instance {
            None
        } else if triple.source == var {
            triple.target_symbol()
        } else {
            Some(triple.source.as_str())
        };

        let epidata: &'g [Epidatum] = index.epidata[i];
        let mut pushes = epidata.iter().filter_map(Epidatum::pushed);
        match (pushes.next(), pushes.next()) {
            (None, _) => node.branches.push(branch),
            (Some(child), None) if Some(child) == other => {
                if !expanded.insert(child) {
                    return Ok(None);
                }
                if depth >= config.max_depth {
                    return Err(Error::Layout(format!(
                        "tree nesting exceeds the maximum depth of {}",
                        config.max_depth
                    )));
                }
                let mut branch = branch;
                branch.epidata.push(Epidatum::Push(child.to_owned()));
                node.branches.push(branch);
                let slot = node.branches.len() - 1;
                stack.push((child, TreeNode::new(child), slot));
            }
            _ => return Ok(None),
        }

        for _ in epidata.iter().filter(|e| matches!(e, Epidatum::Pop)) {
            if !close(&mut stack) {
                return Ok(None);
            }
        }
    }

    if stack.len() != 1 || !index.variables.iter().all(|v| expanded.contains(v)) {
        return Ok(None);
    }
    Ok(stack.pop().map(|(_, node, _)| node))
}

/// Attach the innermost open node to its parent. False at the root.
fn close(stack: &mut Vec<Frame<'_>>) -> bool {
    if stack.len() < 2 {
        return false;
    }
    let Some((_, child, slot)) = stack.pop() else {
        return false;
    };
    match stack.last_mut() {
        Some((_, parent, _)) => {
            parent.branches[slot].target = BranchTarget::Node(Box::new(child));
            true
        }
        None => false,
    }
}

// ============================================================================
// Layout
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    /// Referenced before its hinted expansion site was reached.
    Reserved,
    /// Will be expanded under the node that claimed it.
    Claimed,
    /// Expanded.
    Started,
}

enum Decision {
    Expand,
    Reference,
    /// Leave the triple for the other endpoint's expansion.
    Defer,
}

struct Layout<'a, 'g> {
    index: &'a GraphIndex<'g>,
    config: &'a CodecConfig,
    honor_hints: bool,
    consumed: Vec<bool>,
    placement: HashMap<&'g str, Placement>,
}

impl<'a, 'g> Layout<'a, 'g> {
    fn new(index: &'a GraphIndex<'g>, config: &'a CodecConfig, honor_hints: bool) -> Self {
        Self {
            index,
            config,
            honor_hints,
            consumed: vec![false; index.triples.len()],
            placement: HashMap::new(),
        }
    }

    /// `Ok(None)` when the tree leaves triples or variables unplaced.
    fn run(mut self, top: &'g str) -> Result<Option<TreeNode>> {
        let tree = self.expand(top, 1)?;
        let complete = self.consumed.iter().all(|c| *c)
            && self
                .index
                .variables
                .iter()
                .all(|v| self.placement.get(v) == Some(&Placement::Started));
        Ok(complete.then_some(tree))
    }

    fn expand(&mut self, var: &'g str, depth: usize) -> Result<TreeNode> {
        if depth > self.config.max_depth {
            return Err(Error::Layout(format!(
                "tree nesting exceeds the maximum depth of {}",
                self.config.max_depth
            )));
        }
        trace!(var, depth, "expanding node");
        self.placement.insert(var, Placement::Started);

        let index = self.index;
        let triples: &'g [Triple] = index.triples;
        let incident: &[usize] = index.incident.get(var).map(Vec::as_slice).unwrap_or(&[]);
        let mut branches = Vec::new();

        // concept first
        if let Some(&i) = incident
            .iter()
            .find(|&&i| triples[i].role == index.instance_role && triples[i].source == var)
        {
            self.consumed[i] = true;
            branches.push(Branch {
                role: CONCEPT_ROLE.to_string(),
                target: BranchTarget::Atom(triples[i].target.clone()),
                epidata: index.surface_epidata(i),
            });
        }

        let mut children: Vec<(usize, &'g str, usize)> = Vec::new();
        for &i in incident {
            if self.consumed[i] {
                continue;
            }
            let triple = &triples[i];
            let epidata = index.surface_epidata(i);

            if triple.role == index.instance_role {
                warn!(var, "node has more than one concept; keeping the extra as a plain role");
                self.consumed[i] = true;
                branches.push(Branch {
                    role: triple.role.clone(),
                    target: BranchTarget::Atom(triple.target.clone()),
                    epidata,
                });
                continue;
            }

            let target_var = index.target_var(i);
            let inverted = triple.source != var;
            let (role, other) = if inverted {
                (invert_role(&triple.role), Some(triple.source.as_str()))
            } else {
                (triple.role.clone(), target_var)
            };

            let Some(other) = other else {
                self.consumed[i] = true;
                branches.push(Branch { role, target: BranchTarget::Atom(triple.target.clone()), epidata });
                continue;
            };

            match self.decide(i, other, inverted) {
                Decision::Defer => {
                    trace!(var, other, "deferring edge to its source");
                }
                Decision::Reference => {
                    self.consumed[i] = true;
                    branches.push(Branch {
                        role,
                        target: BranchTarget::Atom(Atom::Symbol(other.to_owned())),
                        epidata,
                    });
                }
                Decision::Expand => {
                    self.consumed[i] = true;
                    self.placement.insert(other, Placement::Claimed);
                    children.push((branches.len(), other, i));
                    branches.push(Branch {
                        role,
                        target: BranchTarget::Atom(Atom::Symbol(other.to_owned())),
                        epidata,
                    });
                }
            }
        }

        for (slot, child_var, i) in children {
            let child = self.expand(child_var, depth + 1)?;
            // an empty node stays a bare reference unless it was written nested
            if !child.branches.is_empty() || index.has_push(i, child_var) {
                let branch = &mut branches[slot];
                branch.target = BranchTarget::Node(Box::new(child));
                branch.epidata.push(Epidatum::Push(child_var.to_owned()));
            }
        }

        Ok(TreeNode { var: Some(var.to_owned()), branches })
    }

    fn decide(&mut self, i: usize, other: &'g str, inverted: bool) -> Decision {
        match self.placement.get(other).copied() {
            None => {
                if !self.honor_hints || self.index.has_push(i, other) || !self.pending_push(other, i) {
                    Decision::Expand
                } else if inverted {
                    // written under `other` once its hinted site expands it
                    Decision::Defer
                } else {
                    self.placement.insert(other, Placement::Reserved);
                    Decision::Reference
                }
            }
            Some(Placement::Reserved) if self.honor_hints && self.index.has_push(i, other) => {
                Decision::Expand
            }
            Some(Placement::Claimed) if inverted => Decision::Defer,
            Some(_) => Decision::Reference,
        }
    }

    /// Whether `var` still has an unvisited `Push` site other than `i`.
    fn pending_push(&self, var: &str, i: usize) -> bool {
        self.index
            .push_sites
            .get(var)
            .is_some_and(|sites| sites.iter().any(|&j| j != i && !self.consumed[j]))
    }
}
