use super::ops::{Op, OpFactory, Operation};
use super::{Error, ExecutionNode, MethodContext, NodeId, SideEffect, Value};
use crate::dex::Method;
use crate::util::CodeAddress;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Every machine state reached at every address of one method
///
/// Each address has a pile of nodes. The first node of a pile is the template: it holds the
/// operation handler for the instruction at that address and an empty context. Every time
/// execution reaches the address, an instance node is appended to the pile. The pile at the
/// entry address is special: its template doubles as the root of the execution, and the initial
/// state gets installed into it with [`ExecutionGraph::set_root_state`].
///
/// Cloning a graph copies every node (and so every context), but shares the handlers.
#[derive(Clone, Debug)]
pub struct ExecutionGraph {
    piles: BTreeMap<CodeAddress, Vec<ExecutionNode>>,

    /// Addresses of instructions after which the method is over
    terminating: Arc<[CodeAddress]>,

    /// Signature of the method, eg. `Lcom/example/Foo;->bar(I)V`
    method_descriptor: String,
}

impl ExecutionGraph {
    /// Graph holding only template nodes, one per instruction of the method
    pub fn build(method: &Method) -> Result<ExecutionGraph, Error> {
        let factory = OpFactory::new(method);
        let mut piles = BTreeMap::new();
        let mut terminating = vec![];

        for (address, insn) in method.instructions() {
            let op = factory.create(insn, address)?;
            if insn.opcode.is_terminating() {
                terminating.push(address);
            }
            piles.insert(address, vec![ExecutionNode::template(Arc::new(op))]);
        }

        if !piles.contains_key(&CodeAddress::ENTRY) {
            return Err(Error::MissingAddress(CodeAddress::ENTRY));
        }

        let method_descriptor = method.signature();
        log::debug!(
            "Built execution graph for {} ({} instructions, {} terminating)",
            method_descriptor,
            piles.len(),
            terminating.len()
        );

        Ok(ExecutionGraph {
            piles,
            terminating: terminating.into(),
            method_descriptor,
        })
    }

    pub fn method_descriptor(&self) -> &str {
        &self.method_descriptor
    }

    fn pile(&self, address: CodeAddress) -> Result<&Vec<ExecutionNode>, Error> {
        self.piles
            .get(&address)
            .ok_or(Error::MissingAddress(address))
    }

    fn pile_mut(&mut self, address: CodeAddress) -> Result<&mut Vec<ExecutionNode>, Error> {
        self.piles
            .get_mut(&address)
            .ok_or(Error::MissingAddress(address))
    }

    /// Id of the node execution starts from
    pub fn root(&self) -> NodeId {
        NodeId::new(CodeAddress::ENTRY, 0)
    }

    pub fn root_node(&self) -> Result<&ExecutionNode, Error> {
        self.node(self.root())
    }

    pub fn root_context(&self) -> Result<&MethodContext, Error> {
        Ok(self.root_node()?.context())
    }

    /// Install the state execution starts from
    pub fn set_root_state(&mut self, context: MethodContext) -> Result<(), Error> {
        let root = self.node_mut(self.root())?;
        root.set_context(context);
        Ok(())
    }

    pub fn node(&self, id: NodeId) -> Result<&ExecutionNode, Error> {
        self.pile(id.address)?
            .get(id.index)
            .ok_or(Error::MissingNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut ExecutionNode, Error> {
        self.pile_mut(id.address)?
            .get_mut(id.index)
            .ok_or(Error::MissingNode(id))
    }

    /// The node holding the handler for an address
    pub fn template_node(&self, address: CodeAddress) -> Result<&ExecutionNode, Error> {
        self.node(NodeId::new(address, 0))
    }

    pub fn op_handler(&self, address: CodeAddress) -> Result<&Op, Error> {
        Ok(self.template_node(address)?.op())
    }

    /// Append a node to the pile at an address
    ///
    /// The node is not linked to its parent: see [`ExecutionGraph::add_child`] for that. Its
    /// handler must be the one for that address.
    pub fn add_instance_node(
        &mut self,
        address: CodeAddress,
        node: ExecutionNode,
    ) -> Result<NodeId, Error> {
        let pile = self.pile_mut(address)?;
        if node.address() != address {
            return Err(Error::MisplacedNode {
                node: node.address(),
                address,
            });
        }
        pile.push(node);
        Ok(NodeId::new(address, pile.len() - 1))
    }

    /// Add a node reached from `parent` in the given state
    pub fn add_child(
        &mut self,
        parent: NodeId,
        address: CodeAddress,
        context: MethodContext,
    ) -> Result<NodeId, Error> {
        self.node(parent)?;
        let node = self.template_node(address)?.spawn(context, Some(parent));
        let child = self.add_instance_node(address, node)?;
        self.node_mut(parent)?.add_child(child);
        Ok(child)
    }

    /// Run the handler of a node, recording its side effect and adding a child per successor
    pub fn execute_node(&mut self, id: NodeId) -> Result<Vec<NodeId>, Error> {
        let node = self.node(id)?;
        let op = node.op_handle().clone();
        let step = op.execute(node.context())?;
        log::trace!(
            "{:?} ({}) -> {:?} [{:?}]",
            id,
            op.opcode().name(),
            step.addresses(),
            step.side_effect
        );

        let node = self.node_mut(id)?;
        node.record_side_effect(step.side_effect);
        if let Some(value) = step.returned {
            node.context_mut().set_return_value(Some(value));
        }

        let mut children = Vec::with_capacity(step.branches.len());
        for branch in step.branches {
            children.push(self.add_child(id, branch.address, branch.context)?);
        }
        Ok(children)
    }

    /// Nodes that reached an address
    ///
    /// At the entry address, this includes the root. Everywhere else, the template is left out.
    pub fn node_pile(&self, address: CodeAddress) -> Result<&[ExecutionNode], Error> {
        let pile = self.pile(address)?;
        if address == CodeAddress::ENTRY {
            Ok(pile.as_slice())
        } else {
            Ok(&pile[1..])
        }
    }

    /// Has execution reached an address?
    ///
    /// The entry address always counts as reached.
    pub fn was_reached(&self, address: CodeAddress) -> bool {
        if address == CodeAddress::ENTRY {
            return true;
        }
        self.piles.get(&address).map_or(false, |pile| pile.len() > 1)
    }

    /// Addresses of every instruction of the method, in order
    pub fn addresses(&self) -> impl Iterator<Item = CodeAddress> + '_ {
        self.piles.keys().copied()
    }

    /// Addresses of instructions that end the method (returns and throws)
    pub fn terminating_addresses(&self) -> &[CodeAddress] {
        &self.terminating
    }

    /// Terminating addresses that execution actually reached
    pub fn connected_terminating_addresses(&self) -> Vec<CodeAddress> {
        self.terminating
            .iter()
            .copied()
            .filter(|address| self.was_reached(*address))
            .collect()
    }

    /// Number of nodes reached by execution, including the root
    pub fn node_count(&self) -> usize {
        self.piles.values().map(|pile| pile.len() - 1).sum::<usize>() + 1
    }

    /// Value of a register across every node that reached any of the addresses
    ///
    /// If all of the nodes agree, that value is the consensus. Otherwise, the consensus is an
    /// unknown value of the type of the first value found. A node on which the register is
    /// unassigned disagrees with every other node. The register has to be assigned on at least
    /// one of the nodes.
    pub fn register_consensus(
        &self,
        addresses: &[CodeAddress],
        register: u16,
    ) -> Result<Value, Error> {
        let mut values: Vec<Option<&Value>> = vec![];
        for address in addresses {
            for node in self.node_pile(*address)? {
                values.push(node.context().peek_register(register)?);
            }
        }
        if values.is_empty() {
            return Err(Error::EmptyConsensus);
        }

        let (value, agreed) = join(&values).ok_or(Error::UnassignedRegister(register))?;
        if !agreed {
            log::trace!(
                "No consensus for v{} at {:?}: {:?}",
                register,
                addresses,
                values
            );
        }
        Ok(value)
    }

    pub fn register_consensus_at(
        &self,
        address: CodeAddress,
        register: u16,
    ) -> Result<Value, Error> {
        self.register_consensus(&[address], register)
    }

    /// Consensus for each register over every reached terminating address
    pub fn terminating_register_consensus(&self, registers: &[u16]) -> Result<Vec<Value>, Error> {
        let addresses = self.connected_terminating_addresses();
        registers
            .iter()
            .map(|register| self.register_consensus(&addresses, *register))
            .collect()
    }

    /// Consensus over the value handed back by every executed `return*`
    ///
    /// Unlike [`ExecutionGraph::terminating_register_consensus`], this doesn't depend on which
    /// register each return reads. Throws and `return-void` don't take part.
    pub fn return_value_consensus(&self) -> Result<Value, Error> {
        let mut values: Vec<Option<&Value>> = vec![];
        for address in self.connected_terminating_addresses() {
            for node in self.node_pile(address)? {
                if let Some(value) = node.context().return_value() {
                    values.push(Some(value));
                }
            }
        }
        join(&values)
            .map(|(value, _)| value)
            .ok_or(Error::EmptyConsensus)
    }

    /// Strongest side effect of any reached node
    pub fn strongest_side_effect(&self) -> SideEffect {
        SideEffect::strongest(self.iter().map(|(_, node)| node.side_effect()))
    }

    /// Reached nodes, parents before their children
    pub fn iter(&self) -> Nodes<'_> {
        Nodes {
            graph: self,
            stack: vec![self.root()],
        }
    }
}

/// Join of the values seen on several paths, and whether they all agreed
///
/// `None` is a path on which nothing was assigned. It disagrees with everything. There is no
/// join if nothing was assigned on any path.
fn join(values: &[Option<&Value>]) -> Option<(Value, bool)> {
    let first = values.iter().flatten().next()?;
    if values.iter().all(|value| *value == Some(*first)) {
        Some(((*first).clone(), true))
    } else {
        Some((Value::unknown(first.value_type()), false))
    }
}

/// Pre-order walk of the reached nodes of a graph
pub struct Nodes<'a> {
    graph: &'a ExecutionGraph,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Nodes<'a> {
    type Item = (NodeId, &'a ExecutionNode);

    fn next(&mut self) -> Option<Self::Item> {
        let graph: &'a ExecutionGraph = self.graph;
        loop {
            let id = self.stack.pop()?;
            if let Ok(node) = graph.node(id) {
                self.stack.extend(node.children().iter().rev());
                return Some((id, node));
            }
        }
    }
}
