use super::ops::{Op, Operation};
use super::{MethodContext, SideEffect};
use crate::util::CodeAddress;
use std::sync::Arc;

/// Position of a node in an execution graph: its address and its index in that address' pile
///
/// Index 0 is always the template node.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct NodeId {
    pub address: CodeAddress,
    pub index: usize,
}

impl NodeId {
    pub fn new(address: CodeAddress, index: usize) -> NodeId {
        NodeId { address, index }
    }
}

/// One state in which execution reached an address
#[derive(Clone, Debug)]
pub struct ExecutionNode {
    op: Arc<Op>,
    context: MethodContext,
    parent: Option<NodeId>,
    children: Vec<NodeId>,

    /// Side effect reported by the handler, once it has been executed from this node
    side_effect: Option<SideEffect>,
}

impl ExecutionNode {
    /// Node holding an empty context, used as the template of a pile
    pub fn template(op: Arc<Op>) -> ExecutionNode {
        ExecutionNode::new(op, MethodContext::default(), None)
    }

    pub fn new(op: Arc<Op>, context: MethodContext, parent: Option<NodeId>) -> ExecutionNode {
        ExecutionNode {
            op,
            context,
            parent,
            children: vec![],
            side_effect: None,
        }
    }

    /// Copy of this node for a new context, sharing the handler
    pub fn spawn(&self, context: MethodContext, parent: Option<NodeId>) -> ExecutionNode {
        ExecutionNode::new(self.op.clone(), context, parent)
    }

    pub fn address(&self) -> CodeAddress {
        self.op.address()
    }

    pub fn op(&self) -> &Op {
        &self.op
    }

    pub fn op_handle(&self) -> &Arc<Op> {
        &self.op
    }

    pub fn context(&self) -> &MethodContext {
        &self.context
    }

    pub(crate) fn context_mut(&mut self) -> &mut MethodContext {
        &mut self.context
    }

    pub(crate) fn set_context(&mut self, context: MethodContext) {
        self.context = context;
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub(crate) fn add_child(&mut self, child: NodeId) {
        self.children.push(child);
    }

    pub fn was_executed(&self) -> bool {
        self.side_effect.is_some()
    }

    /// Side effect of executing this node
    ///
    /// Before the node has been executed, this is the worst case for its handler.
    pub fn side_effect(&self) -> SideEffect {
        self.side_effect.unwrap_or_else(|| self.op.side_effect())
    }

    pub(crate) fn record_side_effect(&mut self, side_effect: SideEffect) {
        self.side_effect = Some(side_effect);
    }
}
